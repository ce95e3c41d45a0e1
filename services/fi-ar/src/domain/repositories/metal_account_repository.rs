//! 金属台账仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_domain_core::MetalType;
use aurum_errors::AppResult;

use crate::domain::entities::{MetalAccount, MetalAccountEntry};
use crate::domain::value_objects::PersonId;

/// 金属台账仓储接口
#[async_trait]
pub trait MetalAccountRepository: Send + Sync {
    /// 按往来方与金属类型查找台账
    async fn find_by_person(
        &self,
        person_id: &PersonId,
        metal_type: MetalType,
        tenant_id: &TenantId,
    ) -> AppResult<Option<MetalAccount>>;

    /// 保存台账（新建）
    async fn save(&self, account: &MetalAccount) -> AppResult<()>;

    /// 追加台账分录
    async fn add_entry(&self, entry: &MetalAccountEntry) -> AppResult<()>;
}
