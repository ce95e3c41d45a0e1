//! 金属信用仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::AppResult;

use crate::domain::entities::MetalCredit;
use crate::domain::value_objects::MetalCreditId;

/// 金属信用仓储接口
#[async_trait]
pub trait MetalCreditRepository: Send + Sync {
    /// 根据 ID 查找金属信用
    async fn find_by_id(
        &self,
        id: &MetalCreditId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<MetalCredit>>;

    /// 保存金属信用（新建）
    async fn save(&self, credit: &MetalCredit) -> AppResult<()>;

    /// 更新金属信用（抵扣后的余额与状态）
    async fn update(&self, credit: &MetalCredit) -> AppResult<()>;
}
