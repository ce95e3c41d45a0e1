//! 应收账款仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::AppResult;

use crate::domain::entities::AccountRec;
use crate::domain::value_objects::{AccountRecId, SaleId};

/// 应收账款仓储接口
#[async_trait]
pub trait AccountRecRepository: Send + Sync {
    /// 根据 ID 查找应收
    async fn find_by_id(
        &self,
        id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<AccountRec>>;

    /// 查找销售单名下的全部应收
    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<AccountRec>>;

    /// 保存应收（新建）
    async fn save(&self, account_rec: &AccountRec) -> AppResult<()>;

    /// 更新应收
    async fn update(&self, account_rec: &AccountRec) -> AppResult<()>;
}
