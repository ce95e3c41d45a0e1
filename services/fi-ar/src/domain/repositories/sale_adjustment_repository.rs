//! 销售调整记录仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::AppResult;

use crate::domain::entities::SaleAdjustment;
use crate::domain::value_objects::SaleId;

/// 销售调整记录仓储接口
#[async_trait]
pub trait SaleAdjustmentRepository: Send + Sync {
    /// 查找销售单的调整记录
    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<SaleAdjustment>>;

    /// 以销售单为键整体覆盖（create-or-replace，不做合并）
    async fn upsert(&self, adjustment: &SaleAdjustment) -> AppResult<()>;
}
