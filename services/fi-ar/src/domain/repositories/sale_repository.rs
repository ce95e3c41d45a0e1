//! 销售单仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::AppResult;

use crate::domain::entities::Sale;
use crate::domain::value_objects::SaleId;

/// 销售单仓储接口
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// 根据 ID 查找销售单（含行项目）
    async fn find_by_id(&self, id: &SaleId, tenant_id: &TenantId) -> AppResult<Option<Sale>>;

    /// 保存销售单（新建）
    async fn save(&self, sale: &Sale) -> AppResult<()>;

    /// 更新销售单
    async fn update(&self, sale: &Sale) -> AppResult<()>;

    /// 列出租户下所有已完结销售单 ID（回填重算用）
    async fn list_finalized_ids(&self, tenant_id: &TenantId) -> AppResult<Vec<SaleId>>;
}
