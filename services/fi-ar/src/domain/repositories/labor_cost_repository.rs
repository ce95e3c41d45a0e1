//! 工费表仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::AppResult;

use crate::domain::entities::LaborCostBracket;

/// 工费表仓储接口
#[async_trait]
pub trait LaborCostTableRepository: Send + Sync {
    /// 列出租户的全部工费区间（按起始克重升序）
    async fn list(&self, tenant_id: &TenantId) -> AppResult<Vec<LaborCostBracket>>;
}
