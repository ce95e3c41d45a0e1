//! 产品仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::AppResult;

use crate::domain::entities::Product;
use crate::domain::value_objects::ProductId;

/// 产品仓储接口（结算核算所需的只读视图）
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 批量查找产品
    async fn find_many(
        &self,
        ids: &[ProductId],
        tenant_id: &TenantId,
    ) -> AppResult<Vec<Product>>;
}
