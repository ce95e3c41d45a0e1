//! 销售分期仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::AppResult;

use crate::domain::entities::SaleInstallment;
use crate::domain::value_objects::{AccountRecId, SaleId, SaleInstallmentId};

/// 销售分期仓储接口
#[async_trait]
pub trait SaleInstallmentRepository: Send + Sync {
    /// 根据 ID 查找分期
    async fn find_by_id(
        &self,
        id: &SaleInstallmentId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<SaleInstallment>>;

    /// 查找销售单的全部分期（按到期日升序）
    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<SaleInstallment>>;

    /// 查找应收关联的分期（按到期日升序）
    async fn find_by_account_rec(
        &self,
        account_rec_id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<SaleInstallment>>;

    /// 保存分期（新建）
    async fn save(&self, installment: &SaleInstallment) -> AppResult<()>;

    /// 更新分期
    async fn update(&self, installment: &SaleInstallment) -> AppResult<()>;
}
