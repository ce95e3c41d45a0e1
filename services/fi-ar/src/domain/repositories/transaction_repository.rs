//! 账务流水仓储接口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::AppResult;

use crate::domain::entities::Transaction;
use crate::domain::value_objects::AccountRecId;

/// 账务流水仓储接口
///
/// 流水不可修改，仅允许追加与状态标记（冲销配套）。
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// 查找应收名下的全部流水
    async fn find_by_account_rec(
        &self,
        account_rec_id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<Transaction>>;

    /// 保存流水（新建）
    async fn save(&self, transaction: &Transaction) -> AppResult<()>;

    /// 更新流水状态（冲销时标记 Adjusted）
    async fn update_status(&self, transaction: &Transaction) -> AppResult<()>;
}
