//! Unit of Work 模式
//!
//! 提供跨多个 Repository 的事务协调能力，确保多腿结算的原子性。
//! 事务句柄以显式参数在各用例间传递，支持"独立调用或嵌套调用"两种场景。

use async_trait::async_trait;
use aurum_errors::AppResult;

use crate::domain::repositories::{
    AccountRecRepository, LaborCostTableRepository, MetalAccountRepository,
    MetalCreditRepository, ProductRepository, PureMetalLotRepository,
    SaleAdjustmentRepository, SaleInstallmentRepository, SaleRepository,
    TransactionRepository,
};

/// 结算 Unit of Work
///
/// 单条结算指令涉及的全部聚合在同一可串行化事务内读写；
/// 任一腿失败即整体回滚，外部观察不到部分写入。
///
/// # 使用示例
///
/// ```ignore
/// let uow = factory.begin().await?;
///
/// uow.metal_credits().update(&credit).await?;
/// uow.receivables().update(&account_rec).await?;
///
/// uow.commit().await?;
/// ```
#[async_trait]
pub trait SettlementUnitOfWork: Send + Sync {
    /// 销售单 Repository
    fn sales(&self) -> &dyn SaleRepository;

    /// 应收账款 Repository
    fn receivables(&self) -> &dyn AccountRecRepository;

    /// 销售分期 Repository
    fn installments(&self) -> &dyn SaleInstallmentRepository;

    /// 账务流水 Repository
    fn transactions(&self) -> &dyn TransactionRepository;

    /// 金属信用 Repository
    fn metal_credits(&self) -> &dyn MetalCreditRepository;

    /// 金属台账 Repository
    fn metal_accounts(&self) -> &dyn MetalAccountRepository;

    /// 纯金属批次 Repository
    fn pure_metal_lots(&self) -> &dyn PureMetalLotRepository;

    /// 销售调整记录 Repository
    fn adjustments(&self) -> &dyn SaleAdjustmentRepository;

    /// 工费表 Repository
    fn labor_cost_table(&self) -> &dyn LaborCostTableRepository;

    /// 产品 Repository
    fn products(&self) -> &dyn ProductRepository;

    /// 提交事务
    ///
    /// 成功时所有更改持久化，失败时自动回滚。
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的可串行化事务
    async fn begin(&self) -> AppResult<Box<dyn SettlementUnitOfWork>>;
}
