//! 测试辅助：内存版 Unit of Work 与端口桩
//!
//! 以快照语义模拟事务：begin 克隆已提交状态，commit 写回，rollback 丢弃，
//! 让用例级测试无需数据库即可验证"全有或全无"。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_domain_core::{Entity, Grams, MetalType, Money};
use aurum_errors::AppResult;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use fi_ar::domain::entities::{
    AccountRec, LaborCostBracket, MetalAccount, MetalAccountEntry, MetalCredit, Product,
    PureMetalLot, Sale, SaleAdjustment, SaleInstallment, Transaction,
};
use fi_ar::domain::repositories::{
    AccountRecRepository, LaborCostTableRepository, MetalAccountRepository,
    MetalCreditRepository, ProductRepository, PureMetalLotRepository, QuotationLookup,
    SaleAdjustmentRepository, SaleInstallmentRepository, SaleRepository, SettingsLookup,
    SettlementAccounts, TransactionRepository,
};
use fi_ar::domain::unit_of_work::{SettlementUnitOfWork, UnitOfWorkFactory};
use fi_ar::domain::value_objects::{
    AccountRecId, LedgerAccountId, MetalCreditId, PersonId, ProductId, QuoteSnapshot,
    SaleId, SaleInstallmentId,
};

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// ============================================================
// 内存状态
// ============================================================

#[derive(Default, Clone)]
pub struct State {
    pub sales: HashMap<Uuid, Sale>,
    pub receivables: HashMap<Uuid, AccountRec>,
    pub installments: HashMap<Uuid, SaleInstallment>,
    pub transactions: HashMap<Uuid, Transaction>,
    pub metal_credits: HashMap<Uuid, MetalCredit>,
    pub metal_accounts: HashMap<Uuid, MetalAccount>,
    pub metal_account_entries: Vec<MetalAccountEntry>,
    pub pure_metal_lots: Vec<PureMetalLot>,
    pub adjustments: HashMap<Uuid, SaleAdjustment>,
    pub labor_brackets: Vec<LaborCostBracket>,
    pub products: HashMap<Uuid, Product>,
}

/// 内存后端：已提交状态
#[derive(Default, Clone)]
pub struct InMemoryBackend {
    committed: Arc<Mutex<State>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入已提交状态（测试夹具用）
    pub fn seed<F: FnOnce(&mut State)>(&self, f: F) {
        f(&mut self.committed.lock().unwrap());
    }

    /// 读取已提交状态
    pub fn read<T, F: FnOnce(&State) -> T>(&self, f: F) -> T {
        f(&self.committed.lock().unwrap())
    }
}

type Working = Arc<Mutex<State>>;

pub struct InMemoryUow {
    committed: Arc<Mutex<State>>,
    working: Working,
    sales: MemSaleRepo,
    receivables: MemAccountRecRepo,
    installments: MemInstallmentRepo,
    transactions: MemTransactionRepo,
    metal_credits: MemMetalCreditRepo,
    metal_accounts: MemMetalAccountRepo,
    pure_metal_lots: MemLotRepo,
    adjustments: MemAdjustmentRepo,
    labor_cost_table: MemLaborRepo,
    products: MemProductRepo,
}

impl InMemoryUow {
    fn new(committed: Arc<Mutex<State>>) -> Self {
        let snapshot = committed.lock().unwrap().clone();
        let working: Working = Arc::new(Mutex::new(snapshot));
        Self {
            sales: MemSaleRepo(working.clone()),
            receivables: MemAccountRecRepo(working.clone()),
            installments: MemInstallmentRepo(working.clone()),
            transactions: MemTransactionRepo(working.clone()),
            metal_credits: MemMetalCreditRepo(working.clone()),
            metal_accounts: MemMetalAccountRepo(working.clone()),
            pure_metal_lots: MemLotRepo(working.clone()),
            adjustments: MemAdjustmentRepo(working.clone()),
            labor_cost_table: MemLaborRepo(working.clone()),
            products: MemProductRepo(working.clone()),
            committed,
            working,
        }
    }
}

#[async_trait]
impl SettlementUnitOfWork for InMemoryUow {
    fn sales(&self) -> &dyn SaleRepository {
        &self.sales
    }

    fn receivables(&self) -> &dyn AccountRecRepository {
        &self.receivables
    }

    fn installments(&self) -> &dyn SaleInstallmentRepository {
        &self.installments
    }

    fn transactions(&self) -> &dyn TransactionRepository {
        &self.transactions
    }

    fn metal_credits(&self) -> &dyn MetalCreditRepository {
        &self.metal_credits
    }

    fn metal_accounts(&self) -> &dyn MetalAccountRepository {
        &self.metal_accounts
    }

    fn pure_metal_lots(&self) -> &dyn PureMetalLotRepository {
        &self.pure_metal_lots
    }

    fn adjustments(&self) -> &dyn SaleAdjustmentRepository {
        &self.adjustments
    }

    fn labor_cost_table(&self) -> &dyn LaborCostTableRepository {
        &self.labor_cost_table
    }

    fn products(&self) -> &dyn ProductRepository {
        &self.products
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let working = self.working.lock().unwrap().clone();
        *self.committed.lock().unwrap() = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryUowFactory {
    backend: InMemoryBackend,
}

impl InMemoryUowFactory {
    pub fn new(backend: InMemoryBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryUowFactory {
    async fn begin(&self) -> AppResult<Box<dyn SettlementUnitOfWork>> {
        Ok(Box::new(InMemoryUow::new(self.backend.committed.clone())))
    }
}

// ============================================================
// 内存 Repository 实现
// ============================================================

pub struct MemSaleRepo(Working);

#[async_trait]
impl SaleRepository for MemSaleRepo {
    async fn find_by_id(&self, id: &SaleId, tenant_id: &TenantId) -> AppResult<Option<Sale>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .sales
            .get(&id.0)
            .filter(|s| s.tenant_id() == tenant_id)
            .cloned())
    }

    async fn save(&self, sale: &Sale) -> AppResult<()> {
        self.0
            .lock()
            .unwrap()
            .sales
            .insert(sale.id().0, sale.clone());
        Ok(())
    }

    async fn update(&self, sale: &Sale) -> AppResult<()> {
        self.save(sale).await
    }

    async fn list_finalized_ids(&self, tenant_id: &TenantId) -> AppResult<Vec<SaleId>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .sales
            .values()
            .filter(|s| s.tenant_id() == tenant_id && s.status().is_finalized())
            .map(|s| *s.id())
            .collect())
    }
}

pub struct MemAccountRecRepo(Working);

#[async_trait]
impl AccountRecRepository for MemAccountRecRepo {
    async fn find_by_id(
        &self,
        id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<AccountRec>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .receivables
            .get(&id.0)
            .filter(|ar| ar.tenant_id() == tenant_id)
            .cloned())
    }

    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<AccountRec>> {
        let state = self.0.lock().unwrap();
        let mut found: Vec<_> = state
            .receivables
            .values()
            .filter(|ar| ar.tenant_id() == tenant_id && ar.sale_id() == Some(sale_id))
            .cloned()
            .collect();
        found.sort_by_key(|ar| ar.due_date());
        Ok(found)
    }

    async fn save(&self, account_rec: &AccountRec) -> AppResult<()> {
        self.0
            .lock()
            .unwrap()
            .receivables
            .insert(account_rec.id().0, account_rec.clone());
        Ok(())
    }

    async fn update(&self, account_rec: &AccountRec) -> AppResult<()> {
        self.save(account_rec).await
    }
}

pub struct MemInstallmentRepo(Working);

#[async_trait]
impl SaleInstallmentRepository for MemInstallmentRepo {
    async fn find_by_id(
        &self,
        id: &SaleInstallmentId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<SaleInstallment>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .installments
            .get(&id.0)
            .filter(|i| i.tenant_id() == tenant_id)
            .cloned())
    }

    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<SaleInstallment>> {
        let state = self.0.lock().unwrap();
        let mut found: Vec<_> = state
            .installments
            .values()
            .filter(|i| i.tenant_id() == tenant_id && i.sale_id() == sale_id)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.due_date());
        Ok(found)
    }

    async fn find_by_account_rec(
        &self,
        account_rec_id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<SaleInstallment>> {
        let state = self.0.lock().unwrap();
        let mut found: Vec<_> = state
            .installments
            .values()
            .filter(|i| {
                i.tenant_id() == tenant_id && i.account_rec_id() == Some(account_rec_id)
            })
            .cloned()
            .collect();
        found.sort_by_key(|i| i.due_date());
        Ok(found)
    }

    async fn save(&self, installment: &SaleInstallment) -> AppResult<()> {
        self.0
            .lock()
            .unwrap()
            .installments
            .insert(installment.id().0, installment.clone());
        Ok(())
    }

    async fn update(&self, installment: &SaleInstallment) -> AppResult<()> {
        self.save(installment).await
    }
}

pub struct MemTransactionRepo(Working);

#[async_trait]
impl TransactionRepository for MemTransactionRepo {
    async fn find_by_account_rec(
        &self,
        account_rec_id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<Transaction>> {
        let state = self.0.lock().unwrap();
        let mut found: Vec<_> = state
            .transactions
            .values()
            .filter(|t| {
                t.tenant_id() == tenant_id && t.account_rec_id() == Some(account_rec_id)
            })
            .cloned()
            .collect();
        found.sort_by_key(|t| t.occurred_at());
        Ok(found)
    }

    async fn save(&self, transaction: &Transaction) -> AppResult<()> {
        self.0
            .lock()
            .unwrap()
            .transactions
            .insert(transaction.id().0, transaction.clone());
        Ok(())
    }

    async fn update_status(&self, transaction: &Transaction) -> AppResult<()> {
        self.save(transaction).await
    }
}

pub struct MemMetalCreditRepo(Working);

#[async_trait]
impl MetalCreditRepository for MemMetalCreditRepo {
    async fn find_by_id(
        &self,
        id: &MetalCreditId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<MetalCredit>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .metal_credits
            .get(&id.0)
            .filter(|c| c.tenant_id() == tenant_id)
            .cloned())
    }

    async fn save(&self, credit: &MetalCredit) -> AppResult<()> {
        self.0
            .lock()
            .unwrap()
            .metal_credits
            .insert(credit.id().0, credit.clone());
        Ok(())
    }

    async fn update(&self, credit: &MetalCredit) -> AppResult<()> {
        self.save(credit).await
    }
}

pub struct MemMetalAccountRepo(Working);

#[async_trait]
impl MetalAccountRepository for MemMetalAccountRepo {
    async fn find_by_person(
        &self,
        person_id: &PersonId,
        metal_type: MetalType,
        tenant_id: &TenantId,
    ) -> AppResult<Option<MetalAccount>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .metal_accounts
            .values()
            .find(|a| {
                a.tenant_id() == tenant_id
                    && a.person_id() == person_id
                    && a.metal_type() == metal_type
            })
            .cloned())
    }

    async fn save(&self, account: &MetalAccount) -> AppResult<()> {
        self.0
            .lock()
            .unwrap()
            .metal_accounts
            .insert(account.id().0, account.clone());
        Ok(())
    }

    async fn add_entry(&self, entry: &MetalAccountEntry) -> AppResult<()> {
        self.0
            .lock()
            .unwrap()
            .metal_account_entries
            .push(entry.clone());
        Ok(())
    }
}

pub struct MemLotRepo(Working);

#[async_trait]
impl PureMetalLotRepository for MemLotRepo {
    async fn save(&self, lot: &PureMetalLot) -> AppResult<()> {
        self.0.lock().unwrap().pure_metal_lots.push(lot.clone());
        Ok(())
    }
}

pub struct MemAdjustmentRepo(Working);

#[async_trait]
impl SaleAdjustmentRepository for MemAdjustmentRepo {
    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<SaleAdjustment>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .adjustments
            .get(&sale_id.0)
            .filter(|a| a.tenant_id() == tenant_id)
            .cloned())
    }

    async fn upsert(&self, adjustment: &SaleAdjustment) -> AppResult<()> {
        self.0
            .lock()
            .unwrap()
            .adjustments
            .insert(adjustment.sale_id().0, adjustment.clone());
        Ok(())
    }
}

pub struct MemLaborRepo(Working);

#[async_trait]
impl LaborCostTableRepository for MemLaborRepo {
    async fn list(&self, tenant_id: &TenantId) -> AppResult<Vec<LaborCostBracket>> {
        let state = self.0.lock().unwrap();
        let mut brackets: Vec<_> = state
            .labor_brackets
            .iter()
            .filter(|b| b.tenant_id() == tenant_id)
            .cloned()
            .collect();
        brackets.sort_by_key(|b| b.min_grams());
        Ok(brackets)
    }
}

pub struct MemProductRepo(Working);

#[async_trait]
impl ProductRepository for MemProductRepo {
    async fn find_many(
        &self,
        ids: &[ProductId],
        tenant_id: &TenantId,
    ) -> AppResult<Vec<Product>> {
        let state = self.0.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(&id.0))
            .filter(|p| p.tenant_id() == tenant_id)
            .cloned()
            .collect())
    }
}

// ============================================================
// 端口桩
// ============================================================

/// 固定行情桩
pub struct StaticQuotations {
    pub quote: Option<QuoteSnapshot>,
}

impl StaticQuotations {
    pub fn none() -> Self {
        Self { quote: None }
    }

    pub fn with_buy_price(price: &str) -> Self {
        Self {
            quote: Some(QuoteSnapshot {
                metal: MetalType::Gold,
                date: Utc::now(),
                buy_price: dec(price),
                sell_price: dec(price),
            }),
        }
    }
}

#[async_trait]
impl QuotationLookup for StaticQuotations {
    async fn find_latest(
        &self,
        _metal: MetalType,
        _tenant_id: &TenantId,
        _as_of: DateTime<Utc>,
    ) -> AppResult<Option<QuoteSnapshot>> {
        Ok(self.quote.clone())
    }

    async fn find_by_date(
        &self,
        _date: DateTime<Utc>,
        _metal: MetalType,
        _tenant_id: &TenantId,
    ) -> AppResult<Option<QuoteSnapshot>> {
        Ok(self.quote.clone())
    }
}

/// 固定记账科目桩
pub struct StaticSettings {
    pub accounts: SettlementAccounts,
}

impl StaticSettings {
    pub fn configured() -> Self {
        Self {
            accounts: SettlementAccounts {
                revenue_account_id: Some(LedgerAccountId::new()),
                metal_stock_account_id: Some(LedgerAccountId::new()),
                metal_credit_payable_account_id: Some(LedgerAccountId::new()),
            },
        }
    }
}

#[async_trait]
impl SettingsLookup for StaticSettings {
    async fn settlement_accounts(&self, _tenant_id: &TenantId) -> AppResult<SettlementAccounts> {
        Ok(self.accounts.clone())
    }
}

// ============================================================
// 夹具构造
// ============================================================

pub fn money(s: &str) -> Money {
    Money::new(dec(s))
}

pub fn grams(s: &str) -> Grams {
    Grams::new(dec(s))
}
