//! 事务感知的 Repository 实现
//!
//! 这些 Repository 使用共享的 Transaction 而非 PgPool，
//! 同一结算指令内的全部读写落在同一个可串行化事务上。

use async_trait::async_trait;
use aurum_adapter_postgres::TransactionManager;
use aurum_common::TenantId;
use aurum_domain_core::{AggregateRoot, Entity, MetalType};
use aurum_errors::{AppError, AppResult};
use sqlx::{Postgres, Transaction as SqlxTransaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::{
    AccountRec, LaborCostBracket, MetalAccount, MetalAccountEntry, MetalCredit, Product,
    PureMetalLot, Sale, SaleAdjustment, SaleInstallment, Transaction,
};
use crate::domain::repositories::{
    AccountRecRepository, LaborCostTableRepository, MetalAccountRepository,
    MetalCreditRepository, ProductRepository, PureMetalLotRepository,
    SaleAdjustmentRepository, SaleInstallmentRepository, SaleRepository,
    TransactionRepository,
};
use crate::domain::unit_of_work::{SettlementUnitOfWork, UnitOfWorkFactory};
use crate::domain::value_objects::{
    AccountRecId, MetalCreditId, PersonId, ProductId, SaleId, SaleInstallmentId,
};

use super::rows::{
    AccountRecRow, LaborCostBracketRow, MetalAccountRow, MetalCreditRow, ProductRow,
    PureMetalLotRow, SaleAdjustmentRow, SaleInstallmentRow, SaleItemRow, SaleRow,
    TransactionRow,
};

/// 共享事务类型
type SharedTx = Arc<Mutex<Option<SqlxTransaction<'static, Postgres>>>>;

/// 宏：定义一个持有共享事务的 TxRepository 结构体
macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxSaleRepository);
define_tx_repo!(TxAccountRecRepository);
define_tx_repo!(TxSaleInstallmentRepository);
define_tx_repo!(TxTransactionRepository);
define_tx_repo!(TxMetalCreditRepository);
define_tx_repo!(TxMetalAccountRepository);
define_tx_repo!(TxPureMetalLotRepository);
define_tx_repo!(TxSaleAdjustmentRepository);
define_tx_repo!(TxLaborCostTableRepository);
define_tx_repo!(TxProductRepository);

macro_rules! acquire_tx {
    ($self:ident, $guard:ident) => {
        let mut $guard = $self.tx.lock().await;
        let $guard = $guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;
    };
}

// =============================================================================
// SaleRepository 实现
// =============================================================================

#[async_trait]
impl SaleRepository for TxSaleRepository {
    async fn find_by_id(&self, id: &SaleId, tenant_id: &TenantId) -> AppResult<Option<Sale>> {
        acquire_tx!(self, tx);

        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, tenant_id, order_number, person_id, payment_method, status,
                   gold_price, total_amount, net_amount, gold_value,
                   shipping_cost, commission_amount,
                   created_at, created_by, updated_at, updated_by
            FROM sales
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询销售单失败: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT id, sale_id, product_id, quantity, price, cost_price_at_sale,
                   labor_percentage
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY id
            "#,
        )
        .bind(id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询销售行项目失败: {}", e)))?;

        Ok(Some(row.into_sale(items)))
    }

    async fn save(&self, sale: &Sale) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            INSERT INTO sales (id, tenant_id, order_number, person_id, payment_method,
                               status, gold_price, total_amount, net_amount, gold_value,
                               shipping_cost, commission_amount,
                               created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(sale.id().0)
        .bind(sale.tenant_id().0)
        .bind(sale.order_number())
        .bind(sale.person_id().0)
        .bind(i16::from(sale.payment_method()))
        .bind(i16::from(sale.status()))
        .bind(sale.gold_price())
        .bind(sale.total_amount().rounded())
        .bind(sale.net_amount().rounded())
        .bind(sale.gold_value().rounded())
        .bind(sale.shipping_cost().rounded())
        .bind(sale.commission_amount().rounded())
        .bind(sale.audit_info().created_at)
        .bind(sale.audit_info().created_by.as_ref().map(|u| u.0))
        .bind(sale.audit_info().updated_at)
        .bind(sale.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("保存销售单失败: {}", e)))?;

        for item in sale.items() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (id, sale_id, product_id, quantity, price,
                                        cost_price_at_sale, labor_percentage)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id().0)
            .bind(sale.id().0)
            .bind(item.product_id().0)
            .bind(item.quantity())
            .bind(item.price().rounded())
            .bind(item.cost_price_at_sale().rounded())
            .bind(item.labor_percentage())
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("保存销售行项目失败: {}", e)))?;
        }

        Ok(())
    }

    async fn update(&self, sale: &Sale) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            UPDATE sales
            SET payment_method = $3, status = $4, gold_price = $5, total_amount = $6,
                net_amount = $7, gold_value = $8, shipping_cost = $9,
                commission_amount = $10, updated_at = $11, updated_by = $12
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(sale.id().0)
        .bind(sale.tenant_id().0)
        .bind(i16::from(sale.payment_method()))
        .bind(i16::from(sale.status()))
        .bind(sale.gold_price())
        .bind(sale.total_amount().rounded())
        .bind(sale.net_amount().rounded())
        .bind(sale.gold_value().rounded())
        .bind(sale.shipping_cost().rounded())
        .bind(sale.commission_amount().rounded())
        .bind(sale.audit_info().updated_at)
        .bind(sale.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("更新销售单失败: {}", e)))?;

        Ok(())
    }

    async fn list_finalized_ids(&self, tenant_id: &TenantId) -> AppResult<Vec<SaleId>> {
        acquire_tx!(self, tx);

        let rows: Vec<(uuid::Uuid,)> = sqlx::query_as(
            "SELECT id FROM sales WHERE tenant_id = $1 AND status = $2 ORDER BY order_number",
        )
        .bind(tenant_id.0)
        .bind(i16::from(crate::domain::enums::SaleStatus::Finalized))
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询已完结销售单失败: {}", e)))?;

        Ok(rows.into_iter().map(|(id,)| SaleId::from_uuid(id)).collect())
    }
}

// =============================================================================
// AccountRecRepository 实现
// =============================================================================

const ACCOUNT_REC_COLUMNS: &str = r#"id, tenant_id, sale_id, person_id, description,
            amount, amount_paid, gold_amount, gold_amount_paid, due_date,
            received, received_at, do_not_update_sale_status,
            created_at, created_by, updated_at, updated_by"#;

#[async_trait]
impl AccountRecRepository for TxAccountRecRepository {
    async fn find_by_id(
        &self,
        id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<AccountRec>> {
        acquire_tx!(self, tx);

        let row = sqlx::query_as::<_, AccountRecRow>(&format!(
            "SELECT {} FROM accounts_rec WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
            ACCOUNT_REC_COLUMNS
        ))
        .bind(id.0)
        .bind(tenant_id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询应收账款失败: {}", e)))?;

        Ok(row.map(AccountRecRow::into_account_rec))
    }

    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<AccountRec>> {
        acquire_tx!(self, tx);

        let rows = sqlx::query_as::<_, AccountRecRow>(&format!(
            "SELECT {} FROM accounts_rec WHERE sale_id = $1 AND tenant_id = $2 ORDER BY due_date",
            ACCOUNT_REC_COLUMNS
        ))
        .bind(sale_id.0)
        .bind(tenant_id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询销售应收失败: {}", e)))?;

        Ok(rows.into_iter().map(AccountRecRow::into_account_rec).collect())
    }

    async fn save(&self, account_rec: &AccountRec) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            INSERT INTO accounts_rec (id, tenant_id, sale_id, person_id, description,
                                      amount, amount_paid, gold_amount, gold_amount_paid,
                                      due_date, received, received_at,
                                      do_not_update_sale_status,
                                      created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(account_rec.id().0)
        .bind(account_rec.tenant_id().0)
        .bind(account_rec.sale_id().map(|s| s.0))
        .bind(account_rec.person_id().map(|p| p.0))
        .bind(account_rec.description())
        .bind(account_rec.amount().rounded())
        .bind(account_rec.amount_paid().rounded())
        .bind(account_rec.gold_amount().map(|g| g.rounded()))
        .bind(account_rec.gold_amount_paid().rounded())
        .bind(account_rec.due_date())
        .bind(account_rec.received())
        .bind(account_rec.received_at())
        .bind(account_rec.do_not_update_sale_status())
        .bind(account_rec.audit_info().created_at)
        .bind(account_rec.audit_info().created_by.as_ref().map(|u| u.0))
        .bind(account_rec.audit_info().updated_at)
        .bind(account_rec.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("保存应收账款失败: {}", e)))?;

        Ok(())
    }

    async fn update(&self, account_rec: &AccountRec) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            UPDATE accounts_rec
            SET amount = $3, amount_paid = $4, gold_amount = $5, gold_amount_paid = $6,
                received = $7, received_at = $8, do_not_update_sale_status = $9,
                updated_at = $10, updated_by = $11
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(account_rec.id().0)
        .bind(account_rec.tenant_id().0)
        .bind(account_rec.amount().rounded())
        .bind(account_rec.amount_paid().rounded())
        .bind(account_rec.gold_amount().map(|g| g.rounded()))
        .bind(account_rec.gold_amount_paid().rounded())
        .bind(account_rec.received())
        .bind(account_rec.received_at())
        .bind(account_rec.do_not_update_sale_status())
        .bind(account_rec.audit_info().updated_at)
        .bind(account_rec.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("更新应收账款失败: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// SaleInstallmentRepository 实现
// =============================================================================

const INSTALLMENT_COLUMNS: &str = r#"id, tenant_id, sale_id, account_rec_id,
            installment_number, amount, amount_paid, due_date, status, paid_at,
            created_at, created_by, updated_at, updated_by"#;

#[async_trait]
impl SaleInstallmentRepository for TxSaleInstallmentRepository {
    async fn find_by_id(
        &self,
        id: &SaleInstallmentId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<SaleInstallment>> {
        acquire_tx!(self, tx);

        let row = sqlx::query_as::<_, SaleInstallmentRow>(&format!(
            "SELECT {} FROM sale_installments WHERE id = $1 AND tenant_id = $2",
            INSTALLMENT_COLUMNS
        ))
        .bind(id.0)
        .bind(tenant_id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询销售分期失败: {}", e)))?;

        Ok(row.map(SaleInstallmentRow::into_installment))
    }

    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<SaleInstallment>> {
        acquire_tx!(self, tx);

        let rows = sqlx::query_as::<_, SaleInstallmentRow>(&format!(
            "SELECT {} FROM sale_installments WHERE sale_id = $1 AND tenant_id = $2 ORDER BY due_date",
            INSTALLMENT_COLUMNS
        ))
        .bind(sale_id.0)
        .bind(tenant_id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询销售分期失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(SaleInstallmentRow::into_installment)
            .collect())
    }

    async fn find_by_account_rec(
        &self,
        account_rec_id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<SaleInstallment>> {
        acquire_tx!(self, tx);

        let rows = sqlx::query_as::<_, SaleInstallmentRow>(&format!(
            "SELECT {} FROM sale_installments WHERE account_rec_id = $1 AND tenant_id = $2 ORDER BY due_date",
            INSTALLMENT_COLUMNS
        ))
        .bind(account_rec_id.0)
        .bind(tenant_id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询应收分期失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(SaleInstallmentRow::into_installment)
            .collect())
    }

    async fn save(&self, installment: &SaleInstallment) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            INSERT INTO sale_installments (id, tenant_id, sale_id, account_rec_id,
                                           installment_number, amount, amount_paid,
                                           due_date, status, paid_at,
                                           created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(installment.id().0)
        .bind(installment.tenant_id().0)
        .bind(installment.sale_id().0)
        .bind(installment.account_rec_id().map(|a| a.0))
        .bind(installment.installment_number())
        .bind(installment.amount().rounded())
        .bind(installment.amount_paid().rounded())
        .bind(installment.due_date())
        .bind(i16::from(installment.status()))
        .bind(installment.paid_at())
        .bind(installment.audit_info().created_at)
        .bind(installment.audit_info().created_by.as_ref().map(|u| u.0))
        .bind(installment.audit_info().updated_at)
        .bind(installment.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("保存销售分期失败: {}", e)))?;

        Ok(())
    }

    async fn update(&self, installment: &SaleInstallment) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            UPDATE sale_installments
            SET amount_paid = $3, status = $4, paid_at = $5, updated_at = $6, updated_by = $7
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(installment.id().0)
        .bind(installment.tenant_id().0)
        .bind(installment.amount_paid().rounded())
        .bind(i16::from(installment.status()))
        .bind(installment.paid_at())
        .bind(installment.audit_info().updated_at)
        .bind(installment.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("更新销售分期失败: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// TransactionRepository 实现
// =============================================================================

#[async_trait]
impl TransactionRepository for TxTransactionRepository {
    async fn find_by_account_rec(
        &self,
        account_rec_id: &AccountRecId,
        tenant_id: &TenantId,
    ) -> AppResult<Vec<Transaction>> {
        acquire_tx!(self, tx);

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, tenant_id, transaction_type, amount, gold_amount, gold_price,
                   currency, description, occurred_at, ledger_account_id,
                   current_account_id, account_rec_id, linked_transaction_id, status,
                   created_at, created_by, updated_at, updated_by
            FROM transactions
            WHERE account_rec_id = $1 AND tenant_id = $2
            ORDER BY occurred_at
            "#,
        )
        .bind(account_rec_id.0)
        .bind(tenant_id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询账务流水失败: {}", e)))?;

        Ok(rows.into_iter().map(TransactionRow::into_transaction).collect())
    }

    async fn save(&self, transaction: &Transaction) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            INSERT INTO transactions (id, tenant_id, transaction_type, amount, gold_amount,
                                      gold_price, currency, description, occurred_at,
                                      ledger_account_id, current_account_id, account_rec_id,
                                      linked_transaction_id, status,
                                      created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18)
            "#,
        )
        .bind(transaction.id().0)
        .bind(transaction.tenant_id().0)
        .bind(i16::from(transaction.transaction_type()))
        .bind(transaction.amount().rounded())
        .bind(transaction.gold_amount().map(|g| g.rounded()))
        .bind(transaction.gold_price())
        .bind(transaction.currency())
        .bind(transaction.description())
        .bind(transaction.occurred_at())
        .bind(transaction.ledger_account_id().0)
        .bind(transaction.current_account_id().map(|c| c.0))
        .bind(transaction.account_rec_id().map(|a| a.0))
        .bind(transaction.linked_transaction_id().map(|t| t.0))
        .bind(i16::from(transaction.status()))
        .bind(transaction.audit_info().created_at)
        .bind(transaction.audit_info().created_by.as_ref().map(|u| u.0))
        .bind(transaction.audit_info().updated_at)
        .bind(transaction.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("保存账务流水失败: {}", e)))?;

        Ok(())
    }

    async fn update_status(&self, transaction: &Transaction) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            UPDATE transactions
            SET status = $3, linked_transaction_id = $4, updated_at = $5
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(transaction.id().0)
        .bind(transaction.tenant_id().0)
        .bind(i16::from(transaction.status()))
        .bind(transaction.linked_transaction_id().map(|t| t.0))
        .bind(transaction.audit_info().updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("更新账务流水状态失败: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// MetalCreditRepository 实现
// =============================================================================

#[async_trait]
impl MetalCreditRepository for TxMetalCreditRepository {
    async fn find_by_id(
        &self,
        id: &MetalCreditId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<MetalCredit>> {
        acquire_tx!(self, tx);

        let row = sqlx::query_as::<_, MetalCreditRow>(
            r#"
            SELECT id, tenant_id, client_id, metal_type, grams, settled_grams, status,
                   created_at, created_by, updated_at, updated_by
            FROM metal_credits
            WHERE id = $1 AND tenant_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询金属信用失败: {}", e)))?;

        Ok(row.map(MetalCreditRow::into_metal_credit))
    }

    async fn save(&self, credit: &MetalCredit) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            INSERT INTO metal_credits (id, tenant_id, client_id, metal_type, grams,
                                       settled_grams, status,
                                       created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(credit.id().0)
        .bind(credit.tenant_id().0)
        .bind(credit.client_id().0)
        .bind(credit.metal_type().as_i16())
        .bind(credit.grams().rounded())
        .bind(credit.settled_grams().rounded())
        .bind(i16::from(credit.status()))
        .bind(credit.audit_info().created_at)
        .bind(credit.audit_info().created_by.as_ref().map(|u| u.0))
        .bind(credit.audit_info().updated_at)
        .bind(credit.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("保存金属信用失败: {}", e)))?;

        Ok(())
    }

    async fn update(&self, credit: &MetalCredit) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            UPDATE metal_credits
            SET grams = $3, settled_grams = $4, status = $5, updated_at = $6, updated_by = $7
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(credit.id().0)
        .bind(credit.tenant_id().0)
        .bind(credit.grams().rounded())
        .bind(credit.settled_grams().rounded())
        .bind(i16::from(credit.status()))
        .bind(credit.audit_info().updated_at)
        .bind(credit.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("更新金属信用失败: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// MetalAccountRepository 实现
// =============================================================================

#[async_trait]
impl MetalAccountRepository for TxMetalAccountRepository {
    async fn find_by_person(
        &self,
        person_id: &PersonId,
        metal_type: MetalType,
        tenant_id: &TenantId,
    ) -> AppResult<Option<MetalAccount>> {
        acquire_tx!(self, tx);

        let row = sqlx::query_as::<_, MetalAccountRow>(
            r#"
            SELECT id, tenant_id, person_id, metal_type,
                   created_at, created_by, updated_at, updated_by
            FROM metal_accounts
            WHERE person_id = $1 AND metal_type = $2 AND tenant_id = $3
            "#,
        )
        .bind(person_id.0)
        .bind(metal_type.as_i16())
        .bind(tenant_id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询金属台账失败: {}", e)))?;

        Ok(row.map(MetalAccountRow::into_metal_account))
    }

    async fn save(&self, account: &MetalAccount) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            INSERT INTO metal_accounts (id, tenant_id, person_id, metal_type,
                                        created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id().0)
        .bind(account.tenant_id().0)
        .bind(account.person_id().0)
        .bind(account.metal_type().as_i16())
        .bind(account.audit_info().created_at)
        .bind(account.audit_info().created_by.as_ref().map(|u| u.0))
        .bind(account.audit_info().updated_at)
        .bind(account.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("保存金属台账失败: {}", e)))?;

        Ok(())
    }

    async fn add_entry(&self, entry: &MetalAccountEntry) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            INSERT INTO metal_account_entries (id, metal_account_id, date, description,
                                               grams, entry_type, source_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id().0)
        .bind(entry.metal_account_id().0)
        .bind(entry.date())
        .bind(entry.description())
        .bind(entry.grams().rounded())
        .bind(i16::from(entry.entry_type()))
        .bind(entry.source_id())
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("保存金属台账分录失败: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// PureMetalLotRepository 实现
// =============================================================================

#[async_trait]
impl PureMetalLotRepository for TxPureMetalLotRepository {
    async fn save(&self, lot: &PureMetalLot) -> AppResult<()> {
        acquire_tx!(self, tx);

        sqlx::query(
            r#"
            INSERT INTO pure_metal_lots (id, tenant_id, source, source_id, sale_id,
                                         description, metal_type, initial_grams,
                                         remaining_grams, purity, status, entry_date,
                                         created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(lot.id().0)
        .bind(lot.tenant_id().0)
        .bind(i16::from(lot.source()))
        .bind(lot.source_id())
        .bind(lot.sale_id().map(|s| s.0))
        .bind(lot.description())
        .bind(lot.metal_type().as_i16())
        .bind(lot.initial_grams().rounded())
        .bind(lot.remaining_grams().rounded())
        .bind(lot.purity())
        .bind(i16::from(lot.status()))
        .bind(lot.entry_date())
        .bind(lot.audit_info().created_at)
        .bind(lot.audit_info().created_by.as_ref().map(|u| u.0))
        .bind(lot.audit_info().updated_at)
        .bind(lot.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("保存纯金属批次失败: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// SaleAdjustmentRepository 实现
// =============================================================================

#[async_trait]
impl SaleAdjustmentRepository for TxSaleAdjustmentRepository {
    async fn find_by_sale(
        &self,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<Option<SaleAdjustment>> {
        acquire_tx!(self, tx);

        let row = sqlx::query_as::<_, SaleAdjustmentRow>(
            r#"
            SELECT id, tenant_id, sale_id, payment_received_brl, payment_quotation,
                   payment_equivalent_grams, sale_expected_grams, gross_discrepancy_grams,
                   costs_brl, costs_in_grams, net_discrepancy_grams, labor_cost_in_grams,
                   labor_cost_brl, total_cost_brl, gross_profit_brl, commission_brl,
                   net_profit_brl, calculated_at,
                   created_at, created_by, updated_at, updated_by
            FROM sale_adjustments
            WHERE sale_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(sale_id.0)
        .bind(tenant_id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询销售调整记录失败: {}", e)))?;

        Ok(row.map(SaleAdjustmentRow::into_adjustment))
    }

    async fn upsert(&self, adjustment: &SaleAdjustment) -> AppResult<()> {
        acquire_tx!(self, tx);

        let figures = adjustment.figures();
        sqlx::query(
            r#"
            INSERT INTO sale_adjustments (id, tenant_id, sale_id, payment_received_brl,
                                          payment_quotation, payment_equivalent_grams,
                                          sale_expected_grams, gross_discrepancy_grams,
                                          costs_brl, costs_in_grams, net_discrepancy_grams,
                                          labor_cost_in_grams, labor_cost_brl, total_cost_brl,
                                          gross_profit_brl, commission_brl, net_profit_brl,
                                          calculated_at,
                                          created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22)
            ON CONFLICT (sale_id) DO UPDATE SET
                payment_received_brl = EXCLUDED.payment_received_brl,
                payment_quotation = EXCLUDED.payment_quotation,
                payment_equivalent_grams = EXCLUDED.payment_equivalent_grams,
                sale_expected_grams = EXCLUDED.sale_expected_grams,
                gross_discrepancy_grams = EXCLUDED.gross_discrepancy_grams,
                costs_brl = EXCLUDED.costs_brl,
                costs_in_grams = EXCLUDED.costs_in_grams,
                net_discrepancy_grams = EXCLUDED.net_discrepancy_grams,
                labor_cost_in_grams = EXCLUDED.labor_cost_in_grams,
                labor_cost_brl = EXCLUDED.labor_cost_brl,
                total_cost_brl = EXCLUDED.total_cost_brl,
                gross_profit_brl = EXCLUDED.gross_profit_brl,
                commission_brl = EXCLUDED.commission_brl,
                net_profit_brl = EXCLUDED.net_profit_brl,
                calculated_at = EXCLUDED.calculated_at,
                updated_at = EXCLUDED.updated_at,
                updated_by = EXCLUDED.updated_by
            "#,
        )
        .bind(adjustment.id().0)
        .bind(adjustment.tenant_id().0)
        .bind(adjustment.sale_id().0)
        .bind(figures.payment_received_brl.rounded())
        .bind(figures.payment_quotation)
        .bind(figures.payment_equivalent_grams.rounded())
        .bind(figures.sale_expected_grams.rounded())
        .bind(figures.gross_discrepancy_grams.rounded())
        .bind(figures.costs_brl.rounded())
        .bind(figures.costs_in_grams.rounded())
        .bind(figures.net_discrepancy_grams.rounded())
        .bind(figures.labor_cost_in_grams.rounded())
        .bind(figures.labor_cost_brl.rounded())
        .bind(figures.total_cost_brl.rounded())
        .bind(figures.gross_profit_brl.rounded())
        .bind(figures.commission_brl.rounded())
        .bind(figures.net_profit_brl.rounded())
        .bind(adjustment.calculated_at())
        .bind(adjustment.audit_info().created_at)
        .bind(adjustment.audit_info().created_by.as_ref().map(|u| u.0))
        .bind(adjustment.audit_info().updated_at)
        .bind(adjustment.audit_info().updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("写入销售调整记录失败: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// LaborCostTableRepository / ProductRepository 实现
// =============================================================================

#[async_trait]
impl LaborCostTableRepository for TxLaborCostTableRepository {
    async fn list(&self, tenant_id: &TenantId) -> AppResult<Vec<LaborCostBracket>> {
        acquire_tx!(self, tx);

        let rows = sqlx::query_as::<_, LaborCostBracketRow>(
            r#"
            SELECT id, tenant_id, min_grams, max_grams, gold_grams_charged
            FROM labor_cost_table_entries
            WHERE tenant_id = $1
            ORDER BY min_grams
            "#,
        )
        .bind(tenant_id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询工费表失败: {}", e)))?;

        Ok(rows.into_iter().map(LaborCostBracketRow::into_bracket).collect())
    }
}

#[async_trait]
impl ProductRepository for TxProductRepository {
    async fn find_many(
        &self,
        ids: &[ProductId],
        tenant_id: &TenantId,
    ) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        acquire_tx!(self, tx);

        let raw_ids: Vec<uuid::Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, tenant_id, name, gold_value_per_unit, calc_method,
                   created_at, created_by, updated_at, updated_by
            FROM products
            WHERE id = ANY($1) AND tenant_id = $2
            "#,
        )
        .bind(&raw_ids)
        .bind(tenant_id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("查询产品失败: {}", e)))?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }
}

// =============================================================================
// PgUnitOfWork
// =============================================================================

/// 基于共享事务的 Unit of Work 实现
pub struct PgUnitOfWork {
    tx: SharedTx,
    sales: TxSaleRepository,
    receivables: TxAccountRecRepository,
    installments: TxSaleInstallmentRepository,
    transactions: TxTransactionRepository,
    metal_credits: TxMetalCreditRepository,
    metal_accounts: TxMetalAccountRepository,
    pure_metal_lots: TxPureMetalLotRepository,
    adjustments: TxSaleAdjustmentRepository,
    labor_cost_table: TxLaborCostTableRepository,
    products: TxProductRepository,
}

impl PgUnitOfWork {
    pub fn new(tx: SqlxTransaction<'static, Postgres>) -> Self {
        let shared: SharedTx = Arc::new(Mutex::new(Some(tx)));
        Self {
            sales: TxSaleRepository::new(shared.clone()),
            receivables: TxAccountRecRepository::new(shared.clone()),
            installments: TxSaleInstallmentRepository::new(shared.clone()),
            transactions: TxTransactionRepository::new(shared.clone()),
            metal_credits: TxMetalCreditRepository::new(shared.clone()),
            metal_accounts: TxMetalAccountRepository::new(shared.clone()),
            pure_metal_lots: TxPureMetalLotRepository::new(shared.clone()),
            adjustments: TxSaleAdjustmentRepository::new(shared.clone()),
            labor_cost_table: TxLaborCostTableRepository::new(shared.clone()),
            products: TxProductRepository::new(shared.clone()),
            tx: shared,
        }
    }
}

#[async_trait]
impl SettlementUnitOfWork for PgUnitOfWork {
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
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;
        TransactionManager::commit(tx).await
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;
        TransactionManager::rollback(tx).await
    }
}

/// PgUnitOfWork 工厂
///
/// 每次 begin 开启一个可串行化事务，防止并发结算读到过期余额。
pub struct PgUnitOfWorkFactory {
    manager: TransactionManager,
}

impl PgUnitOfWorkFactory {
    pub fn new(manager: TransactionManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PgUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn SettlementUnitOfWork>> {
        let tx = self.manager.begin_serializable().await?;
        Ok(Box::new(PgUnitOfWork::new(tx)))
    }
}
