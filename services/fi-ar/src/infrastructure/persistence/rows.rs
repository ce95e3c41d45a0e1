//! 数据库行映射结构

use aurum_common::{AuditInfo, TenantId, UserId};
use aurum_domain_core::{Grams, MetalType, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::entities::{
    AccountRec, AdjustmentFigures, LaborCostBracket, MetalCredit, Product, PureMetalLot,
    Sale, SaleAdjustment, SaleInstallment, SaleItem, Transaction,
};
use crate::domain::value_objects::{
    AccountRecId, CurrentAccountId, LaborCostEntryId, LedgerAccountId, MetalCreditId,
    PersonId, ProductId, PureMetalLotId, SaleAdjustmentId, SaleId, SaleInstallmentId,
    SaleItemId, TransactionId,
};

fn audit(
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
) -> AuditInfo {
    AuditInfo {
        created_at,
        created_by: created_by.map(UserId::from_uuid),
        updated_at,
        updated_by: updated_by.map(UserId::from_uuid),
    }
}

/// 销售单数据库行
#[derive(Debug, FromRow)]
pub struct SaleRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub order_number: i64,
    pub person_id: Uuid,
    pub payment_method: i16,
    pub status: i16,
    pub gold_price: Decimal,
    pub total_amount: Decimal,
    pub net_amount: Decimal,
    pub gold_value: Decimal,
    pub shipping_cost: Decimal,
    pub commission_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

/// 销售行项目数据库行
#[derive(Debug, FromRow)]
pub struct SaleItemRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub cost_price_at_sale: Decimal,
    pub labor_percentage: Option<Decimal>,
}

impl SaleRow {
    pub fn into_sale(self, item_rows: Vec<SaleItemRow>) -> Sale {
        let items = item_rows
            .into_iter()
            .map(|row| {
                SaleItem::restore(
                    SaleItemId::from_uuid(row.id),
                    ProductId::from_uuid(row.product_id),
                    row.quantity,
                    Money::new(row.price),
                    Money::new(row.cost_price_at_sale),
                    row.labor_percentage,
                )
            })
            .collect();

        Sale::restore(
            SaleId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            self.order_number,
            PersonId::from_uuid(self.person_id),
            self.payment_method.into(),
            self.status.into(),
            self.gold_price,
            Money::new(self.total_amount),
            Money::new(self.net_amount),
            Grams::new(self.gold_value),
            Money::new(self.shipping_cost),
            Money::new(self.commission_amount),
            items,
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}

/// 应收账款数据库行
#[derive(Debug, FromRow)]
pub struct AccountRecRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub sale_id: Option<Uuid>,
    pub person_id: Option<Uuid>,
    pub description: String,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub gold_amount: Option<Decimal>,
    pub gold_amount_paid: Decimal,
    pub due_date: DateTime<Utc>,
    pub received: bool,
    pub received_at: Option<DateTime<Utc>>,
    pub do_not_update_sale_status: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl AccountRecRow {
    pub fn into_account_rec(self) -> AccountRec {
        AccountRec::restore(
            AccountRecId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            self.sale_id.map(SaleId::from_uuid),
            self.person_id.map(PersonId::from_uuid),
            self.description,
            Money::new(self.amount),
            Money::new(self.amount_paid),
            self.gold_amount.map(Grams::new),
            Grams::new(self.gold_amount_paid),
            self.due_date,
            self.received,
            self.received_at,
            self.do_not_update_sale_status,
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}

/// 销售分期数据库行
#[derive(Debug, FromRow)]
pub struct SaleInstallmentRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub sale_id: Uuid,
    pub account_rec_id: Option<Uuid>,
    pub installment_number: i32,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub due_date: DateTime<Utc>,
    pub status: i16,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl SaleInstallmentRow {
    pub fn into_installment(self) -> SaleInstallment {
        SaleInstallment::restore(
            SaleInstallmentId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            SaleId::from_uuid(self.sale_id),
            self.account_rec_id.map(AccountRecId::from_uuid),
            self.installment_number,
            Money::new(self.amount),
            Money::new(self.amount_paid),
            self.due_date,
            self.status.into(),
            self.paid_at,
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}

/// 账务流水数据库行
#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub transaction_type: i16,
    pub amount: Decimal,
    pub gold_amount: Option<Decimal>,
    pub gold_price: Option<Decimal>,
    pub currency: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub ledger_account_id: Uuid,
    pub current_account_id: Option<Uuid>,
    pub account_rec_id: Option<Uuid>,
    pub linked_transaction_id: Option<Uuid>,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl TransactionRow {
    pub fn into_transaction(self) -> Transaction {
        Transaction::restore(
            TransactionId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            self.transaction_type.into(),
            Money::new(self.amount),
            self.gold_amount.map(Grams::new),
            self.gold_price,
            self.currency,
            self.description,
            self.occurred_at,
            LedgerAccountId::from_uuid(self.ledger_account_id),
            self.current_account_id.map(CurrentAccountId::from_uuid),
            self.account_rec_id.map(AccountRecId::from_uuid),
            self.linked_transaction_id.map(TransactionId::from_uuid),
            self.status.into(),
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}

/// 金属信用数据库行
#[derive(Debug, FromRow)]
pub struct MetalCreditRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub client_id: Uuid,
    pub metal_type: i16,
    pub grams: Decimal,
    pub settled_grams: Decimal,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl MetalCreditRow {
    pub fn into_metal_credit(self) -> MetalCredit {
        MetalCredit::restore(
            MetalCreditId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            PersonId::from_uuid(self.client_id),
            MetalType::from_i16(self.metal_type).unwrap_or(MetalType::Gold),
            Grams::new(self.grams),
            Grams::new(self.settled_grams),
            self.status.into(),
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}

/// 金属台账数据库行
#[derive(Debug, FromRow)]
pub struct MetalAccountRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    pub metal_type: i16,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl MetalAccountRow {
    pub fn into_metal_account(self) -> crate::domain::entities::MetalAccount {
        crate::domain::entities::MetalAccount::restore(
            crate::domain::value_objects::MetalAccountId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            PersonId::from_uuid(self.person_id),
            MetalType::from_i16(self.metal_type).unwrap_or(MetalType::Gold),
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}

/// 纯金属批次数据库行
#[derive(Debug, FromRow)]
pub struct PureMetalLotRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub source: i16,
    pub source_id: Option<Uuid>,
    pub sale_id: Option<Uuid>,
    pub description: String,
    pub metal_type: i16,
    pub initial_grams: Decimal,
    pub remaining_grams: Decimal,
    pub purity: Decimal,
    pub status: i16,
    pub entry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl PureMetalLotRow {
    pub fn into_lot(self) -> PureMetalLot {
        PureMetalLot::restore(
            PureMetalLotId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            self.source.into(),
            self.source_id,
            self.sale_id.map(SaleId::from_uuid),
            self.description,
            MetalType::from_i16(self.metal_type).unwrap_or(MetalType::Gold),
            Grams::new(self.initial_grams),
            Grams::new(self.remaining_grams),
            self.purity,
            self.status.into(),
            self.entry_date,
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}

/// 销售调整记录数据库行
#[derive(Debug, FromRow)]
pub struct SaleAdjustmentRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub sale_id: Uuid,
    pub payment_received_brl: Decimal,
    pub payment_quotation: Decimal,
    pub payment_equivalent_grams: Decimal,
    pub sale_expected_grams: Decimal,
    pub gross_discrepancy_grams: Decimal,
    pub costs_brl: Decimal,
    pub costs_in_grams: Decimal,
    pub net_discrepancy_grams: Decimal,
    pub labor_cost_in_grams: Decimal,
    pub labor_cost_brl: Decimal,
    pub total_cost_brl: Decimal,
    pub gross_profit_brl: Decimal,
    pub commission_brl: Decimal,
    pub net_profit_brl: Decimal,
    pub calculated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl SaleAdjustmentRow {
    pub fn into_adjustment(self) -> SaleAdjustment {
        let figures = AdjustmentFigures {
            payment_received_brl: Money::new(self.payment_received_brl),
            payment_quotation: self.payment_quotation,
            payment_equivalent_grams: Grams::new(self.payment_equivalent_grams),
            sale_expected_grams: Grams::new(self.sale_expected_grams),
            gross_discrepancy_grams: Grams::new(self.gross_discrepancy_grams),
            costs_brl: Money::new(self.costs_brl),
            costs_in_grams: Grams::new(self.costs_in_grams),
            net_discrepancy_grams: Grams::new(self.net_discrepancy_grams),
            labor_cost_in_grams: Grams::new(self.labor_cost_in_grams),
            labor_cost_brl: Money::new(self.labor_cost_brl),
            total_cost_brl: Money::new(self.total_cost_brl),
            gross_profit_brl: Money::new(self.gross_profit_brl),
            commission_brl: Money::new(self.commission_brl),
            net_profit_brl: Money::new(self.net_profit_brl),
        };
        SaleAdjustment::restore(
            SaleAdjustmentId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            SaleId::from_uuid(self.sale_id),
            figures,
            self.calculated_at,
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}

/// 工费表数据库行
#[derive(Debug, FromRow)]
pub struct LaborCostBracketRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub min_grams: Decimal,
    pub max_grams: Option<Decimal>,
    pub gold_grams_charged: Decimal,
}

impl LaborCostBracketRow {
    pub fn into_bracket(self) -> LaborCostBracket {
        LaborCostBracket::restore(
            LaborCostEntryId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            Grams::new(self.min_grams),
            self.max_grams.map(Grams::new),
            Grams::new(self.gold_grams_charged),
        )
    }
}

/// 产品数据库行（结算核算视图）
#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub gold_value_per_unit: Decimal,
    pub calc_method: i16,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl ProductRow {
    pub fn into_product(self) -> Product {
        Product::restore(
            ProductId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            self.name,
            Grams::new(self.gold_value_per_unit),
            self.calc_method.into(),
            audit(
                self.created_at,
                self.created_by,
                self.updated_at,
                self.updated_by,
            ),
        )
    }
}
