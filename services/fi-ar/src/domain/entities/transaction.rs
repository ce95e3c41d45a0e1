//! 账务流水实体

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Grams, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::enums::{TransactionStatus, TransactionType};
use crate::domain::value_objects::{
    AccountRecId, CurrentAccountId, LedgerAccountId, TransactionId,
};

/// 新建流水的参数
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub tenant_id: TenantId,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub gold_amount: Option<Grams>,
    pub gold_price: Option<Decimal>,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub ledger_account_id: LedgerAccountId,
    pub current_account_id: Option<CurrentAccountId>,
    pub account_rec_id: Option<AccountRecId>,
}

/// 账务流水
///
/// 原子记账分录，创建后不可修改；冲销通过 `offsetting()` 生成反向流水。
/// 货币单位固定为 BRL，可选克重腿记录金属等值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    tenant_id: TenantId,
    transaction_type: TransactionType,
    amount: Money,
    gold_amount: Option<Grams>,
    gold_price: Option<Decimal>,
    currency: String,
    description: String,
    occurred_at: DateTime<Utc>,
    ledger_account_id: LedgerAccountId,
    current_account_id: Option<CurrentAccountId>,
    account_rec_id: Option<AccountRecId>,
    /// 内部重分配配对流水
    linked_transaction_id: Option<TransactionId>,
    status: TransactionStatus,
    audit_info: AuditInfo,
}

impl Transaction {
    pub fn create(params: NewTransaction) -> Self {
        Self {
            id: TransactionId::new(),
            tenant_id: params.tenant_id,
            transaction_type: params.transaction_type,
            amount: params.amount,
            gold_amount: params.gold_amount,
            gold_price: params.gold_price,
            currency: "BRL".to_string(),
            description: params.description,
            occurred_at: params.occurred_at,
            ledger_account_id: params.ledger_account_id,
            current_account_id: params.current_account_id,
            account_rec_id: params.account_rec_id,
            linked_transaction_id: None,
            status: TransactionStatus::Active,
            audit_info: AuditInfo::default(),
        }
    }

    /// 从持久化状态还原
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: TransactionId,
        tenant_id: TenantId,
        transaction_type: TransactionType,
        amount: Money,
        gold_amount: Option<Grams>,
        gold_price: Option<Decimal>,
        currency: String,
        description: String,
        occurred_at: DateTime<Utc>,
        ledger_account_id: LedgerAccountId,
        current_account_id: Option<CurrentAccountId>,
        account_rec_id: Option<AccountRecId>,
        linked_transaction_id: Option<TransactionId>,
        status: TransactionStatus,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            transaction_type,
            amount,
            gold_amount,
            gold_price,
            currency,
            description,
            occurred_at,
            ledger_account_id,
            current_account_id,
            account_rec_id,
            linked_transaction_id,
            status,
            audit_info,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn gold_amount(&self) -> Option<Grams> {
        self.gold_amount
    }

    pub fn gold_price(&self) -> Option<Decimal> {
        self.gold_price
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn ledger_account_id(&self) -> &LedgerAccountId {
        &self.ledger_account_id
    }

    pub fn current_account_id(&self) -> Option<&CurrentAccountId> {
        self.current_account_id.as_ref()
    }

    pub fn account_rec_id(&self) -> Option<&AccountRecId> {
        self.account_rec_id.as_ref()
    }

    pub fn linked_transaction_id(&self) -> Option<&TransactionId> {
        self.linked_transaction_id.as_ref()
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// 配对内部重分配流水（借/贷双向互链）
    pub fn link_with(&mut self, other: &mut Transaction) {
        self.linked_transaction_id = Some(*other.id());
        other.linked_transaction_id = Some(*self.id());
    }

    /// 生成反向冲销流水
    ///
    /// 金额与克重均记正向数值，方向由流水类型表达；
    /// 原流水保持不变，仅由调用方标记 Adjusted。
    pub fn offsetting(&self, description: String, at: DateTime<Utc>) -> Transaction {
        Self {
            id: TransactionId::new(),
            tenant_id: self.tenant_id,
            transaction_type: self.transaction_type.reversed(),
            amount: self.amount,
            gold_amount: self.gold_amount,
            gold_price: self.gold_price,
            currency: self.currency.clone(),
            description,
            occurred_at: at,
            ledger_account_id: self.ledger_account_id,
            current_account_id: self.current_account_id,
            account_rec_id: self.account_rec_id,
            linked_transaction_id: Some(self.id),
            status: TransactionStatus::Active,
            audit_info: AuditInfo::default(),
        }
    }

    /// 冲销后标记原流水为已调整
    pub fn mark_adjusted(&mut self) {
        self.status = TransactionStatus::Adjusted;
        self.audit_info.update(None);
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Transaction {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
