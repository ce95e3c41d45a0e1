//! 应收账款聚合根

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Grams, Money};
use aurum_errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AccountRecId, PersonId, SaleId};

/// 应收账款
///
/// 货币与克重双腿：`amount`/`amount_paid` 为 BRL，`gold_amount`/`gold_amount_paid`
/// 为克重（仅金属计价的应收持有克重腿）。
/// 不变量：`received == true` 意味着存在的每条腿都在容差内结清。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRec {
    id: AccountRecId,
    tenant_id: TenantId,
    /// 关联销售单（手工应收为空）
    sale_id: Option<SaleId>,
    person_id: Option<PersonId>,
    description: String,
    amount: Money,
    amount_paid: Money,
    gold_amount: Option<Grams>,
    gold_amount_paid: Grams,
    due_date: DateTime<Utc>,
    received: bool,
    received_at: Option<DateTime<Utc>>,
    /// 结算时不回写销售单状态（数据修复场景使用）
    do_not_update_sale_status: bool,
    audit_info: AuditInfo,
}

impl AccountRec {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        sale_id: Option<SaleId>,
        person_id: Option<PersonId>,
        description: impl Into<String>,
        amount: Money,
        gold_amount: Option<Grams>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountRecId::new(),
            tenant_id,
            sale_id,
            person_id,
            description: description.into(),
            amount,
            amount_paid: Money::ZERO,
            gold_amount,
            gold_amount_paid: Grams::ZERO,
            due_date,
            received: false,
            received_at: None,
            do_not_update_sale_status: false,
            audit_info: AuditInfo::default(),
        }
    }

    /// 从持久化状态还原
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: AccountRecId,
        tenant_id: TenantId,
        sale_id: Option<SaleId>,
        person_id: Option<PersonId>,
        description: String,
        amount: Money,
        amount_paid: Money,
        gold_amount: Option<Grams>,
        gold_amount_paid: Grams,
        due_date: DateTime<Utc>,
        received: bool,
        received_at: Option<DateTime<Utc>>,
        do_not_update_sale_status: bool,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            sale_id,
            person_id,
            description,
            amount,
            amount_paid,
            gold_amount,
            gold_amount_paid,
            due_date,
            received,
            received_at,
            do_not_update_sale_status,
            audit_info,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn sale_id(&self) -> Option<&SaleId> {
        self.sale_id.as_ref()
    }

    pub fn person_id(&self) -> Option<&PersonId> {
        self.person_id.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn amount_paid(&self) -> Money {
        self.amount_paid
    }

    pub fn gold_amount(&self) -> Option<Grams> {
        self.gold_amount
    }

    pub fn gold_amount_paid(&self) -> Grams {
        self.gold_amount_paid
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn received(&self) -> bool {
        self.received
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }

    pub fn do_not_update_sale_status(&self) -> bool {
        self.do_not_update_sale_status
    }

    pub fn set_do_not_update_sale_status(&mut self, value: bool) {
        self.do_not_update_sale_status = value;
    }

    /// 是否持有克重腿（金属计价应收）
    pub fn is_gold_denominated(&self) -> bool {
        self.gold_amount.is_some_and(|g| g.is_positive())
    }

    /// 尚欠货币金额
    pub fn outstanding_amount(&self) -> Money {
        self.amount - self.amount_paid
    }

    /// 登记一笔收款（双腿累计）
    ///
    /// 已收讫的应收不再接受收款。
    pub fn register_payment(&mut self, amount: Money, grams: Grams) -> AppResult<()> {
        if self.received {
            return Err(AppError::failed_precondition(format!(
                "应收账款 {} 已收讫，不能重复收款",
                self.id
            )));
        }
        self.amount_paid += amount;
        self.gold_amount_paid += grams;
        self.audit_info.update(None);
        Ok(())
    }

    /// 是否已全额收款
    ///
    /// 金属计价应收比较克重腿（容差 0.0001g），否则比较货币腿（容差 0.01）。
    pub fn is_fully_paid(&self) -> bool {
        match self.gold_amount {
            Some(gold_amount) if gold_amount.is_positive() => {
                self.gold_amount_paid.covers(gold_amount)
            }
            _ => self.amount_paid.covers(self.amount),
        }
    }

    /// 标记收讫
    pub fn mark_received(&mut self, at: DateTime<Utc>) {
        self.received = true;
        self.received_at = Some(at);
        self.audit_info.update(None);
    }

    /// 自动结清快捷路径：克重腿已满足时，将货币腿的名义金额
    /// 下调为实际收款额并标记收讫（残差不生成损失流水）。
    pub fn write_down_to_paid(&mut self, at: DateTime<Utc>) {
        self.amount = self.amount_paid;
        self.mark_received(at);
    }

    /// 冲销：回到未收款状态
    pub fn reopen(&mut self) {
        self.amount_paid = Money::ZERO;
        self.gold_amount_paid = Grams::ZERO;
        self.received = false;
        self.received_at = None;
        self.audit_info.update(None);
    }
}

impl Entity for AccountRec {
    type Id = AccountRecId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for AccountRec {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn currency_receivable(amount: &str) -> AccountRec {
        AccountRec::new(
            TenantId::new(),
            None,
            None,
            "Parcela 1/1",
            Money::new(dec(amount)),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_register_payment_accumulates_both_legs() {
        let mut ar = currency_receivable("1000.00");
        ar.register_payment(Money::new(dec("600.00")), Grams::new(dec("2.0000")))
            .unwrap();
        ar.register_payment(Money::new(dec("400.00")), Grams::new(dec("1.3333")))
            .unwrap();
        assert_eq!(ar.amount_paid().value(), dec("1000.00"));
        assert_eq!(ar.gold_amount_paid().value(), dec("3.3333"));
        assert!(ar.is_fully_paid());
    }

    #[test]
    fn test_received_rejects_further_payments() {
        let mut ar = currency_receivable("100.00");
        ar.register_payment(Money::new(dec("100.00")), Grams::ZERO)
            .unwrap();
        ar.mark_received(Utc::now());

        let err = ar
            .register_payment(Money::new(dec("1.00")), Grams::ZERO)
            .unwrap_err();
        assert!(matches!(err, AppError::FailedPrecondition(_)));
        assert_eq!(ar.amount_paid().value(), dec("100.00"));
    }

    #[test]
    fn test_gold_denominated_full_payment_uses_weight_leg() {
        let mut ar = AccountRec::new(
            TenantId::new(),
            None,
            None,
            "Venda em metal",
            Money::new(dec("3000.00")),
            Some(Grams::new(dec("10.0000"))),
            Utc::now(),
        );
        ar.register_payment(Money::new(dec("1200.00")), Grams::new(dec("4.0000")))
            .unwrap();
        assert!(!ar.is_fully_paid());

        ar.register_payment(Money::new(dec("1800.00")), Grams::new(dec("6.0000")))
            .unwrap();
        assert!(ar.is_fully_paid());
    }

    #[test]
    fn test_write_down_to_paid_absorbs_currency_residual() {
        let mut ar = AccountRec::new(
            TenantId::new(),
            None,
            None,
            "Venda em metal",
            Money::new(dec("3000.00")),
            Some(Grams::new(dec("10.0000"))),
            Utc::now(),
        );
        ar.register_payment(Money::new(dec("2900.00")), Grams::new(dec("10.0000")))
            .unwrap();
        ar.write_down_to_paid(Utc::now());
        assert!(ar.received());
        assert_eq!(ar.amount().value(), dec("2900.00"));
        assert!(ar.outstanding_amount().is_zero());
    }

    #[test]
    fn test_reopen_clears_settlement_state() {
        let mut ar = currency_receivable("500.00");
        ar.register_payment(Money::new(dec("500.00")), Grams::ZERO)
            .unwrap();
        ar.mark_received(Utc::now());

        ar.reopen();
        assert!(!ar.received());
        assert!(ar.amount_paid().is_zero());
        assert!(ar.gold_amount_paid().is_zero());
    }
}
