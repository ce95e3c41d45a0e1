//! 销售分期实体

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::enums::SaleInstallmentStatus;
use crate::domain::value_objects::{AccountRecId, SaleId, SaleInstallmentId};

/// 销售分期
///
/// `amount_paid` 记录摊销累计，跨多次结算保持部分覆盖进度。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleInstallment {
    id: SaleInstallmentId,
    tenant_id: TenantId,
    sale_id: SaleId,
    account_rec_id: Option<AccountRecId>,
    installment_number: i32,
    amount: Money,
    amount_paid: Money,
    due_date: DateTime<Utc>,
    status: SaleInstallmentStatus,
    paid_at: Option<DateTime<Utc>>,
    audit_info: AuditInfo,
}

impl SaleInstallment {
    pub fn new(
        tenant_id: TenantId,
        sale_id: SaleId,
        account_rec_id: Option<AccountRecId>,
        installment_number: i32,
        amount: Money,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SaleInstallmentId::new(),
            tenant_id,
            sale_id,
            account_rec_id,
            installment_number,
            amount,
            amount_paid: Money::ZERO,
            due_date,
            status: SaleInstallmentStatus::Pending,
            paid_at: None,
            audit_info: AuditInfo::default(),
        }
    }

    /// 从持久化状态还原
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: SaleInstallmentId,
        tenant_id: TenantId,
        sale_id: SaleId,
        account_rec_id: Option<AccountRecId>,
        installment_number: i32,
        amount: Money,
        amount_paid: Money,
        due_date: DateTime<Utc>,
        status: SaleInstallmentStatus,
        paid_at: Option<DateTime<Utc>>,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            sale_id,
            account_rec_id,
            installment_number,
            amount,
            amount_paid,
            due_date,
            status,
            paid_at,
            audit_info,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn sale_id(&self) -> &SaleId {
        &self.sale_id
    }

    pub fn account_rec_id(&self) -> Option<&AccountRecId> {
        self.account_rec_id.as_ref()
    }

    pub fn installment_number(&self) -> i32 {
        self.installment_number
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn amount_paid(&self) -> Money {
        self.amount_paid
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn status(&self) -> SaleInstallmentStatus {
        self.status
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// 尚欠金额
    pub fn outstanding(&self) -> Money {
        self.amount - self.amount_paid
    }

    /// 摊销：消耗可用结算额，返回实际消耗量
    ///
    /// 覆盖到容差内转 Paid，部分覆盖转 PartiallyPaid。
    pub fn apply_amortization(&mut self, available: Money, at: DateTime<Utc>) -> Money {
        if !self.status.is_open() || !available.is_positive() {
            return Money::ZERO;
        }

        let consumed = available.min(self.outstanding());
        self.amount_paid += consumed;

        if self.amount_paid.covers(self.amount) {
            self.status = SaleInstallmentStatus::Paid;
            self.paid_at = Some(at);
        } else if self.amount_paid.is_positive() {
            self.status = SaleInstallmentStatus::PartiallyPaid;
        }
        self.audit_info.update(None);
        consumed
    }

    /// 定向收款：整期直接结清
    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.amount_paid = self.amount;
        self.status = SaleInstallmentStatus::Paid;
        self.paid_at = Some(at);
        self.audit_info.update(None);
    }

    /// 冲销：回到未收款状态
    pub fn reset(&mut self) {
        self.amount_paid = Money::ZERO;
        self.status = SaleInstallmentStatus::Pending;
        self.paid_at = None;
        self.audit_info.update(None);
    }
}

impl Entity for SaleInstallment {
    type Id = SaleInstallmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for SaleInstallment {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
