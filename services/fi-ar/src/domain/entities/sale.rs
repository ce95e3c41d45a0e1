//! 销售单聚合根

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Grams, Money};
use aurum_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::enums::{PaymentMethod, SaleStatus};
use crate::domain::value_objects::{PersonId, ProductId, SaleId, SaleItemId};

/// 销售行项目
///
/// 创建后不可变；`cost_price_at_sale` 固化销售时点的成本。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    id: SaleItemId,
    product_id: ProductId,
    quantity: i32,
    price: Money,
    cost_price_at_sale: Money,
    /// 行项目工费比例（%）；为空时整单回退工费表
    labor_percentage: Option<Decimal>,
}

impl SaleItem {
    pub fn new(
        product_id: ProductId,
        quantity: i32,
        price: Money,
        cost_price_at_sale: Money,
        labor_percentage: Option<Decimal>,
    ) -> Self {
        Self {
            id: SaleItemId::new(),
            product_id,
            quantity,
            price,
            cost_price_at_sale,
            labor_percentage,
        }
    }

    pub fn restore(
        id: SaleItemId,
        product_id: ProductId,
        quantity: i32,
        price: Money,
        cost_price_at_sale: Money,
        labor_percentage: Option<Decimal>,
    ) -> Self {
        Self {
            id,
            product_id,
            quantity,
            price,
            cost_price_at_sale,
            labor_percentage,
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn cost_price_at_sale(&self) -> Money {
        self.cost_price_at_sale
    }

    pub fn labor_percentage(&self) -> Option<Decimal> {
        self.labor_percentage
    }
}

impl Entity for SaleItem {
    type Id = SaleItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// 销售单
///
/// `gold_price` 为销售时点的名义报价（BRL/g），调整引擎重算后会被
/// 实际收款报价覆盖；`gold_value` 为期望产出克重。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    id: SaleId,
    tenant_id: TenantId,
    order_number: i64,
    person_id: PersonId,
    payment_method: PaymentMethod,
    status: SaleStatus,
    gold_price: Decimal,
    total_amount: Money,
    net_amount: Money,
    gold_value: Grams,
    shipping_cost: Money,
    commission_amount: Money,
    items: Vec<SaleItem>,
    audit_info: AuditInfo,
}

impl Sale {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        order_number: i64,
        person_id: PersonId,
        payment_method: PaymentMethod,
        gold_price: Decimal,
        total_amount: Money,
        net_amount: Money,
        gold_value: Grams,
        items: Vec<SaleItem>,
    ) -> Self {
        Self {
            id: SaleId::new(),
            tenant_id,
            order_number,
            person_id,
            payment_method,
            status: SaleStatus::Pending,
            gold_price,
            total_amount,
            net_amount,
            gold_value,
            shipping_cost: Money::ZERO,
            commission_amount: Money::ZERO,
            items,
            audit_info: AuditInfo::default(),
        }
    }

    /// 从持久化状态还原
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: SaleId,
        tenant_id: TenantId,
        order_number: i64,
        person_id: PersonId,
        payment_method: PaymentMethod,
        status: SaleStatus,
        gold_price: Decimal,
        total_amount: Money,
        net_amount: Money,
        gold_value: Grams,
        shipping_cost: Money,
        commission_amount: Money,
        items: Vec<SaleItem>,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            order_number,
            person_id,
            payment_method,
            status,
            gold_price,
            total_amount,
            net_amount,
            gold_value,
            shipping_cost,
            commission_amount,
            items,
            audit_info,
        }
    }

    pub fn with_shipping_cost(mut self, shipping_cost: Money) -> Self {
        self.shipping_cost = shipping_cost;
        self
    }

    pub fn with_commission(mut self, commission: Money) -> Self {
        self.commission_amount = commission;
        self
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn order_number(&self) -> i64 {
        self.order_number
    }

    pub fn person_id(&self) -> &PersonId {
        &self.person_id
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn status(&self) -> SaleStatus {
        self.status
    }

    pub fn gold_price(&self) -> Decimal {
        self.gold_price
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn net_amount(&self) -> Money {
        self.net_amount
    }

    pub fn gold_value(&self) -> Grams {
        self.gold_value
    }

    pub fn shipping_cost(&self) -> Money {
        self.shipping_cost
    }

    pub fn commission_amount(&self) -> Money {
        self.commission_amount
    }

    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    // ========== 状态机 ==========

    /// 确认销售单
    pub fn confirm(&mut self) -> AppResult<()> {
        if !self.status.can_confirm() {
            return Err(AppError::failed_precondition(format!(
                "状态为 {:?} 的销售单不能确认",
                self.status
            )));
        }
        self.status = SaleStatus::Confirmed;
        self.audit_info.update(None);
        Ok(())
    }

    pub fn mark_awaiting_separation(&mut self) -> AppResult<()> {
        if self.status != SaleStatus::Pending {
            return Err(AppError::failed_precondition(format!(
                "状态为 {:?} 的销售单不能进入分拣队列",
                self.status
            )));
        }
        self.status = SaleStatus::AwaitingSeparation;
        self.audit_info.update(None);
        Ok(())
    }

    pub fn mark_separated(&mut self) -> AppResult<()> {
        if self.status != SaleStatus::AwaitingSeparation {
            return Err(AppError::failed_precondition(format!(
                "状态为 {:?} 的销售单不能标记已分拣",
                self.status
            )));
        }
        self.status = SaleStatus::Separated;
        self.audit_info.update(None);
        Ok(())
    }

    /// 完结销售单
    ///
    /// 不变量：完结后期望产出与实际收款必须在容差内对平（由调整引擎维护）。
    pub fn finalize(&mut self) -> AppResult<()> {
        if !self.status.can_finalize() {
            return Err(AppError::failed_precondition(format!(
                "状态为 {:?} 的销售单不能完结",
                self.status
            )));
        }
        self.status = SaleStatus::Finalized;
        self.audit_info.update(None);
        Ok(())
    }

    /// 部分收款
    pub fn mark_partially_paid(&mut self) {
        if !self.status.is_finalized() && self.status != SaleStatus::Cancelled {
            self.status = SaleStatus::PartiallyPaid;
            self.audit_info.update(None);
        }
    }

    /// 冲销：回到待处理
    pub fn revert_to_pending(&mut self) -> AppResult<()> {
        if !self.status.can_revert() {
            return Err(AppError::failed_precondition(format!(
                "状态为 {:?} 的销售单不能冲销",
                self.status
            )));
        }
        self.status = SaleStatus::Pending;
        self.audit_info.update(None);
        Ok(())
    }

    /// 取消销售单（完结单据不可取消，亦不可物理删除）
    pub fn cancel(&mut self) -> AppResult<()> {
        if !self.status.can_cancel() {
            return Err(AppError::failed_precondition(format!(
                "状态为 {:?} 的销售单不能取消",
                self.status
            )));
        }
        self.status = SaleStatus::Cancelled;
        self.audit_info.update(None);
        Ok(())
    }

    /// 确认时点更新报价，期望克重按净额重新折算
    pub fn reprice(&mut self, gold_price: Decimal, gold_value: Grams) {
        self.gold_price = gold_price;
        self.gold_value = gold_value;
        self.audit_info.update(None);
    }

    /// 调整引擎回写派生字段：实际收款净额与实际收款报价
    pub fn apply_adjustment_figures(&mut self, net_amount: Money, payment_quotation: Decimal) {
        self.net_amount = net_amount;
        self.gold_price = payment_quotation;
        self.audit_info.update(None);
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Sale {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
