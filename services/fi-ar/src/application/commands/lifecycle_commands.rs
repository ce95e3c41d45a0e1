//! 销售单生命周期命令

use aurum_common::{TenantId, UserId};
use aurum_errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::enums::PaymentMethod;
use crate::domain::value_objects::{CurrentAccountId, SaleId};

/// 分期计划
#[derive(Debug, Clone)]
pub struct InstallmentPlan {
    /// 期数
    pub count: u32,
    /// 首期到期日
    pub first_due_date: DateTime<Utc>,
}

/// 确认销售单命令
#[derive(Debug, Clone)]
pub struct ConfirmSaleCommand {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub sale_id: SaleId,
    pub payment_method: PaymentMethod,
    /// 现款现付时的入账资金账户
    pub current_account_id: Option<CurrentAccountId>,
    /// 账期销售的分期计划
    pub installment_plan: Option<InstallmentPlan>,
    /// 确认时点更新报价（BRL/g）
    pub updated_gold_price: Option<Decimal>,
}

impl ConfirmSaleCommand {
    pub fn validate(&self) -> AppResult<()> {
        if self.payment_method == PaymentMethod::CashUpfront && self.current_account_id.is_none() {
            return Err(AppError::validation(
                "现款现付的销售单必须指定入账资金账户",
            ));
        }
        if let Some(plan) = &self.installment_plan {
            if plan.count == 0 {
                return Err(AppError::validation("分期期数必须大于零"));
            }
        }
        if let Some(price) = self.updated_gold_price {
            if price <= Decimal::ZERO {
                return Err(AppError::validation("更新报价必须为正数"));
            }
        }
        Ok(())
    }
}
