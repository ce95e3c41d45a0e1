//! 结算命令

use aurum_common::{TenantId, UserId};
use aurum_domain_core::{Grams, MetalType, Money};
use aurum_errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::value_objects::{
    AccountRecId, CurrentAccountId, MetalCreditId, SaleInstallmentId,
};

/// 结算支付腿
///
/// 一条结算指令可捆绑任意数量、任意类型的支付腿；
/// 各变体只携带自身必需的字段，穷举匹配处理。
#[derive(Debug, Clone)]
pub enum PaymentLeg {
    /// 现金收款
    Cash {
        /// 入账资金账户
        current_account_id: CurrentAccountId,
        amount: Money,
        /// 腿级收款日（缺省用指令级）
        received_at: Option<DateTime<Utc>>,
        /// 腿级报价（缺省用指令级，再缺省查当日行情）
        quotation: Option<Decimal>,
    },
    /// 金属信用抵扣
    MetalCredit {
        metal_credit_id: MetalCreditId,
        amount_in_grams: Grams,
        quotation: Option<Decimal>,
    },
    /// 实物金属收款
    PhysicalMetal {
        metal_type: MetalType,
        amount_in_grams: Grams,
        /// 纯度，(0, 1] 小数
        purity: Decimal,
        quotation: Option<Decimal>,
    },
    /// 转移至其他客户的金属信用（不计入本应收的回款）
    CreditTransfer {
        target_metal_credit_id: MetalCreditId,
        amount_in_grams: Grams,
        quotation: Decimal,
    },
}

/// 混合收款命令
///
/// 对应收应用一条多腿结算指令；全部腿在同一事务内生效。
#[derive(Debug, Clone)]
pub struct HybridSettlementCommand {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub account_rec_id: AccountRecId,
    pub legs: Vec<PaymentLeg>,
    pub received_at: DateTime<Utc>,
    /// 指令级报价（BRL/g）
    pub quotation: Option<Decimal>,
    /// 全额收款时是否标记收讫并完结销售单
    pub finalize: bool,
    /// 定向分期（必须属于该应收背后的销售单）
    pub installment_id: Option<SaleInstallmentId>,
}

impl HybridSettlementCommand {
    pub fn validate(&self) -> AppResult<()> {
        if self.legs.is_empty() {
            return Err(AppError::validation("结算指令必须至少包含一条支付腿"));
        }

        for leg in &self.legs {
            match leg {
                PaymentLeg::Cash {
                    amount, quotation, ..
                } => {
                    if !amount.is_positive() {
                        return Err(AppError::validation("现金收款金额必须为正数"));
                    }
                    if let Some(q) = quotation {
                        if *q <= Decimal::ZERO {
                            return Err(AppError::validation("腿级报价必须为正数"));
                        }
                    }
                }
                PaymentLeg::MetalCredit {
                    amount_in_grams,
                    quotation,
                    ..
                } => {
                    if !amount_in_grams.is_positive() {
                        return Err(AppError::validation("信用抵扣克重必须为正数"));
                    }
                    if let Some(q) = quotation {
                        if *q <= Decimal::ZERO {
                            return Err(AppError::validation("腿级报价必须为正数"));
                        }
                    }
                }
                PaymentLeg::PhysicalMetal {
                    amount_in_grams,
                    purity,
                    quotation,
                    ..
                } => {
                    if !amount_in_grams.is_positive() {
                        return Err(AppError::validation("实物金属克重必须为正数"));
                    }
                    if *purity <= Decimal::ZERO || *purity > Decimal::ONE {
                        return Err(AppError::validation("纯度必须在 (0, 1] 区间内"));
                    }
                    if let Some(q) = quotation {
                        if *q <= Decimal::ZERO {
                            return Err(AppError::validation("腿级报价必须为正数"));
                        }
                    }
                }
                PaymentLeg::CreditTransfer {
                    amount_in_grams,
                    quotation,
                    ..
                } => {
                    if !amount_in_grams.is_positive() {
                        return Err(AppError::validation("转移克重必须为正数"));
                    }
                    if *quotation <= Decimal::ZERO {
                        return Err(AppError::validation("转移报价必须为正数"));
                    }
                }
            }
        }

        if let Some(q) = self.quotation {
            if q <= Decimal::ZERO {
                return Err(AppError::validation("指令级报价必须为正数"));
            }
        }

        Ok(())
    }
}

/// 单期收款的支付方式
#[derive(Debug, Clone)]
pub enum SinglePayment {
    Cash {
        current_account_id: CurrentAccountId,
        amount: Money,
    },
    MetalCredit {
        metal_credit_id: MetalCreditId,
        amount_in_grams: Grams,
    },
    PhysicalMetal {
        metal_type: MetalType,
        amount_in_grams: Grams,
        purity: Decimal,
    },
}

/// 单期收款命令
///
/// 针对单个分期的定向收款，内部展开为单腿混合结算指令。
#[derive(Debug, Clone)]
pub struct ReceiveInstallmentCommand {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub installment_id: SaleInstallmentId,
    pub payment: SinglePayment,
    pub received_at: DateTime<Utc>,
    pub quotation: Option<Decimal>,
}
