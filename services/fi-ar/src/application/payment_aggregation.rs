//! 收款汇总器
//!
//! 汇总销售单应收（直接关联 + 经分期间接关联）名下的全部结算流水，
//! 按流水标识去重后推导实际收款报价。纯函数，无副作用。

use std::collections::HashSet;

use aurum_domain_core::{Entity, Grams, Money};
use rust_decimal::Decimal;

use crate::domain::entities::Transaction;
use crate::domain::enums::TransactionType;
use crate::domain::value_objects::TransactionId;

/// 收款汇总结果
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentTotals {
    /// 实际收款（BRL）
    pub received_brl: Money,
    /// 收款折算克重
    pub equivalent_grams: Grams,
    /// 实际收款报价 = 收款 ÷ 克重；任一为零时回退名义报价
    pub effective_quotation: Decimal,
    /// 是否存在结算流水
    pub has_payments: bool,
}

/// 汇总结算流水
///
/// 同一流水可能经"应收直接关联"与"分期应收"两条路径到达，只计一次。
/// 冲销后的流水（Adjusted）不参与汇总；借记流水按负向冲减。
pub fn aggregate(transactions: &[Transaction], nominal_quotation: Decimal) -> PaymentTotals {
    let mut seen: HashSet<TransactionId> = HashSet::new();
    let mut received_brl = Money::ZERO;
    let mut equivalent_grams = Grams::ZERO;
    let mut has_payments = false;

    for tx in transactions {
        if !tx.is_active() || !seen.insert(*tx.id()) {
            continue;
        }
        has_payments = true;

        let sign = match tx.transaction_type() {
            TransactionType::Credit => Decimal::ONE,
            TransactionType::Debit => Decimal::NEGATIVE_ONE,
        };
        received_brl += Money::new(tx.amount().value() * sign);
        if let Some(grams) = tx.gold_amount() {
            equivalent_grams += Grams::new(grams.value() * sign);
        }
    }

    let effective_quotation = if !received_brl.is_zero() && !equivalent_grams.is_zero() {
        received_brl.value() / equivalent_grams.value()
    } else {
        nominal_quotation
    };

    PaymentTotals {
        received_brl,
        equivalent_grams,
        effective_quotation,
        has_payments,
    }
}
