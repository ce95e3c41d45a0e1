//! 付款方式枚举

use serde::{Deserialize, Serialize};

/// 销售单付款方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// 现款现付
    #[default]
    CashUpfront,
    /// 分期（账期）
    Installments,
    /// 信用卡
    CreditCard,
    /// 金属实物
    Metal,
}

impl PaymentMethod {
    /// 确认时是否生成应收账款（分期/信用卡走应收）
    pub fn creates_receivable(&self) -> bool {
        matches!(self, PaymentMethod::Installments | PaymentMethod::CreditCard)
    }
}

impl From<i16> for PaymentMethod {
    fn from(value: i16) -> Self {
        match value {
            1 => PaymentMethod::CashUpfront,
            2 => PaymentMethod::Installments,
            3 => PaymentMethod::CreditCard,
            4 => PaymentMethod::Metal,
            _ => PaymentMethod::CashUpfront,
        }
    }
}

impl From<PaymentMethod> for i16 {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::CashUpfront => 1,
            PaymentMethod::Installments => 2,
            PaymentMethod::CreditCard => 3,
            PaymentMethod::Metal => 4,
        }
    }
}
