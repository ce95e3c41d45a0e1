//! 金属台账分录类型枚举

use serde::{Deserialize, Serialize};

/// 金属台账分录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetalAccountEntryType {
    /// 销售收款
    SalePayment,
    /// 客户信用抵扣
    ClientCreditPayment,
    /// 销售冲销返还
    SaleReverted,
    /// 信用转移
    CreditTransfer,
}

impl From<i16> for MetalAccountEntryType {
    fn from(value: i16) -> Self {
        match value {
            2 => MetalAccountEntryType::ClientCreditPayment,
            3 => MetalAccountEntryType::SaleReverted,
            4 => MetalAccountEntryType::CreditTransfer,
            _ => MetalAccountEntryType::SalePayment,
        }
    }
}

impl From<MetalAccountEntryType> for i16 {
    fn from(entry_type: MetalAccountEntryType) -> Self {
        match entry_type {
            MetalAccountEntryType::SalePayment => 1,
            MetalAccountEntryType::ClientCreditPayment => 2,
            MetalAccountEntryType::SaleReverted => 3,
            MetalAccountEntryType::CreditTransfer => 4,
        }
    }
}
