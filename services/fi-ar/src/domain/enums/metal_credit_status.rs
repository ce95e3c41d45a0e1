//! 金属信用状态枚举

use serde::{Deserialize, Serialize};

/// 金属信用状态
///
/// 剩余克重低于结算容差（0.0001g）时置为 Paid。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MetalCreditStatus {
    /// 未动用
    #[default]
    Open,
    /// 部分抵扣
    PartiallyPaid,
    /// 已结清
    Paid,
}

impl MetalCreditStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, MetalCreditStatus::Paid)
    }
}

impl From<i16> for MetalCreditStatus {
    fn from(value: i16) -> Self {
        match value {
            1 => MetalCreditStatus::Open,
            2 => MetalCreditStatus::PartiallyPaid,
            3 => MetalCreditStatus::Paid,
            _ => MetalCreditStatus::Open,
        }
    }
}

impl From<MetalCreditStatus> for i16 {
    fn from(status: MetalCreditStatus) -> Self {
        match status {
            MetalCreditStatus::Open => 1,
            MetalCreditStatus::PartiallyPaid => 2,
            MetalCreditStatus::Paid => 3,
        }
    }
}
