//! 分期状态枚举

use serde::{Deserialize, Serialize};

/// 销售分期状态
///
/// 只由结算摊销步骤或单期收款置位：Pending → PartiallyPaid → Paid。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SaleInstallmentStatus {
    #[default]
    Pending,
    PartiallyPaid,
    Paid,
}

impl SaleInstallmentStatus {
    /// 是否仍可接受摊销
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            SaleInstallmentStatus::Pending | SaleInstallmentStatus::PartiallyPaid
        )
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, SaleInstallmentStatus::Paid)
    }
}

impl From<i16> for SaleInstallmentStatus {
    fn from(value: i16) -> Self {
        match value {
            1 => SaleInstallmentStatus::Pending,
            2 => SaleInstallmentStatus::PartiallyPaid,
            3 => SaleInstallmentStatus::Paid,
            _ => SaleInstallmentStatus::Pending,
        }
    }
}

impl From<SaleInstallmentStatus> for i16 {
    fn from(status: SaleInstallmentStatus) -> Self {
        match status {
            SaleInstallmentStatus::Pending => 1,
            SaleInstallmentStatus::PartiallyPaid => 2,
            SaleInstallmentStatus::Paid => 3,
        }
    }
}
