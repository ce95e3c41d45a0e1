//! 销售单状态枚举

use serde::{Deserialize, Serialize};

/// 销售单状态
///
/// 正常流转：Pending → AwaitingSeparation → Separated → Confirmed → Finalized。
/// 结算过程中部分收款会置为 PartiallyPaid；冲销操作回退到 Pending。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SaleStatus {
    /// 待处理
    #[default]
    Pending,
    /// 待分拣
    AwaitingSeparation,
    /// 已分拣
    Separated,
    /// 已确认
    Confirmed,
    /// 部分收款
    PartiallyPaid,
    /// 已完结
    Finalized,
    /// 已取消
    Cancelled,
}

impl SaleStatus {
    /// 是否可以确认
    pub fn can_confirm(&self) -> bool {
        matches!(self, SaleStatus::Pending | SaleStatus::AwaitingSeparation)
    }

    /// 是否可以完结
    pub fn can_finalize(&self) -> bool {
        matches!(
            self,
            SaleStatus::Separated | SaleStatus::Confirmed | SaleStatus::PartiallyPaid
        )
    }

    /// 是否可以冲销回待处理
    pub fn can_revert(&self) -> bool {
        matches!(
            self,
            SaleStatus::Separated
                | SaleStatus::Confirmed
                | SaleStatus::PartiallyPaid
                | SaleStatus::Finalized
        )
    }

    /// 完结后销售单不允许物理删除，只能取消之前的单据
    pub fn can_cancel(&self) -> bool {
        !matches!(self, SaleStatus::Finalized | SaleStatus::Cancelled)
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, SaleStatus::Finalized)
    }
}

impl From<i16> for SaleStatus {
    fn from(value: i16) -> Self {
        match value {
            1 => SaleStatus::Pending,
            2 => SaleStatus::AwaitingSeparation,
            3 => SaleStatus::Separated,
            4 => SaleStatus::Confirmed,
            5 => SaleStatus::PartiallyPaid,
            6 => SaleStatus::Finalized,
            7 => SaleStatus::Cancelled,
            _ => SaleStatus::Pending,
        }
    }
}

impl From<SaleStatus> for i16 {
    fn from(status: SaleStatus) -> Self {
        match status {
            SaleStatus::Pending => 1,
            SaleStatus::AwaitingSeparation => 2,
            SaleStatus::Separated => 3,
            SaleStatus::Confirmed => 4,
            SaleStatus::PartiallyPaid => 5,
            SaleStatus::Finalized => 6,
            SaleStatus::Cancelled => 7,
        }
    }
}
