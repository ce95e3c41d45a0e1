//! 纯金属库存批次状态枚举

use serde::{Deserialize, Serialize};

/// 纯金属批次状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PureMetalLotStatus {
    /// 可用
    #[default]
    Available,
    /// 已耗尽
    Depleted,
}

impl From<i16> for PureMetalLotStatus {
    fn from(value: i16) -> Self {
        match value {
            2 => PureMetalLotStatus::Depleted,
            _ => PureMetalLotStatus::Available,
        }
    }
}

impl From<PureMetalLotStatus> for i16 {
    fn from(status: PureMetalLotStatus) -> Self {
        match status {
            PureMetalLotStatus::Available => 1,
            PureMetalLotStatus::Depleted => 2,
        }
    }
}
