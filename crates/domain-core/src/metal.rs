//! 金属类型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 贵金属类型
///
/// 贸易标的：金、银、铑。数据库以 i16 编码存储。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetalType {
    Gold,
    Silver,
    Rhodium,
}

impl MetalType {
    /// 行情/单据上使用的元素代码
    pub fn code(&self) -> &'static str {
        match self {
            MetalType::Gold => "AU",
            MetalType::Silver => "AG",
            MetalType::Rhodium => "RH",
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            MetalType::Gold => 1,
            MetalType::Silver => 2,
            MetalType::Rhodium => 3,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(MetalType::Gold),
            2 => Some(MetalType::Silver),
            3 => Some(MetalType::Rhodium),
            _ => None,
        }
    }
}

impl fmt::Display for MetalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metal_type_codes_round_trip() {
        for metal in [MetalType::Gold, MetalType::Silver, MetalType::Rhodium] {
            assert_eq!(MetalType::from_i16(metal.as_i16()), Some(metal));
        }
        assert_eq!(MetalType::from_i16(0), None);
    }
}
