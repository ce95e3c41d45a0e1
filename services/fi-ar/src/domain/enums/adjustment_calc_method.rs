//! 调整核算方法枚举

use serde::{Deserialize, Serialize};

/// 产品（组）的期望产出核算方法
///
/// QuantityBased：期望克重 = 数量 × 单件含金量；
/// CostBased：期望克重 = 销售时成本 × 数量 ÷ 实际收款报价（报价缺失时贡献为零）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SaleAdjustmentCalcMethod {
    #[default]
    QuantityBased,
    CostBased,
}

impl From<i16> for SaleAdjustmentCalcMethod {
    fn from(value: i16) -> Self {
        match value {
            2 => SaleAdjustmentCalcMethod::CostBased,
            _ => SaleAdjustmentCalcMethod::QuantityBased,
        }
    }
}

impl From<SaleAdjustmentCalcMethod> for i16 {
    fn from(method: SaleAdjustmentCalcMethod) -> Self {
        match method {
            SaleAdjustmentCalcMethod::QuantityBased => 1,
            SaleAdjustmentCalcMethod::CostBased => 2,
        }
    }
}
