//! 金属克重值对象

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// 克重结算容差：0.0001 g
///
/// 金属腿的"已结清"判断统一使用该常量。
pub const GRAMS_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// 金属克重
///
/// 内部为任意精度十进制，入库/出参时四舍五入到 4 位小数。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Grams(Decimal);

impl Grams {
    pub const ZERO: Grams = Grams(Decimal::ZERO);

    pub fn new(grams: Decimal) -> Self {
        Self(grams)
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    /// 原始十进制值（保留计算精度）
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// 四舍五入到 4 位小数（入库精度）
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// 余额是否已低于结算容差（视为结清）
    pub fn is_negligible(&self) -> bool {
        self.0 < GRAMS_TOLERANCE
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// 按报价（BRL/g）换算为货币金额
    pub fn value_at(&self, price_per_gram: Decimal) -> crate::Money {
        crate::Money::new(self.0 * price_per_gram)
    }

    /// 在容差范围内是否覆盖目标克重
    pub fn covers(&self, target: Grams) -> bool {
        self.0 >= target.0 - GRAMS_TOLERANCE
    }
}

impl From<Decimal> for Grams {
    fn from(grams: Decimal) -> Self {
        Self(grams)
    }
}

impl Add for Grams {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Grams {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Grams {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Grams {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Grams {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Grams {
    fn sum<I: Iterator<Item = Grams>>(iter: I) -> Self {
        iter.fold(Grams::ZERO, |acc, g| acc + g)
    }
}

impl fmt::Display for Grams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}g", self.rounded())
    }
}
