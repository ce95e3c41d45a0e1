//! 货币金额值对象（BRL）

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// 货币结算容差：0.01 BRL
///
/// 所有"已全额收款"判断必须使用该常量，禁止各处内联魔法数字。
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// 货币金额（BRL）
///
/// 内部为任意精度十进制，入库/出参时四舍五入到 2 位小数。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    /// 原始十进制值（保留计算精度）
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// 四舍五入到 2 位小数（入库精度）
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
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

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// 按报价（BRL/g）换算为克重
    ///
    /// 报价为零或负时返回 None，调用方决定回退策略。
    pub fn to_grams(&self, price_per_gram: Decimal) -> Option<crate::Grams> {
        if price_per_gram <= Decimal::ZERO {
            return None;
        }
        Some(crate::Grams::new(self.0 / price_per_gram))
    }

    /// 在容差范围内是否覆盖目标金额
    pub fn covers(&self, target: Money) -> bool {
        self.0 >= target.0 - MONEY_TOLERANCE
    }

    /// 超出目标金额的部分是否大于容差
    pub fn exceeds_tolerance_over(&self, target: Money) -> bool {
        self.0 - target.0 > MONEY_TOLERANCE
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_tolerance_constant() {
        assert_eq!(MONEY_TOLERANCE, dec("0.01"));
    }

    #[test]
    fn test_covers_within_tolerance() {
        let paid = Money::new(dec("999.995"));
        let owed = Money::new(dec("1000.00"));
        assert!(paid.covers(owed));

        let short = Money::new(dec("999.98"));
        assert!(!short.covers(owed));
    }

    #[test]
    fn test_to_grams() {
        let amount = Money::new(dec("1800.00"));
        let grams = amount.to_grams(dec("300.00")).unwrap();
        assert_eq!(grams.value(), dec("6"));

        assert!(amount.to_grams(Decimal::ZERO).is_none());
        assert!(amount.to_grams(dec("-1")).is_none());
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(Money::new(dec("10.005")).rounded(), dec("10.01"));
        assert_eq!(Money::new(dec("10.004")).rounded(), dec("10.00"));
    }

    #[test]
    fn test_exceeds_tolerance_over() {
        let paid = Money::new(dec("1000.02"));
        let owed = Money::new(dec("1000.00"));
        assert!(paid.exceeds_tolerance_over(owed));

        let within = Money::new(dec("1000.01"));
        assert!(!within.exceeds_tolerance_over(owed));
    }
}
