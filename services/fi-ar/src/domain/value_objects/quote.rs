//! 金属报价快照

use aurum_domain_core::MetalType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 行情查询返回的报价快照（BRL/g）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub metal: MetalType,
    pub date: DateTime<Utc>,
    /// 买入价（收款按买入价折算）
    pub buy_price: Decimal,
    /// 卖出价
    pub sell_price: Decimal,
}

impl QuoteSnapshot {
    /// 买入价是否可用于结算折算
    pub fn has_usable_buy_price(&self) -> bool {
        self.buy_price > Decimal::ZERO
    }
}
