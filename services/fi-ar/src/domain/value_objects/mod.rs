//! 值对象模块

mod ids;
mod quote;

pub use ids::*;
pub use quote::QuoteSnapshot;
