//! fi-ar Service - Accounts Receivable Settlement & Sale Adjustment
//!
//! 应收结算与销售调整：混合收款编排、期望产出核算、收款汇总、
//! 销售调整引擎与应收/分期状态机。

pub mod application;
pub mod domain;
pub mod infrastructure;
