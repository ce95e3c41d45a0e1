//! 应用层

pub mod adjustment;
pub mod backfill;
pub mod commands;
pub mod expected_yield;
pub mod payment_aggregation;
pub mod sale_lifecycle;
pub mod settlement;

pub use adjustment::{AdjustmentEngine, AdjustmentOutcome};
pub use backfill::{BackfillHandler, BackfillSummary};
pub use sale_lifecycle::SaleLifecycleHandler;
pub use settlement::{SettlementHandler, SettlementOutcome};
