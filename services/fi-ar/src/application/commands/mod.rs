//! 命令模块

mod lifecycle_commands;
mod settlement_commands;

pub use lifecycle_commands::{ConfirmSaleCommand, InstallmentPlan};
pub use settlement_commands::{
    HybridSettlementCommand, PaymentLeg, ReceiveInstallmentCommand, SinglePayment,
};
