//! 枚举模块

mod adjustment_calc_method;
mod installment_status;
mod metal_account_entry_type;
mod metal_credit_status;
mod payment_method;
mod pure_metal_lot_status;
mod sale_status;
mod transaction_type;

pub use adjustment_calc_method::SaleAdjustmentCalcMethod;
pub use installment_status::SaleInstallmentStatus;
pub use metal_account_entry_type::MetalAccountEntryType;
pub use metal_credit_status::MetalCreditStatus;
pub use payment_method::PaymentMethod;
pub use pure_metal_lot_status::PureMetalLotStatus;
pub use sale_status::SaleStatus;
pub use transaction_type::{TransactionStatus, TransactionType};
