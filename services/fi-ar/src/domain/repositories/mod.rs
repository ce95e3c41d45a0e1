//! 仓储接口与外部端口

mod account_rec_repository;
mod labor_cost_repository;
mod metal_account_repository;
mod metal_credit_repository;
mod product_repository;
mod pure_metal_lot_repository;
mod quotations;
mod sale_adjustment_repository;
mod sale_installment_repository;
mod sale_repository;
mod settings;
mod transaction_repository;

pub use account_rec_repository::AccountRecRepository;
pub use labor_cost_repository::LaborCostTableRepository;
pub use metal_account_repository::MetalAccountRepository;
pub use metal_credit_repository::MetalCreditRepository;
pub use product_repository::ProductRepository;
pub use pure_metal_lot_repository::PureMetalLotRepository;
pub use quotations::QuotationLookup;
pub use sale_adjustment_repository::SaleAdjustmentRepository;
pub use sale_installment_repository::SaleInstallmentRepository;
pub use sale_repository::SaleRepository;
pub use settings::{SettingsLookup, SettlementAccounts};
pub use transaction_repository::TransactionRepository;
