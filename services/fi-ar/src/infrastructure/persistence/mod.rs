//! 持久化实现

mod pg;
mod quotations;
mod rows;
mod settings;

pub use pg::{PgUnitOfWork, PgUnitOfWorkFactory};
pub use quotations::PgQuotationLookup;
pub use settings::PgSettingsLookup;
