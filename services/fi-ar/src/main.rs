//! fi-ar Service - Accounts Receivable Settlement & Sale Adjustment

use std::sync::Arc;

use aurum_bootstrap::{Infrastructure, init_runtime, shutdown_signal};
use aurum_config::AppConfig;
use tracing::info;

use fi_ar::application::{BackfillHandler, SaleLifecycleHandler, SettlementHandler};
use fi_ar::infrastructure::persistence::{
    PgQuotationLookup, PgSettingsLookup, PgUnitOfWorkFactory,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config")?;
    init_runtime(&config);
    let _metrics_handle = aurum_telemetry::init_metrics();

    info!("Initializing fi-ar Service...");
    let infra = Infrastructure::from_config(config).await?;

    let uow_factory = Arc::new(PgUnitOfWorkFactory::new(infra.transaction_manager()));
    let quotations = Arc::new(PgQuotationLookup::new(infra.postgres_pool()));
    let settings = Arc::new(PgSettingsLookup::new(infra.postgres_pool()));

    let _settlement = Arc::new(SettlementHandler::new(
        uow_factory.clone(),
        quotations.clone(),
        settings.clone(),
    ));
    let _lifecycle = Arc::new(SaleLifecycleHandler::new(
        uow_factory.clone(),
        settings.clone(),
    ));
    let _backfill = Arc::new(BackfillHandler::new(uow_factory.clone()));
    info!("Handlers initialized, service ready");

    shutdown_signal().await;
    info!("fi-ar Service stopped");
    Ok(())
}
