use std::sync::Arc;

use anyhow::Context;
use sharenote_app::modules;
use sharenote_kernel::{settings::Settings, ModuleRegistry};
use sharenote_store::AirtableStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load sharenote settings")?;
    sharenote_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        store = ?settings.store,
        "sharenote-site bootstrap starting"
    );

    let store = AirtableStore::from_settings(&settings.store)
        .with_context(|| "failed to build record store client")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(store))?;

    sharenote_http::start_server(&registry, &settings).await
}
