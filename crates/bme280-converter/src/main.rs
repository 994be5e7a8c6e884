//! BME280 converter host shim
//!
//! Reads one JSON request per line on stdin and writes one JSON response per
//! line on stdout. Logs go to stderr.

use attribute_codec::{persistence, ProfileRegistry};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod request;

use request::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bme280_converter=debug,attribute_codec=debug,info".into()),
        )
        .init();

    tracing::info!("Starting BME280 converter");

    let mut registry = ProfileRegistry::with_builtins();

    // Extra profile definitions from env
    if let Ok(path) = std::env::var("CONVERTER_PROFILES") {
        for profile in persistence::load_profiles(&PathBuf::from(path)).await {
            registry.register(profile);
        }
    }

    let default_model = std::env::var("CONVERTER_MODEL").ok();
    match &default_model {
        Some(model) => {
            // Fail early on a typo rather than on every request
            registry.resolve(model)?;
            tracing::info!("Default model: {}", model);
        }
        None => tracing::debug!("No default model, requests must name one"),
    }

    tracing::info!("Supported models: {}", registry.models().join(", "));

    let mut session = Session::new(registry, default_model);
    let stdin = BufReader::new(tokio::io::stdin());
    request::serve(&mut session, stdin, tokio::io::stdout()).await?;

    tracing::info!("Input closed, exiting");
    Ok(())
}
