use clap::Parser;
use std::sync::Arc;

use rsa_ops_service::{KeyPair, ServiceConfig, logging, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ServiceConfig::parse();
    logging::init(&config)?;

    // The key pair must exist before any route is reachable
    let keys = match KeyPair::generate() {
        Ok(keys) => Arc::new(keys),
        Err(e) => {
            tracing::error!(error = %e, "cannot start without a key pair");
            return Err(e.into());
        }
    };
    tracing::info!(bits = keys.bits(), "generated RSA key pair");
    tracing::debug!("public key:\n{}", keys.public_key_pem()?);

    server::run(&config, keys).await?;

    Ok(())
}
