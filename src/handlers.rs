use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use std::time::Instant;

use crate::error::CryptoError;
use crate::models::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KeyResponse, SignRequest,
    SignResponse, StatsResponse,
};
use crate::rsa_service::RsaService;

/// Shared state handed to every handler.
pub struct AppState {
    pub service: RsaService,
    pub started: Instant,
}

impl AppState {
    pub fn new(service: RsaService) -> Self {
        Self {
            service,
            started: Instant::now(),
        }
    }
}

// Malformed JSON and wrong field types are caller errors like a missing field
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, CryptoError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| CryptoError::InvalidInput(rejection.body_text()))
}

fn required(value: Option<String>, field: &str) -> Result<String, CryptoError> {
    value.ok_or_else(|| CryptoError::InvalidInput(format!("missing field `{field}`")))
}

pub async fn root() -> &'static str {
    "RSA Cryptographic Operations Service\n\nEndpoints:\n- GET /public-key: Get the public key (PEM)\n- POST /encrypt: Encrypt a message (RSA-OAEP/SHA-256)\n- POST /decrypt: Decrypt a message\n- POST /sign: Sign a message (RSA-PSS/SHA-256)\n- GET /stats: Get service statistics"
}

// Handler to get the public key
pub async fn get_public_key(
    State(state): State<Arc<AppState>>,
) -> Result<Json<KeyResponse>, CryptoError> {
    let start = Instant::now();

    let public_key = state.service.export_public_key()?;

    tracing::debug!(elapsed = ?start.elapsed(), "public_key operation");
    Ok(Json(KeyResponse { public_key }))
}

// Handler to encrypt a text message
pub async fn encrypt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EncryptRequest>, JsonRejection>,
) -> Result<Json<EncryptResponse>, CryptoError> {
    let start = Instant::now();

    let message = required(parse_body(payload)?.message, "message")?;
    let encrypted = state.service.encrypt(&message)?;

    tracing::debug!(elapsed = ?start.elapsed(), bytes = message.len(), "encrypt operation");
    Ok(Json(EncryptResponse { encrypted }))
}

// Handler to decrypt a base64 ciphertext
pub async fn decrypt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DecryptRequest>, JsonRejection>,
) -> Result<Json<DecryptResponse>, CryptoError> {
    let start = Instant::now();

    let encrypted = required(parse_body(payload)?.encrypted, "encrypted")?;
    let decrypted = state.service.decrypt(&encrypted)?;

    tracing::debug!(elapsed = ?start.elapsed(), "decrypt operation");
    Ok(Json(DecryptResponse { decrypted }))
}

// Handler to sign a text message
pub async fn sign(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> Result<Json<SignResponse>, CryptoError> {
    let start = Instant::now();

    let message = required(parse_body(payload)?.message, "message")?;
    let signature = state.service.sign(&message)?;

    tracing::debug!(elapsed = ?start.elapsed(), "sign operation");
    Ok(Json(SignResponse { signature }))
}

// Service health check and statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        key_bits: state.service.keys().bits(),
    })
}
