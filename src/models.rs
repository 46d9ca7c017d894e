use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

// Request/Response models for RSA operations

// Fields are optional so a missing field is reported as invalid input by the
// handler instead of as a generic JSON rejection.

#[derive(Debug, Deserialize)]
pub struct EncryptRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptResponse {
    pub encrypted: String,
}

#[derive(Debug, Deserialize)]
pub struct DecryptRequest {
    pub encrypted: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub decrypted: String,
}

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignResponse {
    pub signature: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyResponse {
    pub public_key: String,
}

// Model for error responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

// Model for service statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub key_bits: u32,
}
