// This file allows the components to be used as a library as well
pub mod config;
pub mod error;
pub mod handlers;
pub mod keypair;
pub mod logging;
pub mod models;
pub mod rsa_service;
pub mod server;

// Re-export important types for easier use
pub use config::ServiceConfig;
pub use error::{CryptoError, ErrorKind};
pub use keypair::KeyPair;
pub use models::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KeyResponse, SignRequest,
    SignResponse,
};
pub use rsa_service::RsaService;
