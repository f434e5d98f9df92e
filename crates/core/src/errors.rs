//! Error types for building a service

use spark_credential_manager::CredentialError;
use spark_handle_registry::HandleRegistryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("registration period must be greater than zero")]
    ZeroRegistrationPeriod,

    #[error("default credential lifetime must be greater than zero")]
    ZeroDefaultLifetime,

    #[error("default credential lifetime ({default_ns}ns) exceeds the maximum ({max_ns}ns)")]
    DefaultAboveMax { default_ns: u64, max_ns: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to seed demo handle: {0}")]
    DemoRegistration(#[source] HandleRegistryError),

    #[error("failed to seed demo credential: {0}")]
    DemoIssuance(#[source] CredentialError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
