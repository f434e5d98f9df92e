//! Service configuration

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use spark_credential_manager::CredentialConfig;
use spark_handle_registry::RegistryConfig;

/// Everything needed to build a [`crate::SparkService`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub registry: RegistryConfig,
    pub credentials: CredentialConfig,
    /// Register `@spark-demo` and its well-known credential at startup.
    pub seed_demo_data: bool,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.registration_period_ns == 0 {
            return Err(ConfigError::ZeroRegistrationPeriod);
        }
        let credentials = &self.credentials;
        if credentials.default_lifetime_ns == 0 {
            return Err(ConfigError::ZeroDefaultLifetime);
        }
        if credentials.default_lifetime_ns > credentials.max_lifetime_ns {
            return Err(ConfigError::DefaultAboveMax {
                default_ns: credentials.default_lifetime_ns,
                max_ns: credentials.max_lifetime_ns,
            });
        }
        Ok(())
    }
}
