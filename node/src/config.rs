//! Node configuration: defaults, optional TOML file, `SPARK_*` environment
//! variables, then command line overrides.

use anyhow::{Context, Result};
use clap::ValueEnum;
use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use spark_core::ServiceConfig;
use spark_credential_manager::{CredentialConfig, DurationPolicyKind};
use spark_handle_registry::{ExpiredRenewal, RegistryConfig};
use spark_time::{ManualClock, SharedClock, SystemClock};
use spark_types::{Amount, TimeNs, NANOS_PER_SECOND};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_CONFIG_PATH: &str = "config/spark.toml";
pub const ENV_PREFIX: &str = "SPARK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    System,
    /// Starts at `manual_clock_start_ns` and only moves when scripts advance it.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub registration_fee: u64,
    pub registration_period_secs: u64,
    pub expired_renewal: ExpiredRenewal,
    pub duration_policy: DurationPolicyKind,
    pub default_credential_secs: u64,
    pub max_credential_secs: u64,
    pub seed_demo_data: bool,
    pub clock: ClockMode,
    pub manual_clock_start_ns: u64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        let registry = RegistryConfig::default();
        let credentials = CredentialConfig::default();
        Self {
            registration_fee: registry.registration_fee.units(),
            registration_period_secs: registry.registration_period_ns / NANOS_PER_SECOND,
            expired_renewal: registry.expired_renewal,
            duration_policy: credentials.duration_policy,
            default_credential_secs: credentials.default_lifetime_ns / NANOS_PER_SECOND,
            max_credential_secs: credentials.max_lifetime_ns / NANOS_PER_SECOND,
            seed_demo_data: true,
            clock: ClockMode::System,
            manual_clock_start_ns: 0,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load from `path` (or the default location when present) and the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Like [`Self::load`], but reads environment variables from `env` when
    /// given instead of the process environment.
    pub fn load_from(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let resolved_path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path.to_path_buf())
            }
            None => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|path| path.exists()),
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env));

        let config = builder
            .build()
            .context("failed to assemble configuration sources")?;
        let app: AppConfig = config
            .try_deserialize()
            .context("failed to parse configuration")?;
        Ok(app)
    }

    pub fn apply_overrides(&mut self, log_level: Option<&str>, log_format: Option<LogFormat>) {
        if let Some(level) = log_level {
            self.log_level = level.to_string();
        }
        if let Some(format) = log_format {
            self.log_format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.registration_period_secs == 0 {
            anyhow::bail!("registration_period_secs must be greater than zero");
        }
        if self.default_credential_secs == 0 {
            anyhow::bail!("default_credential_secs must be greater than zero");
        }
        if self.default_credential_secs > self.max_credential_secs {
            anyhow::bail!(
                "default_credential_secs ({}) must not exceed max_credential_secs ({})",
                self.default_credential_secs,
                self.max_credential_secs
            );
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("log_level must not be empty");
        }
        Ok(())
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            registry: RegistryConfig {
                registration_fee: Amount::new(self.registration_fee),
                registration_period_ns: secs_to_nanos(self.registration_period_secs),
                expired_renewal: self.expired_renewal,
            },
            credentials: CredentialConfig {
                duration_policy: self.duration_policy,
                default_lifetime_ns: secs_to_nanos(self.default_credential_secs),
                max_lifetime_ns: secs_to_nanos(self.max_credential_secs),
            },
            seed_demo_data: self.seed_demo_data,
        }
    }

    /// The configured clock. The manual handle is returned separately so
    /// callers can advance it.
    pub fn build_clock(&self) -> (SharedClock, Option<Arc<ManualClock>>) {
        match self.clock {
            ClockMode::System => (SystemClock::shared(), None),
            ClockMode::Manual => {
                let manual = ManualClock::shared(TimeNs(self.manual_clock_start_ns));
                let shared: SharedClock = manual.clone();
                (shared, Some(manual))
            }
        }
    }
}

fn secs_to_nanos(secs: u64) -> u64 {
    secs.saturating_mul(NANOS_PER_SECOND)
}
