// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::ConfigError;
use log_batcher::constants as batcher;
use log_batcher::engine::EngineConfig;
use log_batcher::flusher::ExhaustionPolicy;
use log_batcher::retry::RetryStrategy;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_LISTEN_PORT: u16 = 8080;
const DEFAULT_SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);
/// Largest accepted `POST /log` body
pub const MAX_CONTENT_LENGTH: usize = 1024 * 1024;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Anything but `production` is treated as development.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// Records per batch before an early flush
    pub batch_size: usize,
    pub batch_interval: Duration,
    /// Collector receiving the batches
    pub post_endpoint: String,
    pub listen_addr: SocketAddr,
    pub log_level: String,
    /// Exit the process when a batch cannot be delivered, instead of dropping it
    pub exit_on_delivery_failure: bool,
    pub reset_interval_on_flush: bool,
    pub max_pending: usize,
    pub shutdown_grace_period: Duration,
    pub https_proxy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            batch_size: batcher::DEFAULT_BATCH_SIZE,
            batch_interval: batcher::DEFAULT_BATCH_INTERVAL,
            post_endpoint: batcher::DEFAULT_DESTINATION.to_string(),
            listen_addr: default_listen_addr(),
            log_level: Environment::Development.default_log_level().to_string(),
            exit_on_delivery_failure: true,
            reset_interval_on_flush: false,
            max_pending: batcher::DEFAULT_MAX_PENDING,
            shutdown_grace_period: DEFAULT_SHUTDOWN_GRACE_PERIOD,
            https_proxy: None,
        }
    }
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_name(&env::var("ENV").unwrap_or_default());
        let batch_size = parse_var("BATCH_SIZE", batcher::DEFAULT_BATCH_SIZE)?;
        let batch_interval = duration_var("BATCH_INTERVAL", batcher::DEFAULT_BATCH_INTERVAL)?;
        let post_endpoint = env::var("POST_ENDPOINT")
            .unwrap_or_else(|_| batcher::DEFAULT_DESTINATION.to_string());
        let listen_addr = parse_var("LISTEN_ADDR", default_listen_addr())?;
        let log_level = env::var("LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| environment.default_log_level().to_string());
        let exit_on_delivery_failure = bool_var("EXIT_ON_DELIVERY_FAILURE", true)?;
        let reset_interval_on_flush = bool_var("RESET_INTERVAL_ON_FLUSH", false)?;
        let max_pending = parse_var("MAX_PENDING", batcher::DEFAULT_MAX_PENDING)?;
        let shutdown_grace_period =
            duration_var("SHUTDOWN_GRACE_PERIOD", DEFAULT_SHUTDOWN_GRACE_PERIOD)?;
        let https_proxy = env::var("HTTPS_PROXY").ok().filter(|val| !val.is_empty());

        let config = Self {
            environment,
            batch_size,
            batch_interval,
            post_endpoint,
            listen_addr,
            log_level,
            exit_on_delivery_failure,
            reset_interval_on_flush,
            max_pending,
            shutdown_grace_period,
            https_proxy,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Zero("BATCH_SIZE"));
        }
        if self.batch_interval.is_zero() {
            return Err(ConfigError::Zero("BATCH_INTERVAL"));
        }
        if self.max_pending < self.batch_size {
            return Err(ConfigError::MaxPendingBelowBatchSize {
                max_pending: self.max_pending,
                batch_size: self.batch_size,
            });
        }
        let endpoint = self.post_endpoint.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "POST_ENDPOINT",
                value: self.post_endpoint.clone(),
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            batch_size: self.batch_size,
            batch_interval: self.batch_interval,
            destination: self.post_endpoint.clone(),
            max_pending: self.max_pending,
            retry_strategy: RetryStrategy::default(),
            attempt_timeout: batcher::DEFAULT_ATTEMPT_TIMEOUT,
            https_proxy: self.https_proxy.clone(),
            on_exhausted: if self.exit_on_delivery_failure {
                ExhaustionPolicy::Exit
            } else {
                ExhaustionPolicy::Drop
            },
            reset_interval_on_flush: self.reset_interval_on_flush,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_LISTEN_PORT))
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue {
                    key,
                    reason: e.to_string(),
                    value,
                })
        }
        _ => Ok(default),
    }
}

fn bool_var(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key,
                value,
                reason: "expected true or false".to_string(),
            }),
        },
        _ => Ok(default),
    }
}

fn duration_var(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            parse_duration(value.trim()).ok_or_else(|| ConfigError::InvalidValue {
                key,
                value,
                reason: "expected a duration such as 500ms, 10s or 1m30s".to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Parses durations written as a sequence of decimal numbers with a unit suffix: `300ms`,
/// `1.5h`, `2h45m`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0` is
/// accepted.
pub fn parse_duration(input: &str) -> Option<Duration> {
    if input == "0" {
        return Some(Duration::ZERO);
    }
    if input.is_empty() {
        return None;
    }

    let mut nanos = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return None;
        }
        let value: f64 = rest[..number_end].parse().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => return None,
        };
        nanos += value * scale;
        rest = &rest[unit_end..];
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos.round() as u64))
}
