// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::Environment;
use crate::errors::ReceiverError;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Builds the event filter for `level`, with the chatty networking crates turned off.
pub fn env_filter(level: &str) -> Result<EnvFilter, ReceiverError> {
    let directives = format!("h2=off,hyper=off,hyper_util=off,reqwest=off,rustls=off,{level}");
    EnvFilter::try_new(directives).map_err(|e| ReceiverError::Logger(e.to_string()))
}

/// Installs the global subscriber. Development output carries file and line, production
/// output is plain text without colors.
pub fn init(environment: Environment, level: &str) -> Result<(), ReceiverError> {
    let development = environment == Environment::Development;

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter(level)?)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(development)
        .with_file(development)
        .with_target(true)
        .with_ansi(development)
        .finish();

    subscriber
        .try_init()
        .map_err(|e| ReceiverError::Logger(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(env_filter(level).is_ok(), "level {level} should parse");
        }
    }

    #[test]
    fn test_env_filter_silences_networking_crates() {
        let filter = env_filter("debug").expect("valid filter").to_string();
        assert!(filter.contains("hyper=off"));
        assert!(filter.contains("reqwest=off"));
    }

    #[test]
    fn test_env_filter_rejects_garbage() {
        assert!(matches!(
            env_filter("info,receiver=loud"),
            Err(ReceiverError::Logger(_))
        ));
    }
}
