//! Integration tests for the logging system

use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use tracing::Level;

#[test]
fn logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(Level::DEBUG);

    // First initialization succeeds; a second attempt in the same process
    // must report a Config error instead of panicking.
    init_logging(config.clone()).expect("first init should succeed");
    assert!(init_logging(config).is_err());

    tracing::info!("logging integration smoke line");
}

#[test]
fn redaction_helpers() {
    assert_eq!(
        redact_if_sensitive("auth_token", "sensitive_value"),
        "[REDACTED]"
    );

    let email = redact_if_sensitive("email", "user@example.com");
    assert!(email.starts_with('u'));
    assert!(!email.contains("example.com"));

    assert_eq!(redact_if_sensitive("track_id", "12345"), "12345");
}
