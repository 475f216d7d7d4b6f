//! Error handling tests

use super::types::FetchError;

// ==================== Classification ====================

#[test]
fn test_retryable_errors() {
    assert!(FetchError::network("connection refused").is_retryable());
    assert!(FetchError::timeout("30s elapsed").is_retryable());
    assert!(FetchError::from_status(503, "unavailable").is_retryable());
}

#[test]
fn test_non_retryable_errors() {
    assert!(!FetchError::from_status(404, "not found").is_retryable());
    assert!(!FetchError::parse("unexpected token").is_retryable());
    assert!(
        !FetchError::RequestFailed {
            url: "https://example.com".to_string(),
            max_retries: 3,
            message: "boom".to_string(),
        }
        .is_retryable()
    );
    assert!(!FetchError::WarmingSkipped("outside window".to_string()).is_retryable());
}

#[test]
fn test_from_status_splits_client_and_server() {
    assert!(matches!(
        FetchError::from_status(429, "slow down"),
        FetchError::ClientError { status: 429, .. }
    ));
    assert!(matches!(
        FetchError::from_status(500, "oops"),
        FetchError::ServerError { status: 500, .. }
    ));
}

// ==================== Codes ====================

#[test]
fn test_error_codes() {
    assert_eq!(FetchError::from_status(404, "x").code(), "HTTP_404");
    assert_eq!(FetchError::from_status(502, "x").code(), "HTTP_502");
    assert_eq!(
        FetchError::PendingTimeout {
            key: "k".to_string(),
            waited_ms: 10,
        }
        .code(),
        "PENDING_TIMEOUT"
    );
    assert_eq!(FetchError::tool_execution("x").code(), "TOOL_EXECUTION_ERROR");
}

#[test]
fn test_status_code_accessor() {
    assert_eq!(FetchError::from_status(418, "teapot").status_code(), Some(418));
    assert_eq!(FetchError::network("down").status_code(), None);
}

// ==================== Display ====================

#[test]
fn test_display_messages() {
    let err = FetchError::ClientError {
        status: 404,
        message: "Not Found".to_string(),
    };
    assert_eq!(err.to_string(), "Client error (HTTP 404): Not Found");

    let err = FetchError::RequestFailed {
        url: "https://git.door43.org/api/v1/catalog/search".to_string(),
        max_retries: 3,
        message: "connection reset".to_string(),
    };
    assert!(err.to_string().contains("after 3 retries"));
}

#[test]
fn test_clone_preserves_equality() {
    let err = FetchError::from_status(500, "down");
    assert_eq!(err.clone(), err);
}

#[test]
fn test_json_error_converts_to_parse() {
    let err: FetchError = serde_json::from_str::<serde_json::Value>("{not json")
        .unwrap_err()
        .into();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[test]
fn test_panic_payload_becomes_internal() {
    let payload = std::panic::catch_unwind(|| -> u8 { panic!("bad row {}", 7) }).unwrap_err();
    let err = FetchError::from_panic("Fetch for notes", payload);
    assert_eq!(
        err,
        FetchError::Internal("Fetch for notes panicked: bad row 7".to_string())
    );

    let err = FetchError::from_panic("Task", Box::new(42u8));
    assert_eq!(err.code(), "INTERNAL_ERROR");
}
