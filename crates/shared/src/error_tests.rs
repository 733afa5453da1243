use super::*;
use rstest::rstest;

#[rstest]
#[case(AppError::NotFound("/api/v1/nope".into()), 404, "NOT_FOUND")]
#[case(AppError::Validation("page must be a number".into()), 400, "VALIDATION_ERROR")]
#[case(AppError::Internal("bad row".into()), 500, "INTERNAL_ERROR")]
fn test_app_error_mapping(#[case] error: AppError, #[case] status: u16, #[case] code: &str) {
    assert_eq!(error.status_code(), status);
    assert_eq!(error.error_code(), code);
}

#[test]
fn test_only_internal_is_server_error() {
    assert!(AppError::Internal("bug".into()).is_server_error());
    assert!(!AppError::Validation("bad".into()).is_server_error());
    assert!(!AppError::NotFound("gone".into()).is_server_error());
}

#[test]
fn test_app_error_display() {
    assert_eq!(AppError::NotFound("msg".into()).to_string(), "Not found: msg");
    assert_eq!(
        AppError::Validation("msg".into()).to_string(),
        "Validation error: msg"
    );
    assert_eq!(
        AppError::Internal("msg".into()).to_string(),
        "Internal error: msg"
    );
}
