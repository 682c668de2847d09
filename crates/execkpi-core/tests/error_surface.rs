use execkpi_core::{ErrorInfo, KpiError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("table", "features_conversion")
        .with_context("reason", "validation")
}

#[test]
fn invalid_input_error_surface() {
    let err = KpiError::InvalidInput(sample_info("zero-total", "group total must be positive"));
    assert_eq!(err.info().code, "zero-total");
    assert!(err.info().context.contains_key("table"));
}

#[test]
fn schema_error_surface() {
    let err = KpiError::Schema(sample_info("missing-target", "target column not found"));
    assert_eq!(err.info().code, "missing-target");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn training_error_surface() {
    let err = KpiError::Training(sample_info("no-candidates", "no candidate fit"));
    assert_eq!(err.info().code, "no-candidates");
}

#[test]
fn artifact_not_found_is_distinguishable() {
    let err = KpiError::Artifact(ErrorInfo::new("not-found", "no snapshot written yet"));
    assert!(err.is_not_found());

    let other = KpiError::Artifact(ErrorInfo::new("read-failed", "corrupt file"));
    assert!(!other.is_not_found());
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = KpiError::Source(sample_info("source-unavailable", "all candidates exhausted"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Source");
    assert_eq!(json["detail"]["code"], "source-unavailable");

    let decoded: KpiError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}
