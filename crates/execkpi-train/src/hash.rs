use execkpi_core::errors::{ErrorInfo, KpiError};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

fn encode_error(err: impl ToString) -> KpiError {
    KpiError::Serde(ErrorInfo::new("json-encode", err.to_string()))
}

/// Serializes a payload to canonical JSON bytes.
///
/// The payload is routed through [`Value`] first so map keys come out in
/// sorted order regardless of struct field order at the call site.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, KpiError> {
    let value: Value = serde_json::to_value(value).map_err(encode_error)?;
    serde_json::to_vec(&value).map_err(encode_error)
}

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, KpiError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
