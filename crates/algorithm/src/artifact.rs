//! Model artifact persistence
//!
//! A fitted [`SeasonalTrendModel`] is stored as a single binary file:
//!
//! ```text
//! +--------+----------------+------------------------------+
//! | "ACFM" | version u32 LE | bincode(ArtifactEnvelope)    |
//! +--------+----------------+------------------------------+
//! ```
//!
//! The fixed header is checked before any decoding so that foreign files and
//! artifacts written by a newer format are reported as such instead of as
//! generic decode failures.

use crate::seasonal::SeasonalTrendModel;
use crate::Forecaster;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Current artifact format version.
pub const FORMAT_VERSION: u32 = 1;

/// Model kind recorded in every artifact.
pub const MODEL_KIND: &str = "seasonal-trend";

const MAGIC: &[u8; 4] = b"ACFM";
const HEADER_LEN: usize = 8;

/// Errors raised while persisting or restoring a model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {}", .0.display())]
    Missing(PathBuf),

    #[error("model artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("model artifact I/O error: {0}")]
    Io(String),

    #[error("unsupported model artifact version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("model must be fitted before it is persisted")]
    Unfitted,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    model_kind: String,
    /// Unix seconds at save time
    created_at: i64,
    model: SeasonalTrendModel,
}

/// Encode a fitted model into artifact bytes.
pub fn to_bytes(model: &SeasonalTrendModel) -> Result<Vec<u8>, ArtifactError> {
    if !model.is_fitted() {
        return Err(ArtifactError::Unfitted);
    }

    let envelope = ArtifactEnvelope {
        model_kind: MODEL_KIND.to_string(),
        created_at: chrono::Utc::now().timestamp(),
        model: model.clone(),
    };
    let payload = bincode::serialize(&envelope)
        .map_err(|e| ArtifactError::Corrupt(format!("serialization failed: {}", e)))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode artifact bytes into a fitted model.
pub fn from_bytes(bytes: &[u8]) -> Result<SeasonalTrendModel, ArtifactError> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(ArtifactError::Corrupt("not a model artifact".to_string()));
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[4..HEADER_LEN]);
    let found = u32::from_le_bytes(version);
    if found != FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found,
            supported: FORMAT_VERSION,
        });
    }

    let envelope: ArtifactEnvelope = bincode::deserialize(&bytes[HEADER_LEN..])
        .map_err(|e| ArtifactError::Corrupt(e.to_string()))?;
    if envelope.model_kind != MODEL_KIND {
        return Err(ArtifactError::Corrupt(format!(
            "unexpected model kind '{}'",
            envelope.model_kind
        )));
    }
    if envelope.model.seasonal_effects().len() != 12 {
        return Err(ArtifactError::Corrupt(
            "seasonal effects must cover 12 months".to_string(),
        ));
    }
    if !envelope.model.is_fitted() {
        return Err(ArtifactError::Unfitted);
    }

    debug!(created_at = envelope.created_at, "artifact decoded");
    Ok(envelope.model)
}

/// Write a fitted model to `path`.
///
/// The bytes go to a sibling temporary file first and are renamed into
/// place, so readers never observe a half-written artifact.
pub fn save<P: AsRef<Path>>(model: &SeasonalTrendModel, path: P) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    let bytes = to_bytes(model)?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    if let Err(e) = fs::write(&staging, &bytes).and_then(|_| fs::rename(&staging, path)) {
        if let Err(cleanup) = fs::remove_file(&staging) {
            debug!(path = %staging.display(), error = %cleanup, "staging file not removed");
        }
        return Err(ArtifactError::Io(format!("{}: {}", path.display(), e)));
    }

    info!(path = %path.display(), bytes = bytes.len(), "model artifact saved");
    Ok(())
}

/// Read a fitted model from `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SeasonalTrendModel, ArtifactError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactError::Missing(path.to_path_buf()),
        _ => ArtifactError::Io(format!("{}: {}", path.display(), e)),
    })?;

    let model = from_bytes(&bytes)?;
    info!(
        path = %path.display(),
        observations = model.n_observations(),
        "model artifact loaded"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seasonal::SeasonalTrendConfig;
    use data_spi::{month_start, MonthlyObservation};

    fn fitted_model() -> SeasonalTrendModel {
        let history: Vec<_> = (1..=12)
            .map(|m| MonthlyObservation::new(month_start(2020, m).unwrap(), 20.0 + m as f64))
            .collect();
        crate::train(&history, SeasonalTrendConfig::default()).unwrap()
    }

    #[test]
    fn test_bytes_roundtrip_is_exact() {
        let model = fitted_model();
        let restored = from_bytes(&to_bytes(&model).unwrap()).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn test_unfitted_model_is_refused() {
        let model = SeasonalTrendModel::new(SeasonalTrendConfig::default()).unwrap();
        assert_eq!(to_bytes(&model), Err(ArtifactError::Unfitted));
    }

    #[test]
    fn test_foreign_bytes_are_corrupt() {
        assert!(matches!(
            from_bytes(b"PK\x03\x04 definitely not ours"),
            Err(ArtifactError::Corrupt(_))
        ));
        assert!(matches!(from_bytes(b""), Err(ArtifactError::Corrupt(_))));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let bytes = to_bytes(&fitted_model()).unwrap();
        let truncated = &bytes[..bytes.len() - 10];
        assert!(matches!(from_bytes(truncated), Err(ArtifactError::Corrupt(_))));
    }

    #[test]
    fn test_future_version_is_reported() {
        let mut bytes = to_bytes(&fitted_model()).unwrap();
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        assert_eq!(
            from_bytes(&bytes),
            Err(ArtifactError::UnsupportedVersion {
                found: 7,
                supported: FORMAT_VERSION
            })
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");
        assert_eq!(load(&path), Err(ArtifactError::Missing(path)));
    }
}
