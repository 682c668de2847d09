//! Snapshot artifact store.
//!
//! Every training run persists a snapshot: the fitted model, the column
//! contract, the full metrics report, optional feature importance and the
//! run provenance. The store keeps exactly one live snapshot under
//! `<root>/latest`; a save writes everything into a staging directory first
//! and swaps it in whole, so readers never observe a half-written snapshot
//! and the last writer wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use execkpi_core::errors::{ErrorInfo, KpiError};
use execkpi_core::provenance::RunProvenance;
use execkpi_train::{MetricsReport, TrainedArtifactBundle, TrainedModel};
use serde::de::DeserializeOwned;
use serde::Serialize;

const LATEST_DIR: &str = "latest";
const MODEL_FILE: &str = "model.bin";
const COLUMNS_FILE: &str = "columns.json";
const METRICS_FILE: &str = "metrics.json";
const IMPORTANCE_FILE: &str = "importance.json";
const PROVENANCE_FILE: &str = "provenance.json";

fn io_error(message: &str, path: &Path, err: std::io::Error) -> KpiError {
    KpiError::Artifact(
        ErrorInfo::new("snapshot-io", format!("{}: {}", message, err))
            .with_context("path", path.display().to_string()),
    )
}

fn codec_error(message: impl Into<String>, path: &Path) -> KpiError {
    KpiError::Artifact(
        ErrorInfo::new("snapshot-codec", message.into())
            .with_context("path", path.display().to_string()),
    )
}

/// Locations of the files making up one persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    /// Snapshot directory holding all files below.
    pub dir: PathBuf,
    /// Binary-encoded fitted model.
    pub model: PathBuf,
    /// Ordered feature column contract.
    pub columns: PathBuf,
    /// Full candidate metrics report.
    pub metrics: PathBuf,
    /// Ranked feature importance; absent when the run produced none.
    pub importance: Option<PathBuf>,
    /// Run provenance record.
    pub provenance: PathBuf,
}

/// A snapshot read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    /// The reassembled artifact set.
    pub bundle: TrainedArtifactBundle,
    /// Provenance of the run that produced it.
    pub provenance: RunProvenance,
}

/// Filesystem store holding the single live model snapshot.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at the given directory. Nothing is touched on
    /// disk until the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn latest_dir(&self) -> PathBuf {
        self.root.join(LATEST_DIR)
    }

    fn scratch_dir(&self, prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or(0);
        self.root.join(format!(".{}-{}", prefix, nanos))
    }

    /// Persists a snapshot, replacing any previous one whole.
    pub fn save(
        &self,
        bundle: &TrainedArtifactBundle,
        provenance: &RunProvenance,
    ) -> Result<SnapshotPaths, KpiError> {
        fs::create_dir_all(&self.root)
            .map_err(|err| io_error("create store root", &self.root, err))?;
        let staging = self.scratch_dir("staging");
        fs::create_dir_all(&staging)
            .map_err(|err| io_error("create staging dir", &staging, err))?;

        let result = self.write_snapshot(&staging, bundle, provenance);
        if result.is_err() {
            let _ = fs::remove_dir_all(&staging);
            result?;
        }

        // The previous snapshot is renamed aside rather than deleted before
        // the swap, so `latest/` stays visible to readers at every point
        // between the first save and this one.
        let latest = self.latest_dir();
        let retired = self.scratch_dir("retired");
        let had_previous = latest.exists();
        if had_previous {
            fs::rename(&latest, &retired)
                .map_err(|err| io_error("retire previous snapshot", &latest, err))?;
        }
        if let Err(err) = fs::rename(&staging, &latest) {
            if had_previous {
                let _ = fs::rename(&retired, &latest);
            }
            return Err(io_error("activate snapshot", &staging, err));
        }
        if had_previous {
            fs::remove_dir_all(&retired)
                .map_err(|err| io_error("discard retired snapshot", &retired, err))?;
        }

        Ok(SnapshotPaths {
            model: latest.join(MODEL_FILE),
            columns: latest.join(COLUMNS_FILE),
            metrics: latest.join(METRICS_FILE),
            importance: bundle
                .importance
                .is_some()
                .then(|| latest.join(IMPORTANCE_FILE)),
            provenance: latest.join(PROVENANCE_FILE),
            dir: latest,
        })
    }

    fn write_snapshot(
        &self,
        dir: &Path,
        bundle: &TrainedArtifactBundle,
        provenance: &RunProvenance,
    ) -> Result<(), KpiError> {
        let model_path = dir.join(MODEL_FILE);
        let model_bytes = bincode::serialize(&bundle.model)
            .map_err(|err| codec_error(err.to_string(), &model_path))?;
        fs::write(&model_path, model_bytes)
            .map_err(|err| io_error("write model", &model_path, err))?;

        write_json(&dir.join(COLUMNS_FILE), &bundle.feature_columns)?;
        write_json(&dir.join(METRICS_FILE), &bundle.metrics)?;
        if let Some(ref importance) = bundle.importance {
            write_json(&dir.join(IMPORTANCE_FILE), importance)?;
        }
        write_json(&dir.join(PROVENANCE_FILE), provenance)?;
        Ok(())
    }

    /// Reads back the live snapshot.
    ///
    /// Returns an `Artifact` error with code `not-found` when no snapshot
    /// has ever been saved; [`KpiError::is_not_found`] detects that case.
    pub fn load_latest(&self) -> Result<StoredSnapshot, KpiError> {
        let latest = self.latest_dir();
        if !latest.exists() {
            return Err(KpiError::Artifact(
                ErrorInfo::new("not-found", "no snapshot has been saved")
                    .with_context("path", latest.display().to_string())
                    .with_hint("run training at least once before loading"),
            ));
        }

        let model_path = latest.join(MODEL_FILE);
        let model_bytes =
            fs::read(&model_path).map_err(|err| io_error("read model", &model_path, err))?;
        let model: TrainedModel = bincode::deserialize(&model_bytes)
            .map_err(|err| codec_error(err.to_string(), &model_path))?;

        let feature_columns: Vec<String> = read_json(&latest.join(COLUMNS_FILE))?;
        let metrics: MetricsReport = read_json(&latest.join(METRICS_FILE))?;
        let importance_path = latest.join(IMPORTANCE_FILE);
        let importance = if importance_path.exists() {
            Some(read_json(&importance_path)?)
        } else {
            None
        };
        let provenance: RunProvenance = read_json(&latest.join(PROVENANCE_FILE))?;

        Ok(StoredSnapshot {
            bundle: TrainedArtifactBundle {
                model,
                feature_columns,
                metrics,
                importance,
            },
            provenance,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), KpiError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| codec_error(err.to_string(), path))?;
    fs::write(path, bytes).map_err(|err| io_error("write snapshot file", path, err))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, KpiError> {
    let bytes = fs::read(path).map_err(|err| io_error("read snapshot file", path, err))?;
    serde_json::from_slice(&bytes).map_err(|err| codec_error(err.to_string(), path))
}
