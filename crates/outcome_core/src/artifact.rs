//! Persisted pipeline artifacts
//!
//! A training run produces three files, one per stateful component. Each file
//! is a versioned envelope around its payload:
//!
//! - `payload_hash`: Blake3 of the canonical payload JSON, so a hand-edited or
//!   truncated file is rejected on load
//! - `bundle_id`: shared by all three files of one run, so files from
//!   different runs are never mixed
//!
//! Saving serializes every artifact before touching the filesystem, then
//! writes each file to a temporary sibling and renames it into place.

use crate::encoder::GenreEncoder;
use crate::errors::{PipelineError, Result};
use crate::forest::ForestModel;
use crate::scaler::StandardScaler;
use crate::serde_canon::{hash_canonical_hex, to_canonical_json_pretty};
use crate::{feature_vector, FEATURE_COUNT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Envelope format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// The three stateful pipeline components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Encoder,
    Scaler,
    Classifier,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Encoder,
        ArtifactKind::Scaler,
        ArtifactKind::Classifier,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Encoder => "encoder.json",
            ArtifactKind::Scaler => "scaler.json",
            ArtifactKind::Classifier => "classifier.json",
        }
    }
}

/// On-disk wrapper around a single artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    pub format_version: u32,
    pub kind: ArtifactKind,
    pub bundle_id: String,
    pub created_at: String,
    pub payload_hash: String,
    pub payload: T,
}

/// Paths written by [`ModelArtifacts::save`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedBundle {
    pub bundle_id: String,
    pub encoder: PathBuf,
    pub scaler: PathBuf,
    pub classifier: PathBuf,
}

/// Fitted encoder, scaler and classifier of one training run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub encoder: GenreEncoder,
    pub scaler: StandardScaler,
    pub classifier: ForestModel,
}

impl ModelArtifacts {
    pub fn new(encoder: GenreEncoder, scaler: StandardScaler, classifier: ForestModel) -> Self {
        Self {
            encoder,
            scaler,
            classifier,
        }
    }

    /// Encoded and scaled feature vector for a single record
    pub fn prepare(
        &self,
        genre: &str,
        cast_popularity: f64,
        budget: f64,
        release_year: f64,
    ) -> Result<[f64; FEATURE_COUNT]> {
        let code = self.encoder.transform(genre)?;
        let raw = feature_vector(code, cast_popularity, budget, release_year);
        Ok(self.scaler.transform(&raw))
    }

    fn payload_hashes(&self) -> Result<[String; 3]> {
        Ok([
            hash_canonical_hex(&self.encoder)?,
            hash_canonical_hex(&self.scaler)?,
            hash_canonical_hex(&self.classifier)?,
        ])
    }

    /// Identifier shared by the three files of this bundle
    pub fn bundle_id(&self) -> Result<String> {
        Ok(bundle_id_from_hashes(&self.payload_hashes()?))
    }

    /// Write all three artifacts into `dir`
    pub fn save(&self, dir: &Path) -> Result<SavedBundle> {
        let hashes = self.payload_hashes()?;
        let bundle_id = bundle_id_from_hashes(&hashes);
        let created_at = chrono::Utc::now().to_rfc3339();

        let encoded = [
            encode_envelope(ArtifactKind::Encoder, &hashes[0], &bundle_id, &created_at, &self.encoder)?,
            encode_envelope(ArtifactKind::Scaler, &hashes[1], &bundle_id, &created_at, &self.scaler)?,
            encode_envelope(
                ArtifactKind::Classifier,
                &hashes[2],
                &bundle_id,
                &created_at,
                &self.classifier,
            )?,
        ];

        fs::create_dir_all(dir)?;

        let [encoder, scaler, classifier] = ArtifactKind::ALL.map(|kind| dir.join(kind.file_name()));
        for ((kind, path), bytes) in ArtifactKind::ALL
            .iter()
            .zip([&encoder, &scaler, &classifier])
            .zip(encoded.iter())
        {
            write_atomic(dir, path, bytes)?;
            debug!("Wrote {:?} artifact to {}", kind, path.display());
        }

        info!("Saved artifact bundle {} to {}", bundle_id, dir.display());

        Ok(SavedBundle {
            bundle_id,
            encoder,
            scaler,
            classifier,
        })
    }

    /// Load and verify all three artifacts from `dir`.
    ///
    /// Any absent, corrupt, tampered or mismatched file is reported as
    /// [`PipelineError::ArtifactMissing`].
    pub fn load(dir: &Path) -> Result<Self> {
        let (encoder_bundle, encoder): (String, GenreEncoder) =
            load_envelope(dir, ArtifactKind::Encoder)?;
        let (scaler_bundle, scaler): (String, StandardScaler) =
            load_envelope(dir, ArtifactKind::Scaler)?;
        let (classifier_bundle, classifier): (String, ForestModel) =
            load_envelope(dir, ArtifactKind::Classifier)?;

        encoder
            .validate()
            .map_err(|e| PipelineError::artifact_missing(dir.join(ArtifactKind::Encoder.file_name()), e))?;
        scaler
            .validate()
            .map_err(|e| PipelineError::artifact_missing(dir.join(ArtifactKind::Scaler.file_name()), e))?;
        classifier.validate().map_err(|e| {
            PipelineError::artifact_missing(dir.join(ArtifactKind::Classifier.file_name()), e)
        })?;

        if encoder_bundle != scaler_bundle || encoder_bundle != classifier_bundle {
            return Err(PipelineError::artifact_missing(
                dir,
                format!(
                    "artifacts belong to different training runs ({encoder_bundle}, {scaler_bundle}, {classifier_bundle})"
                ),
            ));
        }

        let artifacts = Self::new(encoder, scaler, classifier);
        let expected = artifacts.bundle_id()?;
        if expected != encoder_bundle {
            return Err(PipelineError::artifact_missing(
                dir,
                format!("bundle id {encoder_bundle} does not match payloads ({expected})"),
            ));
        }

        info!(
            "Loaded artifact bundle {} ({} genres, {} trees)",
            encoder_bundle,
            artifacts.encoder.len(),
            artifacts.classifier.num_trees()
        );
        Ok(artifacts)
    }
}

fn bundle_id_from_hashes(hashes: &[String; 3]) -> String {
    let mut hasher = blake3::Hasher::new();
    for hash in hashes {
        hasher.update(hash.as_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

fn encode_envelope<T: Serialize>(
    kind: ArtifactKind,
    payload_hash: &str,
    bundle_id: &str,
    created_at: &str,
    payload: &T,
) -> Result<Vec<u8>> {
    let envelope = ArtifactEnvelope {
        format_version: ARTIFACT_FORMAT_VERSION,
        kind,
        bundle_id: bundle_id.to_string(),
        created_at: created_at.to_string(),
        payload_hash: payload_hash.to_string(),
        payload,
    };
    Ok(to_canonical_json_pretty(&envelope)?)
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;
    Ok(())
}

fn load_envelope<T: DeserializeOwned>(dir: &Path, kind: ArtifactKind) -> Result<(String, T)> {
    let path = dir.join(kind.file_name());
    let missing = |reason: String| PipelineError::artifact_missing(&path, reason);

    let bytes = fs::read(&path).map_err(|e| missing(e.to_string()))?;
    let envelope: ArtifactEnvelope<Value> =
        serde_json::from_slice(&bytes).map_err(|e| missing(format!("corrupt artifact: {e}")))?;

    if envelope.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(missing(format!(
            "unsupported format version {}",
            envelope.format_version
        )));
    }
    if envelope.kind != kind {
        return Err(missing(format!(
            "expected {:?} artifact, found {:?}",
            kind, envelope.kind
        )));
    }

    let actual = hash_canonical_hex(&envelope.payload)?;
    if actual != envelope.payload_hash {
        return Err(missing(format!(
            "payload hash mismatch (expected {}, got {actual})",
            envelope.payload_hash
        )));
    }

    let payload = serde_json::from_value(envelope.payload)
        .map_err(|e| missing(format!("invalid payload: {e}")))?;
    Ok((envelope.bundle_id, payload))
}
