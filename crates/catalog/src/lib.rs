mod store;

pub use store::{DirectoryProjectStore, InMemoryProjectStore, ProjectStore};

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use survey::{Fault, Horizon, SliceAxis, SurveyGeometry, Volume, VolumeDims};
use tracing::debug;

pub const PROJECT_VERSION: &str = "1.0";

/// Sample rate used when converting horizon rows to seconds on export.
const EXPORT_SECONDS_PER_SAMPLE: f64 = 0.004;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    Io(String),
    Parse(String),
    UnsupportedVersion { found: String },
    CorruptVolume(String),
    HashMismatch { expected: String, found: String },
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::Io(msg) => write!(f, "project storage error: {msg}"),
            ProjectError::Parse(msg) => write!(f, "invalid project file: {msg}"),
            ProjectError::UnsupportedVersion { found } => write!(
                f,
                "unsupported project version '{found}' (expected {PROJECT_VERSION})"
            ),
            ProjectError::CorruptVolume(msg) => write!(f, "embedded volume corrupt: {msg}"),
            ProjectError::HashMismatch { expected, found } => write!(
                f,
                "embedded volume hash mismatch: expected {expected}, found {found}"
            ),
        }
    }
}

impl std::error::Error for ProjectError {}

/// A volume embedded in a project file: little-endian `f32` samples as base64,
/// with a blake3 hash of the raw bytes for integrity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRecord {
    pub dims: VolumeDims,
    pub sample_rate_ms: f64,
    pub survey_geometry: SurveyGeometry,
    pub samples_base64: String,
    pub content_hash: String,
}

pub fn samples_to_bytes(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 4);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

impl VolumeRecord {
    pub fn from_volume(volume: &Volume) -> Self {
        let bytes = samples_to_bytes(volume.as_slice());
        Self {
            dims: volume.dims(),
            sample_rate_ms: volume.sample_rate_ms(),
            survey_geometry: volume.geometry().clone(),
            content_hash: hash_bytes(&bytes),
            samples_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
        }
    }

    pub fn to_volume(&self) -> Result<Volume, ProjectError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.samples_base64)
            .map_err(|e| ProjectError::CorruptVolume(e.to_string()))?;
        let found = hash_bytes(&bytes);
        if found != self.content_hash {
            return Err(ProjectError::HashMismatch {
                expected: self.content_hash.clone(),
                found,
            });
        }
        if bytes.len() % 4 != 0 {
            return Err(ProjectError::CorruptVolume(format!(
                "payload length {} is not a whole number of samples",
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Volume::new(
            self.dims,
            self.sample_rate_ms,
            self.survey_geometry.clone(),
            samples,
        )
        .map_err(|e| ProjectError::CorruptVolume(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentView {
    pub inline: i32,
    pub crossline: i32,
    pub navigation_mode: SliceAxis,
}

/// A file the user brought into the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedFile {
    /// Content id of the file bytes.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    pub loaded_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub version: String,
    #[serde(default)]
    pub saved_at_ms: u64,
    #[serde(default)]
    pub seismic_volume: Option<VolumeRecord>,
    #[serde(default)]
    pub current_view: Option<CurrentView>,
    #[serde(default)]
    pub horizons: Vec<Horizon>,
    #[serde(default)]
    pub faults: Vec<Fault>,
    #[serde(default)]
    pub loaded_files: Vec<LoadedFile>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            saved_at_ms: 0,
            seismic_volume: None,
            current_view: None,
            horizons: Vec::new(),
            faults: Vec::new(),
            loaded_files: Vec::new(),
        }
    }
}

impl Project {
    pub fn with_volume(mut self, volume: &Volume) -> Self {
        self.seismic_volume = Some(VolumeRecord::from_volume(volume));
        self
    }

    pub fn volume(&self) -> Result<Option<Volume>, ProjectError> {
        self.seismic_volume
            .as_ref()
            .map(VolumeRecord::to_volume)
            .transpose()
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        serde_json::to_string_pretty(self).map_err(|e| ProjectError::Io(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, ProjectError> {
        let project: Project =
            serde_json::from_str(raw).map_err(|e| ProjectError::Parse(e.to_string()))?;
        if project.version != PROJECT_VERSION {
            return Err(ProjectError::UnsupportedVersion {
                found: project.version,
            });
        }
        debug!(
            horizons = project.horizons.len(),
            faults = project.faults.len(),
            has_volume = project.seismic_volume.is_some(),
            "parsed project"
        );
        Ok(project)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedPoint {
    pub x: f64,
    pub y: f64,
    /// Two-way time in seconds.
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedHorizon {
    pub name: String,
    pub points: Vec<ExportedPoint>,
}

pub fn export_horizons(horizons: &[Horizon]) -> Vec<ExportedHorizon> {
    horizons
        .iter()
        .map(|h| ExportedHorizon {
            name: h.name.clone(),
            points: h
                .points
                .iter()
                .map(|p| ExportedPoint {
                    x: p.x,
                    y: p.y,
                    depth: p.y * EXPORT_SECONDS_PER_SAMPLE,
                })
                .collect(),
        })
        .collect()
}

pub fn export_horizons_json(horizons: &[Horizon]) -> Result<String, ProjectError> {
    serde_json::to_string_pretty(&export_horizons(horizons)).map_err(|e| ProjectError::Io(e.to_string()))
}
