use std::fs;
use std::path::Path;

use formats::segy::{SegyFile, content_id, whole_trace_prefix};
use survey::{AssembledVolume, SegyImport, Section, SyntheticSurvey, VolumeDims};
use tracing::{info, warn};

pub type BoxError = Box<dyn std::error::Error>;

/// A volume plus where it came from.
#[derive(Debug)]
pub struct LoadedSurvey {
    pub assembled: AssembledVolume,
    /// Content id of the SEG-Y bytes, `None` for synthetic volumes.
    pub content_id: Option<String>,
    pub file_len: u64,
    /// Set when the file was a single 2-D line; `assembled` then holds it
    /// as inline 1.
    pub line: Option<Section>,
}

/// Decodes SEG-Y bytes, dropping any partial trace at the end.
pub fn decode_lenient(bytes: &[u8]) -> Result<SegyFile, BoxError> {
    let whole = whole_trace_prefix(bytes)?;
    if whole.len() < bytes.len() {
        warn!(
            dropped_bytes = bytes.len() - whole.len(),
            "ignoring truncated trailing trace"
        );
    }
    Ok(SegyFile::from_bytes(whole)?)
}

pub fn load_segy(path: &Path) -> Result<LoadedSurvey, BoxError> {
    let bytes = fs::read(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    let file = decode_lenient(&bytes)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("line")
        .to_string();
    let import = SegyImport::from_segy(file, name)?;
    let line = match &import {
        SegyImport::Line(section) => Some(section.clone()),
        SegyImport::Volume(_) => None,
    };
    let assembled = import.into_assembled()?;
    info!(
        path = %path.display(),
        missing_cells = assembled.missing_cells,
        two_d = line.is_some(),
        "loaded survey"
    );
    Ok(LoadedSurvey {
        assembled,
        content_id: Some(content_id(&bytes)),
        file_len: bytes.len() as u64,
        line,
    })
}

pub fn synthetic(dims: VolumeDims, seed: u64) -> LoadedSurvey {
    let volume = SyntheticSurvey::default()
        .with_dims(dims)
        .with_seed(seed)
        .generate();
    LoadedSurvey {
        assembled: AssembledVolume {
            volume,
            missing_cells: 0,
        },
        content_id: None,
        file_len: 0,
        line: None,
    }
}
