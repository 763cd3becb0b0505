use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use catalog::{
    CurrentView, DirectoryProjectStore, LoadedFile, Project, ProjectStore, export_horizons_json,
};
use clap::{Args, Parser, Subcommand};
use compute::autopick::{FaultDetectParams, HorizonPickParams, auto_pick_horizons, detect_faults};
use compute::{
    AttributeKind, AttributeResult, MapMode, MapRequest, compute_attribute, extract_amplitude,
    generate_map,
};
use formats::segy::encode_segy;
use foundation::Grid;
use runtime::SliceSession;
use serde::Serialize;
use serde_json::json;
use survey::{Horizon, Slice, SliceAxis, VolumeDims, synthetic::pstm_line};
use tools::config::EnvConfig;
use tools::source::{BoxError, LoadedSurvey, decode_lenient, load_segy, synthetic};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Seismic volume, attribute and map tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// SEG-Y file to load; a seeded synthetic survey is used when omitted
    #[arg(long)]
    segy: Option<PathBuf>,

    /// Seed for synthetic data (default: $SEIS_SEED or 0)
    #[arg(long)]
    seed: Option<u64>,

    /// Synthetic survey size: inlines x crosslines x samples
    #[arg(long, default_value = "50x50x600")]
    dims: String,
}

#[derive(Args, Debug, Clone)]
struct LineArgs {
    /// inline or crossline
    #[arg(long, default_value = "inline")]
    axis: SliceAxis,

    /// Line number; defaults to the middle line of the axis
    #[arg(long)]
    line: Option<i32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a synthetic survey (or a single 2-D line) as SEG-Y
    Synth {
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        source: SourceArgs,
        /// Emit the 2-D demo line instead of a 3-D volume
        #[arg(long)]
        line: bool,
    },

    /// Summarize a SEG-Y file
    Inspect { path: PathBuf },

    /// Extract one inline/crossline slice
    Slice {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        line: LineArgs,
        /// Write the slice grid as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compute an attribute on a slice
    Attribute {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        line: LineArgs,
        /// coherence, curvature, rms, max-magnitude or dip-azimuth
        #[arg(long)]
        kind: AttributeKind,
        /// Vertical window in samples (default: $SEIS_WINDOW_SIZE or 25)
        #[arg(long)]
        window: Option<usize>,
        /// Interval velocity in m/s (default: $SEIS_VELOCITY_MPS or 2000)
        #[arg(long)]
        velocity: Option<f64>,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Interpolate a structure or isochron map from picked horizons
    Map {
        /// JSON array of horizons, or a project file
        horizons: PathBuf,
        #[arg(long, default_value = "structure")]
        mode: MapMode,
        #[arg(long, default_value_t = 400)]
        width: usize,
        #[arg(long, default_value_t = 300)]
        height: usize,
        #[arg(long, default_value_t = 12)]
        contours: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the seeded horizon and fault heuristics on a slice
    Autopick {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        line: LineArgs,
        #[arg(long, default_value_t = 3)]
        horizons: usize,
        /// Also print the amplitude under each picked point
        #[arg(long)]
        amplitudes: bool,
    },

    /// Save, list, show and export projects
    Project {
        /// Directory holding project files
        #[arg(long, default_value = "projects")]
        dir: PathBuf,
        #[command(subcommand)]
        action: ProjectAction,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectAction {
    /// Save a project with the survey, the current view and auto-picked interpretation
    Save {
        name: String,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        line: LineArgs,
        /// Leave the volume out of the project file
        #[arg(long)]
        no_volume: bool,
    },
    List,
    Show { name: String },
    /// Write the project's horizons as {name, points:[{x, y, depth}]}
    ExportHorizons {
        name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Delete { name: String },
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = EnvConfig::from_env();

    match cli.command {
        Command::Synth { out, source, line } => cmd_synth(&out, &source, line, &config),
        Command::Inspect { path } => cmd_inspect(&path),
        Command::Slice { source, line, out } => cmd_slice(&source, &line, out.as_deref(), &config),
        Command::Attribute {
            source,
            line,
            kind,
            window,
            velocity,
            out,
        } => {
            let mut config = config;
            if let Some(w) = window {
                config.window_size = w;
            }
            if let Some(v) = velocity {
                config.velocity_mps = v;
            }
            cmd_attribute(&source, &line, kind, out.as_deref(), &config)
        }
        Command::Map {
            horizons,
            mode,
            width,
            height,
            contours,
            out,
        } => {
            let mut request = MapRequest::new(mode).with_grid(width, height);
            request.contour_intervals = contours;
            cmd_map(&horizons, &request, out.as_deref())
        }
        Command::Autopick {
            source,
            line,
            horizons,
            amplitudes,
        } => cmd_autopick(&source, &line, horizons, amplitudes, &config),
        Command::Project { dir, action } => cmd_project(&dir, action, &config),
    }
}

fn parse_dims(raw: &str) -> Result<VolumeDims, BoxError> {
    let parts: Vec<&str> = raw.split('x').collect();
    let [il, xl, ns] = parts.as_slice() else {
        return Err(format!("dims must look like 50x50x600, got '{raw}'").into());
    };
    let dims = VolumeDims::new(il.trim().parse()?, xl.trim().parse()?, ns.trim().parse()?);
    if dims.is_empty() {
        return Err("dims must be non-zero".into());
    }
    if dims.checked_len().is_none() {
        return Err(format!("dims '{raw}' are too large").into());
    }
    Ok(dims)
}

fn load_source(source: &SourceArgs, config: &EnvConfig) -> Result<LoadedSurvey, BoxError> {
    match &source.segy {
        Some(path) => load_segy(path),
        None => Ok(synthetic(
            parse_dims(&source.dims)?,
            source.seed.unwrap_or(config.seed),
        )),
    }
}

/// Opens a navigation session and moves to the requested line.
fn open_slice(
    source: &SourceArgs,
    line: &LineArgs,
    config: &EnvConfig,
) -> Result<(LoadedSurvey, SliceSession), BoxError> {
    let loaded = load_source(source, config)?;
    let mut session = SliceSession::new(loaded.assembled.volume.clone());
    match line.line {
        Some(n) => session.navigate(line.axis, n)?,
        None => session.set_mode(line.axis)?,
    };
    Ok((loaded, session))
}

fn current_slice(session: &SliceSession) -> Result<&Slice, BoxError> {
    session
        .current_slice()
        .ok_or_else(|| "volume has no slice to show".into())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Serialize)]
struct GridOut<'a, T> {
    width: usize,
    height: usize,
    data: &'a [T],
}

fn write_grid<T: Serialize>(path: &Path, grid: &Grid<T>) -> Result<(), BoxError> {
    let payload = serde_json::to_string(&GridOut {
        width: grid.width(),
        height: grid.height(),
        data: grid.as_slice(),
    })?;
    fs::write(path, payload).map_err(|e| format!("write {}: {e}", path.display()))?;
    info!(path = %path.display(), "wrote grid");
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_synth(out: &Path, source: &SourceArgs, line: bool, config: &EnvConfig) -> Result<(), BoxError> {
    let seed = source.seed.unwrap_or(config.seed);
    let segy = if line {
        let section = pstm_line(seed);
        section.to_segy(format!("C 1 {} seed {seed}", section.name))
    } else {
        let survey = synthetic(parse_dims(&source.dims)?, seed);
        survey
            .assembled
            .volume
            .to_segy(format!("C 1 synthetic 3D survey seed {seed}"))
    };
    let bytes = encode_segy(&segy)?;
    fs::write(out, &bytes).map_err(|e| format!("write {}: {e}", out.display()))?;
    print_json(&json!({
        "path": out.display().to_string(),
        "traces": segy.traces.len(),
        "bytes": bytes.len(),
        "contentId": formats::segy::content_id(&bytes),
    }))
}

fn cmd_inspect(path: &Path) -> Result<(), BoxError> {
    let bytes = fs::read(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    let file = decode_lenient(&bytes)?;
    let header = file.binary_header;
    let first_trace = file.traces.first().map(|t| t.header);
    let loaded = load_segy(path)?;
    let volume = &loaded.assembled.volume;
    print_json(&json!({
        "contentId": loaded.content_id,
        "kind": if loaded.line.is_some() { "2d-line" } else { "3d-volume" },
        "lineName": loaded.line.as_ref().map(|l| l.name.as_str()),
        "bytes": loaded.file_len,
        "textHeader": file.text_header.trim_end(),
        "traces": file.traces.len(),
        "samplesPerTrace": header.samples_per_trace,
        "sampleIntervalMs": header.sample_interval_ms(),
        "dataFormat": header.data_format,
        "firstTrace": first_trace.map(|h| json!({
            "traceNumber": h.trace_number,
            "inline": h.inline,
            "crossline": h.crossline,
        })),
        "inlines": volume.dims().inline_range(),
        "crosslines": volume.dims().crossline_range(),
        "timeRangeMs": volume.time_range_ms(),
        "missingCells": loaded.assembled.missing_cells,
    }))
}

fn cmd_slice(
    source: &SourceArgs,
    line: &LineArgs,
    out: Option<&Path>,
    config: &EnvConfig,
) -> Result<(), BoxError> {
    let (loaded, session) = open_slice(source, line, config)?;
    let slice = current_slice(&session)?;
    if let Some(path) = out {
        write_grid(path, &slice.data)?;
    }
    print_json(&json!({
        "name": slice.name(),
        "section": loaded.line.as_ref().map(|l| l.name.as_str()),
        "axis": slice.axis,
        "line": slice.line_number,
        "width": slice.width(),
        "height": slice.height(),
        "direction": slice.direction,
        "azimuth": slice.azimuth,
        "displayWidth": slice.display_width,
        "displayHeight": slice.display_height,
    }))
}

fn cmd_attribute(
    source: &SourceArgs,
    line: &LineArgs,
    kind: AttributeKind,
    out: Option<&Path>,
    config: &EnvConfig,
) -> Result<(), BoxError> {
    let (_, session) = open_slice(source, line, config)?;
    let slice = current_slice(&session)?;
    let params = config.attribute_params(slice.sample_rate_ms);
    let result = compute_attribute(kind, &slice.data, &params);
    if let Some(path) = out {
        write_grid(path, result.grid())?;
    }

    let grid = result.grid();
    let mut summary = json!({
        "attribute": kind.as_str(),
        "slice": slice.name(),
        "width": grid.width(),
        "height": grid.height(),
    });
    let stats = match &result {
        AttributeResult::Coherence(_) | AttributeResult::Curvature(_) => json!(null),
        AttributeResult::Rms(r) => json!({
            "average": r.average,
            "maximum": r.maximum,
            "windowSize": r.window_size,
        }),
        AttributeResult::MaxMagnitude(r) => json!({
            "peakAmplitude": r.peak_amplitude,
            "peakTrace": r.peak_trace,
            "peakDepth": r.peak_depth,
            "polarity": r.polarity,
            "contrast": r.contrast,
        }),
        AttributeResult::DipAzimuth(r) => json!({
            "averageDip": r.average_dip,
            "maxDip": r.max_dip,
            "dominantAzimuth": r.dominant_azimuth,
            "structuralTrend": r.structural_trend(),
        }),
    };
    summary["stats"] = stats;
    print_json(&summary)
}

fn read_horizons(path: &Path) -> Result<Vec<Horizon>, BoxError> {
    let raw = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    if raw.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(&raw)?);
    }
    Ok(Project::from_json(&raw)?.horizons)
}

fn cmd_map(path: &Path, request: &MapRequest, out: Option<&Path>) -> Result<(), BoxError> {
    let horizons = read_horizons(path)?;
    let map = generate_map(&horizons, request)?;
    if let Some(path) = out {
        write_grid(path, &map.grid)?;
    }
    print_json(&json!({
        "type": request.mode.to_string(),
        "stats": map.stats,
        "levels": map.levels,
        "contourLines": map.contours.len(),
    }))
}

fn pick_slice(
    slice: &Slice,
    num_horizons: usize,
    seed: u64,
) -> (Vec<Horizon>, Vec<survey::Fault>) {
    let horizons = auto_pick_horizons(
        &slice.data,
        &HorizonPickParams {
            num_horizons,
            seed,
            ..HorizonPickParams::default()
        },
    );
    let faults = detect_faults(
        &slice.data,
        &FaultDetectParams {
            seed,
            ..FaultDetectParams::default()
        },
    );
    (horizons, faults)
}

fn cmd_autopick(
    source: &SourceArgs,
    line: &LineArgs,
    num_horizons: usize,
    amplitudes: bool,
    config: &EnvConfig,
) -> Result<(), BoxError> {
    let (_, session) = open_slice(source, line, config)?;
    let slice = current_slice(&session)?;
    let seed = source.seed.unwrap_or(config.seed);
    let (horizons, faults) = pick_slice(slice, num_horizons, seed);
    let amps: Vec<Vec<f32>> = if amplitudes {
        horizons
            .iter()
            .map(|h| extract_amplitude(&h.points, &slice.data))
            .collect()
    } else {
        Vec::new()
    };
    print_json(&json!({
        "slice": slice.name(),
        "horizons": horizons,
        "faults": faults,
        "amplitudes": amps,
    }))
}

fn cmd_project(dir: &Path, action: ProjectAction, config: &EnvConfig) -> Result<(), BoxError> {
    let mut store = DirectoryProjectStore::new(dir)?;
    match action {
        ProjectAction::Save {
            name,
            source,
            line,
            no_volume,
        } => {
            let (loaded, session) = open_slice(&source, &line, config)?;
            let slice = current_slice(&session)?;
            let (horizons, faults) = pick_slice(slice, 3, source.seed.unwrap_or(config.seed));
            let mut project = Project {
                saved_at_ms: now_ms(),
                current_view: Some(CurrentView {
                    inline: session.inline(),
                    crossline: session.crossline(),
                    navigation_mode: session.mode(),
                }),
                horizons,
                faults,
                ..Project::default()
            };
            if let (Some(id), Some(path)) = (&loaded.content_id, &source.segy) {
                project.loaded_files.push(LoadedFile {
                    id: id.clone(),
                    name: path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("survey.sgy")
                        .to_string(),
                    kind: "segy".to_string(),
                    size: loaded.file_len,
                    loaded_at_ms: now_ms(),
                });
            }
            if !no_volume {
                project = project.with_volume(session.volume());
            }
            store.save(&name, &project)?;
            print_json(&json!({ "saved": name, "dir": dir.display().to_string() }))
        }
        ProjectAction::List => print_json(&store.list()?),
        ProjectAction::Show { name } => {
            let project = store
                .load(&name)?
                .ok_or_else(|| format!("no project named '{name}'"))?;
            let volume = project.volume()?;
            let view = match (&volume, project.current_view) {
                (Some(v), Some(view)) => {
                    let mut session = SliceSession::new(v.clone());
                    session
                        .restore(view.navigation_mode, view.inline, view.crossline)
                        .ok()
                        .map(|s| s.name())
                }
                _ => None,
            };
            print_json(&json!({
                "name": name,
                "version": project.version,
                "savedAtMs": project.saved_at_ms,
                "volume": volume.as_ref().map(|v| json!({
                    "inlines": v.dims().inline_range(),
                    "crosslines": v.dims().crossline_range(),
                    "samples": v.num_samples(),
                })),
                "view": view,
                "horizons": project.horizons.iter().map(|h| &h.name).collect::<Vec<_>>(),
                "faults": project.faults.iter().map(|f| &f.name).collect::<Vec<_>>(),
                "files": project.loaded_files,
            }))
        }
        ProjectAction::ExportHorizons { name, out } => {
            let project = store
                .load(&name)?
                .ok_or_else(|| format!("no project named '{name}'"))?;
            let payload = export_horizons_json(&project.horizons)?;
            match out {
                Some(path) => {
                    fs::write(&path, payload).map_err(|e| format!("write {}: {e}", path.display()))?;
                    info!(path = %path.display(), "exported horizons");
                    Ok(())
                }
                None => {
                    println!("{payload}");
                    Ok(())
                }
            }
        }
        ProjectAction::Delete { name } => {
            let removed = store.delete(&name)?;
            print_json(&json!({ "deleted": removed }))
        }
    }
}
