//! User configuration (`config.toml`).
//!
//! Problems with the file never stop the program: they are collected as
//! warnings and the affected keys fall back to their defaults.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use takeoff_core::storage::CsvColumn;
use takeoff_engine::engine::LEGACY_PIXELS_PER_FOOT;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    pixels_per_foot: Option<f64>,
    log_filter: Option<String>,
    csv_columns: Option<Vec<String>>,
    templates: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Scale for pages without a calibration of their own.
    pub pixels_per_foot: f64,
    pub log_filter: String,
    pub csv_columns: Vec<CsvColumn>,
    /// Default template library.
    pub templates: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pixels_per_foot: LEGACY_PIXELS_PER_FOOT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            csv_columns: CsvColumn::ALL.to_vec(),
            templates: None,
        }
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "takeoff")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

fn read_config_file(path: &Path, explicit: bool, warnings: &mut Vec<String>) -> Option<ConfigFile> {
    if !path.exists() {
        if explicit {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return None;
    }
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            None
        }
    }
}

fn apply(file: ConfigFile, base_dir: Option<&Path>, warnings: &mut Vec<String>) -> Config {
    let mut config = Config::default();

    if let Some(ppf) = file.pixels_per_foot {
        if ppf.is_finite() && ppf > 0.0 {
            config.pixels_per_foot = ppf;
        } else {
            warnings.push(format!(
                "pixels_per_foot must be a positive number (got {}); using {}",
                ppf, LEGACY_PIXELS_PER_FOOT
            ));
        }
    }

    if let Some(filter) = file.log_filter.filter(|f| !f.trim().is_empty()) {
        config.log_filter = filter;
    }

    if let Some(ids) = file.csv_columns {
        let mut columns = Vec::new();
        for id in &ids {
            match id.parse::<CsvColumn>() {
                Ok(column) => columns.push(column),
                Err(err) => warnings.push(format!("csv_columns: {}", err)),
            }
        }
        if columns.is_empty() {
            warnings.push("csv_columns selects no columns; exporting all".to_string());
        } else {
            config.csv_columns = columns;
        }
    }

    // Relative library paths are relative to the config file.
    config.templates = file.templates.map(|path| match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    });

    config
}

/// Load `explicit_path`, or the user config when none is given.
pub fn load_config(explicit_path: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let path = explicit_path.map(Path::to_path_buf).or_else(user_config_path);
    let Some(path) = path else {
        return (Config::default(), warnings);
    };

    let config = match read_config_file(&path, explicit_path.is_some(), &mut warnings) {
        Some(file) => apply(file, path.parent(), &mut warnings),
        None => Config::default(),
    };
    (config, warnings)
}
