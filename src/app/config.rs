use crate::app::cli::Cli;
use crate::app::models::{InputMode, InventoryConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_NAME: &str = "data_inventory.csv";
pub const DEFAULT_PATTERNS: [&str; 3] = ["*.gdb", "*.gdb.zip", "*.shp"];
pub const DEFAULT_OGRINFO: &str = "ogrinfo";

/// Optional overrides read from config.toml. Every key may be omitted.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub input_directory: Option<String>,
    pub output_directory: Option<String>,
    pub output_name: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub ogrinfo: Option<String>,
    pub extended_columns: Option<bool>,
}

/// Defaults layered under user answers: config file first, built-ins last.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    pub output_name: String,
    pub patterns: Vec<String>,
    pub ogrinfo: String,
    pub extended_columns: bool,
}

impl Defaults {
    pub fn builtin(cwd: &Path) -> Self {
        Self {
            input_directory: cwd.join("input"),
            output_directory: cwd.join("output"),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            ogrinfo: DEFAULT_OGRINFO.to_string(),
            extended_columns: false,
        }
    }

    pub fn with_file(mut self, file: FileConfig) -> Self {
        if let Some(v) = non_empty(file.input_directory) {
            self.input_directory = PathBuf::from(v);
        }
        if let Some(v) = non_empty(file.output_directory) {
            self.output_directory = PathBuf::from(v);
        }
        if let Some(v) = non_empty(file.output_name) {
            self.output_name = v;
        }
        if let Some(v) = file.patterns.filter(|p| !p.is_empty()) {
            self.patterns = v;
        }
        if let Some(v) = non_empty(file.ogrinfo) {
            self.ogrinfo = v;
        }
        if let Some(v) = file.extended_columns {
            self.extended_columns = v;
        }
        self
    }
}

/// Answers gathered from flags or prompts. `None` or "" means "use the default".
#[derive(Debug, Clone, Default)]
pub struct UserAnswers {
    pub input: Option<String>,
    pub output_directory: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".config")
        .join("data_inventory")
        .join("config.toml"))
}

/// Loads the config file. An explicitly named file must exist; the default one may not.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let (config_path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Ok(p) => (p, false),
            Err(err) => {
                log::debug!("Skipping config file: {}", err);
                return Ok(FileConfig::default());
            }
        },
    };

    if !config_path.exists() {
        if required {
            anyhow::bail!("Config file {:?} does not exist", config_path);
        }
        return Ok(FileConfig::default());
    }

    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    let parsed: FileConfig = toml::from_str(&content)
        .context(format!("Failed to parse {:?}", config_path))?;

    log::debug!("Loaded config from {:?}", config_path);
    Ok(parsed)
}

/// Builds the run configuration. Explicit user value > config file > built-in default.
pub fn resolve_config(
    cli: &Cli,
    mode: InputMode,
    answers: UserAnswers,
    defaults: Defaults,
) -> InventoryConfig {
    let input = non_empty(answers.input)
        .map(PathBuf::from)
        .unwrap_or(defaults.input_directory);
    let output_directory = non_empty(answers.output_directory)
        .map(PathBuf::from)
        .unwrap_or(defaults.output_directory);

    InventoryConfig {
        mode,
        input,
        output_directory,
        output_name: non_empty(cli.output_name.clone()).unwrap_or(defaults.output_name),
        patterns: defaults.patterns,
        ogrinfo: non_empty(cli.ogrinfo.clone()).unwrap_or(defaults.ogrinfo),
        extended_columns: cli.extended || defaults.extended_columns,
    }
}
