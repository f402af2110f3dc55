use clap::Parser;
use std::path::PathBuf;

use crate::app::models::InputMode;

#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Inventory file geodatabases and shapefiles into a summary CSV"
)]
pub struct Cli {
    /// Where the dataset paths come from; prompted for when omitted
    #[arg(long, value_enum)]
    pub mode: Option<InputMode>,

    /// CSV of dataset paths (csv mode) or directory to search (directory mode)
    #[arg(long)]
    pub input: Option<String>,

    /// Directory the inventory CSV is written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// File name of the inventory CSV
    #[arg(long)]
    pub output_name: Option<String>,

    /// Alternate config file (defaults to ~/.config/data_inventory/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write the featureType and shapeFieldName columns
    #[arg(long)]
    pub extended: bool,

    /// ogrinfo executable used to describe geodatabases
    #[arg(long)]
    pub ogrinfo: Option<String>,
}
