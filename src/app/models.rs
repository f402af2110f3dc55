use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

/// Placeholder for a descriptor attribute the dataset does not expose.
pub const NO_DATA: &str = "NONE";
/// Placeholder for every descriptor field of a path missing on disk.
pub const PATH_NOT_FOUND: &str = "ERROR: PATH NOT FOUND";
/// Placeholder for a feature class whose describe call failed.
pub const DESCRIBE_FAILED: &str = "ERROR: DESCRIBE FAILED";

/// How dataset paths are gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputMode {
    Csv,
    Directory,
}

impl InputMode {
    /// Case-sensitive match against the same names `--mode` accepts.
    pub fn parse(answer: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(answer, false).ok()
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}

/// Resolved settings for one inventory run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryConfig {
    pub mode: InputMode,
    pub input: PathBuf,
    pub output_directory: PathBuf,
    pub output_name: String,
    pub patterns: Vec<String>,
    pub ogrinfo: String,
    pub extended_columns: bool,
}

impl InventoryConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_directory.join(&self.output_name)
    }
}

/// Kind of dataset a path points at, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Geodatabase,
    Shapefile,
}

impl DatasetKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".gdb") || name.ends_with(".gdb.zip") {
            Some(DatasetKind::Geodatabase)
        } else if name.ends_with(".shp") {
            Some(DatasetKind::Shapefile)
        } else {
            None
        }
    }
}

/// One row of the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureClassRecord {
    pub path: String,
    pub spatial_reference: String,
    pub feature_type: String,
    pub shape_type: String,
    pub shape_field_name: String,
}

impl FeatureClassRecord {
    pub const HEADER: [&'static str; 3] = ["path", "spatialReference", "shapeType"];
    pub const EXTENDED_HEADER: [&'static str; 5] = [
        "path",
        "spatialReference",
        "featureType",
        "shapeType",
        "shapeFieldName",
    ];

    /// Record with every descriptor field set to `marker`.
    pub fn sentinel(path: &Path, marker: &str) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            spatial_reference: marker.to_string(),
            feature_type: marker.to_string(),
            shape_type: marker.to_string(),
            shape_field_name: marker.to_string(),
        }
    }

    pub fn fields(&self, extended: bool) -> Vec<&str> {
        if extended {
            vec![
                self.path.as_str(),
                self.spatial_reference.as_str(),
                self.feature_type.as_str(),
                self.shape_type.as_str(),
                self.shape_field_name.as_str(),
            ]
        } else {
            vec![
                self.path.as_str(),
                self.spatial_reference.as_str(),
                self.shape_type.as_str(),
            ]
        }
    }
}
