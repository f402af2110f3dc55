use crate::app::describe::Describer;
use crate::app::extractor::Extractor;
use crate::app::models::{FeatureClassRecord, InputMode, InventoryConfig};
use crate::app::scanner::Scanner;
use crate::app::writer::write_inventory;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// The inventory pipeline: collect paths, describe them, write the CSV.
pub struct DataInventory<'a, D: Describer> {
    config: InventoryConfig,
    describer: &'a D,
    file_paths: Vec<PathBuf>,
    records: Vec<FeatureClassRecord>,
}

impl<'a, D: Describer> DataInventory<'a, D> {
    pub fn new(config: InventoryConfig, describer: &'a D) -> Self {
        Self {
            config,
            describer,
            file_paths: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn file_paths(&self) -> &[PathBuf] {
        &self.file_paths
    }

    pub fn records(&self) -> &[FeatureClassRecord] {
        &self.records
    }

    /// Appends the paths the configured input mode finds.
    pub fn collect_paths(&mut self) -> Result<&mut Self> {
        let scanner = Scanner::new(&self.config.patterns)?;
        log::info!("Collecting dataset paths ({} mode)", self.config.mode);
        let found = match self.config.mode {
            InputMode::Csv => scanner.paths_from_csv(&self.config.input)?,
            InputMode::Directory => scanner.paths_from_directory(&self.config.input)?,
        };
        self.file_paths.extend(found);
        Ok(self)
    }

    /// Appends records for every collected path, in path order.
    pub fn extract_metadata(&mut self) -> &mut Self {
        let extractor = Extractor::new(self.describer);
        for path in &self.file_paths {
            self.records.extend(extractor.extract(path));
        }
        self
    }

    pub fn write_csv(&self) -> Result<PathBuf> {
        let target = self.config.output_path();
        write_inventory(&target, &self.records, self.config.extended_columns)?;
        Ok(target)
    }

    pub fn input(&self) -> &Path {
        &self.config.input
    }
}
