use crate::app::describe::{Describer, Descriptor};
use crate::app::models::{
    DatasetKind, FeatureClassRecord, DESCRIBE_FAILED, NO_DATA, PATH_NOT_FOUND,
};
use std::path::Path;

/// Turns dataset paths into feature-class records via a `Describer`.
pub struct Extractor<'a, D: Describer> {
    describer: &'a D,
}

impl<'a, D: Describer> Extractor<'a, D> {
    pub fn new(describer: &'a D) -> Self {
        Self { describer }
    }

    /// Records for one dataset path, in listing order.
    pub fn extract(&self, path: &Path) -> Vec<FeatureClassRecord> {
        let Some(kind) = DatasetKind::from_path(path) else {
            log::warn!("Skipping {:?}: not a .gdb, .gdb.zip or .shp", path);
            return Vec::new();
        };
        if !path.exists() {
            log::warn!("{:?} does not exist", path);
            return vec![FeatureClassRecord::sentinel(path, PATH_NOT_FOUND)];
        }

        let records = match kind {
            DatasetKind::Geodatabase => {
                log::info!("Getting .gdb info from {:?}", path);
                self.geodatabase(path)
            }
            DatasetKind::Shapefile => {
                log::info!("Getting .shp info from {:?}", path);
                vec![self.feature_class(path)]
            }
        };
        for record in &records {
            log::debug!("{:?}", record);
        }
        records
    }

    fn geodatabase(&self, workspace: &Path) -> Vec<FeatureClassRecord> {
        let entries = match self.describer.catalog(workspace) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Could not list datasets of {:?}: {}", workspace, err);
                return vec![FeatureClassRecord::sentinel(workspace, DESCRIBE_FAILED)];
            }
        };

        entries
            .into_iter()
            .map(|entry| match entry.descriptor {
                Ok(desc) => record_from(&entry.path, desc),
                Err(err) => {
                    log::warn!("Could not describe {:?}: {}", entry.path, err);
                    FeatureClassRecord::sentinel(&entry.path, DESCRIBE_FAILED)
                }
            })
            .collect()
    }

    fn feature_class(&self, fc_path: &Path) -> FeatureClassRecord {
        match self.describer.describe(fc_path) {
            Ok(desc) => record_from(fc_path, desc),
            Err(err) => {
                log::warn!("Could not describe {:?}: {}", fc_path, err);
                FeatureClassRecord::sentinel(fc_path, DESCRIBE_FAILED)
            }
        }
    }
}

fn record_from(fc_path: &Path, desc: Descriptor) -> FeatureClassRecord {
    let or_none = |v: Option<String>| v.unwrap_or_else(|| NO_DATA.to_string());
    FeatureClassRecord {
        path: fc_path.to_string_lossy().into_owned(),
        spatial_reference: or_none(desc.spatial_reference),
        feature_type: or_none(desc.feature_type),
        shape_type: or_none(desc.shape_type),
        shape_field_name: or_none(desc.shape_field_name),
    }
}
