//! Dataset introspection: what feature classes a workspace holds and what each one looks like.

use crate::app::models::DatasetKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Properties of one feature class. Absent attributes stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub spatial_reference: Option<String>,
    pub shape_type: Option<String>,
    pub feature_type: Option<String>,
    pub shape_field_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("Dataset {0} does not exist")]
    NotFound(PathBuf),
    #[error("{0} is neither a geodatabase nor a shapefile")]
    Unsupported(PathBuf),
    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, #[source] io::Error),
    #[error("{0} is not a shapefile (file code {1})")]
    BadShapefile(PathBuf, i32),
    #[error("Failed to run {0}: {1}")]
    Spawn(String, #[source] io::Error),
    #[error("{program} exited with {status}: {stderr}")]
    Tool {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("Failed to parse ogrinfo output for {0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
    #[error("Layer {layer} not found in {workspace}")]
    NoLayer { workspace: PathBuf, layer: String },
}

pub type DescribeResult<T> = Result<T, DescribeError>;

/// A feature class found in a workspace and the outcome of describing it.
#[derive(Debug)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub descriptor: DescribeResult<Descriptor>,
}

/// The geospatial description service the inventory is built on.
pub trait Describer {
    /// Named feature datasets of a workspace; the unnamed top level is implied.
    fn list_datasets(&self, workspace: &Path) -> DescribeResult<Vec<String>>;

    /// Feature classes inside `dataset` ("" is the top level).
    fn list_feature_classes(&self, workspace: &Path, dataset: &str) -> DescribeResult<Vec<String>>;

    fn describe(&self, feature_class: &Path) -> DescribeResult<Descriptor>;

    /// Every feature class of a workspace, top level first, then each named dataset.
    fn catalog(&self, workspace: &Path) -> DescribeResult<Vec<CatalogEntry>> {
        walk_catalog(self, workspace)
    }
}

/// Builds a catalog from the per-dataset listing calls. A dataset that cannot be
/// listed becomes a single failed entry.
pub fn walk_catalog<D: Describer + ?Sized>(
    describer: &D,
    workspace: &Path,
) -> DescribeResult<Vec<CatalogEntry>> {
    let named = describer.list_datasets(workspace)?;

    let mut entries = Vec::new();
    for dataset in std::iter::once(String::new()).chain(named) {
        match describer.list_feature_classes(workspace, &dataset) {
            Ok(classes) => {
                for class in classes {
                    let path = feature_class_path(workspace, &dataset, &class);
                    let descriptor = describer.describe(&path);
                    entries.push(CatalogEntry { path, descriptor });
                }
            }
            Err(err) => entries.push(CatalogEntry {
                path: workspace.join(&dataset),
                descriptor: Err(err),
            }),
        }
    }
    Ok(entries)
}

pub fn feature_class_path(workspace: &Path, dataset: &str, class: &str) -> PathBuf {
    // join("") would add a trailing separator
    if dataset.is_empty() {
        workspace.join(class)
    } else {
        workspace.join(dataset).join(class)
    }
}

/// Reads shapefiles directly and asks `ogrinfo` about geodatabases.
pub struct NativeDescriber {
    ogrinfo: String,
}

impl NativeDescriber {
    pub fn new(ogrinfo: impl Into<String>) -> Self {
        Self {
            ogrinfo: ogrinfo.into(),
        }
    }

    fn ogrinfo_json(&self, workspace: &Path, layer: Option<&str>) -> DescribeResult<OgrInfo> {
        let mut cmd = Command::new(&self.ogrinfo);
        cmd.args(["-json", "-so", "-mdd", "all"]).arg(workspace);
        if let Some(layer) = layer {
            cmd.arg(layer);
        }
        log::debug!("Running {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| DescribeError::Spawn(self.ogrinfo.clone(), e))?;
        if !output.status.success() {
            return Err(DescribeError::Tool {
                program: self.ogrinfo.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|e| DescribeError::Json(workspace.to_path_buf(), e))
    }

    fn gdb_layers(&self, workspace: &Path) -> DescribeResult<Vec<OgrLayer>> {
        if !workspace.exists() {
            return Err(DescribeError::NotFound(workspace.to_path_buf()));
        }
        Ok(self.ogrinfo_json(workspace, None)?.layers)
    }

    fn describe_gdb_layer(&self, feature_class: &Path) -> DescribeResult<Descriptor> {
        let workspace = feature_class
            .ancestors()
            .skip(1)
            .find(|p| DatasetKind::from_path(p) == Some(DatasetKind::Geodatabase))
            .ok_or_else(|| DescribeError::Unsupported(feature_class.to_path_buf()))?;
        let layer_name = feature_class
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let info = self.ogrinfo_json(workspace, Some(&layer_name))?;
        let layer = info
            .layers
            .into_iter()
            .find(|l| l.name.eq_ignore_ascii_case(&layer_name))
            .ok_or_else(|| DescribeError::NoLayer {
                workspace: workspace.to_path_buf(),
                layer: layer_name.clone(),
            })?;

        Ok(layer.into_descriptor())
    }

    /// One `ogrinfo` run for the whole geodatabase; tables without geometry are left out.
    fn gdb_catalog(&self, workspace: &Path) -> DescribeResult<Vec<CatalogEntry>> {
        let mut groups: Vec<(String, Vec<OgrLayer>)> = vec![(String::new(), Vec::new())];
        for layer in self.gdb_layers(workspace)? {
            if layer.geometry_fields.is_empty() {
                continue;
            }
            let dataset = layer.feature_dataset().unwrap_or_default();
            match groups.iter_mut().find(|(name, _)| *name == dataset) {
                Some((_, layers)) => layers.push(layer),
                None => groups.push((dataset, vec![layer])),
            }
        }

        let mut entries = Vec::new();
        for (dataset, layers) in groups {
            for layer in layers {
                let path = feature_class_path(workspace, &dataset, &layer.name);
                entries.push(CatalogEntry {
                    path,
                    descriptor: Ok(layer.into_descriptor()),
                });
            }
        }
        Ok(entries)
    }
}

impl Describer for NativeDescriber {
    fn list_datasets(&self, workspace: &Path) -> DescribeResult<Vec<String>> {
        match DatasetKind::from_path(workspace) {
            Some(DatasetKind::Geodatabase) => {
                let mut datasets: Vec<String> = Vec::new();
                for layer in self.gdb_layers(workspace)? {
                    if let Some(ds) = layer.feature_dataset() {
                        if !datasets.contains(&ds) {
                            datasets.push(ds);
                        }
                    }
                }
                Ok(datasets)
            }
            Some(DatasetKind::Shapefile) => Ok(Vec::new()),
            None => Err(DescribeError::Unsupported(workspace.to_path_buf())),
        }
    }

    fn list_feature_classes(&self, workspace: &Path, dataset: &str) -> DescribeResult<Vec<String>> {
        match DatasetKind::from_path(workspace) {
            Some(DatasetKind::Geodatabase) => Ok(self
                .gdb_layers(workspace)?
                .into_iter()
                .filter(|l| !l.geometry_fields.is_empty())
                .filter(|l| l.feature_dataset().as_deref().unwrap_or("") == dataset)
                .map(|l| l.name)
                .collect()),
            Some(DatasetKind::Shapefile) => {
                if !workspace.exists() {
                    return Err(DescribeError::NotFound(workspace.to_path_buf()));
                }
                if !dataset.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(workspace
                    .file_stem()
                    .map(|s| vec![s.to_string_lossy().into_owned()])
                    .unwrap_or_default())
            }
            None => Err(DescribeError::Unsupported(workspace.to_path_buf())),
        }
    }

    fn describe(&self, feature_class: &Path) -> DescribeResult<Descriptor> {
        if DatasetKind::from_path(feature_class) == Some(DatasetKind::Shapefile) {
            describe_shapefile(feature_class)
        } else {
            self.describe_gdb_layer(feature_class)
        }
    }

    fn catalog(&self, workspace: &Path) -> DescribeResult<Vec<CatalogEntry>> {
        match DatasetKind::from_path(workspace) {
            Some(DatasetKind::Geodatabase) => self.gdb_catalog(workspace),
            _ => walk_catalog(self, workspace),
        }
    }
}

fn describe_shapefile(path: &Path) -> DescribeResult<Descriptor> {
    if !path.exists() {
        return Err(DescribeError::NotFound(path.to_path_buf()));
    }

    let mut header = [0u8; 100];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut header))
        .map_err(|e| DescribeError::Read(path.to_path_buf(), e))?;

    let file_code = i32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    if file_code != SHAPEFILE_CODE {
        return Err(DescribeError::BadShapefile(path.to_path_buf(), file_code));
    }
    let shape_code = i32::from_le_bytes([header[32], header[33], header[34], header[35]]);

    let prj = path.with_extension("prj");
    let spatial_reference = if prj.exists() {
        let wkt =
            fs::read_to_string(&prj).map_err(|e| DescribeError::Read(prj.clone(), e))?;
        wkt_name(&wkt)
    } else {
        None
    };

    Ok(Descriptor {
        spatial_reference,
        shape_type: shapefile_shape_type(shape_code).map(str::to_string),
        feature_type: Some("Simple".to_string()),
        shape_field_name: Some("Shape".to_string()),
    })
}

const SHAPEFILE_CODE: i32 = 9994;

/// Esri shape type for a shapefile header code. Z and M variants fold onto the base type.
fn shapefile_shape_type(code: i32) -> Option<&'static str> {
    match code {
        1 | 11 | 21 => Some("Point"),
        3 | 13 | 23 => Some("Polyline"),
        5 | 15 | 25 => Some("Polygon"),
        8 | 18 | 28 => Some("Multipoint"),
        31 => Some("MultiPatch"),
        _ => None,
    }
}

/// Esri shape type for an OGR geometry type name such as "3D Multi Polygon" or "LineStringZ".
fn esri_shape_type(ogr_type: &str) -> Option<String> {
    let mut base: String = ogr_type
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    for prefix in ["3d", "measured"] {
        if let Some(rest) = base.strip_prefix(prefix) {
            base = rest.to_string();
        }
    }
    for suffix in ["25d", "zm", "z", "m"] {
        if let Some(rest) = base.strip_suffix(suffix) {
            base = rest.to_string();
            break;
        }
    }

    let esri = match base.as_str() {
        "point" => "Point",
        "multipoint" => "Multipoint",
        "linestring" | "multilinestring" | "circularstring" | "compoundcurve" | "curve"
        | "multicurve" => "Polyline",
        "polygon" | "multipolygon" | "curvepolygon" | "surface" | "multisurface" => "Polygon",
        "tin" | "polyhedralsurface" | "multipatch" => "MultiPatch",
        _ => return None,
    };
    Some(esri.to_string())
}

/// Name of the outermost CRS in a WKT string, e.g. `PROJCS["NAD_1983_UTM_Zone_10N",...]`.
fn wkt_name(wkt: &str) -> Option<String> {
    let open = wkt.find('[')?;
    let rest = wkt[open + 1..].trim_start().strip_prefix('"')?;
    let close = rest.find('"')?;
    let name = rest[..close].trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[derive(Debug, Deserialize)]
struct OgrInfo {
    #[serde(default)]
    layers: Vec<OgrLayer>,
}

#[derive(Debug, Deserialize)]
struct OgrLayer {
    name: String,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
    #[serde(default, rename = "geometryFields")]
    geometry_fields: Vec<OgrGeometryField>,
}

impl OgrLayer {
    /// Descriptor from the first geometry field.
    fn into_descriptor(self) -> Descriptor {
        match self.geometry_fields.into_iter().next() {
            Some(field) => Descriptor {
                spatial_reference: field
                    .coordinate_system
                    .and_then(|cs| cs.wkt)
                    .and_then(|wkt| wkt_name(&wkt)),
                shape_type: field.geometry_type.as_deref().and_then(esri_shape_type),
                feature_type: Some("Simple".to_string()),
                shape_field_name: Some(field.name).filter(|n| !n.is_empty()),
            },
            None => Descriptor::default(),
        }
    }

    /// Feature dataset from the layer's `<CatalogPath>\Dataset\Layer</CatalogPath>`.
    fn feature_dataset(&self) -> Option<String> {
        let xml = self.metadata.get("xml:definition")?.as_str()?;
        let start = xml.find("<CatalogPath>")? + "<CatalogPath>".len();
        let end = start + xml[start..].find("</CatalogPath>")?;
        let parts: Vec<&str> = xml[start..end]
            .split(['\\', '/'])
            .filter(|p| !p.is_empty())
            .collect();
        match parts.as_slice() {
            [.., dataset, _] => Some(dataset.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OgrGeometryField {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    geometry_type: Option<String>,
    #[serde(rename = "coordinateSystem")]
    coordinate_system: Option<OgrCoordinateSystem>,
}

#[derive(Debug, Deserialize)]
struct OgrCoordinateSystem {
    wkt: Option<String>,
}
