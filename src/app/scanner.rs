use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::path::{Path, PathBuf};

/// Finds dataset paths, either listed in a CSV or sitting in a directory.
pub struct Scanner {
    match_set: GlobSet,
}

impl Scanner {
    pub fn new(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            match_set: build_globset(patterns)?,
        })
    }

    /// First column of every row after the header.
    pub fn paths_from_csv(&self, csv_path: &Path) -> Result<Vec<PathBuf>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(csv_path)
            .context(format!("Failed to open path list {:?}", csv_path))?;

        let mut paths = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            let row = row.context(format!("Failed to parse {:?}", csv_path))?;
            match row.get(0).map(str::trim) {
                Some(first) if !first.is_empty() => paths.push(PathBuf::from(first)),
                // +2: one for the header, one for 1-based numbering
                _ => log::warn!("Skipping row {} of {:?}: empty path", idx + 2, csv_path),
            }
        }

        log::info!("Read {} paths from {:?}", paths.len(), csv_path);
        Ok(paths)
    }

    /// Immediate children of `dir` whose file name matches a pattern, sorted by name.
    pub fn paths_from_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            bail!("Input directory {:?} does not exist or is not a directory", dir);
        }
        log::info!("Searching {:?} for datasets", dir);

        // Depth 1 with filters off: every child is a candidate, nothing below it is.
        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut paths = Vec::new();
        for result in walker {
            match result {
                Ok(entry) => {
                    if entry.depth() == 0 {
                        continue;
                    }
                    if self.matches(entry.path()) {
                        let shown = diff_paths(entry.path(), dir)
                            .unwrap_or_else(|| entry.path().to_path_buf());
                        log::debug!("Found {}", shown.display());
                        paths.push(entry.into_path());
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        log::info!("Found {} datasets in {:?}", paths.len(), dir);
        Ok(paths)
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.match_set.is_match(name))
            .unwrap_or(false)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::DEFAULT_PATTERNS;
    use std::fs;
    use tempfile::TempDir;

    fn default_scanner() -> Scanner {
        let patterns: Vec<String> = DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect();
        Scanner::new(&patterns).unwrap()
    }

    #[test]
    fn csv_skips_header_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("list.csv");
        fs::write(&list, "path\na.gdb\nb.shp\n").unwrap();

        let paths = default_scanner().paths_from_csv(&list).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.gdb"), PathBuf::from("b.shp")]);
    }

    #[test]
    fn csv_takes_first_column_and_keeps_duplicates() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("list.csv");
        fs::write(
            &list,
            "path,owner\n/d/a.gdb,gis\n,nobody\n\"/d/with,comma.shp\",x\n/d/a.gdb\n",
        )
        .unwrap();

        let paths = default_scanner().paths_from_csv(&list).unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/d/a.gdb"),
                PathBuf::from("/d/with,comma.shp"),
                PathBuf::from("/d/a.gdb"),
            ]
        );
    }

    #[test]
    fn missing_csv_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = default_scanner()
            .paths_from_csv(&dir.path().join("absent.csv"))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("absent.csv"));
    }

    #[test]
    fn directory_lists_matching_children_only() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("x.gdb")).unwrap();
        fs::write(dir.path().join("x.gdb").join("inner.shp"), b"").unwrap();
        fs::write(dir.path().join("y.shp"), b"").unwrap();
        fs::write(dir.path().join("z.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.shp"), b"").unwrap();

        let paths = default_scanner().paths_from_directory(dir.path()).unwrap();
        assert_eq!(paths, vec![dir.path().join("x.gdb"), dir.path().join("y.shp")]);
    }

    #[test]
    fn directory_matches_zipped_geodatabases_and_hidden_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("archive.gdb.zip"), b"").unwrap();
        fs::write(dir.path().join(".hidden.shp"), b"").unwrap();
        fs::write(dir.path().join("roads.shx"), b"").unwrap();

        let paths = default_scanner().paths_from_directory(dir.path()).unwrap();
        assert_eq!(
            paths,
            vec![dir.path().join(".hidden.shp"), dir.path().join("archive.gdb.zip")]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(default_scanner()
            .paths_from_directory(&dir.path().join("gone"))
            .is_err());
    }

    #[test]
    fn bad_pattern_is_rejected() {
        assert!(Scanner::new(&["[".to_string()]).is_err());
    }
}
