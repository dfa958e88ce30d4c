use crate::fixture::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One fixture file.
#[derive(Debug, Clone)]
pub struct Suite {
    pub path: PathBuf,
    pub name: String,
}

impl Suite {
    pub fn new(path: PathBuf, base_dir: &Path) -> Self {
        let name = match path.strip_prefix(base_dir) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.with_extension(""),
            _ => PathBuf::from(path.file_stem().unwrap_or(path.as_os_str())),
        };
        let name = name.to_string_lossy().into_owned();
        Self { path, name }
    }
}

fn is_fixture(path: &Path) -> bool {
    path.is_file()
        && path.extension().map_or(false, |ext| ext == "json")
        && !path
            .file_name()
            .map_or(false, |n| n.to_string_lossy().starts_with(['_', '.']))
}

/// Finds every `*.json` fixture under `root`, or `root` itself when it is a
/// file. Files whose name starts with `_` or `.` are ignored.
pub fn discover_suites(root: &Path) -> Result<Vec<Suite>> {
    let mut suites = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if is_fixture(entry.path()) {
            suites.push(Suite::new(entry.into_path(), root));
        }
    }

    suites.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(suites)
}
