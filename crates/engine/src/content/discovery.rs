use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::compiler::{CellDefError, DefErrorCode};

#[derive(Debug, Clone)]
pub(crate) struct DefSource {
    pub source_id: String,
    pub load_index: u32,
    pub source_dir: PathBuf,
}

/// Resolves each directory into a named def source; load order is argument order.
pub(crate) fn discover_def_sources(def_dirs: &[PathBuf]) -> Result<Vec<DefSource>, CellDefError> {
    let mut seen = HashSet::<String>::new();
    let mut sources = Vec::with_capacity(def_dirs.len());

    for (idx, dir) in def_dirs.iter().enumerate() {
        let source_id = dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("source{idx}"));
        if !dir.is_dir() {
            return Err(CellDefError {
                code: DefErrorCode::Discovery,
                message: format!("def directory not found at {}", dir.display()),
                source_id,
                file_path: dir.clone(),
                location: None,
            });
        }
        if !seen.insert(source_id.clone()) {
            return Err(CellDefError {
                code: DefErrorCode::Discovery,
                message: format!("def source '{source_id}' listed more than once"),
                source_id,
                file_path: dir.clone(),
                location: None,
            });
        }
        sources.push(DefSource {
            source_id,
            load_index: idx as u32,
            source_dir: dir.clone(),
        });
    }

    Ok(sources)
}

pub(crate) struct ReadError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

pub(crate) fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by_key(|path| normalize_rel_path(path.strip_prefix(root).unwrap_or(path)));
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn sources_keep_argument_order() {
        let temp = TempDir::new().expect("tempdir");
        let b = temp.path().join("b");
        let a = temp.path().join("a");
        fs::create_dir_all(&b).expect("create b");
        fs::create_dir_all(&a).expect("create a");

        let sources = discover_def_sources(&[b, a]).expect("discover");
        assert_eq!(sources[0].source_id, "b");
        assert_eq!(sources[1].source_id, "a");
        assert_eq!(sources[1].load_index, 1);
    }

    #[test]
    fn missing_dir_is_discovery_error() {
        let temp = TempDir::new().expect("tempdir");
        let err = discover_def_sources(&[temp.path().join("nope")]).expect_err("missing");
        assert_eq!(err.code, DefErrorCode::Discovery);
        assert_eq!(err.source_id, "nope");
    }

    #[test]
    fn xml_files_are_sorted_and_filtered() {
        let temp = TempDir::new().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("nested")).expect("mkdir");
        fs::write(root.join("z.xml"), "<Defs/>").expect("write z");
        fs::write(root.join("nested").join("a.XML"), "<Defs/>").expect("write a");
        fs::write(root.join("notes.txt"), "skip").expect("write txt");

        let files = collect_xml_files_sorted(root).unwrap_or_else(|err| {
            panic!("collect failed at {}: {}", err.path.display(), err.source)
        });
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with(Path::new("nested").join("a.XML")));
        assert!(files[1].ends_with("z.xml"));
    }
}
