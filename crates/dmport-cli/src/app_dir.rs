//! Conventional application directory layout.
//!
//! An application directory holds data source definitions next to the
//! data they receive:
//!
//! ```text
//! app/
//! ├── data_sources/   <ds-name>.json definitions
//! └── data/           <ds-name>/<RootPackage>/... entity trees
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

/// Locate the `data_sources` and `data` directories under `path`.
pub fn app_dir_structure(path: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    if !path.is_dir() {
        bail!("the path '{}' is not a directory", path.display());
    }
    let data_sources = path.join("data_sources");
    let data = path.join("data");
    if !data_sources.is_dir() || !data.is_dir() {
        bail!(
            "the directory '{}' does not have the expected structure; it should contain 'data_sources' and 'data'",
            path.display()
        );
    }
    Ok((data_sources, data))
}

/// Every `.json` file directly under `path`, sorted by name.
pub fn json_files_in_dir(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("cannot list '{}'", path.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|entry| entry.is_file() && entry.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Every directory directly under `path`, sorted by name.
pub fn sub_directories(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("cannot list '{}'", path.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|entry| entry.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_expected_structure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data_sources")).unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        let (data_sources, data) = app_dir_structure(dir.path()).unwrap();
        assert!(data_sources.ends_with("data_sources"));
        assert!(data.ends_with("data"));
    }

    #[test]
    fn rejects_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data_sources")).unwrap();
        assert!(app_dir_structure(dir.path()).is_err());
    }

    #[test]
    fn lists_json_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let files = json_files_in_dir(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn lists_sub_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("B")).unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();
        std::fs::write(dir.path().join("file.json"), "{}").unwrap();
        let dirs = sub_directories(dir.path()).unwrap();
        assert_eq!(dirs.len(), 2);
        assert!(dirs[0].ends_with("A"));
    }
}
