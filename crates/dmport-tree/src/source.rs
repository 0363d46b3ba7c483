//! Import sources: flat listings of files to build a tree from.
//!
//! A source enumerates entries as `(relative_path, is_directory)` pairs
//! and reads a named entry's full content on demand. Listings are always
//! returned sorted so tree construction is deterministic regardless of
//! the underlying enumeration order.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use dmport_resolve::BlobSource;

use crate::error::{TreeError, TreeResult};

/// One entry of a flat source listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path relative to the source, rooted at the top-level folder name
    /// (e.g. `MyRootPackage/Moorings/Mooring.json`). No trailing slash.
    pub path: String,
    pub is_dir: bool,
}

/// A flat, enumerable collection of files and folders to import.
pub trait ImportSource {
    /// Every entry of the source, sorted by path.
    fn entries(&self) -> Vec<SourceEntry>;

    /// Full content of the file at `path`. Returns `Ok(None)` when no
    /// file exists at `path`.
    fn read(&self, path: &str) -> std::io::Result<Option<Vec<u8>>>;
}

/// Adapts an [`ImportSource`] to the rewriter's [`BlobSource`], so blob
/// payloads are read from the archive being processed.
pub struct SourceBlobs<'a> {
    source: &'a dyn ImportSource,
}

impl<'a> SourceBlobs<'a> {
    pub fn new(source: &'a dyn ImportSource) -> Self {
        Self { source }
    }
}

impl BlobSource for SourceBlobs<'_> {
    fn read_blob(&self, path: &str) -> std::io::Result<Option<Vec<u8>>> {
        self.source.read(path)
    }
}

/// An in-memory source, used by tests and programmatic imports.
#[derive(Default)]
pub struct MemorySource {
    entries: BTreeMap<String, Option<Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> &mut Self {
        self.entries.insert(path.to_string(), Some(content.into()));
        self
    }

    pub fn add_json(&mut self, path: &str, document: &serde_json::Value) -> &mut Self {
        self.add_file(path, document.to_string().into_bytes())
    }

    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        self.entries
            .insert(path.trim_end_matches('/').to_string(), None);
        self
    }
}

impl ImportSource for MemorySource {
    fn entries(&self) -> Vec<SourceEntry> {
        // BTreeMap iteration is already path-sorted.
        self.entries
            .iter()
            .map(|(path, content)| SourceEntry {
                path: path.clone(),
                is_dir: content.is_none(),
            })
            .collect()
    }

    fn read(&self, path: &str) -> std::io::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(path).and_then(Clone::clone))
    }
}

/// A directory on disk, listed recursively. The directory's own name is
/// the root folder of every entry path, mirroring how archives are laid
/// out.
pub struct DirectorySource {
    root: PathBuf,
    root_name: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> TreeResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(TreeError::InvalidArchive {
                reason: format!("'{}' is not a directory", root.display()),
            });
        }
        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| TreeError::InvalidArchive {
                reason: format!("'{}' has no folder name", root.display()),
            })?;
        Ok(Self { root, root_name })
    }

    /// Map a listing path back to the on-disk location.
    fn disk_path(&self, path: &str) -> Option<PathBuf> {
        let relative = path.strip_prefix(&self.root_name)?;
        let relative = relative.strip_prefix('/').unwrap_or(relative);
        Some(self.root.join(relative))
    }
}

impl ImportSource for DirectorySource {
    fn entries(&self) -> Vec<SourceEntry> {
        let mut entries = vec![SourceEntry {
            path: self.root_name.clone(),
            is_dir: true,
        }];
        for entry in walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
        {
            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let mut path = self.root_name.clone();
            for component in relative.components() {
                path.push('/');
                path.push_str(&component.as_os_str().to_string_lossy());
            }
            entries.push(SourceEntry {
                path,
                is_dir: entry.file_type().is_dir(),
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    fn read(&self, path: &str) -> std::io::Result<Option<Vec<u8>>> {
        match self.disk_path(path) {
            Some(full) if full.is_file() => std::fs::read(full).map(Some),
            _ => Ok(None),
        }
    }
}

/// A zip archive held in memory.
///
/// The zip reader requires mutable access for every read, so the archive
/// sits behind a `RefCell`; sources are owned by one single-threaded
/// import at a time.
pub struct ZipSource {
    archive: RefCell<ZipArchive<Cursor<Vec<u8>>>>,
}

impl ZipSource {
    pub fn from_bytes(bytes: Vec<u8>) -> TreeResult<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|error| {
            TreeError::InvalidArchive {
                reason: error.to_string(),
            }
        })?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    pub fn from_path(path: &Path) -> TreeResult<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }
}

impl ImportSource for ZipSource {
    fn entries(&self) -> Vec<SourceEntry> {
        let archive = self.archive.borrow();
        let mut entries: Vec<SourceEntry> = archive
            .file_names()
            .map(|name| SourceEntry {
                path: name.trim_end_matches('/').to_string(),
                is_dir: name.ends_with('/'),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    fn read(&self, path: &str) -> std::io::Result<Option<Vec<u8>>> {
        let mut archive = self.archive.borrow_mut();
        let result = match archive.by_name(path) {
            Ok(mut file) => {
                let mut content = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut content)?;
                Ok(Some(content))
            }
            Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(std::io::Error::new(std::io::ErrorKind::InvalidData, error)),
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn memory_source_lists_sorted() {
        let mut source = MemorySource::new();
        source
            .add_file("Root/b.json", b"{}".to_vec())
            .add_dir("Root/A/")
            .add_file("Root/A/a.json", b"{}".to_vec());
        let paths: Vec<String> = source.entries().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["Root/A", "Root/A/a.json", "Root/b.json"]);
    }

    #[test]
    fn memory_source_reads_files_only() {
        let mut source = MemorySource::new();
        source.add_dir("Root/A").add_file("Root/x", b"abc".to_vec());
        assert_eq!(source.read("Root/x").unwrap(), Some(b"abc".to_vec()));
        assert_eq!(source.read("Root/A").unwrap(), None);
        assert_eq!(source.read("Root/missing").unwrap(), None);
    }

    #[test]
    fn directory_source_prefixes_root_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("MyPackage");
        std::fs::create_dir_all(root.join("Moorings")).unwrap();
        std::fs::write(root.join("Moorings/Mooring.json"), b"{}").unwrap();
        std::fs::write(root.join("top.json"), b"{}").unwrap();

        let source = DirectorySource::new(&root).unwrap();
        let paths: Vec<String> = source.entries().into_iter().map(|e| e.path).collect();
        assert_eq!(
            paths,
            vec![
                "MyPackage",
                "MyPackage/Moorings",
                "MyPackage/Moorings/Mooring.json",
                "MyPackage/top.json",
            ]
        );
        assert_eq!(
            source.read("MyPackage/Moorings/Mooring.json").unwrap(),
            Some(b"{}".to_vec())
        );
        assert_eq!(source.read("MyPackage/absent.json").unwrap(), None);
    }

    #[test]
    fn directory_source_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.json");
        std::fs::write(&file, b"{}").unwrap();
        assert!(matches!(
            DirectorySource::new(&file),
            Err(TreeError::InvalidArchive { .. })
        ));
    }

    fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            for (path, content) in entries {
                match content {
                    Some(bytes) => {
                        writer.start_file(*path, options).unwrap();
                        writer.write_all(bytes).unwrap();
                    }
                    None => {
                        writer.add_directory(*path, options).unwrap();
                    }
                }
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn zip_source_roundtrip() {
        let document = json!({"name": "x"}).to_string();
        let bytes = build_zip(&[
            ("Root/", None),
            ("Root/x.json", Some(document.as_bytes())),
            ("Root/C/", None),
        ]);
        let source = ZipSource::from_bytes(bytes).unwrap();

        let entries = source.entries();
        let dirs: Vec<&str> = entries
            .iter()
            .filter(|e| e.is_dir)
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(dirs, vec!["Root", "Root/C"]);
        assert_eq!(
            source.read("Root/x.json").unwrap(),
            Some(document.into_bytes())
        );
        assert_eq!(source.read("Root/absent.json").unwrap(), None);
    }

    #[test]
    fn zip_source_rejects_garbage() {
        assert!(matches!(
            ZipSource::from_bytes(vec![1, 2, 3, 4]),
            Err(TreeError::InvalidArchive { .. })
        ));
    }

    #[test]
    fn source_blobs_delegates_to_source() {
        let mut source = MemorySource::new();
        source.add_file("Root/data.bin", vec![9, 9]);
        let blobs = SourceBlobs::new(&source);
        use dmport_resolve::BlobSource as _;
        assert_eq!(blobs.read_blob("Root/data.bin").unwrap(), Some(vec![9, 9]));
        assert_eq!(blobs.read_blob("Root/missing.bin").unwrap(), None);
    }
}
