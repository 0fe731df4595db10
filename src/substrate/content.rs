//! substrate::content
//!
//! Content-addressed directory store on the local filesystem.
//!
//! # Storage
//!
//! - `<root>/blobs/<sha256>` - file contents, keyed by their digest
//! - `<root>/trees/<sha256>.json` - manifest listing `(path, blob)` pairs
//!
//! The content reference of a tree is the SHA-256 of its manifest. Paths in
//! a manifest are relative, `/`-separated and sorted, so the same directory
//! contents always produce the same reference. Empty directories are not
//! recorded.
//!
//! All writes go to a temp file first and are renamed into place.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use walkdir::WalkDir;

use super::traits::{ContentError, ContentStore};
use crate::core::types::ContentRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ManifestEntry {
    path: String,
    blob: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Manifest {
    entries: Vec<ManifestEntry>,
}

/// Directory store rooted at a local path.
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    root: PathBuf,
}

impl LocalContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, digest: &str) -> PathBuf {
        self.root.join("blobs").join(digest)
    }

    fn tree_path(&self, digest: &str) -> PathBuf {
        self.root.join("trees").join(format!("{digest}.json"))
    }

    fn digest(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ContentError + '_ {
        move |source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Write `bytes` to `path` unless it already exists.
    fn write_once(path: &Path, bytes: &[u8]) -> Result<(), ContentError> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Self::io_err(parent))?;
        }
        let temp = path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp)
                .map_err(Self::io_err(&temp))?;
            file.write_all(bytes).map_err(Self::io_err(&temp))?;
            file.sync_all().map_err(Self::io_err(&temp))?;
        }
        fs::rename(&temp, path).map_err(Self::io_err(path))
    }

    /// Read a stored object and check it against its digest.
    fn read_verified(&self, path: &Path, digest: &str) -> Result<Vec<u8>, ContentError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::NotFound(digest.to_string()))
            }
            Err(e) => return Err(Self::io_err(path)(e)),
        };
        if Self::digest(&bytes) != digest {
            return Err(ContentError::Corrupted(format!(
                "object {} does not match its digest",
                digest
            )));
        }
        Ok(bytes)
    }

    fn relative_path(base: &Path, path: &Path) -> Result<String, ContentError> {
        let rel = path
            .strip_prefix(base)
            .map_err(|_| ContentError::Corrupted(format!("{} escapes tree", path.display())))?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }

    /// Reject manifest paths that could escape the destination.
    fn safe_join(dest: &Path, rel: &str) -> Result<PathBuf, ContentError> {
        let rel_path = Path::new(rel);
        let safe = !rel.is_empty()
            && rel_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(ContentError::Corrupted(format!(
                "unsafe path in manifest: {}",
                rel
            )));
        }
        Ok(dest.join(rel_path))
    }
}

impl ContentStore for LocalContentStore {
    fn put(&self, dir: &Path) -> Result<ContentRef, ContentError> {
        let meta = fs::metadata(dir).map_err(Self::io_err(dir))?;
        if !meta.is_dir() {
            return Err(ContentError::NotADirectory(dir.to_path_buf()));
        }

        let mut entries = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                ContentError::Io {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let bytes = fs::read(entry.path()).map_err(Self::io_err(entry.path()))?;
            let blob = Self::digest(&bytes);
            Self::write_once(&self.blob_path(&blob), &bytes)?;
            entries.push(ManifestEntry {
                path: Self::relative_path(dir, entry.path())?,
                blob,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let manifest = serde_json::to_vec(&Manifest { entries })
            .map_err(|e| ContentError::Corrupted(format!("cannot encode manifest: {}", e)))?;
        let digest = Self::digest(&manifest);
        Self::write_once(&self.tree_path(&digest), &manifest)?;

        debug!(dir = %dir.display(), tree = %digest, "stored content tree");
        Ok(ContentRef::new(digest))
    }

    fn fetch(&self, reference: &ContentRef, dest: &Path) -> Result<(), ContentError> {
        let digest = reference.as_str();
        if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ContentError::NotFound(digest.to_string()));
        }

        let raw = self.read_verified(&self.tree_path(digest), digest)?;
        let manifest: Manifest = serde_json::from_slice(&raw)
            .map_err(|e| ContentError::Corrupted(format!("bad manifest {}: {}", digest, e)))?;

        fs::create_dir_all(dest).map_err(Self::io_err(dest))?;
        for entry in &manifest.entries {
            let bytes = self.read_verified(&self.blob_path(&entry.blob), &entry.blob)?;
            let target = Self::safe_join(dest, &entry.path)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(Self::io_err(parent))?;
            }
            fs::write(&target, &bytes).map_err(Self::io_err(&target))?;
        }

        debug!(tree = %digest, dest = %dest.display(), files = manifest.entries.len(), "fetched content tree");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn put_then_fetch_restores_tree() {
        let store_dir = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write(src.path(), "README.md", "# hi\n");
        write(src.path(), "src/lib.rs", "pub fn x() {}\n");

        let store = LocalContentStore::new(store_dir.path());
        let reference = store.put(src.path()).unwrap();
        store.fetch(&reference, dest.path()).unwrap();

        assert_eq!(fs::read_to_string(dest.path().join("README.md")).unwrap(), "# hi\n");
        assert_eq!(
            fs::read_to_string(dest.path().join("src/lib.rs")).unwrap(),
            "pub fn x() {}\n"
        );
    }

    #[test]
    fn put_rejects_plain_file() {
        let store_dir = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        write(src.path(), "file.txt", "data");

        let store = LocalContentStore::new(store_dir.path());
        let result = store.put(&src.path().join("file.txt"));
        assert!(matches!(result, Err(ContentError::NotADirectory(_))));
        assert!(!store_dir.path().join("trees").exists());
    }

    #[test]
    fn same_contents_same_reference() {
        let store_dir = TempDir::new().unwrap();
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write(a.path(), "x/y.txt", "same");
        write(b.path(), "x/y.txt", "same");

        let store = LocalContentStore::new(store_dir.path());
        assert_eq!(store.put(a.path()).unwrap(), store.put(b.path()).unwrap());
    }

    #[test]
    fn different_contents_different_reference() {
        let store_dir = TempDir::new().unwrap();
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write(a.path(), "f", "one");
        write(b.path(), "f", "two");

        let store = LocalContentStore::new(store_dir.path());
        assert_ne!(store.put(a.path()).unwrap(), store.put(b.path()).unwrap());
    }

    #[test]
    fn fetch_unknown_reference() {
        let store_dir = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let store = LocalContentStore::new(store_dir.path());

        let result = store.fetch(&ContentRef::new("Qm-not-local"), dest.path());
        assert!(matches!(result, Err(ContentError::NotFound(_))));

        let missing = ContentRef::new("0".repeat(64));
        assert!(matches!(
            store.fetch(&missing, dest.path()),
            Err(ContentError::NotFound(_))
        ));
    }

    #[test]
    fn fetch_detects_tampered_blob() {
        let store_dir = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write(src.path(), "f", "original");

        let store = LocalContentStore::new(store_dir.path());
        let reference = store.put(src.path()).unwrap();
        let blob = LocalContentStore::digest(b"original");
        fs::write(store.blob_path(&blob), "tampered").unwrap();

        assert!(matches!(
            store.fetch(&reference, dest.path()),
            Err(ContentError::Corrupted(_))
        ));
    }

    #[test]
    fn safe_join_rejects_traversal() {
        let dest = Path::new("/tmp/dest");
        assert!(LocalContentStore::safe_join(dest, "../etc/passwd").is_err());
        assert!(LocalContentStore::safe_join(dest, "/abs").is_err());
        assert!(LocalContentStore::safe_join(dest, "").is_err());
        assert!(LocalContentStore::safe_join(dest, "a/b").is_ok());
    }
}
