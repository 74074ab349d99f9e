//! Variant cache for incremental builds.
//!
//! AVIF encoding dominates build time: the default background alone is three
//! large rav1e encodes. The process stage consults this cache before every
//! resize and skips the encode when neither the source image nor the encoding
//! parameters changed since the last build.
//!
//! ## Cache keys
//!
//! Entries are **content-addressed** by `source_hash` + `params_hash`, not by
//! output path, so pointing a role at a renamed copy of the same file still
//! hits.
//!
//! - **`source_hash`**: SHA-256 of the source file bytes. Content-based so it
//!   survives `git checkout`, which resets modification times.
//! - **`params_hash`**: SHA-256 of (width, height, format, quality).
//!
//! A hit requires a matching entry *and* the previously written file on disk.
//! When the stored path differs from the requested one the file is copied
//! rather than re-encoded.
//!
//! ## Storage
//!
//! `<processed_dir>/.cache-manifest.json`, next to the generated images.
//! `--no-cache` starts from [`CacheManifest::empty`], so every variant is
//! re-encoded and the old files are overwritten.

use crate::descriptor::ImageType;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Bump to invalidate every existing cache when the key computation changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// Output path → cache entry, plus a reverse index by content key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// `"{source_hash}:{params_hash}"` → output path. Rebuilt on load.
    #[serde(skip)]
    by_content: HashMap<String, String>,
}

fn content_key(source_hash: &str, params_hash: &str) -> String {
    format!("{source_hash}:{params_hash}")
}

impl CacheManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            by_content: HashMap::new(),
        }
    }

    /// Load from `dir`. Missing, unreadable or outdated manifests yield an
    /// empty cache rather than an error.
    pub fn load(dir: &Path) -> Self {
        let path = manifest_path(dir);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::empty();
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "discarding unreadable cache manifest");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            debug!(found = manifest.version, "discarding cache manifest from another version");
            return Self::empty();
        }
        manifest.by_content = manifest
            .entries
            .iter()
            .map(|(path, e)| (content_key(&e.source_hash, &e.params_hash), path.clone()))
            .collect();
        manifest
    }

    pub fn save(&self, dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(dir), json)
    }

    /// Stored output path for this content, if the file still exists under `dir`.
    pub fn find_cached(&self, source_hash: &str, params_hash: &str, dir: &Path) -> Option<String> {
        let stored = self.by_content.get(&content_key(source_hash, params_hash))?;
        dir.join(stored).exists().then(|| stored.clone())
    }

    /// Record an output. A previous entry for the same content under another
    /// path is dropped.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        let key = content_key(&source_hash, &params_hash);
        if let Some(old) = self.by_content.get(&key)
            && *old != output_path
        {
            self.entries.remove(old.as_str());
        }
        self.by_content.insert(key, output_path.clone());
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// SHA-256 of a file's contents as lowercase hex.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// SHA-256 of everything that determines an encoded variant's bytes.
pub fn hash_variant_params(width: u32, height: u32, format: ImageType, quality: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"variant\0");
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(format.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(quality.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILENAME)
}

/// Per-run tally of cache outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hits, self.copies) {
            (0, 0) => write!(f, "{} encoded", self.misses),
            (_, 0) => write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            ),
            _ => write!(
                f,
                "{} cached, {} copied, {} encoded ({} total)",
                self.hits,
                self.copies,
                self.misses,
                self.total()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn manifest_with(path: &str) -> CacheManifest {
        let mut m = CacheManifest::empty();
        m.insert(path.into(), "src".into(), "prm".into());
        m
    }

    #[test]
    fn hit_requires_file_on_disk() {
        let tmp = TempDir::new().unwrap();
        let m = manifest_with("images/bg-1024.avif");
        assert_eq!(m.find_cached("src", "prm", tmp.path()), None);

        fs::create_dir_all(tmp.path().join("images")).unwrap();
        fs::write(tmp.path().join("images/bg-1024.avif"), "x").unwrap();
        assert_eq!(
            m.find_cached("src", "prm", tmp.path()),
            Some("images/bg-1024.avif".to_string())
        );
    }

    #[test]
    fn miss_on_other_source_or_params() {
        let tmp = TempDir::new().unwrap();
        let m = manifest_with("a.avif");
        fs::write(tmp.path().join("a.avif"), "x").unwrap();
        assert_eq!(m.find_cached("other", "prm", tmp.path()), None);
        assert_eq!(m.find_cached("src", "other", tmp.path()), None);
    }

    #[test]
    fn insert_under_new_path_drops_old_entry() {
        let mut m = manifest_with("old.avif");
        m.insert("new.avif".into(), "src".into(), "prm".into());
        assert!(!m.entries.contains_key("old.avif"));
        assert!(m.entries.contains_key("new.avif"));
    }

    #[test]
    fn save_and_load_roundtrip_rebuilds_index() {
        let tmp = TempDir::new().unwrap();
        manifest_with("a.avif").save(tmp.path()).unwrap();
        fs::write(tmp.path().join("a.avif"), "x").unwrap();

        let loaded = CacheManifest::load(tmp.path());
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(
            loaded.find_cached("src", "prm", tmp.path()),
            Some("a.avif".to_string())
        );
    }

    #[test]
    fn load_missing_or_corrupt_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());

        fs::write(manifest_path(tmp.path()), "not json").unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn load_other_version_is_empty() {
        let tmp = TempDir::new().unwrap();
        let json = format!(
            r#"{{"version": {}, "entries": {{"a": {{"source_hash":"h","params_hash":"p"}}}}}}"#,
            MANIFEST_VERSION + 1
        );
        fs::write(manifest_path(tmp.path()), json).unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn hash_file_tracks_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("src.jpg");
        fs::write(&path, b"version 1").unwrap();
        let h1 = hash_file(&path).unwrap();
        assert_eq!(h1.len(), 64);
        assert_eq!(h1, hash_file(&path).unwrap());

        fs::write(&path, b"version 2").unwrap();
        assert_ne!(h1, hash_file(&path).unwrap());
    }

    #[test]
    fn variant_params_hash_covers_every_input() {
        let base = hash_variant_params(1024, 512, ImageType::Avif, 40);
        assert_eq!(base, hash_variant_params(1024, 512, ImageType::Avif, 40));
        assert_ne!(base, hash_variant_params(2048, 512, ImageType::Avif, 40));
        assert_ne!(base, hash_variant_params(1024, 513, ImageType::Avif, 40));
        assert_ne!(base, hash_variant_params(1024, 512, ImageType::Jpeg, 40));
        assert_ne!(base, hash_variant_params(1024, 512, ImageType::Avif, 41));
    }

    #[test]
    fn stats_display() {
        let only_misses = CacheStats {
            misses: 3,
            ..CacheStats::default()
        };
        assert_eq!(only_misses.to_string(), "3 encoded");

        let hits = CacheStats {
            hits: 5,
            misses: 2,
            ..CacheStats::default()
        };
        assert_eq!(hits.to_string(), "5 cached, 2 encoded (7 total)");

        let copies = CacheStats {
            hits: 3,
            copies: 2,
            misses: 1,
        };
        assert_eq!(copies.to_string(), "3 cached, 2 copied, 1 encoded (6 total)");
    }
}
