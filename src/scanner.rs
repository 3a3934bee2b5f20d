//! File Scanner: a `walkdir` pass that skips hidden directories,
//! configured vendor/build directories, and anything outside the Language
//! Registry, emitting a deterministic, path-sorted candidate list with
//! content hashes.

use crate::config::Config;
use crate::error::Result;
use crate::registry::{Language, LanguageRegistry};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub language: Language,
    pub content_hash: String,
}

pub struct FileScanner {
    registry: LanguageRegistry,
}

impl FileScanner {
    pub fn new() -> Self {
        Self {
            registry: LanguageRegistry::new(),
        }
    }

    /// Walks `root`, returning files sorted by relative path so progress
    /// metrics and hash-diff reconciliation stay stable run to run.
    pub fn scan(&self, root: &Path, config: &Config) -> Result<Vec<ScannedFile>> {
        let root_canonical = root.canonicalize()?;
        let mut files = Vec::new();

        for entry in walkdir::WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.path() == root || !Self::is_ignored_dir(e.path(), config))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if Self::is_symlink_outside_root(path, &root_canonical) {
                continue;
            }
            let Some(language) = self.registry.language_for_path(path) else {
                continue;
            };
            let metadata = match std::fs::metadata(path) {
                Ok(m) => m,
                Err(_) => continue,
            };
            if metadata.len() > config.scan_max_file_size {
                continue;
            }
            let relative_path = match path.strip_prefix(root) {
                Ok(p) => p.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            let bytes = match std::fs::read(path) {
                Ok(b) => b,
                Err(_) => continue,
            };
            let content_hash = hash_bytes(&bytes);
            files.push(ScannedFile {
                relative_path,
                absolute_path: path.to_path_buf(),
                language,
                content_hash,
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    fn is_ignored_dir(path: &Path, config: &Config) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        if path.is_dir() && name.starts_with('.') {
            return true;
        }
        if path.is_dir() && config.vendor_dir_names.iter().any(|v| v == name.as_ref()) {
            return true;
        }
        false
    }

    fn is_symlink_outside_root(path: &Path, root_canonical: &Path) -> bool {
        let metadata = match std::fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(_) => return false,
        };
        if !metadata.file_type().is_symlink() {
            return false;
        }
        match path.canonicalize() {
            Ok(resolved) => !resolved.starts_with(root_canonical),
            Err(_) => true,
        }
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scan_skips_hidden_and_vendor_dirs_and_sorts_results() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("src/b.rs"), "fn b() {}").unwrap();
        fs::write(dir.path().join("src/a.rs"), "fn a() {}").unwrap();
        fs::write(dir.path().join("node_modules/dep.js"), "module.exports = {};").unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();

        let scanner = FileScanner::new();
        let config = Config::default();
        let files = scanner.scan(dir.path(), &config).unwrap();

        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn scan_skips_files_over_size_cap() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("big.rs"), "x".repeat(200)).unwrap();
        let scanner = FileScanner::new();
        let mut config = Config::default();
        config.scan_max_file_size = 10;
        let files = scanner.scan(dir.path(), &config).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn scan_assigns_correct_language_and_hash() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.go"), "package main").unwrap();
        let scanner = FileScanner::new();
        let files = scanner.scan(dir.path(), &Config::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].language, Language::Go);
        assert_eq!(files[0].content_hash.len(), 64);
    }
}
</content>
