//! Tunables for the indexing pipeline, loaded from an optional `codescope.toml`
//! at the project root and overridable by environment variables (`CODESCOPE_*`).
//!
//! A small, flat settings struct with `Default` values baked in rather
//! than a required config file.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bytes above which a symbol's `source_code` is omitted during full extraction.
    pub max_symbol_size: usize,
    /// Bytes above which a symbol's `source_code` is omitted during the
    /// mutation-triggered reindex path (tighter, since the caller already has
    /// the body it just wrote).
    pub max_symbol_size_mutation: usize,
    /// Whether extractors attach doc comments/doc strings to symbols.
    pub extract_doc_strings: bool,
    /// Bounded parse/extract concurrency for `index_project`.
    pub parse_workers: usize,
    /// Max number of symbols embedded in a single `Embedder::embed_documents` call.
    pub max_batch_size: usize,
    /// Expected embedding vector width; mismatches trigger a purge-and-reindex.
    pub embedding_dimension: usize,
    /// Files larger than this are skipped by the scanner.
    pub scan_max_file_size: u64,
    /// Seconds a terminal job is retained in the job registry before eviction.
    pub job_ttl_seconds: u64,
    /// Directory names skipped outright by the scanner, in addition to
    /// hidden (dot-prefixed) directories.
    pub vendor_dir_names: Vec<String>,
    /// Symbol-count threshold above which the HNSW index is used instead of
    /// a brute-force cosine scan for a project's vector queries.
    pub hnsw_threshold: usize,
    /// A symbol's `source_code` length above which it is additionally split
    /// into fixed-size chunks for the hybrid search path, on top of its own
    /// single-vector embedding.
    pub chunk_threshold_bytes: u64,
    /// Target size in bytes of each chunk window.
    pub chunk_window_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_symbol_size: 50 * 1024,
            max_symbol_size_mutation: 10 * 1024,
            extract_doc_strings: true,
            parse_workers: num_cpus::get().max(1),
            max_batch_size: 32,
            embedding_dimension: 256,
            scan_max_file_size: 2 * 1024 * 1024,
            job_ttl_seconds: 15 * 60,
            vendor_dir_names: vec![
                "node_modules".into(),
                "target".into(),
                "vendor".into(),
                "dist".into(),
                "build".into(),
                ".venv".into(),
                "venv".into(),
                "__pycache__".into(),
            ],
            hnsw_threshold: 2_000,
            chunk_threshold_bytes: 8 * 1024,
            chunk_window_bytes: 2 * 1024,
        }
    }
}

impl Config {
    /// Load `codescope.toml` from `root` if present, else the user's global
    /// config under `dirs::config_dir()`, else defaults; then apply any
    /// `CODESCOPE_*` environment overrides on top.
    pub fn load(root: &Path) -> Self {
        let mut cfg = Self::read_toml(&root.join("codescope.toml"))
            .or_else(|| dirs::config_dir().and_then(|d| Self::read_toml(&d.join("codescope/config.toml"))))
            .unwrap_or_default();
        Self::apply_env_overrides(&mut cfg);
        cfg
    }

    fn read_toml(path: &Path) -> Option<Config> {
        std::fs::read_to_string(path).ok().and_then(|text| toml::from_str(&text).ok())
    }

    fn apply_env_overrides(cfg: &mut Config) {
        if let Ok(v) = std::env::var("CODESCOPE_PARSE_WORKERS") {
            if let Ok(n) = v.parse() {
                cfg.parse_workers = n;
            }
        }
        if let Ok(v) = std::env::var("CODESCOPE_MAX_BATCH_SIZE") {
            if let Ok(n) = v.parse() {
                cfg.max_batch_size = n;
            }
        }
        if let Ok(v) = std::env::var("CODESCOPE_EMBEDDING_DIMENSION") {
            if let Ok(n) = v.parse() {
                cfg.embedding_dimension = n;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn load_falls_back_to_defaults_when_no_file_is_present() {
        let dir = tempdir().unwrap();
        let cfg = Config::load(dir.path());
        assert_eq!(cfg.hnsw_threshold, Config::default().hnsw_threshold);
    }

    #[test]
    fn load_reads_project_level_codescope_toml() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("codescope.toml"), "hnsw_threshold = 9000\n").unwrap();
        let cfg = Config::load(dir.path());
        assert_eq!(cfg.hnsw_threshold, 9000);
    }

    #[test]
    #[serial]
    fn env_override_wins_over_the_file_value() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("codescope.toml"), "max_batch_size = 8\n").unwrap();
        std::env::set_var("CODESCOPE_MAX_BATCH_SIZE", "64");
        let cfg = Config::load(dir.path());
        std::env::remove_var("CODESCOPE_MAX_BATCH_SIZE");
        assert_eq!(cfg.max_batch_size, 64);
    }
}
</content>
