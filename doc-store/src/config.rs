//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use ai_llm_service::AiLlmError;
use ai_llm_service::error_handler::{ConfigError, env_opt_usize, env_or, validate_positive};

use crate::errors::IngestionError;

/// Sliding-window parameters, in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 64,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), IngestionError> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(IngestionError::InvalidChunking {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        Ok(())
    }
}

/// Where the brochure lives, where the index is kept, and how it is built.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub doc_path: PathBuf,
    pub index_dir: PathBuf,
    pub chunking: ChunkingConfig,
    /// Maximum number of concurrent embedding requests during a build.
    pub embed_concurrency: usize,
    /// Download cache for the in-process embedding model; fastembed's default when `None`.
    pub model_cache_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Build from environment variables with defaults.
    ///
    /// - `DOC_PATH` (`data/khungchuongtrinh.pdf`)
    /// - `INDEX_DIR` (`db`)
    /// - `CHUNK_SIZE` (1024), `CHUNK_OVERLAP` (64)
    /// - `EMBEDDING_CONCURRENCY` (4, at least 1)
    /// - `FASTEMBED_CACHE_DIR` (unset)
    ///
    /// # Errors
    /// Non-numeric values, a zero concurrency, or a chunk overlap not smaller
    /// than the chunk size.
    pub fn from_env() -> Result<Self, AiLlmError> {
        let dflt = ChunkingConfig::default();
        let chunking = ChunkingConfig {
            chunk_size: env_opt_usize("CHUNK_SIZE")?.unwrap_or(dflt.chunk_size),
            chunk_overlap: env_opt_usize("CHUNK_OVERLAP")?.unwrap_or(dflt.chunk_overlap),
        };
        if chunking.validate().is_err() {
            return Err(ConfigError::OutOfRange {
                field: "CHUNK_OVERLAP",
                detail: "CHUNK_SIZE must be positive and larger than CHUNK_OVERLAP",
            }
            .into());
        }

        Ok(Self {
            doc_path: env_or("DOC_PATH", "data/khungchuongtrinh.pdf").into(),
            index_dir: env_or("INDEX_DIR", "db").into(),
            chunking,
            embed_concurrency: validate_positive(
                "EMBEDDING_CONCURRENCY",
                env_opt_usize("EMBEDDING_CONCURRENCY")?.unwrap_or(4),
            )?,
            model_cache_dir: std::env::var("FASTEMBED_CACHE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chunking_is_valid() {
        let c = ChunkingConfig::default();
        assert_eq!((c.chunk_size, c.chunk_overlap), (1024, 64));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let bad = ChunkingConfig {
            chunk_size: 10,
            chunk_overlap: 10,
        };
        assert!(matches!(
            bad.validate(),
            Err(IngestionError::InvalidChunking { size: 10, overlap: 10 })
        ));
        let zero = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        };
        assert!(zero.validate().is_err());
    }

    // Only test in this crate that mutates the process environment.
    #[test]
    fn from_env_rejects_bad_numbers() {
        let set = |k: &str, v: Option<&str>| unsafe {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        };
        for k in ["CHUNK_SIZE", "CHUNK_OVERLAP", "EMBEDDING_CONCURRENCY", "INDEX_DIR"] {
            set(k, None);
        }

        let cfg = StoreConfig::from_env().unwrap();
        assert_eq!(cfg.chunking, ChunkingConfig::default());
        assert_eq!(cfg.embed_concurrency, 4);
        assert_eq!(cfg.index_dir, PathBuf::from("db"));

        set("CHUNK_SIZE", Some("two"));
        assert!(matches!(
            StoreConfig::from_env(),
            Err(AiLlmError::Config(ConfigError::InvalidNumber { var: "CHUNK_SIZE", .. }))
        ));

        set("CHUNK_SIZE", Some("32"));
        set("CHUNK_OVERLAP", Some("32"));
        assert!(matches!(
            StoreConfig::from_env(),
            Err(AiLlmError::Config(ConfigError::OutOfRange { .. }))
        ));

        set("CHUNK_OVERLAP", Some("4"));
        set("EMBEDDING_CONCURRENCY", Some("0"));
        assert!(matches!(
            StoreConfig::from_env(),
            Err(AiLlmError::Config(ConfigError::OutOfRange { field: "EMBEDDING_CONCURRENCY", .. }))
        ));

        set("EMBEDDING_CONCURRENCY", Some("8"));
        let cfg = StoreConfig::from_env().unwrap();
        assert_eq!((cfg.chunking.chunk_size, cfg.chunking.chunk_overlap), (32, 4));
        assert_eq!(cfg.embed_concurrency, 8);

        for k in ["CHUNK_SIZE", "CHUNK_OVERLAP", "EMBEDDING_CONCURRENCY"] {
            set(k, None);
        }
    }
}
