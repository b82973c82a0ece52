use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, StreamError, DEFAULT_CHUNK_SIZE, KILOBYTE};

/// Settings shared by the chunk and element iterators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub chunk_size: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE, // 4KB, a typical page
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize) -> Result<Self> {
        let config = Self { chunk_size };
        config.validate()?;
        Ok(config)
    }

    pub fn small() -> Self {
        Self {
            chunk_size: 512, // one disk sector
        }
    }

    pub fn balanced() -> Self {
        Self::default()
    }

    pub fn large() -> Self {
        Self {
            chunk_size: 512 * KILOBYTE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(StreamError::InvalidArgument(
                "chunk size must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// Loads the config from a JSON file. Missing fields fall back to
    /// [`ChunkConfig::default`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        log::debug!("config: loading {}", path.as_ref().display());

        let raw = fs::read(path.as_ref())?;
        let config: Self = serde_json::from_slice(&raw)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn presets_are_valid() {
        for config in [
            ChunkConfig::small(),
            ChunkConfig::balanced(),
            ChunkConfig::large(),
        ] {
            assert!(config.validate().is_ok());
        }
        assert_eq!(ChunkConfig::balanced(), ChunkConfig::default());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            ChunkConfig::new(0),
            Err(StreamError::InvalidArgument(_))
        ));
    }

    #[test]
    fn load_fills_missing_fields() {
        let dir = TempDir::new("chunk_config").unwrap();
        let path = dir.path().join("config.json");
        fs::File::create(&path)
            .unwrap()
            .write_all(b"{}")
            .unwrap();

        let config = ChunkConfig::load(&path).unwrap();
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn load_reads_chunk_size() {
        let dir = TempDir::new("chunk_config").unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "chunk_size": 64 }"#).unwrap();

        assert_eq!(ChunkConfig::load(&path).unwrap().chunk_size, 64);
    }

    #[test]
    fn load_rejects_garbage_and_zero() {
        let dir = TempDir::new("chunk_config").unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, "chunk_size = 64").unwrap();
        assert!(matches!(
            ChunkConfig::load(&path),
            Err(StreamError::Config(_))
        ));

        fs::write(&path, r#"{ "chunk_size": 0 }"#).unwrap();
        assert!(matches!(
            ChunkConfig::load(&path),
            Err(StreamError::InvalidArgument(_))
        ));
    }
}
