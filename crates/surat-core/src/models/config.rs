//! Configuration structures for extraction, the preview queue and the cache.

use serde::{Deserialize, Serialize};

use crate::error::SuratError;

/// Main configuration for surat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuratConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Preview queue configuration.
    pub queue: QueueConfig,

    /// Result cache configuration.
    pub cache: CacheConfig,

    /// Text source configuration.
    pub source: SourceConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of document number candidates reported.
    pub max_candidates: usize,

    /// Number of leading non-empty lines treated as letterhead.
    pub header_lines: usize,

    /// Number of leading lines searched for a document-type heading.
    pub subject_scan_lines: usize,

    /// Smallest amount (in Rupiah) accepted by the amount extractor.
    pub min_amount: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_candidates: 5,
            header_lines: 8,
            subject_scan_lines: 15,
            min_amount: 1000,
        }
    }
}

/// Preview queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Number of concurrent workers.
    pub concurrency: usize,

    /// Per-job wall-clock timeout in milliseconds (minimum 1000).
    pub timeout_ms: u64,

    /// How long finished jobs stay queryable, in seconds.
    pub retention_age_secs: u64,

    /// How many finished jobs are kept per terminal state.
    pub retention_count: usize,

    /// How often the retention reaper runs, in seconds.
    pub reap_interval_secs: u64,
}

impl QueueConfig {
    /// Smallest accepted job timeout.
    pub const MIN_TIMEOUT_MS: u64 = 1000;

    /// Check the values a queue can be started with.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.timeout_ms < Self::MIN_TIMEOUT_MS {
            return Err(format!(
                "timeout_ms must be at least {} (got {})",
                Self::MIN_TIMEOUT_MS,
                self.timeout_ms
            ));
        }
        if self.reap_interval_secs == 0 {
            return Err("reap_interval_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            timeout_ms: 120_000,
            retention_age_secs: 3600,
            retention_count: 100,
            reap_interval_secs: 60,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to always recompute previews.
    pub enabled: bool,

    /// Time-to-live of a cached preview, in seconds.
    pub ttl_secs: u64,

    /// Prefix of every cache key.
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            key_prefix: "ocr-preview".to_string(),
        }
    }
}

/// Which text source reads input documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Pick from the file extension.
    #[default]
    Auto,
    /// Plain text (already OCR'd).
    Plain,
    /// Embedded PDF text.
    Pdf,
}

/// Text source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Auto,
            min_text_length: 20,
        }
    }
}

impl SuratConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, SuratError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| SuratError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), SuratError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| SuratError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SuratConfig::default();
        assert_eq!(config.queue.concurrency, 1);
        assert_eq!(config.queue.timeout_ms, 120_000);
        assert_eq!(config.extraction.max_candidates, 5);
        assert!(config.queue.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SuratConfig =
            serde_json::from_str(r#"{ "queue": { "concurrency": 4 } }"#).unwrap();
        assert_eq!(config.queue.concurrency, 4);
        assert_eq!(config.queue.timeout_ms, 120_000);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.source.kind, SourceKind::Auto);
    }

    #[test]
    fn test_validate_rejects_short_timeout() {
        let config = QueueConfig {
            timeout_ms: 999,
            ..QueueConfig::default()
        };
        assert!(config.validate().is_err());

        let config = QueueConfig {
            concurrency: 0,
            ..QueueConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
