//! Configuration schema with defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewindConfig {
    pub capture: CaptureConfig,
    pub selectors: SelectorConfig,
    pub mutation: MutationConfig,
    pub privacy: PrivacyConfig,
    pub session: SessionLimits,
    pub executor: ExecutorConfig,
    /// Path to the session database. `${VAR}` and `~` are expanded.
    pub store_path: String,
}

/// Capture-side timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Debounce window for coalescing keystrokes into one text entry.
    pub text_debounce_ms: u64,
    /// Window over which DOM mutations are batched before significance
    /// is judged.
    pub mutation_window_ms: u64,
    /// Increasing post-navigation delays for the result-surface probe.
    pub result_probe_delays_ms: Vec<u64>,
    /// Cap on a single text buffer's value length.
    pub max_buffer_len: usize,
    /// Capacity of the frame-to-host event channel.
    pub channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            text_debounce_ms: 1500,
            mutation_window_ms: 500,
            result_probe_delays_ms: vec![800, 2000, 4000],
            max_buffer_len: 4096,
            channel_capacity: 256,
        }
    }
}

/// The tunable selector-scoring table. One score per strategy kind; the
/// descriptor builder keeps any viable strategy and ranks by these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub id_score: u8,
    pub test_attribute_score: u8,
    pub form_field_score: u8,
    pub link_href_score: u8,
    pub visible_text_score: u8,
    pub aria_role_score: u8,
    pub semantic_class_score: u8,
    pub structural_score: u8,
    /// Visible-text selectors are only built for text up to this length.
    pub max_text_len: usize,
    /// Structural fallback paths stop after this many ancestors.
    pub max_structural_depth: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            id_score: 100,
            test_attribute_score: 95,
            form_field_score: 80,
            link_href_score: 75,
            visible_text_score: 60,
            aria_role_score: 55,
            semantic_class_score: 40,
            structural_score: 20,
            max_text_len: 40,
            max_structural_depth: 3,
        }
    }
}

/// Significance thresholds for mutation batches. Batches at or below both
/// node thresholds, with no large container, are discarded as noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    pub min_top_level: u32,
    pub min_affected: u32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            min_top_level: 3,
            min_affected: 5,
        }
    }
}

/// Sensitive-field deny-list for submit summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Case-insensitive regexes matched against field name and type.
    pub sensitive_patterns: Vec<String>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            sensitive_patterns: vec![
                "password".to_string(),
                "passwd".to_string(),
                "credit[-_]?card".to_string(),
                "card[-_]?number".to_string(),
                "cvv|cvc".to_string(),
                "ssn|social[-_]?security".to_string(),
                "token|secret|api[-_]?key".to_string(),
            ],
        }
    }
}

/// Session size limits, enforced on append.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLimits {
    pub max_actions: usize,
    pub max_duration_secs: u64,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_actions: 500,
            max_duration_secs: 3600,
        }
    }
}

/// Execution engine budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Per-step budget covering execution plus outcome wait.
    pub step_timeout_ms: u64,
    pub outcome_poll_ms: u64,
    pub abort_on_failure: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_backoff_ms: 750,
            step_timeout_ms: 30_000,
            outcome_poll_ms: 250,
            abort_on_failure: true,
        }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
