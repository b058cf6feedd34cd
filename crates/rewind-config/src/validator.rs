//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::RewindConfig;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a loaded configuration. Returns the first violation found.
    pub fn validate(config: &RewindConfig) -> Result<(), ConfigError> {
        if config.capture.text_debounce_ms == 0 {
            return Err(invalid("capture.text_debounce_ms", "must be greater than zero"));
        }
        if config.capture.mutation_window_ms == 0 {
            return Err(invalid("capture.mutation_window_ms", "must be greater than zero"));
        }
        if config.capture.result_probe_delays_ms.is_empty() {
            return Err(invalid("capture.result_probe_delays_ms", "must not be empty"));
        }
        if !config.capture.result_probe_delays_ms.windows(2).all(|w| w[0] <= w[1]) {
            return Err(invalid(
                "capture.result_probe_delays_ms",
                "delays must be non-decreasing",
            ));
        }
        if config.capture.channel_capacity == 0 {
            return Err(invalid("capture.channel_capacity", "must be greater than zero"));
        }
        if config.selectors.max_structural_depth == 0 {
            return Err(invalid("selectors.max_structural_depth", "must be at least 1"));
        }
        let scores = [
            ("selectors.id_score", config.selectors.id_score),
            ("selectors.test_attribute_score", config.selectors.test_attribute_score),
            ("selectors.form_field_score", config.selectors.form_field_score),
            ("selectors.link_href_score", config.selectors.link_href_score),
            ("selectors.visible_text_score", config.selectors.visible_text_score),
            ("selectors.aria_role_score", config.selectors.aria_role_score),
            ("selectors.semantic_class_score", config.selectors.semantic_class_score),
            ("selectors.structural_score", config.selectors.structural_score),
        ];
        for (field, score) in scores {
            if score > 100 {
                return Err(invalid(field, "must be at most 100"));
            }
        }
        if config.executor.step_timeout_ms == 0 {
            return Err(invalid("executor.step_timeout_ms", "must be greater than zero"));
        }
        if config.executor.outcome_poll_ms == 0 {
            return Err(invalid("executor.outcome_poll_ms", "must be greater than zero"));
        }
        if config.executor.outcome_poll_ms > config.executor.step_timeout_ms {
            return Err(invalid(
                "executor.outcome_poll_ms",
                "must not exceed step_timeout_ms",
            ));
        }
        if config.session.max_actions == 0 {
            return Err(invalid("session.max_actions", "must be greater than zero"));
        }
        for pattern in &config.privacy.sensitive_patterns {
            if regex::Regex::new(pattern).is_err() {
                return Err(invalid(
                    "privacy.sensitive_patterns",
                    format!("invalid regex: {}", pattern),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
