//! Platform-specific configuration types and utilities.
//!
//! Extractors receive their options as a loose `serde_json::Value` ("extras").
//! This module gives those options a typed shape and merges layered extras,
//! e.g. a config file overlaid by command-line values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// PandaLive platform-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PandaLiveConfig {
    /// Override of the live play endpoint (default: the public API)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// User-Agent sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl PandaLiveConfig {
    /// Read the config from extras. Unknown keys are ignored; a malformed
    /// object falls back to defaults.
    pub fn from_extras(extras: Option<&Value>) -> Self {
        let Some(extras) = extras else {
            return Self::default();
        };
        match Self::deserialize(extras) {
            Ok(config) => config,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed PandaLive extras");
                Self::default()
            }
        }
    }
}

/// Merge two JSON objects, with overlay taking precedence.
///
/// This is a shallow merge. For nested objects the overlay completely replaces
/// the base value, and null overlay values never override.
///
/// # Example
/// ```
/// use serde_json::json;
/// use pandalive_parser::extractor::platform_configs::merge_platform_extras;
///
/// let base = Some(json!({"api_url": "https://a", "user_agent": "ua"}));
/// let overlay = Some(json!({"user_agent": "other"}));
/// let merged = merge_platform_extras(base, overlay);
/// assert_eq!(merged, Some(json!({"api_url": "https://a", "user_agent": "other"})));
/// ```
pub fn merge_platform_extras(base: Option<Value>, overlay: Option<Value>) -> Option<Value> {
    match (base, overlay) {
        (None, None) => None,
        (Some(b), None) => Some(b),
        (None, Some(o)) => Some(o),
        (Some(Value::Object(mut base_map)), Some(Value::Object(overlay_map))) => {
            for (k, v) in overlay_map {
                if !v.is_null() {
                    base_map.insert(k, v);
                }
            }
            Some(Value::Object(base_map))
        }
        // If either is not an object, overlay wins
        (_, Some(o)) => Some(o),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_both_none() {
        assert!(merge_platform_extras(None, None).is_none());
    }

    #[test]
    fn test_merge_one_side() {
        let base = json!({"api_url": "https://a"});
        assert_eq!(merge_platform_extras(Some(base.clone()), None), Some(base.clone()));
        assert_eq!(merge_platform_extras(None, Some(base.clone())), Some(base));
    }

    #[test]
    fn test_merge_null_values_ignored() {
        let base = json!({"api_url": "https://a", "user_agent": "ua"});
        let overlay = json!({"api_url": null, "user_agent": "other"});
        assert_eq!(
            merge_platform_extras(Some(base), Some(overlay)),
            Some(json!({"api_url": "https://a", "user_agent": "other"}))
        );
    }

    #[test]
    fn test_merge_non_object_overlay_wins() {
        let base = json!({"api_url": "https://a"});
        assert_eq!(
            merge_platform_extras(Some(base), Some(json!("raw"))),
            Some(json!("raw"))
        );
    }

    #[test]
    fn test_pandalive_config_from_extras() {
        let extras = json!({"api_url": "http://127.0.0.1:9000/v1/live/play", "unrelated": 1});
        let config = PandaLiveConfig::from_extras(Some(&extras));
        assert_eq!(
            config.api_url.as_deref(),
            Some("http://127.0.0.1:9000/v1/live/play")
        );
        assert_eq!(config.user_agent, None);

        let malformed = json!({"api_url": 12});
        assert_eq!(PandaLiveConfig::from_extras(Some(&malformed)), PandaLiveConfig::default());
        assert_eq!(PandaLiveConfig::from_extras(None), PandaLiveConfig::default());
    }
}
