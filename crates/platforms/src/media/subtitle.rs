use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::media::StreamProtocol;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub url: String,
    pub ext: String,
    pub protocol: StreamProtocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Subtitle tracks keyed by language tag ("und" when the manifest has none).
pub type Subtitles = BTreeMap<String, Vec<SubtitleTrack>>;
