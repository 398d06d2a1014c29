use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use super::{stream_info::StreamInfo, subtitle::Subtitles};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Normalized result of resolving a live room.
///
/// Metadata fields are optional: a value the platform did not send, or sent in
/// a shape that could not be coerced, is left out instead of failing the
/// extraction.
///
/// # Examples
///
/// ```rust
/// use pandalive_parser::media::media_info::MediaInfo;
///
/// let media = MediaInfo::builder("foryoung65", "https://www.pandalive.co.kr/live/play/foryoung65")
///     .title("Sample Stream")
///     .view_count_opt(Some(42))
///     .is_live(true)
///     .formats(vec![])
///     .build();
/// assert_eq!(media.view_count, Some(42));
/// ```
pub struct MediaInfo {
    pub id: String,
    // Page the room was resolved from
    pub site_url: String,
    pub is_live: bool,
    pub formats: Vec<StreamInfo>,
    pub subtitles: Subtitles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Broadcast start, serialized as unix seconds.
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_idx: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_nickname: Option<String>,
    // Headers a downloader should replay when fetching the formats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<FxHashMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct MediaInfoBuilder {
    info: MediaInfo,
}

impl MediaInfo {
    pub fn builder(id: impl Into<String>, site_url: impl Into<String>) -> MediaInfoBuilder {
        MediaInfoBuilder::new(id, site_url)
    }

    /// Serialize the MediaInfo to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize the MediaInfo to a pretty-formatted JSON string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a MediaInfo from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Human-readable summary framed with box-drawing characters.
    pub fn pretty_print(&self) -> String {
        use std::fmt::Write;

        let mut output = String::new();
        let width = 60;
        let border_top = format!("╔{}╗", "═".repeat(width));
        let border_bottom = format!("╚{}╝", "═".repeat(width));
        let separator = format!("╠{}╣", "═".repeat(width));
        let thin_separator = format!("╟{}╢", "─".repeat(width));

        let format_line = |label: &str, value: &str| -> String {
            let content = format!("  {label} {value}");
            let padding = width.saturating_sub(content.chars().count());
            format!("║{}{}║", content, " ".repeat(padding))
        };

        let format_title = |title: &str| -> String {
            let padding_total = width.saturating_sub(title.chars().count());
            let left_pad = padding_total / 2;
            let right_pad = padding_total - left_pad;
            format!(
                "║{}{}{}║",
                " ".repeat(left_pad),
                title,
                " ".repeat(right_pad)
            )
        };

        let truncate = |value: &str, max: usize| -> String {
            if value.chars().count() > max {
                let head: String = value.chars().take(max).collect();
                format!("{head}...")
            } else {
                value.to_string()
            }
        };

        let _ = writeln!(output, "{border_top}");
        let _ = writeln!(output, "{}", format_title("MEDIA INFO"));
        let _ = writeln!(output, "{separator}");

        let _ = writeln!(output, "{}", format_line("ID:", &self.id));
        if let Some(title) = &self.title {
            let _ = writeln!(output, "{}", format_line("Title:", &truncate(title, 45)));
        }
        if let Some(nickname) = &self.user_nickname {
            let _ = writeln!(output, "{}", format_line("Streamer:", nickname));
        }
        let _ = writeln!(output, "{}", format_line("Site:", &truncate(&self.site_url, 45)));

        let live_status = if self.is_live { "LIVE" } else { "Offline" };
        let _ = writeln!(output, "{}", format_line("Status:", live_status));

        if let Some(start_time) = &self.timestamp {
            let time_str = start_time.format("%Y-%m-%d %H:%M:%S UTC").to_string();
            let _ = writeln!(output, "{}", format_line("Started:", &time_str));
        }

        if let Some(thumbnail) = &self.thumbnail {
            let _ = writeln!(output, "{}", format_line("Thumbnail:", &truncate(thumbnail, 40)));
        }

        let counters = [
            ("Viewers:", self.view_count),
            ("Plays:", self.play_count),
            ("Likes:", self.like_count),
        ];
        for (label, count) in counters {
            if let Some(count) = count {
                let _ = writeln!(output, "{}", format_line(label, &count.to_string()));
            }
        }

        if !self.formats.is_empty() {
            let _ = writeln!(output, "{thin_separator}");
            let _ = writeln!(output, "{}", format_title("FORMATS"));
            for stream in &self.formats {
                let _ = writeln!(output, "{}", format_line("-", &stream.to_string()));
            }
        }

        if !self.subtitles.is_empty() {
            let _ = writeln!(output, "{thin_separator}");
            let _ = writeln!(output, "{}", format_title("SUBTITLES"));
            for (language, tracks) in &self.subtitles {
                let line = format!("{language} ({} track(s))", tracks.len());
                let _ = writeln!(output, "{}", format_line("-", &line));
            }
        }

        let _ = write!(output, "{border_bottom}");

        output
    }
}

impl MediaInfoBuilder {
    pub fn new(id: impl Into<String>, site_url: impl Into<String>) -> Self {
        Self {
            info: MediaInfo {
                id: id.into(),
                site_url: site_url.into(),
                is_live: false,
                formats: Vec::new(),
                subtitles: Subtitles::new(),
                title: None,
                timestamp: None,
                thumbnail: None,
                view_count: None,
                play_count: None,
                like_count: None,
                user_id: None,
                user_idx: None,
                user_nickname: None,
                headers: None,
            },
        }
    }

    pub fn is_live(mut self, is_live: bool) -> Self {
        self.info.is_live = is_live;
        self
    }

    pub fn formats(mut self, formats: Vec<StreamInfo>) -> Self {
        self.info.formats = formats;
        self
    }

    pub fn subtitles(mut self, subtitles: Subtitles) -> Self {
        self.info.subtitles = subtitles;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.info.title = Some(title.into());
        self
    }

    pub fn title_opt(mut self, title: Option<String>) -> Self {
        self.info.title = title;
        self
    }

    pub fn timestamp_opt(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.info.timestamp = timestamp;
        self
    }

    pub fn thumbnail_opt(mut self, thumbnail: Option<String>) -> Self {
        self.info.thumbnail = thumbnail;
        self
    }

    pub fn view_count_opt(mut self, view_count: Option<i64>) -> Self {
        self.info.view_count = view_count;
        self
    }

    pub fn play_count_opt(mut self, play_count: Option<i64>) -> Self {
        self.info.play_count = play_count;
        self
    }

    pub fn like_count_opt(mut self, like_count: Option<i64>) -> Self {
        self.info.like_count = like_count;
        self
    }

    pub fn user_id_opt(mut self, user_id: Option<String>) -> Self {
        self.info.user_id = user_id;
        self
    }

    pub fn user_idx_opt(mut self, user_idx: Option<i64>) -> Self {
        self.info.user_idx = user_idx;
        self
    }

    pub fn user_nickname_opt(mut self, user_nickname: Option<String>) -> Self {
        self.info.user_nickname = user_nickname;
        self
    }

    pub fn headers(mut self, headers: FxHashMap<String, String>) -> Self {
        self.info.headers = Some(headers);
        self
    }

    pub fn build(self) -> MediaInfo {
        self.info
    }
}
