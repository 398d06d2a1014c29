use crate::media::{MediaFormat, StreamFormat, StreamProtocol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One playable quality/bitrate option of a stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StreamInfo {
    // Identifier unique within one extraction, e.g. "hls-2500"
    pub format_id: String,
    // Url of the stream
    pub url: String,
    // Manifest the stream was expanded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
    pub stream_format: StreamFormat,
    pub media_format: MediaFormat,
    pub protocol: StreamProtocol,
    // Quality of the stream, e.g., "1920x1080"
    pub quality: String,
    // Bitrate of the stream in kbps
    pub bitrate: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    pub codec: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    pub priority: u32,
}

impl StreamInfo {
    pub fn builder(
        url: impl Into<String>,
        stream_format: StreamFormat,
        media_format: MediaFormat,
    ) -> StreamInfoBuilder {
        StreamInfoBuilder::new(url, stream_format, media_format)
    }
}

#[derive(Debug, Clone)]
pub struct StreamInfoBuilder {
    info: StreamInfo,
}

impl StreamInfoBuilder {
    pub fn new(
        url: impl Into<String>,
        stream_format: StreamFormat,
        media_format: MediaFormat,
    ) -> Self {
        Self {
            info: StreamInfo {
                format_id: String::new(),
                url: url.into(),
                manifest_url: None,
                stream_format,
                media_format,
                protocol: StreamProtocol::default(),
                quality: String::new(),
                bitrate: 0,
                width: None,
                height: None,
                fps: None,
                codec: String::new(),
                audio_codec: None,
                priority: 0,
            },
        }
    }

    pub fn format_id(mut self, format_id: impl Into<String>) -> Self {
        self.info.format_id = format_id.into();
        self
    }

    pub fn manifest_url(mut self, manifest_url: impl Into<String>) -> Self {
        self.info.manifest_url = Some(manifest_url.into());
        self
    }

    pub fn protocol(mut self, protocol: StreamProtocol) -> Self {
        self.info.protocol = protocol;
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.info.quality = quality.into();
        self
    }

    pub fn bitrate(mut self, bitrate: u64) -> Self {
        self.info.bitrate = bitrate;
        self
    }

    pub fn resolution_opt(mut self, resolution: Option<(u64, u64)>) -> Self {
        self.info.width = resolution.map(|(w, _)| w);
        self.info.height = resolution.map(|(_, h)| h);
        self
    }

    pub fn fps_opt(mut self, fps: Option<f64>) -> Self {
        self.info.fps = fps;
        self
    }

    pub fn codec(mut self, codec: impl Into<String>) -> Self {
        self.info.codec = codec.into();
        self
    }

    pub fn audio_codec_opt(mut self, audio_codec: Option<String>) -> Self {
        self.info.audio_codec = audio_codec;
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.info.priority = priority;
        self
    }

    pub fn build(self) -> StreamInfo {
        self.info
    }
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.format_id, self.quality)?;
        if self.bitrate > 0 {
            write!(f, " ({} kbps)", self.bitrate)?;
        }
        Ok(())
    }
}
