use async_trait::async_trait;
use m3u8_rs::{AlternativeMediaType, MasterPlaylist, MediaPlaylist, Playlist, VariantStream};
use reqwest::Client;
use reqwest::header::HeaderMap;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use url::Url;

use super::error::ExtractorError;
use super::platform_extractor::send_checked;
use crate::media::{
    MediaFormat, StreamFormat, StreamInfo, StreamProtocol, SubtitleTrack, Subtitles,
};

/// Parameters for expanding one HLS manifest into formats.
#[derive(Debug, Clone)]
pub struct HlsRequest<'a> {
    pub manifest_url: &'a str,
    pub video_id: &'a str,
    pub media_format: MediaFormat,
    pub live: bool,
    /// Prefix of every generated format id, e.g. "hls".
    pub m3u8_id: &'a str,
    pub protocol: StreamProtocol,
}

impl<'a> HlsRequest<'a> {
    pub fn new(manifest_url: &'a str, video_id: &'a str) -> Self {
        Self {
            manifest_url,
            video_id,
            media_format: MediaFormat::Mp4,
            live: false,
            m3u8_id: "hls",
            protocol: StreamProtocol::M3u8Native,
        }
    }

    pub fn media_format(mut self, media_format: MediaFormat) -> Self {
        self.media_format = media_format;
        self
    }

    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn m3u8_id(mut self, m3u8_id: &'a str) -> Self {
        self.m3u8_id = m3u8_id;
        self
    }

    pub fn protocol(mut self, protocol: StreamProtocol) -> Self {
        self.protocol = protocol;
        self
    }
}

#[async_trait]
pub trait HlsExtractor {
    /// Download the manifest and expand it into formats and subtitle tracks.
    async fn extract_m3u8_formats_and_subtitles(
        &self,
        client: &Client,
        headers: Option<HeaderMap>,
        request: &HlsRequest<'_>,
    ) -> Result<(Vec<StreamInfo>, Subtitles), ExtractorError> {
        let base_url = Url::parse(request.manifest_url).map_err(|e| {
            ExtractorError::HlsPlaylistError(format!(
                "invalid manifest url {}: {e}",
                request.manifest_url
            ))
        })?;

        debug!(
            video_id = request.video_id,
            manifest_url = request.manifest_url,
            "Downloading m3u8 information"
        );
        let response = send_checked(
            client
                .get(request.manifest_url)
                .headers(headers.unwrap_or_default()),
        )
        .await?;
        let body = response.bytes().await?;

        parse_m3u8_formats_and_subtitles(&body, &base_url, request)
    }
}

/// Expand an already downloaded manifest.
pub fn parse_m3u8_formats_and_subtitles(
    body: &[u8],
    base_url: &Url,
    request: &HlsRequest<'_>,
) -> Result<(Vec<StreamInfo>, Subtitles), ExtractorError> {
    let playlist = m3u8_rs::parse_playlist_res(body)
        .map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

    match playlist {
        Playlist::MasterPlaylist(pl) => process_master_playlist(pl, base_url, request),
        Playlist::MediaPlaylist(pl) => Ok((process_media_playlist(&pl, request), Subtitles::new())),
    }
}

fn process_media_playlist(playlist: &MediaPlaylist, request: &HlsRequest<'_>) -> Vec<StreamInfo> {
    if request.live && playlist.end_list {
        warn!(
            video_id = request.video_id,
            "Expected a live playlist but the manifest is already finished"
        );
    }

    vec![
        StreamInfo::builder(
            request.manifest_url,
            StreamFormat::Hls,
            request.media_format,
        )
        .format_id(request.m3u8_id)
        .manifest_url(request.manifest_url)
        .protocol(request.protocol)
        .quality("source")
        .build(),
    ]
}

fn process_master_playlist(
    playlist: MasterPlaylist,
    base_url: &Url,
    request: &HlsRequest<'_>,
) -> Result<(Vec<StreamInfo>, Subtitles), ExtractorError> {
    let mut formats = Vec::new();
    let mut subtitles = Subtitles::new();
    let mut seen_ids: FxHashMap<String, usize> = FxHashMap::default();

    for variant in playlist.variants.iter().filter(|v| !v.is_i_frame) {
        let stream_url = resolve(base_url, &variant.uri)?;
        let bandwidth = variant.average_bandwidth.unwrap_or(variant.bandwidth);
        let bitrate = bandwidth / 1000;
        let stream_name = video_rendition_name(&playlist, variant);

        let suffix = match (stream_name, bitrate) {
            (Some(name), _) => name.to_string(),
            (None, 0) => formats.len().to_string(),
            (None, kbps) => kbps.to_string(),
        };
        let format_id = unique_id(&mut seen_ids, format!("{}-{suffix}", request.m3u8_id));

        let resolution = variant.resolution.as_ref().map(|r| (r.width, r.height));
        let quality = resolution
            .map(|(w, h)| format!("{w}x{h}"))
            .or_else(|| stream_name.map(ToOwned::to_owned))
            .unwrap_or_else(|| "source".to_string());
        let (video_codec, audio_codec) = split_codecs(variant.codecs.as_deref());

        formats.push(
            StreamInfo::builder(stream_url, StreamFormat::Hls, request.media_format)
                .format_id(format_id)
                .manifest_url(request.manifest_url)
                .protocol(request.protocol)
                .quality(quality)
                .bitrate(bitrate)
                .resolution_opt(resolution)
                .fps_opt(variant.frame_rate)
                .codec(video_codec.unwrap_or_default())
                .audio_codec_opt(audio_codec)
                .priority(formats.len() as u32)
                .build(),
        );
    }

    for media in &playlist.alternatives {
        let Some(uri) = media.uri.as_deref() else {
            continue;
        };
        let url = resolve(base_url, uri)?;

        match &media.media_type {
            AlternativeMediaType::Audio | AlternativeMediaType::Video => {
                let format_id = unique_id(
                    &mut seen_ids,
                    format!("{}-{}-{}", request.m3u8_id, media.group_id, media.name),
                );
                let is_audio = media.media_type == AlternativeMediaType::Audio;
                formats.push(
                    StreamInfo::builder(url, StreamFormat::Hls, request.media_format)
                        .format_id(format_id)
                        .manifest_url(request.manifest_url)
                        .protocol(request.protocol)
                        .quality(media.name.clone())
                        .codec(if is_audio { "none" } else { "" })
                        .priority(formats.len() as u32)
                        .build(),
                );
            }
            AlternativeMediaType::Subtitles => {
                let language = media.language.clone().unwrap_or_else(|| "und".to_string());
                subtitles.entry(language).or_default().push(SubtitleTrack {
                    url,
                    ext: "vtt".to_string(),
                    protocol: request.protocol,
                    name: Some(media.name.clone()).filter(|n| !n.is_empty()),
                });
            }
            _ => {}
        }
    }

    debug!(
        video_id = request.video_id,
        formats = formats.len(),
        subtitle_languages = subtitles.len(),
        "Expanded master playlist"
    );

    Ok((formats, subtitles))
}

fn resolve(base_url: &Url, uri: &str) -> Result<String, ExtractorError> {
    base_url
        .join(uri)
        .map(|u| u.to_string())
        .map_err(|e| ExtractorError::HlsPlaylistError(format!("invalid uri {uri}: {e}")))
}

/// Name of the rendition in the variant's VIDEO group, if the manifest has one.
fn video_rendition_name<'p>(playlist: &'p MasterPlaylist, variant: &VariantStream) -> Option<&'p str> {
    let group = variant.video.as_deref()?;
    playlist
        .alternatives
        .iter()
        .find(|m| m.media_type == AlternativeMediaType::Video && m.group_id == group)
        .map(|m| m.name.as_str())
        .filter(|name| !name.is_empty())
}

fn unique_id(seen: &mut FxHashMap<String, usize>, id: String) -> String {
    let count = seen.entry(id.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        id
    } else {
        format!("{id}-{}", *count - 1)
    }
}

const VIDEO_CODEC_PREFIXES: &[&str] = &["avc", "hvc", "hev", "vp0", "vp8", "vp9", "av01", "dvh"];

/// Split a CODECS attribute into (video, audio).
fn split_codecs(codecs: Option<&str>) -> (Option<String>, Option<String>) {
    let mut video = None;
    let mut audio = None;
    for codec in codecs.unwrap_or_default().split(',').map(str::trim) {
        if codec.is_empty() {
            continue;
        }
        let lower = codec.to_ascii_lowercase();
        if VIDEO_CODEC_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            video.get_or_insert_with(|| codec.to_string());
        } else {
            audio.get_or_insert_with(|| codec.to_string());
        }
    }
    (video, audio)
}
