use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    extractor::{
        error::ExtractorError,
        hls_extractor::{HlsExtractor, HlsRequest},
        platform_configs::PandaLiveConfig,
        platform_extractor::{Extractor, PlatformExtractor, send_checked},
        utils::{
            PathSegment, capture_group_1_or_invalid_url, int_or_none, parse_iso8601, pick,
            str_or_none, url_or_none,
        },
    },
    media::{MediaFormat, MediaInfo, StreamProtocol, media_info::MediaInfoBuilder},
};

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.|m\.)pandalive\.co\.kr/live/play/([a-z0-9]+)").unwrap()
});

const MANIFEST_PATH: &[PathSegment<'static>] = &[
    PathSegment::Key("PlayList"),
    PathSegment::Key("hls"),
    PathSegment::Index(0),
    PathSegment::Key("url"),
];

pub struct PandaLive {
    extractor: Extractor,
    api_url: String,
}

impl PandaLive {
    const BASE_URL: &str = "https://www.pandalive.co.kr";
    const LIVE_PLAY_URL: &str = "https://api.pandalive.co.kr/v1/live/play";

    pub fn new(
        url: String,
        client: Client,
        cookies: Option<String>,
        extras: Option<Value>,
    ) -> Self {
        let config = PandaLiveConfig::from_extras(extras.as_ref());

        let mut extractor = Extractor::new("PandaLive", url, client);
        extractor.set_origin_and_referer_static(Self::BASE_URL);
        if let Some(user_agent) = config.user_agent.as_deref() {
            extractor.add_header_typed(reqwest::header::USER_AGENT, user_agent);
        }
        if let Some(cookies) = cookies {
            extractor.set_cookies_from_string(&cookies);
        }

        Self {
            extractor,
            api_url: config
                .api_url
                .unwrap_or_else(|| Self::LIVE_PLAY_URL.to_string()),
        }
    }

    pub fn extract_channel_id(&self) -> Result<&str, ExtractorError> {
        capture_group_1_or_invalid_url(&URL_REGEX, &self.extractor.url)
    }

    async fn get_live_detail(&self, channel_id: &str) -> Result<Value, ExtractorError> {
        let form = [
            ("action", "watch"),
            ("userId", channel_id),
            ("password", ""),
            ("shareLinkType", ""),
        ];

        debug!(channel_id, "Downloading channel info");
        let request = self.extractor.post(&self.api_url).form(&form);
        let response = match send_checked(request).await {
            Ok(response) => response,
            // The API rejects watch requests for offline channels with 400.
            Err(ExtractorError::HttpStatus { status, .. }) if status == StatusCode::BAD_REQUEST => {
                return Err(ExtractorError::UserNotLive {
                    channel_id: channel_id.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let body = response.text().await?;
        debug!("live detail: {}", body);
        Ok(serde_json::from_str(&body)?)
    }

    /// Copy the `media` object into the record, dropping values that fail
    /// their coercion.
    fn apply_media_fields(builder: MediaInfoBuilder, media: Option<&Value>) -> MediaInfoBuilder {
        let Some(media) = media else {
            return builder;
        };
        let field = |key: &str| media.get(key);

        builder
            .title_opt(field("title").and_then(str_or_none))
            .timestamp_opt(
                field("startTime")
                    .and_then(Value::as_str)
                    .and_then(|s| parse_iso8601(s, ' ')),
            )
            .thumbnail_opt(field("thumbUrl").and_then(url_or_none))
            .view_count_opt(field("user").and_then(int_or_none))
            .play_count_opt(field("playCnt").and_then(int_or_none))
            .like_count_opt(field("likeCnt").and_then(int_or_none))
            .user_id_opt(field("userId").and_then(str_or_none))
            .user_idx_opt(field("userIdx").and_then(int_or_none))
            .user_nickname_opt(field("userNick").and_then(str_or_none))
    }

    /// Resolve a protocol-relative `//host/...` URL against the API endpoint,
    /// so it inherits the API's scheme.
    fn absolute_url(&self, url: &str) -> Option<String> {
        let resolved = Url::parse(&self.api_url).and_then(|base| base.join(url));
        match resolved {
            Ok(resolved) => Some(resolved.into()),
            Err(e) => {
                debug!(url, error = %e, "Discarding unresolvable manifest url");
                None
            }
        }
    }

    pub async fn get_live_info(&self) -> Result<MediaInfo, ExtractorError> {
        let channel_id = self.extract_channel_id()?;
        let live_detail = self.get_live_detail(channel_id).await?;

        let manifest_url = pick(&live_detail, MANIFEST_PATH, url_or_none)
            .and_then(|url| self.absolute_url(&url))
            .ok_or_else(|| ExtractorError::ManifestNotFound {
                channel_id: channel_id.to_string(),
            })?;

        let request = HlsRequest::new(&manifest_url, channel_id)
            .media_format(MediaFormat::Mp4)
            .live(true)
            .m3u8_id("hls")
            .protocol(StreamProtocol::M3u8Native);
        let (formats, subtitles) = self
            .extract_m3u8_formats_and_subtitles(
                &self.extractor.client,
                Some(self.extractor.get_platform_headers()),
                &request,
            )
            .await?;

        let builder = MediaInfo::builder(channel_id, self.extractor.url.clone())
            .is_live(true)
            .formats(formats)
            .subtitles(subtitles)
            .headers(self.extractor.get_platform_headers_map());

        Ok(Self::apply_media_fields(builder, live_detail.get("media")).build())
    }
}

impl HlsExtractor for PandaLive {}

#[async_trait]
impl PlatformExtractor for PandaLive {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn extract(&self) -> Result<MediaInfo, ExtractorError> {
        self.get_live_info().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use crate::extractor::default::test_client;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHANNEL: &str = "foryoung65";

    const MASTER: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-STREAM-INF:BANDWIDTH=4000000,RESOLUTION=1920x1080,CODECS=\"avc1.640028,mp4a.40.2\"
1080/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=1500000,RESOLUTION=854x480,CODECS=\"avc1.4d401e,mp4a.40.2\"
480/index.m3u8
";

    fn room_url() -> String {
        format!("https://www.pandalive.co.kr/live/play/{CHANNEL}")
    }

    fn extractor_for(server: &MockServer) -> PandaLive {
        PandaLive::new(
            room_url(),
            test_client(),
            None,
            Some(json!({"api_url": format!("{}/v1/live/play", server.uri())})),
        )
    }

    async fn mount_api(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/v1/live/play"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(format!(
                "action=watch&userId={CHANNEL}&password=&shareLinkType="
            )))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_manifest(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/live/master.m3u8"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MASTER))
            .mount(server)
            .await;
    }

    fn live_detail(server: &MockServer, media: Value) -> Value {
        json!({
            "result": true,
            "PlayList": {"hls": [{"url": format!("{}/live/master.m3u8", server.uri())}]},
            "media": media,
        })
    }

    #[test]
    fn test_extract_channel_id() {
        let cases = [
            ("https://www.pandalive.co.kr/live/play/foryoung65", Some("foryoung65")),
            ("http://m.pandalive.co.kr/live/play/abc123", Some("abc123")),
            ("https://www.pandalive.co.kr/live/play/abc123?ref=main", Some("abc123")),
            ("https://pandalive.co.kr/live/play/abc123", None),
            ("https://www.pandalive.co.kr/live/play/", None),
            ("https://www.pandalive.co.kr/channel/abc123", None),
        ];

        for (url, expected) in cases {
            let extractor = PandaLive::new(url.to_string(), test_client(), None, None);
            match expected {
                Some(id) => assert_eq!(extractor.extract_channel_id().unwrap(), id, "{url}"),
                None => assert!(
                    matches!(extractor.extract_channel_id(), Err(ExtractorError::InvalidUrl(_))),
                    "{url}"
                ),
            }
        }
    }

    #[test]
    fn test_uppercase_id_is_not_captured_whole() {
        let extractor = PandaLive::new(
            "https://www.pandalive.co.kr/live/play/abcDEF".to_string(),
            test_client(),
            None,
            None,
        );
        assert_eq!(extractor.extract_channel_id().unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let extractor = PandaLive::new(
            "https://www.pandalive.co.kr/notaroom".to_string(),
            test_client(),
            None,
            Some(json!({"api_url": format!("{}/v1/live/play", server.uri())})),
        );
        assert!(matches!(
            extractor.extract().await,
            Err(ExtractorError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_request_means_not_live() {
        let server = MockServer::start().await;
        mount_api(
            &server,
            ResponseTemplate::new(400).set_body_json(json!({"result": false, "message": "offline"})),
        )
        .await;

        let err = extractor_for(&server).extract().await.unwrap_err();
        assert!(err.is_not_live());
        assert!(
            matches!(err, ExtractorError::UserNotLive { ref channel_id } if channel_id == CHANNEL)
        );
    }

    #[tokio::test]
    async fn test_other_statuses_propagate_unchanged() {
        for status in [403u16, 404, 500, 503] {
            let server = MockServer::start().await;
            mount_api(&server, ResponseTemplate::new(status)).await;

            let err = extractor_for(&server).extract().await.unwrap_err();
            assert!(!err.is_not_live(), "status {status}");
            match err {
                ExtractorError::HttpStatus { status: got, .. } => {
                    assert_eq!(got.as_u16(), status)
                }
                other => panic!("unexpected error for {status}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let extractor = PandaLive::new(
            room_url(),
            test_client(),
            None,
            Some(json!({"api_url": "http://127.0.0.1:1/v1/live/play"})),
        );

        let err = extractor.extract().await.unwrap_err();
        assert!(matches!(err, ExtractorError::HttpError(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let server = MockServer::start().await;
        mount_api(&server, ResponseTemplate::new(200).set_body_string("<html></html>")).await;

        let err = extractor_for(&server).extract().await.unwrap_err();
        assert!(matches!(err, ExtractorError::JsonError(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_extract_live_room() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        let server = MockServer::start().await;
        let detail = live_detail(
            &server,
            json!({
                "title": "Stream A",
                "startTime": "2023-01-01 12:00:00",
                "thumbUrl": "https://example/thumb.jpg",
                "user": "42",
                "playCnt": 1200,
                "likeCnt": "35",
                "userId": CHANNEL,
                "userIdx": 9876,
                "userNick": "panda",
            }),
        );
        mount_api(&server, ResponseTemplate::new(200).set_body_json(detail)).await;
        mount_manifest(&server).await;

        let media_info = extractor_for(&server).extract().await.unwrap();

        assert_eq!(media_info.id, CHANNEL);
        assert_eq!(media_info.site_url, room_url());
        assert!(media_info.is_live);
        assert_eq!(media_info.title.as_deref(), Some("Stream A"));
        assert_eq!(
            media_info.timestamp.map(|t| t.timestamp()),
            Some(1_672_574_400)
        );
        assert_eq!(
            media_info.thumbnail.as_deref(),
            Some("https://example/thumb.jpg")
        );
        assert_eq!(media_info.view_count, Some(42));
        assert_eq!(media_info.play_count, Some(1200));
        assert_eq!(media_info.like_count, Some(35));
        assert_eq!(media_info.user_id.as_deref(), Some(CHANNEL));
        assert_eq!(media_info.user_idx, Some(9876));
        assert_eq!(media_info.user_nickname.as_deref(), Some("panda"));

        let ids: Vec<&str> = media_info
            .formats
            .iter()
            .map(|f| f.format_id.as_str())
            .collect();
        assert_eq!(ids, vec!["hls-4000", "hls-1500"]);
        assert!(
            media_info
                .formats
                .iter()
                .all(|f| f.media_format == MediaFormat::Mp4
                    && f.protocol == StreamProtocol::M3u8Native)
        );
        assert!(media_info.subtitles.is_empty());

        let headers = media_info.headers.unwrap();
        assert_eq!(
            headers.get("referer").map(String::as_str),
            Some("https://www.pandalive.co.kr")
        );
    }

    #[tokio::test]
    async fn test_invalid_metadata_is_omitted() {
        let server = MockServer::start().await;
        let detail = live_detail(
            &server,
            json!({
                "title": 123,
                "startTime": "yesterday evening",
                "thumbUrl": "not a url",
                "user": "many",
                "userId": 55,
            }),
        );
        mount_api(&server, ResponseTemplate::new(200).set_body_json(detail)).await;
        mount_manifest(&server).await;

        let media_info = extractor_for(&server).extract().await.unwrap();

        assert!(media_info.is_live);
        assert_eq!(media_info.formats.len(), 2);
        assert_eq!(media_info.title, None);
        assert_eq!(media_info.timestamp, None);
        assert_eq!(media_info.thumbnail, None);
        assert_eq!(media_info.view_count, None);
        assert_eq!(media_info.user_id, None);
        assert_eq!(media_info.play_count, None);
    }

    #[tokio::test]
    async fn test_missing_media_object() {
        let server = MockServer::start().await;
        let detail = json!({
            "PlayList": {"hls": [{"url": format!("{}/live/master.m3u8", server.uri())}]},
        });
        mount_api(&server, ResponseTemplate::new(200).set_body_json(detail)).await;
        mount_manifest(&server).await;

        let media_info = extractor_for(&server).extract().await.unwrap();
        assert!(media_info.is_live);
        assert_eq!(media_info.title, None);
        assert_eq!(media_info.timestamp, None);
    }

    #[tokio::test]
    async fn test_missing_manifest_is_hard_failure() {
        for detail in [
            json!({"media": {"title": "Stream A"}}),
            json!({"PlayList": {"hls": []}}),
            json!({"PlayList": {"hls": [{"url": null}]}}),
            json!({"PlayList": {"dash": [{"url": "https://example/live.mpd"}]}}),
        ] {
            let server = MockServer::start().await;
            mount_api(&server, ResponseTemplate::new(200).set_body_json(detail.clone())).await;

            let err = extractor_for(&server).extract().await.unwrap_err();
            assert!(
                matches!(err, ExtractorError::ManifestNotFound { ref channel_id } if channel_id == CHANNEL),
                "{detail}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_custom_user_agent_and_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/live/play"))
            .and(header("user-agent", "pandalive-test"))
            .and(header("cookie", "sessKey=abc"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let extractor = PandaLive::new(
            room_url(),
            test_client(),
            Some("sessKey=abc".to_string()),
            Some(json!({
                "api_url": format!("{}/v1/live/play", server.uri()),
                "user_agent": "pandalive-test",
            })),
        );
        assert!(extractor.extract().await.unwrap_err().is_not_live());
    }

    #[tokio::test]
    async fn test_protocol_relative_manifest_uses_api_scheme() {
        let server = MockServer::start().await;
        let scheme_less = server.uri().trim_start_matches("http:").to_string();
        let detail = json!({
            "PlayList": {"hls": [{"url": format!("{scheme_less}/live/master.m3u8")}]},
            "media": {"title": "Stream A"},
        });
        mount_api(&server, ResponseTemplate::new(200).set_body_json(detail)).await;
        mount_manifest(&server).await;

        let media_info = extractor_for(&server).extract().await.unwrap();

        assert_eq!(media_info.formats.len(), 2);
        assert_eq!(
            media_info.formats[0].manifest_url.as_deref(),
            Some(format!("{}/live/master.m3u8", server.uri()).as_str())
        );
        assert_eq!(
            media_info.formats[0].url,
            format!("{}/live/1080/index.m3u8", server.uri())
        );
    }

    #[tokio::test]
    async fn test_cookies_reach_manifest_and_replay_headers() {
        let server = MockServer::start().await;
        let detail = live_detail(&server, json!({}));
        mount_api(&server, ResponseTemplate::new(200).set_body_json(detail)).await;
        Mock::given(method("GET"))
            .and(path("/live/master.m3u8"))
            .and(header("cookie", "sessKey=abc"))
            .and(header("referer", "https://www.pandalive.co.kr"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MASTER))
            .expect(1)
            .mount(&server)
            .await;

        let extractor = PandaLive::new(
            room_url(),
            test_client(),
            Some("sessKey=abc".to_string()),
            Some(json!({"api_url": format!("{}/v1/live/play", server.uri())})),
        );
        let media_info = extractor.extract().await.unwrap();

        assert_eq!(media_info.formats.len(), 2);
        let headers = media_info.headers.unwrap();
        assert_eq!(headers.get("cookie").map(String::as_str), Some("sessKey=abc"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_extract_live() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        let extractor = PandaLive::new(
            room_url(),
            crate::extractor::default_client().unwrap(),
            None,
            None,
        );
        match extractor.extract().await {
            Ok(media_info) => println!("{}", media_info.pretty_print()),
            Err(e) if e.is_not_live() => println!("{CHANNEL} is offline"),
            Err(e) => panic!("{e}"),
        }
    }
}
