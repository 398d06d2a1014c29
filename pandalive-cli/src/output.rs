use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use pandalive_parser::media::{MediaInfo, StreamInfo};
#[cfg(feature = "table-output")]
use std::borrow::Cow;
use std::io::Write;
#[cfg(feature = "table-output")]
use tabled::{Table, Tabled, settings::Style};

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_media_info(&self, media_info: &MediaInfo, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty(media_info)),
            OutputFormat::Json => self.format_json(media_info, true),
            OutputFormat::JsonCompact => self.format_json(media_info, false),
            #[cfg(feature = "table-output")]
            OutputFormat::Table => Ok(self.format_table(media_info)),
            #[cfg(not(feature = "table-output"))]
            OutputFormat::Table => Ok(self.format_pretty(media_info)),
        }
    }

    pub fn format_platforms(&self, platforms: &[&str], format: &OutputFormat) -> Result<String> {
        if format.is_json() {
            let mut output = serde_json::to_string(&serde_json::json!({ "platforms": platforms }))?;
            output.push('\n');
            return Ok(output);
        }

        let mut output = self.colorize("Supported platforms:", &Color::Green, true);
        output.push('\n');
        for platform in platforms {
            output.push_str(&format!(
                "  - {}\n",
                self.colorize(platform, &Color::Cyan, false)
            ));
        }
        Ok(output)
    }

    fn format_pretty(&self, media_info: &MediaInfo) -> String {
        let mut output = media_info.pretty_print();
        output.push('\n');

        for stream in &media_info.formats {
            output.push('\n');
            output.push_str(&self.format_stream_pretty(stream));
        }

        if let Some(headers) = &media_info.headers
            && !headers.is_empty()
        {
            output.push('\n');
            output.push_str(&self.colorize("Headers:", &Color::Green, true));
            output.push('\n');
            let mut headers: Vec<_> = headers.iter().collect();
            headers.sort();
            for (key, value) in headers {
                output.push_str(&format!(
                    "  {}: {}\n",
                    self.colorize(key, &Color::Yellow, false),
                    self.colorize(value, &Color::Cyan, false)
                ));
            }
        }

        output
    }

    fn format_stream_pretty(&self, stream: &StreamInfo) -> String {
        let mut output = String::new();
        output.push_str(&self.colorize(&stream.format_id, &Color::Green, true));
        output.push('\n');

        let mut field = |label: &str, value: &str, color: Color| {
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize(label, &Color::Yellow, false),
                self.colorize(value, &color, false)
            ));
        };

        field("Quality", &stream.quality, Color::Cyan);
        field("URL", &stream.url, Color::Blue);
        field("Bitrate", &format!("{} kbps", stream.bitrate), Color::Cyan);
        field("Protocol", stream.protocol.as_str(), Color::Cyan);
        field("Media Format", stream.media_format.as_str(), Color::Cyan);
        if !stream.codec.is_empty() {
            field("Codec", &stream.codec, Color::Cyan);
        }
        if let Some(audio_codec) = &stream.audio_codec {
            field("Audio Codec", audio_codec, Color::Cyan);
        }
        if let Some(fps) = stream.fps {
            field("FPS", &fps.to_string(), Color::Cyan);
        }

        output
    }

    fn format_json(&self, media_info: &MediaInfo, pretty: bool) -> Result<String> {
        let mut output = if pretty {
            media_info.to_json_pretty()?
        } else {
            media_info.to_json()?
        };
        output.push('\n');
        Ok(output)
    }

    #[cfg(feature = "table-output")]
    fn format_table(&self, media_info: &MediaInfo) -> String {
        #[derive(Tabled)]
        struct FormatRow<'a> {
            id: &'a str,
            quality: &'a str,
            bitrate: Cow<'a, str>,
            codec: &'a str,
            url: &'a str,
        }

        let rows = media_info.formats.iter().map(|stream| FormatRow {
            id: &stream.format_id,
            quality: &stream.quality,
            bitrate: Cow::Owned(format!("{} kbps", stream.bitrate)),
            codec: &stream.codec,
            url: &stream.url,
        });

        let mut output = media_info.pretty_print();
        output.push('\n');
        output.push_str(&Table::new(rows).with(Style::modern()).to_string());
        output.push('\n');
        output
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (self.colored, color, bold);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
}

pub fn write_output(content: &str, output_file: Option<&std::path::Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        None => {
            print!("{content}");
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandalive_parser::media::{MediaFormat, StreamFormat};

    fn sample() -> MediaInfo {
        let stream = StreamInfo::builder(
            "https://cdn.example/1080/index.m3u8",
            StreamFormat::Hls,
            MediaFormat::Mp4,
        )
        .format_id("hls-4000")
        .quality("1920x1080")
        .bitrate(4000)
        .codec("avc1.640028")
        .build();

        MediaInfo::builder("foryoung65", "https://www.pandalive.co.kr/live/play/foryoung65")
            .is_live(true)
            .title("Stream A")
            .formats(vec![stream])
            .build()
    }

    #[test]
    fn test_json_output() {
        let output = OutputManager::new(false);
        let json = output
            .format_media_info(&sample(), &OutputFormat::JsonCompact)
            .unwrap();

        assert!(json.ends_with('\n'));
        assert!(!json.trim_end().contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["id"], "foryoung65");
        assert_eq!(parsed["title"], "Stream A");
        assert_eq!(parsed["formats"][0]["format_id"], "hls-4000");
    }

    #[test]
    fn test_pretty_output_lists_formats() {
        let output = OutputManager::new(false);
        let text = output
            .format_media_info(&sample(), &OutputFormat::Pretty)
            .unwrap();

        assert!(text.contains("Stream A"));
        assert!(text.contains("hls-4000"));
        assert!(text.contains("Bitrate: 4000 kbps"));
        assert!(text.contains("URL: https://cdn.example/1080/index.m3u8"));
    }

    #[test]
    fn test_platforms_output() {
        let output = OutputManager::new(false);
        let json = output
            .format_platforms(&["PandaLive"], &OutputFormat::Json)
            .unwrap();
        assert_eq!(json, "{\"platforms\":[\"PandaLive\"]}\n");

        let text = output
            .format_platforms(&["PandaLive"], &OutputFormat::Pretty)
            .unwrap();
        assert!(text.contains("- PandaLive"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("room.json");
        write_output("{}\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}\n");
    }
}
