pub mod media_format;
pub mod media_info;
pub mod stream_info;
pub mod subtitle;

pub use media_format::{MediaFormat, StreamFormat, StreamProtocol};
pub use media_info::MediaInfo;
pub use stream_info::StreamInfo;
pub use subtitle::{SubtitleTrack, Subtitles};
