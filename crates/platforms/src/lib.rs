//! Resolve PandaLive live rooms into playable HLS formats and room metadata.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), pandalive_parser::extractor::error::ExtractorError> {
//! use pandalive_parser::extractor::default_factory;
//!
//! let factory = default_factory()?;
//! let extractor =
//!     factory.create_extractor("https://www.pandalive.co.kr/live/play/foryoung65", None, None)?;
//! let media_info = extractor.extract().await?;
//! println!("{}", media_info.pretty_print());
//! # Ok(())
//! # }
//! ```

pub mod extractor;
pub mod media;
