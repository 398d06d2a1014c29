mod builder;

pub use builder::PandaLive;
pub use builder::URL_REGEX;
