use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebugError {
    #[error("Invalid enable pattern: {0}")]
    Pattern(#[from] nsdebug_pattern::PatternError),

    #[error("Cache minutes must be an integer, got {value:?}: {source}")]
    InvalidCacheMinutes {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
