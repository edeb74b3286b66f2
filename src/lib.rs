//! SPconverter - Batch Audio Normalizer
//!
//! Converts audio files of any supported format, rate and channel layout to
//! 16-bit 48 kHz stereo WAV, either one file at a time or by mirroring a
//! whole directory tree.

pub mod audio;
pub mod config;
pub mod error;
pub mod processing;

pub use config::{Args, ConverterConfig, PassThroughPolicy};
pub use error::{ErrorKind, Result, SpcError};
pub use processing::{BatchReport, BatchWalker, ConversionEngine, ConversionOutcome, FileTask, PathPlanner};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Info by default, debug when verbose. `RUST_LOG` still overrides both.
pub fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .parse_default_env()
        .try_init()
        .ok();
}

pub fn get_library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)
    }
}
