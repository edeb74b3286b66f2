//! Destination path planning

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use crate::error::{SpcError, Result};

/// One source file and where its converted output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Derives output paths. Every method is a pure function of its arguments.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    suffix: String,
}

impl PathPlanner {
    pub fn new<S: Into<String>>(suffix: S) -> Self {
        Self { suffix: suffix.into() }
    }

    /// `dir/track.flac` -> `dir/track-SPC.flac`.
    pub fn single_file_destination(&self, source: &Path) -> Result<PathBuf> {
        let stem = source
            .file_stem()
            .ok_or_else(|| SpcError::unsupported(source, "path has no file name"))?;

        let mut name = OsString::from(stem);
        name.push(&self.suffix);
        if let Some(ext) = source.extension() {
            name.push(".");
            name.push(ext);
        }

        Ok(source.with_file_name(name))
    }

    /// `parent/root` -> `parent/root-SPC`.
    pub fn mirror_root(&self, input_root: &Path) -> Result<PathBuf> {
        let name = input_root
            .file_name()
            .ok_or_else(|| SpcError::unsupported(input_root, "directory has no name to mirror"))?;

        let mut mirrored = OsString::from(name);
        mirrored.push(&self.suffix);
        Ok(input_root.with_file_name(mirrored))
    }

    /// `root/a/b/c.wav` -> `root-SPC/a/b/c.wav`. The file name is kept as is.
    pub fn mirrored_destination(&self, input_root: &Path, source: &Path) -> Result<PathBuf> {
        let relative = source.strip_prefix(input_root).map_err(|_| {
            SpcError::unsupported(
                source,
                format!("not located under {}", input_root.display()),
            )
        })?;
        Ok(self.mirror_root(input_root)?.join(relative))
    }

    pub fn single_file_task(&self, source: &Path) -> Result<FileTask> {
        Ok(FileTask {
            source: source.to_path_buf(),
            destination: self.single_file_destination(source)?,
        })
    }

    pub fn mirrored_task(&self, input_root: &Path, source: &Path) -> Result<FileTask> {
        Ok(FileTask {
            source: source.to_path_buf(),
            destination: self.mirrored_destination(input_root, source)?,
        })
    }
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SUFFIX)
    }
}
