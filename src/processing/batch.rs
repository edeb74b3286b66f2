//! Batch walker: enumerate, plan, convert, report

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ConverterConfig;
use crate::error::{ErrorKind, SpcError, Result};
use crate::processing::{ConversionEngine, ConversionOutcome, FileTask, PathPlanner};

pub struct BatchWalker<'a> {
    config: &'a ConverterConfig,
    engine: &'a ConversionEngine,
    planner: PathPlanner,
}

impl<'a> BatchWalker<'a> {
    pub fn new(config: &'a ConverterConfig, engine: &'a ConversionEngine) -> Self {
        Self {
            config,
            engine,
            planner: PathPlanner::new(config.suffix.clone()),
        }
    }

    /// Regular files under `root` whose extension is on the allow-list.
    ///
    /// Entries that cannot be read are logged and skipped.
    pub fn discover(&self, root: &Path) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(root).min_depth(1);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }
        if self.config.sort_entries {
            walker = walker.sort_by_file_name();
        }

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file())
            .filter(|path| {
                let allowed = self.config.is_allowed(path);
                if !allowed {
                    log::debug!("Ignoring {}", path.display());
                }
                allowed
            })
            .collect()
    }

    /// Plan a task for every eligible file under `root`, in enumeration order.
    pub fn plan(&self, root: &Path) -> Result<Vec<FileTask>> {
        self.discover(root)
            .iter()
            .map(|source| self.planner.mirrored_task(root, source))
            .collect()
    }

    /// Convert a directory tree into its mirrored `-SPC` sibling.
    pub fn run(&self, root: &Path) -> Result<BatchReport> {
        if !root.is_dir() {
            return Err(SpcError::unsupported(root, "not a directory"));
        }
        // `.` and `..` have no name to suffix
        let root = if root.file_name().is_none() {
            root.canonicalize()?
        } else {
            root.to_path_buf()
        };

        let start = Instant::now();
        let tasks = self.plan(&root)?;
        log::info!("Found {} files under {}", tasks.len(), root.display());

        let mirror = self.planner.mirror_root(&root)?;
        std::fs::create_dir_all(&mirror)
            .map_err(|e| SpcError::write(&mirror, format!("cannot create output directory: {}", e)))?;

        let outcomes = self.execute(&tasks)?;

        Ok(BatchReport {
            entries: tasks.into_iter().zip(outcomes).collect(),
            elapsed: start.elapsed(),
        })
    }

    /// Convert a single file next to itself with the suffixed name.
    pub fn run_single(&self, source: &Path) -> Result<BatchReport> {
        if !source.is_file() {
            return Err(SpcError::unsupported(source, "not a regular file"));
        }
        if !self.config.is_allowed(source) {
            return Err(SpcError::unsupported(
                source,
                format!("extension not in {}", self.config.allowed_extensions.join(", ")),
            ));
        }

        let start = Instant::now();
        let task = self.planner.single_file_task(source)?;
        let outcomes = self.execute(std::slice::from_ref(&task))?;

        Ok(BatchReport {
            entries: vec![task].into_iter().zip(outcomes).collect(),
            elapsed: start.elapsed(),
        })
    }

    /// Run every task, one outcome per task in the order given.
    fn execute(&self, tasks: &[FileTask]) -> Result<Vec<ConversionOutcome>> {
        let total = tasks.len();

        let run_one = |(index, task): (usize, &FileTask)| -> ConversionOutcome {
            println!("Processing [{}/{}] {}", index + 1, total, task.source.display());
            self.prepare_destination(task)
                .map(|()| self.engine.convert(task))
                .unwrap_or_else(|e| {
                    log::error!("{}", e);
                    ConversionOutcome::Failed(e)
                })
        };

        if self.config.jobs <= 1 || total <= 1 {
            return Ok(tasks.iter().enumerate().map(&run_one).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
            .map_err(|e| SpcError::config(format!("Cannot build worker pool: {}", e)))?;
        log::debug!("Converting {} files on {} workers", total, self.config.jobs);
        let outcomes: Vec<ConversionOutcome> =
            pool.install(|| tasks.par_iter().enumerate().map(&run_one).collect());
        Ok(outcomes)
    }

    fn prepare_destination(&self, task: &FileTask) -> Result<()> {
        if let Some(parent) = task.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SpcError::write(parent, format!("cannot create directory: {}", e)))?;
        }
        Ok(())
    }
}

/// Per-file outcomes of one run, in enumeration order.
#[derive(Debug)]
pub struct BatchReport {
    pub entries: Vec<(FileTask, ConversionOutcome)>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn copied(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::Copied))
    }

    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::Converted))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| !o.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&FileTask, &SpcError)> {
        self.entries
            .iter()
            .filter_map(|(task, outcome)| outcome.error().map(|e| (task, e)))
    }

    /// Failure counts per error kind, ordered by kind.
    pub fn failures_by_kind(&self) -> BTreeMap<ErrorKind, usize> {
        let mut tally = BTreeMap::new();
        for (_, error) in self.failures() {
            *tally.entry(error.kind()).or_insert(0) += 1;
        }
        tally
    }

    fn count(&self, pred: impl Fn(&ConversionOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| pred(o)).count()
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files: {} converted, {} copied, {} failed",
            self.total(),
            self.converted(),
            self.copied(),
            self.failed()
        )?;
        if self.has_failures() {
            let kinds: Vec<String> = self
                .failures_by_kind()
                .iter()
                .map(|(kind, n)| format!("{} {}", kind, n))
                .collect();
            write!(f, " [{}]", kinds.join(", "))?;
        }
        write!(f, " ({:.2}s)", self.elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ConversionTarget, LinearResampler};
    use crate::config::PassThroughPolicy;
    use tempfile::TempDir;

    fn write_wav(path: &Path, bits: u16, frames: usize) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames * 2 {
            if bits == 16 {
                writer.write_sample((i % 100) as i16).unwrap();
            } else {
                writer.write_sample((i % 100) as i32 * 256).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    fn touch(path: &Path, contents: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn engine() -> ConversionEngine {
        ConversionEngine::new(
            ConversionTarget::default(),
            PassThroughPolicy::BitDepthOnly,
            Box::new(LinearResampler),
        )
    }

    /// root/{a.wav, notes.txt, song.MP3, sub/b.wav, sub/deep/c.wav}
    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        write_wav(&root.join("a.wav"), 24, 100);
        touch(&root.join("notes.txt"), b"not audio");
        touch(&root.join("song.MP3"), b"ignored by case");
        write_wav(&root.join("sub").join("b.wav"), 16, 100);
        write_wav(&root.join("sub").join("deep").join("c.wav"), 24, 100);
        (dir, root)
    }

    #[test]
    fn test_discover_filters_extensions() {
        let (_dir, root) = fixture();
        let config = ConverterConfig::default();
        let engine = engine();
        let walker = BatchWalker::new(&config, &engine);

        let found = walker.discover(&root);
        assert_eq!(
            found,
            vec![root.join("a.wav"), root.join("sub/b.wav"), root.join("sub/deep/c.wav")]
        );
    }

    #[test]
    fn test_discover_non_recursive() {
        let (_dir, root) = fixture();
        let config = ConverterConfig { recursive: false, ..ConverterConfig::default() };
        let engine = engine();
        let walker = BatchWalker::new(&config, &engine);

        assert_eq!(walker.discover(&root), vec![root.join("a.wav")]);
    }

    #[test]
    fn test_run_mirrors_tree() {
        let (dir, root) = fixture();
        let config = ConverterConfig::default();
        let engine = engine();
        let report = BatchWalker::new(&config, &engine).run(&root).unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.converted(), 2);
        assert_eq!(report.copied(), 1);
        assert!(!report.has_failures());

        let mirror = dir.path().join("root-SPC");
        assert!(mirror.join("a.wav").is_file());
        assert!(mirror.join("sub/b.wav").is_file());
        assert!(mirror.join("sub/deep/c.wav").is_file());
        assert!(!mirror.join("notes.txt").exists());
        assert!(!mirror.join("song.MP3").exists());
    }

    #[test]
    fn test_one_corrupt_file_does_not_stop_the_batch() {
        let (dir, root) = fixture();
        touch(&root.join("sub").join("broken.wav"), b"RIFF garbage that is not a wave file");

        let config = ConverterConfig::default();
        let engine = engine();
        let report = BatchWalker::new(&config, &engine).run(&root).unwrap();

        assert_eq!(report.total(), 4);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.converted() + report.copied(), 3);

        let (task, error) = report.failures().next().unwrap();
        assert_eq!(task.source, root.join("sub/broken.wav"));
        assert_eq!(error.kind(), ErrorKind::Open);
        assert_eq!(report.failures_by_kind().get(&ErrorKind::Open), Some(&1));
        assert!(report.to_string().contains("1 failed [open 1]"));
        assert!(!dir.path().join("root-SPC/sub/broken.wav").exists());
    }

    #[test]
    fn test_parallel_run_keeps_enumeration_order() {
        let (_dir, root) = fixture();
        for i in 0..6 {
            write_wav(&root.join(format!("extra{}.wav", i)), 24, 50);
        }

        let config = ConverterConfig { jobs: 2, ..ConverterConfig::default() };
        let engine = engine();
        let walker = BatchWalker::new(&config, &engine);
        let expected = walker.plan(&root).unwrap();
        let report = walker.run(&root).unwrap();

        let tasks: Vec<FileTask> = report.entries.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(tasks, expected);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_run_single() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("track.wav");
        write_wav(&source, 24, 100);

        let config = ConverterConfig::default();
        let engine = engine();
        let walker = BatchWalker::new(&config, &engine);
        let report = walker.run_single(&source).unwrap();

        assert_eq!(report.converted(), 1);
        assert!(dir.path().join("track-SPC.wav").is_file());
    }

    #[test]
    fn test_run_single_rejects_unlisted_extension() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("song.MP3");
        touch(&source, b"data");

        let config = ConverterConfig::default();
        let engine = engine();
        let err = BatchWalker::new(&config, &engine).run_single(&source).unwrap_err();
        assert!(matches!(err, SpcError::UnsupportedInput { .. }));
    }
}
