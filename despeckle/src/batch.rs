//! Filters a list of image files, one output file per input.
//!
//! A file that cannot be read, filtered or written is skipped and recorded in
//! the summary; the remaining files are still processed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use common::timing::{format_millis, measure};
use image::ImageFormat;
use serde::Serialize;

use crate::codec::{self, CodecError};
use crate::config::FilterConfig;
use crate::error::Result;
use crate::filter::AdaptiveMedianFilter;

/// Default prefix of output file names.
pub const DEFAULT_OUTPUT_PREFIX: &str = "new_";

/// Where and how filtered images are written.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Output directory. `None` writes next to each input file.
    pub output_dir: Option<PathBuf>,
    /// Prepended to the input file name.
    pub prefix: String,
    /// Replace existing output files.
    pub overwrite: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            overwrite: false,
        }
    }
}

/// Outcome of one successfully filtered file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: usize,
    pub height: usize,
    #[serde(serialize_with = "serialize_format")]
    pub format: ImageFormat,
    /// Whether the input had to be converted to 8-bit gray.
    pub converted: bool,
    pub replaced: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

/// A file that was left out of the batch.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub processed: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
}

impl BatchSummary {
    /// Number of images written.
    pub fn filtered_count(&self) -> usize {
        self.processed.len()
    }

    pub fn total_replaced(&self) -> usize {
        self.processed.iter().map(|r| r.replaced).sum()
    }
}

#[derive(Debug, thiserror::Error)]
enum FileError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Output '{0}' already exists (enable overwrite to replace it)")]
    OutputExists(PathBuf),

    #[error("Output path '{0}' is the input file")]
    OutputIsInput(PathBuf),

    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Filter every file in `paths` with `config`.
///
/// Fails only if `config` is invalid, before any file is touched. Per-file
/// failures are logged and collected in [`BatchSummary::skipped`].
pub fn run_batch(
    paths: &[PathBuf],
    config: &FilterConfig,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    let filter = AdaptiveMedianFilter::new(*config)?;
    let mut summary = BatchSummary::default();

    for path in paths {
        match process_file(&filter, path, options) {
            Ok(report) => {
                tracing::info!(
                    input = %report.input.display(),
                    output = %report.output.display(),
                    replaced = report.replaced,
                    elapsed = %format_millis(report.elapsed),
                    "Image filtered"
                );
                summary.processed.push(report);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "Skipping file: {err}");
                summary.skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(summary)
}

fn process_file(
    filter: &AdaptiveMedianFilter,
    path: &Path,
    options: &BatchOptions,
) -> std::result::Result<FileReport, FileError> {
    let output = codec::output_path(path, options.output_dir.as_deref(), &options.prefix)?;
    if same_file(path, &output) {
        return Err(FileError::OutputIsInput(output));
    }
    if output.exists() && !options.overwrite {
        return Err(FileError::OutputExists(output));
    }

    let loaded = codec::load_gray(path)?;
    tracing::debug!(
        path = %path.display(),
        width = loaded.buffer.width(),
        height = loaded.buffer.height(),
        format = ?loaded.format,
        color = ?loaded.color,
        "Filtering image"
    );

    let (result, elapsed) = measure(|| filter.apply(&loaded.buffer));

    if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| FileError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    codec::save_gray(&output, &result.image, loaded.format)?;

    Ok(FileReport {
        input: path.to_path_buf(),
        output,
        width: result.image.width(),
        height: result.image.height(),
        format: loaded.format,
        converted: loaded.was_converted(),
        replaced: result.replaced,
        elapsed,
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn serialize_format<S: serde::Serializer>(
    format: &ImageFormat,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:?}", format))
}

fn serialize_millis<S: serde::Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::config::FilterConfig;
    use crate::error::Error;
    use common::test_utils::{init_tracing, test_output_subdir};

    fn write_impulse_image(path: &Path) {
        let mut buffer = PixelBuffer::new_filled(7, 7, 10);
        buffer[(3, 3)] = 200;
        codec::save_gray(path, &buffer, ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_batch_filters_and_writes_outputs() {
        init_tracing();
        let dir = test_output_subdir("batch_filters");
        let a = dir.join("a.png");
        let b = dir.join("b.png");
        write_impulse_image(&a);
        write_impulse_image(&b);

        let summary = run_batch(
            &[a.clone(), b.clone()],
            &FilterConfig::default(),
            &BatchOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.filtered_count(), 2);
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.total_replaced(), 2);

        let report = &summary.processed[0];
        assert_eq!(report.output, dir.join("new_a.png"));
        assert_eq!((report.width, report.height), (7, 7));
        assert_eq!(report.format, ImageFormat::Png);
        assert!(!report.converted);

        let written = codec::load_gray(&report.output).unwrap();
        assert_eq!(written.buffer, PixelBuffer::new_filled(7, 7, 10));
    }

    #[test]
    fn test_batch_skips_bad_files_and_continues() {
        init_tracing();
        let dir = test_output_subdir("batch_skips");
        let good = dir.join("good.png");
        let missing = dir.join("missing.png");
        let corrupt = dir.join("corrupt.png");
        write_impulse_image(&good);
        std::fs::write(&corrupt, b"garbage").unwrap();

        let summary = run_batch(
            &[missing.clone(), corrupt.clone(), good.clone()],
            &FilterConfig::default(),
            &BatchOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.filtered_count(), 1);
        assert_eq!(summary.processed[0].input, good);
        let skipped: Vec<_> = summary.skipped.iter().map(|s| s.path.clone()).collect();
        assert_eq!(skipped, vec![missing, corrupt]);
        assert!(summary.skipped.iter().all(|s| !s.reason.is_empty()));
    }

    #[test]
    fn test_batch_rejects_invalid_config_up_front() {
        let dir = test_output_subdir("batch_invalid_config");
        let a = dir.join("a.png");
        write_impulse_image(&a);

        let err = run_batch(
            &[a],
            &FilterConfig::new(6, 0.0),
            &BatchOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidParameter(_)));
        assert!(!dir.join("new_a.png").exists(), "No output should be written");
    }

    #[test]
    fn test_batch_respects_overwrite_flag() {
        let dir = test_output_subdir("batch_overwrite");
        let a = dir.join("a.png");
        write_impulse_image(&a);
        std::fs::write(dir.join("new_a.png"), b"existing").unwrap();

        let summary = run_batch(
            std::slice::from_ref(&a),
            &FilterConfig::default(),
            &BatchOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.filtered_count(), 0);
        assert!(summary.skipped[0].reason.contains("already exists"));

        let options = BatchOptions {
            overwrite: true,
            ..BatchOptions::default()
        };
        let summary = run_batch(&[a], &FilterConfig::default(), &options).unwrap();
        assert_eq!(summary.filtered_count(), 1);
    }

    #[test]
    fn test_batch_never_overwrites_input() {
        let dir = test_output_subdir("batch_same_file");
        let a = dir.join("a.png");
        write_impulse_image(&a);

        let options = BatchOptions {
            prefix: String::new(),
            overwrite: true,
            ..BatchOptions::default()
        };
        let summary = run_batch(
            std::slice::from_ref(&a),
            &FilterConfig::default(),
            &options,
        )
        .unwrap();

        assert_eq!(summary.filtered_count(), 0);
        assert_eq!(summary.skipped.len(), 1);
        let original = codec::load_gray(&a).unwrap();
        assert_eq!(original.buffer[(3, 3)], 200, "Input must be untouched");
    }

    #[test]
    fn test_batch_writes_into_output_dir() {
        let dir = test_output_subdir("batch_output_dir");
        let a = dir.join("a.png");
        write_impulse_image(&a);
        let out_dir = dir.join("filtered");

        let options = BatchOptions {
            output_dir: Some(out_dir.clone()),
            ..BatchOptions::default()
        };
        let summary = run_batch(&[a], &FilterConfig::median(1), &options).unwrap();

        assert_eq!(summary.processed[0].output, out_dir.join("new_a.png"));
        assert!(out_dir.join("new_a.png").exists());
    }

    #[test]
    fn test_summary_serializes_report_fields() {
        let dir = test_output_subdir("batch_summary_json");
        let good = dir.join("a.png");
        let missing = dir.join("missing.png");
        write_impulse_image(&good);

        let summary = run_batch(
            &[good.clone(), missing.clone()],
            &FilterConfig::default(),
            &BatchOptions::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        let processed = &json["processed"][0];
        assert_eq!(processed["input"], &*good.to_string_lossy());
        assert_eq!(processed["output"], &*dir.join("new_a.png").to_string_lossy());
        assert_eq!(processed["format"], "Png");
        assert_eq!(processed["width"], 7);
        assert_eq!(processed["replaced"], 1);
        assert_eq!(processed["converted"], false);
        let elapsed_ms = processed["elapsed_ms"].as_f64().unwrap();
        assert!(elapsed_ms >= 0.0);
        assert!(processed.get("elapsed").is_none());

        let skipped = &json["skipped"][0];
        assert_eq!(skipped["path"], &*missing.to_string_lossy());
        assert!(!skipped["reason"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let summary = run_batch(&[], &FilterConfig::default(), &BatchOptions::default()).unwrap();
        assert_eq!(summary.filtered_count(), 0);
        assert!(summary.skipped.is_empty());
    }
}
