//! PDF serialization and saving.
//!
//! Serialization and file output are separate steps: the orchestrators turn
//! documents into bytes, and only the CLI puts those bytes on disk. Files are
//! written atomically (temp file, then rename).
//!
//! # Examples
//!
//! ```no_run
//! use pdfsplice::io::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let bytes = writer.to_bytes(&mut doc)?;
//! writer.save_bytes(bytes, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::CompressionLevel;
use crate::error::{Result, SpliceError};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compression applied during serialization.
    pub compression: CompressionLevel,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compression: CompressionLevel::default(),
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer using the given compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self {
            options: WriteOptions {
                compression,
                ..Default::default()
            },
        }
    }

    /// Serialize a document.
    ///
    /// Applies the configured compression and renumbers objects, so the
    /// document is modified in place.
    ///
    /// # Errors
    ///
    /// Returns [`SpliceError::FailedToSerialize`] if lopdf cannot write the
    /// document.
    pub fn to_bytes(&self, doc: &mut Document) -> Result<Vec<u8>> {
        match self.options.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => doc.compress(),
            CompressionLevel::Maximum => {
                doc.prune_objects();
                doc.compress();
            }
        }
        doc.renumber_objects();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| SpliceError::FailedToSerialize {
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }

    /// Write serialized bytes to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory doesn't exist
    /// - Insufficient permissions
    /// - Write operation fails
    pub async fn save_bytes(&self, bytes: Vec<u8>, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            let write_path = if options.atomic {
                temp_path(&path_buf)
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                SpliceError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

            let written = writer
                .write_all(&bytes)
                .and_then(|_| writer.flush())
                .map_err(|e| SpliceError::FailedToWrite {
                    path: write_path.clone(),
                    source: e,
                });
            drop(writer);
            if options.atomic {
                discard_staged(&write_path, written)?;
            } else {
                written?;
            }

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    let _ = std::fs::remove_file(&write_path);
                    SpliceError::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            Ok::<_, SpliceError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| SpliceError::other(format!("Write task failed: {e}")))??;

        log::debug!(
            "wrote {} ({}) in {:?}",
            stats.output_path.display(),
            stats.format_file_size(),
            stats.write_time
        );

        Ok(stats)
    }
}

/// Remove a staging file whose write failed, passing `result` through.
fn discard_staged<T>(staged: &Path, result: Result<T>) -> Result<T> {
    if result.is_err()
        && let Err(e) = std::fs::remove_file(staged)
    {
        log::debug!("could not remove {}: {e}", staged.display());
    }
    result
}

/// `out.pdf` is staged as `out.pdf.tmp` next to it.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::PdfReader;
    use crate::test_support::document_with_pages;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(CompressionLevel::None)]
    #[case(CompressionLevel::Standard)]
    #[case(CompressionLevel::Maximum)]
    fn test_to_bytes_is_loadable(#[case] compression: CompressionLevel) {
        let mut doc = document_with_pages(2);
        let bytes = PdfWriter::with_compression(compression)
            .to_bytes(&mut doc)
            .unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        let loaded = PdfReader::new().load_bytes("out.pdf", &bytes).unwrap();
        assert_eq!(loaded.page_count, 2);
    }

    #[tokio::test]
    async fn test_save_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("output.pdf");

        let writer = PdfWriter::new();
        let bytes = writer.to_bytes(&mut document_with_pages(1)).unwrap();
        let len = bytes.len() as u64;

        let stats = writer.save_bytes(bytes, &output_path).await.unwrap();

        assert!(output_path.exists());
        assert!(!temp_path(&output_path).exists());
        assert_eq!(stats.file_size, len);
        assert_eq!(stats.output_path, output_path);
    }

    #[tokio::test]
    async fn test_save_non_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("direct.pdf");

        let writer = PdfWriter::with_options(WriteOptions {
            atomic: false,
            ..Default::default()
        });
        writer.save_bytes(b"%PDF-1.7".to_vec(), &output_path).await.unwrap();

        assert_eq!(std::fs::read(&output_path).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_save_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("missing").join("out.pdf");

        let result = PdfWriter::new().save_bytes(vec![1, 2, 3], &output_path).await;
        assert!(matches!(result, Err(SpliceError::FailedToCreateOutput { .. })));
    }

    #[test]
    fn test_failed_write_discards_staging_file() {
        let temp_dir = TempDir::new().unwrap();
        let staged = temp_path(&temp_dir.path().join("out.pdf"));
        std::fs::write(&staged, b"%PDF-1.7 trunc").unwrap();

        let failed: Result<()> = Err(SpliceError::FailedToWrite {
            path: staged.clone(),
            source: std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
        });
        let result = discard_staged(&staged, failed);

        assert!(matches!(result, Err(SpliceError::FailedToWrite { .. })));
        assert!(!staged.exists());
    }

    #[test]
    fn test_successful_write_keeps_staging_file() {
        let temp_dir = TempDir::new().unwrap();
        let staged = temp_path(&temp_dir.path().join("out.pdf"));
        std::fs::write(&staged, b"%PDF-1.7").unwrap();

        assert!(discard_staged(&staged, Ok(())).is_ok());
        assert!(staged.exists());
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/tmp/out.pdf")),
            PathBuf::from("/tmp/out.pdf.tmp")
        );
    }

    #[test]
    fn test_write_statistics_format() {
        let stats = WriteStatistics {
            write_time: Duration::from_millis(5),
            file_size: 2048,
            output_path: PathBuf::from("x.pdf"),
        };
        assert_eq!(stats.format_file_size(), "2.00 KB");
    }
}
