//! Chunked reader for tab-separated dataset files.
//!
//! Rows are yielded in batches of `chunk_size` so a scan over a multi-gigabyte
//! file keeps at most one batch in memory. The first line is the header.

use crate::error::{CinelensError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column names from the header line.
#[derive(Debug, Clone)]
pub struct TsvHeader {
    path: PathBuf,
    columns: Vec<String>,
}

impl TsvHeader {
    /// Position of a required column.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| CinelensError::MalformedRow {
                path: self.path.clone(),
                line: 1,
                message: format!("missing required column '{}'", name),
            })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

/// One data row with its 1-based line number.
#[derive(Debug, Clone)]
pub struct TsvRow {
    pub line: usize,
    cells: Vec<String>,
}

impl TsvRow {
    /// Cell at `index`. Rows are validated against the header width, so
    /// header-derived indices are always in bounds.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Iterator over row chunks of a TSV file.
pub struct TsvChunks {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    header: TsvHeader,
    chunk_size: usize,
    line_no: usize,
    chunks_read: usize,
    failed: bool,
}

impl std::fmt::Debug for TsvChunks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsvChunks")
            .field("path", &self.path)
            .field("chunk_size", &self.chunk_size)
            .field("line_no", &self.line_no)
            .finish()
    }
}

impl TsvChunks {
    /// Open `path` and read its header.
    ///
    /// Fails with [`CinelensError::MissingDataFile`] when the file is absent
    /// and [`CinelensError::MalformedRow`] when it has no header line.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        if !path.is_file() {
            return Err(CinelensError::MissingDataFile(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| CinelensError::io_with_path(e, path))?;
        let mut lines = BufReader::new(file).lines();

        let header_line = match lines.next() {
            Some(line) => line.map_err(|e| CinelensError::io_with_path(e, path))?,
            None => {
                return Err(CinelensError::MalformedRow {
                    path: path.to_path_buf(),
                    line: 1,
                    message: "file is empty, expected a header line".to_string(),
                })
            }
        };

        let header = TsvHeader {
            path: path.to_path_buf(),
            columns: split_line(&header_line),
        };

        Ok(Self {
            path: path.to_path_buf(),
            lines,
            header,
            chunk_size: chunk_size.max(1),
            line_no: 1,
            chunks_read: 0,
            failed: false,
        })
    }

    pub fn header(&self) -> &TsvHeader {
        &self.header
    }

    fn next_chunk(&mut self) -> Result<Vec<TsvRow>> {
        let mut rows = Vec::with_capacity(self.chunk_size.min(8192));

        while rows.len() < self.chunk_size {
            let Some(line) = self.lines.next() else {
                break;
            };
            self.line_no += 1;
            let line = line.map_err(|e| CinelensError::MalformedRow {
                path: self.path.clone(),
                line: self.line_no,
                message: e.to_string(),
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let cells = split_line(&line);
            if cells.len() < self.header.len() {
                return Err(CinelensError::MalformedRow {
                    path: self.path.clone(),
                    line: self.line_no,
                    message: format!(
                        "expected {} columns, found {}",
                        self.header.len(),
                        cells.len()
                    ),
                });
            }

            rows.push(TsvRow {
                line: self.line_no,
                cells,
            });
        }

        Ok(rows)
    }
}

impl Iterator for TsvChunks {
    type Item = Result<Vec<TsvRow>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.next_chunk() {
            Ok(rows) if rows.is_empty() => None,
            Ok(rows) => {
                self.chunks_read += 1;
                debug!(
                    "Read chunk {} of {} ({} rows, through line {})",
                    self.chunks_read,
                    self.path.display(),
                    rows.len(),
                    self.line_no
                );
                Some(Ok(rows))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn split_line(line: &str) -> Vec<String> {
    line.strip_suffix('\r')
        .unwrap_or(line)
        .split('\t')
        .map(str::to_string)
        .collect()
}
