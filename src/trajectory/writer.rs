use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::simulation::states::NVec2;
use crate::trajectory::TableError;

/// Writes indexed rows `step, x1, y1, x2, y2, ...`
pub struct PositionWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: usize,
}

impl PositionWriter<File> {
    /// Create the file, and its parent directories
    pub fn create(path: &Path) -> Result<Self, TableError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> PositionWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: WriterBuilder::new().has_headers(false).from_writer(writer),
            rows: 0,
        }
    }

    pub fn write_row<I>(&mut self, step: u64, positions: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = NVec2>,
    {
        let mut record = vec![step.to_string()];
        for p in positions {
            record.push(p.x.to_string());
            record.push(p.y.to_string());
        }
        self.inner.write_record(&record)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<(), TableError> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, TableError> {
        self.inner.into_inner().map_err(|e| TableError::Io(e.into_error()))
    }
}
