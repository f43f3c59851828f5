//! Read-only positions table
//!
//! Each row is one simulation step. Two layouts are accepted:
//!
//! - `Indexed`: no header, `step, x1, y1, x2, y2, ...` (odd column count)
//! - `Named`: one header row with exactly four named columns, i.e. two
//!   particles `x1, y1, x2, y2`; the step index is the row number
//!
//! The layout is picked from the first record: a record with any numeric
//! field is data (indexed), one without is a header (named).

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Range;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::simulation::states::NVec2;
use crate::trajectory::TableError;

/// Width of a named table: two particles, no step column
pub const NAMED_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Indexed,
    Named,
}

#[derive(Debug, Clone)]
pub struct PositionTable {
    layout: Layout,
    labels: Vec<String>, // one per coordinate column
    steps: Vec<f64>, // step index per row
    rows: Vec<Vec<f64>>, // interleaved x/y per row
    particles: usize,
}

impl PositionTable {
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path)?;
        let table = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            rows = table.len(),
            particles = table.particle_count(),
            "loaded positions table"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::All)
            .from_reader(reader);

        let mut records = rdr.records();
        let first = match records.next() {
            Some(r) => r?,
            None => return Err(TableError::Empty),
        };

        // a header has no numeric field at all
        let numeric = first.iter().any(|f| f.parse::<f64>().is_ok());
        let width = first.len();

        let (layout, labels) = if numeric {
            if width % 2 == 0 {
                return Err(TableError::EvenColumnCount(width));
            }
            let labels = (0..(width - 1) / 2)
                .flat_map(|i| [format!("x{}", i + 1), format!("y{}", i + 1)])
                .collect();
            (Layout::Indexed, labels)
        } else {
            if width != NAMED_WIDTH {
                return Err(TableError::NamedWidth(width));
            }
            (Layout::Named, first.iter().map(str::to_string).collect())
        };

        let mut table = Self {
            layout,
            labels,
            steps: Vec::new(),
            rows: Vec::new(),
            particles: match layout {
                Layout::Indexed => (width - 1) / 2,
                Layout::Named => NAMED_WIDTH / 2,
            },
        };

        if layout == Layout::Indexed {
            table.push_record(&first)?;
        }
        for record in records {
            table.push_record(&record?)?;
        }

        if table.rows.is_empty() {
            return Err(TableError::Empty);
        }
        Ok(table)
    }

    fn push_record(&mut self, record: &StringRecord) -> Result<(), TableError> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let mut values = Vec::with_capacity(record.len());
        for (column, field) in record.iter().enumerate() {
            let v = field.parse::<f64>().map_err(|_| TableError::InvalidNumber {
                line,
                column,
                value: field.to_string(),
            })?;
            values.push(v);
        }

        match self.layout {
            Layout::Indexed => {
                self.steps.push(values[0]);
                values.remove(0);
            }
            Layout::Named => self.steps.push(self.rows.len() as f64),
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of rows (steps)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.particles
    }

    /// Coordinate column labels, `x`/`y` interleaved
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn step(&self, row: usize) -> f64 {
        self.steps[row]
    }

    pub fn position(&self, row: usize, particle: usize) -> NVec2 {
        let r = &self.rows[row];
        NVec2::new(r[2 * particle], r[2 * particle + 1])
    }

    /// All particle positions of one row
    pub fn row_positions(&self, row: usize) -> Vec<NVec2> {
        (0..self.particles).map(|i| self.position(row, i)).collect()
    }

    /// Visible rows `[start, end)`, clamped to the table
    pub fn window(&self, start: usize, end: usize) -> Range<usize> {
        let s = start.min(self.len());
        let e = end.min(self.len()).max(s);
        s..e
    }

    /// All rows
    pub fn full(&self) -> Range<usize> {
        0..self.len()
    }

    pub fn xs(&self, particle: usize, rows: Range<usize>) -> Vec<f64> {
        self.rows[rows].iter().map(|r| r[2 * particle]).collect()
    }

    pub fn ys(&self, particle: usize, rows: Range<usize>) -> Vec<f64> {
        self.rows[rows].iter().map(|r| r[2 * particle + 1]).collect()
    }
}
