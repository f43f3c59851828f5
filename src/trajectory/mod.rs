//! The "positions over time" table and the arithmetic done on it before
//! anything is drawn: row windows, particle grouping and axis bounds.

pub mod table;
pub mod writer;
pub mod grouping;
pub mod bounds;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("table has no rows")]
    Empty,

    #[error("expected a step column plus x/y pairs (odd column count), got {0} columns")]
    EvenColumnCount(usize),

    #[error("a named header must have exactly 4 columns (two particles), got {0}")]
    NamedWidth(usize),

    #[error("line {line}, column {column}: {value:?} is not a number")]
    InvalidNumber {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("duplicate group name {0:?}")]
    DuplicateGroup(String),
}
