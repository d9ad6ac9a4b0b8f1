use std::{io, num::ParseIntError};
use thiserror::Error;

use crate::schema::SchemaId;

/// Errors raised while building schemas or constructing and comparing verticals.
///
/// Most of these are contract violations. The plain API (`RelationSchema::vertical`,
/// `Vertical::is_subset_of`, ...) panics with the same message; the `try_*` variants
/// hand the error back instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column index {index} out of range for a schema with {num_columns} columns")]
    ColumnOutOfRange { index: usize, num_columns: usize },

    #[error("verticals belong to different schemas ({left} vs. {right})")]
    SchemaMismatch { left: SchemaId, right: SchemaId },

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),
}

/// Errors raised while reading a set system (see `set_system`).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("c Failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("c Found target on line {line} before p-line. Abort!")]
    TargetBeforeHeader { line: usize },

    #[error("c Found a second p-line on line {line}. Abort!")]
    DuplicateHeader { line: usize },

    #[error("c Malformed p-line on line {line}, expected `p hs <columns> <targets>`")]
    MalformedHeader { line: usize },

    #[error("c Invalid number on line {line}: {source}")]
    InvalidNumber {
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("c Column {column} on line {line} is outside 1..={num_columns}")]
    ColumnOutOfRange { line: usize, column: usize, num_columns: usize },

    #[error("c Expected {declared} targets, found {found}")]
    TargetCountMismatch { declared: usize, found: usize },

    #[error("c Failed to parse a set system! Maybe the input was empty?")]
    MissingHeader,
}

pub type Result<T> = std::result::Result<T, SchemaError>;
