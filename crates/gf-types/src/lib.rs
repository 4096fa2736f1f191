#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Bool,
    Int64,
    Float64,
    Utf8,
}

/// A single cell value held by a frame or series.
///
/// There is no null variant: the containers carry every cell they were
/// constructed with, and missing-value semantics are out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl Cell {
    #[must_use]
    pub fn kind(&self) -> CellKind {
        match self {
            Self::Bool(_) => CellKind::Bool,
            Self::Int64(_) => CellKind::Int64,
            Self::Float64(_) => CellKind::Float64,
            Self::Utf8(_) => CellKind::Utf8,
        }
    }

    /// Numeric view of the cell. Bools count as 0/1.
    pub fn to_f64(&self) -> Result<f64, CellError> {
        match self {
            Self::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
            Self::Int64(v) => Ok(*v as f64),
            Self::Float64(v) => Ok(*v),
            Self::Utf8(v) => Err(CellError::NonNumeric {
                value: v.clone(),
                kind: CellKind::Utf8,
            }),
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_owned())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Utf8(value)
    }
}

// Display is used by rendering and the CSV writer; values print unquoted.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CellError {
    #[error("value {value:?} of kind {kind:?} is not numeric")]
    NonNumeric { value: String, kind: CellKind },
}
