#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gf_index::{
    first_position, key_exists, positions_of, validate_homogeneous, Key, KeyError, Label,
};
use gf_types::Cell;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FrameError {
    #[error("invalid construction: {0}")]
    InvalidConstruction(String),
    #[error("composite keys are not supported for {context}")]
    InvalidKeyType { context: &'static str },
    #[error("unknown column: {name}")]
    UnknownColumn { name: String },
    #[error("unknown row label: {label}")]
    UnknownRow { label: String },
    #[error("column position {position} out of range for {len} columns")]
    ColumnOutOfRange { position: usize, len: usize },
    #[error("row position {position} out of range for {len} rows")]
    RowOutOfRange { position: usize, len: usize },
    #[error("append operand columns {right:?} do not match frame columns {left:?}")]
    ColumnMismatch { left: Vec<String>, right: Vec<String> },
    #[error("string column key used against integer column labels")]
    ColumnTypeMismatch,
    #[error("assigned sequence length {found} does not match expected length {expected}")]
    InvalidAssignment { expected: usize, found: usize },
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Orientation of the scalar sequence carried by a [`Series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// The data is one row: cells keyed by column labels.
    Row,
    /// The data is one column: cells keyed by row labels.
    Column,
}

// ── Series ─────────────────────────────────────────────────────────────

/// A one-dimensional labeled container: either a single row's cells
/// (keyed by column labels) or a single column's cells (keyed by row
/// labels). Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    data: Vec<Cell>,
    axis: Axis,
    columns: Vec<Label>,
    indices: Vec<Label>,
}

impl Series {
    /// Builds a row-axis series over a raw sequence with synthetic
    /// positional labels and no originating row label.
    #[must_use]
    pub fn from_values(data: Vec<Cell>) -> Self {
        let columns = (0..data.len() as i64).map(Label::from).collect();
        Self {
            data,
            axis: Axis::Row,
            columns,
            indices: Vec::new(),
        }
    }

    /// Builds a column-axis series: one named column's cells across rows.
    pub fn from_column(
        data: Vec<Cell>,
        name: Label,
        indices: Vec<Label>,
    ) -> Result<Self, FrameError> {
        if data.len() != indices.len() {
            return Err(FrameError::InvalidConstruction(format!(
                "column data length {} does not match index length {}",
                data.len(),
                indices.len()
            )));
        }
        Ok(Self {
            data,
            axis: Axis::Column,
            columns: vec![name],
            indices,
        })
    }

    /// Builds a row-axis series: one labeled row's cells across columns.
    pub fn from_row(data: Vec<Cell>, index: Label, columns: Vec<Label>) -> Result<Self, FrameError> {
        if data.len() != columns.len() {
            return Err(FrameError::InvalidConstruction(format!(
                "row data length {} does not match column count {}",
                data.len(),
                columns.len()
            )));
        }
        Ok(Self {
            data,
            axis: Axis::Row,
            columns,
            indices: vec![index],
        })
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[Cell] {
        &self.data
    }

    /// The label sequence the data is keyed by: column labels for a row
    /// series, row labels for a column series.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        match self.axis {
            Axis::Row => &self.columns,
            Axis::Column => &self.indices,
        }
    }

    /// The originating label on the other axis: the row label of a row
    /// series, the column name of a column series.
    #[must_use]
    pub fn name(&self) -> Option<&Label> {
        match self.axis {
            Axis::Row => self.indices.first(),
            Axis::Column => self.columns.first(),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        key_exists(key, self.labels())
    }

    /// Keyed read. Duplicate labels resolve to the first match.
    pub fn get(&self, key: &Key) -> Result<&Cell, FrameError> {
        let position = match key {
            Key::Composite(_) => {
                return Err(FrameError::InvalidKeyType {
                    context: "series access",
                })
            }
            Key::Position(position) => {
                if *position >= self.data.len() {
                    return Err(KeyError::OutOfRange {
                        position: *position,
                        len: self.data.len(),
                    }
                    .into());
                }
                *position
            }
            Key::Label(label) => {
                first_position(label, self.labels()).ok_or_else(|| KeyError::UnknownLabel {
                    label: label.to_string(),
                })?
            }
        };
        Ok(&self.data[position])
    }

    /// Keyed write surface. Series are immutable, so this always fails.
    pub fn set(&mut self, _key: &Key, _value: Cell) -> Result<(), FrameError> {
        Err(FrameError::UnsupportedOperation(
            "series are immutable; build a new series instead",
        ))
    }

    /// Keyed removal surface. Series are immutable, so this always fails.
    pub fn remove(&mut self, _key: &Key) -> Result<(), FrameError> {
        Err(FrameError::UnsupportedOperation(
            "series are immutable; build a new series instead",
        ))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Cell)> {
        self.labels().iter().zip(self.data.iter())
    }

    #[must_use]
    pub fn to_pairs(&self) -> Vec<(Label, Cell)> {
        self.iter()
            .map(|(label, cell)| (label.clone(), cell.clone()))
            .collect()
    }
}

// ── DataFrame inputs ───────────────────────────────────────────────────

/// One raw row handed to the constructor: either a plain cell sequence
/// (combined positionally with the column labels) or an explicit
/// label-to-cell mapping in column order.
#[derive(Debug, Clone, PartialEq)]
pub enum RowRecord {
    Cells(Vec<Cell>),
    Labeled(Vec<(Label, Cell)>),
}

impl RowRecord {
    fn width(&self) -> usize {
        match self {
            Self::Cells(cells) => cells.len(),
            Self::Labeled(pairs) => pairs.len(),
        }
    }

    fn into_cells(self) -> Vec<Cell> {
        match self {
            Self::Cells(cells) => cells,
            Self::Labeled(pairs) => pairs.into_iter().map(|(_, cell)| cell).collect(),
        }
    }
}

impl From<Vec<Cell>> for RowRecord {
    fn from(cells: Vec<Cell>) -> Self {
        Self::Cells(cells)
    }
}

impl From<Vec<(Label, Cell)>> for RowRecord {
    fn from(pairs: Vec<(Label, Cell)>) -> Self {
        Self::Labeled(pairs)
    }
}

/// Value handed to a column write: a full column, or a scalar to
/// broadcast to every row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnAssignment {
    Values(Vec<Cell>),
    Scalar(Cell),
}

impl From<Vec<Cell>> for ColumnAssignment {
    fn from(values: Vec<Cell>) -> Self {
        Self::Values(values)
    }
}

impl From<Cell> for ColumnAssignment {
    fn from(value: Cell) -> Self {
        Self::Scalar(value)
    }
}

/// Result of a keyed column read: atomic keys yield a series, composite
/// keys yield a projected sub-frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSelection {
    Series(Series),
    Frame(DataFrame),
}

/// Result of a keyed row read through the location view.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelection {
    Series(Series),
    Frame(DataFrame),
}

/// Operand accepted by [`DataFrame::append`]. Scalars and bare
/// sequences are unrepresentable here by design.
#[derive(Debug, Clone, Copy)]
pub enum AppendSource<'a> {
    Frame(&'a DataFrame),
    Series(&'a Series),
}

impl<'a> From<&'a DataFrame> for AppendSource<'a> {
    fn from(frame: &'a DataFrame) -> Self {
        Self::Frame(frame)
    }
}

impl<'a> From<&'a Series> for AppendSource<'a> {
    fn from(series: &'a Series) -> Self {
        Self::Series(series)
    }
}

// ── DataFrame ──────────────────────────────────────────────────────────

/// A labeled two-dimensional container: row-major cell storage, a
/// unique column-label sequence, and a row-label sequence that may
/// carry duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    values: Vec<Vec<Cell>>,
    columns: Vec<Label>,
    indices: Vec<Label>,
}

impl DataFrame {
    /// Normalizes raw rows plus optional column and row labels into a
    /// frame.
    ///
    /// With `columns` supplied, every row is combined with the column
    /// labels positionally and must match their width. With `columns`
    /// omitted, the first row must be labeled and donates the column
    /// sequence; later labeled rows are reordered to it. Omitted
    /// `indices` default to positions `0..n`.
    pub fn new(
        values: Vec<RowRecord>,
        columns: Option<Vec<Label>>,
        indices: Option<Vec<Label>>,
    ) -> Result<Self, FrameError> {
        if values.is_empty() && columns.is_none() {
            return Err(FrameError::InvalidConstruction(
                "at least columns must be provided when values are empty".to_owned(),
            ));
        }
        if let Some(cols) = columns.as_deref() {
            validate_homogeneous(cols)?;
            ensure_unique_columns(cols)?;
        }
        if let Some(idx) = indices.as_deref() {
            validate_homogeneous(idx)?;
        }

        let (columns, rows) = match columns {
            Some(cols) => {
                let mut rows = Vec::with_capacity(values.len());
                for record in values {
                    if record.width() != cols.len() {
                        return Err(FrameError::InvalidConstruction(format!(
                            "row width {} does not match column count {}",
                            record.width(),
                            cols.len()
                        )));
                    }
                    rows.push(record.into_cells());
                }
                (cols, rows)
            }
            None => {
                let cols = match values.first() {
                    Some(RowRecord::Labeled(pairs)) => {
                        pairs.iter().map(|(label, _)| label.clone()).collect::<Vec<_>>()
                    }
                    _ => {
                        return Err(FrameError::InvalidConstruction(
                            "columns must be provided when rows are plain sequences".to_owned(),
                        ))
                    }
                };
                validate_homogeneous(&cols)?;
                ensure_unique_columns(&cols)?;

                let mut rows = Vec::with_capacity(values.len());
                for record in values {
                    rows.push(reorder_labeled_row(record, &cols)?);
                }
                (cols, rows)
            }
        };

        let indices = match indices {
            Some(idx) => idx,
            None => (0..rows.len() as i64).map(Label::from).collect(),
        };
        if indices.len() != rows.len() {
            return Err(FrameError::InvalidConstruction(format!(
                "index length {} does not match row count {}",
                indices.len(),
                rows.len()
            )));
        }

        Ok(Self {
            values: rows,
            columns,
            indices,
        })
    }

    /// Builds a frame from rows supplied as a label-to-row mapping; the
    /// mapping keys become the row labels.
    pub fn from_keyed_rows(
        rows: Vec<(Label, RowRecord)>,
        columns: Option<Vec<Label>>,
    ) -> Result<Self, FrameError> {
        let (indices, records): (Vec<Label>, Vec<RowRecord>) = rows.into_iter().unzip();
        Self::new(records, columns, Some(indices))
    }

    // ── Read accessors ─────────────────────────────────────────────────

    /// `(row count, column count)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.indices.len(), self.columns.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[Vec<Cell>] {
        &self.values
    }

    #[must_use]
    pub fn columns(&self) -> &[Label] {
        &self.columns
    }

    #[must_use]
    pub fn indices(&self) -> &[Label] {
        &self.indices
    }

    // ── Column access ──────────────────────────────────────────────────

    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        key_exists(key, &self.columns)
    }

    /// Keyed column read: an integer or string key yields one column as
    /// a series; a composite key yields a projected sub-frame with the
    /// requested columns in the requested order.
    pub fn get(&self, key: &Key) -> Result<ColumnSelection, FrameError> {
        match key {
            Key::Composite(parts) => {
                let mut requested = Vec::with_capacity(parts.len());
                for part in parts {
                    requested.push(self.column_label_for(part)?);
                }
                Ok(ColumnSelection::Frame(self.select_columns(&requested)?))
            }
            Key::Position(_) | Key::Label(_) => {
                let label = self.column_label_for(key)?;
                Ok(ColumnSelection::Series(self.column(&label)?))
            }
        }
    }

    /// One column's cells across all rows, as a deep copy.
    pub fn column(&self, name: &Label) -> Result<Series, FrameError> {
        let position =
            first_position(name, &self.columns).ok_or_else(|| FrameError::UnknownColumn {
                name: name.to_string(),
            })?;
        let data = self.values.iter().map(|row| row[position].clone()).collect();
        Series::from_column(data, name.clone(), self.indices.clone())
    }

    /// Projects the requested columns, in the requested order, onto a
    /// new frame. All rows and the original row labels are preserved;
    /// the result is a full copy, not a view.
    pub fn select_columns(&self, names: &[Label]) -> Result<Self, FrameError> {
        let mut positions = Vec::with_capacity(names.len());
        for name in names {
            positions.push(first_position(name, &self.columns).ok_or_else(|| {
                FrameError::UnknownColumn {
                    name: name.to_string(),
                }
            })?);
        }
        let values = self
            .values
            .iter()
            .map(|row| positions.iter().map(|&p| row[p].clone()).collect())
            .collect();
        Ok(Self {
            values,
            columns: names.to_vec(),
            indices: self.indices.clone(),
        })
    }

    /// Writes a column: overwrites in place when the label exists,
    /// appends a new column otherwise. A scalar assignment broadcasts
    /// to every row.
    pub fn set_column(
        &mut self,
        name: Label,
        value: impl Into<ColumnAssignment>,
    ) -> Result<(), FrameError> {
        let cells = match value.into() {
            ColumnAssignment::Values(values) => {
                if values.len() != self.values.len() {
                    return Err(FrameError::InvalidAssignment {
                        expected: self.values.len(),
                        found: values.len(),
                    });
                }
                values
            }
            ColumnAssignment::Scalar(cell) => vec![cell; self.values.len()],
        };

        match first_position(&name, &self.columns) {
            Some(position) => {
                for (row, cell) in self.values.iter_mut().zip(cells) {
                    row[position] = cell;
                }
            }
            None => {
                if let Some(existing) = self.columns.first() {
                    if !existing.same_kind(&name) {
                        return Err(KeyError::MixedLabelTypes.into());
                    }
                }
                self.columns.push(name);
                for (row, cell) in self.values.iter_mut().zip(cells) {
                    row.push(cell);
                }
            }
        }
        Ok(())
    }

    /// Column removal always fails: frames are append-only on the
    /// column axis.
    pub fn drop_column(&mut self, _name: &Label) -> Result<(), FrameError> {
        Err(FrameError::UnsupportedOperation(
            "frames are append-only; column removal is not available",
        ))
    }

    // ── Cell access ────────────────────────────────────────────────────

    /// Reads one cell addressed by row and column keys, each a label or
    /// a position.
    pub fn at(&self, row: &Key, col: &Key) -> Result<&Cell, FrameError> {
        let row_pos = self.resolve_row(row)?;
        let col_pos = self.resolve_column(col)?;
        Ok(&self.values[row_pos][col_pos])
    }

    /// Writes one cell in place. Both keys resolve before anything
    /// mutates, so a failed write leaves the frame untouched.
    pub fn set_at(&mut self, row: &Key, col: &Key, value: Cell) -> Result<(), FrameError> {
        let row_pos = self.resolve_row(row)?;
        let col_pos = self.resolve_column(col)?;
        self.values[row_pos][col_pos] = value;
        Ok(())
    }

    fn resolve_row(&self, key: &Key) -> Result<usize, FrameError> {
        match key {
            Key::Composite(_) => Err(FrameError::InvalidKeyType {
                context: "cell access",
            }),
            Key::Position(position) => {
                if *position < self.indices.len() {
                    Ok(*position)
                } else {
                    Err(FrameError::RowOutOfRange {
                        position: *position,
                        len: self.indices.len(),
                    })
                }
            }
            Key::Label(label) => {
                first_position(label, &self.indices).ok_or_else(|| FrameError::UnknownRow {
                    label: label.to_string(),
                })
            }
        }
    }

    fn resolve_column(&self, key: &Key) -> Result<usize, FrameError> {
        match key {
            Key::Composite(_) => Err(FrameError::InvalidKeyType {
                context: "cell access",
            }),
            Key::Position(position) => {
                if *position < self.columns.len() {
                    Ok(*position)
                } else {
                    Err(FrameError::ColumnOutOfRange {
                        position: *position,
                        len: self.columns.len(),
                    })
                }
            }
            Key::Label(label) => {
                if matches!(label, Label::Utf8(_))
                    && matches!(self.columns.first(), Some(Label::Int64(_)))
                {
                    return Err(FrameError::ColumnTypeMismatch);
                }
                first_position(label, &self.columns).ok_or_else(|| FrameError::UnknownColumn {
                    name: label.to_string(),
                })
            }
        }
    }

    fn column_label_for(&self, key: &Key) -> Result<Label, FrameError> {
        match key {
            Key::Composite(_) => Err(FrameError::InvalidKeyType {
                context: "column selection",
            }),
            Key::Position(position) => self
                .columns
                .get(*position)
                .cloned()
                .ok_or(FrameError::ColumnOutOfRange {
                    position: *position,
                    len: self.columns.len(),
                }),
            Key::Label(label) => {
                if first_position(label, &self.columns).is_none() {
                    return Err(FrameError::UnknownColumn {
                        name: label.to_string(),
                    });
                }
                Ok(label.clone())
            }
        }
    }

    // ── Append ─────────────────────────────────────────────────────────

    /// Appends a frame, or a series promoted to a one-row frame keyed
    /// by its own label. The operand's column set must equal this
    /// frame's, and its row labels must share this frame's label kind.
    ///
    /// With `ignore_index`, rows and labels concatenate positionally.
    /// Without it, a label present in both frames overwrites every
    /// position in `self` sharing that label; labels only in the
    /// operand append in the operand's order. When the operand carries
    /// the same label more than once, the last occurrence wins.
    pub fn append<'a>(
        &mut self,
        other: impl Into<AppendSource<'a>>,
        ignore_index: bool,
    ) -> Result<(), FrameError> {
        let promoted;
        let other: &DataFrame = match other.into() {
            AppendSource::Frame(frame) => frame,
            AppendSource::Series(series) => {
                promoted = promote_series(series)?;
                &promoted
            }
        };

        let mine: BTreeSet<&Label> = self.columns.iter().collect();
        let theirs: BTreeSet<&Label> = other.columns.iter().collect();
        if mine != theirs {
            return Err(self.column_mismatch(other));
        }

        // The merged index must stay homogeneous, like every other
        // mutation of the row labels.
        if let (Some(ours), Some(incoming)) = (self.indices.first(), other.indices.first()) {
            if !ours.same_kind(incoming) {
                return Err(KeyError::MixedLabelTypes.into());
            }
        }

        // Re-sequence the operand's cells into this frame's column order.
        let order = self
            .columns
            .iter()
            .map(|name| {
                first_position(name, &other.columns).ok_or_else(|| self.column_mismatch(other))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let reordered: Vec<Vec<Cell>> = other
            .values
            .iter()
            .map(|row| order.iter().map(|&p| row[p].clone()).collect())
            .collect();

        if ignore_index {
            self.values.extend(reordered);
            self.indices.extend(other.indices.iter().cloned());
        } else {
            for (label, row) in other.indices.iter().zip(reordered) {
                let matches = positions_of(label, &self.indices);
                if matches.is_empty() {
                    self.indices.push(label.clone());
                    self.values.push(row);
                } else {
                    for position in matches {
                        self.values[position] = row.clone();
                    }
                }
            }
        }
        Ok(())
    }

    fn column_mismatch(&self, other: &DataFrame) -> FrameError {
        FrameError::ColumnMismatch {
            left: self.columns.iter().map(Label::to_string).collect(),
            right: other.columns.iter().map(Label::to_string).collect(),
        }
    }

    // ── Apply ──────────────────────────────────────────────────────────

    /// Applies `f` once per row (`Axis::Row`) or once per column
    /// (`Axis::Column`), strictly in order, collecting results keyed by
    /// the row or column label.
    pub fn apply<F, T>(&self, mut f: F, axis: Axis) -> Result<Vec<(Label, T)>, FrameError>
    where
        F: FnMut(&Series) -> T,
    {
        let mut out = Vec::new();
        match axis {
            Axis::Row => {
                for (label, series) in self.iter_rows() {
                    out.push((label, f(&series)));
                }
            }
            Axis::Column => {
                for name in &self.columns {
                    let series = self.column(name)?;
                    out.push((name.clone(), f(&series)));
                }
            }
        }
        Ok(out)
    }

    // ── Label reassignment ─────────────────────────────────────────────

    /// Replaces the row-label sequence. Length must match.
    pub fn set_indices(&mut self, indices: Vec<Label>) -> Result<(), FrameError> {
        if indices.len() != self.indices.len() {
            return Err(FrameError::InvalidAssignment {
                expected: self.indices.len(),
                found: indices.len(),
            });
        }
        validate_homogeneous(&indices)?;
        self.indices = indices;
        Ok(())
    }

    /// Replaces the column-label sequence. Length must match and the
    /// new labels must be unique.
    pub fn set_column_names(&mut self, columns: Vec<Label>) -> Result<(), FrameError> {
        if columns.len() != self.columns.len() {
            return Err(FrameError::InvalidAssignment {
                expected: self.columns.len(),
                found: columns.len(),
            });
        }
        validate_homogeneous(&columns)?;
        ensure_unique_columns(&columns)?;
        self.columns = columns;
        Ok(())
    }

    // ── Row location view ──────────────────────────────────────────────

    /// The positional/label row accessor. The view borrows the frame,
    /// so it always reads current labels and can never go stale.
    #[must_use]
    pub fn loc(&self) -> RowLocation<'_> {
        RowLocation { frame: self }
    }

    // ── Iteration ──────────────────────────────────────────────────────

    /// Iterates rows in index order as `(row label, row series)`.
    pub fn iter_rows(&self) -> impl Iterator<Item = (Label, Series)> + '_ {
        self.values
            .iter()
            .zip(self.indices.iter())
            .map(move |(row, label)| {
                let series = Series {
                    data: row.clone(),
                    axis: Axis::Row,
                    columns: self.columns.clone(),
                    indices: vec![label.clone()],
                };
                (label.clone(), series)
            })
    }

    /// Iterates columns in column order as `(column label, column series)`.
    pub fn iter_columns(&self) -> impl Iterator<Item = (Label, Series)> + '_ {
        self.columns.iter().enumerate().map(move |(position, name)| {
            let data = self.values.iter().map(|row| row[position].clone()).collect();
            let series = Series {
                data,
                axis: Axis::Column,
                columns: vec![name.clone()],
                indices: self.indices.clone(),
            };
            (name.clone(), series)
        })
    }
}

fn ensure_unique_columns(columns: &[Label]) -> Result<(), FrameError> {
    let mut seen = BTreeSet::new();
    for column in columns {
        if !seen.insert(column) {
            return Err(FrameError::InvalidConstruction(format!(
                "duplicate column label: {column}"
            )));
        }
    }
    Ok(())
}

/// Reorders a labeled row into the frame's column order; every column
/// must be present exactly once.
fn reorder_labeled_row(record: RowRecord, columns: &[Label]) -> Result<Vec<Cell>, FrameError> {
    let pairs = match record {
        RowRecord::Labeled(pairs) => pairs,
        RowRecord::Cells(cells) => {
            if cells.len() != columns.len() {
                return Err(FrameError::InvalidConstruction(format!(
                    "row width {} does not match column count {}",
                    cells.len(),
                    columns.len()
                )));
            }
            return Ok(cells);
        }
    };
    if pairs.len() != columns.len() {
        return Err(FrameError::InvalidConstruction(format!(
            "row width {} does not match column count {}",
            pairs.len(),
            columns.len()
        )));
    }
    let mut cells = Vec::with_capacity(columns.len());
    for column in columns {
        let cell = pairs
            .iter()
            .find(|(label, _)| label == column)
            .map(|(_, cell)| cell.clone())
            .ok_or_else(|| {
                FrameError::InvalidConstruction(format!("row is missing column {column}"))
            })?;
        cells.push(cell);
    }
    Ok(cells)
}

/// Promotes a row-axis series to a one-row frame keyed by its own row
/// label (positional `0` when the series has none).
fn promote_series(series: &Series) -> Result<DataFrame, FrameError> {
    match series.axis() {
        Axis::Row => {
            let index = series.name().cloned().unwrap_or(Label::Int64(0));
            DataFrame::new(
                vec![RowRecord::Cells(series.values().to_vec())],
                Some(series.labels().to_vec()),
                Some(vec![index]),
            )
        }
        Axis::Column => Err(FrameError::InvalidConstruction(
            "a column-axis series cannot be promoted to a row".to_owned(),
        )),
    }
}

// ── Row location view ──────────────────────────────────────────────────

/// Positional/label row accessor bound to one frame for the duration of
/// the borrow. Lookups resolve against the frame's row-label sequence;
/// writes and removals are unsupported.
#[derive(Debug, Clone, Copy)]
pub struct RowLocation<'a> {
    frame: &'a DataFrame,
}

impl RowLocation<'_> {
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        key_exists(key, &self.frame.indices)
    }

    /// Keyed row read. A position or a label with a single match yields
    /// a row series; a composite key, or a label shared by several
    /// rows, yields a frame of exactly those rows with the requested
    /// labels (repeated when the source had duplicates).
    pub fn get(&self, key: &Key) -> Result<RowSelection, FrameError> {
        match key {
            Key::Position(position) => {
                let position = *position;
                if position >= self.frame.indices.len() {
                    return Err(FrameError::RowOutOfRange {
                        position,
                        len: self.frame.indices.len(),
                    });
                }
                Ok(RowSelection::Series(self.row_series(position)?))
            }
            Key::Label(label) => {
                let matches = positions_of(label, &self.frame.indices);
                match matches.as_slice() {
                    [] => Err(FrameError::UnknownRow {
                        label: label.to_string(),
                    }),
                    [single] => Ok(RowSelection::Series(self.row_series(*single)?)),
                    many => Ok(RowSelection::Frame(self.frame_at(many))),
                }
            }
            Key::Composite(parts) => {
                let mut positions = Vec::with_capacity(parts.len());
                for part in parts {
                    positions.push(self.resolve_one(part)?);
                }
                Ok(RowSelection::Frame(self.frame_at(&positions)))
            }
        }
    }

    /// Resolves each requested key to a row position (positions pass
    /// through, labels are searched first-match) and returns the raw
    /// row data for the caller to repackage.
    pub fn rows(&self, keys: &[Key]) -> Result<Vec<Vec<Cell>>, FrameError> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let position = self.resolve_one(key)?;
            out.push(self.frame.values[position].clone());
        }
        Ok(out)
    }

    /// Row assignment through the view always fails.
    pub fn set(&self, _key: &Key, _row: Vec<Cell>) -> Result<(), FrameError> {
        Err(FrameError::UnsupportedOperation(
            "rows cannot be assigned through the location view",
        ))
    }

    /// Row removal through the view always fails.
    pub fn remove(&self, _key: &Key) -> Result<(), FrameError> {
        Err(FrameError::UnsupportedOperation(
            "rows cannot be removed through the location view",
        ))
    }

    fn resolve_one(&self, key: &Key) -> Result<usize, FrameError> {
        match key {
            Key::Composite(_) => Err(FrameError::InvalidKeyType {
                context: "row lookup",
            }),
            Key::Position(position) => {
                if *position < self.frame.indices.len() {
                    Ok(*position)
                } else {
                    Err(FrameError::RowOutOfRange {
                        position: *position,
                        len: self.frame.indices.len(),
                    })
                }
            }
            Key::Label(label) => {
                first_position(label, &self.frame.indices).ok_or_else(|| FrameError::UnknownRow {
                    label: label.to_string(),
                })
            }
        }
    }

    fn row_series(&self, position: usize) -> Result<Series, FrameError> {
        Series::from_row(
            self.frame.values[position].clone(),
            self.frame.indices[position].clone(),
            self.frame.columns.clone(),
        )
    }

    fn frame_at(&self, positions: &[usize]) -> DataFrame {
        DataFrame {
            values: positions
                .iter()
                .map(|&p| self.frame.values[p].clone())
                .collect(),
            columns: self.frame.columns.clone(),
            indices: positions
                .iter()
                .map(|&p| self.frame.indices[p].clone())
                .collect(),
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

const MIN_CELL_WIDTH: usize = 6;
const DEFAULT_CELL_WIDTH: usize = 10;
const MAX_CELL_WIDTH: usize = 24;
const ELLIPSIS: &str = "...";
const SERIES_PRINT_MAX: usize = 10;

/// Pads `text` to `width`, truncating with an ellipsis when it does not
/// fit. Truncation reserves room for the marker and never touches the
/// underlying data.
fn pad_or_truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let keep = width.saturating_sub(ELLIPSIS.len());
        let head: String = text.chars().take(keep).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        format!("{text:<width$}")
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .columns
            .iter()
            .map(|c| c.to_string().chars().count().max(MIN_CELL_WIDTH))
            .max()
            .unwrap_or(DEFAULT_CELL_WIDTH)
            .clamp(DEFAULT_CELL_WIDTH, MAX_CELL_WIDTH);
        let index_width = width / 2;

        let header_cells: Vec<String> = self
            .columns
            .iter()
            .map(|c| pad_or_truncate(&c.to_string(), width))
            .collect();
        let header = format!("{}|{}|", " ".repeat(index_width), header_cells.join("|"));
        writeln!(f, "{header}")?;
        writeln!(f, "{}", "=".repeat(header.chars().count()))?;

        for (label, row) in self.indices.iter().zip(self.values.iter()) {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| pad_or_truncate(&cell.to_string(), width))
                .collect();
            writeln!(
                f,
                "{}|{}|",
                pad_or_truncate(&label.to_string(), index_width),
                cells.join("|")
            )?;
        }

        let (rows, cols) = self.shape();
        writeln!(f, "Shape: {rows}x{cols}")
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .name()
            .map_or_else(|| "unnamed".to_owned(), Label::to_string);
        let heading = match self.axis {
            Axis::Row => "Index",
            Axis::Column => "Name",
        };
        writeln!(f, "Series({heading}={name}, Length={}){{", self.len())?;
        for (label, cell) in self.iter().take(SERIES_PRINT_MAX) {
            writeln!(f, "\t{label}: {cell}")?;
        }
        if self.len() > SERIES_PRINT_MAX {
            writeln!(f, "\t{ELLIPSIS}")?;
            if let (Some(label), Some(cell)) = (self.labels().last(), self.data.last()) {
                writeln!(f, "\t{label}: {cell}")?;
            }
        }
        write!(f, "}}")
    }
}
