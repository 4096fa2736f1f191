#![forbid(unsafe_code)]

//! Delimited-text adapter. Builds frames through the public constructor
//! and reads them back through the public accessors only; it has no
//! view of the frame's internal storage.

use csv::{ReaderBuilder, WriterBuilder};
use gf_frame::{DataFrame, FrameError, RowRecord};
use gf_index::Label;
use gf_types::Cell;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("csv input has no headers")]
    MissingHeaders,
    #[error("index column {position} out of range for {width} csv columns")]
    BadIndexColumn { position: usize, width: usize },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Reader options mirroring the delimited-text import surface:
/// separator byte, caller-supplied header names (the first file row is
/// then data), and an optional column to lift out as the row index.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub separator: u8,
    pub header_names: Option<Vec<String>>,
    pub index_col: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            header_names: None,
            index_col: None,
        }
    }
}

pub fn read_csv_str(input: &str, options: &CsvOptions) -> Result<DataFrame, IoError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.separator)
        .has_headers(options.header_names.is_none())
        .from_reader(input.as_bytes());

    let mut headers: Vec<String> = match &options.header_names {
        Some(names) => names.clone(),
        None => {
            let parsed = reader.headers()?.clone();
            if parsed.is_empty() {
                return Err(IoError::MissingHeaders);
            }
            parsed.iter().map(str::to_owned).collect()
        }
    };

    if let Some(index_col) = options.index_col {
        if index_col >= headers.len() {
            return Err(IoError::BadIndexColumn {
                position: index_col,
                width: headers.len(),
            });
        }
        headers.remove(index_col);
    }

    let mut rows: Vec<RowRecord> = Vec::new();
    let mut raw_index: Vec<String> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<Cell> = record.iter().map(parse_cell).collect();
        if let Some(index_col) = options.index_col {
            if index_col >= cells.len() {
                return Err(IoError::BadIndexColumn {
                    position: index_col,
                    width: cells.len(),
                });
            }
            let label = record.get(index_col).unwrap_or_default().to_owned();
            cells.remove(index_col);
            raw_index.push(label);
        }
        rows.push(RowRecord::Cells(cells));
    }

    let columns = headers.into_iter().map(Label::from).collect();
    let indices = options.index_col.map(|_| index_labels(raw_index));
    Ok(DataFrame::new(rows, Some(columns), indices)?)
}

pub fn write_csv_string(frame: &DataFrame) -> Result<String, IoError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    let headers: Vec<String> = frame.columns().iter().map(Label::to_string).collect();
    writer.write_record(&headers)?;

    for row in frame.values() {
        let fields: Vec<String> = row.iter().map(Cell::to_string).collect();
        writer.write_record(&fields)?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn parse_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Cell::Int64(value);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return Cell::Float64(value);
    }
    if let Ok(value) = trimmed.parse::<bool>() {
        return Cell::Bool(value);
    }
    Cell::Utf8(trimmed.to_owned())
}

/// Index labels are integers when every raw value parses as one, and
/// strings otherwise; label sequences must stay homogeneous.
fn index_labels(raw: Vec<String>) -> Vec<Label> {
    let all_int = !raw.is_empty() && raw.iter().all(|v| v.trim().parse::<i64>().is_ok());
    raw.into_iter()
        .map(|v| {
            if all_int {
                v.trim()
                    .parse::<i64>()
                    .map_or_else(|_| Label::Utf8(v.clone()), Label::Int64)
            } else {
                Label::Utf8(v)
            }
        })
        .collect()
}
