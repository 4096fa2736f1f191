#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A row or column label. Label sequences on a frame are homogeneous:
/// all `Int64` or all `Utf8`, never mixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Label {
    Int64(i64),
    Utf8(String),
}

impl Label {
    #[must_use]
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int64(_))
    }

    #[must_use]
    pub fn same_kind(&self, other: &Self) -> bool {
        self.is_int() == other.is_int()
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_owned())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self::Utf8(value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KeyError {
    #[error("position {position} out of range for label sequence of length {len}")]
    OutOfRange { position: usize, len: usize },
    #[error("unknown label: {label}")]
    UnknownLabel { label: String },
    #[error("label sequence mixes integer and string labels")]
    MixedLabelTypes,
    #[error("label {label:?} cannot be encoded into a composite key")]
    UnencodableLabel { label: String },
}

/// Rejects label sequences that mix integer and string labels.
pub fn validate_homogeneous(labels: &[Label]) -> Result<(), KeyError> {
    if let Some(first) = labels.first() {
        if labels.iter().any(|label| !label.same_kind(first)) {
            return Err(KeyError::MixedLabelTypes);
        }
    }
    Ok(())
}

// ── Composite key wire format ──────────────────────────────────────────
//
// Multi-element selections travel as `"[" + labels.join(";") + "]"`.
// Labels must not contain the delimiter or the bracket characters, so
// encoding a list and decoding it reproduces the original list exactly.

pub const COMPOSITE_DELIMITER: char = ';';
const COMPOSITE_OPEN: char = '[';
const COMPOSITE_CLOSE: char = ']';

#[must_use]
pub fn is_composite_str(raw: &str) -> bool {
    raw.starts_with(COMPOSITE_OPEN) && raw.ends_with(COMPOSITE_CLOSE)
}

/// Encodes a label list into the composite wire form.
pub fn encode_labels<S: AsRef<str>>(labels: &[S]) -> Result<String, KeyError> {
    let mut parts = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.as_ref();
        if label.contains(COMPOSITE_DELIMITER)
            || label.contains(COMPOSITE_OPEN)
            || label.contains(COMPOSITE_CLOSE)
        {
            return Err(KeyError::UnencodableLabel {
                label: label.to_owned(),
            });
        }
        parts.push(label);
    }
    Ok(format!("[{}]", parts.join(";")))
}

/// Decodes a composite wire string back into its label list.
/// Returns `None` when the input is not bracketed.
#[must_use]
pub fn decode_labels(raw: &str) -> Option<Vec<String>> {
    if !is_composite_str(raw) {
        return None;
    }
    let inner = &raw[1..raw.len() - 1];
    if inner.is_empty() {
        return Some(Vec::new());
    }
    Some(inner.split(COMPOSITE_DELIMITER).map(str::to_owned).collect())
}

// ── Keys ───────────────────────────────────────────────────────────────

/// A lookup key, decoded once at the boundary. Resolution branches on
/// the tag instead of inspecting runtime types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Key {
    Position(usize),
    Label(Label),
    Composite(Vec<Key>),
}

impl Key {
    /// Parses a wire-form key. Bracketed input becomes a composite whose
    /// atoms are positions when every atom is numeric and string labels
    /// otherwise; anything else is a single string label.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match decode_labels(raw) {
            Some(atoms) => {
                let all_numeric =
                    !atoms.is_empty() && atoms.iter().all(|atom| atom.parse::<usize>().is_ok());
                let keys = atoms
                    .into_iter()
                    .map(|atom| {
                        if all_numeric {
                            // The parse succeeded for every atom above.
                            atom.parse::<usize>().map_or(
                                Self::Label(Label::Utf8(atom)),
                                Self::Position,
                            )
                        } else {
                            Self::Label(Label::Utf8(atom))
                        }
                    })
                    .collect();
                Self::Composite(keys)
            }
            None => Self::Label(Label::Utf8(raw.to_owned())),
        }
    }

    /// Builds a composite key from a list of labels.
    #[must_use]
    pub fn composite<L: Into<Label>>(labels: Vec<L>) -> Self {
        Self::Composite(labels.into_iter().map(|l| Self::Label(l.into())).collect())
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Position(value)
    }
}

impl From<Label> for Key {
    fn from(value: Label) -> Self {
        Self::Label(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Label(Label::from(value))
    }
}

// ── Resolution ─────────────────────────────────────────────────────────

/// First position of `label` in the sequence, if any.
#[must_use]
pub fn first_position(label: &Label, labels: &[Label]) -> Option<usize> {
    labels.iter().position(|candidate| candidate == label)
}

/// Every position sharing `label`, in sequence order. Multi-result
/// callers use this to see past the first-match contract of `resolve`.
#[must_use]
pub fn positions_of(label: &Label, labels: &[Label]) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, candidate)| *candidate == label)
        .map(|(idx, _)| idx)
        .collect()
}

/// Resolves a key against a label sequence into canonical positions.
///
/// A label that occurs more than once resolves to its FIRST position;
/// that first-match behavior is part of the contract, and callers that
/// want every occurrence go through [`positions_of`]. Composite atoms
/// resolve independently and concatenate in the order supplied, with
/// requested duplicates preserved.
pub fn resolve(key: &Key, labels: &[Label]) -> Result<Vec<usize>, KeyError> {
    match key {
        Key::Position(position) => {
            if *position < labels.len() {
                Ok(vec![*position])
            } else {
                Err(KeyError::OutOfRange {
                    position: *position,
                    len: labels.len(),
                })
            }
        }
        Key::Label(label) => first_position(label, labels)
            .map(|position| vec![position])
            .ok_or_else(|| KeyError::UnknownLabel {
                label: label.to_string(),
            }),
        Key::Composite(parts) => {
            let mut positions = Vec::with_capacity(parts.len());
            for part in parts {
                positions.extend(resolve(part, labels)?);
            }
            Ok(positions)
        }
    }
}

/// Existence check: composites require every atom present (order does
/// not matter), positions must be in bounds, labels must be members.
#[must_use]
pub fn key_exists(key: &Key, labels: &[Label]) -> bool {
    match key {
        Key::Position(position) => *position < labels.len(),
        Key::Label(label) => first_position(label, labels).is_some(),
        Key::Composite(parts) => parts.iter().all(|part| key_exists(part, labels)),
    }
}
