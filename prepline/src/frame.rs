//! A minimal column-oriented table.
//!
//! [`Frame`] is the carrier the dataset reader produces and external
//! transformation stages consume. It serializes through serde, so a frame
//! travels inside the parameter bag as an ordinary JSON value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error raised when constructing or mutating a [`Frame`].
#[derive(Debug, Clone, Error)]
pub enum FrameError {
    /// A column's length disagrees with the rest of the frame.
    #[error("Column '{name}' has {len} values, expected {expected}")]
    RaggedColumn {
        /// The offending column name.
        name: String,
        /// The offending column length.
        len: usize,
        /// The row count of the frame.
        expected: usize,
    },

    /// Two columns share a name.
    #[error("Column '{name}' appears more than once")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },
}

/// An ordered collection of equally-long named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl Frame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frame from `(name, values)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error on ragged columns or repeated names.
    pub fn from_columns(
        columns: impl IntoIterator<Item = (String, Vec<Value>)>,
    ) -> Result<Self, FrameError> {
        let mut frame = Self::new();
        for (name, values) in columns {
            frame.push_column(name, values)?;
        }
        Ok(frame)
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken or the length
    /// disagrees with the existing columns.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if self.names.iter().any(|existing| *existing == name) {
            return Err(FrameError::DuplicateColumn { name });
        }
        if !self.columns.is_empty() && values.len() != self.n_rows() {
            return Err(FrameError::RaggedColumn {
                name,
                len: values.len(),
                expected: self.n_rows(),
            });
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the frame holds no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the values of the named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        let index = self.names.iter().position(|n| n == name)?;
        self.columns.get(index).map(Vec::as_slice)
    }

    /// Returns the values of the named column for in-place mutation.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<Value>> {
        let index = self.names.iter().position(|n| n == name)?;
        self.columns.get_mut(index)
    }

    /// Returns a new frame holding rows `start..end`, clamped to the
    /// frame's bounds.
    #[must_use]
    pub fn slice_rows(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.n_rows());
        let start = start.min(end);
        Self {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| column[start..end].to_vec())
                .collect(),
        }
    }
}
