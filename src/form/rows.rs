use super::validate::{validate, FieldErrors, SubjectEntry};
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("row index {index} out of range (rows: {len})")]
    RowOutOfRange { index: usize, len: usize },
    #[error("the first row cannot be removed")]
    FirstRow,
    #[error("unknown field: {0}")]
    UnknownField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Code,
    SessionCount,
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Legacy wire names are still sent by older shells.
        match s {
            "name" | "subName" => Ok(Field::Name),
            "code" | "subCode" => Ok(Field::Code),
            "sessionCount" | "sessions" => Ok(Field::SessionCount),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub entry: SubjectEntry,
    pub errors: FieldErrors,
}

/// Ordered subject rows with their validation messages kept index-aligned.
#[derive(Debug, Clone)]
pub struct RowCollection {
    entries: Vec<SubjectEntry>,
    errors: Vec<FieldErrors>,
    revision: u64,
}

impl Default for RowCollection {
    fn default() -> Self {
        Self {
            entries: vec![SubjectEntry::default()],
            errors: vec![FieldErrors::default()],
            revision: 0,
        }
    }
}

impl RowCollection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[SubjectEntry] {
        &self.entries
    }

    pub fn errors(&self) -> &[FieldErrors] {
        &self.errors
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        debug_assert_eq!(self.entries.len(), self.errors.len());
        self.revision += 1;
    }

    fn check_index(&self, index: usize) -> Result<(), FormError> {
        if index >= self.len() {
            return Err(FormError::RowOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    pub fn add_row(&mut self) {
        self.entries.push(SubjectEntry::default());
        self.errors.push(FieldErrors::default());
        self.touch();
    }

    /// Removes a row after the first. Row 0 always stays, so the form is never empty.
    pub fn remove_row(&mut self, index: usize) -> Result<(), FormError> {
        self.check_index(index)?;
        if index == 0 {
            return Err(FormError::FirstRow);
        }
        self.entries.remove(index);
        self.errors.remove(index);
        self.touch();
        Ok(())
    }

    /// Sets one field and re-validates that row only.
    pub fn update_field(
        &mut self,
        index: usize,
        field: Field,
        value: impl Into<String>,
    ) -> Result<&FieldErrors, FormError> {
        self.check_index(index)?;
        let entry = &mut self.entries[index];
        match field {
            Field::Name => entry.name = value.into(),
            Field::Code => entry.code = value.into(),
            Field::SessionCount => entry.session_count = value.into(),
        }
        self.errors[index] = validate(&self.entries[index]);
        self.touch();
        Ok(&self.errors[index])
    }

    /// Re-validates every row, replacing the stored errors. Returns true when all rows pass.
    pub fn validate_all(&mut self) -> bool {
        self.errors = self.entries.iter().map(validate).collect();
        self.touch();
        self.errors.iter().all(FieldErrors::is_valid)
    }

    pub fn rows(&self) -> Vec<RowView> {
        self.entries
            .iter()
            .zip(self.errors.iter())
            .map(|(entry, errors)| RowView {
                entry: entry.clone(),
                errors: errors.clone(),
            })
            .collect()
    }
}
