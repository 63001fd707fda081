//! The "add subjects" screen: editable rows, per-field validation and a
//! one-shot submission to an injected backend.

pub mod rows;
pub mod submit;
pub mod validate;

use serde::Serialize;

pub use rows::{Field, FormError, RowCollection, RowView};
pub use submit::{
    submission_channel, Navigator, Notifier, PendingSubmission, Phase, ResourceKind,
    SubmissionCoordinator, SubmissionPayload, SubmissionReporter, SubmissionService, SubmissionState,
    SubmitOutcome,
};
pub use validate::{FieldErrors, SubjectEntry};

/// Immutable view handed to the renderer after every change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub revision: u64,
    pub group_id: String,
    pub admin_id: String,
    pub rows: Vec<RowView>,
    pub loading: bool,
    pub phase: Phase,
    pub can_submit: bool,
}

#[derive(Debug)]
pub struct SubjectForm {
    rows: RowCollection,
    coordinator: SubmissionCoordinator,
}

impl SubjectForm {
    pub fn new(group_id: impl Into<String>, admin_id: impl Into<String>) -> Self {
        Self {
            rows: RowCollection::default(),
            coordinator: SubmissionCoordinator::new(group_id, admin_id),
        }
    }

    pub fn add_row(&mut self) {
        self.rows.add_row();
    }

    pub fn remove_row(&mut self, index: usize) -> Result<(), FormError> {
        self.rows.remove_row(index)
    }

    pub fn update_field(
        &mut self,
        index: usize,
        field: Field,
        value: impl Into<String>,
    ) -> Result<&FieldErrors, FormError> {
        self.rows.update_field(index, field, value)
    }

    pub fn submit(
        &mut self,
        service: &mut dyn SubmissionService,
        notifier: &mut dyn Notifier,
    ) -> SubmitOutcome {
        self.coordinator.submit(&mut self.rows, service, notifier)
    }

    pub fn poll(
        &mut self,
        service: &mut dyn SubmissionService,
        notifier: &mut dyn Notifier,
        navigator: &mut dyn Navigator,
    ) -> Option<SubmissionState> {
        self.coordinator.poll(service, notifier, navigator)
    }

    pub fn phase(&self) -> Phase {
        self.coordinator.phase()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let phase = self.coordinator.phase();
        FormSnapshot {
            revision: self.rows.revision(),
            group_id: self.coordinator.group_id().to_string(),
            admin_id: self.coordinator.admin_id().to_string(),
            rows: self.rows.rows(),
            loading: self.coordinator.loading(),
            phase,
            can_submit: matches!(phase, Phase::Idle),
        }
    }
}
