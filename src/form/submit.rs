use super::rows::RowCollection;
use super::validate::SubjectEntry;
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

pub const VALIDATION_FAILED_MESSAGE: &str = "Please fix validation errors before submitting.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error";
pub const SUBJECTS_ROUTE: &str = "/Admin/subjects";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Subject,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Subject => "Subject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub group_id: String,
    pub admin_id: String,
    pub entries: Vec<SubjectEntry>,
}

/// Status published by a submission backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Rejected(String),
    TransportError,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded
                | SubmissionState::Rejected(_)
                | SubmissionState::TransportError
        )
    }
}

/// Backend half of a submission: pushes state changes to the waiting form.
#[derive(Debug)]
pub struct SubmissionReporter {
    tx: Sender<SubmissionState>,
}

impl SubmissionReporter {
    pub fn publish(&self, state: SubmissionState) {
        // The form may have been closed already; nobody is left to tell.
        let _ = self.tx.send(state);
    }
}

/// Form half of a submission: the local result handle the coordinator polls.
#[derive(Debug)]
pub struct PendingSubmission {
    rx: Receiver<SubmissionState>,
}

impl PendingSubmission {
    /// Drains published states and returns the first terminal one, if any.
    /// A reporter dropped without a terminal state counts as a transport error.
    pub fn poll(&self) -> Option<SubmissionState> {
        loop {
            match self.rx.try_recv() {
                Ok(state) if state.is_terminal() => return Some(state),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(SubmissionState::TransportError),
            }
        }
    }
}

pub fn submission_channel() -> (SubmissionReporter, PendingSubmission) {
    let (tx, rx) = mpsc::channel();
    (SubmissionReporter { tx }, PendingSubmission { rx })
}

pub trait SubmissionService {
    fn submit(&mut self, payload: SubmissionPayload, kind: ResourceKind) -> PendingSubmission;
    /// Clears a succeeded state so later screens don't observe it.
    fn acknowledge(&mut self);
}

pub trait Notifier {
    fn notify(&mut self, message: &str);
}

pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Validating,
    Submitting,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmitOutcome {
    /// At least one row failed validation; nothing was sent.
    Invalid,
    Dispatched,
    /// A submission is already in flight.
    Busy,
    /// The form already submitted successfully.
    Completed,
}

#[derive(Debug)]
pub struct SubmissionCoordinator {
    group_id: String,
    admin_id: String,
    phase: Phase,
    pending: Option<PendingSubmission>,
}

impl SubmissionCoordinator {
    pub fn new(group_id: impl Into<String>, admin_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            admin_id: admin_id.into(),
            phase: Phase::Idle,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn loading(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn admin_id(&self) -> &str {
        &self.admin_id
    }

    fn payload(&self, rows: &RowCollection) -> SubmissionPayload {
        SubmissionPayload {
            group_id: self.group_id.clone(),
            admin_id: self.admin_id.clone(),
            entries: rows.entries().iter().map(SubjectEntry::normalized).collect(),
        }
    }

    pub fn submit(
        &mut self,
        rows: &mut RowCollection,
        service: &mut dyn SubmissionService,
        notifier: &mut dyn Notifier,
    ) -> SubmitOutcome {
        match self.phase {
            Phase::Submitting => return SubmitOutcome::Busy,
            Phase::Done => return SubmitOutcome::Completed,
            Phase::Idle | Phase::Validating => {}
        }

        self.phase = Phase::Validating;
        if !rows.validate_all() {
            self.phase = Phase::Idle;
            tracing::debug!(group_id = %self.group_id, "subject form has validation errors");
            notifier.notify(VALIDATION_FAILED_MESSAGE);
            return SubmitOutcome::Invalid;
        }

        let payload = self.payload(rows);
        tracing::info!(
            group_id = %self.group_id,
            admin_id = %self.admin_id,
            subjects = payload.entries.len(),
            "submitting subjects"
        );
        self.phase = Phase::Submitting;
        self.pending = Some(service.submit(payload, ResourceKind::Subject));
        SubmitOutcome::Dispatched
    }

    /// Reacts to a terminal state published for the in-flight submission.
    pub fn poll(
        &mut self,
        service: &mut dyn SubmissionService,
        notifier: &mut dyn Notifier,
        navigator: &mut dyn Navigator,
    ) -> Option<SubmissionState> {
        let state = self.pending.as_ref()?.poll()?;
        self.pending = None;
        match &state {
            SubmissionState::Succeeded => {
                self.phase = Phase::Done;
                service.acknowledge();
                navigator.navigate(SUBJECTS_ROUTE);
            }
            SubmissionState::Rejected(reason) => {
                self.phase = Phase::Idle;
                tracing::info!(group_id = %self.group_id, %reason, "subjects rejected");
                notifier.notify(reason);
            }
            SubmissionState::TransportError => {
                self.phase = Phase::Idle;
                tracing::warn!(group_id = %self.group_id, "subject submission did not complete");
                notifier.notify(NETWORK_ERROR_MESSAGE);
            }
            SubmissionState::Idle | SubmissionState::Submitting => {}
        }
        Some(state)
    }
}
