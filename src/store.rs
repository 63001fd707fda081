use crate::form::{
    submission_channel, PendingSubmission, ResourceKind, SubjectEntry, SubmissionPayload,
    SubmissionReporter, SubmissionService, SubmissionState,
};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

pub const DUPLICATE_CODE_MESSAGE: &str = "Sorry this subcode must be unique as it already exists";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub id: String,
    pub class_id: String,
    pub admin_id: String,
    pub name: String,
    pub code: String,
    pub sessions: String,
    pub sort_order: i64,
    pub created_at: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(usize),
    DuplicateCode(String),
}

/// Saves submitted subjects into the workspace database and keeps the shared
/// submission status that other screens read.
pub struct SubjectStore<'a> {
    conn: Option<&'a Connection>,
    status: &'a mut SubmissionState,
}

impl<'a> SubjectStore<'a> {
    pub fn new(conn: Option<&'a Connection>, status: &'a mut SubmissionState) -> Self {
        Self { conn, status }
    }

    fn publish(&mut self, reporter: &SubmissionReporter, state: SubmissionState) {
        *self.status = state.clone();
        reporter.publish(state);
    }
}

impl SubmissionService for SubjectStore<'_> {
    fn submit(&mut self, payload: SubmissionPayload, kind: ResourceKind) -> PendingSubmission {
        let (reporter, pending) = submission_channel();
        self.publish(&reporter, SubmissionState::Submitting);

        let state = match self.conn {
            None => {
                tracing::warn!(kind = kind.as_str(), "no workspace selected; cannot save");
                SubmissionState::TransportError
            }
            Some(conn) => match save_subjects(conn, &payload) {
                Ok(SaveOutcome::Saved(n)) => {
                    tracing::info!(
                        kind = kind.as_str(),
                        class_id = %payload.group_id,
                        saved = n,
                        "subjects saved"
                    );
                    SubmissionState::Succeeded
                }
                Ok(SaveOutcome::DuplicateCode(code)) => {
                    tracing::info!(kind = kind.as_str(), %code, "duplicate subject code");
                    SubmissionState::Rejected(DUPLICATE_CODE_MESSAGE.to_string())
                }
                Err(e) => {
                    tracing::warn!(kind = kind.as_str(), error = %e, "saving subjects failed");
                    SubmissionState::TransportError
                }
            },
        };

        self.publish(&reporter, state);
        pending
    }

    fn acknowledge(&mut self) {
        *self.status = SubmissionState::Idle;
    }
}

/// Inserts all payload entries in one transaction. Codes are unique per admin,
/// both against stored subjects and within the payload itself.
pub fn save_subjects(conn: &Connection, payload: &SubmissionPayload) -> anyhow::Result<SaveOutcome> {
    let mut seen: HashSet<&str> = HashSet::new();
    for entry in &payload.entries {
        if !seen.insert(entry.code.as_str()) {
            return Ok(SaveOutcome::DuplicateCode(entry.code.clone()));
        }
    }

    let tx = conn.unchecked_transaction()?;

    for entry in &payload.entries {
        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM subjects WHERE admin_id = ? AND code = ? LIMIT 1",
                (&payload.admin_id, &entry.code),
                |r| r.get(0),
            )
            .optional()?;
        if exists.is_some() {
            tx.rollback()?;
            return Ok(SaveOutcome::DuplicateCode(entry.code.clone()));
        }
    }

    let next_order: i64 = tx.query_row(
        "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM subjects WHERE class_id = ?",
        [&payload.group_id],
        |r| r.get(0),
    )?;
    let created_at = chrono::Utc::now().to_rfc3339();

    for (i, SubjectEntry { name, code, session_count }) in payload.entries.iter().enumerate() {
        tx.execute(
            "INSERT INTO subjects(id, class_id, admin_id, name, code, sessions, sort_order, created_at)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
            (
                Uuid::new_v4().to_string(),
                &payload.group_id,
                &payload.admin_id,
                name,
                code,
                session_count,
                next_order + i as i64,
                &created_at,
            ),
        )?;
    }

    tx.commit()?;
    Ok(SaveOutcome::Saved(payload.entries.len()))
}

pub fn list_subjects(
    conn: &Connection,
    class_id: Option<&str>,
    admin_id: Option<&str>,
) -> anyhow::Result<Vec<SubjectRecord>> {
    let mut sql = String::from(
        "SELECT id, class_id, admin_id, name, code, sessions, sort_order, created_at
         FROM subjects WHERE 1 = 1",
    );
    let mut params: Vec<Value> = Vec::new();
    if let Some(cid) = class_id {
        sql.push_str(" AND class_id = ?");
        params.push(Value::Text(cid.to_string()));
    }
    if let Some(aid) = admin_id {
        sql.push_str(" AND admin_id = ?");
        params.push(Value::Text(aid.to_string()));
    }
    sql.push_str(" ORDER BY class_id, sort_order");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params), |row| {
            Ok(SubjectRecord {
                id: row.get(0)?,
                class_id: row.get(1)?,
                admin_id: row.get(2)?,
                name: row.get(3)?,
                code: row.get(4)?,
                sessions: row.get(5)?,
                sort_order: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::submit::SUBJECTS_ROUTE;
    use crate::form::{Navigator, Notifier, SubjectForm};

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().expect("open memory db");
        crate::db::create_schema(&conn).expect("create schema");
        conn
    }

    fn payload(admin: &str, entries: &[(&str, &str, &str)]) -> SubmissionPayload {
        SubmissionPayload {
            group_id: "class-7".into(),
            admin_id: admin.into(),
            entries: entries
                .iter()
                .map(|(n, c, s)| SubjectEntry::new(*n, *c, *s))
                .collect(),
        }
    }

    #[derive(Default)]
    struct Screen {
        messages: Vec<String>,
        routes: Vec<String>,
    }

    impl Notifier for Screen {
        fn notify(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    impl Navigator for Screen {
        fn navigate(&mut self, path: &str) {
            self.routes.push(path.to_string());
        }
    }

    #[test]
    fn saves_in_order_and_lists_back() {
        let conn = memory_db();
        let out = save_subjects(
            &conn,
            &payload("admin", &[("Math", "M101", "10"), ("Art", "A1", "4")]),
        )
        .expect("save");
        assert_eq!(out, SaveOutcome::Saved(2));

        let rows = list_subjects(&conn, Some("class-7"), None).expect("list");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "M101");
        assert_eq!(rows[0].sort_order, 0);
        assert_eq!(rows[1].code, "A1");
        assert_eq!(rows[1].sessions, "4");
    }

    #[test]
    fn duplicate_codes_are_rejected_per_admin() {
        let conn = memory_db();
        save_subjects(&conn, &payload("admin", &[("Math", "M101", "10")])).expect("save");

        let again = save_subjects(&conn, &payload("admin", &[("Maths", "M101", "3")])).expect("save");
        assert_eq!(again, SaveOutcome::DuplicateCode("M101".into()));

        let other_admin =
            save_subjects(&conn, &payload("other", &[("Math", "M101", "10")])).expect("save");
        assert_eq!(other_admin, SaveOutcome::Saved(1));

        let within = save_subjects(
            &conn,
            &payload("admin", &[("Bio", "B1", "2"), ("Biology", "B1", "2")]),
        )
        .expect("save");
        assert_eq!(within, SaveOutcome::DuplicateCode("B1".into()));
        assert_eq!(list_subjects(&conn, None, Some("admin")).expect("list").len(), 1);
    }

    #[test]
    fn form_round_trip_through_store() {
        let conn = memory_db();
        let mut status = SubmissionState::Idle;
        let mut popup = Screen::default();
        let mut router = Screen::default();
        let mut form = SubjectForm::new("class-7", "admin");
        form.update_field(0, "name".parse().expect("field"), "Math").expect("name");
        form.update_field(0, "code".parse().expect("field"), "M101").expect("code");
        form.update_field(0, "sessions".parse().expect("field"), "10").expect("sessions");

        let mut store = SubjectStore::new(Some(&conn), &mut status);
        form.submit(&mut store, &mut popup);
        let settled = form.poll(&mut store, &mut popup, &mut router);
        assert_eq!(settled, Some(SubmissionState::Succeeded));
        assert!(popup.messages.is_empty());
        assert_eq!(router.routes, vec![SUBJECTS_ROUTE.to_string()]);
        // Acknowledged after success.
        assert_eq!(status, SubmissionState::Idle);
        assert_eq!(list_subjects(&conn, Some("class-7"), Some("admin")).expect("list").len(), 1);
    }

    #[test]
    fn missing_workspace_is_a_transport_error() {
        let mut status = SubmissionState::Idle;
        let mut store = SubjectStore::new(None, &mut status);
        let pending = store.submit(payload("a", &[("Math", "M1", "1")]), ResourceKind::Subject);
        assert_eq!(pending.poll(), Some(SubmissionState::TransportError));
        assert_eq!(status, SubmissionState::TransportError);
    }
}
