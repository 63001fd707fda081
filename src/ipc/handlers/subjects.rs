use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store;
use serde_json::json;

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "subjects": [] }));
    };
    let class_id = req.params.get("classId").and_then(|v| v.as_str());
    let admin_id = req.params.get("adminId").and_then(|v| v.as_str());

    match store::list_subjects(conn, class_id, admin_id) {
        Ok(subjects) => ok(&req.id, json!({ "subjects": subjects })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_subjects_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "submission": state.submission_status }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_subjects_list(state, req)),
        "subjects.status" => Some(handle_subjects_status(state, req)),
        _ => None,
    }
}
