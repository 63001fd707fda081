use crate::form::{Field, Phase, SubmitOutcome};
use crate::ipc::error::{err, form_err, ok};
use crate::ipc::types::{AppState, FormSession, Request};
use crate::store::SubjectStore;
use serde_json::json;
use uuid::Uuid;

fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    }
}

fn required_index(req: &Request) -> Result<usize, serde_json::Value> {
    match req.params.get("index").and_then(|v| v.as_u64()) {
        Some(v) => Ok(v as usize),
        None => Err(err(&req.id, "bad_params", "missing/invalid index", None)),
    }
}

fn session<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<(String, &'a mut FormSession), serde_json::Value> {
    let form_id = required_str(req, "formId")?.to_string();
    match state.forms.get_mut(&form_id) {
        Some(s) => Ok((form_id, s)),
        None => Err(err(
            &req.id,
            "not_found",
            "form not found",
            Some(json!({ "formId": form_id })),
        )),
    }
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let admin_id = match required_str(req, "adminId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let form_id = Uuid::new_v4().to_string();
    let session = FormSession::new(class_id, admin_id);
    let view = session.view();
    state.forms.insert(form_id.clone(), session);
    tracing::debug!(%form_id, %class_id, "subject form opened");

    ok(&req.id, json!({ "formId": form_id, "view": view }))
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match session(state, req) {
        Ok((form_id, s)) => ok(&req.id, json!({ "formId": form_id, "view": s.view() })),
        Err(e) => e,
    }
}

fn handle_add_row(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (form_id, s) = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    s.form.add_row();
    ok(&req.id, json!({ "formId": form_id, "view": s.view() }))
}

fn handle_remove_row(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match required_index(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let (form_id, s) = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = s.form.remove_row(index) {
        return form_err(&req.id, e);
    }
    ok(&req.id, json!({ "formId": form_id, "view": s.view() }))
}

fn handle_update_field(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match required_index(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let field: Field = match req.params.get("field").and_then(|v| v.as_str()) {
        Some(f) => match f.parse() {
            Ok(v) => v,
            Err(e) => return form_err(&req.id, e),
        },
        None => return err(&req.id, "bad_params", "missing field", None),
    };
    // Sessions arrive as either text or a number from number inputs.
    let value = match req.params.get("value") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(_) => {
            return err(&req.id, "bad_params", "value must be a string or number", None);
        }
    };

    let (form_id, s) = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let errors = match s.form.update_field(index, field, value) {
        Ok(errors) => errors.clone(),
        Err(e) => return form_err(&req.id, e),
    };
    ok(
        &req.id,
        json!({ "formId": form_id, "rowErrors": errors, "view": s.view() }),
    )
}

fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let form_id = match required_str(req, "formId") {
        Ok(v) => v.to_string(),
        Err(e) => return e,
    };
    let AppState {
        db,
        submission_status,
        forms,
        ..
    } = state;
    let Some(s) = forms.get_mut(&form_id) else {
        return err(
            &req.id,
            "not_found",
            "form not found",
            Some(json!({ "formId": form_id })),
        );
    };

    let mut store = SubjectStore::new(db.as_ref(), submission_status);
    let outcome = s.form.submit(&mut store, &mut s.popup);
    // The SQLite store settles before returning, so the result is already published.
    let settled = match outcome {
        SubmitOutcome::Dispatched => s.form.poll(&mut store, &mut s.popup, &mut s.route),
        SubmitOutcome::Invalid | SubmitOutcome::Busy | SubmitOutcome::Completed => None,
    };
    let view = s.view();

    // A saved form has navigated away; its session ends with this response.
    if s.form.phase() == Phase::Done {
        forms.remove(&form_id);
        tracing::debug!(%form_id, "subject form finished");
    }

    ok(
        &req.id,
        json!({
            "formId": form_id,
            "outcome": outcome,
            "submission": settled,
            "view": view,
        }),
    )
}

fn handle_dismiss_popup(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (form_id, s) = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    s.popup.visible = false;
    ok(&req.id, json!({ "formId": form_id, "view": s.view() }))
}

fn handle_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let form_id = match required_str(req, "formId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let closed = state.forms.remove(form_id).is_some();
    ok(&req.id, json!({ "formId": form_id, "closed": closed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjectForm.open" => Some(handle_open(state, req)),
        "subjectForm.get" => Some(handle_get(state, req)),
        "subjectForm.addRow" => Some(handle_add_row(state, req)),
        "subjectForm.removeRow" => Some(handle_remove_row(state, req)),
        "subjectForm.updateField" => Some(handle_update_field(state, req)),
        "subjectForm.submit" => Some(handle_submit(state, req)),
        "subjectForm.dismissPopup" => Some(handle_dismiss_popup(state, req)),
        "subjectForm.close" => Some(handle_close(state, req)),
        _ => None,
    }
}
