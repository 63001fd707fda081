use crate::form::FormError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn form_err(id: &str, e: FormError) -> serde_json::Value {
    let details = match &e {
        FormError::RowOutOfRange { index, len } => Some(json!({ "index": index, "rows": len })),
        FormError::FirstRow => None,
        FormError::UnknownField(field) => Some(json!({ "field": field })),
    };
    let code = match &e {
        FormError::FirstRow => "first_row",
        FormError::RowOutOfRange { .. } | FormError::UnknownField(_) => "bad_params",
    };
    err(id, code, e.to_string(), details)
}
