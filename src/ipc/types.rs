use std::collections::HashMap;
use std::path::PathBuf;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::form::{Navigator, Notifier, SubjectForm, SubmissionState};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// Last status published by the subject backend; reset by acknowledge.
    pub submission_status: SubmissionState,
    pub forms: HashMap<String, FormSession>,
}

/// Single message slot shown over the form.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Popup {
    pub message: String,
    pub visible: bool,
}

impl Notifier for Popup {
    fn notify(&mut self, message: &str) {
        self.message = message.to_string();
        self.visible = true;
    }
}

#[derive(Debug, Default)]
pub struct Route {
    pub navigate_to: Option<String>,
}

impl Navigator for Route {
    fn navigate(&mut self, path: &str) {
        self.navigate_to = Some(path.to_string());
    }
}

#[derive(Debug)]
pub struct FormSession {
    pub form: SubjectForm,
    pub popup: Popup,
    pub route: Route,
}

impl FormSession {
    pub fn new(class_id: &str, admin_id: &str) -> Self {
        Self {
            form: SubjectForm::new(class_id, admin_id),
            popup: Popup::default(),
            route: Route::default(),
        }
    }

    pub fn view(&self) -> serde_json::Value {
        serde_json::json!({
            "form": self.form.snapshot(),
            "popup": self.popup,
            "navigateTo": self.route.navigate_to,
        })
    }
}
