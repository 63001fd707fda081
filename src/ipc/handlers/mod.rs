pub mod classes;
pub mod core;
pub mod subject_form;
pub mod subjects;
