#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use formwright::{Constraint, FieldContext, Form, FormBuilder, FormData, RenderError, TemplateAdapter};
use serde_json::Value;

pub fn data(value: Value) -> FormData {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected an object, got {other:?}"),
    }
}

/// name (required) + email (required).
pub fn contact_form() -> Form {
    let mut builder = FormBuilder::create("contact");
    builder
        .set_action("/contact")
        .add_text("name", "Name")
        .required()
        .add()
        .unwrap()
        .add_email("email", "Email")
        .required()
        .add()
        .unwrap();
    builder.build_form().unwrap()
}

/// password + password_confirm with a cross-field callback.
pub fn registration_form() -> Form {
    let mut builder = FormBuilder::create("register");
    builder
        .add_password("password", "Password")
        .required()
        .add()
        .unwrap()
        .add_password("password_confirm", "Confirm password")
        .required()
        .add()
        .unwrap()
        .add_constraint(Constraint::callback(|data, ctx| {
            if data.get("password") != data.get("password_confirm") {
                ctx.add_violation("password_confirm", "Passwords do not match");
            }
        }));
    builder.build_form().unwrap()
}

/// Template adapter that substitutes `{{ name }}`, `{{ label }}` and
/// `{{ value }}` and counts directory lookups.
#[derive(Debug)]
pub struct FakeAdapter {
    pub root: PathBuf,
    pub lookups: AtomicUsize,
}

impl FakeAdapter {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl TemplateAdapter for FakeAdapter {
    fn render_template(&self, template: &Path, variables: &FieldContext) -> Result<String, RenderError> {
        let source = fs::read_to_string(template)?;
        Ok(source
            .replace("{{ name }}", &variables.name)
            .replace("{{ label }}", &variables.label)
            .replace("{{ value }}", variables.value.as_deref().unwrap_or("")))
    }

    fn resolve_template_dir(&self, build_format: &str) -> PathBuf {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.root.join(build_format)
    }
}

/// Writes `<root>/<format>/<template>.tpl`.
pub fn write_template(root: &Path, format: &str, template: &str, body: &str) {
    let dir = root.join(format);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{template}.tpl")), body).unwrap();
}
