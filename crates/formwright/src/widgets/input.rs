//! Single-element controls.

use super::{class_attr, extra_attrs, html_escape, Widget};
use crate::render::FieldContext;

/// `<input>` for text-like types (text, email, password, number, file,
/// date, time, datetime-local).
#[derive(Debug, Clone, Copy, Default)]
pub struct InputWidget;

impl Widget for InputWidget {
    fn render(&self, field: &FieldContext) -> String {
        // Browsers never repopulate password or file inputs.
        let value_attr = match field.input_type.as_str() {
            "password" | "file" => String::new(),
            _ => field
                .value
                .as_ref()
                .map(|v| format!(r#" value="{}""#, html_escape(v)))
                .unwrap_or_default(),
        };
        let placeholder_attr = field
            .placeholder
            .as_ref()
            .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
            .unwrap_or_default();

        format!(
            r#"<input type="{}"{} id="{}" name="{}"{value_attr}{placeholder_attr}{}>"#,
            field.input_type,
            class_attr(&field.classes.control),
            field.id,
            html_escape(&field.name),
            extra_attrs(field)
        )
    }
}

/// Multi-line text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextareaWidget;

impl Widget for TextareaWidget {
    fn render(&self, field: &FieldContext) -> String {
        let content = field.value.as_deref().map(html_escape).unwrap_or_default();
        let placeholder_attr = field
            .placeholder
            .as_ref()
            .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
            .unwrap_or_default();
        let rows_attr = if field.attributes.contains_key("rows") {
            ""
        } else {
            r#" rows="4""#
        };

        format!(
            r#"<textarea{} id="{}" name="{}"{rows_attr}{placeholder_attr}{}>{content}</textarea>"#,
            class_attr(&field.classes.control),
            field.id,
            html_escape(&field.name),
            extra_attrs(field)
        )
    }
}

/// Hidden input.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenInput;

impl Widget for HiddenInput {
    fn render(&self, field: &FieldContext) -> String {
        let value_attr = field
            .value
            .as_ref()
            .map(|v| format!(r#" value="{}""#, html_escape(v)))
            .unwrap_or_default();
        format!(
            r#"<input type="hidden" id="{}" name="{}"{value_attr}{}>"#,
            field.id,
            html_escape(&field.name),
            extra_attrs(field)
        )
    }

    fn standalone(&self) -> bool {
        true
    }
}

/// Submit button labelled with the field label.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitButton;

impl Widget for SubmitButton {
    fn render(&self, field: &FieldContext) -> String {
        format!(
            r#"<button type="submit"{} id="{}" name="{}"{}>{}</button>"#,
            class_attr(&field.classes.control),
            field.id,
            html_escape(&field.name),
            extra_attrs(field),
            html_escape(&field.label)
        )
    }

    fn standalone(&self) -> bool {
        true
    }
}
