//! Controls that pick among options.

use super::{class_attr, extra_attrs, html_escape, Widget};
use crate::render::FieldContext;

/// Drop-down list with a leading blank option unless the field is required.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectWidget;

impl Widget for SelectWidget {
    fn render(&self, field: &FieldContext) -> String {
        let mut options = String::new();
        if !field.required {
            options.push_str(r#"<option value="">---------</option>"#);
        }
        for option in &field.options {
            let selected_attr = if option.selected { " selected" } else { "" };
            options.push_str(&format!(
                r#"<option value="{}"{selected_attr}>{}</option>"#,
                html_escape(&option.value),
                html_escape(&option.label)
            ));
        }

        format!(
            r#"<select{} id="{}" name="{}"{}>{options}</select>"#,
            class_attr(&field.classes.control),
            field.id,
            html_escape(&field.name),
            extra_attrs(field)
        )
    }
}

/// Single checkbox followed by its label.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxWidget;

impl Widget for CheckboxWidget {
    fn render(&self, field: &FieldContext) -> String {
        let checked_attr = if field.checked { " checked" } else { "" };
        format!(
            r#"<input type="checkbox"{} id="{id}" name="{}" value="true"{checked_attr}{}><label{} for="{id}">{}</label>"#,
            class_attr(&field.classes.control),
            html_escape(&field.name),
            extra_attrs(field),
            class_attr(&field.classes.label),
            html_escape(&field.label),
            id = field.id,
        )
    }

    fn renders_label(&self) -> bool {
        true
    }
}

/// One radio input per option, each with its own label.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadioGroup;

impl Widget for RadioGroup {
    fn render(&self, field: &FieldContext) -> String {
        let mut html = String::new();
        for (i, option) in field.options.iter().enumerate() {
            let id = format!("{}_{i}", field.id);
            let checked_attr = if option.selected { " checked" } else { "" };
            html.push_str(&format!(
                r#"<div><input type="radio"{} id="{id}" name="{}" value="{}"{checked_attr}{}><label for="{id}">{}</label></div>"#,
                class_attr(&field.classes.control),
                html_escape(&field.name),
                html_escape(&option.value),
                extra_attrs(field),
                html_escape(&option.label)
            ));
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDefinition, FieldType};
    use crate::theme::Theme;
    use serde_json::json;

    fn choices(field_type: FieldType) -> FieldDefinition {
        let mut field = FieldDefinition::new("size", "Size", field_type);
        field.options.insert("s".into(), "Small".into());
        field.options.insert("l".into(), "Large".into());
        field
    }

    #[test]
    fn test_select_marks_selected() {
        let field = choices(FieldType::Select);
        let ctx = FieldContext::build(&field, Some(&json!("l")), Vec::new(), &Theme::bootstrap5(), None, None);
        let html = SelectWidget.render(&ctx);
        assert!(html.starts_with(r#"<select class="form-select" id="id_size" name="size">"#));
        assert!(html.contains(r#"<option value="">---------</option>"#));
        assert!(html.contains(r#"<option value="s">Small</option>"#));
        assert!(html.contains(r#"<option value="l" selected>Large</option>"#));
    }

    #[test]
    fn test_required_select_has_no_blank() {
        let mut field = choices(FieldType::Select);
        field.required = true;
        let ctx = FieldContext::build(&field, None, Vec::new(), &Theme::generic(), None, None);
        assert!(!SelectWidget.render(&ctx).contains("---------"));
    }

    #[test]
    fn test_radio_group() {
        let field = choices(FieldType::Radio);
        let ctx = FieldContext::build(&field, Some(&json!("s")), Vec::new(), &Theme::generic(), None, None);
        let html = RadioGroup.render(&ctx);
        assert!(html.contains(r#"id="id_size_0" name="size" value="s" checked"#));
        assert!(html.contains(r#"<label for="id_size_1">Large</label>"#));
    }

    #[test]
    fn test_checkbox() {
        let field = FieldDefinition::new("terms", "I agree", FieldType::Checkbox);
        let ctx = FieldContext::build(&field, Some(&json!("on")), Vec::new(), &Theme::bootstrap5(), None, None);
        let html = CheckboxWidget.render(&ctx);
        assert!(html.contains(r#"class="form-check-input" id="id_terms" name="terms" value="true" checked"#));
        assert!(html.contains(r#"<label class="form-check-label" for="id_terms">I agree</label>"#));
    }
}
