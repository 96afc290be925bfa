//! HTML widgets used by the built-in renderer.
//!
//! A widget draws the control of one field from its [`FieldContext`];
//! [`render_field`] adds the label, error messages and help text around it.

mod choice;
mod input;

pub use choice::{CheckboxWidget, RadioGroup, SelectWidget};
pub use input::{HiddenInput, InputWidget, SubmitButton, TextareaWidget};

use indexmap::IndexMap;
use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::Div;

use crate::field::FieldType;
use crate::render::FieldContext;

/// Draws the control of a field.
pub trait Widget: Send + Sync {
    /// Renders the control element(s) as HTML.
    fn render(&self, field: &FieldContext) -> String;

    /// Whether the widget draws its own label.
    fn renders_label(&self) -> bool {
        false
    }

    /// Whether the widget is emitted without wrapper, label or messages.
    fn standalone(&self) -> bool {
        false
    }
}

/// Widget for a built-in field type. `None` for custom types.
pub fn builtin(field_type: &FieldType) -> Option<&'static dyn Widget> {
    let widget: &'static dyn Widget = match field_type {
        FieldType::Textarea => &TextareaWidget,
        FieldType::Select => &SelectWidget,
        FieldType::Checkbox => &CheckboxWidget,
        FieldType::Radio => &RadioGroup,
        FieldType::Hidden => &HiddenInput,
        FieldType::Submit => &SubmitButton,
        FieldType::Custom(_) => return None,
        _ => &InputWidget,
    };
    Some(widget)
}

/// Renders a field with its wrapper, label, errors and help text.
pub fn render_field(widget: &dyn Widget, field: &FieldContext) -> String {
    let control = widget.render(field);
    if widget.standalone() {
        return control;
    }

    let id = field.id.as_str();
    let label_text = field.label.as_str();
    let classes = &field.classes;
    let show_label = !widget.renders_label() && !label_text.is_empty();

    let label_el = html! {
        label.for_(#id) { #label_text }
    }
    .when(!classes.label.is_empty(), |l| l.class(&classes.label));

    html! { div }
        .when(!classes.wrapper.is_empty(), |d| d.class(&classes.wrapper))
        .when(show_label, |d| d.raw(label_el.render()))
        .raw(&control)
        .children(field.errors.iter(), |error, div: Element<Div>| {
            div.when(!classes.error.is_empty(), |d| d.class(&classes.error))
                .text(error.as_str())
        })
        .when(field.help_text.is_some(), |d| {
            d.child::<Div, _>(|h| {
                h.when(!classes.help.is_empty(), |h| h.class(&classes.help))
                    .text(field.help_text.as_deref().unwrap_or(""))
            })
        })
        .render()
}

/// ` class="..."`, or nothing for an empty class list.
pub fn class_attr(class: &str) -> String {
    if class.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, html_escape(class))
    }
}

/// User attributes followed by the `required` and `disabled` flags.
pub fn extra_attrs(field: &FieldContext) -> String {
    let mut html = attrs_html(&field.attributes);
    if field.required {
        html.push_str(" required");
    }
    if field.disabled {
        html.push_str(" disabled");
    }
    html
}

/// Renders attributes as ` key="value"` pairs in insertion order.
pub fn attrs_html(attrs: &IndexMap<String, String>) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(r#" {k}="{}""#, html_escape(v)))
        .collect()
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
