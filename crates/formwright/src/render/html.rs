//! The `<form>` element around rendered fields.

use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::{Div, Input, Li, Ul, H5, P};

use crate::definition::FormDefinition;
use crate::theme::Theme;

/// Wraps per-section field fragments in a `<form>`.
///
/// `fragments` holds one entry per section of `definition`, in order.
pub(crate) fn render_form(
    definition: &FormDefinition,
    theme: &Theme,
    form_errors: &[&str],
    fragments: &[Vec<String>],
) -> String {
    let action = definition.action();
    let method = definition.method();
    let verb = if method.is_native() { method.as_str() } else { "POST" };

    let mut form = html! {
        form.action(#action).method(#verb)
    }
    .attr("name", definition.name())
    .when(!theme.form_class.is_empty(), |f| f.class(&theme.form_class))
    .when(definition.has_file_field(), |f| f.attr("enctype", "multipart/form-data"));

    if !method.is_native() {
        form = form.child::<Input, _>(|i| {
            i.attr("type", "hidden")
                .attr("name", "_method")
                .attr("value", method.as_str())
        });
    }

    if !form_errors.is_empty() {
        form = form.child::<Div, _>(|d| {
            d.when(!theme.alert_class.is_empty(), |d| d.class(&theme.alert_class))
                .attr("role", "alert")
                .child::<Ul, _>(|ul| ul.children(form_errors.iter(), |e, li: Element<Li>| li.text(*e)))
        });
    }

    for (section, fields) in definition.sections().iter().zip(fragments) {
        let body: String = fields.concat();
        match &section.title {
            Some(title) => {
                form = form.child::<Div, _>(|d| {
                    d.when(!theme.section_class.is_empty(), |d| d.class(&theme.section_class))
                        .child::<H5, _>(|h| h.text(title))
                        .when(section.description.is_some(), |d| {
                            d.child::<P, _>(|p| p.text(section.description.as_deref().unwrap_or("")))
                        })
                        .raw(&body)
                });
            }
            None => form = form.raw(&body),
        }
    }

    form.render()
}
