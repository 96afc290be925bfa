//! JSON and XML descriptions of a form.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{json, Value};

use super::FieldContext;
use crate::definition::FormDefinition;
use crate::error::RenderError;
use crate::violation::ViolationTree;

fn form_header(definition: &FormDefinition) -> Value {
    let sections: Vec<Value> = definition
        .sections()
        .iter()
        .map(|s| {
            json!({
                "title": s.title,
                "description": s.description,
                "fields": s.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "name": definition.name(),
        "action": definition.action(),
        "method": definition.method(),
        "multipart": definition.has_file_field(),
        "renderer": definition.renderer(),
        "theme": definition.theme(),
        "sections": sections,
    })
}

/// `{ "form": {...}, "fields": [...], "errors": {...} }`
pub(crate) fn to_json(
    definition: &FormDefinition,
    sections: &[Vec<FieldContext>],
    violations: Option<&ViolationTree>,
) -> Result<String, RenderError> {
    let fields: Vec<&FieldContext> = sections.iter().flatten().collect();
    let document = json!({
        "form": form_header(definition),
        "fields": fields,
        "errors": violations.map(ViolationTree::to_flat).unwrap_or_default(),
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

fn xml_error(e: quick_xml::Error) -> RenderError {
    RenderError::Xml(e.to_string())
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), RenderError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}

fn write_field(writer: &mut Writer<Vec<u8>>, field: &FieldContext) -> Result<(), RenderError> {
    let mut start = BytesStart::new("field");
    start.push_attribute(("name", field.name.as_str()));
    start.push_attribute(("type", field.field_type.as_str()));
    start.push_attribute(("id", field.id.as_str()));
    start.push_attribute(("required", if field.required { "true" } else { "false" }));
    if field.disabled {
        start.push_attribute(("disabled", "true"));
    }
    if let Some(section) = &field.section {
        start.push_attribute(("section", section.as_str()));
    }
    writer.write_event(Event::Start(start)).map_err(xml_error)?;

    text_element(writer, "label", &field.label)?;
    if let Some(value) = &field.value {
        text_element(writer, "value", value)?;
    }
    if let Some(placeholder) = &field.placeholder {
        text_element(writer, "placeholder", placeholder)?;
    }
    if let Some(help) = &field.help_text {
        text_element(writer, "help", help)?;
    }
    for (key, value) in &field.attributes {
        let mut attr = BytesStart::new("attribute");
        attr.push_attribute(("name", key.as_str()));
        attr.push_attribute(("value", value.as_str()));
        writer.write_event(Event::Empty(attr)).map_err(xml_error)?;
    }
    for option in &field.options {
        let mut start = BytesStart::new("option");
        start.push_attribute(("value", option.value.as_str()));
        if option.selected {
            start.push_attribute(("selected", "true"));
        }
        writer.write_event(Event::Start(start)).map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::new(&option.label)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("option")))
            .map_err(xml_error)?;
    }
    for error in &field.errors {
        text_element(writer, "error", error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("field")))
        .map_err(xml_error)
}

/// `<form ...><fields>...</fields><errors>...</errors></form>`
pub(crate) fn to_xml(
    definition: &FormDefinition,
    sections: &[Vec<FieldContext>],
    violations: Option<&ViolationTree>,
) -> Result<String, RenderError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut form = BytesStart::new("form");
    form.push_attribute(("name", definition.name()));
    form.push_attribute(("action", definition.action()));
    form.push_attribute(("method", definition.method().as_str()));
    if definition.has_file_field() {
        form.push_attribute(("enctype", "multipart/form-data"));
    }
    writer.write_event(Event::Start(form)).map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("fields")))
        .map_err(xml_error)?;
    for field in sections.iter().flatten() {
        write_field(&mut writer, field)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("fields")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("errors")))
        .map_err(xml_error)?;
    for (path, list) in violations.into_iter().flat_map(|tree| tree.iter()) {
        for violation in list {
            let mut start = BytesStart::new("error");
            start.push_attribute(("path", path));
            start.push_attribute(("kind", violation.kind.as_str()));
            writer.write_event(Event::Start(start)).map_err(xml_error)?;
            writer
                .write_event(Event::Text(BytesText::new(&violation.message)))
                .map_err(xml_error)?;
            writer
                .write_event(Event::End(BytesEnd::new("error")))
                .map_err(xml_error)?;
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new("errors")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("form")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner()).map_err(|e| RenderError::Xml(e.to_string()))
}
