mod common;

use formwright::{BuilderError, FieldType, FormBuilder, FormState, HttpMethod};

#[test]
fn build_succeeds_with_unique_committed_fields() {
    let mut builder = FormBuilder::create("profile");
    builder
        .add_text("first_name", "First name")
        .add()
        .unwrap()
        .add_text("last_name", "Last name")
        .add()
        .unwrap()
        .add_submit("save", "Save")
        .add()
        .unwrap();

    let form = builder.build_form().unwrap();
    assert_eq!(form.state(), FormState::Unbound);
    assert!(!form.is_submitted());
    let names: Vec<&str> = form.definition().fields().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["first_name", "last_name", "save"]);
}

#[test]
fn duplicate_name_fails_at_add() {
    let mut builder = FormBuilder::create("profile");
    builder.add_text("email", "Email").add().unwrap();
    let err = builder.add_email("email", "Email again").add().unwrap_err();
    assert!(matches!(err, BuilderError::DuplicateField(ref name) if name == "email"));
}

#[test]
fn uncommitted_field_fails_build() {
    let mut builder = FormBuilder::create("profile");
    builder.add_text("name", "Name").add().unwrap();
    let _ = builder.add_text("nickname", "Nickname").required();

    let err = builder.build_form().unwrap_err();
    assert!(matches!(err, BuilderError::UncommittedField(ref name) if name == "nickname"));
}

#[test]
fn select_without_options_fails_at_add() {
    let mut builder = FormBuilder::create("order");
    let err = builder.add_select("size", "Size").add().unwrap_err();
    assert!(matches!(err, BuilderError::MissingOptions(ref name) if name == "size"));

    let err = builder.add_radio("color", "Color").add().unwrap_err();
    assert!(matches!(err, BuilderError::MissingOptions(_)));
}

#[test]
fn select_with_options_keeps_order() {
    let mut builder = FormBuilder::create("order");
    builder
        .add_select("size", "Size")
        .options([("xl", "Extra large"), ("s", "Small"), ("m", "Medium")])
        .add()
        .unwrap();
    let definition = builder.build_definition().unwrap();

    let keys: Vec<&str> = definition
        .field("size")
        .unwrap()
        .options
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["xl", "s", "m"]);
}

#[test]
fn form_settings_carry_into_definition() {
    let mut builder = FormBuilder::create("upload");
    builder
        .set_action("/documents/7")
        .set_method(HttpMethod::Patch)
        .set_renderer("tera")
        .set_theme("bootstrap5")
        .add_file("document", "Document")
        .add()
        .unwrap()
        .add_date("due", "Due")
        .add()
        .unwrap()
        .add_time("at", "At")
        .add()
        .unwrap()
        .add_datetime("starts", "Starts")
        .add()
        .unwrap();
    let definition = builder.build_definition().unwrap();

    assert_eq!(definition.action(), "/documents/7");
    assert_eq!(definition.method(), HttpMethod::Patch);
    assert_eq!(definition.renderer(), "tera");
    assert_eq!(definition.theme(), "bootstrap5");
    assert!(definition.has_file_field());
    assert_eq!(definition.field("starts").unwrap().field_type, FieldType::DateTime);
}

#[test]
fn definition_is_shared_between_forms() {
    let mut builder = FormBuilder::create("search");
    builder.add_text("q", "Query").add().unwrap();
    let definition = builder.build_definition().unwrap();

    let a = formwright::Form::new(definition.clone());
    let b = formwright::Form::new(definition.clone());
    assert_eq!(a.definition().name(), b.definition().name());
    assert_eq!(std::sync::Arc::strong_count(&definition), 3);
}

#[test]
fn fields_before_first_section_stay_untitled() {
    let mut builder = FormBuilder::create("account");
    builder
        .add_hidden("token", "Token")
        .add()
        .unwrap()
        .add_section("Details", None)
        .add_text("name", "Name")
        .add()
        .unwrap();
    let definition = builder.build_definition().unwrap();

    assert_eq!(definition.sections().len(), 2);
    assert!(definition.sections()[0].title.is_none());
    assert_eq!(definition.sections()[0].fields[0].name, "token");
}
