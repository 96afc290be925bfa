mod common;

use std::sync::Arc;

use common::{contact_form, data, registration_form};
use formwright::{
    BuilderError, Catalog, ConfigurationError, Constraint, ConstraintEngine, Form, FormBuilder,
    FormState, ViolationKind,
};
use serde_json::json;

#[test]
fn required_field_reports_exactly_one_violation() {
    for input in [json!({}), json!({"name": ""}), json!({"name": "   "}), json!({"name": null})] {
        let mut form = contact_form();
        form.submit(data(input.clone()));
        let tree = form.violations().unwrap();
        let name = tree.get("name").unwrap_or_else(|| panic!("no violation for {input}"));
        assert_eq!(name.len(), 1);
        assert_eq!(name[0].kind, ViolationKind::Required);
        assert_eq!(name[0].message, "This field is required.");
    }

    let mut form = contact_form();
    form.submit(data(json!({"name": "Ann", "email": "ann@example.com"})));
    assert!(form.is_valid().unwrap());
    assert!(form.violations().unwrap().is_empty());
}

#[test]
fn invalid_email_only_flags_email() {
    let mut form = contact_form();
    form.submit(data(json!({"name": "Ann", "email": "bad"})));

    assert!(!form.is_valid().unwrap());
    let tree = form.violations().unwrap();
    assert_eq!(tree.paths().collect::<Vec<_>>(), vec!["email"]);
    assert_eq!(tree.get("email").unwrap()[0].kind, ViolationKind::Email);
}

#[test]
fn is_valid_is_idempotent_until_data_changes() {
    let mut form = contact_form();
    form.submit(data(json!({"name": "", "email": "ann@example.com"})));

    let first = form.is_valid().unwrap();
    let tree = form.violations().unwrap().clone();
    assert_eq!(form.state(), FormState::Validated);
    assert_eq!(form.is_valid().unwrap(), first);
    assert_eq!(form.violations().unwrap(), &tree);

    form.submit(data(json!({"name": "Ann"})));
    assert_eq!(form.state(), FormState::Bound);
    assert!(form.is_valid().unwrap());
}

#[test]
fn unbound_form_is_never_valid() {
    let mut form = contact_form();
    assert!(!form.is_valid().unwrap());
    assert!(form.violations().unwrap().is_empty());
    assert_eq!(form.state(), FormState::Unbound);
}

#[test]
fn password_confirmation_callback() {
    let mut form = registration_form();
    form.submit(data(json!({"password": "s3cret", "password_confirm": "s3cert"})));
    let tree = form.violations().unwrap();
    assert_eq!(tree.messages("password_confirm"), vec!["Passwords do not match"]);
    assert_eq!(tree.get("password_confirm").unwrap()[0].kind, ViolationKind::Callback);
    assert!(!tree.contains("password"));

    let mut form = registration_form();
    form.submit(data(json!({"password": "s3cret", "password_confirm": "s3cret"})));
    assert!(form.is_valid().unwrap());
}

#[test]
fn edit_mode_binds_without_submitting() {
    let mut builder = FormBuilder::create("profile");
    builder.add_text("name", "Name").required().add().unwrap();
    let definition = builder.build_definition().unwrap();

    let mut form = Form::with_data(definition, data(json!({"name": "Ann", "extra": 1})));
    assert!(!form.is_submitted());
    assert_eq!(form.state(), FormState::Bound);
    assert!(form.is_valid().unwrap());

    let clean = form.validated_data().unwrap();
    assert_eq!(clean.len(), 1);
    assert_eq!(clean["name"], json!("Ann"));
}

#[test]
fn submit_merges_over_existing_data() {
    let mut builder = FormBuilder::create("profile");
    builder
        .add_text("name", "Name")
        .required()
        .add()
        .unwrap()
        .add_text("city", "City")
        .required()
        .add()
        .unwrap();
    let definition = builder.build_definition().unwrap();

    let mut form = Form::with_data(definition, data(json!({"name": "Ann", "city": "Ghent"})));
    form.submit(data(json!({"city": "Bruges"})));
    assert!(form.is_submitted());
    assert_eq!(form.value("name"), Some(&json!("Ann")));
    assert_eq!(form.value("city"), Some(&json!("Bruges")));
    assert!(form.is_valid().unwrap());
}

#[test]
fn validation_groups_select_constraints() {
    let mut builder = FormBuilder::create("article");
    builder
        .add_text("title", "Title")
        .required()
        .in_groups(["Publish"])
        .min_length(10)
        .add()
        .unwrap();
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({"title": "Draft"})));

    assert!(form.is_valid().unwrap());

    form.set_validation_groups(["Default", "Publish"]);
    assert_eq!(form.state(), FormState::Bound);
    assert!(!form.is_valid().unwrap());
    let tree = form.violations().unwrap();
    assert_eq!(tree.get("title").unwrap()[0].kind, ViolationKind::MinLength);
    assert_eq!(
        tree.messages("title"),
        vec!["Ensure this value has at least 10 characters."]
    );
}

#[test]
fn constraints_run_without_short_circuit() {
    let mut builder = FormBuilder::create("signup");
    builder
        .add_text("code", "Code")
        .min_length(5)
        .pattern("^[0-9]+$")
        .add()
        .unwrap();
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({"code": "ab"})));

    let kinds: Vec<ViolationKind> = form
        .violations()
        .unwrap()
        .get("code")
        .unwrap()
        .iter()
        .map(|v| v.kind)
        .collect();
    assert_eq!(kinds, vec![ViolationKind::MinLength, ViolationKind::Pattern]);
}

#[test]
fn number_fields_report_type_and_range() {
    let mut builder = FormBuilder::create("order");
    builder
        .add_number("qty", "Quantity")
        .min(1.0)
        .max(5.0)
        .add()
        .unwrap()
        .add_number("discount", "Discount")
        .add()
        .unwrap();
    let mut form = builder.build_form().unwrap();

    form.submit(data(json!({"qty": "9", "discount": "ten"})));
    let tree = form.violations().unwrap();
    assert_eq!(tree.messages("qty"), vec!["Ensure this value is between 1 and 5."]);
    assert_eq!(tree.get("discount").unwrap()[0].kind, ViolationKind::Type);

    form.submit(data(json!({"qty": 3, "discount": ""})));
    assert!(form.is_valid().unwrap());
}

#[test]
fn custom_messages_are_interpolated() {
    let mut builder = FormBuilder::create("f");
    builder
        .add_text("nick", "Nickname")
        .max_length(3)
        .message("{{ label }} '{{ value }}' exceeds {{ limit }}")
        .add()
        .unwrap();
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({"nick": "abcdef"})));

    assert_eq!(
        form.violations().unwrap().messages("nick"),
        vec!["Nickname 'abcdef' exceeds 3"]
    );
}

#[test]
fn catalog_messages_and_labels() {
    let catalog = Catalog::new()
        .with("form.error.required", "{{ label }} is mandatory.")
        .with("form.label.name", "Naam");
    let engine = Arc::new(ConstraintEngine::new().with_catalog(Arc::new(catalog)));

    let mut builder = FormBuilder::create("contact");
    builder.set_engine(engine).add_text("name", "Name").required().add().unwrap();
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({})));

    assert_eq!(form.violations().unwrap().messages("name"), vec!["Naam is mandatory."]);
}

#[test]
fn named_callbacks_resolve_through_engine() {
    let engine = ConstraintEngine::new().register("not_admin", |data, ctx| {
        if data.get("user").and_then(|v| v.as_str()) == Some("admin") {
            ctx.add_field_violation("This username is reserved.");
        }
    });
    let engine = Arc::new(engine);

    let mut builder = FormBuilder::create("signup");
    builder
        .set_engine(Arc::clone(&engine))
        .add_text("user", "User")
        .constraint(Constraint::named("not_admin"))
        .add()
        .unwrap();
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({"user": "admin"})));
    assert_eq!(form.violations().unwrap().messages("user"), vec!["This username is reserved."]);

    let mut builder = FormBuilder::create("signup");
    builder.add_constraint(Constraint::named("missing"));
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({})));
    assert_eq!(
        form.is_valid().unwrap_err(),
        ConfigurationError::UnknownConstraint("missing".into())
    );
}

#[test]
fn form_level_violations_and_deep_paths() {
    let mut builder = FormBuilder::create("trip");
    builder
        .add_date("dates.start", "Start")
        .required()
        .add()
        .unwrap()
        .add_date("dates.end", "End")
        .add()
        .unwrap()
        .add_constraint(Constraint::callback(|data, ctx| {
            let start = formwright::data::lookup(data, "dates.start").and_then(|v| v.as_str());
            let end = formwright::data::lookup(data, "dates.end").and_then(|v| v.as_str());
            if let (Some(start), Some(end)) = (start, end) {
                if end < start {
                    ctx.add_form_violation("The trip ends before it starts.");
                    ctx.add_violation("dates.end", "Must be after the start date.");
                }
            }
        }));
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({"dates": {"start": "2024-05-10", "end": "2024-05-01"}})));

    let tree = form.violations().unwrap();
    assert_eq!(tree.form_messages(), vec!["The trip ends before it starts."]);
    assert_eq!(
        tree.to_deep(),
        json!({
            "__all__": ["The trip ends before it starts."],
            "dates": {"end": ["Must be after the start date."]}
        })
    );
}

fn kinds(form: &mut Form, path: &str) -> Vec<ViolationKind> {
    form.violations()
        .unwrap()
        .get(path)
        .map(|violations| violations.iter().map(|v| v.kind).collect())
        .unwrap_or_default()
}

#[test]
fn empty_required_email_reports_required_and_email() {
    let mut builder = FormBuilder::create("signup");
    builder.add_email("email", "Email").required().add().unwrap();
    let mut form = builder.build_form().unwrap();

    form.submit(data(json!({"email": ""})));
    assert_eq!(kinds(&mut form, "email"), vec![ViolationKind::Required, ViolationKind::Email]);

    let mut builder = FormBuilder::create("signup");
    builder.add_email("email", "Email").add().unwrap();
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({"email": ""})));
    assert!(form.is_valid().unwrap());
}

#[test]
fn whitespace_does_not_bypass_length_or_format() {
    let mut builder = FormBuilder::create("profile");
    builder
        .add_text("code", "Code")
        .max_length(2)
        .add()
        .unwrap()
        .add_text("slug", "Slug")
        .pattern(r"^\S+$")
        .add()
        .unwrap()
        .add_text("contact", "Contact")
        .email()
        .add()
        .unwrap();
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({"code": "      ", "slug": "   ", "contact": "  "})));

    assert_eq!(kinds(&mut form, "code"), vec![ViolationKind::MaxLength]);
    assert_eq!(kinds(&mut form, "slug"), vec![ViolationKind::Pattern]);
    assert_eq!(kinds(&mut form, "contact"), vec![ViolationKind::Email]);
}

#[test]
fn form_level_value_constraint_is_rejected() {
    let mut builder = FormBuilder::create("contact");
    builder
        .add_text("name", "Name")
        .add()
        .unwrap()
        .add_constraint(Constraint::required());

    let err = builder.build_form().unwrap_err();
    assert!(matches!(
        err,
        BuilderError::Configuration(ConfigurationError::FormLevelConstraint(ref kind)) if kind == "required"
    ));
}

#[test]
fn false_is_blank_only_for_checkboxes() {
    let mut builder = FormBuilder::create("terms");
    builder
        .add_checkbox("accept", "Accept")
        .required()
        .add()
        .unwrap()
        .add_hidden("flag", "Flag")
        .required()
        .add()
        .unwrap();
    let mut form = builder.build_form().unwrap();
    form.submit(data(json!({"accept": false, "flag": false})));

    let tree = form.violations().unwrap();
    assert_eq!(tree.paths().collect::<Vec<_>>(), vec!["accept"]);
    assert_eq!(tree.get("accept").unwrap()[0].kind, ViolationKind::Required);

    form.submit(data(json!({"accept": true, "flag": false})));
    assert!(form.is_valid().unwrap());
}
