//! Command implementations.
//!
//! Each command returns the text to print so it can be tested without a
//! terminal.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use formwright::{
    load_catalog, Catalog, ConstraintEngine, Form, FormBuilder, FormData, FormSchema, OutputFormat, Renderer, Theme,
};
use formwright_sqlx::OptionStore;
use formwright_tera::TeraAdapter;
use serde_json::json;
use tracing::{debug, info};

/// Renderer name under which the template directory is registered.
pub const TERA_ADAPTER: &str = "tera";

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Form schema (YAML or JSON).
    pub schema: PathBuf,

    /// Submitted data (YAML or JSON). The form is validated before rendering.
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Output format: html, json or xml.
    #[arg(short, long, default_value = "html")]
    pub format: OutputFormat,

    /// Template directory for forms using the `tera` renderer.
    #[arg(short, long, env = "FORMWRIGHT_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Translation catalog (YAML or JSON).
    #[arg(long, env = "FORMWRIGHT_TRANSLATIONS")]
    pub translations: Option<PathBuf>,

    /// Extra theme files. Can be repeated.
    #[arg(long = "theme")]
    pub themes: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Form schema (YAML or JSON).
    pub schema: PathBuf,

    /// Submitted data (YAML or JSON).
    #[arg(short, long)]
    pub data: PathBuf,

    /// Validation group. Can be repeated; defaults to `Default`.
    #[arg(short, long = "group")]
    pub groups: Vec<String>,

    /// Report errors as a nested object instead of a flat path map.
    #[arg(long)]
    pub deep: bool,

    /// Translation catalog (YAML or JSON).
    #[arg(long, env = "FORMWRIGHT_TRANSLATIONS")]
    pub translations: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ScaffoldArgs {
    /// Table to describe.
    pub table: String,

    /// Database URL.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    pub database: String,

    /// Print JSON instead of YAML.
    #[arg(long)]
    pub json: bool,
}

/// Result of `validate`.
#[derive(Debug)]
pub struct Validation {
    pub valid: bool,
    pub report: String,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Reads submitted data from a YAML or JSON file.
pub fn read_data(path: &Path) -> Result<FormData> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;
    let data = if is_yaml(path) {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    Ok(data)
}

fn read_catalog(path: Option<&Path>) -> Result<Option<Arc<Catalog>>> {
    path.map(|p| {
        load_catalog(p)
            .map(Arc::new)
            .with_context(|| format!("Failed to load translations {}", p.display()))
    })
    .transpose()
}

/// Builds an unbound form from a schema file.
pub fn load_form(schema: &Path, catalog: Option<Arc<Catalog>>) -> Result<Form> {
    let schema = FormSchema::from_path(schema)
        .with_context(|| format!("Failed to load schema {}", schema.display()))?;

    let mut engine = ConstraintEngine::new();
    if let Some(catalog) = catalog {
        engine = engine.with_catalog(catalog);
    }

    let mut builder = FormBuilder::from_schema(&schema)?;
    builder.set_engine(Arc::new(engine));
    let form = builder.build_form()?;
    debug!(form = %schema.name, "Loaded form schema");
    Ok(form)
}

/// Renders a schema, optionally bound to submitted data.
pub fn render(args: &RenderArgs) -> Result<String> {
    let catalog = read_catalog(args.translations.as_deref())?;
    let mut form = load_form(&args.schema, catalog.clone())?;

    if let Some(path) = &args.data {
        form.submit(read_data(path)?);
        let valid = form.is_valid()?;
        info!(valid, "Validated submitted data");
    }

    let mut renderer = Renderer::new().with_format(args.format);
    if let Some(dir) = &args.templates {
        renderer = renderer.with_adapter(TERA_ADAPTER, Arc::new(TeraAdapter::new(dir)));
    }
    for path in &args.themes {
        renderer = renderer.with_theme(Theme::from_path(path)?);
    }
    if let Some(catalog) = catalog {
        renderer = renderer.with_catalog(catalog);
    }

    let output = renderer.render(&form)?;
    if !output.warnings.is_empty() {
        info!(count = output.warnings.len(), "Rendered with warnings");
    }
    Ok(output.body)
}

/// Validates submitted data against a schema.
pub fn validate(args: &ValidateArgs) -> Result<Validation> {
    let catalog = read_catalog(args.translations.as_deref())?;
    let mut form = load_form(&args.schema, catalog)?;
    form.submit(read_data(&args.data)?);
    if !args.groups.is_empty() {
        form.set_validation_groups(args.groups.iter().cloned());
    }

    let valid = form.is_valid()?;
    let violations = form.violations()?;
    let errors = if args.deep {
        violations.to_deep()
    } else {
        serde_json::to_value(violations.to_flat())?
    };
    let document = if valid {
        json!({ "valid": true, "data": form.validated_data() })
    } else {
        json!({ "valid": false, "errors": errors })
    };

    Ok(Validation {
        valid,
        report: serde_json::to_string_pretty(&document)?,
    })
}

/// Describes a database table as a form schema.
pub async fn scaffold(args: &ScaffoldArgs) -> Result<String> {
    let store = OptionStore::connect(&args.database).await?;
    let schema = store.scaffold(&args.table).await?;
    info!(table = %args.table, fields = schema.fields.len(), "Scaffolded form schema");

    let text = if args.json {
        serde_json::to_string_pretty(&schema)?
    } else {
        serde_yaml::to_string(&schema)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONTACT: &str = "\
name: contact
action: /contact
fields:
  - name: name
    required: true
  - name: email
    type: email
    required: true
  - name: age
    type: number
    constraints:
      - kind: min
        value: 18
        groups: [adult]
";

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn render_args(schema: PathBuf) -> RenderArgs {
        RenderArgs {
            schema,
            data: None,
            format: OutputFormat::Html,
            templates: None,
            translations: None,
            themes: Vec::new(),
        }
    }

    fn validate_args(schema: PathBuf, data: PathBuf) -> ValidateArgs {
        ValidateArgs {
            schema,
            data,
            groups: Vec::new(),
            deep: false,
            translations: None,
        }
    }

    #[test]
    fn test_render_unbound_html() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "contact.yaml", CONTACT);

        let html = render(&render_args(schema)).unwrap();
        assert!(html.contains("action=\"/contact\""));
        assert!(html.contains("name=\"email\""));
        assert!(!html.contains("form-error"));
    }

    #[test]
    fn test_render_with_data_shows_errors() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "contact.yaml", CONTACT);
        let data = write(&dir, "data.json", r#"{"name": "Ann", "email": "bad"}"#);

        let mut args = render_args(schema);
        args.data = Some(data);
        args.format = OutputFormat::Json;
        let body = render(&args).unwrap();

        let document: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(document["errors"].get("email").is_some());
        assert!(document["errors"].get("name").is_none());
    }

    #[test]
    fn test_render_with_templates() {
        let dir = TempDir::new().unwrap();
        let schema = write(
            &dir,
            "form.yaml",
            "name: login\nrenderer: tera\nfields:\n  - name: username\n",
        );
        let templates = dir.path().join("templates");
        fs::create_dir_all(templates.join("Generic")).unwrap();
        fs::write(
            templates.join("Generic/text.tpl"),
            "<input data-field=\"{{ name }}\">",
        )
        .unwrap();

        let mut args = render_args(schema);
        args.templates = Some(templates);
        let html = render(&args).unwrap();
        assert!(html.contains("data-field=\"username\""));
    }

    #[test]
    fn test_render_unknown_adapter() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "form.yaml", "name: login\nrenderer: tera\nfields:\n  - name: username\n");
        assert!(render(&render_args(schema)).is_err());
    }

    #[test]
    fn test_validate_invalid() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "contact.yaml", CONTACT);
        let data = write(&dir, "data.yaml", "name: Ann\nemail: bad\n");

        let outcome = validate(&validate_args(schema, data)).unwrap();
        assert!(!outcome.valid);
        let report: serde_json::Value = serde_json::from_str(&outcome.report).unwrap();
        assert_eq!(report["valid"], false);
        assert!(report["errors"]["email"].is_array());
    }

    #[test]
    fn test_validate_valid_reports_clean_data() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "contact.yaml", CONTACT);
        let data = write(
            &dir,
            "data.json",
            r#"{"name": "Ann", "email": "ann@example.com", "extra": 1}"#,
        );

        let outcome = validate(&validate_args(schema, data)).unwrap();
        assert!(outcome.valid);
        let report: serde_json::Value = serde_json::from_str(&outcome.report).unwrap();
        assert_eq!(report["data"]["name"], "Ann");
        assert!(report["data"].get("extra").is_none());
    }

    #[test]
    fn test_validate_groups() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "contact.yaml", CONTACT);
        let data = write(
            &dir,
            "data.json",
            r#"{"name": "Ann", "email": "ann@example.com", "age": 12}"#,
        );

        assert!(validate(&validate_args(schema.clone(), data.clone())).unwrap().valid);

        let mut args = validate_args(schema, data);
        args.groups = vec!["adult".to_string()];
        assert!(!validate(&args).unwrap().valid);
    }

    #[test]
    fn test_missing_schema() {
        let dir = TempDir::new().unwrap();
        let err = load_form(&dir.path().join("nope.yaml"), None).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }
}
