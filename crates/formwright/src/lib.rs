//! # formwright
//!
//! Form building, constraint validation and themed rendering.
//!
//! This crate provides:
//! - A fluent [`FormBuilder`] and a declarative [`FormSchema`]
//! - A [`ConstraintEngine`] producing path-keyed [`ViolationTree`]s
//! - A [`Form`] runtime binding a shared [`FormDefinition`] to request data
//! - A [`Renderer`] emitting HTML through widgets or a [`TemplateAdapter`],
//!   or JSON and XML descriptions
//! - [`Theme`]s and translation [`Catalog`]s
//!
//! ## Quick Start
//!
//! ```rust
//! use formwright::{FormBuilder, FormData, Renderer};
//! use serde_json::json;
//!
//! let mut builder = FormBuilder::create("contact");
//! builder
//!     .set_action("/contact")
//!     .add_text("name", "Name").required().add()?
//!     .add_email("email", "Email").required().add()?
//!     .add_submit("send", "Send").add()?;
//! let mut form = builder.build_form()?;
//!
//! let data: FormData = serde_json::from_value(json!({"name": "Ann", "email": "bad"})).unwrap();
//! form.submit(data);
//! assert!(!form.is_valid()?);
//! assert!(form.violations()?.contains("email"));
//! assert!(!form.violations()?.contains("name"));
//!
//! let html = Renderer::new().render(&form)?.body;
//! assert!(html.contains("Enter a valid email address."));
//! # Ok::<(), formwright::FormError>(())
//! ```
//!
//! ## Cross-field rules
//!
//! ```rust
//! use formwright::{Constraint, FormBuilder, FormData};
//! use serde_json::json;
//!
//! let mut builder = FormBuilder::create("register");
//! builder
//!     .add_password("password", "Password").required().add()?
//!     .add_password("password_confirm", "Confirm").add()?
//!     .add_constraint(Constraint::callback(|data, ctx| {
//!         if data.get("password") != data.get("password_confirm") {
//!             ctx.add_violation("password_confirm", "Passwords do not match");
//!         }
//!     }));
//! let mut form = builder.build_form()?;
//!
//! let data: FormData = serde_json::from_value(json!({
//!     "password": "secret",
//!     "password_confirm": "secrte",
//! })).unwrap();
//! form.submit(data);
//! assert_eq!(form.violations()?.messages("password_confirm"), vec!["Passwords do not match"]);
//! # Ok::<(), formwright::FormError>(())
//! ```

mod builder;
mod constraint;
pub mod data;
mod definition;
mod engine;
mod error;
mod field;
mod form;
pub mod render;
mod schema;
pub mod theme;
pub mod translation;
mod violation;
pub mod widgets;

pub use builder::{FieldBuilder, FormBuilder};
pub use constraint::{Callback, Constraint, ConstraintKind, ViolationKind, DEFAULT_GROUP};
pub use data::FormData;
pub use definition::{FormDefinition, HttpMethod, Section, BUILTIN_RENDERER};
pub use engine::ConstraintEngine;
pub use error::{BuilderError, ConfigurationError, FormError, RenderError, Result, TranslationError};
pub use field::{humanize, FieldDefinition, FieldType};
pub use form::{Form, FormState};
pub use render::{FieldContext, OutputFormat, RenderOutput, RenderWarning, Renderer, TemplateAdapter};
pub use schema::{ConstraintSchema, FieldSchema, FormSchema, SectionSchema};
pub use theme::Theme;
pub use translation::{load_catalog, Catalog, JsonLoader, TranslationLoader, YamlLoader};
pub use violation::{ExecutionContext, Violation, ViolationTree, FORM_PATH};
pub use widgets::Widget;
