//! Receipt Engine - data binding and layout resolution for receipt templates
//!
//! A template is a list of positioned elements whose content embeds `{{...}}`
//! placeholders, table column definitions or small JavaScript formulas. Binding
//! it to a JSON data tree yields absolute geometry and final text for every
//! element.
//!
//! # Example
//!
//! ```rust
//! use receipt_engine::resolve_expression;
//! use serde_json::json;
//!
//! let data = json!({"venta": {"total": 1234.5}});
//! let text = resolve_expression("Total: {{venta.total|currency:usd}}", &data);
//! assert_eq!(text, "Total: $1,234.50");
//! ```

pub mod binding;
pub mod config;
pub mod error;
pub mod expression;
pub mod format;
pub mod formula;
pub mod layout;
pub mod model;
pub mod table;

pub use binding::{bind_document, BoundContent, BoundDocument, BoundElement};
pub use config::{ConfigError, EngineConfig};
pub use error::ParseError;
pub use expression::{lint_placeholders, resolve_expression};
pub use format::{format_column_value, format_value};
pub use formula::{evaluate_formula, FormulaOptions, FormulaSandbox};
pub use layout::{resolve_positions, resolve_positions_lenient, LayoutError, LayoutResolution, Point};
pub use model::Element;
pub use table::{resolve_table, ResolvedTable};

use thiserror::Error;

/// Errors that can occur during the binding pass
#[derive(Debug, Error)]
pub enum BindError {
    /// Strict layout rejected the element graph
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Parse an element document: either a JSON array of elements or an object
/// with an `elements` array.
pub fn parse_elements(json: &str) -> Result<Vec<Element>, serde_json::Error> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Document {
        Bare(Vec<Element>),
        Wrapped { elements: Vec<Element> },
    }

    Ok(match serde_json::from_str(json)? {
        Document::Bare(elements) | Document::Wrapped { elements } => elements,
    })
}
