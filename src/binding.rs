//! The binding pass
//!
//! Runs every element of a document through the resolvers and returns one
//! snapshot of geometry and content. Preview and export both go through
//! [`bind_document`].

use serde::Serialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::expression::{lint_placeholders, resolve_expression};
use crate::formula::FormulaJob;
use crate::layout::{resolve_positions, resolve_positions_lenient, LayoutResolution, Point};
use crate::model::{Element, ElementKind, ObjectFit};
use crate::table::{resolve_table, ResolvedTable};
use crate::BindError;

/// Resolved content of one element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoundContent {
    Text {
        text: String,
    },
    /// Payload to encode; symbol rendering is left to the caller
    Qr {
        value: String,
    },
    Table(ResolvedTable),
    Image {
        src: String,
        #[serde(rename = "objectFit")]
        object_fit: ObjectFit,
    },
    Formula {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundElement {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub content: BoundContent,
}

/// A document ready to render
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundDocument {
    /// In input order
    pub elements: Vec<BoundElement>,
    /// Layout fallbacks and malformed placeholders
    pub warnings: Vec<String>,
}

impl BoundDocument {
    pub fn get(&self, id: &str) -> Option<&BoundElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}

/// Bind `elements` to `data`.
///
/// Layout problems are fatal only when `config.layout.strict` is set; otherwise
/// they degrade to authored positions and are listed in `warnings`. Formula
/// elements are evaluated in parallel.
pub fn bind_document(
    elements: &[Element],
    data: &Value,
    config: &EngineConfig,
) -> Result<BoundDocument, BindError> {
    let layout = if config.layout.strict {
        LayoutResolution {
            positions: resolve_positions(elements)?,
            errors: Vec::new(),
        }
    } else {
        resolve_positions_lenient(elements)
    };

    let mut warnings: Vec<String> = layout.errors.iter().map(ToString::to_string).collect();

    let formulas = evaluate_formulas(elements, data, config);
    let mut formulas = formulas.into_iter();

    let mut bound = Vec::with_capacity(elements.len());
    for element in elements {
        let origin = layout
            .positions
            .get(&element.id)
            .copied()
            .unwrap_or(Point::new(element.x, element.y));

        let content = match element.kind {
            ElementKind::Text => BoundContent::Text {
                text: bind_text(element, data, &mut warnings),
            },
            ElementKind::Qr => BoundContent::Qr {
                value: bind_text(element, data, &mut warnings),
            },
            ElementKind::Table => BoundContent::Table(
                element
                    .table_config()
                    .map(|table| resolve_table(&table, data))
                    .unwrap_or_default(),
            ),
            ElementKind::Image => {
                let image = element.image_config().unwrap_or_default();
                let src = image.src.unwrap_or_else(|| element.content.clone());
                BoundContent::Image {
                    src: resolve_expression(&src, data),
                    object_fit: image.object_fit,
                }
            }
            ElementKind::Formula => BoundContent::Formula {
                text: formulas.next().unwrap_or_default(),
            },
        };

        bound.push(BoundElement {
            id: element.id.clone(),
            x: origin.x,
            y: origin.y,
            width: element.width,
            height: element.height,
            content,
        });
    }

    tracing::debug!(
        elements = bound.len(),
        warnings = warnings.len(),
        "bound document"
    );

    Ok(BoundDocument {
        elements: bound,
        warnings,
    })
}

fn bind_text(element: &Element, data: &Value, warnings: &mut Vec<String>) -> String {
    for error in lint_placeholders(&element.content) {
        warnings.push(format!("element '{}': {error}", element.id));
    }
    resolve_expression(&element.content, data)
}

/// Results for every formula element, in input order
fn evaluate_formulas(elements: &[Element], data: &Value, config: &EngineConfig) -> Vec<String> {
    let fallback = config.formula_timeout();
    let configs: Vec<_> = elements
        .iter()
        .filter(|e| e.kind == ElementKind::Formula)
        .map(|e| e.formula_config().unwrap_or_default())
        .collect();

    if configs.is_empty() {
        return Vec::new();
    }

    let jobs: Vec<FormulaJob> = configs
        .iter()
        .map(|formula| FormulaJob {
            code: &formula.code,
            data,
            options: formula.options(fallback),
        })
        .collect();

    config.sandbox().evaluate_all(&jobs)
}
