//! Placeholder expressions embedded in element content
//!
//! ```text
//! body              := lookup ( "|" formatterName )?
//! lookup            := conditionalLookup | pathLookup
//! pathLookup        := pathSegment ("." pathSegment)*
//! conditionalLookup := arrayPath ";" resultProperty ";" condition
//! condition         := propPath ("=" | ":") literal
//! ```

pub mod ast;
mod grammar;
pub mod lexer;
mod resolver;

pub use ast::*;
pub use grammar::parse_placeholder;
pub use resolver::{lint_placeholders, resolve_expression};
