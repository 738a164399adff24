//! Error types for the layout resolver

use thiserror::Error;

/// Errors that can occur during position resolution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// `relativeTo` names an element that does not exist
    #[error("element '{element}' is relative to undefined element '{reference}'")]
    UndefinedReference {
        element: String,
        reference: String,
        suggestions: Vec<String>,
    },

    /// Circular `relativeTo` chain
    #[error("circular relative reference: {}", cycle.join(" -> "))]
    CircularReference { cycle: Vec<String> },

    /// Two elements share an id
    #[error("duplicate element id '{id}'")]
    DuplicateId { id: String },
}

impl LayoutError {
    /// Create an undefined reference error with suggestions
    pub fn undefined(
        element: impl Into<String>,
        reference: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self::UndefinedReference {
            element: element.into(),
            reference: reference.into(),
            suggestions,
        }
    }

    /// Create a circular reference error; `cycle` ends where it starts
    pub fn circular(cycle: Vec<String>) -> Self {
        Self::CircularReference { cycle }
    }

    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UndefinedReference { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }

    /// Element ids this error is about
    pub fn element_ids(&self) -> Vec<&str> {
        match self {
            Self::UndefinedReference { element, .. } => vec![element.as_str()],
            Self::CircularReference { cycle } => {
                let mut ids: Vec<&str> = cycle.iter().map(String::as_str).collect();
                if ids.len() > 1 && ids.first() == ids.last() {
                    ids.pop();
                }
                ids
            }
            Self::DuplicateId { id } => vec![id.as_str()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_reference_display() {
        let err = LayoutError::undefined("total", "heder", vec!["header".to_string()]);
        assert!(err.to_string().contains("heder"));
        assert_eq!(err.suggestions(), Some(&["header".to_string()][..]));
    }

    #[test]
    fn test_circular_reference_display() {
        let err = LayoutError::circular(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        assert!(err.to_string().contains("a -> b -> a"));
        assert_eq!(err.element_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_self_reference_ids() {
        let err = LayoutError::circular(vec!["a".to_string(), "a".to_string()]);
        assert_eq!(err.element_ids(), vec!["a"]);
    }
}
