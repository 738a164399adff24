//! Designer elements as they arrive from the editing surface

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use super::config::{FormulaConfig, ImageConfig, TableConfig};

/// The kind of content an element carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Table,
    Qr,
    Image,
    Formula,
}

/// Predefined anchor names relative to a reference element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelativePosition {
    Above,
    Below,
    Left,
    Right,
    Center,
    #[serde(alias = "topLeft", alias = "top_left")]
    TopLeft,
    #[serde(alias = "topRight", alias = "top_right")]
    TopRight,
    #[serde(alias = "bottomLeft", alias = "bottom_left")]
    BottomLeft,
    #[serde(alias = "bottomRight", alias = "bottom_right")]
    BottomRight,
}

/// Custom vertical anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// Custom horizontal anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

/// Pixel nudge applied after anchor placement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A positioned, typed unit of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub relative_to: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub relative_position: Option<RelativePosition>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub relative_vertical: Option<VerticalAnchor>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub relative_horizontal: Option<HorizontalAnchor>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relative_offset: Offset,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl Element {
    /// Create an element at an absolute position with no content
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            content: String::new(),
            relative_to: None,
            relative_position: None,
            relative_vertical: None,
            relative_horizontal: None,
            relative_offset: Offset::default(),
            config: serde_json::Value::Null,
        }
    }

    /// Set the authored geometry
    pub fn with_bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    /// Set the content string
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Position this element relative to another one
    pub fn relative_to(mut self, reference: impl Into<String>) -> Self {
        self.relative_to = Some(reference.into());
        self
    }

    /// Use a predefined anchor
    pub fn with_position(mut self, position: RelativePosition) -> Self {
        self.relative_position = Some(position);
        self
    }

    /// Use custom anchors; either axis may be left unset
    pub fn with_anchors(
        mut self,
        vertical: Option<VerticalAnchor>,
        horizontal: Option<HorizontalAnchor>,
    ) -> Self {
        self.relative_vertical = vertical;
        self.relative_horizontal = horizontal;
        self
    }

    /// Set the post-anchor offset
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.relative_offset = Offset::new(x, y);
        self
    }

    /// Set the raw type-specific configuration
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }

    /// Whether any custom anchor axis is set
    pub fn has_custom_anchor(&self) -> bool {
        self.relative_vertical.is_some() || self.relative_horizontal.is_some()
    }

    /// Decode the table configuration, if this element carries one
    pub fn table_config(&self) -> Option<TableConfig> {
        self.decode_config()
    }

    /// Decode the formula configuration, if this element carries one
    pub fn formula_config(&self) -> Option<FormulaConfig> {
        self.decode_config()
    }

    /// Decode the image configuration, if this element carries one
    pub fn image_config(&self) -> Option<ImageConfig> {
        self.decode_config()
    }

    fn decode_config<T: DeserializeOwned>(&self) -> Option<T> {
        if self.config.is_null() {
            return None;
        }
        match serde_json::from_value(self.config.clone()) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(element = %self.id, "ignoring malformed config: {e}");
                None
            }
        }
    }
}

/// Treat `null` and `""` as an unset optional field.
///
/// The editing surface clears selects by writing empty strings.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case() {
        let element: Element = serde_json::from_value(json!({
            "id": "total",
            "type": "text",
            "x": 10, "y": 20, "width": 100, "height": 30,
            "content": "{{venta.total}}",
            "relativeTo": "header",
            "relativeVertical": "bottom",
            "relativeOffset": { "y": 4 }
        }))
        .unwrap();

        assert_eq!(element.kind, ElementKind::Text);
        assert_eq!(element.relative_to.as_deref(), Some("header"));
        assert_eq!(element.relative_vertical, Some(VerticalAnchor::Bottom));
        assert_eq!(element.relative_horizontal, None);
        assert_eq!(element.relative_offset, Offset::new(0.0, 4.0));
    }

    #[test]
    fn test_empty_strings_are_unset() {
        let element: Element = serde_json::from_value(json!({
            "id": "a",
            "type": "qr",
            "relativeTo": "",
            "relativePosition": "",
            "relativeOffset": null
        }))
        .unwrap();

        assert_eq!(element.relative_to, None);
        assert_eq!(element.relative_position, None);
        assert_eq!(element.relative_offset, Offset::default());
    }

    #[test]
    fn test_corner_aliases() {
        let a: RelativePosition = serde_json::from_value(json!("top-left")).unwrap();
        let b: RelativePosition = serde_json::from_value(json!("bottomRight")).unwrap();
        assert_eq!(a, RelativePosition::TopLeft);
        assert_eq!(b, RelativePosition::BottomRight);
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        let element = Element::new("t", ElementKind::Table).with_config(json!({ "columns": 3 }));
        assert!(element.table_config().is_none());
    }
}
