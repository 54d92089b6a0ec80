//! Anchor points placed on site plans
//!
//! Anchors are stored as fractions of the viewport they were placed in, so
//! the same value reproduces the same visual spot in any viewport size.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized position on a rendered plan
///
/// `x` and `y` are fractions of the viewport width and height, nominally in
/// `[0, 1]`. The exact value `{0, 0}` means "no anchor" for compatibility with
/// records written before anchors were optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Legacy "unset" marker value
    pub const UNSET: Anchor = Anchor { x: 0.0, y: 0.0 };

    /// Check whether this is the legacy `{0, 0}` placeholder
    pub fn is_sentinel(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Read an anchor from a loosely typed stored record
    ///
    /// Accepts an object with numeric `x` and `y`. Missing fields, other
    /// shapes, and non-finite numbers yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let x = obj.get("x")?.as_f64()?;
        let y = obj.get("y")?.as_f64()?;
        if !x.is_finite() || !y.is_finite() {
            log::debug!("Ignoring non-finite anchor ({x}, {y})");
            return None;
        }
        Some(Self { x, y })
    }

    /// Encode as the `{x, y}` record shape
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "x": self.x, "y": self.y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel() {
        assert!(Anchor::UNSET.is_sentinel());
        assert!(Anchor::new(0.0, 0.0).is_sentinel());
        assert!(!Anchor::new(0.0, 0.0001).is_sentinel());
        assert!(!Anchor::new(0.5, 0.0).is_sentinel());
    }

    #[test]
    fn test_from_value_accepts_numbers() {
        let anchor = Anchor::from_value(&json!({ "x": 0.25, "y": 1 }));
        assert_eq!(anchor, Some(Anchor::new(0.25, 1.0)));
    }

    #[test]
    fn test_from_value_ignores_extra_fields() {
        let anchor = Anchor::from_value(&json!({ "x": 0.1, "y": 0.2, "zoom": 3 }));
        assert_eq!(anchor, Some(Anchor::new(0.1, 0.2)));
    }

    #[test]
    fn test_from_value_rejects_malformed() {
        assert_eq!(Anchor::from_value(&Value::Null), None);
        assert_eq!(Anchor::from_value(&json!({ "x": 0.5 })), None);
        assert_eq!(Anchor::from_value(&json!({ "x": "0.5", "y": 0.5 })), None);
        assert_eq!(Anchor::from_value(&json!([0.5, 0.5])), None);
        assert_eq!(Anchor::from_value(&json!({})), None);
    }

    #[test]
    fn test_serde_shape() {
        let anchor = Anchor::new(0.5, 0.75);
        let value = serde_json::to_value(anchor).unwrap();
        assert_eq!(value, json!({ "x": 0.5, "y": 0.75 }));
        assert_eq!(anchor.to_value(), value);
    }
}
