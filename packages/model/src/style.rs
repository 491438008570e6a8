//! Size, position and flex layout attached to every block.
//!
//! Lengths are kept as the raw strings the editor typed (`"100%"`, `"12px"`);
//! the model never validates them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A length value or `auto`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Auto,
    Length(String),
}

impl Dimension {
    pub fn length(value: impl Into<String>) -> Self {
        Dimension::Length(value.into())
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Dimension::Auto)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Auto => f.write_str("auto"),
            Dimension::Length(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Dimension {
    fn from(value: &str) -> Self {
        if value == "auto" {
            Dimension::Auto
        } else {
            Dimension::Length(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

impl Size {
    pub fn new(width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }
}

/// Offsets for absolutely or fixed positioned blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offsets {
    pub top: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,
    pub right: Dimension,
}

impl Default for Offsets {
    fn default() -> Self {
        Self {
            top: Dimension::length("0px"),
            bottom: Dimension::Auto,
            left: Dimension::length("0px"),
            right: Dimension::Auto,
        }
    }
}

/// Position tag without offsets, used to pick an initial [`Position`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionKind {
    Relative,
    Absolute,
    Fixed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "position")]
pub enum Position {
    #[default]
    Relative,
    Absolute(Offsets),
    Fixed(Offsets),
}

impl Position {
    /// Position a block gets when the editor switches it to `kind`
    pub fn initial(kind: PositionKind) -> Self {
        match kind {
            PositionKind::Relative => Position::Relative,
            PositionKind::Absolute => Position::Absolute(Offsets::default()),
            PositionKind::Fixed => Position::Fixed(Offsets::default()),
        }
    }

    pub fn kind(&self) -> PositionKind {
        match self {
            Position::Relative => PositionKind::Relative,
            Position::Absolute(_) => PositionKind::Absolute,
            Position::Fixed(_) => PositionKind::Fixed,
        }
    }

    /// Offsets, if the tag carries any
    pub fn offsets(&self) -> Option<&Offsets> {
        match self {
            Position::Relative => None,
            Position::Absolute(offsets) | Position::Fixed(offsets) => Some(offsets),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JustifyContent {
    Normal,
    Start,
    End,
    Center,
    Between,
    Around,
    Evenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    FlexStart,
    FlexEnd,
    Center,
}

/// Flex layout parameters; only meaningful on containers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub direction: Direction,
    pub reverse: bool,
    pub justify_content: JustifyContent,
    pub align: Align,
    pub gap: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            direction: Direction::Row,
            reverse: false,
            justify_content: JustifyContent::Normal,
            align: Align::FlexStart,
            gap: "0px".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_positions() {
        assert_eq!(Position::initial(PositionKind::Relative), Position::Relative);
        assert_eq!(Position::default(), Position::Relative);

        let absolute = Position::initial(PositionKind::Absolute);
        let offsets = absolute.offsets().unwrap();
        assert_eq!(offsets.top, Dimension::length("0px"));
        assert_eq!(offsets.left, Dimension::length("0px"));
        assert!(offsets.bottom.is_auto());
        assert!(offsets.right.is_auto());

        assert_eq!(Position::initial(PositionKind::Fixed).kind(), PositionKind::Fixed);
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!(Dimension::from("auto"), Dimension::Auto);
        assert_eq!(Dimension::from("12px"), Dimension::length("12px"));
        assert_eq!(Dimension::length("50%").to_string(), "50%");
    }

    #[test]
    fn test_position_serializes_with_tag() {
        let json = serde_json::to_value(Position::initial(PositionKind::Fixed)).unwrap();
        assert_eq!(json["position"], "fixed");
        assert_eq!(json["top"]["length"], "0px");
    }
}
