//! # Theme tables
//!
//! A [`Theme`] is a two-level table of `section -> key -> value`. Widgets look
//! values up with a default, so an empty theme is always valid:
//!
//! ```rust
//! use ripple_core::{Color, Theme};
//!
//! let theme = Theme::default().with("Colors", "Widget.Focus", Color::from_rgb(255, 0, 0));
//! assert_eq!(theme.color("Colors", "Widget.Focus", Color::BLACK), Color::from_rgb(255, 0, 0));
//! assert_eq!(theme.int("WidgetParams", "Widget.Roundness", 6), 6);
//! ```
//!
//! Themes deserialize from any serde format. In JSON, integers are numbers,
//! colors are `[r, g, b, a]` arrays and enum choices (easings, transitions)
//! are strings.
//!
//! Widgets receive the theme through `WidgetTree::set_theme`; there is no
//! process-wide theme.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Color;
use crate::animation::Easing;

/// Section holding color entries.
pub const COLORS: &str = "Colors";
/// Section holding numeric widget parameters.
pub const WIDGET_PARAMS: &str = "WidgetParams";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeValue {
    Int(i64),
    Color(Color),
    Name(String),
}

impl From<i64> for ThemeValue {
    fn from(v: i64) -> Self {
        ThemeValue::Int(v)
    }
}

impl From<i32> for ThemeValue {
    fn from(v: i32) -> Self {
        ThemeValue::Int(v as i64)
    }
}

impl From<Color> for ThemeValue {
    fn from(v: Color) -> Self {
        ThemeValue::Color(v)
    }
}

impl From<&str> for ThemeValue {
    fn from(v: &str) -> Self {
        ThemeValue::Name(v.to_owned())
    }
}

impl From<Easing> for ThemeValue {
    fn from(v: Easing) -> Self {
        ThemeValue::Name(v.name().to_owned())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme {
    sections: HashMap<String, HashMap<String, ThemeValue>>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<ThemeValue>) {
        self.sections
            .entry(section.to_owned())
            .or_default()
            .insert(key.to_owned(), value.into());
    }

    pub fn with(mut self, section: &str, key: &str, value: impl Into<ThemeValue>) -> Self {
        self.set(section, key, value);
        self
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&ThemeValue> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    pub fn color(&self, section: &str, key: &str, default: Color) -> Color {
        match self.get(section, key) {
            Some(ThemeValue::Color(c)) => *c,
            Some(other) => {
                log::warn!("theme {section}/{key}: expected color, found {other:?}");
                default
            }
            None => default,
        }
    }

    pub fn int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.get(section, key) {
            Some(ThemeValue::Int(v)) => *v,
            Some(other) => {
                log::warn!("theme {section}/{key}: expected integer, found {other:?}");
                default
            }
            None => default,
        }
    }

    /// Integer entry read as a pixel or millisecond quantity.
    pub fn float(&self, section: &str, key: &str, default: f32) -> f32 {
        match self.get(section, key) {
            Some(ThemeValue::Int(v)) => *v as f32,
            Some(other) => {
                log::warn!("theme {section}/{key}: expected integer, found {other:?}");
                default
            }
            None => default,
        }
    }

    /// Named entry parsed into any `FromStr` enum. Unknown names fall back to
    /// `default` with a warning.
    pub fn named<E: FromStr>(&self, section: &str, key: &str, default: E) -> E
    where
        E::Err: std::fmt::Display,
    {
        match self.get(section, key) {
            Some(ThemeValue::Name(name)) => match name.parse() {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("theme {section}/{key}: {e}");
                    default
                }
            },
            Some(other) => {
                log::warn!("theme {section}/{key}: expected name, found {other:?}");
                default
            }
            None => default,
        }
    }

    pub fn easing(&self, section: &str, key: &str, default: Easing) -> Easing {
        self.named(section, key, default)
    }
}
