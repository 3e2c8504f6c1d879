//! # Ripple core
//!
//! Plain data and leaf utilities shared by every Ripple crate:
//!
//! - geometry (`Vec2`, `Size`, `Rect`, `Insets`) and `Color`
//! - [`animation::Animator`], a frame-stepped tween with a catalogue of easings
//! - [`Theme`], a section/key table with per-lookup defaults
//! - [`InputSnapshot`] and [`Key`], one frame of sampled input
//! - [`Painter`], the drawing sink, and [`Scene`], a recording implementation
//!
//! Nothing here knows about widgets. The widget arena and dispatch rules live
//! in `ripple-ui`; navigation lives in `ripple-navigation`.

pub mod animation;
pub mod color;
pub mod error;
pub mod geometry;
pub mod input;
pub mod render_api;
pub mod theme;

pub use animation::{Animator, Easing, Interpolate, LoopMode};
pub use color::*;
pub use error::*;
pub use geometry::*;
pub use input::*;
pub use render_api::*;
pub use theme::*;
