//! Widgets, containers, scrolling and input dispatch.
//!
//! Widgets live in a [`WidgetTree`] arena. A [`View`] wraps one tree with a
//! root container and handles focus traversal; `ripple-navigation` stacks
//! views.

pub mod button;
pub mod container;
pub mod dispatch;
pub mod error;
pub mod label;
pub mod list;
pub mod scroll;
pub mod slider;
pub mod tree;
pub mod view;
pub mod widget;

pub use button::Button;
pub use container::{Container, ContainerKind, DEFAULT_SPACING, LinearLayout, Orientation};
pub use error::TreeError;
pub use label::{Label, estimate_text_size};
pub use list::ListBox;
pub use scroll::{GesturePhase, ScrollConfig, Scroller};
pub use slider::Slider;
pub use tree::{WidgetId, WidgetTree};
pub use view::View;
pub use widget::{DrawCx, FocusStyle, SizePolicy, UpdateCx, Widget, WidgetBase, WidgetState};
