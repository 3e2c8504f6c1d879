use thiserror::Error;

use crate::WidgetId;

/// Structural misuse of a [`WidgetTree`](crate::WidgetTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("widget {0:?} is not in this tree")]
    UnknownWidget(WidgetId),
    #[error("widget {0:?} is a leaf and cannot hold children")]
    NotAContainer(WidgetId),
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: WidgetId, child: WidgetId },
}
