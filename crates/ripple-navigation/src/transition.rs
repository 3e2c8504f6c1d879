//! Transition kinds and their per-frame geometry.
//!
//! [`frame`] is a pure function of the kind, direction, progress and screen
//! size, so the manager only has to paint two layers and an optional scrim.

use std::fmt;
use std::str::FromStr;

use ripple_core::{ParseNameError, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Travel of the covered view in parallax transitions, as a fraction of the
/// screen width.
pub const PARALLAX: f32 = 0.3;
/// Lateral drift of the fade transition, as a fraction of the screen width.
pub const FADE_DRIFT: f32 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    None,
    /// Resolved from `ViewManager/Transition` in the theme.
    #[default]
    ThemeDefault,
    SlideLeft,
    SlideRight,
    PushLeft,
    PushRight,
    PushBottom,
    MaterialUFade,
}

impl Transition {
    pub const ALL: [Transition; 8] = [
        Transition::None,
        Transition::ThemeDefault,
        Transition::SlideLeft,
        Transition::SlideRight,
        Transition::PushLeft,
        Transition::PushRight,
        Transition::PushBottom,
        Transition::MaterialUFade,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Transition::None => "None",
            Transition::ThemeDefault => "ThemeDefault",
            Transition::SlideLeft => "SlideLeft",
            Transition::SlideRight => "SlideRight",
            Transition::PushLeft => "PushLeft",
            Transition::PushRight => "PushRight",
            Transition::PushBottom => "PushBottom",
            Transition::MaterialUFade => "MaterialUFade",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transition {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transition::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ParseNameError::new("transition", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionDir {
    Push,
    Pop,
}

/// Placement of one view for a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerFrame {
    pub offset: Vec2,
    pub alpha: f32,
}

impl LayerFrame {
    const REST: LayerFrame = LayerFrame {
        offset: Vec2::ZERO,
        alpha: 1.0,
    };

    fn at(x: f32, y: f32) -> Self {
        Self {
            offset: Vec2::new(x, y),
            alpha: 1.0,
        }
    }
}

/// Both layers of a transition frame. `outgoing` is the view being left
/// (covered on push, removed on pop), `incoming` the view that ends up on
/// top of the stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionFrame {
    pub outgoing: LayerFrame,
    pub incoming: LayerFrame,
    /// Paint order: when false the outgoing view is drawn last.
    pub incoming_on_top: bool,
    /// Opacity factor of the scrim drawn over the lower layer.
    pub scrim: f32,
}

/// Geometry for `kind` at progress `t`. Pops mirror the push geometry of the
/// same kind. `ThemeDefault` must be resolved by the caller and renders like
/// `None`.
pub fn frame(kind: Transition, dir: TransitionDir, t: f32, size: Size) -> TransitionFrame {
    let t = t.clamp(0.0, 1.0);
    let w = size.width;
    let h = size.height;
    let push = dir == TransitionDir::Push;

    let slide = |sign: f32| {
        // sign is the direction the content travels on push: -1 for left.
        let s = if push { sign } else { -sign };
        TransitionFrame {
            outgoing: LayerFrame::at(s * w * t, 0.0),
            incoming: LayerFrame::at(-s * w * (1.0 - t), 0.0),
            incoming_on_top: true,
            scrim: 0.0,
        }
    };

    let parallax = |sign: f32| {
        if push {
            TransitionFrame {
                outgoing: LayerFrame::at(sign * PARALLAX * w * t, 0.0),
                incoming: LayerFrame::at(-sign * w * (1.0 - t), 0.0),
                incoming_on_top: true,
                scrim: t,
            }
        } else {
            TransitionFrame {
                outgoing: LayerFrame::at(-sign * w * t, 0.0),
                incoming: LayerFrame::at(sign * PARALLAX * w * (1.0 - t), 0.0),
                incoming_on_top: false,
                scrim: 1.0 - t,
            }
        }
    };

    match kind {
        Transition::None | Transition::ThemeDefault => TransitionFrame {
            outgoing: LayerFrame {
                offset: Vec2::ZERO,
                alpha: 0.0,
            },
            incoming: LayerFrame::REST,
            incoming_on_top: true,
            scrim: 0.0,
        },
        Transition::SlideLeft => slide(-1.0),
        Transition::SlideRight => slide(1.0),
        Transition::PushLeft => parallax(-1.0),
        Transition::PushRight => parallax(1.0),
        Transition::PushBottom => {
            if push {
                TransitionFrame {
                    outgoing: LayerFrame::REST,
                    incoming: LayerFrame::at(0.0, h * (1.0 - t)),
                    incoming_on_top: true,
                    scrim: t,
                }
            } else {
                TransitionFrame {
                    outgoing: LayerFrame::at(0.0, h * t),
                    incoming: LayerFrame::REST,
                    incoming_on_top: false,
                    scrim: 1.0 - t,
                }
            }
        }
        Transition::MaterialUFade => {
            let sign = if push { 1.0 } else { -1.0 };
            TransitionFrame {
                outgoing: LayerFrame {
                    offset: Vec2::new(-sign * FADE_DRIFT * w * t, 0.0),
                    alpha: 1.0 - t,
                },
                incoming: LayerFrame {
                    offset: Vec2::new(sign * FADE_DRIFT * w * (1.0 - t), 0.0),
                    alpha: t,
                },
                incoming_on_top: true,
                scrim: 0.0,
            }
        }
    }
}
