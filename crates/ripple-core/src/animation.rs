//! Frame-stepped tweening.
//!
//! [`Animator<T>`] moves a value from its current state toward a target over a
//! fixed duration, shaped by an [`Easing`] curve. It has no clock of its own:
//! callers advance it with [`Animator::update`] once per frame, passing the
//! elapsed milliseconds. That keeps every animation in the tree on the same
//! frame delta and makes tests fully deterministic.
//!
//! ```rust
//! use ripple_core::animation::{Animator, Easing};
//!
//! let mut a = Animator::new(0.0f32);
//! a.set_target(1.0, 300.0, Easing::EaseOutQuad);
//! a.update(150.0);
//! assert_eq!(a.value(), 0.75);
//! ```

use std::f32::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseNameError;
use crate::{Color, Vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,

    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,

    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,

    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,

    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,

    BounceIn,
    BounceOut,
    BounceInOut,

    SpringEaseIn,
    SpringEaseOut,
    SpringEaseBounce,
}

impl Easing {
    pub const ALL: [Easing; 19] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInOutQuint,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
        Easing::SpringEaseIn,
        Easing::SpringEaseOut,
        Easing::SpringEaseBounce,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "Linear",
            Easing::EaseInQuad => "EaseInQuad",
            Easing::EaseOutQuad => "EaseOutQuad",
            Easing::EaseInOutQuad => "EaseInOutQuad",
            Easing::EaseInCubic => "EaseInCubic",
            Easing::EaseOutCubic => "EaseOutCubic",
            Easing::EaseInOutCubic => "EaseInOutCubic",
            Easing::EaseInQuart => "EaseInQuart",
            Easing::EaseOutQuart => "EaseOutQuart",
            Easing::EaseInOutQuart => "EaseInOutQuart",
            Easing::EaseInQuint => "EaseInQuint",
            Easing::EaseOutQuint => "EaseOutQuint",
            Easing::EaseInOutQuint => "EaseInOutQuint",
            Easing::BounceIn => "BounceIn",
            Easing::BounceOut => "BounceOut",
            Easing::BounceInOut => "BounceInOut",
            Easing::SpringEaseIn => "SpringEaseIn",
            Easing::SpringEaseOut => "SpringEaseOut",
            Easing::SpringEaseBounce => "SpringEaseBounce",
        }
    }

    /// Maps linear progress `t` to eased progress. `t` is clamped to `0..=1`
    /// first; every curve returns 0 at 0 and 1 at 1.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let p = t - 1.0;
                p * p * p + 1.0
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => {
                let p = t - 1.0;
                1.0 - p * p * p * p
            }
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - 8.0 * (t - 1.0).powi(4)
                }
            }
            Easing::EaseInQuint => t.powi(5),
            Easing::EaseOutQuint => (t - 1.0).powi(5) + 1.0,
            Easing::EaseInOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 + 16.0 * (t - 1.0).powi(5)
                }
            }
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    0.5 * (1.0 - bounce_out(1.0 - 2.0 * t))
                } else {
                    0.5 * bounce_out(2.0 * t - 1.0) + 0.5
                }
            }
            // The damped sinusoid never lands exactly on 1, so the endpoints
            // are pinned explicitly.
            Easing::SpringEaseIn | Easing::SpringEaseOut | Easing::SpringEaseBounce
                if t >= 1.0 =>
            {
                1.0
            }
            Easing::SpringEaseIn => spring(t, true, false),
            Easing::SpringEaseOut => spring(t, false, false),
            Easing::SpringEaseBounce => spring(t, false, true),
        }
    }
}

impl FromStr for Easing {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| ParseNameError::new("easing", s))
    }
}

fn bounce_out(p: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if p < 1.0 / D {
        N * p * p
    } else if p < 2.0 / D {
        let p = p - 1.5 / D;
        N * p * p + 0.75
    } else if p < 2.5 / D {
        let p = p - 2.25 / D;
        N * p * p + 0.9375
    } else {
        let p = p - 2.625 / D;
        N * p * p + 0.984375
    }
}

fn spring(p: f32, ease_in: bool, bounce: bool) -> f32 {
    const TENSION: f32 = 0.4;
    const FRICTION: f32 = 0.6;
    let overshoot = if bounce { 0.1 } else { 0.0 };

    let t = if ease_in {
        1.0 - (p * PI * 0.5).cos()
    } else {
        (p * PI * 0.5).sin()
    };

    let mut value = 1.0 - (-t * TENSION).exp() * (t * (PI / (2.0 - FRICTION))).cos();
    if bounce {
        value += overshoot * (t * PI * 4.0).sin();
    }
    value.clamp(0.0, 1.0)
}

/// What a looping animator does when it reaches its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Jump back to the start value and play forward again.
    NoLoop,
    /// Swap start and target, ping-ponging between them.
    #[default]
    ReverseOnLoop,
}

pub trait Interpolate {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for i32 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        (*self as f32 + (*other - *self) as f32 * t).round() as i32
    }
}

impl Interpolate for Vec2 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Vec2::new(self.x.interpolate(&other.x, t), self.y.interpolate(&other.y, t))
    }
}

impl Interpolate for Color {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        fn channel(a: u8, b: u8, t: f32) -> u8 {
            (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
        }
        Color(
            channel(self.0, other.0, t),
            channel(self.1, other.1, t),
            channel(self.2, other.2, t),
            channel(self.3, other.3, t),
        )
    }
}

/// Tween between two values of `T`, advanced explicitly in milliseconds.
#[derive(Clone, Debug)]
pub struct Animator<T> {
    current: T,
    start: T,
    target: T,
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
    loop_mode: LoopMode,
    looping: bool,
    loop_count: u32,
    running: bool,
}

impl<T: Interpolate + Clone + Default> Default for Animator<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Interpolate + Clone> Animator<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial.clone(),
            start: initial.clone(),
            target: initial,
            duration_ms: 0.0,
            elapsed_ms: 0.0,
            easing: Easing::default(),
            loop_mode: LoopMode::default(),
            looping: false,
            loop_count: 0,
            running: false,
        }
    }

    /// Starts a new tween from the current value. Retargeting mid-flight
    /// continues from wherever the value is now, so there is no jump.
    pub fn set_target(&mut self, target: T, duration_ms: f32, easing: Easing) {
        self.start = self.current.clone();
        self.target = target;
        self.duration_ms = duration_ms;
        self.elapsed_ms = 0.0;
        self.easing = easing;
        self.running = true;
    }

    pub fn snap_to(&mut self, value: T) {
        self.current = value.clone();
        self.start = value.clone();
        self.target = value;
        self.elapsed_ms = 0.0;
        self.running = false;
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Advances by `dt_ms`. Returns `true` when the value changed this call,
    /// including the call that lands on the target.
    pub fn update(&mut self, dt_ms: f32) -> bool {
        if !self.running {
            return false;
        }

        if self.duration_ms <= 0.0 {
            self.current = self.target.clone();
            self.elapsed_ms = 0.0;
            self.running = false;
            return true;
        }

        self.elapsed_ms += dt_ms.max(0.0);

        if self.elapsed_ms >= self.duration_ms {
            if self.looping {
                self.loop_count = self.loop_count.saturating_add(1);
                let carry = (self.elapsed_ms - self.duration_ms) % self.duration_ms;
                if self.loop_mode == LoopMode::ReverseOnLoop {
                    std::mem::swap(&mut self.start, &mut self.target);
                }
                self.elapsed_ms = carry;
                self.current = self.sample();
                return true;
            }
            self.current = self.target.clone();
            self.elapsed_ms = self.duration_ms;
            self.running = false;
            return true;
        }

        self.current = self.sample();
        true
    }

    fn sample(&self) -> T {
        let t = self.elapsed_ms / self.duration_ms;
        self.start.interpolate(&self.target, self.easing.apply(t))
    }

    pub fn value(&self) -> T {
        self.current.clone()
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Linear progress of the current tween in `0..=1`. A finished or idle
    /// animator reports 1.
    pub fn progress(&self) -> f32 {
        if !self.running || self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }
}
