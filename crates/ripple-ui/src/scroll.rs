//! # Scroll engine
//!
//! [`Scroller`] holds the physics state of one vertically scrolling
//! container: offset, velocity, drag tracking, programmatic smooth scrolling
//! and scrollbar opacity. It knows nothing about widgets; the dispatch code in
//! [`crate::dispatch`] feeds it pointer positions and frame deltas.
//!
//! Offsets are signed and never positive at rest: `0` shows the top of the
//! content, [`Scroller::max_scroll`] (`viewport - content`, at most `0`) shows
//! the bottom. While the pointer is held the offset may leave that range with
//! damped travel; once released a spring pulls it back.
//!
//! Each frame does, in order:
//!
//! - auto-scroll steering (`velocity = gap * auto_speed`, snapping when close),
//! - integration `offset += velocity * dt` when free,
//! - rubber-band tension past either edge, or frame-rate independent friction
//!   `friction^(dt * 60)` inside the range,
//! - scrollbar fade once idle.

use ripple_core::{Rect, Vec2};

/// Tuning for [`Scroller`]. The defaults reproduce the stock feel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollConfig {
    /// Velocity multiplier per 60 Hz frame while coasting.
    pub friction: f32,
    /// Coasting stops below this speed (px/s).
    pub min_velocity: f32,
    /// Spring constant pulling an overscrolled offset back to the edge.
    pub tension: f32,
    /// Scrollbar fade rate once idle (alpha units per second).
    pub fade_rate: f32,
    /// Gain applied to the remaining distance during smooth scrolling.
    pub auto_speed: f32,
    /// Velocity added per wheel notch (px/s).
    pub wheel_impulse: f32,
    /// Movement before a press becomes a drag (px).
    pub slop: f32,
    /// Fraction of finger travel applied while past an edge.
    pub overscroll_damping: f32,
    /// Smooth scrolling snaps once gap and speed are both below this.
    pub snap_epsilon: f32,
    /// Upper bound on the per-frame delta (s).
    pub max_dt: f32,
    /// Lower bound on the delta used to derive drag velocity (s).
    pub min_drag_dt: f32,
    /// Children this far outside the viewport are still drawn (px).
    pub visibility_margin: f32,
    pub scrollbar_width: f32,
    pub scrollbar_inset: f32,
    /// Smallest fraction the thumb may shrink to while overscrolled.
    pub min_bar_factor: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            friction: 0.96,
            min_velocity: 3.6,
            tension: 0.10,
            fade_rate: 42.0,
            auto_speed: 7.5,
            wheel_impulse: 450.0,
            slop: 12.0,
            overscroll_damping: 0.30,
            snap_epsilon: 0.75,
            max_dt: 0.1,
            min_drag_dt: 0.001,
            visibility_margin: 20.0,
            scrollbar_width: 4.0,
            scrollbar_inset: 6.0,
            min_bar_factor: 0.3,
        }
    }
}

/// Press classification for one contact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    /// Pressed inside; still deciding between tap, drag and swipe.
    Potential,
    /// Vertical drag won; the container owns the contact.
    Intercepted,
    /// Left to the children for the rest of the contact.
    Rejected,
}

#[derive(Clone, Debug)]
pub struct Scroller {
    config: ScrollConfig,
    offset: f32,
    velocity: f32,
    dragging: bool,
    last_drag: f32,
    auto_target: f32,
    auto_scroll: bool,
    scrollbar_alpha: f32,
    content_extent: f32,
    viewport_extent: f32,
    frame_dt: f32,
    phase: GesturePhase,
    press_origin: Vec2,
}

impl Default for Scroller {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl Scroller {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            offset: 0.0,
            velocity: 0.0,
            dragging: false,
            last_drag: 0.0,
            auto_target: 0.0,
            auto_scroll: false,
            scrollbar_alpha: 0.0,
            content_extent: 0.0,
            viewport_extent: 0.0,
            frame_dt: 1.0 / 60.0,
            phase: GesturePhase::Idle,
            press_origin: Vec2::ZERO,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ScrollConfig {
        &mut self.config
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll
    }

    pub fn scrollbar_alpha(&self) -> f32 {
        self.scrollbar_alpha
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn content_extent(&self) -> f32 {
        self.content_extent
    }

    pub fn viewport_extent(&self) -> f32 {
        self.viewport_extent
    }

    pub fn set_content_extent(&mut self, extent: f32) {
        self.content_extent = extent.max(0.0);
    }

    pub fn set_viewport_extent(&mut self, extent: f32) {
        self.viewport_extent = extent.max(0.0);
    }

    /// Most negative resting offset.
    pub fn max_scroll(&self) -> f32 {
        (self.viewport_extent - self.content_extent).min(0.0)
    }

    pub fn can_scroll(&self) -> bool {
        self.content_extent > self.viewport_extent
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.offset > 0.0 || self.offset < self.max_scroll()
    }

    /// Jumps without animation. Leaves velocity untouched.
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    /// Steers toward `target` (clamped into range) until it arrives.
    pub fn smooth_scroll_to(&mut self, target: f32) {
        self.auto_target = target.clamp(self.max_scroll(), 0.0);
        self.auto_scroll = true;
        self.scrollbar_alpha = 255.0;
    }

    /// Adds a wheel impulse of `steps` notches. Returns whether anything
    /// could move.
    pub fn wheel(&mut self, steps: f32) -> bool {
        if !self.can_scroll() || steps == 0.0 {
            return false;
        }
        self.auto_scroll = false;
        self.velocity += steps * self.config.wheel_impulse;
        self.scrollbar_alpha = 255.0;
        true
    }

    /// Starts classifying a new contact at `point`.
    pub fn begin_gesture(&mut self, point: Vec2, inside: bool) {
        self.press_origin = point;
        self.phase = if inside {
            GesturePhase::Potential
        } else {
            GesturePhase::Idle
        };
        self.dragging = false;
        self.last_drag = point.y;
    }

    /// Classifies the contact given its current position. Only meaningful
    /// while [`GesturePhase::Potential`]; returns the (possibly new) phase.
    pub fn classify(&mut self, point: Vec2) -> GesturePhase {
        if self.phase != GesturePhase::Potential {
            return self.phase;
        }
        let dx = (point.x - self.press_origin.x).abs();
        let dy = (point.y - self.press_origin.y).abs();
        if dy > self.config.slop && dy > dx {
            self.phase = GesturePhase::Intercepted;
            self.dragging = true;
            self.velocity = 0.0;
            self.auto_scroll = false;
            self.scrollbar_alpha = 255.0;
        } else if dx > self.config.slop {
            self.phase = GesturePhase::Rejected;
        }
        self.phase
    }

    /// Hands the contact back to the children for its remaining frames.
    pub fn reject_gesture(&mut self) {
        if self.phase == GesturePhase::Potential {
            self.phase = GesturePhase::Rejected;
        }
    }

    pub fn end_gesture(&mut self) {
        self.phase = GesturePhase::Idle;
        self.dragging = false;
    }

    /// Feeds the pointer's vertical position while held (`down`) or the
    /// release. Returns whether the container consumed the event.
    pub fn drag(&mut self, y: f32, down: bool) -> bool {
        if !down {
            self.dragging = false;
            return false;
        }

        self.scrollbar_alpha = 255.0;
        if !self.dragging {
            self.dragging = true;
            self.velocity = 0.0;
        } else {
            let mut diff = y - self.last_drag;
            if self.is_out_of_bounds() {
                diff *= self.config.overscroll_damping;
            }
            let dt = self.frame_dt.clamp(self.config.min_drag_dt, self.config.max_dt);
            self.velocity = diff / dt;
            self.offset += diff;
        }
        self.last_drag = y;
        true
    }

    /// Advances physics by `dt` seconds. Returns whether the offset or the
    /// scrollbar changed.
    pub fn tick(&mut self, dt: f32) -> bool {
        let dt = dt.clamp(0.0, self.config.max_dt);
        if dt > 0.0 {
            self.frame_dt = dt;
        }
        let before = (self.offset, self.scrollbar_alpha);
        let max_scroll = self.max_scroll();
        let cfg = self.config;

        if self.auto_scroll && !self.dragging {
            let gap = self.auto_target - self.offset;
            self.velocity = gap * cfg.auto_speed;
            if gap.abs() < cfg.snap_epsilon && self.velocity.abs() < cfg.snap_epsilon {
                self.offset = self.auto_target;
                self.velocity = 0.0;
                self.auto_scroll = false;
            }
        }

        let out = self.is_out_of_bounds();
        if !self.dragging && (self.velocity.abs() > 0.001 || out || self.auto_scroll) {
            self.offset += self.velocity * dt;

            if self.auto_scroll {
                self.scrollbar_alpha = 255.0;
                self.offset = self.offset.clamp(max_scroll, 0.0);
            } else if self.offset > 0.0 {
                self.velocity = -self.offset * cfg.tension * 60.0;
                self.scrollbar_alpha = 255.0;
                if self.offset.abs() < 0.5 {
                    self.offset = 0.0;
                    self.velocity = 0.0;
                }
            } else if self.offset < max_scroll {
                let over = self.offset - max_scroll;
                self.velocity = -over * cfg.tension * 60.0;
                self.scrollbar_alpha = 255.0;
                if over.abs() < 0.5 {
                    self.offset = max_scroll;
                    self.velocity = 0.0;
                }
            } else if self.velocity.abs() > cfg.min_velocity {
                self.velocity *= cfg.friction.powf(dt * 60.0);
                self.scrollbar_alpha = 255.0;
            } else {
                self.velocity = 0.0;
            }
        } else if !self.dragging {
            self.scrollbar_alpha = (self.scrollbar_alpha - cfg.fade_rate * dt).max(0.0);
        }

        if self.dragging {
            self.auto_scroll = false;
            self.scrollbar_alpha = 255.0;
        }

        before != (self.offset, self.scrollbar_alpha)
    }

    /// Thumb rectangle and alpha for a viewport drawn at `viewport`, or
    /// `None` when there is nothing to scroll or the bar has faded out.
    pub fn scrollbar_thumb(&self, viewport: Rect) -> Option<(Rect, u8)> {
        if !self.can_scroll() || self.scrollbar_alpha <= 0.0 || viewport.h <= 0.0 {
            return None;
        }
        let cfg = &self.config;
        let h = viewport.h;
        let ratio = h / self.content_extent;
        let mut bar_h = h * ratio;
        let max_scroll = self.max_scroll();

        let bar_y = if self.offset > 0.0 {
            bar_h *= (1.0 - self.offset / h).max(cfg.min_bar_factor);
            viewport.y
        } else if self.offset < max_scroll {
            let over = max_scroll - self.offset;
            bar_h *= (1.0 - over / h).max(cfg.min_bar_factor);
            viewport.y + h - bar_h
        } else {
            viewport.y - self.offset * ratio
        };

        let rect = Rect::new(
            viewport.right() - cfg.scrollbar_inset,
            bar_y,
            cfg.scrollbar_width,
            bar_h,
        );
        Some((rect, self.scrollbar_alpha.round().clamp(0.0, 255.0) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn scroller(viewport: f32, content: f32) -> Scroller {
        let mut s = Scroller::default();
        s.set_viewport_extent(viewport);
        s.set_content_extent(content);
        s
    }

    #[test]
    fn test_fling_settles_at_bottom_edge() {
        let mut s = scroller(400.0, 1000.0);
        assert_eq!(s.max_scroll(), -600.0);

        s.set_velocity(-2000.0);
        let mut deepest = 0.0f32;
        for _ in 0..600 {
            s.tick(FRAME);
            deepest = deepest.min(s.offset());
        }

        // The fling carries past the edge, then the spring brings it back.
        assert!(deepest < -600.0);
        assert_eq!(s.offset(), -600.0);
        assert_eq!(s.velocity(), 0.0);
    }

    #[test]
    fn test_short_fling_stays_in_range() {
        let mut s = scroller(400.0, 1000.0);
        s.set_velocity(-300.0);
        for _ in 0..600 {
            s.tick(FRAME);
            assert!(s.offset() <= 0.0 && s.offset() >= -600.0);
        }
        assert_eq!(s.velocity(), 0.0);
    }

    #[test]
    fn test_top_overscroll_springs_back() {
        let mut s = scroller(400.0, 1000.0);
        s.set_offset(80.0);
        for _ in 0..300 {
            s.tick(FRAME);
        }
        assert_eq!(s.offset(), 0.0);
    }

    #[test]
    fn test_long_frame_is_clamped_to_max_dt() {
        let mut a = scroller(400.0, 100_000.0);
        let mut b = scroller(400.0, 100_000.0);
        a.set_velocity(-1000.0);
        b.set_velocity(-1000.0);

        a.tick(5.0);
        b.tick(0.1);
        assert_eq!(a.offset(), b.offset());
        assert_eq!(a.velocity(), b.velocity());
        assert!(a.offset() > -101.0);

        // Drag velocity is measured against the clamped frame time too.
        a.drag(0.0, true);
        a.drag(10.0, true);
        assert!((a.velocity() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_friction_is_frame_rate_independent() {
        let mut a = scroller(400.0, 100_000.0);
        let mut b = scroller(400.0, 100_000.0);
        a.set_velocity(-1000.0);
        b.set_velocity(-1000.0);
        for _ in 0..60 {
            a.tick(FRAME);
        }
        for _ in 0..30 {
            b.tick(2.0 * FRAME);
        }
        assert!((a.velocity() - b.velocity()).abs() < 1.0);
    }

    #[test]
    fn test_smooth_scroll_snaps_to_clamped_target() {
        let mut s = scroller(400.0, 1000.0);
        s.smooth_scroll_to(-5000.0);
        assert!(s.is_auto_scrolling());
        for _ in 0..600 {
            s.tick(FRAME);
        }
        assert!(!s.is_auto_scrolling());
        assert_eq!(s.offset(), -600.0);
        assert_eq!(s.velocity(), 0.0);
    }

    #[test]
    fn test_slop_classification() {
        let mut s = scroller(400.0, 1000.0);
        s.begin_gesture(Vec2::new(50.0, 50.0), true);
        assert_eq!(s.classify(Vec2::new(55.0, 58.0)), GesturePhase::Potential);
        assert_eq!(s.classify(Vec2::new(50.0, 70.0)), GesturePhase::Intercepted);
        assert!(s.is_dragging());

        s.begin_gesture(Vec2::new(50.0, 50.0), true);
        assert_eq!(s.classify(Vec2::new(70.0, 55.0)), GesturePhase::Rejected);
        // Once rejected, later vertical travel does not intercept.
        assert_eq!(s.classify(Vec2::new(70.0, 150.0)), GesturePhase::Rejected);

        s.begin_gesture(Vec2::new(50.0, 50.0), false);
        assert_eq!(s.classify(Vec2::new(50.0, 150.0)), GesturePhase::Idle);
    }

    #[test]
    fn test_drag_is_damped_past_edge() {
        let mut s = scroller(400.0, 1000.0);
        s.drag(100.0, true);
        s.drag(110.0, true);
        assert_eq!(s.offset(), 10.0);
        // Now past the top edge, further travel is damped.
        s.drag(120.0, true);
        assert!((s.offset() - 13.0).abs() < 1e-4);
        assert!(!s.drag(120.0, false));
        assert!(!s.is_dragging());
    }

    #[test]
    fn test_wheel_needs_overflow() {
        let mut s = scroller(400.0, 300.0);
        assert!(!s.wheel(-1.0));

        let mut s = scroller(400.0, 1000.0);
        assert!(s.wheel(-1.0));
        assert_eq!(s.velocity(), -450.0);
        assert_eq!(s.scrollbar_alpha(), 255.0);
    }

    #[test]
    fn test_scrollbar_fades_when_idle() {
        let mut s = scroller(400.0, 1000.0);
        s.wheel(-1.0);
        for _ in 0..2000 {
            s.tick(FRAME);
        }
        assert_eq!(s.scrollbar_alpha(), 0.0);
        assert!(s.scrollbar_thumb(Rect::new(0.0, 0.0, 100.0, 400.0)).is_none());
    }

    #[test]
    fn test_scrollbar_thumb_geometry() {
        let mut s = scroller(400.0, 1000.0);
        s.smooth_scroll_to(0.0);
        s.set_offset(-300.0);
        let (thumb, alpha) = s
            .scrollbar_thumb(Rect::new(0.0, 100.0, 200.0, 400.0))
            .unwrap();
        assert_eq!(alpha, 255);
        assert_eq!(thumb.x, 194.0);
        assert_eq!(thumb.w, 4.0);
        assert!((thumb.h - 160.0).abs() < 1e-3);
        assert!((thumb.y - 220.0).abs() < 1e-3);

        // Overscrolled at the top: anchored and shrunk.
        s.set_offset(200.0);
        let (thumb, _) = s
            .scrollbar_thumb(Rect::new(0.0, 100.0, 200.0, 400.0))
            .unwrap();
        assert_eq!(thumb.y, 100.0);
        assert!((thumb.h - 80.0).abs() < 1e-3);
    }
}
