//! Modal dialog overlay.
//!
//! A [`Dialog`] is a [`View`] laid out as a card, centered on screen unless
//! explicit bounds are given. Opening and closing animate one progress value
//! that drives the dim layer, the card opacity and a short rise. The manager
//! owns the dialog and destroys it once a close animation has finished.

use std::sync::Arc;

use ripple_core::{
    Animator, COLORS, Color, Easing, Insets, Key, Painter, Rect, Size, Theme, Vec2, WIDGET_PARAMS,
};
use ripple_ui::{Container, SizePolicy, View, WidgetId, WidgetTree};

const CARD_PADDING: f32 = 16.0;
/// Vertical travel of the card while fading in or out.
const RISE: f32 = 24.0;

/// Corner radius that still looks concentric with the padded content.
fn visual_roundness(base: f32, padding: f32) -> f32 {
    let base = base.max(0.0);
    let padding = padding.max(0.0);
    if base < padding - base { base } else { base + padding }
}

pub struct Dialog {
    view: View,
    anim: Animator<f32>,
    duration_ms: f32,
    easing: Easing,
    visible: bool,
    closing: bool,
    dim: bool,
    requested: Option<Rect>,
    parent: Size,
    base_roundness: f32,
    background: Color,
    border: Color,
    dim_color: Color,
    on_dismiss: Option<Box<dyn FnOnce()>>,
}

impl Dialog {
    pub fn new(theme: Arc<Theme>) -> Self {
        let mut tree = WidgetTree::new(theme.clone());
        let root = tree.insert_container(Container::vertical());
        if let Some(base) = tree.base_mut(root) {
            base.set_size(SizePolicy::WrapContent, SizePolicy::WrapContent);
            base.set_padding(Insets::all(CARD_PADDING));
        }
        let mut dialog = Self {
            view: View::with_root("dialog", tree, root),
            anim: Animator::new(0.0),
            duration_ms: 300.0,
            easing: Easing::EaseOutQuart,
            visible: false,
            closing: false,
            dim: true,
            requested: None,
            parent: Size::ZERO,
            base_roundness: 6.0,
            background: Color::from_rgba(40, 40, 40, 240),
            border: Color::from_rgba(100, 100, 100, 180),
            dim_color: Color::from_rgba(0, 0, 0, 128),
            on_dismiss: None,
        };
        dialog.apply_theme(&theme);
        dialog
    }

    /// Places the card at `bounds` (clamped to the screen) instead of
    /// centering it.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.requested = Some(bounds);
        self
    }

    pub fn with_dim(mut self, dim: bool) -> Self {
        self.dim = dim;
        self
    }

    pub fn on_dismiss(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_dismiss = Some(Box::new(f));
        self
    }

    pub(crate) fn apply_theme(&mut self, theme: &Theme) {
        self.duration_ms = theme.float(WIDGET_PARAMS, "Dialog.AnimationDuration", 300.0);
        self.easing = theme.easing(WIDGET_PARAMS, "Dialog.AnimationEasing", Easing::EaseOutQuart);
        self.base_roundness = theme.float(WIDGET_PARAMS, "Widget.Roundness", 6.0);
        self.background =
            theme.color(COLORS, "Dialog.Background", Color::from_rgba(40, 40, 40, 240));
        self.border = theme.color(COLORS, "Dialog.Border", Color::from_rgba(100, 100, 100, 180));
        self.dim_color = theme.color(COLORS, "Dialog.Dim", Color::from_rgba(0, 0, 0, 128));
    }

    pub(crate) fn set_theme(&mut self, theme: Arc<Theme>) {
        self.apply_theme(&theme);
        self.view.set_theme(theme);
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        self.view.tree_mut()
    }

    /// Content column of the card.
    pub fn root(&self) -> WidgetId {
        self.view.root()
    }

    pub fn card(&self) -> Rect {
        self.view.frame()
    }

    pub fn progress(&self) -> f32 {
        self.anim.value()
    }

    pub fn is_open(&self) -> bool {
        self.visible && !self.closing
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.closing && !self.anim.is_running()
    }

    pub fn open(&mut self) {
        if self.visible {
            return;
        }
        self.visible = true;
        self.closing = false;
        self.anim.set_target(1.0, self.duration_ms, self.easing);
    }

    /// Starts the close animation. The owner drops the dialog when it ends.
    pub fn close(&mut self) {
        if !self.visible || self.closing {
            return;
        }
        self.closing = true;
        self.anim.set_target(0.0, self.duration_ms, self.easing);
    }

    pub(crate) fn dismissed(mut self) {
        if let Some(f) = self.on_dismiss.take() {
            f();
        }
    }

    fn roundness(&self) -> f32 {
        let p = self.view.tree().base(self.root()).map_or(Insets::ZERO, |b| b.padding());
        let max_padding = p.left.max(p.right).max(p.top).max(p.bottom);
        visual_roundness(self.base_roundness, max_padding)
    }

    /// Sizes and places the card for a screen of `parent`.
    pub(crate) fn layout_in(&mut self, parent: Size) {
        self.parent = parent;
        let pw = parent.width.max(1.0);
        let ph = parent.height.max(1.0);
        let root = self.root();
        let measured = self.view.tree_mut().measure(root, Size::new(pw, ph));

        let card = match self.requested {
            Some(r) => {
                let w = if r.w > 0.0 { r.w.clamp(1.0, pw) } else { measured.width.clamp(1.0, pw) };
                let h = if r.h > 0.0 { r.h.clamp(1.0, ph) } else { measured.height.clamp(1.0, ph) };
                Rect::new(r.x.clamp(0.0, pw - w), r.y.clamp(0.0, ph - h), w, h)
            }
            None => {
                let w = measured.width.clamp(1.0, pw);
                let h = measured.height.clamp(1.0, ph);
                Rect::new(((pw - w) / 2.0).floor(), ((ph - h) / 2.0).floor(), w, h)
            }
        };
        self.view.set_frame(card);
        self.view.layout();
    }

    pub fn update(&mut self, dt_ms: f32) -> bool {
        let mut redraw = false;
        if self.view.tree().needs_layout() {
            self.layout_in(self.parent);
            redraw = true;
        }
        redraw |= self.view.update(dt_ms);
        redraw |= self.anim.update(dt_ms);
        redraw
    }

    /// Modal: every touch is consumed, whether or not it lands on the card.
    pub fn on_touch(&mut self, point: Vec2, down: bool) -> bool {
        if !self.closing {
            self.view.on_touch(point, down);
        }
        true
    }

    pub fn on_key(&mut self, key: Key) -> bool {
        !self.closing && self.view.on_key(key)
    }

    pub fn on_scroll(&mut self, pointer: Vec2, delta: f32) -> bool {
        !self.closing && self.view.on_scroll(pointer, delta)
    }

    pub fn draw(&self, painter: &mut dyn Painter) {
        let t = self.anim.value();
        if t <= 0.0 {
            return;
        }
        if self.dim {
            let screen = Rect::from_origin_size(Vec2::ZERO, self.parent);
            painter.fill_rect(screen, self.dim_color.fade(t), 0.0);
        }

        let card = self.card();
        let radius = self.roundness();
        painter.push_translate(Vec2::new(0.0, (1.0 - t) * RISE));
        painter.push_layer(t);
        painter.fill_rect(card, self.background, radius);
        painter.stroke_rect(card, self.border, 1.0, radius);
        self.view.draw(painter);
        painter.pop_layer();
        painter.pop_translate();
    }
}
