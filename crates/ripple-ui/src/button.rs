//! Push button with an animated background.
//!
//! The background colour follows the interaction state through an
//! `Animator<Color>`: resting, hovered or pressed. A click fires on a release
//! inside the button, and only for a contact whose press edge landed on the
//! button. Sliding onto it from elsewhere never arms it. A contact that an
//! ancestor cancelled ends with a synthetic release outside, so it never
//! clicks.

use ripple_core::{
    Animator, COLORS, Color, Easing, Key, Painter, Size, Theme, Vec2, WIDGET_PARAMS,
};

use crate::label::{DEFAULT_TEXT_SIZE, estimate_text_size};
use crate::widget::{DrawCx, UpdateCx, Widget, WidgetBase, WidgetState};

#[derive(Clone, Copy, Debug, PartialEq)]
struct ButtonColors {
    background: Color,
    hover: Color,
    pressed: Color,
    text: Color,
}

impl ButtonColors {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            background: theme.color(COLORS, "Button.Background", Color::gray(100)),
            hover: theme.color(COLORS, "Button.Hover", Color::gray(150)),
            pressed: theme.color(COLORS, "Button.Pressed", Color::gray(100)),
            text: theme.color(COLORS, "Button.Text", Color::gray(255)),
        }
    }
}

pub struct Button {
    label: String,
    on_click: Option<Box<dyn FnMut()>>,
    colors: ButtonColors,
    roundness: f32,
    anim_ms: f32,
    bg: Animator<Color>,
    pressed: bool,
    hovered: bool,
    /// Set while the current contact began on this button.
    armed: bool,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        let colors = ButtonColors::from_theme(&Theme::default());
        Self {
            label: label.into(),
            on_click: None,
            colors,
            roundness: 6.0,
            anim_ms: 200.0,
            bg: Animator::new(colors.background),
            pressed: false,
            hovered: false,
            armed: false,
        }
    }

    pub fn on_click(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn background(&self) -> Color {
        self.bg.value()
    }

    fn resting_color(&self) -> Color {
        if self.pressed {
            self.colors.pressed
        } else if self.hovered {
            self.colors.hover
        } else {
            self.colors.background
        }
    }

    fn click(&mut self) {
        if let Some(f) = self.on_click.as_mut() {
            f();
        }
    }

    fn sync_state(&self, base: &mut WidgetBase) {
        base.set_state(WidgetState::PRESSED, self.pressed);
        base.set_state(WidgetState::HOVERED, self.hovered);
    }
}

impl Widget for Button {
    fn type_name(&self) -> &'static str {
        "Button"
    }

    fn focusable_by_default(&self) -> bool {
        true
    }

    fn apply_theme(&mut self, theme: &Theme) {
        self.colors = ButtonColors::from_theme(theme);
        self.roundness = theme.float(WIDGET_PARAMS, "Widget.Roundness", 6.0);
        self.anim_ms = theme.float(WIDGET_PARAMS, "Button.AnimDuration", 200.0);
        self.bg.snap_to(self.resting_color());
    }

    fn measure(&mut self, base: &WidgetBase, available: Size) -> Size {
        let text = estimate_text_size(&self.label, DEFAULT_TEXT_SIZE);
        base.resolve_size(available, Size::new(text.width + 20.0, text.height + 10.0))
    }

    fn update(&mut self, cx: &mut UpdateCx<'_>) -> bool {
        let hovered = cx.pointer.is_some_and(|p| cx.bounds.contains(p));
        let mut changed = false;
        if hovered != self.hovered && !self.pressed {
            self.hovered = hovered;
            self.bg
                .set_target(self.resting_color(), self.anim_ms, Easing::EaseOutQuad);
            self.sync_state(cx.base);
            changed = true;
        }
        self.bg.update(cx.dt_ms) || changed
    }

    fn draw(&self, cx: &DrawCx<'_>, painter: &mut dyn Painter) {
        let b = cx.bounds;
        painter.fill_rect(b, self.bg.value(), self.roundness);
        painter.stroke_rect(b, self.colors.text, 1.0, self.roundness);

        let text = estimate_text_size(&self.label, DEFAULT_TEXT_SIZE);
        let mut rect = b.deflate(ripple_core::Insets::symmetric(10.0, 0.0));
        rect.y = b.y + (b.h - text.height) / 2.0;
        rect.h = text.height;
        if self.pressed {
            rect.y += 1.0;
        }
        painter.draw_text(rect, &self.label, self.colors.text, DEFAULT_TEXT_SIZE);
    }

    fn on_touch_event(&mut self, base: &mut WidgetBase, local: Vec2, down: bool) -> bool {
        let size = base.bounds().size();
        let inside =
            local.x >= 0.0 && local.y >= 0.0 && local.x <= size.width && local.y <= size.height;
        let was_pressed = self.pressed;
        let was_hovered = self.hovered;
        if down {
            self.armed = base.press_started_inside();
        }

        self.hovered = inside;
        self.pressed = inside && down && self.armed;

        if was_pressed && self.armed && inside && !down {
            log::debug!("button `{}` clicked", self.label);
            self.click();
        }
        if !down {
            self.armed = false;
        }

        if was_pressed != self.pressed || was_hovered != self.hovered {
            self.bg
                .set_target(self.resting_color(), self.anim_ms, Easing::EaseOutQuad);
            self.sync_state(base);
        }
        true
    }

    fn on_key(&mut self, base: &mut WidgetBase, key: Key) -> bool {
        if !base.is_focused() || !matches!(key, Key::Enter | Key::Space) {
            return false;
        }
        self.click();
        self.bg.snap_to(self.colors.pressed);
        self.bg.set_target(self.colors.hover, 300.0, Easing::EaseOutQuad);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::Rect;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counted() -> (Button, Rc<Cell<u32>>) {
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        (Button::new("ok").on_click(move || c.set(c.get() + 1)), clicks)
    }

    fn base() -> WidgetBase {
        let mut b = WidgetBase::new();
        b.set_bounds(Rect::new(0.0, 0.0, 100.0, 40.0));
        b.set_focusable(true);
        b
    }

    /// Runs the base contact bookkeeping before the hook, as the tree does.
    fn touch(button: &mut Button, base: &mut WidgetBase, x: f32, y: f32, down: bool) {
        let inside = base.bounds().contains(Vec2::new(x, y));
        base.handle_focus_logic(inside, down);
        button.on_touch_event(base, Vec2::new(x, y), down);
    }

    #[test]
    fn test_press_release_inside_clicks() {
        let (mut button, clicks) = counted();
        let mut base = base();
        touch(&mut button, &mut base, 10.0, 10.0, true);
        assert!(button.is_pressed());
        assert!(base.state().contains(WidgetState::PRESSED));
        touch(&mut button, &mut base, 12.0, 10.0, false);
        assert_eq!(clicks.get(), 1);
        assert!(!button.is_pressed());
    }

    #[test]
    fn test_release_outside_does_not_click() {
        let (mut button, clicks) = counted();
        let mut base = base();
        touch(&mut button, &mut base, 10.0, 10.0, true);
        touch(&mut button, &mut base, -10_000.0, -10_000.0, false);
        assert_eq!(clicks.get(), 0);
        assert!(!button.is_pressed());
        assert!(!button.is_hovered());
    }

    #[test]
    fn test_sliding_onto_button_does_not_click() {
        let (mut button, clicks) = counted();
        let mut base = base();
        touch(&mut button, &mut base, 300.0, 300.0, true);
        touch(&mut button, &mut base, 10.0, 10.0, true);
        assert!(button.is_hovered());
        assert!(!button.is_pressed());
        touch(&mut button, &mut base, 10.0, 10.0, false);
        assert_eq!(clicks.get(), 0);

        // A fresh press on the button still works.
        touch(&mut button, &mut base, 10.0, 10.0, true);
        touch(&mut button, &mut base, 10.0, 10.0, false);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_enter_activates_only_when_focused() {
        let (mut button, clicks) = counted();
        let mut base = base();
        assert!(!button.on_key(&mut base, Key::Enter));
        base.set_focused(true);
        assert!(button.on_key(&mut base, Key::Enter));
        assert!(button.on_key(&mut base, Key::Space));
        assert!(!button.on_key(&mut base, Key::Up));
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn test_hover_animates_background() {
        let mut button = Button::new("hover");
        let mut base = base();
        let mut cx = UpdateCx {
            base: &mut base,
            bounds: Rect::new(0.0, 0.0, 100.0, 40.0),
            pointer: Some(Vec2::new(5.0, 5.0)),
            dt_ms: 100.0,
        };
        assert!(button.update(&mut cx));
        cx.dt_ms = 200.0;
        button.update(&mut cx);
        assert!(button.is_hovered());
        assert_eq!(button.background(), Color::gray(150));
    }
}
