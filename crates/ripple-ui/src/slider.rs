//! Horizontal slider holding a value in `0.0..=1.0`.
//!
//! A press on the track or the handle starts a drag. While the contact lasts
//! the slider keeps following the pointer, even once it leaves the bounds,
//! because the enclosing container has captured the slider. A horizontal
//! swipe is therefore never taken over by a vertical scroll container.

use ripple_core::{COLORS, Color, Key, Painter, Rect, Size, Theme, Vec2, WIDGET_PARAMS};

use crate::widget::{DrawCx, Widget, WidgetBase, WidgetState};

const HANDLE_SIZE: f32 = 16.0;
const TRACK_HEIGHT: f32 = 4.0;
/// Value change per arrow key.
const KEY_STEP: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
struct SliderColors {
    track: Color,
    active: Color,
    handle: Color,
}

impl SliderColors {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            track: theme.color(COLORS, "Slider.Track", Color::gray(90)),
            active: theme.color(COLORS, "Slider.Active", Color::gray(90)),
            handle: theme.color(COLORS, "Slider.Handle", Color::WHITE),
        }
    }
}

pub struct Slider {
    value: f32,
    on_change: Option<Box<dyn FnMut(f32)>>,
    colors: SliderColors,
    roundness: f32,
    dragging: bool,
}

impl Slider {
    pub fn new(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            on_change: None,
            colors: SliderColors::from_theme(&Theme::default()),
            roundness: 6.0,
            dragging: false,
        }
    }

    pub fn on_change(mut self, f: impl FnMut(f32) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Clamps into `0.0..=1.0`. The change callback only runs when the value
    /// actually moves.
    pub fn set_value(&mut self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        if value == self.value {
            return;
        }
        self.value = value;
        if let Some(f) = self.on_change.as_mut() {
            f(value);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Horizontal travel of the handle's centre.
    fn travel(width: f32) -> f32 {
        width - HANDLE_SIZE
    }

    fn value_at(width: f32, x: f32) -> f32 {
        let travel = Self::travel(width);
        if travel > 0.0 {
            (x - HANDLE_SIZE / 2.0) / travel
        } else {
            0.0
        }
    }

    fn handle_rect(&self, bounds: Rect) -> Rect {
        let cx = bounds.x + HANDLE_SIZE / 2.0 + Self::travel(bounds.w).max(0.0) * self.value;
        let cy = bounds.y + bounds.h / 2.0;
        Rect::new(
            cx - HANDLE_SIZE / 2.0,
            cy - HANDLE_SIZE / 2.0,
            HANDLE_SIZE,
            HANDLE_SIZE,
        )
    }
}

impl Widget for Slider {
    fn type_name(&self) -> &'static str {
        "Slider"
    }

    fn focusable_by_default(&self) -> bool {
        true
    }

    fn apply_theme(&mut self, theme: &Theme) {
        self.colors = SliderColors::from_theme(theme);
        self.roundness = theme.float(WIDGET_PARAMS, "Widget.Roundness", 6.0);
    }

    fn measure(&mut self, base: &WidgetBase, available: Size) -> Size {
        base.resolve_size(available, Size::new(150.0, 40.0))
    }

    fn draw(&self, cx: &DrawCx<'_>, painter: &mut dyn Painter) {
        let b = cx.bounds;
        let track = Rect::new(b.x, b.y + (b.h - TRACK_HEIGHT) / 2.0, b.w, TRACK_HEIGHT);
        let radius = self.roundness.min(TRACK_HEIGHT / 2.0);
        painter.fill_rect(track, self.colors.track, radius);

        let handle = self.handle_rect(b);
        if self.value > 0.0 {
            let mut fill = track;
            fill.w = handle.x + HANDLE_SIZE / 2.0 - b.x;
            painter.fill_rect(fill, self.colors.active, radius);
        }
        painter.fill_rect(handle, self.colors.handle, HANDLE_SIZE / 2.0);
        if self.dragging {
            painter.stroke_rect(handle, self.colors.active, 2.0, HANDLE_SIZE / 2.0);
        }
    }

    fn on_touch_event(&mut self, base: &mut WidgetBase, local: Vec2, down: bool) -> bool {
        let size = base.bounds().size();
        let inside =
            local.x >= 0.0 && local.y >= 0.0 && local.x < size.width && local.y < size.height;

        if down && !self.dragging {
            self.dragging = inside && base.press_started_inside();
            if self.dragging {
                log::trace!("slider drag started at {:.1}", local.x);
            }
        } else if !down {
            self.dragging = false;
        }
        base.set_state(WidgetState::PRESSED, self.dragging);

        if self.dragging {
            self.set_value(Self::value_at(size.width, local.x));
            return true;
        }
        down && inside
    }

    fn on_key(&mut self, base: &mut WidgetBase, key: Key) -> bool {
        if !base.is_focused() {
            return false;
        }
        match key {
            Key::Left => self.set_value(self.value - KEY_STEP),
            Key::Right => self.set_value(self.value + KEY_STEP),
            Key::Home => self.set_value(0.0),
            Key::End => self.set_value(1.0),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::GesturePhase;
    use crate::widget::SizePolicy;
    use crate::{Container, Label, WidgetId, WidgetTree};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn base() -> WidgetBase {
        let mut b = WidgetBase::new();
        b.set_bounds(Rect::new(0.0, 0.0, 150.0, 40.0));
        b.set_focusable(true);
        b
    }

    fn touch(slider: &mut Slider, base: &mut WidgetBase, x: f32, y: f32, down: bool) -> bool {
        let inside = base.bounds().contains(Vec2::new(x, y));
        base.handle_focus_logic(inside, down);
        slider.on_touch_event(base, Vec2::new(x, y), down)
    }

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn test_press_on_track_jumps_to_pointer() {
        let mut slider = Slider::new(0.0);
        let mut base = base();
        assert!(touch(&mut slider, &mut base, 41.5, 20.0, true));
        assert!(slider.is_dragging());
        assert!(base.state().contains(WidgetState::PRESSED));
        assert_near(slider.value(), 0.25);

        touch(&mut slider, &mut base, 41.5, 20.0, false);
        assert!(!slider.is_dragging());
        assert_near(slider.value(), 0.25);
    }

    #[test]
    fn test_drag_keeps_tracking_outside_bounds() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = changes.clone();
        let mut slider = Slider::new(0.5).on_change(move |v| c.borrow_mut().push(v));
        let mut base = base();

        touch(&mut slider, &mut base, 75.0, 20.0, true);
        assert!(touch(&mut slider, &mut base, 500.0, 90.0, true));
        assert_eq!(slider.value(), 1.0);
        assert!(touch(&mut slider, &mut base, -40.0, -5.0, true));
        assert_eq!(slider.value(), 0.0);

        assert!(!touch(&mut slider, &mut base, -40.0, -5.0, false));
        assert_eq!(*changes.borrow(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_press_outside_or_sliding_in_does_not_drag() {
        let mut slider = Slider::new(0.5);
        let mut base = base();
        assert!(!touch(&mut slider, &mut base, 300.0, 20.0, true));
        touch(&mut slider, &mut base, 20.0, 20.0, true);
        assert!(!slider.is_dragging());
        assert_eq!(slider.value(), 0.5);
        touch(&mut slider, &mut base, 20.0, 20.0, false);
    }

    #[test]
    fn test_arrow_keys_step_when_focused() {
        let mut slider = Slider::new(0.5);
        let mut base = base();
        assert!(!slider.on_key(&mut base, Key::Right));
        base.set_focused(true);
        assert!(slider.on_key(&mut base, Key::Right));
        assert_near(slider.value(), 0.55);
        assert!(slider.on_key(&mut base, Key::Home));
        assert_eq!(slider.value(), 0.0);
        assert!(slider.on_key(&mut base, Key::Left));
        assert_eq!(slider.value(), 0.0);
        assert!(!slider.on_key(&mut base, Key::Up));
    }

    /// A scrolling 200x300 column with a 150x40 slider at the top.
    fn slider_in_column(value: f32) -> (WidgetTree, WidgetId, WidgetId) {
        let mut tree = WidgetTree::default();
        let column = tree.insert_container(Container::vertical());
        let slider = tree.insert(Slider::new(value));
        tree.base_mut(slider)
            .unwrap()
            .set_size(SizePolicy::Fixed(150.0), SizePolicy::Fixed(40.0));
        tree.add_child(column, slider).unwrap();
        for i in 0..5 {
            let id = tree.insert(Label::new(format!("filler {i}")));
            tree.base_mut(id).unwrap().set_height(SizePolicy::Fixed(100.0));
            tree.add_child(column, id).unwrap();
        }
        tree.layout_root(column, Rect::new(0.0, 0.0, 200.0, 300.0));
        (tree, column, slider)
    }

    #[test]
    fn test_horizontal_drag_in_scroll_column_stays_with_slider() {
        let (mut tree, column, slider) = slider_in_column(0.0);
        tree.touch(column, Vec2::new(41.5, 20.0), true);
        assert_eq!(tree.captured(column), Some(slider));

        tree.touch(column, Vec2::new(108.5, 22.0), true);
        assert_eq!(tree.scroller(column).unwrap().phase(), GesturePhase::Rejected);
        assert_near(tree.widget::<Slider>(slider).unwrap().value(), 0.75);

        tree.touch(column, Vec2::new(400.0, 60.0), true);
        assert_eq!(tree.captured(column), Some(slider));
        assert_eq!(tree.widget::<Slider>(slider).unwrap().value(), 1.0);
        assert_eq!(tree.content_scroll_offset(column), 0.0);

        tree.touch(column, Vec2::new(400.0, 60.0), false);
        assert_eq!(tree.captured(column), None);
        assert!(!tree.widget::<Slider>(slider).unwrap().is_dragging());
        assert_eq!(tree.widget::<Slider>(slider).unwrap().value(), 1.0);
    }

    #[test]
    fn test_vertical_drag_from_slider_scrolls_instead() {
        let (mut tree, column, slider) = slider_in_column(0.0);
        tree.touch(column, Vec2::new(41.5, 20.0), true);
        tree.touch(column, Vec2::new(41.5, 40.0), true);
        assert_eq!(tree.scroller(column).unwrap().phase(), GesturePhase::Intercepted);
        assert!(!tree.widget::<Slider>(slider).unwrap().is_dragging());

        tree.touch(column, Vec2::new(90.0, 10.0), true);
        assert_eq!(tree.content_scroll_offset(column), -10.0);
        assert_near(tree.widget::<Slider>(slider).unwrap().value(), 0.25);
        tree.touch(column, Vec2::new(90.0, 10.0), false);
    }
}
