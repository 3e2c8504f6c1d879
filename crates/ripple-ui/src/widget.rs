use std::any::Any;

use bitflags::bitflags;
use ripple_core::{
    Animator, COLORS, Color, Easing, Insets, Key, Painter, Rect, Size, Theme, Vec2, WIDGET_PARAMS,
};

/// How a widget sizes itself along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SizePolicy {
    Fixed(f32),
    MatchParent,
    #[default]
    WrapContent,
}

impl SizePolicy {
    pub fn resolve(self, available: f32, content: f32) -> f32 {
        match self {
            SizePolicy::Fixed(v) => v.max(0.0),
            SizePolicy::MatchParent => available.max(0.0),
            SizePolicy::WrapContent => content.max(0.0),
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WidgetState: u8 {
        const HOVERED  = 1 << 0;
        const PRESSED  = 1 << 1;
        const FOCUSED  = 1 << 2;
        const SELECTED = 1 << 3;
        const DISABLED = 1 << 4;
    }
}

/// Focus ring appearance, resolved from the theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusStyle {
    pub thickness: f32,
    pub roundness: f32,
    pub color: Color,
    pub duration_ms: f32,
    pub easing: Easing,
}

impl FocusStyle {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            thickness: theme.float(WIDGET_PARAMS, "Widget.FocusThickness", 12.0),
            roundness: theme.float(WIDGET_PARAMS, "Widget.Roundness", 6.0),
            color: theme.color(COLORS, "Widget.Focus", Color::from_rgb(0, 0, 255)),
            duration_ms: theme.float(WIDGET_PARAMS, "Widget.FocusAnimDuration", 300.0),
            easing: theme.easing(WIDGET_PARAMS, "Widget.FocusAnimEasing", Easing::EaseOutCubic),
        }
    }
}

impl Default for FocusStyle {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Contact {
    prev_down: bool,
    started_inside: bool,
    cancelled: bool,
}

/// State every node carries regardless of its behaviour: geometry, size
/// policy, visibility and the focus state machine.
///
/// `bounds` are layout-space positions assigned by the parent; scroll offsets
/// of ancestors are applied on demand by
/// [`WidgetTree::global_bounds`](crate::WidgetTree::global_bounds).
#[derive(Clone, Debug)]
pub struct WidgetBase {
    bounds: Rect,
    measured: Size,
    width: SizePolicy,
    height: SizePolicy,
    padding: Insets,
    visible: bool,
    focusable: bool,
    show_focus_indicator: bool,
    state: WidgetState,
    focus_anim: Animator<f32>,
    focus_style: FocusStyle,
    contact: Contact,
    layout_index: Option<usize>,
}

impl Default for WidgetBase {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetBase {
    pub fn new() -> Self {
        Self {
            bounds: Rect::ZERO,
            measured: Size::ZERO,
            width: SizePolicy::default(),
            height: SizePolicy::default(),
            padding: Insets::ZERO,
            visible: true,
            focusable: false,
            show_focus_indicator: true,
            state: WidgetState::empty(),
            focus_anim: Animator::new(0.0),
            focus_style: FocusStyle::default(),
            contact: Contact::default(),
            layout_index: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn measured(&self) -> Size {
        self.measured
    }

    pub(crate) fn set_measured(&mut self, size: Size) {
        self.measured = size;
    }

    pub fn width(&self) -> SizePolicy {
        self.width
    }

    pub fn height(&self) -> SizePolicy {
        self.height
    }

    pub fn set_width(&mut self, policy: SizePolicy) {
        self.width = policy;
    }

    pub fn set_height(&mut self, policy: SizePolicy) {
        self.height = policy;
    }

    pub fn set_size(&mut self, width: SizePolicy, height: SizePolicy) {
        self.width = width;
        self.height = height;
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn set_padding(&mut self, padding: Insets) {
        self.padding = padding;
    }

    /// Size for `available` space given the intrinsic `content` size
    /// (padding excluded).
    pub fn resolve_size(&self, available: Size, content: Size) -> Size {
        Size::new(
            self.width
                .resolve(available.width, content.width + self.padding.horizontal()),
            self.height
                .resolve(available.height, content.height + self.padding.vertical()),
        )
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.set_focused(false);
        }
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable;
        if !focusable {
            self.set_focused(false);
        }
    }

    pub fn shows_focus_indicator(&self) -> bool {
        self.show_focus_indicator
    }

    pub fn set_show_focus_indicator(&mut self, show: bool) {
        self.show_focus_indicator = show;
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn set_state(&mut self, flag: WidgetState, on: bool) {
        self.state.set(flag, on);
    }

    pub fn is_focused(&self) -> bool {
        self.state.contains(WidgetState::FOCUSED)
    }

    /// Focus ring progress in `0..=1`.
    pub fn focus_progress(&self) -> f32 {
        self.focus_anim.value()
    }

    pub fn focus_style(&self) -> &FocusStyle {
        &self.focus_style
    }

    pub fn layout_index(&self) -> Option<usize> {
        self.layout_index
    }

    pub(crate) fn set_layout_index(&mut self, index: Option<usize>) {
        self.layout_index = index;
    }

    /// Grants or revokes focus and retargets the ring animation. Returns
    /// whether the flag changed.
    pub fn set_focused(&mut self, focused: bool) -> bool {
        if focused && !self.focusable {
            return false;
        }
        if self.is_focused() == focused {
            return false;
        }
        self.state.set(WidgetState::FOCUSED, focused);
        let target = if focused { 1.0 } else { 0.0 };
        self.focus_anim.set_target(
            target,
            self.focus_style.duration_ms,
            self.focus_style.easing,
        );
        true
    }

    /// Whether `down` starts a new contact for this widget.
    pub fn is_press(&self, down: bool) -> bool {
        down && !self.contact.prev_down
    }

    /// Runs one frame of the focus state machine. `inside` is whether the
    /// pointer is within the global bounds, `down` whether it is held.
    pub fn handle_focus_logic(&mut self, inside: bool, down: bool) {
        let pressed = down && !self.contact.prev_down;
        let released = !down && self.contact.prev_down;

        if pressed {
            self.contact.started_inside = inside;
            self.contact.cancelled = false;
            if !inside {
                self.set_focused(false);
            }
        }

        if released
            && !self.contact.cancelled
            && inside
            && self.contact.started_inside
            && self.focusable
        {
            self.set_focused(true);
        }

        if !down {
            self.contact.started_inside = false;
            self.contact.cancelled = false;
        }
        self.contact.prev_down = down;
    }

    /// Marks the current contact as re-routed by an ancestor. The release
    /// that follows will not grant focus.
    pub fn cancel_gesture(&mut self) {
        self.contact.cancelled = true;
    }

    /// Whether the current contact was pressed inside this widget. Cleared
    /// once the release has been processed.
    pub fn press_started_inside(&self) -> bool {
        self.contact.started_inside
    }

    pub fn is_gesture_cancelled(&self) -> bool {
        self.contact.cancelled
    }

    /// Forgets the current contact. Called once the pointer is released so
    /// widgets that never saw the release still detect the next press.
    pub(crate) fn end_contact(&mut self) {
        self.contact = Contact::default();
    }

    pub(crate) fn apply_theme(&mut self, theme: &Theme) {
        self.focus_style = FocusStyle::from_theme(theme);
    }

    /// Advances base animations by `dt_ms`.
    pub fn update(&mut self, dt_ms: f32) -> bool {
        self.focus_anim.update(dt_ms)
    }

    /// Draws the focus ring around `global`. The ring starts wide and faint
    /// and settles onto the widget edge as focus progress reaches 1.
    pub fn draw_focus_ring(&self, global: Rect, painter: &mut dyn Painter) {
        let t = self.focus_progress();
        if !self.show_focus_indicator || t <= 0.0 {
            return;
        }
        let thickness = self.focus_style.thickness;
        let expansion = thickness * (1.0 - t);
        let stroke = (thickness * (1.0 - t) + 1.0).max(1.0);
        let alpha = (255.0 * t).round().clamp(0.0, 255.0) as u8;
        painter.stroke_rect(
            global.inflate(expansion),
            self.focus_style.color.with_alpha(alpha),
            stroke,
            self.focus_style.roundness,
        );
    }
}

/// Per-frame context handed to [`Widget::update`].
pub struct UpdateCx<'a> {
    pub base: &'a mut WidgetBase,
    /// Global bounds this frame.
    pub bounds: Rect,
    /// Last known pointer position, if the view has seen one.
    pub pointer: Option<Vec2>,
    pub dt_ms: f32,
}

/// Context handed to [`Widget::draw`].
pub struct DrawCx<'a> {
    pub base: &'a WidgetBase,
    /// Global bounds this frame.
    pub bounds: Rect,
}

/// Behaviour of a leaf node. The tree owns the [`WidgetBase`] and passes it
/// to every hook, so implementations hold only their own state.
///
/// Touch hooks receive points local to the widget (origin at the top-left of
/// its global bounds).
pub trait Widget: Any {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Initial focusability, applied when the widget is inserted.
    fn focusable_by_default(&self) -> bool {
        false
    }

    fn apply_theme(&mut self, _theme: &Theme) {}

    fn measure(&mut self, base: &WidgetBase, available: Size) -> Size {
        base.resolve_size(available, Size::ZERO)
    }

    /// Returns whether a redraw is needed.
    fn update(&mut self, _cx: &mut UpdateCx<'_>) -> bool {
        false
    }

    fn draw(&self, _cx: &DrawCx<'_>, _painter: &mut dyn Painter) {}

    fn on_touch_event(&mut self, _base: &mut WidgetBase, _local: Vec2, _down: bool) -> bool {
        false
    }

    fn on_key(&mut self, _base: &mut WidgetBase, _key: Key) -> bool {
        false
    }

    fn on_scroll(&mut self, _base: &mut WidgetBase, _delta: f32) -> bool {
        false
    }

    /// Widgets that scroll on their own take priority over an enclosing
    /// scroll container's drag interception.
    fn is_scrollable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::{Scene, SceneNode};

    fn focusable() -> WidgetBase {
        let mut b = WidgetBase::new();
        b.set_focusable(true);
        b
    }

    #[test]
    fn test_size_policy_resolve() {
        assert_eq!(SizePolicy::Fixed(40.0).resolve(300.0, 10.0), 40.0);
        assert_eq!(SizePolicy::MatchParent.resolve(300.0, 10.0), 300.0);
        assert_eq!(SizePolicy::WrapContent.resolve(300.0, 10.0), 10.0);
    }

    #[test]
    fn test_tap_inside_grants_focus() {
        let mut b = focusable();
        b.handle_focus_logic(true, true);
        assert!(!b.is_focused());
        b.handle_focus_logic(true, false);
        assert!(b.is_focused());
    }

    #[test]
    fn test_press_outside_revokes_immediately() {
        let mut b = focusable();
        b.set_focused(true);
        b.handle_focus_logic(true, false);
        b.handle_focus_logic(false, true);
        assert!(!b.is_focused());
    }

    #[test]
    fn test_drag_out_and_back_without_start_inside() {
        let mut b = focusable();
        b.handle_focus_logic(false, true);
        b.handle_focus_logic(true, true);
        b.handle_focus_logic(true, false);
        assert!(!b.is_focused());
    }

    #[test]
    fn test_cancelled_gesture_does_not_focus() {
        let mut b = focusable();
        b.handle_focus_logic(true, true);
        b.cancel_gesture();
        b.handle_focus_logic(true, false);
        assert!(!b.is_focused());
        assert!(!b.is_gesture_cancelled());

        // The next contact starts clean.
        b.handle_focus_logic(true, true);
        b.handle_focus_logic(true, false);
        assert!(b.is_focused());
    }

    #[test]
    fn test_unfocusable_never_focuses() {
        let mut b = WidgetBase::new();
        b.handle_focus_logic(true, true);
        b.handle_focus_logic(true, false);
        assert!(!b.is_focused());
        assert!(!b.set_focused(true));
    }

    #[test]
    fn test_focus_ring_settles() {
        let mut b = focusable();
        b.set_bounds(Rect::new(10.0, 10.0, 100.0, 40.0));
        b.set_focused(true);

        let mut scene = Scene::new();
        b.draw_focus_ring(b.bounds(), &mut scene);
        assert!(scene.is_empty(), "no ring before any progress");

        for _ in 0..30 {
            b.update(16.0);
        }
        assert_eq!(b.focus_progress(), 1.0);
        b.draw_focus_ring(b.bounds(), &mut scene);
        match &scene.nodes[..] {
            [SceneNode::Border { rect, color, width, radius }] => {
                assert_eq!(*rect, Rect::new(10.0, 10.0, 100.0, 40.0));
                assert_eq!(color.3, 255);
                assert_eq!(*width, 1.0);
                assert_eq!(*radius, 6.0);
            }
            other => panic!("unexpected draw commands {other:?}"),
        }
    }

    #[test]
    fn test_hiding_drops_focus() {
        let mut b = focusable();
        b.set_focused(true);
        b.set_visible(false);
        assert!(!b.is_focused());
    }
}
