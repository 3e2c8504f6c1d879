//! Navigation stack with animated transitions and a modal dialog.
//!
//! [`ViewManager`] owns a stack of [`View`]s. Pushes and pops requested while
//! a transition is animating are queued and replayed in submission order as
//! soon as it finishes, so the final stack is the same as if every request had
//! been applied instantly. The stack never becomes empty.

pub mod dialog;
pub mod transition;

use std::collections::VecDeque;
use std::sync::Arc;

use ripple_core::{Animator, COLORS, Color, Easing, Key, Painter, Rect, Size, Theme, Vec2};
use ripple_ui::View;

pub use dialog::Dialog;
pub use transition::{LayerFrame, Transition, TransitionDir, TransitionFrame, frame};

/// Theme section holding the transition defaults.
pub const VIEW_MANAGER: &str = "ViewManager";

enum NavOp {
    Push(View, Transition),
    Pop(Transition),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Active {
    kind: Transition,
    dir: TransitionDir,
}

pub struct ViewManager {
    theme: Arc<Theme>,
    size: Size,
    stack: Vec<View>,
    /// View removed by an animating pop, kept until the transition ends.
    outgoing: Option<View>,
    pending: VecDeque<NavOp>,
    anim: Animator<f32>,
    active: Option<Active>,
    dialog: Option<Dialog>,
}

impl ViewManager {
    pub fn new(root: View, theme: Arc<Theme>) -> Self {
        Self {
            theme,
            size: Size::ZERO,
            stack: vec![root],
            outgoing: None,
            pending: VecDeque::new(),
            anim: Animator::new(0.0),
            active: None,
            dialog: None,
        }
    }

    pub fn theme(&self) -> &Arc<Theme> {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Arc<Theme>) {
        self.theme = theme;
        for view in self.stack.iter_mut().chain(self.outgoing.as_mut()) {
            view.set_theme(self.theme.clone());
        }
        if let Some(d) = self.dialog.as_mut() {
            d.set_theme(self.theme.clone());
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
        let frame = Rect::from_origin_size(Vec2::ZERO, size);
        for view in self.stack.iter_mut().chain(self.outgoing.as_mut()) {
            view.set_frame(frame);
        }
        for op in self.pending.iter_mut() {
            if let NavOp::Push(view, _) = op {
                view.set_frame(frame);
            }
        }
        if let Some(d) = self.dialog.as_mut() {
            d.layout_in(size);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Kind and direction of the running transition.
    pub fn transition(&self) -> Option<(Transition, TransitionDir)> {
        self.active.map(|a| (a.kind, a.dir))
    }

    /// Progress of the running transition, 1 when idle.
    pub fn progress(&self) -> f32 {
        if self.active.is_some() { self.anim.value() } else { 1.0 }
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// View names bottom to top.
    pub fn view_names(&self) -> Vec<&str> {
        self.stack.iter().map(View::name).collect()
    }

    pub fn top(&self) -> Option<&View> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut View> {
        self.stack.last_mut()
    }

    pub fn push(&mut self, view: View, transition: Transition) {
        if self.is_animating() {
            log::debug!("queueing push of `{}` behind running transition", view.name());
            self.pending.push_back(NavOp::Push(view, transition));
        } else {
            self.apply_push(view, transition);
        }
    }

    /// Requests a pop. Returns false, leaving everything unchanged, when the
    /// pop would empty the stack once queued requests are applied.
    pub fn pop(&mut self, transition: Transition) -> bool {
        let (pushes, pops) = self.pending.iter().fold((0, 0), |(pu, po), op| match op {
            NavOp::Push(..) => (pu + 1, po),
            NavOp::Pop(_) => (pu, po + 1),
        });
        if (self.stack.len() + pushes).saturating_sub(pops) <= 1 {
            log::warn!("pop rejected: the navigation stack would be empty");
            return false;
        }
        if self.is_animating() {
            log::debug!("queueing pop behind running transition");
            self.pending.push_back(NavOp::Pop(transition));
        } else {
            self.apply_pop(transition);
        }
        true
    }

    fn resolve(&self, transition: Transition) -> Transition {
        match transition {
            Transition::ThemeDefault => {
                match self.theme.named(VIEW_MANAGER, "Transition", Transition::PushLeft) {
                    Transition::ThemeDefault => Transition::PushLeft,
                    t => t,
                }
            }
            t => t,
        }
    }

    fn start(&mut self, kind: Transition, dir: TransitionDir) {
        let duration = self.theme.float(VIEW_MANAGER, "TransitionDuration", 500.0);
        let easing = self.theme.easing(VIEW_MANAGER, "TransitionEasing", Easing::EaseOutCubic);
        self.anim.snap_to(0.0);
        self.anim.set_target(1.0, duration, easing);
        self.active = Some(Active { kind, dir });
    }

    fn apply_push(&mut self, mut view: View, transition: Transition) {
        view.set_frame(Rect::from_origin_size(Vec2::ZERO, self.size));
        let kind = self.resolve(transition);
        log::info!("push `{}` ({kind})", view.name());
        self.stack.push(view);
        if kind != Transition::None && self.stack.len() > 1 {
            self.start(kind, TransitionDir::Push);
        }
    }

    fn apply_pop(&mut self, transition: Transition) {
        if self.stack.len() <= 1 {
            log::warn!("pop ignored on a single-view stack");
            return;
        }
        let Some(view) = self.stack.pop() else {
            return;
        };
        let kind = self.resolve(transition);
        log::info!("pop `{}` ({kind})", view.name());
        if kind != Transition::None {
            self.outgoing = Some(view);
            self.start(kind, TransitionDir::Pop);
        }
    }

    fn finish_transition(&mut self) {
        self.active = None;
        self.outgoing = None;
        while !self.is_animating()
            && let Some(op) = self.pending.pop_front()
        {
            match op {
                NavOp::Push(view, t) => self.apply_push(view, t),
                NavOp::Pop(t) => self.apply_pop(t),
            }
        }
    }

    /// Opens `dialog` above the stack, replacing any dialog already shown.
    pub fn show_dialog(&mut self, mut dialog: Dialog) {
        self.dismiss_dialog();
        dialog.layout_in(self.size);
        dialog.open();
        log::info!("dialog opened");
        self.dialog = Some(dialog);
    }

    /// Removes the dialog immediately, firing its dismiss callback.
    pub fn dismiss_dialog(&mut self) {
        if let Some(d) = self.dialog.take() {
            log::info!("dialog dismissed");
            d.dismissed();
        }
    }

    /// Animates the dialog out; it is dismissed when the animation ends.
    pub fn close_dialog(&mut self) {
        if let Some(d) = self.dialog.as_mut() {
            d.close();
        }
    }

    pub fn has_dialog(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialog.as_mut()
    }

    /// Advances transitions, the active view and the dialog by `dt_ms`.
    /// Returns whether a redraw is needed.
    pub fn update(&mut self, dt_ms: f32) -> bool {
        let mut redraw = false;
        if self.is_animating() {
            redraw |= self.anim.update(dt_ms);
            if !self.anim.is_running() {
                self.finish_transition();
                redraw = true;
            }
        }

        if let Some(top) = self.stack.last_mut() {
            redraw |= top.update(dt_ms);
        }
        if let Some(out) = self.outgoing.as_mut() {
            redraw |= out.update(dt_ms);
        }

        if let Some(d) = self.dialog.as_mut() {
            redraw |= d.update(dt_ms);
            if d.is_finished() {
                self.dismiss_dialog();
                redraw = true;
            }
        }
        redraw
    }

    /// Touch goes to the dialog when one is shown, otherwise to the view that
    /// is (or is becoming) the top of the stack.
    pub fn on_touch(&mut self, point: Vec2, down: bool) -> bool {
        if let Some(d) = self.dialog.as_mut() {
            return d.on_touch(point, down);
        }
        self.stack
            .last_mut()
            .is_some_and(|v| v.on_touch(point, down))
    }

    /// Back and Escape close the dialog or pop the stack; other keys are
    /// routed like touch.
    pub fn on_key(&mut self, key: Key) -> bool {
        if matches!(key, Key::Back | Key::Escape) {
            if let Some(d) = self.dialog.as_mut() {
                d.close();
                return true;
            }
            return self.pop(Transition::ThemeDefault);
        }
        if let Some(d) = self.dialog.as_mut() {
            return d.on_key(key);
        }
        self.stack.last_mut().is_some_and(|v| v.on_key(key))
    }

    pub fn on_scroll(&mut self, pointer: Vec2, delta: f32) -> bool {
        if let Some(d) = self.dialog.as_mut() {
            return d.on_scroll(pointer, delta);
        }
        self.stack
            .last_mut()
            .is_some_and(|v| v.on_scroll(pointer, delta))
    }

    fn scrim_color(&self) -> Color {
        self.theme
            .color(COLORS, "ViewManager.Scrim", Color::from_rgba(0, 0, 0, 160))
    }

    fn draw_layer(view: &View, layer: LayerFrame, painter: &mut dyn Painter) {
        if layer.alpha <= 0.0 {
            return;
        }
        painter.push_translate(layer.offset);
        let faded = layer.alpha < 1.0;
        if faded {
            painter.push_layer(layer.alpha);
        }
        view.draw(painter);
        if faded {
            painter.pop_layer();
        }
        painter.pop_translate();
    }

    /// Paints the stack (blending both views while a transition runs), then
    /// the dialog.
    pub fn draw(&self, painter: &mut dyn Painter) {
        let Some(top) = self.stack.last() else {
            return;
        };

        let blend = self.active.and_then(|a| {
            let outgoing = match a.dir {
                TransitionDir::Push => self.stack.len().checked_sub(2).map(|i| &self.stack[i]),
                TransitionDir::Pop => self.outgoing.as_ref(),
            };
            outgoing.map(|out| (a, out))
        });

        match blend {
            Some((a, outgoing)) => {
                let f = transition::frame(a.kind, a.dir, self.anim.value(), self.size);
                let screen = Rect::from_origin_size(Vec2::ZERO, self.size);
                let scrim = self.scrim_color().fade(f.scrim);
                let (lower, lower_frame, upper, upper_frame) = if f.incoming_on_top {
                    (outgoing, f.outgoing, top, f.incoming)
                } else {
                    (top, f.incoming, outgoing, f.outgoing)
                };
                Self::draw_layer(lower, lower_frame, painter);
                if scrim.3 > 0 {
                    painter.fill_rect(screen, scrim, 0.0);
                }
                Self::draw_layer(upper, upper_frame, painter);
            }
            None => top.draw(painter),
        }

        if let Some(d) = self.dialog.as_ref() {
            d.draw(painter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::Scene;
    use ripple_ui::{Button, Label};
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME_MS: f32 = 16.0;

    fn theme() -> Arc<Theme> {
        Arc::new(Theme::default())
    }

    fn view(name: &str) -> View {
        let mut v = View::named(name, theme());
        let label = v.tree_mut().insert(Label::new(name));
        let root = v.root();
        v.tree_mut().add_child(root, label).unwrap();
        v
    }

    fn manager() -> ViewManager {
        let mut m = ViewManager::new(view("V1"), theme());
        m.resize(Size::new(400.0, 800.0));
        m
    }

    fn settle(m: &mut ViewManager) {
        for _ in 0..200 {
            m.update(FRAME_MS);
        }
    }

    #[test]
    fn test_push_animates_then_settles() {
        let mut m = manager();
        m.push(view("V2"), Transition::ThemeDefault);
        assert!(m.is_animating());
        assert_eq!(m.transition(), Some((Transition::PushLeft, TransitionDir::Push)));
        assert_eq!(m.view_names(), ["V1", "V2"]);

        settle(&mut m);
        assert!(!m.is_animating());
        assert_eq!(m.progress(), 1.0);
    }

    #[test]
    fn test_push_during_transition_is_deferred() {
        let mut m = manager();
        m.push(view("V2"), Transition::ThemeDefault);
        m.update(FRAME_MS);
        m.push(view("V3"), Transition::ThemeDefault);
        assert_eq!(m.pending_len(), 1);
        assert_eq!(m.view_names(), ["V1", "V2"]);

        while m.pending_len() > 0 {
            m.update(FRAME_MS);
        }
        // V2's transition ended and V3's started on the same frame.
        assert!(m.is_animating());
        assert_eq!(m.view_names(), ["V1", "V2", "V3"]);

        settle(&mut m);
        assert!(!m.is_animating());
        assert_eq!(m.view_names(), ["V1", "V2", "V3"]);
    }

    #[test]
    fn test_pop_on_single_view_is_ignored() {
        let mut m = manager();
        assert!(!m.pop(Transition::ThemeDefault));
        assert!(!m.pop(Transition::None));
        assert_eq!(m.stack_len(), 1);
        assert!(!m.is_animating());
    }

    #[test]
    fn test_queued_pops_respect_floor() {
        let mut m = manager();
        m.push(view("V2"), Transition::SlideLeft);
        assert!(m.pop(Transition::SlideLeft));
        assert!(!m.pop(Transition::SlideLeft));
        assert_eq!(m.pending_len(), 1);

        settle(&mut m);
        assert_eq!(m.view_names(), ["V1"]);
    }

    #[test]
    fn test_queue_replay_matches_instant_application() {
        let mut animated = manager();
        animated.push(view("A"), Transition::PushLeft);
        animated.push(view("B"), Transition::PushRight);
        animated.pop(Transition::MaterialUFade);
        animated.push(view("C"), Transition::PushBottom);
        assert_eq!(animated.pending_len(), 3);
        settle(&mut animated);

        let mut instant = manager();
        instant.push(view("A"), Transition::None);
        instant.push(view("B"), Transition::None);
        instant.pop(Transition::None);
        instant.push(view("C"), Transition::None);
        assert!(!instant.is_animating());

        assert_eq!(animated.view_names(), instant.view_names());
        assert_eq!(animated.view_names(), ["V1", "A", "C"]);
    }

    #[test]
    fn test_theme_picks_default_transition() {
        let theme = Theme::default()
            .with(VIEW_MANAGER, "Transition", "SlideRight")
            .with(VIEW_MANAGER, "TransitionDuration", 100);
        let mut m = ViewManager::new(view("V1"), Arc::new(theme));
        m.push(view("V2"), Transition::ThemeDefault);
        assert_eq!(m.transition(), Some((Transition::SlideRight, TransitionDir::Push)));
        for _ in 0..7 {
            m.update(FRAME_MS);
        }
        assert!(!m.is_animating());
    }

    #[test]
    fn test_back_key_pops() {
        let mut m = manager();
        m.push(view("V2"), Transition::None);
        assert!(m.on_key(Key::Back));
        assert!(m.is_animating());
        assert_eq!(m.view_names(), ["V1"]);
        settle(&mut m);
        assert!(!m.on_key(Key::Escape));
    }

    #[test]
    fn test_input_goes_to_new_top_during_transition() {
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        let mut v2 = View::named("V2", theme());
        let ok = v2.tree_mut().insert(Button::new("ok").on_click(move || c.set(c.get() + 1)));
        let root = v2.root();
        v2.tree_mut().add_child(root, ok).unwrap();

        let mut m = manager();
        m.push(v2, Transition::PushLeft);
        m.update(FRAME_MS);
        assert!(m.is_animating());

        m.on_touch(Vec2::new(5.0, 5.0), true);
        m.on_touch(Vec2::new(5.0, 5.0), false);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_dialog_is_modal_and_dismissed_after_close() {
        let dismissed = Rc::new(Cell::new(0));
        let d = dismissed.clone();
        let mut m = manager();
        m.show_dialog(Dialog::new(theme()).on_dismiss(move || d.set(d.get() + 1)));
        assert!(m.has_dialog());

        assert!(m.on_touch(Vec2::new(5.0, 5.0), true));
        m.on_touch(Vec2::new(5.0, 5.0), false);

        assert!(m.on_key(Key::Escape));
        assert!(m.dialog().unwrap().is_closing());
        settle(&mut m);
        assert!(!m.has_dialog());
        assert_eq!(dismissed.get(), 1);
        assert_eq!(m.stack_len(), 1);
    }

    #[test]
    fn test_dismiss_dialog_is_immediate() {
        let dismissed = Rc::new(Cell::new(false));
        let d = dismissed.clone();
        let mut m = manager();
        m.show_dialog(Dialog::new(theme()).on_dismiss(move || d.set(true)));
        m.dismiss_dialog();
        assert!(!m.has_dialog());
        assert!(dismissed.get());
    }

    #[test]
    fn test_draw_blends_both_views_mid_transition() {
        let mut m = manager();
        m.update(FRAME_MS);
        m.push(view("V2"), Transition::PushLeft);
        m.update(100.0);

        let mut scene = Scene::new();
        m.draw(&mut scene);
        let texts: Vec<&str> = scene.texts().collect();
        assert_eq!(texts, ["V1", "V2"]);
        assert!(scene.is_balanced());

        settle(&mut m);
        scene.clear();
        m.draw(&mut scene);
        assert_eq!(scene.texts().collect::<Vec<_>>(), ["V2"]);
    }

    #[test]
    fn test_resize_reaches_every_view() {
        let mut m = manager();
        m.push(view("V2"), Transition::None);
        m.resize(Size::new(320.0, 480.0));
        assert_eq!(m.top().unwrap().frame(), Rect::new(0.0, 0.0, 320.0, 480.0));
        assert_eq!(m.stack[0].frame(), Rect::new(0.0, 0.0, 320.0, 480.0));
    }
}
