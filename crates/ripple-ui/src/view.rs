use std::sync::Arc;

use ripple_core::{Key, Painter, Rect, Size, Theme, Vec2};

use crate::container::Container;
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::SizePolicy;

/// One screen: a widget tree with a root container filling the view frame.
///
/// The view owns keyboard focus traversal and remembers the last pointer
/// position so hover-driven widgets can update between touches.
pub struct View {
    name: String,
    tree: WidgetTree,
    root: WidgetId,
    frame: Rect,
    pointer: Option<Vec2>,
    prev_down: bool,
}

impl View {
    pub fn new(theme: Arc<Theme>) -> Self {
        Self::named("view", theme)
    }

    pub fn named(name: impl Into<String>, theme: Arc<Theme>) -> Self {
        let mut tree = WidgetTree::new(theme);
        let root = tree.insert_container(Container::stack());
        if let Some(base) = tree.base_mut(root) {
            base.set_size(SizePolicy::MatchParent, SizePolicy::MatchParent);
        }
        Self::with_root(name, tree, root)
    }

    /// Wraps an existing tree. `root` should be a container in `tree`.
    pub fn with_root(name: impl Into<String>, tree: WidgetTree, root: WidgetId) -> Self {
        Self {
            name: name.into(),
            tree,
            root,
            frame: Rect::ZERO,
            pointer: None,
            prev_down: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn set_frame(&mut self, frame: Rect) {
        if self.frame != frame {
            self.frame = frame;
            self.tree.mark_needs_layout();
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.set_frame(Rect::from_origin_size(self.frame.origin(), size));
    }

    pub fn set_theme(&mut self, theme: Arc<Theme>) {
        self.tree.set_theme(theme);
    }

    pub fn layout(&mut self) {
        self.tree.layout_root(self.root, self.frame);
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.tree.focused_in(self.root)
    }

    pub fn on_touch(&mut self, point: Vec2, down: bool) -> bool {
        self.pointer = Some(point);
        if down && !self.prev_down {
            self.defocus_outside(point);
        }
        self.prev_down = down;
        self.tree.touch(self.root, point, down)
    }

    /// Presses revoke focus from every widget they miss, including ones in
    /// subtrees the dispatch never reaches.
    fn defocus_outside(&mut self, point: Vec2) {
        for id in self.tree.collect_focusable(self.root) {
            let focused = self.tree.base(id).is_some_and(|b| b.is_focused());
            if focused && !self.tree.global_bounds(id).contains(point) {
                self.tree.set_focused(id, false);
            }
        }
    }

    pub fn on_key(&mut self, key: Key) -> bool {
        match key {
            Key::Tab => self.move_focus(true),
            Key::BackTab => self.move_focus(false),
            _ => self.tree.on_key(self.root, key),
        }
    }

    /// Moves focus to the next (or previous) focusable widget, wrapping
    /// around. Returns false when nothing can take focus.
    pub fn move_focus(&mut self, forward: bool) -> bool {
        let order = self.tree.collect_focusable(self.root);
        if order.is_empty() {
            return false;
        }
        let current = order
            .iter()
            .position(|&id| self.tree.base(id).is_some_and(|b| b.is_focused()));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
            (None, true) => 0,
            (None, false) => order.len() - 1,
        };
        if let Some(i) = current {
            self.tree.set_focused(order[i], false);
        }
        log::trace!("focus -> {} {:?}", self.tree.type_name(order[next]), order[next]);
        self.tree.set_focused(order[next], true);
        true
    }

    pub fn on_scroll(&mut self, pointer: Vec2, delta: f32) -> bool {
        self.pointer = Some(pointer);
        self.tree.on_scroll(self.root, pointer, delta)
    }

    /// Lays out if needed, then advances every animation by `dt_ms`.
    /// Returns whether a redraw is needed.
    pub fn update(&mut self, dt_ms: f32) -> bool {
        let mut redraw = false;
        if self.tree.needs_layout() {
            self.layout();
            redraw = true;
        }
        redraw |= self.tree.update(self.root, dt_ms, self.pointer);
        if self.tree.needs_layout() {
            self.layout();
            redraw = true;
        }
        redraw
    }

    pub fn draw(&self, painter: &mut dyn Painter) {
        self.tree.draw(self.root, painter);
        self.tree.draw_focus(self.root, painter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Button, Label};

    fn view_with_buttons(n: usize) -> (View, Vec<WidgetId>) {
        let mut view = View::new(Arc::new(Theme::default()));
        let column = view.tree_mut().insert_container(Container::vertical());
        let root = view.root();
        view.tree_mut().add_child(root, column).unwrap();
        let ids = (0..n)
            .map(|i| {
                let id = view.tree_mut().insert(Button::new(format!("b{i}")));
                view.tree_mut().add_child(column, id).unwrap();
                id
            })
            .collect();
        view.resize(Size::new(300.0, 400.0));
        view.update(0.0);
        (view, ids)
    }

    #[test]
    fn test_tab_cycles_and_wraps() {
        let (mut view, ids) = view_with_buttons(3);
        assert_eq!(view.focused(), None);
        assert!(view.on_key(Key::Tab));
        assert_eq!(view.focused(), Some(ids[0]));
        view.on_key(Key::Tab);
        view.on_key(Key::Tab);
        assert_eq!(view.focused(), Some(ids[2]));
        view.on_key(Key::Tab);
        assert_eq!(view.focused(), Some(ids[0]));
        view.on_key(Key::BackTab);
        assert_eq!(view.focused(), Some(ids[2]));
    }

    #[test]
    fn test_tab_skips_hidden() {
        let (mut view, ids) = view_with_buttons(3);
        view.tree_mut().set_visible(ids[1], false);
        view.on_key(Key::Tab);
        view.on_key(Key::Tab);
        assert_eq!(view.focused(), Some(ids[2]));
    }

    #[test]
    fn test_tab_without_focusables() {
        let mut view = View::new(Arc::new(Theme::default()));
        let label = view.tree_mut().insert(Label::new("static"));
        let root = view.root();
        view.tree_mut().add_child(root, label).unwrap();
        assert!(!view.on_key(Key::Tab));
    }

    #[test]
    fn test_press_outside_drops_focus() {
        let (mut view, ids) = view_with_buttons(2);
        view.on_key(Key::Tab);
        assert_eq!(view.focused(), Some(ids[0]));

        view.on_touch(Vec2::new(290.0, 390.0), true);
        assert_eq!(view.focused(), None);
        view.on_touch(Vec2::new(290.0, 390.0), false);
        assert_eq!(view.focused(), None);
    }

    #[test]
    fn test_first_update_lays_out() {
        let mut view = View::new(Arc::new(Theme::default()));
        view.set_frame(Rect::new(0.0, 0.0, 320.0, 240.0));
        assert!(view.tree().needs_layout());
        assert!(view.update(16.0));
        assert!(!view.tree().needs_layout());
        let root = view.root();
        assert_eq!(view.tree().base(root).unwrap().bounds(), Rect::new(0.0, 0.0, 320.0, 240.0));
    }
}
