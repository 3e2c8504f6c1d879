//! # Event dispatch
//!
//! Touch is level-triggered: the platform reports the pointer position and
//! whether it is held once per frame, and every node derives its own press
//! and release edges from that. Routing rules:
//!
//! - A container hit-tests its visible children in reverse paint order. The
//!   first child that handles the touch captures the contact for as long as
//!   the pointer stays down and receives every later frame, inside or not.
//! - On the press edge, children that were not hit-tested receive the touch
//!   at [`CANCEL_POINT`] so they can run their press-outside logic.
//! - Scroll containers classify each contact. Once vertical travel exceeds
//!   the slop they take it over, the captured child sees a synthetic release
//!   far outside and its contact is marked cancelled. A captured child that
//!   scrolls on its own keeps the contact.
//!
//! Keys go to the first node in child order that consumes them. Wheel input
//! goes to the topmost scrollable node under the pointer.

use ripple_core::{Key, Painter, Vec2};
use smallvec::SmallVec;

use crate::container::ContainerKind;
use crate::scroll::{GesturePhase, Scroller};
use crate::tree::{NodeKind, WidgetId, WidgetTree};
use crate::widget::{DrawCx, UpdateCx};

/// Position used for synthetic touches that must land outside every widget.
pub(crate) const CANCEL_POINT: Vec2 = Vec2::new(-10_000.0, -10_000.0);

type Children = SmallVec<[WidgetId; 8]>;

#[derive(Clone, Copy)]
enum Route {
    Leaf,
    Stack,
    Scroll,
}

impl WidgetTree {
    /// Feeds one frame of pointer state to the tree rooted at `root`.
    /// Returns whether any node handled it.
    pub fn touch(&mut self, root: WidgetId, point: Vec2, down: bool) -> bool {
        let handled = self.on_touch(root, point, down, false);
        if !down && self.contact_down {
            self.end_contact();
        }
        self.contact_down = down;
        handled
    }

    fn end_contact(&mut self) {
        for node in self.nodes.values_mut() {
            node.base.end_contact();
            if let NodeKind::Container(c) = &mut node.kind {
                c.captured = None;
                if let Some(s) = c.scroller_mut() {
                    s.end_gesture();
                }
                if let Some(list) = c.list_mut() {
                    list.press_row = None;
                }
            }
        }
    }

    /// Routes a touch to `id`. `captured` is set when a parent forwards a
    /// contact this node owns, so it is delivered even outside the bounds.
    pub(crate) fn on_touch(
        &mut self,
        id: WidgetId,
        point: Vec2,
        down: bool,
        captured: bool,
    ) -> bool {
        let route = match self.nodes.get(id).map(|n| &n.kind) {
            None => {
                log::debug!("touch routed to stale widget {id:?}");
                return false;
            }
            Some(NodeKind::Leaf(_)) => Route::Leaf,
            Some(NodeKind::Container(c)) if c.scroller().is_some() => Route::Scroll,
            Some(NodeKind::Container(_)) => Route::Stack,
        };
        match route {
            Route::Leaf => self.leaf_touch(id, point, down, captured),
            Route::Stack => self.container_touch(id, point, down, captured),
            Route::Scroll => self.scroll_touch(id, point, down, captured),
        }
    }

    fn leaf_touch(&mut self, id: WidgetId, point: Vec2, down: bool, captured: bool) -> bool {
        let global = self.global_bounds(id);
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if !node.base.is_visible() {
            return false;
        }
        let inside = global.contains(point);
        node.base.handle_focus_logic(inside, down);
        if !inside && !captured {
            return false;
        }
        match &mut node.kind {
            NodeKind::Leaf(w) => w.on_touch_event(&mut node.base, point - global.origin(), down),
            NodeKind::Container(_) => false,
        }
    }

    fn focus_logic(&mut self, id: WidgetId, inside: bool, down: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.base.handle_focus_logic(inside, down);
        }
    }

    fn touch_prelude(&self, id: WidgetId, point: Vec2, down: bool) -> Option<(bool, bool)> {
        let node = self.nodes.get(id)?;
        if !node.base.is_visible() {
            return None;
        }
        let inside = self.global_bounds(id).contains(point);
        Some((inside, node.base.is_press(down)))
    }

    fn container_touch(&mut self, id: WidgetId, point: Vec2, down: bool, captured: bool) -> bool {
        let Some((inside, pressed)) = self.touch_prelude(id, point, down) else {
            return false;
        };
        if !inside && !captured && self.captured(id).is_none() {
            self.focus_logic(id, false, down);
            return false;
        }
        let handled = self.dispatch_children(id, point, down, pressed, inside);
        self.focus_logic(id, inside, down);
        handled
    }

    /// Forwards to the captured child, or hit-tests for a new target when
    /// `inside`. Children clipped away by the container are never hit.
    fn dispatch_children(
        &mut self,
        id: WidgetId,
        point: Vec2,
        down: bool,
        pressed: bool,
        inside: bool,
    ) -> bool {
        if let Some(target) = self.captured(id) {
            self.on_touch(target, point, down, true);
            if !down && let Some(c) = self.container_mut(id) {
                c.captured = None;
            }
            return true;
        }

        let children = Children::from_slice(self.children(id));
        let mut tried = Children::new();
        let mut target = None;
        if inside {
            for &child in children.iter().rev() {
                if !self.is_visible(child) || !self.global_bounds(child).contains(point) {
                    continue;
                }
                tried.push(child);
                if self.on_touch(child, point, down, false) {
                    target = Some(child);
                    break;
                }
            }
        }

        if down
            && let Some(t) = target
            && let Some(c) = self.container_mut(id)
        {
            c.captured = Some(t);
        }

        if pressed {
            for &child in &children {
                if Some(child) != target && !tried.contains(&child) && self.is_visible(child) {
                    self.on_touch(child, CANCEL_POINT, down, false);
                }
            }
        }
        target.is_some()
    }

    fn scroll_touch(&mut self, id: WidgetId, point: Vec2, down: bool, captured: bool) -> bool {
        let Some((inside, pressed)) = self.touch_prelude(id, point, down) else {
            return false;
        };
        let is_list = self
            .container(id)
            .is_some_and(|c| matches!(c.kind, ContainerKind::List(_)));

        if pressed && let Some(s) = self.scroller_mut(id) {
            s.begin_gesture(point, inside);
        }
        let phase = self.scroller(id).map_or(GesturePhase::Idle, Scroller::phase);

        if phase == GesturePhase::Intercepted {
            if let Some(s) = self.scroller_mut(id) {
                s.drag(point.y, down);
                if !down {
                    s.end_gesture();
                }
            }
            if is_list {
                self.list_track_tap(id, point, pressed, down, true);
            }
            self.focus_logic(id, inside, down);
            return true;
        }

        if !inside && !captured && self.captured(id).is_none() {
            self.focus_logic(id, false, down);
            return false;
        }

        let mut result = self.dispatch_children(id, point, down, pressed, inside);
        let mut intercepted = false;

        if down && phase == GesturePhase::Potential {
            let child = self.captured(id);
            if child.is_some_and(|c| self.is_scrollable(c)) {
                if let Some(s) = self.scroller_mut(id) {
                    s.reject_gesture();
                }
            } else if self
                .scroller_mut(id)
                .is_some_and(|s| s.classify(point) == GesturePhase::Intercepted)
            {
                log::debug!("{} {id:?} intercepted a vertical drag", self.type_name(id));
                intercepted = true;
                if let Some(child) = child {
                    self.cancel_gesture(child);
                    self.on_touch(child, CANCEL_POINT, false, true);
                    if let Some(c) = self.container_mut(id) {
                        c.captured = None;
                    }
                }
                result = true;
            }
        }

        if !result
            && down
            && inside
            && let Some(s) = self.scroller_mut(id)
        {
            result = s.drag(point.y, true);
        }

        if !down && let Some(s) = self.scroller_mut(id) {
            if s.is_dragging() {
                s.drag(point.y, false);
            }
            s.end_gesture();
        }

        if is_list {
            self.list_track_tap(id, point, pressed, down, intercepted);
        }
        self.focus_logic(id, inside, down);
        result || intercepted
    }

    /// Marks the contact of `id` and of every node it captured as cancelled.
    fn cancel_gesture(&mut self, id: WidgetId) {
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(node) = self.nodes.get_mut(c) else {
                break;
            };
            node.base.cancel_gesture();
            cur = node.container().and_then(|k| k.captured);
        }
    }

    /// Offers `key` to `id` and its subtree. Returns whether it was consumed.
    pub fn on_key(&mut self, id: WidgetId, key: Key) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if !node.base.is_visible() {
            return false;
        }
        let is_list = match &mut node.kind {
            NodeKind::Leaf(w) => return w.on_key(&mut node.base, key),
            NodeKind::Container(c) => matches!(c.kind, ContainerKind::List(_)),
        };
        if is_list && self.list_key(id, key) {
            return true;
        }
        let children = Children::from_slice(self.children(id));
        children.into_iter().any(|child| self.on_key(child, key))
    }

    /// Routes a wheel `delta` (notches, positive moves content down) at
    /// `pointer`. Children under the pointer get it before their container.
    pub fn on_scroll(&mut self, id: WidgetId, pointer: Vec2, delta: f32) -> bool {
        let inside = self.global_bounds(id).contains(pointer);
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if !node.base.is_visible() || !inside {
            return false;
        }
        if let NodeKind::Leaf(w) = &mut node.kind {
            return w.on_scroll(&mut node.base, delta);
        }

        let children = Children::from_slice(self.children(id));
        for &child in children.iter().rev() {
            if self.on_scroll(child, pointer, delta) {
                return true;
            }
        }
        self.scroller_mut(id).is_some_and(|s| s.wheel(delta))
    }

    /// Advances animations and scroll physics under `id` by `dt_ms`.
    /// Returns whether anything needs a redraw.
    pub fn update(&mut self, id: WidgetId, dt_ms: f32, pointer: Option<Vec2>) -> bool {
        let global = self.global_bounds(id);
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if !node.base.is_visible() {
            return false;
        }
        let mut redraw = node.base.update(dt_ms);
        let children = match &mut node.kind {
            NodeKind::Leaf(w) => {
                let mut cx = UpdateCx {
                    base: &mut node.base,
                    bounds: global,
                    pointer,
                    dt_ms,
                };
                return w.update(&mut cx) || redraw;
            }
            NodeKind::Container(c) => {
                if let Some(s) = c.scroller_mut() {
                    redraw |= s.tick(dt_ms / 1000.0);
                }
                Children::from_slice(&c.children)
            }
        };
        for child in children {
            redraw |= self.update(child, dt_ms, pointer);
        }
        redraw
    }

    /// Paints `id` and its subtree. Scroll containers clip to their bounds
    /// and skip children that are well outside the viewport.
    pub fn draw(&self, id: WidgetId, painter: &mut dyn Painter) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.base.is_visible() {
            return;
        }
        let global = self.global_bounds(id);
        match &node.kind {
            NodeKind::Leaf(w) => {
                let cx = DrawCx {
                    base: &node.base,
                    bounds: global,
                };
                w.draw(&cx, painter);
            }
            NodeKind::Container(c) => {
                c.draw_background(global, painter);
                painter.push_clip(global);
                if let Some(list) = c.as_list() {
                    list.draw_highlight(self, id, painter, c.roundness);
                }
                let cull = c
                    .scroller()
                    .map(|s| global.inflate(s.config().visibility_margin));
                for &child in &c.children {
                    if let Some(area) = cull
                        && !self.global_bounds(child).intersects(&area)
                    {
                        continue;
                    }
                    self.draw(child, painter);
                }
                painter.pop_clip();
                c.draw_scrollbar(global, painter);
            }
        }
    }

    /// Paints focus rings above the content.
    pub fn draw_focus(&self, id: WidgetId, painter: &mut dyn Painter) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.base.is_visible() {
            return;
        }
        let global = self.global_bounds(id);
        node.base.draw_focus_ring(global, painter);
        if let Some(c) = node.container() {
            let clip = c.scroller().is_some();
            if clip {
                painter.push_clip(global);
            }
            for &child in &c.children {
                self.draw_focus(child, painter);
            }
            if clip {
                painter.pop_clip();
            }
        }
    }
}
