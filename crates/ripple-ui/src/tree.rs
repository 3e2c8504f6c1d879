//! # Widget arena
//!
//! Every node of a UI lives in one [`WidgetTree`], addressed by a stable
//! [`WidgetId`]. A node is a [`WidgetBase`] (geometry, visibility, focus) plus
//! either a leaf [`Widget`] or a [`Container`] of child ids. Parents are
//! recorded as ids, so walking up for coordinate translation never touches a
//! dangling reference, and removing a container drops its whole subtree.
//!
//! ```rust
//! use ripple_ui::{Button, Container, WidgetTree};
//!
//! let mut tree = WidgetTree::default();
//! let column = tree.insert_container(Container::vertical());
//! let ok = tree.insert(Button::new("OK"));
//! tree.add_child(column, ok).unwrap();
//! assert_eq!(tree.parent(ok), Some(column));
//! ```

use std::sync::Arc;

use ripple_core::{Rect, Theme};
use slotmap::{SlotMap, new_key_type};

use crate::container::{Container, ContainerKind};
use crate::error::TreeError;
use crate::scroll::Scroller;
use crate::widget::{Widget, WidgetBase};

new_key_type! {
    pub struct WidgetId;
}

pub(crate) enum NodeKind {
    Leaf(Box<dyn Widget>),
    Container(Container),
}

pub(crate) struct Node {
    pub(crate) base: WidgetBase,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn container(&self) -> Option<&Container> {
        match &self.kind {
            NodeKind::Container(c) => Some(c),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.kind {
            NodeKind::Container(c) => Some(c),
            NodeKind::Leaf(_) => None,
        }
    }
}

pub struct WidgetTree {
    pub(crate) nodes: SlotMap<WidgetId, Node>,
    theme: Arc<Theme>,
    needs_layout: bool,
    pub(crate) contact_down: bool,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new(Arc::new(Theme::default()))
    }
}

impl WidgetTree {
    pub fn new(theme: Arc<Theme>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            theme,
            needs_layout: true,
            contact_down: false,
        }
    }

    pub fn theme(&self) -> &Arc<Theme> {
        &self.theme
    }

    /// Replaces the theme and re-applies it to every node.
    pub fn set_theme(&mut self, theme: Arc<Theme>) {
        self.theme = theme;
        for node in self.nodes.values_mut() {
            Self::apply_theme_to(&self.theme, node);
        }
        self.needs_layout = true;
    }

    fn apply_theme_to(theme: &Theme, node: &mut Node) {
        node.base.apply_theme(theme);
        match &mut node.kind {
            NodeKind::Leaf(w) => w.apply_theme(theme),
            NodeKind::Container(c) => c.apply_theme(theme),
        }
    }

    fn insert_node(&mut self, kind: NodeKind, focusable: bool) -> WidgetId {
        let mut base = WidgetBase::new();
        base.set_focusable(focusable);
        let mut node = Node {
            base,
            parent: None,
            kind,
        };
        Self::apply_theme_to(&self.theme, &mut node);
        self.nodes.insert(node)
    }

    /// Adds a detached leaf. Attach it with [`WidgetTree::add_child`].
    pub fn insert<W: Widget>(&mut self, widget: W) -> WidgetId {
        let focusable = widget.focusable_by_default();
        self.insert_node(NodeKind::Leaf(Box::new(widget)), focusable)
    }

    /// Adds a detached container.
    pub fn insert_container(&mut self, container: Container) -> WidgetId {
        let focusable = matches!(container.kind, ContainerKind::List(_));
        self.insert_node(NodeKind::Container(container), focusable)
    }

    /// Appends `child` to `parent`, detaching it from any previous parent.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(child) {
            return Err(TreeError::UnknownWidget(child));
        }
        match self.nodes.get(parent) {
            None => return Err(TreeError::UnknownWidget(parent)),
            Some(node) if node.container().is_none() => {
                return Err(TreeError::NotAContainer(parent));
            }
            Some(_) => {}
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }

        self.detach(child);
        if let Some(c) = self.nodes[parent].container_mut() {
            c.children.push(child);
        }
        self.nodes[child].parent = Some(parent);
        self.needs_layout = true;
        Ok(())
    }

    /// Removes `id` and its whole subtree.
    pub fn remove(&mut self, id: WidgetId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(id) {
            return Err(TreeError::UnknownWidget(id));
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next)
                && let NodeKind::Container(c) = node.kind
            {
                stack.extend(c.children);
            }
        }
        self.needs_layout = true;
        Ok(())
    }

    fn detach(&mut self, id: WidgetId) {
        let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(c) = self.nodes.get_mut(parent).and_then(Node::container_mut) {
            c.children.retain(|child| *child != id);
            if c.captured == Some(id) {
                c.captured = None;
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.nodes.get(c).and_then(|n| n.parent);
        }
        false
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes
            .get(id)
            .and_then(Node::container)
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child currently owning the in-progress contact of container `id`.
    pub fn captured(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes
            .get(id)
            .and_then(Node::container)
            .and_then(|c| c.captured)
    }

    pub fn base(&self, id: WidgetId) -> Option<&WidgetBase> {
        self.nodes.get(id).map(|n| &n.base)
    }

    /// Mutable access to geometry and flags. Schedules a layout pass.
    pub fn base_mut(&mut self, id: WidgetId) -> Option<&mut WidgetBase> {
        let node = self.nodes.get_mut(id)?;
        self.needs_layout = true;
        Some(&mut node.base)
    }

    pub fn container(&self, id: WidgetId) -> Option<&Container> {
        self.nodes.get(id).and_then(Node::container)
    }

    pub fn container_mut(&mut self, id: WidgetId) -> Option<&mut Container> {
        self.nodes.get_mut(id).and_then(Node::container_mut)
    }

    /// Typed access to a leaf widget.
    pub fn widget<T: Widget>(&self, id: WidgetId) -> Option<&T> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Leaf(w) => {
                let any: &dyn std::any::Any = &**w;
                any.downcast_ref::<T>()
            }
            NodeKind::Container(_) => None,
        }
    }

    pub fn widget_mut<T: Widget>(&mut self, id: WidgetId) -> Option<&mut T> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Leaf(w) => {
                let any: &mut dyn std::any::Any = &mut **w;
                any.downcast_mut::<T>()
            }
            NodeKind::Container(_) => None,
        }
    }

    pub fn type_name(&self, id: WidgetId) -> &'static str {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Leaf(w)) => w.type_name(),
            Some(NodeKind::Container(c)) => c.kind.type_name(),
            None => "<removed>",
        }
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.base.is_visible())
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if let Some(base) = self.base_mut(id) {
            base.set_visible(visible);
        }
    }

    pub fn set_focused(&mut self, id: WidgetId, focused: bool) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|n| n.base.set_focused(focused))
    }

    /// Whether the node scrolls its own content. Scrollable descendants keep
    /// their contact when an ancestor would otherwise intercept a drag.
    pub fn is_scrollable(&self, id: WidgetId) -> bool {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Leaf(w)) => w.is_scrollable(),
            Some(NodeKind::Container(c)) => c.scroller().is_some(),
            None => false,
        }
    }

    pub fn scroller(&self, id: WidgetId) -> Option<&Scroller> {
        self.container(id).and_then(Container::scroller)
    }

    pub fn scroller_mut(&mut self, id: WidgetId) -> Option<&mut Scroller> {
        self.container_mut(id).and_then(Container::scroller_mut)
    }

    /// Vertical offset a container applies to its children's bounds.
    pub fn content_scroll_offset(&self, id: WidgetId) -> f32 {
        self.scroller(id).map_or(0.0, Scroller::offset)
    }

    /// Bounds in screen space: layout bounds shifted by every ancestor's
    /// scroll offset. Recomputed on every call.
    pub fn global_bounds(&self, id: WidgetId) -> Rect {
        let Some(node) = self.nodes.get(id) else {
            return Rect::ZERO;
        };
        let mut rect = node.base.bounds();
        let mut cur = node.parent;
        while let Some(p) = cur {
            rect.y += self.content_scroll_offset(p);
            cur = self.nodes.get(p).and_then(|n| n.parent);
        }
        rect
    }

    /// Visible focusable nodes under `root`, depth-first in paint order.
    pub fn collect_focusable(&self, root: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        self.visit_visible(root, &mut |id, node| {
            if node.base.is_focusable() {
                out.push(id);
            }
        });
        out
    }

    /// Visible nodes under `root` (including it), depth-first in paint order.
    pub fn visible_nodes(&self, root: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        self.visit_visible(root, &mut |id, _| out.push(id));
        out
    }

    pub fn focused_in(&self, root: WidgetId) -> Option<WidgetId> {
        let mut found = None;
        self.visit_visible(root, &mut |id, node| {
            if found.is_none() && node.base.is_focused() {
                found = Some(id);
            }
        });
        found
    }

    pub(crate) fn visit_visible(&self, id: WidgetId, f: &mut impl FnMut(WidgetId, &Node)) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.base.is_visible() {
            return;
        }
        f(id, node);
        if let Some(c) = node.container() {
            for &child in &c.children {
                self.visit_visible(child, f);
            }
        }
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub fn mark_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    pub(crate) fn clear_needs_layout(&mut self) {
        self.needs_layout = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Button, Label};

    #[test]
    fn test_add_child_reparents() {
        let mut tree = WidgetTree::default();
        let a = tree.insert_container(Container::stack());
        let b = tree.insert_container(Container::stack());
        let leaf = tree.insert(Label::new("x"));

        tree.add_child(a, leaf).unwrap();
        tree.add_child(b, leaf).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[leaf]);
        assert_eq!(tree.parent(leaf), Some(b));
    }

    #[test]
    fn test_structural_errors() {
        let mut tree = WidgetTree::default();
        let outer = tree.insert_container(Container::stack());
        let inner = tree.insert_container(Container::stack());
        let leaf = tree.insert(Label::new("x"));
        tree.add_child(outer, inner).unwrap();

        assert_eq!(
            tree.add_child(leaf, outer),
            Err(TreeError::NotAContainer(leaf))
        );
        assert_eq!(
            tree.add_child(inner, outer),
            Err(TreeError::Cycle {
                parent: inner,
                child: outer
            })
        );
        assert_eq!(
            tree.add_child(outer, outer),
            Err(TreeError::Cycle {
                parent: outer,
                child: outer
            })
        );

        tree.remove(leaf).unwrap();
        assert_eq!(tree.remove(leaf), Err(TreeError::UnknownWidget(leaf)));
        assert_eq!(
            tree.add_child(outer, leaf),
            Err(TreeError::UnknownWidget(leaf))
        );
    }

    #[test]
    fn test_remove_cascades() {
        let mut tree = WidgetTree::default();
        let root = tree.insert_container(Container::stack());
        let column = tree.insert_container(Container::vertical());
        let a = tree.insert(Button::new("a"));
        let b = tree.insert(Button::new("b"));
        tree.add_child(root, column).unwrap();
        tree.add_child(column, a).unwrap();
        tree.add_child(column, b).unwrap();
        assert_eq!(tree.len(), 4);

        tree.remove(column).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(!tree.contains(a) && !tree.contains(b));
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_global_bounds_follow_scroll() {
        let mut tree = WidgetTree::default();
        let column = tree.insert_container(Container::vertical());
        let leaf = tree.insert(Label::new("row"));
        tree.add_child(column, leaf).unwrap();
        tree.base_mut(leaf)
            .unwrap()
            .set_bounds(Rect::new(0.0, 100.0, 50.0, 20.0));

        assert_eq!(tree.global_bounds(leaf).y, 100.0);
        tree.scroller_mut(column).unwrap().set_offset(-40.0);
        assert_eq!(tree.global_bounds(leaf).y, 60.0);
        // Layout-space bounds are untouched.
        assert_eq!(tree.base(leaf).unwrap().bounds().y, 100.0);
    }

    #[test]
    fn test_typed_access_and_capabilities() {
        let mut tree = WidgetTree::default();
        let button = tree.insert(Button::new("go"));
        let list = tree.insert_container(Container::list());

        assert_eq!(tree.widget::<Button>(button).map(Button::label), Some("go"));
        assert!(tree.widget::<Label>(button).is_none());
        assert!(tree.is_scrollable(list));
        assert!(!tree.is_scrollable(button));
        assert!(tree.base(button).unwrap().is_focusable());
        assert!(tree.base(list).unwrap().is_focusable());
    }

    #[test]
    fn test_collect_focusable_skips_hidden() {
        let mut tree = WidgetTree::default();
        let root = tree.insert_container(Container::stack());
        let a = tree.insert(Button::new("a"));
        let b = tree.insert(Button::new("b"));
        let c = tree.insert(Button::new("c"));
        for id in [a, b, c] {
            tree.add_child(root, id).unwrap();
        }
        tree.set_visible(b, false);
        assert_eq!(tree.collect_focusable(root), vec![a, c]);
    }
}
