//! # List box
//!
//! A scrollable column of full-width rows with at most one selected row. Rows
//! are ordinary widgets; the list tracks taps itself, so a row does not have
//! to handle touch to be selectable. Selecting a row scrolls it into view
//! with the smooth-scroll steering of the underlying [`Scroller`].

use ripple_core::{COLORS, Color, Key, Painter, Theme, Vec2};

use crate::scroll::{ScrollConfig, Scroller};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::WidgetState;

pub struct ListBox {
    pub(crate) scroller: Scroller,
    pub(crate) selected: Option<usize>,
    pub(crate) on_selected: Option<Box<dyn FnMut(usize)>>,
    pub(crate) press_row: Option<usize>,
    pub(crate) background: Color,
    pub(crate) highlight: Color,
}

impl Default for ListBox {
    fn default() -> Self {
        Self::new()
    }
}

impl ListBox {
    pub fn new() -> Self {
        let config = ScrollConfig {
            wheel_impulse: 12.0,
            ..ScrollConfig::default()
        };
        Self {
            scroller: Scroller::new(config),
            selected: None,
            on_selected: None,
            press_row: None,
            background: Color::gray(10),
            highlight: Color::from_rgb(0, 0, 255),
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub(crate) fn apply_theme(&mut self, theme: &Theme) {
        self.background = theme.color(COLORS, "ListBox.Background", Color::gray(10));
        self.highlight = theme.color(COLORS, "ListItem.Focus", Color::from_rgb(0, 0, 255));
    }

    pub(crate) fn draw_highlight(
        &self,
        tree: &WidgetTree,
        list: WidgetId,
        painter: &mut dyn Painter,
        roundness: f32,
    ) {
        let Some(row) = self.selected.and_then(|i| tree.children(list).get(i).copied()) else {
            return;
        };
        if tree.is_visible(row) {
            painter.fill_rect(tree.global_bounds(row), self.highlight, roundness);
        }
    }
}

impl WidgetTree {
    pub fn selected(&self, list: WidgetId) -> Option<usize> {
        self.container(list)?.as_list()?.selected()
    }

    /// Selects row `index` of `list`, fires the selection callback and scrolls
    /// the row into view. Out-of-range indices are ignored.
    pub fn select(&mut self, list: WidgetId, index: usize) -> bool {
        let Some(c) = self.container_mut(list) else {
            return false;
        };
        if index >= c.children.len() {
            log::debug!("select({index}) out of range for {list:?}");
            return false;
        }
        let children = c.children.clone();
        let Some(lb) = c.list_mut() else {
            return false;
        };
        lb.selected = Some(index);
        if let Some(f) = lb.on_selected.as_mut() {
            f(index);
        }

        for (i, child) in children.into_iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(child) {
                node.base.set_state(WidgetState::SELECTED, i == index);
            }
        }
        self.smooth_scroll_to_index(list, index);
        true
    }

    pub fn clear_selection(&mut self, list: WidgetId) {
        let Some(c) = self.container_mut(list) else {
            return;
        };
        let children = c.children.clone();
        if let Some(lb) = c.list_mut() {
            lb.selected = None;
        }
        for child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.base.set_state(WidgetState::SELECTED, false);
            }
        }
    }

    /// Smoothly scrolls a scroll container so that `target` becomes its
    /// offset (clamped into range).
    pub fn smooth_scroll_to(&mut self, id: WidgetId, target: f32) -> bool {
        match self.scroller_mut(id) {
            Some(s) => {
                s.smooth_scroll_to(target);
                true
            }
            None => false,
        }
    }

    /// Scrolls the least distance that brings child `index` fully into view.
    /// Works on layout-space bounds, which do not move while scrolling.
    pub fn smooth_scroll_to_index(&mut self, id: WidgetId, index: usize) -> bool {
        let Some(&child) = self.children(id).get(index) else {
            return false;
        };
        let (Some(item), Some(view)) = (
            self.base(child).map(|b| b.bounds()),
            self.base(id).map(|b| b.bounds()),
        ) else {
            return false;
        };
        let Some(scroller) = self.scroller_mut(id) else {
            return false;
        };

        let item_offset = item.y - view.y;
        let scroll = scroller.offset();
        let mut target = scroll;
        if item_offset < -scroll {
            target = -item_offset;
        } else if item_offset + item.h > -scroll + view.h {
            target = view.h - item.h - item_offset;
        }
        scroller.smooth_scroll_to(target);
        true
    }

    /// First row that is at least partly below the top edge of the viewport.
    fn first_visible_row(&self, list: WidgetId) -> Option<usize> {
        let view = self.base(list)?.bounds();
        let scroll = self.content_scroll_offset(list);
        let children = self.children(list);
        children
            .iter()
            .position(|&c| {
                self.base(c).is_some_and(|b| {
                    let r = b.bounds();
                    b.is_visible() && r.y - view.y + r.h > -scroll
                })
            })
            .or(if children.is_empty() { None } else { Some(0) })
    }

    /// Row index under a screen-space point.
    pub(crate) fn row_at(&self, list: WidgetId, point: Vec2) -> Option<usize> {
        self.children(list)
            .iter()
            .position(|&c| self.is_visible(c) && self.global_bounds(c).contains(point))
    }

    pub(crate) fn list_key(&mut self, list: WidgetId, key: Key) -> bool {
        let focused = self.base(list).is_some_and(|b| b.is_focused());
        if !focused || !matches!(key, Key::Up | Key::Down) {
            return false;
        }
        let len = self.children(list).len();
        match (key, self.selected(list)) {
            (_, None) => {
                if let Some(i) = self.first_visible_row(list) {
                    self.select(list, i);
                }
            }
            (Key::Down, Some(i)) if i + 1 < len => {
                self.select(list, i + 1);
            }
            (Key::Up, Some(i)) if i > 0 => {
                self.select(list, i - 1);
            }
            _ => {}
        }
        true
    }

    /// Tap tracking run from the scroll dispatch of a list container.
    pub(crate) fn list_track_tap(
        &mut self,
        list: WidgetId,
        point: Vec2,
        pressed: bool,
        down: bool,
        dragging_away: bool,
    ) {
        let row = self.row_at(list, point);
        let cancelled = self.base(list).is_some_and(|b| b.is_gesture_cancelled());
        let Some(lb) = self.container_mut(list).and_then(|c| c.list_mut()) else {
            return;
        };
        if pressed {
            lb.press_row = row;
        }
        if dragging_away || cancelled {
            lb.press_row = None;
        }
        if !down
            && let Some(pressed_row) = lb.press_row.take()
            && row == Some(pressed_row)
        {
            self.select(list, pressed_row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::SizePolicy;
    use crate::{Container, Label};
    use ripple_core::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME_MS: f32 = 1000.0 / 60.0;

    /// 10 rows of 50px in a 200px high list.
    fn list_with_rows() -> (WidgetTree, WidgetId, Rc<RefCell<Vec<usize>>>) {
        let picked = Rc::new(RefCell::new(Vec::new()));
        let log = picked.clone();
        let mut tree = WidgetTree::default();
        let list =
            tree.insert_container(Container::list().on_select(move |i| log.borrow_mut().push(i)));
        for i in 0..10 {
            let row = tree.insert(Label::new(format!("row {i}")));
            tree.base_mut(row).unwrap().set_height(SizePolicy::Fixed(50.0));
            tree.add_child(list, row).unwrap();
        }
        tree.layout_root(list, Rect::new(0.0, 0.0, 300.0, 200.0));
        (tree, list, picked)
    }

    fn settle(tree: &mut WidgetTree, list: WidgetId) {
        for _ in 0..240 {
            tree.update(list, FRAME_MS, None);
        }
    }

    #[test]
    fn test_select_scrolls_row_into_view() {
        let (mut tree, list, picked) = list_with_rows();
        assert!(tree.select(list, 7));
        assert_eq!(tree.selected(list), Some(7));
        assert_eq!(*picked.borrow(), vec![7]);

        settle(&mut tree, list);
        // Row 7 spans 350..400, so its bottom aligns with the 200px viewport.
        assert_eq!(tree.content_scroll_offset(list), -200.0);
        let row = tree.children(list)[7];
        assert!(tree.base(row).unwrap().state().contains(WidgetState::SELECTED));
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let (mut tree, list, picked) = list_with_rows();
        tree.select(list, 2);
        assert!(!tree.select(list, 10));
        assert_eq!(tree.selected(list), Some(2));
        assert_eq!(*picked.borrow(), vec![2]);
        assert!(!tree.smooth_scroll_to_index(list, 99));
    }

    #[test]
    fn test_arrow_keys_require_focus() {
        let (mut tree, list, _) = list_with_rows();
        assert!(!tree.on_key(list, Key::Down));

        tree.set_focused(list, true);
        assert!(tree.on_key(list, Key::Down));
        assert_eq!(tree.selected(list), Some(0));
        tree.on_key(list, Key::Down);
        tree.on_key(list, Key::Down);
        tree.on_key(list, Key::Up);
        assert_eq!(tree.selected(list), Some(1));

        // Up at the top stays put but still consumes the key.
        tree.select(list, 0);
        assert!(tree.on_key(list, Key::Up));
        assert_eq!(tree.selected(list), Some(0));
    }

    #[test]
    fn test_first_key_picks_first_visible_row() {
        let (mut tree, list, _) = list_with_rows();
        tree.scroller_mut(list).unwrap().set_offset(-120.0);
        tree.set_focused(list, true);
        tree.on_key(list, Key::Down);
        // Row 2 spans 100..150 and is the first one reaching below 120.
        assert_eq!(tree.selected(list), Some(2));
    }

    #[test]
    fn test_tap_selects_row() {
        let (mut tree, list, picked) = list_with_rows();
        tree.touch(list, Vec2::new(40.0, 120.0), true);
        tree.touch(list, Vec2::new(42.0, 121.0), false);
        assert_eq!(tree.selected(list), Some(2));
        assert_eq!(*picked.borrow(), vec![2]);
    }

    #[test]
    fn test_drag_does_not_select() {
        let (mut tree, list, picked) = list_with_rows();
        tree.touch(list, Vec2::new(40.0, 120.0), true);
        tree.touch(list, Vec2::new(40.0, 100.0), true);
        tree.touch(list, Vec2::new(40.0, 80.0), true);
        tree.touch(list, Vec2::new(40.0, 80.0), false);
        assert_eq!(tree.selected(list), None);
        assert!(picked.borrow().is_empty());
    }
}
