//! Containers and the measure/layout pass.
//!
//! A [`Container`] owns an ordered list of child ids. Paint order is list
//! order; hit-testing walks it in reverse so the last-added child is on top.
//! The [`ContainerKind`] decides how children are placed and whether the
//! container scrolls:
//!
//! - `Stack` overlays children at the padded origin.
//! - `Linear` places them in a row or column with fixed spacing and scrolls
//!   vertically when the content outgrows the viewport.
//! - `List` is a scrollable column of full-width rows with a selection, see
//!   [`ListBox`].

use ripple_core::{COLORS, Color, Insets, Painter, Rect, Size, Theme, WIDGET_PARAMS};
use smallvec::SmallVec;

use crate::list::ListBox;
use crate::scroll::{ScrollConfig, Scroller};
use crate::tree::{NodeKind, WidgetId, WidgetTree};
use crate::widget::SizePolicy;

pub const DEFAULT_SPACING: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

pub struct LinearLayout {
    pub(crate) orientation: Orientation,
    pub(crate) spacing: f32,
    pub(crate) scroller: Scroller,
}

impl LinearLayout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            spacing: DEFAULT_SPACING,
            scroller: Scroller::default(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }
}

pub enum ContainerKind {
    Stack,
    Linear(LinearLayout),
    List(ListBox),
}

impl ContainerKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ContainerKind::Stack => "Stack",
            ContainerKind::Linear(_) => "LinearLayout",
            ContainerKind::List(_) => "ListBox",
        }
    }
}

#[derive(Clone, Copy)]
enum Arrange {
    Stack,
    Linear(Orientation, f32),
    List,
}

pub struct Container {
    pub(crate) children: SmallVec<[WidgetId; 8]>,
    pub(crate) captured: Option<WidgetId>,
    pub(crate) kind: ContainerKind,
    pub(crate) background: Option<Color>,
    pub(crate) roundness: f32,
    pub(crate) scrollbar_color: Color,
}

impl Container {
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            children: SmallVec::new(),
            captured: None,
            kind,
            background: None,
            roundness: 0.0,
            scrollbar_color: Color::from_rgb(150, 150, 150),
        }
    }

    pub fn stack() -> Self {
        Self::new(ContainerKind::Stack)
    }

    /// A stack that fills its bounds with `color` before drawing children.
    pub fn panel(color: Color) -> Self {
        Self::stack().with_background(color)
    }

    pub fn vertical() -> Self {
        Self::new(ContainerKind::Linear(LinearLayout::new(Orientation::Vertical)))
    }

    pub fn horizontal() -> Self {
        Self::new(ContainerKind::Linear(LinearLayout::new(
            Orientation::Horizontal,
        )))
    }

    pub fn list() -> Self {
        Self::new(ContainerKind::List(ListBox::new()))
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        if let ContainerKind::Linear(l) = &mut self.kind {
            l.spacing = spacing.max(0.0);
        }
        self
    }

    pub fn with_scroll_config(mut self, config: ScrollConfig) -> Self {
        if let Some(s) = self.scroller_mut() {
            *s.config_mut() = config;
        }
        self
    }

    /// Selection callback for list containers. Ignored for other kinds.
    pub fn on_select(mut self, f: impl FnMut(usize) + 'static) -> Self {
        if let ContainerKind::List(list) = &mut self.kind {
            list.on_selected = Some(Box::new(f));
        }
        self
    }

    pub fn kind(&self) -> &ContainerKind {
        &self.kind
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn as_list(&self) -> Option<&ListBox> {
        match &self.kind {
            ContainerKind::List(l) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn list_mut(&mut self) -> Option<&mut ListBox> {
        match &mut self.kind {
            ContainerKind::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn scroller(&self) -> Option<&Scroller> {
        match &self.kind {
            ContainerKind::Stack => None,
            ContainerKind::Linear(l) => Some(&l.scroller),
            ContainerKind::List(l) => Some(&l.scroller),
        }
    }

    pub fn scroller_mut(&mut self) -> Option<&mut Scroller> {
        match &mut self.kind {
            ContainerKind::Stack => None,
            ContainerKind::Linear(l) => Some(&mut l.scroller),
            ContainerKind::List(l) => Some(&mut l.scroller),
        }
    }

    pub(crate) fn apply_theme(&mut self, theme: &Theme) {
        self.scrollbar_color = theme.color(
            COLORS,
            "Scrollbar.Thumb",
            Color::from_rgb(150, 150, 150),
        );
        if let ContainerKind::List(list) = &mut self.kind {
            list.apply_theme(theme);
            self.roundness = theme.float(WIDGET_PARAMS, "Widget.Roundness", 6.0);
        }
    }

    fn arrange(&self) -> Arrange {
        match &self.kind {
            ContainerKind::Stack => Arrange::Stack,
            ContainerKind::Linear(l) => Arrange::Linear(l.orientation, l.spacing),
            ContainerKind::List(_) => Arrange::List,
        }
    }

    /// Fills the background. Lists always paint their themed background.
    pub(crate) fn draw_background(&self, global: Rect, painter: &mut dyn Painter) {
        if let Some(bg) = self.background {
            painter.fill_rect(global, bg, self.roundness);
        }
        if let ContainerKind::List(list) = &self.kind {
            painter.fill_rect(global, list.background, self.roundness);
        }
    }

    pub(crate) fn draw_scrollbar(&self, global: Rect, painter: &mut dyn Painter) {
        if let Some((thumb, alpha)) = self.scroller().and_then(|s| s.scrollbar_thumb(global)) {
            painter.fill_rect(
                thumb,
                self.scrollbar_color.with_alpha(alpha),
                thumb.w / 2.0,
            );
        }
    }
}

fn inner_size(available: Size, padding: Insets) -> Size {
    Size::new(
        (available.width - padding.horizontal()).max(0.0),
        (available.height - padding.vertical()).max(0.0),
    )
}

fn child_extent(policy: SizePolicy, measured: f32, inner: f32) -> f32 {
    match policy {
        SizePolicy::MatchParent => inner,
        _ => measured,
    }
}

impl WidgetTree {
    /// Measures `id` and its subtree against `available` space and records
    /// the result as the measured size.
    pub fn measure(&mut self, id: WidgetId, available: Size) -> Size {
        let Some(node) = self.nodes.get_mut(id) else {
            return Size::ZERO;
        };
        let (children, arrange) = match &mut node.kind {
            NodeKind::Leaf(w) => {
                let size = w.measure(&node.base, available);
                node.base.set_measured(size);
                return size;
            }
            NodeKind::Container(c) => (c.children.clone(), c.arrange()),
        };
        let inner = inner_size(available, node.base.padding());

        let mut content = Size::ZERO;
        let mut first = true;
        for child in children {
            if !self.is_visible(child) {
                continue;
            }
            let s = self.measure(child, inner);
            match arrange {
                Arrange::Stack => {
                    content.width = content.width.max(s.width);
                    content.height = content.height.max(s.height);
                }
                Arrange::Linear(Orientation::Vertical, spacing) => {
                    if !first {
                        content.height += spacing;
                    }
                    content.height += s.height;
                    content.width = content.width.max(s.width);
                }
                Arrange::Linear(Orientation::Horizontal, spacing) => {
                    if !first {
                        content.width += spacing;
                    }
                    content.width += s.width;
                    content.height = content.height.max(s.height);
                }
                Arrange::List => {
                    content.height += s.height;
                    content.width = content.width.max(s.width);
                }
            }
            first = false;
        }

        let Some(node) = self.nodes.get_mut(id) else {
            return Size::ZERO;
        };
        let size = node.base.resolve_size(available, content);
        let padding = node.base.padding();
        node.base.set_measured(size);
        if let Some(s) = node.container_mut().and_then(Container::scroller_mut) {
            s.set_content_extent(content.height + padding.vertical());
        }
        size
    }

    /// Places the children of `id` inside its bounds, then recurses.
    pub fn layout(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let bounds = node.base.bounds();
        let inner = bounds.deflate(node.base.padding());
        let Some(c) = node.container_mut() else {
            return;
        };
        let children = c.children.clone();
        let arrange = c.arrange();
        if let Some(s) = c.scroller_mut() {
            s.set_viewport_extent(bounds.h);
        }

        let mut cursor = inner.origin();
        let mut row = 0;
        for &child in &children {
            let Some(cn) = self.nodes.get_mut(child) else {
                continue;
            };
            if !cn.base.is_visible() {
                cn.base.set_layout_index(None);
                continue;
            }
            let m = cn.base.measured();
            let w = child_extent(cn.base.width(), m.width, inner.w);
            let h = child_extent(cn.base.height(), m.height, inner.h);
            match arrange {
                Arrange::Stack => {
                    cn.base.set_bounds(Rect::new(inner.x, inner.y, w, h));
                }
                Arrange::Linear(Orientation::Vertical, spacing) => {
                    cn.base.set_bounds(Rect::new(cursor.x, cursor.y, w, h));
                    cursor.y += h + spacing;
                }
                Arrange::Linear(Orientation::Horizontal, spacing) => {
                    cn.base.set_bounds(Rect::new(cursor.x, cursor.y, w, h));
                    cursor.x += w + spacing;
                }
                Arrange::List => {
                    cn.base
                        .set_bounds(Rect::new(inner.x, cursor.y, inner.w, m.height));
                    cn.base.set_layout_index(Some(row));
                    row += 1;
                    cursor.y += m.height;
                }
            }
        }

        for child in children {
            if self.is_visible(child) {
                self.layout(child);
            }
        }
    }

    /// Full layout pass for a tree rooted at `root` filling `frame`.
    pub fn layout_root(&mut self, root: WidgetId, frame: Rect) {
        if let Some(node) = self.nodes.get_mut(root) {
            node.base.set_bounds(frame);
        }
        self.measure(root, frame.size());
        self.layout(root);
        self.clear_needs_layout();
    }
}
