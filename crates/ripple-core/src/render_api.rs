use crate::{Color, Rect, Vec2};

/// Drawing sink. Widgets draw in global (screen) coordinates; translation and
/// opacity layers are pushed by whoever composes whole views.
///
/// Every `push_*` must be matched by the corresponding `pop_*`.
pub trait Painter {
    fn push_clip(&mut self, rect: Rect);
    fn pop_clip(&mut self);
    fn push_translate(&mut self, offset: Vec2);
    fn pop_translate(&mut self);
    /// Starts an offscreen layer that is composited with `alpha` in `0..=1`.
    fn push_layer(&mut self, alpha: f32);
    fn pop_layer(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Color, radius: f32);
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32, radius: f32);
    fn draw_text(&mut self, rect: Rect, text: &str, color: Color, size: f32);
}

/// Recorded display list, replayed by a render backend.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub clear_color: Color,
    pub nodes: Vec<SceneNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneNode {
    Rect {
        rect: Rect,
        color: Color,
        radius: f32,
    },
    Border {
        rect: Rect,
        color: Color,
        width: f32,
        radius: f32,
    },
    Text {
        rect: Rect,
        text: String,
        color: Color,
        size: f32,
    },
    PushClip {
        rect: Rect,
    },
    PopClip,
    PushTranslate {
        offset: Vec2,
    },
    PopTranslate,
    PushLayer {
        alpha: f32,
    },
    PopLayer,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Texts recorded so far, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Push/pop pairs are balanced for every kind of stack.
    pub fn is_balanced(&self) -> bool {
        let (mut clip, mut translate, mut layer) = (0i32, 0i32, 0i32);
        for n in &self.nodes {
            match n {
                SceneNode::PushClip { .. } => clip += 1,
                SceneNode::PopClip => clip -= 1,
                SceneNode::PushTranslate { .. } => translate += 1,
                SceneNode::PopTranslate => translate -= 1,
                SceneNode::PushLayer { .. } => layer += 1,
                SceneNode::PopLayer => layer -= 1,
                _ => {}
            }
            if clip < 0 || translate < 0 || layer < 0 {
                return false;
            }
        }
        clip == 0 && translate == 0 && layer == 0
    }
}

impl Painter for Scene {
    fn push_clip(&mut self, rect: Rect) {
        self.nodes.push(SceneNode::PushClip { rect });
    }
    fn pop_clip(&mut self) {
        self.nodes.push(SceneNode::PopClip);
    }
    fn push_translate(&mut self, offset: Vec2) {
        self.nodes.push(SceneNode::PushTranslate { offset });
    }
    fn pop_translate(&mut self) {
        self.nodes.push(SceneNode::PopTranslate);
    }
    fn push_layer(&mut self, alpha: f32) {
        self.nodes.push(SceneNode::PushLayer {
            alpha: alpha.clamp(0.0, 1.0),
        });
    }
    fn pop_layer(&mut self) {
        self.nodes.push(SceneNode::PopLayer);
    }
    fn fill_rect(&mut self, rect: Rect, color: Color, radius: f32) {
        self.nodes.push(SceneNode::Rect {
            rect,
            color,
            radius,
        });
    }
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32, radius: f32) {
        self.nodes.push(SceneNode::Border {
            rect,
            color,
            width,
            radius,
        });
    }
    fn draw_text(&mut self, rect: Rect, text: &str, color: Color, size: f32) {
        self.nodes.push(SceneNode::Text {
            rect,
            text: text.to_owned(),
            color,
            size,
        });
    }
}
