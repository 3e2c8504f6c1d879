use ripple_core::{COLORS, Color, Painter, Size, Theme};

use crate::widget::{DrawCx, Widget, WidgetBase};

pub const DEFAULT_TEXT_SIZE: f32 = 16.0;

/// Rough text box for `text` at `size` px. Glyph shaping happens in the
/// render backend; layout only needs a stable estimate.
pub fn estimate_text_size(text: &str, size: f32) -> Size {
    let chars = text.chars().count() as f32;
    Size::new((chars * size * 0.55).ceil(), (size * 1.25).ceil())
}

/// Single line of text.
pub struct Label {
    text: String,
    color: Color,
    text_size: f32,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::WHITE,
            text_size: DEFAULT_TEXT_SIZE,
        }
    }

    pub fn with_text_size(mut self, size: f32) -> Self {
        self.text_size = size;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl Widget for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn apply_theme(&mut self, theme: &Theme) {
        self.color = theme.color(COLORS, "Label.Text", Color::WHITE);
    }

    fn measure(&mut self, base: &WidgetBase, available: Size) -> Size {
        base.resolve_size(available, estimate_text_size(&self.text, self.text_size))
    }

    fn draw(&self, cx: &DrawCx<'_>, painter: &mut dyn Painter) {
        let rect = cx.bounds.deflate(cx.base.padding());
        painter.draw_text(rect, &self.text, self.color, self.text_size);
    }
}
