use web_time::Instant;

use ripple_core::{Color, Rect, Scene, SceneNode, Vec2};
use ripple_ui::{WidgetId, WidgetTree};

const EMA: f32 = 0.2;

pub struct Hud {
    frame_count: u64,
    last_frame: Option<Instant>,
    fps_smooth: f32,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            last_frame: None,
            fps_smooth: 0.0,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f32 {
        self.fps_smooth
    }

    /// Counts a frame that took `dt_secs` and folds it into the FPS average.
    pub fn record(&mut self, dt_secs: f32) {
        self.frame_count += 1;
        if dt_secs > 0.0 {
            let fps = 1.0 / dt_secs;
            self.fps_smooth = if self.fps_smooth == 0.0 {
                fps
            } else {
                (1.0 - EMA) * self.fps_smooth + EMA * fps
            };
        }
    }

    /// Records a frame against the wall clock.
    pub fn tick(&mut self) {
        let now = Instant::now();
        match self.last_frame.replace(now) {
            Some(prev) => self.record((now - prev).as_secs_f32()),
            None => self.frame_count += 1,
        }
    }

    pub fn overlay(&self, scene: &mut Scene) {
        let text = format!("frame: {}  |  fps: {:.1}", self.frame_count, self.fps_smooth);
        scene.nodes.push(SceneNode::Text {
            rect: Rect::new(8.0, 8.0, 200.0, 16.0),
            text,
            color: Color::from_hex("#AAAAAA"),
            size: 14.0,
        });
    }
}

/// Debug overlay drawn on top of a finished frame.
pub struct Inspector {
    pub enabled: bool,
    pub hud: Hud,
    outline: Color,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            enabled: false,
            hud: Hud::new(),
            outline: Color::from_hex("#44AAFF"),
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        log::info!("inspector {}", if self.enabled { "on" } else { "off" });
    }

    /// Outlines every visible widget under `root` at its on-screen bounds,
    /// labelled with its type name.
    pub fn outline_tree(&self, tree: &WidgetTree, root: WidgetId, origin: Vec2, scene: &mut Scene) {
        for id in tree.visible_nodes(root) {
            let rect = tree.global_bounds(id).translate(origin);
            scene.nodes.push(SceneNode::Border {
                rect,
                color: self.outline,
                width: 1.0,
                radius: 0.0,
            });
            scene.nodes.push(SceneNode::Text {
                rect: Rect::new(rect.x + 2.0, rect.y + 2.0, rect.w, 12.0),
                text: tree.type_name(id).to_string(),
                color: self.outline,
                size: 10.0,
            });
        }
    }

    /// Appends the HUD and outlines for `tree` when enabled. The frame is
    /// counted either way.
    pub fn frame(&mut self, scene: &mut Scene, tree: Option<(&WidgetTree, WidgetId)>) {
        self.hud.tick();
        if !self.enabled {
            return;
        }
        if let Some((tree, root)) = tree {
            self.outline_tree(tree, root, Vec2::ZERO, scene);
        }
        self.hud.overlay(scene);
    }
}
