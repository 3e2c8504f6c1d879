use ripple_core::{Scene, Size};

/// Consumer of finished frames.
pub trait RenderBackend {
    fn configure_surface(&mut self, size: Size);
    fn present(&mut self, scene: &Scene) -> anyhow::Result<()>;
}

/// Backend that keeps the last presented scene. Used in tests and for
/// running without a window.
#[derive(Default)]
pub struct HeadlessBackend {
    pub size: Size,
    pub frames: u64,
    pub last: Option<Scene>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for HeadlessBackend {
    fn configure_surface(&mut self, size: Size) {
        self.size = size;
    }

    fn present(&mut self, scene: &Scene) -> anyhow::Result<()> {
        if !scene.is_balanced() {
            anyhow::bail!("unbalanced scene: a push without its pop");
        }
        self.frames += 1;
        self.last = Some(scene.clone());
        Ok(())
    }
}
