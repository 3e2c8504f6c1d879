//! Frame driver for Ripple.
//!
//! The host's event loop writes raw input into an [`InputCapture`] and calls
//! [`FrameDriver::frame`] once per vsync. Each frame reads one snapshot and
//! then runs, in order: touch, keys, wheel, `update`, `draw`, present.

pub mod backend;
pub mod capture;

use web_time::Instant;

use ripple_core::{Key, Scene, Size, Vec2};
use ripple_devtools::Inspector;
use ripple_navigation::ViewManager;

pub use backend::{HeadlessBackend, RenderBackend};
pub use capture::InputCapture;

/// Longest step fed to animations after a stall.
pub const MAX_FRAME_MS: f32 = 100.0;
/// Toggles the debug inspector instead of reaching the views.
pub const INSPECTOR_KEY: Key = Key::Character('`');

pub struct FrameDriver<B: RenderBackend> {
    capture: InputCapture,
    backend: B,
    inspector: Inspector,
    last_frame: Option<Instant>,
    /// Pointer position and button state of the previous frame.
    last_pointer: Option<(Vec2, bool)>,
    presented: bool,
    scene: Scene,
}

impl<B: RenderBackend> FrameDriver<B> {
    pub fn new(backend: B) -> Self {
        Self {
            capture: InputCapture::new(),
            backend,
            inspector: Inspector::new(),
            last_frame: None,
            last_pointer: None,
            presented: false,
            scene: Scene::new(),
        }
    }

    /// Writer handle for the event loop.
    pub fn capture(&self) -> InputCapture {
        self.capture.clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn inspector_mut(&mut self) -> &mut Inspector {
        &mut self.inspector
    }

    /// Last scene handed to the backend.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn resize(&mut self, manager: &mut ViewManager, size: Size) {
        log::info!("surface resized to {}x{}", size.width, size.height);
        self.backend.configure_surface(size);
        manager.resize(size);
    }

    /// Runs one frame timed by the wall clock. The first frame has a zero
    /// delta.
    pub fn frame(&mut self, manager: &mut ViewManager) -> anyhow::Result<bool> {
        let now = Instant::now();
        let dt_ms = self
            .last_frame
            .replace(now)
            .map_or(0.0, |prev| (now - prev).as_secs_f32() * 1000.0);
        self.frame_with_dt(manager, dt_ms.min(MAX_FRAME_MS))
    }

    /// Runs one frame with an explicit delta. Returns whether anything
    /// changed, in which case the scene was presented.
    pub fn frame_with_dt(&mut self, manager: &mut ViewManager, dt_ms: f32) -> anyhow::Result<bool> {
        let input = self.capture.snapshot();
        manager.on_touch(input.pointer, input.pointer_down);
        let pointer = (input.pointer, input.pointer_down);
        let mut redraw = self.last_pointer.replace(pointer) != Some(pointer);

        for key in input.keys {
            if key == INSPECTOR_KEY {
                self.inspector.toggle();
                redraw = true;
                continue;
            }
            redraw |= manager.on_key(key);
        }
        if input.scroll.y != 0.0 {
            redraw |= manager.on_scroll(input.pointer, input.scroll.y);
        }

        redraw |= manager.update(dt_ms);
        if !redraw && !self.inspector.enabled && self.presented {
            return Ok(false);
        }

        self.scene.clear();
        manager.draw(&mut self.scene);
        let top = manager.top().map(|v| (v.tree(), v.root()));
        self.inspector.frame(&mut self.scene, top);
        self.backend.present(&self.scene)?;
        self.presented = true;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::Theme;
    use ripple_navigation::Transition;
    use ripple_ui::{Button, Label, View};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn screen(name: &str, clicks: Option<Rc<Cell<u32>>>) -> View {
        let mut view = View::named(name, Arc::new(Theme::default()));
        let id = match clicks {
            Some(c) => view
                .tree_mut()
                .insert(Button::new(name).on_click(move || c.set(c.get() + 1))),
            None => view.tree_mut().insert(Label::new(name)),
        };
        let root = view.root();
        view.tree_mut().add_child(root, id).unwrap();
        view
    }

    fn driver_with(view: View) -> (FrameDriver<HeadlessBackend>, ViewManager) {
        let mut driver = FrameDriver::new(HeadlessBackend::new());
        let mut manager = ViewManager::new(view, Arc::new(Theme::default()));
        driver.resize(&mut manager, Size::new(320.0, 480.0));
        (driver, manager)
    }

    #[test]
    fn test_first_frame_presents() {
        init_logger();
        let (mut driver, mut manager) = driver_with(screen("home", None));
        assert!(driver.frame(&mut manager).unwrap());
        assert_eq!(driver.backend().size, Size::new(320.0, 480.0));
        assert_eq!(driver.backend().frames, 1);
        let last = driver.backend().last.as_ref().unwrap();
        assert!(last.texts().any(|t| t == "home"));
    }

    #[test]
    fn test_idle_frames_are_skipped() {
        init_logger();
        let (mut driver, mut manager) = driver_with(screen("home", None));
        driver.frame_with_dt(&mut manager, 16.0).unwrap();
        assert!(!driver.frame_with_dt(&mut manager, 16.0).unwrap());
        assert_eq!(driver.backend().frames, 1);
    }

    #[test]
    fn test_tap_through_capture_clicks() {
        init_logger();
        let clicks = Rc::new(Cell::new(0));
        let (mut driver, mut manager) = driver_with(screen("ok", Some(clicks.clone())));
        let input = driver.capture();
        driver.frame_with_dt(&mut manager, 16.0).unwrap();

        input.pointer_moved(Vec2::new(4.0, 4.0));
        input.pointer_down(true);
        driver.frame_with_dt(&mut manager, 16.0).unwrap();
        input.pointer_down(false);
        driver.frame_with_dt(&mut manager, 16.0).unwrap();
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_back_key_pops_through_driver() {
        init_logger();
        let (mut driver, mut manager) = driver_with(screen("home", None));
        manager.push(screen("detail", None), Transition::None);
        driver.capture().key(Key::Back);
        driver.frame_with_dt(&mut manager, 16.0).unwrap();
        assert_eq!(manager.view_names(), ["home"]);
        for _ in 0..40 {
            driver.frame_with_dt(&mut manager, 16.0).unwrap();
        }
        assert!(!manager.is_animating());
        let last = driver.backend().last.as_ref().unwrap();
        assert_eq!(last.texts().collect::<Vec<_>>(), ["home"]);
    }

    #[test]
    fn test_backtick_toggles_inspector() {
        init_logger();
        let (mut driver, mut manager) = driver_with(screen("home", None));
        driver.capture().key(INSPECTOR_KEY);
        driver.frame_with_dt(&mut manager, 16.0).unwrap();
        let last = driver.backend().last.as_ref().unwrap();
        assert!(last.texts().any(|t| t.starts_with("frame: ")));
    }
}
