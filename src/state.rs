use crate::animation::{Animator, TimeStep};
use crate::body::Registry;
use crate::camera::{Camera, Viewport};
use crate::controls::ControlPanel;
use crate::renderer::Presenter;
use crate::scene::Scene;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::io;
use std::time::Duration;

/// Camera orbit requested per key press, in radians
const ORBIT_STEP: f64 = 0.3;
/// Distance factor per zoom key press
const ZOOM_STEP: f64 = 0.9;
/// Camera orbit per column dragged; rows are twice as tall
const DRAG_RATE: f64 = 0.05;

/// What the event loop should do after an input event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Application state shared by the input handlers and the frame loop
pub struct AppState {
    pub registry: Registry,
    pub animator: Animator,
    pub camera: Camera,
    pub panel: ControlPanel,
    /// Enable debug mode
    pub debug: bool,
    /// Last cell of an ongoing left-button drag
    drag_from: Option<(u16, u16)>,
}

impl AppState {
    pub fn new(registry: Registry, time_step: TimeStep, viewport: Viewport) -> Self {
        let panel = ControlPanel::bind(&registry, viewport.width);
        AppState {
            registry,
            animator: Animator::new(time_step),
            camera: Camera::new(viewport),
            panel,
            debug: false,
            drag_from: None,
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => {
                self.animator.toggle_pause();
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.panel.toggle_visibility();
            }
            KeyCode::Char('i') | KeyCode::Char('I') => self.debug = !self.debug,
            KeyCode::Char('w') | KeyCode::Char('W') => self.camera.rotate(0.0, ORBIT_STEP),
            KeyCode::Char('s') | KeyCode::Char('S') => self.camera.rotate(0.0, -ORBIT_STEP),
            KeyCode::Char('a') | KeyCode::Char('A') => self.camera.rotate(-ORBIT_STEP, 0.0),
            KeyCode::Char('d') | KeyCode::Char('D') => self.camera.rotate(ORBIT_STEP, 0.0),
            KeyCode::Char('z') | KeyCode::Char('Z') => self.camera.zoom(ZOOM_STEP),
            KeyCode::Char('x') | KeyCode::Char('X') => self.camera.zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('r') | KeyCode::Char('R') => self.camera.reset(),
            // Sliders only respond while the panel is on screen
            code if self.panel.is_visible() => match code {
                KeyCode::Up => self.panel.select_previous(),
                KeyCode::Down => self.panel.select_next(),
                KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
                    self.panel.adjust(&mut self.registry, 1);
                }
                KeyCode::Left | KeyCode::Char('-') => {
                    self.panel.adjust(&mut self.registry, -1);
                }
                _ => {}
            },
            _ => {}
        }
        Control::Continue
    }

    /// Left-drag orbits the camera, the wheel zooms
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_from = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((column, row)) = self.drag_from {
                    let dx = mouse.column as f64 - column as f64;
                    let dy = mouse.row as f64 - row as f64;
                    self.camera.rotate(-dx * DRAG_RATE, dy * 2.0 * DRAG_RATE);
                }
                self.drag_from = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag_from = None,
            MouseEventKind::ScrollUp => self.camera.zoom(ZOOM_STEP),
            MouseEventKind::ScrollDown => self.camera.zoom(1.0 / ZOOM_STEP),
            _ => {}
        }
    }

    /// Propagates a new viewport size to the camera and the panel layout
    pub fn resize(&mut self, width: u16, height: u16) {
        self.camera.resize(width, height);
        self.panel.apply_viewport(width);
    }

    /// Runs one tick: advance the animation, update the scene graph and camera, then draw.
    /// The presenter is called even while paused so the camera stays responsive.
    pub fn frame<P: Presenter>(
        &mut self,
        dt: Duration,
        scene: &mut Scene,
        presenter: &mut P,
    ) -> io::Result<()> {
        self.animator.advance(&mut self.registry, dt);
        self.panel.refresh(&self.registry);
        scene.sync(&self.registry);
        self.camera.update();
        presenter.present(scene, self)
    }
}
