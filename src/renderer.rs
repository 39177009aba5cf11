use crate::animation::Animator;
use crate::camera::Camera;
use crate::controls::{ControlPanel, Layout};
use crate::graphics::{draw_sphere, draw_triangle, Cell, FrameBuffer, Surface};
use crate::math::{rgb, Vec3};
use crate::scene::{Material, Scene, Shape, WorldTransform};
use crate::state::AppState;
use crate::vertex::Vertex;
use crossterm::style::{Color, Print, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use crossterm::{cursor, queue};
use std::f64::consts::TAU;
use std::io::{self, Write};
use std::time::Instant;

const PANEL_WIDTH: usize = 36;
const SLIDER_WIDTH: usize = 15;
const PANEL_BACKGROUND: Color = Color::Rgb { r: 20, g: 20, b: 32 };
const HELP: &str =
    " ↑↓ select  ←→ speed  p pause  h panel  wasd orbit  z/x zoom  r reset  i info  q quit";

/// Draws the scene and its overlays once per tick
pub trait Presenter {
    fn present(&mut self, scene: &Scene, state: &AppState) -> io::Result<()>;

    /// Adapts the output surface to a new viewport size
    fn resize(&mut self, width: u16, height: u16);
}

/// Presenter that rasterizes into a cell buffer and writes the changed cells to a terminal
pub struct TerminalRenderer<W: Write> {
    out: W,
    frame: FrameBuffer,
    /// Cells as last written to the terminal
    previous: Vec<Cell>,
    needs_clear: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        let mut renderer = TerminalRenderer {
            out,
            frame: FrameBuffer::new(width, height),
            previous: Vec::new(),
            needs_clear: true,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        };
        renderer.resize(width, height);
        renderer
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    fn update_fps(&mut self) {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }
}

impl<W: Write> Presenter for TerminalRenderer<W> {
    fn present(&mut self, scene: &Scene, state: &AppState) -> io::Result<()> {
        self.update_fps();

        self.frame.clear();
        draw_scene(&mut self.frame, scene, &state.camera);
        draw_panel(&mut self.frame, &state.panel, &state.animator);
        if state.animator.is_paused() {
            draw_paused(&mut self.frame);
        }
        if state.debug {
            draw_debug(&mut self.frame, scene, state, self.fps);
        }

        queue!(self.out, BeginSynchronizedUpdate)?;
        if self.needs_clear {
            queue!(self.out, Clear(ClearType::All))?;
            self.needs_clear = false;
        }
        flush_diff(&mut self.out, &self.frame, &mut self.previous)?;
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.frame.resize(width, height);
        // A cell that never matches forces a full repaint
        let stale = Cell {
            ch: '\0',
            fg: Color::Reset,
            bg: Color::Reset,
        };
        self.previous = vec![stale; width as usize * height as usize];
        self.needs_clear = true;
    }
}

/// Rasterizes every node of the scene
pub fn draw_scene(frame: &mut FrameBuffer, scene: &Scene, camera: &Camera) {
    let eye = camera.position();
    let basis = camera.basis();

    for (id, node) in scene.nodes() {
        let world = scene.world_transform(id);
        match (&node.shape, node.material) {
            (Shape::Sphere { radius }, Material::Basic { color }) => draw_sphere(
                frame,
                camera,
                &eye,
                &basis,
                &world.translation,
                *radius,
                Surface::Basic(rgb(color)),
            ),
            (Shape::Sphere { radius }, Material::Standard { color }) => draw_sphere(
                frame,
                camera,
                &eye,
                &basis,
                &world.translation,
                *radius,
                Surface::Standard {
                    color: rgb(color),
                    light: &scene.light,
                    orientation: world.rotation,
                },
            ),
            (
                Shape::Ring {
                    inner,
                    outer,
                    segments,
                },
                Material::Basic { color },
            ) => {
                let cell = Cell::new('▒', rgb(color));
                draw_ring(frame, camera, &eye, &basis, &world, *inner, *outer, *segments, cell);
            }
            (Shape::Points(points), Material::Points { color }) => {
                let cell = Cell::new('.', rgb(color));
                for point in points {
                    if let Some(p) = camera.project_with(point, &eye, &basis) {
                        frame.plot(p.x.floor() as isize, p.y.floor() as isize, p.depth, cell);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Draws a flat annulus as a strip of triangles
fn draw_ring(
    frame: &mut FrameBuffer,
    camera: &Camera,
    eye: &Vec3,
    basis: &[Vec3; 3],
    world: &WorldTransform,
    inner: f64,
    outer: f64,
    segments: usize,
    cell: Cell,
) {
    let project = |radius: f64, angle: f64| -> Option<Vertex> {
        let (sin_a, cos_a) = angle.sin_cos();
        let point = world.apply(&[radius * cos_a, radius * sin_a, 0.0]);
        camera.project_with(&point, eye, basis).map(Vertex::from)
    };

    for i in 0..segments {
        let a0 = TAU * i as f64 / segments as f64;
        let a1 = TAU * (i + 1) as f64 / segments as f64;
        let corners = (
            project(inner, a0),
            project(outer, a0),
            project(outer, a1),
            project(inner, a1),
        );
        // Segments crossing the near plane are dropped whole
        if let (Some(i0), Some(o0), Some(o1), Some(i1)) = corners {
            draw_triangle(&i0, &o0, &o1, frame, cell);
            draw_triangle(&i0, &o1, &i1, frame, cell);
        }
    }
}

/// Draws the slider panel, or the compact-layout toggle
pub fn draw_panel(frame: &mut FrameBuffer, panel: &ControlPanel, animator: &Animator) {
    if let Some(label) = panel.toggle_label() {
        let text = format!(" [h] {} ", label);
        let y = frame.height().saturating_sub(1);
        let x = frame.width().saturating_sub(text.chars().count());
        frame.put_str(x, y, &text, Color::Black, Color::Grey);
    }

    if !panel.is_visible() {
        return;
    }

    let rows = panel.sliders().len() + 2;
    frame.fill_rect(0, 0, PANEL_WIDTH, rows, PANEL_BACKGROUND);
    frame.put_str(
        1,
        0,
        &format!("[p] {}", panel.pause_label(animator)),
        Color::White,
        PANEL_BACKGROUND,
    );

    for (i, slider) in panel.sliders().iter().enumerate() {
        let selected = i == panel.selected();
        let filled = (slider.fill() * SLIDER_WIDTH as f64).round() as usize;
        let bar: String = (0..SLIDER_WIDTH)
            .map(|n| if n < filled { '█' } else { '░' })
            .collect();
        let line = format!(
            "{} {:<8} {} {:>4}",
            if selected { '>' } else { ' ' },
            slider.body(),
            bar,
            slider.label()
        );
        let fg = if selected { Color::Yellow } else { Color::Grey };
        frame.put_str(1, i + 2, &line, fg, PANEL_BACKGROUND);
    }

    if panel.layout() == Layout::Desktop {
        let y = frame.height().saturating_sub(1);
        frame.put_str(0, y, HELP, Color::DarkGrey, Color::Reset);
    }
}

/// Display 'Paused' in the middle of the surface
fn draw_paused(frame: &mut FrameBuffer) {
    let text = " Paused ";
    let x = frame.width().saturating_sub(text.len()) / 2;
    let y = frame.height() / 2;
    frame.put_str(x, y, text, Color::White, Color::DarkGrey);
}

/// Debug lines in the top right corner
fn draw_debug(frame: &mut FrameBuffer, scene: &Scene, state: &AppState, fps: f64) {
    let camera = &state.camera;
    let stars = match &scene.node(scene.stars()).shape {
        Shape::Points(points) => points.len(),
        _ => 0,
    };
    let lines = [
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("Elapsed: {:.1}s", state.animator.elapsed().as_secs_f64()),
        format!("Ticks: {}", state.animator.ticks()),
        format!(
            "State: {:?} ({:?} step)",
            state.animator.state(),
            state.animator.time_step()
        ),
        format!(
            "Viewport: {}x{} (aspect {:.2})",
            camera.viewport().width,
            camera.viewport().height,
            camera.aspect()
        ),
        format!("FPS: {:.2}", fps),
        format!(
            "Camera: az {:.2} el {:.2} dist {:.1}",
            camera.azimuth(),
            camera.elevation(),
            camera.distance()
        ),
        format!("Sun rotation: {:.3}", state.registry.sun().rotation()),
        format!("Stars: {}", stars),
    ];
    for (y, line) in lines.iter().enumerate() {
        let x = frame.width().saturating_sub(line.chars().count() + 1);
        frame.put_str(x, y, line, Color::White, Color::Reset);
    }
}

/// Writes the cells that changed since the previous flush
fn flush_diff<W: Write>(out: &mut W, frame: &FrameBuffer, previous: &mut [Cell]) -> io::Result<()> {
    let mut current_fg = None;
    let mut current_bg = None;

    for (i, cell) in frame.cells().iter().enumerate() {
        if previous[i] == *cell {
            continue;
        }
        previous[i] = *cell;

        let x = (i % frame.width()) as u16;
        let y = (i / frame.width()) as u16;
        queue!(out, cursor::MoveTo(x, y))?;

        if current_bg != Some(cell.bg) {
            current_bg = Some(cell.bg);
            queue!(out, SetBackgroundColor(cell.bg))?;
        }
        if current_fg != Some(cell.fg) {
            current_fg = Some(cell.fg);
            queue!(out, SetForegroundColor(cell.fg))?;
        }
        queue!(out, Print(cell.ch))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TimeStep;
    use crate::body::Registry;
    use crate::camera::Viewport;
    use crate::scene::StarfieldConfig;
    use std::time::Duration;

    fn setup(width: u16, height: u16) -> (AppState, Scene) {
        let registry = Registry::solar_system().unwrap();
        let scene = Scene::build(
            &registry,
            &StarfieldConfig {
                count: 0,
                spread: 2000.0,
                seed: Some(3),
            },
        );
        let state = AppState::new(registry, TimeStep::Frame, Viewport { width, height });
        (state, scene)
    }

    fn row(frame: &FrameBuffer, y: usize) -> String {
        (0..frame.width())
            .map(|x| frame.cell(x, y).map_or(' ', |c| c.ch))
            .collect()
    }

    fn screen(frame: &FrameBuffer) -> String {
        (0..frame.height())
            .map(|y| row(frame, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn sun_sits_in_the_middle() {
        let (state, scene) = setup(120, 40);
        let mut frame = FrameBuffer::new(120, 40);
        draw_scene(&mut frame, &scene, &state.camera);
        let centre = frame.cell(60, 20).unwrap();
        assert_eq!(centre.ch, '█');
        assert_eq!(centre.fg, rgb(0xffdd00));
    }

    #[test]
    fn planets_are_drawn_right_of_the_sun() {
        let (state, scene) = setup(160, 50);
        let mut frame = FrameBuffer::new(160, 50);
        draw_scene(&mut frame, &scene, &state.camera);
        let earth = state.camera.project(&[50.0, 0.0, 0.0]).unwrap();
        let cell = frame
            .cell(earth.x.floor() as usize, earth.y.floor() as usize)
            .unwrap();
        assert_ne!(cell.ch, ' ');
    }

    #[test]
    fn ring_is_drawn_around_saturn() {
        let (state, scene) = setup(240, 80);
        let mut frame = FrameBuffer::new(240, 80);
        draw_scene(&mut frame, &scene, &state.camera);
        let saturn = state.camera.project(&[120.0, 0.0, 0.0]).unwrap();
        let ring_cells = frame
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.ch == '▒' && c.fg == rgb(0xaaaaaa))
            .map(|(i, _)| (i % frame.width()) as f64)
            .collect::<Vec<_>>();
        assert!(!ring_cells.is_empty());
        assert!(ring_cells.iter().all(|x| (x - saturn.x).abs() < 20.0));
    }

    #[test]
    fn panel_lists_every_slider() {
        let (state, _) = setup(120, 40);
        let mut frame = FrameBuffer::new(120, 40);
        draw_panel(&mut frame, &state.panel, &state.animator);
        assert!(row(&frame, 0).contains("Pause Animation"));
        assert!(row(&frame, 2).contains("> Mercury"));
        assert!(row(&frame, 2).contains("1.0x"));
        assert!(row(&frame, 9).contains("Neptune"));
        assert!(!screen(&frame).contains("Show Controls"));
    }

    #[test]
    fn compact_layout_shows_only_the_toggle() {
        let (mut state, _) = setup(50, 30);
        let mut frame = FrameBuffer::new(50, 30);
        draw_panel(&mut frame, &state.panel, &state.animator);
        let text = screen(&frame);
        assert!(text.contains("Show Controls"));
        assert!(!text.contains("Mercury"));

        state.panel.toggle_visibility();
        frame.clear();
        draw_panel(&mut frame, &state.panel, &state.animator);
        let text = screen(&frame);
        assert!(text.contains("Hide Controls"));
        assert!(text.contains("Mercury"));
    }

    #[test]
    fn present_writes_paused_banner_and_resume_label() {
        let (mut state, mut scene) = setup(100, 30);
        let mut renderer = TerminalRenderer::new(Vec::new(), 100, 30);
        state.animator.toggle_pause();
        state
            .frame(Duration::from_millis(16), &mut scene, &mut renderer)
            .unwrap();

        let text = screen(renderer.frame());
        assert!(text.contains("Paused"));
        assert!(text.contains("Resume Animation"));
        assert!(!renderer.out.is_empty());
    }

    #[test]
    fn unchanged_frames_write_no_cells() {
        let (mut state, mut scene) = setup(100, 30);
        let mut renderer = TerminalRenderer::new(Vec::new(), 100, 30);
        state.animator.toggle_pause();
        let tick = Duration::from_millis(16);

        state.frame(tick, &mut scene, &mut renderer).unwrap();
        let first = renderer.out.len();
        renderer.out.clear();
        state.frame(tick, &mut scene, &mut renderer).unwrap();
        let second = renderer.out.len();

        assert!(second < first / 10);
        // No cursor movement means no cell was rewritten
        let written = String::from_utf8_lossy(&renderer.out);
        assert!(!written.contains('H'));
    }

    #[test]
    fn resize_forces_a_full_repaint() {
        let (mut state, mut scene) = setup(80, 24);
        let mut renderer = TerminalRenderer::new(Vec::new(), 80, 24);
        let tick = Duration::from_millis(16);
        state.frame(tick, &mut scene, &mut renderer).unwrap();

        state.resize(100, 30);
        renderer.resize(100, 30);
        renderer.out.clear();
        state.frame(tick, &mut scene, &mut renderer).unwrap();

        assert_eq!(renderer.frame().width(), 100);
        assert_eq!(renderer.frame().height(), 30);
        assert!(renderer.out.len() > 100 * 30 * 6);
    }

    #[test]
    fn debug_overlay_names_the_package() {
        let (mut state, mut scene) = setup(120, 40);
        state.debug = true;
        let mut renderer = TerminalRenderer::new(Vec::new(), 120, 40);
        state
            .frame(Duration::from_millis(16), &mut scene, &mut renderer)
            .unwrap();
        assert!(row(renderer.frame(), 0).contains(env!("CARGO_PKG_NAME")));
        assert!(row(renderer.frame(), 2).contains("Ticks: 1"));
        assert!(row(renderer.frame(), 8).contains("Stars: 0"));
    }
}
