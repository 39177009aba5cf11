use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::{cursor, execute, style::ResetColor, terminal};
use std::fs::File;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use solar3d::animation::Clock;
use solar3d::body::Registry;
use solar3d::camera::Viewport;
use solar3d::config::Config;
use solar3d::renderer::{Presenter, TerminalRenderer};
use solar3d::scene::Scene;
use solar3d::state::{AppState, Control};

/// Size used when the terminal cannot report one
const FALLBACK_VIEWPORT: Viewport = Viewport {
    width: 80,
    height: 24,
};

/// Logs only ever go to `--log-file`; stderr would draw over the animation
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let (Some(filter), Some(path)) = (config.log_filter(rust_log.as_deref()), &config.log_file)
    else {
        if rust_log.is_some() {
            eprintln!("RUST_LOG is ignored without --log-file");
        }
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::new()
        .parse_filters(&filter)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("cannot initialise logging")
}

/// Raw mode, alternate screen and mouse capture, undone on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        // From here on, drop restores whatever was entered
        let guard = TerminalGuard;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let restored = execute!(
            io::stdout(),
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        if let Err(err) = restored.and_then(|_| terminal::disable_raw_mode()) {
            log::error!("cannot restore terminal: {}", err);
        }
    }
}

fn viewport_size() -> Viewport {
    if let Some(size) = termsize::get() {
        return Viewport {
            width: size.cols,
            height: size.rows,
        };
    }
    match terminal::size() {
        Ok((width, height)) => Viewport { width, height },
        Err(err) => {
            log::warn!("cannot read terminal size: {}", err);
            FALLBACK_VIEWPORT
        }
    }
}

fn run(
    config: &Config,
    state: &mut AppState,
    scene: &mut Scene,
    renderer: &mut TerminalRenderer<Stdout>,
) -> anyhow::Result<()> {
    let frame_budget = config.frame_budget();
    let mut clock = Clock::start();

    loop {
        let frame_start = Instant::now();

        // Drain input so every change is visible to this tick
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if state.handle_key(key) == Control::Quit {
                        log::info!("quit after {:.1}s", clock.elapsed().as_secs_f64());
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => state.handle_mouse(mouse),
                Event::Resize(width, height) => {
                    log::debug!("terminal resized to {}x{}", width, height);
                    state.resize(width, height);
                    renderer.resize(width, height);
                }
                _ => {}
            }
        }

        state
            .frame(clock.lap(), scene, renderer)
            .context("failed to draw frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }
}

/// Main function
fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    let mut registry = Registry::solar_system().context("invalid body table")?;
    registry
        .set_all_speeds(config.speed)
        .context("invalid initial speed")?;

    let viewport = viewport_size();
    log::info!(
        "starting at {}x{}, {} fps, {:?} time step",
        viewport.width,
        viewport.height,
        config.fps,
        config.time_step
    );

    let mut scene = Scene::build(&registry, &config.starfield());
    let mut state = AppState::new(registry, config.time_step, viewport);
    state.debug = config.debug;

    let mut renderer = TerminalRenderer::new(io::stdout(), viewport.width, viewport.height);

    let guard = TerminalGuard::enter().context("cannot set up terminal")?;
    let result = run(&config, &mut state, &mut scene, &mut renderer);

    // Restore the terminal before reporting any error
    drop(guard);
    result
}
