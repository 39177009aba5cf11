use crate::animation::TimeStep;
use crate::body::{MAX_SPEED, MIN_SPEED};
use crate::scene::StarfieldConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command line options
#[derive(Parser, Debug, Clone)]
#[command(name = "solar3d", version, about = "A console-based 3D solar system animation")]
pub struct Config {
    /// Target frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Advance by fixed steps per frame, or scale steps by the measured frame time
    #[arg(long, value_enum, default_value_t = TimeStep::Frame)]
    pub time_step: TimeStep,

    /// Initial speed multiplier of every planet
    #[arg(long, default_value_t = 1.0, value_parser = parse_speed)]
    pub speed: f64,

    /// Number of background stars
    #[arg(long, default_value_t = 10_000)]
    pub stars: usize,

    /// Edge length of the cube the stars are scattered in
    #[arg(long, default_value_t = 2000.0)]
    pub star_spread: f64,

    /// Seed for a reproducible starfield
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start with the debug overlay enabled
    #[arg(long)]
    pub debug: bool,

    /// Write logs to this file, filtered by RUST_LOG (default `info`).
    /// Without it nothing is logged, since the screen belongs to the animation.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    /// Log filter to install, or `None` when logging stays off
    pub fn log_filter(&self, rust_log: Option<&str>) -> Option<String> {
        self.log_file.as_ref()?;
        Some(rust_log.unwrap_or("info").to_string())
    }

    pub fn starfield(&self) -> StarfieldConfig {
        StarfieldConfig {
            count: self.stars,
            spread: self.star_spread,
            seed: self.seed,
        }
    }
}

fn parse_speed(value: &str) -> Result<f64, String> {
    let speed: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if (MIN_SPEED..=MAX_SPEED).contains(&speed) {
        Ok(speed)
    } else {
        Err(format!("speed must be between {} and {}", MIN_SPEED, MAX_SPEED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["solar3d"]).unwrap();
        assert_eq!(config.fps, 60);
        assert_eq!(config.time_step, TimeStep::Frame);
        assert_eq!(config.speed, 1.0);
        assert_eq!(config.starfield().count, 10_000);
        assert_eq!(config.starfield().spread, 2000.0);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn parses_every_option() {
        let config = Config::try_parse_from([
            "solar3d",
            "--fps",
            "30",
            "--time-step",
            "delta",
            "--speed",
            "2.5",
            "--stars",
            "500",
            "--seed",
            "42",
            "--debug",
            "--log-file",
            "solar3d.log",
        ])
        .unwrap();
        assert_eq!(config.time_step, TimeStep::Delta);
        assert_eq!(config.speed, 2.5);
        assert_eq!(config.starfield().seed, Some(42));
        assert!(config.debug);
        assert_eq!(config.frame_budget(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn logging_needs_a_file() {
        let config = Config::try_parse_from(["solar3d"]).unwrap();
        assert_eq!(config.log_filter(Some("debug")), None);

        let config = Config::try_parse_from(["solar3d", "--log-file", "solar3d.log"]).unwrap();
        assert_eq!(config.log_filter(None).as_deref(), Some("info"));
        assert_eq!(
            config.log_filter(Some("solar3d=trace")).as_deref(),
            Some("solar3d=trace")
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Config::try_parse_from(["solar3d", "--speed", "6"]).is_err());
        assert!(Config::try_parse_from(["solar3d", "--speed", "fast"]).is_err());
        assert!(Config::try_parse_from(["solar3d", "--fps", "0"]).is_err());
        assert!(Config::try_parse_from(["solar3d", "--time-step", "wall"]).is_err());
    }
}
