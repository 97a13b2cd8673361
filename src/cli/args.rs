use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::processors::YearPolicy;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "warmth-grid")]
#[command(about = "Warmth index climate zone grid builder backed by NASA POWER")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file (TOML, YAML or JSON); WARMTH_GRID_* variables override it"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, classify and write the full grid dataset
    Generate {
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// Strict 3x3 run over Kanto (2022-2024, full years only) to check the pipeline
    Preview {
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// List the grid points the current settings would visit
    Points {
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// Display information about a generated dataset file
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Command-line overrides applied on top of the loaded settings.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOverrides {
    #[arg(long, help = "Region label stored in the dataset metadata")]
    pub region: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat_min: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat_max: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon_min: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon_max: Option<f64>,

    #[arg(long, help = "Grid step in degrees")]
    pub step: Option<f64>,

    #[arg(long)]
    pub start_year: Option<i32>,

    #[arg(long)]
    pub end_year: Option<i32>,

    #[arg(long, help = "Pause after each network request, in milliseconds")]
    pub request_delay_ms: Option<u64>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    #[arg(short, long, help = "Output dataset path")]
    pub output_file: Option<PathBuf>,

    #[arg(long, help = "Failure log CSV path")]
    pub fail_log: Option<PathBuf>,

    #[arg(long, help = "Only classify years with all 12 months observed")]
    pub strict: bool,

    #[arg(long, help = "Indent the JSON output")]
    pub pretty: bool,
}

impl RunOverrides {
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(region) = &self.region {
            settings.region = region.clone();
        }
        if let Some(lat_min) = self.lat_min {
            settings.lat_min = lat_min;
        }
        if let Some(lat_max) = self.lat_max {
            settings.lat_max = lat_max;
        }
        if let Some(lon_min) = self.lon_min {
            settings.lon_min = lon_min;
        }
        if let Some(lon_max) = self.lon_max {
            settings.lon_max = lon_max;
        }
        if let Some(step) = self.step {
            settings.step = step;
        }
        if let Some(start_year) = self.start_year {
            settings.start_year = start_year;
        }
        if let Some(end_year) = self.end_year {
            settings.end_year = end_year;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout_secs {
            settings.timeout_secs = timeout;
        }
        if let Some(cache_dir) = &self.cache_dir {
            settings.cache_dir = cache_dir.clone();
        }
        if let Some(output_file) = &self.output_file {
            settings.output_path = output_file.clone();
        }
        if let Some(fail_log) = &self.fail_log {
            settings.fail_log = fail_log.clone();
        }
        if self.strict {
            settings.year_policy = YearPolicy::FullYear;
        }
        if self.pretty {
            settings.pretty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_with_overrides() {
        let cli = Cli::parse_from([
            "warmth-grid",
            "generate",
            "--lat-min",
            "35.0",
            "--lon-max",
            "141.0",
            "--start-year",
            "2020",
            "--strict",
            "-o",
            "out/grid.json",
        ]);

        let Commands::Generate { overrides } = cli.command else {
            panic!("expected generate command");
        };

        let mut settings = Settings::default();
        overrides.apply_to(&mut settings);

        assert_eq!(settings.lat_min, 35.0);
        assert_eq!(settings.lon_max, 141.0);
        assert_eq!(settings.start_year, 2020);
        assert_eq!(settings.year_policy, YearPolicy::FullYear);
        assert_eq!(settings.output_path, PathBuf::from("out/grid.json"));
        // Untouched values keep their defaults
        assert_eq!(settings.step, Settings::default().step);
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let cli = Cli::parse_from(["warmth-grid", "points", "--lon-min", "-10.5", "--lon-max", "-5"]);
        let Commands::Points { overrides } = cli.command else {
            panic!("expected points command");
        };
        assert_eq!(overrides.lon_min, Some(-10.5));
        assert_eq!(overrides.lon_max, Some(-5.0));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["warmth-grid", "info", "-f", "grid.json", "-v", "-c", "grid.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("grid.toml")));
        assert!(matches!(cli.command, Commands::Info { .. }));
    }
}
