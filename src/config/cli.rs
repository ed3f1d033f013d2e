use crate::config::StarmapConfig;
use crate::core::projection::Projection;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "starmap")]
#[command(about = "Render the sky above an observer as a PNG or SVG star chart")]
pub struct CliArgs {
    #[arg(short, long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true, help = "Observer latitude in degrees, north positive")]
    pub lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true, help = "Observer longitude in degrees, east positive")]
    pub lon: Option<f64>,

    #[arg(long, allow_negative_numbers = true, help = "Observer elevation in metres")]
    pub elevation: Option<f64>,

    #[arg(long, help = "Observation time: RFC 3339 or 'YYYY-MM-DD HH:MM' local time")]
    pub time: Option<String>,

    #[arg(long, allow_negative_numbers = true, help = "Fixed UTC offset in hours, instead of the time zone at --lat/--lon")]
    pub utc_offset: Option<f64>,

    #[arg(long, help = "Star catalog path or URL (.csv or Hipparcos .dat)")]
    pub catalog: Option<String>,

    #[arg(long, help = "Constellation lines path or URL (.fab or .csv)")]
    pub lines: Option<String>,

    #[arg(short, long, help = "Output image path (.png or .svg)")]
    pub output: Option<String>,

    #[arg(long, help = "Also export projected points (.csv or .json)")]
    pub points: Option<String>,

    #[arg(long, value_enum)]
    pub projection: Option<Projection>,

    #[arg(long, help = "Faintest magnitude to draw")]
    pub max_magnitude: Option<f64>,

    #[arg(long, help = "Do not draw constellation lines")]
    pub no_constellations: bool,

    #[arg(long, help = "Keep objects below the horizon")]
    pub show_below_horizon: bool,

    #[arg(long)]
    pub dpi: Option<u32>,

    #[arg(long, help = "Canvas side in inches")]
    pub figure_size: Option<f64>,

    #[arg(long, help = "Star color as #rrggbb")]
    pub star_color: Option<String>,

    #[arg(long, help = "Background color as #rrggbb")]
    pub background_color: Option<String>,

    #[arg(long, help = "Background opacity between 0 and 1")]
    pub background_alpha: Option<f64>,

    #[arg(long, help = "Constellation line color as #rrggbb")]
    pub constellation_color: Option<String>,

    #[arg(long, help = "Constellation line width in points")]
    pub constellation_width: Option<f64>,

    #[arg(long, help = "Marker area in pt² of a magnitude 0 star")]
    pub star_scaling: Option<f64>,

    #[arg(long, help = "Largest marker area in pt²")]
    pub star_size_limit: Option<f64>,

    #[arg(long, help = "Download remote catalogs again even if cached")]
    pub refresh_catalog: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Validate configuration and exit without rendering")]
    pub dry_run: bool,
}

impl CliArgs {
    /// Command line values take precedence over the file.
    pub fn apply_to(&self, config: &mut StarmapConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_some<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set_some(&mut config.observer.latitude, &self.lat);
        set_some(&mut config.observer.longitude, &self.lon);
        set_some(&mut config.observer.elevation, &self.elevation);
        set_some(&mut config.observer.time, &self.time);
        set_some(&mut config.observer.utc_offset_hours, &self.utc_offset);

        set(&mut config.catalog.stars, &self.catalog);
        set_some(&mut config.catalog.constellations, &self.lines);
        config.catalog.refresh |= self.refresh_catalog;

        set(&mut config.chart.projection, &self.projection);
        set(&mut config.chart.max_magnitude, &self.max_magnitude);
        if self.no_constellations {
            config.chart.draw_constellations = false;
        }
        if self.show_below_horizon {
            config.chart.horizon_filter = false;
        }

        set(&mut config.style.dpi, &self.dpi);
        set(&mut config.style.figure_size, &self.figure_size);
        set(&mut config.style.star_color, &self.star_color);
        set(&mut config.style.background_color, &self.background_color);
        set(&mut config.style.background_alpha, &self.background_alpha);
        set(&mut config.style.constellation_color, &self.constellation_color);
        set(&mut config.style.constellation_width, &self.constellation_width);
        set(&mut config.style.star_scaling, &self.star_scaling);
        set(&mut config.style.star_size_limit, &self.star_size_limit);

        set(&mut config.output.path, &self.output);
        set_some(&mut config.output.points_path, &self.points);

        config.monitoring.enabled |= self.monitor;
        config.monitoring.log_json |= self.log_json;
    }

    /// Loads the config file when given, then applies the overrides.
    pub fn load_config(&self) -> crate::utils::error::Result<StarmapConfig> {
        let mut config = match &self.config {
            Some(path) => StarmapConfig::from_file(path)?,
            None => StarmapConfig::default(),
        };
        self.apply_to(&mut config);
        Ok(config)
    }
}
