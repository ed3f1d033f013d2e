#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::CliArgs;

use crate::adapters::catalog::CatalogFormat;
use crate::adapters::lines::LinesFormat;
use crate::adapters::remote::RemoteFetcher;
use crate::adapters::render::ChartStyle;
use crate::adapters::source::FileCatalogSource;
use crate::core::generator::ChartOptions;
use crate::core::projection::Projection;
use crate::domain::model::ImageFormat;
use crate::domain::observer::Observer;
use crate::utils::error::{Result, StarmapError};
use crate::utils::validation::{
    parse_hex_color, parse_remote_location, validate_extension, validate_path,
    validate_positive, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete run configuration, as read from `starmap.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StarmapConfig {
    pub observer: ObserverConfig,
    pub catalog: CatalogConfig,
    pub chart: ChartConfig,
    pub style: StyleConfig,
    pub output: OutputConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Metres above sea level.
    pub elevation: Option<f64>,
    /// RFC 3339, or `YYYY-MM-DD HH:MM` wall-clock time at the observer's location.
    pub time: Option<String>,
    /// Fixed offset for naive times, replacing the time zone lookup.
    pub utc_offset_hours: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path or http(s) URL of the star catalog.
    pub stars: String,
    pub format: CatalogFormat,
    pub constellations: Option<String>,
    pub constellations_format: LinesFormat,
    pub cache_dir: String,
    pub refresh: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            stars: "data/bright_stars.csv".to_string(),
            format: CatalogFormat::Auto,
            constellations: Some("data/constellations.fab".to_string()),
            constellations_format: LinesFormat::Auto,
            cache_dir: ".starmap-cache".to_string(),
            refresh: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub projection: Projection,
    pub horizon_filter: bool,
    pub max_magnitude: f64,
    pub draw_constellations: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let options = ChartOptions::default();
        Self {
            projection: options.projection,
            horizon_filter: options.horizon_filter,
            max_magnitude: options.max_magnitude,
            draw_constellations: options.draw_constellations,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub background_color: String,
    pub background_alpha: f64,
    pub star_color: String,
    pub constellation_color: String,
    pub constellation_width: f64,
    pub star_scaling: f64,
    pub star_size_limit: f64,
    pub figure_size: f64,
    pub dpi: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let style = ChartStyle::default();
        let hex = |(r, g, b): (u8, u8, u8)| format!("#{:02x}{:02x}{:02x}", r, g, b);
        Self {
            background_color: hex(style.background),
            background_alpha: style.background_alpha,
            star_color: hex(style.star_color),
            constellation_color: hex(style.constellation_color),
            constellation_width: style.constellation_width,
            star_scaling: style.star_scaling,
            star_size_limit: style.star_size_limit,
            figure_size: style.figure_size,
            dpi: style.dpi,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    /// Optional `.csv` or `.json` export of the projected points.
    pub points_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "starmap.png".to_string(),
            points_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_json: bool,
}

impl StarmapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| StarmapError::ConfigValidationError {
                field: "config".to_string(),
                message: format!("cannot read '{}': {}", path.display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StarmapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STARMAP_LAT})，未設定的保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::{Captures, Regex};

        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            StarmapError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// Builds the observer; missing fields are configuration errors.
    pub fn observer(&self) -> Result<Observer> {
        let required = |value: Option<f64>, field: &str| {
            value.ok_or_else(|| StarmapError::MissingConfigError {
                field: format!("observer.{}", field),
            })
        };
        let latitude = required(self.observer.latitude, "latitude")?;
        let longitude = required(self.observer.longitude, "longitude")?;
        let time = self
            .observer
            .time
            .as_deref()
            .ok_or_else(|| StarmapError::MissingConfigError {
                field: "observer.time".to_string(),
            })?;

        let timestamp = match self.observer.utc_offset_hours {
            Some(offset) => Observer::parse_timestamp(time, offset)?,
            None => Observer::parse_local_timestamp(time, latitude, longitude)?,
        };
        Observer::new(latitude, longitude, self.observer.elevation, timestamp)
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            projection: self.chart.projection,
            horizon_filter: self.chart.horizon_filter,
            max_magnitude: self.chart.max_magnitude,
            draw_constellations: self.chart.draw_constellations,
        }
    }

    pub fn chart_style(&self) -> Result<ChartStyle> {
        Ok(ChartStyle {
            background: parse_hex_color("style.background_color", &self.style.background_color)?,
            background_alpha: self.style.background_alpha,
            star_color: parse_hex_color("style.star_color", &self.style.star_color)?,
            constellation_color: parse_hex_color(
                "style.constellation_color",
                &self.style.constellation_color,
            )?,
            constellation_width: self.style.constellation_width,
            star_scaling: self.style.star_scaling,
            star_size_limit: self.style.star_size_limit,
            figure_size: self.style.figure_size,
            dpi: self.style.dpi,
        })
    }

    pub fn output_format(&self) -> Result<ImageFormat> {
        ImageFormat::from_path(&self.output.path)
    }

    pub fn catalog_source(&self) -> FileCatalogSource {
        let fetcher = RemoteFetcher::new(&self.catalog.cache_dir, self.catalog.refresh);
        let source = FileCatalogSource::new(&self.catalog.stars, fetcher)
            .with_star_format(self.catalog.format);

        // 星座連線檔未設定或關閉繪製時不載入
        match &self.catalog.constellations {
            Some(lines) if self.chart.draw_constellations => {
                source.with_lines(lines, self.catalog.constellations_format)
            }
            _ => source,
        }
    }

    /// One-line description used by `--dry-run` and the startup log.
    pub fn summary(&self) -> String {
        format!(
            "observer=({}, {}) time={} catalog={} lines={} projection={} max_magnitude={} output={}",
            display_option(self.observer.latitude),
            display_option(self.observer.longitude),
            self.observer.time.as_deref().unwrap_or("-"),
            self.catalog.stars,
            match (&self.catalog.constellations, self.chart.draw_constellations) {
                (Some(lines), true) => lines.as_str(),
                _ => "-",
            },
            self.chart.projection.name(),
            self.chart.max_magnitude,
            self.output.path
        )
    }
}

fn display_option(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl Validate for StarmapConfig {
    fn validate(&self) -> Result<()> {
        validate_path("catalog.stars", &self.catalog.stars)?;
        parse_remote_location("catalog.stars", &self.catalog.stars)?;
        if let Some(lines) = &self.catalog.constellations {
            validate_path("catalog.constellations", lines)?;
            parse_remote_location("catalog.constellations", lines)?;
        }
        validate_path("catalog.cache_dir", &self.catalog.cache_dir)?;

        validate_range("chart.max_magnitude", self.chart.max_magnitude, 0.0, 15.0)?;

        let style = self.chart_style()?;
        validate_range("style.background_alpha", style.background_alpha, 0.0, 1.0)?;
        validate_positive("style.constellation_width", style.constellation_width)?;
        validate_range("style.constellation_width", style.constellation_width, 0.0, 20.0)?;
        validate_positive("style.star_scaling", style.star_scaling)?;
        validate_positive("style.star_size_limit", style.star_size_limit)?;
        validate_positive("style.figure_size", style.figure_size)?;
        validate_range("style.dpi", style.dpi, 1, 10_000)?;
        let canvas = style.figure_size * style.dpi as f64;
        if !(16.0..=20_000.0).contains(&canvas.round()) {
            return Err(StarmapError::InvalidConfigValueError {
                field: "style.figure_size".to_string(),
                value: format!("{} in at {} dpi", style.figure_size, style.dpi),
                reason: "canvas side must be between 16 and 20000 pixels".to_string(),
            });
        }

        validate_path("output.path", &self.output.path)?;
        self.output_format()?;
        if let Some(points) = &self.output.points_path {
            validate_path("output.points_path", points)?;
            validate_extension("output.points_path", points, &["csv", "json"])?;
        }

        // 觀測者錯誤保留 InvalidObserverError 類別
        self.observer()?;
        Ok(())
    }
}
