pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::StarmapConfig;

pub use adapters::{ChartStyle, FileCatalogSource, FileChartSink, PlottersRenderer, RemoteFetcher};
pub use core::{ChartOptions, Projection, RunSummary, StarChartGenerator, StarmapEngine};
pub use domain::model::{Catalog, CatalogObject, ChartImage, ConstellationLine, ImageFormat, SkyChart};
pub use domain::observer::Observer;
pub use utils::error::{Result, StarmapError};
