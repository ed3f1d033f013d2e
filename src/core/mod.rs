pub mod engine;
pub mod generator;
pub mod projection;
pub mod transform;

pub use engine::{RunSummary, StarmapEngine};
pub use generator::{ChartOptions, StarChartGenerator};
pub use projection::Projection;
pub use crate::domain::ports::{CatalogSource, ChartRenderer, ChartSink};
pub use crate::utils::error::Result;
