use crate::domain::model::{Catalog, ChartImage, SkyChart};
use crate::utils::error::Result;

/// Supplies the star and constellation data for a run.
pub trait CatalogSource {
    fn load(&self) -> Result<Catalog>;
}

/// Turns a computed chart into an encoded image.
pub trait ChartRenderer {
    fn render(&self, chart: &SkyChart) -> Result<ChartImage>;
}

/// Persists a rendered chart and returns where it went.
pub trait ChartSink {
    fn write(&self, image: &ChartImage, chart: &SkyChart) -> Result<String>;
}
