use crate::core::projection::Projection;
use crate::core::transform::ObserverFrame;
use crate::domain::model::{Catalog, ChartImage, ChartSegment, ProjectedPoint, SkyChart};
use crate::domain::observer::Observer;
use crate::domain::ports::ChartRenderer;
use crate::utils::error::Result;
use std::collections::HashMap;

/// What ends up on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub projection: Projection,
    /// Drop objects whose altitude is below zero.
    pub horizon_filter: bool,
    /// Faintest magnitude drawn; objects without a magnitude are always kept.
    pub max_magnitude: f64,
    pub draw_constellations: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            projection: Projection::Stereographic,
            horizon_filter: true,
            max_magnitude: 10.0,
            draw_constellations: true,
        }
    }
}

pub struct StarChartGenerator<R: ChartRenderer> {
    options: ChartOptions,
    renderer: R,
}

impl<R: ChartRenderer> StarChartGenerator<R> {
    pub fn new(options: ChartOptions, renderer: R) -> Self {
        Self { options, renderer }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Places every visible catalog object on the chart plane.
    pub fn compute(&self, observer: &Observer, catalog: &Catalog) -> SkyChart {
        let frame = ObserverFrame::new(observer);
        tracing::debug!(
            "Local sidereal time {:.4}h at {}",
            frame.local_sidereal_hours(),
            observer.timestamp()
        );

        let mut points = Vec::new();
        let mut placed: HashMap<&str, (f64, f64)> = HashMap::new();
        let (mut too_faint, mut below_horizon, mut unprojectable) = (0usize, 0usize, 0usize);

        for object in catalog.objects() {
            if object.magnitude.is_some_and(|m| m > self.options.max_magnitude) {
                too_faint += 1;
                continue;
            }

            let position = frame.locate(object);
            if self.options.horizon_filter && !position.is_above_horizon() {
                below_horizon += 1;
                continue;
            }

            let Some((x, y)) = self.options.projection.project(&position) else {
                unprojectable += 1;
                continue;
            };

            placed.insert(object.id.as_str(), (x, y));
            points.push(ProjectedPoint {
                id: object.id.clone(),
                name: object.name.clone(),
                altitude: position.altitude,
                azimuth: position.azimuth,
                x,
                y,
                magnitude: object.magnitude,
            });
        }

        let segments: Vec<ChartSegment> = if self.options.draw_constellations {
            catalog
                .lines()
                .iter()
                .filter_map(|line| {
                    let from = placed.get(line.from.as_str())?;
                    let to = placed.get(line.to.as_str())?;
                    Some(ChartSegment {
                        constellation: line.constellation.clone(),
                        from: *from,
                        to: *to,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        tracing::info!(
            "🔭 {} of {} objects visible ({} too faint, {} below horizon, {} outside projection), {} constellation segments",
            points.len(),
            catalog.len(),
            too_faint,
            below_horizon,
            unprojectable,
            segments.len()
        );

        SkyChart {
            points,
            segments,
            fallback_magnitude: self.options.max_magnitude,
        }
    }

    /// Computes the chart and hands it to the renderer.
    pub fn generate(&self, observer: &Observer, catalog: &Catalog) -> Result<ChartImage> {
        let chart = self.compute(observer, catalog);
        self.renderer.render(&chart)
    }

    pub fn render(&self, chart: &SkyChart) -> Result<ChartImage> {
        self.renderer.render(chart)
    }
}
