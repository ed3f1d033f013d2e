use crate::core::generator::StarChartGenerator;
use crate::domain::observer::Observer;
use crate::domain::ports::{CatalogSource, ChartRenderer, ChartSink};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_path: String,
    pub visible_objects: usize,
    pub segments: usize,
    pub width: u32,
    pub height: u32,
}

/// Drives one chart run: load catalog, compute chart, render, write.
pub struct StarmapEngine<S: CatalogSource, R: ChartRenderer, W: ChartSink> {
    source: S,
    generator: StarChartGenerator<R>,
    sink: W,
    monitor: SystemMonitor,
}

impl<S: CatalogSource, R: ChartRenderer, W: ChartSink> StarmapEngine<S, R, W> {
    pub fn new(source: S, generator: StarChartGenerator<R>, sink: W) -> Self {
        Self {
            source,
            generator,
            sink,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn with_monitor(mut self, monitor: SystemMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn run(&mut self, observer: &Observer) -> Result<RunSummary> {
        tracing::info!(
            "🚀 Generating star chart for lat {:.4}, lon {:.4} at {}",
            observer.latitude(),
            observer.longitude(),
            observer.timestamp()
        );

        tracing::info!("📚 Loading catalog...");
        let catalog = self.source.load()?;
        self.monitor.log_phase("catalog");

        let chart = self.generator.compute(observer, &catalog);
        self.monitor.log_phase("chart");

        tracing::info!("🎨 Rendering chart...");
        let image = self.generator.render(&chart)?;
        self.monitor.log_phase("render");

        let output_path = self.sink.write(&image, &chart)?;
        self.monitor.log_phase("write");
        tracing::info!("✅ Chart saved to: {}", output_path);

        Ok(RunSummary {
            output_path,
            visible_objects: chart.points.len(),
            segments: chart.segments.len(),
            width: image.width,
            height: image.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generator::ChartOptions;
    use crate::domain::model::{
        Catalog, CatalogObject, ChartImage, ConstellationLine, ImageFormat, SkyChart,
    };
    use crate::utils::error::StarmapError;
    use std::cell::RefCell;

    struct StaticSource(Option<Catalog>);

    impl CatalogSource for StaticSource {
        fn load(&self) -> Result<Catalog> {
            self.0
                .clone()
                .ok_or_else(|| StarmapError::catalog("memory", "no catalog"))
        }
    }

    struct StubRenderer;

    impl ChartRenderer for StubRenderer {
        fn render(&self, chart: &SkyChart) -> Result<ChartImage> {
            Ok(ChartImage {
                format: ImageFormat::Svg,
                width: 10,
                height: 10,
                bytes: format!("{} points", chart.points.len()).into_bytes(),
            })
        }
    }

    #[derive(Default)]
    struct MemorySink {
        written: RefCell<Vec<Vec<u8>>>,
    }

    impl ChartSink for &MemorySink {
        fn write(&self, image: &ChartImage, _chart: &SkyChart) -> Result<String> {
            self.written.borrow_mut().push(image.bytes.clone());
            Ok("memory://chart.svg".to_string())
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            "memory",
            vec![
                CatalogObject::new("polaris", 2.5303, 89.2641).with_magnitude(1.98),
                CatalogObject::new("kochab", 14.8451, 74.1555).with_magnitude(2.08),
                CatalogObject::new("sigma-oct", 21.1467, -88.9565).with_magnitude(5.45),
            ],
            vec![ConstellationLine::new("polaris", "kochab")],
        )
        .unwrap()
    }

    fn observer() -> Observer {
        let timestamp = Observer::parse_timestamp("2024-01-01T00:00:00Z", 0.0).unwrap();
        Observer::new(40.7, -74.0, None, timestamp).unwrap()
    }

    #[test]
    fn test_run_writes_chart_and_reports_counts() {
        let sink = MemorySink::default();
        let generator = StarChartGenerator::new(ChartOptions::default(), StubRenderer);
        let mut engine = StarmapEngine::new(StaticSource(Some(catalog())), generator, &sink);

        let summary = engine.run(&observer()).unwrap();

        assert_eq!(summary.output_path, "memory://chart.svg");
        assert_eq!(summary.visible_objects, 2);
        assert_eq!(summary.segments, 1);
        assert_eq!((summary.width, summary.height), (10, 10));
        assert_eq!(sink.written.borrow().as_slice(), &[b"2 points".to_vec()]);
    }

    #[test]
    fn test_catalog_failure_writes_nothing() {
        let sink = MemorySink::default();
        let generator = StarChartGenerator::new(ChartOptions::default(), StubRenderer);
        let mut engine = StarmapEngine::new(StaticSource(None), generator, &sink);

        let err = engine.run(&observer()).unwrap_err();

        assert!(matches!(err, StarmapError::CatalogLoadError { .. }));
        assert!(sink.written.borrow().is_empty());
    }
}
