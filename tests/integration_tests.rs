use starmap::utils::validation::Validate;
use starmap::{
    ChartOptions, ChartStyle, FileCatalogSource, FileChartSink, ImageFormat, Observer,
    PlottersRenderer, Projection, RemoteFetcher, StarChartGenerator, StarmapConfig, StarmapEngine,
    StarmapError,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn data_file(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join(name)
        .display()
        .to_string()
}

fn small_style() -> ChartStyle {
    ChartStyle {
        figure_size: 2.0,
        dpi: 64,
        ..ChartStyle::default()
    }
}

fn new_york_evening() -> Observer {
    let timestamp = Observer::parse_timestamp("2024-06-21 22:30", -4.0).unwrap();
    Observer::new(40.7128, -74.006, Some(10.0), timestamp).unwrap()
}

fn bundled_source(cache_dir: &Path) -> FileCatalogSource {
    FileCatalogSource::new(data_file("bright_stars.csv"), RemoteFetcher::new(cache_dir, false))
        .with_lines(data_file("constellations.fab"), Default::default())
}

fn run_to(output: &Path, options: ChartOptions, observer: &Observer) -> starmap::Result<starmap::RunSummary> {
    let format = ImageFormat::from_path(&output.display().to_string())?;
    let generator = StarChartGenerator::new(options, PlottersRenderer::new(small_style(), format));
    let cache_dir = output.with_file_name("cache");
    let mut engine =
        StarmapEngine::new(bundled_source(&cache_dir), generator, FileChartSink::new(output));
    engine.run(observer)
}

#[test]
fn test_end_to_end_png_chart() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("charts/new-york.png");

    let summary = run_to(&output, ChartOptions::default(), &new_york_evening()).unwrap();

    assert_eq!(summary.output_path, output.display().to_string());
    assert_eq!((summary.width, summary.height), (128, 128));
    assert!(summary.visible_objects > 0);
    assert!(summary.visible_objects < 32);

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (128, 128));
}

#[test]
fn test_end_to_end_svg_chart() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("new-york.svg");

    let summary = run_to(&output, ChartOptions::default(), &new_york_evening()).unwrap();

    let svg = std::fs::read_to_string(&output).unwrap();
    assert!(svg.contains("<svg"));
    assert_eq!(svg.matches("<circle").count(), summary.visible_objects);
}

#[test]
fn test_output_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("a.png");
    let second = temp_dir.path().join("b.png");

    run_to(&first, ChartOptions::default(), &new_york_evening()).unwrap();
    run_to(&second, ChartOptions::default(), &new_york_evening()).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_polaris_sits_near_observer_latitude_due_north() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = starmap::domain::ports::CatalogSource::load(&bundled_source(temp_dir.path())).unwrap();
    let generator = StarChartGenerator::new(
        ChartOptions::default(),
        PlottersRenderer::new(small_style(), ImageFormat::Svg),
    );

    let chart = generator.compute(&new_york_evening(), &catalog);
    let polaris = chart.point("11767").expect("Polaris is always up at 40N");

    assert!((polaris.altitude - 40.7).abs() < 1.0, "altitude {}", polaris.altitude);
    assert!(polaris.azimuth < 2.0 || polaris.azimuth > 358.0, "azimuth {}", polaris.azimuth);
    assert!(polaris.y > 0.0);
    assert!(polaris.x.abs() < 0.05);

    // 南天極附近的星在北半球永遠看不到
    assert!(chart.point("104382").is_none());
    assert!(chart.point("60718").is_none());
}

#[test]
fn test_horizon_filter_and_projection_options() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = starmap::domain::ports::CatalogSource::load(&bundled_source(temp_dir.path())).unwrap();
    let renderer = || PlottersRenderer::new(small_style(), ImageFormat::Svg);

    let filtered = StarChartGenerator::new(ChartOptions::default(), renderer())
        .compute(&new_york_evening(), &catalog);
    let everything = StarChartGenerator::new(
        ChartOptions {
            horizon_filter: false,
            ..ChartOptions::default()
        },
        renderer(),
    )
    .compute(&new_york_evening(), &catalog);
    let orthographic = StarChartGenerator::new(
        ChartOptions {
            horizon_filter: false,
            projection: Projection::Orthographic,
            ..ChartOptions::default()
        },
        renderer(),
    )
    .compute(&new_york_evening(), &catalog);

    assert_eq!(everything.points.len(), catalog.len());
    assert!(filtered.points.len() < everything.points.len());
    // 正射投影無法表示地平線以下
    assert_eq!(orthographic.points.len(), filtered.points.len());
    assert!(filtered.points.iter().all(|p| p.altitude >= 0.0));
    assert!(filtered.points.iter().all(|p| p.x.hypot(p.y) <= 1.0 + 1e-9));
}

#[test]
fn test_missing_catalog_leaves_no_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("chart.png");
    let generator = StarChartGenerator::new(
        ChartOptions::default(),
        PlottersRenderer::new(small_style(), ImageFormat::Png),
    );
    let source = FileCatalogSource::new(
        temp_dir.path().join("missing.csv").display().to_string(),
        RemoteFetcher::new(temp_dir.path(), false),
    );

    let err = StarmapEngine::new(source, generator, FileChartSink::new(&output))
        .run(&new_york_evening())
        .unwrap_err();

    assert!(matches!(err, StarmapError::CatalogLoadError { .. }));
    assert_eq!(err.exit_code(), 3);
    assert!(!output.exists());
}

#[test]
fn test_dangling_constellation_line_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let lines = temp_dir.path().join("lines.csv");
    std::fs::write(&lines, "constellation,from,to\nOri,27989,999999\n").unwrap();

    let source = FileCatalogSource::new(data_file("bright_stars.csv"), RemoteFetcher::new(temp_dir.path(), false))
        .with_lines(lines.display().to_string(), Default::default());

    let err = starmap::domain::ports::CatalogSource::load(&source).unwrap_err();
    assert!(matches!(err, StarmapError::CatalogLoadError { .. }));
    assert!(err.to_string().contains("999999"));
}

#[test]
fn test_invalid_observer_is_rejected() {
    let timestamp = Observer::parse_timestamp("2024-06-21T00:00:00Z", 0.0).unwrap();

    let err = Observer::new(91.0, 0.0, None, timestamp).unwrap_err();
    assert!(matches!(err, StarmapError::InvalidObserverError { .. }));
    assert_eq!(err.kind(), "InvalidObserverError");
    assert_eq!(err.exit_code(), 2);

    assert!(Observer::new(0.0, 180.5, None, timestamp).is_err());
    assert!(Observer::parse_timestamp("yesterday evening", 0.0).is_err());
}

#[test]
fn test_unsupported_output_extension_is_a_render_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("chart.jpg");

    let err = run_to(&output, ChartOptions::default(), &new_york_evening()).unwrap_err();

    assert!(matches!(err, StarmapError::RenderError { .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(!output.exists());
}

#[test]
fn test_config_file_drives_a_full_run() {
    let temp_dir = TempDir::new().unwrap();
    let output: PathBuf = temp_dir.path().join("sky.svg");
    let points = temp_dir.path().join("points.csv");
    let toml = format!(
        r#"
[observer]
latitude = -33.87
longitude = 151.21
time = "2024-06-21T12:00:00Z"

[catalog]
stars = '{stars}'
constellations = '{lines}'
cache_dir = '{cache}'

[chart]
projection = "polar"

[style]
figure_size = 1.0
dpi = 100

[output]
path = '{output}'
points_path = '{points}'
"#,
        stars = data_file("bright_stars.csv"),
        lines = data_file("constellations.fab"),
        cache = temp_dir.path().join("cache").display(),
        output = output.display(),
        points = points.display(),
    );

    let config = StarmapConfig::from_toml_str(&toml).unwrap();
    config.validate().unwrap();

    let renderer = PlottersRenderer::new(config.chart_style().unwrap(), config.output_format().unwrap());
    let generator = StarChartGenerator::new(config.chart_options(), renderer);
    let sink = FileChartSink::new(&config.output.path)
        .with_points(config.output.points_path.as_deref().unwrap());
    let summary = StarmapEngine::new(config.catalog_source(), generator, sink)
        .run(&config.observer().unwrap())
        .unwrap();

    assert_eq!((summary.width, summary.height), (100, 100));
    assert!(output.exists());

    let exported = std::fs::read_to_string(&points).unwrap();
    // Sydney 的南十字座在六月夜晚高掛，北極星不在地平線以上
    assert!(exported.contains("Acrux"));
    assert!(!exported.contains("Polaris"));
    assert_eq!(exported.lines().count(), summary.visible_objects + 1);
}

#[test]
fn test_polaris_is_circumpolar_through_the_night() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = starmap::domain::ports::CatalogSource::load(&bundled_source(temp_dir.path())).unwrap();
    let generator = StarChartGenerator::new(
        ChartOptions::default(),
        PlottersRenderer::new(small_style(), ImageFormat::Svg),
    );

    for hour in 0..24 {
        let time = format!("2024-06-21T{:02}:00:00Z", hour);
        let observer = Observer::new(40.7, -74.0, None, Observer::parse_timestamp(&time, 0.0).unwrap()).unwrap();
        let chart = generator.compute(&observer, &catalog);

        let polaris = chart.point("11767").unwrap();
        assert!((polaris.altitude - 40.7).abs() < 1.0, "{}: altitude {}", time, polaris.altitude);
        assert!(polaris.y > 0.0, "{}: Polaris left the upper half", time);
    }
}
