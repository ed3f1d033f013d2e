// Adapters layer: concrete implementations for external systems (files, http, rendering).

pub mod catalog;
pub mod lines;
pub mod output;
pub mod remote;
pub mod render;
pub mod source;

pub use output::FileChartSink;
pub use remote::RemoteFetcher;
pub use render::{ChartStyle, PlottersRenderer};
pub use source::FileCatalogSource;
