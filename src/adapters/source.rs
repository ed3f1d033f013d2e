use crate::adapters::catalog::{read_catalog, CatalogFormat};
use crate::adapters::lines::{read_lines, LinesFormat};
use crate::adapters::remote::RemoteFetcher;
use crate::domain::model::Catalog;
use crate::domain::ports::CatalogSource;
use crate::utils::error::{Result, StarmapError};
use std::fs::File;
use std::path::Path;

/// Loads the star catalog and optional constellation lines from files or URLs.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    stars: String,
    star_format: CatalogFormat,
    lines: Option<String>,
    lines_format: LinesFormat,
    fetcher: RemoteFetcher,
}

impl FileCatalogSource {
    pub fn new(stars: impl Into<String>, fetcher: RemoteFetcher) -> Self {
        Self {
            stars: stars.into(),
            star_format: CatalogFormat::Auto,
            lines: None,
            lines_format: LinesFormat::Auto,
            fetcher,
        }
    }

    pub fn with_star_format(mut self, format: CatalogFormat) -> Self {
        self.star_format = format;
        self
    }

    pub fn with_lines(mut self, lines: impl Into<String>, format: LinesFormat) -> Self {
        self.lines = Some(lines.into());
        self.lines_format = format;
        self
    }

    fn open(&self, field: &str, location: &str) -> Result<(String, File)> {
        let path = self.fetcher.resolve(field, location).map_err(|e| match e {
            StarmapError::InvalidConfigValueError { reason, .. } => {
                StarmapError::catalog(location, reason)
            }
            other => other,
        })?;
        let file = File::open(&path).map_err(|e| StarmapError::catalog(location, e))?;
        Ok((path.display().to_string(), file))
    }
}

impl CatalogSource for FileCatalogSource {
    fn load(&self) -> Result<Catalog> {
        let (stars_path, file) = self.open("catalog.stars", &self.stars)?;
        let format = self.star_format.resolve(Path::new(&stars_path));
        let objects = read_catalog(&stars_path, format, file)?;
        tracing::info!("✨ Loaded {} objects from {}", objects.len(), self.stars);

        let lines = match &self.lines {
            Some(location) => {
                let (lines_path, file) = self.open("catalog.constellations", location)?;
                let format = self.lines_format.resolve(Path::new(&lines_path));
                let lines = read_lines(&lines_path, format, file)?;
                tracing::info!("🌌 Loaded {} constellation segments from {}", lines.len(), location);
                lines
            }
            None => Vec::new(),
        };

        Catalog::new(&self.stars, objects, lines)
    }
}
