use crate::utils::error::{Result, StarmapError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fixed star (or any object with fixed equatorial coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogObject {
    pub id: String,
    pub name: Option<String>,
    /// Right ascension in hours, `[0, 24)`.
    pub ra_hours: f64,
    /// Declination in degrees, `[-90, 90]`.
    pub dec_degrees: f64,
    pub magnitude: Option<f64>,
    pub constellation: Option<String>,
}

impl CatalogObject {
    pub fn new(id: impl Into<String>, ra_hours: f64, dec_degrees: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            ra_hours,
            dec_degrees,
            magnitude: None,
            constellation: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    pub fn with_constellation(mut self, constellation: impl Into<String>) -> Self {
        self.constellation = Some(constellation.into());
        self
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A segment of a constellation figure between two catalog objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationLine {
    pub constellation: Option<String>,
    pub from: String,
    pub to: String,
}

impl ConstellationLine {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            constellation: None,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn in_constellation(mut self, constellation: impl Into<String>) -> Self {
        self.constellation = Some(constellation.into());
        self
    }
}

/// Reference data for one run: the objects and the figures connecting them.
#[derive(Debug, Clone)]
pub struct Catalog {
    objects: Vec<CatalogObject>,
    lines: Vec<ConstellationLine>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog; `location` names the data source in error messages.
    pub fn new(
        location: &str,
        objects: Vec<CatalogObject>,
        lines: Vec<ConstellationLine>,
    ) -> Result<Self> {
        if objects.is_empty() {
            return Err(StarmapError::catalog(location, "catalog contains no objects"));
        }

        let mut index = HashMap::with_capacity(objects.len());
        for (position, object) in objects.iter().enumerate() {
            if index.insert(object.id.clone(), position).is_some() {
                return Err(StarmapError::catalog(
                    location,
                    format!("duplicate object id '{}'", object.id),
                ));
            }
        }

        for line in &lines {
            for endpoint in [&line.from, &line.to] {
                if !index.contains_key(endpoint) {
                    return Err(StarmapError::catalog(
                        location,
                        format!(
                            "constellation line {}-{} references unknown object '{}'",
                            line.from, line.to, endpoint
                        ),
                    ));
                }
            }
        }

        Ok(Self {
            objects,
            lines,
            index,
        })
    }

    pub fn objects(&self) -> &[CatalogObject] {
        &self.objects
    }

    pub fn lines(&self) -> &[ConstellationLine] {
        &self.lines
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogObject> {
        self.position_of(id).map(|i| &self.objects[i])
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Local horizon coordinates in degrees. Azimuth is clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizontalPosition {
    pub altitude: f64,
    pub azimuth: f64,
}

impl HorizontalPosition {
    pub fn is_above_horizon(&self) -> bool {
        self.altitude >= 0.0
    }

    pub fn zenith_distance(&self) -> f64 {
        90.0 - self.altitude
    }
}

/// A catalog object placed on the chart plane. Both axes span `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub id: String,
    pub name: Option<String>,
    pub altitude: f64,
    pub azimuth: f64,
    pub x: f64,
    pub y: f64,
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSegment {
    pub constellation: Option<String>,
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// Everything the renderer needs; recomputed on every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkyChart {
    pub points: Vec<ProjectedPoint>,
    pub segments: Vec<ChartSegment>,
    /// Magnitude assumed for objects without one.
    pub fallback_magnitude: f64,
}

impl SkyChart {
    pub fn point(&self, id: &str) -> Option<&ProjectedPoint> {
        self.points.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// Picks the format from a file extension (case-insensitive).
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("svg") => Ok(ImageFormat::Svg),
            _ => Err(StarmapError::render(format!(
                "unsupported output format for '{}', use .png or .svg",
                path
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// An encoded chart, held in memory until it is written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}
