use crate::domain::model::CatalogObject;
use crate::utils::error::{Result, StarmapError};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    /// `.dat` files are read as Hipparcos, everything else as CSV.
    #[default]
    Auto,
    Csv,
    Hipparcos,
}

impl CatalogFormat {
    pub fn resolve(self, path: &Path) -> CatalogFormat {
        match self {
            CatalogFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("dat") => CatalogFormat::Hipparcos,
                _ => CatalogFormat::Csv,
            },
            other => other,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvStarRow {
    id: String,
    #[serde(default)]
    name: Option<String>,
    ra_hours: f64,
    dec_degrees: f64,
    #[serde(default)]
    magnitude: Option<f64>,
    #[serde(default)]
    constellation: Option<String>,
}

fn check_coordinates(location: &str, row: &str, ra_hours: f64, dec_degrees: f64) -> Result<()> {
    if !(0.0..24.0).contains(&ra_hours) {
        return Err(StarmapError::catalog(
            location,
            format!("{}: right ascension {} is outside [0, 24) hours", row, ra_hours),
        ));
    }
    if !(-90.0..=90.0).contains(&dec_degrees) {
        return Err(StarmapError::catalog(
            location,
            format!("{}: declination {} is outside [-90, 90] degrees", row, dec_degrees),
        ));
    }
    Ok(())
}

/// Reads a CSV star catalog with an `id,name,ra_hours,dec_degrees,magnitude,constellation` header.
pub fn read_csv_catalog<R: Read>(location: &str, reader: R) -> Result<Vec<CatalogObject>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut objects = Vec::new();
    for result in csv_reader.deserialize::<CsvStarRow>() {
        let row = result.map_err(|e| StarmapError::catalog(location, e))?;
        let label = format!("object '{}'", row.id);

        check_coordinates(location, &label, row.ra_hours, row.dec_degrees)?;
        if row.magnitude.is_some_and(|m| !m.is_finite()) {
            return Err(StarmapError::catalog(location, format!("{}: invalid magnitude", label)));
        }

        objects.push(CatalogObject {
            id: row.id,
            name: row.name.filter(|n| !n.is_empty()),
            ra_hours: row.ra_hours,
            dec_degrees: row.dec_degrees,
            magnitude: row.magnitude,
            constellation: row.constellation.filter(|c| !c.is_empty()),
        });
    }

    Ok(objects)
}

/// Reads the pipe-delimited Hipparcos main catalog (`hip_main.dat`).
///
/// Only HIP number, Vmag and the ICRS position in degrees are used. Entries
/// without a position are skipped.
pub fn read_hipparcos<R: Read>(location: &str, reader: R) -> Result<Vec<CatalogObject>> {
    // H1 = HIP, H5 = Vmag, H8 = RAdeg, H9 = DEdeg
    const HIP: usize = 1;
    const VMAG: usize = 5;
    const RA_DEG: usize = 8;
    const DEC_DEG: usize = 9;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut objects = Vec::new();
    let mut skipped = 0usize;

    for (row_number, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| StarmapError::catalog(location, e))?;
        let row = format!("row {}", row_number + 1);

        let field = |index: usize| record.get(index).unwrap_or("");
        let parse = |index: usize, what: &str| -> Result<f64> {
            field(index).parse::<f64>().map_err(|_| {
                StarmapError::catalog(
                    location,
                    format!("{}: invalid {} '{}'", row, what, field(index)),
                )
            })
        };

        let id = field(HIP);
        if id.is_empty() {
            return Err(StarmapError::catalog(location, format!("{}: missing HIP number", row)));
        }
        if field(RA_DEG).is_empty() || field(DEC_DEG).is_empty() {
            skipped += 1;
            continue;
        }

        let ra_hours = parse(RA_DEG, "RA")? / 15.0;
        let dec_degrees = parse(DEC_DEG, "declination")?;
        check_coordinates(location, &row, ra_hours, dec_degrees)?;

        let magnitude = if field(VMAG).is_empty() {
            None
        } else {
            let magnitude = parse(VMAG, "magnitude")?;
            if !magnitude.is_finite() {
                return Err(StarmapError::catalog(location, format!("{}: invalid magnitude", row)));
            }
            Some(magnitude)
        };

        objects.push(CatalogObject {
            id: id.to_string(),
            name: None,
            ra_hours,
            dec_degrees,
            magnitude,
            constellation: None,
        });
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} Hipparcos entries without a position", skipped);
    }

    Ok(objects)
}

pub fn read_catalog<R: Read>(
    location: &str,
    format: CatalogFormat,
    reader: R,
) -> Result<Vec<CatalogObject>> {
    match format.resolve(Path::new(location)) {
        CatalogFormat::Hipparcos => read_hipparcos(location, reader),
        _ => read_csv_catalog(location, reader),
    }
}
