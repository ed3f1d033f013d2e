use crate::domain::model::ConstellationLine;
use crate::utils::error::{Result, StarmapError};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinesFormat {
    /// `.fab` files are read as Stellarium, everything else as CSV.
    #[default]
    Auto,
    Stellarium,
    Csv,
}

impl LinesFormat {
    pub fn resolve(self, path: &Path) -> LinesFormat {
        match self {
            LinesFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("fab") => LinesFormat::Stellarium,
                _ => LinesFormat::Csv,
            },
            other => other,
        }
    }
}

/// Parses Stellarium's `constellationship.fab`: `ABBR N a1 b1 a2 b2 ...`.
pub fn read_stellarium<R: Read>(location: &str, reader: R) -> Result<Vec<ConstellationLine>> {
    let mut lines = Vec::new();

    for (number, text) in BufReader::new(reader).lines().enumerate() {
        let text = text.map_err(|e| StarmapError::catalog(location, e))?;
        let content = text.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let row = number + 1;
        let mut tokens = content.split_whitespace();
        let abbreviation = tokens.next().unwrap_or_default();
        let count: usize = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| {
                StarmapError::catalog(location, format!("line {}: missing segment count", row))
            })?;

        let expected = count.checked_mul(2).ok_or_else(|| {
            StarmapError::catalog(location, format!("line {}: segment count too large", row))
        })?;

        let stars: Vec<&str> = tokens.collect();
        if stars.len() != expected {
            return Err(StarmapError::catalog(
                location,
                format!(
                    "line {}: {} declares {} segments but lists {} stars",
                    row,
                    abbreviation,
                    count,
                    stars.len()
                ),
            ));
        }

        lines.extend(stars.chunks_exact(2).map(|pair| {
            ConstellationLine::new(pair[0], pair[1]).in_constellation(abbreviation)
        }));
    }

    Ok(lines)
}

#[derive(Debug, Deserialize)]
struct CsvLineRow {
    #[serde(default)]
    constellation: Option<String>,
    from: String,
    to: String,
}

/// Reads a CSV lines file with a `constellation,from,to` header.
pub fn read_csv_lines<R: Read>(location: &str, reader: R) -> Result<Vec<ConstellationLine>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    csv_reader
        .deserialize::<CsvLineRow>()
        .map(|result| {
            let row = result.map_err(|e| StarmapError::catalog(location, e))?;
            Ok(ConstellationLine {
                constellation: row.constellation.filter(|c| !c.is_empty()),
                from: row.from,
                to: row.to,
            })
        })
        .collect()
}

pub fn read_lines<R: Read>(
    location: &str,
    format: LinesFormat,
    reader: R,
) -> Result<Vec<ConstellationLine>> {
    match format.resolve(Path::new(location)) {
        LinesFormat::Stellarium => read_stellarium(location, reader),
        _ => read_csv_lines(location, reader),
    }
}
