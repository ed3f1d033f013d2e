use crate::domain::model::{ChartImage, SkyChart};
use crate::domain::ports::ChartSink;
use crate::utils::error::{Result, StarmapError};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the chart image, and optionally the projected points, to disk.
#[derive(Debug, Clone)]
pub struct FileChartSink {
    image_path: PathBuf,
    points_path: Option<PathBuf>,
}

impl FileChartSink {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            points_path: None,
        }
    }

    pub fn with_points(mut self, points_path: impl Into<PathBuf>) -> Self {
        self.points_path = Some(points_path.into());
        self
    }

    fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
        let result = (|| {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)
        })();

        result.map_err(|e| {
            // 寫入失敗時不保留殘缺檔案
            let _ = fs::remove_file(path);
            StarmapError::render(format!("cannot write '{}': {}", path.display(), e))
        })
    }

    fn encode_points(path: &Path, chart: &SkyChart) -> Result<Vec<u8>> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            return serde_json::to_vec_pretty(&chart.points).map_err(StarmapError::render);
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        for point in &chart.points {
            writer.serialize(point).map_err(StarmapError::render)?;
        }
        writer
            .into_inner()
            .map_err(|e| StarmapError::render(e.error()))
    }
}

impl ChartSink for FileChartSink {
    fn write(&self, image: &ChartImage, chart: &SkyChart) -> Result<String> {
        // 先編碼所有輸出，確保寫檔前不會因格式錯誤中斷
        let points = match &self.points_path {
            Some(path) => Some((path, Self::encode_points(path, chart)?)),
            None => None,
        };

        Self::write_file(&self.image_path, &image.bytes)?;
        tracing::debug!(
            "Wrote {} bytes to {}",
            image.bytes.len(),
            self.image_path.display()
        );

        if let Some((path, bytes)) = points {
            if let Err(e) = Self::write_file(path, &bytes) {
                let _ = fs::remove_file(&self.image_path);
                return Err(e);
            }
            tracing::info!("📍 Projected points saved to: {}", path.display());
        }

        Ok(self.image_path.display().to_string())
    }
}
