//! Chart rendering on top of plotters.
//!
//! Both backends draw in pixel space on the root drawing area: the chart
//! plane `[-1, 1] x [-1, 1]` fills the square canvas, y pointing up.

use crate::domain::model::{ChartImage, ImageFormat, SkyChart};
use crate::domain::ports::ChartRenderer;
use crate::utils::error::{Result, StarmapError};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::io::Cursor;

/// Points are 1/72 inch, as in print and matplotlib.
const POINTS_PER_INCH: f64 = 72.0;

/// Projected points further than this outside the frame are not drawn.
const FRAME_MARGIN: f64 = 1.05;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub background: (u8, u8, u8),
    /// Opacity of the background, 0 (transparent) to 1.
    pub background_alpha: f64,
    pub star_color: (u8, u8, u8),
    pub constellation_color: (u8, u8, u8),
    /// Constellation line width in points.
    pub constellation_width: f64,
    /// Marker area in pt² of a magnitude 0 star.
    pub star_scaling: f64,
    /// Upper bound of the marker area in pt².
    pub star_size_limit: f64,
    /// Canvas side in inches.
    pub figure_size: f64,
    pub dpi: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            background: (0, 0, 0),
            background_alpha: 1.0,
            star_color: (255, 255, 255),
            constellation_color: (255, 255, 255),
            constellation_width: 0.3,
            star_scaling: 100.0,
            star_size_limit: 400.0,
            figure_size: 10.0,
            dpi: 200,
        }
    }
}

impl ChartStyle {
    pub fn canvas_size(&self) -> u32 {
        (self.figure_size * self.dpi as f64).round() as u32
    }

    fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.dpi as f64 / POINTS_PER_INCH
    }

    /// Marker radius in pixels; brightness scales the area like Pogson's ratio.
    pub fn marker_radius(&self, magnitude: f64) -> f64 {
        let area = (self.star_scaling * 10f64.powf(magnitude / -2.5)).min(self.star_size_limit);
        self.points_to_pixels(area.sqrt() / 2.0).max(1.0)
    }

    pub fn line_width(&self) -> u32 {
        self.points_to_pixels(self.constellation_width).round().max(1.0) as u32
    }

    fn alpha_byte(&self) -> u8 {
        (self.background_alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

fn to_pixel(size: u32, (x, y): (f64, f64)) -> (i32, i32) {
    let half = size as f64 / 2.0;
    ((half + x * half).round() as i32, (half - y * half).round() as i32)
}

fn paint<DB: DrawingBackend, C: Color>(
    root: &DrawingArea<DB, Shift>,
    chart: &SkyChart,
    style: &ChartStyle,
    background: &C,
    size: u32,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(background)?;

    let (r, g, b) = style.constellation_color;
    let line_style = RGBColor(r, g, b).stroke_width(style.line_width());
    for segment in &chart.segments {
        root.draw(&PathElement::new(
            vec![to_pixel(size, segment.from), to_pixel(size, segment.to)],
            line_style,
        ))?;
    }

    // 星點畫在星座連線之上
    let (r, g, b) = style.star_color;
    let star_style = RGBColor(r, g, b).filled();
    for point in &chart.points {
        if point.x.abs() > FRAME_MARGIN || point.y.abs() > FRAME_MARGIN {
            continue;
        }
        let magnitude = point.magnitude.unwrap_or(chart.fallback_magnitude);
        let radius = style.marker_radius(magnitude).round() as i32;
        root.draw(&Circle::new(to_pixel(size, (point.x, point.y)), radius, star_style))?;
    }

    root.present()
}

/// Renders charts to PNG or SVG entirely in memory.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    style: ChartStyle,
    format: ImageFormat,
}

impl PlottersRenderer {
    pub fn new(style: ChartStyle, format: ImageFormat) -> Self {
        Self { style, format }
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    fn render_png(&self, chart: &SkyChart, size: u32) -> Result<Vec<u8>> {
        let (r, g, b) = self.style.background;
        let mut rgb = vec![0u8; size as usize * size as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (size, size)).into_drawing_area();
            paint(&root, chart, &self.style, &RGBColor(r, g, b), size)
                .map_err(StarmapError::render)?;
        }

        // 背景像素套用透明度，其餘保持不透明
        let background_alpha = self.style.alpha_byte();
        let rgba: Vec<u8> = rgb
            .chunks_exact(3)
            .flat_map(|px| {
                let alpha = if px == [r, g, b] { background_alpha } else { 255 };
                [px[0], px[1], px[2], alpha]
            })
            .collect();

        let image = image::RgbaImage::from_raw(size, size, rgba)
            .ok_or_else(|| StarmapError::render("pixel buffer does not match canvas size"))?;
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(StarmapError::render)?;
        Ok(bytes)
    }

    fn render_svg(&self, chart: &SkyChart, size: u32) -> Result<Vec<u8>> {
        let (r, g, b) = self.style.background;
        let background = RGBAColor(r, g, b, self.style.background_alpha.clamp(0.0, 1.0));
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (size, size)).into_drawing_area();
            paint(&root, chart, &self.style, &background, size).map_err(StarmapError::render)?;
        }
        Ok(svg.into_bytes())
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&self, chart: &SkyChart) -> Result<ChartImage> {
        let size = self.style.canvas_size();
        if size == 0 {
            return Err(StarmapError::render("canvas has zero size"));
        }
        tracing::debug!(
            "Rendering {} stars and {} segments on a {}x{} {} canvas",
            chart.points.len(),
            chart.segments.len(),
            size,
            size,
            self.format.extension()
        );

        let bytes = match self.format {
            ImageFormat::Png => self.render_png(chart, size)?,
            ImageFormat::Svg => self.render_svg(chart, size)?,
        };

        Ok(ChartImage {
            format: self.format,
            width: size,
            height: size,
            bytes,
        })
    }
}
