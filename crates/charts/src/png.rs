//! PNG histogram rendering and output.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::prelude::*;
use realis_analytics::{Histogram, HistogramMetric};
use realis_core::config::ChartConfig;
use realis_core::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Title, axis labels and bar colour of a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: String,
}

impl ChartLabels {
    /// Labels for a metric's histogram.
    pub fn for_metric(metric: HistogramMetric, config: &ChartConfig) -> Self {
        let (title, x_label, color) = match metric {
            HistogramMetric::PriceDifferential => (
                "Range of Capital Gains/Losses",
                "Gain/Loss on Sale (%)",
                &config.price_differential_color,
            ),
            HistogramMetric::AnnualizedGrowth => (
                "Range of Annualized Growth",
                "Price Growth/Year (%)",
                &config.annualized_growth_color,
            ),
        };
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: "No. of Transactions".to_string(),
            color: color.clone(),
        }
    }
}

/// Parse a `#rrggbb` colour.
pub fn parse_color(hex: &str) -> Result<RGBColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::config(format!("chart colour must be #rrggbb: {hex:?}")));
    }
    let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).map_err(|e| Error::config(e.to_string()));
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

fn chart_err(err: impl std::fmt::Display) -> Error {
    Error::chart(err.to_string())
}

/// Render a histogram as a PNG image.
pub fn render_histogram(hist: &Histogram, config: &ChartConfig) -> Result<Vec<u8>> {
    let labels = ChartLabels::for_metric(hist.metric(), config);
    let color = parse_color(&labels.color)?;
    let (width, height) = (config.width, config.height);
    if width == 0 || height == 0 {
        return Err(Error::config(format!("chart size must be non-zero: {width}x{height}")));
    }

    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        // Headroom above the tallest bar
        let y_max = hist.max_count() + hist.max_count() / 10 + 1;
        let mut chart = ChartBuilder::on(&root)
            .caption(&labels.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(hist.lower()..hist.upper(), 0u64..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(labels.x_label.as_str())
            .y_desc(labels.y_label.as_str())
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(
                hist.bins()
                    .into_iter()
                    .filter(|bin| bin.count > 0)
                    .map(|bin| Rectangle::new([(bin.lower, 0), (bin.upper, bin.count)], color.filled())),
            )
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&pixels, width, height, ColorType::Rgb8)
        .map_err(chart_err)?;

    debug!(
        metric = ?hist.metric(),
        bins = hist.bin_count(),
        binned = hist.binned_count(),
        out_of_range = hist.out_of_range(),
        bytes = png.len(),
        "rendered histogram"
    );
    Ok(png)
}

/// Write an encoded chart to a file, creating parent directories.
pub fn write_chart(image: &[u8], output_path: impl AsRef<Path>) -> Result<()> {
    let output_path = output_path.as_ref();
    if output_path.as_os_str().is_empty() {
        return Err(Error::invalid_input("chart output path is empty"));
    }
    if output_path.is_dir() {
        return Err(Error::invalid_input(format!(
            "chart output path is a directory: {}",
            output_path.display()
        )));
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(dir = %parent.display(), "creating chart directory");
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(image)?;
    writer.flush()?;

    info!(path = %output_path.display(), bytes = image.len(), "wrote chart");
    Ok(())
}
