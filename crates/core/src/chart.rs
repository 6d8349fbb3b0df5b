use crate::domain::prediction::{ChartImage, PricePoint, StockRecord};
use anyhow::Context;
use plotters::prelude::*;
use std::io::Cursor;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 350;

const HISTORY_COLOR: RGBColor = RGBColor(16, 185, 129);
const PREDICTION_COLOR: RGBColor = RGBColor(239, 68, 68);

/// Renders the record's price history plus the predicted point as a PNG.
///
/// No text is drawn, so no font backend is needed.
pub fn render_record_chart(record: &StockRecord) -> anyhow::Result<ChartImage> {
    render_chart_png(&record.chart_series(), DEFAULT_WIDTH, DEFAULT_HEIGHT)
}

/// The last point of `series` is treated as the prediction and drawn in a
/// separate color with a marker.
pub fn render_chart_png(series: &[PricePoint], width: u32, height: u32) -> anyhow::Result<ChartImage> {
    anyhow::ensure!(series.len() >= 2, "chart needs at least 2 points (got {})", series.len());
    anyhow::ensure!(width >= 16 && height >= 16, "chart size too small: {width}x{height}");

    let mut rgb = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow::anyhow!("chart fill failed: {e}"))?;

        let (lo, hi) = price_bounds(series);
        let last = series.len() - 1;

        let mut chart = ChartBuilder::on(&root)
            .margin(12)
            .build_cartesian_2d(0f64..last as f64, lo..hi)
            .map_err(|e| anyhow::anyhow!("chart layout failed: {e}"))?;

        chart
            .draw_series(LineSeries::new(
                series[..last]
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i as f64, p.price)),
                HISTORY_COLOR.stroke_width(2),
            ))
            .map_err(|e| anyhow::anyhow!("chart history draw failed: {e}"))?;

        let from = ((last - 1) as f64, series[last - 1].price);
        let to = (last as f64, series[last].price);
        chart
            .draw_series(LineSeries::new([from, to], PREDICTION_COLOR.stroke_width(2)))
            .map_err(|e| anyhow::anyhow!("chart prediction draw failed: {e}"))?;
        chart
            .draw_series(std::iter::once(Circle::new(to, 5, PREDICTION_COLOR.filled())))
            .map_err(|e| anyhow::anyhow!("chart marker draw failed: {e}"))?;

        root.present()
            .map_err(|e| anyhow::anyhow!("chart present failed: {e}"))?;
    }

    let img = image::RgbImage::from_raw(width, height, rgb)
        .context("chart buffer does not match its dimensions")?;
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png)
        .context("chart PNG encoding failed")?;

    Ok(ChartImage::from_png_bytes(png.get_ref()))
}

fn price_bounds(series: &[PricePoint]) -> (f64, f64) {
    let lo = series.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let hi = series.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}
