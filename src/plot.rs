use std::ops::Range;
use std::path::Path;

use itertools::{Itertools, MinMaxResult};
use plotters::prelude::*;
use tracing::debug;

use crate::calibration::Calibration;
use crate::{Error, Result};

type DrawResult = ::std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

const TITLE: &str = "Calibration curve: LIT-101 vs reference";
const X_DESC: &str = "Reference level (mm)";
const Y_DESC: &str = "LIT-101 reading (mm)";

/// Number of dashes used to stroke the fitted line
const DASHES: usize = 40;
/// Fraction of each dash period that is drawn
const DASH_DUTY: f64 = 0.6;

/// Render the calibration curve of `calibration` as a PNG image of `size` pixels at `output`
///
/// The image shows the raw sample pairs, the fitted line and the expanded uncertainty band
/// around it. An existing file at `output` is replaced.
///
/// # Errors
/// Returns [`Error::Render`] if drawing fails or the image cannot be written.
pub fn render(calibration: &Calibration, output: &Path, size: (u32, u32)) -> Result<()> {
    debug!(path = %output.display(), width = size.0, height = size.1, "rendering plot");
    draw(calibration, output, size).map_err(|source| Error::Render {
        path: output.to_path_buf(),
        source,
    })
}

/// Spans `(from, to)` of the dashes stroking a line from `x_start` to `x_end`
///
/// The final dash is drawn to `x_end` so the stroked line covers the whole data range.
fn dash_spans(x_start: f64, x_end: f64) -> Vec<(f64, f64)> {
    let period = (x_end - x_start) / DASHES as f64;
    (0..DASHES)
        .map(|ii| {
            let from = (ii as f64).mul_add(period, x_start);
            let to = if ii + 1 == DASHES {
                x_end
            } else {
                DASH_DUTY.mul_add(period, from)
            };
            (from, to)
        })
        .collect()
}

/// Axis range covering `values` with a five percent margin each side
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    match values.minmax() {
        MinMaxResult::MinMax(lo, hi) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad)..(hi + pad)
        }
        MinMaxResult::OneElement(value) => (value - 1.0)..(value + 1.0),
        MinMaxResult::NoElements => 0.0..1.0,
    }
}

fn draw(calibration: &Calibration, output: &Path, size: (u32, u32)) -> DrawResult {
    let reference = calibration.pair().reference();
    let measured = calibration.pair().measured();
    let fit = calibration.fit();
    let lower = calibration.lower_bound();
    let upper = calibration.upper_bound();

    let x_range = padded_range(reference.iter().copied());
    let y_range = padded_range(
        measured
            .iter()
            .chain(lower.iter())
            .chain(upper.iter())
            .copied(),
    );

    let root = BitMapBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    chart.configure_mesh().x_desc(X_DESC).y_desc(Y_DESC).draw()?;

    let band_style = RGBColor(128, 128, 128).mix(0.3).filled();
    // Trace the upper edge forwards and the lower edge backwards to close the polygon
    let mut edges: Vec<(f64, f64, f64)> = reference
        .iter()
        .zip(lower.iter())
        .zip(upper.iter())
        .map(|((&x, &lo), &hi)| (x, lo, hi))
        .collect();
    edges.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut band: Vec<(f64, f64)> = edges.iter().map(|&(x, _, hi)| (x, hi)).collect();
    band.extend(edges.iter().rev().map(|&(x, lo, _)| (x, lo)));
    chart
        .draw_series(std::iter::once(Polygon::new(band, band_style)))?
        .label("Expanded uncertainty (U)")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], band_style));

    let line_style = RED.stroke_width(2);
    let (x_start, x_end) = match reference.iter().copied().minmax() {
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
        _ => (x_range.start, x_range.end),
    };
    let dashes = dash_spans(x_start, x_end).into_iter().map(|(from, to)| {
        PathElement::new(vec![(from, fit.predict(from)), (to, fit.predict(to))], line_style)
    });
    chart
        .draw_series(dashes)?
        .label(format!(
            "Fitted line: y = {:.4}x + {:.4}",
            fit.slope, fit.intercept
        ))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

    chart
        .draw_series(
            reference
                .iter()
                .zip(measured.iter())
                .map(|(&x, &y)| Circle::new((x, y), 4, BLUE.filled())),
        )?
        .label("Measured data")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, BLUE.filled()));

    // Upper left of the plotting area, clear of the legend
    let anchor = (
        0.08f64.mul_add(x_range.end - x_range.start, x_range.start),
        0.8f64.mul_add(y_range.end - y_range.start, y_range.start),
    );
    chart.draw_series(std::iter::once(Text::new(
        format!("R² = {:.5}", fit.r_squared()),
        anchor,
        ("sans-serif", 20).into_font().color(&BLACK),
    )))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    debug!(points = reference.len(), "drew calibration curve");
    root.present()?;
    Ok(())
}
