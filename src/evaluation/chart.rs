//! Chart surfaces for comparative ROC plots

use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use plotters::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("x and y series differ in length: {x} vs {y}")]
    SeriesMismatch { x: usize, y: usize },
}

fn render_err<E: Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveStyle {
    /// A model's curve, solid and colored.
    Model,
    /// Chance diagonal, dashed navy.
    Reference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub label: String,
    pub style: CurveStyle,
}

/// Rendering surface: collects labeled curves, draws them on `flush`.
pub trait ChartSurface {
    fn add_curve(&mut self, x: &[f64], y: &[f64], label: &str, style: CurveStyle) -> Result<(), ChartError>;
    fn flush(&mut self) -> Result<(), ChartError>;
}

fn make_curve(x: &[f64], y: &[f64], label: &str, style: CurveStyle) -> Result<Curve, ChartError> {
    if x.len() != y.len() {
        return Err(ChartError::SeriesMismatch { x: x.len(), y: y.len() });
    }
    Ok(Curve {
        x: x.to_vec(),
        y: y.to_vec(),
        label: label.to_string(),
        style,
    })
}

/// Keeps curves in memory; `flush` only counts calls.
#[derive(Debug, Default)]
pub struct CurveRecorder {
    pub curves: Vec<Curve>,
    pub flushes: usize,
}

impl ChartSurface for CurveRecorder {
    fn add_curve(&mut self, x: &[f64], y: &[f64], label: &str, style: CurveStyle) -> Result<(), ChartError> {
        self.curves.push(make_curve(x, y, label, style)?);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ChartError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Writes the chart as an SVG file.
pub struct SvgChart {
    path: PathBuf,
    size: (u32, u32),
    title: String,
    curves: Vec<Curve>,
}

impl SvgChart {
    pub fn new(path: impl Into<PathBuf>, title: &str) -> Self {
        Self {
            path: path.into(),
            size: (1000, 800),
            title: title.to_string(),
            curves: Vec::new(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    fn render(&self) -> Result<(), ChartError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(render_err)?;
        }

        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..1f64, 0f64..1.05f64)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc("False Positive Rate (FPR)")
            .y_desc("True Positive Rate (TPR)")
            .draw()
            .map_err(render_err)?;

        let mut model_idx = 0;
        for curve in &self.curves {
            let points: Vec<(f64, f64)> = curve.x.iter().copied().zip(curve.y.iter().copied()).collect();

            match curve.style {
                CurveStyle::Model => {
                    let style = Palette99::pick(model_idx).stroke_width(2);
                    model_idx += 1;
                    chart
                        .draw_series(LineSeries::new(points, style))
                        .map_err(render_err)?
                        .label(curve.label.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
                }
                CurveStyle::Reference => {
                    let navy = RGBColor(0, 0, 128);
                    let style = navy.stroke_width(2);
                    chart
                        .draw_series(DashedLineSeries::new(points, 6, 4, style))
                        .map_err(render_err)?
                        .label(curve.label.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
                }
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }
}

impl ChartSurface for SvgChart {
    fn add_curve(&mut self, x: &[f64], y: &[f64], label: &str, style: CurveStyle) -> Result<(), ChartError> {
        self.curves.push(make_curve(x, y, label, style)?);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ChartError> {
        self.render()?;
        tracing::info!("Chart written to '{}'", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_rejects_uneven_series() {
        let mut recorder = CurveRecorder::default();
        let err = recorder
            .add_curve(&[0.0, 1.0], &[0.0], "bad", CurveStyle::Model)
            .unwrap_err();
        assert!(matches!(err, ChartError::SeriesMismatch { x: 2, y: 1 }));
        assert!(recorder.curves.is_empty());
    }

    #[test]
    fn test_svg_written_on_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figures").join("roc.svg");

        let mut chart = SvgChart::new(&path, "Comparative ROC Curves").with_size(400, 300);
        chart
            .add_curve(&[0.0, 0.2, 1.0], &[0.0, 0.8, 1.0], "model (AUC = 0.800)", CurveStyle::Model)
            .unwrap();
        chart
            .add_curve(&[0.0, 1.0], &[0.0, 1.0], "Random Chance (AUC = 0.5)", CurveStyle::Reference)
            .unwrap();
        assert!(!path.exists());

        chart.flush().unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Random Chance"));
    }
}
