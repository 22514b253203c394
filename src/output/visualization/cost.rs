//! Calculation cost against grid size

use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

use super::config::{output_format, OutputFormat, PlotConfig, NO_TITLE};
use crate::sweep::SweepReport;

/// Plot wall time to cyclic steady state against the number of control volumes
///
/// Failed resolutions are left out. Bitmap paths (`.png`) need the `bitmap`
/// feature and are an error without it.
///
/// ```rust,ignore
/// plot_sweep_cost(&report, "cost.svg", None)?;
/// ```
pub fn plot_sweep_cost<P: AsRef<Path>>(
    report: &SweepReport,
    output_path: P,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    let mut points: Vec<(f64, f64)> = report
        .successful()
        .map(|(n, run)| (n as f64, run.elapsed.as_secs_f64()))
        .collect();

    if points.is_empty() {
        return Err("No successful sweep entry to plot".into());
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let default_config = PlotConfig::sweep_cost(NO_TITLE);
    let config = config.unwrap_or(&default_config);

    let path = output_path.as_ref();
    match output_format(path)? {
        OutputFormat::Svg => {
            let backend = SVGBackend::new(path, (config.width, config.height));
            plot_cost_impl(backend, &points, config)
        }
        #[cfg(feature = "bitmap")]
        OutputFormat::Bitmap => {
            let backend = BitMapBackend::new(path, (config.width, config.height));
            plot_cost_impl(backend, &points, config)
        }
    }
}

fn plot_cost_impl<DB: DrawingBackend>(
    backend: DB,
    points: &[(f64, f64)],
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let n_min = points.first().map_or(0.0, |p| p.0);
    let n_max = points.last().map_or(1.0, |p| p.0);
    let t_max = points.iter().map(|p| p.1).fold(0.0, f64::max).max(1e-3);

    let root = backend.into_drawing_area();
    root.fill(&config.background)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 40).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((n_min - 2.0)..(n_max + 2.0), 0.0..(t_max * 1.1))?;

    if config.show_grid {
        chart
            .configure_mesh()
            .x_desc(&config.xlabel)
            .y_desc(&config.ylabel)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| format!("{:.1}", y))
            .draw()?;
    }

    let color = config.line_color;
    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        ShapeStyle::from(&color).stroke_width(config.line_width),
    ))?;
    chart.draw_series(points.iter().map(|&(n, t)| Circle::new((n, t), 5, color.filled())))?;

    root.present()?;

    Ok(())
}
