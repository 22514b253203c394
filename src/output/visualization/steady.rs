//! Cyclic-steady-state profile plotting
//!
//! Overlays the final CO2 gas profile of every resolution of a sweep on the
//! normalised axis z/L, so grid convergence can be read off directly.
//!
//! ```rust,ignore
//! use vpsa_rs::output::visualization::plot_profiles;
//!
//! let report = sweep.run_all();
//! plot_profiles(&report, "profiles.svg", None)?;
//! ```

use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

use super::config::{output_format, OutputFormat, PlotConfig, NO_TITLE};
use crate::sweep::SweepReport;

/// Plot the final CO2 profile of every successful resolution
///
/// # Errors
///
/// Fails when no entry succeeded or a profile contains NaN or Inf.
pub fn plot_profiles<P: AsRef<Path>>(
    report: &SweepReport,
    output_path: P,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    let profiles: Vec<(String, &[f64], &[f64])> = report
        .successful()
        .map(|(points, run)| (format!("N = {points}"), run.positions.as_slice(), run.co2_profile.as_slice()))
        .collect();

    if profiles.is_empty() {
        return Err("No profiles provided".into());
    }
    if profiles.iter().any(|(_, _, y)| y.iter().any(|v| !v.is_finite())) {
        return Err("Invalid data: NaN or Inf detected in a profile".into());
    }

    let default_config = PlotConfig::profiles(NO_TITLE);
    let config = config.unwrap_or(&default_config);

    let max_y = profiles
        .iter()
        .flat_map(|(_, _, y)| y.iter())
        .copied()
        .fold(f64::NEG_INFINITY, f64::max)
        .max(1e-10);

    let path = output_path.as_ref();
    match output_format(path)? {
        OutputFormat::Svg => {
            let backend = SVGBackend::new(path, (config.width, config.height));
            plot_profiles_impl(backend, &profiles, config, max_y)
        }
        #[cfg(feature = "bitmap")]
        OutputFormat::Bitmap => {
            let backend = BitMapBackend::new(path, (config.width, config.height));
            plot_profiles_impl(backend, &profiles, config, max_y)
        }
    }
}

fn plot_profiles_impl<DB: DrawingBackend>(
    backend: DB,
    profiles: &[(String, &[f64], &[f64])],
    config: &PlotConfig,
    max_y: f64,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&config.background)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 40).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..(max_y * 1.1))?;

    if config.show_grid {
        chart
            .configure_mesh()
            .x_desc(&config.xlabel)
            .y_desc(&config.ylabel)
            .x_label_formatter(&|x| format!("{:.2}", x))
            .y_label_formatter(&|y| format!("{:.3}", y))
            .draw()?;
    }

    for (idx, (label, positions, values)) in profiles.iter().enumerate() {
        let color = config.series_color(idx);

        chart
            .draw_series(LineSeries::new(
                positions.iter().zip(values.iter()).map(|(z, y)| (*z, *y)),
                ShapeStyle::from(&color).stroke_width(config.line_width),
            ))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .background_style(&config.background.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;

    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::{SweepEntry, SweepRun};
    use std::time::Duration;

    fn report() -> SweepReport {
        let entries = [10usize, 20]
            .into_iter()
            .map(|n| {
                let positions: Vec<f64> = (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect();
                let co2_profile = positions.iter().map(|z| 0.15 * (-4.0 * z).exp()).collect();
                SweepEntry {
                    points: n,
                    outcome: Ok(SweepRun {
                        cycles: 100,
                        elapsed: Duration::from_millis(250 * n as u64),
                        errors: vec![1e-3],
                        converged: true,
                        positions,
                        co2_profile,
                    }),
                }
            })
            .collect();
        SweepReport { entries }
    }

    #[test]
    fn test_plot_profiles_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.svg");

        plot_profiles(&report(), &path, None).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("N = 20"));
    }

    #[cfg(feature = "bitmap")]
    #[test]
    fn test_plot_profiles_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.png");

        plot_profiles(&report(), &path, Some(&PlotConfig::profiles("Grid study"))).unwrap();
        assert!(path.exists());
    }

    #[cfg(not(feature = "bitmap"))]
    #[test]
    fn test_plot_profiles_png_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.png");

        let err = plot_profiles(&report(), &path, Some(&PlotConfig::profiles("Grid study"))).unwrap_err();
        assert!(err.to_string().contains("bitmap"), "{err}");
        assert!(!path.exists());
    }

    #[test]
    fn test_plot_profiles_requires_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        assert!(plot_profiles(&SweepReport::default(), &path, None).is_err());
    }
}
