//! Plot configuration shared across visualization modules

use plotters::prelude::*;
use std::path::Path;

/// Configuration for customizing plots
///
/// Used by both the profile plot and the sweep cost plot.
///
/// # Example
///
/// ```rust,ignore
/// use vpsa_rs::output::visualization::PlotConfig;
/// use plotters::prelude::*;
///
/// let mut config = PlotConfig::profiles("CO2 at cyclic steady state");
/// config.width = 1920;
/// config.height = 1080;
/// config.series_colors = Some(vec![RED, BLUE, GREEN]);
/// ```
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Image width in pixels (default: 1024)
    pub width: u32,

    /// Image height in pixels (default: 768)
    pub height: u32,

    pub title: String,

    pub xlabel: String,

    pub ylabel: String,

    /// Line color for single-series plots (default: RED)
    pub line_color: RGBColor,

    /// Optional colors for multi-series plots, one per series
    ///
    /// Falls back to the default palette past the end of the list.
    pub series_colors: Option<Vec<RGBColor>>,

    /// Background color (default: WHITE)
    pub background: RGBColor,

    /// Line width in pixels (default: 2)
    pub line_width: u32,

    /// Show grid lines (default: true)
    pub show_grid: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Plot".to_string(),
            xlabel: String::new(),
            ylabel: String::new(),
            line_color: RED,
            series_colors: None,
            background: WHITE,
            line_width: 2,
            show_grid: true,
        }
    }
}

/// Helper trait to accept both `String` and `None` for optional titles
pub trait IntoOptionalTitle {
    fn into_optional_title(self) -> Option<String>;
}

impl IntoOptionalTitle for &str {
    fn into_optional_title(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl IntoOptionalTitle for String {
    fn into_optional_title(self) -> Option<String> {
        Some(self)
    }
}

impl<T: IntoOptionalTitle> IntoOptionalTitle for Option<T> {
    fn into_optional_title(self) -> Option<String> {
        self.and_then(|t| t.into_optional_title())
    }
}

/// No custom title: the plot type's default is used
pub const NO_TITLE: Option<&str> = None;

impl PlotConfig {
    /// CO2 profile along the bed, x axis z/L
    pub fn profiles(title: impl IntoOptionalTitle) -> Self {
        Self {
            title: title
                .into_optional_title()
                .unwrap_or_else(|| "CO2 profile at cyclic steady state".to_string()),
            xlabel: "Normalised position z/L".to_string(),
            ylabel: "CO2 mole fraction".to_string(),
            ..Default::default()
        }
    }

    /// Calculation time against grid size
    pub fn sweep_cost(title: impl IntoOptionalTitle) -> Self {
        Self {
            title: title
                .into_optional_title()
                .unwrap_or_else(|| "Calculation cost vs mesh size".to_string()),
            xlabel: "Number of control volumes N".to_string(),
            ylabel: "Calculation time (s)".to_string(),
            line_color: BLUE,
            ..Default::default()
        }
    }

    /// Color of series `index`
    pub(crate) fn series_color(&self, index: usize) -> RGBColor {
        if let Some(colors) = &self.series_colors
            && let Some(&color) = colors.get(index)
        {
            return color;
        }

        const PALETTE: [RGBColor; 8] = [
            RED,
            BLUE,
            GREEN,
            MAGENTA,
            CYAN,
            BLACK,
            RGBColor(255, 165, 0),
            RGBColor(128, 0, 128),
        ];
        PALETTE[index % PALETTE.len()]
    }
}

/// Image format picked from the output file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Svg,
    #[cfg(feature = "bitmap")]
    Bitmap,
}

/// `.svg` is always available; `.png`, `.bmp` and `.jpg` need the `bitmap` feature
pub(crate) fn output_format(path: &Path) -> Result<OutputFormat, String> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "svg" => Ok(OutputFormat::Svg),
        #[cfg(feature = "bitmap")]
        "png" | "bmp" | "jpg" | "jpeg" => Ok(OutputFormat::Bitmap),
        #[cfg(not(feature = "bitmap"))]
        "png" | "bmp" | "jpg" | "jpeg" => Err(format!(
            "cannot write {}: bitmap output needs the `bitmap` feature",
            path.display()
        )),
        _ => Err(format!("unsupported plot format: {}", path.display())),
    }
}

// =================================================================================================
// Tests
// =================================================================================================
