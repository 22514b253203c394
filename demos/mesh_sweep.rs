//! Example: VPSA mesh-resolution study
//!
//! Runs the four-step CO2/N2 cycle to cyclic steady state for several grid
//! sizes, then prints the cost table and writes CSV files and plots.
//!
//! **Cycle** (defaults):
//! - Pressurization 20 s, Feed 15 s, Blowdown 30 s, Evacuation 40 s
//! - P_L = 0.1 bar, P_H = 1 bar, vacuum at 0.05 bar
//! - Feed: 15 % CO2 at 298.15 K, 1 m/s
//!
//! ```bash
//! cargo run --release --example mesh_sweep
//! cargo run --release --example mesh_sweep --features parallel -- demos/vpsa.toml
//! ```

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

use vpsa_rs::config::VpsaConfig;
use vpsa_rs::output::{
    export::CsvMetadata, export_profiles_csv, export_sweep_csv, plot_profiles, plot_sweep_cost, CsvConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    if logger.is_err() {
        eprintln!("logger already initialised");
    }

    println!("═══════════════════════════════════════════════════════");
    println!("  VPSA column - cyclic steady state vs mesh size");
    println!("═══════════════════════════════════════════════════════\n");

    // ====== Configuration ======

    let config = match std::env::args().nth(1) {
        Some(path) => {
            println!("Configuration: {path}");
            VpsaConfig::from_file(&path)?
        }
        None => {
            println!("Configuration: defaults");
            VpsaConfig::default()
        }
    };

    println!("Column:");
    println!("  Length         : {} m", config.column.length);
    println!("  Cross-section  : {:.4} m²", config.column.cross_section());
    println!("  Porosity       : {}", config.column.porosity);

    let [pressurization, feed, blowdown, evacuation] = config.cycle.durations;
    println!("Cycle:");
    println!("  Pressurization : {pressurization} s");
    println!("  Feed           : {feed} s");
    println!("  Blowdown       : {blowdown} s");
    println!("  Evacuation     : {evacuation} s");
    println!("  P_L / P_H      : {} / {} Pa", config.cycle.bounds.low, config.cycle.bounds.high);
    println!("Sweep:");
    println!("  N              : {:?}", config.sweep.resolutions);
    println!("  Cycle budget   : {}", config.sweep.max_cycles);
    println!("  Tolerance      : {:e}\n", config.sweep.tolerance);

    // ====== Sweep ======

    let report = config.sweep_driver().run_all();
    println!("\n{report}");

    // ====== Outputs ======

    let out_dir = std::env::temp_dir().join("vpsa_mesh_sweep");
    std::fs::create_dir_all(&out_dir)?;

    let mut metadata = CsvMetadata::from_simulation("VPSA column (dual-site Langmuir, LDF)", "BDF (diffsol)");
    metadata.cycle_time = Some(config.cycle.cycle_time());
    metadata.tolerance = Some(config.sweep.tolerance);
    let csv = CsvConfig::default().with_metadata(metadata);

    export_sweep_csv(&report, out_dir.join("sweep.csv"), Some(&csv))?;
    export_profiles_csv(&report, out_dir.join("profiles.csv"), Some(&csv))?;
    plot_profiles(&report, out_dir.join("profiles.svg"), None)?;
    plot_sweep_cost(&report, out_dir.join("cost.svg"), None)?;

    println!("Outputs written to {}", out_dir.display());

    let failed = report.failures().count();
    if failed > 0 {
        println!("{failed} resolution(s) failed");
    }

    Ok(())
}
