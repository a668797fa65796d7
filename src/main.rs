// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use propwealth_dashboard::{load_dataset, DashboardConfig, FilterOptions};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "check" {
        // Check mode
        let config = DashboardConfig::load(args.get(2).map(PathBuf::from).as_deref())?;
        run_check(&config)?;
    } else {
        // UI mode (default)
        let config = DashboardConfig::load(args.get(1).map(PathBuf::from).as_deref())?;
        run_ui_mode(config)?;
    }

    Ok(())
}

fn run_check(config: &DashboardConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    println!("🔍 PropwealthNext - Dataset Check");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading {:?} (sheet {})...", config.data_path, config.sheet_name);
    let dataset = load_dataset(&config.data_path, &config.sheet_name)
        .with_context(|| format!("Failed to load {:?}", config.data_path))?;
    println!("✓ Loaded {} rows, {} columns", dataset.len(), dataset.columns().len());
    println!("✓ Fingerprint: {}", dataset.fingerprint);

    let options = FilterOptions::from_dataset(&dataset);
    println!("\n🎛️  Filters");
    println!("   States:          {}", options.states.len());
    println!("   Regions (SA4):   {}", options.regions.len());
    println!("   Sub Regions:     {}", options.sub_regions.len());
    println!("   Property Types:  {}", options.property_types.len());
    println!(
        "   Yield slider:    {:.2} .. {:.2} (default {:.2})",
        options.yield_range.min, options.yield_range.max, options.yield_range.default
    );
    println!(
        "   Growth slider:   {} .. {} (default {})",
        options.growth_range.min, options.growth_range.max, options.growth_range.default
    );

    if !config.logo_path.is_file() {
        println!("\n⚠️  Logo not found at {:?} (a placeholder will be shown)", config.logo_path);
    }

    println!("\n✅ Dataset OK");
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: DashboardConfig) -> Result<()> {
    // Logs go to a file; the terminal belongs to the UI
    let log_file = std::fs::File::create("propwealth-tui.log").context("Failed to create log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    println!("🖥️  Loading PropwealthNext Dashboard...\n");

    let mut app = ui::App::new(propwealth_dashboard::Dashboard::new(config));
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: DashboardConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin propwealth-server --features server");
    std::process::exit(1);
}
