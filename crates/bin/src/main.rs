//! Verdant CLI binary.
//!
//! Runs the expanding-window ESG study and prints where the results went.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use verdant::models::SkippedWindow;
use verdant::output::{format_importances_table, format_metrics_table};
use verdant::{Study, StudyConfig};

#[derive(Parser)]
#[command(name = "verdant")]
#[command(about = "Verdant: do ESG scores predict next-year stock returns?", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file (missing keys keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input dataset, overrides the configured path
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output directory, overrides the configured one
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Test year to evaluate (repeatable), replaces the configured list
    #[arg(long = "test-year")]
    test_years: Vec<i32>,

    /// Hide progress spinners
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn study_config(&self) -> Result<StudyConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => StudyConfig::from_json_file(path)?,
            None => StudyConfig::default(),
        };

        if let Some(data) = &self.data {
            config.loader.path = data.clone();
        }
        if let Some(dir) = &self.results_dir {
            config.output.results_dir = dir.clone();
        }
        if !self.test_years.is_empty() {
            config.test_years = self.test_years.clone();
        }

        Ok(config)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.study_config()?;
    debug!("Study configuration: {:?}", config);
    let study = Study::new(config)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "ESG AND STOCK RETURNS");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let table = study.load()?;
    println!(
        "Loaded dataset with {} rows and {} columns.",
        table.row_count(),
        table.column_count()
    );
    if table.report().rows_without_year > 0 {
        println!(
            "  ({} rows without a year were set aside)",
            table.report().rows_without_year
        );
    }

    println!("\nRunning Linear Regression and Lasso...");
    let pb = spinner(cli.quiet, "Fitting linear models")?;
    let linear = study.run_linear(&table)?;
    pb.finish_with_message(format!("Evaluated {} windows", linear.linear.len()));
    report_skipped(&linear.skipped);

    println!("\nRunning Random Forest...");
    let pb = spinner(cli.quiet, "Fitting random forest")?;
    let forest = study.run_forest(&table)?;
    pb.finish_with_message(format!("Evaluated {} windows", forest.windows.len()));
    report_skipped(&forest.skipped);

    let outputs = study.write(&linear, &forest)?;

    println!("\nML metrics saved to {}", outputs.metrics_path.display());
    print!("{}", format_metrics_table(&outputs.metric_rows));

    println!(
        "\nFeature importances saved to {}",
        outputs.importances_path.display()
    );
    print!("{}", format_importances_table(&outputs.feature_importances));

    println!(
        "\nDone. Results are stored in the '{}' folder.\n",
        study.config().output.results_dir.display()
    );

    Ok(())
}

fn spinner(quiet: bool, message: &'static str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn report_skipped(skipped: &[SkippedWindow]) {
    for window in skipped {
        println!("  {}", window);
    }
}
