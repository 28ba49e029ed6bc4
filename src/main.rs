use anyhow::Result;
use clap::Parser;
use console::{style, Emoji};
use env_logger::Env;
use log::debug;
use std::path::PathBuf;
use std::process;

use gimp_layer_export::notifier::VerbosityLevel;
use gimp_layer_export::{
    ExportJob, ExportReport, GimpHost, HostError, LayerExporter, Notifier,
};

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("🎉 ", "");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");

#[derive(Parser)]
#[command(author, version, about = "Export GIMP layers as individual PNG files", long_about = None)]
struct Cli {
    #[arg(long, help = "Input .xcf file to process")]
    input: PathBuf,

    #[arg(long, help = "Output directory for exported layers")]
    output_dir: PathBuf,

    #[arg(long, default_value = "", help = "Prefix for exported file names")]
    prefix: String,

    #[arg(long, help = "Disable PSX optimization")]
    no_psx_optimize: bool,

    #[arg(long, help = "Show the GIMP UI and print extra diagnostics")]
    debug: bool,

    #[arg(long, help = "List the files that would be exported without writing anything")]
    dry_run: bool,

    #[arg(long, help = "Exit with an error if any single layer fails to export")]
    strict: bool,

    #[arg(long, value_name = "PATH", help = "GIMP executable to use instead of searching for one")]
    gimp: Option<PathBuf>,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Verbose mode (-v for info, -vv for debug, -vvv for trace)"
    )]
    verbose: u8,
}

impl Cli {
    /// Debug mode implies at least debug-level logs
    fn verbosity(&self) -> u8 {
        if self.debug {
            self.verbose.max(VerbosityLevel::Debug as u8)
        } else {
            self.verbose
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default())
        .filter_level(VerbosityLevel::from(cli.verbosity()).to_log_level())
        .init();

    print_banner(&cli);

    let succeeded = match run(&cli) {
        Ok(succeeded) => succeeded,
        Err(e) => {
            println!("{}{:#}", FAILURE, e);
            if let Some(HostError::ExecutableNotFound(_)) = e.downcast_ref::<HostError>() {
                println!("Please make sure GIMP 3 is installed or pass its path with --gimp");
            }
            false
        }
    };

    if succeeded {
        println!();
        println!(
            "{}{}",
            SUCCESS,
            style("SUCCESS! Layer export finished.").green().bold()
        );
        process::exit(0);
    }

    println!();
    println!(
        "{}{}",
        FAILURE,
        style("FAILED! There was an error during the export process.")
            .red()
            .bold()
    );
    process::exit(1);
}

fn run(cli: &Cli) -> Result<bool> {
    let job = ExportJob::new(&cli.input, &cli.output_dir)?
        .with_prefix(cli.prefix.clone())
        .with_psx_optimize(!cli.no_psx_optimize)
        .with_debug(cli.debug)
        .with_dry_run(cli.dry_run);
    debug!("Job: {:?}", job);

    let host = match &cli.gimp {
        Some(path) => GimpHost::new(path.clone()),
        None => GimpHost::locate(),
    };
    println!("{}Found GIMP at: {}", SEARCH, host.executable().display());

    let exporter = LayerExporter::new(host, Notifier::new(cli.verbosity()));
    let report = exporter.export(&job)?;

    print_report(&job, &report);
    Ok(report.is_success(cli.strict))
}

fn print_banner(cli: &Cli) {
    let rule = "=".repeat(60);
    let on_off = |flag: bool| if flag { "Enabled" } else { "Disabled" };

    println!("{}", rule);
    println!("{}", style("GIMP BATCH LAYER EXPORTER").bold());
    println!("{}", rule);
    println!("Input file: {}", cli.input.display());
    println!("Output directory: {}", cli.output_dir.display());
    println!("Prefix: {}", cli.prefix);
    println!("PSX Optimization: {}", on_off(!cli.no_psx_optimize));
    println!("Debug mode: {}", on_off(cli.debug));
    println!("{}", rule);
    println!();
}

fn print_report(job: &ExportJob, report: &ExportReport) {
    if job.dry_run() {
        println!("Files that would be exported:");
    } else {
        println!("Exported files:");
    }
    for path in &report.exported {
        println!("  {}", path.display());
    }
    if report.hidden > 0 {
        println!("Skipped {} hidden layers", report.hidden);
    }
    if report.has_failures() {
        println!(
            "{}{} layers failed to export:",
            WARNING,
            report.failures.len()
        );
        for failure in &report.failures {
            println!("  {}", failure);
        }
    }
    println!("{}Output directory: {}", FOLDER, job.output_dir().display());
}
