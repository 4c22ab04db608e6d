use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use cogclassifier_rs::blast::TopHitPolicy;
use cogclassifier_rs::config::{default_download_dir, default_thread_num, ClassifierConfig};
use cogclassifier_rs::consts::{DEFAULT_EVALUE, LOG_FILE};
use cogclassifier_rs::{run_classifier_with, RunStep};

/// A tool for classifying prokaryote protein sequences into COG functional category
#[derive(Parser, Debug)]
#[command(name = "cogclassifier-rs", version, about)]
struct Cli {
    /// Input query protein fasta file
    #[arg(short = 'i', long)]
    infile: PathBuf,

    /// Output directory
    #[arg(short = 'o', long)]
    outdir: PathBuf,

    /// Download COG & CDD resources directory
    #[arg(short = 'd', long, default_value_os_t = default_download_dir())]
    download_dir: PathBuf,

    /// RPS-BLAST num_thread parameter
    #[arg(short = 't', long, default_value_t = default_thread_num())]
    thread_num: usize,

    /// RPS-BLAST e-value parameter
    #[arg(short = 'e', long, default_value_t = DEFAULT_EVALUE)]
    evalue: f64,

    /// Which hit represents a query
    #[arg(long, value_enum, default_value_t = TopHitArg::First)]
    top_hit: TopHitArg,

    /// Local COG definition table (skips downloading cog-24.def.tab)
    #[arg(long)]
    cog_def: Option<PathBuf>,

    /// Local COG functional category table (default: bundled)
    #[arg(long)]
    cog_fun: Option<PathBuf>,

    /// No print log on screen
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Print debug log
    #[arg(long, hide = true)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TopHitArg {
    /// First hit per query in RPS-BLAST output order
    First,
    /// Highest bit score per query
    MaxBitscore,
}

impl From<TopHitArg> for TopHitPolicy {
    fn from(arg: TopHitArg) -> Self {
        match arg {
            TopHitArg::First => TopHitPolicy::FirstOccurrence,
            TopHitArg::MaxBitscore => TopHitPolicy::MaxBitScore,
        }
    }
}

/// Log sink writing to the log file and, unless quiet, to stderr.
/// Stderr lines are printed with the spinners suspended.
struct LogSink {
    file: File,
    quiet: bool,
    progress: MultiProgress,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.quiet {
            self.progress.suspend(|| io::stderr().write_all(buf))?;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn init_logger(cli: &Cli, progress: &MultiProgress) -> io::Result<()> {
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let file = File::create(cli.outdir.join(LOG_FILE))?;

    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp_secs()
        .target(env_logger::Target::Pipe(Box::new(LogSink {
            file,
            quiet: cli.quiet,
            progress: progress.clone(),
        })))
        .init();
    Ok(())
}

fn spinner(progress: &MultiProgress, color: &str, msg: &'static str) -> ProgressBar {
    let spinner = progress.add(ProgressBar::new_spinner());
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let start = Instant::now();

    if let Err(e) = fs::create_dir_all(&cli.outdir) {
        eprintln!("Cannot create output directory {}: {e}", cli.outdir.display());
        return ExitCode::FAILURE;
    }
    let progress = MultiProgress::new();
    if cli.quiet {
        progress.set_draw_target(ProgressDrawTarget::hidden());
    }
    if let Err(e) = init_logger(&cli, &progress) {
        eprintln!("Cannot create log file: {e}");
        return ExitCode::FAILURE;
    }

    log::info!("Run cogclassifier-rs v{}", env!("CARGO_PKG_VERSION"));
    log::info!("$ {}", std::env::args().collect::<Vec<_>>().join(" "));
    log::info!("Operating System: {}", std::env::consts::OS);
    log::info!("Parameter: infile={}", cli.infile.display());
    log::info!("Parameter: outdir={}", cli.outdir.display());
    log::info!("Parameter: download_dir={}", cli.download_dir.display());
    log::info!("Parameter: thread_num={}", cli.thread_num);
    log::info!("Parameter: evalue={}", cli.evalue);
    log::info!("Parameter: top_hit={:?}", cli.top_hit);

    let mut config = ClassifierConfig::new(&cli.infile, &cli.outdir);
    config.download_dir = cli.download_dir.clone();
    config.thread_num = cli.thread_num;
    config.evalue = cli.evalue;
    config.top_hit_policy = cli.top_hit.into();
    config.cog_definition_file = cli.cog_def.clone();
    config.cog_func_category_file = cli.cog_fun.clone();

    let mut current: Option<ProgressBar> = None;
    let result = run_classifier_with(&config, |step: RunStep| {
        if let Some(done) = current.take() {
            done.finish_and_clear();
        }
        current = Some(spinner(&progress, "green", step.message()));
    });
    if let Some(done) = current.take() {
        done.finish_and_clear();
    }

    match result {
        Ok(results) => {
            log::info!(
                "Done (elapsed time: {:.2}[s]) {} / {} sequences classified",
                start.elapsed().as_secs_f64(),
                results.classify_count,
                results.query_count
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
