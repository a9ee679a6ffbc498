mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{CareerReport, CareerRunner, DriverStyle, resolve_seed_inputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Balanced,
    Aggressive,
    Conservative,
    Random,
    /// Every built-in style
    All,
}

impl PolicyArg {
    fn styles(self) -> Vec<DriverStyle> {
        match self {
            Self::Balanced => vec![DriverStyle::Balanced],
            Self::Aggressive => vec![DriverStyle::Aggressive],
            Self::Conservative => vec![DriverStyle::Conservative],
            Self::Random => vec![DriverStyle::Random],
            Self::All => DriverStyle::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "apex-tester", version)]
#[command(about = "Automated career runs and invariant checks for the Apex Racing engine")]
struct Args {
    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Seasons per career
    #[arg(long, default_value_t = 1)]
    seasons: u32,

    /// Driving style to script
    #[arg(long, value_enum, default_value_t = PolicyArg::All)]
    policy: PolicyArg,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// List the built-in driving styles and exit
    #[arg(long)]
    list_policies: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_policies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let runner = CareerRunner::load_default(args.verbose)?;
    let reports = run_careers(&args, &runner, &seeds).await?;

    write_reports(&args, &reports, start_time)?;

    if reports.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn maybe_list_policies(args: &Args) -> Result<bool> {
    if !args.list_policies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available policies:")?;
    for style in DriverStyle::ALL {
        writeln!(output_target.writer(), "  {}", style.label().to_lowercase())?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏁 Apex Career Tester".bright_cyan().bold());
    println!("{}", "=====================".cyan());
}

async fn run_careers(
    args: &Args,
    runner: &CareerRunner,
    seeds: &[u64],
) -> Result<Vec<CareerReport>> {
    println!(
        "{}",
        format!(
            "🏎️  Running {} season(s) over {} race(s) each",
            args.seasons,
            runner.data().calendar.len()
        )
        .bright_yellow()
    );
    let mut reports = Vec::new();
    for style in args.policy.styles() {
        for &seed in seeds {
            let report = runner
                .run(seed, style, args.seasons)
                .await
                .with_context(|| format!("career {style} seed {seed} aborted"))?;
            reports.push(report);
        }
    }
    Ok(reports)
}

fn write_reports(args: &Args, reports: &[CareerReport], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(&mut output_target, reports)?,
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, reports)?;
        }
        ReportFormat::Console => {
            let duration = start_time.elapsed();
            logic::reports::generate_console_report(&mut output_target, reports, duration)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_splitting_drops_blanks() {
        assert_eq!(split_csv("1, 2,,3 "), vec!["1", "2", "3"]);
    }

    #[test]
    fn all_policy_expands_to_every_style() {
        assert_eq!(PolicyArg::All.styles(), DriverStyle::ALL.to_vec());
        assert_eq!(PolicyArg::Random.styles(), vec![DriverStyle::Random]);
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::try_parse_from(["apex-tester"]).unwrap();
        assert_eq!(args.seeds, "1337");
        assert_eq!(args.seasons, 1);
        assert_eq!(args.policy, PolicyArg::All);
        assert_eq!(args.report, ReportFormat::Console);

        let args = Args::try_parse_from([
            "apex-tester",
            "--policy",
            "aggressive",
            "--report",
            "markdown",
            "--seasons",
            "2",
        ])
        .unwrap();
        assert_eq!(args.policy, PolicyArg::Aggressive);
        assert_eq!(args.report, ReportFormat::Markdown);
        assert_eq!(args.seasons, 2);
    }

    #[test]
    fn file_target_writes_through() {
        let path = std::env::temp_dir().join(format!("apex-tester-target-{}", std::process::id()));
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        writeln!(target, "hello").unwrap();
        target.flush_inner().unwrap();
        drop(target);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
        let _ = std::fs::remove_file(path);
    }
}
