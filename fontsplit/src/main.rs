use anyhow::Result;
use clap::Parser;
use fontsplit::{SplitPlan, SplitReport, SplitterConfig};
use std::{io, path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};

/// Splits a font into webfont subsets ranked by character frequency.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The font file to split.
    #[arg(short, long, default_value = "AlibabaPuHuiTi-3-55-Regular.ttf")]
    input: PathBuf,

    /// A file listing how frequently each character is used.
    #[arg(short, long)]
    freq: PathBuf,

    /// The directory to store generated woff2 files in.
    #[arg(short, long, default_value = "subsets")]
    output_dir: PathBuf,

    /// The number of subsets to split the font into.
    #[arg(short, long, default_value_t = 80, value_parser = clap::value_parser!(u32).range(1..))]
    groups: u32,

    /// Where to write the generated .css file.
    #[arg(short, long, default_value = "result.css")]
    css: PathBuf,

    /// A TOML file configuring the stylesheet and the subsetting tool.
    #[arg(long)]
    config: Option<PathBuf>,

    /// The font family name to use in the stylesheet.
    #[arg(long)]
    family: Option<String>,

    /// The prefix of generated subset file names.
    #[arg(long)]
    file_prefix: Option<String>,

    /// The URI to use in place of the output directory in the generated .css file.
    #[arg(long)]
    url_prefix: Option<String>,

    /// How many subsets to generate at once.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    jobs: u32,

    /// Exit with an error status if any subset could not be generated.
    #[arg(long)]
    strict: bool,

    /// Whether to enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main_impl(args: Args) -> Result<SplitReport> {
    let mut config = match &args.config {
        Some(path) => SplitterConfig::load(path)?,
        None => SplitterConfig::default(),
    };
    if args.family.is_some() {
        config.stylesheet.font_family = args.family;
    }
    if args.file_prefix.is_some() {
        config.stylesheet.file_prefix = args.file_prefix;
    }
    if args.url_prefix.is_some() {
        config.stylesheet.url_prefix = args.url_prefix;
    }

    let mut plan = SplitPlan::new(&args.input, &args.freq);
    plan.output_dir = args.output_dir;
    plan.css = args.css;
    plan.groups = args.groups as usize;
    plan.jobs = args.jobs as usize;
    plan.config = config;

    let report = fontsplit::split_font(&plan)?;
    info!("Stylesheet saved to: {}", plan.css.display());
    Ok(report)
}

/// Maps the outcome of a run to the process exit status.
///
/// Fatal errors exit with 1. Failed groups only change the status under `--strict`, where they
/// exit with 2.
fn exit_status(result: &Result<SplitReport>, strict: bool) -> u8 {
    match result {
        Err(e) => {
            error!("{e:#}");
            1
        }
        Ok(report) if report.is_complete() => 0,
        Ok(report) => {
            let failed: Vec<_> = report.failed.iter().map(|x| format!("{x:03}")).collect();
            warn!("{} subsets could not be generated: {}", failed.len(), failed.join(", "));
            if strict {
                2
            } else {
                0
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(if args.verbose { fontsplit_common::FILTER_SPEC } else { "info" })
        .with_writer(io::stderr)
        .init();

    let strict = args.strict;
    ExitCode::from(exit_status(&main_impl(args), strict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use clap::CommandFactory;

    #[test]
    fn verify_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["fontsplit", "-f", "freq.txt"]).unwrap();
        assert_eq!(args.input, PathBuf::from("AlibabaPuHuiTi-3-55-Regular.ttf"));
        assert_eq!(args.output_dir, PathBuf::from("subsets"));
        assert_eq!(args.groups, 80);
        assert_eq!(args.css, PathBuf::from("result.css"));
        assert_eq!(args.jobs, 1);
        assert!(!args.strict);
    }

    #[test]
    fn requires_freq() {
        assert!(Args::try_parse_from(["fontsplit"]).is_err());
    }

    #[test]
    fn rejects_zero_groups() {
        assert!(Args::try_parse_from(["fontsplit", "-f", "x", "-g", "0"]).is_err());
        let args = Args::try_parse_from(["fontsplit", "-f", "x", "-g", "3", "-o", "out"]).unwrap();
        assert_eq!(args.groups, 3);
        assert_eq!(args.output_dir, PathBuf::from("out"));
    }

    fn report(failed: Vec<usize>) -> Result<SplitReport> {
        Ok(SplitReport {
            font_family: "Test".to_string(),
            character_count: 10,
            emitted: 5 - failed.len(),
            failed,
        })
    }

    #[test]
    fn exit_statuses() {
        assert_eq!(exit_status(&report(vec![]), false), 0);
        assert_eq!(exit_status(&report(vec![]), true), 0);
        assert_eq!(exit_status(&report(vec![3]), false), 0);
        assert_eq!(exit_status(&report(vec![1, 3]), true), 2);
        assert_eq!(exit_status(&Err(anyhow!("Input file does not exist")), false), 1);
        assert_eq!(exit_status(&Err(anyhow!("Input file does not exist")), true), 1);
    }

    #[test]
    fn missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let freq = dir.path().join("freq.txt");
        std::fs::write(&freq, "A\t1\n").unwrap();
        let input = dir.path().join("missing.ttf");
        let args = Args::try_parse_from([
            "fontsplit",
            "-i",
            input.to_str().unwrap(),
            "-f",
            freq.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(exit_status(&main_impl(args), false), 1);
    }
}
