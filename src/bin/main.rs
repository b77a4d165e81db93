use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, warn};

use tableau_lp::algorithm::Algorithm;
use tableau_lp::algorithm::sensitivity::analyse;
use tableau_lp::io::import;
use tableau_lp::io::text::Problem;

/// Solve linear and integer programs on a simplex tableau, step by step.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// File containing the problem description
    problem_file: PathBuf,
    /// One of primal-simplex, dual-simplex, branch-and-bound, knapsack, cutting-plane
    #[arg(short, long, default_value_t = Algorithm::PrimalSimplex)]
    algorithm: Algorithm,
    /// Analyse the sensitivity of the objective function coefficients of the final tableau
    #[arg(short, long)]
    sensitivity: bool,
    /// Write the report to this file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Log more, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let level = match opts.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new().filter_level(level).init();

    println!("Reading problem file: \"{}\"...", opts.problem_file.to_string_lossy());
    let problem = import(&opts.problem_file)
        .with_context(|| format!("Couldn't read {:?}", opts.problem_file))?;

    println!("Solving with {}...", opts.algorithm);
    let report = report(problem, opts.algorithm, opts.sensitivity)?;

    match opts.output {
        Some(path) => {
            fs::write(&path, report).with_context(|| format!("Couldn't write {:?}", path))?;
            println!("Report written to \"{}\".", path.to_string_lossy());
        },
        None => print!("{}", report),
    }

    Ok(())
}

/// Solve a problem and describe the canonical form, every step and the result.
///
/// A sensitivity analysis that isn't possible for the final tableau, for example because rows
/// were added while solving, is reported in the text rather than as an error.
fn report(problem: Problem, algorithm: Algorithm, sensitivity: bool) -> Result<String> {
    let mut report = String::new();
    writeln!(report, "Canonical Form:\n\n{}", problem)?;
    let mut tableau = problem.into_tableau().context("Problem is inconsistent")?;
    writeln!(report, "Initial Tableau:\n\n{}", tableau)?;

    let outcome = algorithm.solve(&mut tableau)
        .with_context(|| format!("Running {}", algorithm))?;
    for step in &outcome.steps {
        writeln!(report, "{}\n", step)?;
    }
    writeln!(report, "Result:\n\n{}", outcome.result)?;

    if sensitivity {
        writeln!(report, "\nSensitivity Analysis:\n")?;
        match analyse(&tableau) {
            Ok(analysis) => writeln!(report, "{}", analysis)?,
            Err(error) => {
                warn!("Sensitivity analysis skipped: {}", error);
                writeln!(report, "Not available: {}", error)?;
            },
        }
    }

    Ok(report)
}
