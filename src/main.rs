/*!
 * rwbench - Main Entry Point
 *
 * Runs the ordered-set workload under the selected lock and prints a
 * summary. Workload parameters missing from the command line are asked
 * for interactively.
 */

use clap::Parser;
use rwbench::core::errors::{BenchError, ConfigError};
use rwbench::core::limits::DEFAULT_KEY_SPACE;
use rwbench::{init_tracing, LockBackend, LockConfig, OpMix, WorkloadConfig, WorkloadDriver};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing::info;

/// Reader-writer lock benchmark over a sorted linked-list set
#[derive(Parser, Debug)]
#[command(name = "rwbench", version, about, long_about = None)]
struct CliArgs {
    /// Number of worker threads
    threads: usize,

    /// Keys inserted before workers start
    #[arg(long = "initial-keys")]
    initial_keys: Option<usize>,

    /// Operations across all threads
    #[arg(long = "total-ops")]
    total_ops: Option<u64>,

    /// Fraction of operations that are searches (0..=1)
    #[arg(long = "search")]
    search: Option<f64>,

    /// Fraction of operations that are inserts (0..=1)
    #[arg(long = "insert")]
    insert: Option<f64>,

    /// Keys are drawn from 0..KEY_SPACE
    #[arg(long = "key-space", default_value_t = DEFAULT_KEY_SPACE)]
    key_space: u64,

    /// Lock guarding the set
    #[arg(long = "lock", value_enum, default_value_t = LockBackend::WriterPriority)]
    lock: LockBackend,

    /// Treat release-without-acquire as a no-op instead of an error
    #[arg(long = "lenient-release")]
    lenient_release: bool,

    /// Fixed seed for reproducible key streams
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Repeat the benchmark and report min/max/avg time
    #[arg(long = "runs", default_value_t = 1)]
    runs: u32,

    /// Print the summary as JSON
    #[arg(long = "json")]
    json: bool,
}

/// Asks for parameters not given on the command line
///
/// Questions go to `output` (stderr in the binary) so stdout only ever
/// carries the summary.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn ask<T: FromStr>(&mut self, field: &str, question: &str) -> Result<T, BenchError> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.trim();
        answer.parse().map_err(|_| {
            ConfigError::InvalidInput {
                field: field.to_string(),
                input: answer.to_string(),
            }
            .into()
        })
    }

    fn or_ask<T: FromStr>(
        &mut self,
        given: Option<T>,
        field: &str,
        question: &str,
    ) -> Result<T, BenchError> {
        match given {
            Some(value) => Ok(value),
            None => self.ask(field, question),
        }
    }
}

fn build_config<R: BufRead, W: Write>(
    args: &CliArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<WorkloadConfig, BenchError> {
    let initial_keys = prompter.or_ask(
        args.initial_keys,
        "initial_keys",
        "How many keys should be inserted in the main thread?",
    )?;
    let total_ops = prompter.or_ask(
        args.total_ops,
        "total_ops",
        "How many ops total should be executed?",
    )?;
    let search = prompter.or_ask(
        args.search,
        "search",
        "Percent of ops that should be searches? (between 0 and 1)",
    )?;
    let insert = prompter.or_ask(
        args.insert,
        "insert",
        "Percent of ops that should be inserts? (between 0 and 1)",
    )?;

    let lock = if args.lenient_release {
        LockConfig::legacy()
    } else {
        LockConfig::strict()
    };

    let config = WorkloadConfig {
        threads: args.threads,
        initial_keys,
        total_ops,
        mix: OpMix::new(search, insert)?,
        key_space: args.key_space,
        backend: args.lock,
        lock,
        seed: args.seed,
        runs: args.runs,
    };
    config.validate()?;
    Ok(config)
}

fn main() -> miette::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let mut prompter = Prompter {
        input: io::stdin().lock(),
        output: io::stderr(),
    };
    let config = build_config(&args, &mut prompter)?;
    let json = args.json;

    info!(threads = config.threads, backend = %config.backend, runs = config.runs, "rwbench starting");

    let driver = WorkloadDriver::new(config).map_err(BenchError::from)?;
    let summary = driver.run_repeated()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).map_err(BenchError::from)?
        );
    } else {
        println!("{}", summary);
    }

    Ok(())
}
