mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use exito_game::GameRules;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{
    RunRecord, SeedInfo, SimulationConfig, Strategy, StrategySummary, resolve_seed_inputs,
    run_game, summarize,
};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for terminals
    Console,
    /// Machine-readable runs and strategy summaries
    Json,
    /// Markdown tables
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "exito-tester", version = "0.1.0")]
#[command(about = "Headless simulation harness for the Exito game engine")]
struct Args {
    /// Seeds to run (comma-separated integers, 0x hex or room codes)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Players seated in each simulated game
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=4))]
    players: u8,

    /// Games per seed and strategy
    #[arg(long, default_value_t = 3)]
    iterations: u64,

    /// Strategies to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List the built-in strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Actions after which a game is ended early
    #[arg(long, default_value_t = 20_000)]
    max_actions: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Board JSON to play instead of the bundled board
    #[arg(long, requires = "decks")]
    board: Option<PathBuf>,

    /// Deck JSON to play instead of the bundled decks
    #[arg(long, requires = "board")]
    decks: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    let strategies = expand_strategies(&args.strategies)?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let rules = load_rules(&args)?;

    if args.report == ReportFormat::Console || args.output.is_some() {
        announce_banner();
    }

    let start_time = Instant::now();
    let records = run_simulations(&args, rules.as_ref(), &strategies, &seed_infos)?;
    let summaries = summarize(&records);
    write_reports(&args, &records, &summaries, start_time)?;

    if records.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in Strategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎲 Exito Simulation Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_strategies(arg: &str) -> Result<Vec<Strategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(arg) {
        if token.eq_ignore_ascii_case("all") {
            strategies.extend(Strategy::ALL);
            continue;
        }
        let Some(strategy) = Strategy::parse(&token) else {
            bail!("Unknown strategy: {token}");
        };
        strategies.push(strategy);
    }
    strategies.dedup();
    if strategies.is_empty() {
        bail!("No strategies selected");
    }
    Ok(strategies)
}

enum LoadedRules {
    Bundled(&'static GameRules),
    Custom(Box<GameRules>),
}

impl AsRef<GameRules> for LoadedRules {
    fn as_ref(&self) -> &GameRules {
        match self {
            Self::Bundled(rules) => rules,
            Self::Custom(rules) => rules,
        }
    }
}

fn load_rules(args: &Args) -> Result<LoadedRules> {
    match (&args.board, &args.decks) {
        (Some(board), Some(decks)) => {
            log::info!("loading rules from {} and {}", board.display(), decks.display());
            Ok(LoadedRules::Custom(Box::new(GameRules::from_files(
                board, decks,
            )?)))
        }
        _ => Ok(LoadedRules::Bundled(GameRules::standard())),
    }
}

fn run_simulations(
    args: &Args,
    rules: &GameRules,
    strategies: &[Strategy],
    seed_infos: &[SeedInfo],
) -> Result<Vec<RunRecord>> {
    let mut records = Vec::new();
    for &strategy in strategies {
        for seed_info in seed_infos {
            for iteration in 0..args.iterations {
                let seed = seed_info.seed.wrapping_add(iteration);
                let config = SimulationConfig::new(strategy, seed)
                    .with_players(usize::from(args.players))
                    .with_max_actions(args.max_actions);
                let record = run_game(rules, &config)
                    .with_context(|| format!("{strategy} seed {}", seed_info.label()))?;
                if args.verbose {
                    eprintln!(
                        "{} [{strategy} seed {seed}] {} after {} turns",
                        if record.passed() { "✅" } else { "❌" },
                        record.winner.as_deref().unwrap_or("nobody"),
                        record.turns
                    );
                }
                records.push(record);
            }
        }
    }
    Ok(records)
}

fn write_reports(
    args: &Args,
    records: &[RunRecord],
    summaries: &[StrategySummary],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(&mut output_target, records, summaries)?;
        }
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, records, summaries)?;
        }
        ReportFormat::Console => {
            logic::reports::generate_console_report(
                &mut output_target,
                records,
                summaries,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
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
    fn all_expands_to_every_strategy() {
        assert_eq!(expand_strategies("all").unwrap(), Strategy::ALL.to_vec());
        assert_eq!(
            expand_strategies("bold, random").unwrap(),
            vec![Strategy::Bold, Strategy::Random]
        );
        assert!(expand_strategies("reckless").is_err());
        assert!(expand_strategies(" , ").is_err());
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::parse_from(["exito-tester"]);
        assert_eq!(args.players, 2);
        assert_eq!(args.report, ReportFormat::Console);
        assert!(args.board.is_none());
        assert!(Args::try_parse_from(["exito-tester", "--players", "5"]).is_err());
        assert!(Args::try_parse_from(["exito-tester", "--board", "b.json"]).is_err());
    }
}
