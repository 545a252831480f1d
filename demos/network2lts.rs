use std::path::PathBuf;

use clap::Parser;

use compose_rs::action::{Label, MultiAction};
use compose_rs::data::{DataExpr, DataSpec, Sort, Variable};
use compose_rs::generator::{GeneratorConfig, StateSpaceGenerator, Strategy};
use compose_rs::lps::{Lps, Summand};
use compose_rs::lts::Output;
use compose_rs::network::Network;
use compose_rs::next_state::MemoryLoader;

/// Network used when no file is given.
const DEFAULT_NETWORK: &str = "\
% a bounded counter next to a toggle, both reset together
length
2
lps_filenames
counter
toggle
synchronization_vector
2
4
up inactive -> up
down inactive -> down
inactive flip -> flip(Bool)
reset reset -> reset
";

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Network file; components are resolved against the built-in processes
    /// `counter`, `toggle` and `clock`.
    #[arg(value_name = "FILE")]
    network: Option<PathBuf>,

    /// Output file, AUT unless it ends in `.dot`.
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Explore depth-first.
    #[clap(long)]
    dfs: bool,

    /// Report states without outgoing transitions.
    #[clap(long)]
    deadlock: bool,

    /// Stop after this many states.
    #[clap(long, value_name = "INT")]
    max_states: Option<usize>,
}

fn action(name: &str) -> MultiAction {
    MultiAction::single(Label::simple(name).apply(vec![]))
}

/// `n` goes up to 3 and back down; `reset` is possible at the top.
fn counter() -> color_eyre::Result<Lps> {
    let n = Variable::new("n", Sort::nat());
    let x = DataExpr::var(&n);
    let mut lps = Lps::new(DataSpec::new(), vec![(n.clone(), DataExpr::int(0))])?;
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::lt(x.clone(), DataExpr::int(3)),
        action("up"),
        vec![(n.clone(), DataExpr::add(x.clone(), DataExpr::int(1)))],
    ))?;
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::lt(DataExpr::int(0), x.clone()),
        action("down"),
        vec![(n.clone(), DataExpr::sub(x.clone(), DataExpr::int(1)))],
    ))?;
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::equal(x, DataExpr::int(3)),
        action("reset"),
        vec![(n, DataExpr::int(0))],
    ))?;
    Ok(lps)
}

/// A boolean that shows and flips its value.
fn toggle() -> color_eyre::Result<Lps> {
    let b = Variable::new("b", Sort::bool());
    let x = DataExpr::var(&b);
    let mut lps = Lps::new(DataSpec::new(), vec![(b.clone(), DataExpr::false_())])?;
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::true_(),
        MultiAction::single(Label::new("flip", [Sort::bool()]).apply(vec![x.clone()])),
        vec![(b.clone(), DataExpr::not(x))],
    ))?;
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::true_(),
        action("reset"),
        vec![(b, DataExpr::false_())],
    ))?;
    Ok(lps)
}

fn clock() -> color_eyre::Result<Lps> {
    let mut lps = Lps::new(DataSpec::new(), vec![])?;
    lps.add_summand(Summand::new(vec![], DataExpr::true_(), action("tick"), vec![]))?;
    Ok(lps)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let network = match &args.network {
        Some(path) => Network::load(path)?,
        None => DEFAULT_NETWORK.parse::<Network>()?,
    };
    println!("network:\n{}", network);

    let loader = MemoryLoader::new()
        .with("counter", counter()?)
        .with("toggle", toggle()?)
        .with("clock", clock()?);

    let output = match &args.output {
        Some(path) if path.extension().is_some_and(|e| e == "dot") => Output::Dot(path.clone()),
        Some(path) => Output::Aut(path.clone()),
        None => Output::Memory,
    };
    let mut config = GeneratorConfig::default()
        .with_output(output)
        .with_detect_deadlock(args.deadlock)
        .with_strategy(if args.dfs { Strategy::DepthFirst } else { Strategy::BreadthFirst });
    if let Some(max) = args.max_states {
        config = config.with_max_states(max);
    }

    let mut generator = StateSpaceGenerator::initialise(&network, &loader, config)?;
    generator.generate()?;
    let summary = generator.finalize()?;

    println!("states: {}", summary.states);
    println!("transitions: {}", summary.transitions);
    println!("levels: {}", summary.levels);
    if summary.aborted || summary.bounded {
        println!("incomplete: aborted = {}, bounded = {}", summary.aborted, summary.bounded);
    }
    if !summary.deadlocks.is_empty() {
        println!("deadlocks: {:?}", summary.deadlocks);
    }
    if args.output.is_none() {
        if let Some(lts) = &summary.lts {
            print!("{}", lts);
        }
    }

    let time_total = time_total.elapsed();
    println!("Total time: {:.3} s", time_total.as_secs_f64());

    Ok(())
}
