use std::path::PathBuf;

use clap::Parser;

use compose_rs::action::{Label, MultiAction};
use compose_rs::data::{DataExpr, DataSpec, Sort, Variable};
use compose_rs::formula::{ActionFormula, Equation, FixpointSymbol, ModalEquationSystem, StateFormula};
use compose_rs::lps::{Lps, Summand};
use compose_rs::network::Network;
use compose_rs::quotient::{quotient_equation_system, quotient_with_options, QuotientOptions};

const NETWORK: &str = "\
length
2
lps_filenames
client
server
synchronization_vector
2
3
think inactive -> think
inactive serve -> serve
request accept -> handshake(Nat)
";

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Component to remove: 0 for the client, 1 for the server.
    #[arg(value_name = "INT", default_value = "1")]
    component: usize,

    /// Only visit matching vector entries for single-action modalities.
    #[clap(long)]
    vector_map: bool,

    /// Disable the rewrite cache.
    #[clap(long)]
    no_cache: bool,

    /// Quotient the property as a modal equation system.
    #[clap(long)]
    equations: bool,

    /// Write the resulting network to this file.
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn simple(name: &str) -> MultiAction {
    MultiAction::single(Label::simple(name).apply(vec![]))
}

/// Requests with an increasing ticket number and thinks in between.
fn client() -> color_eyre::Result<Lps> {
    let t = Variable::new("t", Sort::nat());
    let mut lps = Lps::new(DataSpec::new(), vec![(t.clone(), DataExpr::int(0))])?;
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::lt(DataExpr::var(&t), DataExpr::int(2)),
        MultiAction::single(Label::new("request", [Sort::nat()]).apply(vec![DataExpr::var(&t)])),
        vec![(t.clone(), DataExpr::add(DataExpr::var(&t), DataExpr::int(1)))],
    ))?;
    lps.add_summand(Summand::new(vec![], DataExpr::true_(), simple("think"), vec![]))?;
    Ok(lps)
}

/// Accepts any ticket while idle, then serves it.
fn server() -> color_eyre::Result<Lps> {
    let busy = Variable::new("busy", Sort::bool());
    let m = Variable::new("m", Sort::nat());
    let mut lps = Lps::new(DataSpec::new(), vec![(busy.clone(), DataExpr::false_())])?;
    lps.add_summand(Summand::new(
        vec![m.clone()],
        DataExpr::not(DataExpr::var(&busy)),
        MultiAction::single(Label::new("accept", [Sort::nat()]).apply(vec![DataExpr::var(&m)])),
        vec![(busy.clone(), DataExpr::true_())],
    ))?;
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::var(&busy),
        simple("serve"),
        vec![(busy, DataExpr::false_())],
    ))?;
    Ok(lps)
}

/// `[true]X && <true>true`
fn no_deadlock_step() -> StateFormula {
    StateFormula::and(
        StateFormula::must(ActionFormula::True, StateFormula::var("X", vec![])),
        StateFormula::may(ActionFormula::True, StateFormula::True),
    )
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

    let network: Network = NETWORK.parse()?;
    let component = match args.component {
        0 => client()?,
        _ => server()?,
    };
    println!("removing component {}:\n{}", args.component, component);

    let options = QuotientOptions::new()
        .with_vector_map(args.vector_map)
        .with_rewrite_cache(!args.no_cache);

    let rest = if args.equations {
        let equation = Equation::new(FixpointSymbol::Nu, "X", vec![], no_deadlock_step());
        let system = ModalEquationSystem::new(vec![equation], "X", vec![])?;
        println!("property:\n{}", system);
        let (rest, result) =
            quotient_equation_system(&network, args.component, &component, &system, options)?;
        println!("quotient:\n{}", result);
        rest
    } else {
        let phi = StateFormula::nu("X", vec![], no_deadlock_step());
        println!("property: {}", phi);
        let (rest, result) =
            quotient_with_options(&network, args.component, &component, &phi, options)?;
        println!("quotient: {}", result);
        rest
    };

    println!("remaining network:\n{}", rest);
    println!("boundary labels: {:?}", rest.labels());
    if let Some(path) = &args.output {
        rest.save(path)?;
    }

    let time_total = time_total.elapsed();
    println!("Total time: {:.3} s", time_total.as_secs_f64());

    Ok(())
}
