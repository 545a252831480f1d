//! End-to-end scenarios for exploration, generation and quotienting.

use std::collections::BTreeSet;

use compose_rs::action::{Label, MultiAction};
use compose_rs::data::{DataExpr, DataSpec, Sort, Variable};
use compose_rs::error::Error;
use compose_rs::explore::explore;
use compose_rs::formula::{ActionFormula, StateFormula};
use compose_rs::generator::{GeneratorConfig, StateSpaceGenerator};
use compose_rs::lps::{Lps, Summand};
use compose_rs::lts::{Output, AUT_HEADER_WIDTH};
use compose_rs::network::Network;
use compose_rs::next_state::{LocalGenerator, LpsGenerator, MemoryLoader};
use compose_rs::quotient::quotient;
use compose_rs::vector::{SyncVector, Tag};

const SCENARIO: &str = "\
length
2
lps_filenames
left
right
synchronization_vector
2
3
a inactive -> a
inactive b -> b
a b -> c
";

fn simple(name: &str) -> MultiAction {
    MultiAction::single(Label::simple(name).apply(vec![]))
}

/// One state, always able to do `name`.
fn looping(name: &str) -> Lps {
    let mut lps = Lps::new(DataSpec::new(), vec![]).unwrap();
    lps.add_summand(Summand::new(vec![], DataExpr::true_(), simple(name), vec![]))
        .unwrap();
    lps
}

/// `n` in `0..=3`, moving `up` and `down`.
fn counter() -> Lps {
    let n = Variable::new("n", Sort::nat());
    let x = DataExpr::var(&n);
    let mut lps = Lps::new(DataSpec::new(), vec![(n.clone(), DataExpr::int(0))]).unwrap();
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::lt(x.clone(), DataExpr::int(3)),
        simple("up"),
        vec![(n.clone(), DataExpr::add(x.clone(), DataExpr::int(1)))],
    ))
    .unwrap();
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::lt(DataExpr::int(0), x.clone()),
        simple("down"),
        vec![(n, DataExpr::sub(x, DataExpr::int(1)))],
    ))
    .unwrap();
    lps
}

/// A boolean flipped by `flip(b)`.
fn toggle() -> Lps {
    let b = Variable::new("b", Sort::bool());
    let x = DataExpr::var(&b);
    let mut lps = Lps::new(DataSpec::new(), vec![(b.clone(), DataExpr::false_())]).unwrap();
    let flip = Label::new("flip", [Sort::bool()]).apply(vec![x.clone()]);
    lps.add_summand(Summand::new(
        vec![],
        DataExpr::true_(),
        MultiAction::single(flip),
        vec![(b, DataExpr::not(x))],
    ))
    .unwrap();
    lps
}

const COUNTER_TOGGLE: &str = "\
length
2
lps_filenames
counter
toggle
synchronization_vector
2
3
up inactive -> up
down inactive -> down
inactive flip -> flip(Bool)
";

fn counter_toggle_loader() -> MemoryLoader {
    MemoryLoader::new()
        .with("counter", counter())
        .with("toggle", toggle())
}

// ─── Exploration ───────────────────────────────────────────────────────────────

#[test]
fn scenario_a_explore() {
    let network: Network = SCENARIO.parse().unwrap();
    let generators: Vec<Box<dyn LocalGenerator>> = vec![
        Box::new(LpsGenerator::new(looping("a"))),
        Box::new(LpsGenerator::new(looping("b"))),
    ];
    let transitions = explore(network.vector(), &generators, &[]).unwrap();
    assert_eq!(transitions.len(), 3);

    let provenance: Vec<usize> = transitions.iter().map(|t| t.provenance).collect();
    assert_eq!(provenance, vec![0, 1, 2]);
    let labels: BTreeSet<String> = transitions.iter().map(|t| t.action.to_string()).collect();
    assert_eq!(labels, ["a", "b", "c"].into_iter().map(String::from).collect());
}

#[test]
fn inactive_components_keep_their_state() {
    let vector: SyncVector = "synchronization_vector\n2\n1\nup inactive -> up\n".parse().unwrap();
    let generators: Vec<Box<dyn LocalGenerator>> = vec![
        Box::new(LpsGenerator::new(counter())),
        Box::new(LpsGenerator::new(toggle())),
    ];
    let state = vec![DataExpr::int(1), DataExpr::true_()];
    let transitions = explore(&vector, &generators, &state).unwrap();
    assert_eq!(transitions.len(), 1);
    let t = transitions.iter().next().unwrap();
    assert_eq!(t.target, vec![DataExpr::int(2), DataExpr::true_()]);
}

// ─── Generation ────────────────────────────────────────────────────────────────

#[test]
fn bfs_visits_every_state_once() {
    let network: Network = COUNTER_TOGGLE.parse().unwrap();
    let config = GeneratorConfig::default().with_output(Output::Memory);
    let mut generator = StateSpaceGenerator::initialise(&network, &counter_toggle_loader(), config).unwrap();
    generator.generate().unwrap();
    let summary = generator.finalize().unwrap();

    assert_eq!(summary.states, 8);
    assert_eq!(summary.transitions, 20);
    assert_eq!(summary.levels, 5);
    assert!(!summary.aborted);

    let lts = summary.lts.unwrap();
    let sources: BTreeSet<usize> = lts.transitions().iter().map(|(s, _, _)| *s).collect();
    assert_eq!(sources, (0..8).collect());
    assert_eq!(lts.outgoing(0).count(), 2);
}

#[test]
fn aut_header_written_only_by_finalize() {
    let network: Network = COUNTER_TOGGLE.parse().unwrap();
    let dir = tempfile::tempdir().unwrap();

    // Incomplete run: the generator is dropped without finalizing.
    let incomplete = dir.path().join("incomplete.aut");
    let config = GeneratorConfig::default().with_output(Output::Aut(incomplete.clone()));
    let mut generator = StateSpaceGenerator::initialise(&network, &counter_toggle_loader(), config).unwrap();
    generator.generate().unwrap();
    drop(generator);
    let text = std::fs::read_to_string(&incomplete).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header.len(), AUT_HEADER_WIDTH);
    assert!(header.trim().is_empty());

    // Complete run.
    let complete = dir.path().join("complete.aut");
    let config = GeneratorConfig::default().with_output(Output::Aut(complete.clone()));
    let mut generator = StateSpaceGenerator::initialise(&network, &counter_toggle_loader(), config).unwrap();
    generator.generate().unwrap();
    generator.finalize().unwrap();
    let text = std::fs::read_to_string(&complete).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap().trim_end(), "des (0,20,8)");
    assert_eq!(lines.count(), 20);
}

#[test]
fn bounded_run_leaves_placeholder_header() {
    let network: Network = COUNTER_TOGGLE.parse().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bounded.aut");
    let config = GeneratorConfig::default()
        .with_output(Output::Aut(path.clone()))
        .with_max_states(2);
    let mut generator = StateSpaceGenerator::initialise(&network, &counter_toggle_loader(), config).unwrap();
    generator.generate().unwrap();
    let summary = generator.finalize().unwrap();

    assert!(summary.bounded);
    assert!(!summary.aborted);
    assert_eq!(summary.states, 2);
    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert_eq!(header.len(), AUT_HEADER_WIDTH);
    assert!(header.trim().is_empty());
    assert_eq!(lines.count(), summary.transitions);
}

#[test]
fn aborted_run_leaves_placeholder_header() {
    let network: Network = COUNTER_TOGGLE.parse().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aborted.aut");
    let config = GeneratorConfig::default().with_output(Output::Aut(path.clone()));
    let mut generator = StateSpaceGenerator::initialise(&network, &counter_toggle_loader(), config).unwrap();
    generator.abort_handle().abort();
    generator.generate().unwrap();
    let summary = generator.finalize().unwrap();

    assert!(summary.aborted);
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.lines().next().unwrap().trim().is_empty());
}

#[test]
fn unknown_component_is_fatal() {
    let network: Network = SCENARIO.parse().unwrap();
    let loader = MemoryLoader::new().with("left", looping("a"));
    let err = StateSpaceGenerator::initialise(&network, &loader, GeneratorConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, Error::Fatal { .. }));
    assert!(matches!(err.root(), Error::StructuralMismatch { .. }));
}

// ─── Quotienting ───────────────────────────────────────────────────────────────

#[test]
fn scenario_b_quotient() {
    let network: Network = SCENARIO.parse().unwrap();
    let (rest, _) = quotient(&network, 1, &looping("b"), &StateFormula::True).unwrap();

    assert_eq!(rest.components(), &["left".to_string()]);
    let entries = rest.vector().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].tags(), &[Tag::action("a")]);
    assert_eq!(entries[0].label(), &Label::simple("a"));
    assert_eq!(entries[1].tags(), &[Tag::action("a")]);
    assert_eq!(entries[1].label(), &Label::simple("c1"));
    assert!(rest.labels().contains(&Label::simple("c1")));
}

#[test]
fn quotient_labels_follow_synchronization_patterns() {
    let network: Network = "\
length
3
lps_filenames
p
q
r
synchronization_vector
3
4
a b inactive -> c
a inactive b -> c
inactive b b -> c
a b b -> d
"
    .parse()
    .unwrap();
    let phi = StateFormula::may(
        ActionFormula::action(Label::simple("c").apply(vec![])),
        StateFormula::True,
    );
    let (rest, psi) = quotient(&network, 1, &looping("b"), &phi).unwrap();

    // Three synchronizing patterns, three fresh labels; the inactive entry keeps `c`.
    let fresh: Vec<&Label> = rest.extra_labels().iter().collect();
    assert_eq!(fresh.len(), 3);
    let labels: Vec<String> = rest.vector().entries().iter().map(|e| e.label().to_string()).collect();
    assert_eq!(labels, vec!["c1", "c", "c2", "d1"]);
    assert_eq!(psi.to_string(), "((<c>true || <c1>true) || <c2>true)");
}

#[test]
fn quotient_preserves_load_invariant() {
    let network: Network = SCENARIO.parse().unwrap();
    let (rest, _) = quotient(&network, 0, &looping("a"), &StateFormula::True).unwrap();
    let text = rest.to_string();
    let reparsed: Network = text.parse().unwrap();
    assert_eq!(reparsed.len(), 1);
    assert_eq!(reparsed.vector().length(), 1);
    assert!(rest.extra_labels().contains(&Label::simple("c1")));
    assert_eq!(reparsed.extra_labels(), rest.extra_labels());
    assert_eq!(reparsed.labels(), rest.labels());
}
