//! Quotienting: removing one component from a network.
//!
//! Given a network of `N` components, a component `i` (as a linear process)
//! and a formula `φ`, the quotient produces a network of `N - 1` components
//! and a formula `φ'` such that the original network satisfies `φ` exactly
//! when the remaining network satisfies `φ'`. Component `i`'s behaviour moves
//! into the formula: its parameters become extra fixpoint parameters, and
//! every modality is unfolded over the synchronization entries and the
//! summands of `i`.
//!
//! Synchronizations in which `i` takes part together with other components
//! survive as fresh action labels, shared between the new network and `φ'`.
//!
//! # Example
//!
//! ```
//! use compose_rs::action::Label;
//! use compose_rs::data::DataSpec;
//! use compose_rs::formula::{ActionFormula, StateFormula};
//! use compose_rs::lps::{Lps, Summand};
//! use compose_rs::network::Network;
//! use compose_rs::quotient::quotient;
//! use compose_rs::data::DataExpr;
//! use compose_rs::action::MultiAction;
//!
//! let network: Network = "length\n2\nlps_filenames\nleft\nright\n\
//!     synchronization_vector\n2\n1\na b -> c\n".parse().unwrap();
//!
//! // The right component can always do `b`.
//! let mut right = Lps::new(DataSpec::new(), vec![]).unwrap();
//! let b = Label::simple("b").apply(vec![]);
//! right.add_summand(Summand::new(vec![], DataExpr::true_(), MultiAction::single(b), vec![])).unwrap();
//!
//! let c = ActionFormula::action(Label::simple("c").apply(vec![]));
//! let phi = StateFormula::may(c, StateFormula::True);
//! let (rest, psi) = quotient(&network, 1, &right, &phi).unwrap();
//! assert_eq!(rest.len(), 1);
//! assert_eq!(psi.to_string(), "<c1>true");
//! ```

mod admits;
mod builder;

pub use admits::admits;
pub use builder::QuotientBuilder;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::formula::{ModalEquationSystem, StateFormula};
use crate::labels::LabelGenerator;
use crate::lps::Lps;
use crate::network::Network;
use crate::vector::SyncVector;

/// Options of a quotient run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotientOptions {
    /// Memoize substitutions into formulas (default: on).
    pub use_rewrite_cache: bool,
    /// For modalities over a single action, only visit the entries whose
    /// result label has that action's name (default: off).
    pub use_vector_map: bool,
}

impl Default for QuotientOptions {
    fn default() -> Self {
        Self {
            use_rewrite_cache: true,
            use_vector_map: false,
        }
    }
}

impl QuotientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rewrite_cache(mut self, enabled: bool) -> Self {
        self.use_rewrite_cache = enabled;
        self
    }

    pub fn with_vector_map(mut self, enabled: bool) -> Self {
        self.use_vector_map = enabled;
        self
    }
}

pub(crate) fn check_index(length: usize, index: usize) -> Result<()> {
    if length < 2 {
        return Err(Error::mismatch(
            "quotient",
            format!("a network of {} component(s) cannot be quotiented", length),
        ));
    }
    if index >= length {
        return Err(Error::mismatch(
            "quotient",
            format!("component index {} out of range for {} components", index, length),
        ));
    }
    Ok(())
}

/// Removes slot `index` from every entry of `vector`.
///
/// - Entries in which `index` is inactive keep their label.
/// - Entries in which `index` is the only participant are dropped.
/// - Entries in which `index` synchronizes with other components get the
///   fresh label `labels` associates with the entry's tags and label.
pub fn quotient_vector(vector: &SyncVector, index: usize, labels: &mut LabelGenerator) -> Result<SyncVector> {
    check_index(vector.length(), index)?;
    let mut result = SyncVector::new(vector.length() - 1)?;
    for entry in vector.entries() {
        let tag = entry.tag(index);
        let label = if !tag.is_active() {
            entry.label().clone()
        } else if entry.others_active(index) {
            labels.fresh_label(entry.tags(), entry.label())
        } else {
            debug!("dropping entry {}", entry);
            continue;
        };
        let mut tags = entry.tags().to_vec();
        tags.remove(index);
        result.add_entry(tags, label)?;
    }
    Ok(result)
}

/// The network without component `index`, plus the fresh labels as boundary
/// labels.
pub fn quotient_network(network: &Network, index: usize, labels: &mut LabelGenerator) -> Result<Network> {
    let vector = quotient_vector(network.vector(), index, labels)?;
    let mut components = network.components().to_vec();
    components.remove(index);
    let mut result = Network::new(components, vector)?;
    result.add_labels(network.extra_labels().iter().cloned());
    result.add_labels(labels.generated().iter().cloned());
    Ok(result)
}

/// Quotients component `index`, described by `component`, out of `network`
/// and `formula` with default options.
pub fn quotient(
    network: &Network,
    index: usize,
    component: &Lps,
    formula: &StateFormula,
) -> Result<(Network, StateFormula)> {
    quotient_with_options(network, index, component, formula, QuotientOptions::default())
}

pub fn quotient_with_options(
    network: &Network,
    index: usize,
    component: &Lps,
    formula: &StateFormula,
    options: QuotientOptions,
) -> Result<(Network, StateFormula)> {
    let mut builder = QuotientBuilder::new(network, index, component, options)?;
    builder.add_identifiers(formula);
    let result = builder.quotient_network(network)?;
    let phi = builder.quotient_formula(formula)?;
    info!(
        "quotiented component {}: {} vector entries left, {} fresh labels",
        index,
        result.vector().len(),
        builder.label_generator().generated().len()
    );
    builder.report();
    Ok((result, phi))
}

/// Like [`quotient_with_options`], for a modal equation system.
pub fn quotient_equation_system(
    network: &Network,
    index: usize,
    component: &Lps,
    system: &ModalEquationSystem,
    options: QuotientOptions,
) -> Result<(Network, ModalEquationSystem)> {
    let mut builder = QuotientBuilder::new(network, index, component, options)?;
    builder.add_system_identifiers(system);
    let result = builder.quotient_network(network)?;
    let quotiented = builder.quotient_equation_system(system)?;
    info!(
        "quotiented component {} out of {} equations",
        index,
        quotiented.equations().len()
    );
    builder.report();
    Ok((result, quotiented))
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::action::{Label, MultiAction};
    use crate::data::{DataExpr, DataSpec, Sort, Variable};
    use crate::formula::{ActionFormula, Assignment, Equation, FixpointSymbol};
    use crate::lps::Summand;
    use crate::vector::Tag;

    const SCENARIO: &str = "length
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

    fn scenario() -> Network {
        SCENARIO.parse().unwrap()
    }

    fn action(name: &str) -> MultiAction {
        MultiAction::single(Label::simple(name).apply(vec![]))
    }

    /// A one-state process that can always do `name`.
    fn looping(name: &str) -> Lps {
        let mut lps = Lps::new(DataSpec::new(), vec![]).unwrap();
        lps.add_summand(Summand::new(vec![], DataExpr::true_(), action(name), vec![]))
            .unwrap();
        lps
    }

    /// `n` counts `b` steps up to 2.
    fn counter() -> Lps {
        let n = Variable::new("n", Sort::nat());
        let mut lps = Lps::new(DataSpec::new(), vec![(n.clone(), DataExpr::int(0))]).unwrap();
        lps.add_summand(Summand::new(
            vec![],
            DataExpr::lt(DataExpr::var(&n), DataExpr::int(2)),
            action("b"),
            vec![(n.clone(), DataExpr::add(DataExpr::var(&n), DataExpr::int(1)))],
        ))
        .unwrap();
        lps
    }

    fn may(name: &str, body: StateFormula) -> StateFormula {
        StateFormula::may(ActionFormula::action(Label::simple(name).apply(vec![])), body)
    }

    fn must(name: &str, body: StateFormula) -> StateFormula {
        StateFormula::must(ActionFormula::action(Label::simple(name).apply(vec![])), body)
    }

    #[test]
    fn test_quotient_vector() {
        let network = scenario();
        let mut labels = LabelGenerator::new();
        labels.add_identifiers(["a", "b", "c"]);
        let v = quotient_vector(network.vector(), 1, &mut labels).unwrap();
        assert_eq!(v.length(), 1);
        assert_eq!(v.len(), 2);
        assert_eq!(v.entries()[0].tags(), &[Tag::action("a")]);
        assert_eq!(v.entries()[0].label(), &Label::simple("a"));
        assert_eq!(v.entries()[1].tags(), &[Tag::action("a")]);
        assert_eq!(v.entries()[1].label(), &Label::simple("c1"));
        assert_eq!(labels.generated(), &[Label::simple("c1")]);
    }

    #[test]
    fn test_quotient_network() {
        let network = scenario();
        let mut labels = LabelGenerator::new();
        labels.add_identifiers(["a", "b", "c"]);
        let rest = quotient_network(&network, 0, &mut labels).unwrap();
        assert_eq!(rest.components(), &["right".to_string()]);
        assert_eq!(rest.vector().len(), 2);
        assert!(rest.labels().contains(&Label::simple("c1")));
        assert!(rest.labels().contains(&Label::simple("b")));
    }

    #[test]
    fn test_index_checks() {
        let network = scenario();
        let lps = looping("b");
        let err = quotient(&network, 2, &lps, &StateFormula::True).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch { .. }));

        let single: Network = "length\n1\nlps_filenames\nonly\nsynchronization_vector\n1\n1\na -> a\n"
            .parse()
            .unwrap();
        let err = quotient(&single, 0, &lps, &StateFormula::True).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch { .. }));
    }

    #[test]
    fn test_may_sole_participant() {
        // <b>true with `right` always able to do `b` alone
        let (_, psi) = quotient(&scenario(), 1, &looping("b"), &may("b", StateFormula::True)).unwrap();
        assert_eq!(psi, StateFormula::True);
    }

    #[test]
    fn test_must_absorbing() {
        // [b]false with `right` always able to do `b` alone
        let (_, psi) = quotient(&scenario(), 1, &looping("b"), &must("b", StateFormula::False)).unwrap();
        assert_eq!(psi, StateFormula::False);
    }

    #[test]
    fn test_must_inactive_and_sync() {
        // [a]false: `a` is done by `left` alone, and `c` never matches `a`
        let (_, psi) = quotient(&scenario(), 1, &looping("b"), &must("a", StateFormula::False)).unwrap();
        assert_eq!(psi.to_string(), "[a]false");
    }

    #[test]
    fn test_sync_uses_fresh_label() {
        let (rest, psi) = quotient(&scenario(), 1, &looping("b"), &may("c", StateFormula::True)).unwrap();
        assert_eq!(psi.to_string(), "<c1>true");
        assert_eq!(rest.vector().entries()[1].label(), &Label::simple("c1"));
    }

    #[test]
    fn test_label_stability() {
        // Both modalities refer to the same synchronization, so to the same label.
        let phi = StateFormula::and(may("c", StateFormula::True), may("c", must("c", StateFormula::False)));
        let (rest, psi) = quotient(&scenario(), 1, &looping("b"), &phi).unwrap();
        assert_eq!(rest.extra_labels().len(), 1);
        assert_eq!(psi.to_string(), "(<c1>true && <c1>[c1]false)");
    }

    #[test]
    fn test_data_guard_and_update() {
        // <b>true for a counter that stops at 2
        let (_, psi) = quotient(&scenario(), 1, &counter(), &may("b", StateFormula::True)).unwrap();
        assert_eq!(psi.to_string(), "val((n < 2))");
    }

    #[test]
    fn test_fixpoint_tracking_parameters() {
        // nu X. <b>X
        let phi = StateFormula::nu("X", vec![], may("b", StateFormula::var("X", vec![])));
        let (_, psi) = quotient(&scenario(), 1, &counter(), &phi).unwrap();
        assert_eq!(
            psi.to_string(),
            "(nu X(n_X: Nat = 0). (val((n_X < 2)) && X((n_X + 1))))"
        );
    }

    #[test]
    fn test_nested_fixpoint_initial_values() {
        // nu X. mu Y. <b>Y
        let phi = StateFormula::nu(
            "X",
            vec![],
            StateFormula::mu("Y", vec![], may("b", StateFormula::var("Y", vec![]))),
        );
        let (_, psi) = quotient(&scenario(), 1, &counter(), &phi).unwrap();
        assert_eq!(
            psi.to_string(),
            "(nu X(n_X: Nat = 0). (mu Y(n_Y: Nat = n_X). (val((n_Y < 2)) && Y((n_Y + 1)))))"
        );
    }

    #[test]
    fn test_rebound_fixpoint_rejected() {
        // nu X. ((mu X. <b>X) && <b>X)
        let phi = StateFormula::nu(
            "X",
            vec![],
            StateFormula::and(
                StateFormula::mu("X", vec![], may("b", StateFormula::var("X", vec![]))),
                may("b", StateFormula::var("X", vec![])),
            ),
        );
        let result = quotient(&scenario(), 1, &counter(), &phi);
        assert!(matches!(result, Err(Error::DuplicateDefinition(_))), "{:?}", result);
    }

    #[test]
    fn test_existing_parameters_kept() {
        let k = Variable::new("k", Sort::nat());
        let phi = StateFormula::mu(
            "X",
            vec![Assignment::new(k.clone(), DataExpr::int(5))],
            StateFormula::var("X", vec![DataExpr::var(&k)]),
        );
        let (_, psi) = quotient(&scenario(), 1, &counter(), &phi).unwrap();
        assert_eq!(psi.to_string(), "(mu X(k: Nat = 5, n_X: Nat = 0). X(k, n_X))");
    }

    #[test]
    fn test_regular_formula_rejected() {
        let star = crate::formula::RegularFormula::Star(Box::new(ActionFormula::True.into()));
        let phi = StateFormula::must(star, StateFormula::False);
        let err = quotient(&scenario(), 1, &looping("b"), &phi).unwrap_err();
        assert!(matches!(err, Error::UnsupportedConstruct(_)));
    }

    #[test]
    fn test_multi_action_summand_rejected() {
        let mut lps = Lps::new(DataSpec::new(), vec![]).unwrap();
        let a = Label::simple("a").apply(vec![]);
        let b = Label::simple("b").apply(vec![]);
        lps.add_summand(Summand::new(vec![], DataExpr::true_(), MultiAction::new(vec![a, b]), vec![]))
            .unwrap();
        let err = quotient(&scenario(), 1, &lps, &may("b", StateFormula::True)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedConstruct(_)));
    }

    #[test]
    fn test_vector_map_same_result() {
        let phi = StateFormula::nu(
            "X",
            vec![],
            StateFormula::and(
                may("b", StateFormula::var("X", vec![])),
                must("a", StateFormula::var("X", vec![])),
            ),
        );
        let options = QuotientOptions::new().with_vector_map(true).with_rewrite_cache(false);
        let (_, with_map) = quotient_with_options(&scenario(), 1, &counter(), &phi, options).unwrap();
        let (_, without) = quotient(&scenario(), 1, &counter(), &phi).unwrap();
        assert_eq!(with_map, without);
    }

    #[test]
    fn test_equation_system() {
        let system = ModalEquationSystem::new(
            vec![Equation::new(FixpointSymbol::Nu, "X", vec![], may("b", StateFormula::var("X", vec![])))],
            "X",
            vec![],
        )
        .unwrap();
        let (_, result) =
            quotient_equation_system(&scenario(), 1, &counter(), &system, QuotientOptions::default()).unwrap();
        assert_eq!(
            result.to_string(),
            "nu X(n_X: Nat) = (val((n_X < 2)) && X((n_X + 1)));\ninit X(0);\n"
        );
    }

    #[test]
    fn test_equation_system_rejects_fixpoints() {
        let inner = StateFormula::mu("Y", vec![], StateFormula::True);
        let system = ModalEquationSystem::new(
            vec![Equation::new(FixpointSymbol::Nu, "X", vec![], inner)],
            "X",
            vec![],
        )
        .unwrap();
        let err = quotient_equation_system(&scenario(), 1, &counter(), &system, QuotientOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedConstruct(_)));
    }
}
