//! Linear processes.
//!
//! A linear process is a vector of process parameters with initial values and
//! a list of action summands
//!
//! ```text
//! sum e1: S1, ..., em: Sm . c -> a(args) . P(d1 := g1, ..., dn := gn)
//! ```
//!
//! Parameters without an update keep their value.

use std::collections::BTreeSet;
use std::fmt;

use crate::action::{Label, MultiAction};
use crate::data::{print_list, DataExpr, DataSpec, Substitution, Variable};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summand {
    variables: Vec<Variable>,
    condition: DataExpr,
    action: MultiAction,
    assignments: Vec<(Variable, DataExpr)>,
}

impl Summand {
    pub fn new(
        variables: Vec<Variable>,
        condition: DataExpr,
        action: MultiAction,
        assignments: Vec<(Variable, DataExpr)>,
    ) -> Self {
        Summand {
            variables,
            condition,
            action,
            assignments,
        }
    }

    /// Summation variables.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn condition(&self) -> &DataExpr {
        &self.condition
    }

    pub fn action(&self) -> &MultiAction {
        &self.action
    }

    pub fn assignments(&self) -> &[(Variable, DataExpr)] {
        &self.assignments
    }

    /// The update expression of every parameter, in parameter order.
    pub fn next_state(&self, parameters: &[Variable]) -> Vec<DataExpr> {
        parameters
            .iter()
            .map(|d| {
                self.assignments
                    .iter()
                    .find(|(v, _)| v == d)
                    .map(|(_, g)| g.clone())
                    .unwrap_or_else(|| DataExpr::var(d))
            })
            .collect()
    }

    fn identifiers(&self, out: &mut BTreeSet<String>) {
        for v in &self.variables {
            out.insert(v.name().to_string());
        }
        self.condition.identifiers(out);
        for a in self.action.actions() {
            out.insert(a.name().to_string());
            for e in a.args() {
                e.identifiers(out);
            }
        }
        for (v, g) in &self.assignments {
            out.insert(v.name().to_string());
            g.identifiers(out);
        }
    }
}

impl fmt::Display for Summand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.variables.is_empty() {
            let decls: Vec<String> = self.variables.iter().map(|v| v.declaration()).collect();
            write!(f, "sum {}. ", decls.join(", "))?;
        }
        write!(f, "{} -> {} . P(", self.condition, self.action)?;
        let updates: Vec<String> = self
            .assignments
            .iter()
            .map(|(v, g)| format!("{} = {}", v, g))
            .collect();
        write!(f, "{})", updates.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lps {
    data: DataSpec,
    parameters: Vec<Variable>,
    initial: Vec<DataExpr>,
    labels: Vec<Label>,
    summands: Vec<Summand>,
}

impl Lps {
    /// Creates a process without summands. Parameter names must be unique.
    pub fn new(data: DataSpec, parameters: Vec<(Variable, DataExpr)>) -> Result<Self> {
        let mut names = BTreeSet::new();
        for (d, _) in &parameters {
            if !names.insert(d.name().to_string()) {
                return Err(Error::duplicate(format!("process parameter '{}'", d.name())));
            }
        }
        let (parameters, initial) = parameters.into_iter().unzip();
        Ok(Lps {
            data,
            parameters,
            initial,
            labels: Vec::new(),
            summands: Vec::new(),
        })
    }

    pub fn data(&self) -> &DataSpec {
        &self.data
    }

    pub fn parameters(&self) -> &[Variable] {
        &self.parameters
    }

    pub fn initial_values(&self) -> &[DataExpr] {
        &self.initial
    }

    /// Declared action labels.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn summands(&self) -> &[Summand] {
        &self.summands
    }

    /// Declares an action label; declaring a label twice has no effect.
    pub fn add_label(&mut self, label: Label) {
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    pub fn add_labels(&mut self, labels: impl IntoIterator<Item = Label>) {
        for l in labels {
            self.add_label(l);
        }
    }

    /// Appends a summand and declares the labels of its actions.
    ///
    /// Summation variables must be distinct from each other and from the
    /// process parameters; every assigned variable must be a parameter.
    pub fn add_summand(&mut self, summand: Summand) -> Result<()> {
        let mut names: BTreeSet<&str> = self.parameters.iter().map(|d| d.name()).collect();
        for e in summand.variables() {
            if !names.insert(e.name()) {
                return Err(Error::duplicate(format!(
                    "summation variable '{}' in summand '{}'",
                    e.name(),
                    summand
                )));
            }
        }
        let mut assigned = BTreeSet::new();
        for (v, _) in summand.assignments() {
            if !self.parameters.contains(v) {
                return Err(Error::mismatch(
                    format!("summand '{}'", summand),
                    format!("'{}' is not a process parameter", v.declaration()),
                ));
            }
            if !assigned.insert(v) {
                return Err(Error::duplicate(format!(
                    "assignment to '{}' in summand '{}'",
                    v, summand
                )));
            }
        }
        for a in summand.action().actions() {
            self.add_label(a.label().clone());
        }
        self.summands.push(summand);
        Ok(())
    }

    /// Maps every parameter to its initial value.
    pub fn initial_substitution(&self) -> Substitution {
        self.parameters
            .iter()
            .cloned()
            .zip(self.initial.iter().cloned())
            .collect()
    }

    /// All identifiers used by the process: parameters, summation variables,
    /// action names, sort and constructor names.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.data.identifiers(&mut out);
        for d in &self.parameters {
            out.insert(d.name().to_string());
        }
        for e in &self.initial {
            e.identifiers(&mut out);
        }
        for l in &self.labels {
            out.insert(l.name().to_string());
        }
        for s in &self.summands {
            s.identifiers(&mut out);
        }
        out
    }
}

impl fmt::Display for Lps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decls: Vec<String> = self.parameters.iter().map(|d| d.declaration()).collect();
        writeln!(f, "proc P({}) =", decls.join(", "))?;
        for (k, s) in self.summands.iter().enumerate() {
            let sep = if k + 1 < self.summands.len() { " +" } else { ";" };
            writeln!(f, "    {}{}", s, sep)?;
        }
        write!(f, "init P({});", print_list(&self.initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::Sort;

    fn counter() -> Lps {
        let n = Variable::new("n", Sort::nat());
        let mut lps = Lps::new(DataSpec::new(), vec![(n.clone(), DataExpr::int(0))]).unwrap();
        lps.add_summand(Summand::new(
            vec![],
            DataExpr::lt(DataExpr::var(&n), DataExpr::int(2)),
            MultiAction::single(Label::simple("inc").apply(vec![])),
            vec![(n.clone(), DataExpr::add(DataExpr::var(&n), DataExpr::int(1)))],
        ))
        .unwrap();
        lps
    }

    #[test]
    fn test_labels_declared_by_summands() {
        let lps = counter();
        assert_eq!(lps.labels(), &[Label::simple("inc")]);
    }

    #[test]
    fn test_next_state_keeps_unassigned() {
        let n = Variable::new("n", Sort::nat());
        let b = Variable::new("b", Sort::bool());
        let s = Summand::new(
            vec![],
            DataExpr::true_(),
            MultiAction::tau(),
            vec![(b.clone(), DataExpr::false_())],
        );
        assert_eq!(
            s.next_state(&[n.clone(), b]),
            vec![DataExpr::var(&n), DataExpr::false_()]
        );
    }

    #[test]
    fn test_duplicate_parameter() {
        let n = Variable::new("n", Sort::nat());
        let result = Lps::new(
            DataSpec::new(),
            vec![(n.clone(), DataExpr::int(0)), (n, DataExpr::int(1))],
        );
        assert!(matches!(result, Err(Error::DuplicateDefinition(_))));
    }

    #[test]
    fn test_summation_variable_shadowing_parameter() {
        let mut lps = counter();
        let n = Variable::new("n", Sort::nat());
        let s = Summand::new(vec![n], DataExpr::true_(), MultiAction::tau(), vec![]);
        assert!(matches!(lps.add_summand(s), Err(Error::DuplicateDefinition(_))));
    }

    #[test]
    fn test_assignment_to_unknown_parameter() {
        let mut lps = counter();
        let m = Variable::new("m", Sort::nat());
        let s = Summand::new(vec![], DataExpr::true_(), MultiAction::tau(), vec![(m, DataExpr::int(1))]);
        assert!(matches!(
            lps.add_summand(s),
            Err(Error::StructuralMismatch { .. })
        ));
    }

    #[test]
    fn test_identifiers() {
        let ids = counter().identifiers();
        assert!(ids.contains("n"));
        assert!(ids.contains("inc"));
    }

    #[test]
    fn test_display() {
        let text = counter().to_string();
        assert_eq!(
            text,
            "proc P(n: Nat) =\n    (n < 2) -> inc . P(n = (n + 1));\ninit P(0);"
        );
    }
}
