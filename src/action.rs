//! Action labels, actions and multi-actions.

use std::collections::BTreeSet;
use std::fmt;

use crate::data::{print_list, DataExpr, DataSpec, Sort, Substitution, Variable};
use crate::error::{Error, Result};

/// An action label: identifier plus ordered argument sorts.
///
/// Equality is identifier plus sorts, so `a(Nat)` and `a(Bool)` are different
/// labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    name: String,
    sorts: Vec<Sort>,
}

impl Label {
    pub fn new(name: impl Into<String>, sorts: impl IntoIterator<Item = Sort>) -> Self {
        Label {
            name: name.into(),
            sorts: sorts.into_iter().collect(),
        }
    }

    /// A label without arguments.
    pub fn simple(name: impl Into<String>) -> Self {
        Label::new(name, [])
    }

    /// The label of the silent step.
    pub fn tau() -> Self {
        Label::simple("tau")
    }

    /// Checks for a silent label: `tau`, or `tau` followed by digits as
    /// introduced when a `tau` entry is quotiented.
    pub fn is_tau(&self) -> bool {
        self.sorts.is_empty()
            && self.name.strip_prefix("tau").is_some_and(|rest| rest.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn arity(&self) -> usize {
        self.sorts.len()
    }

    /// Resolves sort aliases in the argument sorts.
    pub fn normalize(&self, spec: &DataSpec) -> Self {
        Label {
            name: self.name.clone(),
            sorts: self.sorts.iter().map(|s| spec.normalize(s)).collect(),
        }
    }

    /// Applies the label to arguments.
    pub fn apply(&self, args: Vec<DataExpr>) -> Action {
        Action::new(self.clone(), args)
    }

    /// Declaration syntax `name(S1,...,Sk)`, with parentheses also for `k = 0`.
    pub fn declaration(&self) -> String {
        let sorts: Vec<&str> = self.sorts.iter().map(|s| s.name()).collect();
        format!("{}({})", self.name, sorts.join(","))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sorts.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}", self.declaration())
        }
    }
}

/// An action: a label applied to data arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action {
    label: Label,
    args: Vec<DataExpr>,
}

impl Action {
    pub fn new(label: Label, args: Vec<DataExpr>) -> Self {
        debug_assert_eq!(label.arity(), args.len(), "arity of {}", label);
        Action { label, args }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn name(&self) -> &str {
        self.label.name()
    }

    pub fn args(&self) -> &[DataExpr] {
        &self.args
    }

    pub fn substitute(&self, sigma: &Substitution) -> Self {
        Action {
            label: self.label.clone(),
            args: self.args.iter().map(|e| e.substitute(sigma)).collect(),
        }
    }

    pub fn eval(&self, env: &Substitution) -> Result<Self> {
        let args = self
            .args
            .iter()
            .map(|e| e.eval(env))
            .collect::<Result<Vec<_>>>()?;
        Ok(Action {
            label: self.label.clone(),
            args,
        })
    }

    pub fn free_variables(&self, out: &mut BTreeSet<Variable>) {
        for e in &self.args {
            e.free_variables(out);
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.label.name())
        } else {
            write!(f, "{}({})", self.label.name(), print_list(&self.args))
        }
    }
}

/// A multi-action. The empty multi-action is the silent step `tau`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MultiAction {
    actions: Vec<Action>,
}

impl MultiAction {
    pub fn new(actions: Vec<Action>) -> Self {
        MultiAction { actions }
    }

    pub fn tau() -> Self {
        MultiAction::default()
    }

    pub fn single(action: Action) -> Self {
        MultiAction {
            actions: vec![action],
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_tau(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the single action of this multi-action, `None` for `tau`.
    ///
    /// Multi-actions with more than one action are not supported by the
    /// product explorer nor by quotienting.
    pub fn as_single(&self) -> Result<Option<&Action>> {
        match self.actions.as_slice() {
            [] => Ok(None),
            [a] => Ok(Some(a)),
            _ => Err(Error::unsupported(format!(
                "multi-action '{}' has more than one action",
                self
            ))),
        }
    }

    /// Like [`MultiAction::as_single`], with `tau` mapped to an action of the
    /// `tau` label.
    pub fn as_action(&self) -> Result<Action> {
        Ok(match self.as_single()? {
            Some(a) => a.clone(),
            None => Action::new(Label::tau(), vec![]),
        })
    }

    pub fn substitute(&self, sigma: &Substitution) -> Self {
        MultiAction {
            actions: self.actions.iter().map(|a| a.substitute(sigma)).collect(),
        }
    }

    pub fn eval(&self, env: &Substitution) -> Result<Self> {
        let actions = self
            .actions
            .iter()
            .map(|a| a.eval(env))
            .collect::<Result<Vec<_>>>()?;
        Ok(MultiAction { actions })
    }
}

impl fmt::Display for MultiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.is_empty() {
            return write!(f, "tau");
        }
        let parts: Vec<String> = self.actions.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_equality_includes_sorts() {
        let a1 = Label::new("a", [Sort::nat()]);
        let a2 = Label::new("a", [Sort::bool()]);
        assert_ne!(a1, a2);
        assert_eq!(a1, Label::new("a", [Sort::nat()]));
    }

    #[test]
    fn test_label_is_tau() {
        assert!(Label::tau().is_tau());
        assert!(Label::simple("tau1").is_tau());
        assert!(Label::simple("tau42").is_tau());
        assert!(!Label::simple("taut").is_tau());
        assert!(!Label::simple("ta").is_tau());
        assert!(!Label::new("tau1", [Sort::nat()]).is_tau());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::simple("a").to_string(), "a");
        assert_eq!(Label::simple("a").declaration(), "a()");
        let l = Label::new("send", [Sort::nat(), Sort::bool()]);
        assert_eq!(l.to_string(), "send(Nat,Bool)");
    }

    #[test]
    fn test_label_normalize() {
        let mut spec = DataSpec::new();
        spec.add_alias("Msg", "Nat").unwrap();
        let l = Label::new("send", [Sort::new("Msg")]);
        assert_eq!(l.normalize(&spec), Label::new("send", [Sort::nat()]));
    }

    #[test]
    fn test_action_display() {
        let l = Label::new("send", [Sort::nat(), Sort::bool()]);
        let a = l.apply(vec![DataExpr::int(3), DataExpr::true_()]);
        assert_eq!(a.to_string(), "send(3, true)");
        assert_eq!(MultiAction::tau().to_string(), "tau");
    }

    #[test]
    fn test_multi_action_single() {
        let a = Label::simple("a").apply(vec![]);
        let b = Label::simple("b").apply(vec![]);
        assert!(MultiAction::tau().as_single().unwrap().is_none());
        assert_eq!(
            MultiAction::single(a.clone()).as_single().unwrap(),
            Some(&a)
        );
        let ab = MultiAction::new(vec![a, b]);
        assert!(matches!(ab.as_single(), Err(Error::UnsupportedConstruct(_))));
        assert_eq!(MultiAction::tau().as_action().unwrap().name(), "tau");
    }
}
