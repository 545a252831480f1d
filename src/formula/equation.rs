use std::collections::BTreeSet;
use std::fmt;

use crate::data::{print_list, DataExpr, Variable};
use crate::error::{Error, Result};

use super::{FixpointSymbol, StateFormula};

/// A single equation `sigma X(d1: S1, ...) = φ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Equation {
    pub symbol: FixpointSymbol,
    pub name: String,
    pub parameters: Vec<Variable>,
    pub body: StateFormula,
}

impl Equation {
    pub fn new(
        symbol: FixpointSymbol,
        name: impl Into<String>,
        parameters: Vec<Variable>,
        body: StateFormula,
    ) -> Self {
        Equation {
            symbol,
            name: name.into(),
            parameters,
            body,
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol, self.name)?;
        if !self.parameters.is_empty() {
            let decls: Vec<String> = self.parameters.iter().map(|v| v.declaration()).collect();
            write!(f, "({})", decls.join(", "))?;
        }
        write!(f, " = {};", self.body)
    }
}

/// An ordered list of equations plus an initial instance `X0(e1, ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalEquationSystem {
    equations: Vec<Equation>,
    initial: String,
    initial_args: Vec<DataExpr>,
}

impl ModalEquationSystem {
    /// Builds the system, checking that equation names and the parameter
    /// names of each equation are unique, and that the initial instance
    /// refers to an equation with matching arity.
    pub fn new(
        equations: Vec<Equation>,
        initial: impl Into<String>,
        initial_args: Vec<DataExpr>,
    ) -> Result<Self> {
        let initial = initial.into();

        let mut names = BTreeSet::new();
        for eq in &equations {
            if !names.insert(eq.name.as_str()) {
                return Err(Error::duplicate(format!(
                    "equation '{}' is defined more than once",
                    eq.name
                )));
            }
            let mut params = BTreeSet::new();
            for p in &eq.parameters {
                if !params.insert(p.name()) {
                    return Err(Error::duplicate(format!(
                        "parameter '{}' of equation '{}' is declared more than once",
                        p.name(),
                        eq.name
                    )));
                }
            }
        }

        let Some(target) = equations.iter().find(|eq| eq.name == initial) else {
            return Err(Error::mismatch(
                "modal equation system",
                format!("initial variable '{}' has no equation", initial),
            ));
        };
        if target.parameters.len() != initial_args.len() {
            return Err(Error::mismatch(
                "modal equation system",
                format!(
                    "initial instance of '{}' has {} arguments, expected {}",
                    initial,
                    initial_args.len(),
                    target.parameters.len()
                ),
            ));
        }

        Ok(ModalEquationSystem {
            equations,
            initial,
            initial_args,
        })
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn initial(&self) -> &str {
        &self.initial
    }

    pub fn initial_args(&self) -> &[DataExpr] {
        &self.initial_args
    }

    /// The initial instance as a formula.
    pub fn initial_state(&self) -> StateFormula {
        StateFormula::var(self.initial.clone(), self.initial_args.clone())
    }

    pub fn equation(&self, name: &str) -> Option<&Equation> {
        self.equations.iter().find(|eq| eq.name == name)
    }

    /// Identifiers used anywhere in the system.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for eq in &self.equations {
            out.insert(eq.name.clone());
            out.extend(eq.parameters.iter().map(|p| p.name().to_string()));
            out.extend(super::find_identifiers(&eq.body));
        }
        for e in &self.initial_args {
            e.identifiers(&mut out);
        }
        out
    }
}

impl fmt::Display for ModalEquationSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for eq in &self.equations {
            writeln!(f, "{}", eq)?;
        }
        if self.initial_args.is_empty() {
            writeln!(f, "init {};", self.initial)
        } else {
            writeln!(f, "init {}({});", self.initial, print_list(&self.initial_args))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::Sort;

    fn counter_system() -> Result<ModalEquationSystem> {
        let n = Variable::new("n", Sort::nat());
        let body = StateFormula::var("X", vec![DataExpr::add(DataExpr::var(&n), DataExpr::int(1))]);
        ModalEquationSystem::new(
            vec![Equation::new(FixpointSymbol::Nu, "X", vec![n], body)],
            "X",
            vec![DataExpr::int(0)],
        )
    }

    #[test]
    fn test_display() {
        let system = counter_system().unwrap();
        assert_eq!(system.to_string(), "nu X(n: Nat) = X((n + 1));\ninit X(0);\n");
        assert_eq!(system.initial_state().to_string(), "X(0)");
        assert!(system.equation("X").is_some());
    }

    #[test]
    fn test_duplicate_equation_names() {
        let eqs = vec![
            Equation::new(FixpointSymbol::Mu, "X", vec![], StateFormula::True),
            Equation::new(FixpointSymbol::Nu, "X", vec![], StateFormula::False),
        ];
        let err = ModalEquationSystem::new(eqs, "X", vec![]).unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition(_)));
    }

    #[test]
    fn test_duplicate_parameter_names() {
        let n = Variable::new("n", Sort::nat());
        let eqs = vec![Equation::new(
            FixpointSymbol::Mu,
            "X",
            vec![n.clone(), n],
            StateFormula::True,
        )];
        let err = ModalEquationSystem::new(eqs, "X", vec![DataExpr::int(0), DataExpr::int(0)])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition(_)));
    }

    #[test]
    fn test_initial_arity() {
        let eqs = vec![Equation::new(FixpointSymbol::Mu, "X", vec![], StateFormula::True)];
        let err = ModalEquationSystem::new(eqs.clone(), "X", vec![DataExpr::int(1)]).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch { .. }));
        let err = ModalEquationSystem::new(eqs, "Y", vec![]).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch { .. }));
    }
}
