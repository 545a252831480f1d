//! Modal mu-calculus formulas.
//!
//! There are three formula categories, each a closed tree type:
//!
//! - [`ActionFormula`]: predicates on single actions, e.g. `exists n: Nat. send(n)`;
//! - [`RegularFormula`]: regular expressions over action formulas, e.g. `true* . a`;
//! - [`StateFormula`]: properties of states, e.g. `nu X. [true]X && <true>true`.
//!
//! The lowercase constructors ([`StateFormula::and`], [`StateFormula::forall`],
//! ...) simplify on the fly: `true && φ` becomes `φ`, `forall x. true` becomes
//! `true`, data constants become `true` or `false`, and so on. The tree
//! variants can still be built directly when no simplification is wanted.
//!
//! Formulas are printed in mCRL2 syntax:
//!
//! ```
//! use compose_rs::action::Label;
//! use compose_rs::formula::{ActionFormula, RegularFormula, StateFormula};
//!
//! let a = ActionFormula::action(Label::simple("a").apply(vec![]));
//! let phi = StateFormula::nu(
//!     "X",
//!     vec![],
//!     StateFormula::and(
//!         StateFormula::must(RegularFormula::Action(ActionFormula::True), StateFormula::var("X", vec![])),
//!         StateFormula::may(RegularFormula::Action(a), StateFormula::True),
//!     ),
//! );
//! assert_eq!(phi.to_string(), "(nu X. ([true]X && <a>true))");
//! ```

mod equation;
mod replace;

pub use equation::{Equation, ModalEquationSystem};
pub use replace::{
    find_fixpoint_names, find_free_variables, find_identifiers, replace_action_variables,
    replace_variables,
};

use std::fmt;

use crate::action::{Action, MultiAction};
use crate::data::{print_list, DataExpr, Variable};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionFormula {
    True,
    False,
    /// A data guard.
    Data(DataExpr),
    Not(Box<ActionFormula>),
    And(Box<ActionFormula>, Box<ActionFormula>),
    Or(Box<ActionFormula>, Box<ActionFormula>),
    Imp(Box<ActionFormula>, Box<ActionFormula>),
    Forall(Vec<Variable>, Box<ActionFormula>),
    Exists(Vec<Variable>, Box<ActionFormula>),
    /// Matches exactly this multi-action; the empty one is `tau`.
    MultiAction(MultiAction),
}

impl ActionFormula {
    pub fn action(a: Action) -> Self {
        ActionFormula::MultiAction(MultiAction::single(a))
    }

    pub fn tau() -> Self {
        ActionFormula::MultiAction(MultiAction::tau())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(x: ActionFormula) -> Self {
        ActionFormula::Not(Box::new(x))
    }

    pub fn and(x: ActionFormula, y: ActionFormula) -> Self {
        ActionFormula::And(Box::new(x), Box::new(y))
    }

    pub fn or(x: ActionFormula, y: ActionFormula) -> Self {
        ActionFormula::Or(Box::new(x), Box::new(y))
    }

    pub fn imp(x: ActionFormula, y: ActionFormula) -> Self {
        ActionFormula::Imp(Box::new(x), Box::new(y))
    }

    pub fn forall(variables: Vec<Variable>, body: ActionFormula) -> Self {
        ActionFormula::Forall(variables, Box::new(body))
    }

    pub fn exists(variables: Vec<Variable>, body: ActionFormula) -> Self {
        ActionFormula::Exists(variables, Box::new(body))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegularFormula {
    Action(ActionFormula),
    /// `R . S`
    Seq(Box<RegularFormula>, Box<RegularFormula>),
    /// `R + S`
    Alt(Box<RegularFormula>, Box<RegularFormula>),
    /// `R*`
    Star(Box<RegularFormula>),
    /// `R+`
    Plus(Box<RegularFormula>),
}

impl RegularFormula {
    /// The action formula, if this is one.
    pub fn as_action(&self) -> Option<&ActionFormula> {
        match self {
            RegularFormula::Action(a) => Some(a),
            _ => None,
        }
    }
}

impl From<ActionFormula> for RegularFormula {
    fn from(a: ActionFormula) -> Self {
        RegularFormula::Action(a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixpointSymbol {
    Mu,
    Nu,
}

impl fmt::Display for FixpointSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixpointSymbol::Mu => write!(f, "mu"),
            FixpointSymbol::Nu => write!(f, "nu"),
        }
    }
}

/// A fixpoint parameter with its initial value: `d: S = e`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Assignment {
    pub variable: Variable,
    pub value: DataExpr,
}

impl Assignment {
    pub fn new(variable: Variable, value: DataExpr) -> Self {
        Assignment { variable, value }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.variable.declaration(), self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateFormula {
    True,
    False,
    Data(DataExpr),
    Not(Box<StateFormula>),
    And(Box<StateFormula>, Box<StateFormula>),
    Or(Box<StateFormula>, Box<StateFormula>),
    Imp(Box<StateFormula>, Box<StateFormula>),
    Forall(Vec<Variable>, Box<StateFormula>),
    Exists(Vec<Variable>, Box<StateFormula>),
    /// `[R]φ`
    Must(RegularFormula, Box<StateFormula>),
    /// `<R>φ`
    May(RegularFormula, Box<StateFormula>),
    /// Instantiation `X(e1, ..., en)` of a propositional variable.
    Var(String, Vec<DataExpr>),
    /// `mu X(d: S = e, ...). φ` or `nu X(...). φ`
    Fixpoint(FixpointSymbol, String, Vec<Assignment>, Box<StateFormula>),
}

impl StateFormula {
    pub fn is_true(&self) -> bool {
        matches!(self, StateFormula::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, StateFormula::False)
    }

    /// Embeds a data expression; boolean constants become `true`/`false`.
    pub fn data(e: DataExpr) -> Self {
        match e {
            DataExpr::Bool(true) => StateFormula::True,
            DataExpr::Bool(false) => StateFormula::False,
            e => StateFormula::Data(e),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(x: StateFormula) -> Self {
        match x {
            StateFormula::True => StateFormula::False,
            StateFormula::False => StateFormula::True,
            StateFormula::Not(inner) => *inner,
            StateFormula::Data(e) => StateFormula::data(DataExpr::not(e)),
            x => StateFormula::Not(Box::new(x)),
        }
    }

    pub fn and(x: StateFormula, y: StateFormula) -> Self {
        match (x, y) {
            (StateFormula::False, _) | (_, StateFormula::False) => StateFormula::False,
            (StateFormula::True, z) | (z, StateFormula::True) => z,
            (x, y) if x == y => x,
            (x, y) => StateFormula::And(Box::new(x), Box::new(y)),
        }
    }

    pub fn or(x: StateFormula, y: StateFormula) -> Self {
        match (x, y) {
            (StateFormula::True, _) | (_, StateFormula::True) => StateFormula::True,
            (StateFormula::False, z) | (z, StateFormula::False) => z,
            (x, y) if x == y => x,
            (x, y) => StateFormula::Or(Box::new(x), Box::new(y)),
        }
    }

    pub fn imp(x: StateFormula, y: StateFormula) -> Self {
        match (x, y) {
            (StateFormula::False, _) | (_, StateFormula::True) => StateFormula::True,
            (StateFormula::True, z) => z,
            (z, StateFormula::False) => StateFormula::not(z),
            (x, y) if x == y => StateFormula::True,
            (x, y) => StateFormula::Imp(Box::new(x), Box::new(y)),
        }
    }

    /// Conjunction of all items; `true` when there are none.
    pub fn join_and(items: impl IntoIterator<Item = StateFormula>) -> Self {
        items.into_iter().fold(StateFormula::True, StateFormula::and)
    }

    /// Disjunction of all items; `false` when there are none.
    pub fn join_or(items: impl IntoIterator<Item = StateFormula>) -> Self {
        items.into_iter().fold(StateFormula::False, StateFormula::or)
    }

    pub fn forall(variables: Vec<Variable>, body: StateFormula) -> Self {
        match body {
            StateFormula::True | StateFormula::False => body,
            body if variables.is_empty() => body,
            body => StateFormula::Forall(variables, Box::new(body)),
        }
    }

    pub fn exists(variables: Vec<Variable>, body: StateFormula) -> Self {
        match body {
            StateFormula::True | StateFormula::False => body,
            body if variables.is_empty() => body,
            body => StateFormula::Exists(variables, Box::new(body)),
        }
    }

    pub fn must(r: impl Into<RegularFormula>, body: StateFormula) -> Self {
        StateFormula::Must(r.into(), Box::new(body))
    }

    pub fn may(r: impl Into<RegularFormula>, body: StateFormula) -> Self {
        StateFormula::May(r.into(), Box::new(body))
    }

    pub fn var(name: impl Into<String>, args: Vec<DataExpr>) -> Self {
        StateFormula::Var(name.into(), args)
    }

    pub fn mu(name: impl Into<String>, assignments: Vec<Assignment>, body: StateFormula) -> Self {
        StateFormula::Fixpoint(FixpointSymbol::Mu, name.into(), assignments, Box::new(body))
    }

    pub fn nu(name: impl Into<String>, assignments: Vec<Assignment>, body: StateFormula) -> Self {
        StateFormula::Fixpoint(FixpointSymbol::Nu, name.into(), assignments, Box::new(body))
    }
}

fn print_declarations(variables: &[Variable]) -> String {
    variables
        .iter()
        .map(|v| v.declaration())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ActionFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionFormula::True => write!(f, "true"),
            ActionFormula::False => write!(f, "false"),
            ActionFormula::Data(e) => write!(f, "val({})", e),
            ActionFormula::Not(x) => write!(f, "!{}", x),
            ActionFormula::And(x, y) => write!(f, "({} && {})", x, y),
            ActionFormula::Or(x, y) => write!(f, "({} || {})", x, y),
            ActionFormula::Imp(x, y) => write!(f, "({} => {})", x, y),
            ActionFormula::Forall(vs, x) => write!(f, "(forall {}. {})", print_declarations(vs), x),
            ActionFormula::Exists(vs, x) => write!(f, "(exists {}. {})", print_declarations(vs), x),
            ActionFormula::MultiAction(m) => write!(f, "{}", m),
        }
    }
}

impl fmt::Display for RegularFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegularFormula::Action(a) => write!(f, "{}", a),
            RegularFormula::Seq(x, y) => write!(f, "({} . {})", x, y),
            RegularFormula::Alt(x, y) => write!(f, "({} + {})", x, y),
            RegularFormula::Star(x) => write!(f, "{}*", x),
            RegularFormula::Plus(x) => write!(f, "{}+", x),
        }
    }
}

impl fmt::Display for StateFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateFormula::True => write!(f, "true"),
            StateFormula::False => write!(f, "false"),
            StateFormula::Data(e) => write!(f, "val({})", e),
            StateFormula::Not(x) => write!(f, "!{}", x),
            StateFormula::And(x, y) => write!(f, "({} && {})", x, y),
            StateFormula::Or(x, y) => write!(f, "({} || {})", x, y),
            StateFormula::Imp(x, y) => write!(f, "({} => {})", x, y),
            StateFormula::Forall(vs, x) => write!(f, "(forall {}. {})", print_declarations(vs), x),
            StateFormula::Exists(vs, x) => write!(f, "(exists {}. {})", print_declarations(vs), x),
            StateFormula::Must(r, x) => write!(f, "[{}]{}", r, x),
            StateFormula::May(r, x) => write!(f, "<{}>{}", r, x),
            StateFormula::Var(name, args) if args.is_empty() => write!(f, "{}", name),
            StateFormula::Var(name, args) => write!(f, "{}({})", name, print_list(args)),
            StateFormula::Fixpoint(symbol, name, assignments, body) if assignments.is_empty() => {
                write!(f, "({} {}. {})", symbol, name, body)
            }
            StateFormula::Fixpoint(symbol, name, assignments, body) => {
                write!(f, "({} {}({}). {})", symbol, name, print_list(assignments), body)
            }
        }
    }
}
