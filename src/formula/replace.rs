//! Substitution and traversals on formulas.
//!
//! Substitution is capture avoiding: a bound variable whose name occurs free
//! in the substituted expressions is renamed first. Quantifiers bind their
//! variables, fixpoints bind their parameters; the initial values of a
//! fixpoint belong to the enclosing scope.

use std::collections::BTreeSet;

use crate::action::MultiAction;
use crate::data::{DataExpr, Substitution, Variable};

use super::{ActionFormula, Assignment, RegularFormula, StateFormula};

/// Applies `sigma` to the free data variables of `x`.
pub fn replace_variables(x: &StateFormula, sigma: &Substitution) -> StateFormula {
    if sigma.is_empty() {
        return x.clone();
    }
    match x {
        StateFormula::True | StateFormula::False => x.clone(),
        StateFormula::Data(e) => StateFormula::data(e.substitute(sigma)),
        StateFormula::Not(a) => StateFormula::not(replace_variables(a, sigma)),
        StateFormula::And(a, b) => {
            StateFormula::and(replace_variables(a, sigma), replace_variables(b, sigma))
        }
        StateFormula::Or(a, b) => {
            StateFormula::or(replace_variables(a, sigma), replace_variables(b, sigma))
        }
        StateFormula::Imp(a, b) => {
            StateFormula::imp(replace_variables(a, sigma), replace_variables(b, sigma))
        }
        StateFormula::Forall(vs, body) => {
            let (vs, sigma) = bind(vs, sigma, || state_identifiers(body));
            StateFormula::forall(vs, replace_variables(body, &sigma))
        }
        StateFormula::Exists(vs, body) => {
            let (vs, sigma) = bind(vs, sigma, || state_identifiers(body));
            StateFormula::exists(vs, replace_variables(body, &sigma))
        }
        StateFormula::Must(r, body) => StateFormula::Must(
            replace_regular_variables(r, sigma),
            Box::new(replace_variables(body, sigma)),
        ),
        StateFormula::May(r, body) => StateFormula::May(
            replace_regular_variables(r, sigma),
            Box::new(replace_variables(body, sigma)),
        ),
        StateFormula::Var(name, args) => {
            StateFormula::Var(name.clone(), args.iter().map(|e| e.substitute(sigma)).collect())
        }
        StateFormula::Fixpoint(symbol, name, assignments, body) => {
            let params: Vec<Variable> = assignments.iter().map(|a| a.variable.clone()).collect();
            let (params, inner) = bind(&params, sigma, || state_identifiers(body));
            let assignments = params
                .into_iter()
                .zip(assignments)
                .map(|(v, a)| Assignment::new(v, a.value.substitute(sigma)))
                .collect();
            StateFormula::Fixpoint(
                *symbol,
                name.clone(),
                assignments,
                Box::new(replace_variables(body, &inner)),
            )
        }
    }
}

fn replace_regular_variables(r: &RegularFormula, sigma: &Substitution) -> RegularFormula {
    match r {
        RegularFormula::Action(a) => RegularFormula::Action(replace_action_variables(a, sigma)),
        RegularFormula::Seq(x, y) => RegularFormula::Seq(
            Box::new(replace_regular_variables(x, sigma)),
            Box::new(replace_regular_variables(y, sigma)),
        ),
        RegularFormula::Alt(x, y) => RegularFormula::Alt(
            Box::new(replace_regular_variables(x, sigma)),
            Box::new(replace_regular_variables(y, sigma)),
        ),
        RegularFormula::Star(x) => RegularFormula::Star(Box::new(replace_regular_variables(x, sigma))),
        RegularFormula::Plus(x) => RegularFormula::Plus(Box::new(replace_regular_variables(x, sigma))),
    }
}

/// Applies `sigma` to the free data variables of an action formula.
pub fn replace_action_variables(a: &ActionFormula, sigma: &Substitution) -> ActionFormula {
    if sigma.is_empty() {
        return a.clone();
    }
    match a {
        ActionFormula::True | ActionFormula::False => a.clone(),
        ActionFormula::Data(e) => ActionFormula::Data(e.substitute(sigma)),
        ActionFormula::Not(x) => ActionFormula::not(replace_action_variables(x, sigma)),
        ActionFormula::And(x, y) => ActionFormula::and(
            replace_action_variables(x, sigma),
            replace_action_variables(y, sigma),
        ),
        ActionFormula::Or(x, y) => ActionFormula::or(
            replace_action_variables(x, sigma),
            replace_action_variables(y, sigma),
        ),
        ActionFormula::Imp(x, y) => ActionFormula::imp(
            replace_action_variables(x, sigma),
            replace_action_variables(y, sigma),
        ),
        ActionFormula::Forall(vs, body) => {
            let (vs, sigma) = bind(vs, sigma, || action_identifiers(body));
            ActionFormula::forall(vs, replace_action_variables(body, &sigma))
        }
        ActionFormula::Exists(vs, body) => {
            let (vs, sigma) = bind(vs, sigma, || action_identifiers(body));
            ActionFormula::exists(vs, replace_action_variables(body, &sigma))
        }
        ActionFormula::MultiAction(m) => ActionFormula::MultiAction(m.substitute(sigma)),
    }
}

/// Prepares `sigma` for use under a binder of `bound`: bound variables are no
/// longer substituted, and those that would capture a variable of the
/// substituted expressions are renamed. Returns the new bound variables and
/// the substitution for the body.
fn bind(
    bound: &[Variable],
    sigma: &Substitution,
    body_identifiers: impl FnOnce() -> BTreeSet<String>,
) -> (Vec<Variable>, Substitution) {
    let mut inner: Substitution = sigma
        .iter()
        .filter(|(v, _)| !bound.contains(v))
        .map(|(v, e)| (v.clone(), e.clone()))
        .collect();
    if inner.is_empty() {
        return (bound.to_vec(), inner);
    }

    let mut range = BTreeSet::new();
    for e in inner.values() {
        e.free_variables(&mut range);
    }
    let captured: Vec<&Variable> = bound
        .iter()
        .filter(|b| range.iter().any(|v| v.name() == b.name()))
        .collect();
    if captured.is_empty() {
        return (bound.to_vec(), inner);
    }

    let mut avoid = body_identifiers();
    avoid.extend(range.iter().map(|v| v.name().to_string()));
    avoid.extend(inner.keys().map(|v| v.name().to_string()));
    avoid.extend(bound.iter().map(|v| v.name().to_string()));

    let mut renamed = Vec::with_capacity(bound.len());
    for b in bound {
        if captured.contains(&b) {
            let fresh = b.renamed(fresh_name(b.name(), &avoid));
            avoid.insert(fresh.name().to_string());
            inner.insert(b.clone(), DataExpr::var(&fresh));
            renamed.push(fresh);
        } else {
            renamed.push(b.clone());
        }
    }
    (renamed, inner)
}

fn fresh_name(hint: &str, avoid: &BTreeSet<String>) -> String {
    (1..)
        .map(|k| format!("{}{}", hint, k))
        .find(|name| !avoid.contains(name))
        .unwrap_or_else(|| hint.to_string())
}

/// The free data variables of `x`.
pub fn find_free_variables(x: &StateFormula) -> BTreeSet<Variable> {
    let mut out = BTreeSet::new();
    state_free_variables(x, &mut out);
    out
}

fn remove_bound(vs: &[Variable], inner: BTreeSet<Variable>, out: &mut BTreeSet<Variable>) {
    out.extend(inner.into_iter().filter(|v| !vs.contains(v)));
}

fn state_free_variables(x: &StateFormula, out: &mut BTreeSet<Variable>) {
    match x {
        StateFormula::True | StateFormula::False => {}
        StateFormula::Data(e) => e.free_variables(out),
        StateFormula::Not(a) => state_free_variables(a, out),
        StateFormula::And(a, b) | StateFormula::Or(a, b) | StateFormula::Imp(a, b) => {
            state_free_variables(a, out);
            state_free_variables(b, out);
        }
        StateFormula::Forall(vs, body) | StateFormula::Exists(vs, body) => {
            let mut inner = BTreeSet::new();
            state_free_variables(body, &mut inner);
            remove_bound(vs, inner, out);
        }
        StateFormula::Must(r, body) | StateFormula::May(r, body) => {
            regular_free_variables(r, out);
            state_free_variables(body, out);
        }
        StateFormula::Var(_, args) => {
            for e in args {
                e.free_variables(out);
            }
        }
        StateFormula::Fixpoint(_, _, assignments, body) => {
            for a in assignments {
                a.value.free_variables(out);
            }
            let params: Vec<Variable> = assignments.iter().map(|a| a.variable.clone()).collect();
            let mut inner = BTreeSet::new();
            state_free_variables(body, &mut inner);
            remove_bound(&params, inner, out);
        }
    }
}

fn regular_free_variables(r: &RegularFormula, out: &mut BTreeSet<Variable>) {
    match r {
        RegularFormula::Action(a) => action_free_variables(a, out),
        RegularFormula::Seq(x, y) | RegularFormula::Alt(x, y) => {
            regular_free_variables(x, out);
            regular_free_variables(y, out);
        }
        RegularFormula::Star(x) | RegularFormula::Plus(x) => regular_free_variables(x, out),
    }
}

fn action_free_variables(a: &ActionFormula, out: &mut BTreeSet<Variable>) {
    match a {
        ActionFormula::True | ActionFormula::False => {}
        ActionFormula::Data(e) => e.free_variables(out),
        ActionFormula::Not(x) => action_free_variables(x, out),
        ActionFormula::And(x, y) | ActionFormula::Or(x, y) | ActionFormula::Imp(x, y) => {
            action_free_variables(x, out);
            action_free_variables(y, out);
        }
        ActionFormula::Forall(vs, body) | ActionFormula::Exists(vs, body) => {
            let mut inner = BTreeSet::new();
            action_free_variables(body, &mut inner);
            remove_bound(vs, inner, out);
        }
        ActionFormula::MultiAction(m) => multi_action_free_variables(m, out),
    }
}

fn multi_action_free_variables(m: &MultiAction, out: &mut BTreeSet<Variable>) {
    for a in m.actions() {
        a.free_variables(out);
    }
}

/// All identifiers occurring in `x`: data variables (bound or free),
/// propositional variables, action names and constructor names.
pub fn find_identifiers(x: &StateFormula) -> BTreeSet<String> {
    state_identifiers(x)
}

fn state_identifiers(x: &StateFormula) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_state_identifiers(x, &mut out);
    out
}

fn action_identifiers(a: &ActionFormula) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_action_identifiers(a, &mut out);
    out
}

fn collect_state_identifiers(x: &StateFormula, out: &mut BTreeSet<String>) {
    match x {
        StateFormula::True | StateFormula::False => {}
        StateFormula::Data(e) => e.identifiers(out),
        StateFormula::Not(a) => collect_state_identifiers(a, out),
        StateFormula::And(a, b) | StateFormula::Or(a, b) | StateFormula::Imp(a, b) => {
            collect_state_identifiers(a, out);
            collect_state_identifiers(b, out);
        }
        StateFormula::Forall(vs, body) | StateFormula::Exists(vs, body) => {
            out.extend(vs.iter().map(|v| v.name().to_string()));
            collect_state_identifiers(body, out);
        }
        StateFormula::Must(r, body) | StateFormula::May(r, body) => {
            collect_regular_identifiers(r, out);
            collect_state_identifiers(body, out);
        }
        StateFormula::Var(name, args) => {
            out.insert(name.clone());
            for e in args {
                e.identifiers(out);
            }
        }
        StateFormula::Fixpoint(_, name, assignments, body) => {
            out.insert(name.clone());
            for a in assignments {
                out.insert(a.variable.name().to_string());
                a.value.identifiers(out);
            }
            collect_state_identifiers(body, out);
        }
    }
}

fn collect_regular_identifiers(r: &RegularFormula, out: &mut BTreeSet<String>) {
    match r {
        RegularFormula::Action(a) => collect_action_identifiers(a, out),
        RegularFormula::Seq(x, y) | RegularFormula::Alt(x, y) => {
            collect_regular_identifiers(x, out);
            collect_regular_identifiers(y, out);
        }
        RegularFormula::Star(x) | RegularFormula::Plus(x) => collect_regular_identifiers(x, out),
    }
}

fn collect_action_identifiers(a: &ActionFormula, out: &mut BTreeSet<String>) {
    match a {
        ActionFormula::True | ActionFormula::False => {}
        ActionFormula::Data(e) => e.identifiers(out),
        ActionFormula::Not(x) => collect_action_identifiers(x, out),
        ActionFormula::And(x, y) | ActionFormula::Or(x, y) | ActionFormula::Imp(x, y) => {
            collect_action_identifiers(x, out);
            collect_action_identifiers(y, out);
        }
        ActionFormula::Forall(vs, body) | ActionFormula::Exists(vs, body) => {
            out.extend(vs.iter().map(|v| v.name().to_string()));
            collect_action_identifiers(body, out);
        }
        ActionFormula::MultiAction(m) => {
            for action in m.actions() {
                out.insert(action.name().to_string());
                for e in action.args() {
                    e.identifiers(out);
                }
            }
        }
    }
}

/// Names of all fixpoint binders in `x`, outermost first, with repetitions.
pub fn find_fixpoint_names(x: &StateFormula) -> Vec<String> {
    let mut out = Vec::new();
    collect_fixpoint_names(x, &mut out);
    out
}

fn collect_fixpoint_names(x: &StateFormula, out: &mut Vec<String>) {
    match x {
        StateFormula::True | StateFormula::False | StateFormula::Data(_) | StateFormula::Var(..) => {}
        StateFormula::Not(a)
        | StateFormula::Forall(_, a)
        | StateFormula::Exists(_, a)
        | StateFormula::Must(_, a)
        | StateFormula::May(_, a) => collect_fixpoint_names(a, out),
        StateFormula::And(a, b) | StateFormula::Or(a, b) | StateFormula::Imp(a, b) => {
            collect_fixpoint_names(a, out);
            collect_fixpoint_names(b, out);
        }
        StateFormula::Fixpoint(_, name, _, body) => {
            out.push(name.clone());
            collect_fixpoint_names(body, out);
        }
    }
}
