use crate::action::Action;
use crate::data::{DataExpr, Substitution, Variable};
use crate::error::Result;
use crate::formula::{replace_action_variables, ActionFormula, StateFormula};
use crate::ident::IdentifierGenerator;

/// Translates "`action` satisfies `alpha`" into a state formula.
///
/// A multi-action formula holds when the labels coincide and the arguments
/// are pairwise equal. Quantified variables of `alpha` are renamed to fresh
/// names taken from `ids`, so they cannot capture the arguments of `action`.
pub fn admits(action: &Action, alpha: &ActionFormula, ids: &mut IdentifierGenerator) -> Result<StateFormula> {
    Ok(match alpha {
        ActionFormula::True => StateFormula::True,
        ActionFormula::False => StateFormula::False,
        ActionFormula::Data(e) => StateFormula::data(e.clone()),
        ActionFormula::Not(x) => StateFormula::not(admits(action, x, ids)?),
        ActionFormula::And(x, y) => StateFormula::and(admits(action, x, ids)?, admits(action, y, ids)?),
        ActionFormula::Or(x, y) => StateFormula::or(admits(action, x, ids)?, admits(action, y, ids)?),
        ActionFormula::Imp(x, y) => StateFormula::imp(admits(action, x, ids)?, admits(action, y, ids)?),
        ActionFormula::Forall(vs, body) => {
            let (fresh, body) = rename_bound(vs, body, ids);
            StateFormula::forall(fresh, admits(action, &body, ids)?)
        }
        ActionFormula::Exists(vs, body) => {
            let (fresh, body) = rename_bound(vs, body, ids);
            StateFormula::exists(fresh, admits(action, &body, ids)?)
        }
        ActionFormula::MultiAction(m) => match m.as_single()? {
            None => {
                if action.label().is_tau() {
                    StateFormula::True
                } else {
                    StateFormula::False
                }
            }
            Some(b) if b.label() == action.label() => StateFormula::data(DataExpr::and_all(
                action
                    .args()
                    .iter()
                    .zip(b.args())
                    .map(|(x, y)| DataExpr::equal(x.clone(), y.clone())),
            )),
            Some(_) => StateFormula::False,
        },
    })
}

fn rename_bound(
    variables: &[Variable],
    body: &ActionFormula,
    ids: &mut IdentifierGenerator,
) -> (Vec<Variable>, ActionFormula) {
    let fresh: Vec<Variable> = variables
        .iter()
        .map(|v| v.renamed(ids.fresh(v.name())))
        .collect();
    let sigma: Substitution = variables
        .iter()
        .cloned()
        .zip(fresh.iter().map(DataExpr::var))
        .collect();
    let body = replace_action_variables(body, &sigma);
    (fresh, body)
}
