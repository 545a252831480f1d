use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use log::{debug, info};

use crate::action::{Action, Label};
use crate::cache::RewriteCache;
use crate::data::{make_substitution, DataExpr, Substitution, Variable};
use crate::error::{Error, Result};
use crate::formula::{
    find_fixpoint_names, find_identifiers, ActionFormula, Assignment, Equation, ModalEquationSystem, RegularFormula,
    StateFormula,
};
use crate::ident::IdentifierGenerator;
use crate::labels::LabelGenerator;
use crate::lps::{Lps, Summand};
use crate::network::Network;
use crate::vector::{Entry, SyncVector, Tag};

use super::admits::admits;
use super::{check_index, quotient_vector, QuotientOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modality {
    Must,
    May,
}

impl Modality {
    fn quantify(self, variables: Vec<Variable>, body: StateFormula) -> StateFormula {
        match self {
            Modality::Must => StateFormula::forall(variables, body),
            Modality::May => StateFormula::exists(variables, body),
        }
    }

    fn combine(self, left: StateFormula, right: StateFormula) -> StateFormula {
        match self {
            Modality::Must => StateFormula::imp(left, right),
            Modality::May => StateFormula::and(left, right),
        }
    }

    fn modal(self, action: Action, body: StateFormula) -> StateFormula {
        let alpha = ActionFormula::action(action);
        match self {
            Modality::Must => StateFormula::must(alpha, body),
            Modality::May => StateFormula::may(alpha, body),
        }
    }

    fn join(self, parts: BTreeSet<StateFormula>) -> StateFormula {
        match self {
            Modality::Must => StateFormula::join_and(parts),
            Modality::May => StateFormula::join_or(parts),
        }
    }

    /// The absorbing element of [`Modality::join`].
    fn zero(self) -> StateFormula {
        match self {
            Modality::Must => StateFormula::False,
            Modality::May => StateFormula::True,
        }
    }
}

/// Per-run state of one quotient: component `index` of a network is removed
/// and its behaviour is folded into formulas.
///
/// The builder owns its identifier and label generators, the rewrite cache
/// and the stack of enclosing fixpoints. Labels handed out for the vector
/// quotient and the formula quotient come from the same memoized generator,
/// so the residual actions in the new formula are exactly the fresh labels
/// of the new network.
pub struct QuotientBuilder<'a> {
    lps: &'a Lps,
    vector: &'a SyncVector,
    index: usize,
    options: QuotientOptions,
    ids: IdentifierGenerator,
    labels: LabelGenerator,
    cache: RewriteCache,
    fixpoints: Vec<String>,
    /// Tracking parameters per fixpoint variable, parallel to the process
    /// parameters.
    generated: HashMap<String, Vec<Variable>>,
    /// Entry positions per result label name.
    vector_map: BTreeMap<String, Vec<usize>>,
    equation_mode: bool,
}

impl<'a> QuotientBuilder<'a> {
    pub fn new(network: &'a Network, index: usize, lps: &'a Lps, options: QuotientOptions) -> Result<Self> {
        let vector = network.vector();
        check_index(vector.length(), index)?;
        debug!(
            "quotient builder: component {} of {}, use rewrite cache: {}, use vector map: {}",
            index,
            vector.length(),
            options.use_rewrite_cache,
            options.use_vector_map
        );

        let mut ids = IdentifierGenerator::new();
        let mut labels = LabelGenerator::new();
        let lps_ids = lps.identifiers();
        ids.add_identifiers(lps_ids.iter().cloned());
        labels.add_identifiers(lps_ids);
        for l in network.labels() {
            ids.add_identifier(l.name());
            labels.add_identifier(l.name());
        }

        let mut vector_map: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        if options.use_vector_map {
            for (k, e) in vector.entries().iter().enumerate() {
                vector_map.entry(e.label().name().to_string()).or_default().push(k);
            }
        }

        Ok(QuotientBuilder {
            lps,
            vector,
            index,
            cache: RewriteCache::new(options.use_rewrite_cache),
            options,
            ids,
            labels,
            fixpoints: Vec::new(),
            generated: HashMap::new(),
            vector_map,
            equation_mode: false,
        })
    }

    pub fn options(&self) -> &QuotientOptions {
        &self.options
    }

    pub fn cache(&self) -> &RewriteCache {
        &self.cache
    }

    pub fn label_generator(&self) -> &LabelGenerator {
        &self.labels
    }

    /// Marks the identifiers of `x` as used.
    pub fn add_identifiers(&mut self, x: &StateFormula) {
        let found = find_identifiers(x);
        self.ids.add_identifiers(found.iter().cloned());
        self.labels.add_identifiers(found);
    }

    pub fn add_system_identifiers(&mut self, system: &ModalEquationSystem) {
        let found = system.identifiers();
        self.ids.add_identifiers(found.iter().cloned());
        self.labels.add_identifiers(found);
    }

    /// The network without component `index`.
    pub fn quotient_network(&mut self, network: &Network) -> Result<Network> {
        let vector = quotient_vector(network.vector(), self.index, &mut self.labels)?;
        let mut components = network.components().to_vec();
        components.remove(self.index);
        let mut result = Network::new(components, vector)?;
        result.add_labels(network.extra_labels().iter().cloned());
        result.add_labels(self.labels.generated().iter().cloned());
        Ok(result)
    }

    /// Quotients a formula. Fixpoint names must be unique, since every
    /// binder gets its own tracking parameters.
    pub fn quotient_formula(&mut self, x: &StateFormula) -> Result<StateFormula> {
        let mut seen = HashSet::new();
        if let Some(name) = find_fixpoint_names(x).into_iter().find(|n| !seen.insert(n.clone())) {
            return Err(Error::duplicate(format!("fixpoint variable '{}' is bound more than once", name)));
        }
        let result = self.apply(x)?;
        self.cache.log_report();
        Ok(result)
    }

    /// Quotients every equation of `system`. Every equation gets one extra
    /// parameter per process parameter, and the initial instance is extended
    /// with the initial state of the process.
    pub fn quotient_equation_system(&mut self, system: &ModalEquationSystem) -> Result<ModalEquationSystem> {
        self.equation_mode = true;
        let result = self.quotient_equations(system);
        self.equation_mode = false;
        self.cache.log_report();
        result
    }

    fn quotient_equations(&mut self, system: &ModalEquationSystem) -> Result<ModalEquationSystem> {
        let lps = self.lps;
        let parameters = lps.parameters();
        let mut equations = Vec::with_capacity(system.equations().len());
        for eq in system.equations() {
            debug!("quotienting equation {}", eq.name);
            let fresh = self.tracking_parameters(&eq.name);
            let body = self.apply(&eq.body)?;
            let sigma = make_substitution(parameters, fresh.iter().map(DataExpr::var));
            let body = self.cache.replace(&body, &sigma);
            let mut params = eq.parameters.clone();
            params.extend(fresh);
            equations.push(Equation::new(eq.symbol, eq.name.clone(), params, body));
        }
        let mut args = system.initial_args().to_vec();
        args.extend(lps.initial_values().iter().cloned());
        ModalEquationSystem::new(equations, system.initial(), args)
    }

    /// One fresh variable `d_X` per process parameter `d`.
    fn tracking_parameters(&mut self, name: &str) -> Vec<Variable> {
        let lps = self.lps;
        lps.parameters()
            .iter()
            .map(|d| d.renamed(self.ids.fresh(&format!("{}_{}", d.name(), name))))
            .collect()
    }

    fn apply(&mut self, x: &StateFormula) -> Result<StateFormula> {
        Ok(match x {
            StateFormula::True | StateFormula::False | StateFormula::Data(_) => x.clone(),
            StateFormula::Not(a) => StateFormula::not(self.apply(a)?),
            StateFormula::And(a, b) => StateFormula::and(self.apply(a)?, self.apply(b)?),
            StateFormula::Or(a, b) => StateFormula::or(self.apply(a)?, self.apply(b)?),
            StateFormula::Imp(a, b) => StateFormula::imp(self.apply(a)?, self.apply(b)?),
            StateFormula::Forall(vs, body) => StateFormula::forall(vs.clone(), self.apply(body)?),
            StateFormula::Exists(vs, body) => StateFormula::exists(vs.clone(), self.apply(body)?),
            StateFormula::Must(r, body) => self.modality(Modality::Must, r, body)?,
            StateFormula::May(r, body) => self.modality(Modality::May, r, body)?,
            StateFormula::Var(name, args) => {
                let mut args = args.clone();
                args.extend(self.lps.parameters().iter().map(DataExpr::var));
                StateFormula::Var(name.clone(), args)
            }
            StateFormula::Fixpoint(symbol, name, assignments, body) => {
                if self.equation_mode {
                    return Err(Error::unsupported(format!(
                        "fixpoint '{}' inside an equation system",
                        name
                    )));
                }
                let tracking = self.tracking_parameters(name);
                let mut assignments = assignments.clone();
                for (k, t) in tracking.iter().enumerate() {
                    let value = match self.fixpoints.last() {
                        None => self.lps.initial_values()[k].clone(),
                        Some(parent) => DataExpr::var(&self.generated[parent][k]),
                    };
                    assignments.push(Assignment::new(t.clone(), value));
                }
                debug!("fixpoint {} tracks {:?}", name, tracking);

                self.generated.insert(name.clone(), tracking.clone());
                self.fixpoints.push(name.clone());
                let body = self.apply(body);
                self.fixpoints.pop();
                let body = body?;

                let sigma = make_substitution(self.lps.parameters(), tracking.iter().map(DataExpr::var));
                let body = self.cache.replace(&body, &sigma);
                StateFormula::Fixpoint(*symbol, name.clone(), assignments, Box::new(body))
            }
        })
    }

    /// Entry positions to consider for `alpha`.
    fn candidate_entries(&self, alpha: &ActionFormula) -> Result<Vec<usize>> {
        if self.options.use_vector_map {
            if let ActionFormula::MultiAction(m) = alpha {
                if let Some(a) = m.as_single()? {
                    return Ok(self.vector_map.get(a.name()).cloned().unwrap_or_default());
                }
            }
        }
        Ok((0..self.vector.len()).collect())
    }

    /// The updates of `summand`, plus the updates of the tracking parameters
    /// of the innermost fixpoint.
    fn update_substitution(&self, summand: &Summand) -> Substitution {
        let mut sigma: Substitution = summand.assignments().iter().cloned().collect();
        if self.equation_mode {
            return sigma;
        }
        if let Some(tracking) = self.fixpoints.last().and_then(|x| self.generated.get(x)) {
            for (d, t) in self.lps.parameters().iter().zip(tracking) {
                if let Some((_, g)) = summand.assignments().iter().find(|(v, _)| v == d) {
                    sigma.insert(t.clone(), g.clone());
                }
            }
        }
        sigma
    }

    fn modality(&mut self, kind: Modality, r: &RegularFormula, operand: &StateFormula) -> Result<StateFormula> {
        let Some(alpha) = r.as_action() else {
            return Err(Error::unsupported(format!(
                "modality over regular formula '{}'",
                r
            )));
        };
        debug!("modality {:?} over {}", kind, alpha);
        let phi = self.apply(operand)?;
        debug!("operand quotient: {}", phi);

        let mut parts = BTreeSet::new();
        let mut inactive_seen: HashSet<Label> = HashSet::new();
        let mut active_seen: HashSet<(StateFormula, Vec<Variable>)> = HashSet::new();

        let vector = self.vector;
        let lps = self.lps;
        for k in self.candidate_entries(alpha)? {
            let entry = &vector.entries()[k];
            match entry.tag(self.index) {
                Tag::Inactive => {
                    if !inactive_seen.insert(entry.label().clone()) {
                        continue;
                    }
                    let part = self.inactive_part(kind, entry.label(), alpha, &phi)?;
                    if part == kind.zero() {
                        return Ok(part);
                    }
                    parts.insert(part);
                }
                Tag::Action(name) => {
                    for summand in lps.summands() {
                        let Some(part) =
                            self.active_part(kind, entry, name, summand, alpha, &phi, &mut active_seen)?
                        else {
                            continue;
                        };
                        if part == kind.zero() {
                            return Ok(part);
                        }
                        parts.insert(part);
                    }
                }
            }
        }
        Ok(kind.join(parts))
    }

    /// Component `index` stays put while the others perform `label`.
    fn inactive_part(
        &mut self,
        kind: Modality,
        label: &Label,
        alpha: &ActionFormula,
        phi: &StateFormula,
    ) -> Result<StateFormula> {
        let vars: Vec<Variable> = label
            .sorts()
            .iter()
            .map(|s| Variable::new(self.ids.fresh("d"), s.clone()))
            .collect();
        let action = label.apply(vars.iter().map(DataExpr::var).collect());
        let left = admits(&action, alpha, &mut self.ids)?;
        let right = kind.modal(action, phi.clone());
        Ok(kind.quantify(vars, kind.combine(left, right)))
    }

    /// Component `index` takes part in `entry` through `summand`, alone or
    /// together with other components. Returns `None` if the summand does not
    /// match the tag, or yields a body that was produced before.
    #[allow(clippy::too_many_arguments)]
    fn active_part(
        &mut self,
        kind: Modality,
        entry: &Entry,
        tag: &str,
        summand: &Summand,
        alpha: &ActionFormula,
        phi: &StateFormula,
        seen: &mut HashSet<(StateFormula, Vec<Variable>)>,
    ) -> Result<Option<StateFormula>> {
        let local = summand.action().as_action()?;
        if local.name() != tag || local.label().sorts() != entry.label().sorts() {
            return Ok(None);
        }

        let sigma = self.update_substitution(summand);
        let next = self.cache.replace(phi, &sigma);
        let args = local.args().to_vec();
        let guard = StateFormula::and(
            admits(&entry.label().apply(args.clone()), alpha, &mut self.ids)?,
            StateFormula::data(summand.condition().clone()),
        );
        let body = if entry.others_active(self.index) {
            let rho = self.labels.fresh_label(entry.tags(), entry.label());
            kind.combine(guard, kind.modal(rho.apply(args), next))
        } else {
            kind.combine(guard, next)
        };

        if !seen.insert((body.clone(), summand.variables().to_vec())) {
            return Ok(None);
        }

        let renamed: Vec<Variable> = summand
            .variables()
            .iter()
            .map(|v| v.renamed(self.ids.fresh(v.name())))
            .collect();
        let rename = make_substitution(summand.variables(), renamed.iter().map(DataExpr::var));
        let body = self.cache.replace(&body, &rename);
        Ok(Some(kind.quantify(renamed, body)))
    }

    /// Logs the cache counters at the end of a run.
    pub fn report(&self) {
        if self.options.use_rewrite_cache {
            info!("{}", self.cache.report());
        }
    }
}
