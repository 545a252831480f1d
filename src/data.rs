//! Data language: sorts, typed variables and data expressions.
//!
//! Data expressions are plain immutable trees with structural equality and
//! hashing. Closed normal forms ([`DataExpr::Bool`], [`DataExpr::Int`] and
//! [`DataExpr::Cons`]) are the values stored in process states.
//!
//! The smart constructors ([`DataExpr::and`], [`DataExpr::equal`], ...) fold
//! constants eagerly, so substituting values into an expression yields the
//! simplest equivalent expression the folding rules can reach.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;
use num_bigint::BigInt;

use crate::error::{Error, Result};

/// A sort (type) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sort(String);

impl Sort {
    pub fn new(name: impl Into<String>) -> Self {
        Sort(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn bool() -> Self {
        Sort::new("Bool")
    }
    pub fn nat() -> Self {
        Sort::new("Nat")
    }
    pub fn pos() -> Self {
        Sort::new("Pos")
    }
    pub fn int() -> Self {
        Sort::new("Int")
    }

    pub fn is_bool(&self) -> bool {
        self.0 == "Bool"
    }

    /// Checks whether values of this sort are represented by [`DataExpr::Int`].
    pub fn is_numeric(&self) -> bool {
        matches!(self.0.as_str(), "Nat" | "Pos" | "Int")
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Sort {
    fn from(s: &str) -> Self {
        Sort::new(s)
    }
}

/// A typed data variable. Equality is name plus sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    name: String,
    sort: Sort,
}

impl Variable {
    pub fn new(name: impl Into<String>, sort: impl Into<Sort>) -> Self {
        Variable {
            name: name.into(),
            sort: sort.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Same variable under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Variable::new(name, self.sort.clone())
    }

    /// Declaration syntax `name: Sort`.
    pub fn declaration(&self) -> String {
        format!("{}: {}", self.name, self.sort)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A mapping from variables to expressions. Ordered, so it can be used as a
/// cache key.
pub type Substitution = BTreeMap<Variable, DataExpr>;

/// Builds a substitution from parallel lists of variables and expressions.
pub fn make_substitution<'a>(
    variables: impl IntoIterator<Item = &'a Variable>,
    expressions: impl IntoIterator<Item = DataExpr>,
) -> Substitution {
    variables.into_iter().cloned().zip(expressions).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataExpr {
    Var(Variable),
    Bool(bool),
    Int(BigInt),
    /// Constructor constant of a struct sort.
    Cons(String, Sort),
    Not(Box<DataExpr>),
    And(Box<DataExpr>, Box<DataExpr>),
    Or(Box<DataExpr>, Box<DataExpr>),
    Imp(Box<DataExpr>, Box<DataExpr>),
    Eq(Box<DataExpr>, Box<DataExpr>),
    Neq(Box<DataExpr>, Box<DataExpr>),
    Lt(Box<DataExpr>, Box<DataExpr>),
    Le(Box<DataExpr>, Box<DataExpr>),
    Add(Box<DataExpr>, Box<DataExpr>),
    Sub(Box<DataExpr>, Box<DataExpr>),
    If(Box<DataExpr>, Box<DataExpr>, Box<DataExpr>),
}

impl DataExpr {
    pub fn var(v: &Variable) -> Self {
        DataExpr::Var(v.clone())
    }

    pub fn bool(b: bool) -> Self {
        DataExpr::Bool(b)
    }

    pub fn true_() -> Self {
        DataExpr::Bool(true)
    }

    pub fn false_() -> Self {
        DataExpr::Bool(false)
    }

    pub fn int(value: impl Into<BigInt>) -> Self {
        DataExpr::Int(value.into())
    }

    pub fn cons(name: impl Into<String>, sort: impl Into<Sort>) -> Self {
        DataExpr::Cons(name.into(), sort.into())
    }

    pub fn is_true(&self) -> bool {
        matches!(self, DataExpr::Bool(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, DataExpr::Bool(false))
    }

    /// Checks whether this expression is a closed normal form.
    pub fn is_value(&self) -> bool {
        matches!(self, DataExpr::Bool(_) | DataExpr::Int(_) | DataExpr::Cons(..))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(x: DataExpr) -> Self {
        match x {
            DataExpr::Bool(b) => DataExpr::Bool(!b),
            DataExpr::Not(inner) => *inner,
            other => DataExpr::Not(Box::new(other)),
        }
    }

    pub fn and(x: DataExpr, y: DataExpr) -> Self {
        match (x, y) {
            (DataExpr::Bool(false), _) | (_, DataExpr::Bool(false)) => DataExpr::false_(),
            (DataExpr::Bool(true), e) | (e, DataExpr::Bool(true)) => e,
            (a, b) if a == b => a,
            (a, b) => DataExpr::And(Box::new(a), Box::new(b)),
        }
    }

    pub fn or(x: DataExpr, y: DataExpr) -> Self {
        match (x, y) {
            (DataExpr::Bool(true), _) | (_, DataExpr::Bool(true)) => DataExpr::true_(),
            (DataExpr::Bool(false), e) | (e, DataExpr::Bool(false)) => e,
            (a, b) if a == b => a,
            (a, b) => DataExpr::Or(Box::new(a), Box::new(b)),
        }
    }

    pub fn imp(x: DataExpr, y: DataExpr) -> Self {
        match (x, y) {
            (DataExpr::Bool(false), _) | (_, DataExpr::Bool(true)) => DataExpr::true_(),
            (DataExpr::Bool(true), e) => e,
            (e, DataExpr::Bool(false)) => DataExpr::not(e),
            (a, b) => DataExpr::Imp(Box::new(a), Box::new(b)),
        }
    }

    pub fn and_all(items: impl IntoIterator<Item = DataExpr>) -> Self {
        items.into_iter().fold(DataExpr::true_(), DataExpr::and)
    }

    pub fn equal(x: DataExpr, y: DataExpr) -> Self {
        if x == y {
            return DataExpr::true_();
        }
        if x.is_value() && y.is_value() {
            return DataExpr::false_();
        }
        DataExpr::Eq(Box::new(x), Box::new(y))
    }

    pub fn not_equal(x: DataExpr, y: DataExpr) -> Self {
        if x == y {
            return DataExpr::false_();
        }
        if x.is_value() && y.is_value() {
            return DataExpr::true_();
        }
        DataExpr::Neq(Box::new(x), Box::new(y))
    }

    pub fn lt(x: DataExpr, y: DataExpr) -> Self {
        match (&x, &y) {
            (DataExpr::Int(a), DataExpr::Int(b)) => DataExpr::Bool(a < b),
            _ => DataExpr::Lt(Box::new(x), Box::new(y)),
        }
    }

    pub fn le(x: DataExpr, y: DataExpr) -> Self {
        match (&x, &y) {
            (DataExpr::Int(a), DataExpr::Int(b)) => DataExpr::Bool(a <= b),
            _ => DataExpr::Le(Box::new(x), Box::new(y)),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(x: DataExpr, y: DataExpr) -> Self {
        match (&x, &y) {
            (DataExpr::Int(a), DataExpr::Int(b)) => DataExpr::Int(a + b),
            _ => DataExpr::Add(Box::new(x), Box::new(y)),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn sub(x: DataExpr, y: DataExpr) -> Self {
        match (&x, &y) {
            (DataExpr::Int(a), DataExpr::Int(b)) => DataExpr::Int(a - b),
            _ => DataExpr::Sub(Box::new(x), Box::new(y)),
        }
    }

    pub fn ite(c: DataExpr, t: DataExpr, e: DataExpr) -> Self {
        match c {
            DataExpr::Bool(true) => t,
            DataExpr::Bool(false) => e,
            _ if t == e => t,
            c => DataExpr::If(Box::new(c), Box::new(t), Box::new(e)),
        }
    }

    /// Best-effort sort of the expression; `None` for unknown constructs.
    pub fn sort(&self) -> Option<Sort> {
        match self {
            DataExpr::Var(v) => Some(v.sort().clone()),
            DataExpr::Bool(_)
            | DataExpr::Not(_)
            | DataExpr::And(..)
            | DataExpr::Or(..)
            | DataExpr::Imp(..)
            | DataExpr::Eq(..)
            | DataExpr::Neq(..)
            | DataExpr::Lt(..)
            | DataExpr::Le(..) => Some(Sort::bool()),
            DataExpr::Int(_) | DataExpr::Add(..) | DataExpr::Sub(..) => Some(Sort::int()),
            DataExpr::Cons(_, sort) => Some(sort.clone()),
            DataExpr::If(_, t, e) => t.sort().or_else(|| e.sort()),
        }
    }

    /// Collects the variables occurring in the expression.
    pub fn free_variables(&self, out: &mut BTreeSet<Variable>) {
        match self {
            DataExpr::Var(v) => {
                out.insert(v.clone());
            }
            DataExpr::Bool(_) | DataExpr::Int(_) | DataExpr::Cons(..) => {}
            DataExpr::Not(a) => a.free_variables(out),
            DataExpr::And(a, b)
            | DataExpr::Or(a, b)
            | DataExpr::Imp(a, b)
            | DataExpr::Eq(a, b)
            | DataExpr::Neq(a, b)
            | DataExpr::Lt(a, b)
            | DataExpr::Le(a, b)
            | DataExpr::Add(a, b)
            | DataExpr::Sub(a, b) => {
                a.free_variables(out);
                b.free_variables(out);
            }
            DataExpr::If(c, t, e) => {
                c.free_variables(out);
                t.free_variables(out);
                e.free_variables(out);
            }
        }
    }

    /// Collects variable and constructor names.
    pub fn identifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            DataExpr::Var(v) => {
                out.insert(v.name().to_string());
            }
            DataExpr::Cons(name, _) => {
                out.insert(name.clone());
            }
            DataExpr::Bool(_) | DataExpr::Int(_) => {}
            DataExpr::Not(a) => a.identifiers(out),
            DataExpr::And(a, b)
            | DataExpr::Or(a, b)
            | DataExpr::Imp(a, b)
            | DataExpr::Eq(a, b)
            | DataExpr::Neq(a, b)
            | DataExpr::Lt(a, b)
            | DataExpr::Le(a, b)
            | DataExpr::Add(a, b)
            | DataExpr::Sub(a, b) => {
                a.identifiers(out);
                b.identifiers(out);
            }
            DataExpr::If(c, t, e) => {
                c.identifiers(out);
                t.identifiers(out);
                e.identifiers(out);
            }
        }
    }

    /// Applies `sigma` to every variable occurrence. Data expressions have no
    /// binders, so no renaming is needed here.
    pub fn substitute(&self, sigma: &Substitution) -> DataExpr {
        if sigma.is_empty() {
            return self.clone();
        }
        self.map_vars(&mut |v| sigma.get(v).cloned())
    }

    fn map_vars(&self, f: &mut impl FnMut(&Variable) -> Option<DataExpr>) -> DataExpr {
        match self {
            DataExpr::Var(v) => f(v).unwrap_or_else(|| self.clone()),
            DataExpr::Bool(_) | DataExpr::Int(_) | DataExpr::Cons(..) => self.clone(),
            DataExpr::Not(a) => DataExpr::not(a.map_vars(f)),
            DataExpr::And(a, b) => DataExpr::and(a.map_vars(f), b.map_vars(f)),
            DataExpr::Or(a, b) => DataExpr::or(a.map_vars(f), b.map_vars(f)),
            DataExpr::Imp(a, b) => DataExpr::imp(a.map_vars(f), b.map_vars(f)),
            DataExpr::Eq(a, b) => DataExpr::equal(a.map_vars(f), b.map_vars(f)),
            DataExpr::Neq(a, b) => DataExpr::not_equal(a.map_vars(f), b.map_vars(f)),
            DataExpr::Lt(a, b) => DataExpr::lt(a.map_vars(f), b.map_vars(f)),
            DataExpr::Le(a, b) => DataExpr::le(a.map_vars(f), b.map_vars(f)),
            DataExpr::Add(a, b) => DataExpr::add(a.map_vars(f), b.map_vars(f)),
            DataExpr::Sub(a, b) => DataExpr::sub(a.map_vars(f), b.map_vars(f)),
            DataExpr::If(c, t, e) => DataExpr::ite(c.map_vars(f), t.map_vars(f), e.map_vars(f)),
        }
    }

    /// Evaluates the expression to a closed normal form under `env`.
    pub fn eval(&self, env: &Substitution) -> Result<DataExpr> {
        match self {
            DataExpr::Var(v) => match env.get(v) {
                Some(value) if value.is_value() => Ok(value.clone()),
                // Bindings are closed terms; they never see `env`.
                Some(value) => value.eval(&Substitution::new()),
                None => Err(Error::Evaluation(format!("unbound variable '{}'", v.declaration()))),
            },
            DataExpr::Bool(_) | DataExpr::Int(_) | DataExpr::Cons(..) => Ok(self.clone()),
            DataExpr::Not(a) => Ok(DataExpr::Bool(!a.eval_bool(env)?)),
            DataExpr::And(a, b) => Ok(DataExpr::Bool(a.eval_bool(env)? && b.eval_bool(env)?)),
            DataExpr::Or(a, b) => Ok(DataExpr::Bool(a.eval_bool(env)? || b.eval_bool(env)?)),
            DataExpr::Imp(a, b) => Ok(DataExpr::Bool(!a.eval_bool(env)? || b.eval_bool(env)?)),
            DataExpr::Eq(a, b) => Ok(DataExpr::Bool(a.eval(env)? == b.eval(env)?)),
            DataExpr::Neq(a, b) => Ok(DataExpr::Bool(a.eval(env)? != b.eval(env)?)),
            DataExpr::Lt(a, b) => Ok(DataExpr::Bool(a.eval_int(env)? < b.eval_int(env)?)),
            DataExpr::Le(a, b) => Ok(DataExpr::Bool(a.eval_int(env)? <= b.eval_int(env)?)),
            DataExpr::Add(a, b) => Ok(DataExpr::Int(a.eval_int(env)? + b.eval_int(env)?)),
            DataExpr::Sub(a, b) => Ok(DataExpr::Int(a.eval_int(env)? - b.eval_int(env)?)),
            DataExpr::If(c, t, e) => {
                if c.eval_bool(env)? {
                    t.eval(env)
                } else {
                    e.eval(env)
                }
            }
        }
    }

    pub fn eval_bool(&self, env: &Substitution) -> Result<bool> {
        match self.eval(env)? {
            DataExpr::Bool(b) => Ok(b),
            other => Err(Error::Evaluation(format!(
                "expected a boolean, '{}' evaluated to '{}'",
                self, other
            ))),
        }
    }

    pub fn eval_int(&self, env: &Substitution) -> Result<BigInt> {
        match self.eval(env)? {
            DataExpr::Int(n) => Ok(n),
            other => Err(Error::Evaluation(format!(
                "expected a number, '{}' evaluated to '{}'",
                self, other
            ))),
        }
    }
}

impl fmt::Display for DataExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataExpr::Var(v) => write!(f, "{}", v),
            DataExpr::Bool(b) => write!(f, "{}", b),
            DataExpr::Int(n) => write!(f, "{}", n),
            DataExpr::Cons(name, _) => write!(f, "{}", name),
            DataExpr::Not(a) => write!(f, "!{}", a),
            DataExpr::And(a, b) => write!(f, "({} && {})", a, b),
            DataExpr::Or(a, b) => write!(f, "({} || {})", a, b),
            DataExpr::Imp(a, b) => write!(f, "({} => {})", a, b),
            DataExpr::Eq(a, b) => write!(f, "({} == {})", a, b),
            DataExpr::Neq(a, b) => write!(f, "({} != {})", a, b),
            DataExpr::Lt(a, b) => write!(f, "({} < {})", a, b),
            DataExpr::Le(a, b) => write!(f, "({} <= {})", a, b),
            DataExpr::Add(a, b) => write!(f, "({} + {})", a, b),
            DataExpr::Sub(a, b) => write!(f, "({} - {})", a, b),
            DataExpr::If(c, t, e) => write!(f, "if({}, {}, {})", c, t, e),
        }
    }
}

/// Prints a list of expressions separated by commas.
pub fn print_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sort declarations: aliases and finite enumerated (struct) sorts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSpec {
    aliases: BTreeMap<Sort, Sort>,
    structs: BTreeMap<Sort, Vec<String>>,
}

impl DataSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` as another name for `target`.
    pub fn add_alias(&mut self, name: impl Into<Sort>, target: impl Into<Sort>) -> Result<()> {
        let name = name.into();
        if self.aliases.contains_key(&name) || self.structs.contains_key(&name) {
            return Err(Error::duplicate(format!("sort '{}'", name)));
        }
        self.aliases.insert(name, target.into());
        Ok(())
    }

    /// Declares a struct sort with the given constructor constants.
    pub fn add_struct<S: Into<String>>(
        &mut self,
        sort: impl Into<Sort>,
        constructors: impl IntoIterator<Item = S>,
    ) -> Result<()> {
        let sort = sort.into();
        if self.aliases.contains_key(&sort) || self.structs.contains_key(&sort) {
            return Err(Error::duplicate(format!("sort '{}'", sort)));
        }
        let constructors: Vec<String> = constructors.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        for c in &constructors {
            if !seen.insert(c.as_str()) {
                return Err(Error::duplicate(format!("constructor '{}' of sort '{}'", c, sort)));
            }
        }
        self.structs.insert(sort, constructors);
        Ok(())
    }

    /// Resolves alias chains to the canonical sort.
    pub fn normalize(&self, sort: &Sort) -> Sort {
        let mut current = sort.clone();
        let mut visited = BTreeSet::new();
        while let Some(target) = self.aliases.get(&current) {
            if !visited.insert(current.clone()) {
                debug!("normalize: alias cycle through '{}'", current);
                break;
            }
            current = target.clone();
        }
        current
    }

    pub fn constructors(&self, sort: &Sort) -> Option<&[String]> {
        self.structs.get(&self.normalize(sort)).map(|v| v.as_slice())
    }

    /// Enumerates all values of a finite sort.
    pub fn enumerate(&self, sort: &Sort) -> Result<Vec<DataExpr>> {
        let sort = self.normalize(sort);
        if sort.is_bool() {
            return Ok(vec![DataExpr::false_(), DataExpr::true_()]);
        }
        match self.structs.get(&sort) {
            Some(constructors) => Ok(constructors
                .iter()
                .map(|c| DataExpr::cons(c.clone(), sort.clone()))
                .collect()),
            None => Err(Error::unsupported(format!(
                "cannot enumerate values of sort '{}'",
                sort
            ))),
        }
    }

    /// All sort and constructor names declared here.
    pub fn identifiers(&self, out: &mut BTreeSet<String>) {
        for (name, target) in &self.aliases {
            out.insert(name.name().to_string());
            out.insert(target.name().to_string());
        }
        for (sort, constructors) in &self.structs {
            out.insert(sort.name().to_string());
            out.extend(constructors.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_smart_constructors_fold_constants() {
        let x = Variable::new("x", Sort::bool());
        let vx = DataExpr::var(&x);
        assert_eq!(DataExpr::and(DataExpr::true_(), vx.clone()), vx);
        assert_eq!(DataExpr::and(vx.clone(), DataExpr::false_()), DataExpr::false_());
        assert_eq!(DataExpr::or(DataExpr::true_(), vx.clone()), DataExpr::true_());
        assert_eq!(DataExpr::not(DataExpr::not(vx.clone())), vx);
        assert_eq!(DataExpr::equal(DataExpr::int(2), DataExpr::int(3)), DataExpr::false_());
        assert_eq!(DataExpr::equal(vx.clone(), vx.clone()), DataExpr::true_());
        assert_eq!(DataExpr::add(DataExpr::int(2), DataExpr::int(3)), DataExpr::int(5));
    }

    #[test]
    fn test_substitute_folds() {
        let n = Variable::new("n", Sort::nat());
        let e = DataExpr::lt(DataExpr::var(&n), DataExpr::int(3));
        let sigma = make_substitution([&n], [DataExpr::int(1)]);
        assert_eq!(e.substitute(&sigma), DataExpr::true_());
    }

    #[test]
    fn test_eval() {
        let n = Variable::new("n", Sort::nat());
        let b = Variable::new("b", Sort::bool());
        let e = DataExpr::ite(
            DataExpr::var(&b),
            DataExpr::add(DataExpr::var(&n), DataExpr::int(1)),
            DataExpr::int(0),
        );
        let mut env = Substitution::new();
        env.insert(n.clone(), DataExpr::int(41));
        env.insert(b.clone(), DataExpr::true_());
        assert_eq!(e.eval(&env).unwrap(), DataExpr::int(42));

        env.insert(b, DataExpr::false_());
        assert_eq!(e.eval(&env).unwrap(), DataExpr::int(0));
    }

    #[test]
    fn test_eval_unbound_variable() {
        let n = Variable::new("n", Sort::nat());
        let err = DataExpr::var(&n).eval(&Substitution::new()).unwrap_err();
        assert!(matches!(err, Error::Evaluation(_)));
    }

    #[test]
    fn test_eval_binding_is_closed() {
        let n = Variable::new("n", Sort::nat());
        let m = Variable::new("m", Sort::nat());
        let mut env = Substitution::new();
        env.insert(n.clone(), DataExpr::Add(Box::new(DataExpr::int(1)), Box::new(DataExpr::int(2))));
        assert_eq!(DataExpr::var(&n).eval(&env).unwrap(), DataExpr::int(3));

        // n := n + 1 must not unfold forever
        env.insert(n.clone(), DataExpr::Add(Box::new(DataExpr::var(&n)), Box::new(DataExpr::int(1))));
        assert!(matches!(DataExpr::var(&n).eval(&env), Err(Error::Evaluation(_))));

        // nor through another binding
        env.insert(m.clone(), DataExpr::var(&n));
        env.insert(n.clone(), DataExpr::var(&m));
        assert!(matches!(DataExpr::var(&m).eval(&env), Err(Error::Evaluation(_))));
    }

    #[test]
    fn test_eval_type_error() {
        let e = DataExpr::Add(Box::new(DataExpr::true_()), Box::new(DataExpr::int(1)));
        assert!(e.eval(&Substitution::new()).is_err());
    }

    #[test]
    fn test_normalize_alias_chain() {
        let mut spec = DataSpec::new();
        spec.add_alias("A", "B").unwrap();
        spec.add_alias("B", "Nat").unwrap();
        assert_eq!(spec.normalize(&Sort::new("A")), Sort::nat());
        assert_eq!(spec.normalize(&Sort::int()), Sort::int());
    }

    #[test]
    fn test_normalize_cycle_terminates() {
        let mut spec = DataSpec::new();
        spec.add_alias("A", "B").unwrap();
        spec.add_alias("B", "A").unwrap();
        let s = spec.normalize(&Sort::new("A"));
        assert!(s == Sort::new("A") || s == Sort::new("B"));
    }

    #[test]
    fn test_enumerate() {
        let mut spec = DataSpec::new();
        spec.add_struct("Color", ["red", "green"]).unwrap();
        spec.add_alias("Colour", "Color").unwrap();
        assert_eq!(spec.enumerate(&Sort::bool()).unwrap().len(), 2);
        let colors = spec.enumerate(&Sort::new("Colour")).unwrap();
        assert_eq!(
            colors,
            vec![DataExpr::cons("red", "Color"), DataExpr::cons("green", "Color")]
        );
        assert!(matches!(
            spec.enumerate(&Sort::nat()),
            Err(Error::UnsupportedConstruct(_))
        ));
    }

    #[test]
    fn test_duplicate_sort() {
        let mut spec = DataSpec::new();
        spec.add_struct("Color", ["red"]).unwrap();
        assert!(matches!(
            spec.add_alias("Color", "Nat"),
            Err(Error::DuplicateDefinition(_))
        ));
        assert!(matches!(
            spec.add_struct("Bit", ["b0", "b0"]),
            Err(Error::DuplicateDefinition(_))
        ));
    }

    #[test]
    fn test_display() {
        let n = Variable::new("n", Sort::nat());
        let e = DataExpr::and(
            DataExpr::lt(DataExpr::var(&n), DataExpr::int(3)),
            DataExpr::not(DataExpr::equal(DataExpr::var(&n), DataExpr::int(1))),
        );
        assert_eq!(e.to_string(), "((n < 3) && !(n == 1))");
    }
}
