//! # compose-rs: Compositional state spaces and quotienting
//!
//! **`compose-rs`** works on **networks** of communicating linear processes: `N` components glued
//! together by a **synchronization vector** that says which combinations of local actions may
//! happen together, and under which label the combination is visible.
//!
//! It offers two operations on such networks:
//!
//! - **State-space generation**: explore the product of the components on the fly and write the
//!   resulting labelled transition system (AUT or DOT), see [`generator`].
//! - **Quotienting**: remove one component from the network and fold its behaviour into a modal
//!   mu-calculus formula, so that the smaller network satisfies the new formula exactly when the
//!   original network satisfies the old one, see [`quotient`].
//!
//! ## Synchronization vectors
//!
//! A vector for two components, where `a` and `b` happen independently and also together as `c`:
//!
//! ```text
//! synchronization_vector
//! 2
//! 3
//! a inactive -> a
//! inactive b -> b
//! a b -> c
//! ```
//!
//! ## Basic Usage
//!
//! ```rust
//! use compose_rs::action::{Label, MultiAction};
//! use compose_rs::data::{DataExpr, DataSpec};
//! use compose_rs::explore::explore;
//! use compose_rs::lps::{Lps, Summand};
//! use compose_rs::next_state::{LocalGenerator, LpsGenerator};
//! use compose_rs::vector::SyncVector;
//!
//! let vector: SyncVector = "synchronization_vector\n2\n3\n\
//!     a inactive -> a\ninactive b -> b\na b -> c\n".parse().unwrap();
//!
//! // Two one-state processes, always able to do `a` and `b` respectively.
//! let looping = |name: &str| {
//!     let mut lps = Lps::new(DataSpec::new(), vec![]).unwrap();
//!     let action = MultiAction::single(Label::simple(name).apply(vec![]));
//!     lps.add_summand(Summand::new(vec![], DataExpr::true_(), action, vec![])).unwrap();
//!     Box::new(LpsGenerator::new(lps)) as Box<dyn LocalGenerator>
//! };
//! let generators = vec![looping("a"), looping("b")];
//!
//! let transitions = explore(&vector, &generators, &[]).unwrap();
//! assert_eq!(transitions.len(), 3);
//! ```
//!
//! ## Core Components
//!
//! - **[`vector`]** and **[`network`]**: the synchronization vector and the network, with their text formats.
//! - **[`lps`]** and **[`next_state`]**: linear processes and their local successor enumeration.
//! - **[`explore`]**: the successors of a global state under the vector.
//! - **[`generator`]**: breadth-first or depth-first generation of the global state space.
//! - **[`formula`]**: mu-calculus formulas and modal equation systems.
//! - **[`quotient`]**: the quotient of a network and a formula by one component.

pub mod action;
pub mod cache;
pub mod data;
pub mod dot;
pub mod error;
pub mod explore;
pub mod formula;
pub mod generator;
pub mod ident;
pub mod labels;
pub mod lps;
pub mod lts;
pub mod network;
pub mod next_state;
pub mod quotient;
pub mod table;
pub mod vector;
