//! LTS to DOT (Graphviz) conversion.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **States** are rendered as circles labelled with their index
//! - **The initial state** is drawn with the initial shape and ranked at the top
//! - **Transitions** are labelled edges; `tau` steps use the silent edge style
//!
//! # Examples
//!
//! ```
//! use compose_rs::lts::Lts;
//!
//! let mut lts = Lts::new(0);
//! lts.add_transition(0, "a", 1);
//! lts.add_transition(1, "tau", 0);
//!
//! let dot = lts.to_dot().unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! assert!(dot.starts_with("digraph lts {"));
//! ```

use crate::lts::Lts;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for the initial state (default: "doublecircle")
    pub initial_shape: &'static str,
    /// Style for visible transitions (default: "solid")
    pub edge_style: &'static str,
    /// Style for `tau` transitions (default: "dashed")
    pub tau_edge_style: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            initial_shape: "doublecircle",
            edge_style: "solid",
            tau_edge_style: "dashed",
        }
    }
}

impl Lts {
    /// Converts the transition system to DOT format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the transition system to DOT format with custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use compose_rs::dot::DotConfig;
    /// use compose_rs::lts::Lts;
    ///
    /// let mut lts = Lts::new(0);
    /// lts.add_transition(0, "a", 0);
    ///
    /// let config = DotConfig {
    ///     state_shape: "ellipse",
    ///     ..DotConfig::default()
    /// };
    ///
    /// let dot = lts.to_dot_with_config(&config).unwrap();
    /// ```
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let mut dot = String::new();
        writeln!(dot, "digraph lts {{")?;
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        // Initial state at the top
        writeln!(dot, "{{ rank=source")?;
        writeln!(
            dot,
            "{} [shape={}, label=\"{}\"];",
            self.initial_state(),
            config.initial_shape,
            self.initial_state()
        )?;
        writeln!(dot, "}}")?;

        for state in 0..self.num_states() {
            if state != self.initial_state() {
                writeln!(dot, "{} [label=\"{}\"];", state, state)?;
            }
        }

        for (source, label, target) in self.transitions() {
            let style = if label == "tau" {
                config.tau_edge_style
            } else {
                config.edge_style
            };
            writeln!(
                dot,
                "{} -> {} [label=\"{}\", style={}];",
                source,
                target,
                label.replace('"', "\\\""),
                style
            )?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
