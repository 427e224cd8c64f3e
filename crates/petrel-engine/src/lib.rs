#![doc = include_str!("../README.md")]

//! Petrel solver engine.
//!
//! The solvers are pure functions from a borrowed [`petrel_cmdp::Cmdp`]
//! and a capacity to value vectors over the extended integers; the
//! SafePR solver additionally produces a counter selector, which the
//! validator checks independently on the resource-augmented product.

pub mod pipeline;
pub mod product;
pub mod reachability;
pub mod report;
pub mod solvers;
pub mod validate;

pub use pipeline::{run_analysis, AnalysisError, AnalysisOptions, AnalysisReport, PhaseTimings};
pub use product::ProductMdp;
pub use report::render_report;
pub use solvers::{
    compute_safe, compute_safe_pr, min_init_cons, min_init_cons_with_reloads, safe_actions,
};
pub use validate::validate_counter_selector;
