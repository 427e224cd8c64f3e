//! The analysis pipeline: runs the three solvers in order, times each
//! phase, validates the produced selector, and reorders the reported
//! vectors into input-file state order.

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

use petrel_cmdp::{undo_state_permutation, Cmdp, CounterSelector, ExtInt, ModelError, ValuationError};

use crate::solvers::{compute_safe, compute_safe_pr, min_init_cons};
use crate::validate::validate_counter_selector;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("model is not well-formed: {0}")]
    Model(#[from] ModelError),
    #[error("cannot reorder results: {0}")]
    Valuation(#[from] ValuationError),
}

/// Options for a full analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Validate the counter selector on the product chain.
    pub validate: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// Wall-clock duration of each solver phase.
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimings {
    pub min_init_cons: Duration,
    pub safe: Duration,
    pub safe_pr: Duration,
}

/// The complete outcome of one analysis run.
///
/// The three vectors are reported in input-file state order; the
/// selector keeps the builder's state order, which is also the order
/// the validator works in.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub capacity: u32,
    pub min_init_cons: Vec<ExtInt>,
    pub safe: Vec<ExtInt>,
    pub safe_pr: Vec<ExtInt>,
    pub selector: CounterSelector,
    /// Validator verdict; `None` when validation was skipped.
    pub verdict: Option<bool>,
    pub timings: PhaseTimings,
}

/// Runs the full analysis for `cmdp` under `capacity`.
pub fn run_analysis(
    cmdp: &Cmdp,
    capacity: u32,
    options: &AnalysisOptions,
) -> Result<AnalysisReport, AnalysisError> {
    cmdp.validate()?;
    info!(
        states = cmdp.num_states(),
        actions = cmdp.num_actions(),
        capacity,
        "starting analysis"
    );

    let started = Instant::now();
    let min_init_cons = min_init_cons(cmdp);
    let min_init_cons_time = started.elapsed();
    info!(elapsed = ?min_init_cons_time, "computed MinInitCons");

    let started = Instant::now();
    let safe = compute_safe(cmdp, capacity);
    let safe_time = started.elapsed();
    info!(elapsed = ?safe_time, "computed Safe");

    let started = Instant::now();
    let (safe_pr, selector) = compute_safe_pr(cmdp, capacity);
    let safe_pr_time = started.elapsed();
    info!(elapsed = ?safe_pr_time, "computed SafePR and counter selector");

    let verdict = if options.validate {
        let verdict = validate_counter_selector(&selector, cmdp, &safe_pr, capacity);
        info!(verdict, "validated counter selector");
        Some(verdict)
    } else {
        None
    };

    Ok(AnalysisReport {
        capacity,
        min_init_cons: undo_state_permutation(&min_init_cons, cmdp)?,
        safe: undo_state_permutation(&safe, cmdp)?,
        safe_pr: undo_state_permutation(&safe_pr, cmdp)?,
        selector,
        verdict,
        timings: PhaseTimings {
            min_init_cons: min_init_cons_time,
            safe: safe_time,
            safe_pr: safe_pr_time,
        },
    })
}
