//! Reachability analysis over the product chain.
//!
//! The product under a counter selector is a finite Markov chain, so the
//! two questions the validator asks are answered directly: reachability
//! probabilities by value iteration from below, and the qualitative
//! "probability zero" set by a backward closure over the edge relation.

use crate::product::ProductMdp;
use std::collections::VecDeque;

/// Convergence bound for the value iteration. Positivity of the result
/// is already exact once every state has been swept `num_states` times,
/// so the verdicts derived from these values do not depend on it.
const CONVERGENCE_EPSILON: f64 = 1e-12;

/// `Pr[eventually target]` for every product state.
///
/// Value iteration from below: target states are pinned at one, all
/// other values start at zero and only grow. The iteration runs at least
/// `num_states` sweeps, which settles reachability-in-the-qualitative
/// sense, then continues until the largest per-sweep change falls under
/// the convergence bound.
pub fn reach_probabilities(product: &ProductMdp) -> Vec<f64> {
    let n = product.num_states();
    let mut values = vec![0.0; n];
    for x in 0..n {
        if product.is_target(x) {
            values[x] = 1.0;
        }
    }

    let mut sweeps = 0usize;
    loop {
        let mut next = vec![0.0; n];
        let mut delta = 0.0f64;
        for x in 0..n {
            if product.is_target(x) {
                next[x] = 1.0;
                continue;
            }
            let mut acc = 0.0;
            for &(t, p) in product.successors(x) {
                acc += p * values[t];
            }
            next[x] = acc;
            delta = delta.max((acc - values[x]).abs());
        }
        values = next;
        sweeps += 1;
        if sweeps >= n && delta < CONVERGENCE_EPSILON {
            break;
        }
    }
    values
}

/// The set of product states from which `goal` is unreachable, that is,
/// `Pr[eventually goal] = 0`.
///
/// Backward closure: walk the reversed edge relation from `goal`; every
/// state never visited cannot reach it.
pub fn cannot_reach(product: &ProductMdp, goal: usize) -> Vec<bool> {
    let n = product.num_states();
    let mut predecessors = vec![Vec::new(); n];
    for x in 0..n {
        for &(t, _) in product.successors(x) {
            predecessors[t].push(x);
        }
    }

    let mut reaches = vec![false; n];
    reaches[goal] = true;
    let mut queue = VecDeque::from([goal]);
    while let Some(x) = queue.pop_front() {
        for &p in &predecessors[x] {
            if !reaches[p] {
                reaches[p] = true;
                queue.push_back(p);
            }
        }
    }
    reaches.iter().map(|&r| !r).collect()
}
