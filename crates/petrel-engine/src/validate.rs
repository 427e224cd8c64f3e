//! Independent validation of a counter selector on the product chain.

use crate::product::ProductMdp;
use crate::reachability::{cannot_reach, reach_probabilities};
use petrel_cmdp::{Cmdp, CounterSelector, ExtInt};
use tracing::debug;

/// Checks that `selector` delivers both guarantees it was built for.
///
/// For every state whose SafePR value fits within the capacity, the run
/// started at `(s, SafePR(s))` must reach a target with positive
/// probability and must never reach the exhaustion sink. States with an
/// infinite SafePR value make no promise and are skipped.
pub fn validate_counter_selector(
    selector: &CounterSelector,
    cmdp: &Cmdp,
    safe_pr: &[ExtInt],
    capacity: u32,
) -> bool {
    let product = ProductMdp::build(cmdp, capacity, selector);
    let target_probability = reach_probabilities(&product);
    let avoids_exhaustion = cannot_reach(&product, product.sink());

    let mut reaches_target = true;
    let mut survives = true;
    for (s, &value) in safe_pr.iter().enumerate() {
        let Some(level) = value.as_finite() else {
            continue;
        };
        if level > i64::from(capacity) {
            continue;
        }
        let start = product.index(s, level as u32);
        if target_probability[start] <= 0.0 {
            debug!(state = s, level, "no positive-probability path to a target");
            reaches_target = false;
        }
        if !avoids_exhaustion[start] {
            debug!(state = s, level, "run can exhaust the resource");
            survives = false;
        }
        if !reaches_target && !survives {
            break;
        }
    }
    reaches_target && survives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::compute_safe_pr;
    use petrel_cmdp::DEFAULT_ACTION;

    fn branching() -> Cmdp {
        let mut cmdp = Cmdp::new(1);
        let s0 = cmdp.add_state(false, false);
        let r1 = cmdp.add_state(true, true);
        let r2 = cmdp.add_state(true, false);
        cmdp.set_action(s0, 0, 2, vec![(r1, 0.5), (r2, 0.5)]);
        cmdp.set_action(r1, 0, 0, vec![(r1, 1.0)]);
        cmdp.set_action(r2, 0, 0, vec![(r2, 1.0)]);
        cmdp
    }

    #[test]
    fn accepts_the_solver_selector() {
        let cmdp = branching();
        let (safe_pr, selector) = compute_safe_pr(&cmdp, 2);
        assert!(validate_counter_selector(&selector, &cmdp, &safe_pr, 2));
    }

    #[test]
    fn accepts_vacuously_when_nothing_is_promised() {
        let cmdp = branching();
        let selector = CounterSelector::new(3, 2);
        let all_infinite = vec![ExtInt::Infinity; 3];
        assert!(validate_counter_selector(&selector, &cmdp, &all_infinite, 2));
    }

    #[test]
    fn rejects_a_selector_that_overspends() {
        let cmdp = branching();
        let (safe_pr, _) = compute_safe_pr(&cmdp, 2);
        // An empty selector forces the default action everywhere; from
        // (0, 2) that still works, but pretending state 0 is safe at
        // level 0 exhausts the resource.
        let selector = CounterSelector::new(3, 2);
        let mut claimed = safe_pr;
        claimed[0] = ExtInt::Finite(0);
        assert!(!validate_counter_selector(&selector, &cmdp, &claimed, 2));
    }

    #[test]
    fn rejects_a_selector_that_never_reaches_a_target() {
        // Two reload states, only 1 is a target; an adversarial selector
        // keeps looping at the non-target reload 2 instead of moving on.
        let mut cmdp = Cmdp::new(2);
        let s2 = cmdp.add_state(true, false);
        let r1 = cmdp.add_state(true, true);
        cmdp.set_action(s2, 0, 0, vec![(s2, 1.0)]);
        cmdp.set_action(s2, 1, 1, vec![(r1, 1.0)]);
        cmdp.set_action(r1, 0, 0, vec![(r1, 1.0)]);
        cmdp.set_action(r1, 1, 0, vec![(r1, 1.0)]);

        let mut selector = CounterSelector::new(2, 1);
        selector.set(s2, 0, DEFAULT_ACTION); // stay forever
        selector.set(r1, 0, DEFAULT_ACTION);
        let safe_pr = vec![ExtInt::Finite(0), ExtInt::Finite(0)];
        assert!(!validate_counter_selector(&selector, &cmdp, &safe_pr, 1));
    }
}
