//! The three fixed points over the extended-integer lattice.
//!
//! All solvers iterate one-step operators to a fixed point with Jacobi
//! updates: each pass reads the previous approximant only, so the result
//! is independent of state enumeration order. Values are drawn from
//! `{0, 1, ..., capacity} ∪ {+infinity}` and the operators are monotone
//! non-increasing, which bounds the number of passes.

use petrel_cmdp::{ActionId, Cmdp, CounterSelector, ExtInt, StateId};
use tracing::debug;

/// `max_{t in post(s, a)} f(t)`, seeded with `0` so an action whose
/// successors all evaluate to `0` (for example, all reload states under
/// the truncated valuation) contributes no remaining cost.
fn max_over_post(cmdp: &Cmdp, s: StateId, a: ActionId, f: impl Fn(StateId) -> ExtInt) -> ExtInt {
    let mut max = ExtInt::Finite(0);
    for (t, _) in cmdp.post(s, a) {
        let v = f(t);
        if v > max {
            max = v;
        }
    }
    max
}

/// `min_{t in post(s, a)} f(t)`. `post(s, a)` is non-empty in a
/// well-formed model, so the `+infinity` seed is always overwritten by
/// at least one candidate.
fn min_over_post(cmdp: &Cmdp, s: StateId, a: ActionId, f: impl Fn(StateId) -> ExtInt) -> ExtInt {
    let mut min = ExtInt::Infinity;
    for (t, _) in cmdp.post(s, a) {
        let v = f(t);
        if v < min {
            min = v;
        }
    }
    min
}

/// `max_{t in post(s, a), t != excluded} f(t)`, or `None` when
/// `post(s, a)` is the singleton `{excluded}`.
fn max_over_post_excluding(
    cmdp: &Cmdp,
    s: StateId,
    a: ActionId,
    excluded: StateId,
    f: impl Fn(StateId) -> ExtInt,
) -> Option<ExtInt> {
    let mut max = None;
    for (t, _) in cmdp.post(s, a) {
        if t == excluded {
            continue;
        }
        let v = f(t);
        if max.map_or(true, |m| v > m) {
            max = Some(v);
        }
    }
    max
}

/// Minimum initial resource sufficient to guarantee reaching some reload
/// state, taking the reload set from the model's labels.
pub fn min_init_cons(cmdp: &Cmdp) -> Vec<ExtInt> {
    min_init_cons_with_reloads(cmdp, &cmdp.reload_vector())
}

/// Minimum initial resource sufficient to guarantee reaching a state in
/// `reloads`, which replaces the model's reload labels.
///
/// Greatest fixed point: the approximant starts at `+infinity`
/// everywhere and descends. Reload states are valued `0` on the
/// right-hand side of the one-step operator (recharging completes the
/// obligation), but keep their own left-hand-side entry, which records
/// the cost of reaching the *next* reload from there.
pub fn min_init_cons_with_reloads(cmdp: &Cmdp, reloads: &[bool]) -> Vec<ExtInt> {
    let n = cmdp.num_states();
    let mut approx = vec![ExtInt::Infinity; n];
    let mut passes = 0usize;
    loop {
        let prev = approx.clone();
        for s in 0..n {
            // Cheapest guarantee over all actions: pay the action cost,
            // then cover the worst successor.
            let mut cost_until_reload = ExtInt::Infinity;
            for a in 0..cmdp.num_actions() {
                let step_cost = ExtInt::Finite(cmdp.cost(s, a).into());
                let remaining = max_over_post(cmdp, s, a, |t| {
                    if reloads[t] {
                        ExtInt::Finite(0)
                    } else {
                        prev[t]
                    }
                });
                let total = step_cost + remaining;
                if total < cost_until_reload {
                    cost_until_reload = total;
                }
            }
            if cost_until_reload < approx[s] {
                approx[s] = cost_until_reload;
            }
        }
        passes += 1;
        if approx == prev {
            break;
        }
    }
    debug!(passes, "min_init_cons fixed point reached");
    approx
}

/// Minimum initial resource sufficient to survive forever under
/// `capacity`.
///
/// Iteratively strikes unusable reload states: a reload state that
/// cannot re-reach a (remaining) reload state within `capacity` cannot
/// actually be used to recharge, so it is removed and the fixed point
/// recomputed. Removal is monotone; struck states are never readmitted.
pub fn compute_safe(cmdp: &Cmdp, capacity: u32) -> Vec<ExtInt> {
    let n = cmdp.num_states();
    let cap = ExtInt::Finite(capacity.into());
    let mut reloads = cmdp.reload_vector();
    let mut mic;
    let mut rounds = 0usize;
    loop {
        mic = min_init_cons_with_reloads(cmdp, &reloads);
        let mut changed = false;
        for s in 0..n {
            if reloads[s] && mic[s] > cap {
                reloads[s] = false;
                changed = true;
            }
        }
        rounds += 1;
        if !changed {
            break;
        }
    }
    debug!(rounds, "reload pruning converged");

    let mut safe = mic;
    for s in 0..n {
        if reloads[s] {
            safe[s] = ExtInt::Finite(0);
        } else if safe[s] > cap {
            safe[s] = ExtInt::Infinity;
        }
    }
    safe
}

/// For each state, the first action that keeps the agent safe: the
/// action cost plus the worst successor's `Safe` value stays within the
/// state's budget (`capacity` at reload states, `Safe(s)` elsewhere).
/// `None` for states that cannot survive at all.
pub fn safe_actions(cmdp: &Cmdp, safe: &[ExtInt], capacity: u32) -> Vec<Option<ActionId>> {
    let n = cmdp.num_states();
    let mut actions = vec![None; n];
    for s in 0..n {
        if safe[s].is_infinite() {
            continue;
        }
        let budget = if cmdp.is_reload(s) {
            ExtInt::Finite(capacity.into())
        } else {
            safe[s]
        };
        actions[s] = (0..cmdp.num_actions()).find(|&a| {
            let worst = max_over_post(cmdp, s, a, |t| safe[t]);
            ExtInt::Finite(cmdp.cost(s, a).into()) + worst <= budget
        });
    }
    actions
}

/// The value of taking `a` at `s` against the current SafePR approximant.
///
/// The adversary picks the single worst successor the agent must handle
/// in the almost-sure-reach sense; for that pick, the agent must remain
/// safe with respect to every sibling successor. With a singleton
/// `post(s, a)` there are no siblings and the value is `v` at the unique
/// successor.
fn safe_pr_value(cmdp: &Cmdp, s: StateId, a: ActionId, v: &[ExtInt], safe: &[ExtInt]) -> ExtInt {
    let step_cost = ExtInt::Finite(cmdp.cost(s, a).into());
    let worst_pick = min_over_post(cmdp, s, a, |t| {
        match max_over_post_excluding(cmdp, s, a, t, |sibling| safe[sibling]) {
            Some(siblings) if siblings > v[t] => siblings,
            _ => v[t],
        }
    });
    step_cost + worst_pick
}

/// Minimum initial resource under which a strategy both survives forever
/// and reaches a target with positive probability, together with the
/// counter selector realising it.
///
/// The value vector starts at `Safe` on target states and `+infinity`
/// elsewhere, and descends. Whenever a state's value improves, the
/// minimising action is recorded in the selector at the *truncated*
/// level, which is the level the selector is indexed by at runtime.
pub fn compute_safe_pr(cmdp: &Cmdp, capacity: u32) -> (Vec<ExtInt>, CounterSelector) {
    let n = cmdp.num_states();
    let cap = ExtInt::Finite(capacity.into());
    let safe = compute_safe(cmdp, capacity);

    let mut v = vec![ExtInt::Infinity; n];
    for s in 0..n {
        if cmdp.is_target(s) {
            v[s] = safe[s];
        }
    }

    // Seed every survivable state with its safe action, so that levels
    // between `SafePR(s)` and the next recorded rule fall back to an
    // action that at least preserves survival.
    let mut selector = CounterSelector::new(n, capacity);
    for (s, action) in safe_actions(cmdp, &safe, capacity).into_iter().enumerate() {
        if let Some(a) = action {
            selector.set(s, safe[s].value() as u32, a);
        }
    }

    let mut passes = 0usize;
    loop {
        let prev = v.clone();
        for s in 0..n {
            if cmdp.is_target(s) {
                continue;
            }
            let mut best = ExtInt::Infinity;
            let mut best_action = 0;
            for a in 0..cmdp.num_actions() {
                let value = safe_pr_value(cmdp, s, a, &prev, &safe);
                if value < best {
                    best = value;
                    best_action = a;
                }
            }
            // Two-sided truncation: values beyond the capacity cannot be
            // realised, and a finite value at a reload state collapses to
            // zero because recharging is free there.
            if best > cap {
                best = ExtInt::Infinity;
            } else if cmdp.is_reload(s) {
                best = ExtInt::Finite(0);
            }
            v[s] = best;
            if best < prev[s] {
                if let Some(level) = best.as_finite() {
                    selector.set(s, level as u32, best_action);
                }
            }
        }
        passes += 1;
        if v == prev {
            break;
        }
    }
    debug!(passes, "safe_pr fixed point reached");
    (v, selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `0 --(2)--> 1` with a free self-loop on the reload target `1`.
    fn two_state_chain() -> Cmdp {
        let mut cmdp = Cmdp::new(1);
        let s0 = cmdp.add_state(false, false);
        let s1 = cmdp.add_state(true, true);
        cmdp.set_action(s0, 0, 2, vec![(s1, 1.0)]);
        cmdp.set_action(s1, 0, 0, vec![(s1, 1.0)]);
        cmdp
    }

    #[test]
    fn min_init_cons_on_the_chain() {
        let cmdp = two_state_chain();
        assert_eq!(
            min_init_cons(&cmdp),
            vec![ExtInt::Finite(2), ExtInt::Finite(0)]
        );
    }

    #[test]
    fn min_init_cons_diverges_without_reachable_reloads() {
        // 0 loops on itself and never reaches the reload state 1.
        let mut cmdp = Cmdp::new(1);
        let s0 = cmdp.add_state(false, false);
        let s1 = cmdp.add_state(true, false);
        cmdp.set_action(s0, 0, 1, vec![(s0, 1.0)]);
        cmdp.set_action(s1, 0, 0, vec![(s1, 1.0)]);
        assert_eq!(
            min_init_cons(&cmdp),
            vec![ExtInt::Infinity, ExtInt::Finite(0)]
        );
    }

    #[test]
    fn min_init_cons_respects_a_replacement_reload_set() {
        let cmdp = two_state_chain();
        // With the reload label struck, nothing can recharge.
        let mic = min_init_cons_with_reloads(&cmdp, &[false, false]);
        assert_eq!(mic, vec![ExtInt::Infinity, ExtInt::Infinity]);
    }

    #[test]
    fn min_init_cons_takes_the_worst_successor() {
        // One probabilistic action reaching a cheap and an expensive branch.
        let mut cmdp = Cmdp::new(1);
        let s0 = cmdp.add_state(false, false);
        let near = cmdp.add_state(false, false);
        let far = cmdp.add_state(false, false);
        let reload = cmdp.add_state(true, false);
        cmdp.set_action(s0, 0, 1, vec![(near, 0.5), (far, 0.5)]);
        cmdp.set_action(near, 0, 1, vec![(reload, 1.0)]);
        cmdp.set_action(far, 0, 3, vec![(reload, 1.0)]);
        cmdp.set_action(reload, 0, 0, vec![(reload, 1.0)]);
        let mic = min_init_cons(&cmdp);
        // Guaranteeing the reload must cover the expensive branch.
        assert_eq!(mic[s0], ExtInt::Finite(4));
    }

    #[test]
    fn safe_zeroes_surviving_reload_states() {
        let cmdp = two_state_chain();
        assert_eq!(
            compute_safe(&cmdp, 3),
            vec![ExtInt::Finite(2), ExtInt::Finite(0)]
        );
    }

    #[test]
    fn safe_is_infinite_beyond_the_capacity() {
        let cmdp = two_state_chain();
        assert_eq!(
            compute_safe(&cmdp, 1),
            vec![ExtInt::Infinity, ExtInt::Finite(0)]
        );
    }

    #[test]
    fn safe_prunes_reload_states_that_cannot_recharge() {
        // 0 -> 1 -> 2 -> 0 with cost 3 per step; reloads at 1 and 2.
        let mut cmdp = Cmdp::new(1);
        let s0 = cmdp.add_state(false, true);
        let s1 = cmdp.add_state(true, false);
        let s2 = cmdp.add_state(true, false);
        cmdp.set_action(s0, 0, 3, vec![(s1, 1.0)]);
        cmdp.set_action(s1, 0, 3, vec![(s2, 1.0)]);
        cmdp.set_action(s2, 0, 3, vec![(s0, 1.0)]);

        // Capacity 6 keeps both reload states: the long leg 2 -> 0 -> 1
        // costs exactly 6.
        assert_eq!(
            compute_safe(&cmdp, 6),
            vec![ExtInt::Finite(3), ExtInt::Finite(0), ExtInt::Finite(0)]
        );

        // Capacity 4 first strikes state 2 (its return leg costs 6), after
        // which state 1 cannot recharge either; the pruning cascades and
        // nothing survives.
        assert_eq!(
            compute_safe(&cmdp, 4),
            vec![ExtInt::Infinity, ExtInt::Infinity, ExtInt::Infinity]
        );
    }

    #[test]
    fn safe_actions_pick_the_first_fitting_action() {
        // Two equivalent actions with equal cost: the lower index wins.
        let mut cmdp = Cmdp::new(2);
        let s0 = cmdp.add_state(false, false);
        let r = cmdp.add_state(true, true);
        cmdp.set_action(s0, 0, 1, vec![(r, 1.0)]);
        cmdp.set_action(s0, 1, 1, vec![(r, 1.0)]);
        cmdp.set_action(r, 0, 0, vec![(r, 1.0)]);
        cmdp.set_action(r, 1, 0, vec![(r, 1.0)]);
        let safe = compute_safe(&cmdp, 2);
        let actions = safe_actions(&cmdp, &safe, 2);
        assert_eq!(actions, vec![Some(0), Some(0)]);
    }

    #[test]
    fn safe_actions_are_undefined_for_doomed_states() {
        let cmdp = two_state_chain();
        let safe = compute_safe(&cmdp, 1);
        let actions = safe_actions(&cmdp, &safe, 1);
        assert_eq!(actions, vec![None, Some(0)]);
    }

    #[test]
    fn safe_pr_on_the_chain_matches_safe() {
        let cmdp = two_state_chain();
        let (safe_pr, selector) = compute_safe_pr(&cmdp, 3);
        assert_eq!(safe_pr, vec![ExtInt::Finite(2), ExtInt::Finite(0)]);
        assert_eq!(selector.rule(0).slot(2), Some(0));
        assert_eq!(selector.rule(1).slot(0), Some(0));
    }

    #[test]
    fn safe_pr_is_infinite_when_the_target_is_unreachable() {
        // The reload state 1 survives but never reaches the target 2.
        let mut cmdp = Cmdp::new(1);
        let s0 = cmdp.add_state(false, false);
        let s1 = cmdp.add_state(true, false);
        let s2 = cmdp.add_state(false, true);
        cmdp.set_action(s0, 0, 1, vec![(s1, 1.0)]);
        cmdp.set_action(s1, 0, 0, vec![(s1, 1.0)]);
        cmdp.set_action(s2, 0, 1, vec![(s2, 1.0)]);
        let (safe_pr, _) = compute_safe_pr(&cmdp, 2);
        assert_eq!(safe_pr[s0], ExtInt::Infinity);
        assert_eq!(safe_pr[s1], ExtInt::Infinity);
        // 2 is a target, so its value is its Safe value: it cannot
        // survive (no reload reachable), hence infinity as well.
        assert_eq!(safe_pr[s2], ExtInt::Infinity);
    }

    #[test]
    fn safe_pr_covers_siblings_of_the_adversarial_pick() {
        // One probabilistic action from 0 reaching the target reload r1
        // or the non-target reload r2.
        let mut cmdp = Cmdp::new(1);
        let s0 = cmdp.add_state(false, false);
        let r1 = cmdp.add_state(true, true);
        let r2 = cmdp.add_state(true, false);
        cmdp.set_action(s0, 0, 2, vec![(r1, 0.5), (r2, 0.5)]);
        cmdp.set_action(r1, 0, 0, vec![(r1, 1.0)]);
        cmdp.set_action(r2, 0, 0, vec![(r2, 1.0)]);
        let (safe_pr, selector) = compute_safe_pr(&cmdp, 2);
        assert_eq!(safe_pr[s0], ExtInt::Finite(2));
        assert_eq!(safe_pr[r1], ExtInt::Finite(0));
        // r2 survives but cannot reach the target.
        assert_eq!(safe_pr[r2], ExtInt::Infinity);
        assert_eq!(selector.rule(s0).slot(2), Some(0));
    }

    #[test]
    fn safe_pr_reload_truncation_records_level_zero() {
        // A non-target reload state on the way to the target: its SafePR
        // value collapses to 0 and the rule is recorded there.
        let mut cmdp = Cmdp::new(1);
        let s0 = cmdp.add_state(true, false);
        let s1 = cmdp.add_state(false, true);
        cmdp.set_action(s0, 0, 1, vec![(s1, 1.0)]);
        cmdp.set_action(s1, 0, 1, vec![(s0, 1.0)]);
        let (safe_pr, selector) = compute_safe_pr(&cmdp, 2);
        assert_eq!(safe_pr[s0], ExtInt::Finite(0));
        assert_eq!(safe_pr[s1], ExtInt::Finite(1));
        assert_eq!(selector.rule(s0).slot(0), Some(0));
    }
}
