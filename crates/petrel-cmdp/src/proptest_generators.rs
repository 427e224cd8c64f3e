//! Proptest strategies for generating well-formed [`Cmdp`] instances.

use proptest::prelude::*;

use crate::model::Cmdp;

/// Strategy for a well-formed CMDP suitable for property testing.
///
/// Generated models have:
/// - 2–8 states with a uniform action count of 1–3
/// - per-action costs in `0..=4`
/// - sparse successor distributions with 1–3 distinct successors,
///   normalised from small integer weights
/// - independently sampled reload and target labels, with one sampled
///   state forced to be a reload so every model has at least one
pub fn arb_cmdp() -> impl Strategy<Value = Cmdp> {
    (2..=8usize, 1..=3usize)
        .prop_flat_map(|(num_states, num_actions)| {
            let action = (
                0u32..=4,
                proptest::collection::vec((0..num_states, 1u32..=4), 1..=3),
            );
            let actions = proptest::collection::vec(
                proptest::collection::vec(action, num_actions..=num_actions),
                num_states..=num_states,
            );
            let labels = proptest::collection::vec(
                (prop::bool::weighted(0.5), prop::bool::weighted(0.3)),
                num_states..=num_states,
            );
            (
                Just(num_states),
                Just(num_actions),
                actions,
                labels,
                0..num_states,
            )
        })
        .prop_map(|(num_states, num_actions, actions, labels, forced_reload)| {
            let mut cmdp = Cmdp::new(num_actions);
            for (s, &(reload, target)) in labels.iter().enumerate() {
                cmdp.add_state(reload || s == forced_reload, target);
            }
            for (s, state_actions) in actions.iter().enumerate() {
                for (a, (cost, entries)) in state_actions.iter().enumerate() {
                    // Merge duplicate successors, then normalise the weights
                    // into a probability distribution.
                    let mut weights = vec![0u32; num_states];
                    for &(t, w) in entries {
                        weights[t] += w;
                    }
                    let total: f64 = weights.iter().sum::<u32>().into();
                    let successors: Vec<(usize, f64)> = weights
                        .iter()
                        .enumerate()
                        .filter(|(_, &w)| w > 0)
                        .map(|(t, &w)| (t, f64::from(w) / total))
                        .collect();
                    cmdp.set_action(s, a, *cost, successors);
                }
            }
            cmdp
        })
}
