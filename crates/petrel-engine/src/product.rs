//! Resource-augmented product of a CMDP and a counter selector.

use petrel_cmdp::{Cmdp, CounterSelector, StateId};

/// The product of a CMDP with the resource levels `0..=capacity` under a
/// counter selector.
///
/// States are the pairs `(s, level)`, encoded as `s * (capacity + 1) +
/// level`, plus one absorbing sink representing resource exhaustion.
/// The selector fixes the action at every pair, so each product state
/// carries exactly one successor distribution: the product is a finite
/// Markov chain.
#[derive(Debug, Clone)]
pub struct ProductMdp {
    /// One successor distribution per product state.
    transitions: Vec<Vec<(usize, f64)>>,
    /// Target labels inherited from the CMDP; the sink is not a target.
    target: Vec<bool>,
    levels: usize,
}

impl ProductMdp {
    /// Builds the product chain of `cmdp` under `selector`.
    ///
    /// From `(s, level)` the agent takes the selector's action for that
    /// level (falling back over the downward lookup), recharges first
    /// when `s` is a reload state, and pays the action cost. A payment
    /// the level cannot cover moves to the sink instead.
    pub fn build(cmdp: &Cmdp, capacity: u32, selector: &CounterSelector) -> Self {
        let levels = capacity as usize + 1;
        let n = cmdp.num_states();
        let sink = n * levels;
        let mut transitions = Vec::with_capacity(sink + 1);
        let mut target = vec![false; sink + 1];

        for s in 0..n {
            for level in 0..=capacity {
                let action = selector.rule(s).action_or_default(level);
                let available = if cmdp.is_reload(s) { capacity } else { level };
                let next_level = i64::from(available) - i64::from(cmdp.cost(s, action));
                if next_level < 0 {
                    transitions.push(vec![(sink, 1.0)]);
                } else {
                    let successors = cmdp
                        .post(s, action)
                        .map(|(t, p)| (t * levels + next_level as usize, p))
                        .collect();
                    transitions.push(successors);
                }
                target[s * levels + level as usize] = cmdp.is_target(s);
            }
        }
        transitions.push(vec![(sink, 1.0)]);

        Self {
            transitions,
            target,
            levels,
        }
    }

    /// Total number of product states, including the sink.
    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    /// The exhaustion sink.
    pub fn sink(&self) -> usize {
        self.num_states() - 1
    }

    /// Encodes the pair `(state, level)`.
    pub fn index(&self, state: StateId, level: u32) -> usize {
        state * self.levels + level as usize
    }

    /// The successor distribution of a product state.
    pub fn successors(&self, product_state: usize) -> &[(usize, f64)] {
        &self.transitions[product_state]
    }

    pub fn is_target(&self, product_state: usize) -> bool {
        self.target[product_state]
    }
}
