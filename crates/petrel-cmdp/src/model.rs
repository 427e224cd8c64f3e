use std::fmt;
use thiserror::Error;

/// A unique identifier for a state of the CMDP.
pub type StateId = usize;
/// A unique identifier for an action.
pub type ActionId = usize;

/// Tolerance when checking that a successor distribution sums to one.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// A consumption Markov decision process.
///
/// Every state exposes the same number of actions. Taking an action
/// consumes a non-negative integer amount of the resource; entering a
/// reload state restores the resource to the capacity. Target states are
/// the reachability goal of the almost-sure-reach analysis.
///
/// Transitions are stored as sparse successor lists holding only the
/// positive-probability entries, so iterating `post(s, a)` is cheap. The
/// structure is immutable once built; the solvers only ever borrow it.
#[derive(Debug, Clone)]
pub struct Cmdp {
    num_actions: usize,
    /// `transitions[s][a]` lists the successors of `(s, a)` with their
    /// probabilities.
    transitions: Vec<Vec<Vec<(StateId, f64)>>>,
    /// `costs[s][a]` is the resource consumed by taking `a` at `s`.
    costs: Vec<Vec<u32>>,
    reload: Vec<bool>,
    target: Vec<bool>,
    /// Per-state valuation strings of the shape `[s=<k>]`, when the model
    /// builder attached them. Empty otherwise.
    valuations: Vec<String>,
}

/// A violation of the CMDP well-formedness rules.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("state {state}, action {action}: empty successor distribution")]
    EmptyDistribution { state: StateId, action: ActionId },

    #[error("state {state}, action {action}: probabilities sum to {sum}, expected 1")]
    DistributionSum {
        state: StateId,
        action: ActionId,
        sum: f64,
    },

    #[error("state {state}, action {action}: probability {probability} for successor {successor} is outside (0, 1]")]
    ProbabilityOutOfRange {
        state: StateId,
        action: ActionId,
        successor: StateId,
        probability: f64,
    },

    #[error("state {state}, action {action}: successor {successor} out of range for a model with {num_states} states")]
    SuccessorOutOfRange {
        state: StateId,
        action: ActionId,
        successor: StateId,
        num_states: usize,
    },

    #[error("state {state}: valuation is missing but other states carry one")]
    MissingValuation { state: StateId },
}

impl Cmdp {
    /// An empty CMDP whose states will each expose `num_actions` actions.
    pub fn new(num_actions: usize) -> Self {
        Self {
            num_actions,
            transitions: Vec::new(),
            costs: Vec::new(),
            reload: Vec::new(),
            target: Vec::new(),
            valuations: Vec::new(),
        }
    }

    /// Adds a state with the given labels. All of its actions start out as
    /// free self-loops; use [`Cmdp::set_action`] to overwrite them.
    pub fn add_state(&mut self, reload: bool, target: bool) -> StateId {
        let id = self.transitions.len();
        self.transitions
            .push(vec![vec![(id, 1.0)]; self.num_actions]);
        self.costs.push(vec![0; self.num_actions]);
        self.reload.push(reload);
        self.target.push(target);
        id
    }

    /// Overwrites the cost and successor distribution of `(state, action)`.
    pub fn set_action(
        &mut self,
        state: StateId,
        action: ActionId,
        cost: u32,
        successors: Vec<(StateId, f64)>,
    ) {
        self.costs[state][action] = cost;
        self.transitions[state][action] = successors;
    }

    /// Attaches a valuation string (shape `[s=<k>]`) to `state`.
    pub fn set_valuation(&mut self, state: StateId, valuation: String) {
        if self.valuations.is_empty() {
            self.valuations = vec![String::new(); self.num_states()];
        }
        self.valuations.resize(self.num_states(), String::new());
        self.valuations[state] = valuation;
    }

    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// The positive-probability successors of `(state, action)`.
    pub fn post(&self, state: StateId, action: ActionId) -> impl Iterator<Item = (StateId, f64)> + '_ {
        self.transitions[state][action].iter().copied()
    }

    /// The resource consumed by taking `action` at `state`.
    pub fn cost(&self, state: StateId, action: ActionId) -> u32 {
        self.costs[state][action]
    }

    pub fn is_reload(&self, state: StateId) -> bool {
        self.reload[state]
    }

    pub fn is_target(&self, state: StateId) -> bool {
        self.target[state]
    }

    /// A fresh copy of the reload label vector, for solvers that trim it.
    pub fn reload_vector(&self) -> Vec<bool> {
        self.reload.clone()
    }

    /// The per-state valuation strings, when the builder attached them.
    pub fn valuations(&self) -> Option<&[String]> {
        if self.valuations.is_empty() {
            None
        } else {
            Some(&self.valuations)
        }
    }

    /// Checks the well-formedness rules: every successor distribution is
    /// non-empty, references known states, and sums to one; valuations are
    /// attached to either no state or all of them.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.num_states();
        for s in 0..n {
            for a in 0..self.num_actions {
                let successors = &self.transitions[s][a];
                if successors.is_empty() {
                    return Err(ModelError::EmptyDistribution {
                        state: s,
                        action: a,
                    });
                }
                let mut sum = 0.0;
                for &(t, p) in successors {
                    if t >= n {
                        return Err(ModelError::SuccessorOutOfRange {
                            state: s,
                            action: a,
                            successor: t,
                            num_states: n,
                        });
                    }
                    if p <= 0.0 || p > 1.0 {
                        return Err(ModelError::ProbabilityOutOfRange {
                            state: s,
                            action: a,
                            successor: t,
                            probability: p,
                        });
                    }
                    sum += p;
                }
                if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(ModelError::DistributionSum {
                        state: s,
                        action: a,
                        sum,
                    });
                }
            }
        }
        if !self.valuations.is_empty() {
            for (s, valuation) in self.valuations.iter().enumerate() {
                if valuation.is_empty() {
                    return Err(ModelError::MissingValuation { state: s });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Cmdp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "CMDP: {} states, {} actions per state",
            self.num_states(),
            self.num_actions
        )?;
        for s in 0..self.num_states() {
            let mut labels = Vec::new();
            if self.reload[s] {
                labels.push("reload");
            }
            if self.target[s] {
                labels.push("target");
            }
            let labels = if labels.is_empty() {
                String::new()
            } else {
                format!(" ({})", labels.join(", "))
            };
            writeln!(f, "  s{s}{labels}:")?;
            for a in 0..self.num_actions {
                let successors = self.transitions[s][a]
                    .iter()
                    .map(|(t, p)| format!("s{t}: {p}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(f, "    a{a} (cost {}): {{{successors}}}", self.costs[s][a])?;
            }
        }
        Ok(())
    }
}
