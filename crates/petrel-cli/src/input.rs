//! Loading a CMDP model from its JSON description.
//!
//! The file carries a `constants` table (which must define an integer
//! `capacity`), the uniform per-state action count, and one entry per
//! state with its labels, optional valuation string, and actions. All
//! errors here are fatal before the solvers run.

use indexmap::IndexMap;
use miette::Diagnostic;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use petrel_cmdp::{original_state, Cmdp, ModelError};

#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("Failed to read model file {path}")]
    #[diagnostic(code(petrel::input::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Model file {path} is not valid JSON")]
    #[diagnostic(code(petrel::input::json))]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing constant `capacity` in model file")]
    #[diagnostic(
        code(petrel::input::missing_capacity),
        help("declare an integer `capacity` in the `constants` table")
    )]
    MissingCapacity,

    #[error("Constant `capacity` is not an integer: {found}")]
    #[diagnostic(code(petrel::input::capacity_not_integer))]
    CapacityNotInteger { found: String },

    #[error("Constant `capacity` is out of range: {value}")]
    #[diagnostic(
        code(petrel::input::capacity_out_of_range),
        help("the capacity must fit in an unsigned 32-bit integer")
    )]
    CapacityOutOfRange { value: i64 },

    #[error("State {state} declares {found} actions, expected {expected}")]
    #[diagnostic(code(petrel::input::action_count))]
    ActionCount {
        state: usize,
        expected: usize,
        found: usize,
    },

    #[error("State {state}: malformed valuation {valuation:?}")]
    #[diagnostic(
        code(petrel::input::valuation),
        help("valuations must have the shape \"[s=<int>]\"")
    )]
    Valuation { state: usize, valuation: String },

    #[error("States {first} and {second} share the valuation {valuation:?}")]
    #[diagnostic(code(petrel::input::duplicate_valuation))]
    DuplicateValuation {
        first: usize,
        second: usize,
        valuation: String,
    },

    #[error("Model is not a well-formed CMDP: {0}")]
    #[diagnostic(code(petrel::input::model))]
    Model(#[from] ModelError),
}

/// The on-disk model description.
#[derive(Debug, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub constants: IndexMap<String, Value>,
    pub num_actions: usize,
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Deserialize)]
pub struct StateSpec {
    #[serde(default)]
    pub reload: bool,
    #[serde(default)]
    pub target: bool,
    #[serde(default)]
    pub valuation: Option<String>,
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ActionSpec {
    #[serde(default)]
    pub cost: u32,
    pub transitions: Vec<(usize, f64)>,
}

impl ModelFile {
    /// Extracts the declared capacity from the constants table.
    pub fn capacity(&self) -> Result<u32, InputError> {
        let value = self
            .constants
            .get("capacity")
            .ok_or(InputError::MissingCapacity)?;
        let integer = value.as_i64().ok_or_else(|| InputError::CapacityNotInteger {
            found: value.to_string(),
        })?;
        u32::try_from(integer).map_err(|_| InputError::CapacityOutOfRange { value: integer })
    }

    /// Builds the validated CMDP described by this file.
    pub fn build_cmdp(&self) -> Result<Cmdp, InputError> {
        let mut cmdp = Cmdp::new(self.num_actions);
        for spec in &self.states {
            cmdp.add_state(spec.reload, spec.target);
        }
        let mut seen: IndexMap<usize, usize> = IndexMap::new();
        for (s, spec) in self.states.iter().enumerate() {
            if spec.actions.len() != self.num_actions {
                return Err(InputError::ActionCount {
                    state: s,
                    expected: self.num_actions,
                    found: spec.actions.len(),
                });
            }
            for (a, action) in spec.actions.iter().enumerate() {
                cmdp.set_action(s, a, action.cost, action.transitions.clone());
            }
            if let Some(valuation) = &spec.valuation {
                let original = original_state(valuation).map_err(|_| InputError::Valuation {
                    state: s,
                    valuation: valuation.clone(),
                })?;
                if let Some(&first) = seen.get(&original) {
                    return Err(InputError::DuplicateValuation {
                        first,
                        second: s,
                        valuation: valuation.clone(),
                    });
                }
                seen.insert(original, s);
                cmdp.set_valuation(s, valuation.clone());
            }
        }
        cmdp.validate()?;
        Ok(cmdp)
    }
}

/// Loads the model file at `path` and returns the CMDP with its declared
/// capacity.
pub fn load_model(path: &Path) -> Result<(Cmdp, u32), InputError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: display.clone(),
        source,
    })?;
    let file: ModelFile = serde_json::from_str(&text).map_err(|source| InputError::Json {
        path: display,
        source,
    })?;
    let capacity = file.capacity()?;
    let cmdp = file.build_cmdp()?;
    Ok((cmdp, capacity))
}
