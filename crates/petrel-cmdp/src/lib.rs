#![doc = include_str!("../README.md")]

//! Petrel model crate.
//!
//! This crate defines the consumption-MDP structure consumed by the
//! solvers in `petrel-engine`: extended-integer arithmetic, the CMDP
//! itself, selection rules and counter selectors, and the state
//! permutation utilities.

pub mod model;
pub mod permutation;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod selector;
pub mod xint;

pub use model::{ActionId, Cmdp, ModelError, StateId};
pub use permutation::{original_state, undo_state_permutation, ValuationError};
pub use selector::{CounterSelector, SelectionRule, DEFAULT_ACTION};
pub use xint::ExtInt;
