use crate::model::{Cmdp, StateId};
use thiserror::Error;

/// A per-state valuation string that does not have the shape `[s=<k>]`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed state valuation {valuation:?}, expected the shape \"[s=<int>]\"")]
pub struct ValuationError {
    pub valuation: String,
}

/// Parses the original (input-file) state index out of a valuation string
/// of the shape `[s=<k>]`.
pub fn original_state(valuation: &str) -> Result<StateId, ValuationError> {
    let malformed = || ValuationError {
        valuation: valuation.to_string(),
    };
    let rest = valuation.strip_prefix("[s=").ok_or_else(malformed)?;
    let digits: &str = &rest[..rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len())];
    digits.parse().map_err(|_| malformed())
}

/// Reorders a per-state result vector into input-file state order.
///
/// The model builder may number states differently from the input file;
/// when valuation strings are present, each records the original index.
/// Without valuations the builder order is the input order and the vector
/// is returned unchanged.
pub fn undo_state_permutation<T: Clone>(
    values: &[T],
    cmdp: &Cmdp,
) -> Result<Vec<T>, ValuationError> {
    let Some(valuations) = cmdp.valuations() else {
        return Ok(values.to_vec());
    };
    let mut paired: Vec<(StateId, T)> = Vec::with_capacity(values.len());
    for (value, valuation) in values.iter().zip(valuations) {
        paired.push((original_state(valuation)?, value.clone()));
    }
    paired.sort_by_key(|&(original, _)| original);
    Ok(paired.into_iter().map(|(_, value)| value).collect())
}
