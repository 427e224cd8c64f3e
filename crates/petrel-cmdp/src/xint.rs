use std::fmt;
use std::ops::{Add, Neg};

/// An extended integer: an element of ℤ together with `+infinity` and
/// `-infinity`.
///
/// The derived `Ord` yields the expected total order,
/// `NegInfinity < Finite(a) < Infinity` for every finite `a`, with finite
/// values ordered by their payload. The default value is `+infinity`, so
/// minimisation accumulators start at the top of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtInt {
    NegInfinity,
    Finite(i64),
    Infinity,
}

impl ExtInt {
    pub fn is_finite(&self) -> bool {
        matches!(self, ExtInt::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    /// Sign of the value: `-1`, `0`, or `1`.
    pub fn sign(&self) -> i32 {
        match self {
            ExtInt::NegInfinity => -1,
            ExtInt::Finite(v) => v.signum() as i32,
            ExtInt::Infinity => 1,
        }
    }

    /// The underlying integer, or `None` for the infinities.
    pub fn as_finite(&self) -> Option<i64> {
        match self {
            ExtInt::Finite(v) => Some(*v),
            _ => None,
        }
    }

    /// The underlying integer.
    ///
    /// # Panics
    ///
    /// Panics when the value is infinite. Callers that cannot rule out an
    /// infinity should use [`ExtInt::as_finite`] instead.
    pub fn value(&self) -> i64 {
        match self {
            ExtInt::Finite(v) => *v,
            other => panic!("no integer representation for {other}"),
        }
    }

    /// Addition that returns `None` for the undefined sum of infinities
    /// with opposite sign.
    pub fn checked_add(self, rhs: ExtInt) -> Option<ExtInt> {
        match (self, rhs) {
            (ExtInt::Finite(a), ExtInt::Finite(b)) => Some(ExtInt::Finite(a + b)),
            (ExtInt::Infinity, ExtInt::NegInfinity) | (ExtInt::NegInfinity, ExtInt::Infinity) => {
                None
            }
            (inf, ExtInt::Finite(_)) | (_, inf) => Some(inf),
        }
    }
}

impl Default for ExtInt {
    fn default() -> Self {
        ExtInt::Infinity
    }
}

impl From<i64> for ExtInt {
    fn from(value: i64) -> Self {
        ExtInt::Finite(value)
    }
}

impl Add for ExtInt {
    type Output = ExtInt;

    /// # Panics
    ///
    /// Panics on the mathematically undefined sum of infinities with
    /// opposite sign. The solvers only ever add non-negative values, so a
    /// panic here signals a corrupted value vector.
    fn add(self, rhs: ExtInt) -> ExtInt {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("undefined sum of infinities with opposite sign"),
        }
    }
}

impl Neg for ExtInt {
    type Output = ExtInt;

    fn neg(self) -> ExtInt {
        match self {
            ExtInt::NegInfinity => ExtInt::Infinity,
            ExtInt::Finite(v) => ExtInt::Finite(-v),
            ExtInt::Infinity => ExtInt::NegInfinity,
        }
    }
}

impl fmt::Display for ExtInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtInt::NegInfinity => write!(f, "-infinity"),
            ExtInt::Finite(v) => write!(f, "{v}"),
            ExtInt::Infinity => write!(f, "infinity"),
        }
    }
}
