//! Validated permutation output.
//!
//! Wraps the index→position mapping produced by the dendrogram traversal
//! and enforces that it is a bijection on `[0, N)` before any caller can
//! observe it.

use thiserror::Error;

/// Error returned when candidate positions do not form a bijection.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum NonBijectivePositions {
    /// A position was outside the permutation's range.
    #[error("position {position} is out of range for a permutation of length {len}")]
    OutOfRange {
        /// The offending position value.
        position: usize,
        /// Length of the permutation.
        len: usize,
    },
    /// Two indices mapped to the same position.
    #[error("position {position} is assigned more than once")]
    Duplicate {
        /// The position assigned twice.
        position: usize,
    },
}

/// Bijective mapping from original vertex index to output position.
///
/// # Examples
/// ```
/// use burrow_core::Permutation;
///
/// let permutation = Permutation::try_from_positions(vec![2, 0, 1])?;
/// assert_eq!(permutation.position_of(0), Some(2));
/// assert_eq!(permutation.as_slice(), &[2, 0, 1]);
/// # Ok::<(), burrow_core::NonBijectivePositions>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    positions: Vec<usize>,
}

impl Permutation {
    /// Validates that `positions` is a bijection on `[0, positions.len())`
    /// and wraps it.
    ///
    /// # Errors
    /// Returns [`NonBijectivePositions`] when a position is out of range or
    /// assigned twice.
    ///
    /// # Examples
    /// ```
    /// use burrow_core::{NonBijectivePositions, Permutation};
    ///
    /// let err = Permutation::try_from_positions(vec![0, 0]).expect_err("duplicate");
    /// assert_eq!(err, NonBijectivePositions::Duplicate { position: 0 });
    /// ```
    pub fn try_from_positions(positions: Vec<usize>) -> Result<Self, NonBijectivePositions> {
        let len = positions.len();
        let mut seen = vec![false; len];
        for &position in &positions {
            if position >= len {
                return Err(NonBijectivePositions::OutOfRange { position, len });
            }
            if seen[position] {
                return Err(NonBijectivePositions::Duplicate { position });
            }
            seen[position] = true;
        }
        Ok(Self { positions })
    }

    /// The identity permutation on `[0, len)`.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self {
            positions: (0..len).collect(),
        }
    }

    /// Number of mapped indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the permutation maps nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// New position of the vertex originally at `index`, or `None` when the
    /// index is out of range.
    #[must_use]
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }

    /// The full index→position mapping.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.positions
    }
}
