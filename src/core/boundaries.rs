//! Upstream distance boundaries
//!
//! A boundary list is parsed from a comma-separated string, gets an implicit
//! `0` inserted and is sorted ascending. Consecutive boundaries delimit the
//! upstream bins: bin `c` covers `(boundary[c], boundary[c + 1]]` bases
//! upstream of the transcription start.

use crate::core::error::{PeakError, Result};

/// Default upstream bin distances
pub const DEFAULT_UPSTREAM_BOUNDARIES: &str =
    "1000,10000,100000,200000,300000,400000,500000,600000,700000,800000";

/// Sorted upstream distances, always starting at 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryList {
    positions: Vec<u64>,
}

impl BoundaryList {
    /// Parse a comma-separated list of non-negative integers
    ///
    /// The result holds only the user-supplied values in input order; call
    /// [`insert_implicit_zero`](Self::insert_implicit_zero) and
    /// [`sort_ascending`](Self::sort_ascending) (or use
    /// [`from_csv`](Self::from_csv)) before generating bins.
    pub fn parse(csv: &str) -> Result<Self> {
        if csv.is_empty() {
            return Err(PeakError::config("upstream boundary list is empty"));
        }
        if csv.chars().any(char::is_whitespace) {
            return Err(PeakError::config(
                "upstream boundary list should be comma-separated with no space",
            ));
        }

        let positions = csv
            .split(',')
            .map(|token| {
                if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(PeakError::config(format!(
                        "invalid upstream boundary '{}' in '{}'",
                        token, csv
                    )));
                }
                token.parse::<u64>().map_err(|e| {
                    PeakError::config(format!("invalid upstream boundary '{}': {}", token, e))
                })
            })
            .collect::<Result<Vec<u64>>>()?;

        Ok(Self { positions })
    }

    /// Parse, insert the implicit zero and sort: the usable form
    pub fn from_csv(csv: &str) -> Result<Self> {
        let mut list = Self::parse(csv)?;
        list.insert_implicit_zero();
        list.sort_ascending();
        Ok(list)
    }

    pub fn insert_implicit_zero(&mut self) {
        self.positions.push(0);
    }

    pub fn sort_ascending(&mut self) {
        self.positions.sort_unstable();
    }

    pub fn positions(&self) -> &[u64] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of upstream bins (one fewer than the number of boundaries)
    pub fn bin_count(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    /// Near and far edge of bin `c`
    pub fn bin(&self, c: usize) -> Option<(u64, u64)> {
        Some((*self.positions.get(c)?, *self.positions.get(c + 1)?))
    }

    /// Whether any two boundaries coincide (giving a zero-width bin)
    pub fn has_duplicates(&self) -> bool {
        self.positions.windows(2).any(|w| w[0] == w[1])
    }
}

impl Default for BoundaryList {
    fn default() -> Self {
        let mut positions: Vec<u64> = DEFAULT_UPSTREAM_BOUNDARIES
            .split(',')
            .filter_map(|s| s.parse().ok())
            .collect();
        positions.push(0);
        positions.sort_unstable();
        Self { positions }
    }
}
