// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance configuration threaded through every pipeline entry point.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// All tolerance knobs for the reconstruction pipeline.
///
/// Four tiers are in play and their ratios are load-bearing:
/// `point` ≪ `band` ≪ `extension()` (= 4 × band), with
/// `axis_absorb()` (= 0.5 × band) in between. Shrinking `band` toward
/// `point` makes alignment mis-cluster; growing `point` toward `band`
/// collapses distinct axes.
///
/// Passed explicitly by value or reference; never ambient state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tolerances {
    /// Vertex/point merge tolerance.
    pub point: f64,
    /// Banding / axis-offset tolerance (the alignment "delta").
    pub band: f64,
    /// Fuzzy-clustering half-width for expanded segment boxes.
    pub grouping: f64,
    /// Minimum region perimeter worth keeping.
    pub perimeter: f64,
    /// Primary scan angle in radians. The second alignment pass runs at
    /// `theta - 90°`.
    pub theta: f64,
}

impl Tolerances {
    /// Gap-bridging reach when ray-matching anchors across missing spans.
    pub fn extension(&self) -> f64 {
        4.0 * self.band
    }

    /// Absorption reach when merging a snapped point into an existing axis
    /// intersection.
    pub fn axis_absorb(&self) -> f64 {
        0.5 * self.band
    }

    /// Validates the tier ordering.
    pub fn validate(&self) -> Result<()> {
        if !(self.point > 0.0 && self.band > 0.0 && self.grouping > 0.0) {
            return Err(Error::InvalidTolerances(
                "tolerances must be positive".to_string(),
            ));
        }
        if self.point >= self.band {
            return Err(Error::InvalidTolerances(format!(
                "point tolerance {} must be below band tolerance {}",
                self.point, self.band
            )));
        }
        Ok(())
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            point: 0.01,
            band: 0.2,
            grouping: 0.5,
            perimeter: 1.0,
            theta: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_tiers() {
        let tol = Tolerances::default();
        assert_eq!(tol.extension(), 4.0 * tol.band);
        assert_eq!(tol.axis_absorb(), 0.5 * tol.band);
    }

    #[test]
    fn default_passes_validation() {
        assert!(Tolerances::default().validate().is_ok());
    }

    #[test]
    fn inverted_tiers_are_rejected() {
        let tol = Tolerances {
            point: 0.5,
            band: 0.2,
            ..Tolerances::default()
        };
        assert!(tol.validate().is_err());
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let tol = Tolerances {
            point: 0.0,
            ..Tolerances::default()
        };
        assert!(tol.validate().is_err());
    }
}
