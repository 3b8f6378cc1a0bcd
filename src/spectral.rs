// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Helpers for wavelength axes.
 */

use itertools::Itertools;

/// Angstrom per metre.
pub const ANGSTROM_PER_METRE: f64 = 1e10;

/// Arcseconds per degree.
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Convert a vacuum wavelength to its wavelength in standard air, using the
/// refractive index of Morton (2000). Both wavelengths are in Angstrom.
///
/// e.g. the Ca II line at 8544.44 Angstrom in vacuum is at 8542.09 Angstrom
/// in air.
pub fn vac_to_air(vacuum: f64) -> f64 {
    let s2 = (1e4 / vacuum).powi(2);
    let n = 1.0 + 8.34254e-5 + 2.406147e-2 / (130.0 - s2) + 1.5998e-4 / (38.9 - s2);
    vacuum / n
}

/// The median of some wavelengths. `None` if there aren't any.
pub fn median(wavelengths: &[f64]) -> Option<f64> {
    if wavelengths.is_empty() {
        return None;
    }
    let sorted: Vec<f64> = wavelengths
        .iter()
        .copied()
        .sorted_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .collect();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Offsets of each wavelength from the median wavelength (Delta lambda).
pub fn delta_lambda(wavelengths: &[f64]) -> Vec<f64> {
    match median(wavelengths) {
        Some(m) => wavelengths.iter().map(|w| w - m).collect(),
        None => vec![],
    }
}
