// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Resolve array indices of an observation to wavelengths and
 * helioprojective coordinates (and back).
 *
 * Which part of the original WCS applies depends on the rank of the data,
 * where it came from (see [`Provenance`]) and how it was sliced. All of
 * these functions are pure; the only side effect is a warning for 1D data.
 */

use std::sync::Arc;

use itertools::Itertools;
use log::{debug, warn};

use crate::error::CoordinateError;
use crate::observation::{Observation, Provenance, WavelengthSource};
use crate::spectral::{ANGSTROM_PER_METRE, ARCSEC_PER_DEG};
use crate::wcs::{AxisKind, AxisSelector, SlicedWcs, Wcs};

/// Keep a range selector; an index means the axis was collapsed, so fall
/// back to the whole axis.
fn range_or_full(sel: Option<&AxisSelector>) -> AxisSelector {
    match sel {
        Some(s) if s.is_range() => *s,
        _ => AxisSelector::FULL,
    }
}

/// The sub-transform of the original WCS that holds the wavelength axis, as
/// selectors on the original WCS. `None` means the observation's own
/// transform should be used (1D data).
fn spectral_selectors(obs: &Observation) -> Result<Option<Vec<AxisSelector>>, CoordinateError> {
    let base = obs.original_wcs();
    let state = obs.slicing_state();

    // Position of the wavelength axis in a WCS with `naxis` axes.
    let selectors_for = |naxis: usize| -> Result<Vec<AxisSelector>, CoordinateError> {
        let spectral = match naxis {
            4 => 1,
            3 => 0,
            _ => return Err(CoordinateError::NoSpectralAxis),
        };
        if base.naxis() != naxis || base.kinds()[spectral] != AxisKind::Spectral {
            return Err(CoordinateError::NoSpectralAxis);
        }
        let mut selectors = vec![AxisSelector::Index(0); naxis];
        selectors[spectral] = range_or_full(state.and_then(|s| s.get(spectral)));
        Ok(selectors)
    };

    let selectors = match obs.rank() {
        4 => selectors_for(4)?,
        3 => match obs.provenance() {
            Provenance::SlicedFrom4D => selectors_for(4)?,
            _ => selectors_for(3)?,
        },
        2 => match obs.provenance() {
            Provenance::SlicedFrom4D => selectors_for(4)?,
            Provenance::SlicedFrom3D => selectors_for(3)?,
            // A 2D array with no history is a map, not a spectrum.
            Provenance::NoHistory => return Err(CoordinateError::NoSpectralAxis),
        },
        1 => return Ok(None),
        r => return Err(CoordinateError::UnsupportedRank(r)),
    };
    Ok(Some(selectors))
}

/// The view (of the original WCS) to convert wavelength indices with.
fn spectral_view(obs: &Observation) -> Result<SlicedWcs, CoordinateError> {
    match spectral_selectors(obs)? {
        Some(selectors) => {
            debug!(
                "Resolving wavelengths with WCS[{}]",
                selectors.iter().join(", ")
            );
            Ok(SlicedWcs::new(Arc::clone(obs.original_wcs()), &selectors)?)
        }
        None => {
            warn!("1D data is assumed to be a spectrum; its WCS isn't checked for a wavelength axis");
            Ok(obs.wcs().clone())
        }
    }
}

/// The wavelength [Angstrom] at `index` along the wavelength axis.
pub fn resolve_wavelength(obs: &Observation, index: usize) -> Result<f64, CoordinateError> {
    let mut wavelengths = resolve_wavelengths(obs, &[index])?;
    Ok(wavelengths.remove(0))
}

/// The wavelengths [Angstrom] at each of `indices` along the wavelength
/// axis.
///
/// Wavelengths come from the WCS (which is in metres) unless the
/// observation carries a table of sampled wavelengths. Indices are relative
/// to the data; if the wavelength axis was cut down to a range, the start of
/// that range is added before looking anything up.
pub fn resolve_wavelengths(
    obs: &Observation,
    indices: &[usize],
) -> Result<Vec<f64>, CoordinateError> {
    let view = spectral_view(obs)?;
    match obs.wavelength_source() {
        WavelengthSource::Transform => indices
            .iter()
            .map(|&i| -> Result<f64, CoordinateError> {
                let world = view.array_index_to_world(&[i as f64])?;
                Ok(world[0] * ANGSTROM_PER_METRE)
            })
            .collect(),

        WavelengthSource::Sampled(table) => {
            let offset = view
                .selectors()
                .iter()
                .find(|s| s.is_range())
                .map(|s| s.start())
                .unwrap_or(0);
            indices
                .iter()
                .map(|&i| {
                    offset
                        .checked_add(i)
                        .and_then(|j| table.get(j))
                        .copied()
                        .ok_or(CoordinateError::WavelengthIndexOutOfBounds {
                            index: offset.saturating_add(i),
                            len: table.len(),
                        })
                })
                .collect()
        }
    }
}

/// Every wavelength [Angstrom] along the wavelength axis of the data. If
/// the wavelength axis was collapsed, this is the whole original axis.
pub fn wavelength_axis(obs: &Observation) -> Result<Vec<f64>, CoordinateError> {
    let view = spectral_view(obs)?;
    let n = view.array_shape().first().copied().unwrap_or(0);
    let indices: Vec<usize> = (0..n).collect();
    resolve_wavelengths(obs, &indices)
}

/// The wavelength [Angstrom] of the middle sample of the original
/// wavelength axis.
pub fn central_wavelength(obs: &Observation) -> Result<f64, CoordinateError> {
    let base = obs.original_wcs();
    let spectral = base
        .kinds()
        .iter()
        .position(|k| *k == AxisKind::Spectral)
        .ok_or(CoordinateError::NoSpectralAxis)?;
    let centre = base.axes()[spectral].len / 2;

    match obs.wavelength_source() {
        WavelengthSource::Transform => {
            let mut selectors = vec![AxisSelector::Index(0); base.naxis()];
            selectors[spectral] = AxisSelector::FULL;
            let view = SlicedWcs::new(Arc::clone(base), &selectors)?;
            Ok(view.array_index_to_world(&[centre as f64])?[0] * ANGSTROM_PER_METRE)
        }
        WavelengthSource::Sampled(table) => {
            table
                .get(centre)
                .copied()
                .ok_or(CoordinateError::WavelengthIndexOutOfBounds {
                    index: centre,
                    len: table.len(),
                })
        }
    }
}

/// The view (of the original WCS) holding the two spatial axes. Leading
/// axes are fixed at 0; the trailing (y, x) axes keep their ranges, or the
/// whole axis if they were collapsed.
fn spatial_view(obs: &Observation) -> Result<SlicedWcs, CoordinateError> {
    let rank = obs.rank();
    if !(2..=4).contains(&rank) {
        return Err(CoordinateError::UnsupportedRank(rank));
    }

    let base: &Arc<Wcs> = obs.original_wcs();
    let n = base.naxis();
    if n < 2 || base.kinds()[n - 2] != AxisKind::Latitude || base.kinds()[n - 1] != AxisKind::Longitude
    {
        return Err(CoordinateError::NoSpatialAxes);
    }

    let state = obs.slicing_state();
    let mut selectors = vec![AxisSelector::Index(0); n - 2];
    selectors.push(range_or_full(state.and_then(|s| s.get(n - 2))));
    selectors.push(range_or_full(state.and_then(|s| s.get(n - 1))));
    debug!(
        "Resolving spatial coordinates with WCS[{}]",
        selectors.iter().join(", ")
    );
    Ok(SlicedWcs::new(Arc::clone(base), &selectors)?)
}

/// (y, x) array indices to helioprojective (longitude, latitude) [arcsec].
///
/// Note the order: indices go in numpy order, but coordinates come out as
/// (Solar-X, Solar-Y).
pub fn to_spatial_world(
    obs: &Observation,
    y: f64,
    x: f64,
) -> Result<(f64, f64), CoordinateError> {
    let view = spatial_view(obs)?;
    let world = view.array_index_to_world(&[y, x])?;
    Ok((world[0] * ARCSEC_PER_DEG, world[1] * ARCSEC_PER_DEG))
}

/// Helioprojective (longitude, latitude) [arcsec] to (y, x) array indices.
/// The indices are fractional; round them to index the data.
pub fn from_spatial_world(
    obs: &Observation,
    lon: f64,
    lat: f64,
) -> Result<(f64, f64), CoordinateError> {
    let view = spatial_view(obs)?;
    let indices = view.world_to_array_index(&[lon / ARCSEC_PER_DEG, lat / ARCSEC_PER_DEG])?;
    Ok((indices[0], indices[1]))
}
