// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Errors from resolving coordinates on observations.
 */

use thiserror::Error;

use crate::wcs::WcsError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    /// Wavelengths were asked of data without a wavelength axis.
    #[error("There is no spectral component to your data")]
    NoSpectralAxis,

    /// The last two axes of the WCS aren't helioprojective (y, x).
    #[error("The last two axes of your data aren't spatial")]
    NoSpatialAxes,

    /// Only ranks 1 to 4 are understood.
    #[error("Can't handle data with {0} dimensions")]
    UnsupportedRank(usize),

    /// Not one of the 15 accepted Stokes selectors.
    #[error("'{0}' is not a valid Stokes selector; use \"all\" or an ordered combination of I, Q, U and V")]
    InvalidStokesSelector(String),

    /// A single character that isn't I, Q, U or V.
    #[error("'{0}' is not a Stokes profile")]
    NotAStokesProfile(String),

    /// The data array and the WCS disagree about the shape.
    #[error("Data has shape {data:?}, but the WCS describes {wcs:?}")]
    ShapeMismatch { data: Vec<usize>, wcs: Vec<usize> },

    /// An index beyond the end of an axis of the data.
    #[error("Index {index} is out of bounds for axis {axis} of length {len}")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        len: usize,
    },

    /// An index beyond the end of a sampled wavelength table.
    #[error("Wavelength index {index} is beyond the {len} sampled wavelengths")]
    WavelengthIndexOutOfBounds { index: usize, len: usize },

    /// The data has no Stokes axis to select from.
    #[error("There is no Stokes axis in your data")]
    NoStokesAxis,

    #[error("{0}")]
    Wcs(#[from] WcsError),
}
