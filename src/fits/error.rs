// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Error handling for reading observations out of FITS files.
 */

use thiserror::Error;

use crate::error::CoordinateError;
use crate::wcs::WcsError;

#[derive(Error, Debug)]
pub enum FitsError {
    /// An HDU that should hold an image doesn't.
    #[error("HDU {hdu} is not an image")]
    NotAnImage { hdu: usize },

    /// NAXIS disagrees with the shape of the image.
    #[error("NAXIS is {naxis}, but the image has {ndim} dimensions")]
    BadNaxis { naxis: i64, ndim: usize },

    /// A keyword needed to build the WCS is absent.
    #[error("Keyword {key} is missing from HDU {hdu}")]
    MissingKey { key: String, hdu: usize },

    /// An error building the WCS out of the header.
    #[error("{0}")]
    Wcs(#[from] WcsError),

    /// The data don't make a valid observation.
    #[error("{0}")]
    Coordinate(#[from] CoordinateError),

    /// The image couldn't be shaped into an array.
    #[error("{0}")]
    Shape(#[from] ndarray::ShapeError),

    /// An error associated the fitsio-crate.
    #[error("{0}")]
    Fitsio(#[from] fitsio::errors::Error),

    /// An IO error.
    #[error("{0}")]
    IO(#[from] std::io::Error),
}
