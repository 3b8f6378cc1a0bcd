// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Error handling for world coordinate systems.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WcsError {
    /// A CUNIT value that can't be converted to the canonical unit of its
    /// axis.
    #[error("Axis {axis} ({ctype}) has unit '{unit}', which can't be converted")]
    UnknownUnit {
        axis: usize,
        ctype: String,
        unit: String,
    },

    /// CDELT of zero makes an axis non-invertible.
    #[error("Axis {axis} ({ctype}) has a CDELT of zero")]
    ZeroIncrement { axis: usize, ctype: String },

    /// Celestial axes must come as a longitude/latitude pair.
    #[error("Expected exactly one longitude and one latitude axis, found {longitudes} and {latitudes}")]
    UnpairedCelestialAxes { longitudes: usize, latitudes: usize },

    /// The PC matrix of the celestial pair has no inverse.
    #[error("The celestial PC matrix is singular")]
    SingularMatrix,

    /// The number of values handed to a transform doesn't match the number
    /// of axes it has.
    #[error("Expected {expected} values, but got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// More selectors than axes.
    #[error("Got {got} selectors for a transform with {naxis} axes")]
    TooManySelectors { naxis: usize, got: usize },

    /// Text that doesn't describe a selector.
    #[error("Couldn't parse '{0}' as an index or a range like 2:7")]
    BadSelector(String),

    /// A selector that reaches outside its axis.
    #[error("Selector {selector} is out of bounds for axis {axis} of length {len}")]
    SelectorOutOfBounds {
        axis: usize,
        selector: String,
        len: usize,
    },

    /// The requested sky position can't be projected (it is on the far side
    /// of the projection plane).
    #[error("World coordinate ({lon}, {lat}) deg can't be projected")]
    Unprojectable { lon: f64, lat: f64 },

    #[error("Pixel ({x}, {y}) has no world coordinate")]
    NoWorldCoordinate { x: f64, y: f64 },
}
