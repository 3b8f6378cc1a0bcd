// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Coordinates for CRISP imaging-spectroscopy (and spectropolarimetry) data.
 *
 * An [`Observation`] holds a data cube of rank 1 to 4 together with its
 * world coordinate system. Whatever way the cube has been sliced, its array
 * indices can be turned into wavelengths and helioprojective coordinates,
 * and helioprojective coordinates back into indices.
 */

pub mod error;
pub mod fits;
pub mod observation;
pub mod resolver;
pub mod sequence;
pub mod spectral;
pub mod stokes;
pub mod wcs;

pub use error::CoordinateError;
pub use observation::{Header, HeaderValue, Observation, ObservationKind, Provenance, WavelengthSource};
pub use sequence::ObservationSequence;
pub use stokes::{Stokes, StokesSelector};
pub use wcs::{AxisSelector, SlicedWcs, Wcs, WcsAxis};
