// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Observations: a data cube, its header and its world coordinate system.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use ndarray::{ArrayD, ArrayViewD, Axis, Slice};

use crate::error::CoordinateError;
use crate::resolver;
use crate::stokes::Stokes;
use crate::wcs::{AxisKind, AxisSelector, SlicedWcs, Wcs};

/// A single header value.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Str(_) => None,
            HeaderValue::Int(i) => Some(*i as f64),
            HeaderValue::Float(f) => Some(*f),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Str(s) => write!(f, "{}", s),
            HeaderValue::Int(i) => write!(f, "{}", i),
            HeaderValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Header keywords of an observation.
pub type Header = BTreeMap<String, HeaderValue>;

/// Where an observation's array came from. This is decided when slicing,
/// from the number of axes of the original WCS, and is what tells a 3D
/// (wavelength, y, x) cut of a 4D cube apart from a native 3D cube.
///
/// Slices of 1D or 2D observations have nothing to disambiguate and stay
/// `NoHistory`; their slicing state is still kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    NoHistory,
    SlicedFrom4D,
    SlicedFrom3D,
}

impl Provenance {
    fn from_original_naxis(naxis: usize) -> Self {
        match naxis {
            4 => Provenance::SlicedFrom4D,
            3 => Provenance::SlicedFrom3D,
            _ => Provenance::NoHistory,
        }
    }
}

/// The flavour of CRISP data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationKind {
    /// Imaging spectroscopy (and possibly polarimetry) of a spectral line.
    Narrowband,
    /// Wideband or single-wavelength context images.
    Wideband,
    /// Narrowband data whose wavelengths aren't evenly spaced.
    NonUniform,
}

/// How wavelengths are obtained for an index.
#[derive(Clone, Debug, PartialEq)]
pub enum WavelengthSource {
    /// From the WCS.
    Transform,
    /// From a table of the sampled wavelengths [Angstrom], one per sample of
    /// the original spectral axis.
    Sampled(Vec<f64>),
}

#[derive(Clone, Debug)]
pub struct Observation {
    data: ArrayD<f32>,
    header: Header,
    /// This observation's view of the original WCS. The view's free axes
    /// always match the axes of `data`.
    wcs: SlicedWcs,
    provenance: Provenance,
    /// Selectors on the original WCS, if this is a slice of something.
    slicing: Option<Vec<AxisSelector>>,
    kind: ObservationKind,
    wavelengths: WavelengthSource,
    /// Per-element uncertainty of `data`, same shape.
    uncertainty: Option<ArrayD<f32>>,
    /// Per-element mask of `data`, same shape; `true` marks a bad element.
    mask: Option<ArrayD<bool>>,
}

/// Apply `selectors` to `array`. Work from the last axis backwards so that
/// removing an axis doesn't shift the ones still to do.
fn narrow<T: Clone>(array: &ArrayD<T>, selectors: &[AxisSelector]) -> ArrayD<T> {
    let mut array = array.clone();
    for (axis, sel) in selectors.iter().enumerate().rev() {
        match sel {
            AxisSelector::Index(index) => {
                array = array.index_axis_move(Axis(axis), *index);
            }
            AxisSelector::Range { start, end } => {
                let slice = Slice::new(*start as isize, end.map(|e| e as isize), 1);
                array.slice_axis_inplace(Axis(axis), slice);
            }
        }
    }
    array.as_standard_layout().into_owned()
}

impl Observation {
    /// Make a new (unsliced) observation. The data must have the shape the
    /// WCS describes, and between 1 and 4 dimensions.
    pub fn new(
        data: ArrayD<f32>,
        header: Header,
        wcs: Arc<Wcs>,
        kind: ObservationKind,
        wavelengths: WavelengthSource,
    ) -> Result<Self, CoordinateError> {
        let rank = data.ndim();
        if rank == 0 || rank > 4 {
            return Err(CoordinateError::UnsupportedRank(rank));
        }
        if data.shape() != wcs.array_shape().as_slice() {
            return Err(CoordinateError::ShapeMismatch {
                data: data.shape().to_vec(),
                wcs: wcs.array_shape(),
            });
        }
        if let WavelengthSource::Sampled(table) = &wavelengths {
            if let Some(axis) = wcs.kinds().iter().position(|k| *k == AxisKind::Spectral) {
                let len = wcs.axes()[axis].len;
                if table.len() != len {
                    return Err(CoordinateError::ShapeMismatch {
                        data: vec![table.len()],
                        wcs: vec![len],
                    });
                }
            }
        }

        Ok(Self {
            data,
            header,
            wcs: SlicedWcs::full(wcs),
            provenance: Provenance::NoHistory,
            slicing: None,
            kind,
            wavelengths,
            uncertainty: None,
            mask: None,
        })
    }

    /// Attach per-element uncertainties. They must have the data's shape.
    pub fn with_uncertainty(mut self, uncertainty: ArrayD<f32>) -> Result<Self, CoordinateError> {
        self.check_same_shape(uncertainty.shape())?;
        self.uncertainty = Some(uncertainty);
        Ok(self)
    }

    /// Attach a mask (`true` is a bad element). It must have the data's shape.
    pub fn with_mask(mut self, mask: ArrayD<bool>) -> Result<Self, CoordinateError> {
        self.check_same_shape(mask.shape())?;
        self.mask = Some(mask);
        Ok(self)
    }

    fn check_same_shape(&self, shape: &[usize]) -> Result<(), CoordinateError> {
        if shape != self.shape() {
            return Err(CoordinateError::ShapeMismatch {
                data: shape.to_vec(),
                wcs: self.shape().to_vec(),
            });
        }
        Ok(())
    }

    pub fn data(&self) -> ArrayViewD<f32> {
        self.data.view()
    }

    pub fn uncertainty(&self) -> Option<ArrayViewD<f32>> {
        self.uncertainty.as_ref().map(|u| u.view())
    }

    pub fn mask(&self) -> Option<ArrayViewD<bool>> {
        self.mask.as_ref().map(|m| m.view())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    pub fn wcs(&self) -> &SlicedWcs {
        &self.wcs
    }

    /// The WCS of the original, unsliced data.
    pub fn original_wcs(&self) -> &Arc<Wcs> {
        self.wcs.base()
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// The selectors (on the original WCS) that produced this observation.
    /// `None` for unsliced data.
    pub fn slicing_state(&self) -> Option<&[AxisSelector]> {
        self.slicing.as_deref()
    }

    pub fn kind(&self) -> ObservationKind {
        self.kind
    }

    pub fn wavelength_source(&self) -> &WavelengthSource {
        &self.wavelengths
    }

    /// Slice this observation. `selectors` address the axes of the current
    /// data, and missing trailing selectors keep the whole axis. The result
    /// shares this observation's WCS.
    pub fn slice(&self, selectors: &[AxisSelector]) -> Result<Self, CoordinateError> {
        let shape = self.shape().to_vec();
        for (axis, (sel, &len)) in selectors.iter().zip(shape.iter()).enumerate() {
            match sel {
                AxisSelector::Index(index) if *index >= len => {
                    return Err(CoordinateError::IndexOutOfBounds {
                        axis,
                        index: *index,
                        len,
                    })
                }
                _ => (),
            }
        }
        let wcs = self.wcs.restrict(selectors)?;
        let data = narrow(&self.data, selectors);

        let provenance = Provenance::from_original_naxis(wcs.base().naxis());
        let slicing = Some(wcs.selectors().to_vec());
        Ok(Self {
            data,
            header: self.header.clone(),
            wcs,
            provenance,
            slicing,
            kind: self.kind,
            wavelengths: self.wavelengths.clone(),
            uncertainty: self.uncertainty.as_ref().map(|u| narrow(u, selectors)),
            mask: self.mask.as_ref().map(|m| narrow(m, selectors)),
        })
    }

    /// Pick out a single Stokes parameter.
    pub fn select_stokes(&self, stokes: Stokes) -> Result<Self, CoordinateError> {
        let base = self.wcs.base();
        let mut position = 0;
        for (axis, sel) in self.wcs.selectors().iter().enumerate() {
            if !sel.is_range() {
                continue;
            }
            if base.kinds()[axis] == AxisKind::Stokes {
                let len = self.shape()[position];
                let index = stokes
                    .index()
                    .checked_sub(sel.start())
                    .filter(|i| *i < len)
                    .ok_or(CoordinateError::IndexOutOfBounds {
                        axis: position,
                        index: stokes.index(),
                        len,
                    })?;
                let mut selectors = vec![AxisSelector::FULL; position];
                selectors.push(AxisSelector::Index(index));
                return self.slice(&selectors);
            }
            position += 1;
        }
        Err(CoordinateError::NoStokesAxis)
    }

    /// The wavelength [Angstrom] at an index along the wavelength axis.
    pub fn wave(&self, index: usize) -> Result<f64, CoordinateError> {
        resolver::resolve_wavelength(self, index)
    }

    /// Wavelengths [Angstrom] at several indices along the wavelength axis.
    pub fn waves(&self, indices: &[usize]) -> Result<Vec<f64>, CoordinateError> {
        resolver::resolve_wavelengths(self, indices)
    }

    /// Every wavelength [Angstrom] along the wavelength axis.
    pub fn wavelength_axis(&self) -> Result<Vec<f64>, CoordinateError> {
        resolver::wavelength_axis(self)
    }

    /// How far [Angstrom] the wavelength at `index` is from the middle
    /// sample of the original wavelength axis.
    pub fn wavelength_offset(&self, index: usize) -> Result<f64, CoordinateError> {
        Ok(self.wave(index)? - resolver::central_wavelength(self)?)
    }

    /// (y, x) indices to helioprojective (longitude, latitude) [arcsec].
    pub fn to_lonlat(&self, y: f64, x: f64) -> Result<(f64, f64), CoordinateError> {
        resolver::to_spatial_world(self, y, x)
    }

    /// Helioprojective (longitude, latitude) [arcsec] to fractional (y, x)
    /// indices.
    pub fn from_lonlat(&self, lon: f64, lat: f64) -> Result<(f64, f64), CoordinateError> {
        resolver::from_spatial_world(self, lon, lat)
    }

    fn header_string(&self, key: &str) -> String {
        self.header
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Split DATE-AVG (e.g. 2017-08-16T08:11:49.670) into date and time.
    fn date_and_time(&self) -> (String, String) {
        let date_avg = self.header_string("DATE-AVG");
        match date_avg.split_once('T') {
            Some((date, time)) => (date.to_string(), time.to_string()),
            None => (date_avg, String::new()),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (date, time) = self.date_and_time();
        let shape = format!("[{}]", self.shape().iter().join(", "));
        let pointing = format!(
            "({}, {})",
            self.header_string("CRVAL1"),
            self.header_string("CRVAL2")
        );

        match self.kind {
            ObservationKind::Wideband => writeln!(f, "CRISP Wideband Context Image")?,
            _ => writeln!(f, "CRISP Observation")?,
        }
        writeln!(f, "------------------")?;
        writeln!(f, "{} {}", date, time)?;
        writeln!(f)?;
        writeln!(f, "Observed: {}", self.header_string("WDESC1"))?;
        if self.kind != ObservationKind::Wideband {
            let centre = match self.header.get("TWAVE1").and_then(|v| v.as_f64()) {
                Some(w) => format!("{:.2}", w),
                None => "unknown".to_string(),
            };
            writeln!(f, "Centre wavelength: {}", centre)?;
            writeln!(f, "Wavelengths sampled: {}", self.header_string("WWIDTH1"))?;
        }
        writeln!(f, "Pointing: {}", pointing)?;
        write!(f, "Shape: {}", shape)?;
        if let WavelengthSource::Sampled(table) = &self.wavelengths {
            write!(
                f,
                "\nWavelengths sampled: [{}]",
                table.iter().map(|w| format!("{:.3}", w)).join(", ")
            )?;
        }
        Ok(())
    }
}
