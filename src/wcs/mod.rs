// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * World coordinate systems for imaging-spectroscopy cubes.
 *
 * A [`Wcs`] describes every axis of an array in *array order* (slowest
 * varying first, i.e. numpy order), which for CRISP data is (stokes,
 * wavelength, y, x). FITS keywords number their axes the other way around,
 * so axis `i` of the array is FITS axis `naxis - i`.
 *
 * World values handed out by this module are in canonical units: metres
 * for spectral axes, degrees for celestial axes, and whatever the header
 * says for anything else (e.g. the Stokes axis). Multi-axis world results
 * come in FITS (world) order, so a helioprojective pair is (lon, lat).
 */

pub mod error;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use mapproj::{
    img2celestial::Img2Celestial, img2proj::WcsImgXY2ProjXY, zenithal::tan::Tan,
    CenteredProjection, ImgXY, LonLat,
};

pub use error::WcsError;

/// Pixel (FITS, 1-indexed) to helioprojective (lon, lat) for a TAN pair.
type TanTransform = Img2Celestial<Tan, WcsImgXY2ProjXY>;

/// Wrap a longitude into (-180, 180].
fn wrap_longitude(lon: f64) -> f64 {
    let mut l = lon % 360.0;
    if l > 180.0 {
        l -= 360.0;
    } else if l <= -180.0 {
        l += 360.0;
    }
    l
}

/// What an axis measures, judged by the first part of its CTYPE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisKind {
    Stokes,
    Spectral,
    Longitude,
    Latitude,
    Other,
}

impl AxisKind {
    pub fn from_ctype(ctype: &str) -> Self {
        let prefix = ctype.trim().split('-').next().unwrap_or("");
        match prefix {
            "STOKES" => AxisKind::Stokes,
            "WAVE" | "AWAV" => AxisKind::Spectral,
            "HPLN" | "RA" | "GLON" | "ELON" => AxisKind::Longitude,
            "HPLT" | "DEC" | "GLAT" | "ELAT" => AxisKind::Latitude,
            _ => AxisKind::Other,
        }
    }

    pub fn is_celestial(self) -> bool {
        matches!(self, AxisKind::Longitude | AxisKind::Latitude)
    }
}

/// The scale factor from a CUNIT string to the canonical unit of an axis.
fn unit_scale(kind: AxisKind, unit: &str) -> Option<f64> {
    match kind {
        AxisKind::Spectral => match unit.trim() {
            "" | "m" => Some(1.0),
            "nm" => Some(1e-9),
            "um" => Some(1e-6),
            "Angstrom" | "angstrom" | "AA" => Some(1e-10),
            _ => None,
        },
        AxisKind::Longitude | AxisKind::Latitude => match unit.trim() {
            "" | "deg" => Some(1.0),
            "arcmin" => Some(1.0 / 60.0),
            "arcsec" => Some(1.0 / 3600.0),
            _ => None,
        },
        AxisKind::Stokes | AxisKind::Other => Some(1.0),
    }
}

/// A single linear axis as described by a FITS header.
#[derive(Clone, Debug, PartialEq)]
pub struct WcsAxis {
    pub ctype: String,
    pub cunit: String,
    pub crval: f64,
    pub cdelt: f64,
    /// 1-indexed reference pixel, as in FITS.
    pub crpix: f64,
    /// The number of samples along this axis.
    pub len: usize,
}

impl WcsAxis {
    pub fn new(ctype: &str, cunit: &str, crval: f64, cdelt: f64, crpix: f64, len: usize) -> Self {
        Self {
            ctype: ctype.to_string(),
            cunit: cunit.to_string(),
            crval,
            cdelt,
            crpix,
            len,
        }
    }

    pub fn kind(&self) -> AxisKind {
        AxisKind::from_ctype(&self.ctype)
    }
}

/// One entry of a slicing state: either a single index (which collapses the
/// axis) or a half-open range. A range with no end runs to the end of the
/// axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisSelector {
    Index(usize),
    Range { start: usize, end: Option<usize> },
}

impl AxisSelector {
    /// The whole axis.
    pub const FULL: AxisSelector = AxisSelector::Range {
        start: 0,
        end: None,
    };

    pub fn range(start: usize, end: usize) -> Self {
        AxisSelector::Range {
            start,
            end: Some(end),
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, AxisSelector::Range { .. })
    }

    /// The first index selected.
    pub fn start(&self) -> usize {
        match self {
            AxisSelector::Index(i) => *i,
            AxisSelector::Range { start, .. } => *start,
        }
    }

    /// The number of samples this selector keeps on an axis of length `len`.
    /// Indices keep one sample (and the axis disappears).
    pub fn len_on(&self, len: usize) -> usize {
        match self {
            AxisSelector::Index(_) => 1,
            AxisSelector::Range { start, end } => end.unwrap_or(len).saturating_sub(*start),
        }
    }

    /// Check this selector against an axis of length `len`.
    pub fn validate(&self, axis: usize, len: usize) -> Result<(), WcsError> {
        let ok = match self {
            AxisSelector::Index(i) => *i < len,
            AxisSelector::Range { start, end } => {
                let end = end.unwrap_or(len);
                *start <= end && end <= len
            }
        };
        if ok {
            Ok(())
        } else {
            Err(WcsError::SelectorOutOfBounds {
                axis,
                selector: self.to_string(),
                len,
            })
        }
    }

    /// Apply `inner` (which addresses the samples this selector keeps) on top
    /// of this selector, giving a selector on the original axis.
    fn compose(&self, inner: &AxisSelector) -> AxisSelector {
        let offset = self.start();
        match inner {
            AxisSelector::Index(i) => AxisSelector::Index(offset + i),
            AxisSelector::Range { start, end } => AxisSelector::Range {
                start: offset + start,
                end: match (end, self) {
                    (Some(e), _) => Some(offset + e),
                    (None, AxisSelector::Range { end, .. }) => *end,
                    (None, AxisSelector::Index(_)) => None,
                },
            },
        }
    }
}

impl fmt::Display for AxisSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisSelector::Index(i) => write!(f, "{}", i),
            AxisSelector::Range { start, end } => match (start, end) {
                (0, None) => write!(f, ":"),
                (s, None) => write!(f, "{}:", s),
                (s, Some(e)) => write!(f, "{}:{}", s, e),
            },
        }
    }
}

impl FromStr for AxisSelector {
    type Err = WcsError;

    /// Parse numpy-style slice syntax for one axis: "3", ":", "2:", ":7" or
    /// "2:7". Steps aren't supported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || WcsError::BadSelector(s.to_string());
        let s = s.trim();
        let parse_bound = |b: &str| -> Result<Option<usize>, WcsError> {
            match b.trim() {
                "" => Ok(None),
                b => b.parse().map(Some).map_err(|_| bad()),
            }
        };
        match s.split_once(':') {
            None => s.parse().map(AxisSelector::Index).map_err(|_| bad()),
            Some((start, end)) => {
                if end.contains(':') {
                    return Err(bad());
                }
                Ok(AxisSelector::Range {
                    start: parse_bound(start)?.unwrap_or(0),
                    end: parse_bound(end)?,
                })
            }
        }
    }
}

impl AxisSelector {
    /// Parse a comma-separated list of selectors, e.g. "0,:,10:20,5".
    pub fn parse_list(s: &str) -> Result<Vec<Self>, WcsError> {
        s.split(',').map(|sel| sel.parse()).collect()
    }
}

/// A full world coordinate system. All axes are separable and linear except
/// the celestial pair, which is coupled through the PC matrix and the TAN
/// projection (done by `mapproj`).
#[derive(Clone, Debug, PartialEq)]
pub struct Wcs {
    axes: Vec<WcsAxis>,
    kinds: Vec<AxisKind>,
    scales: Vec<f64>,
    /// Array positions of the (longitude, latitude) axes, if any.
    celestial: Option<(usize, usize)>,
    /// PC matrix of the celestial pair, rows and columns in (lon, lat) order.
    pc: [[f64; 2]; 2],
}

impl Wcs {
    /// Build a WCS from axes in array order. `pc` is the celestial PC matrix
    /// in (lon, lat) order; `None` means the identity.
    pub fn new(axes: Vec<WcsAxis>, pc: Option<[[f64; 2]; 2]>) -> Result<Self, WcsError> {
        let kinds: Vec<AxisKind> = axes.iter().map(|a| a.kind()).collect();

        let mut scales = Vec::with_capacity(axes.len());
        for (i, (axis, kind)) in axes.iter().zip(kinds.iter()).enumerate() {
            if axis.cdelt == 0.0 {
                return Err(WcsError::ZeroIncrement {
                    axis: i,
                    ctype: axis.ctype.clone(),
                });
            }
            match unit_scale(*kind, &axis.cunit) {
                Some(s) => scales.push(s),
                None => {
                    return Err(WcsError::UnknownUnit {
                        axis: i,
                        ctype: axis.ctype.clone(),
                        unit: axis.cunit.clone(),
                    })
                }
            }
        }

        let lons: Vec<usize> = (0..axes.len())
            .filter(|&i| kinds[i] == AxisKind::Longitude)
            .collect();
        let lats: Vec<usize> = (0..axes.len())
            .filter(|&i| kinds[i] == AxisKind::Latitude)
            .collect();
        let celestial = match (lons.as_slice(), lats.as_slice()) {
            ([], []) => None,
            ([lon], [lat]) => Some((*lon, *lat)),
            _ => {
                return Err(WcsError::UnpairedCelestialAxes {
                    longitudes: lons.len(),
                    latitudes: lats.len(),
                })
            }
        };

        let pc = pc.unwrap_or([[1.0, 0.0], [0.0, 1.0]]);
        let det = pc[0][0] * pc[1][1] - pc[0][1] * pc[1][0];
        if det.abs() < 1e-12 {
            return Err(WcsError::SingularMatrix);
        }

        Ok(Self {
            axes,
            kinds,
            scales,
            celestial,
            pc,
        })
    }

    /// The TAN transform of the celestial pair, with CDELT and CRVAL in
    /// degrees.
    fn tan_transform(&self, lon_ax: usize, lat_ax: usize) -> TanTransform {
        let lon = &self.axes[lon_ax];
        let lat = &self.axes[lat_ax];
        let img2proj = WcsImgXY2ProjXY::from_pc(
            lon.crpix,
            lat.crpix,
            self.pc[0][0],
            self.pc[0][1],
            self.pc[1][0],
            self.pc[1][1],
            lon.cdelt * self.scales[lon_ax],
            lat.cdelt * self.scales[lat_ax],
        );
        let mut proj = CenteredProjection::new(Tan::new());
        proj.set_proj_center_from_lonlat(&LonLat::new(
            (lon.crval * self.scales[lon_ax]).to_radians(),
            (lat.crval * self.scales[lat_ax]).to_radians(),
        ));
        Img2Celestial::new(img2proj, proj)
    }

    /// The number of axes.
    pub fn naxis(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[WcsAxis] {
        &self.axes
    }

    pub fn kinds(&self) -> &[AxisKind] {
        &self.kinds
    }

    pub fn pc(&self) -> [[f64; 2]; 2] {
        self.pc
    }

    /// The expected array shape (numpy order).
    pub fn array_shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.len).collect()
    }

    /// Are array axes `a` and `b` coupled, i.e. does moving along one change
    /// the world coordinate of the other?
    pub fn correlated(&self, a: usize, b: usize) -> bool {
        a == b || (self.kinds[a].is_celestial() && self.kinds[b].is_celestial())
    }

    fn check_len(&self, values: &[f64]) -> Result<(), WcsError> {
        if values.len() != self.naxis() {
            return Err(WcsError::DimensionMismatch {
                expected: self.naxis(),
                got: values.len(),
            });
        }
        Ok(())
    }

    /// Zero-indexed array indices (one per axis, array order) to world values
    /// (one per axis, array order, canonical units).
    pub fn array_index_to_world_values(&self, indices: &[f64]) -> Result<Vec<f64>, WcsError> {
        self.check_len(indices)?;

        let mut world = Vec::with_capacity(self.naxis());
        for (i, axis) in self.axes.iter().enumerate() {
            let linear = axis.crval + axis.cdelt * (indices[i] + 1.0 - axis.crpix);
            world.push(linear * self.scales[i]);
        }

        if let Some((lon_ax, lat_ax)) = self.celestial {
            let pixel = ImgXY::new(indices[lon_ax] + 1.0, indices[lat_ax] + 1.0);
            let lonlat = self
                .tan_transform(lon_ax, lat_ax)
                .img2lonlat(&pixel)
                .ok_or(WcsError::NoWorldCoordinate {
                    x: pixel.x(),
                    y: pixel.y(),
                })?;
            world[lon_ax] = wrap_longitude(lonlat.lon().to_degrees());
            world[lat_ax] = lonlat.lat().to_degrees();
        }

        Ok(world)
    }

    /// The inverse of [`Wcs::array_index_to_world_values`]. The indices are
    /// fractional; rounding is up to the caller.
    pub fn world_values_to_array_index(&self, world: &[f64]) -> Result<Vec<f64>, WcsError> {
        self.check_len(world)?;

        let mut indices = Vec::with_capacity(self.naxis());
        for (i, axis) in self.axes.iter().enumerate() {
            let linear = world[i] / self.scales[i];
            indices.push((linear - axis.crval) / axis.cdelt + axis.crpix - 1.0);
        }

        if let Some((lon_ax, lat_ax)) = self.celestial {
            let (lon, lat) = (world[lon_ax], world[lat_ax]);
            let pixel = self
                .tan_transform(lon_ax, lat_ax)
                .lonlat2img(&LonLat::new(lon.to_radians(), lat.to_radians()))
                .ok_or(WcsError::Unprojectable { lon, lat })?;
            indices[lon_ax] = pixel.x() - 1.0;
            indices[lat_ax] = pixel.y() - 1.0;
        }

        Ok(indices)
    }
}

/// A view of a [`Wcs`] with some axes fixed to an index and others
/// restricted to a range. Fixed axes drop out of the pixel dimensions; their
/// world axes drop out too unless they are coupled to an axis that is still
/// free.
#[derive(Clone, Debug, PartialEq)]
pub struct SlicedWcs {
    wcs: Arc<Wcs>,
    selectors: Vec<AxisSelector>,
}

impl SlicedWcs {
    /// Restrict `wcs` with `selectors` in array order. Missing trailing
    /// selectors select the whole axis.
    pub fn new(wcs: Arc<Wcs>, selectors: &[AxisSelector]) -> Result<Self, WcsError> {
        if selectors.len() > wcs.naxis() {
            return Err(WcsError::TooManySelectors {
                naxis: wcs.naxis(),
                got: selectors.len(),
            });
        }
        let mut full = selectors.to_vec();
        full.resize(wcs.naxis(), AxisSelector::FULL);
        for (i, (sel, axis)) in full.iter().zip(wcs.axes().iter()).enumerate() {
            sel.validate(i, axis.len)?;
        }
        Ok(Self {
            wcs,
            selectors: full,
        })
    }

    /// The whole of `wcs`.
    pub fn full(wcs: Arc<Wcs>) -> Self {
        let selectors = vec![AxisSelector::FULL; wcs.naxis()];
        Self { wcs, selectors }
    }

    /// Restrict this view further. `selectors` address the free axes of this
    /// view, and missing trailing selectors select the whole axis.
    pub fn restrict(&self, selectors: &[AxisSelector]) -> Result<Self, WcsError> {
        let free = self.free_axes();
        if selectors.len() > free.len() {
            return Err(WcsError::TooManySelectors {
                naxis: free.len(),
                got: selectors.len(),
            });
        }
        let shape = self.array_shape();
        let mut composed = self.selectors.clone();
        for (n, (&axis, sel)) in free.iter().zip(selectors.iter()).enumerate() {
            sel.validate(n, shape[n])?;
            composed[axis] = self.selectors[axis].compose(sel);
        }
        Ok(Self {
            wcs: Arc::clone(&self.wcs),
            selectors: composed,
        })
    }

    /// The transform this is a view of.
    pub fn base(&self) -> &Arc<Wcs> {
        &self.wcs
    }

    /// The selectors on the base transform, one per base axis.
    pub fn selectors(&self) -> &[AxisSelector] {
        &self.selectors
    }

    /// Base axes that are still free (not fixed to an index).
    fn free_axes(&self) -> Vec<usize> {
        self.selectors
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_range())
            .map(|(i, _)| i)
            .collect()
    }

    /// Base axes whose world coordinates are still reported, in array order.
    fn kept_world_axes(&self) -> Vec<usize> {
        let free = self.free_axes();
        (0..self.wcs.naxis())
            .filter(|&w| free.iter().any(|&p| self.wcs.correlated(w, p)))
            .collect()
    }

    pub fn pixel_n_dim(&self) -> usize {
        self.free_axes().len()
    }

    pub fn world_n_dim(&self) -> usize {
        self.kept_world_axes().len()
    }

    /// The shape of the free axes (numpy order).
    pub fn array_shape(&self) -> Vec<usize> {
        self.free_axes()
            .into_iter()
            .map(|a| self.selectors[a].len_on(self.wcs.axes()[a].len))
            .collect()
    }

    /// The kinds of the reported world axes, in world (FITS) order.
    pub fn world_axis_kinds(&self) -> Vec<AxisKind> {
        self.kept_world_axes()
            .into_iter()
            .rev()
            .map(|w| self.wcs.kinds()[w])
            .collect()
    }

    fn full_indices(&self, indices: &[f64]) -> Vec<f64> {
        let mut free = indices.iter();
        self.selectors
            .iter()
            .map(|sel| match sel {
                AxisSelector::Index(i) => *i as f64,
                AxisSelector::Range { start, .. } => {
                    *start as f64 + free.next().copied().unwrap_or(0.0)
                }
            })
            .collect()
    }

    /// Array indices of the free axes (array order) to the world values of
    /// the kept world axes (world order).
    pub fn array_index_to_world(&self, indices: &[f64]) -> Result<Vec<f64>, WcsError> {
        let n = self.pixel_n_dim();
        if indices.len() != n {
            return Err(WcsError::DimensionMismatch {
                expected: n,
                got: indices.len(),
            });
        }
        let world = self.wcs.array_index_to_world_values(&self.full_indices(indices))?;
        Ok(self
            .kept_world_axes()
            .into_iter()
            .rev()
            .map(|w| world[w])
            .collect())
    }

    /// World values of the kept world axes (world order) to fractional array
    /// indices of the free axes (array order).
    pub fn world_to_array_index(&self, world: &[f64]) -> Result<Vec<f64>, WcsError> {
        let kept = self.kept_world_axes();
        if world.len() != kept.len() {
            return Err(WcsError::DimensionMismatch {
                expected: kept.len(),
                got: world.len(),
            });
        }

        // Dropped world axes take the values at the fixed indices.
        let origin = vec![0.0; self.pixel_n_dim()];
        let mut full_world = self
            .wcs
            .array_index_to_world_values(&self.full_indices(&origin))?;
        for (&w, v) in kept.iter().rev().zip(world.iter()) {
            full_world[w] = *v;
        }

        let full = self.wcs.world_values_to_array_index(&full_world)?;
        Ok(self
            .free_axes()
            .into_iter()
            .map(|a| full[a] - self.selectors[a].start() as f64)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    /// (stokes, wavelength, y, x) with 8542 + 0.1*i Angstrom on the spectral
    /// axis and 0.5 arcsec pixels centred on (-300, 200) arcsec.
    fn crisp_4d() -> Arc<Wcs> {
        Arc::new(
            Wcs::new(
                vec![
                    WcsAxis::new("STOKES", "", 1.0, 1.0, 1.0, 4),
                    WcsAxis::new("WAVE", "m", 8542e-10, 0.1e-10, 1.0, 10),
                    WcsAxis::new("HPLT-TAN", "arcsec", 200.0, 0.5, 10.0, 20),
                    WcsAxis::new("HPLN-TAN", "arcsec", -300.0, 0.5, 15.0, 30),
                ],
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_axis_kinds() {
        assert_eq!(AxisKind::from_ctype("HPLN-TAN"), AxisKind::Longitude);
        assert_eq!(AxisKind::from_ctype("HPLT-TAN"), AxisKind::Latitude);
        assert_eq!(AxisKind::from_ctype("WAVE"), AxisKind::Spectral);
        assert_eq!(AxisKind::from_ctype("STOKES"), AxisKind::Stokes);
        assert_eq!(AxisKind::from_ctype("TIME"), AxisKind::Other);
    }

    #[test]
    fn test_unpaired_celestial_axes() {
        let result = Wcs::new(
            vec![
                WcsAxis::new("WAVE", "m", 8542e-10, 0.1e-10, 1.0, 10),
                WcsAxis::new("HPLN-TAN", "arcsec", 0.0, 0.5, 1.0, 30),
            ],
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            WcsError::UnpairedCelestialAxes {
                longitudes: 1,
                latitudes: 0
            }
        );
    }

    #[test]
    fn test_bad_units_and_increments() {
        assert!(matches!(
            Wcs::new(vec![WcsAxis::new("WAVE", "furlong", 1.0, 1.0, 1.0, 2)], None),
            Err(WcsError::UnknownUnit { .. })
        ));
        assert!(matches!(
            Wcs::new(vec![WcsAxis::new("WAVE", "m", 1.0, 0.0, 1.0, 2)], None),
            Err(WcsError::ZeroIncrement { .. })
        ));
    }

    #[test]
    fn test_spectral_axis_is_linear_in_metres() {
        let wcs = crisp_4d();
        let world = wcs
            .array_index_to_world_values(&[0.0, 5.0, 0.0, 0.0])
            .unwrap();
        assert_relative_eq!(world[1], 8542.5e-10, max_relative = 1e-12);
        // Stokes I is 1.
        assert_abs_diff_eq!(world[0], 1.0);
    }

    #[test]
    fn test_reference_pixel_is_reference_value() {
        let wcs = crisp_4d();
        let world = wcs
            .array_index_to_world_values(&[0.0, 0.0, 9.0, 14.0])
            .unwrap();
        assert_abs_diff_eq!(world[3] * 3600.0, -300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(world[2] * 3600.0, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_round_trip_with_rotation() {
        let (s, c) = 0.3_f64.sin_cos();
        let wcs = Wcs::new(
            vec![
                WcsAxis::new("WAVE", "nm", 854.2, 0.01, 1.0, 10),
                WcsAxis::new("HPLT-TAN", "arcsec", 200.0, 0.5, 10.0, 20),
                WcsAxis::new("HPLN-TAN", "arcsec", -300.0, 0.5, 15.0, 30),
            ],
            Some([[c, -s], [s, c]]),
        )
        .unwrap();
        let indices = [3.0, 17.0, 2.0];
        let world = wcs.array_index_to_world_values(&indices).unwrap();
        let back = wcs.world_values_to_array_index(&world).unwrap();
        for (a, b) in indices.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_singular_pc() {
        let result = Wcs::new(
            vec![
                WcsAxis::new("HPLT-TAN", "arcsec", 0.0, 0.5, 1.0, 20),
                WcsAxis::new("HPLN-TAN", "arcsec", 0.0, 0.5, 1.0, 30),
            ],
            Some([[1.0, 1.0], [1.0, 1.0]]),
        );
        assert_eq!(result.unwrap_err(), WcsError::SingularMatrix);
    }

    #[test]
    fn test_small_offsets_are_nearly_linear() {
        // 20 pixels of 0.5 arcsec from the reference pixel; the projection is
        // flat to well under a milliarcsecond here.
        let wcs = crisp_4d();
        let world = wcs
            .array_index_to_world_values(&[0.0, 0.0, 19.0, 4.0])
            .unwrap();
        assert_abs_diff_eq!(world[3] * 3600.0, -305.0, epsilon = 1e-3);
        assert_abs_diff_eq!(world[2] * 3600.0, 205.0, epsilon = 1e-3);
    }

    #[test]
    fn test_far_side_is_unprojectable() {
        let wcs = crisp_4d();
        assert!(matches!(
            wcs.world_values_to_array_index(&[1.0, 8542e-10, 0.0, 179.0]),
            Err(WcsError::Unprojectable { .. })
        ));
    }

    #[test]
    fn test_longitude_is_wrapped() {
        assert_abs_diff_eq!(wrap_longitude(359.0), -1.0);
        assert_abs_diff_eq!(wrap_longitude(-181.0), 179.0);
        assert_abs_diff_eq!(wrap_longitude(180.0), 180.0);
        assert_abs_diff_eq!(wrap_longitude(-0.5), -0.5);

        // West of the reference point comes out negative, not near 360.
        let wcs = crisp_4d();
        let world = wcs
            .array_index_to_world_values(&[0.0, 0.0, 9.0, 0.0])
            .unwrap();
        assert_abs_diff_eq!(world[3] * 3600.0, -307.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sliced_dimensions() {
        let wcs = crisp_4d();
        let spectral = SlicedWcs::new(
            Arc::clone(&wcs),
            &[
                AxisSelector::Index(0),
                AxisSelector::FULL,
                AxisSelector::Index(0),
                AxisSelector::Index(0),
            ],
        )
        .unwrap();
        assert_eq!(spectral.pixel_n_dim(), 1);
        assert_eq!(spectral.world_n_dim(), 1);
        assert_eq!(spectral.array_shape(), vec![10]);
        assert_eq!(spectral.world_axis_kinds(), vec![AxisKind::Spectral]);

        // Fixing only y keeps both celestial world axes.
        let cut = SlicedWcs::new(
            Arc::clone(&wcs),
            &[
                AxisSelector::Index(0),
                AxisSelector::Index(0),
                AxisSelector::Index(3),
            ],
        )
        .unwrap();
        assert_eq!(cut.pixel_n_dim(), 1);
        assert_eq!(
            cut.world_axis_kinds(),
            vec![AxisKind::Longitude, AxisKind::Latitude]
        );
    }

    #[test]
    fn test_sliced_range_offsets() {
        let wcs = crisp_4d();
        let sub = SlicedWcs::new(
            Arc::clone(&wcs),
            &[
                AxisSelector::Index(0),
                AxisSelector::range(4, 8),
                AxisSelector::Index(0),
                AxisSelector::Index(0),
            ],
        )
        .unwrap();
        let w = sub.array_index_to_world(&[1.0]).unwrap();
        assert_relative_eq!(w[0], 8542.5e-10, max_relative = 1e-12);
        let i = sub.world_to_array_index(&w).unwrap();
        assert_abs_diff_eq!(i[0], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_selector_validation() {
        let wcs = crisp_4d();
        assert!(matches!(
            SlicedWcs::new(Arc::clone(&wcs), &[AxisSelector::Index(4)]),
            Err(WcsError::SelectorOutOfBounds { axis: 0, len: 4, .. })
        ));
        assert!(matches!(
            SlicedWcs::new(Arc::clone(&wcs), &[AxisSelector::FULL, AxisSelector::range(5, 11)]),
            Err(WcsError::SelectorOutOfBounds { axis: 1, .. })
        ));
        assert!(matches!(
            SlicedWcs::new(Arc::clone(&wcs), &[AxisSelector::FULL; 5]),
            Err(WcsError::TooManySelectors { naxis: 4, got: 5 })
        ));
    }

    #[test]
    fn test_restrict_composes() {
        let wcs = crisp_4d();
        let first = SlicedWcs::new(
            Arc::clone(&wcs),
            &[AxisSelector::Index(1), AxisSelector::range(2, 9)],
        )
        .unwrap();
        // Free axes of `first` are (wavelength, y, x).
        let second = first
            .restrict(&[
                AxisSelector::range(1, 3),
                AxisSelector::Index(5),
                AxisSelector::FULL,
            ])
            .unwrap();
        assert_eq!(
            second.selectors(),
            &[
                AxisSelector::Index(1),
                AxisSelector::range(3, 5),
                AxisSelector::Index(5),
                AxisSelector::FULL,
            ]
        );
        assert_eq!(second.array_shape(), vec![2, 30]);

        // An open range inherits the end of the outer range.
        let third = first.restrict(&[AxisSelector::Range { start: 2, end: None }]).unwrap();
        assert_eq!(third.selectors()[1], AxisSelector::range(4, 9));
    }

    #[test]
    fn test_dimension_mismatch() {
        let wcs = crisp_4d();
        let full = SlicedWcs::full(Arc::clone(&wcs));
        assert_eq!(
            full.array_index_to_world(&[0.0, 0.0]).unwrap_err(),
            WcsError::DimensionMismatch {
                expected: 4,
                got: 2
            }
        );
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(AxisSelector::Index(3).to_string(), "3");
        assert_eq!(AxisSelector::FULL.to_string(), ":");
        assert_eq!(AxisSelector::range(2, 7).to_string(), "2:7");
        assert_eq!(AxisSelector::Range { start: 2, end: None }.to_string(), "2:");
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(
            AxisSelector::parse_list("0,:,10:20,5").unwrap(),
            vec![
                AxisSelector::Index(0),
                AxisSelector::FULL,
                AxisSelector::range(10, 20),
                AxisSelector::Index(5),
            ]
        );
        assert_eq!(
            ":7".parse::<AxisSelector>().unwrap(),
            AxisSelector::range(0, 7)
        );
        assert_eq!(
            " 3: ".parse::<AxisSelector>().unwrap(),
            AxisSelector::Range { start: 3, end: None }
        );
        for bad in &["", "a", "1:2:3", "-1", "1.5"] {
            assert_eq!(
                bad.parse::<AxisSelector>(),
                Err(WcsError::BadSelector(bad.to_string()))
            );
        }
    }
}
