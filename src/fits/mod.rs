// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Read CRISP observations out of FITS files.
 *
 * The primary HDU holds the data cube, with the WCS described by the usual
 * CTYPEn, CUNITn, CRVALn, CDELTn, CRPIXn and PCi_j keywords. Non-uniformly
 * sampled observations keep their wavelengths [Angstrom] as an image in the
 * first extension HDU.
 */

pub mod error;

pub use error::FitsError;

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::FitsFile;
use log::debug;
use ndarray::{ArrayD, IxDyn};

use crate::observation::{Header, HeaderValue, Observation, ObservationKind, WavelengthSource};
use crate::wcs::{AxisKind, Wcs, WcsAxis};

/// Header keywords describing the observation (rather than its WCS) that are
/// kept in an [`Observation`]'s header, if present.
const STRING_KEYS: [&str; 3] = ["DATE-AVG", "WDESC1", "BUNIT"];
const FLOAT_KEYS: [&str; 3] = ["TWAVE1", "CRVAL1", "CRVAL2"];
const INT_KEYS: [&str; 1] = ["WWIDTH1"];

/// cfitsio's status for a keyword that isn't in the header.
const KEY_NO_EXIST: i32 = 202;

/// Read a required numeric key of the primary HDU. Only an absent key is
/// `MissingKey`; anything else (e.g. a value that isn't a number) is passed
/// on from `fitsio`.
fn read_f64(fptr: &mut FitsFile, hdu: &FitsHdu, key: &str) -> Result<f64, FitsError> {
    match hdu.read_key::<f64>(fptr, key) {
        Ok(v) => Ok(v),
        Err(fitsio::errors::Error::Fits(e)) if e.status == KEY_NO_EXIST => {
            Err(FitsError::MissingKey {
                key: key.to_string(),
                hdu: 0,
            })
        }
        Err(e) => Err(FitsError::Fitsio(e)),
    }
}

fn read_optional_string(fptr: &mut FitsFile, hdu: &FitsHdu, key: &str) -> Option<String> {
    hdu.read_key::<String>(fptr, key)
        .ok()
        .map(|s| s.trim().to_string())
}

/// Build the WCS of an image with `shape` (numpy order) from its header.
/// FITS axis `n` is array axis `naxis - n`.
fn read_wcs(fptr: &mut FitsFile, hdu: &FitsHdu, shape: &[usize]) -> Result<Wcs, FitsError> {
    let naxis = shape.len();
    let mut axes = Vec::with_capacity(naxis);
    for (i, &len) in shape.iter().enumerate() {
        let n = naxis - i;
        let ctype = read_optional_string(fptr, hdu, &format!("CTYPE{}", n)).ok_or_else(|| {
            FitsError::MissingKey {
                key: format!("CTYPE{}", n),
                hdu: 0,
            }
        })?;
        let cunit = read_optional_string(fptr, hdu, &format!("CUNIT{}", n)).unwrap_or_default();
        let crval = read_f64(fptr, hdu, &format!("CRVAL{}", n))?;
        let cdelt = read_f64(fptr, hdu, &format!("CDELT{}", n))?;
        let crpix = read_f64(fptr, hdu, &format!("CRPIX{}", n))?;
        axes.push(WcsAxis::new(&ctype, &cunit, crval, cdelt, crpix, len));
    }

    // The PC matrix only matters for the celestial pair. Missing elements
    // take their default (identity) values.
    let fits_number = |kind: AxisKind| {
        axes.iter()
            .position(|a| a.kind() == kind)
            .map(|i| naxis - i)
    };
    let pc = match (
        fits_number(AxisKind::Longitude),
        fits_number(AxisKind::Latitude),
    ) {
        (Some(lon), Some(lat)) => {
            let mut pc = [[1.0, 0.0], [0.0, 1.0]];
            for (r, &i) in [lon, lat].iter().enumerate() {
                for (c, &j) in [lon, lat].iter().enumerate() {
                    if let Ok(v) = hdu.read_key::<f64>(fptr, &format!("PC{}_{}", i, j)) {
                        pc[r][c] = v;
                    }
                }
            }
            Some(pc)
        }
        _ => None,
    };

    Ok(Wcs::new(axes, pc)?)
}

fn read_header(fptr: &mut FitsFile, hdu: &FitsHdu) -> Header {
    let mut header = Header::new();
    for key in STRING_KEYS.iter() {
        if let Some(v) = read_optional_string(fptr, hdu, key) {
            header.insert(key.to_string(), HeaderValue::Str(v));
        }
    }
    for key in FLOAT_KEYS.iter() {
        if let Ok(v) = hdu.read_key::<f64>(fptr, key) {
            header.insert(key.to_string(), HeaderValue::Float(v));
        }
    }
    for key in INT_KEYS.iter() {
        if let Ok(v) = hdu.read_key::<i64>(fptr, key) {
            header.insert(key.to_string(), HeaderValue::Int(v));
        }
    }
    header
}

fn image_shape(hdu: &FitsHdu, index: usize) -> Result<Vec<usize>, FitsError> {
    match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => Ok(shape.clone()),
        _ => Err(FitsError::NotAnImage { hdu: index }),
    }
}

/// Read an observation from a CRISP FITS file. For
/// [`ObservationKind::NonUniform`] the sampled wavelengths are read from the
/// first extension HDU.
pub fn read_observation<T: AsRef<Path>>(
    file: T,
    kind: ObservationKind,
) -> Result<Observation, FitsError> {
    let file = file.as_ref();
    if !file.exists() {
        return Err(std::io::Error::new(
            ErrorKind::NotFound,
            format!("{} does not exist", file.display()),
        )
        .into());
    }

    let mut fptr = FitsFile::open(file)?;
    let hdu = fptr.hdu(0)?;
    let shape = image_shape(&hdu, 0)?;
    let naxis: i64 = hdu.read_key(&mut fptr, "NAXIS")?;
    if naxis as usize != shape.len() {
        return Err(FitsError::BadNaxis {
            naxis,
            ndim: shape.len(),
        });
    }
    debug!("{}: primary HDU has shape {:?}", file.display(), shape);

    let wcs = read_wcs(&mut fptr, &hdu, &shape)?;
    let header = read_header(&mut fptr, &hdu);
    let data: Vec<f32> = hdu.read_image(&mut fptr)?;
    let data = ArrayD::from_shape_vec(IxDyn(&shape), data)?;

    let wavelengths = match kind {
        ObservationKind::NonUniform => {
            let table_hdu = fptr.hdu(1)?;
            image_shape(&table_hdu, 1)?;
            let table: Vec<f64> = table_hdu.read_image(&mut fptr)?;
            debug!("Read {} sampled wavelengths", table.len());
            WavelengthSource::Sampled(table)
        }
        _ => WavelengthSource::Transform,
    };

    Ok(Observation::new(data, header, Arc::new(wcs), kind, wavelengths)?)
}
