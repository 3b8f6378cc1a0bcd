// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use criterion::*;
use ndarray::{ArrayD, IxDyn};

use crispy::*;

/// A CRISP-like (stokes, wavelength, y, x) cube: 4 x 15 x 240 x 240.
fn crisp_cube() -> Observation {
    let wcs = Wcs::new(
        vec![
            WcsAxis::new("STOKES", "", 1.0, 1.0, 1.0, 4),
            WcsAxis::new("WAVE", "nm", 854.1, 0.01, 1.0, 15),
            WcsAxis::new("HPLT-TAN", "arcsec", -380.0, 0.057, 120.0, 240),
            WcsAxis::new("HPLN-TAN", "arcsec", 520.0, 0.057, 120.0, 240),
        ],
        Some([[0.998, -0.06], [0.06, 0.998]]),
    )
    .unwrap();
    Observation::new(
        ArrayD::zeros(IxDyn(&[4, 15, 240, 240])),
        Header::new(),
        Arc::new(wcs),
        ObservationKind::Narrowband,
        WavelengthSource::Transform,
    )
    .unwrap()
}

fn resolve_wavelengths(c: &mut Criterion) {
    let obs = crisp_cube()
        .slice(&[AxisSelector::Index(0), AxisSelector::range(3, 12)])
        .unwrap();
    let indices: Vec<usize> = (0..9).collect();
    c.bench_function("resolving wavelengths of a sliced cube", |b| {
        b.iter(|| obs.waves(black_box(&indices)).unwrap())
    });
}

fn spatial_round_trip(c: &mut Criterion) {
    let obs = crisp_cube().select_stokes(Stokes::V).unwrap();
    c.bench_function("helioprojective round trip", |b| {
        b.iter(|| {
            let (lon, lat) = obs.to_lonlat(black_box(123.4), black_box(67.8)).unwrap();
            obs.from_lonlat(lon, lat).unwrap()
        })
    });
}

criterion_group!(benches, resolve_wavelengths, spatial_round_trip);
criterion_main!(benches);
