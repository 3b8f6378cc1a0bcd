// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Several observations of the same field, e.g. one per spectral line.
 */

use std::fmt;
use std::path::Path;

use itertools::Itertools;

use crate::fits::{read_observation, FitsError};
use crate::observation::{Observation, ObservationKind, WavelengthSource};

#[derive(Clone, Debug, Default)]
pub struct ObservationSequence {
    observations: Vec<Observation>,
}

impl ObservationSequence {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Read every file as the same kind of observation.
    pub fn from_files<T: AsRef<Path>>(
        files: &[T],
        kind: ObservationKind,
    ) -> Result<Self, FitsError> {
        let observations = files
            .iter()
            .map(|f| read_observation(f, kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(observations))
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Observation> {
        self.observations.iter()
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }
}

impl<'a> IntoIterator for &'a ObservationSequence {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

impl fmt::Display for ObservationSequence {
    /// The date, time and pointing come from the first member; everything
    /// else is listed per member.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = match self.observations.first() {
            Some(o) => o,
            None => return write!(f, "CRISP Observation\n------------------\n(empty)"),
        };
        let header_value = |o: &Observation, key: &str| {
            o.header()
                .get(key)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        };
        let list = |key: &str| {
            self.observations
                .iter()
                .map(|o| header_value(o, key))
                .join(", ")
        };

        let date_avg = header_value(first, "DATE-AVG");
        let (date, time) = date_avg.split_once('T').unwrap_or((date_avg.as_str(), ""));
        let centres = self
            .observations
            .iter()
            .map(|o| match o.header().get("TWAVE1").and_then(|v| v.as_f64()) {
                Some(w) => format!("{:.2}", w),
                None => "unknown".to_string(),
            })
            .join(", ");
        let shapes = self
            .observations
            .iter()
            .map(|o| format!("[{}]", o.shape().iter().join(", ")))
            .join(", ");

        writeln!(f, "CRISP Observation")?;
        writeln!(f, "------------------")?;
        writeln!(f, "{} {}", date, time)?;
        writeln!(f)?;
        writeln!(f, "Observed: [{}]", list("WDESC1"))?;
        writeln!(f, "Centre wavelength: [{}]", centres)?;
        writeln!(f, "Wavelengths sampled: [{}]", list("WWIDTH1"))?;
        writeln!(
            f,
            "Pointing: ({}, {})",
            header_value(first, "CRVAL1"),
            header_value(first, "CRVAL2")
        )?;
        write!(f, "Shape: [{}]", shapes)?;

        let tables: Vec<&Vec<f64>> = self
            .observations
            .iter()
            .filter_map(|o| match o.wavelength_source() {
                WavelengthSource::Sampled(t) => Some(t),
                WavelengthSource::Transform => None,
            })
            .collect();
        if !tables.is_empty() {
            write!(
                f,
                "\nSampled wavelengths: [{}]",
                tables
                    .iter()
                    .map(|t| format!("[{}]", t.iter().map(|w| format!("{:.3}", w)).join(", ")))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}
