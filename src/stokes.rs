// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Stokes parameters and the strings used to pick them.
 */

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::error::CoordinateError;

/// One of the four polarisation states, in the order they are stored along
/// the Stokes axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stokes {
    I,
    Q,
    U,
    V,
}

impl Stokes {
    pub const ALL: [Stokes; 4] = [Stokes::I, Stokes::Q, Stokes::U, Stokes::V];

    /// The position of this parameter along the Stokes axis.
    pub fn index(self) -> usize {
        match self {
            Stokes::I => 0,
            Stokes::Q => 1,
            Stokes::U => 2,
            Stokes::V => 3,
        }
    }

    /// The usual label of this parameter's data.
    pub fn label(self) -> &'static str {
        match self {
            Stokes::I => "Intensity",
            Stokes::Q => "Q",
            Stokes::U => "U",
            Stokes::V => "V",
        }
    }
}

impl TryFrom<char> for Stokes {
    type Error = CoordinateError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'I' => Ok(Stokes::I),
            'Q' => Ok(Stokes::Q),
            'U' => Ok(Stokes::U),
            'V' => Ok(Stokes::V),
            _ => Err(CoordinateError::NotAStokesProfile(c.to_string())),
        }
    }
}

impl FromStr for Stokes {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Stokes::try_from(c),
            _ => Err(CoordinateError::NotAStokesProfile(s.to_string())),
        }
    }
}

impl fmt::Display for Stokes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Stokes::I => 'I',
            Stokes::Q => 'Q',
            Stokes::U => 'U',
            Stokes::V => 'V',
        };
        write!(f, "{}", c)
    }
}

/// Which Stokes profiles to work with. Either "all" (all four), or an
/// ordered combination of I, Q, U and V with at most three members, e.g.
/// "IQU", "QV" or "U".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StokesSelector(Vec<Stokes>);

impl StokesSelector {
    pub fn all() -> Self {
        StokesSelector(Stokes::ALL.to_vec())
    }

    pub fn parse(s: &str) -> Result<Self, CoordinateError> {
        if s == "all" {
            return Ok(Self::all());
        }

        let chars: Vec<char> = s.chars().collect();
        if chars.len() == 1 {
            return Ok(StokesSelector(vec![Stokes::try_from(chars[0])?]));
        }

        let invalid = || CoordinateError::InvalidStokesSelector(s.to_string());
        // "IQUV" is spelled "all".
        if chars.is_empty() || chars.len() > 3 {
            return Err(invalid());
        }
        let mut profiles = Vec::with_capacity(chars.len());
        for c in chars {
            let p = Stokes::try_from(c).map_err(|_| invalid())?;
            // Members must be strictly increasing, so no repeats either.
            if profiles.last().map_or(false, |last| *last >= p) {
                return Err(invalid());
            }
            profiles.push(p);
        }
        Ok(StokesSelector(profiles))
    }

    pub fn profiles(&self) -> &[Stokes] {
        &self.0
    }

    pub fn is_all(&self) -> bool {
        self.0.len() == 4
    }
}

impl FromStr for StokesSelector {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StokesSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return write!(f, "all");
        }
        for p in &self.0 {
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}
