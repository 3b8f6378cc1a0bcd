// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use anyhow::ensure;
use log::debug;
use structopt::{clap::AppSettings, StructOpt};

use crispy::fits::read_observation;
use crispy::spectral::vac_to_air;
use crispy::*;

/// Convert between array indices and world coordinates (wavelengths and
/// helioprojective coordinates) of a CRISP observation.
#[derive(StructOpt, Debug)]
#[structopt(name = "crispy-coords", global_settings = &[AppSettings::ColoredHelp, AppSettings::ArgRequiredElseHelp, AppSettings::AllowNegativeNumbers])]
struct Opts {
    /// Print more information. Can be given more than once. RUST_LOG
    /// overrides this.
    #[structopt(short, long, parse(from_occurrences), global = true)]
    verbose: u8,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Print a summary of the observation.
    Info {
        #[structopt(flatten)]
        input: Input,
    },

    /// Print the wavelengths [Angstrom] at indices along the wavelength axis.
    Wave {
        #[structopt(flatten)]
        input: Input,

        /// Convert the (vacuum) wavelengths to wavelengths in air.
        #[structopt(long)]
        air: bool,

        /// Also print each wavelength's offset from the middle of the
        /// wavelength axis. With --air, both are in air.
        #[structopt(short, long)]
        delta: bool,

        /// The indices along the wavelength axis.
        #[structopt(required = true)]
        indices: Vec<usize>,
    },

    /// Print the helioprojective (longitude, latitude) [arcsec] of a (y, x)
    /// array index.
    ToLonlat {
        #[structopt(flatten)]
        input: Input,

        y: f64,

        x: f64,
    },

    /// Print the (fractional) (y, x) array index of a helioprojective
    /// (longitude, latitude) [arcsec].
    FromLonlat {
        #[structopt(flatten)]
        input: Input,

        lon: f64,

        lat: f64,
    },
}

#[derive(StructOpt, Debug)]
struct Input {
    /// The path to the FITS file.
    #[structopt(parse(from_os_str))]
    file: PathBuf,

    /// Slice the data before doing anything else, with numpy-style
    /// comma-separated selectors, e.g. "0,:,100:200".
    #[structopt(short, long)]
    slice: Option<String>,

    /// The wavelengths aren't evenly spaced; read them from the first
    /// extension HDU.
    #[structopt(long)]
    non_uniform: bool,

    /// The file holds a wideband context image.
    #[structopt(long)]
    wideband: bool,
}

impl Input {
    fn read(&self) -> Result<Observation, anyhow::Error> {
        ensure!(
            self.file.exists(),
            "The file {} does not exist",
            self.file.display()
        );
        ensure!(
            !(self.non_uniform && self.wideband),
            "--non-uniform and --wideband can't be used together"
        );
        let kind = if self.non_uniform {
            ObservationKind::NonUniform
        } else if self.wideband {
            ObservationKind::Wideband
        } else {
            ObservationKind::Narrowband
        };
        let obs = read_observation(&self.file, kind)?;
        match &self.slice {
            None => Ok(obs),
            Some(s) => {
                let selectors = AxisSelector::parse_list(s)?;
                let sliced = obs.slice(&selectors)?;
                debug!(
                    "Sliced to shape {:?} ({:?})",
                    sliced.shape(),
                    sliced.provenance()
                );
                Ok(sliced)
            }
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<(), anyhow::Error> {
    let opts = Opts::from_args();
    init_logger(opts.verbose);

    match opts.cmd {
        Command::Info { input } => {
            let obs = input.read()?;
            println!("{}", obs);
        }

        Command::Wave {
            input,
            air,
            delta,
            indices,
        } => {
            let obs = input.read()?;
            let medium = |w: f64| if air { vac_to_air(w) } else { w };
            let waves = obs.waves(&indices)?;
            // Offsets are taken in the same medium as the wavelengths.
            let centre = if delta {
                Some(medium(resolver::central_wavelength(&obs)?))
            } else {
                None
            };
            for (i, w) in indices.iter().zip(waves) {
                let w = medium(w);
                match centre {
                    Some(c) => println!("{} {:.4} {:+.4}", i, w, w - c),
                    None => println!("{} {:.4}", i, w),
                }
            }
        }

        Command::ToLonlat { input, y, x } => {
            let obs = input.read()?;
            let (lon, lat) = obs.to_lonlat(y, x)?;
            println!("{:.4} {:.4}", lon, lat);
        }

        Command::FromLonlat { input, lon, lat } => {
            let obs = input.read()?;
            let (y, x) = obs.from_lonlat(lon, lat)?;
            println!("{:.4} {:.4}", y, x);
        }
    }

    Ok(())
}
