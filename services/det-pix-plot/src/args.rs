//! Command-line resolution.
//!
//! The accepted grammar is the historical one: single-dash options that may
//! be abbreviated down to two characters (`-s`, `-sc`, ... `-scale`), each
//! taking the next token as its value, plus a positional file name where the
//! last one wins. Anything unexpected means "print usage and exit cleanly".
//!
//! Tokens are first reduced to the last value given for each option and then
//! handed to a `clap` parser in long-option form, which owns value validation
//! and defaults.

use std::path::PathBuf;

use clap::Parser;
use det_pix::Quantity;
use tracing::debug;

pub const BIN_NAME: &str = "det-pix-plot";
pub const DEFAULT_INPUT: &str = "det.pix";
pub const DEFAULT_SCALE: f64 = 1e3;

pub const USAGE: &str = "\
Usage:
    det-pix-plot {-scale <scale>} {-plot <who_to_plot>} {<data_file_name>}
  <who_to_plot> = x         # Intensity of x-polarized photons
                = y         # Intensity of y-polarized photons
                = i         # Total intensity (sum of x & y polarizations)
                = e         # Energy
  Defaults:
    <scale>          = 1e3
    <data_file_name> = det.pix
    <who_to_plot>    = i
";

/// What the program was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Run(Invocation),
    Usage,
}

/// A fully resolved plotting request.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub scale: f64,
    pub quantity: Quantity,
    pub input: PathBuf,
}

#[derive(Parser, Debug)]
#[command(name = BIN_NAME)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct CliArgs {
    /// Multiplier applied to physical axis extents
    #[arg(long, default_value_t = DEFAULT_SCALE, value_parser = parse_scale)]
    scale: f64,

    /// Quantity to plot: x, y, i or e
    #[arg(long, default_value_t = Quantity::Intensity)]
    plot: Quantity,

    /// det.pix data file
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,
}

impl From<CliArgs> for Invocation {
    fn from(args: CliArgs) -> Self {
        Self {
            scale: args.scale,
            quantity: args.plot,
            input: args.input,
        }
    }
}

fn parse_scale(value: &str) -> Result<f64, String> {
    let scale: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("scale must be a finite positive number, got {value}"));
    }
    Ok(scale)
}

/// `token` abbreviates `option` if it is at least two characters of it.
fn abbreviates(token: &str, option: &str) -> bool {
    token.len() >= 2 && option.starts_with(token)
}

/// Resolve the arguments that follow the program name.
///
/// Never touches the file system.
pub fn resolve<I, S>(tokens: I) -> Resolution
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tokens = tokens.into_iter().map(Into::into);
    let mut scale: Option<String> = None;
    let mut plot: Option<String> = None;
    let mut input: Option<String> = None;

    while let Some(token) = tokens.next() {
        let (name, slot) = if abbreviates(&token, "-scale") {
            ("scale", &mut scale)
        } else if abbreviates(&token, "-plot") {
            ("plot", &mut plot)
        } else if token.is_empty() || token.starts_with('-') {
            debug!(%token, "Unrecognized argument");
            return Resolution::Usage;
        } else {
            input = Some(token);
            continue;
        };

        match tokens.next() {
            Some(value) => *slot = Some(value),
            None => {
                debug!(option = name, "Option is missing its value");
                return Resolution::Usage;
            }
        }
    }

    let mut argv = vec![BIN_NAME.to_string()];
    if let Some(scale) = scale {
        argv.push(format!("--scale={scale}"));
    }
    if let Some(plot) = plot {
        argv.push(format!("--plot={plot}"));
    }
    if let Some(input) = input {
        argv.push("--".to_string());
        argv.push(input);
    }

    match CliArgs::try_parse_from(argv) {
        Ok(args) => Resolution::Run(args.into()),
        Err(err) => {
            debug!(error = %err, "Rejected arguments");
            Resolution::Usage
        }
    }
}
