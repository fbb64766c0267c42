//! Selectable per-pixel quantities and their data columns.

use std::fmt;
use std::str::FromStr;

/// Column holding the x pixel index.
pub const X_INDEX_COLUMN: usize = 0;

/// Column holding the y pixel index.
pub const Y_INDEX_COLUMN: usize = 1;

/// The physical quantity to bin and plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quantity {
    /// Intensity of x-polarized photons (`x`)
    XIntensity,
    /// Intensity of y-polarized photons (`y`)
    YIntensity,
    /// Total intensity, the sum of both polarizations (`i`)
    #[default]
    Intensity,
    /// Photon energy (`e`)
    Energy,
}

impl Quantity {
    /// Every selectable quantity, in plot-mode order.
    pub const ALL: [Quantity; 4] = [
        Quantity::XIntensity,
        Quantity::YIntensity,
        Quantity::Intensity,
        Quantity::Energy,
    ];

    /// Zero-based data column holding this quantity.
    pub fn column(self) -> usize {
        match self {
            Self::XIntensity => 4,
            Self::YIntensity => 6,
            Self::Intensity => 8,
            Self::Energy => 10,
        }
    }

    /// Single-letter plot-mode code.
    pub fn code(self) -> char {
        match self {
            Self::XIntensity => 'x',
            Self::YIntensity => 'y',
            Self::Intensity => 'i',
            Self::Energy => 'e',
        }
    }

    /// Human readable name, used for figure titles.
    pub fn description(self) -> &'static str {
        match self {
            Self::XIntensity => "x-polarized intensity",
            Self::YIntensity => "y-polarized intensity",
            Self::Intensity => "total intensity",
            Self::Energy => "energy",
        }
    }
}

impl FromStr for Quantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Self::XIntensity),
            "y" => Ok(Self::YIntensity),
            "i" => Ok(Self::Intensity),
            "e" => Ok(Self::Energy),
            other => Err(format!(
                "unknown plot mode '{other}', expected one of x, y, i, e"
            )),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_modes_select_columns() {
        let columns: Vec<usize> = ["x", "y", "i", "e"]
            .iter()
            .map(|code| code.parse::<Quantity>().unwrap().column())
            .collect();
        assert_eq!(columns, vec![4, 6, 8, 10]);
    }

    #[test]
    fn test_unknown_plot_mode_rejected() {
        assert!("z".parse::<Quantity>().is_err());
        assert!("X".parse::<Quantity>().is_err());
        assert!("".parse::<Quantity>().is_err());
        assert!("ix".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_code_round_trips_through_display() {
        for quantity in Quantity::ALL {
            assert_eq!(quantity.to_string().parse::<Quantity>(), Ok(quantity));
        }
    }

    #[test]
    fn test_default_is_total_intensity() {
        assert_eq!(Quantity::default(), Quantity::Intensity);
    }
}
