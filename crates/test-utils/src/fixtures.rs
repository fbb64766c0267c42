//! Common test fixtures for det.pix tests.
//!
//! This module provides pre-defined file content for scenarios that show
//! up across the workspace's tests.

/// Header geometries used across tests.
pub mod geometry {
    use crate::HeaderSpec;

    /// Active range -5..=5 on both axes with 10 µm pixels.
    pub const SMALL_SQUARE: HeaderSpec = HeaderSpec {
        nx_active_min: -5,
        nx_active_max: 5,
        ny_active_min: -5,
        ny_active_max: 5,
        dx_pixel: 0.01,
        dy_pixel: 0.01,
    };

    /// Wide, short detector (x span much larger than y span).
    pub const WIDE_STRIP: HeaderSpec = HeaderSpec {
        nx_active_min: -100,
        nx_active_max: 100,
        ny_active_min: -10,
        ny_active_max: 10,
        dx_pixel: 0.001,
        dy_pixel: 0.001,
    };

    /// Tall, narrow detector with unequal pitches.
    pub const TALL_STRIP: HeaderSpec = HeaderSpec {
        nx_active_min: 0,
        nx_active_max: 9,
        ny_active_min: 0,
        ny_active_max: 199,
        dx_pixel: 0.002,
        dy_pixel: 0.001,
    };
}

/// A det.pix file in the shape written by the tracking code, with
/// non-geometry parameters, comments and a blank line in the header.
pub const REALISTIC_HEADER: &str = "\
# Detector pixel data
master_input_file   = 'lattice/ring.bmad'
ix_detector_element = 17
is_photon_source    = T
is_beam_tracked     = F

nx_active_min       = -5
nx_active_max       = 5
ny_active_min       = -5
ny_active_max       = 5
dx_pixel            = 1.000000E-02
dy_pixel            = 1.000000E-02
";

/// Sentinel plus the column legend that follows it.
pub const TABLE_PREAMBLE: &str = "\
#-----------------------------------------------------------------------
#  ix   iy      x_pix      y_pix   Intens_x  Phase_x   Intens_y  Phase_y   Intens   N_photon  E_ave
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realistic_header_has_no_sentinel() {
        assert!(!REALISTIC_HEADER.lines().any(|l| l.starts_with("#--")));
        assert!(TABLE_PREAMBLE.starts_with("#--"));
    }

    #[test]
    fn test_geometries_are_ordered() {
        for header in [geometry::SMALL_SQUARE, geometry::WIDE_STRIP, geometry::TALL_STRIP] {
            assert!(header.nx_active_min <= header.nx_active_max);
            assert!(header.ny_active_min <= header.ny_active_max);
            assert!(header.dx_pixel > 0.0 && header.dy_pixel > 0.0);
        }
    }
}
