use crate::domain::model::HorizontalPosition;
use serde::{Deserialize, Serialize};

/// Largest zenith distance the stereographic projection will place.
const STEREOGRAPHIC_LIMIT_DEG: f64 = 179.0;

/// Zenith-centred map projections. In all of them the horizon lies on the
/// unit circle, north is up and east is left, as seen looking up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Stereographic,
    /// Azimuthal equidistant: radius grows linearly with zenith distance.
    Polar,
    /// Hemisphere seen from outside; cannot show anything below the horizon.
    Orthographic,
}

impl Projection {
    /// Maps a horizontal position to plane coordinates, or `None` when the
    /// projection cannot represent it.
    pub fn project(&self, position: &HorizontalPosition) -> Option<(f64, f64)> {
        let zenith_distance = position.zenith_distance();

        let radius = match self {
            Projection::Stereographic => {
                if zenith_distance >= STEREOGRAPHIC_LIMIT_DEG {
                    return None;
                }
                (zenith_distance.to_radians() / 2.0).tan()
            }
            Projection::Polar => zenith_distance / 90.0,
            Projection::Orthographic => {
                if zenith_distance > 90.0 {
                    return None;
                }
                zenith_distance.to_radians().sin()
            }
        };

        let azimuth = position.azimuth.to_radians();
        Some((-radius * azimuth.sin(), radius * azimuth.cos()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Projection::Stereographic => "stereographic",
            Projection::Polar => "polar",
            Projection::Orthographic => "orthographic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Projection; 3] = [
        Projection::Stereographic,
        Projection::Polar,
        Projection::Orthographic,
    ];

    fn at(altitude: f64, azimuth: f64) -> HorizontalPosition {
        HorizontalPosition { altitude, azimuth }
    }

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn test_zenith_maps_to_centre() {
        for projection in ALL {
            assert_close(projection.project(&at(90.0, 123.0)).unwrap(), (0.0, 0.0));
        }
    }

    #[test]
    fn test_horizon_maps_to_unit_circle_with_north_up_east_left() {
        for projection in ALL {
            assert_close(projection.project(&at(0.0, 0.0)).unwrap(), (0.0, 1.0));
            assert_close(projection.project(&at(0.0, 90.0)).unwrap(), (-1.0, 0.0));
            assert_close(projection.project(&at(0.0, 180.0)).unwrap(), (0.0, -1.0));
            assert_close(projection.project(&at(0.0, 270.0)).unwrap(), (1.0, 0.0));
        }
    }

    #[test]
    fn test_radius_profiles_differ() {
        let position = at(45.0, 0.0);
        let stereographic = Projection::Stereographic.project(&position).unwrap().1;
        let polar = Projection::Polar.project(&position).unwrap().1;
        let orthographic = Projection::Orthographic.project(&position).unwrap().1;

        assert!((stereographic - (22.5f64).to_radians().tan()).abs() < 1e-12);
        assert!((polar - 0.5).abs() < 1e-12);
        assert!((orthographic - (45.0f64).to_radians().sin()).abs() < 1e-12);
    }

    #[test]
    fn test_below_horizon_handling() {
        let below = at(-30.0, 0.0);
        assert!(Projection::Orthographic.project(&below).is_none());
        assert!(Projection::Stereographic.project(&below).unwrap().1 > 1.0);
        assert!((Projection::Polar.project(&below).unwrap().1 - 120.0 / 90.0).abs() < 1e-12);
        assert!(Projection::Stereographic.project(&at(-89.5, 0.0)).is_none());
    }
}
