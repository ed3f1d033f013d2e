//! Equatorial → horizontal coordinates for an observer at an instant.
//!
//! Sidereal time and the spherical trigonometry come from the `astro` crate
//! (Meeus' algorithms). Azimuths are converted from Meeus' south-based
//! convention to the compass convention, clockwise from north.

use crate::domain::model::{CatalogObject, HorizontalPosition};
use crate::domain::observer::Observer;
use astro::angle::limit_to_two_PI;
use astro::coords::{alt_frm_eq, az_frm_eq};
use astro::time::{julian_day, mn_sidr, CalType, Date};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

/// `Observer` rejects years outside the `i16` range `astro` works with.
pub fn julian_day_from_datetime(instant: &DateTime<Utc>) -> f64 {
    let seconds = instant.num_seconds_from_midnight() as f64
        + instant.nanosecond() as f64 / 1_000_000_000.0;
    let date = Date {
        year: instant.year() as i16,
        month: instant.month() as u8,
        decimal_day: instant.day() as f64 + seconds / 86_400.0,
        cal_type: CalType::Gregorian,
    };
    julian_day(&date)
}

/// Greenwich mean sidereal time in radians, `[0, 2π)`.
pub fn greenwich_mean_sidereal_time(instant: &DateTime<Utc>) -> f64 {
    limit_to_two_PI(mn_sidr(julian_day_from_datetime(instant)))
}

/// The observer's rotation state, computed once per chart.
#[derive(Debug, Clone, Copy)]
pub struct ObserverFrame {
    latitude: f64,
    longitude: f64,
    sidereal_time: f64,
}

impl ObserverFrame {
    pub fn new(observer: &Observer) -> Self {
        Self {
            latitude: observer.latitude().to_radians(),
            longitude: observer.longitude().to_radians(),
            sidereal_time: greenwich_mean_sidereal_time(&observer.timestamp()),
        }
    }

    /// Local sidereal time in hours.
    pub fn local_sidereal_hours(&self) -> f64 {
        limit_to_two_PI(self.sidereal_time + self.longitude).to_degrees() / 15.0
    }

    pub fn horizontal(&self, ra_hours: f64, dec_degrees: f64) -> HorizontalPosition {
        let ra = (ra_hours * 15.0).to_radians();
        let dec = dec_degrees.to_radians();
        let hour_angle = self.sidereal_time + self.longitude - ra;

        let altitude = alt_frm_eq(hour_angle, dec, self.latitude);
        let azimuth = limit_to_two_PI(az_frm_eq(hour_angle, dec, self.latitude) + PI);

        HorizontalPosition {
            altitude: altitude.to_degrees(),
            azimuth: azimuth.to_degrees(),
        }
    }

    pub fn locate(&self, object: &CatalogObject) -> HorizontalPosition {
        self.horizontal(object.ra_hours, object.dec_degrees)
    }
}
