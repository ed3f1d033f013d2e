use crate::utils::error::{Result, StarmapError};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Where and when the sky is observed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observer {
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
    timestamp: DateTime<Utc>,
}

fn check_position(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(StarmapError::invalid_observer(
            "latitude",
            latitude,
            "must be between -90 and 90 degrees",
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(StarmapError::invalid_observer(
            "longitude",
            longitude,
            "must be between -180 and 180 degrees",
        ));
    }
    Ok(())
}

/// Sidereal time is computed with 16-bit calendar years.
fn check_year(timestamp: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if i16::try_from(timestamp.year()).is_err() {
        return Err(StarmapError::invalid_observer(
            "time",
            timestamp.year(),
            format!("year must be between {} and {}", i16::MIN, i16::MAX),
        ));
    }
    Ok(timestamp)
}

fn parse_rfc3339(value: &str) -> Result<Option<DateTime<Utc>>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => check_year(parsed.with_timezone(&Utc)).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_naive(value: &str) -> Result<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            StarmapError::invalid_observer(
                "time",
                value,
                "expected RFC 3339 or 'YYYY-MM-DD HH:MM[:SS]'",
            )
        })
}

/// IANA time zone containing the given location.
pub fn zone_at(latitude: f64, longitude: f64) -> Result<Tz> {
    check_position(latitude, longitude)?;

    let finder = tzf_rs::DefaultFinder::new();
    let name = finder.get_tz_name(longitude, latitude);
    name.parse::<Tz>().map_err(|_| {
        StarmapError::invalid_observer(
            "time_zone",
            format!("{}, {}", latitude, longitude),
            "no time zone found for this location, set utc_offset_hours instead",
        )
    })
}

impl Observer {
    /// Builds an observer, rejecting coordinates outside the geographic ranges.
    pub fn new(
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        check_position(latitude, longitude)?;
        if let Some(elevation) = elevation {
            if !(-500.0..=100_000.0).contains(&elevation) {
                return Err(StarmapError::invalid_observer(
                    "elevation",
                    elevation,
                    "must be between -500 and 100000 metres",
                ));
            }
        }
        check_year(timestamp)?;

        Ok(Self {
            latitude,
            longitude,
            elevation,
            timestamp,
        })
    }

    /// Parses the observation time.
    ///
    /// RFC 3339 strings carry their own offset. Naive local times such as
    /// `2024-06-21 22:30` are interpreted with `utc_offset_hours`.
    pub fn parse_timestamp(value: &str, utc_offset_hours: f64) -> Result<DateTime<Utc>> {
        let value = value.trim();

        if let Some(parsed) = parse_rfc3339(value)? {
            return Ok(parsed);
        }

        if !(-14.0..=14.0).contains(&utc_offset_hours) {
            return Err(StarmapError::invalid_observer(
                "utc_offset_hours",
                utc_offset_hours,
                "must be between -14 and 14 hours",
            ));
        }
        let offset_seconds = (utc_offset_hours * 3600.0).round() as i32;
        let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
            StarmapError::invalid_observer("utc_offset_hours", utc_offset_hours, "invalid offset")
        })?;

        let naive = parse_naive(value)?;
        let local = offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| StarmapError::invalid_observer("time", value, "ambiguous local time"))?;
        check_year(local.with_timezone(&Utc))
    }

    /// Parses the observation time as wall-clock time at the observer's
    /// location, daylight saving included.
    ///
    /// Repeated hours when clocks go back resolve to the earlier instant;
    /// skipped hours when clocks go forward are rejected.
    pub fn parse_local_timestamp(
        value: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<DateTime<Utc>> {
        let value = value.trim();

        if let Some(parsed) = parse_rfc3339(value)? {
            return Ok(parsed);
        }

        let naive = parse_naive(value)?;
        let zone = zone_at(latitude, longitude)?;
        tracing::debug!("Reading '{}' as local time in {}", value, zone.name());

        let local = zone.from_local_datetime(&naive).earliest().ok_or_else(|| {
            StarmapError::invalid_observer(
                "time",
                value,
                format!("does not exist in {} (clocks skip this hour)", zone.name()),
            )
        })?;
        check_year(local.with_timezone(&Utc))
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midsummer() -> DateTime<Utc> {
        Observer::parse_timestamp("2024-06-21T00:00:00Z", 0.0).unwrap()
    }

    #[test]
    fn test_accepts_range_limits() {
        assert!(Observer::new(90.0, 180.0, None, midsummer()).is_ok());
        assert!(Observer::new(-90.0, -180.0, Some(0.0), midsummer()).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        for (lat, lon) in [(90.5, 0.0), (-91.0, 0.0), (0.0, 180.1), (0.0, -200.0), (f64::NAN, 0.0)] {
            let err = Observer::new(lat, lon, None, midsummer()).unwrap_err();
            assert!(matches!(err, StarmapError::InvalidObserverError { .. }), "{lat},{lon}");
        }
    }

    #[test]
    fn test_rejects_bad_elevation() {
        let err = Observer::new(10.0, 10.0, Some(f64::INFINITY), midsummer()).unwrap_err();
        assert!(matches!(err, StarmapError::InvalidObserverError { ref field, .. } if field == "elevation"));
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = Observer::parse_timestamp("2024-06-21T02:00:00+02:00", 5.0).unwrap();
        assert_eq!(parsed, midsummer());
    }

    #[test]
    fn test_parse_naive_local_time_with_offset() {
        let parsed = Observer::parse_timestamp("2024-06-20 20:00", -4.0).unwrap();
        assert_eq!(parsed, midsummer());

        let with_seconds = Observer::parse_timestamp("2024-06-21T00:00:00", 0.0).unwrap();
        assert_eq!(with_seconds, midsummer());
    }

    #[test]
    fn test_rejects_unparseable_time() {
        for value in ["yesterday", "2024-13-01 00:00", "2024-02-30 10:00", ""] {
            let err = Observer::parse_timestamp(value, 0.0).unwrap_err();
            assert!(matches!(err, StarmapError::InvalidObserverError { ref field, .. } if field == "time"));
        }
    }

    #[test]
    fn test_local_time_follows_zone_and_daylight_saving() {
        // New York: EDT (UTC-4) in June, EST (UTC-5) in January
        let summer = Observer::parse_local_timestamp("2024-06-20 20:00", 40.7128, -74.006).unwrap();
        assert_eq!(summer, midsummer());

        let winter = Observer::parse_local_timestamp("2024-01-15 19:00", 40.7128, -74.006).unwrap();
        assert_eq!(winter.to_rfc3339(), "2024-01-16T00:00:00+00:00");

        // Tokyo has no daylight saving
        let tokyo = Observer::parse_local_timestamp("2024-06-21 09:00", 35.68, 139.77).unwrap();
        assert_eq!(tokyo, midsummer());
    }

    #[test]
    fn test_local_time_keeps_explicit_rfc3339_offset() {
        let parsed =
            Observer::parse_local_timestamp("2024-06-21T02:00:00+02:00", 40.7128, -74.006).unwrap();
        assert_eq!(parsed, midsummer());
    }

    #[test]
    fn test_local_time_in_spring_forward_gap_is_rejected() {
        let err = Observer::parse_local_timestamp("2024-03-10 02:30", 40.7128, -74.006).unwrap_err();
        assert!(matches!(err, StarmapError::InvalidObserverError { ref field, .. } if field == "time"));
    }

    #[test]
    fn test_zone_lookup_rejects_invalid_position() {
        assert_eq!(zone_at(51.5, -0.12).unwrap(), chrono_tz::Europe::London);
        assert!(zone_at(95.0, 0.0).is_err());
    }

    #[test]
    fn test_rejects_years_outside_sixteen_bits() {
        let err = Observer::parse_timestamp("40000-01-01 00:00", 0.0).unwrap_err();
        assert!(matches!(err, StarmapError::InvalidObserverError { ref field, .. } if field == "time"));

        let far_future = Utc.with_ymd_and_hms(40000, 1, 1, 0, 0, 0).unwrap();
        assert!(Observer::new(0.0, 0.0, None, far_future).is_err());
    }

    #[test]
    fn test_rejects_bad_offset() {
        assert!(Observer::parse_timestamp("2024-06-21 00:00", 15.0).is_err());
    }
}
