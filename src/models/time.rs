use serde::*;

/// Modified Julian Date representation.
/// MJD 0 = 1858-11-17 00:00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ModifiedJulianDate(qtty::Days);

impl ModifiedJulianDate {
    /// Create a new MJD value.
    pub fn new<V: Into<qtty::Days>>(v: V) -> Self {
        Self(v.into())
    }

    /// Raw MJD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Convert to Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn to_unix_timestamp(&self) -> f64 {
        (self.value() - 40587.0) * 86400.0
    }

    /// Create from Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn from_unix_timestamp(timestamp: f64) -> Self {
        Self::new(timestamp / 86400.0 + 40587.0)
    }

    /// Convert to chrono DateTime<Utc>. Instants outside chrono's
    /// representable range saturate to its nearest bound.
    pub fn to_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        let secs = self.to_unix_timestamp();
        let secs_i64 = secs.floor() as i64;
        let nanos = ((secs - secs.floor()) * 1e9) as u32;
        chrono::DateTime::from_timestamp(secs_i64, nanos).unwrap_or(if secs < 0.0 {
            chrono::DateTime::<chrono::Utc>::MIN_UTC
        } else {
            chrono::DateTime::<chrono::Utc>::MAX_UTC
        })
    }

    /// Create from chrono DateTime<Utc>.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self::from_unix_timestamp(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9)
    }

    /// Create the MJD of midnight UTC for a calendar date.
    pub fn from_date(date: chrono::NaiveDate) -> Self {
        let dt = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        Self::from_datetime(dt)
    }

    /// The UTC calendar date this instant falls on.
    pub fn to_date(&self) -> chrono::NaiveDate {
        self.to_datetime().date_naive()
    }

    /// ISO week number of the UTC date, for weekly aggregation.
    pub fn iso_week(&self) -> u32 {
        use chrono::Datelike;
        self.to_date().iso_week().week()
    }

    /// Offset this instant by a signed number of minutes.
    pub fn add_minutes(&self, minutes: f64) -> Self {
        Self::new(self.value() + minutes / 1440.0)
    }

    /// Offset this instant by a signed number of hours.
    pub fn add_hours(&self, hours: f64) -> Self {
        Self::new(self.value() + hours / 24.0)
    }
}

impl From<f64> for ModifiedJulianDate {
    fn from(v: f64) -> Self {
        ModifiedJulianDate::new(v)
    }
}
