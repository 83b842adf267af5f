//! ISO-8601 timestamp helpers.
//!
//! Every timestamp the ledger writes is UTC with millisecond precision and a
//! `Z` suffix, so lexicographic order of the stored strings equals time order.
//! Range filters rely on that.

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse any RFC 3339 timestamp and normalize it to UTC.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

/// Current server time truncated to millisecond precision.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    // Round-trip through the canonical format so in-memory values equal stored ones.
    parse(&format(&now)).unwrap_or(now)
}

/// `#[serde(with = "timestamp::iso")]` for `DateTime<Utc>` fields.
pub mod iso {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "timestamp::iso_opt")]` for `Option<DateTime<Utc>>` fields.
pub mod iso_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => s.serialize_some(&super::format(at)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        raw.map(|r| super::parse(&r).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_uses_millis_and_z() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        assert_eq!(format(&at), "2026-10-18T09:30:00.000Z");
    }

    #[test]
    fn parse_normalizes_offsets() {
        let at = parse("2026-10-18T11:30:00+02:00").unwrap();
        assert_eq!(format(&at), "2026-10-18T09:30:00.000Z");
    }

    #[test]
    fn now_survives_round_trip() {
        let at = now();
        assert_eq!(parse(&format(&at)).unwrap(), at);
    }
}
