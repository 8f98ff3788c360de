//! バックエンドのタイムスタンプ表現を扱うserdeヘルパー
//!
//! バックエンドはタイムゾーン付きのRFC3339と、タイムゾーンなしのISO-8601
//! （`2024-01-01T10:00:00.123`）のどちらも返すことがある。後者はUTCとして扱う。
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// タイムスタンプ文字列を解析する
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// `Option<DateTime<Utc>>`用のシリアライズ・デシリアライズ
pub mod option {
    use super::*;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => {
                serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Ok(None),
            Some(value) => parse_timestamp(&value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {value}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(default, with = "option")]
        created_at: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_parse_rfc3339_and_naive() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-03-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T18:30:00+09:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 09:30:00"), Some(expected));
        assert!(parse_timestamp("2024-03-01T09:30:00.250").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_deserialize_missing_null_and_invalid() {
        let missing: Stamped = serde_json::from_str("{}").unwrap();
        assert!(missing.created_at.is_none());

        let null: Stamped = serde_json::from_str(r#"{"created_at":null}"#).unwrap();
        assert!(null.created_at.is_none());

        let invalid = serde_json::from_str::<Stamped>(r#"{"created_at":"soon"}"#);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_serialize_as_rfc3339() {
        let stamped = Stamped {
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()),
        };
        let json = serde_json::to_string(&stamped).unwrap();
        assert_eq!(json, r#"{"created_at":"2024-03-01T09:30:00.000Z"}"#);
    }
}
