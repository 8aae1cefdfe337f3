//! The positioning pipeline.
//!
//! ARCHITECTURE
//! ============
//! A location request flows: readings → ranging → proximity or
//! trilateration → corridor constraint → orchestrator (smoothing, speed
//! clamp, jitter buffer, snap-to-route). The estimators are pure
//! functions over the immutable [`crate::map::MapRegistry`]; only the
//! orchestrator touches per-session state.

pub mod corridor;
pub mod orchestrator;
pub mod proximity;
pub mod ranging;
pub mod snap;
pub mod trilateration;

use serde::{Deserialize, Deserializer, Serialize};

/// Positioning mode: which estimator answers a location request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Strongest beacon's position is the answer.
    Proximity,
    /// RSSI-weighted centroid of all resolvable beacons.
    Weighted,
    /// Nonlinear least-squares over ≥3 ranged beacons.
    Trilateration,
    /// Pick by beacon count; trilateration falls back to weighted.
    Hybrid,
}

impl Mode {
    /// Parse the exact wire name. Case matters; callers that want to be
    /// forgiving uppercase first.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROXIMITY" => Some(Self::Proximity),
            "WEIGHTED" => Some(Self::Weighted),
            "TRILATERATION" => Some(Self::Trilateration),
            "HYBRID" => Some(Self::Hybrid),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proximity => "PROXIMITY",
            Self::Weighted => "WEIGHTED",
            Self::Trilateration => "TRILATERATION",
            Self::Hybrid => "HYBRID",
        }
    }
}

/// One beacon observation from a client, request-scoped.
///
/// Mobile SDKs disagree on the key name for the beacon MAC and sometimes
/// send the RSSI as a float or a numeric string, so deserialization is
/// deliberately tolerant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssiReading {
    #[serde(alias = "id", alias = "macAddress", rename = "beaconId")]
    pub beacon_id: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub rssi: i32,
}

/// Accept an integer, a float (truncated), or a numeric string.
fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => i32::try_from(v).map_err(serde::de::Error::custom),
        Raw::Float(v) => Ok(v as i32),
        Raw::Text(s) => s.trim().parse::<i32>().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_accepts_beacon_id_key_aliases() {
        for json in [
            r#"{"beaconId":"08:92:72:87:9C:72","rssi":-55}"#,
            r#"{"id":"08:92:72:87:9C:72","rssi":-55}"#,
            r#"{"macAddress":"08:92:72:87:9C:72","rssi":-55}"#,
        ] {
            let reading: RssiReading = serde_json::from_str(json).expect(json);
            assert_eq!(reading.beacon_id, "08:92:72:87:9C:72");
            assert_eq!(reading.rssi, -55);
        }
    }

    #[test]
    fn reading_accepts_float_and_string_rssi() {
        let reading: RssiReading =
            serde_json::from_str(r#"{"beaconId":"aa","rssi":-61.7}"#).unwrap();
        assert_eq!(reading.rssi, -61);

        let reading: RssiReading =
            serde_json::from_str(r#"{"beaconId":"aa","rssi":"-72"}"#).unwrap();
        assert_eq!(reading.rssi, -72);
    }

    #[test]
    fn reading_rejects_garbage_rssi() {
        assert!(serde_json::from_str::<RssiReading>(r#"{"beaconId":"aa","rssi":"strong"}"#).is_err());
    }
}
