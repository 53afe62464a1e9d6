//! Profile collection serialization
//!
//! The persisted representation is a JSON array of profile objects. The
//! codec is a trait so the wire format stays a pluggable strategy; anything
//! that round-trips a profile sequence through text is acceptable as long
//! as existing persisted data keeps decoding.

use serde_json::Value;
use thiserror::Error;

use crate::profile::DeviceProfile;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to parse stored profiles: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Stored profile root is not an array")]
    NotAnArray,
}

/// Encode/decode seam between the registry and its persisted profile text.
pub trait ProfileCodec: Send {
    fn encode(&self, profiles: &[DeviceProfile]) -> Result<String, CodecError>;
    fn decode(&self, text: &str) -> Result<Vec<DeviceProfile>, CodecError>;
}

/// Default codec: compact JSON array of profile objects.
///
/// Decoding is lenient the way the stored data demands: array elements that
/// are not objects are skipped, missing fields take their defaults, and
/// every decoded profile comes back MAC-normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProfileCodec;

impl ProfileCodec for JsonProfileCodec {
    fn encode(&self, profiles: &[DeviceProfile]) -> Result<String, CodecError> {
        Ok(serde_json::to_string(profiles)?)
    }

    fn decode(&self, text: &str) -> Result<Vec<DeviceProfile>, CodecError> {
        let root: Value = serde_json::from_str(text)?;
        let items = root.as_array().ok_or(CodecError::NotAnArray)?;
        let mut profiles = Vec::with_capacity(items.len());
        for item in items {
            if !item.is_object() {
                continue;
            }
            let profile: DeviceProfile = serde_json::from_value(item.clone())?;
            profiles.push(profile.normalized());
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_reproduces_collection() {
        let profiles = vec![
            DeviceProfile {
                device_id: "d1".to_string(),
                mac_address: "A1B2C3D4E5F6".to_string(),
                label: "Headset".to_string(),
                description: "Living room".to_string(),
                transport_hint: "udp".to_string(),
                allow_audio: true,
                allow_notifications: false,
                is_primary: true,
            },
            DeviceProfile {
                device_id: "d2".to_string(),
                ..Default::default()
            },
        ];

        let codec = JsonProfileCodec;
        let text = codec.encode(&profiles).unwrap();
        let decoded = codec.decode(&text).unwrap();
        assert_eq!(decoded, profiles);
    }

    #[test]
    fn test_decode_normalizes_macs() {
        let codec = JsonProfileCodec;
        let decoded = codec.decode(r#"[{"mac":"aa:bb-cc"}]"#).unwrap();
        assert_eq!(decoded[0].mac_address, "AABBCC");
    }

    #[test]
    fn test_decode_skips_non_object_elements() {
        let codec = JsonProfileCodec;
        let decoded = codec
            .decode(r#"[{"device_id":"d1"}, 42, "junk", {"device_id":"d2"}]"#)
            .unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].device_id, "d1");
        assert_eq!(decoded[1].device_id, "d2");
    }

    #[test]
    fn test_decode_rejects_non_array_root() {
        let codec = JsonProfileCodec;
        assert!(matches!(
            codec.decode(r#"{"device_id":"d1"}"#),
            Err(CodecError::NotAnArray)
        ));
    }

    #[test]
    fn test_decode_rejects_unparsable_text() {
        let codec = JsonProfileCodec;
        assert!(matches!(
            codec.decode("not json"),
            Err(CodecError::Parse(_))
        ));
    }

    #[test]
    fn test_decode_applies_field_defaults() {
        let codec = JsonProfileCodec;
        let decoded = codec.decode(r#"[{"device_id":"d1"}]"#).unwrap();
        assert!(decoded[0].allow_audio);
        assert!(decoded[0].allow_notifications);
        assert!(!decoded[0].is_primary);
    }
}
