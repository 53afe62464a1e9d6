//! Paired-device profiles and hardware address normalization

use serde::{Deserialize, Serialize};

/// Canonicalize a hardware address: strip `:` and `-` separators and
/// uppercase the remaining characters.
///
/// Every MAC stored in or queried against the registry passes through this,
/// so callers may supply any separator style or case.
pub fn normalize_mac(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch != ':' && *ch != '-')
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

fn default_true() -> bool {
    true
}

/// A paired peer device.
///
/// Serializes to the persisted wire schema: the hardware address is stored
/// under `mac`, missing capability flags default to allowed, and unknown
/// fields are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Stable identifier assigned by the pairing flow; may be empty.
    #[serde(default)]
    pub device_id: String,
    /// Hardware address, canonicalized before storage or comparison.
    #[serde(default, rename = "mac")]
    pub mac_address: String,
    /// Display name.
    #[serde(default)]
    pub label: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Preferred transport for this device.
    #[serde(default)]
    pub transport_hint: String,
    #[serde(default = "default_true")]
    pub allow_audio: bool,
    #[serde(default = "default_true")]
    pub allow_notifications: bool,
    #[serde(default)]
    pub is_primary: bool,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            device_id: String::new(),
            mac_address: String::new(),
            label: String::new(),
            description: String::new(),
            transport_hint: String::new(),
            allow_audio: true,
            allow_notifications: true,
            is_primary: false,
        }
    }
}

impl DeviceProfile {
    /// Return this profile with its MAC canonicalized through [`normalize_mac`].
    pub fn normalized(mut self) -> Self {
        self.mac_address = normalize_mac(&self.mac_address);
        self
    }

    /// Identity resolution rule.
    ///
    /// When both sides carry a non-empty MAC the MACs decide; otherwise when
    /// both carry a non-empty device id the ids decide. An empty field never
    /// matches, so a profile with neither field can never be matched.
    pub fn matches_identity(&self, candidate: &DeviceProfile) -> bool {
        if !self.mac_address.is_empty() && !candidate.mac_address.is_empty() {
            return self.mac_address == candidate.mac_address;
        }
        if !self.device_id.is_empty() && !candidate.device_id.is_empty() {
            return self.device_id == candidate.device_id;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mac_strips_separators_and_uppercases() {
        assert_eq!(normalize_mac("aa:bb-CC"), "AABBCC");
        assert_eq!(normalize_mac("AABBCC"), "AABBCC");
        assert_eq!(normalize_mac("a1-b2-c3-d4-e5-f6"), "A1B2C3D4E5F6");
        assert_eq!(normalize_mac(""), "");
    }

    #[test]
    fn test_normalize_mac_idempotent() {
        let once = normalize_mac("0c:8b:95:de:ad:beef");
        assert_eq!(normalize_mac(&once), once);
    }

    #[test]
    fn test_identity_mac_takes_priority() {
        let a = DeviceProfile {
            device_id: "id-1".to_string(),
            mac_address: "AABBCC".to_string(),
            ..Default::default()
        };
        let b = DeviceProfile {
            device_id: "id-2".to_string(),
            mac_address: "AABBCC".to_string(),
            ..Default::default()
        };
        // Same MAC, different ids: still the same device.
        assert!(a.matches_identity(&b));

        let c = DeviceProfile {
            device_id: "id-1".to_string(),
            mac_address: "DDEEFF".to_string(),
            ..Default::default()
        };
        // Same id, but both MACs are present and differ.
        assert!(!a.matches_identity(&c));
    }

    #[test]
    fn test_identity_falls_back_to_device_id() {
        let a = DeviceProfile {
            device_id: "id-1".to_string(),
            ..Default::default()
        };
        let b = DeviceProfile {
            device_id: "id-1".to_string(),
            mac_address: "AABBCC".to_string(),
            ..Default::default()
        };
        assert!(a.matches_identity(&b));
    }

    #[test]
    fn test_identity_empty_fields_never_match() {
        let blank = DeviceProfile::default();
        assert!(!blank.matches_identity(&blank.clone()));

        let named = DeviceProfile {
            device_id: "id-1".to_string(),
            ..Default::default()
        };
        assert!(!blank.matches_identity(&named));
        assert!(!named.matches_identity(&blank));
    }

    #[test]
    fn test_wire_defaults() {
        let profile: DeviceProfile = serde_json::from_str(r#"{"mac":"aa:bb:cc"}"#).unwrap();
        assert!(profile.allow_audio);
        assert!(profile.allow_notifications);
        assert!(!profile.is_primary);
        assert!(profile.device_id.is_empty());
        // Decode does not normalize on its own; the codec does.
        assert_eq!(profile.mac_address, "aa:bb:cc");
    }

    #[test]
    fn test_wire_ignores_unknown_fields() {
        let profile: DeviceProfile =
            serde_json::from_str(r#"{"device_id":"d1","firmware":"9.9"}"#).unwrap();
        assert_eq!(profile.device_id, "d1");
    }
}
