//! Session types for the transport-reported session directory

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One live or recently reported communication session to a peer.
///
/// Sessions are supplied wholesale by the transport layer on every snapshot
/// and are never persisted; only the preferred session id is durable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Unique key into the session directory.
    pub session_id: String,
    /// Descriptive; not required to match any stored profile.
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub label: String,
    /// Transport carrying this session.
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub supports_udp: bool,
    #[serde(default)]
    pub supports_mcp: bool,
    /// Transport-reported liveness.
    #[serde(default)]
    pub is_active: bool,
    /// Derived on every directory rebuild: true for the session matching the
    /// durable preferred-session id, false everywhere else.
    #[serde(default)]
    pub is_preferred: bool,
}

impl SessionInfo {
    /// Stable display ordering: preferred first, then active first, then
    /// `session_id` ascending.
    pub fn display_order(lhs: &SessionInfo, rhs: &SessionInfo) -> Ordering {
        rhs.is_preferred
            .cmp(&lhs.is_preferred)
            .then(rhs.is_active.cmp(&lhs.is_active))
            .then_with(|| lhs.session_id.cmp(&rhs.session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, active: bool, preferred: bool) -> SessionInfo {
        SessionInfo {
            session_id: id.to_string(),
            is_active: active,
            is_preferred: preferred,
            ..Default::default()
        }
    }

    #[test]
    fn test_display_order_preferred_first() {
        let preferred = session("z", false, true);
        let active = session("a", true, false);
        assert_eq!(
            SessionInfo::display_order(&preferred, &active),
            Ordering::Less
        );
    }

    #[test]
    fn test_display_order_active_before_inactive() {
        let active = session("z", true, false);
        let idle = session("a", false, false);
        assert_eq!(SessionInfo::display_order(&active, &idle), Ordering::Less);
    }

    #[test]
    fn test_display_order_ties_break_on_id() {
        let a = session("a", true, false);
        let b = session("b", true, false);
        assert_eq!(SessionInfo::display_order(&a, &b), Ordering::Less);
        assert_eq!(SessionInfo::display_order(&b, &a), Ordering::Greater);
        assert_eq!(SessionInfo::display_order(&a, &a.clone()), Ordering::Equal);
    }
}
