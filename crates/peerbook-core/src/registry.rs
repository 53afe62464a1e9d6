//! Device and session registry
//!
//! One explicitly-owned instance per process. A single mutex guards the
//! profile collection, the session directory, and the durable preferred
//! session id together, and every mutation persists through the settings
//! store before returning, so a restart always observes the last completed
//! mutation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::codec::{JsonProfileCodec, ProfileCodec};
use crate::profile::{normalize_mac, DeviceProfile};
use crate::session::SessionInfo;
use crate::settings::SettingsStore;

/// Settings namespace holding all registry keys.
pub const SETTINGS_NAMESPACE: &str = "devices";
/// Key for the persisted profile array.
pub const PROFILES_KEY: &str = "profiles";
/// Key for the durable preferred session id.
pub const PREFERRED_SESSION_KEY: &str = "preferred_session";

/// Registry of paired-device profiles and live sessions.
///
/// All operations are synchronous, take and return value snapshots, and
/// complete their persistence write while holding the lock.
pub struct DeviceRegistry {
    inner: Mutex<Inner>,
}

struct Inner {
    profiles: Vec<DeviceProfile>,
    sessions: HashMap<String, SessionInfo>,
    preferred_session_id: String,
    store: Box<dyn SettingsStore>,
    codec: Box<dyn ProfileCodec>,
}

impl DeviceRegistry {
    /// Create a registry over the given settings store with the default
    /// JSON profile codec, loading persisted state.
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        Self::with_codec(store, Box::new(JsonProfileCodec))
    }

    /// Create a registry with an explicit profile codec.
    ///
    /// Malformed persisted profile text is treated as no data: a warning is
    /// logged and the collection starts empty. The registry always starts
    /// in a valid, if empty, state.
    pub fn with_codec(store: Box<dyn SettingsStore>, codec: Box<dyn ProfileCodec>) -> Self {
        let profiles = match store.get_string(SETTINGS_NAMESPACE, PROFILES_KEY) {
            None => Vec::new(),
            Some(text) if text.is_empty() => Vec::new(),
            Some(text) => match codec.decode(&text) {
                Ok(profiles) => profiles,
                Err(err) => {
                    warn!(error = %err, "Failed to parse stored profiles");
                    Vec::new()
                }
            },
        };
        let preferred_session_id = store
            .get_string(SETTINGS_NAMESPACE, PREFERRED_SESSION_KEY)
            .unwrap_or_default();

        Self {
            inner: Mutex::new(Inner {
                profiles,
                sessions: HashMap::new(),
                preferred_session_id,
                store,
                codec,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Snapshot of all paired-device profiles, in stored order.
    pub fn profiles(&self) -> Vec<DeviceProfile> {
        self.lock().profiles.clone()
    }

    /// Insert or update a profile.
    ///
    /// The incoming profile is MAC-normalized, then matched against the
    /// stored collection by identity (MAC first, device id second). A match
    /// is replaced in place, preserving its position; otherwise the profile
    /// is appended. The collection is persisted either way. Insertion is
    /// unconditional, so this always returns true.
    pub fn add_or_update_profile(&self, profile: DeviceProfile) -> bool {
        let normalized = profile.normalized();
        let mut inner = self.lock();
        match inner
            .profiles
            .iter()
            .position(|candidate| normalized.matches_identity(candidate))
        {
            Some(index) => inner.profiles[index] = normalized,
            None => inner.profiles.push(normalized),
        }
        inner.persist_profiles();
        true
    }

    /// Remove every profile whose MAC equals the normalized argument.
    ///
    /// Returns whether anything was removed; persists only on change.
    pub fn remove_profile_by_mac(&self, mac_address: &str) -> bool {
        let normalized_mac = normalize_mac(mac_address);
        let mut inner = self.lock();
        let size_before = inner.profiles.len();
        inner
            .profiles
            .retain(|profile| profile.mac_address != normalized_mac);
        if inner.profiles.len() == size_before {
            return false;
        }
        inner.persist_profiles();
        true
    }

    /// Remove every profile with the given device id.
    ///
    /// Returns whether anything was removed; persists only on change.
    pub fn remove_profile_by_id(&self, device_id: &str) -> bool {
        let mut inner = self.lock();
        let size_before = inner.profiles.len();
        inner.profiles.retain(|profile| profile.device_id != device_id);
        if inner.profiles.len() == size_before {
            return false;
        }
        inner.persist_profiles();
        true
    }

    /// First profile whose MAC equals the normalized argument.
    pub fn profile_by_mac(&self, mac_address: &str) -> Option<DeviceProfile> {
        let normalized_mac = normalize_mac(mac_address);
        self.lock()
            .profiles
            .iter()
            .find(|profile| profile.mac_address == normalized_mac)
            .cloned()
    }

    /// First profile with the given device id.
    pub fn profile_by_id(&self, device_id: &str) -> Option<DeviceProfile> {
        self.lock()
            .profiles
            .iter()
            .find(|profile| profile.device_id == device_id)
            .cloned()
    }

    /// Replace the session directory wholesale with a new snapshot.
    ///
    /// Entries with an empty `session_id` are dropped. A carried-over
    /// preferred id that no longer names a session is cleared (and the
    /// durable key erased); an empty preference is then re-derived from the
    /// first active entry, falling back to the first entry of the supplied
    /// snapshot. `is_preferred` is recomputed on every entry afterwards.
    pub fn update_sessions(&self, snapshot: Vec<SessionInfo>) {
        let mut inner = self.lock();
        inner.sessions.clear();

        let first_id = snapshot
            .first()
            .map(|session| session.session_id.clone())
            .unwrap_or_default();
        let mut detected_active = String::new();
        for session in snapshot {
            if session.session_id.is_empty() {
                continue;
            }
            if session.is_active && detected_active.is_empty() {
                detected_active = session.session_id.clone();
            }
            inner.sessions.insert(session.session_id.clone(), session);
        }

        // A preference must never outlive the session it names.
        if !inner.preferred_session_id.is_empty()
            && !inner.sessions.contains_key(&inner.preferred_session_id)
        {
            debug!(
                session_id = %inner.preferred_session_id,
                "Preferred session left the directory, clearing"
            );
            inner.preferred_session_id.clear();
            inner.persist_preferred_session();
        }

        if inner.preferred_session_id.is_empty() {
            inner.preferred_session_id = if !detected_active.is_empty() {
                detected_active
            } else {
                first_id
            };
            if !inner.preferred_session_id.is_empty() {
                inner.persist_preferred_session();
            }
        }

        inner.refresh_preferred_flags();
    }

    /// Snapshot of the session directory in display order: preferred first,
    /// then active, then ascending session id.
    pub fn sessions(&self) -> Vec<SessionInfo> {
        let inner = self.lock();
        let mut sessions: Vec<SessionInfo> = inner.sessions.values().cloned().collect();
        sessions.sort_by(SessionInfo::display_order);
        sessions
    }

    /// The session to talk to right now.
    ///
    /// Prefers the preferred session when it is in the directory, then the
    /// first active entry, then any entry at all. Which entry "any" means
    /// is unspecified map iteration order.
    pub fn active_session(&self) -> Option<SessionInfo> {
        let inner = self.lock();
        if !inner.preferred_session_id.is_empty() {
            if let Some(session) = inner.sessions.get(&inner.preferred_session_id) {
                return Some(session.clone());
            }
        }
        if let Some(session) = inner.sessions.values().find(|session| session.is_active) {
            return Some(session.clone());
        }
        inner.sessions.values().next().cloned()
    }

    /// Exact directory lookup by session id.
    pub fn find_session(&self, session_id: &str) -> Option<SessionInfo> {
        self.lock().sessions.get(session_id).cloned()
    }

    /// Select the preferred session.
    ///
    /// Rejected when the id is not a current directory key, so the durable
    /// preference can never point outside the live directory as a result of
    /// this call.
    pub fn set_preferred_session(&self, session_id: &str) -> bool {
        let mut inner = self.lock();
        if !inner.sessions.contains_key(session_id) {
            warn!(session_id, "Cannot set preferred session: session not found");
            return false;
        }
        inner.preferred_session_id = session_id.to_string();
        inner.refresh_preferred_flags();
        inner.persist_preferred_session();
        true
    }
}

impl Inner {
    fn persist_profiles(&mut self) {
        let text = match self.codec.encode(&self.profiles) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Failed to encode profiles");
                return;
            }
        };
        if let Err(err) = self.store.set_string(SETTINGS_NAMESPACE, PROFILES_KEY, &text) {
            warn!(error = %err, "Failed to persist profiles");
        }
    }

    fn persist_preferred_session(&mut self) {
        // Cleared preference erases the key rather than storing "".
        let result = if self.preferred_session_id.is_empty() {
            self.store.erase_key(SETTINGS_NAMESPACE, PREFERRED_SESSION_KEY)
        } else {
            self.store
                .set_string(SETTINGS_NAMESPACE, PREFERRED_SESSION_KEY, &self.preferred_session_id)
        };
        if let Err(err) = result {
            warn!(error = %err, "Failed to persist preferred session");
        }
    }

    fn refresh_preferred_flags(&mut self) {
        for (session_id, session) in &mut self.sessions {
            session.is_preferred = *session_id == self.preferred_session_id;
        }
    }
}
