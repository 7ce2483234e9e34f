use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Flat key/value session payload, stored in the cookie as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieSession {
    data: Map<String, Value>,
}

impl CookieSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    /// Returns the value under `key` deserialized as `T`, or `None` if the key is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> serde_json::Result<Option<T>> {
        self.data
            .get(key)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> serde_json::Result<()> {
        self.set_value(key, serde_json::to_value(value)?);
        Ok(())
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }

    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Canonical JSON text of the payload.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.data)
    }
}

impl fmt::Display for CookieSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Map<String, Value>> for CookieSession {
    fn from(data: Map<String, Value>) -> Self {
        Self::from_map(data)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    data: CookieSession,
    modified: bool,
    destroyed: bool,
}

/// Request-scoped handle to the session, inserted into request extensions by
/// [`CookieSessionLayer`](crate::CookieSessionLayer).
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(data: CookieSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                data,
                ..SessionState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> serde_json::Result<Option<T>> {
        self.state().data.get(key)
    }

    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.state().data.get_value(key).cloned()
    }

    pub fn insert<T: Serialize>(&self, key: impl Into<String>, value: T) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        let mut state = self.state();
        let previous = state.data.set_value(key, value.clone());
        if previous.as_ref() != Some(&value) {
            state.modified = true;
        }
        Ok(())
    }

    pub fn remove<T: DeserializeOwned>(&self, key: &str) -> serde_json::Result<Option<T>> {
        self.remove_value(key)
            .map(serde_json::from_value)
            .transpose()
    }

    pub fn remove_value(&self, key: &str) -> Option<Value> {
        let mut state = self.state();
        let removed = state.data.delete(key);
        if removed.is_some() {
            state.modified = true;
        }
        removed
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.data.clear();
        state.modified = true;
    }

    /// Clears the session and marks the cookie for expiry at the end of the request.
    pub fn destroy(&self) {
        let mut state = self.state();
        state.data.clear();
        state.modified = true;
        state.destroyed = true;
    }

    pub fn is_modified(&self) -> bool {
        self.state().modified
    }

    pub fn is_destroyed(&self) -> bool {
        self.state().destroyed
    }

    pub fn is_empty(&self) -> bool {
        self.state().data.is_empty()
    }

    /// Copy of the current payload.
    pub fn snapshot(&self) -> CookieSession {
        self.state().data.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cookie_session_accessors() {
        let mut session = CookieSession::new();
        assert!(session.is_empty());

        session.set("user", "Test").unwrap();
        session.set("count", 3).unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.get::<String>("user").unwrap().as_deref(), Some("Test"));
        assert_eq!(session.get::<u32>("count").unwrap(), Some(3));
        assert_eq!(session.get::<u32>("missing").unwrap(), None);
        assert!(session.get::<u32>("user").is_err());

        assert_eq!(session.delete("count"), Some(json!(3)));
        assert_eq!(session.to_string(), r#"{"user":"Test"}"#);

        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.to_json().unwrap(), "{}");
    }

    #[test]
    fn cookie_session_deserializes_only_objects() {
        let session: CookieSession = serde_json::from_str(r#"{"a":[1,2],"b":{"c":null}}"#).unwrap();
        assert_eq!(session.get_value("a"), Some(&json!([1, 2])));

        assert!(serde_json::from_str::<CookieSession>("[1,2]").is_err());
        assert!(serde_json::from_str::<CookieSession>("\"text\"").is_err());
    }

    #[test]
    fn handle_tracks_modification() {
        let session = Session::new(CookieSession::new());
        assert!(!session.is_modified());

        assert_eq!(session.remove_value("missing"), None);
        assert!(!session.is_modified());

        session.insert("foo", 42).unwrap();
        assert!(session.is_modified());
        assert_eq!(session.get::<usize>("foo").unwrap(), Some(42));
    }

    #[test]
    fn reinserting_same_value_is_not_a_modification() {
        let mut data = CookieSession::new();
        data.set("foo", 42).unwrap();
        let session = Session::new(data);

        session.insert("foo", 42).unwrap();
        assert!(!session.is_modified());

        session.insert("foo", 43).unwrap();
        assert!(session.is_modified());
    }

    #[test]
    fn handle_clones_share_state() {
        let session = Session::default();
        let other = session.clone();

        other.insert("foo", "bar").unwrap();
        assert_eq!(session.get_value("foo"), Some(json!("bar")));
        assert_eq!(session.remove::<String>("foo").unwrap().as_deref(), Some("bar"));
        assert!(other.is_empty());
    }

    #[test]
    fn destroy_clears_and_flags() {
        let mut data = CookieSession::new();
        data.set("foo", 1).unwrap();
        let session = Session::new(data);

        session.destroy();
        assert!(session.is_destroyed());
        assert!(session.is_modified());
        assert!(session.snapshot().is_empty());
    }
}
