use chrono::Utc;
use rand::Rng;

const SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Session-scoped visitor state: the stable session id, the one-shot
/// first-visit flag, and the cached country code.
///
/// The first-visit flag is purely local, never re-derived from the store:
/// a resumed session does not re-trigger counting, while a fresh context
/// (new tab, cleared session state) does.
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: String,
    first_visit: bool,
    country: Option<String>,
}

impl SessionContext {
    /// Fresh session with a newly synthesized id and the first-visit flag
    /// still unconsumed.
    pub fn new() -> Self {
        Self {
            id: generate_session_id(),
            first_visit: true,
            country: None,
        }
    }

    /// Session resumed from an existing id, e.g. a page reload within the
    /// same browser session. The first-visit flag is already spent.
    pub fn resume(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_visit: false,
            country: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True exactly once per fresh session, false on every later call.
    pub fn consume_first_visit(&mut self) -> bool {
        std::mem::replace(&mut self.first_visit, false)
    }

    pub fn cached_country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Cache a successfully resolved country for the session's lifetime.
    pub fn cache_country(&mut self, code: &str) {
        self.country = Some(code.to_string());
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Millisecond timestamp plus a random base36 suffix.
///
/// Not cryptographically strong. A collision merely miscounts one visitor
/// and never corrupts store state.
fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_visit_flag_is_consumed_exactly_once() {
        let mut session = SessionContext::new();
        assert!(session.consume_first_visit());
        for _ in 0..5 {
            assert!(!session.consume_first_visit());
        }
    }

    #[test]
    fn resumed_session_never_reports_first_visit() {
        let mut session = SessionContext::resume("1700000000000-abc1234");
        assert_eq!(session.id(), "1700000000000-abc1234");
        assert!(!session.consume_first_visit());
    }

    #[test]
    fn generated_id_has_timestamp_and_suffix() {
        let session = SessionContext::new();
        let (millis, suffix) = session.id().split_once('-').expect("separator");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(SessionContext::new().id(), SessionContext::new().id());
    }

    #[test]
    fn country_cache_starts_empty_and_sticks() {
        let mut session = SessionContext::new();
        assert_eq!(session.cached_country(), None);
        session.cache_country("US");
        assert_eq!(session.cached_country(), Some("US"));
    }
}
