//! Allowlist of sender identifiers permitted to trigger processing.
//!
//! Membership is byte-exact: no trimming, no case folding, no number
//! normalization. An empty allowlist rejects every sender.

use std::sync::Arc;

/// Ordered, immutable set of authorized sender identifiers.
///
/// Cloning is cheap; all clones share the same entries, so the set can be
/// read concurrently from every request task without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizedSenders {
    entries: Arc<Vec<String>>,
}

impl AuthorizedSenders {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: Arc::new(entries.into_iter().map(Into::into).collect()),
        }
    }

    /// Parse a comma-separated list such as the `PHONES` variable.
    ///
    /// Entries are kept verbatim. Empty entries are dropped, so an empty
    /// value produces an empty (deny-all) set rather than one that admits
    /// the empty sender.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(',').filter(|entry| !entry.is_empty()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Returns `true` iff `sender` exactly equals an entry of `set`.
pub fn is_authorized(set: &AuthorizedSenders, sender: &str) -> bool {
    set.iter().any(|entry| entry == sender)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AuthorizedSenders {
        AuthorizedSenders::new(["+15551234567", "+15557654321"])
    }

    #[test]
    fn test_exact_match_is_authorized() {
        let set = configured();
        assert!(is_authorized(&set, "+15551234567"));
        assert!(is_authorized(&set, "+15557654321"));
    }

    #[test]
    fn test_unknown_sender_rejected() {
        assert!(!is_authorized(&configured(), "+19998887777"));
    }

    #[test]
    fn test_no_partial_or_normalized_match() {
        let set = configured();
        assert!(!is_authorized(&set, "+1555123456"));
        assert!(!is_authorized(&set, "15551234567"));
        assert!(!is_authorized(&set, " +15551234567"));
        assert!(!is_authorized(&set, "+15551234567\n"));
    }

    #[test]
    fn test_case_sensitive() {
        let set = AuthorizedSenders::new(["whatsapp:+15551234567"]);
        assert!(is_authorized(&set, "whatsapp:+15551234567"));
        assert!(!is_authorized(&set, "WhatsApp:+15551234567"));
    }

    #[test]
    fn test_empty_set_denies_everything() {
        let set = AuthorizedSenders::default();
        assert!(set.is_empty());
        assert!(!is_authorized(&set, ""));
        assert!(!is_authorized(&set, "+15551234567"));
    }

    #[test]
    fn test_empty_sender_only_matches_explicit_entry() {
        assert!(!is_authorized(&configured(), ""));
        let set = AuthorizedSenders::new([""]);
        assert!(is_authorized(&set, ""));
    }

    #[test]
    fn test_from_csv_keeps_entries_verbatim() {
        let set = AuthorizedSenders::from_csv("+15551234567, +15557654321,+506 71099519");
        let entries: Vec<&str> = set.iter().collect();
        assert_eq!(entries, vec!["+15551234567", " +15557654321", "+506 71099519"]);
        assert!(!is_authorized(&set, "+15557654321"));
        assert!(is_authorized(&set, " +15557654321"));
    }

    #[test]
    fn test_from_csv_empty_is_deny_all() {
        assert!(AuthorizedSenders::from_csv("").is_empty());
        assert!(AuthorizedSenders::from_csv(",,").is_empty());
        assert!(!is_authorized(&AuthorizedSenders::from_csv(""), ""));
    }

    #[test]
    fn test_from_csv_drops_empty_entries() {
        let set = AuthorizedSenders::from_csv("+15551234567,,+15557654321,");
        assert_eq!(set.len(), 2);
    }
}
