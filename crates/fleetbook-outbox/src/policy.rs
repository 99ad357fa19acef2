// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queueability policy for outbox candidates.

use std::sync::LazyLock;

use regex::RegexSet;

/// Endpoints whose writes are safe to defer and replay.
static QUEUEABLE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"/contact(/|$)",
        r"/feedback(/|$)",
        r"/messages(/|$)",
        r"/draft-booking(/|$)",
        r"/newsletter(/|$)",
    ])
    .unwrap_or_else(|e| panic!("invalid queueable pattern: {e}"))
});

/// Endpoints that must never be replayed later, whatever else matches.
static NON_QUEUEABLE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"/payment(s)?(/|$)",
        r"/checkout(/|$)",
        r"/confirm(/|$)",
        r"/reserve(/|$)",
    ])
    .unwrap_or_else(|e| panic!("invalid non-queueable pattern: {e}"))
});

/// Whether a failed write to `endpoint` may be queued for later replay.
///
/// Non-queueable patterns win over queueable ones; an endpoint matching
/// neither set is not queued.
pub fn is_queueable(endpoint: &str) -> bool {
    if NON_QUEUEABLE.is_match(endpoint) {
        return false;
    }
    QUEUEABLE.is_match(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferrable_endpoints_are_queueable() {
        assert!(is_queueable("/api/contact"));
        assert!(is_queueable("/api/feedback"));
        assert!(is_queueable("/api/messages/thread-9"));
        assert!(is_queueable("/api/draft-booking"));
        assert!(is_queueable("/api/newsletter/subscribe"));
    }

    #[test]
    fn money_movement_is_never_queueable() {
        assert!(!is_queueable("/api/payment/process"));
        assert!(!is_queueable("/api/payments"));
        assert!(!is_queueable("/api/checkout"));
        assert!(!is_queueable("/api/bookings/reserve"));
    }

    #[test]
    fn non_queueable_wins_when_both_match() {
        assert!(!is_queueable("/api/draft-booking/confirm"));
    }

    #[test]
    fn unknown_endpoints_default_to_not_queueable() {
        assert!(!is_queueable("/api/cars/1"));
        assert!(!is_queueable("/api/profile"));
    }

    #[test]
    fn substring_matches_do_not_leak() {
        // "contacts" is not "contact".
        assert!(!is_queueable("/api/contacts-export"));
    }
}
