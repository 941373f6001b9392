#[cfg(test)]
mod tests {
    use crate::peer::registry::PeerRegistry;
    use crate::peer::types::Peer;
    use chrono::{DateTime, Utc};

    fn peer_at(id: &str, last_seen: &str, is_alive: bool) -> Peer {
        Peer {
            id: id.to_string(),
            address: "http://10.0.0.1:8080".to_string(),
            last_seen: last_seen.parse::<DateTime<Utc>>().unwrap(),
            is_alive,
        }
    }

    // ============================================================
    // PEER RECORD TESTS
    // ============================================================

    #[test]
    fn test_new_peer_is_alive() {
        let peer = Peer::new("node-1", "http://10.0.0.1:8080");

        assert!(peer.is_alive);
        assert!(peer.last_seen <= Utc::now());
    }

    #[test]
    fn test_peer_wire_field_names() {
        let peer = peer_at("node-1", "2024-05-01T10:00:00Z", true);

        let value = serde_json::to_value(&peer).unwrap();
        let object = value.as_object().unwrap();

        assert!(object.contains_key("id"));
        assert!(object.contains_key("address"));
        assert!(object.contains_key("last_seen"));
        assert!(object.contains_key("is_alive"));

        // The timestamp must round-trip as RFC3339.
        let raw = object["last_seen"].as_str().unwrap();
        let parsed: DateTime<Utc> = raw.parse().unwrap();
        assert_eq!(parsed, peer.last_seen);
    }

    #[test]
    fn test_peer_decode_ignores_unknown_fields() {
        let json = r#"{"id":"node-1","address":"http://10.0.0.1:8080",
            "last_seen":"2024-05-01T10:00:00Z","is_alive":true,
            "region":"eu-west","weight":3}"#;

        let peer: Peer = serde_json::from_str(json).unwrap();
        assert_eq!(peer.id, "node-1");
        assert!(peer.is_alive);
    }

    #[test]
    fn test_peer_decode_defaults_missing_evidence() {
        // Minimal record, as sent by a joining node that knows nothing yet.
        let json = r#"{"id":"node-1","address":"http://10.0.0.1:8080"}"#;

        let peer: Peer = serde_json::from_str(json).unwrap();
        assert_eq!(peer.last_seen, DateTime::UNIX_EPOCH);
        assert!(!peer.is_alive);
    }

    // ============================================================
    // REGISTRY BASICS
    // ============================================================

    #[test]
    fn test_add_reports_new_ids() {
        let registry = PeerRegistry::new();

        assert!(registry.add(Peer::new("node-1", "http://10.0.0.1:8080")));
        assert!(!registry.add(Peer::new("node-1", "http://10.0.0.9:8080")));

        // The overwrite still took effect.
        assert_eq!(registry.get("node-1").unwrap().address, "http://10.0.0.9:8080");
    }

    #[test]
    fn test_add_stamps_fresh_evidence() {
        let registry = PeerRegistry::new();

        // Even a record claiming to be ancient and dead comes back alive,
        // because add() is only used for direct local evidence.
        registry.add(peer_at("node-1", "2000-01-01T00:00:00Z", false));

        let stored = registry.get("node-1").unwrap();
        assert!(stored.is_alive);
        assert!(stored.last_seen > "2000-01-02T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_get_missing_returns_none() {
        let registry = PeerRegistry::new();
        assert!(registry.get("ghost").is_none());
        assert!(!registry.exists("ghost"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = PeerRegistry::new();
        registry.add(Peer::new("node-1", "http://10.0.0.1:8080"));

        registry.remove("node-1");
        registry.remove("node-1");

        assert!(!registry.exists("node-1"));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_counts_and_alive_filter() {
        let registry = PeerRegistry::new();
        registry.add(Peer::new("node-1", "http://10.0.0.1:8080"));
        registry.add(Peer::new("node-2", "http://10.0.0.2:8080"));
        registry.add(Peer::new("node-3", "http://10.0.0.3:8080"));
        registry.mark_dead("node-2");

        assert_eq!(registry.count(), 3);
        assert_eq!(registry.count_alive(), 2);
        assert!(registry.count_alive() <= registry.count());

        let alive: Vec<String> = registry.alive().into_iter().map(|p| p.id).collect();
        assert!(alive.contains(&"node-1".to_string()));
        assert!(!alive.contains(&"node-2".to_string()));

        // Dead peers stay visible in the full snapshot.
        assert_eq!(registry.all().len(), 3);
    }

    // ============================================================
    // TOMBSTONE SEMANTICS
    // ============================================================

    #[test]
    fn test_mark_dead_preserves_last_seen() {
        let registry = PeerRegistry::new();
        registry.add(Peer::new("node-1", "http://10.0.0.1:8080"));
        let before = registry.get("node-1").unwrap().last_seen;

        registry.mark_dead("node-1");

        let stored = registry.get("node-1").unwrap();
        assert!(!stored.is_alive);
        assert_eq!(stored.last_seen, before);

        // Marking again changes nothing.
        registry.mark_dead("node-1");
        assert_eq!(registry.get("node-1").unwrap().last_seen, before);
    }

    #[test]
    fn test_mark_dead_missing_id_is_noop() {
        let registry = PeerRegistry::new();
        registry.mark_dead("ghost");
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_touch_revives_dead_peer() {
        let registry = PeerRegistry::new();
        registry.add(Peer::new("node-1", "http://10.0.0.1:8080"));
        registry.mark_dead("node-1");
        let before = registry.get("node-1").unwrap().last_seen;

        registry.touch("node-1");

        let stored = registry.get("node-1").unwrap();
        assert!(stored.is_alive);
        assert!(stored.last_seen >= before);
    }

    #[test]
    fn test_touch_unknown_id_creates_nothing() {
        let registry = PeerRegistry::new();
        registry.touch("ghost");
        assert!(!registry.exists("ghost"));
    }

    // ============================================================
    // GOSSIP MERGE PRECEDENCE
    // ============================================================

    #[test]
    fn test_merge_inserts_with_sender_timestamp() {
        let registry = PeerRegistry::new();
        let incoming = peer_at("node-1", "2024-05-01T10:00:05Z", true);

        assert!(registry.merge(incoming.clone()));

        // Unlike add(), the sender's timestamp is preserved verbatim.
        let stored = registry.get("node-1").unwrap();
        assert_eq!(stored.last_seen, incoming.last_seen);
        assert!(stored.is_alive);
    }

    #[test]
    fn test_merge_treats_accepted_records_as_alive() {
        let registry = PeerRegistry::new();

        // A record that died elsewhere is fresh evidence here; whether it is
        // stale enough to tombstone again is the health check's decision.
        registry.merge(peer_at("node-1", "2024-05-01T10:00:05Z", false));

        let stored = registry.get("node-1").unwrap();
        assert!(stored.is_alive);
        let expected: DateTime<Utc> = "2024-05-01T10:00:05Z".parse().unwrap();
        assert_eq!(stored.last_seen, expected);
    }

    #[test]
    fn test_merge_newer_record_wins() {
        let registry = PeerRegistry::new();
        registry.merge(peer_at("node-1", "2024-05-01T10:00:00Z", true));

        assert!(registry.merge(peer_at("node-1", "2024-05-01T10:00:05Z", true)));

        let expected: DateTime<Utc> = "2024-05-01T10:00:05Z".parse().unwrap();
        assert_eq!(registry.get("node-1").unwrap().last_seen, expected);
    }

    #[test]
    fn test_merge_older_or_equal_record_is_ignored() {
        let registry = PeerRegistry::new();
        registry.merge(peer_at("node-1", "2024-05-01T10:00:05Z", true));

        assert!(!registry.merge(peer_at("node-1", "2024-05-01T10:00:03Z", true)));
        assert!(!registry.merge(peer_at("node-1", "2024-05-01T10:00:05Z", true)));

        let expected: DateTime<Utc> = "2024-05-01T10:00:05Z".parse().unwrap();
        let stored = registry.get("node-1").unwrap();
        assert_eq!(stored.last_seen, expected);
        assert!(stored.is_alive);
    }

    #[test]
    fn test_merge_does_not_revive_tombstone_on_stale_evidence() {
        let registry = PeerRegistry::new();
        registry.merge(peer_at("node-1", "2024-05-01T10:00:05Z", true));
        registry.mark_dead("node-1");

        // Evidence no newer than what we evicted on is rejected outright.
        assert!(!registry.merge(peer_at("node-1", "2024-05-01T10:00:05Z", true)));
        assert!(!registry.get("node-1").unwrap().is_alive);

        // Strictly newer evidence revives the record.
        assert!(registry.merge(peer_at("node-1", "2024-05-01T10:00:09Z", true)));
        assert!(registry.get("node-1").unwrap().is_alive);
    }
}
