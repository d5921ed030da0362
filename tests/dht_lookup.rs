//! DHT lookup round trip (§4.7): walk a `FindIntro` transaction from start to completion across
//! a small simulated swarm — start the transaction, forward toward the closest known routers,
//! store the resolved introset, and complete the transaction on the matching `GotIntro`.

use lokinet_core::{AddressInfo, Introduction, PathId, RouterContact, ServiceInfo, SigBytes};
use lokinet_dht::{Dht, PendingKind, TransactionKey};

fn make_rc(id: u8) -> RouterContact {
    RouterContact {
        router_id: [id; 32],
        signing_key: [id; 32],
        encryption_key: [id; 32],
        addresses: vec![AddressInfo {
            rank: 0,
            dialect: "udp".into(),
            pubkey: [id; 32],
            ip: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            port: 1000 + id as u16,
        }],
        netid: "lokinet".into(),
        last_updated: 0,
        signature: SigBytes::zero(),
    }
}

fn sample_introset(service_key: [u8; 32], timestamp: u64) -> lokinet_core::IntroSet {
    lokinet_core::IntroSet {
        service_info: ServiceInfo { enc_key: service_key, sign_key: service_key, vanity: [0u8; 16], version: 0 },
        introductions: vec![Introduction {
            router: [9u8; 32],
            path_id: PathId([1u8; 16]),
            expires_at: timestamp + 600,
            latency_ms: 5,
        }],
        pq_pubkey: [0u8; 32],
        topic: None,
        timestamp,
        pow: None,
        signature: SigBytes::zero(),
    }
}

#[test]
fn find_intro_transaction_resolves_through_forwarding_to_a_stored_introset() {
    let local = [0u8; 32];
    let mut dht = Dht::new(local);

    for id in 1..=5u8 {
        let rc = make_rc(id);
        dht.rc_nodes.insert(rc.router_id, rc);
    }

    let service_key = [0xABu8; 32];
    let asker = [1u8; 32];
    let key = TransactionKey { asker, txid: 42 };

    dht.transactions.start(key, PendingKind::FindIntro { service_key }, 0).unwrap();
    assert_eq!(dht.transactions.len(), 1);

    // Forward toward the closest routers to the service key, excluding the asker.
    let targets = dht.forward_targets(&service_key, 2, &[asker]);
    assert!(!targets.is_empty());
    assert!(!targets.contains(&asker));

    // One of the forwarded routers replies with the introset; we store it locally.
    assert!(dht.try_store_introset(service_key, sample_introset(service_key, 100)));

    // GotIntro arrives, completing the transaction.
    let completed = dht.transactions.complete(&key).unwrap();
    assert!(matches!(completed.kind, PendingKind::FindIntro { service_key: k } if k == service_key));
    assert_eq!(dht.transactions.len(), 0);

    assert!(dht.introset_nodes.get(&service_key).is_some());
}

#[test]
fn stale_introset_replies_do_not_clobber_a_fresher_stored_copy() {
    let mut dht = Dht::new([0u8; 32]);
    let service_key = [0xCDu8; 32];

    assert!(dht.try_store_introset(service_key, sample_introset(service_key, 500)));
    assert!(
        !dht.try_store_introset(service_key, sample_introset(service_key, 200)),
        "an older introset must not replace a fresher one"
    );

    let stored = dht.introset_nodes.get(&service_key).unwrap();
    assert_eq!(stored.timestamp, 500);
}

#[test]
fn unanswered_find_intro_expires_and_is_dropped() {
    let mut dht = Dht::new([0u8; 32]);
    let key = TransactionKey { asker: [1u8; 32], txid: 7 };
    dht.transactions.start(key, PendingKind::FindIntro { service_key: [1u8; 32] }, 0).unwrap();

    let expired = dht.transactions.expire(lokinet_dht::DEFAULT_TIMEOUT_SECS + 1);
    assert_eq!(expired, vec![key]);
    assert_eq!(dht.transactions.len(), 0);
}

#[test]
fn closest_routers_returns_requested_count_in_xor_order() {
    let local = [0u8; 32];
    let mut dht = Dht::new(local);
    for id in 1..=10u8 {
        let rc = make_rc(id);
        dht.rc_nodes.insert(rc.router_id, rc);
    }

    let target = [5u8; 32];
    let closest = dht.closest_routers(&target, 3);
    assert_eq!(closest.len(), 3);
}
