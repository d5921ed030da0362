//! Random hop selection from the local node DB (§4.5, §3).
//!
//! Lokinet paths don't require consecutive hops to already be linked (any two relays can dial
//! each other over UDP), so selection is a pure random draw over eligible candidates rather than
//! the connectivity-graph walk a topology-gossip network needs. The invariants that matter are
//! "no hop repeats" and "the path doesn't include our own router or an explicitly excluded one".

use std::collections::HashSet;

use lokinet_core::{hops_are_well_formed, RouterContact, RouterId};
use rand::seq::SliceRandom;

use crate::error::{PathError, Result};

const SELECTION_ATTEMPTS: usize = 100;

/// Select `num_hops` distinct relays from `candidates`, excluding `exclude` and `self_id`.
pub fn select_hops(
    candidates: &[RouterContact],
    num_hops: usize,
    exclude: &HashSet<RouterId>,
    self_id: &RouterId,
) -> Result<Vec<RouterContact>> {
    if num_hops == 0 {
        return Ok(Vec::new());
    }

    let eligible: Vec<&RouterContact> = candidates
        .iter()
        .filter(|rc| &rc.router_id != self_id)
        .filter(|rc| !exclude.contains(&rc.router_id))
        .collect();

    if eligible.len() < num_hops {
        return Err(PathError::InsufficientRelays { need: num_hops, have: eligible.len() });
    }

    let mut rng = rand::thread_rng();
    for _ in 0..SELECTION_ATTEMPTS {
        let mut shuffled = eligible.clone();
        shuffled.shuffle(&mut rng);
        let picked: Vec<&RouterContact> = shuffled.into_iter().take(num_hops).collect();
        let ids: Vec<RouterId> = picked.iter().map(|rc| rc.router_id).collect();
        if hops_are_well_formed(&ids) {
            return Ok(picked.into_iter().cloned().collect());
        }
    }

    Err(PathError::SelectionFailed(SELECTION_ATTEMPTS))
}

/// Select `count` paths of `num_hops` hops each, minimizing relay reuse across paths. Falls
/// back to allowing reuse once the candidate pool is exhausted by prior picks.
pub fn select_diverse_paths(
    candidates: &[RouterContact],
    num_hops: usize,
    count: usize,
    self_id: &RouterId,
) -> Result<Vec<Vec<RouterContact>>> {
    let mut paths = Vec::with_capacity(count);
    let mut used: HashSet<RouterId> = HashSet::new();

    for _ in 0..count {
        let picked = match select_hops(candidates, num_hops, &used, self_id) {
            Ok(p) => p,
            Err(_) => select_hops(candidates, num_hops, &HashSet::new(), self_id)?,
        };
        for hop in &picked {
            used.insert(hop.router_id);
        }
        paths.push(picked);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lokinet_core::AddressInfo;

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
            signature: lokinet_core::SigBytes::zero(),
        }
    }

    #[test]
    fn zero_hops_returns_empty() {
        let candidates = vec![make_rc(1)];
        let picked = select_hops(&candidates, 0, &HashSet::new(), &[0u8; 32]).unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn rejects_when_pool_too_small() {
        let candidates = vec![make_rc(1), make_rc(2)];
        let err = select_hops(&candidates, 4, &HashSet::new(), &[0u8; 32]).unwrap_err();
        assert!(matches!(err, PathError::InsufficientRelays { .. }));
    }

    #[test]
    fn excludes_self_and_excluded_set() {
        let candidates = vec![make_rc(1), make_rc(2), make_rc(3)];
        let mut exclude = HashSet::new();
        exclude.insert([2u8; 32]);
        let picked = select_hops(&candidates, 2, &exclude, &[1u8; 32]).unwrap();
        let ids: HashSet<RouterId> = picked.iter().map(|rc| rc.router_id).collect();
        assert!(!ids.contains(&[1u8; 32]));
        assert!(!ids.contains(&[2u8; 32]));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn diverse_paths_minimize_overlap_when_pool_is_large_enough() {
        let candidates: Vec<RouterContact> = (1u8..=12).map(make_rc).collect();
        let paths = select_diverse_paths(&candidates, 2, 3, &[0u8; 32]).unwrap();
        assert_eq!(paths.len(), 3);
        let mut seen = HashSet::new();
        for path in &paths {
            for hop in path {
                assert!(seen.insert(hop.router_id), "relay reused across diverse paths");
            }
        }
    }
}
