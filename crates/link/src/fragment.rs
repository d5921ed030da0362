use std::collections::HashMap;

use lokinet_crypto::{hmac, xchacha20};

use crate::error::{LinkError, Result};

/// Max plaintext payload carried inside one fragment's encrypted inner body (§4.3).
pub const MAX_FRAGMENT_PAYLOAD: usize = 512;
/// Max total UDP datagram size a fragment is packed into.
pub const MAX_PACKET_SIZE: usize = 1280;

const INNER_NONCE_LEN: usize = 24;
const OUTER_NONCE_LEN: usize = 32;
const MAC_LEN: usize = 32;

/// One on-wire fragment: `[32B mac][32B outer nonce][encrypted inner body]`, where the inner
/// body is `[24B inner nonce][4B id][2B offset][2B total][payload]` (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub id: u32,
    pub offset: u16,
    pub total: u16,
    pub payload: Vec<u8>,
}

impl Fragment {
    /// Encrypt and MAC this fragment under the session's stream/mac keys, ready to put on the
    /// wire. `outer_nonce` should be fresh per fragment.
    pub fn encode(&self, stream_key: &[u8; 32], mac_key: &[u8; 32], inner_nonce: [u8; 24], outer_nonce: [u8; 32]) -> Vec<u8> {
        let mut inner = Vec::with_capacity(INNER_NONCE_LEN + 8 + self.payload.len());
        inner.extend_from_slice(&inner_nonce);
        inner.extend_from_slice(&self.id.to_be_bytes());
        inner.extend_from_slice(&self.offset.to_be_bytes());
        inner.extend_from_slice(&self.total.to_be_bytes());
        inner.extend_from_slice(&self.payload);

        xchacha20(&mut inner, stream_key, &inner_nonce);

        let mut tail = Vec::with_capacity(OUTER_NONCE_LEN + inner.len());
        tail.extend_from_slice(&outer_nonce);
        tail.extend_from_slice(&inner);
        let mac = hmac(mac_key, &tail);

        let mut out = Vec::with_capacity(MAC_LEN + tail.len());
        out.extend_from_slice(&mac);
        out.extend_from_slice(&tail);
        out
    }

    /// Verify the MAC and decrypt a wire fragment. Returns `None` on MAC mismatch (dropped
    /// silently per §4.3, not surfaced as an error).
    pub fn decode(wire: &[u8], stream_key: &[u8; 32], mac_key: &[u8; 32]) -> Option<Self> {
        if wire.len() < MAC_LEN + OUTER_NONCE_LEN + INNER_NONCE_LEN + 8 {
            return None;
        }
        let (mac, tail) = wire.split_at(MAC_LEN);
        let expected = hmac(mac_key, tail);
        if !constant_time_eq(mac, &expected) {
            return None;
        }

        let (_outer_nonce, mut inner) = tail.split_at(OUTER_NONCE_LEN);
        let mut inner = inner.to_vec();
        let inner_nonce: [u8; INNER_NONCE_LEN] = inner[..INNER_NONCE_LEN].try_into().ok()?;
        xchacha20(&mut inner, stream_key, &inner_nonce);

        let id = u32::from_be_bytes(inner[INNER_NONCE_LEN..INNER_NONCE_LEN + 4].try_into().ok()?);
        let offset = u16::from_be_bytes(inner[INNER_NONCE_LEN + 4..INNER_NONCE_LEN + 6].try_into().ok()?);
        let total = u16::from_be_bytes(inner[INNER_NONCE_LEN + 6..INNER_NONCE_LEN + 8].try_into().ok()?);
        let payload = inner[INNER_NONCE_LEN + 8..].to_vec();
        Some(Fragment { id, offset, total, payload })
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Split a LinkMessage payload into ≤512 B fragments sharing one message id.
pub fn split(id: u32, payload: &[u8]) -> Vec<Fragment> {
    if payload.is_empty() {
        return vec![Fragment { id, offset: 0, total: 0, payload: Vec::new() }];
    }
    let total = payload.len() as u16;
    payload
        .chunks(MAX_FRAGMENT_PAYLOAD)
        .enumerate()
        .map(|(i, chunk)| Fragment {
            id,
            offset: (i * MAX_FRAGMENT_PAYLOAD) as u16,
            total,
            payload: chunk.to_vec(),
        })
        .collect()
}

struct Pending {
    total: u16,
    received: u16,
    chunks: HashMap<u16, Vec<u8>>,
}

/// Reassembles fragments into complete LinkMessages, deduplicating on `(id, offset)`.
#[derive(Default)]
pub struct Reassembler {
    pending: HashMap<u32, Pending>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self { pending: HashMap::new() }
    }

    /// Feed one fragment in. Returns the reassembled message once every byte of `total` has
    /// arrived.
    pub fn push(&mut self, frag: Fragment) -> Result<Option<Vec<u8>>> {
        if frag.total == 0 {
            return Ok(Some(Vec::new()));
        }
        let entry = self.pending.entry(frag.id).or_insert_with(|| Pending {
            total: frag.total,
            received: 0,
            chunks: HashMap::new(),
        });
        if entry.total != frag.total {
            return Err(LinkError::HandshakeFailed("fragment total mismatch within message id".into()));
        }
        if entry.chunks.insert(frag.offset, frag.payload).is_none() {
            entry.received += 1;
        }

        let bytes_received: usize = entry.chunks.values().map(Vec::len).sum();
        if bytes_received < entry.total as usize {
            return Ok(None);
        }

        let pending = self.pending.remove(&frag.id).expect("just inserted");
        let mut offsets: Vec<u16> = pending.chunks.keys().copied().collect();
        offsets.sort_unstable();
        let mut out = Vec::with_capacity(pending.total as usize);
        for offset in offsets {
            out.extend_from_slice(&pending.chunks[&offset]);
        }
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips() {
        let stream_key = [1u8; 32];
        let mac_key = [2u8; 32];
        let frag = Fragment { id: 9, offset: 0, total: 3, payload: vec![1, 2, 3] };
        let wire = frag.encode(&stream_key, &mac_key, [3u8; 24], [4u8; 32]);
        let decoded = Fragment::decode(&wire, &stream_key, &mac_key).unwrap();
        assert_eq!(decoded, frag);
    }

    #[test]
    fn tampered_mac_is_dropped() {
        let stream_key = [1u8; 32];
        let mac_key = [2u8; 32];
        let frag = Fragment { id: 9, offset: 0, total: 3, payload: vec![1, 2, 3] };
        let mut wire = frag.encode(&stream_key, &mac_key, [3u8; 24], [4u8; 32]);
        wire[0] ^= 0xff;
        assert!(Fragment::decode(&wire, &stream_key, &mac_key).is_none());
    }

    #[test]
    fn reassembler_joins_out_of_order_fragments() {
        let payload: Vec<u8> = (0..1200u32).map(|b| (b % 256) as u8).collect();
        let mut frags = split(1, &payload);
        frags.reverse();

        let mut reasm = Reassembler::new();
        let mut result = None;
        for frag in frags {
            result = reasm.push(frag).unwrap();
        }
        assert_eq!(result.unwrap(), payload);
    }

    #[test]
    fn reassembler_ignores_duplicate_offsets() {
        let payload = vec![1u8, 2, 3, 4];
        let frags = split(2, &payload);
        let mut reasm = Reassembler::new();
        assert!(reasm.push(frags[0].clone()).unwrap().is_none());
        assert!(reasm.push(frags[0].clone()).unwrap().is_none());
        let result = reasm.push(frags[0].clone()).unwrap();
        assert!(result.is_none(), "duplicate offset must not fake completion");
    }

    #[test]
    fn empty_payload_completes_immediately() {
        let mut reasm = Reassembler::new();
        let frag = Fragment { id: 5, offset: 0, total: 0, payload: Vec::new() };
        assert_eq!(reasm.push(frag).unwrap(), Some(Vec::new()));
    }
}
