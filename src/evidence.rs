//! Cryptographic evidence chaining for forensic snapshots
//!
//! Incident history must be able to prove that a reported timeline was not
//! retroactively edited. [`EvidenceChain`] links SHA-256 digests of
//! successive snapshots: each digest commits to the previous digest plus the
//! canonical form of every event in the batch, so altering recorded history
//! breaks the chain downstream of the edit.

use sha2::{Digest, Sha256};

use crate::event::ForensicEvent;

/// Hex characters of a parent digest recorded in each link for the
/// no-recompute verification walk.
const LINK_PREFIX_LEN: usize = 8;

/// One link in the chain: a snapshot digest plus the truncated prefix of the
/// digest it was chained onto (`None` for the first snapshot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    digest: String,
    parent_prefix: Option<String>,
}

impl ChainLink {
    /// Hex-encoded SHA-256 digest of this snapshot
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// Append-only chain of custody over snapshot digests.
///
/// Each [`EvidenceChain::add_snapshot`] digest is a function of the previous
/// digest (if any) and the [`ForensicEvent::stable_repr`] of every event in
/// the batch, in supplied order. The chain can be verified end-to-end at any
/// time without external state.
///
/// Verification walks recorded linkage prefixes instead of recomputing
/// digests from raw events: any single altered digest, recorded prefix or
/// head is caught, but a forged digest whose first 8 hex characters collide
/// with the true predecessor prefix passes, as does a coordinated rewrite of
/// a digest together with its successor's recorded prefix and the head.
#[derive(Debug, Clone, Default)]
pub struct EvidenceChain {
    links: Vec<ChainLink>,
    head: Option<String>,
}

impl EvidenceChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            head: None,
        }
    }

    /// Chain a snapshot of events onto the current head.
    ///
    /// Returns the new head digest. Deterministic: repeating the exact same
    /// sequence of calls from a fresh chain reproduces the digest list.
    pub fn add_snapshot(&mut self, events: &[ForensicEvent]) -> String {
        let mut hasher = Sha256::new();

        // Chain with the previous snapshot
        if let Some(prev) = &self.head {
            hasher.update(prev.as_bytes());
        }

        // Hash the current snapshot deterministically
        for event in events {
            hasher.update(event.stable_repr().as_bytes());
        }

        let digest = hex::encode(hasher.finalize());
        let parent_prefix = self
            .head
            .as_deref()
            .and_then(|d| d.get(..LINK_PREFIX_LEN))
            .map(str::to_string);

        self.links.push(ChainLink {
            digest: digest.clone(),
            parent_prefix,
        });
        self.head = Some(digest.clone());
        digest
    }

    /// Verify chain integrity without recomputing digests.
    ///
    /// Checks that the first link has no parent, that every later link's
    /// recorded parent prefix matches its stored predecessor, and that the
    /// head equals the final stored digest. `true` for an empty chain.
    pub fn verify(&self) -> bool {
        match (self.links.last(), self.head.as_deref()) {
            (None, None) => return true,
            (Some(last), Some(head)) if last.digest == head => {}
            _ => return false,
        }

        let mut prev: Option<&str> = None;
        for link in &self.links {
            match (prev, link.parent_prefix.as_deref()) {
                (None, None) => {}
                (Some(parent), Some(recorded)) => {
                    let Some(expected) = parent.get(..LINK_PREFIX_LEN) else {
                        return false;
                    };
                    if recorded != expected {
                        return false;
                    }
                }
                _ => return false,
            }
            prev = Some(&link.digest);
        }
        true
    }

    /// Most recent digest, if any snapshot has been chained
    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    /// Stored digests in chain order
    pub fn digests(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|link| link.digest.as_str())
    }

    /// Number of chained snapshots
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True if no snapshot has been chained yet
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// One-shot deterministic digest over a replay.
///
/// The compact form reporting consumers stamp on output: SHA-256 over the
/// `stable_repr` of every event in order, hex-encoded. Unlike the chain this
/// carries no linkage, so it only identifies a timeline, it does not prove
/// append-only history.
pub fn evidence_hash(events: &[ForensicEvent]) -> String {
    let mut hasher = Sha256::new();
    for event in events {
        hasher.update(event.stable_repr().as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Payload;

    fn events(n: u64) -> Vec<ForensicEvent> {
        (0..n)
            .map(|seq| {
                ForensicEvent::new(
                    seq,
                    seq as i64 * 100,
                    "process_start",
                    Payload::new().with("pid", seq),
                )
            })
            .collect()
    }

    #[test]
    fn test_add_snapshot_is_deterministic() {
        let batch_a = events(3);
        let batch_b = events(2);

        let mut first = EvidenceChain::new();
        let mut second = EvidenceChain::new();
        first.add_snapshot(&batch_a);
        first.add_snapshot(&batch_b);
        second.add_snapshot(&batch_a);
        second.add_snapshot(&batch_b);

        let a: Vec<&str> = first.digests().collect();
        let b: Vec<&str> = second.digests().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_depends_on_previous_snapshot() {
        let batch = events(2);

        let mut chained = EvidenceChain::new();
        chained.add_snapshot(&events(1));
        let linked = chained.add_snapshot(&batch);

        let mut fresh = EvidenceChain::new();
        let unlinked = fresh.add_snapshot(&batch);

        assert_ne!(linked, unlinked);
    }

    #[test]
    fn test_verify_empty_chain() {
        assert!(EvidenceChain::new().verify());
    }

    #[test]
    fn test_verify_unmodified_chain() {
        let mut chain = EvidenceChain::new();
        chain.add_snapshot(&events(3));
        chain.add_snapshot(&events(1));
        chain.add_snapshot(&events(4));
        assert!(chain.verify());
    }

    #[test]
    fn test_verify_detects_altered_middle_digest() {
        let mut chain = EvidenceChain::new();
        chain.add_snapshot(&events(3));
        chain.add_snapshot(&events(2));
        chain.add_snapshot(&events(1));

        chain.links[1].digest = evidence_hash(&events(9));
        assert!(!chain.verify());
    }

    #[test]
    fn test_verify_detects_altered_final_digest() {
        let mut chain = EvidenceChain::new();
        chain.add_snapshot(&events(3));
        chain.add_snapshot(&events(2));

        chain.links[1].digest = evidence_hash(&events(9));
        assert!(!chain.verify());
    }

    #[test]
    fn test_verify_detects_altered_parent_prefix() {
        let mut chain = EvidenceChain::new();
        chain.add_snapshot(&events(3));
        chain.add_snapshot(&events(2));

        chain.links[1].parent_prefix = Some("00000000".to_string());
        assert!(!chain.verify());
    }

    #[test]
    fn test_verify_detects_truncated_digest() {
        let mut chain = EvidenceChain::new();
        chain.add_snapshot(&events(3));
        chain.add_snapshot(&events(2));

        chain.links[0].digest.truncate(4);
        assert!(!chain.verify());
    }

    #[test]
    fn test_verify_detects_altered_head() {
        let mut chain = EvidenceChain::new();
        chain.add_snapshot(&events(3));

        chain.head = Some(evidence_hash(&events(9)));
        assert!(!chain.verify());
    }

    #[test]
    fn test_head_tracks_latest_digest() {
        let mut chain = EvidenceChain::new();
        assert!(chain.head().is_none());

        let first = chain.add_snapshot(&events(1));
        assert_eq!(chain.head(), Some(first.as_str()));

        let second = chain.add_snapshot(&events(2));
        assert_eq!(chain.head(), Some(second.as_str()));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_evidence_hash_deterministic() {
        let batch = events(5);
        assert_eq!(evidence_hash(&batch), evidence_hash(&batch));
        assert_eq!(evidence_hash(&batch).len(), 64);
    }

    #[test]
    fn test_evidence_hash_sensitive_to_content() {
        assert_ne!(evidence_hash(&events(5)), evidence_hash(&events(4)));
    }

    #[test]
    fn test_evidence_hash_payload_order_invariant() {
        let a = vec![ForensicEvent::new(
            0,
            1,
            "process_start",
            Payload::new().with("pid", 1).with("image", "x.exe"),
        )];
        let b = vec![ForensicEvent::new(
            0,
            1,
            "process_start",
            Payload::new().with("image", "x.exe").with("pid", 1),
        )];
        assert_eq!(evidence_hash(&a), evidence_hash(&b));
    }
}
