use duet_core::IceCandidate;
use std::collections::VecDeque;
use tracing::debug;

/// A remote candidate that arrived before it could be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    /// Arrival order within the session, starting at 0.
    pub seq: u64,
    pub candidate: IceCandidate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Held until the remote description exists.
    Buffered { seq: u64 },
    /// The buffer was already drained; apply this one right away.
    ApplyNow(IceCandidate),
}

/// Holds remote candidates until the remote description is applied, then
/// hands them over once, in arrival order.
#[derive(Debug, Default)]
pub struct IceCandidateBuffer {
    queue: VecDeque<CandidateRecord>,
    next_seq: u64,
    drained: bool,
}

impl IceCandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, candidate: IceCandidate) -> Admission {
        if self.drained {
            return Admission::ApplyNow(candidate);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push_back(CandidateRecord { seq, candidate });
        debug!("Buffered remote candidate #{}", seq);
        Admission::Buffered { seq }
    }

    /// Returns every buffered candidate, oldest first, the first time it is
    /// called with a remote description present. Afterwards the buffer stays
    /// empty for good.
    pub fn drain_if_ready(&mut self, has_remote_description: bool) -> Vec<IceCandidate> {
        if !has_remote_description || self.drained {
            return Vec::new();
        }

        self.drained = true;
        self.queue.drain(..).map(|r| r.candidate).collect()
    }

    /// Throws away anything still queued without applying it.
    pub fn discard(&mut self) {
        self.queue.clear();
        self.drained = true;
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
