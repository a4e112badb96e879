//! Poll job records and the dequeue callback contract (`spec.md` §4.C).
//!
//! The source stores a C function pointer plus a `void* data` context. Per
//! `spec.md` §9's redesign note, that pair is replaced with a single
//! polymorphic capability: [`PollSource`]. Each producer (packet RX, timer,
//! IPC, ...) implements it once; the WSS holds one uniform, non-owning
//! handle to it, the same way `ksvc_core::worker::WorkerPool` and
//! `ksvc_core::io_backend::IoBackend` give the dispatcher one uniform
//! `poll_completions`-shaped entry point over heterogeneous backends.

use crate::ids::{GroupIdx, QueueHandle, SlotIdx};

/// Verdict a [`PollSource`] returns after a dequeue attempt.
///
/// `Keep` means "I may have more events later, call me again"; `Done` means
/// "unregister me" (exhausted source, fatal error, or cancellation) — see
/// `spec.md` §4.C and §7 (`ProducerFatal`). There is no numeric KEEP/DONE
/// sentinel to collide with a real event count here; that was the open
/// question `spec.md` §9 flags, and a dedicated enum sidesteps it entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Done,
}

/// One producer's event source, as seen by the dispatcher.
///
/// # Contract (`spec.md` §4.C)
///
/// - `deq` writes `0..=out.len()` events into `out`, starting at index 0,
///   and returns `(verdict, num_written)`.
/// - Must be non-blocking or bounded-latency: the WSS lock is held across
///   the call. A source that would otherwise block must return
///   `(Verdict::Keep, 0)` instead.
/// - Never invoked concurrently on the same WSS for the same record (the
///   WSS lock serializes all callers of a given queue's registry), but may
///   be invoked concurrently across *different* WSS instances holding
///   distinct records backed by the same `PollSource` impl, if the
///   producer chooses to share one. Most producers will not.
pub trait PollSource<E>: Send {
    fn deq(&mut self, queue: QueueHandle, out: &mut [E]) -> (Verdict, usize);
}

/// A registered poll job: `{ source, group, slot }`.
///
/// # Ownership
///
/// The record's backing [`PollSource`] is owned by the producer module,
/// which guarantees it outlives registration. The WSS stores only a
/// non-owning pointer — removing a record from the WSS does not drop the
/// pointee, exactly as `spec.md`'s lifecycle section specifies. This is
/// the same non-owning-raw-pointer shape as this workspace's
/// `ksvc_core::buffer::BufferHandle` and `ksvc_executor::SubmitRing`.
pub struct PollJobRecord<E> {
    source: *mut dyn PollSource<E>,
    group: GroupIdx,
    slot: SlotIdx,
}

// Safety: the pointee is `Send` (the `PollSource<E>` bound requires it) and
// the producer guarantees exclusive access is never granted to two WSS
// instances at once (I6 — "a record exists in exactly one WSS at a time").
unsafe impl<E> Send for PollJobRecord<E> {}

impl<E> PollJobRecord<E> {
    /// Build a poll job record over `source`.
    ///
    /// # Safety
    ///
    /// The caller must ensure `source` remains valid and is not mutated or
    /// read through any other alias for as long as the record stays
    /// registered in a [`crate::wss::WorkSlotSet`] — i.e. for as long as
    /// `wss_add` might still hand it to `poll`. This mirrors `spec.md`'s
    /// lifecycle step 3 ("the record becomes live") and its ownership note
    /// that the producer module supplies and retains the storage.
    pub unsafe fn new(source: *mut dyn PollSource<E>, group: GroupIdx, slot: SlotIdx) -> Self {
        PollJobRecord { source, group, slot }
    }

    #[inline]
    pub fn group(&self) -> GroupIdx {
        self.group
    }

    #[inline]
    pub fn slot(&self) -> SlotIdx {
        self.slot
    }

    /// Invoke the underlying source's `deq`.
    ///
    /// # Safety
    ///
    /// Must only be called while holding the WSS lock for the WSS this
    /// record is registered in, and only while the pointee remains valid
    /// per the contract established in [`Self::new`].
    #[inline]
    pub(crate) unsafe fn deq(&mut self, queue: QueueHandle, out: &mut [E]) -> (Verdict, usize) {
        (*self.source).deq(queue, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneShot {
        value: u32,
        done: bool,
    }

    impl PollSource<u32> for OneShot {
        fn deq(&mut self, _queue: QueueHandle, out: &mut [u32]) -> (Verdict, usize) {
            if self.done || out.is_empty() {
                return (Verdict::Done, 0);
            }
            out[0] = self.value;
            self.done = true;
            (Verdict::Done, 1)
        }
    }

    #[test]
    fn record_dequeues_through_the_non_owning_pointer() {
        let mut source = OneShot { value: 99, done: false };
        let mut rec = unsafe {
            PollJobRecord::new(&mut source as *mut dyn PollSource<u32>, GroupIdx::new(0), SlotIdx::new(0))
        };
        let mut out = [0u32; 4];
        let (verdict, n) = unsafe { rec.deq(QueueHandle::new(1), &mut out) };
        assert_eq!(verdict, Verdict::Done);
        assert_eq!(n, 1);
        assert_eq!(out[0], 99);
        // The record did not take ownership — `source` is still reachable
        // and reflects the mutation `deq` made through the pointer.
        assert!(source.done);
    }
}
