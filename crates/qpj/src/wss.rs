//! The Work-Slot Set (WSS) — the per-queue poll-job registry and the poll
//! loop itself (`spec.md` §4.B, §4.D, §4.E).

use crate::ids::QueueHandle;
use crate::qlog::QueueContextScope;
use crate::record::{PollJobRecord, Verdict};
use crate::ticketlock::TicketLock;
use crate::{qdebug, qwarn};
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Number of producer-class groups a WSS can hold.
///
/// `spec.md` fixes this at 2 in the reference implementation ("all
/// packet-I/O receive jobs share one group, all timer jobs another").
pub const G_MAX: usize = 2;

/// Number of slots per group, per queue.
///
/// `spec.md` §6 leaves this implementation-defined (8 or 32) and calls the
/// 8-slot bitmask-occupancy variant canonical; see `SPEC_FULL.md` Open
/// Questions for the record of that choice. Occupancy is a `u8` bitmask,
/// so this must stay `<= 8`.
pub const S_MAX: usize = 8;

/// Outcome of a [`WorkSlotSet::poll`] call.
///
/// `n > 0` (`Delivered`) means events were written to the caller's buffer.
/// `Done` is informational, not an error — it tells the scheduler this WSS
/// is empty and can be skipped until someone `add`s. `Keep` means "still
/// active (or lock contended), try again".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Delivered(NonZeroUsize),
    Keep,
    Done,
}

struct GroupState<E> {
    members: VecDeque<PollJobRecord<E>>,
    /// Bitmask of occupied [`crate::ids::SlotIdx`] values within this group.
    occupancy: u8,
    count: u32,
}

impl<E> GroupState<E> {
    fn new() -> Self {
        GroupState { members: VecDeque::with_capacity(S_MAX), occupancy: 0, count: 0 }
    }
}

struct WssInner<E> {
    groups: [GroupState<E>; G_MAX],
    next_group: u8,
    nonempty_groups: u32,
}

/// Per-queue registry of poll jobs: `{ lock, groups[G_MAX], next_group, nonempty_groups }`.
///
/// All mutation goes through a strict-FIFO [`TicketLock`] so that a rare
/// `add` caller and the much more frequent `poll` callers cannot starve
/// each other, and so `poll`'s `try_lock` fast path has a well-defined
/// meaning (`spec.md` §4.B).
pub struct WorkSlotSet<E> {
    lock: TicketLock<WssInner<E>>,
}

impl<E> WorkSlotSet<E> {
    /// Construct an empty WSS: no groups populated, lock unheld.
    pub fn new() -> Self {
        WorkSlotSet {
            lock: TicketLock::new(WssInner {
                groups: core::array::from_fn(|_| GroupState::new()),
                next_group: 0,
                nonempty_groups: 0,
            }),
        }
    }

    /// Reset every group to empty. Idempotent; equivalent to a fresh
    /// [`WorkSlotSet::new`], kept separate for callers that embed a WSS in
    /// pooled, reusable queue storage instead of allocating a new one per
    /// queue.
    pub fn init(&mut self) {
        let mut inner = self.lock.lock();
        for group in inner.groups.iter_mut() {
            group.members.clear();
            group.occupancy = 0;
            group.count = 0;
        }
        inner.next_group = 0;
        inner.nonempty_groups = 0;
    }

    /// Register a poll job (`spec.md` §4.E).
    ///
    /// Idempotent: if `(record.group(), record.slot())` is already
    /// occupied, this is a silent no-op and the prior registration wins
    /// (I4). An out-of-range group or slot is also a silent no-op (logged
    /// at `warn`) rather than a panic — a producer mis-registering itself
    /// should not be able to take down the queue it's registering against.
    pub fn add(&self, record: PollJobRecord<E>) {
        let mut inner = self.lock.lock();
        let g = record.group().as_usize();
        let s = record.slot().as_usize();
        if g >= G_MAX || s >= S_MAX {
            qwarn!("wss_add: out-of-range registration (group={}, slot={}) ignored", g, s);
            return;
        }
        let mask = 1u8 << s;
        if inner.groups[g].occupancy & mask != 0 {
            qdebug!("wss_add: slot busy (group={}, slot={}), dropping duplicate registration", g, s);
            return;
        }
        if inner.groups[g].count == 0 {
            inner.nonempty_groups += 1;
        }
        inner.groups[g].occupancy |= mask;
        inner.groups[g].count += 1;
        inner.groups[g].members.push_back(record);
    }

    /// Drain one group's worth of events into `out` (`spec.md` §4.D).
    ///
    /// `out.len()` is the caller's `want`. Visits exactly one group per
    /// call (rotating via `next_group`), serving each of that group's
    /// members at most once (sampled at loop entry, so a record re-queued
    /// at the tail mid-call is never served twice in the same `poll`).
    /// Records that return [`Verdict::Done`] are unregistered in the same
    /// critical section; records that return [`Verdict::Keep`] move to the
    /// tail of the group, giving every member an equal share of future
    /// calls.
    pub fn poll(&self, queue: QueueHandle, out: &mut [E]) -> PollOutcome {
        // Tags any log line emitted for the rest of this call (including the
        // DONE-driven reap below) with the queue this poll is acting on;
        // cleared on every return path, including the early ones below.
        let _log_ctx = QueueContextScope::enter(queue.0);

        let mut inner = match self.lock.try_lock() {
            Some(guard) => guard,
            None => return PollOutcome::Keep, // P1: contended, not empty
        };

        if inner.nonempty_groups == 0 {
            return PollOutcome::Done; // P2
        }

        if inner.next_group as usize == G_MAX {
            inner.next_group = 0; // P3: normalise wraparound
        }
        let g = inner.next_group as usize;
        inner.next_group += 1; // P4: advance for next call, rotating groups

        let want = out.len();
        let visit_budget = inner.groups[g].count; // P5: sampled at entry
        let mut total = 0usize;
        let mut visited = 0u32;

        while total < want && visited < visit_budget {
            let mut record = match inner.groups[g].members.pop_front() {
                Some(r) => r,
                None => break,
            };
            visited += 1;

            // Safety: `inner` is the locked guard for this WSS, and no
            // other thread can be inside this critical section.
            let (verdict, produced) = unsafe { record.deq(queue, &mut out[total..want]) };
            total += produced;

            match verdict {
                Verdict::Done => {
                    let mask = 1u8 << record.slot().as_usize();
                    inner.groups[g].occupancy &= !mask;
                    inner.groups[g].count -= 1;
                    if inner.groups[g].count == 0 {
                        inner.nonempty_groups -= 1;
                    }
                    qdebug!("wss_poll: reaped DONE record (group={}, slot={})", g, record.slot());
                }
                Verdict::Keep => {
                    inner.groups[g].members.push_back(record);
                }
            }
        }

        if let Some(n) = NonZeroUsize::new(total) {
            PollOutcome::Delivered(n)
        } else if inner.nonempty_groups == 0 {
            PollOutcome::Done
        } else {
            PollOutcome::Keep
        }
    }

    /// Snapshot of whether any group currently holds a registered job.
    ///
    /// Takes the full lock (per `spec.md` §4.B), so it never races a
    /// concurrent `add`/`poll` mid-mutation — but it is still only a
    /// snapshot the instant it returns. No caller may use it to gate a
    /// subsequent *unlocked* mutation of the WSS (`spec.md` §9).
    pub fn has_jobs(&self) -> bool {
        self.lock.lock().nonempty_groups > 0
    }
}

impl<E> Default for WorkSlotSet<E> {
    fn default() -> Self {
        Self::new()
    }
}
