//! Small opaque identifier types, in the style of this workspace's
//! `#[repr(transparent)]` newtypes (`entry::CorrId`, `id::GVThreadId`).

use core::fmt;

/// Identifies a producer class ("all packet-RX jobs", "all timer jobs", ...).
///
/// Allocated once per producer module via [`crate::group::reserve_group`] and
/// memoised by the caller; never freed, never recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct GroupIdx(u8);

impl GroupIdx {
    #[inline]
    pub(crate) const fn new(idx: u8) -> Self {
        GroupIdx(idx)
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GroupIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Identifies a position inside a group, unique per queue.
///
/// Chosen by the caller at registration time (not allocated by QPJ); must
/// be `< S_MAX` (see [`crate::wss::S_MAX`]) and unique within `(queue, group)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SlotIdx(u8);

impl SlotIdx {
    /// Construct a slot index. Validity against `S_MAX` is checked by
    /// [`crate::wss::WorkSlotSet::add`], not here — the type itself only
    /// carries the value.
    #[inline]
    pub const fn new(idx: u8) -> Self {
        SlotIdx(idx)
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Opaque identifier of the owning event queue, passed through to poll
/// callbacks unchanged. QPJ never inspects its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct QueueHandle(pub u64);

impl QueueHandle {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        QueueHandle(raw)
    }
}

impl fmt::Display for QueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_idx_round_trips() {
        let g = GroupIdx::new(1);
        assert_eq!(g.as_usize(), 1);
        assert_eq!(format!("{}", g), "g1");
    }

    #[test]
    fn slot_idx_round_trips() {
        let s = SlotIdx::new(3);
        assert_eq!(s.as_usize(), 3);
        assert_eq!(format!("{}", s), "s3");
    }

    #[test]
    fn queue_handle_is_opaque_passthrough() {
        let q = QueueHandle::new(0xdead_beef);
        assert_eq!(q.0, 0xdead_beef);
    }
}
