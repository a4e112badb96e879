//! # qpj
//!
//! Queue Poll-Job Dispatcher: a concurrent, bounded, per-queue registry of
//! poll jobs used to drain events from external producers (packet I/O,
//! timers, IPC) into a unified event queue.
//!
//! A producer module reserves a [`GroupIdx`] once at startup via
//! [`group::reserve_group`], then registers one [`record::PollJobRecord`]
//! per `(queue, slot)` it wants serviced into that queue's
//! [`wss::WorkSlotSet`] via [`wss::WorkSlotSet::add`]. The scheduler drains
//! a queue by calling [`wss::WorkSlotSet::poll`] on every pass; each call
//! visits exactly one group, round-robining both across groups and across
//! members within the visited group, so no single producer can starve its
//! peers.
//!
//! ```
//! use qpj::ids::{QueueHandle, SlotIdx};
//! use qpj::record::{PollJobRecord, PollSource, Verdict};
//! use qpj::wss::{PollOutcome, WorkSlotSet};
//!
//! struct Counter(u32);
//! impl PollSource<u32> for Counter {
//!     fn deq(&mut self, _queue: QueueHandle, out: &mut [u32]) -> (Verdict, usize) {
//!         if self.0 == 0 || out.is_empty() {
//!             return (Verdict::Done, 0);
//!         }
//!         out[0] = self.0;
//!         self.0 -= 1;
//!         (Verdict::Keep, 1)
//!     }
//! }
//!
//! let group = qpj::reserve_group().expect("a fresh group is available");
//! let wss: WorkSlotSet<u32> = WorkSlotSet::new();
//! let mut source = Counter(3);
//! // Safety: `source` outlives the record below.
//! let record = unsafe {
//!     PollJobRecord::new(&mut source as *mut dyn PollSource<u32>, group, SlotIdx::new(0))
//! };
//! wss.add(record);
//!
//! let mut out = [0u32; 1];
//! let delivered = std::num::NonZeroUsize::new(1).unwrap();
//! assert_eq!(wss.poll(QueueHandle::new(1), &mut out), PollOutcome::Delivered(delivered));
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod group;
pub mod ids;
pub mod qlog;
pub mod record;
pub mod ticketlock;
pub mod wss;

// Re-exports for convenience — the common path through this crate needs
// none of the submodule paths above.
pub use config::QpjConfig;
pub use env::{env_get, env_get_bool};
pub use error::{QpjError, Result};
pub use group::reserve_group;
pub use ids::{GroupIdx, QueueHandle, SlotIdx};
pub use record::{PollJobRecord, PollSource, Verdict};
pub use wss::{PollOutcome, WorkSlotSet, G_MAX, S_MAX};
