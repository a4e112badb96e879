//! Exercises two groups of producers round-robining through one queue's
//! work-slot set and prints what gets delivered — a smoke test of the
//! fairness behavior doubling as a worked usage example.
//!
//! # Environment Variables
//!
//! - `QPJ_DEMO_RX_PRODUCERS=<n>` - packet-RX producers in group 0 (default: 3)
//! - `QPJ_DEMO_TIMER_PRODUCERS=<n>` - timer producers in group 1 (default: 2)
//! - `QPJ_DEMO_EVENTS_PER_PRODUCER=<n>` - events each produces before going quiet (default: 4)
//! - `QPJ_DEMO_ROUNDS=<n>` - poll calls to run (default: 40)
//! - `QPJ_LOG_LEVEL=debug` - qpj's own log verbosity

use qpj::ids::{GroupIdx, QueueHandle, SlotIdx};
use qpj::record::{PollJobRecord, PollSource, Verdict};
use qpj::wss::{PollOutcome, WorkSlotSet};
use qpj::{env_get, qinfo, QpjConfig};
use std::collections::HashMap;

/// A producer that emits one event per call, `remaining` times, then `Done`.
struct Producer {
    label: &'static str,
    id: usize,
    remaining: u32,
}

impl PollSource<String> for Producer {
    fn deq(&mut self, _queue: QueueHandle, out: &mut [String]) -> (Verdict, usize) {
        if out.is_empty() || self.remaining == 0 {
            return (Verdict::Done, 0);
        }
        out[0] = format!("{}#{}", self.label, self.id);
        self.remaining -= 1;
        if self.remaining == 0 {
            (Verdict::Done, 1)
        } else {
            (Verdict::Keep, 1)
        }
    }
}

fn main() {
    QpjConfig::from_env().apply();

    let rx_producers: usize = env_get("QPJ_DEMO_RX_PRODUCERS", 3);
    let timer_producers: usize = env_get("QPJ_DEMO_TIMER_PRODUCERS", 2);
    let events_each: u32 = env_get("QPJ_DEMO_EVENTS_PER_PRODUCER", 4);
    let rounds: usize = env_get("QPJ_DEMO_ROUNDS", 40);

    println!("=== QPJ round-robin demo ===\n");
    println!("Configuration:");
    println!("  RX producers (group 0): {}", rx_producers);
    println!("  Timer producers (group 1): {}", timer_producers);
    println!("  Events per producer: {}", events_each);
    println!("  Poll rounds: {}\n", rounds);

    let rx_group = qpj::reserve_group().expect("reserve RX group");
    let timer_group = qpj::reserve_group().expect("reserve timer group");

    let mut rx: Vec<Producer> =
        (0..rx_producers).map(|id| Producer { label: "rx", id, remaining: events_each }).collect();
    let mut timers: Vec<Producer> =
        (0..timer_producers).map(|id| Producer { label: "timer", id, remaining: events_each }).collect();

    let wss: WorkSlotSet<String> = WorkSlotSet::new();
    let queue = QueueHandle::new(1);

    for (slot, producer) in rx.iter_mut().enumerate() {
        // Safety: `rx` outlives `wss` within this function's scope.
        let record = unsafe {
            PollJobRecord::new(producer as *mut dyn PollSource<String>, rx_group, SlotIdx::new(slot as u8))
        };
        wss.add(record);
    }
    for (slot, producer) in timers.iter_mut().enumerate() {
        let record = unsafe {
            PollJobRecord::new(
                producer as *mut dyn PollSource<String>,
                timer_group,
                SlotIdx::new(slot as u8),
            )
        };
        wss.add(record);
    }

    qinfo!(
        "registered {} RX producers in {} and {} timer producers in {}",
        rx_producers,
        rx_group,
        timer_producers,
        timer_group
    );

    let mut tally: HashMap<String, u32> = HashMap::new();
    let mut total_delivered = 0usize;
    for round in 0..rounds {
        let mut out = vec![String::new(); 4];
        match wss.poll(queue, &mut out) {
            PollOutcome::Delivered(n) => {
                for label in out.into_iter().take(n.get()) {
                    *tally.entry(label).or_insert(0) += 1;
                }
                total_delivered += n.get();
            }
            PollOutcome::Done => {
                println!("round {:3}: queue is empty, stopping early", round);
                break;
            }
            PollOutcome::Keep => {
                println!("round {:3}: lock contended, nothing delivered", round);
            }
        }
    }

    println!("\nDelivered {} events total:", total_delivered);
    let mut labels: Vec<_> = tally.into_iter().collect();
    labels.sort();
    for (label, count) in labels {
        println!("  {:<12} {}", label, count);
    }
}
