//! Kernel-style leveled debug printing, ported from this workspace's
//! `gvthread-core::kprint` macros.
//!
//! QPJ has no worker/GVThread context to tag output with, so the per-thread
//! `[w<id>:g<id>]` prefix is replaced with whichever [`crate::ids::QueueHandle`]
//! the caller is currently acting on, set via [`set_queue_context`] (or the
//! [`QueueContextScope`] RAII wrapper) for the duration of a `poll` call —
//! the only WSS operation that is handed a `QueueHandle` at all; `add` has
//! none to tag its own log lines with and keeps printing the `[q--]`
//! placeholder.
//!
//! # Environment variables
//!
//! - `QPJ_LOG_LEVEL` — `off`/`error`/`warn`/`info`/`debug`/`trace` (default `warn`)
//! - `QPJ_LOG_TIME` — include a nanosecond timestamp when truthy (default off)

use crate::env::{env_get_bool, env_get};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Instant;

/// Log levels, ordered least to most verbose.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "info" | "3" => LogLevel::Info,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => LogLevel::Warn,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);
static TIME_ENABLED: AtomicBool = AtomicBool::new(false);
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

thread_local! {
    static QUEUE_CTX: std::cell::Cell<Option<u64>> = const { std::cell::Cell::new(None) };
}

fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    START_TIME.get_or_init(Instant::now);
    let level: String = env_get("QPJ_LOG_LEVEL", "warn".to_string());
    LOG_LEVEL.store(LogLevel::from_str_lossy(&level) as u8, Ordering::Relaxed);
    TIME_ENABLED.store(env_get_bool("QPJ_LOG_TIME", false), Ordering::Relaxed);
}

/// Set the log level programmatically (overrides `QPJ_LOG_LEVEL`).
pub fn set_log_level(level: LogLevel) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

#[inline]
fn log_level() -> LogLevel {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    match LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Off,
        1 => LogLevel::Error,
        2 => LogLevel::Warn,
        3 => LogLevel::Info,
        4 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

#[inline]
fn level_enabled(level: LogLevel) -> bool {
    level as u8 <= log_level() as u8
}

#[inline]
fn elapsed_ns() -> u64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

/// Tag subsequent log output on this thread with `queue` until cleared.
pub fn set_queue_context(queue: u64) {
    QUEUE_CTX.with(|c| c.set(Some(queue)));
}

/// Clear the queue context set by [`set_queue_context`].
pub fn clear_queue_context() {
    QUEUE_CTX.with(|c| c.set(None));
}

/// RAII wrapper around [`set_queue_context`]/[`clear_queue_context`].
///
/// Tags log output on this thread with `queue` for the scope's lifetime,
/// clearing it on drop regardless of which return path is taken — needed
/// because [`crate::wss::WorkSlotSet::poll`] has several early-return points
/// (contended lock, empty WSS) that must not leak a stale context into the
/// next call on this thread.
pub struct QueueContextScope {
    _private: (),
}

impl QueueContextScope {
    pub fn enter(queue: u64) -> Self {
        set_queue_context(queue);
        QueueContextScope { _private: () }
    }
}

impl Drop for QueueContextScope {
    fn drop(&mut self) {
        clear_queue_context();
    }
}

fn format_context() -> String {
    QUEUE_CTX.with(|c| match c.get() {
        Some(q) => format!("[q{}]", q),
        None => "[q--]".to_string(),
    })
}

#[doc(hidden)]
pub fn _qlog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }
    use std::io::Write;
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = write!(handle, "{} ", level.prefix());
    if TIME_ENABLED.load(Ordering::Relaxed) {
        let _ = write!(handle, "[{}] ", elapsed_ns());
    }
    let _ = write!(handle, "{} ", format_context());
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
}

/// Error-level log with queue context.
#[macro_export]
macro_rules! qerror {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl($crate::qlog::LogLevel::Error, format_args!($($arg)*));
    }};
}

/// Warning-level log with queue context.
#[macro_export]
macro_rules! qwarn {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl($crate::qlog::LogLevel::Warn, format_args!($($arg)*));
    }};
}

/// Info-level log with queue context.
#[macro_export]
macro_rules! qinfo {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl($crate::qlog::LogLevel::Info, format_args!($($arg)*));
    }};
}

/// Debug-level log with queue context.
#[macro_export]
macro_rules! qdebug {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl($crate::qlog::LogLevel::Debug, format_args!($($arg)*));
    }};
}

/// Trace-level log with queue context. Not called from the `poll` hot path —
/// per-record tracing there would itself violate the bounded-latency
/// contract `poll` holds its callers to.
#[macro_export]
macro_rules! qtrace {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl($crate::qlog::LogLevel::Trace, format_args!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn from_str_lossy_unrecognized_falls_back_to_warn() {
        assert_eq!(LogLevel::from_str_lossy("nonsense"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_lossy("trace"), LogLevel::Trace);
    }

    #[test]
    fn macros_compile_and_respect_off_level() {
        set_log_level(LogLevel::Off);
        qerror!("should not print {}", 1);
        qwarn!("should not print");
        qinfo!("should not print");
        qdebug!("should not print");
        qtrace!("should not print");
    }

    #[test]
    fn queue_context_round_trips() {
        set_queue_context(7);
        assert_eq!(format_context(), "[q7]");
        clear_queue_context();
        assert_eq!(format_context(), "[q--]");
    }

    #[test]
    fn queue_context_scope_clears_on_drop() {
        assert_eq!(format_context(), "[q--]");
        {
            let _scope = QueueContextScope::enter(42);
            assert_eq!(format_context(), "[q42]");
        }
        assert_eq!(format_context(), "[q--]");
    }
}
