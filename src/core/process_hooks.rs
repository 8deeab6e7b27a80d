//! Process-level panic reporting
//!
//! Panics that the pipeline contains itself (a failing transport or plugin)
//! never reach this hook's logging path; they are reported through the
//! last-resort channel instead.

use super::log_data::{ErrorInfo, LogData};
use super::log_entry::Source;
use super::log_level::LogLevel;
use super::logger::Logger;
use super::transport::in_isolation;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::panic::{self, PanicHookInfo};
use std::thread;

thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

/// Message logged for a panic on `thread_name`
pub(crate) fn panic_summary(thread_name: &str, payload: &str) -> String {
    format!("Uncaught panic in thread '{}': {}", thread_name, payload)
}

fn payload_str(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Log every panic through `logger`, then run the previously installed hook
///
/// With `exit_on_error`, the process exits with status 1 once the panic is
/// logged and flushed.
pub fn install_panic_hook(logger: Logger, exit_on_error: bool) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let reentrant = IN_HOOK.with(|flag| flag.replace(true));
        if !reentrant && !in_isolation() && !logger.is_closed() {
            report_panic(&logger, info);
            IN_HOOK.with(|flag| flag.set(false));
            previous(info);
            if exit_on_error {
                std::process::exit(1);
            }
            return;
        }
        if !reentrant {
            IN_HOOK.with(|flag| flag.set(false));
        }
        previous(info);
    }));
}

fn report_panic(logger: &Logger, info: &PanicHookInfo<'_>) {
    let payload = payload_str(info);
    let thread = thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");

    let error = ErrorInfo::new("Panic", payload.as_str())
        .with_stack(Backtrace::force_capture().to_string());
    let source = info
        .location()
        .map(|location| Source::new(location.file(), location.line(), None))
        .unwrap_or_else(|| Source::new("<unknown>", 0, None));

    let _ = logger.log_at(
        LogLevel::Error,
        panic_summary(thread_name, &payload),
        Some(LogData::Error(error)),
        None,
        source,
    );
    logger.flush();
}
