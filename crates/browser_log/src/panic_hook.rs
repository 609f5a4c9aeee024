//! Panic hook for crash reporting

use backtrace::Backtrace;
use chrono::Local;
use std::any::Any;
use std::panic::PanicHookInfo;

/// Initialize the panic hook for crash reporting
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook initialized");
}

fn panic_handler(info: &PanicHookInfo) {
    let thread = std::thread::current();
    let report = crash_report(
        &Local::now().to_rfc3339(),
        thread.name().unwrap_or("<unnamed>"),
        &info.location().map(|l| l.to_string()).unwrap_or_default(),
        payload_message(info.payload()),
        &format!("{:?}", Backtrace::new()),
    );

    // stderr first, it works even when the subscriber is gone
    eprintln!("{}", report);
    tracing::error!("{}", report);

    let dump_path = std::env::temp_dir().join(format!(
        "photo_browser_crash_{}.txt",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    match std::fs::write(&dump_path, &report) {
        Ok(()) => eprintln!("Crash dump written to {}", dump_path.display()),
        Err(e) => eprintln!("Failed to write crash dump: {}", e),
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<unknown>"
    }
}

fn crash_report(timestamp: &str, thread: &str, location: &str, message: &str, backtrace: &str) -> String {
    format!(
        "=== PHOTO BROWSER PANIC ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {}\n\
         Message: {}\n\n\
         Stack Trace:\n{}",
        timestamp, thread, location, message, backtrace
    )
}
