//! Forwarding of native diagnostics to the `log` facade.

use std::cell::RefCell;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use irbind_sys::{ContextRef, DiagnosticCookie, DiagnosticSeverity, NativeApi};
use log::Level;
use rustc_hash::FxHashMap;

static NEXT_COOKIE: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Minimum severity per installed forwarder.
    static SINKS: RefCell<FxHashMap<DiagnosticCookie, DiagnosticSeverity>> =
        RefCell::new(FxHashMap::default());
}

fn level_for(severity: DiagnosticSeverity) -> Level {
    match severity {
        DiagnosticSeverity::Error => Level::Error,
        DiagnosticSeverity::Warning => Level::Warn,
        DiagnosticSeverity::Remark => Level::Info,
        DiagnosticSeverity::Note => Level::Debug,
    }
}

/// Logs `text` for the forwarder behind `cookie`. Returns whether it was
/// emitted; unknown cookies and filtered severities are dropped.
pub(crate) fn forward(cookie: DiagnosticCookie, severity: DiagnosticSeverity, text: &str) -> bool {
    let threshold = SINKS.with(|sinks| sinks.borrow().get(&cookie).copied());
    match threshold {
        Some(threshold) if severity.is_at_least(threshold) => {
            log::log!(target: "irbind::native", level_for(severity), "{}", text);
            true
        }
        Some(_) => false,
        None => {
            log::trace!("dropping diagnostic for unregistered {}", cookie);
            false
        }
    }
}

extern "C" fn forward_diagnostic(
    cookie: DiagnosticCookie,
    severity: DiagnosticSeverity,
    message: *const c_char,
) {
    if message.is_null() {
        return;
    }
    // SAFETY: the native side passes a NUL terminated string that stays valid
    // for the duration of this call.
    let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    forward(cookie, severity, &text);
}

/// A native diagnostic handler installed on one context.
pub struct DiagnosticForwarder {
    api: Rc<dyn NativeApi>,
    context: ContextRef,
    cookie: DiagnosticCookie,
    installed: bool,
}

impl DiagnosticForwarder {
    pub fn install(
        api: Rc<dyn NativeApi>,
        context: ContextRef,
        min_severity: DiagnosticSeverity,
    ) -> Self {
        let cookie = DiagnosticCookie::new(NEXT_COOKIE.fetch_add(1, Ordering::Relaxed));
        SINKS.with(|sinks| {
            sinks.borrow_mut().insert(cookie, min_severity);
        });
        api.set_diagnostic_handler(context, Some(forward_diagnostic), cookie);

        DiagnosticForwarder {
            api,
            context,
            cookie,
            installed: true,
        }
    }

    pub fn cookie(&self) -> DiagnosticCookie {
        self.cookie
    }

    /// Removes the native handler. Idempotent.
    pub fn uninstall(&mut self) {
        if !self.installed {
            return;
        }
        self.installed = false;
        self.api.set_diagnostic_handler(self.context, None, self.cookie);
        SINKS.with(|sinks| {
            sinks.borrow_mut().remove(&self.cookie);
        });
    }
}

impl Drop for DiagnosticForwarder {
    fn drop(&mut self) {
        self.uninstall();
    }
}
