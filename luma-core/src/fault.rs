//! Error / diagnostics bridge
//!
//! Every fault raised by script code that reaches the host passes through an
//! [`ErrorBridge`]. The bridge classifies it with the status label the Lua C API
//! would report, writes exactly one error line to the host log and hands the
//! fault back as data. It never panics and never re-raises.

use luma_log::{error, Logger};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

const TRACEBACK_MARKER: &str = "\nstack traceback:";

/// Fault class, mirroring the Lua status codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Error raised while running code (`LUA_ERRRUN`)
    Runtime,
    /// Error while compiling a chunk (`LUA_ERRSYNTAX`)
    Syntax,
    /// Allocation failure (`LUA_ERRMEM`)
    Memory,
    /// Error inside a `__gc` metamethod (`LUA_ERRGCMM`)
    GarbageCollector,
    /// Error while running the message handler (`LUA_ERRERR`)
    ErrorHandler,
    /// Anything the runtime did not classify
    Unknown,
}

impl FaultKind {
    pub fn label(self) -> &'static str {
        match self {
            FaultKind::Runtime => "LUA_ERRRUN",
            FaultKind::Syntax => "LUA_ERRSYNTAX",
            FaultKind::Memory => "LUA_ERRMEM",
            FaultKind::GarbageCollector => "LUA_ERRGCMM",
            FaultKind::ErrorHandler => "LUA_ERRERR",
            FaultKind::Unknown => "LUA_ERRUNKNOWN",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An uncaught script fault
///
/// Displays as the single log line the bridge writes for it.
#[derive(Clone, Debug, Error)]
#[error("{kind} - {message}")]
pub struct ScriptFault {
    pub kind: FaultKind,
    pub message: String,
    pub traceback: Option<String>,
    #[source]
    pub cause: Option<mlua::Error>,
}

impl ScriptFault {
    /// Classify a runtime error
    pub fn from_lua_error(err: mlua::Error) -> Self {
        let (kind, raw_message, callback_traceback) = classify(&err);
        let (message, inline_traceback) = split_traceback(&raw_message);
        ScriptFault {
            kind,
            message,
            traceback: callback_traceback.or(inline_traceback),
            cause: Some(err),
        }
    }

    /// The `"<LABEL> - <message>"` line written to the log
    pub fn log_line(&self) -> String {
        self.to_string()
    }
}

/// Walk callback/context wrappers down to the error Lua actually raised
fn classify(err: &mlua::Error) -> (FaultKind, String, Option<String>) {
    match err {
        mlua::Error::CallbackError { traceback, cause } => {
            let (kind, message, inner) = classify(cause);
            // an error raised by a host callback still entered Lua as a runtime error
            let kind = if kind == FaultKind::Unknown {
                FaultKind::Runtime
            } else {
                kind
            };
            (kind, message, inner.or_else(|| non_empty(traceback)))
        }
        mlua::Error::WithContext { cause, .. } => classify(cause),
        mlua::Error::SyntaxError { message, .. } => (FaultKind::Syntax, message.clone(), None),
        mlua::Error::MemoryError(message) => (FaultKind::Memory, message.clone(), None),
        mlua::Error::RuntimeError(message) => (runtime_kind(message), message.clone(), None),
        other => (FaultKind::Unknown, other.to_string(), None),
    }
}

fn runtime_kind(message: &str) -> FaultKind {
    if message.contains("error in error handling") {
        FaultKind::ErrorHandler
    } else if message.contains("error in __gc metamethod") {
        FaultKind::GarbageCollector
    } else {
        FaultKind::Runtime
    }
}

fn non_empty(traceback: &str) -> Option<String> {
    let trimmed = traceback.trim_start_matches('\n');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_traceback(raw: &str) -> (String, Option<String>) {
    match raw.find(TRACEBACK_MARKER) {
        Some(pos) => (
            raw[..pos].to_string(),
            Some(raw[pos + 1..].to_string()),
        ),
        None => (raw.to_string(), None),
    }
}

/// Result of a fault-absorbing execution
#[must_use]
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    Faulted(ScriptFault),
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Outcome::Faulted(_))
    }

    /// The value, discarding a fault
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Faulted(_) => None,
        }
    }

    pub fn fault(&self) -> Option<&ScriptFault> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Faulted(fault) => Some(fault),
        }
    }

    pub fn into_result(self) -> Result<T, ScriptFault> {
        match self {
            Outcome::Completed(value) => Ok(value),
            Outcome::Faulted(fault) => Err(fault),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Faulted(fault) => Outcome::Faulted(fault),
        }
    }
}

/// Sink for every uncaught script fault of one runtime
#[derive(Debug)]
pub struct ErrorBridge {
    logger: Arc<Logger>,
    faults: AtomicU64,
}

impl ErrorBridge {
    pub fn new(logger: Arc<Logger>) -> Self {
        ErrorBridge {
            logger,
            faults: AtomicU64::new(0),
        }
    }

    /// Turn a script result into an [`Outcome`], logging a fault once
    pub fn absorb<T>(&self, result: mlua::Result<T>) -> Outcome<T> {
        match result {
            Ok(value) => Outcome::Completed(value),
            Err(err) => Outcome::Faulted(self.report(err)),
        }
    }

    /// Classify and log a fault
    pub fn report(&self, err: mlua::Error) -> ScriptFault {
        let fault = ScriptFault::from_lua_error(err);
        self.faults.fetch_add(1, Ordering::Relaxed);
        error!(self.logger, "{}", fault.log_line());
        fault
    }

    /// Faults reported since the bridge was created
    pub fn fault_count(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}
