//! Log system driven by a managed callback.
//!
//! Each `LogSystem` owns one slot in a process-wide [`CallbackRegistry`],
//! keyed by its own identity. Two systems never share a slot, and setting a
//! new callback replaces the old closure in place.

use crate::callback::{CallbackId, CallbackRegistry, Registration};
use crate::config::LogSystemOptions;
use crate::types::LogLevel;
use std::sync::{Arc, LazyLock};

/// Signature of a log callback.
pub type LogCallback = dyn Fn(LogLevel, &str) + Send + Sync;

static LOG_CALLBACKS: LazyLock<CallbackRegistry<LogCallback>> = LazyLock::new(CallbackRegistry::new);

pub struct LogSystem {
    id: CallbackId,
    system_level: LogLevel,
    forward_to_logger: bool,
}

impl LogSystem {
    pub fn new() -> Self {
        Self::with_options(&LogSystemOptions::default())
    }

    pub fn with_options(options: &LogSystemOptions) -> Self {
        let id = CallbackId::next();
        log::trace!("log system created with {id}");
        Self {
            id,
            system_level: options.system_level,
            forward_to_logger: options.forward_to_logger,
        }
    }

    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Install `callback`, replacing any previously installed closure.
    pub fn set_log_callback<F>(&self, callback: F) -> Registration
    where
        F: Fn(LogLevel, &str) + Send + Sync + 'static,
    {
        LOG_CALLBACKS.register(self.id, Arc::new(callback))
    }

    /// Remove the installed callback, if any.
    pub fn clear_log_callback(&self) -> bool {
        LOG_CALLBACKS.unregister(self.id)
    }

    pub fn has_log_callback(&self) -> bool {
        LOG_CALLBACKS.is_registered(self.id)
    }

    pub fn system_level(&self) -> LogLevel {
        self.system_level
    }

    pub fn set_system_level(&mut self, level: LogLevel) {
        self.system_level = level;
    }

    /// Whether a message at `level` passes the system level.
    pub fn accepts(&self, level: LogLevel) -> bool {
        level != LogLevel::NoLogging && (level as i32) <= (self.system_level as i32)
    }

    /// Emit `message`. Returns `true` if a callback received it.
    pub fn log_msg(&self, level: LogLevel, message: &str) -> bool {
        if !self.accepts(level) {
            return false;
        }

        if self.forward_to_logger {
            if let Some(lvl) = level.to_log_level() {
                log::log!(target: "csp", lvl, "{message}");
            }
        }

        if !LOG_CALLBACKS.is_registered(self.id) {
            return false;
        }
        // A concurrent clear between the check and the call is not an error.
        LOG_CALLBACKS.invoke(self.id, |cb| cb(level, message)).is_ok()
    }
}

impl Default for LogSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LogSystem {
    fn drop(&mut self) {
        LOG_CALLBACKS.unregister(self.id);
        log::trace!("log system {} dropped", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Captured = Arc<Mutex<Option<(LogLevel, String)>>>;

    fn capture() -> (Captured, impl Fn(LogLevel, &str) + Send + Sync + 'static) {
        let slot: Captured = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&slot);
        let cb = move |level: LogLevel, msg: &str| {
            *inner.lock().unwrap() = Some((level, msg.to_string()));
        };
        (slot, cb)
    }

    #[test]
    fn test_callback_receives_message() {
        let system = LogSystem::new();
        let (captured, cb) = capture();
        let _ = system.set_log_callback(cb);

        assert!(system.log_msg(LogLevel::Log, "The first wrapped function works!"));
        assert_eq!(
            *captured.lock().unwrap(),
            Some((LogLevel::Log, "The first wrapped function works!".to_string()))
        );
    }

    #[test]
    fn test_second_callback_replaces_first() {
        let system = LogSystem::new();
        let (first, cb1) = capture();
        let _ = system.set_log_callback(cb1);
        system.log_msg(LogLevel::Log, "first");

        let (second, cb2) = capture();
        let _ = system.set_log_callback(cb2);
        system.log_msg(LogLevel::Warning, "second");

        assert_eq!(*first.lock().unwrap(), Some((LogLevel::Log, "first".to_string())));
        assert_eq!(*second.lock().unwrap(), Some((LogLevel::Warning, "second".to_string())));
    }

    #[test]
    fn test_one_closure_across_two_systems() {
        let system1 = LogSystem::new();
        let system2 = LogSystem::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let make = |calls: Arc<AtomicUsize>| {
            move |_: LogLevel, _: &str| {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        };
        let _ = system1.set_log_callback(make(Arc::clone(&calls)));
        let _ = system2.set_log_callback(make(Arc::clone(&calls)));

        system1.log_msg(LogLevel::Log, "First call.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        system2.log_msg(LogLevel::Warning, "Second call.");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_distinct_systems_route_independently() {
        let system1 = LogSystem::new();
        let system2 = LogSystem::new();
        let (first, cb1) = capture();
        let (second, cb2) = capture();
        let _ = system1.set_log_callback(cb1);
        let _ = system2.set_log_callback(cb2);

        system2.log_msg(LogLevel::Error, "only two");
        assert!(first.lock().unwrap().is_none());
        assert_eq!(*second.lock().unwrap(), Some((LogLevel::Error, "only two".to_string())));
    }

    #[test]
    fn test_callback_survives_dropped_handles() {
        let system = LogSystem::new();
        let captured: Captured = Arc::new(Mutex::new(None));
        {
            let inner = Arc::clone(&captured);
            let registration = system.set_log_callback(move |level, msg| {
                *inner.lock().unwrap() = Some((level, msg.to_string()));
            });
            drop(registration);
        }

        assert!(system.log_msg(LogLevel::Log, "Still works after GC?"));
        assert_eq!(
            *captured.lock().unwrap(),
            Some((LogLevel::Log, "Still works after GC?".to_string()))
        );
    }

    #[test]
    fn test_no_callback_is_not_delivered() {
        let system = LogSystem::new();
        assert!(!system.has_log_callback());
        assert!(!system.log_msg(LogLevel::Log, "nobody listening"));

        let (_captured, cb) = capture();
        let _ = system.set_log_callback(cb);
        assert!(system.clear_log_callback());
        assert!(!system.clear_log_callback());
        assert!(!system.log_msg(LogLevel::Log, "cleared"));
    }

    #[test]
    fn test_system_level_filters() {
        let mut system = LogSystem::with_options(&LogSystemOptions {
            system_level: LogLevel::Warning,
            forward_to_logger: true,
        });
        let (captured, cb) = capture();
        let _ = system.set_log_callback(cb);

        assert!(!system.log_msg(LogLevel::Log, "too chatty"));
        assert!(captured.lock().unwrap().is_none());
        assert!(system.log_msg(LogLevel::Error, "kept"));
        assert!(!system.log_msg(LogLevel::NoLogging, "never"));

        system.set_system_level(LogLevel::All);
        assert!(system.log_msg(LogLevel::VeryVerbose, "now kept"));
    }

    #[test]
    fn test_drop_releases_slot() {
        let system = LogSystem::new();
        let id = system.id();
        let (_captured, cb) = capture();
        let _ = system.set_log_callback(cb);
        assert!(LOG_CALLBACKS.is_registered(id));
        drop(system);
        assert!(!LOG_CALLBACKS.is_registered(id));
    }
}
