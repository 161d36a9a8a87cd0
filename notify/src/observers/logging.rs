use log::Level;

use crate::event::Event;
use crate::observer::Observer;

/// Logs every received event through the `log` facade.
///
/// Registered on the wildcard bucket it acts as a tap on all traffic.
pub struct LogObserver {
    level: Level,
    target: &'static str,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}

impl LogObserver {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            target: module_path!(),
        }
    }

    /// Overrides the log target (defaults to this module's path).
    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Observer for LogObserver {
    fn receive(&self, event: &Event) {
        if !log::log_enabled!(target: self.target, self.level) {
            return;
        }
        let mut keys: Vec<&str> = event.payload().keys().collect();
        keys.sort_unstable();
        log::log!(
            target: self.target,
            self.level,
            "event `{}` (sender: {}, payload keys: {:?})",
            event.name(),
            event.sender().is_some(),
            keys
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DispatchTable, Notifier, user_info};
    use log::{LevelFilter, Metadata, Record};
    use std::sync::{Arc, Mutex, Once};

    #[derive(Debug, Clone, PartialEq)]
    struct Captured {
        level: Level,
        target: String,
        message: String,
    }

    /// Records everything at `Info` or above. Tests tell their records apart by target.
    struct CapturingLogger {
        records: Mutex<Vec<Captured>>,
    }

    impl log::Log for CapturingLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Info
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                self.records.lock().unwrap().push(Captured {
                    level: record.level(),
                    target: record.target().to_string(),
                    message: format!("{}", record.args()),
                });
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger {
        records: Mutex::new(Vec::new()),
    };
    static INSTALL: Once = Once::new();

    fn captured(target: &str) -> Vec<Captured> {
        INSTALL.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(LevelFilter::Info);
        });
        LOGGER
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.target == target)
            .cloned()
            .collect()
    }

    #[test]
    fn defaults_to_debug() {
        assert_eq!(LogObserver::default().level(), Level::Debug);
    }

    #[test]
    fn logs_each_event_at_its_level_and_target() {
        // Given
        assert!(captured("tap.info").is_empty());
        let table = DispatchTable::new();
        table
            .observe(Arc::new(LogObserver::new(Level::Info).with_target("tap.info")))
            .unwrap();

        // When
        table
            .post_with("X", None, user_info!("b", 1, "a", 2).unwrap())
            .unwrap();
        table.post("Y").unwrap();

        // Then
        let records = captured("tap.info");
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            Captured {
                level: Level::Info,
                target: "tap.info".to_string(),
                message: r#"event `X` (sender: false, payload keys: ["a", "b"])"#.to_string(),
            }
        );
        assert_eq!(records[1].message, "event `Y` (sender: false, payload keys: [])");
    }

    #[test]
    fn stays_quiet_when_its_level_is_disabled() {
        // Given
        assert!(captured("tap.debug").is_empty());
        let table = DispatchTable::new();
        table
            .observe(Arc::new(LogObserver::new(Level::Debug).with_target("tap.debug")))
            .unwrap();

        // When
        table.post("X").unwrap();

        // Then
        assert!(captured("tap.debug").is_empty());
    }
}
