use std::time::{Duration, Instant};

use hashbrown::HashMap;
use itertools::Itertools;

/// Named wall clock timers, e.g. for the phases of a streaming tick.
#[derive(Debug, Default)]
pub struct TimerManager {
    current_timers: HashMap<String, Instant>,
    finished_timers: HashMap<String, Duration>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<S: AsRef<str>>(&mut self, name: S) {
        self.current_timers
            .insert(name.as_ref().to_string(), Instant::now());
    }

    /// Stops a timer and records its duration. Returns `None` if the timer was never started.
    pub fn end<S: AsRef<str>>(&mut self, name: S) -> Option<Duration> {
        let start = self.current_timers.remove(name.as_ref())?;
        let duration = start.elapsed();
        self.finished_timers
            .insert(name.as_ref().to_string(), duration);

        Some(duration)
    }

    pub fn end_restart<S: AsRef<str>>(&mut self, name: S) -> Option<Duration> {
        let duration = self.end(name.as_ref());
        self.start(name.as_ref());

        duration
    }

    pub fn get(&self, name: &str) -> Option<Duration> {
        self.finished_timers.get(name).copied()
    }

    /// All finished timers, sorted by name.
    pub fn get_all(&self) -> Vec<(&String, Duration)> {
        self.finished_timers
            .iter()
            .map(|(name, duration)| (name, *duration))
            .sorted_by(|a, b| a.0.cmp(b.0))
            .collect_vec()
    }

    pub fn clear(&mut self) {
        self.finished_timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::timing::TimerManager;

    #[test]
    fn test_timers() {
        let mut timers = TimerManager::new();

        assert_eq!(timers.end("missing"), None);

        timers.start("b");
        timers.start("a");
        assert!(timers.end("a").is_some());
        assert!(timers.end_restart("b").is_some());
        assert!(timers.end("b").is_some());

        let names: Vec<&str> = timers.get_all().into_iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        timers.clear();
        assert!(timers.get_all().is_empty());
        assert_eq!(timers.get("a"), None);
    }
}
