//! Test utilities for adb-driven workflows
//!
//! Provides [`FakeRunner`], a scripted [`CommandRunner`] that records every
//! command line it is asked to run.

use std::sync::Mutex;

use crate::commands::AdbCommand;
use crate::runner::{CommandOutcome, CommandRunner};

/// Scripted stand-in for the adb binary.
///
/// Rules are matched in registration order against the argument line (args
/// joined by spaces, without the leading `adb`). A rule matches when its
/// pattern occurs there as whole words, so `"connect"` does not match
/// `disconnect 10.0.0.5:5555`. Unmatched commands fail.
#[derive(Debug, Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<(String, CommandOutcome)>>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands matching `pattern` with `outcome`
    pub fn respond(&self, pattern: &str, outcome: CommandOutcome) -> &Self {
        self.rules
            .lock()
            .expect("rules lock poisoned")
            .push((pattern.to_string(), outcome));
        self
    }

    /// Every argument line run so far, oldest first
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Check whether any recorded call matches `pattern`
    pub fn was_called(&self, pattern: &str) -> bool {
        self.calls().iter().any(|line| matches_words(line, pattern))
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, command: &AdbCommand) -> CommandOutcome {
        let line = command.args().join(" ");
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(line.clone());

        self.rules
            .lock()
            .expect("rules lock poisoned")
            .iter()
            .find(|(pattern, _)| matches_words(&line, pattern))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| CommandOutcome::failure(format!("no scripted response for: {}", line)))
    }
}

fn matches_words(line: &str, pattern: &str) -> bool {
    line == pattern
        || line.starts_with(&format!("{} ", pattern))
        || line.ends_with(&format!(" {}", pattern))
        || line.contains(&format!(" {} ", pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_words() {
        assert!(matches_words("connect 10.0.0.5:5555", "connect"));
        assert!(!matches_words("disconnect 10.0.0.5:5555", "connect"));
        assert!(matches_words("-s a:1 install -r x.apk", "install"));
        assert!(matches_words("devices", "devices"));
        assert!(matches_words("-s a:1 shell am force-stop pkg", "force-stop"));
    }

    #[tokio::test]
    async fn test_fake_runner_records_and_answers() {
        let runner = FakeRunner::new();
        runner.respond("version", CommandOutcome::success("Android Debug Bridge version 1.0.41"));

        let outcome = CommandRunner::run(&runner, &AdbCommand::Version).await;
        assert!(outcome.succeeded);

        let outcome = CommandRunner::run(&runner, &AdbCommand::Devices).await;
        assert!(!outcome.succeeded);
        assert!(outcome.output.contains("no scripted response"));

        assert_eq!(runner.calls(), vec!["version", "devices"]);
    }
}
