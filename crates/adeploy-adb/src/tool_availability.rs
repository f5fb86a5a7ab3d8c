//! Locating the adb binary and the Android SDK
//!
//! Lookup order for `adb`: explicit override, `PATH`, then
//! `$ANDROID_HOME/platform-tools` and `$ANDROID_SDK_ROOT/platform-tools`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;

use adeploy_core::prelude::*;

/// Static regex pattern for the first line of `adb version`
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Android Debug Bridge version (\S+)").expect("Invalid version pattern regex")
});

/// Environment variables that may point at an Android SDK, in priority order
const SDK_ENV_VARS: &[&str] = &["ANDROID_HOME", "ANDROID_SDK_ROOT"];

#[cfg(windows)]
const ADB_EXECUTABLE: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_EXECUTABLE: &str = "adb";

/// Result of looking for a working adb binary
#[derive(Debug, Clone, Default)]
pub struct AdbLocator {
    /// Path to a working adb binary, if found
    pub adb_path: Option<PathBuf>,

    /// Version reported by `adb version`
    pub version: Option<String>,
}

impl AdbLocator {
    /// Find a working adb (run once at startup).
    ///
    /// `override_path` comes from settings and is tried first.
    pub async fn locate(override_path: Option<&Path>) -> Self {
        for candidate in Self::candidate_paths(override_path) {
            if let Some(version) = Self::probe(&candidate).await {
                let adb_path = dunce::canonicalize(&candidate).unwrap_or(candidate);
                info!("Using adb at {} (version {})", adb_path.display(), version);
                return Self {
                    adb_path: Some(adb_path),
                    version: Some(version),
                };
            }
        }

        warn!("No working adb binary found");
        Self::default()
    }

    /// Run `adb version` and return the parsed version on success
    async fn probe(path: &Path) -> Option<String> {
        let output = Command::new(path)
            .arg("version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .inspect_err(|e| debug!("adb check failed for {}: {}", path.display(), e))
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Some(parse_adb_version(&stdout).unwrap_or_else(|| "unknown".to_string()))
    }

    /// Get list of paths to try for the adb command
    fn candidate_paths(override_path: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(path) = override_path {
            paths.push(path.to_path_buf());
        }

        if let Ok(found) = which::which(ADB_EXECUTABLE) {
            paths.push(found);
        }

        for var in SDK_ENV_VARS {
            if let Ok(sdk) = std::env::var(var) {
                paths.push(Path::new(&sdk).join("platform-tools").join(ADB_EXECUTABLE));
            }
        }

        paths.dedup();
        paths
    }

    /// Android SDK root.
    ///
    /// Environment variables win; otherwise the SDK is inferred from an adb
    /// living under `<sdk>/platform-tools/`.
    pub fn sdk_location(&self) -> Option<PathBuf> {
        for var in SDK_ENV_VARS {
            if let Ok(sdk) = std::env::var(var) {
                if !sdk.trim().is_empty() {
                    return Some(PathBuf::from(sdk));
                }
            }
        }

        let adb = self.adb_path.as_deref()?;
        let platform_tools = adb.parent()?;
        if platform_tools.file_name()? == "platform-tools" {
            return platform_tools.parent().map(Path::to_path_buf);
        }
        None
    }

    pub fn is_available(&self) -> bool {
        self.adb_path.is_some()
    }

    /// Get user-friendly message for unavailable adb
    pub fn unavailable_message(&self) -> Option<&'static str> {
        if self.is_available() {
            None
        } else {
            Some("adb not found. Install Android platform-tools, add adb to PATH, or set ANDROID_HOME.")
        }
    }
}

/// Extract the version number from `adb version` output
pub fn parse_adb_version(output: &str) -> Option<String> {
    VERSION_PATTERN
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_adb_version() {
        let output = "Android Debug Bridge version 1.0.41\n\
                      Version 34.0.5-debian\n\
                      Installed as /usr/lib/android-sdk/platform-tools/adb\n";
        assert_eq!(parse_adb_version(output), Some("1.0.41".to_string()));
        assert_eq!(parse_adb_version("garbage"), None);
    }

    #[test]
    fn test_locator_default_unavailable() {
        let locator = AdbLocator::default();
        assert!(!locator.is_available());
        assert!(locator.unavailable_message().is_some());
    }

    #[test]
    fn test_available_no_message() {
        let locator = AdbLocator {
            adb_path: Some(PathBuf::from("/opt/sdk/platform-tools/adb")),
            version: Some("1.0.41".to_string()),
        };
        assert!(locator.unavailable_message().is_none());
    }

    #[test]
    fn test_candidate_paths_override_first() {
        let paths = AdbLocator::candidate_paths(Some(Path::new("/custom/adb")));
        assert_eq!(paths[0], PathBuf::from("/custom/adb"));
    }

    #[test]
    #[serial]
    fn test_candidate_paths_includes_android_home() {
        std::env::set_var("ANDROID_HOME", "/test/android");
        let paths = AdbLocator::candidate_paths(None);
        assert!(paths
            .iter()
            .any(|p| p.starts_with("/test/android/platform-tools")));
        std::env::remove_var("ANDROID_HOME");
    }

    #[test]
    #[serial]
    fn test_sdk_location_from_env() {
        std::env::set_var("ANDROID_HOME", "/test/sdk");
        let locator = AdbLocator::default();
        assert_eq!(locator.sdk_location(), Some(PathBuf::from("/test/sdk")));
        std::env::remove_var("ANDROID_HOME");
    }

    #[test]
    #[serial]
    fn test_sdk_location_inferred_from_adb() {
        std::env::remove_var("ANDROID_HOME");
        std::env::remove_var("ANDROID_SDK_ROOT");
        let locator = AdbLocator {
            adb_path: Some(PathBuf::from("/opt/sdk/platform-tools/adb")),
            version: None,
        };
        assert_eq!(locator.sdk_location(), Some(PathBuf::from("/opt/sdk")));

        let locator = AdbLocator {
            adb_path: Some(PathBuf::from("/usr/bin/adb")),
            version: None,
        };
        assert_eq!(locator.sdk_location(), None);
    }

    #[tokio::test]
    async fn test_locate_with_bogus_override_does_not_panic() {
        // Falls through to PATH/env lookup; result depends on the host.
        let locator = AdbLocator::locate(Some(Path::new("/definitely/not/adb"))).await;
        if let Some(path) = locator.adb_path {
            assert_ne!(path, PathBuf::from("/definitely/not/adb"));
        }
    }
}
