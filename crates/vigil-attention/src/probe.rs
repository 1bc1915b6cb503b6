//! Frontmost-application probes

use crate::error::AttentionError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use vigil_domain::attention::UNKNOWN_APPLICATION;

/// Something that can tell which application is in front
#[async_trait]
pub trait AppProbe: Send + Sync {
    /// Lowercased name of the frontmost application
    async fn frontmost_app(&self) -> Result<String, AttentionError>;
}

/// Query a probe under a deadline
///
/// Never fails: timeouts, errors and blank names all degrade to `"unknown"`.
/// The error, if any, is returned alongside for the caller to count.
pub async fn probe_or_unknown(
    probe: &dyn AppProbe,
    limit: Duration,
) -> (String, Option<AttentionError>) {
    match timeout(limit, probe.frontmost_app()).await {
        Ok(Ok(name)) => {
            let name = name.trim().to_lowercase();
            if name.is_empty() {
                (UNKNOWN_APPLICATION.to_string(), None)
            } else {
                (name, None)
            }
        }
        Ok(Err(e)) => (UNKNOWN_APPLICATION.to_string(), Some(e)),
        Err(_) => (
            UNKNOWN_APPLICATION.to_string(),
            Some(AttentionError::ProbeTimeout(limit.as_millis() as u64)),
        ),
    }
}

/// Asks the desktop for the frontmost application
///
/// Uses `osascript` on macOS and `xdotool` elsewhere.
#[derive(Debug, Clone, Default)]
pub struct FrontmostAppProbe;

impl FrontmostAppProbe {
    /// Create a probe for the current platform
    pub fn new() -> Self {
        Self
    }

    fn command() -> tokio::process::Command {
        if cfg!(target_os = "macos") {
            let mut cmd = tokio::process::Command::new("osascript");
            cmd.args([
                "-e",
                "tell application \"System Events\" to get name of first application process whose frontmost is true",
            ]);
            cmd
        } else {
            let mut cmd = tokio::process::Command::new("xdotool");
            cmd.args(["getactivewindow", "getwindowclassname"]);
            cmd
        }
    }
}

#[async_trait]
impl AppProbe for FrontmostAppProbe {
    async fn frontmost_app(&self) -> Result<String, AttentionError> {
        let output = Self::command()
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AttentionError::Probe(e.to_string()))?;

        if !output.status.success() {
            return Err(AttentionError::Probe(format!(
                "probe exited with {}",
                output.status
            )));
        }

        let name = String::from_utf8_lossy(&output.stdout).trim().to_lowercase();
        debug!("Frontmost application: {:?}", name);
        if name.is_empty() {
            return Err(AttentionError::Probe("probe returned no name".to_string()));
        }
        Ok(name)
    }
}

/// Serves scripted application names
///
/// Names are handed out in order; the last one repeats forever.
#[derive(Debug)]
pub struct StaticAppProbe {
    names: Mutex<VecDeque<String>>,
}

impl StaticAppProbe {
    /// Always report the same application
    pub fn new(name: impl Into<String>) -> Self {
        Self::sequence([name.into()])
    }

    /// Report the given names in order, then keep repeating the last
    pub fn sequence<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Mutex::new(names.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl AppProbe for StaticAppProbe {
    async fn frontmost_app(&self) -> Result<String, AttentionError> {
        let mut names = self.names.lock().unwrap_or_else(|e| e.into_inner());
        let name = if names.len() > 1 {
            names.pop_front()
        } else {
            names.front().cloned()
        };
        name.ok_or_else(|| AttentionError::Probe("no scripted application".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowProbe;

    #[async_trait]
    impl AppProbe for SlowProbe {
        async fn frontmost_app(&self) -> Result<String, AttentionError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("xcode".to_string())
        }
    }

    #[tokio::test]
    async fn test_static_sequence_repeats_last() {
        let probe = StaticAppProbe::sequence(["vscode", "safari"]);
        assert_eq!(probe.frontmost_app().await.unwrap(), "vscode");
        assert_eq!(probe.frontmost_app().await.unwrap(), "safari");
        assert_eq!(probe.frontmost_app().await.unwrap(), "safari");
    }

    #[tokio::test]
    async fn test_empty_static_probe_fails() {
        let probe = StaticAppProbe::sequence(Vec::<String>::new());
        assert!(probe.frontmost_app().await.is_err());

        let (name, err) = probe_or_unknown(&probe, Duration::from_millis(100)).await;
        assert_eq!(name, "unknown");
        assert!(matches!(err, Some(AttentionError::Probe(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_unknown() {
        let (name, err) = probe_or_unknown(&SlowProbe, Duration::from_millis(2000)).await;
        assert_eq!(name, "unknown");
        assert_eq!(err, Some(AttentionError::ProbeTimeout(2000)));
    }

    #[tokio::test]
    async fn test_names_are_normalized() {
        let probe = StaticAppProbe::new("  Xcode\n");
        let (name, err) = probe_or_unknown(&probe, Duration::from_millis(100)).await;
        assert_eq!(name, "xcode");
        assert!(err.is_none());
    }
}
