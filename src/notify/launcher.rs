//! Handing links to whatever opens URLs on this host

use super::NotifyError;
use async_trait::async_trait;

/// Opens a URL. Success means the link was handed off, not that a
/// message was delivered.
#[async_trait]
pub trait Launcher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn open(&self, url: &str) -> Result<(), NotifyError>;
}

/// The system URL handler (desktop deployments)
#[derive(Debug, Default)]
pub struct BrowserLauncher;

#[async_trait]
impl Launcher for BrowserLauncher {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn open(&self, url: &str) -> Result<(), NotifyError> {
        let target = url.to_string();
        tokio::task::spawn_blocking(move || webbrowser::open(&target))
            .await
            .map_err(|e| NotifyError::Launch(e.to_string()))?
            .map_err(|e| NotifyError::Launch(e.to_string()))
    }
}

/// Writes links to the log instead of opening them
#[derive(Debug, Default)]
pub struct LogLauncher;

#[async_trait]
impl Launcher for LogLauncher {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn open(&self, url: &str) -> Result<(), NotifyError> {
        tracing::info!(url = %url, "Open link");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_launcher_accepts_everything() {
        let launcher = LogLauncher;
        assert_eq!(launcher.name(), "log");
        assert!(launcher.open("whatsapp://send?phone=1&text=hi").await.is_ok());
    }
}
