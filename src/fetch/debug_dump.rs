use std::path::{Path, PathBuf};

use tokio::fs;

/// Writes raw origin responses to disk for inspection. Failures are logged
/// and otherwise ignored.
#[derive(Debug, Clone)]
pub struct DebugDump(PathBuf);

impl DebugDump {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self(dir.as_ref().to_owned())
    }

    pub fn dir(&self) -> &Path {
        &self.0
    }

    pub async fn initial_page(&self, body: &str) {
        self.write("debug_initial_page.html", body).await;
    }

    pub async fn response(&self, location: &str, date: &str, body: &str) {
        let file_name = format!(
            "debug_response_{}_{}.html",
            location.replace(' ', "_"),
            date.replace('/', "_")
        );
        self.write(&file_name, body).await;
    }

    async fn write(&self, file_name: &str, body: &str) {
        let path = self.0.join(file_name);
        let res = async {
            fs::create_dir_all(&self.0).await?;
            fs::write(&path, body).await
        }
        .await;
        match res {
            Ok(()) => log::debug!("Saved {} bytes to {}", body.len(), path.display()),
            Err(e) => log::warn!("Could not save debug page to {}: {e}", path.display()),
        }
    }
}
