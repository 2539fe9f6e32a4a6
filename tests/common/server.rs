//! Test server management.
//!
//! Spawns and manages `slircd-core` instances for integration testing.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// A test server instance: a real subprocess, bound to a random high port
/// with its credential store under a fresh temp directory so parallel test
/// runs never collide.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: TempDir,
}

impl TestServer {
    /// Spawn a new test server on `port`, with a fresh SQLite file under a
    /// per-test temp directory.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        let data_dir = TempDir::with_prefix(format!("slircd-core-test-{port}-"))?;

        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
bind = "127.0.0.1:{}"
name = "test.server"
log_format = "pretty"

[database]
path = "{}/test.db"
"#,
            port,
            data_dir.path().display(),
        );
        std::fs::write(&config_path, config_content)?;

        let binary_path = PathBuf::from(env!("CARGO_BIN_EXE_slircd-core"));
        let child = Command::new(&binary_path)
            .arg(config_path.to_str().unwrap())
            .spawn()?;

        let server = Self { child, port, data_dir };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..30 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server failed to start within 3 seconds")
    }

    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        // `data_dir` cleans itself up as a `TempDir` once dropped.
    }
}
