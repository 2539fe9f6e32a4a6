//! Test client speaking the fixed 1024-byte-frame wire protocol.

#![allow(dead_code)]

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        Ok(Self { stream })
    }

    /// Sends `line` as a single frame, zero-padded/truncated to 1024 bytes.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        let mut frame = [0u8; 1024];
        let bytes = line.as_bytes();
        let n = bytes.len().min(frame.len());
        frame[..n].copy_from_slice(&bytes[..n]);
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    /// Reads one 1024-byte frame and decodes it up to the first NUL byte.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        let mut frame = [0u8; 1024];
        timeout(Duration::from_secs(3), self.stream.read_exact(&mut frame)).await??;
        let end = frame.iter().position(|&b| b == 0).unwrap_or(frame.len());
        Ok(String::from_utf8_lossy(&frame[..end]).into_owned())
    }
}
