//! Reachability probes for SMTP servers and databases.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Connection to {0} timed out")]
    Timeout(String),

    #[error("Could not connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("Unexpected greeting from {address}: {greeting}")]
    Greeting { address: String, greeting: String },
}

/// What the server said when the connection opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub address: String,
    pub greeting: String,
}

/// Opens and closes a TCP connection.
pub async fn probe_tcp(address: &str, wait: Duration) -> Result<(), ProbeError> {
    connect(address, wait).await.map(|_| ())
}

async fn connect(address: &str, wait: Duration) -> Result<TcpStream, ProbeError> {
    timeout(wait, TcpStream::connect(address))
        .await
        .map_err(|_| ProbeError::Timeout(address.to_string()))?
        .map_err(|e| ProbeError::Connect {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Opens a TCP connection and reads the SMTP greeting, which must start with `220`.
///
/// Implicit TLS ports (465) greet only after the handshake, so for those a
/// successful connect is enough.
pub async fn probe_smtp(address: &str, wait: Duration) -> Result<ProbeReport, ProbeError> {
    let mut stream = connect(address, wait).await?;

    if address.ends_with(":465") {
        return Ok(ProbeReport {
            address: address.to_string(),
            greeting: String::new(),
        });
    }

    let mut buf = [0u8; 512];
    let read = timeout(wait, stream.read(&mut buf))
        .await
        .map_err(|_| ProbeError::Timeout(address.to_string()))?
        .map_err(|e| ProbeError::Connect {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

    let greeting = String::from_utf8_lossy(&buf[..read]).trim().to_string();
    if greeting.starts_with("220") {
        Ok(ProbeReport {
            address: address.to_string(),
            greeting,
        })
    } else {
        Err(ProbeError::Greeting {
            address: address.to_string(),
            greeting,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    async fn fake_server(greeting: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket.write_all(greeting).await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_smtp_greeting_accepted() {
        let addr = fake_server(b"220 mail.example.com ESMTP ready\r\n").await;
        let report = probe_smtp(&addr, Duration::from_secs(2)).await.unwrap();
        assert!(report.greeting.starts_with("220 mail.example.com"));
    }

    #[tokio::test]
    async fn test_unexpected_greeting_rejected() {
        let addr = fake_server(b"554 no service\r\n").await;
        let err = probe_smtp(&addr, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Greeting { .. }));
    }

    #[tokio::test]
    async fn test_tcp_probe_connects() {
        let addr = fake_server(b"").await;
        assert!(probe_tcp(&addr, Duration::from_secs(2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = probe_smtp(&addr, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connect { .. } | ProbeError::Timeout(_)));
    }
}
