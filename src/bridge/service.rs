//! Variable service abstraction
//!
//! The bridge talks to a companion process inside the simulator through a
//! [`VariableService`]. [`TcpConnector`] speaks the companion's line protocol:
//!
//! ```text
//! GET (L:FLAPS_TGT)          -> 15
//! SET 15.0 (>L:FLAPS_TGT)    -> OK
//! CMD (>K:GEAR_TOGGLE)       -> OK
//! GET (L:MISSING             -> ERR parse error
//! ```

use super::error::ServiceError;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// An open request/response channel to the simulator
///
/// One call in flight at a time; the bridge serializes access.
#[async_trait]
pub trait VariableService: Send {
    /// Evaluate a read expression
    async fn get(&mut self, expr: &str) -> Result<f64, ServiceError>;

    /// Submit a set-expression
    async fn set(&mut self, expr: &str) -> Result<(), ServiceError>;

    /// Execute an expression as a command
    async fn fire(&mut self, expr: &str) -> Result<(), ServiceError>;
}

/// Opens [`VariableService`] connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn VariableService>, ServiceError>;

    /// Where this connector points (for logs)
    fn describe(&self) -> String;
}

/// Connector for the TCP line protocol
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Box<dyn VariableService>, ServiceError> {
        let stream = TcpStream::connect(&self.addr).await?;
        stream.set_nodelay(true)?;
        debug!("Connected to variable service at {}", self.addr);
        Ok(Box::new(TcpVariableService::new(stream)))
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.addr)
    }
}

/// [`VariableService`] over a TCP stream
pub struct TcpVariableService {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    line: String,
}

impl TcpVariableService {
    pub fn new(stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer: write,
            line: String::new(),
        }
    }

    async fn request(&mut self, verb: &str, expr: &str) -> Result<String, ServiceError> {
        if expr.contains(['\n', '\r']) {
            return Err(ServiceError::Protocol(format!(
                "expression contains a line break: {expr:?}"
            )));
        }

        trace!("> {} {}", verb, expr);
        self.writer
            .write_all(format!("{verb} {expr}\n").as_bytes())
            .await?;

        self.line.clear();
        if self.reader.read_line(&mut self.line).await? == 0 {
            return Err(ServiceError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by variable service",
            )));
        }

        let reply = self.line.trim();
        trace!("< {}", reply);
        if let Some(message) = reply.strip_prefix("ERR") {
            return Err(ServiceError::Rejected(message.trim().to_string()));
        }
        Ok(reply.to_string())
    }

    async fn expect_ok(&mut self, verb: &str, expr: &str) -> Result<(), ServiceError> {
        let reply = self.request(verb, expr).await?;
        if reply == "OK" {
            Ok(())
        } else {
            Err(ServiceError::Protocol(format!("unexpected reply {reply:?}")))
        }
    }
}

#[async_trait]
impl VariableService for TcpVariableService {
    async fn get(&mut self, expr: &str) -> Result<f64, ServiceError> {
        let reply = self.request("GET", expr).await?;
        reply
            .parse::<f64>()
            .map_err(|_| ServiceError::NotNumeric(reply))
    }

    async fn set(&mut self, expr: &str) -> Result<(), ServiceError> {
        self.expect_ok("SET", expr).await
    }

    async fn fire(&mut self, expr: &str) -> Result<(), ServiceError> {
        self.expect_ok("CMD", expr).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Accept one connection and answer each request line from `replies`
    async fn companion(replies: Vec<&'static str>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut seen = Vec::new();
            for reply in replies {
                let Some(line) = lines.next_line().await.unwrap() else {
                    break;
                };
                seen.push(line);
                write
                    .write_all(format!("{reply}\n").as_bytes())
                    .await
                    .unwrap();
            }
            seen
        });
        (addr, handle)
    }

    #[tokio::test]
    async fn test_tcp_round_trip() {
        let (addr, handle) = companion(vec!["15", "OK", "OK"]).await;
        let mut service = TcpConnector::new(addr).connect().await.unwrap();

        assert_eq!(service.get("(L:FLAPS_TGT)").await.unwrap(), 15.0);
        service.set("16.0 (>L:FLAPS_TGT)").await.unwrap();
        service.fire("(>K:GEAR_TOGGLE)").await.unwrap();

        assert_eq!(
            handle.await.unwrap(),
            vec![
                "GET (L:FLAPS_TGT)",
                "SET 16.0 (>L:FLAPS_TGT)",
                "CMD (>K:GEAR_TOGGLE)"
            ]
        );
    }

    #[tokio::test]
    async fn test_tcp_errors() {
        let (addr, _handle) = companion(vec!["ERR unknown variable", "n/a", "MAYBE"]).await;
        let mut service = TcpConnector::new(addr).connect().await.unwrap();

        assert!(matches!(
            service.get("(L:NOPE)").await,
            Err(ServiceError::Rejected(msg)) if msg == "unknown variable"
        ));
        assert!(matches!(
            service.get("(L:TEXT)").await,
            Err(ServiceError::NotNumeric(_))
        ));
        assert!(matches!(
            service.set("1.0 (>L:X)").await,
            Err(ServiceError::Protocol(_))
        ));
        assert!(matches!(
            service.set("1.0\n(>L:X)").await,
            Err(ServiceError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_tcp_closed_connection() {
        let (addr, _handle) = companion(vec![]).await;
        let mut service = TcpConnector::new(addr).connect().await.unwrap();
        assert!(matches!(
            service.get("(L:X)").await,
            Err(ServiceError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        assert!(TcpConnector::new(addr).connect().await.is_err());
    }
}
