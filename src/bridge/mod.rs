//! Variable bridge
//!
//! Normalized get/set/step over named simulator variables. Keys resolve to
//! expressions through a [`VariableMap`]; the expressions are evaluated by an
//! external [`VariableService`] reached through a [`Connector`].
//!
//! The connection is opened on first use and reused. If the very first
//! connection attempt fails, the bridge reports `mobiflight_init_failed`
//! from then on. A connection that stops responding is dropped and reopened
//! on the next call.

pub mod error;
pub mod expr;
pub mod mapping;
pub mod memory;
pub mod service;

pub use error::{BridgeError, ServiceError};
pub use expr::{format_value, Scope, VariableExpr};
pub use mapping::{VariableDescriptor, VariableMap, VariableTable};
pub use memory::{MemoryVariables, ServiceCall};
pub use service::{Connector, TcpConnector, TcpVariableService, VariableService};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Default upper bound for one service call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(2);

enum Connection {
    /// Never connected
    Pending,
    Ready(Box<dyn VariableService>),
    /// Was connected; reopen on next use
    Lost,
    /// First connection attempt failed
    Failed(String),
}

impl Connection {
    fn label(&self) -> &'static str {
        match self {
            Connection::Pending => "pending",
            Connection::Ready(_) => "connected",
            Connection::Lost => "lost",
            Connection::Failed(_) => "failed",
        }
    }
}

/// Bridge between variable keys and the simulator
pub struct VariableBridge {
    map: VariableMap,
    connector: Option<Arc<dyn Connector>>,
    connection: Mutex<Connection>,
    call_timeout: Duration,
}

impl VariableBridge {
    /// `connector` is `None` when no variable service is installed
    pub fn new(map: VariableMap, connector: Option<Arc<dyn Connector>>) -> Self {
        Self {
            map,
            connector,
            connection: Mutex::new(Connection::Pending),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn map(&self) -> &VariableMap {
        &self.map
    }

    pub fn is_installed(&self) -> bool {
        self.connector.is_some()
    }

    /// Connection state name (pending, connected, lost, failed)
    pub async fn status(&self) -> &'static str {
        self.connection.lock().await.label()
    }

    /// Current value of every readable key
    pub async fn read_all(&self, profile: &str) -> Result<BTreeMap<String, f64>, BridgeError> {
        self.installed()?;
        let readable: Vec<(&str, String)> = self
            .map
            .table(profile)
            .readable()
            .filter_map(|(key, expr)| expr.read_expr().map(|e| (key, e)))
            .collect();
        if readable.is_empty() {
            return Err(BridgeError::NoVarsConfigured);
        }

        let mut conn = self.connected().await?;
        let mut values = BTreeMap::new();
        for (key, read_expr) in readable {
            match self.get(&mut conn, &read_expr).await {
                Ok(value) => {
                    values.insert(key.to_string(), value);
                }
                Err(BridgeError::Rejected(reason)) => {
                    warn!("Skipping {}: {}", key, reason);
                }
                Err(e) => return Err(e),
            }
        }

        if values.is_empty() {
            return Err(BridgeError::NoVarsConfigured);
        }
        Ok(values)
    }

    /// Current value of one key
    pub async fn read(&self, profile: &str, key: &str) -> Result<f64, BridgeError> {
        let expr = self.lookup(profile, key)?;
        let mut conn = self.connected().await?;
        let read_expr = expr
            .read_expr()
            .ok_or_else(|| BridgeError::NotReadable(key.to_string()))?;
        self.get(&mut conn, &read_expr).await
    }

    /// Store `value` in the key's variable
    ///
    /// Computed expressions cannot hold a value and are fired instead.
    pub async fn write(&self, profile: &str, key: &str, value: f64) -> Result<(), BridgeError> {
        let expr = self.lookup(profile, key)?;
        let mut conn = self.connected().await?;
        match expr.set_expr(value) {
            Some(set_expr) => {
                debug!("{} := {}", key, set_expr);
                self.set(&mut conn, &set_expr).await
            }
            None => self.fire(&mut conn, expr.raw()).await,
        }
    }

    /// Add `delta` to the key's variable, or fire it if computed
    ///
    /// Read and write happen under one connection lock, so concurrent steps
    /// on the same key do not lose updates.
    pub async fn step(&self, profile: &str, key: &str, delta: f64) -> Result<(), BridgeError> {
        if !delta.is_finite() {
            return Err(BridgeError::InvalidDelta);
        }
        let expr = self.lookup(profile, key)?;
        let mut conn = self.connected().await?;

        if expr.is_computed() {
            debug!("{}: fire {}", key, expr);
            return self.fire(&mut conn, expr.raw()).await;
        }

        let current = match self.get(&mut conn, &format!("({})", expr.raw())).await {
            Ok(value) => value,
            Err(BridgeError::Rejected(reason)) => {
                debug!("{}: current value unusable: {}", key, reason);
                return Err(BridgeError::InvalidDelta);
            }
            Err(e) => return Err(e),
        };
        let next = current + delta;
        if !next.is_finite() {
            return Err(BridgeError::InvalidDelta);
        }

        let set_expr = expr
            .set_expr(next)
            .ok_or_else(|| BridgeError::NotReadable(key.to_string()))?;
        debug!("{}: {} + {} -> {}", key, current, delta, set_expr);
        self.set(&mut conn, &set_expr).await
    }

    fn installed(&self) -> Result<&Arc<dyn Connector>, BridgeError> {
        self.connector.as_ref().ok_or(BridgeError::NotInstalled)
    }

    fn lookup(&self, profile: &str, key: &str) -> Result<&VariableExpr, BridgeError> {
        self.installed()?;
        self.map
            .table(profile)
            .get(key)
            .ok_or_else(|| BridgeError::UnknownKey(key.to_string()))
    }

    /// Lock the connection, opening it if needed
    async fn connected(&self) -> Result<MutexGuard<'_, Connection>, BridgeError> {
        let connector = self.installed()?;
        let mut conn = self.connection.lock().await;

        if let Connection::Failed(reason) = &*conn {
            return Err(BridgeError::InitFailed(reason.clone()));
        }
        if matches!(*conn, Connection::Ready(_)) {
            return Ok(conn);
        }
        let first_attempt = matches!(*conn, Connection::Pending);

        let reason = match timeout(self.call_timeout, connector.connect()).await {
            Ok(Ok(service)) => {
                info!("Variable service connected ({})", connector.describe());
                *conn = Connection::Ready(service);
                return Ok(conn);
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => "connection timed out".to_string(),
        };

        if first_attempt {
            warn!(
                "Variable service init failed ({}): {}",
                connector.describe(),
                reason
            );
            *conn = Connection::Failed(reason.clone());
            Err(BridgeError::InitFailed(reason))
        } else {
            warn!("Variable service reconnect failed: {}", reason);
            Err(BridgeError::Disconnected(reason))
        }
    }

    async fn get(&self, conn: &mut Connection, expr: &str) -> Result<f64, BridgeError> {
        let Connection::Ready(service) = &mut *conn else {
            return Err(BridgeError::Disconnected("not connected".to_string()));
        };
        let result = timeout(self.call_timeout, service.get(expr)).await;
        settle(conn, result)
    }

    async fn set(&self, conn: &mut Connection, expr: &str) -> Result<(), BridgeError> {
        let Connection::Ready(service) = &mut *conn else {
            return Err(BridgeError::Disconnected("not connected".to_string()));
        };
        let result = timeout(self.call_timeout, service.set(expr)).await;
        settle(conn, result)
    }

    async fn fire(&self, conn: &mut Connection, expr: &str) -> Result<(), BridgeError> {
        let Connection::Ready(service) = &mut *conn else {
            return Err(BridgeError::Disconnected("not connected".to_string()));
        };
        let result = timeout(self.call_timeout, service.fire(expr)).await;
        settle(conn, result)
    }
}

/// Map a service call result, dropping the connection on timeout or I/O failure
fn settle<T>(
    conn: &mut Connection,
    result: Result<Result<T, ServiceError>, tokio::time::error::Elapsed>,
) -> Result<T, BridgeError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(ServiceError::Io(e))) => {
            warn!("Variable service connection lost: {}", e);
            *conn = Connection::Lost;
            Err(BridgeError::Disconnected(e.to_string()))
        }
        Ok(Err(e @ ServiceError::Protocol(_))) => {
            // Reply stream may be out of step; start over
            *conn = Connection::Lost;
            Err(BridgeError::Disconnected(e.to_string()))
        }
        Ok(Err(ServiceError::Rejected(reason))) => Err(BridgeError::Rejected(reason)),
        Ok(Err(ServiceError::NotNumeric(reply))) => {
            Err(BridgeError::Rejected(format!("non-numeric value {reply:?}")))
        }
        Err(_) => {
            warn!("Variable service call timed out");
            *conn = Connection::Lost;
            Err(BridgeError::Timeout)
        }
    }
}
