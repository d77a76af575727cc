// In-memory variable service
// Stands in for the simulator companion in dry runs and tests

use super::error::ServiceError;
use super::service::{Connector, VariableService};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// A call observed by [`MemoryVariables`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Get(String),
    Set(String),
    Fire(String),
}

#[derive(Default)]
struct MemoryState {
    values: HashMap<String, f64>,
    calls: Vec<ServiceCall>,
}

/// Variable store that understands `(NAME)` reads and `<v> (>NAME)` writes
///
/// Unknown variables read as 0, like a fresh simulator local. Clones share
/// state, so a test can inspect calls while the bridge owns the connection.
#[derive(Clone, Default)]
pub struct MemoryVariables {
    state: Arc<Mutex<MemoryState>>,
    verbose: bool,
}

impl MemoryVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that logs every call (dry-run mode)
    pub fn dry_run() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    pub fn with_value(self, name: &str, value: f64) -> Self {
        self.state.lock().values.insert(name.to_string(), value);
        self
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.state.lock().values.get(name).copied()
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state.lock().calls.clone()
    }

    fn record(&self, call: ServiceCall) {
        if self.verbose {
            info!("[variables] {:?}", call);
        }
        self.state.lock().calls.push(call);
    }
}

/// Split `15.0 (>L:FLAPS_TGT)` into value and target
fn parse_set(expr: &str) -> Option<(f64, &str)> {
    let (value, rest) = expr.trim().split_once(' ')?;
    let target = rest.trim().strip_prefix("(>")?.strip_suffix(')')?;
    Some((value.parse().ok()?, target))
}

#[async_trait]
impl VariableService for MemoryVariables {
    async fn get(&mut self, expr: &str) -> Result<f64, ServiceError> {
        self.record(ServiceCall::Get(expr.to_string()));
        let name = expr
            .trim()
            .strip_prefix('(')
            .and_then(|e| e.strip_suffix(')'))
            .ok_or_else(|| ServiceError::Rejected(format!("cannot evaluate {expr}")))?;
        Ok(self.value(name).unwrap_or(0.0))
    }

    async fn set(&mut self, expr: &str) -> Result<(), ServiceError> {
        self.record(ServiceCall::Set(expr.to_string()));
        let (value, target) = parse_set(expr)
            .ok_or_else(|| ServiceError::Rejected(format!("cannot evaluate {expr}")))?;
        self.state.lock().values.insert(target.to_string(), value);
        Ok(())
    }

    async fn fire(&mut self, expr: &str) -> Result<(), ServiceError> {
        self.record(ServiceCall::Fire(expr.to_string()));
        Ok(())
    }
}

#[async_trait]
impl Connector for MemoryVariables {
    async fn connect(&self) -> Result<Box<dyn VariableService>, ServiceError> {
        Ok(Box::new(self.clone()))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
