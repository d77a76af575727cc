//! Head-track telemetry
//!
//! Client pose samples are filtered ([`PoseFilter`]), encoded into one of two
//! fixed packet layouts and sent as a single UDP datagram to the tracking
//! consumer named in the [`HeadTrackConfig`].

pub mod config;
pub mod encode;
pub mod filter;

pub use config::{
    AxisPatch, HeadPose, HeadTrackConfig, HeadTrackPatch, PerAxis, PoseSample, WireLayout,
    DEFAULT_PORT,
};
pub use encode::{decode, decode_legacy, decode_primary, encode, LEGACY_LEN, PRIMARY_LEN};
pub use filter::PoseFilter;

use parking_lot::{Mutex, RwLock};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{lookup_host, UdpSocket};
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum HeadTrackError {
    #[error("Invalid head-track config: {0}")]
    InvalidConfig(String),

    #[error("Pose sample contains a non-finite value")]
    InvalidSample,

    #[error("Cannot decode packet: {0}")]
    Decode(String),

    #[error("Host '{0}' did not resolve")]
    UnresolvedHost(String),

    #[error("Send failed: {0}")]
    Io(#[from] std::io::Error),
}

impl HeadTrackError {
    /// Stable error code reported to clients
    pub fn code(&self) -> &'static str {
        match self {
            HeadTrackError::InvalidConfig(_) => "invalid_config",
            HeadTrackError::InvalidSample => "invalid_sample",
            HeadTrackError::Decode(_) => "decode_failed",
            HeadTrackError::UnresolvedHost(_) | HeadTrackError::Io(_) => "send_failed",
        }
    }
}

/// What was sent for one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentPacket {
    pub layout: WireLayout,
    pub len: usize,
    /// Pose after filtering
    pub pose: HeadPose,
}

/// Head-track pipeline state: config, filter history and the UDP sockets
pub struct HeadTracker {
    config: RwLock<HeadTrackConfig>,
    filter: Mutex<PoseFilter>,
    /// One socket per address family, bound on first use
    socket_v4: OnceCell<UdpSocket>,
    socket_v6: OnceCell<UdpSocket>,
}

impl HeadTracker {
    pub fn new(config: HeadTrackConfig) -> Self {
        Self {
            config: RwLock::new(config),
            filter: Mutex::new(PoseFilter::new()),
            socket_v4: OnceCell::new(),
            socket_v6: OnceCell::new(),
        }
    }

    pub fn config(&self) -> HeadTrackConfig {
        self.config.read().clone()
    }

    /// Merge a partial update and return the resulting config
    pub fn update_config(&self, patch: &HeadTrackPatch) -> Result<HeadTrackConfig, HeadTrackError> {
        let updated = {
            let mut config = self.config.write();
            config.merge(patch)?;
            config.clone()
        };
        self.filter.lock().reset();
        info!(
            "Head-track config: {}:{} {:?} smoothing {}",
            updated.host, updated.port, updated.layout, updated.smoothing
        );
        Ok(updated)
    }

    /// Filter and encode a sample without sending it
    pub fn prepare(&self, raw: &HeadPose) -> (HeadTrackConfig, HeadPose, Vec<u8>) {
        let config = self.config();
        let pose = self.filter.lock().apply(raw, &config);
        let packet = encode(&pose, config.layout);
        (config, pose, packet)
    }

    /// Filter, encode and send one sample
    pub async fn send(&self, raw: &HeadPose) -> Result<SentPacket, HeadTrackError> {
        let (config, pose, packet) = self.prepare(raw);

        let target = self.target(&config).await?;
        let socket = self.socket_for(&target).await?;
        socket.send_to(&packet, target).await?;
        debug!("Sent {} byte head-track packet to {}", packet.len(), target);

        Ok(SentPacket {
            layout: config.layout,
            len: packet.len(),
            pose,
        })
    }

    async fn target(&self, config: &HeadTrackConfig) -> Result<SocketAddr, HeadTrackError> {
        let host = config.resolved_host();
        lookup_host((host, config.port))
            .await?
            .next()
            .ok_or_else(|| HeadTrackError::UnresolvedHost(host.to_string()))
    }

    async fn socket_for(&self, target: &SocketAddr) -> std::io::Result<&UdpSocket> {
        if target.is_ipv6() {
            self.socket_v6
                .get_or_try_init(|| UdpSocket::bind(("::", 0)))
                .await
        } else {
            self.socket_v4
                .get_or_try_init(|| UdpSocket::bind(("0.0.0.0", 0)))
                .await
        }
    }
}

impl Default for HeadTracker {
    fn default() -> Self {
        Self::new(HeadTrackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_reaches_listener() {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let tracker = HeadTracker::default();
        let patch: HeadTrackPatch =
            serde_json::from_value(json!({"port": port, "layout": "legacy"})).unwrap();
        tracker.update_config(&patch).unwrap();

        let pose = HeadPose {
            yaw: 12.34,
            ..PerAxis::splat(0.0)
        };
        let sent = tracker.send(&pose).await.unwrap();
        assert_eq!(sent.len, LEGACY_LEN);

        let mut buf = [0u8; 64];
        let (n, _) = listener.recv_from(&mut buf).await.unwrap();
        let (layout, decoded) = decode(&buf[..n]).unwrap();
        assert_eq!(layout, WireLayout::Legacy);
        assert_eq!(decoded.yaw, 12.34);
    }

    #[tokio::test]
    async fn test_send_to_ipv6_host() {
        // Hosts without IPv6 loopback cannot run this
        let Ok(listener) = UdpSocket::bind("[::1]:0").await else {
            return;
        };
        let port = listener.local_addr().unwrap().port();

        let tracker = HeadTracker::default();
        let patch: HeadTrackPatch =
            serde_json::from_value(json!({"host": "::1", "port": port})).unwrap();
        tracker.update_config(&patch).unwrap();

        let sent = tracker.send(&PerAxis::splat(1.0)).await.unwrap();
        assert_eq!(sent.len, PRIMARY_LEN);

        let mut buf = [0u8; 64];
        let (n, from) = listener.recv_from(&mut buf).await.unwrap();
        assert!(from.is_ipv6());
        assert_eq!(decode_primary(&buf[..n]).unwrap(), PerAxis::splat(1.0));
    }

    #[test]
    fn test_update_rejects_invalid() {
        let tracker = HeadTracker::default();
        let patch: HeadTrackPatch = serde_json::from_value(json!({"smoothing": -1})).unwrap();
        let err = tracker.update_config(&patch).unwrap_err();
        assert_eq!(err.code(), "invalid_config");
        assert_eq!(tracker.config(), HeadTrackConfig::default());
    }
}
