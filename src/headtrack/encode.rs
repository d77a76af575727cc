//! Head-track packet encoding
//!
//! Two fixed little-endian layouts:
//!
//! ```text
//! primary (48 bytes): x y z yaw pitch roll          f64 each, raw units
//! legacy  (32 bytes): magic pitch yaw roll x y z    u32 + i32 hundredths, 4 reserved
//! ```

use super::config::{HeadPose, WireLayout};
use super::HeadTrackError;
use zerocopy::byteorder::little_endian::{F64, I32, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// First field of every legacy packet
pub const LEGACY_MAGIC: u32 = 0x1234_5678;
pub const LEGACY_LEN: usize = 32;
pub const PRIMARY_LEN: usize = 48;

/// Legacy packet: angles and offsets in hundredths
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LegacyPacket {
    magic: U32,
    pitch: I32,
    yaw: I32,
    roll: I32,
    x: I32,
    y: I32,
    z: I32,
    _reserved: [u8; 4],
}

impl LegacyPacket {
    pub fn new(pose: &HeadPose) -> Self {
        let hundredths = |v: f64| I32::new((v * 100.0).round() as i32);
        Self {
            magic: U32::new(LEGACY_MAGIC),
            pitch: hundredths(pose.pitch),
            yaw: hundredths(pose.yaw),
            roll: hundredths(pose.roll),
            x: hundredths(pose.x),
            y: hundredths(pose.y),
            z: hundredths(pose.z),
            _reserved: [0; 4],
        }
    }

    pub fn pose(&self) -> HeadPose {
        let units = |v: I32| f64::from(v.get()) / 100.0;
        HeadPose {
            pitch: units(self.pitch),
            roll: units(self.roll),
            yaw: units(self.yaw),
            x: units(self.x),
            y: units(self.y),
            z: units(self.z),
        }
    }
}

/// Primary packet: six doubles
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PrimaryPacket {
    x: F64,
    y: F64,
    z: F64,
    yaw: F64,
    pitch: F64,
    roll: F64,
}

impl PrimaryPacket {
    pub fn new(pose: &HeadPose) -> Self {
        Self {
            x: F64::new(pose.x),
            y: F64::new(pose.y),
            z: F64::new(pose.z),
            yaw: F64::new(pose.yaw),
            pitch: F64::new(pose.pitch),
            roll: F64::new(pose.roll),
        }
    }

    pub fn pose(&self) -> HeadPose {
        HeadPose {
            pitch: self.pitch.get(),
            roll: self.roll.get(),
            yaw: self.yaw.get(),
            x: self.x.get(),
            y: self.y.get(),
            z: self.z.get(),
        }
    }
}

/// Encode a (already filtered) pose
pub fn encode(pose: &HeadPose, layout: WireLayout) -> Vec<u8> {
    match layout {
        WireLayout::Primary => PrimaryPacket::new(pose).as_bytes().to_vec(),
        WireLayout::Legacy => LegacyPacket::new(pose).as_bytes().to_vec(),
    }
}

pub fn decode_primary(bytes: &[u8]) -> Result<HeadPose, HeadTrackError> {
    PrimaryPacket::read_from_bytes(bytes)
        .map(|packet| packet.pose())
        .map_err(|_| {
            HeadTrackError::Decode(format!(
                "primary packet must be {PRIMARY_LEN} bytes, got {}",
                bytes.len()
            ))
        })
}

pub fn decode_legacy(bytes: &[u8]) -> Result<HeadPose, HeadTrackError> {
    let packet = LegacyPacket::read_from_bytes(bytes).map_err(|_| {
        HeadTrackError::Decode(format!(
            "legacy packet must be {LEGACY_LEN} bytes, got {}",
            bytes.len()
        ))
    })?;
    if packet.magic.get() != LEGACY_MAGIC {
        return Err(HeadTrackError::Decode(format!(
            "bad magic 0x{:08X}",
            packet.magic.get()
        )));
    }
    Ok(packet.pose())
}

/// Decode either layout, telling them apart by length
pub fn decode(bytes: &[u8]) -> Result<(WireLayout, HeadPose), HeadTrackError> {
    match bytes.len() {
        PRIMARY_LEN => Ok((WireLayout::Primary, decode_primary(bytes)?)),
        LEGACY_LEN => Ok((WireLayout::Legacy, decode_legacy(bytes)?)),
        n => Err(HeadTrackError::Decode(format!(
            "unexpected packet length {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose() -> HeadPose {
        HeadPose {
            pitch: 10.5,
            roll: 2.0,
            yaw: -30.25,
            x: 1.234,
            y: -0.5,
            z: 0.0,
        }
    }

    #[test]
    fn test_packet_sizes() {
        assert_eq!(std::mem::size_of::<LegacyPacket>(), LEGACY_LEN);
        assert_eq!(std::mem::size_of::<PrimaryPacket>(), PRIMARY_LEN);
        assert_eq!(encode(&pose(), WireLayout::Legacy).len(), LEGACY_LEN);
        assert_eq!(encode(&pose(), WireLayout::Primary).len(), PRIMARY_LEN);
    }

    #[test]
    fn test_legacy_byte_layout() {
        let bytes = encode(&pose(), WireLayout::Legacy);
        assert_eq!(&bytes[0..4], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(i32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1050); // pitch
        assert_eq!(i32::from_le_bytes(bytes[8..12].try_into().unwrap()), -3025); // yaw
        assert_eq!(i32::from_le_bytes(bytes[12..16].try_into().unwrap()), 200); // roll
        assert_eq!(i32::from_le_bytes(bytes[16..20].try_into().unwrap()), 123); // x
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_primary_byte_layout() {
        let bytes = encode(&pose(), WireLayout::Primary);
        let field = |i: usize| f64::from_le_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
        assert_eq!(field(0), 1.234); // x
        assert_eq!(field(3), -30.25); // yaw
        assert_eq!(field(4), 10.5); // pitch
        assert_eq!(field(5), 2.0); // roll
    }

    #[test]
    fn test_legacy_round_trip_within_hundredth() {
        let (layout, decoded) = decode(&encode(&pose(), WireLayout::Legacy)).unwrap();
        assert_eq!(layout, WireLayout::Legacy);
        for (a, b) in decoded.values().iter().zip(pose().values()) {
            assert!((a - b).abs() <= 0.01, "{a} vs {b}");
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(&[0u8; 10]).is_err());
        assert!(decode_legacy(&[0u8; 32]).is_err());
        assert!(decode_primary(&[0u8; 32]).is_err());
    }
}
