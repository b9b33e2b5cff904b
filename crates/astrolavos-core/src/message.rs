//! Broadcast wire format.
//!
//! Every device periodically announces its identity, last fix and
//! want-to-meet flag in a single fixed-layout frame. There is no length
//! prefix and no checksum beyond the radio's own CRC; receivers validate
//! by exact unit size and magic.
//!
//! Binary format (little-endian, 20 bytes, no padding):
//! - magic: 2 bytes (u16, 0xE7F4)
//! - sender: 1 byte (u8 device id)
//! - latitude: 4 bytes (f32 degrees, NaN when no fix)
//! - longitude: 4 bytes (f32 degrees, NaN when no fix)
//! - timestamp: 8 bytes (i64 microseconds, sender clock, 0 when no fix)
//! - wants_to_meet: 1 byte (0 = false, nonzero = true)

use crate::error::Error;
use crate::geo::GeoPosition;

/// Frame marker; anything else on the air is not ours.
pub const MESSAGE_MAGIC: u16 = 0xE7F4;

/// Exact size of one encoded frame unit.
pub const MESSAGE_SIZE: usize = 20;

/// One announcement frame, mirroring the wire field for field.
///
/// The latitude/longitude pair carries the NaN sentinel on the wire when
/// the sender has no fix; [`BroadcastMessage::position`] folds that back
/// into an `Option` so nothing downstream compares against NaN.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastMessage {
    pub magic: u16,
    pub sender: u8,
    pub latitude: f32,
    pub longitude: f32,
    /// Sender-side fix time in microseconds. Only meaningful on the
    /// sender's clock; receivers log it and stamp their own.
    pub timestamp_us: i64,
    pub wants_to_meet: bool,
}

impl BroadcastMessage {
    /// Build an announcement for the given identity and fix.
    pub fn new(sender: u8, position: Option<&GeoPosition>, wants_to_meet: bool) -> Self {
        match position {
            Some(fix) => Self {
                magic: MESSAGE_MAGIC,
                sender,
                latitude: fix.latitude,
                longitude: fix.longitude,
                timestamp_us: fix.timestamp.as_micros() as i64,
                wants_to_meet,
            },
            None => Self {
                magic: MESSAGE_MAGIC,
                sender,
                latitude: f32::NAN,
                longitude: f32::NAN,
                timestamp_us: 0,
                wants_to_meet,
            },
        }
    }

    /// Returns the size of one encoded frame in bytes (20).
    pub const fn size() -> usize {
        MESSAGE_SIZE
    }

    /// The carried fix, with the wire's NaN sentinel mapped to `None`.
    pub fn position(&self) -> Option<(f32, f32)> {
        if self.latitude.is_finite() && self.longitude.is_finite() {
            Some((self.latitude, self.longitude))
        } else {
            None
        }
    }

    /// Encode the frame for transmission.
    pub fn to_bytes(&self) -> [u8; MESSAGE_SIZE] {
        let mut bytes = [0u8; MESSAGE_SIZE];

        bytes[0..2].copy_from_slice(&self.magic.to_le_bytes());
        bytes[2] = self.sender;
        bytes[3..7].copy_from_slice(&self.latitude.to_le_bytes());
        bytes[7..11].copy_from_slice(&self.longitude.to_le_bytes());
        bytes[11..19].copy_from_slice(&self.timestamp_us.to_le_bytes());
        bytes[19] = u8::from(self.wants_to_meet);

        bytes
    }

    /// Decode one frame unit.
    ///
    /// Rejects anything that is not exactly [`MESSAGE_SIZE`] bytes or does
    /// not open with [`MESSAGE_MAGIC`]. The sender id is not validated
    /// here; the registry rejects unknown identities.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != MESSAGE_SIZE {
            return Err(Error::InvalidArgument);
        }

        let mut magic_bytes = [0u8; 2];
        magic_bytes.copy_from_slice(&bytes[0..2]);
        let magic = u16::from_le_bytes(magic_bytes);
        if magic != MESSAGE_MAGIC {
            return Err(Error::InvalidArgument);
        }

        let sender = bytes[2];

        let mut lat_bytes = [0u8; 4];
        lat_bytes.copy_from_slice(&bytes[3..7]);
        let latitude = f32::from_le_bytes(lat_bytes);

        let mut lon_bytes = [0u8; 4];
        lon_bytes.copy_from_slice(&bytes[7..11]);
        let longitude = f32::from_le_bytes(lon_bytes);

        let mut ts_bytes = [0u8; 8];
        ts_bytes.copy_from_slice(&bytes[11..19]);
        let timestamp_us = i64::from_le_bytes(ts_bytes);

        let wants_to_meet = bytes[19] != 0;

        Ok(Self {
            magic,
            sender,
            latitude,
            longitude,
            timestamp_us,
            wants_to_meet,
        })
    }
}

/// Split a received buffer into frame units.
///
/// The radio can hand back several coalesced announcements in one read;
/// a valid buffer is an exact positive multiple of [`MESSAGE_SIZE`].
/// Anything else (trailing partial unit included) is rejected outright,
/// without parsing the leading units.
pub fn frame_units(frame: &[u8]) -> Result<core::slice::ChunksExact<'_, u8>, Error> {
    if frame.is_empty() || frame.len() % MESSAGE_SIZE != 0 {
        return Err(Error::InvalidArgument);
    }
    Ok(frame.chunks_exact(MESSAGE_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_time::Instant;

    fn fix() -> GeoPosition {
        GeoPosition::new(52.52, 13.405, Instant::from_micros(1_700_000))
    }

    #[test]
    fn test_message_size() {
        assert_eq!(BroadcastMessage::size(), 20, "frame must be exactly 20 bytes");
        let message = BroadcastMessage::new(1, Some(&fix()), false);
        assert_eq!(message.to_bytes().len(), MESSAGE_SIZE);
    }

    #[test]
    fn test_magic_is_little_endian_on_the_wire() {
        let bytes = BroadcastMessage::new(0, None, false).to_bytes();
        assert_eq!(bytes[0], 0xF4);
        assert_eq!(bytes[1], 0xE7);
    }

    #[test]
    fn test_round_trip_with_fix() {
        let message = BroadcastMessage::new(2, Some(&fix()), true);
        let decoded = BroadcastMessage::from_bytes(&message.to_bytes()).unwrap();

        assert_eq!(decoded.magic, MESSAGE_MAGIC);
        assert_eq!(decoded.sender, 2);
        assert_eq!(decoded.position(), Some((52.52, 13.405)));
        assert_eq!(decoded.timestamp_us, 1_700_000);
        assert!(decoded.wants_to_meet);
    }

    #[test]
    fn test_round_trip_without_fix() {
        let message = BroadcastMessage::new(3, None, false);
        let decoded = BroadcastMessage::from_bytes(&message.to_bytes()).unwrap();

        assert_eq!(decoded.sender, 3);
        assert_eq!(decoded.position(), None);
        assert!(decoded.latitude.is_nan());
        assert_eq!(decoded.timestamp_us, 0);
        assert!(!decoded.wants_to_meet);
    }

    #[test]
    fn test_known_byte_layout() {
        // Hand-built frame: magic, sender 7, lat 1.0, lon -2.0, ts 256, flag set.
        let mut bytes = [0u8; MESSAGE_SIZE];
        bytes[0..2].copy_from_slice(&0xE7F4u16.to_le_bytes());
        bytes[2] = 7;
        bytes[3..7].copy_from_slice(&1.0f32.to_le_bytes());
        bytes[7..11].copy_from_slice(&(-2.0f32).to_le_bytes());
        bytes[11..19].copy_from_slice(&256i64.to_le_bytes());
        bytes[19] = 1;

        let decoded = BroadcastMessage::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.sender, 7);
        assert_eq!(decoded.latitude, 1.0);
        assert_eq!(decoded.longitude, -2.0);
        assert_eq!(decoded.timestamp_us, 256);
        assert!(decoded.wants_to_meet);
    }

    #[test]
    fn test_rejects_wrong_magic() {
        let mut bytes = BroadcastMessage::new(0, None, false).to_bytes();
        bytes[1] = 0xAA;
        assert_eq!(
            BroadcastMessage::from_bytes(&bytes).unwrap_err(),
            Error::InvalidArgument
        );
    }

    #[test]
    fn test_rejects_wrong_length() {
        let bytes = BroadcastMessage::new(0, None, false).to_bytes();
        assert!(BroadcastMessage::from_bytes(&bytes[..19]).is_err());

        let mut long = [0u8; MESSAGE_SIZE + 1];
        long[..MESSAGE_SIZE].copy_from_slice(&bytes);
        assert!(BroadcastMessage::from_bytes(&long).is_err());
    }

    #[test]
    fn test_flag_byte_nonzero_decodes_true() {
        let mut bytes = BroadcastMessage::new(0, None, false).to_bytes();
        bytes[19] = 7;
        assert!(BroadcastMessage::from_bytes(&bytes).unwrap().wants_to_meet);
    }

    #[test]
    fn test_frame_units_coalesced_pair() {
        let first = BroadcastMessage::new(1, Some(&fix()), false).to_bytes();
        let second = BroadcastMessage::new(2, None, true).to_bytes();

        let mut buffer = [0u8; MESSAGE_SIZE * 2];
        buffer[..MESSAGE_SIZE].copy_from_slice(&first);
        buffer[MESSAGE_SIZE..].copy_from_slice(&second);

        let mut units = frame_units(&buffer).unwrap();
        let a = BroadcastMessage::from_bytes(units.next().unwrap()).unwrap();
        let b = BroadcastMessage::from_bytes(units.next().unwrap()).unwrap();
        assert!(units.next().is_none());

        assert_eq!(a.sender, 1);
        assert_eq!(b.sender, 2);
        assert!(b.wants_to_meet);
    }

    #[test]
    fn test_frame_units_rejects_fractional_length() {
        // Two and a half frames: rejected outright, no partial parse.
        let buffer = [0u8; MESSAGE_SIZE * 5 / 2];
        assert_eq!(frame_units(&buffer).unwrap_err(), Error::InvalidArgument);
    }

    #[test]
    fn test_frame_units_rejects_empty() {
        assert!(frame_units(&[]).is_err());
    }
}
