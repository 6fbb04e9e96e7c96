use chrono::{DateTime, Utc};
use log::debug;
use thiserror::Error;

use crate::models::TraceField;

/// Size of the signed buffer used by all current vendor layouts
pub const BUFFER_SIZE: usize = 320;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Field {0} is not a valid hex string")]
    InvalidHex(String),
    #[error("Field {field} has {actual} bytes, expected {expected}")]
    InvalidLength { field: String, expected: usize, actual: usize },
    #[error("Timestamp of field {0} does not fit into 32 bits")]
    TimestampOutOfRange(String),
    #[error("Required field {0} is missing")]
    MissingField(String),
}

/// Deterministic field-at-offset writer.
///
/// Every setter returns the hex representation of the bytes it wrote and
/// records it as a named trace field. Writing beyond [`BUFFER_SIZE`] is a bug
/// in the calling layout and panics.
pub struct MeasurementBuffer {
    buffer: [u8; BUFFER_SIZE],
    fields: Vec<TraceField>,
}

impl MeasurementBuffer {
    pub fn new() -> Self {
        MeasurementBuffer {
            buffer: [0u8; BUFFER_SIZE],
            fields: Vec::new(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.buffer)
    }

    pub fn fields(&self) -> &[TraceField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<TraceField> {
        self.fields
    }

    fn write(&mut self, name: &str, bytes: &[u8], offset: usize) -> String {
        let end = offset + bytes.len();
        assert!(end <= BUFFER_SIZE, "field {name} at {offset}..{end} exceeds the {BUFFER_SIZE} byte buffer");

        self.buffer[offset..end].copy_from_slice(bytes);
        let h = hex::encode(bytes);
        debug!("buffer[{offset}..{end}] {name} = {h}");
        self.fields.push(TraceField { name: name.to_string(), offset, hex: h.clone() });
        return h;
    }

    pub fn set_hex(&mut self, name: &str, value: &str, offset: usize, reverse: bool) -> Result<String, EncodeError> {
        let mut bytes = hex::decode(value.trim()).map_err(|_| EncodeError::InvalidHex(name.to_string()))?;
        if reverse {
            bytes.reverse();
        }
        Ok(self.write(name, &bytes, offset))
    }

    /// Like `set_hex` but the decoded value must have exactly `size` bytes
    pub fn set_hex_sized(&mut self, name: &str, value: &str, offset: usize, size: usize, reverse: bool) -> Result<String, EncodeError> {
        let len = value.trim().len() / 2;
        if value.trim().len() % 2 != 0 || len != size {
            return Err(EncodeError::InvalidLength { field: name.to_string(), expected: size, actual: len });
        }
        self.set_hex(name, value, offset, reverse)
    }

    /// Unix seconds plus `utc_offset_minutes`, little endian
    pub fn set_timestamp32(&mut self, name: &str, timestamp: &DateTime<Utc>, offset: usize, utc_offset_minutes: i64) -> Result<String, EncodeError> {
        let seconds = utc_offset_minutes.checked_mul(60)
            .and_then(|shift| timestamp.timestamp().checked_add(shift))
            .and_then(|seconds| u32::try_from(seconds).ok())
            .ok_or(EncodeError::TimestampOutOfRange(name.to_string()))?;
        Ok(self.write(name, &seconds.to_le_bytes(), offset))
    }

    /// Big endian unless `reverse` is set
    pub fn set_uint32(&mut self, name: &str, value: u32, offset: usize, reverse: bool) -> String {
        let bytes = if reverse { value.to_le_bytes() } else { value.to_be_bytes() };
        self.write(name, &bytes, offset)
    }

    /// Big endian unless `reverse` is set
    pub fn set_uint64(&mut self, name: &str, value: u64, offset: usize, reverse: bool) -> String {
        let bytes = if reverse { value.to_le_bytes() } else { value.to_be_bytes() };
        self.write(name, &bytes, offset)
    }

    pub fn set_int8(&mut self, name: &str, value: i8, offset: usize) -> String {
        self.write(name, &value.to_be_bytes(), offset)
    }

    pub fn set_text(&mut self, name: &str, value: &str, offset: usize) -> String {
        self.write(name, value.as_bytes(), offset)
    }
}
