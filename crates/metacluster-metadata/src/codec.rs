//! Versioned record encoding.
//!
//! Every persisted record is written as a fixed header followed by a
//! postcard payload:
//!
//! ```text
//! [format_version:u16][schema_id:u32][payload:bytes]
//!        2B                 4B          variable
//! ```
//!
//! All integers are little-endian. The schema id is a per-record-type
//! constant and, together with the payload field order, must stay stable
//! across releases. Decoding checks the header before touching the payload
//! and rejects anything left over after it.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Serialize, de::DeserializeOwned};

use crate::DecodeError;

/// Current on-disk format version.
pub const FORMAT_VERSION: u16 = 1;

// format_version(2) + schema_id(4)
const HEADER_SIZE: usize = 6;

/// A record type with a stable persisted encoding.
///
/// The wire form is a plain serde struct whose field order is the
/// persisted order. Records with shape invariants validate them in
/// [`from_wire`](Self::from_wire).
pub trait Versioned: Sized {
    /// Fixed numeric schema identifier for this record type.
    const SCHEMA_ID: u32;

    /// Record name used in error messages.
    const RECORD: &'static str;

    type Wire: Serialize + DeserializeOwned;

    fn to_wire(&self) -> Self::Wire;

    /// Converts a decoded wire value into the record.
    ///
    /// # Errors
    ///
    /// Returns a description of the violated invariant.
    fn from_wire(wire: Self::Wire) -> Result<Self, String>;
}

/// Encodes a record with its versioned header.
///
/// # Panics
///
/// Panics if postcard cannot serialize the wire form. Metadata wire types
/// contain only integers, strings, and unit enums, which always serialize.
pub fn encode<T: Versioned>(value: &T) -> Bytes {
    let payload = postcard::to_allocvec(&value.to_wire())
        .expect("metadata wire types always serialize");

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u16_le(FORMAT_VERSION);
    buf.put_u32_le(T::SCHEMA_ID);
    buf.put_slice(&payload);
    buf.freeze()
}

/// Decodes a record written by [`encode`].
///
/// # Errors
///
/// Returns [`DecodeError`] if the header is short, the format version or
/// schema id is not the expected one, the payload is malformed or followed
/// by trailing bytes, or the decoded value violates the record's invariants.
pub fn decode<T: Versioned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let Some((header, payload)) = bytes.split_at_checked(HEADER_SIZE) else {
        return Err(DecodeError::Truncated {
            record: T::RECORD,
            len: bytes.len(),
        });
    };

    let version = u16::from_le_bytes([header[0], header[1]]);
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedFormat {
            record: T::RECORD,
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    let schema_id = u32::from_le_bytes([header[2], header[3], header[4], header[5]]);
    if schema_id != T::SCHEMA_ID {
        return Err(DecodeError::SchemaMismatch {
            record: T::RECORD,
            expected: T::SCHEMA_ID,
            found: schema_id,
        });
    }

    let (wire, rest) =
        postcard::take_from_bytes::<T::Wire>(payload).map_err(|e| DecodeError::Malformed {
            record: T::RECORD,
            reason: e.to_string(),
        })?;

    if !rest.is_empty() {
        return Err(DecodeError::TrailingBytes {
            record: T::RECORD,
            count: rest.len(),
        });
    }

    T::from_wire(wire).map_err(|reason| DecodeError::InvalidRecord {
        record: T::RECORD,
        reason,
    })
}

/// Reads the schema id from an encoded record without decoding the payload.
///
/// Returns `None` if the input is shorter than the header.
pub fn peek_schema_id(bytes: &[u8]) -> Option<u32> {
    let header = bytes.get(..HEADER_SIZE)?;
    Some(u32::from_le_bytes([header[2], header[3], header[4], header[5]]))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Sample {
        value: u32,
        label: String,
    }

    impl Versioned for Sample {
        const SCHEMA_ID: u32 = 77;
        const RECORD: &'static str = "Sample";
        type Wire = Sample;

        fn to_wire(&self) -> Sample {
            self.clone()
        }

        fn from_wire(wire: Sample) -> Result<Self, String> {
            if wire.label.is_empty() {
                return Err("label must not be empty".to_string());
            }
            Ok(wire)
        }
    }

    fn sample() -> Sample {
        Sample {
            value: 42,
            label: "sample".to_string(),
        }
    }

    #[test]
    fn header_layout() {
        let bytes = encode(&sample());
        assert_eq!(&bytes[..2], &FORMAT_VERSION.to_le_bytes());
        assert_eq!(&bytes[2..6], &77u32.to_le_bytes());
        assert_eq!(peek_schema_id(&bytes), Some(77));
    }

    #[test]
    fn roundtrip() {
        let bytes = encode(&sample());
        assert_eq!(decode::<Sample>(&bytes).unwrap(), sample());
    }

    #[test]
    fn empty_input_is_truncated() {
        assert_eq!(
            decode::<Sample>(&[]),
            Err(DecodeError::Truncated {
                record: "Sample",
                len: 0
            })
        );
        assert_eq!(peek_schema_id(&[1, 0, 77]), None);
    }

    #[test]
    fn unknown_format_version_is_rejected() {
        let mut bytes = encode(&sample()).to_vec();
        bytes[0] = 9;
        assert!(matches!(
            decode::<Sample>(&bytes),
            Err(DecodeError::UnsupportedFormat { found: 9, .. })
        ));
    }

    #[test]
    fn wrong_schema_is_rejected() {
        let mut bytes = encode(&sample()).to_vec();
        bytes[2..6].copy_from_slice(&78u32.to_le_bytes());
        assert!(matches!(
            decode::<Sample>(&bytes),
            Err(DecodeError::SchemaMismatch {
                expected: 77,
                found: 78,
                ..
            })
        ));
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let bytes = encode(&sample());
        let cut = &bytes[..bytes.len() - 2];
        assert!(matches!(
            decode::<Sample>(cut),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode(&sample()).to_vec();
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode::<Sample>(&bytes),
            Err(DecodeError::TrailingBytes { count: 2, .. })
        ));
    }

    #[test]
    fn invariant_violation_is_invalid_record() {
        let bytes = encode(&Sample {
            value: 1,
            label: String::new(),
        });
        assert!(matches!(
            decode::<Sample>(&bytes),
            Err(DecodeError::InvalidRecord { .. })
        ));
    }
}
