//! History persistence
//!
//! History is written as consecutive fixed-size records (see
//! [`Snapshot`](crate::Snapshot)) and base64 encoded so it can sit inside a
//! larger JSON or XML state blob. All values are little-endian regardless of
//! the host, so a state saved on one machine loads on any other as long as the
//! float width matches.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{MatchError, Result};
use crate::sample::Sample;
use crate::snapshot::Snapshot;

/// Encode snapshots in order as a base64 string
pub fn encode_history<T: Sample>(history: &[Snapshot<T>]) -> String {
    let mut bytes = Vec::with_capacity(history.len() * Snapshot::<T>::RECORD_SIZE);
    for snapshot in history {
        snapshot.write_record(&mut bytes);
    }
    STANDARD.encode(bytes)
}

/// Decode a string produced by [`encode_history`]
///
/// Fails if the text is not base64, the decoded length does not split into
/// whole records, or a record holds a NaN or infinite value. No ordering
/// checks are made here.
pub fn decode_history<T: Sample>(encoded: &str) -> Result<Vec<Snapshot<T>>> {
    let bytes = STANDARD.decode(encoded.trim())?;
    let record_size = Snapshot::<T>::RECORD_SIZE;
    if bytes.len() % record_size != 0 {
        return Err(MatchError::RecordLength {
            len: bytes.len(),
            record_size,
        });
    }

    let history: Vec<Snapshot<T>> = bytes
        .chunks_exact(record_size)
        .map(Snapshot::<T>::read_record)
        .collect();
    if let Some(index) = history.iter().position(|snapshot| !snapshot.is_finite()) {
        return Err(MatchError::NonFiniteRecord {
            index,
            position: history[index].position(),
        });
    }
    Ok(history)
}

/// Check that positions strictly increase
pub fn validate_order<T: Sample>(history: &[Snapshot<T>]) -> Result<()> {
    for (index, pair) in history.windows(2).enumerate() {
        if pair[1].position() <= pair[0].position() {
            return Err(MatchError::UnorderedHistory {
                index: index + 1,
                position: pair[1].position(),
                previous: pair[0].position(),
            });
        }
    }
    Ok(())
}
