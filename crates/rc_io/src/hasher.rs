//! crates/rc_io/src/hasher.rs
//!
//! Deterministic hashing and id builders for result documents.
//!
//! - `sha256_canonical(..)` hashes serializable values through canonical JSON.
//! - `sha256_hex(..)` / `sha256_file(..)` hash raw bytes.
//! - Document ids: `TBL:<hex>` (indicator table), `RNK:<hex>` (composite ranking).
//!   Hex digests are lowercase.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::{IoError, IoResult};

pub const TABLE_ID_PREFIX: &str = "TBL:";
pub const RANKING_ID_PREFIX: &str = "RNK:";

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 of the canonical JSON form of `value`.
pub fn sha256_canonical<T: Serialize + ?Sized>(value: &T) -> IoResult<String> {
    let bytes = to_canonical_bytes(value)?;
    Ok(sha256_hex(&bytes))
}

/// Streamed SHA-256 of a file on disk.
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let f = File::open(path).map_err(|e| IoError::Hash(format!("{}: {e}", path.display())))?;
    let mut reader = BufReader::new(f);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).map_err(|e| IoError::Hash(e.to_string()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// `TBL:<sha256>` over the canonical JSON of an id-less table payload.
pub fn tbl_id<T: Serialize + ?Sized>(payload: &T) -> IoResult<String> {
    Ok(format!("{TABLE_ID_PREFIX}{}", sha256_canonical(payload)?))
}

/// `RNK:<sha256>` over the canonical JSON of an id-less ranking payload.
pub fn rnk_id<T: Serialize + ?Sized>(payload: &T) -> IoResult<String> {
    Ok(format!("{RANKING_ID_PREFIX}{}", sha256_canonical(payload)?))
}

/// True for a lowercase 64-hex digest.
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
