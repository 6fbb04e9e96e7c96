use num_bigint::BigUint;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::models::HashAlgorithm;

pub fn hash<T: AsRef<[u8]>>(data: T, algorithm: HashAlgorithm) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data.as_ref()).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data.as_ref()).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data.as_ref()).to_vec(),
    }
}

pub fn hash_hex<T: AsRef<[u8]>>(data: T, algorithm: HashAlgorithm) -> String {
    hex::encode(hash(data, algorithm))
}

/// Keep the first `byte_count` bytes of a hex digest
pub fn truncate(hex_digest: &str, byte_count: usize) -> String {
    let chars = (byte_count * 2).min(hex_digest.len());
    hex_digest[..chars].to_string()
}

/// Same as [`truncate`] on raw bytes
pub fn truncate_bytes(digest: &[u8], byte_count: usize) -> &[u8] {
    &digest[..byte_count.min(digest.len())]
}

/// Interpret the hex digest as a big endian integer and shift it right by `bits`.
/// Returns `None` for non-hex input.
pub fn shift_reduce(hex_digest: &str, bits: usize) -> Option<String> {
    let value = BigUint::parse_bytes(hex_digest.as_bytes(), 16)?;
    Some((value >> bits).to_str_radix(16))
}
