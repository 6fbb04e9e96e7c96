use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigUint;
use thiserror::Error;

use crate::models::{EccSignature, SignatureFormat};

pub mod asn1;

use asn1::{DerReader, TAG_INTEGER, TAG_SEQUENCE};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid DER structure: {0}")]
    InvalidDer(String),
    #[error("Value is neither hex nor base64")]
    InvalidEncoding,
    #[error("Signature component {0} is missing")]
    MissingComponent(String),
}

/// ECDSA signature as lowercase hex r and s
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRs {
    pub r: String,
    pub s: String,
}

fn strip_hex(value: &str) -> String {
    let trimmed = value.trim().trim_start_matches('0').to_lowercase();
    if trimmed.len() % 2 == 1 {
        return format!("0{trimmed}");
    }
    trimmed
}

fn pad_hex(value: &str, len: usize) -> String {
    let stripped = strip_hex(value);
    if stripped.len() >= len * 2 {
        return stripped;
    }
    format!("{}{}", "0".repeat(len * 2 - stripped.len()), stripped)
}

impl SignatureRs {
    pub fn new(r: &str, s: &str) -> Self {
        SignatureRs { r: r.trim().to_lowercase(), s: s.trim().to_lowercase() }
    }

    pub fn from_scalars(r: &BigUint, s: &BigUint, len: usize) -> Self {
        SignatureRs { r: pad_hex(&r.to_str_radix(16), len), s: pad_hex(&s.to_str_radix(16), len) }
    }

    /// Both components left padded with zeros to `len` bytes
    pub fn padded(&self, len: usize) -> Self {
        SignatureRs { r: pad_hex(&self.r, len), s: pad_hex(&self.s, len) }
    }

    /// Convert a signature as found in a record according to its declared format
    pub fn from_ecc(signature: &EccSignature) -> Result<Self, CodecError> {
        match signature.format {
            SignatureFormat::Rs => {
                let r = signature.r.as_deref().ok_or(CodecError::MissingComponent("r".to_string()))?;
                let s = signature.s.as_deref().ok_or(CodecError::MissingComponent("s".to_string()))?;
                Ok(SignatureRs::new(r, s))
            }
            SignatureFormat::Der => {
                let value = signature.value.as_deref().ok_or(CodecError::MissingComponent("value".to_string()))?;
                decode_der(&decode_hex_or_base64(value)?)
            }
        }
    }
}

/// Hex first, standard base64 as fallback
pub fn decode_hex_or_base64(value: &str) -> Result<Vec<u8>, CodecError> {
    let trimmed = value.trim();
    if let Ok(bytes) = hex::decode(trimmed) {
        return Ok(bytes);
    }
    STANDARD.decode(trimmed).map_err(|_| CodecError::InvalidEncoding)
}

/// `SEQUENCE { INTEGER r, INTEGER s }`
pub fn decode_der(bytes: &[u8]) -> Result<SignatureRs, CodecError> {
    let mut outer = DerReader::new(bytes);
    let sequence = outer.expect(TAG_SEQUENCE)?;
    if !outer.is_empty() {
        return Err(CodecError::InvalidDer("trailing data after signature".to_string()));
    }

    let mut inner = DerReader::new(sequence);
    let r = inner.expect(TAG_INTEGER)?;
    let s = inner.expect(TAG_INTEGER)?;
    if !inner.is_empty() {
        return Err(CodecError::InvalidDer("signature sequence has more than two elements".to_string()));
    }
    if r.is_empty() || s.is_empty() || r[0] & 0x80 != 0 || s[0] & 0x80 != 0 {
        return Err(CodecError::InvalidDer("signature components must be positive integers".to_string()));
    }

    Ok(SignatureRs { r: strip_hex(&hex::encode(r)), s: strip_hex(&hex::encode(s)) })
}

pub fn decode_der_hex(value: &str) -> Result<SignatureRs, CodecError> {
    let bytes = hex::decode(value.trim()).map_err(|_| CodecError::InvalidEncoding)?;
    decode_der(&bytes)
}

pub fn encode_der(signature: &SignatureRs) -> Result<Vec<u8>, CodecError> {
    let r = hex::decode(strip_hex(&signature.r)).map_err(|_| CodecError::InvalidEncoding)?;
    let s = hex::decode(strip_hex(&signature.s)).map_err(|_| CodecError::InvalidEncoding)?;
    let mut content = asn1::write_unsigned_integer(&r);
    content.extend(asn1::write_unsigned_integer(&s));
    Ok(asn1::write_tlv(TAG_SEQUENCE, &content))
}

pub fn encode_der_hex(signature: &SignatureRs) -> Result<String, CodecError> {
    Ok(hex::encode(encode_der(signature)?))
}
