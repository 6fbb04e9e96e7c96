use crate::binary_encoder::EncodeError;
use crate::curves::CurveName;
use crate::key_resolver::KeyResolver;
use crate::models::{ChargingSession, EccSignature, Measurement, ValueVerification};

use super::{sign_buffered, verify_buffered, CryptoError};

/// EMH meters write the OBIS code as hex already
fn obis_hex(measurement: &Measurement) -> Option<String> {
    let obis = measurement.obis.trim();
    if obis.len() == 12 && obis.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(obis.to_uppercase());
    }
    None
}

pub fn verify_measurement(session: &ChargingSession, measurement: &Measurement, value_index: usize, resolver: &KeyResolver) -> ValueVerification {
    verify_buffered(session, measurement, value_index, resolver, CurveName::Secp192r1, obis_hex(measurement))
}

pub fn sign_measurement(session: &ChargingSession, measurement: &Measurement, value_index: usize, private_key_hex: &str) -> Result<EccSignature, CryptoError> {
    let obis = obis_hex(measurement).ok_or(EncodeError::InvalidHex("obis".to_string()))?;
    sign_buffered(session, measurement, value_index, private_key_hex, CurveName::Secp192r1, &obis)
}
