//! Vendor specific signature schemes.
//!
//! Each [`CryptoMethod`] knows how its vendor turns a measurement or a whole
//! session into signed bytes, which hash is applied and where the public key
//! comes from. Per value schemes (EMH, BSM) sign every meter reading, session
//! schemes (OCMF, ChargePoint) sign the session once.

use log::{debug, warn};
use thiserror::Error;

use crate::binary_encoder::EncodeError;
use crate::curves::{self, CurveError, CurveName, PublicKey};
use crate::hash_engine;
use crate::key_resolver::{KeyError, KeyResolver};
use crate::models::{
    ChargingSession, CryptoTrace, EccSignature, HashAlgorithm, Measurement, SessionVerificationResult, SignatureFormat,
    ValueVerification, VerificationResult,
};
use crate::signature_codec::{self, CodecError, SignatureRs};

pub mod bsm;
pub mod chargepoint;
pub mod emh;
pub mod measurement_buffer;
pub mod ocmf;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Unable to encode measurement: {0}")]
    Encode(#[from] EncodeError),
    #[error("Unable to decode signature: {0}")]
    Codec(#[from] CodecError),
    #[error("Curve operation failed: {0}")]
    Curve(#[from] CurveError),
    #[error("Key lookup failed: {0}")]
    Key(#[from] KeyError),
    #[error("Unknown crypto method {0}")]
    UnknownCryptoMethod(String),
    #[error("Invalid session format: {0}")]
    InvalidSessionFormat(String),
    #[error("Unsupported signature algorithm {0}")]
    UnsupportedSignatureAlgorithm(String),
    #[error("Measurement value {0} does not exist")]
    NoSuchValue(usize),
}

/// What a scheme signs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScope {
    PerValue,
    PerSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoMethod {
    Emh,
    Bsm,
    Ocmf,
    ChargePoint,
}

/// Result of checking a session level signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSignatureCheck {
    pub status: SessionVerificationResult,
    pub public_key: Option<String>,
    pub hash_value: Option<String>,
    pub trace: Option<CryptoTrace>,
}

impl SessionSignatureCheck {
    pub fn new(status: SessionVerificationResult) -> Self {
        SessionSignatureCheck { status, public_key: None, hash_value: None, trace: None }
    }
}

impl CryptoMethod {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.trim() {
            "EMHCrypt01" => Some(CryptoMethod::Emh),
            "BSMCrypt01" => Some(CryptoMethod::Bsm),
            "OCMFv1.0" | "OCMF" => Some(CryptoMethod::Ocmf),
            "ChargePointCrypt01" => Some(CryptoMethod::ChargePoint),
            _ => None,
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            CryptoMethod::Emh => "EMHCrypt01",
            CryptoMethod::Bsm => "BSMCrypt01",
            CryptoMethod::Ocmf => "OCMFv1.0",
            CryptoMethod::ChargePoint => "ChargePointCrypt01",
        }
    }

    pub fn signing_scope(&self) -> SigningScope {
        match self {
            CryptoMethod::Emh | CryptoMethod::Bsm => SigningScope::PerValue,
            CryptoMethod::Ocmf | CryptoMethod::ChargePoint => SigningScope::PerSession,
        }
    }

    /// Verify the signature of one measurement value. Session level schemes
    /// have nothing to check here and answer `NoOperation`.
    pub fn verify_measurement(&self, session: &ChargingSession, measurement: &Measurement, value_index: usize, resolver: &KeyResolver) -> ValueVerification {
        match self {
            CryptoMethod::Emh => emh::verify_measurement(session, measurement, value_index, resolver),
            CryptoMethod::Bsm => bsm::verify_measurement(session, measurement, value_index, resolver),
            CryptoMethod::Ocmf | CryptoMethod::ChargePoint => ValueVerification::new(VerificationResult::NoOperation),
        }
    }

    /// Verify the whole session signature. Per value schemes leave the session `Unverified`.
    pub fn verify_session_signature(&self, session: &ChargingSession, resolver: &KeyResolver) -> SessionSignatureCheck {
        match self {
            CryptoMethod::Ocmf => ocmf::verify_session_signature(session, resolver),
            CryptoMethod::ChargePoint => chargepoint::verify_session_signature(session, resolver),
            CryptoMethod::Emh | CryptoMethod::Bsm => SessionSignatureCheck::new(SessionVerificationResult::Unverified),
        }
    }

    /// Produce the signature a meter of this vendor would attach to the value
    pub fn sign_measurement(&self, session: &ChargingSession, measurement: &Measurement, value_index: usize, private_key_hex: &str) -> Result<EccSignature, CryptoError> {
        match self {
            CryptoMethod::Emh => emh::sign_measurement(session, measurement, value_index, private_key_hex),
            CryptoMethod::Bsm => bsm::sign_measurement(session, measurement, value_index, private_key_hex),
            _ => Err(CryptoError::UnsupportedSignatureAlgorithm(format!("{} does not sign single values", self.identifier()))),
        }
    }
}

/// Hash settings of a buffered measurement
struct BufferedScheme {
    curve: CurveName,
    hash: HashAlgorithm,
    truncation: usize,
    format: SignatureFormat,
}

impl BufferedScheme {
    fn for_measurement(measurement: &Measurement, default_curve: CurveName) -> Self {
        match &measurement.signature_infos {
            Some(infos) => BufferedScheme {
                curve: infos.curve,
                hash: infos.hash,
                truncation: infos.hash_truncation.unwrap_or(24),
                format: infos.format,
            },
            None => BufferedScheme {
                curve: default_curve,
                hash: HashAlgorithm::Sha256,
                truncation: 24,
                format: SignatureFormat::Rs,
            },
        }
    }

    fn digest(&self, buffer: &[u8]) -> Vec<u8> {
        let digest = hash_engine::hash(buffer, self.hash);
        hash_engine::truncate_bytes(&digest, self.truncation).to_vec()
    }
}

/// Shared verification for the schemes that sign the 320 byte measurement buffer
fn verify_buffered(session: &ChargingSession, measurement: &Measurement, value_index: usize, resolver: &KeyResolver, default_curve: CurveName, obis_hex: Option<String>) -> ValueVerification {
    let value = match measurement.values.get(value_index) {
        Some(value) => value,
        None => return ValueVerification::new(VerificationResult::InvalidMeasurement),
    };
    let scheme = BufferedScheme::for_measurement(measurement, default_curve);
    let mut trace = CryptoTrace::default();

    let signature = match value.signatures.first() {
        Some(signature) => signature,
        None => {
            debug!("Value {value_index} of meter {} carries no signature", measurement.energy_meter_id);
            return ValueVerification::new(VerificationResult::InvalidSignature);
        }
    };

    let key_info = match resolver.meter_key(&measurement.energy_meter_id) {
        Ok(info) => info,
        Err(e) => {
            warn!("{e}");
            return ValueVerification::new(VerificationResult::from(&e));
        }
    };
    let key = match PublicKey::parse(key_info) {
        Ok(key) if key.curve == scheme.curve => key,
        Ok(key) => {
            warn!("Key of meter {} is on {}, expected {}", measurement.energy_meter_id, key.curve, scheme.curve);
            return ValueVerification::new(VerificationResult::InvalidPublicKey);
        }
        Err(e) => {
            warn!("Key of meter {} is unusable: {e}", measurement.energy_meter_id);
            return ValueVerification::new(VerificationResult::InvalidPublicKey);
        }
    };
    trace.public_key = Some(key.to_raw_hex());

    let obis_hex = match obis_hex {
        Some(obis_hex) => obis_hex,
        None => {
            warn!("OBIS code {} can not be encoded", measurement.obis);
            return ValueVerification::new(VerificationResult::InvalidMeasurement);
        }
    };
    let buffer = match measurement_buffer::encode_measurement(session, measurement, value, &obis_hex) {
        Ok(buffer) => buffer,
        Err(e) => {
            warn!("Unable to encode value {value_index} of meter {}: {e}", measurement.energy_meter_id);
            return ValueVerification::new(VerificationResult::InvalidMeasurement);
        }
    };
    let digest = scheme.digest(buffer.as_bytes());
    trace.buffer = Some(buffer.to_hex());
    trace.hash = Some(hex::encode(&digest));
    trace.fields = buffer.into_fields();

    /* the declared format of the measurement wins over the per signature default */
    let mut signature = signature.clone();
    if scheme.format == SignatureFormat::Der && signature.value.is_some() {
        signature.format = SignatureFormat::Der;
    }
    let rs = match SignatureRs::from_ecc(&signature) {
        Ok(rs) => rs.padded(scheme.curve.scalar_bytes()),
        Err(e) => {
            debug!("Signature of value {value_index} is malformed: {e}");
            return ValueVerification::with_trace(VerificationResult::InvalidSignature, trace);
        }
    };
    trace.signature_r = Some(rs.r.clone());
    trace.signature_s = Some(rs.s.clone());

    let status = match curves::verify_digest(scheme.curve, &digest, &rs, &key) {
        Ok(true) => VerificationResult::ValidSignature,
        Ok(false) => VerificationResult::InvalidSignature,
        Err(e) => {
            warn!("{e}");
            VerificationResult::InvalidPublicKey
        }
    };
    debug!("Value {value_index} of meter {}: {:?}", measurement.energy_meter_id, status);
    ValueVerification::with_trace(status, trace)
}

fn sign_buffered(session: &ChargingSession, measurement: &Measurement, value_index: usize, private_key_hex: &str, default_curve: CurveName, obis_hex: &str) -> Result<EccSignature, CryptoError> {
    let value = measurement.values.get(value_index).ok_or(CryptoError::NoSuchValue(value_index))?;
    let scheme = BufferedScheme::for_measurement(measurement, default_curve);
    let buffer = measurement_buffer::encode_measurement(session, measurement, value, obis_hex)?;
    let rs = curves::sign_digest(scheme.curve, &scheme.digest(buffer.as_bytes()), private_key_hex)?;

    match scheme.format {
        SignatureFormat::Rs => Ok(EccSignature::from_rs(rs.r, rs.s)),
        SignatureFormat::Der => Ok(EccSignature::from_der_hex(signature_codec::encode_der_hex(&rs)?)),
    }
}
