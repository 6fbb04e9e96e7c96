use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::curves::CurveName;

pub mod results;

pub use results::{CryptoTrace, SessionVerification, SessionVerificationResult, TraceField, ValuePosition, ValueVerification, VerificationResult};

/// Hash algorithms used by the supported vendors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA384")]
    Sha384,
    #[serde(rename = "SHA512")]
    Sha512,
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "").as_str() {
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA384" => Ok(HashAlgorithm::Sha384),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            _ => Err(format!("unknown hash algorithm {s}")),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CryptoAlgorithm {
    #[serde(rename = "ECDSA")]
    Ecdsa,
}

/// Wire form of a signature
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SignatureFormat {
    #[serde(rename = "rs")]
    Rs,
    #[serde(rename = "DER")]
    Der,
}

/// Encoding of the key material in a `PublicKeyInfo`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum KeyEncoding {
    #[serde(rename = "DER")]
    Der,
    #[serde(rename = "hex")]
    Hex,
}

fn key_encoding_default() -> KeyEncoding { KeyEncoding::Hex }
fn signature_format_default() -> SignatureFormat { SignatureFormat::Rs }

/// An ECDSA signature, either as separate r and s or as a DER blob in `value`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EccSignature {
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default="signature_format_default")]
    pub format: SignatureFormat,
    #[serde(default)]
    pub r: Option<String>,
    #[serde(default)]
    pub s: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl EccSignature {
    pub fn from_rs(r: String, s: String) -> Self {
        EccSignature { algorithm: None, format: SignatureFormat::Rs, r: Some(r), s: Some(s), value: None }
    }

    pub fn from_der_hex(value: String) -> Self {
        EccSignature { algorithm: None, format: SignatureFormat::Der, r: None, s: None, value: Some(value) }
    }
}

/// Public key of a meter or charging point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyInfo {
    /// Curve name, e.g. `secp224k1`. May be empty for DER keys carrying a curve OID.
    #[serde(default)]
    pub algorithm: String,
    #[serde(default="key_encoding_default")]
    pub encoding: KeyEncoding,
    pub value: String,
    /// Signatures over the key itself, checked by a separate trust chain
    #[serde(default)]
    pub signatures: Vec<EccSignature>,
}

impl PublicKeyInfo {
    pub fn new(algorithm: &str, encoding: KeyEncoding, value: &str) -> Self {
        PublicKeyInfo {
            algorithm: algorithm.to_string(),
            encoding,
            value: value.to_string(),
            signatures: Vec::new(),
        }
    }

    pub fn curve(&self) -> Option<CurveName> {
        self.algorithm.parse().ok()
    }
}

/// A metering device known to the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    pub id: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Earliest entry is preferred
    #[serde(default)]
    pub public_keys: Vec<PublicKeyInfo>,
}

/// A charging point (EVSE) and the keys it signs sessions with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evse {
    pub id: String,
    #[serde(default)]
    pub public_keys: Vec<PublicKeyInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfos {
    pub hash: HashAlgorithm,
    /// Number of leading hash bytes that were signed
    #[serde(default)]
    pub hash_truncation: Option<usize>,
    pub algorithm: CryptoAlgorithm,
    pub curve: CurveName,
    pub format: SignatureFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementValue {
    pub timestamp: DateTime<Utc>,
    /// Local UTC offset of the meter clock in minutes
    #[serde(default)]
    pub local_offset: i32,
    /// Daylight saving offset in minutes
    #[serde(default)]
    pub season_offset: i32,
    /// Raw register value, to be read together with the measurement's scale
    pub value: u64,
    #[serde(default)]
    pub info_status: Option<String>,
    #[serde(default)]
    pub seconds_index: Option<u32>,
    #[serde(default)]
    pub pagination_id: Option<String>,
    #[serde(default)]
    pub log_book_index: Option<String>,
    #[serde(default)]
    pub signatures: Vec<EccSignature>,
    #[serde(default)]
    pub result: Option<ValueVerification>,
}

impl MeasurementValue {
    pub fn new(timestamp: DateTime<Utc>, value: u64) -> Self {
        MeasurementValue {
            timestamp,
            local_offset: 0,
            season_offset: 0,
            value,
            info_status: None,
            seconds_index: None,
            pagination_id: None,
            log_book_index: None,
            signatures: Vec::new(),
            result: None,
        }
    }

    /// Offset in minutes the meter adds to its UTC clock
    pub fn utc_offset_minutes(&self) -> i64 {
        i64::from(self.local_offset) + i64::from(self.season_offset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub energy_meter_id: String,
    pub obis: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_encoded: Option<i8>,
    #[serde(default)]
    pub scale: i8,
    #[serde(default)]
    pub value_type: Option<String>,
    #[serde(default)]
    pub signature_infos: Option<SignatureInfos>,
    /// Order matters: the first value is the start, the last one the stop value
    #[serde(default)]
    pub values: Vec<MeasurementValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationStart {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, rename = "type")]
    pub auth_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSession {
    #[serde(default)]
    pub id: Option<String>,
    /// Declared crypto method, e.g. `EMHCrypt01`
    #[serde(default)]
    pub crypto_method: Option<String>,
    #[serde(default)]
    pub begin: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub evse_id: Option<String>,
    #[serde(default)]
    pub authorization_start: Option<AuthorizationStart>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    /// Whole session plaintext (base64 for ChargePoint, OCMF transcript for OCMF)
    #[serde(default)]
    pub original: Option<String>,
    /// Whole session signature of session level schemes
    #[serde(default)]
    pub signature: Option<EccSignature>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub hash_value: Option<String>,
    #[serde(default)]
    pub verification_result: Option<SessionVerificationResult>,
}

impl ChargingSession {
    pub fn new() -> Self {
        ChargingSession {
            id: None,
            crypto_method: None,
            begin: None,
            end: None,
            evse_id: None,
            authorization_start: None,
            measurements: Vec::new(),
            original: None,
            signature: None,
            public_key: None,
            hash_value: None,
            verification_result: None,
        }
    }

    /// Write the outcome of a verification pass back onto the session and its values
    pub fn apply_verification(&mut self, verification: &SessionVerification) {
        self.verification_result = Some(verification.status);
        self.public_key = verification.public_key.clone();
        self.hash_value = verification.hash_value.clone();

        for (measurement, results) in self.measurements.iter_mut().zip(verification.measurements.iter()) {
            for (value, result) in measurement.values.iter_mut().zip(results.iter()) {
                value.result = Some(result.clone());
            }
        }
    }
}

/// The charge transparency record as handed over by the parsing layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeTransparencyRecord {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(default)]
    pub charging_sessions: Vec<ChargingSession>,
}

pub const CTR_CONTEXT: &str = "https://open.charging.cloud/contexts/CTR+json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_algorithm_from_str() {
        assert_eq!("SHA-256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
        assert_eq!("sha512".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha512));
        assert!("MD5".parse::<HashAlgorithm>().is_err());
        assert_eq!(HashAlgorithm::Sha384.to_string(), "SHA384");
    }

    #[test]
    fn test_utc_offset_does_not_overflow() {
        let mut value = MeasurementValue::new(Utc::now(), 1);
        value.local_offset = i32::MAX;
        value.season_offset = 60;
        assert_eq!(value.utc_offset_minutes(), i64::from(i32::MAX) + 60);
    }

    #[test]
    fn test_deserialize_measurement() {
        let json = r#"{
            "energyMeterId": "0901454D4800007F9F3E",
            "obis": "0100010800FF",
            "unitEncoded": 30,
            "scale": -1,
            "signatureInfos": { "hash": "SHA256", "hashTruncation": 24, "algorithm": "ECDSA", "curve": "secp192r1", "format": "rs" },
            "values": [
                { "timestamp": "2020-09-13T12:26:40Z", "value": 1234, "infoStatus": "08",
                  "signatures": [ { "r": "01", "s": "02" } ] }
            ]
        }"#;
        let m: Measurement = serde_json::from_str(json).unwrap();
        assert_eq!(m.unit_encoded, Some(30));
        let infos = m.signature_infos.unwrap();
        assert_eq!(infos.curve, CurveName::Secp192r1);
        assert_eq!(infos.hash_truncation, Some(24));
        assert_eq!(m.values[0].signatures[0].format, SignatureFormat::Rs);
        assert_eq!(m.values[0].timestamp.timestamp(), 1_600_000_000);
    }

    #[test]
    fn test_ctr_context_field() {
        let json = r#"{ "@context": "https://open.charging.cloud/contexts/CTR+json", "chargingSessions": [] }"#;
        let ctr: ChargeTransparencyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(ctr.context, CTR_CONTEXT);
        assert!(ctr.charging_sessions.is_empty());
    }
}
