use serde::{Deserialize, Serialize};

/// Outcome of verifying a single measurement value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VerificationResult {
    Unverified,
    /// The vendor does not sign individual values
    NoOperation,
    ValidSignature,
    InvalidSignature,
    InvalidPublicKey,
    PublicKeyNotFound,
    EnergyMeterNotFound,
    InvalidMeasurement,
    UnsupportedSignatureAlgorithm,

    ValidStartValue,
    StartValue,
    InvalidStartValue,
    ValidIntermediateValue,
    IntermediateValue,
    InvalidIntermediateValue,
    ValidStopValue,
    StopValue,
    InvalidStopValue,
}

/// Position of a value inside its measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePosition {
    Start,
    Intermediate,
    Stop,
}

impl ValuePosition {
    pub fn of(index: usize, count: usize) -> Self {
        if index == 0 {
            ValuePosition::Start
        } else if index + 1 == count {
            ValuePosition::Stop
        } else {
            ValuePosition::Intermediate
        }
    }
}

impl VerificationResult {
    /// Map a base status onto its positional variant. Statuses other than
    /// `ValidSignature`, `InvalidSignature` and `NoOperation` are kept.
    pub fn classify(self, position: ValuePosition) -> Self {
        use VerificationResult::*;
        match (self, position) {
            (ValidSignature, ValuePosition::Start) => ValidStartValue,
            (NoOperation, ValuePosition::Start) => StartValue,
            (InvalidSignature, ValuePosition::Start) => InvalidStartValue,
            (ValidSignature, ValuePosition::Intermediate) => ValidIntermediateValue,
            (NoOperation, ValuePosition::Intermediate) => IntermediateValue,
            (InvalidSignature, ValuePosition::Intermediate) => InvalidIntermediateValue,
            (ValidSignature, ValuePosition::Stop) => ValidStopValue,
            (NoOperation, ValuePosition::Stop) => StopValue,
            (InvalidSignature, ValuePosition::Stop) => InvalidStopValue,
            (other, _) => other,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self,
            VerificationResult::ValidSignature
            | VerificationResult::ValidStartValue
            | VerificationResult::ValidIntermediateValue
            | VerificationResult::ValidStopValue)
    }
}

/// Outcome of verifying a whole charging session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionVerificationResult {
    Unverified,
    ValidSignature,
    InvalidSignature,
    InvalidPublicKey,
    PublicKeyNotFound,
    EnergyMeterNotFound,
    UnknownSessionFormat,
    #[serde(rename = "UnknownCTRFormat")]
    UnknownCtrFormat,
    InvalidSessionFormat,
    InvalidMeasurement,
    AtLeastTwoMeasurementsRequired,
    UnsupportedSignatureAlgorithm,
}

impl From<SessionVerificationResult> for VerificationResult {
    fn from(value: SessionVerificationResult) -> Self {
        match value {
            SessionVerificationResult::ValidSignature => VerificationResult::ValidSignature,
            SessionVerificationResult::InvalidSignature => VerificationResult::InvalidSignature,
            _ => VerificationResult::NoOperation,
        }
    }
}

/// One field written into a signed buffer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TraceField {
    pub name: String,
    pub offset: usize,
    pub hex: String,
}

/// Everything that went into a signature check, as hex strings for audit display
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CryptoTrace {
    #[serde(default)]
    pub fields: Vec<TraceField>,
    /// Complete signed plaintext
    #[serde(default)]
    pub buffer: Option<String>,
    /// Hash value as it was handed to the curve
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub signature_r: Option<String>,
    #[serde(default)]
    pub signature_s: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValueVerification {
    pub status: VerificationResult,
    #[serde(default)]
    pub trace: Option<CryptoTrace>,
}

impl ValueVerification {
    pub fn new(status: VerificationResult) -> Self {
        ValueVerification { status, trace: None }
    }

    pub fn with_trace(status: VerificationResult, trace: CryptoTrace) -> Self {
        ValueVerification { status, trace: Some(trace) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionVerification {
    pub status: SessionVerificationResult,
    /// Key that verified the session signature (session level schemes)
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub hash_value: Option<String>,
    #[serde(default)]
    pub trace: Option<CryptoTrace>,
    /// One entry per measurement, one result per value, in original order
    #[serde(default)]
    pub measurements: Vec<Vec<ValueVerification>>,
}
