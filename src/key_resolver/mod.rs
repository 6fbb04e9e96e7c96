use log::debug;
use thiserror::Error;

use crate::config::Config;
use crate::models::{ChargingSession, Evse, Meter, PublicKeyInfo, SessionVerificationResult, VerificationResult};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    #[error("Energy meter {0} is not registered")]
    EnergyMeterNotFound(String),
    #[error("No public key found for {0}")]
    PublicKeyNotFound(String),
}

impl From<&KeyError> for VerificationResult {
    fn from(value: &KeyError) -> Self {
        match value {
            KeyError::EnergyMeterNotFound(_) => VerificationResult::EnergyMeterNotFound,
            KeyError::PublicKeyNotFound(_) => VerificationResult::PublicKeyNotFound,
        }
    }
}

impl From<&KeyError> for SessionVerificationResult {
    fn from(value: &KeyError) -> Self {
        match value {
            KeyError::EnergyMeterNotFound(_) => SessionVerificationResult::EnergyMeterNotFound,
            KeyError::PublicKeyNotFound(_) => SessionVerificationResult::PublicKeyNotFound,
        }
    }
}

/// Known meters and charging points. Built once, then only read.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    meters: Vec<Meter>,
    evses: Vec<Evse>,
}

impl Registry {
    pub fn new(meters: Vec<Meter>, evses: Vec<Evse>) -> Self {
        Registry { meters, evses }
    }

    pub fn from_config(config: &Config) -> Self {
        debug!("Registry with {} meters and {} EVSEs", config.meters.len(), config.evses.len());
        Registry::new(config.meters.clone(), config.evses.clone())
    }

    pub fn meters(&self) -> &[Meter] {
        &self.meters
    }

    pub fn evses(&self) -> &[Evse] {
        &self.evses
    }
}

/// A key together with the id of the device it belongs to
#[derive(Debug, Clone, Copy)]
pub struct KeyCandidate<'a> {
    pub owner: &'a str,
    pub info: &'a PublicKeyInfo,
}

/* EVSE ids are written with and without separators */
fn normalize_id(id: &str) -> String {
    id.chars().filter(|c| *c != ':' && *c != '-').collect()
}

pub struct KeyResolver<'a> {
    pub registry: &'a Registry,
}

impl<'a> KeyResolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        KeyResolver { registry }
    }

    pub fn get_meter(&self, id: &str) -> Option<&'a Meter> {
        self.registry.meters.iter().find(|m| m.id == id)
    }

    /// First key of the meter
    pub fn meter_key(&self, meter_id: &str) -> Result<&'a PublicKeyInfo, KeyError> {
        let meter = self.get_meter(meter_id).ok_or(KeyError::EnergyMeterNotFound(meter_id.to_string()))?;
        meter.public_keys.first().ok_or(KeyError::PublicKeyNotFound(meter_id.to_string()))
    }

    /// Keys that may have signed `session`, most specific first.
    /// Without a matching EVSE or meter every registered key is a candidate.
    pub fn session_candidates(&self, session: &ChargingSession) -> Result<Vec<KeyCandidate<'a>>, KeyError> {
        let mut candidates: Vec<KeyCandidate<'a>> = Vec::new();

        if let Some(evse_id) = &session.evse_id {
            let wanted = normalize_id(evse_id);
            for evse in self.registry.evses.iter().filter(|e| normalize_id(&e.id) == wanted) {
                candidates.extend(evse.public_keys.iter().map(|info| KeyCandidate { owner: &evse.id, info }));
            }
        }

        for measurement in &session.measurements {
            if let Some(meter) = self.get_meter(&measurement.energy_meter_id) {
                candidates.extend(meter.public_keys.iter().map(|info| KeyCandidate { owner: &meter.id, info }));
            }
        }

        if candidates.is_empty() {
            debug!("No device matches session {:?}, trying all registered keys", session.id);
            for evse in &self.registry.evses {
                candidates.extend(evse.public_keys.iter().map(|info| KeyCandidate { owner: &evse.id, info }));
            }
            for meter in &self.registry.meters {
                candidates.extend(meter.public_keys.iter().map(|info| KeyCandidate { owner: &meter.id, info }));
            }
        }

        let mut seen: Vec<String> = Vec::new();
        candidates.retain(|c| {
            let key = c.info.value.trim().to_lowercase();
            if seen.contains(&key) {
                return false;
            }
            seen.push(key);
            true
        });

        if candidates.is_empty() {
            let owner = session.evse_id.clone().unwrap_or_else(|| "session".to_string());
            return Err(KeyError::PublicKeyNotFound(owner));
        }
        Ok(candidates)
    }
}
