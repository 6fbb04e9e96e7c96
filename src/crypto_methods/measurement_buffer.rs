use crate::binary_encoder::{EncodeError, MeasurementBuffer};
use crate::models::{ChargingSession, Measurement, MeasurementValue};
use crate::obis_utils::dlms_unit_code;

const METER_ID_OFFSET: usize = 0;
const METER_ID_MAX: usize = 10;
const TIMESTAMP_OFFSET: usize = 10;
const INFO_STATUS_OFFSET: usize = 14;
const SECONDS_INDEX_OFFSET: usize = 15;
const PAGINATION_OFFSET: usize = 19;
const OBIS_OFFSET: usize = 23;
const UNIT_OFFSET: usize = 29;
const SCALE_OFFSET: usize = 30;
const VALUE_OFFSET: usize = 31;
const LOG_BOOK_OFFSET: usize = 39;
const AUTH_ID_OFFSET: usize = 41;
const AUTH_ID_MAX: usize = 128;
const AUTH_TIMESTAMP_OFFSET: usize = 169;

/// Build the 320 byte buffer the EMH family of meters signs.
/// `obis_hex` is the already normalized six byte OBIS code.
pub fn encode_measurement(session: &ChargingSession, measurement: &Measurement, value: &MeasurementValue, obis_hex: &str) -> Result<MeasurementBuffer, EncodeError> {
    let mut buffer = MeasurementBuffer::new();

    let meter_id = measurement.energy_meter_id.trim();
    if meter_id.len() / 2 > METER_ID_MAX {
        return Err(EncodeError::InvalidLength { field: "meterId".to_string(), expected: METER_ID_MAX, actual: meter_id.len() / 2 });
    }
    buffer.set_hex("meterId", meter_id, METER_ID_OFFSET, false)?;
    buffer.set_timestamp32("timestamp", &value.timestamp, TIMESTAMP_OFFSET, value.utc_offset_minutes())?;

    if let Some(info_status) = &value.info_status {
        buffer.set_hex_sized("infoStatus", info_status, INFO_STATUS_OFFSET, 1, false)?;
    }
    if let Some(seconds_index) = value.seconds_index {
        buffer.set_uint32("secondsIndex", seconds_index, SECONDS_INDEX_OFFSET, true);
    }
    if let Some(pagination_id) = &value.pagination_id {
        buffer.set_hex_sized("paginationId", pagination_id, PAGINATION_OFFSET, 4, true)?;
    }

    buffer.set_hex_sized("obis", obis_hex, OBIS_OFFSET, 6, false)?;

    let unit = measurement.unit_encoded
        .or_else(|| dlms_unit_code(&measurement.unit))
        .ok_or(EncodeError::MissingField("unitEncoded".to_string()))?;
    buffer.set_int8("unitEncoded", unit, UNIT_OFFSET);
    buffer.set_int8("scale", measurement.scale, SCALE_OFFSET);
    buffer.set_uint64("value", value.value, VALUE_OFFSET, true);

    if let Some(log_book_index) = &value.log_book_index {
        buffer.set_hex_sized("logBookIndex", log_book_index, LOG_BOOK_OFFSET, 2, false)?;
    }

    if let Some(authorization) = &session.authorization_start {
        if authorization.id.len() > AUTH_ID_MAX {
            return Err(EncodeError::InvalidLength { field: "authorizationStart".to_string(), expected: AUTH_ID_MAX, actual: authorization.id.len() });
        }
        buffer.set_text("authorizationStart", &authorization.id, AUTH_ID_OFFSET);
        buffer.set_timestamp32("authorizationStartTimestamp", &authorization.timestamp, AUTH_TIMESTAMP_OFFSET, 0)?;
    }

    Ok(buffer)
}
