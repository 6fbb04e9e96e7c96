/// Parse an OBIS code given either textually as `A-B:C.D.E*F` (`*F`
/// defaults to 255) or as 12 hex digits.
pub fn parse_obis(code: &str) -> Option<[u8; 6]> {
    let code = code.trim();

    if code.len() == 12 && code.chars().all(|c| c.is_ascii_hexdigit()) {
        let bytes = hex::decode(code).ok()?;
        return bytes.try_into().ok();
    }

    // OBIS code format: A-B:C.D.E*F
    // A: Medium (0=abstract, 1=electricity, 6=heat, 7=gas, 8=water)
    // B: Channel
    // C: Physical value
    // D: Processing method
    // E: Tariff/Time
    // F: Storage (optional)
    let (ab, rest) = code.split_once(':')?;
    let (a, b) = ab.split_once('-')?;
    let (cde, f) = match rest.split_once('*') {
        Some((cde, f)) => (cde, f),
        None => (rest, "255"),
    };
    let cde: Vec<&str> = cde.split('.').collect();
    if cde.len() != 3 {
        return None;
    }

    let mut out = [0u8; 6];
    for (slot, part) in out.iter_mut().zip([a, b, cde[0], cde[1], cde[2], f]) {
        *slot = part.trim().parse::<u8>().ok()?;
    }
    Some(out)
}

/// Six byte hex form as written into signed buffers, upper case
pub fn obis_to_hex(code: &str) -> Option<String> {
    parse_obis(code).map(hex::encode_upper)
}

pub fn validate_obis_code(code: &str) -> bool {
    parse_obis(code).is_some()
}

/// DLMS/COSEM unit enumeration for the units found in charging records
pub fn dlms_unit_code(unit: &str) -> Option<i8> {
    match unit.trim() {
        "W" => Some(27),
        "VA" => Some(28),
        "var" => Some(29),
        "Wh" => Some(30),
        "VAh" => Some(31),
        "varh" => Some(32),
        "A" => Some(33),
        "V" => Some(35),
        "Hz" => Some(44),
        _ => None,
    }
}

pub fn get_obis_description(code: &str) -> Option<&'static str> {
    let bytes = parse_obis(code)?;
    match (bytes[0], bytes[2], bytes[3], bytes[4]) {
        (1, 1, 8, 0) => Some("Active energy + (total)"),
        (1, 1, 8, 1) => Some("Active energy + (tariff 1)"),
        (1, 1, 8, 2) => Some("Active energy + (tariff 2)"),
        (1, 2, 8, 0) => Some("Active energy - (total)"),
        (1, 1, 7, 0) => Some("Active power + (total)"),
        (1, 2, 7, 0) => Some("Active power - (total)"),
        (1, 3, 8, 0) => Some("Reactive energy + (total)"),
        (1, 4, 8, 0) => Some("Reactive energy - (total)"),
        (1, 15, 8, 0) => Some("Absolute active energy total"),
        _ => None,
    }
}
