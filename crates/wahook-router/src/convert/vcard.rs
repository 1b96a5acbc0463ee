// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal vCard reader: full name and phone numbers only.

use wahook_core::WahookError;
use wahook_core::payload::DecodedVcard;

/// Decode the first card in `input`.
///
/// Folded lines are joined, property groups (`item1.TEL`) and parameters
/// (`TEL;type=CELL`) are ignored. Errors only when no `BEGIN:VCARD` is found.
pub fn decode(input: &str) -> Result<DecodedVcard, WahookError> {
    let mut lines: Vec<String> = Vec::new();
    for raw in input.lines() {
        let raw = raw.trim_end_matches('\r');
        match raw.strip_prefix([' ', '\t']) {
            Some(cont) if !lines.is_empty() => {
                if let Some(last) = lines.last_mut() {
                    last.push_str(cont);
                }
            }
            _ => lines.push(raw.to_string()),
        }
    }

    let mut card = DecodedVcard::default();
    let mut in_card = false;
    for line in &lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let property = property_name(name);
        match property.as_str() {
            "BEGIN" if value.trim().eq_ignore_ascii_case("VCARD") => in_card = true,
            "END" if in_card && value.trim().eq_ignore_ascii_case("VCARD") => break,
            "FN" if in_card => card.full_name = unescape(value.trim()),
            "TEL" if in_card => {
                let phone = value.trim();
                if !phone.is_empty() {
                    card.phones.push(phone.to_string());
                }
            }
            _ => {}
        }
    }

    if !in_card {
        return Err(WahookError::Conversion("vcard has no BEGIN:VCARD".into()));
    }
    Ok(card)
}

/// `item1.TEL;type=CELL` -> `TEL`.
fn property_name(name: &str) -> String {
    let without_params = name.split(';').next().unwrap_or_default();
    let without_group = without_params
        .rsplit_once('.')
        .map_or(without_params, |(_, p)| p);
    without_group.trim().to_ascii_uppercase()
}

fn unescape(value: &str) -> String {
    value
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\n", " ")
        .replace("\\\\", "\\")
}
