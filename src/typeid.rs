//! Cadence type ID validation.
//!
//! A composite type ID is location-qualified: `A.<hex-address>.<qualified>`
//! for address locations, `S.<name>.<qualified>` for string locations, and
//! `I.<name>.<qualified>` for identifier locations. Anything else is looked
//! up among the built-in types, and since no built-in composite types exist
//! in this format version, every unlocated composite ID is rejected.

use crate::error::ErrorCode;

/// Validate a composite cadence type ID from a type definition or a
/// composite type value.
pub(crate) fn validate_composite_type_id(id: &str) -> Result<(), ErrorCode> {
    match id.split_once('.') {
        Some(("A", rest)) => {
            let (address, qualified) = rest
                .split_once('.')
                .ok_or(ErrorCode::MissingQualifiedIdentifier)?;
            if address.is_empty()
                || address.len() > 16
                || !address.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(ErrorCode::InvalidAddressLocation);
            }
            if qualified.is_empty() {
                return Err(ErrorCode::MissingQualifiedIdentifier);
            }
            Ok(())
        }
        Some(("S" | "I", rest)) => {
            let (location, qualified) = rest
                .split_once('.')
                .ok_or(ErrorCode::MissingQualifiedIdentifier)?;
            if location.is_empty() || qualified.is_empty() {
                return Err(ErrorCode::MissingQualifiedIdentifier);
            }
            Ok(())
        }
        // Unknown location prefixes and unlocated names fall through to the
        // built-in lookup, which knows no composite types.
        _ => Err(ErrorCode::InvalidBuiltinTypeId),
    }
}
