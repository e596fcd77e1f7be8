//! Short-string name handling
//!
//! Names are stored in a fixed 64-byte field: a length byte followed by up to
//! 63 bytes of printable ASCII. The conventional form is `basename~TYPE~`,
//! with the type suffix between tildes.

/// Width of an encoded name field, including the length byte.
pub const NAME_FIELD: usize = 64;

/// Longest encodable name.
pub const MAX_NAME_LEN: usize = NAME_FIELD - 1;

/// Decode a fixed-width short-string field. Returns `None` when the length
/// byte overruns the field or a counted byte is not printable ASCII.
pub(crate) fn decode_short_string(field: &[u8]) -> Option<String> {
    debug_assert!(field.len() >= NAME_FIELD);

    let len = field[0] as usize;
    if len > MAX_NAME_LEN {
        return None;
    }

    let raw = &field[1..1 + len];
    if !raw.iter().all(|&b| (0x20..=0x7e).contains(&b)) {
        return None;
    }

    // Counted bytes are ASCII, checked above.
    Some(String::from_utf8_lossy(raw).into_owned())
}

/// Encode a name into a fixed-width field. `None` if the name is too long or
/// contains non-printable characters.
pub(crate) fn encode_short_string(name: &str) -> Option<[u8; NAME_FIELD]> {
    let bytes = name.as_bytes();
    if bytes.len() > MAX_NAME_LEN || !bytes.iter().all(|&b| (0x20..=0x7e).contains(&b)) {
        return None;
    }

    let mut field = [0u8; NAME_FIELD];
    field[0] = bytes.len() as u8;
    field[1..1 + bytes.len()].copy_from_slice(bytes);
    Some(field)
}

/// Split a decoded name into basename and type suffix.
///
/// The stored convention is `basename~TYPE~`: everything before the first `~`
/// is the basename, the remainder (minus a trailing `~`) is the type. A name
/// without `~` is all basename.
pub fn parse_name(name: &str) -> (&str, &str) {
    match name.split_once('~') {
        Some((base, suffix)) => (base, suffix.trim_end_matches('~')),
        None => (name, ""),
    }
}

/// Substitute path separators inside a decoded name.
///
/// The format allows `/` in names (e.g. serial-port drivers named after
/// XON/XOFF); such names must not create extra path components on the host.
/// The locator applies the same substitution so lookups match extracted
/// names.
pub fn sanitize_name(name: &str) -> String {
    name.replace('/', "_")
}
