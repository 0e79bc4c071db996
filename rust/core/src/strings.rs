// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP string literal decoding (ISO 10303-21 control directives)

use std::borrow::Cow;

/// Decode the body of a STEP string literal.
///
/// Handles `''`, `\\`, `\S\c`, `\X\hh`, `\X2\…\X0\`, `\X4\…\X0\` and drops
/// `\Px\` code page switches. Unrecognized sequences are kept verbatim.
pub fn decode_step_string(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') && !raw.contains("''") {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' if bytes.get(i + 1) == Some(&b'\'') => {
                out.push('\'');
                i += 2;
            }
            b'\\' => {
                let consumed = decode_directive(&raw[i..], &mut out);
                if consumed == 0 {
                    out.push('\\');
                    i += 1;
                } else {
                    i += consumed;
                }
            }
            _ => {
                // Copy the whole UTF-8 scalar
                let ch = raw[i..].chars().next().unwrap_or('\u{FFFD}');
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }

    Cow::Owned(out)
}

/// Decode one directive starting at a backslash; returns bytes consumed (0 = not a directive)
fn decode_directive(input: &str, out: &mut String) -> usize {
    let bytes = input.as_bytes();

    if input.starts_with("\\\\") {
        out.push('\\');
        return 2;
    }

    if input.starts_with("\\S\\") && bytes.len() > 3 {
        let base = bytes[3];
        out.push(char::from(base.wrapping_add(128)));
        return 4;
    }

    if input.starts_with("\\X\\") && bytes.len() >= 5 {
        if let Ok(value) = u8::from_str_radix(&input[3..5], 16) {
            out.push(char::from(value));
            return 5;
        }
        return 0;
    }

    if input.starts_with("\\X2\\") {
        return decode_wide(input, 4, 4, out);
    }

    if input.starts_with("\\X4\\") {
        return decode_wide(input, 4, 8, out);
    }

    if bytes.len() >= 4 && input.starts_with("\\P") && bytes[3] == b'\\' {
        return 4;
    }

    0
}

/// Decode hex groups of `width` digits until the `\X0\` terminator
fn decode_wide(input: &str, header: usize, width: usize, out: &mut String) -> usize {
    let Some(end) = input[header..].find("\\X0\\") else {
        return 0;
    };
    let hex = &input[header..header + end];
    if hex.len() % width != 0 {
        return 0;
    }

    let mut units = Vec::with_capacity(hex.len() / width);
    for chunk in hex.as_bytes().chunks(width) {
        let Ok(text) = std::str::from_utf8(chunk) else {
            return 0;
        };
        let Ok(value) = u32::from_str_radix(text, 16) else {
            return 0;
        };
        units.push(value);
    }

    if width == 4 {
        let utf16: Vec<u16> = units.iter().map(|&u| u as u16).collect();
        out.extend(char::decode_utf16(utf16).map(|r| r.unwrap_or('\u{FFFD}')));
    } else {
        out.extend(units.into_iter().map(|u| char::from_u32(u).unwrap_or('\u{FFFD}')));
    }

    header + end + "\\X0\\".len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string_is_borrowed() {
        assert!(matches!(decode_step_string("2O2Fr$t4X7Zf8NOew3FLOH"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(decode_step_string("it''s"), "it's");
        assert_eq!(decode_step_string("W\\X2\\00E4\\X0\\nde"), "Wände");
        assert_eq!(decode_step_string("T\\X\\FCr"), "Tür");
        assert_eq!(decode_step_string("\\S\\D"), "\u{C4}");
        assert_eq!(decode_step_string("a\\\\b"), "a\\b");
        assert_eq!(decode_step_string("\\X4\\0001F600\\X0\\"), "\u{1F600}");
    }

    #[test]
    fn test_unknown_directive_kept() {
        assert_eq!(decode_step_string("C:\\tmp"), "C:\\tmp");
    }
}
