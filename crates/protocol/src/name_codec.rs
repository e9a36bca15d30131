//! Reversible filename obfuscation.
//!
//! Filenames are stored in the channel only in encoded form. The transform
//! is ROT13 over ASCII letters: case is kept and every other character
//! (digits, punctuation, the extension dot, non-ASCII text) passes through
//! unchanged. It is keyless and offers no secrecy.
//!
//! ROT13 is its own inverse, so [`decode_name`] and [`encode_name`] apply
//! the same rotation. Both are kept as separate entry points so call sites
//! state their direction.

const ROTATION: u8 = 13;

/// Encodes a plain filename into its stored form.
pub fn encode_name(name: &str) -> String {
    name.chars().map(rotate).collect()
}

/// Decodes a stored filename back to its plain form.
pub fn decode_name(token: &str) -> String {
    token.chars().map(rotate).collect()
}

fn rotate(c: char) -> char {
    let base = match c {
        'a'..='z' => b'a',
        'A'..='Z' => b'A',
        _ => return c,
    };
    let offset = (c as u8 - base + ROTATION) % 26;
    (base + offset) as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_letters_only() {
        assert_eq!(encode_name("Report.pdf"), "Ercbeg.cqs");
        assert_eq!(encode_name("data-2024_v1.csv"), "qngn-2024_i1.pfi");
    }

    #[test]
    fn preserves_case() {
        assert_eq!(encode_name("AbCz"), "NoPm");
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(encode_name("café.txt"), "pnsé.gkg");
        assert_eq!(encode_name("日本語.bin"), "日本語.ova");
    }

    #[test]
    fn round_trip_printable_ascii() {
        let all: String = (0x20u8..0x7f).map(char::from).collect();
        assert_eq!(decode_name(&encode_name(&all)), all);
    }

    #[test]
    fn round_trip_assorted_names() {
        let names = [
            "",
            "a",
            "archive.tar.gz",
            "My Holiday (2019) #3.mkv",
            "ÜBER straße.doc",
            "emoji 🎉 file",
            ".hidden",
        ];
        for name in names {
            assert_eq!(decode_name(&encode_name(name)), name, "round trip of {name:?}");
        }
    }

    #[test]
    fn distinct_names_stay_distinct() {
        let names = ["a.txt", "b.txt", "A.txt", "n.txt", "N.txt", "a.gkg"];
        let encoded: std::collections::HashSet<String> =
            names.iter().map(|n| encode_name(n)).collect();
        assert_eq!(encoded.len(), names.len());
    }

    #[test]
    fn encoding_differs_from_plain_text() {
        assert_ne!(encode_name("secret.docx"), "secret.docx");
    }
}
