//! C identifiers derived from net and node names.
use std::collections::HashMap;

use crate::codegen::error::CodegenError;
use crate::net::{Idx, IndexVec, NodeKind};

/// Prepended when a canonical identifier would not start with a letter.
pub const IDENTIFIER_PREFIX: char = 'x';
/// Used when nothing of the net name survives sanitizing.
pub const FALLBACK_IDENTIFIER: &str = "perpetuum";

/// `-` and ` ` become `_`, then everything but ASCII letters, digits and `_`
/// is dropped.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Canonical identifier for a net: the namespace of every symbol, macro and
/// file name emitted for it.
pub fn canonical_identifier(net_name: &str) -> String {
    let sanitized = sanitize(net_name);
    match sanitized.chars().next() {
        None => FALLBACK_IDENTIFIER.to_string(),
        Some(c) if c.is_ascii_alphabetic() => sanitized,
        Some(_) => format!("{IDENTIFIER_PREFIX}{sanitized}"),
    }
}

/// Symbol fragments for one node class, one per id. They are only ever used
/// after a `<identifier>_` prefix, so they may start with a digit. A name that
/// sanitizes to nothing falls back to `_<index>`.
pub fn symbol_fragments<I: Idx>(
    kind: NodeKind,
    names: &IndexVec<I, String>,
) -> Result<IndexVec<I, String>, CodegenError> {
    let mut owners: HashMap<String, &str> = HashMap::with_capacity(names.len());
    let mut fragments = IndexVec::new();
    for (id, name) in names.iter_enumerated() {
        let mut fragment = sanitize(name);
        if fragment.is_empty() {
            fragment = format!("_{}", id.index());
        }
        if let Some(first) = owners.insert(fragment.clone(), name) {
            return Err(CodegenError::SymbolClash {
                kind,
                first: first.to_string(),
                second: name.clone(),
                symbol: fragment,
            });
        }
        fragments.push(fragment);
    }
    Ok(fragments)
}

/// Escapes `s` for use inside a C string literal.
pub fn c_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for byte in s.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'?' => out.push_str("\\?"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::PlaceId;

    #[test]
    fn canonicalizes_net_names() {
        assert_eq!(canonical_identifier("My-Net 2024!"), "My_Net_2024");
        assert_eq!(canonical_identifier("123"), "x123");
        assert_eq!(canonical_identifier("_private"), "x_private");
        assert_eq!(canonical_identifier("!!!"), FALLBACK_IDENTIFIER);
        assert_eq!(canonical_identifier(""), FALLBACK_IDENTIFIER);
        assert_eq!(canonical_identifier("café"), "caf");
    }

    #[test]
    fn fragments_detect_clashes() {
        let names: IndexVec<PlaceId, String> =
            IndexVec::from_vec(vec!["a-b".into(), "ok".into(), "a b".into()]);
        let err = symbol_fragments(NodeKind::Place, &names).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::SymbolClash { ref first, ref second, ref symbol, .. }
                if first == "a-b" && second == "a b" && symbol == "a_b"
        ));
    }

    #[test]
    fn fragments_fall_back_to_index() {
        let names: IndexVec<PlaceId, String> =
            IndexVec::from_vec(vec!["go".into(), "?!".into()]);
        let fragments = symbol_fragments(NodeKind::Place, &names).unwrap();
        assert_eq!(fragments.as_slice(), &["go".to_string(), "_1".to_string()]);
    }

    #[test]
    fn escapes_string_literals() {
        assert_eq!(c_string_literal("plain"), "\"plain\"");
        assert_eq!(c_string_literal("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(c_string_literal("é"), "\"\\303\\251\"");
        assert_eq!(c_string_literal("??="), "\"\\?\\?=\"");
    }
}
