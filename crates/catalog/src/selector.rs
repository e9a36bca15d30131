//! File id selectors.
//!
//! Users pick files by the 1-based position shown in listings, written
//! either as `N` or `#N`.

use chanvault_protocol::{Catalog, FileRecord};

use crate::error::CatalogError;

/// Parses a selector into a 1-based id.
pub fn parse_id(selector: &str) -> Result<usize, CatalogError> {
    let trimmed = selector.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    match digits.parse::<usize>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(CatalogError::InvalidId(selector.to_string())),
    }
}

/// A selector resolved against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Selected<'c> {
    pub id: usize,
    /// Catalog key of the record.
    pub key: &'c str,
    pub record: &'c FileRecord,
}

/// Resolves a selector against a catalog.
pub fn resolve<'c>(catalog: &'c Catalog, selector: &str) -> Result<Selected<'c>, CatalogError> {
    let id = parse_id(selector)?;
    catalog
        .get_index(id - 1)
        .map(|(key, record)| Selected { id, key, record })
        .ok_or(CatalogError::IdOutOfRange {
            id,
            count: catalog.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanvault_protocol::{ChunkRef, encode_name};

    #[test]
    fn accepts_plain_and_hash_forms() {
        assert_eq!(parse_id("3").unwrap(), 3);
        assert_eq!(parse_id("#3").unwrap(), 3);
        assert_eq!(parse_id(" #12 ").unwrap(), 12);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#", "0", "#0", "-1", "abc", "##2", "2.5"] {
            assert!(
                matches!(parse_id(bad), Err(CatalogError::InvalidId(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn resolves_against_catalog_order() {
        let mut catalog = Catalog::new();
        for name in ["first", "second"] {
            catalog
                .insert(FileRecord {
                    encoded_name: encode_name(name),
                    size: 1,
                    chunk_refs: vec![ChunkRef::new("m", "a")],
                    sha256: None,
                })
                .unwrap();
        }

        let selected = resolve(&catalog, "#2").unwrap();
        assert_eq!(selected.id, 2);
        assert_eq!(selected.key, encode_name("second"));
        assert_eq!(selected.record.decoded_name(), "second");

        match resolve(&catalog, "3") {
            Err(CatalogError::IdOutOfRange { id, count }) => {
                assert_eq!((id, count), (3, 2));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
