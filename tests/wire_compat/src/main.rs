fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chanvault_protocol::{Catalog, ChunkRef, RemoteMessage, decode_name};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_slice(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (key-order-independent comparison).
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
    }

    // --- Index snapshot ---

    #[test]
    fn fixture_index_snapshot() {
        roundtrip_test::<Catalog>("index_snapshot.json");
    }

    #[test]
    fn index_snapshot_keeps_file_order() {
        let catalog = Catalog::from_slice(&read_fixture("index_snapshot.json")).unwrap();
        let names: Vec<String> = catalog.iter().map(|r| r.decoded_name()).collect();
        assert_eq!(names, ["Report.pdf", "photos.zip", "notes.txt"]);
        assert_eq!(catalog.total_size(), 60_000_000 + 1_048_576 + 12);

        // Serialized output keeps the same key order, which ids depend on.
        let body = String::from_utf8(catalog.to_vec().unwrap()).unwrap();
        let report = body.find("\"Ercbeg.cqs\"").unwrap();
        let photos = body.find("\"cubgbf.mvc\"").unwrap();
        let notes = body.find("\"abgrf.gkg\"").unwrap();
        assert!(report < photos && photos < notes, "{body}");
    }

    #[test]
    fn index_snapshot_chunk_refs() {
        let catalog = Catalog::from_slice(&read_fixture("index_snapshot.json")).unwrap();
        let report = catalog.get("Ercbeg.cqs").unwrap();
        assert_eq!(report.chunk_refs.len(), 3);
        assert_eq!(
            report.chunk_refs[2],
            ChunkRef::new("1201000000000000005", "1201000000000000006")
        );
        assert!(report.sha256.is_none());
        assert_eq!(
            catalog.get("abgrf.gkg").unwrap().sha256.as_deref(),
            Some("a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447")
        );
    }

    #[test]
    fn legacy_numeric_ids_are_written_back_as_strings() {
        let catalog =
            Catalog::from_slice(&read_fixture("index_snapshot_numeric_ids.json")).unwrap();
        let (_, record) = catalog.get_index(0).unwrap();
        assert_eq!(decode_name(&record.encoded_name), "old.txt");
        assert_eq!(
            record.chunk_refs,
            [ChunkRef::new("1199000000000000001", "1199000000000000002")]
        );

        // Numbers this large lose precision in JSON readers using doubles.
        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(
            value["byq.gkg"]["urls"],
            serde_json::json!([["1199000000000000001", "1199000000000000002"]])
        );
        assert!(value["byq.gkg"].get("sha256").is_none());
    }

    // --- Channel messages ---

    #[test]
    fn posted_message_response() {
        let msg = RemoteMessage::from_slice(&read_fixture("message_posted.json")).unwrap();
        assert_eq!(msg.id, "1201000000000000001");
        let att = msg.sole_attachment().unwrap();
        assert_eq!(att.id, "1201000000000000002");
        assert_eq!(decode_name(&att.filename), "Report.pdf.0");
        assert_eq!(att.size, 25_000_000);
        assert!(att.url.starts_with("https://cdn.discordapp.com/attachments/"));
    }

    #[test]
    fn message_listing_is_newest_first() {
        let messages =
            RemoteMessage::list_from_slice(&read_fixture("message_listing.json")).unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "1201000000000000011",
                "1201000000000000009",
                "1200000000000000500"
            ]
        );
        assert_eq!(messages[0].sole_attachment().unwrap().filename, "index.txt");
        assert!(messages[2].attachments.is_empty());
    }
}
