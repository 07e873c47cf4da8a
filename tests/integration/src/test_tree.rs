//! XML decoding scenarios: wire tree construction and shape-driven transcoding.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use shapewire_core::{EngineConfig, ShapeWireError};
    use shapewire_model::{ErrorKind, ShapeType, TranscodeError, Value};
    use shapewire_xml::XmlError;

    use crate::{TREE_MODEL, engine, engine_with};

    fn decode(xml: &str) -> Value {
        engine(TREE_MODEL)
            .decode_xml(xml.as_bytes(), "Node")
            .expect("decodes")
    }

    fn transcode_error(xml: &str) -> TranscodeError {
        engine(TREE_MODEL)
            .decode_xml(xml.as_bytes(), "Node")
            .expect_err("fails")
            .as_transcode()
            .cloned()
            .expect("transcode error")
    }

    #[test]
    fn test_should_decode_one_level_of_recursive_structure() {
        let value = decode(
            r#"<Node Name="root"><Value>1</Value><Inner Name="kid"><Value>5</Value></Inner></Node>"#,
        );
        assert_eq!(value.get("Name").and_then(Value::as_str), Some("root"));
        assert_eq!(value.pointer("Child/Name").and_then(Value::as_str), Some("kid"));
        assert_eq!(value.pointer("Child/Value").and_then(Value::as_int), Some(5));
        assert!(value.pointer("Child/Child").is_none());
    }

    #[test]
    fn test_should_leave_absent_members_unset() {
        assert_eq!(decode("<Node/>"), Value::structure());
        let value = decode("<Node><Value>2</Value></Node>");
        for member in ["Name", "Child", "Labels", "Flags", "Props"] {
            assert!(value.get(member).is_none(), "{member} should be absent");
        }
    }

    #[test]
    fn test_should_treat_wrapped_and_flattened_lists_alike() {
        let value = decode(
            "<Node><Labels><member>a</member><member>b</member></Labels>\
             <Flags>true</Flags><Other/><Flags>false</Flags></Node>",
        );
        assert_eq!(value.get("Labels"), Some(&Value::string_list(["a", "b"])));
        assert_eq!(
            value.get("Flags"),
            Some(&Value::List(vec![Value::Bool(true), Value::Bool(false)]))
        );
    }

    #[test]
    fn test_should_decode_wrapped_map_entries() {
        let value = decode(
            "<Node><Props><entry><key>a</key><value>1</value></entry>\
             <entry><key>b</key><value>2</value></entry></Props></Node>",
        );
        assert_eq!(
            value.get("Props"),
            Some(&Value::Map(BTreeMap::from([
                ("a".to_owned(), Value::Int(1)),
                ("b".to_owned(), Value::Int(2)),
            ])))
        );
    }

    #[test]
    fn test_should_reject_map_entry_with_unequal_keys_and_values() {
        let err = transcode_error(
            "<Node><Props><entry><key>a</key><key>b</key><value>1</value></entry></Props></Node>",
        );
        assert_eq!(err.kind(), ErrorKind::MapArityMismatch);
    }

    #[test]
    fn test_should_reject_bad_integer_text_with_location() {
        let err = transcode_error("<Node><Value>abc</Value></Node>");
        assert_eq!(err.kind(), ErrorKind::InvalidScalar);
        assert_eq!(err.location(), "Value");
        assert_eq!(err.expected(), Some(ShapeType::Integer));
    }

    #[test]
    fn test_should_keep_last_character_run_by_default() {
        let xml = b"<Node><Value>1<!-- split -->2</Value></Node>";
        let last = engine(TREE_MODEL).decode_xml(xml, "Node").expect("decodes");
        assert_eq!(last.get("Value").and_then(Value::as_int), Some(2));

        let concat = engine_with(
            TREE_MODEL,
            EngineConfig {
                char_data: "concat".to_owned(),
                ..EngineConfig::default()
            },
        )
        .decode_xml(xml, "Node")
        .expect("decodes");
        assert_eq!(concat.get("Value").and_then(Value::as_int), Some(12));
    }

    #[test]
    fn test_should_tolerate_truncated_document_unless_strict() {
        let xml = b"<Node><Value>3</Value>";
        let value = engine(TREE_MODEL).decode_xml(xml, "Node").expect("lenient");
        assert_eq!(value.get("Value").and_then(Value::as_int), Some(3));

        let strict = engine_with(
            TREE_MODEL,
            EngineConfig {
                strict_eof: true,
                ..EngineConfig::default()
            },
        );
        match strict.decode_xml(xml, "Node") {
            Err(ShapeWireError::Xml(XmlError::UnclosedElement(name))) => assert_eq!(name, "Node"),
            other => panic!("expected unclosed element, got {other:?}"),
        }
    }

    #[test]
    fn test_should_round_trip_encoded_values() {
        let engine = engine(TREE_MODEL);
        let value = Value::structure_from([
            ("Name", Value::from("root")),
            ("Value", Value::Int(1)),
            ("Labels", Value::string_list(["x", "y"])),
            ("Flags", Value::List(vec![Value::Bool(false)])),
            (
                "Props",
                Value::Map(BTreeMap::from([("k".to_owned(), Value::Int(9))])),
            ),
            (
                "Child",
                Value::structure_from([("Value", Value::Int(2))]),
            ),
        ]);
        let xml = engine.encode_xml(&value, "Node").expect("encodes");
        assert_eq!(engine.decode_xml(&xml, "Node").expect("decodes"), value);
    }
}
