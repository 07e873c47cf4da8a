//! Command-line string resolution feeding the wire encoders.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use shapewire_model::Value;

    use crate::{TREE_MODEL, engine};

    #[test]
    fn test_should_substitute_zero_for_unparsable_scalars() {
        let engine = engine(TREE_MODEL);
        let value = engine.resolve_cli("Value=abc,Name=n", "Node").expect("resolves");
        assert_eq!(value.get("Value"), Some(&Value::Int(0)));
        assert_eq!(value.get("Name").and_then(Value::as_str), Some("n"));
    }

    #[test]
    fn test_should_resolve_lenient_boolean_list() {
        let value = engine(TREE_MODEL)
            .resolve_cli("t F 1", "FlagList")
            .expect("resolves");
        assert_eq!(
            value,
            Value::List(vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)])
        );
    }

    #[test]
    fn test_should_resolve_map_literal_with_numeric_values() {
        let value = engine(TREE_MODEL)
            .resolve_cli("a=1,b=x", "PropMap")
            .expect("resolves");
        assert_eq!(
            value,
            Value::Map(BTreeMap::from([
                ("a".to_owned(), Value::Int(1)),
                ("b".to_owned(), Value::Int(0)),
            ]))
        );
    }

    #[test]
    fn test_should_encode_resolved_structure_as_xml_and_json() {
        let engine = engine(TREE_MODEL);
        let value = engine
            .resolve_cli("Value=7,Labels=[x,y]", "Node")
            .expect("resolves");

        let xml = String::from_utf8(engine.encode_xml(&value, "Node").expect("xml")).expect("utf-8");
        assert!(xml.contains(
            "<Node><Labels><member>x</member><member>y</member></Labels><Value>7</Value></Node>"
        ));

        let json = engine.encode_json(&value, "Node").expect("json");
        assert_eq!(json, br#"{"Labels":["x","y"],"Value":7}"#);
    }
}
