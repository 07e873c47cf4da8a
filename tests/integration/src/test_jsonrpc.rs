//! JSON-RPC protocol scenarios.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use shapewire_model::{ErrorKind, Protocol, TranscodeError, Value};
    use shapewire_protocol::ProtocolError;

    use crate::{JSON_MODEL, engine};

    #[test]
    fn test_should_build_targeted_json_request() {
        let engine = engine(JSON_MODEL);
        let adapter = engine.adapter().expect("adapter");
        assert_eq!(adapter.protocol(), Protocol::JsonRpc);

        let input = Value::structure_from([("TableName", Value::from("Music"))]);
        let request = adapter
            .build_request("DescribeTable", Some(&input))
            .expect("builds");

        assert_eq!(
            request.headers().get("x-amz-target").expect("target"),
            "DynamoDB_20120810.DescribeTable"
        );
        assert_eq!(
            request.headers().get(http::header::CONTENT_TYPE).expect("content type"),
            "application/x-amz-json-1.0"
        );
        assert_eq!(request.body().as_ref(), br#"{"TableName":"Music"}"#);
    }

    #[test]
    fn test_should_decode_table_description() {
        let engine = engine(JSON_MODEL);
        let adapter = engine.adapter().expect("adapter");
        let response = http::Response::builder()
            .status(200)
            .header("x-amzn-RequestId", "ddb-rid")
            .body(Bytes::from_static(
                br#"{"Table": {
                    "TableName": "Music",
                    "ItemCount": 42,
                    "CreationDateTime": 1436384946.5,
                    "KeySchema": [{"AttributeName": "Artist", "KeyType": "HASH"}],
                    "Tags": {"env": "prod"},
                    "TableStatus": "ACTIVE"
                }}"#,
            ))
            .expect("response");

        let decoded = adapter
            .unmarshal_response("DescribeTable", &response)
            .expect("decodes");
        let table = decoded.value.get("Table").expect("table");
        assert_eq!(decoded.request_id.as_deref(), Some("ddb-rid"));
        assert_eq!(table.get("ItemCount").and_then(Value::as_int), Some(42));
        assert_eq!(
            table.get("CreationDateTime").and_then(Value::as_timestamp),
            Some(
                &Utc.timestamp_opt(1_436_384_946, 500_000_000)
                    .single()
                    .expect("valid instant")
            )
        );
        assert_eq!(
            table.pointer("KeySchema/0/KeyType").and_then(Value::as_str),
            Some("HASH")
        );
        assert_eq!(table.pointer("Tags/env").and_then(Value::as_str), Some("prod"));
        assert!(table.get("TableStatus").is_none());
    }

    #[test]
    fn test_should_fail_on_missing_required_key_schema_member() {
        let engine = engine(JSON_MODEL);
        let response = http::Response::builder()
            .status(200)
            .body(Bytes::from_static(
                br#"{"Table": {"KeySchema": [{"AttributeName": "Artist"}]}}"#,
            ))
            .expect("response");

        let err = engine
            .adapter()
            .expect("adapter")
            .unmarshal_response("DescribeTable", &response)
            .expect_err("missing key type");
        assert_eq!(
            err.as_transcode().map(TranscodeError::kind),
            Some(ErrorKind::MissingRequiredField)
        );
    }

    #[test]
    fn test_should_surface_json_error_type() {
        let engine = engine(JSON_MODEL);
        let response = http::Response::builder()
            .status(400)
            .header("x-amzn-RequestId", "ddb-err")
            .body(Bytes::from_static(
                br#"{"__type": "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException",
                     "message": "Requested resource not found: Table: Nope not found"}"#,
            ))
            .expect("response");

        match engine
            .adapter()
            .expect("adapter")
            .unmarshal_response("DescribeTable", &response)
        {
            Err(ProtocolError::Api(api)) => {
                assert_eq!(api.code, "ResourceNotFoundException");
                assert_eq!(api.request_id.as_deref(), Some("ddb-err"));
                assert!(api.to_string().starts_with("ResourceNotFoundException (400)"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_should_convert_json_value_to_xml_and_back() {
        let engine = engine(JSON_MODEL);
        let value = engine
            .decode_json(
                br#"{"TableName": "Music", "ItemCount": 1, "KeySchema": [
                    {"AttributeName": "Artist", "KeyType": "HASH"}]}"#,
                "TableDescription",
            )
            .expect("decodes json");
        let xml = engine.encode_xml(&value, "TableDescription").expect("encodes");
        assert_eq!(
            engine.decode_xml(&xml, "TableDescription").expect("decodes xml"),
            value
        );
    }
}
