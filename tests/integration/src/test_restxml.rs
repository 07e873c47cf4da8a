//! REST-XML protocol scenarios against an S3-style model.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use shapewire_model::{Protocol, Value};
    use shapewire_protocol::{AdapterOptions, ProtocolError, adapter_for};

    use crate::{REST_XML_MODEL, shape_set};

    fn tagging_input() -> Value {
        Value::structure_from([
            ("Bucket", Value::from("b")),
            (
                "Tagging",
                Value::structure_from([(
                    "TagSet",
                    Value::List(vec![Value::structure_from([
                        ("Key", Value::from("env")),
                        ("Value", Value::from("prod")),
                    ])]),
                )]),
            ),
        ])
    }

    #[test]
    fn test_should_route_get_object_members() {
        let set = shape_set(REST_XML_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        assert_eq!(adapter.protocol(), Protocol::RestXml);

        let input = Value::structure_from([
            ("Bucket", Value::from("my-bucket")),
            ("Key", Value::from("photos/2024/cat 1.jpg")),
            ("Range", Value::from("bytes=0-9")),
            ("VersionId", Value::from("3HL4kqtJ")),
        ]);
        let request = adapter.build_request("GetObject", Some(&input)).expect("builds");

        assert_eq!(request.method(), http::Method::GET);
        assert_eq!(
            request.uri(),
            "/my-bucket/photos/2024/cat%201.jpg?versionId=3HL4kqtJ"
        );
        assert_eq!(request.headers().get("range").expect("range"), "bytes=0-9");
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_should_decode_object_headers_and_payload() {
        let set = shape_set(REST_XML_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        let response = http::Response::builder()
            .status(200)
            .header("Content-Length", "11")
            .header("Last-Modified", "Mon, 12 Oct 2009 17:50:00 GMT")
            .header("x-amz-meta-owner", "alice")
            .header("x-amz-request-id", "s3-rid")
            .body(Bytes::from_static(b"hello world"))
            .expect("response");

        let decoded = adapter
            .unmarshal_response("GetObject", &response)
            .expect("decodes");
        let value = decoded.value;
        assert_eq!(decoded.request_id.as_deref(), Some("s3-rid"));
        assert_eq!(
            value.get("Body").and_then(Value::as_blob),
            Some(&Bytes::from_static(b"hello world"))
        );
        assert_eq!(value.get("ContentLength").and_then(Value::as_int), Some(11));
        assert_eq!(
            value.get("LastModified").and_then(Value::as_timestamp),
            Some(&Utc.with_ymd_and_hms(2009, 10, 12, 17, 50, 0).unwrap())
        );
        assert_eq!(value.pointer("Metadata/owner").and_then(Value::as_str), Some("alice"));
    }

    #[test]
    fn test_should_write_namespaced_payload_document() {
        let set = shape_set(REST_XML_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        let request = adapter
            .build_request("PutBucketTagging", Some(&tagging_input()))
            .expect("builds");

        assert_eq!(request.method(), http::Method::PUT);
        assert_eq!(request.uri(), "/b?tagging");
        assert_eq!(
            request.headers().get(http::header::CONTENT_TYPE).expect("content type"),
            "application/xml"
        );
        let body = std::str::from_utf8(request.body()).expect("utf-8");
        assert!(body.starts_with("<?xml"));
        assert!(body.contains(
            "<Tagging xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><TagSet><Tag>\
             <Key>env</Key><Value>prod</Value></Tag></TagSet></Tagging>"
        ));
    }

    #[test]
    fn test_should_decode_flattened_listing_and_status() {
        let set = shape_set(REST_XML_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");

        let request = adapter
            .build_request(
                "ListObjects",
                Some(&Value::structure_from([
                    ("Bucket", Value::from("b")),
                    ("Prefix", Value::from("photos/")),
                ])),
            )
            .expect("builds");
        assert_eq!(request.uri(), "/b?prefix=photos%2F");

        let response = http::Response::builder()
            .status(200)
            .body(Bytes::from_static(
                br#"<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
                    <Name>b</Name>
                    <IsTruncated>false</IsTruncated>
                    <Contents>
                      <Key>a.txt</Key><Size>3</Size>
                      <LastModified>2009-10-12T17:50:30.000Z</LastModified>
                    </Contents>
                    <Contents><Key>b.txt</Key><Size>5</Size></Contents>
                  </ListBucketResult>"#,
            ))
            .expect("response");
        let value = adapter
            .unmarshal_response("ListObjects", &response)
            .expect("decodes")
            .value;

        assert_eq!(value.get("Status").and_then(Value::as_int), Some(200));
        assert_eq!(value.get("IsTruncated").and_then(Value::as_bool), Some(false));
        assert_eq!(value.pointer("Contents/1/Size").and_then(Value::as_int), Some(5));
        assert!(value.pointer("Contents/1/LastModified").is_none());
        assert_eq!(
            value.pointer("Contents/0/LastModified").and_then(Value::as_timestamp),
            Some(&Utc.with_ymd_and_hms(2009, 10, 12, 17, 50, 30).unwrap())
        );
    }

    #[test]
    fn test_should_surface_no_such_bucket() {
        let set = shape_set(REST_XML_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        let response = http::Response::builder()
            .status(404)
            .body(Bytes::from_static(
                b"<Error><Code>NoSuchBucket</Code>\
                  <Message>The specified bucket does not exist</Message>\
                  <BucketName>b</BucketName><RequestId>req-404</RequestId></Error>",
            ))
            .expect("response");

        match adapter.unmarshal_response("ListObjects", &response) {
            Err(ProtocolError::Api(api)) => {
                assert_eq!(api.status, http::StatusCode::NOT_FOUND);
                assert_eq!(api.code, "NoSuchBucket");
                assert_eq!(api.request_id.as_deref(), Some("req-404"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_should_reject_missing_greedy_label() {
        let set = shape_set(REST_XML_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        let err = adapter
            .build_request(
                "GetObject",
                Some(&Value::structure_from([("Bucket", Value::from("b"))])),
            )
            .expect_err("missing key");
        assert!(matches!(err, ProtocolError::MissingUriLabel(ref label) if label == "Key"));
    }
}
