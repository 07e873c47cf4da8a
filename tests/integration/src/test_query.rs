//! Query and EC2 protocol scenarios.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use shapewire_model::{Protocol, Value};
    use shapewire_protocol::{AdapterOptions, ProtocolError, adapter_for};

    use crate::{EC2_MODEL, QUERY_MODEL, engine, shape_set};

    fn ok(body: &'static str) -> http::Response<Bytes> {
        http::Response::builder()
            .status(200)
            .body(Bytes::from_static(body.as_bytes()))
            .expect("response")
    }

    fn body_text(request: &http::Request<Bytes>) -> &str {
        std::str::from_utf8(request.body()).expect("utf-8 body")
    }

    #[test]
    fn test_should_build_receive_message_form() {
        let set = shape_set(QUERY_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        assert_eq!(adapter.protocol(), Protocol::Query);

        let input = Value::structure_from([
            ("QueueUrl", Value::from("https://queue.example/123/q")),
            ("MaxNumberOfMessages", Value::Int(10)),
            ("AttributeNames", Value::string_list(["All"])),
        ]);
        let request = adapter
            .build_request("ReceiveMessage", Some(&input))
            .expect("builds");

        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(
            body_text(&request),
            "Action=ReceiveMessage&AttributeName.1=All&MaxNumberOfMessages=10\
             &QueueUrl=https%3A%2F%2Fqueue.example%2F123%2Fq&Version=2012-11-05"
        );
    }

    #[test]
    fn test_should_build_flattened_map_entries() {
        let set = shape_set(QUERY_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        let input = Value::structure_from([
            ("QueueUrl", Value::from("q")),
            (
                "Tags",
                Value::Map(BTreeMap::from([
                    ("b".to_owned(), Value::from("2")),
                    ("a".to_owned(), Value::from("1")),
                ])),
            ),
        ]);
        let request = adapter.build_request("TagQueue", Some(&input)).expect("builds");
        assert_eq!(
            body_text(&request),
            "Action=TagQueue&QueueUrl=q&Tag.1.Key=a&Tag.1.Value=1&Tag.2.Key=b&Tag.2.Value=2\
             &Version=2012-11-05"
        );
    }

    #[test]
    fn test_should_decode_flattened_messages_and_attributes() {
        let engine = engine(QUERY_MODEL);
        let adapter = engine.adapter().expect("adapter");
        let response = ok(
            "<ReceiveMessageResponse>\
               <ReceiveMessageResult>\
                 <Message>\
                   <MessageId>m1</MessageId><Body>hello</Body>\
                   <Attribute><Name>SenderId</Name><Value>A1</Value></Attribute>\
                   <Attribute><Name>SentTimestamp</Name><Value>1</Value></Attribute>\
                 </Message>\
                 <Message><MessageId>m2</MessageId><Body>world</Body></Message>\
               </ReceiveMessageResult>\
               <ResponseMetadata><RequestId>rid-1</RequestId></ResponseMetadata>\
             </ReceiveMessageResponse>",
        );

        let decoded = adapter
            .unmarshal_response("ReceiveMessage", &response)
            .expect("decodes");
        let value = decoded.value;
        assert_eq!(decoded.request_id.as_deref(), Some("rid-1"));
        assert_eq!(value.pointer("Messages/0/Body").and_then(Value::as_str), Some("hello"));
        assert_eq!(
            value.pointer("Messages/0/Attributes/SenderId").and_then(Value::as_str),
            Some("A1")
        );
        assert_eq!(
            value.pointer("Messages/0/Attributes").and_then(Value::as_map).map(BTreeMap::len),
            Some(2)
        );
        assert_eq!(value.pointer("Messages/1/MessageId").and_then(Value::as_str), Some("m2"));
        assert!(value.pointer("Messages/1/Attributes").is_none());
    }

    #[test]
    fn test_should_decode_output_without_members_as_empty() {
        let set = shape_set(QUERY_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        let decoded = adapter
            .unmarshal_response(
                "ReceiveMessage",
                &ok("<ReceiveMessageResponse><ReceiveMessageResult/>\
                     </ReceiveMessageResponse>"),
            )
            .expect("decodes");
        assert_eq!(decoded.value, Value::structure());
        assert!(decoded.request_id.is_none());
    }

    #[test]
    fn test_should_surface_query_error_response() {
        let set = shape_set(QUERY_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        let response = http::Response::builder()
            .status(400)
            .body(Bytes::from_static(
                b"<ErrorResponse><Error><Type>Sender</Type>\
                  <Code>AWS.SimpleQueueService.NonExistentQueue</Code>\
                  <Message>The specified queue does not exist.</Message></Error>\
                  <RequestId>rid-9</RequestId></ErrorResponse>",
            ))
            .expect("response");

        match adapter.unmarshal_response("ReceiveMessage", &response) {
            Err(ProtocolError::Api(api)) => {
                assert_eq!(api.status, http::StatusCode::BAD_REQUEST);
                assert_eq!(api.code, "AWS.SimpleQueueService.NonExistentQueue");
                assert_eq!(api.message, "The specified queue does not exist.");
                assert_eq!(api.request_id.as_deref(), Some("rid-9"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_should_send_cli_resolved_input() {
        let engine = engine(QUERY_MODEL);
        let input = engine
            .resolve_cli("QueueUrl=q,MaxNumberOfMessages=5", "ReceiveMessageRequest")
            .expect("resolves");
        let request = engine
            .adapter()
            .expect("adapter")
            .build_request("ReceiveMessage", Some(&input))
            .expect("builds");
        assert_eq!(
            body_text(&request),
            "Action=ReceiveMessage&MaxNumberOfMessages=5&QueueUrl=q&Version=2012-11-05"
        );
    }

    #[test]
    fn test_should_build_ec2_names_and_lists() {
        let set = shape_set(EC2_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        assert_eq!(adapter.protocol(), Protocol::Ec2Query);

        let input = Value::structure_from([
            ("InstanceIds", Value::string_list(["i-1", "i-2"])),
            ("DryRun", Value::Bool(true)),
            (
                "Filters",
                Value::List(vec![Value::structure_from([
                    ("Name", Value::from("tag:env")),
                    ("Values", Value::string_list(["prod"])),
                ])]),
            ),
        ]);
        let request = adapter
            .build_request("DescribeInstances", Some(&input))
            .expect("builds");
        assert_eq!(
            body_text(&request),
            "Action=DescribeInstances&DryRun=true&Filter.1.Name=tag%3Aenv&Filter.1.Value.1=prod\
             &InstanceId.1=i-1&InstanceId.2=i-2&Version=2016-11-15"
        );
    }

    #[test]
    fn test_should_decode_nested_ec2_item_sets() {
        let set = shape_set(EC2_MODEL);
        let adapter = adapter_for(&set, AdapterOptions::default()).expect("adapter");
        let response = ok(
            r#"<DescribeInstancesResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
                <requestId>ec2-rid</requestId>
                <reservationSet>
                  <item>
                    <reservationId>r-1</reservationId>
                    <instancesSet>
                      <item>
                        <instanceId>i-1</instanceId>
                        <launchTime>2016-11-15T10:00:00.000Z</launchTime>
                      </item>
                    </instancesSet>
                  </item>
                </reservationSet>
              </DescribeInstancesResponse>"#,
        );

        let decoded = adapter
            .unmarshal_response("DescribeInstances", &response)
            .expect("decodes");
        let value = decoded.value;
        assert_eq!(decoded.request_id.as_deref(), Some("ec2-rid"));
        assert_eq!(
            value.pointer("Reservations/0/ReservationId").and_then(Value::as_str),
            Some("r-1")
        );
        assert_eq!(
            value.pointer("Reservations/0/Instances/0/InstanceId").and_then(Value::as_str),
            Some("i-1")
        );
        assert_eq!(
            value
                .pointer("Reservations/0/Instances/0/LaunchTime")
                .and_then(Value::as_timestamp),
            Some(&Utc.with_ymd_and_hms(2016, 11, 15, 10, 0, 0).unwrap())
        );
    }
}
