//! Cross-crate scenario tests for ShapeWire.
//!
//! Each `test_*` module drives one concern end to end through the public
//! crates, using the service models defined here.
//!
//! ```text
//! cargo test -p shapewire-integration
//! ```

use std::sync::Once;

use shapewire_core::{Engine, EngineConfig};
use shapewire_model::ShapeSet;

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A query-protocol service in the style of SQS.
pub const QUERY_MODEL: &str = r#"{
    "metadata": {"protocol": "query", "apiVersion": "2012-11-05"},
    "operations": {
        "ReceiveMessage": {
            "input": {"shape": "ReceiveMessageRequest"},
            "output": {"shape": "ReceiveMessageResult", "resultWrapper": "ReceiveMessageResult"}
        },
        "TagQueue": {"input": {"shape": "TagQueueRequest"}}
    },
    "shapes": {
        "ReceiveMessageRequest": {
            "type": "structure",
            "required": ["QueueUrl"],
            "members": {
                "QueueUrl": {"shape": "String"},
                "MaxNumberOfMessages": {"shape": "Integer"},
                "AttributeNames": {"shape": "AttributeNameList"}
            }
        },
        "AttributeNameList": {
            "type": "list",
            "member": {"shape": "String", "locationName": "AttributeName"},
            "flattened": true
        },
        "ReceiveMessageResult": {
            "type": "structure",
            "members": {"Messages": {"shape": "MessageList"}}
        },
        "MessageList": {
            "type": "list",
            "member": {"shape": "Message", "locationName": "Message"},
            "flattened": true
        },
        "Message": {
            "type": "structure",
            "members": {
                "MessageId": {"shape": "String"},
                "Body": {"shape": "String"},
                "Attributes": {"shape": "AttributeMap", "locationName": "Attribute"}
            }
        },
        "AttributeMap": {
            "type": "map",
            "key": {"shape": "String", "locationName": "Name"},
            "value": {"shape": "String", "locationName": "Value"},
            "flattened": true
        },
        "TagQueueRequest": {
            "type": "structure",
            "members": {
                "QueueUrl": {"shape": "String"},
                "Tags": {"shape": "TagMap", "locationName": "Tag"}
            }
        },
        "TagMap": {
            "type": "map",
            "key": {"shape": "String", "locationName": "Key"},
            "value": {"shape": "String", "locationName": "Value"},
            "flattened": true
        },
        "String": {"type": "string"},
        "Integer": {"type": "integer"}
    }
}"#;

/// An EC2-protocol service.
pub const EC2_MODEL: &str = r#"{
    "metadata": {"protocol": "ec2", "apiVersion": "2016-11-15"},
    "operations": {
        "DescribeInstances": {
            "input": {"shape": "DescribeInstancesRequest"},
            "output": {"shape": "DescribeInstancesResult"}
        }
    },
    "shapes": {
        "DescribeInstancesRequest": {
            "type": "structure",
            "members": {
                "InstanceIds": {"shape": "InstanceIdList", "locationName": "InstanceId"},
                "DryRun": {"shape": "Boolean", "locationName": "dryRun"},
                "Filters": {"shape": "FilterList", "locationName": "Filter"}
            }
        },
        "InstanceIdList": {
            "type": "list",
            "member": {"shape": "String", "locationName": "InstanceId"}
        },
        "FilterList": {
            "type": "list",
            "member": {"shape": "Filter", "locationName": "Filter"}
        },
        "Filter": {
            "type": "structure",
            "members": {
                "Name": {"shape": "String"},
                "Values": {"shape": "ValueList", "locationName": "Value"}
            }
        },
        "ValueList": {"type": "list", "member": {"shape": "String", "locationName": "item"}},
        "DescribeInstancesResult": {
            "type": "structure",
            "members": {
                "Reservations": {"shape": "ReservationList", "locationName": "reservationSet"}
            }
        },
        "ReservationList": {
            "type": "list",
            "member": {"shape": "Reservation", "locationName": "item"}
        },
        "Reservation": {
            "type": "structure",
            "members": {
                "ReservationId": {"shape": "String", "locationName": "reservationId"},
                "Instances": {"shape": "InstanceList", "locationName": "instancesSet"}
            }
        },
        "InstanceList": {"type": "list", "member": {"shape": "Instance", "locationName": "item"}},
        "Instance": {
            "type": "structure",
            "members": {
                "InstanceId": {"shape": "String", "locationName": "instanceId"},
                "LaunchTime": {"shape": "DateTime", "locationName": "launchTime"}
            }
        },
        "String": {"type": "string"},
        "Boolean": {"type": "boolean"},
        "DateTime": {"type": "timestamp"}
    }
}"#;

/// A JSON-RPC service in the style of DynamoDB.
pub const JSON_MODEL: &str = r#"{
    "metadata": {
        "protocol": "json",
        "apiVersion": "2012-08-10",
        "targetPrefix": "DynamoDB_20120810",
        "jsonVersion": "1.0"
    },
    "operations": {
        "DescribeTable": {
            "input": {"shape": "DescribeTableInput"},
            "output": {"shape": "DescribeTableOutput"}
        }
    },
    "shapes": {
        "DescribeTableInput": {
            "type": "structure",
            "required": ["TableName"],
            "members": {"TableName": {"shape": "TableName"}}
        },
        "DescribeTableOutput": {
            "type": "structure",
            "members": {"Table": {"shape": "TableDescription"}}
        },
        "TableDescription": {
            "type": "structure",
            "members": {
                "TableName": {"shape": "TableName"},
                "ItemCount": {"shape": "Long"},
                "CreationDateTime": {"shape": "Date"},
                "KeySchema": {"shape": "KeySchema"},
                "Tags": {"shape": "TagMap"}
            }
        },
        "KeySchema": {"type": "list", "member": {"shape": "KeySchemaElement"}},
        "KeySchemaElement": {
            "type": "structure",
            "required": ["AttributeName", "KeyType"],
            "members": {
                "AttributeName": {"shape": "TableName"},
                "KeyType": {"shape": "KeyType"}
            }
        },
        "TagMap": {"type": "map", "key": {"shape": "TableName"}, "value": {"shape": "TableName"}},
        "TableName": {"type": "string"},
        "KeyType": {"type": "string"},
        "Long": {"type": "long"},
        "Date": {"type": "timestamp"}
    }
}"#;

/// A REST-XML service in the style of S3.
pub const REST_XML_MODEL: &str = r#"{
    "metadata": {"protocol": "rest-xml", "apiVersion": "2006-03-01"},
    "operations": {
        "GetObject": {
            "http": {"method": "GET", "requestUri": "/{Bucket}/{Key+}"},
            "input": {"shape": "GetObjectRequest"},
            "output": {"shape": "GetObjectOutput"}
        },
        "PutBucketTagging": {
            "http": {"method": "PUT", "requestUri": "/{Bucket}?tagging"},
            "input": {"shape": "PutBucketTaggingRequest"}
        },
        "ListObjects": {
            "http": {"method": "GET", "requestUri": "/{Bucket}"},
            "input": {"shape": "ListObjectsRequest"},
            "output": {"shape": "ListObjectsOutput"}
        }
    },
    "shapes": {
        "GetObjectRequest": {
            "type": "structure",
            "required": ["Bucket", "Key"],
            "members": {
                "Bucket": {"shape": "String", "location": "uri", "locationName": "Bucket"},
                "Key": {"shape": "String", "location": "uri", "locationName": "Key"},
                "Range": {"shape": "String", "location": "header", "locationName": "Range"},
                "VersionId": {"shape": "String", "location": "querystring", "locationName": "versionId"}
            }
        },
        "GetObjectOutput": {
            "type": "structure",
            "payload": "Body",
            "members": {
                "Body": {"shape": "Blob"},
                "ContentLength": {"shape": "Long", "location": "header", "locationName": "Content-Length"},
                "LastModified": {"shape": "Timestamp", "location": "header", "locationName": "Last-Modified"},
                "Metadata": {"shape": "Metadata", "location": "headers", "locationName": "x-amz-meta-"}
            }
        },
        "Metadata": {"type": "map", "key": {"shape": "String"}, "value": {"shape": "String"}},
        "PutBucketTaggingRequest": {
            "type": "structure",
            "payload": "Tagging",
            "members": {
                "Bucket": {"shape": "String", "location": "uri", "locationName": "Bucket"},
                "Tagging": {
                    "shape": "Tagging",
                    "locationName": "Tagging",
                    "xmlNamespace": {"uri": "http://s3.amazonaws.com/doc/2006-03-01/"}
                }
            }
        },
        "Tagging": {"type": "structure", "members": {"TagSet": {"shape": "TagSet"}}},
        "TagSet": {"type": "list", "member": {"shape": "Tag", "locationName": "Tag"}},
        "Tag": {
            "type": "structure",
            "members": {"Key": {"shape": "String"}, "Value": {"shape": "String"}}
        },
        "ListObjectsRequest": {
            "type": "structure",
            "members": {
                "Bucket": {"shape": "String", "location": "uri", "locationName": "Bucket"},
                "Prefix": {"shape": "String", "location": "querystring", "locationName": "prefix"}
            }
        },
        "ListObjectsOutput": {
            "type": "structure",
            "members": {
                "Name": {"shape": "String"},
                "IsTruncated": {"shape": "Boolean"},
                "Contents": {"shape": "ObjectList"},
                "Status": {"shape": "Integer", "location": "statusCode"}
            }
        },
        "ObjectList": {"type": "list", "member": {"shape": "Object"}, "flattened": true},
        "Object": {
            "type": "structure",
            "members": {
                "Key": {"shape": "String"},
                "Size": {"shape": "Long"},
                "LastModified": {"shape": "Timestamp"}
            }
        },
        "String": {"type": "string"},
        "Boolean": {"type": "boolean"},
        "Integer": {"type": "integer"},
        "Long": {"type": "long"},
        "Blob": {"type": "blob"},
        "Timestamp": {"type": "timestamp"}
    }
}"#;

/// A self-referential structure plus the scalar and aggregate kinds.
pub const TREE_MODEL: &str = r#"{
    "shapes": {
        "Node": {
            "type": "structure",
            "members": {
                "Name": {"shape": "Str", "xmlAttribute": true},
                "Value": {"shape": "Num"},
                "Child": {"shape": "Node", "locationName": "Inner"},
                "Labels": {"shape": "LabelList"},
                "Flags": {"shape": "FlagList"},
                "Props": {"shape": "PropMap"}
            }
        },
        "LabelList": {"type": "list", "member": {"shape": "Str"}},
        "FlagList": {"type": "list", "member": {"shape": "Bool"}, "flattened": true},
        "PropMap": {"type": "map", "key": {"shape": "Str"}, "value": {"shape": "Num"}},
        "Str": {"type": "string"},
        "Num": {"type": "integer"},
        "Bool": {"type": "boolean"}
    }
}"#;

/// Load a model fixture.
#[must_use]
pub fn shape_set(model: &str) -> ShapeSet {
    init_tracing();
    ShapeSet::from_json(model).expect("fixture model is valid")
}

/// An engine over a model fixture with default configuration.
#[must_use]
pub fn engine(model: &str) -> Engine {
    engine_with(model, EngineConfig::default())
}

/// An engine over a model fixture with `config`.
#[must_use]
pub fn engine_with(model: &str, config: EngineConfig) -> Engine {
    Engine::new(shape_set(model), config)
}

mod test_cli;
mod test_jsonrpc;
mod test_query;
mod test_restxml;
mod test_tree;
