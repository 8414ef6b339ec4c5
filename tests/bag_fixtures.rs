//! End-to-end fixtures: synthesizes bag files entirely in memory (no
//! binary `.bag` assets ship in this repo) and exercises `BagFile`
//! against them the way a real caller would.
use std::io::Cursor;

use bagreader::{ArrayValue, BagError, BagFile, Field, OpenOptions};

const MAGIC: &[u8] = b"#ROSBAG V2.0\n";

fn encode_field(name: &str, value: &[u8]) -> Vec<u8> {
    let mut entry = format!("{name}=").into_bytes();
    entry.extend_from_slice(value);
    let mut out = (entry.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(&entry);
    out
}

fn encode_record(op: u8, fields: &[(&str, &[u8])], data: &[u8]) -> Vec<u8> {
    let mut header = encode_field("op", &[op]);
    for (name, value) in fields {
        header.extend(encode_field(name, value));
    }
    let mut out = (header.len() as u32).to_le_bytes().to_vec();
    out.extend(header);
    out.extend((data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

fn encode_time(sec: i32, nsec: i32) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf[..4].copy_from_slice(&sec.to_le_bytes());
    buf[4..].copy_from_slice(&nsec.to_le_bytes());
    buf
}

fn encode_string(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

/// One `(topic, type_name, message_definition, md5sum, serialized payload,
/// recorded time)` connection carrying exactly one message, the shape
/// every numbered scenario in the test plan needs.
struct OneMessageBag {
    topic: &'static str,
    type_name: &'static str,
    message_definition: &'static str,
    md5sum: &'static str,
    payload: Vec<u8>,
    time: (i32, i32),
}

fn build(bag: &OneMessageBag) -> Vec<u8> {
    let conn_id = 0u32;

    let message_record = encode_record(
        0x02,
        &[("conn", &conn_id.to_le_bytes()), ("time", &encode_time(bag.time.0, bag.time.1))],
        &bag.payload,
    );
    let chunk_payload = message_record;

    let chunk_size = (chunk_payload.len() as u32).to_le_bytes();
    let chunk_record = encode_record(0x05, &[("compression", b"none"), ("size", &chunk_size)], &chunk_payload);

    let index_entries = {
        let mut buf = Vec::new();
        buf.extend(encode_time(bag.time.0, bag.time.1));
        buf.extend(0u32.to_le_bytes());
        buf
    };
    let index_data_record = encode_record(
        0x04,
        &[("ver", &1u32.to_le_bytes()), ("conn", &conn_id.to_le_bytes()), ("count", &1u32.to_le_bytes())],
        &index_entries,
    );

    let mut conn_data = Vec::new();
    conn_data.extend(encode_field("topic", bag.topic.as_bytes()));
    conn_data.extend(encode_field("type", bag.type_name.as_bytes()));
    conn_data.extend(encode_field("md5sum", bag.md5sum.as_bytes()));
    conn_data.extend(encode_field("message_definition", bag.message_definition.as_bytes()));
    let connection_record = encode_record(0x07, &[("conn", &conn_id.to_le_bytes()), ("topic", bag.topic.as_bytes())], &conn_data);

    let bag_header_len = encode_record(0x03, &[("index_pos", &0i64.to_le_bytes()), ("conn_count", &1u32.to_le_bytes()), ("chunk_count", &1u32.to_le_bytes())], &[]).len() as u64;
    let chunk_offset = bag_header_len;
    let index_pos = chunk_offset + chunk_record.len() as u64 + index_data_record.len() as u64;

    let chunk_info_entries = {
        let mut buf = Vec::new();
        buf.extend(conn_id.to_le_bytes());
        buf.extend(1u32.to_le_bytes());
        buf
    };
    let chunk_info_record = encode_record(
        0x06,
        &[
            ("ver", &1u32.to_le_bytes()),
            ("chunk_pos", &(chunk_offset as i64).to_le_bytes()),
            ("start_time", &encode_time(bag.time.0, bag.time.1)),
            ("end_time", &encode_time(bag.time.0, bag.time.1)),
            ("count", &1u32.to_le_bytes()),
        ],
        &chunk_info_entries,
    );

    let bag_header_record = encode_record(
        0x03,
        &[
            ("index_pos", &(index_pos as i64).to_le_bytes()),
            ("conn_count", &1u32.to_le_bytes()),
            ("chunk_count", &1u32.to_le_bytes()),
        ],
        &[],
    );
    assert_eq!(bag_header_record.len() as u64, bag_header_len, "index_pos field width must stay fixed");

    let mut out = MAGIC.to_vec();
    out.extend(bag_header_record);
    out.extend(chunk_record);
    out.extend(index_data_record);
    out.extend(connection_record);
    out.extend(chunk_info_record);
    out
}

fn open(bytes: Vec<u8>) -> BagFile<Cursor<Vec<u8>>> {
    BagFile::from_reader(Cursor::new(bytes)).expect("synthesized bag should open")
}

#[test]
fn uint8_scalar() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![180u8],
        time: (100, 0),
    };
    let mut bag = open(build(&bag));
    let msg = bag.first_message_of_type("test_msgs/UInt8").unwrap().unwrap();
    assert!(matches!(msg.get("data").unwrap(), Field::U8(180)));
}

#[test]
fn uint16_array() {
    let mut payload = Vec::new();
    payload.extend(3u32.to_le_bytes());
    for v in [0u16, 30000, 65535] {
        payload.extend(v.to_le_bytes());
    }
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt16MultiArray",
        message_definition: "uint16[] data\n",
        md5sum: "aa13629e8cf7e934d6605925b15767d7",
        payload,
        time: (100, 0),
    };
    let mut bag = open(build(&bag));
    let msg = bag.first_message_of_type("test_msgs/UInt16MultiArray").unwrap().unwrap();
    match msg.get("data").unwrap() {
        Field::Array(ArrayValue::U16Widened(v)) => assert_eq!(v, &[0, 30000, 65535]),
        other => panic!("unexpected field: {other:?}"),
    }
}

#[test]
fn uint64_scalar_needs_arbitrary_precision() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt64",
        message_definition: "uint64 data\n",
        md5sum: "1b317dcb1cef484d8997b832eac08e8c",
        payload: u64::MAX.to_le_bytes().to_vec(),
        time: (100, 0),
    };
    let mut bag = open(build(&bag));
    let msg = bag.first_message_of_type("test_msgs/UInt64").unwrap().unwrap();
    assert!(matches!(msg.get("data").unwrap(), Field::U64(u64::MAX)));
}

#[test]
fn float64_scalar() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/Float64",
        message_definition: "float64 data\n",
        md5sum: "fdb28210bfa9d7c91146260178d9a584",
        payload: 1.003062456558312f64.to_le_bytes().to_vec(),
        time: (100, 0),
    };
    let mut bag = open(build(&bag));
    let msg = bag.first_message_of_type("test_msgs/Float64").unwrap().unwrap();
    match msg.get("data").unwrap() {
        Field::F64(v) => assert!((v - 1.003062456558312).abs() < 1e-9),
        other => panic!("unexpected field: {other:?}"),
    }
}

#[test]
fn pointcloud2_nested_array_of_messages() {
    const DEF: &str = "uint32 width\n\
test_msgs/PointField[] fields\n\
================================================================================\n\
MSG: test_msgs/PointField\n\
string name\n\
uint32 offset\n\
uint8 datatype\n\
uint32 count\n";

    let fields = [
        ("x", 0u32, 7u8, 1u32),
        ("y", 4, 7, 1),
        ("z", 8, 7, 1),
        ("intensity", 16, 7, 1),
        ("ring", 20, 4, 1),
    ];

    let mut payload = Vec::new();
    payload.extend(124_914u32.to_le_bytes());
    payload.extend((fields.len() as u32).to_le_bytes());
    for (name, offset, datatype, count) in fields {
        payload.extend(encode_string(name));
        payload.extend(offset.to_le_bytes());
        payload.push(datatype);
        payload.extend(count.to_le_bytes());
    }

    let bag = OneMessageBag {
        topic: "/pointcloud2",
        type_name: "test_msgs/PointCloud2",
        message_definition: DEF,
        md5sum: "9db849a11579eb3e8f9e5e9b5dc6a6bb",
        payload,
        time: (100, 0),
    };
    let mut bag = open(build(&bag));
    let msg = bag.first_message_of_type("test_msgs/PointCloud2").unwrap().unwrap();
    assert!(matches!(msg.get("width").unwrap(), Field::U32(124_914)));
    match msg.get("fields").unwrap() {
        Field::Array(ArrayValue::Nested(items)) => {
            assert_eq!(items.len(), 5);
            let names: Vec<&str> = items
                .iter()
                .map(|m| match m.get("name").unwrap() {
                    Field::Str(s) => s.as_str(),
                    other => panic!("unexpected field: {other:?}"),
                })
                .collect();
            assert_eq!(names, ["x", "y", "z", "intensity", "ring"]);
            assert!(matches!(items[0].get("offset").unwrap(), Field::U32(0)));
            assert!(matches!(items[0].get("datatype").unwrap(), Field::U8(7)));
            assert!(matches!(items[0].get("count").unwrap(), Field::U32(1)));
        }
        other => panic!("unexpected field: {other:?}"),
    }
}

#[test]
fn magic_mismatch_is_not_a_bag() {
    let bytes = b"not a rosbag at all..".to_vec();
    let err = BagFile::from_reader(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, BagError::NotABag));
}

#[test]
fn round_trip_integer_extremes() {
    const DEF: &str = "int8 a\n\
uint8 b\n\
int16 c\n\
uint16 d\n\
int32 e\n\
uint32 f\n\
int64 g\n\
uint64 h\n\
float32 i\n\
float64 j\n";

    let mut payload = Vec::new();
    payload.push((-127i8) as u8);
    payload.push(180u8);
    payload.extend((-32767i16).to_le_bytes());
    payload.extend(65535u16.to_le_bytes());
    payload.extend((-2147483647i32).to_le_bytes());
    payload.extend(4294967294u32.to_le_bytes());
    payload.extend((-9223372036854775806i64).to_le_bytes());
    payload.extend(18446744073709551615u64.to_le_bytes());
    payload.extend(3.14159f32.to_le_bytes());
    payload.extend(1.003062456558312f64.to_le_bytes());

    let bag = OneMessageBag {
        topic: "/extremes",
        type_name: "test_msgs/Extremes",
        message_definition: DEF,
        md5sum: "00000000000000000000000000000001",
        payload,
        time: (1, 0),
    };
    let mut bag = open(build(&bag));
    let msg = bag.first_message_of_type("test_msgs/Extremes").unwrap().unwrap();
    assert!(matches!(msg.get("a").unwrap(), Field::I8(-127)));
    assert!(matches!(msg.get("b").unwrap(), Field::U8(180)));
    assert!(matches!(msg.get("c").unwrap(), Field::I16(-32767)));
    assert!(matches!(msg.get("d").unwrap(), Field::U16(65535)));
    assert!(matches!(msg.get("e").unwrap(), Field::I32(-2147483647)));
    assert!(matches!(msg.get("f").unwrap(), Field::U32(4294967294)));
    assert!(matches!(msg.get("g").unwrap(), Field::I64(-9223372036854775806)));
    assert!(matches!(msg.get("h").unwrap(), Field::U64(18446744073709551615)));
    match msg.get("i").unwrap() {
        Field::F32(v) => assert!((v - 3.14159).abs() < 1e-5),
        other => panic!("unexpected field: {other:?}"),
    }
    match msg.get("j").unwrap() {
        Field::F64(v) => assert!((v - 1.003062456558312).abs() < 1e-9),
        other => panic!("unexpected field: {other:?}"),
    }
}

#[test]
fn iterator_exhaustion_matches_chunk_info_counts() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![1u8],
        time: (5, 0),
    };
    let mut bag = open(build(&bag));
    let expected: u64 = bag.chunk_infos().iter().flat_map(|ci| &ci.entries).map(|e| e.count as u64).sum();

    let mut seen = 0u64;
    let mut iter = bag.messages_on_topics(&["/data"]).unwrap();
    while let Some(result) = iter.next() {
        result.unwrap();
        seen += 1;
    }
    assert_eq!(seen, expected);
    assert_eq!(seen, bag.message_count());
}

#[test]
fn time_bounds_are_monotonic_with_every_message() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![1u8],
        time: (42, 7),
    };
    let mut bag = open(build(&bag));
    let start = bag.start_time().unwrap();
    let end = bag.end_time().unwrap();
    assert!(start <= end);

    let mut iter = bag.messages_on_topics(&["/data"]).unwrap();
    while let Some(result) = iter.next() {
        let (_, _message) = result.unwrap();
    }
    assert_eq!(start.sec(), 42);
    assert_eq!(start.nsec(), 7);
}

/// Builds a one-connection bag whose bag-header `conn_count`/`chunk_count`
/// fields can diverge from what the scan will actually find, for exercising
/// `OpenOptions::strict_counts`.
fn build_with_declared_counts(bag: &OneMessageBag, declared_conn_count: u32, declared_chunk_count: u32) -> Vec<u8> {
    let conn_id = 0u32;

    let message_record = encode_record(
        0x02,
        &[("conn", &conn_id.to_le_bytes()), ("time", &encode_time(bag.time.0, bag.time.1))],
        &bag.payload,
    );
    let chunk_payload = message_record;

    let chunk_size = (chunk_payload.len() as u32).to_le_bytes();
    let chunk_record = encode_record(0x05, &[("compression", b"none"), ("size", &chunk_size)], &chunk_payload);

    let index_entries = {
        let mut buf = Vec::new();
        buf.extend(encode_time(bag.time.0, bag.time.1));
        buf.extend(0u32.to_le_bytes());
        buf
    };
    let index_data_record = encode_record(
        0x04,
        &[("ver", &1u32.to_le_bytes()), ("conn", &conn_id.to_le_bytes()), ("count", &1u32.to_le_bytes())],
        &index_entries,
    );

    let mut conn_data = Vec::new();
    conn_data.extend(encode_field("topic", bag.topic.as_bytes()));
    conn_data.extend(encode_field("type", bag.type_name.as_bytes()));
    conn_data.extend(encode_field("md5sum", bag.md5sum.as_bytes()));
    conn_data.extend(encode_field("message_definition", bag.message_definition.as_bytes()));
    let connection_record = encode_record(0x07, &[("conn", &conn_id.to_le_bytes()), ("topic", bag.topic.as_bytes())], &conn_data);

    let bag_header_len = encode_record(
        0x03,
        &[("index_pos", &0i64.to_le_bytes()), ("conn_count", &declared_conn_count.to_le_bytes()), ("chunk_count", &declared_chunk_count.to_le_bytes())],
        &[],
    )
    .len() as u64;
    let chunk_offset = bag_header_len;
    let index_pos = chunk_offset + chunk_record.len() as u64 + index_data_record.len() as u64;

    let chunk_info_entries = {
        let mut buf = Vec::new();
        buf.extend(conn_id.to_le_bytes());
        buf.extend(1u32.to_le_bytes());
        buf
    };
    let chunk_info_record = encode_record(
        0x06,
        &[
            ("ver", &1u32.to_le_bytes()),
            ("chunk_pos", &(chunk_offset as i64).to_le_bytes()),
            ("start_time", &encode_time(bag.time.0, bag.time.1)),
            ("end_time", &encode_time(bag.time.0, bag.time.1)),
            ("count", &1u32.to_le_bytes()),
        ],
        &chunk_info_entries,
    );

    let bag_header_record = encode_record(
        0x03,
        &[
            ("index_pos", &(index_pos as i64).to_le_bytes()),
            ("conn_count", &declared_conn_count.to_le_bytes()),
            ("chunk_count", &declared_chunk_count.to_le_bytes()),
        ],
        &[],
    );
    assert_eq!(bag_header_record.len() as u64, bag_header_len, "declared-count field width must stay fixed");

    let mut out = MAGIC.to_vec();
    out.extend(bag_header_record);
    out.extend(chunk_record);
    out.extend(index_data_record);
    out.extend(connection_record);
    out.extend(chunk_info_record);
    out
}

#[test]
fn storage_topic_not_publisher_topic_drives_lookups() {
    let mut bytes = MAGIC.to_vec();
    let conn_id = 0u32;
    let storage_topic = "/recorded_as";
    let original_topic = "/published_as";
    let type_name = "test_msgs/UInt8";
    let md5sum = "7c8164229e7d2c17eb95e9231617fdee";
    let message_definition = "uint8 data\n";

    let message_record = encode_record(
        0x02,
        &[("conn", &conn_id.to_le_bytes()), ("time", &encode_time(1, 0))],
        &[9u8],
    );
    let chunk_size = (message_record.len() as u32).to_le_bytes();
    let chunk_record = encode_record(0x05, &[("compression", b"none"), ("size", &chunk_size)], &message_record);

    let mut conn_data = Vec::new();
    conn_data.extend(encode_field("topic", original_topic.as_bytes()));
    conn_data.extend(encode_field("type", type_name.as_bytes()));
    conn_data.extend(encode_field("md5sum", md5sum.as_bytes()));
    conn_data.extend(encode_field("message_definition", message_definition.as_bytes()));
    let connection_record = encode_record(
        0x07,
        &[("conn", &conn_id.to_le_bytes()), ("topic", storage_topic.as_bytes())],
        &conn_data,
    );

    let bag_header_len = encode_record(0x03, &[("index_pos", &0i64.to_le_bytes()), ("conn_count", &1u32.to_le_bytes()), ("chunk_count", &1u32.to_le_bytes())], &[]).len() as u64;
    let chunk_offset = bag_header_len;
    let chunk_info_entries = {
        let mut buf = Vec::new();
        buf.extend(conn_id.to_le_bytes());
        buf.extend(1u32.to_le_bytes());
        buf
    };
    let chunk_info_record = encode_record(
        0x06,
        &[
            ("ver", &1u32.to_le_bytes()),
            ("chunk_pos", &(chunk_offset as i64).to_le_bytes()),
            ("start_time", &encode_time(1, 0)),
            ("end_time", &encode_time(1, 0)),
            ("count", &1u32.to_le_bytes()),
        ],
        &chunk_info_entries,
    );
    let index_pos = chunk_offset + chunk_record.len() as u64;
    let bag_header_record = encode_record(
        0x03,
        &[
            ("index_pos", &(index_pos as i64).to_le_bytes()),
            ("conn_count", &1u32.to_le_bytes()),
            ("chunk_count", &1u32.to_le_bytes()),
        ],
        &[],
    );

    bytes.extend(bag_header_record);
    bytes.extend(chunk_record);
    bytes.extend(connection_record);
    bytes.extend(chunk_info_record);

    let mut bag = open(bytes);
    let topics: Vec<_> = bag.topics().into_iter().map(|t| t.name).collect();
    assert_eq!(topics, [storage_topic]);

    let mut iter = bag.messages_on_topics(&[storage_topic]).unwrap();
    assert!(iter.next().unwrap().is_ok());

    assert!(matches!(
        bag.message_on_topic_at_index(storage_topic, 0).unwrap().get("data").unwrap(),
        Field::U8(9)
    ));
}

#[test]
fn message_on_topic_at_index_and_out_of_range() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![200u8],
        time: (10, 0),
    };
    let mut bag = open(build(&bag));

    let msg = bag.message_on_topic_at_index("/data", 0).unwrap();
    assert!(matches!(msg.get("data").unwrap(), Field::U8(200)));

    let err = bag.message_on_topic_at_index("/data", 1).unwrap_err();
    match err {
        BagError::IndexOutOfRange { index, count } => {
            assert_eq!(index, 1);
            assert_eq!(count, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn strict_counts_promotes_mismatch_to_hard_error() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![1u8],
        time: (1, 0),
    };
    let bytes = build_with_declared_counts(&bag, 2, 1);

    BagFile::from_reader(Cursor::new(bytes.clone())).expect("lenient default should only warn");

    let err = BagFile::from_reader_with(
        Cursor::new(bytes),
        OpenOptions { strict_counts: true, ..OpenOptions::default() },
    )
    .unwrap_err();
    assert!(matches!(err, BagError::CountMismatch(_)));
}

#[test]
fn max_header_len_override_rejects_bag_header_above_cap() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![1u8],
        time: (1, 0),
    };
    let bytes = build(&bag);

    BagFile::from_reader(Cursor::new(bytes.clone())).expect("default cap comfortably fits this header");

    let err = BagFile::from_reader_with(Cursor::new(bytes), OpenOptions { strict_counts: false, max_header_len: 8 })
        .unwrap_err();
    assert!(matches!(err, BagError::Corrupt { .. }));
}

#[test]
fn advertised_md5sum_matches_resolved_schema_md5() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![1u8],
        time: (1, 0),
    };
    let bag = open(build(&bag));
    let connection = &bag.connections()[0];
    assert_eq!(connection.registry.root().md5sum, connection.md5sum);
}

#[test]
fn independent_iterators_over_separate_sources_do_not_interfere() {
    let bag_a = OneMessageBag {
        topic: "/a",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![11u8],
        time: (1, 0),
    };
    let bag_b = OneMessageBag {
        topic: "/b",
        type_name: "test_msgs/Float64",
        message_definition: "float64 data\n",
        md5sum: "fdb28210bfa9d7c91146260178d9a584",
        payload: 2.5f64.to_le_bytes().to_vec(),
        time: (2, 0),
    };
    let mut file_a = open(build(&bag_a));
    let mut file_b = open(build(&bag_b));

    let mut iter_a = file_a.messages_on_topics(&["/a"]).unwrap();
    let mut iter_b = file_b.messages_on_topics(&["/b"]).unwrap();

    let (_, msg_b) = iter_b.next().unwrap().unwrap();
    assert!(matches!(msg_b.get("data").unwrap(), Field::F64(v) if (*v - 2.5).abs() < 1e-12));

    let (_, msg_a) = iter_a.next().unwrap().unwrap();
    assert!(matches!(msg_a.get("data").unwrap(), Field::U8(11)));

    assert!(iter_a.next().is_none());
    assert!(iter_b.next().is_none());
}

#[test]
fn fingerprint_is_deterministic_for_identical_bytes() {
    let bag = OneMessageBag {
        topic: "/data",
        type_name: "test_msgs/UInt8",
        message_definition: "uint8 data\n",
        md5sum: "7c8164229e7d2c17eb95e9231617fdee",
        payload: vec![42u8],
        time: (1, 0),
    };
    let bytes_a = build(&bag);
    let bytes_b = bytes_a.clone();
    let bag_a = open(bytes_a);
    let bag_b = open(bytes_b);
    assert_eq!(bag_a.unique_identifier(), bag_b.unique_identifier());
}
