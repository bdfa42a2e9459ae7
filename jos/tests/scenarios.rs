//! End-to-end decode scenarios covering one representative wire layout per
//! grammar production.

use jos::{ClassDescFlags, DecodeError, DecoderOptions, FieldValue, ObjectInputStream, SliceSource, FIRST_HANDLE};

fn header() -> Vec<u8> {
    vec![0xAC, 0xED, 0x00, 0x05]
}

fn decode(body: Vec<u8>) -> jos::error::Result<Vec<jos::Content>> {
    let mut bytes = header();
    bytes.extend(body);
    let mut stream = ObjectInputStream::new(SliceSource::new(bytes))?;
    stream.read_all()
}

#[test]
fn s1_truncated_header_is_eof() {
    let bytes = vec![0xAC, 0xED];
    let err = ObjectInputStream::new(SliceSource::new(bytes)).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedEof | DecodeError::BadHeader { .. }));
}

#[test]
fn s2_header_only_yields_empty_contents() {
    let contents = decode(vec![]).unwrap();
    assert!(contents.is_empty());
}

#[test]
fn s3_bare_null_at_top_level_is_bad_type_code() {
    let err = decode(vec![0x70]).unwrap_err();
    assert!(matches!(err, DecodeError::BadTypeCode { .. }));
}

#[test]
fn s4_short_block_data() {
    let contents = decode(vec![0x77, 0x03, 0xDE, 0xAD, 0xBE]).unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].as_block().unwrap().data(), &[0xDE, 0xAD, 0xBE]);
}

#[test]
fn s5_minimal_serializable_object_with_one_int_field() {
    let mut body = vec![0x73 /* TC_OBJECT */, 0x72 /* TC_CLASSDESC */];
    body.extend_from_slice(&1u16.to_be_bytes());
    body.push(b'C');
    body.extend_from_slice(&0i64.to_be_bytes());
    body.push(ClassDescFlags::SC_SERIALIZABLE.bits());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.push(b'I');
    body.extend_from_slice(&1u16.to_be_bytes());
    body.push(b'x');
    body.push(0x78 /* TC_ENDBLOCKDATA */);
    body.push(0x70 /* TC_NULL */);
    body.extend_from_slice(&1i32.to_be_bytes());

    let contents = decode(body).unwrap();
    let object = contents[0].as_object().unwrap();
    let desc = object.description.as_ref().unwrap();
    assert_eq!(desc.name.to_string_lossy(), "C");
    assert_eq!(object.own_class_data().unwrap().values["x"], FieldValue::Int(1));
}

#[test]
fn s6_back_reference_to_string() {
    let mut body = vec![0x74 /* TC_STRING */];
    body.extend_from_slice(&2u16.to_be_bytes());
    body.extend_from_slice(b"hi");
    body.push(0x71 /* TC_REFERENCE */);
    body.extend_from_slice(&FIRST_HANDLE.to_be_bytes());

    let contents = decode(body).unwrap();
    assert_eq!(contents.len(), 2);
    let first = contents[0].as_string().unwrap();
    let second = contents[1].as_string().unwrap();
    assert_eq!(first.to_string_lossy(), "hi");
    assert_eq!(second.to_string_lossy(), "hi");
}

#[test]
fn s7_primitive_byte_array() {
    let mut body = vec![0x75 /* TC_ARRAY */, 0x72 /* TC_CLASSDESC */];
    body.extend_from_slice(&2u16.to_be_bytes());
    body.extend_from_slice(b"[B");
    body.extend_from_slice(&0i64.to_be_bytes());
    body.push(ClassDescFlags::SC_SERIALIZABLE.bits());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.push(0x78);
    body.push(0x70);
    body.extend_from_slice(&3i32.to_be_bytes());
    body.extend_from_slice(&[1u8, 2, 3]);

    let contents = decode(body).unwrap();
    let array = contents[0].as_array().unwrap();
    assert_eq!(array.description.name.to_string_lossy(), "[B");
    assert_eq!(array.values, vec![FieldValue::Byte(1), FieldValue::Byte(2), FieldValue::Byte(3)]);
}

#[test]
fn custom_options_reject_oversized_block_data() {
    let mut bytes = header();
    bytes.extend([0x77, 0x03, 1, 2, 3]);
    let options = DecoderOptions { max_depth: 512, max_block_len: 2 };
    let mut stream = ObjectInputStream::with_options(SliceSource::new(bytes), options).unwrap();
    let err = stream.read_all().unwrap_err();
    assert!(matches!(err, DecodeError::BadBlockSize(_)));
}
