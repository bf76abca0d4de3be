//! Literal wire vectors: every byte asserted.

use ccf::{
    decode, decode_with_limits, decode_with_resolver, encode, BigInt, CapabilityTarget,
    CapabilityValue, CompositeField, CompositeKind, CompositeType, CompositeValue, DecodeLimits,
    DictEntry, ErrorCode, ErrorKind, Field, PathDomain, PathValue, SimpleType, Type, TypePool,
    TypeResolver, Value,
};

fn assert_round_trip(pool: &TypePool, ty: &Type, value: &Value, expected: &[u8]) {
    let bytes = encode(pool, ty, value).unwrap();
    assert_eq!(bytes, expected, "encoded bytes mismatch");
    let decoded = decode(&bytes).unwrap();
    // Re-encoding the decoded message must reproduce the input bytes.
    let again = encode(&decoded.pool, &decoded.ty, &decoded.value).unwrap();
    assert_eq!(again, expected, "re-encoded bytes mismatch");
}

fn assert_decode_fails(bytes: &[u8], code: ErrorCode) {
    let err = decode(bytes).unwrap_err();
    assert_eq!(err.code, code, "unexpected error: {err}");
}

// --- seed scenarios -------------------------------------------------------

#[test]
fn void_message() {
    // type-and-value([simple-type(Void), null])
    let expected = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x18, 0x32, 0xf6];
    assert_round_trip(
        &TypePool::new(),
        &Type::Simple(SimpleType::Void),
        &Value::Void,
        &expected,
    );
}

#[test]
fn int_42() {
    let expected = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x04, 0xc2, 0x41, 0x2a];
    assert_round_trip(
        &TypePool::new(),
        &Type::Simple(SimpleType::Int),
        &Value::Int(BigInt::from_i64(42)),
        &expected,
    );
}

#[test]
fn int_negative_42() {
    // CBOR encodes -n as n-1 under tag 3, so 42 becomes 0x29.
    let expected = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x04, 0xc3, 0x41, 0x29];
    assert_round_trip(
        &TypePool::new(),
        &Type::Simple(SimpleType::Int),
        &Value::Int(BigInt::from_i64(-42)),
        &expected,
    );
}

#[test]
fn int_array() {
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x8b, 0xd8, 0x88, 0x04, 0x83, 0xc2, 0x41, 0x01, 0xc2, 0x41, 0x02,
        0xc2, 0x41, 0x03,
    ];
    let ty = Type::var_array(Type::Simple(SimpleType::Int));
    let value = Value::array(vec![
        Value::Int(BigInt::from_i64(1)),
        Value::Int(BigInt::from_i64(2)),
        Value::Int(BigInt::from_i64(3)),
    ]);
    assert_round_trip(&TypePool::new(), &ty, &value, &expected);
}

#[test]
fn dictionary_is_sorted_on_encode() {
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x8d, 0x82, 0xd8, 0x88, 0x01, 0xd8, 0x88, 0x04, 0x86, 0x61, 0x61,
        0xc2, 0x41, 0x01, 0x61, 0x62, 0xc2, 0x41, 0x02, 0x61, 0x63, 0xc2, 0x41, 0x03,
    ];
    let ty = Type::dictionary(Type::Simple(SimpleType::String), Type::Simple(SimpleType::Int));
    // Entries supplied out of order; the encoder reorders to a, b, c.
    let value = Value::dictionary(vec![
        DictEntry {
            key: Value::String("c".into()),
            value: Value::Int(BigInt::from_i64(3)),
        },
        DictEntry {
            key: Value::String("a".into()),
            value: Value::Int(BigInt::from_i64(1)),
        },
        DictEntry {
            key: Value::String("b".into()),
            value: Value::Int(BigInt::from_i64(2)),
        },
    ]);
    let bytes = encode(&TypePool::new(), &ty, &value).unwrap();
    assert_eq!(bytes, expected);

    let decoded = decode(&bytes).unwrap();
    match &decoded.value {
        Value::Dictionary(d) => {
            let keys: Vec<_> = d
                .entries
                .iter()
                .map(|e| match &e.key {
                    Value::String(s) => s.as_str(),
                    _ => panic!("expected string key"),
                })
                .collect();
            assert_eq!(keys, ["a", "b", "c"]);
        }
        other => panic!("expected dictionary, got {other:?}"),
    }
}

#[test]
fn resource_with_typedef_envelope() {
    let mut pool = TypePool::new();
    let foo = pool.insert(CompositeType::new(
        CompositeKind::Resource,
        "S.test.Foo",
        vec![Field::new("bar", Type::Simple(SimpleType::Int))],
    ));
    let ty = Type::Composite(foo);
    let value = Value::Composite(CompositeValue {
        type_ref: foo,
        fields: vec![CompositeField {
            name: "bar".into(),
            value: Value::Int(BigInt::from_i64(1)),
        }],
    });

    let expected = [
        0xd8, 0x81, 0x82, // typedef-and-value, array(2)
        0x81, // one definition
        0xd8, 0xa1, 0x83, // resource-type, array(3)
        0x40, // id h''
        0x6a, 0x53, 0x2e, 0x74, 0x65, 0x73, 0x74, 0x2e, 0x46, 0x6f, 0x6f, // "S.test.Foo"
        0x81, 0x82, 0x63, 0x62, 0x61, 0x72, 0xd8, 0x88, 0x04, // [["bar", Int]]
        0x82, // [type, value]
        0xd8, 0x89, 0x40, // type-ref(h'')
        0x81, 0xc2, 0x41, 0x01, // [1]
    ];
    assert_round_trip(&pool, &ty, &value, &expected);
}

#[test]
fn nested_optional_nil() {
    // Optional depth lives in the static type; the value body is one null
    // around a Never-typed innermost position.
    let ty = Type::optional(Type::optional(Type::optional(Type::Simple(
        SimpleType::Never,
    ))));
    let value = Value::some(Value::some(Value::Optional(None)));
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x8a, 0xd8, 0x8a, 0xd8, 0x8a, 0xd8, 0x88, 0x18, 0x2a, 0xf6,
    ];
    assert_round_trip(&TypePool::new(), &ty, &value, &expected);
}

#[test]
fn empty_type_id_fails_with_builtin_summary() {
    // struct-type([h'', "", []])
    let bytes = [
        0xd8, 0x81, 0x82, 0x81, 0xd8, 0xa0, 0x83, 0x40, 0x60, 0x80, 0x82, 0xd8, 0x89, 0x40, 0x80,
    ];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTypeId);
    assert_eq!(err.code, ErrorCode::InvalidBuiltinTypeId);
    assert!(err.to_string().contains("invalid type ID for built-in"));
}

#[test]
fn unknown_location_prefix_fails() {
    // struct-type([h'', "N.PublicKey", []])
    let bytes = [
        0xd8, 0x81, 0x82, 0x81, 0xd8, 0xa0, 0x83, 0x40, 0x6b, 0x4e, 0x2e, 0x50, 0x75, 0x62, 0x6c,
        0x69, 0x63, 0x4b, 0x65, 0x79, 0x80, 0x82, 0xd8, 0x89, 0x40, 0x80,
    ];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTypeId);
    assert_eq!(err.code, ErrorCode::InvalidBuiltinTypeId);
}

// --- other accept vectors -------------------------------------------------

#[test]
fn storage_path() {
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x18, 0x18, 0x82, 0x01, 0x63, 0x66, 0x6f, 0x6f,
    ];
    let value = Value::Path(PathValue {
        domain: PathDomain::Storage,
        identifier: "foo".into(),
    });
    assert_round_trip(&TypePool::new(), &Type::Simple(SimpleType::Path), &value, &expected);
}

#[test]
fn capability_with_path_target() {
    let ty = Type::Capability {
        borrow: Some(Box::new(Type::Simple(SimpleType::Int))),
    };
    let value = Value::Capability(CapabilityValue {
        address: [0, 0, 0, 1, 2, 3, 4, 5],
        borrow_type: Some(Type::Simple(SimpleType::Int)),
        target: CapabilityTarget::Path(PathValue {
            domain: PathDomain::Storage,
            identifier: "foo".into(),
        }),
    });
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x90, 0x81, 0xd8, 0x88, 0x04, 0x82, 0x48, 0x00, 0x00, 0x00, 0x01,
        0x02, 0x03, 0x04, 0x05, 0x82, 0x01, 0x63, 0x66, 0x6f, 0x6f,
    ];
    assert_round_trip(&TypePool::new(), &ty, &value, &expected);
}

#[test]
fn heterogeneous_array_wraps_each_element() {
    let ty = Type::var_array(Type::Simple(SimpleType::AnyStruct));
    let value = Value::array(vec![
        Value::Int8(1),
        Value::String("a".into()),
        Value::Bool(true),
    ]);
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x8b, 0xd8, 0x88, 0x18, 0x27, 0x83, // array type, 3 elements
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x05, 0x01, // 130([Int8, 1])
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x01, 0x61, 0x61, // 130([String, "a"])
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x00, 0xf5, // 130([Bool, true])
    ];
    assert_round_trip(&TypePool::new(), &ty, &value, &expected);
}

#[test]
fn fix64_is_a_scaled_integer() {
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x16, 0x1a, 0x49, 0x50, 0x4f, 0x80,
    ];
    assert_round_trip(
        &TypePool::new(),
        &Type::Simple(SimpleType::Fix64),
        &Value::Fix64(12_30000000),
        &expected,
    );
}

#[test]
fn type_value_optional_int() {
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x18, 0x29, 0xd8, 0xba, 0xd8, 0xb9, 0x04,
    ];
    let value = Value::TypeValue(Some(Type::optional(Type::Simple(SimpleType::Int))));
    assert_round_trip(&TypePool::new(), &Type::Simple(SimpleType::Meta), &value, &expected);
}

#[test]
fn type_value_without_static_type() {
    let expected = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x18, 0x29, 0xf6];
    assert_round_trip(
        &TypePool::new(),
        &Type::Simple(SimpleType::Meta),
        &Value::TypeValue(None),
        &expected,
    );
}

#[test]
fn recursive_type_value_uses_local_reference() {
    // resource Foo { foo: Foo? } as a type value: the composite assigns
    // itself id h'' and the field refers back with type-value-ref.
    let mut pool = TypePool::new();
    let foo = pool.insert(CompositeType::new(
        CompositeKind::Resource,
        "S.test.Foo",
        vec![],
    ));
    pool.get_mut(foo).unwrap().fields = vec![Field::new(
        "foo",
        Type::optional(Type::Composite(foo)),
    )];

    let value = Value::TypeValue(Some(Type::Composite(foo)));
    let expected = [
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x18, 0x29, // Meta
        0xd8, 0xd1, 0x85, // resource-type-value, array(5)
        0x40, // id h''
        0x6a, 0x53, 0x2e, 0x74, 0x65, 0x73, 0x74, 0x2e, 0x46, 0x6f, 0x6f, // "S.test.Foo"
        0xf6, // raw type: null
        0x81, 0x82, 0x63, 0x66, 0x6f, 0x6f, 0xd8, 0xba, 0xd8, 0xb8, 0x40, // [["foo", 186(184(h''))]]
        0x80, // initializers: []
    ];
    assert_round_trip(&pool, &Type::Simple(SimpleType::Meta), &value, &expected);
}

// --- reject vectors -------------------------------------------------------

#[test]
fn rejects_trailing_bytes() {
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x18, 0x32, 0xf6, 0x00];
    assert_decode_fails(&bytes, ErrorCode::TrailingBytes);
}

#[test]
fn rejects_truncated_input() {
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x04, 0xc2, 0x41];
    assert_decode_fails(&bytes, ErrorCode::UnexpectedEof);
}

#[test]
fn rejects_unknown_root_tag() {
    let bytes = [0xd8, 0x7f, 0x82, 0xd8, 0x88, 0x18, 0x32, 0xf6];
    assert_decode_fails(&bytes, ErrorCode::UnknownTag);
}

#[test]
fn rejects_unknown_simple_type_id() {
    // 49 is unassigned in the fixed table.
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x18, 0x31, 0xf6];
    assert_decode_fails(&bytes, ErrorCode::UnknownSimpleTypeId);
}

#[test]
fn rejects_non_minimal_integer_encoding() {
    // UInt8 value 10 encoded with a one-byte argument.
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x0c, 0x18, 0x0a];
    assert_decode_fails(&bytes, ErrorCode::NonMinimalEncoding);
}

#[test]
fn rejects_indefinite_length_text() {
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x01, 0x7f];
    assert_decode_fails(&bytes, ErrorCode::IndefiniteLengthForbidden);
}

#[test]
fn rejects_invalid_utf8() {
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x01, 0x61, 0xff];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUtf8);
    assert_eq!(err.code, ErrorCode::Utf8Invalid);
}

#[test]
fn rejects_multi_grapheme_character() {
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x02, 0x62, 0x61, 0x62];
    assert_decode_fails(&bytes, ErrorCode::NotSingleGrapheme);
}

#[test]
fn rejects_short_address() {
    let bytes = [
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x03, 0x47, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04,
    ];
    assert_decode_fails(&bytes, ErrorCode::InvalidAddressLength);
}

#[test]
fn rejects_bignum_leading_zero() {
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x04, 0xc2, 0x42, 0x00, 0x2a];
    assert_decode_fails(&bytes, ErrorCode::BignumLeadingZero);
}

#[test]
fn rejects_int8_out_of_range() {
    // -129
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x05, 0x38, 0x80];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert_eq!(err.code, ErrorCode::IntegerOutOfRange);
}

#[test]
fn rejects_int16_out_of_range() {
    // 32768
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x06, 0x19, 0x80, 0x00];
    assert_decode_fails(&bytes, ErrorCode::IntegerOutOfRange);
}

#[test]
fn rejects_uint8_out_of_range() {
    // 256
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x0c, 0x19, 0x01, 0x00];
    assert_decode_fails(&bytes, ErrorCode::IntegerOutOfRange);
}

#[test]
fn rejects_int128_one_past_max() {
    // 2^127
    let mut bytes = vec![0xd8, 0x82, 0x82, 0xd8, 0x88, 0x09, 0xc2, 0x50, 0x80];
    bytes.extend(std::iter::repeat(0x00).take(15));
    assert_decode_fails(&bytes, ErrorCode::MagnitudeOutOfRange);
}

#[test]
fn rejects_fix64_overflow() {
    // 2^63, one past Fix64 max (92233720368.54775807).
    let bytes = [
        0xd8, 0x82, 0x82, 0xd8, 0x88, 0x16, 0x1b, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    assert_decode_fails(&bytes, ErrorCode::IntegerOutOfRange);
}

#[test]
fn rejects_negative_unsigned_bignum() {
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x0b, 0xc3, 0x41, 0x01];
    assert_decode_fails(&bytes, ErrorCode::NegativeUnsigned);
}

#[test]
fn rejects_uint256_overflow() {
    // 2^256: a 33-byte magnitude.
    let mut bytes = vec![0xd8, 0x82, 0x82, 0xd8, 0x88, 0x11, 0xc2, 0x58, 0x21, 0x01];
    bytes.extend(std::iter::repeat(0x00).take(32));
    assert_decode_fails(&bytes, ErrorCode::MagnitudeOutOfRange);
}

#[test]
fn rejects_out_of_order_dictionary_keys() {
    let bytes = [
        0xd8, 0x82, 0x82, 0xd8, 0x8d, 0x82, 0xd8, 0x88, 0x01, 0xd8, 0x88, 0x04, 0x84, 0x61, 0x62,
        0xc2, 0x41, 0x01, 0x61, 0x61, 0xc2, 0x41, 0x02,
    ];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonCanonicalOrder);
    assert_eq!(err.code, ErrorCode::DictKeyOrder);
}

#[test]
fn rejects_duplicate_dictionary_keys() {
    let bytes = [
        0xd8, 0x82, 0x82, 0xd8, 0x8d, 0x82, 0xd8, 0x88, 0x01, 0xd8, 0x88, 0x04, 0x84, 0x61, 0x61,
        0xc2, 0x41, 0x01, 0x61, 0x61, 0xc2, 0x41, 0x02,
    ];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    assert_eq!(err.code, ErrorCode::DuplicateDictKey);
}

#[test]
fn rejects_composite_field_count_mismatch() {
    // One declared field, two values.
    let bytes = [
        0xd8, 0x81, 0x82, 0x81, 0xd8, 0xa1, 0x83, 0x40, 0x6a, 0x53, 0x2e, 0x74, 0x65, 0x73, 0x74,
        0x2e, 0x46, 0x6f, 0x6f, 0x81, 0x82, 0x63, 0x62, 0x61, 0x72, 0xd8, 0x88, 0x04, 0x82, 0xd8,
        0x89, 0x40, 0x82, 0xc2, 0x41, 0x01, 0xc2, 0x41, 0x02,
    ];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FieldCountMismatch);
}

#[test]
fn rejects_unsorted_type_definitions() {
    // "S.test.B" before "S.test.A".
    let bytes = [
        0xd8, 0x81, 0x82, 0x82, // two defs
        0xd8, 0xa0, 0x83, 0x40, 0x68, 0x53, 0x2e, 0x74, 0x65, 0x73, 0x74, 0x2e, 0x42, 0x80,
        0xd8, 0xa0, 0x83, 0x41, 0x01, 0x68, 0x53, 0x2e, 0x74, 0x65, 0x73, 0x74, 0x2e, 0x41, 0x80,
        0x82, 0xd8, 0x89, 0x40, 0x80,
    ];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonCanonicalOrder);
    assert_eq!(err.code, ErrorCode::TypeDefOrder);
}

#[test]
fn rejects_duplicate_type_definition_ids() {
    let bytes = [
        0xd8, 0x81, 0x82, 0x82, // two defs with the same id h''
        0xd8, 0xa0, 0x83, 0x40, 0x68, 0x53, 0x2e, 0x74, 0x65, 0x73, 0x74, 0x2e, 0x41, 0x80,
        0xd8, 0xa0, 0x83, 0x40, 0x68, 0x53, 0x2e, 0x74, 0x65, 0x73, 0x74, 0x2e, 0x42, 0x80,
        0x82, 0xd8, 0x89, 0x40, 0x80,
    ];
    assert_decode_fails(&bytes, ErrorCode::DuplicateTypeDefId);
}

#[test]
fn rejects_missing_qualified_identifier() {
    // "I.Foo" names an identifier location with no qualified identifier.
    let bytes = [
        0xd8, 0x81, 0x82, 0x81, 0xd8, 0xa0, 0x83, 0x40, 0x65, 0x49, 0x2e, 0x46, 0x6f, 0x6f, 0x80,
        0x82, 0xd8, 0x89, 0x40, 0x80,
    ];
    assert_decode_fails(&bytes, ErrorCode::MissingQualifiedIdentifier);
}

#[test]
fn reference_tag_families_are_not_interchangeable() {
    // type-value-ref where an inline type is expected.
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0xb8, 0x40, 0xf6];
    assert_decode_fails(&bytes, ErrorCode::UnknownTag);

    // type-ref where a type value is expected.
    let bytes = [0xd8, 0x82, 0x82, 0xd8, 0x88, 0x18, 0x29, 0xd8, 0x89, 0x40];
    assert_decode_fails(&bytes, ErrorCode::UnknownTag);
}

#[test]
fn rejects_depth_beyond_limit() {
    let mut limits = DecodeLimits::for_bytes(64);
    limits.max_depth = 4;
    // Optional nesting of 10 around Never.
    let mut bytes = vec![0xd8, 0x82, 0x82];
    for _ in 0..10 {
        bytes.extend_from_slice(&[0xd8, 0x8a]);
    }
    bytes.extend_from_slice(&[0xd8, 0x88, 0x18, 0x2a, 0xf6]);
    let err = decode_with_limits(&bytes, limits).unwrap_err();
    assert_eq!(err.code, ErrorCode::DepthLimitExceeded);
}

// --- external type references ---------------------------------------------

struct EmptyStructResolver;

impl TypeResolver for EmptyStructResolver {
    fn resolve(&self, cadence_type_id: &str) -> Option<CompositeType> {
        (cadence_type_id == "S.test.Empty").then(|| {
            CompositeType::new(CompositeKind::Struct, "S.test.Empty", vec![])
        })
    }
}

#[test]
fn external_type_ref_requires_resolver() {
    // type-and-value with a type-ref whose id bytes spell a cadence type id.
    let mut bytes = vec![0xd8, 0x82, 0x82, 0xd8, 0x89, 0x4c];
    bytes.extend_from_slice(b"S.test.Empty");
    bytes.push(0x80);

    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingTypeResolver);

    let limits = DecodeLimits::for_bytes(bytes.len());
    let decoded = decode_with_resolver(&bytes, limits, Some(&EmptyStructResolver)).unwrap();
    match decoded.value {
        Value::Composite(cv) => assert!(cv.fields.is_empty()),
        other => panic!("expected composite, got {other:?}"),
    }

    struct NoResolver;
    impl TypeResolver for NoResolver {
        fn resolve(&self, _: &str) -> Option<CompositeType> {
            None
        }
    }
    let err = decode_with_resolver(&bytes, limits, Some(&NoResolver)).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownTypeRef);
}
