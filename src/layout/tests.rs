use std::borrow::Cow;
use std::sync::Arc;

use proptest::prelude::*;

use super::*;
use crate::record;
use crate::tag::Alignment;

// ═══════════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════════

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Single {
        f1: String = "1,5",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Aligned {
        value: String = "1,5,right,#",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct DefaultWithPad {
        value: String = "1,5,default,#",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Overlap {
        first: String = "1,5",
        second: String = "1,5",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Numbers {
        int: i64 = "1,5",
        uint: u32 = "6,10",
        float: f64 = "11,20",
        flag: bool = "21,25",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Columns {
        a: String = "1,5",
        b: String = "6,10",
        c: String = "11,15",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct PartlyTagged {
        skipped: String = "5",
        also_skipped: String = "4, 11",
        untagged: String,
        kept: String = "1,3",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Mixed {
        label: String = "1,4",
        count: i32 = "5,9",
        explicit: i32 = "10,14,left",
        price: f64 = "15,22",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Inner {
        a: String = "1,3",
        b: i32 = "4,6,right,0",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Outer {
        id: u32 = "1,2",
        inner: Inner = "3,8",
        tail: String = "9,10",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct MaybeInner {
        inner: Option<Inner> = "1,6",
        tail: String = "7,8",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Optionals {
        text: Option<String> = "1,5",
        number: Option<i64> = "6,10,right,#",
    }
}

/// A column type the codec cannot place.
#[derive(Debug, Default, Clone, PartialEq)]
struct Opaque;

impl FixedValue for Opaque {
    fn encode_fixed(&self, _ctx: &EncodeContext<'_>) -> std::result::Result<Cow<'_, [u8]>, ConvertError> {
        Err(ConvertError::Unsupported { type_name: "Opaque" })
    }

    fn decode_fixed(&mut self, _raw: &RawValue<'_>) -> std::result::Result<(), ConvertError> {
        Err(ConvertError::Unsupported { type_name: "Opaque" })
    }
}

/// Upper-cases on the way out, refuses digits on the way in.
#[derive(Debug, Default, Clone, PartialEq)]
struct Shout(String);

impl FixedValue for Shout {
    fn encode_fixed(&self, _ctx: &EncodeContext<'_>) -> std::result::Result<Cow<'_, [u8]>, ConvertError> {
        Ok(Cow::Owned(self.0.to_uppercase().into_bytes()))
    }

    fn decode_fixed(&mut self, raw: &RawValue<'_>) -> std::result::Result<(), ConvertError> {
        let text = raw.as_str()?;
        if text.bytes().any(|b| b.is_ascii_digit()) {
            return Err(ConvertError::custom("digits are not allowed"));
        }
        self.0 = text.to_lowercase();
        Ok(())
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct WithOpaque {
        opaque: Opaque = "1,3",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct WithShout {
        shout: Shout = "1,6",
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════

fn encode<R: Record>(record: &R, config: &FormatConfig) -> Result<Vec<u8>> {
    LayoutCache::global().layout_of::<R>().encode(record, config)
}

fn encode_str<R: Record>(record: &R) -> String {
    String::from_utf8(encode(record, &FormatConfig::default()).unwrap()).unwrap()
}

fn decode<R: Record>(line: &str, config: &FormatConfig) -> Result<R> {
    LayoutCache::global().layout_of::<R>().decode_line(line.as_bytes(), config)
}

fn codepoints() -> FormatConfig {
    FormatConfig::default().with_codepoint_indices(true)
}

// ═══════════════════════════════════════════════════════════════════════
// Layout construction
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_layout_line_len_and_order() {
    let layout = RecordLayout::<Numbers>::build();
    assert_eq!(layout.name(), "Numbers");
    assert_eq!(layout.line_len(), 25);
    let names: Vec<&str> = layout.fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, ["int", "uint", "float", "flag"]);
    assert_eq!(layout.fields()[2].start(), 11);
    assert_eq!(layout.fields()[2].end(), 20);
    assert_eq!(layout.fields()[2].width(), 10);
    assert!(layout.fields()[0].is_numeric());
    assert!(!layout.fields()[3].is_numeric());
}

#[test]
fn test_invalid_tags_are_inert() {
    let layout = RecordLayout::<PartlyTagged>::build();
    assert_eq!(layout.fields().len(), 1);
    assert_eq!(layout.fields()[0].name(), "kept");
    assert_eq!(layout.line_len(), 3);

    let record = PartlyTagged {
        skipped: "zzzzz".into(),
        also_skipped: "yy".into(),
        untagged: "xx".into(),
        kept: "foo".into(),
    };
    assert_eq!(encode_str(&record), "foo");

    let decoded: PartlyTagged = decode("foo and more", &FormatConfig::default()).unwrap();
    assert_eq!(decoded, PartlyTagged { kept: "foo".into(), ..Default::default() });
}

#[test]
fn test_empty_layout() {
    record! {
        #[derive(Debug, Default)]
        struct Nothing {
            _a: String,
        }
    }
    let layout = RecordLayout::<Nothing>::build();
    assert_eq!(layout.line_len(), 0);
    assert_eq!(encode_str(&Nothing::default()), "");
}

#[test]
fn test_cache_builds_once() {
    let cache = LayoutCache::new();
    assert!(cache.is_empty());
    let first = cache.layout_of::<Single>();
    let second = cache.layout_of::<Single>();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(cache.contains::<Single>());
    assert!(!cache.contains::<Numbers>());
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_concurrent_population() {
    let cache = LayoutCache::new();
    let layouts: Vec<Arc<RecordLayout<Columns>>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| cache.layout_of::<Columns>())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for layout in &layouts[1..] {
        assert!(Arc::ptr_eq(&layouts[0], layout));
    }
    assert_eq!(cache.len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════
// Encode placement
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_padding_default() {
    assert_eq!(encode_str(&Single { f1: "foo".into() }), "foo  ");
}

#[test]
fn test_right_alignment() {
    assert_eq!(encode_str(&Aligned { value: "foo".into() }), "##foo");
    let decoded: Aligned = decode("##foo", &FormatConfig::default()).unwrap();
    assert_eq!(decoded.value, "foo");
}

#[test]
fn test_default_alignment_with_pad_writes_left() {
    assert_eq!(encode_str(&DefaultWithPad { value: "foo".into() }), "foo##");
    let decoded: DefaultWithPad = decode("##foo##", &FormatConfig::default()).unwrap();
    assert_eq!(decoded.value, "foo");
}

#[test]
fn test_overlap_later_field_wins() {
    let record = Overlap {
        first: String::new(),
        second: "val".into(),
    };
    assert_eq!(encode_str(&record), "val  ");

    let record = Overlap {
        first: "hello".into(),
        second: "val".into(),
    };
    assert_eq!(encode_str(&record), "val  ");

    let decoded: Overlap = decode("val  ", &FormatConfig::default()).unwrap();
    assert_eq!(decoded.first, "val");
    assert_eq!(decoded.second, "val");
}

#[test]
fn test_truncation_bytes_and_codepoints() {
    let record = Single { f1: "føøbar".into() };
    let bytes = encode(&record, &FormatConfig::default()).unwrap();
    assert_eq!(bytes, "føø".as_bytes());

    let line = encode(&record, &codepoints()).unwrap();
    assert_eq!(line, "føøba".as_bytes());
}

#[test]
fn test_truncation_may_split_codepoint_in_byte_mode() {
    let record = Single { f1: "abcd☃".into() };
    let bytes = encode(&record, &FormatConfig::default()).unwrap();
    assert_eq!(bytes, &"abcd☃".as_bytes()[..5]);
}

#[test]
fn test_overflow_strict() {
    let config = FormatConfig::default().with_overflow_errors(true);
    let err = encode(&Single { f1: "toolong".into() }, &config).unwrap_err();
    match err {
        FixedWidthError::Overflow { field, value, len, width } => {
            assert_eq!(field, "f1");
            assert_eq!(value, "toolong");
            assert_eq!(len, 7);
            assert_eq!(width, 5);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(encode(&Single { f1: "fits!".into() }, &config).is_ok());
}

#[test]
fn test_multibyte_encode_in_codepoint_mode() {
    let record = Columns {
        a: "ABCD".into(),
        b: "☃☃".into(),
        c: "EFG".into(),
    };
    let line = encode(&record, &codepoints()).unwrap();
    assert_eq!(line, "ABCD ☃☃   EFG  ".as_bytes());
}

#[test]
fn test_numeric_override() {
    let config = FormatConfig::default().with_right_aligned_zero_padded_numbers();
    let record = Mixed {
        label: "ab".into(),
        count: 42,
        explicit: 7,
        price: 1.5,
    };
    let line = String::from_utf8(encode(&record, &config).unwrap()).unwrap();
    assert_eq!(line, "ab  000427    00001.50");

    let plain = encode_str(&record);
    assert_eq!(plain, "ab  42   7    1.50    ");
}

#[test]
fn test_zero_padded_numbers_decode() {
    let decoded: Mixed = decode("ab  000427    00001.50", &FormatConfig::default()).unwrap();
    assert_eq!(decoded.count, 42);
    assert_eq!(decoded.explicit, 7);
    assert_eq!(decoded.price, 1.5);
}

#[test]
fn test_optionals() {
    let record = Optionals { text: None, number: Some(12) };
    assert_eq!(encode_str(&record), "     ###12");
    let decoded: Optionals = decode("     ###12", &FormatConfig::default()).unwrap();
    assert_eq!(decoded, record);

    let decoded: Optionals = decode("hi", &FormatConfig::default()).unwrap();
    assert_eq!(decoded, Optionals { text: Some("hi".into()), number: None });
}

// ═══════════════════════════════════════════════════════════════════════
// Decode extraction
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_multibyte_alignment() {
    let decoded: Columns = decode("ABCD ☃☃   EFG  ", &codepoints()).unwrap();
    assert_eq!(
        decoded,
        Columns {
            a: "ABCD".into(),
            b: "☃☃".into(),
            c: "EFG".into()
        }
    );
}

#[test]
fn test_multibyte_in_byte_mode_splits_by_byte() {
    // "☃☃" is six bytes, so the second column ends inside the snowmen
    let err = decode::<Columns>("ABCD ☃☃   EFG  ", &FormatConfig::default()).unwrap_err();
    match err {
        FixedWidthError::Decode { field, source, .. } => {
            assert_eq!(field, "b");
            assert!(matches!(source, ConvertError::Utf8(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_empty_numeric_decodes_to_zero() {
    let decoded: Numbers = decode(&" ".repeat(25), &FormatConfig::default()).unwrap();
    assert_eq!(decoded, Numbers::default());
    let decoded: Numbers = decode("", &FormatConfig::default()).unwrap();
    assert_eq!(decoded, Numbers::default());
}

#[test]
fn test_numbers_round_trip() {
    let record = Numbers {
        int: -42,
        uint: 7,
        float: 3.25,
        flag: true,
    };
    let line = encode_str(&record);
    assert_eq!(line, "-42  7    3.25      true ");
    assert_eq!(decode::<Numbers>(&line, &FormatConfig::default()).unwrap(), record);
}

#[test]
fn test_short_line_decodes_missing_columns_as_empty() {
    let decoded: Columns = decode("ABCDEfg", &FormatConfig::default()).unwrap();
    assert_eq!(decoded.a, "ABCDE");
    assert_eq!(decoded.b, "fg");
    assert_eq!(decoded.c, "");
}

#[test]
fn test_decode_error_identifies_field() {
    let err = decode::<Numbers>("12x45", &FormatConfig::default()).unwrap_err();
    match err {
        FixedWidthError::Decode {
            value,
            type_name,
            record,
            field,
            source,
        } => {
            assert_eq!(value, "12x45");
            assert_eq!(type_name, "i64");
            assert_eq!(record, "Numbers");
            assert_eq!(field, "int");
            assert!(matches!(source, ConvertError::Int(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_invalid_codepoint_in_line() {
    let layout = LayoutCache::global().layout_of::<Columns>();
    let err = layout.decode_line(b"ABCD\xff", &codepoints()).unwrap_err();
    assert!(matches!(err, FixedWidthError::InvalidCodepoint { offset: 4 }));
}

// ═══════════════════════════════════════════════════════════════════════
// Nested records
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_nested_record() {
    let record = Outer {
        id: 7,
        inner: Inner { a: "ab".into(), b: 5 },
        tail: "zz".into(),
    };
    let line = encode_str(&record);
    assert_eq!(line, "7 ab 005zz");
    assert_eq!(decode::<Outer>(&line, &FormatConfig::default()).unwrap(), record);
}

#[test]
fn test_optional_nested_record() {
    let absent = MaybeInner { inner: None, tail: "ok".into() };
    let line = encode_str(&absent);
    assert_eq!(line, "      ok");
    assert_eq!(decode::<MaybeInner>(&line, &FormatConfig::default()).unwrap(), absent);

    let present = MaybeInner {
        inner: Some(Inner { a: "x".into(), b: 12 }),
        tail: "ok".into(),
    };
    let line = encode_str(&present);
    assert_eq!(line, "x  012ok");
    assert_eq!(decode::<MaybeInner>(&line, &FormatConfig::default()).unwrap(), present);
}

#[test]
fn test_nested_error_names_inner_field() {
    let err = decode::<Outer>("7 ab x05zz", &FormatConfig::default()).unwrap_err();
    match err {
        FixedWidthError::Decode { record, field, .. } => {
            assert_eq!(record, "Inner");
            assert_eq!(field, "b");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Custom converters
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_custom_converter_takes_over() {
    let record = WithShout { shout: Shout("hey".into()) };
    assert_eq!(encode_str(&record), "HEY   ");
    let decoded: WithShout = decode("HEY   ", &FormatConfig::default()).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_custom_converter_error_propagates() {
    let err = decode::<WithShout>("abc123", &FormatConfig::default()).unwrap_err();
    match err {
        FixedWidthError::Decode { source, field, .. } => {
            assert_eq!(field, "shout");
            assert_eq!(source.to_string(), "digits are not allowed");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unsupported_type() {
    let err = encode(&WithOpaque::default(), &FormatConfig::default()).unwrap_err();
    match err {
        FixedWidthError::UnsupportedType { type_name, record, field } => {
            assert_eq!(type_name, "Opaque");
            assert_eq!(record, "WithOpaque");
            assert_eq!(field, "opaque");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_effective_format() {
    let layout = RecordLayout::<Mixed>::build();
    let config = FormatConfig::default().with_right_aligned_zero_padded_numbers();
    let [label, count, explicit, price] = layout.fields() else {
        panic!("expected four fields");
    };
    assert_eq!(label.effective_format(&config), FieldFormat::default());
    assert_eq!(count.effective_format(&config), FieldFormat::right_zero_padded());
    assert_eq!(
        explicit.effective_format(&config),
        FieldFormat::new(Alignment::Left, b' ')
    );
    assert_eq!(price.effective_format(&config), FieldFormat::right_zero_padded());
    assert_eq!(count.effective_format(&FormatConfig::default()), FieldFormat::default());
}

// ═══════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct RoundTrip {
        name: String = "1,10",
        count: i64 = "11,30,right",
        flag: bool = "31,35",
        maybe: Option<u32> = "36,45,right,#",
    }
}

fn round_trip_strategy(alphabet: &'static str) -> impl Strategy<Value = RoundTrip> {
    (alphabet, any::<i64>(), any::<bool>(), any::<Option<u32>>()).prop_map(|(name, count, flag, maybe)| {
        RoundTrip {
            name,
            count,
            flag,
            maybe,
        }
    })
}

proptest! {
    #[test]
    fn prop_round_trip_bytes(record in round_trip_strategy("[a-zA-Z0-9.-]{0,10}")) {
        let config = FormatConfig::default();
        let line = encode(&record, &config).unwrap();
        prop_assert_eq!(line.len(), 45);
        let layout = LayoutCache::global().layout_of::<RoundTrip>();
        prop_assert_eq!(layout.decode_line(&line, &config).unwrap(), record);
    }

    #[test]
    fn prop_round_trip_codepoints(record in round_trip_strategy("[a-zA-Zéø☃日]{0,10}")) {
        let config = codepoints();
        let line = encode(&record, &config).unwrap();
        prop_assert_eq!(std::str::from_utf8(&line).unwrap().chars().count(), 45);
        let layout = LayoutCache::global().layout_of::<RoundTrip>();
        prop_assert_eq!(layout.decode_line(&line, &config).unwrap(), record);
    }

    #[test]
    fn prop_truncation_bytes(text in "[a-z]{11,30}") {
        let line = encode(&Single { f1: text.clone() }, &FormatConfig::default()).unwrap();
        let decoded: Single = decode(std::str::from_utf8(&line).unwrap(), &FormatConfig::default()).unwrap();
        prop_assert_eq!(decoded.f1, &text[..5]);
    }

    #[test]
    fn prop_truncation_codepoints(text in "[a-zñ☃]{6,30}") {
        let config = codepoints();
        let line = encode(&Single { f1: text.clone() }, &config).unwrap();
        let decoded: Single = decode(std::str::from_utf8(&line).unwrap(), &config).unwrap();
        let prefix: String = text.chars().take(5).collect();
        prop_assert_eq!(decoded.f1, prefix);
    }
}
