// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::items_after_statements)] // Test helpers
#![allow(clippy::too_many_lines)] // Example/test code
#![allow(clippy::clone_on_copy)] // Uniform accessor macro
#![allow(clippy::redundant_closure_for_method_calls)] // Test code clarity

//! Store -> XML -> store round-trips for every scalar kind and for arrays of
//! rank 1 to 3, zero-length dimensions included.

use std::io::{BufReader, Seek, SeekFrom};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use ndarray::{Array, Array2, Array3};
use num_bigint::BigInt;
use propstore::{
    CodecConfig, ConfigurationStore, DescriptorRegistry, PropertySource, PropertySpec,
    PropertyType, XmlCodec,
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
struct Everything {
    text: String,
    flag: bool,
    tiny: i8,
    short: i16,
    int: i32,
    long: i64,
    byte: u8,
    ushort: u16,
    uint: u32,
    ulong: u64,
    big: BigInt,
    single: f32,
    double: f64,
    money: Decimal,
    id: Uuid,
    span: TimeDelta,
    local: DateTime<FixedOffset>,
    utc: DateTime<Utc>,
}

macro_rules! prop {
    ($owner:ty, $category:literal, $name:literal, $field:ident, $ty:ty) => {
        PropertySpec::field::<$owner, $ty, _, _>(
            $category,
            $name,
            |o| Some(o.$field.clone()),
            |o, v| o.$field = v,
        )
    };
}

impl PropertySource for Everything {
    fn properties() -> Vec<PropertySpec> {
        vec![
            prop!(Everything, "Text", "Text", text, String),
            prop!(Everything, "Logic", "Flag", flag, bool),
            prop!(Everything, "Signed", "Tiny", tiny, i8),
            prop!(Everything, "Signed", "Short", short, i16),
            prop!(Everything, "Signed", "Int", int, i32),
            prop!(Everything, "Signed", "Long", long, i64),
            prop!(Everything, "Unsigned", "Byte", byte, u8),
            prop!(Everything, "Unsigned", "UShort", ushort, u16),
            prop!(Everything, "Unsigned", "UInt", uint, u32),
            prop!(Everything, "Unsigned", "ULong", ulong, u64),
            prop!(Everything, "Signed", "Big", big, BigInt),
            prop!(Everything, "Float", "Single", single, f32),
            prop!(Everything, "Float", "Double", double, f64),
            prop!(Everything, "Float", "Money", money, Decimal),
            prop!(Everything, "Ids", "Id", id, Uuid),
            prop!(Everything, "Time", "Span", span, TimeDelta),
            prop!(Everything, "Time", "Local", local, DateTime<FixedOffset>),
            prop!(Everything, "Time", "Utc", utc, DateTime<Utc>),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Arrays {
    list: Vec<i64>,
    matrix: Array2<f64>,
    cube: Array3<String>,
    hollow: Array2<u16>,
    flat_cube: Array3<bool>,
    inner_empty: Array3<Decimal>,
}

impl Default for Arrays {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            matrix: Array2::zeros((0, 0)),
            cube: Array3::from_elem((0, 0, 0), String::new()),
            hollow: Array2::zeros((0, 0)),
            flat_cube: Array3::from_elem((0, 0, 0), false),
            inner_empty: Array3::zeros((0, 0, 0)),
        }
    }
}

impl PropertySource for Arrays {
    fn properties() -> Vec<PropertySpec> {
        vec![
            prop!(Arrays, "Arrays", "List", list, Vec<i64>),
            prop!(Arrays, "Arrays", "Matrix", matrix, Array2<f64>),
            prop!(Arrays, "Arrays", "Cube", cube, Array3<String>),
            prop!(Arrays, "Arrays", "Hollow", hollow, Array2<u16>),
            prop!(Arrays, "Arrays", "FlatCube", flat_cube, Array3<bool>),
            prop!(Arrays, "Arrays", "InnerEmpty", inner_empty, Array3<Decimal>),
        ]
    }
}

fn sample() -> Everything {
    let offset = FixedOffset::west_opt(7 * 3600).expect("offset");
    Everything {
        text: "  <tag> & \"quotes\" 'n' ünïcode  ".to_string(),
        flag: true,
        tiny: i8::MIN,
        short: -12_345,
        int: i32::MAX,
        long: i64::MIN,
        byte: u8::MAX,
        ushort: 65_000,
        uint: 4_000_000_000,
        ulong: u64::MAX,
        big: "340282366920938463463374607431768211456000".parse().expect("bigint"),
        single: -3.402_823_5e38,
        double: std::f64::consts::PI,
        money: "1234567.8900".parse().expect("decimal"),
        id: Uuid::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210),
        span: -(TimeDelta::days(3) + TimeDelta::nanoseconds(42)),
        local: offset
            .with_ymd_and_hms(1999, 12, 31, 23, 59, 59)
            .single()
            .expect("instant"),
        utc: Utc
            .timestamp_opt(4_102_444_800, 999_999_999)
            .single()
            .expect("instant"),
    }
}

fn registry() -> Arc<DescriptorRegistry> {
    let registry = Arc::new(DescriptorRegistry::new());
    registry.register::<Everything>().expect("register");
    registry.register::<Arrays>().expect("register");
    registry
}

/// Commit `source`, serialize, read back into a fresh store and update a
/// default instance from it.
fn through_xml<T>(source: &T, codec: &XmlCodec) -> T
where
    T: PropertySource + Default,
{
    let registry = registry();
    let mut store = ConfigurationStore::new(Arc::clone(&registry));
    store.commit(&[source], None).expect("commit");

    let xml = codec
        .serialize_to_string(store.as_map(), &registry)
        .expect("serialize");
    let restored = ConfigurationStore::from_xml(Arc::clone(&registry), codec, xml.as_bytes())
        .expect("deserialize");

    let mut target = T::default();
    let report = restored.update(&mut [&mut target], None).expect("update");
    assert!(report.is_clean(), "{:?}\n{}", report, xml);
    target
}

#[test]
fn every_scalar_kind_round_trips() {
    let source = sample();
    assert_eq!(through_xml(&source, &XmlCodec::default()), source);
}

#[test]
fn every_scalar_kind_round_trips_compact() {
    let codec = XmlCodec::new(CodecConfig::builder().indent(0).build());
    let source = sample();
    assert_eq!(through_xml(&source, &codec), source);
}

#[test]
fn implicit_zeros_round_trip_as_absent() {
    let registry = registry();
    let mut store = ConfigurationStore::new(Arc::clone(&registry));
    store.commit(&[&Everything::default()], None).expect("commit");

    // Only the string survives: it has no implicit zero.
    assert_eq!(store.keys().collect::<Vec<_>>(), vec!["Text.Text"]);

    let codec = XmlCodec::default();
    let xml = codec
        .serialize_to_string(store.as_map(), &registry)
        .expect("serialize");
    let decoded = codec.deserialize_str(&xml, &registry).expect("deserialize");
    assert_eq!(&decoded, store.as_map());
    assert_eq!(
        through_xml(&Everything::default(), &codec),
        Everything::default()
    );
}

#[test]
fn randomized_numbers_round_trip() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let codec = XmlCodec::default();
    for _ in 0..100 {
        let source = Everything {
            single: loop {
                let v = f32::from_bits(rng.u32(..));
                if v.is_finite() {
                    break v;
                }
            },
            double: loop {
                let v = f64::from_bits(rng.u64(..));
                if v.is_finite() {
                    break v;
                }
            },
            long: rng.i64(..),
            ulong: rng.u64(..),
            short: rng.i16(..),
            money: Decimal::new(rng.i64(..), rng.u32(0..=28)),
            span: TimeDelta::nanoseconds(rng.i64(..)),
            ..sample()
        };
        assert_eq!(through_xml(&source, &codec), source);
    }
}

#[test]
fn special_floats_round_trip() {
    let codec = XmlCodec::default();
    for (single, double) in [
        (f32::INFINITY, f64::NEG_INFINITY),
        (f32::MIN_POSITIVE, f64::MIN_POSITIVE),
        (-0.0, 5e-324),
    ] {
        let source = Everything {
            single,
            double,
            ..sample()
        };
        assert_eq!(through_xml(&source, &codec), source);
    }

    let source = Everything {
        double: f64::NAN,
        ..sample()
    };
    assert!(through_xml(&source, &codec).double.is_nan());
}

#[test]
fn instants_beyond_four_digit_years_round_trip() {
    let codec = XmlCodec::default();
    let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("offset");
    let source = Everything {
        local: offset
            .with_ymd_and_hms(-1, 3, 1, 8, 0, 0)
            .single()
            .expect("instant"),
        utc: Utc
            .with_ymd_and_hms(10000, 1, 1, 0, 0, 0)
            .single()
            .expect("instant")
            + TimeDelta::microseconds(5),
        ..sample()
    };
    let back = through_xml(&source, &codec);
    assert_eq!(back, source);
    assert_eq!(back.local.offset(), source.local.offset());
}

#[test]
fn arrays_of_rank_one_to_three_round_trip() {
    let source = Arrays {
        list: vec![1, -2, i64::MAX],
        matrix: Array::from_shape_vec((2, 3), vec![0.5, -1.25, 3.0, 1e-9, 0.0, 7.75])
            .expect("shape"),
        cube: Array::from_shape_fn((2, 2, 2), |(i, j, k)| format!("<{}{}{}> &", i, j, k)),
        hollow: Array2::zeros((3, 0)),
        flat_cube: Array3::from_elem((2, 0, 4), true),
        inner_empty: Array3::zeros((2, 3, 0)),
    };
    assert_eq!(through_xml(&source, &XmlCodec::default()), source);
}

#[test]
fn empty_arrays_are_not_written() {
    let registry = registry();
    let mut store = ConfigurationStore::new(Arc::clone(&registry));
    store.commit(&[&Arrays::default()], None).expect("commit");
    assert!(store.is_empty());

    // Written explicitly, empty arrays are still dropped by the codec.
    for (key, value) in [
        ("Arrays.List", Vec::<i64>::new().into_value()),
        ("Arrays.Matrix", Array2::<f64>::zeros((0, 0)).into_value()),
        ("Arrays.FlatCube", Array3::from_elem((0, 0, 0), false).into_value()),
    ] {
        store.set(key, value).expect("set");
    }

    let codec = XmlCodec::new(CodecConfig::builder().xml_declaration(false).build());
    let xml = codec
        .serialize_to_string(store.as_map(), &registry)
        .expect("serialize");
    assert_eq!(xml, "<Configuration/>");
}

#[test]
fn stream_round_trip_through_file() {
    let registry = registry();
    let codec = XmlCodec::default();
    let mut store = ConfigurationStore::new(Arc::clone(&registry));
    store.commit(&[&sample()], None).expect("commit");

    let mut file = tempfile::tempfile().expect("tempfile");
    store.save_xml(&codec, &mut file).expect("save");
    file.seek(SeekFrom::Start(0)).expect("rewind");

    let loaded = ConfigurationStore::from_xml(Arc::clone(&registry), &codec, BufReader::new(file))
        .expect("load");
    assert_eq!(loaded.as_map(), store.as_map());
}
