#![cfg(test)]

use std::sync::Arc;

use colvec::buffer::{BufferAllocator, RootAllocator};
use colvec::dtype::{DType, MinorType, PType};
use colvec::error::ColvecError;
use colvec::{
    NegativeSizePolicy, PromotableWriter, ReaderOptions, UnionHolder, Value, ValueVector, Vector,
    WriterOptions, WriterState,
};
use itertools::Itertools;
use rstest::rstest;

fn allocator() -> Arc<RootAllocator> {
    Arc::new(RootAllocator::new())
}

fn strings(values: &[&str]) -> Value {
    Value::List(values.iter().map(|v| Value::from(*v)).collect())
}

#[test]
fn fixed_size_list_rows_never_spill() {
    let mut vector = Vector::try_new("f", &DType::FixedSizeList(3), allocator()).unwrap();
    let mut writer = vector.writer().into_fixed_size_list(3).unwrap();

    writer.start_list().unwrap();
    writer.write_int(1).unwrap();
    writer.write_int(2).unwrap();
    writer.end_list().unwrap();

    writer.start_list().unwrap();
    writer.write_int(9).unwrap();
    writer.write_int(8).unwrap();
    writer.write_int(7).unwrap();
    let err = writer.write_int(6).unwrap_err();
    assert!(matches!(
        err,
        ColvecError::RowOverflow {
            row: 1,
            list_size: 3,
            slot: 6,
            ..
        }
    ));
    writer.end_list().unwrap();

    assert_eq!(
        vector.get_object(0).unwrap(),
        Value::List(vec![Value::I32(1), Value::I32(2), Value::Null])
    );
    assert_eq!(
        vector.get_object(1).unwrap(),
        Value::List(vec![Value::I32(9), Value::I32(8), Value::I32(7)])
    );
    assert_eq!(vector.child_data().unwrap().value_count(), 6);
}

#[rstest]
#[case(DType::List)]
#[case(DType::LargeList)]
#[case(DType::ListView)]
#[case(DType::LargeListView)]
fn writing_one_row_leaves_the_others_alone(#[case] dtype: DType) {
    let mut vector = Vector::try_new("l", &dtype, allocator()).unwrap();
    let rows = [strings(&["a", "b"]), strings(&[]), strings(&["c"])];
    let mut writer = vector.writer();
    for (i, row) in rows.iter().enumerate() {
        writer.set_position(i);
        writer.write_value(row).unwrap();
    }

    assert_eq!(vector.value_count(), 3);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(&vector.get_object(i).unwrap(), row);
    }
    assert_eq!(vector.dtype(), dtype);
}

#[test]
fn list_view_rows_read_their_own_range() {
    let mut vector = Vector::try_new("v", &DType::ListView, allocator()).unwrap();
    {
        let mut writer = vector.writer().into_list_of(&DType::ListView).unwrap();
        writer.start_list().unwrap();
        for s in ["a", "b", "c", "d", "e"] {
            writer.write_var_char(s).unwrap();
        }
        writer.end_list().unwrap();
        writer.start_list().unwrap();
        for s in ["f", "g", "h"] {
            writer.write_var_char(s).unwrap();
        }
        writer.end_list().unwrap();
    }
    let Vector::ListView(view) = &mut vector else {
        unreachable!()
    };
    assert_eq!(view.offset(1).unwrap(), 5);
    assert_eq!(view.size(1).unwrap(), 3);
    // Overlapping and reordered ranges over the same elements.
    view.set_row(2, 3, 4).unwrap();
    view.set_row(3, 0, 2).unwrap();

    let reader = vector.reader();
    let mut list = reader.list_view(ReaderOptions::default()).unwrap();
    let mut read_row = |row: usize| {
        list.set_position(row).unwrap();
        let mut out = Vec::new();
        while list.next() {
            out.extend(list.reader().read_var_char().unwrap());
        }
        out
    };
    assert_eq!(read_row(1), ["f", "g", "h"]);
    assert_eq!(read_row(2), ["d", "e", "f", "g"]);
    assert_eq!(read_row(3), ["a", "b"]);
    assert_eq!(read_row(0), ["a", "b", "c", "d", "e"]);
}

#[test]
fn empty_lists_are_not_null() {
    let mut vector = Vector::try_new("l", &DType::LargeListView, allocator()).unwrap();
    let mut writer = vector.writer();
    writer.write_value(&strings(&[])).unwrap();
    writer.set_position(1);
    writer.write_null().unwrap();

    let reader = vector.reader();
    let mut list = reader
        .large_list_view(ReaderOptions::default())
        .unwrap();
    assert!(list.is_set());
    assert_eq!(list.size(), 0);
    assert!(!list.next());
    list.set_position(1).unwrap();
    assert!(!list.is_set());
    assert_eq!(list.size(), 0);
    assert_eq!(list.read_object().unwrap(), Value::Null);
}

#[test]
fn sequential_and_random_access_agree() {
    let mut vector = Vector::try_new("l", &DType::LargeListView, allocator()).unwrap();
    vector
        .writer()
        .write_value(&strings(&["p", "q", "r", "s"]))
        .unwrap();

    let reader = vector.reader();
    let mut sequential = reader.large_list_view(ReaderOptions::default()).unwrap();
    let mut random = sequential;
    let mut k = 0;
    while sequential.next() {
        let mut holder = UnionHolder::default();
        random.read(k, &mut holder).unwrap();
        assert!(holder.is_set);
        assert_eq!(
            holder.reader.unwrap().read_var_char().unwrap(),
            sequential.reader().read_var_char().unwrap()
        );
        k += 1;
    }
    assert_eq!(k, 4);
}

#[test]
fn list_view_elements_dispatch_on_union_types() {
    let mut vector = Vector::try_new("l", &DType::ListView, allocator()).unwrap();
    let row = Value::List(vec![Value::I32(1), Value::from("x"), Value::F64(2.5)]);
    vector.writer().write_value(&row).unwrap();
    assert_eq!(vector.child_data().unwrap().minor_type(), MinorType::Union);

    let expected = [
        (MinorType::Int, Value::I32(1)),
        (MinorType::VarChar, Value::from("x")),
        (MinorType::Float8, Value::F64(2.5)),
    ];
    let reader = vector.reader();
    let mut sequential = reader.list_view(ReaderOptions::default()).unwrap();
    let mut random = sequential;
    let mut seen = Vec::new();
    while sequential.next() {
        let element = sequential.reader();
        seen.push((element.minor_type().unwrap(), element.read_object().unwrap()));
    }
    assert_eq!(seen, expected);

    for (i, (minor_type, value)) in expected.iter().enumerate().rev() {
        let mut holder = UnionHolder::default();
        random.read(i, &mut holder).unwrap();
        assert!(holder.is_set);
        let element = holder.reader.unwrap();
        assert_eq!(element.union_type_id().unwrap(), *minor_type);
        assert_eq!(&element.read_object().unwrap(), value);
    }
    assert_eq!(random.read_object().unwrap(), row);
}

#[test]
fn promotion_keeps_every_written_value() {
    let mut vector = Vector::untyped("col", allocator());
    let values = [
        Value::I32(7),
        Value::Null,
        Value::from("seven"),
        Value::F64(7.5),
        Value::I32(8),
    ];
    let mut writer = vector.writer();
    assert_eq!(writer.state(), WriterState::Untyped);
    for (i, value) in values.iter().enumerate() {
        writer.set_position(i);
        writer.write_value(value).unwrap();
    }
    assert_eq!(writer.state(), WriterState::Union);

    let union = vector.as_union().unwrap();
    assert_eq!(
        union
            .variants()
            .iter()
            .map(|v| v.minor_type())
            .collect_vec(),
        vec![MinorType::Int, MinorType::VarChar, MinorType::Float8]
    );
    assert_eq!(union.type_id(1).unwrap(), MinorType::Null);
    for (i, value) in values.iter().enumerate() {
        assert_eq!(&vector.get_object(i).unwrap(), value);
    }
}

#[test]
fn promotion_can_be_refused() {
    let mut vector = Vector::untyped("col", allocator());
    let mut writer = PromotableWriter::new(
        &mut vector,
        WriterOptions {
            promote_to_union: false,
        },
    );
    writer.write_big_int(1).unwrap();
    writer.set_position(1);
    assert!(matches!(
        writer.write_var_char("x"),
        Err(ColvecError::UnsupportedOperation(..))
    ));
    assert_eq!(vector.minor_type(), MinorType::BigInt);
    assert_eq!(vector.value_count(), 1);
}

#[test]
fn negative_sizes_can_be_rejected() {
    let mut vector = Vector::try_new("v", &DType::ListView, allocator()).unwrap();
    vector.writer().write_value(&strings(&["a"])).unwrap();
    let Vector::ListView(view) = &mut vector else {
        unreachable!()
    };
    view.set_raw_size(0, -1).unwrap();

    let reader = vector.reader();
    assert!(matches!(
        reader.list_view(ReaderOptions {
            negative_sizes: NegativeSizePolicy::Reject,
        }),
        Err(ColvecError::CorruptEncoding(..))
    ));
    let clamped = reader.list_view(ReaderOptions::default()).unwrap();
    assert_eq!(clamped.size(), 0);
    assert_eq!(vector.get_object(0).unwrap(), Value::List(vec![]));
}

#[test]
fn holes_in_classic_lists_stay_monotonic() {
    let mut vector = Vector::try_new("l", &DType::LargeList, allocator()).unwrap();
    let mut writer = vector.writer();
    writer.write_value(&strings(&["a"])).unwrap();
    writer.set_position(4);
    writer.write_value(&strings(&["b", "c"])).unwrap();

    let Vector::LargeList(list) = &vector else {
        unreachable!()
    };
    let offsets = (0..6).map(|i| list.offset(i).unwrap()).collect_vec();
    assert_eq!(offsets, vec![0, 1, 1, 1, 1, 3]);
    assert!(offsets.iter().tuple_windows().all(|(a, b)| a <= b));
    for row in 1..4 {
        assert!(vector.is_null(row));
    }
}

#[test]
fn close_returns_every_byte() {
    let allocator = allocator();
    let mut vector = Vector::untyped("s", allocator.clone());
    vector
        .writer()
        .write_value(&Value::Struct(vec![
            ("id".into(), Value::I64(1)),
            ("tags".into(), strings(&["x", "y"])),
        ]))
        .unwrap();
    assert!(allocator.allocated_bytes() > 0);

    vector.close();
    assert_eq!(allocator.allocated_bytes(), 0);
    vector.close();
    assert_eq!(allocator.allocated_bytes(), 0);
    assert!(allocator.peak_bytes() > 0);
}

#[test]
fn allocation_beyond_the_limit_fails() {
    let allocator = Arc::new(RootAllocator::with_limit(1024));
    let mut vector = Vector::try_new("v", &PType::I64.into(), allocator.clone()).unwrap();
    assert!(matches!(
        vector.allocate_with_capacity(10_000),
        Err(ColvecError::AllocationFailure { limit: 1024, .. })
    ));
    vector.allocate_with_capacity(16).unwrap();
    assert!(allocator.allocated_bytes() <= 1024);
}

#[test]
fn schemas_rebuild_equal_vectors() {
    let mut vector = Vector::untyped("row", allocator());
    vector
        .writer()
        .write_value(&Value::Struct(vec![
            ("name".into(), Value::from("n")),
            ("scores".into(), Value::List(vec![Value::F32(1.0)])),
        ]))
        .unwrap();
    let field = vector.field();
    let rebuilt = Vector::from_field(&field, allocator()).unwrap();
    assert_eq!(rebuilt.field(), field);
    assert_eq!(rebuilt.value_count(), 0);
}

#[test]
fn readers_are_independent_copies() {
    let mut vector = Vector::try_new("v", &DType::Utf8, allocator()).unwrap();
    for (i, s) in ["a", "b", "c"].into_iter().enumerate() {
        vector.set_value(i, &Value::from(s)).unwrap();
    }
    let first = vector.reader();
    let mut second = first;
    second.set_position(2);

    let mut cursor = first;
    let seen = (0..3)
        .flat_map(|row| {
            cursor.set_position(row);
            cursor.read_var_char().unwrap()
        })
        .collect_vec();
    assert_eq!(seen, ["a", "b", "c"]);
    assert_eq!(second.read_var_char().unwrap().as_deref(), Some("c"));
    assert_eq!(first.position(), 0);
}
