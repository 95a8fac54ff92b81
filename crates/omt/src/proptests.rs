//! Property-based op sequences, shrinking to minimal counterexamples.
//! Complements the seeded mirror harness in `omt_test`.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use proptest::prelude::*;

use crate::{Error, Omt};

/// One step of a positional workload. Indices are reduced modulo the
/// live length when applied.
#[derive(Debug, Clone)]
enum Op {
    InsertAt(usize, u32),
    DeleteAt(usize),
    SetAt(usize, u32),
    ToTree,
    ToArray,
    SplitMerge(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::InsertAt(i, v)),
        2 => any::<usize>().prop_map(Op::DeleteAt),
        2 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::SetAt(i, v)),
        1 => Just(Op::ToTree),
        1 => Just(Op::ToArray),
        1 => any::<usize>().prop_map(Op::SplitMerge),
        1 => Just(Op::Clear),
    ]
}

fn gather(omt: &Omt<u32>) -> Vec<u32> {
    let mut out = Vec::with_capacity(omt.len());
    omt.iterate(|_, v| {
        out.push(*v);
        ControlFlow::<()>::Continue(())
    });
    out
}

proptest! {
    #[test]
    fn positional_ops_match_reference(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let mut omt: Omt<u32> = Omt::new();
        let mut model: Vec<u32> = Vec::new();
        for op in ops {
            match op {
                Op::InsertAt(i, v) => {
                    let i = i % (model.len() + 1);
                    omt.insert_at(i, v).unwrap();
                    model.insert(i, v);
                }
                Op::DeleteAt(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        prop_assert_eq!(omt.delete_at(i).unwrap(), model.remove(i));
                    }
                }
                Op::SetAt(i, v) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        let old = std::mem::replace(&mut model[i], v);
                        prop_assert_eq!(omt.set_at(i, v), Ok(old));
                    }
                }
                Op::ToTree => omt.convert_to_tree(),
                Op::ToArray => omt.convert_to_array(),
                Op::SplitMerge(i) => {
                    let i = i % (model.len() + 1);
                    let right = omt.split_at(i).unwrap();
                    omt = Omt::merge(omt, right);
                }
                Op::Clear => {
                    omt.clear();
                    model.clear();
                }
            }
            omt.is_valid();
        }
        prop_assert_eq!(gather(&omt), model);
    }

    #[test]
    fn keyed_inserts_match_reference(keys in prop::collection::vec(any::<u16>(), 1..200)) {
        let mut omt: Omt<u16> = Omt::new();
        let mut model: Vec<u16> = Vec::new();
        for key in keys {
            let h = move |v: &u16| v.cmp(&key);
            match model.binary_search(&key) {
                Ok(_) => prop_assert_eq!(omt.insert(key, h), Err(Error::KeyExists)),
                Err(pos) => {
                    prop_assert_eq!(omt.insert(key, h), Ok(pos));
                    model.insert(pos, key);
                }
            }
            omt.is_valid();
        }
        let mut stored = Vec::with_capacity(omt.len());
        omt.iterate(|_, v| {
            stored.push(*v);
            ControlFlow::<()>::Continue(())
        });
        prop_assert_eq!(stored, model);
    }

    #[test]
    fn find_family_agrees_with_binary_search(
        mut values in prop::collection::vec(any::<u16>(), 0..120),
        key in any::<u16>(),
        to_tree in any::<bool>(),
    ) {
        values.sort_unstable();
        values.dedup();
        let mut omt = Omt::from_sorted_vec(values.clone());
        if to_tree {
            omt.convert_to_tree();
        }
        let h = |v: &u16| v.cmp(&key);

        match values.binary_search(&key) {
            Ok(pos) => prop_assert_eq!(omt.find_zero(h), Ok((pos, &key))),
            Err(pos) => prop_assert_eq!(omt.find_zero(h), Err(pos)),
        }

        let above = values.partition_point(|v| *v <= key);
        prop_assert_eq!(
            omt.find(crate::Direction::Greater, h),
            values.get(above).map(|v| (above, v))
        );
        let below = values.partition_point(|v| *v < key);
        prop_assert_eq!(
            omt.find(crate::Direction::Less, h),
            below.checked_sub(1).map(|i| (i, &values[i]))
        );
    }
}
