use super::AvlTreeMap;

use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Get(u16),
}

// Small key space so removals and overwrites hit existing keys often.
fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = 0u16..512;
    let op = prop_oneof![
        50 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        35 => key.clone().prop_map(Op::Remove),
        15 => key.prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=1500)
}

fn height_bound(len: usize) -> f64 {
    1.4405 * ((len + 2) as f64).log2()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: AvlTreeMap<u16, u32> = AvlTreeMap::new();
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(t.insert(key, value), m.insert(key, value));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                    prop_assert!(!t.contains_key(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.validate(), Ok(()));
            prop_assert!((t.height() as f64) <= height_bound(t.len()));
        }

        let got: Vec<(u16, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);

        let got: Vec<u16> = t.keys().rev().copied().collect();
        let expected: Vec<u16> = m.keys().rev().copied().collect();
        prop_assert_eq!(got, expected);

        let got: Vec<(u16, u32)> = t.into_iter().collect();
        let expected: Vec<(u16, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_remove_leaves_other_values(
        keys in prop::collection::btree_set(any::<i32>(), 1..200),
        pick in any::<prop::sample::Index>(),
    ) {
        let keys: Vec<i32> = keys.into_iter().collect();
        let mut t: AvlTreeMap<i32, i64> = keys.iter().map(|&k| (k, i64::from(k) * 3)).collect();
        let removed = keys[pick.index(keys.len())];

        prop_assert_eq!(t.remove(&removed), Some(i64::from(removed) * 3));
        prop_assert!(t.get(&removed).is_none());
        prop_assert!(t.is_height_balanced());
        for &k in keys.iter().filter(|&&k| k != removed) {
            prop_assert_eq!(t.get(&k), Some(&(i64::from(k) * 3)));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<i32> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let mut t = AvlTreeMap::new();
        for (i, k) in perm.iter().enumerate() {
            assert_eq!(t.insert(*k, i), None);
            assert_eq!(t.validate(), Ok(()), "insert order {perm:?}");
        }
        assert!(t.height() <= 4, "insert order {perm:?}");
        assert!(t.keys().copied().eq(keys.iter().copied()));
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<i32> = (1..=7).collect();

    // Insert in a fixed order, then remove in all permutations.
    let base: AvlTreeMap<i32, i32> = [4, 2, 6, 1, 3, 5, 7].iter().map(|&k| (k, -k)).collect();

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        let mut m: BTreeMap<i32, i32> = keys.iter().map(|&k| (k, -k)).collect();
        for k in &perm {
            assert_eq!(t.remove(k), m.remove(k));
            assert_eq!(t.validate(), Ok(()), "remove order {perm:?}");
            assert!(t.iter().map(|(k, v)| (*k, *v)).eq(m.iter().map(|(k, v)| (*k, *v))));
        }
        assert!(t.is_empty());
    });
}
