mod common;

use balanced_trees::red_black_tree::{Color, RedBlackSet};
use rand::{thread_rng, Rng};
use std::collections::BTreeSet;

#[test]
fn int_test_red_black_insert_scenario() {
    common::init_logger();

    let mut set = RedBlackSet::new();
    for key in &[10, 40, 30, 60, 90, 70, 20, 50, 80] {
        assert!(set.insert(*key));
        assert_eq!(set.validate(), Ok(()));
    }

    assert_eq!(set.root_color(), Some(Color::Black));
    assert_eq!(
        set.iter().cloned().collect::<Vec<u32>>(),
        vec![10, 20, 30, 40, 50, 60, 70, 80, 90],
    );
    assert_eq!(set.black_height(), 1);
}

#[test]
fn int_test_red_black_remove_scenario() {
    common::init_logger();

    let mut set: RedBlackSet<u32> = vec![10, 40, 30, 60, 90, 70, 20, 50, 80]
        .into_iter()
        .collect();
    assert_eq!(set.remove(&30), Some(30));
    assert_eq!(set.validate(), Ok(()));

    assert_eq!(
        set.iter().cloned().collect::<Vec<u32>>(),
        vec![10, 20, 40, 50, 60, 70, 80, 90],
    );
    assert_eq!(
        set.pre_order().collect::<Vec<(&u32, Color)>>(),
        vec![
            (&40, Color::Black),
            (&10, Color::Black),
            (&20, Color::Red),
            (&60, Color::Red),
            (&50, Color::Black),
            (&80, Color::Black),
            (&70, Color::Red),
            (&90, Color::Red),
        ],
    );
    assert_eq!(set.black_height(), 1);
}

#[test]
fn int_test_red_black_duplicate_insert_is_rejected() {
    common::init_logger();

    let mut set = RedBlackSet::new();
    for key in &[5, 3, 5, 8, 3, 5] {
        set.insert(*key);
    }
    assert_eq!(set.len(), 3);
    assert_eq!(set.iter().cloned().collect::<Vec<u32>>(), vec![3, 5, 8]);
    assert_eq!(set.validate(), Ok(()));
}

#[test]
fn int_test_red_black_sequential_height_bound() {
    common::init_logger();

    let mut set = RedBlackSet::new();
    for key in 0..4_096u32 {
        set.insert(key);
        assert_eq!(set.root_color(), Some(Color::Black));
    }
    assert_eq!(set.validate(), Ok(()));
    // 2 * log2(n + 1) bounds the height of any red black tree
    assert!(set.height() <= 24);

    for key in (0..4_096u32).rev().filter(|key| key % 4 != 0) {
        assert_eq!(set.remove(&key), Some(key));
    }
    assert_eq!(set.validate(), Ok(()));
    assert_eq!(set.len(), 1_024);
    assert!(set.height() <= 20);
}

#[test]
fn int_test_red_black_random_operations() {
    common::init_logger();

    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut set = RedBlackSet::with_chunk_size(64);
    let mut expected = BTreeSet::new();

    for _ in 0..20_000 {
        let key = rng.gen_range(0, 1_000u32);
        if rng.gen::<bool>() {
            assert_eq!(set.insert(key), expected.insert(key));
        } else {
            assert_eq!(set.remove(&key), expected.take(&key));
        }
        assert_eq!(set.validate(), Ok(()));
        assert_eq!(set.len(), expected.len());
    }

    assert!(set.iter().eq(expected.iter()));
    assert_eq!(set.min(), expected.iter().next());
    assert_eq!(set.max(), expected.iter().next_back());
    for key in 0..1_000 {
        assert_eq!(set.contains(&key), expected.contains(&key));
    }
}

#[test]
fn int_test_red_black_drain_in_random_order() {
    common::init_logger();

    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([2, 3, 5, 7]);
    let mut keys = Vec::new();
    let mut set = RedBlackSet::new();
    for _ in 0..5_000 {
        let key = rng.gen::<u32>();
        if set.insert(key) {
            keys.push(key);
        }
    }

    thread_rng().shuffle(&mut keys);

    let mut expected_len = keys.len();
    for key in keys {
        assert_eq!(set.remove(&key), Some(key));
        assert!(!set.contains(&key));
        expected_len -= 1;
        assert_eq!(set.len(), expected_len);
        assert_eq!(set.validate(), Ok(()));
    }
    assert!(set.is_empty());
    assert_eq!(set.root_color(), None);
}

#[test]
fn int_test_red_black_matches_avl_order() {
    use balanced_trees::avl_tree::AvlSet;

    common::init_logger();

    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([4, 4, 4, 4]);
    let mut red_black = RedBlackSet::new();
    let mut avl = AvlSet::new();
    for _ in 0..10_000 {
        let key = rng.gen_range(0, 500u32);
        if rng.gen_weighted_bool(3) {
            assert_eq!(red_black.remove(&key), avl.remove(&key));
        } else {
            assert_eq!(red_black.insert(key), avl.insert(key));
        }
    }
    assert!(red_black.iter().eq(avl.iter()));
    assert_eq!(red_black.validate(), Ok(()));
    assert_eq!(avl.validate(), Ok(()));
}
