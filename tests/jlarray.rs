//! Tests for the rank-erased adaptor.

use jltensor::{
    compute_contiguous_strides, Error, Heap, HeapConfig, JlArray, Layout, NativeType, Runtime,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn heap() -> Heap {
    Heap::new(HeapConfig::default())
}

fn random_shape(rng: &mut StdRng) -> Vec<usize> {
    let rank = rng.gen_range(0..=5);
    (0..rank).map(|_| rng.gen_range(0..=4)).collect()
}

#[test]
fn test_allocate_reports_shape_and_size() {
    let heap = heap();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let shape = random_shape(&mut rng);
        let a = JlArray::<f32>::from_shape_with_runtime(&shape, heap.clone()).unwrap();

        assert_eq!(a.shape(), shape);
        assert_eq!(a.dimension(), shape.len());
        assert_eq!(a.size(), shape.iter().product::<usize>());
        assert_eq!(a.data().len(), a.size());
        assert!(a.iter().all(|&x| x == 0.0));
    }
}

#[test]
fn test_layout_law() {
    let heap = heap();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..50 {
        let shape = random_shape(&mut rng);
        let a = JlArray::<u16>::from_shape_with_runtime(&shape, heap.clone()).unwrap();
        let strides = a.strides();
        let backstrides = a.backstrides();

        assert_eq!(a.layout(), Layout::ColumnMajor);
        assert_eq!(strides, compute_contiguous_strides(&shape).as_slice());
        for d in 0..shape.len() {
            let expected = if d == 0 { 1 } else { strides[d - 1] * shape[d - 1] };
            assert_eq!(strides[d], expected, "stride {} of {:?}", d, shape);
            assert_eq!(backstrides[d], shape[d].saturating_sub(1) * strides[d]);
        }
    }
}

#[test]
fn test_nested_literal_scenario() {
    let heap = heap();
    let lit = [
        [[0, 1, 2], [3, 4, 5], [6, 7, 8]],
        [[9, 10, 11], [12, 13, 14], [15, 16, 17]],
    ];
    let t = JlArray::<i32>::from_nested_with_runtime(lit, heap).unwrap();

    assert_eq!(t.dimension(), 3);
    assert_eq!(t.shape(), [2, 3, 3]);
    assert_eq!(t.shape()[0], 2);
    assert_eq!(t[[0, 0, 1]], 1);
    assert_eq!(t[[1, 2, 0]], 15);
    // first index fastest in storage
    assert_eq!(&t.as_slice()[..4], &[0, 9, 3, 12]);
}

#[test]
fn test_reshape_keeps_buffer() {
    let heap = heap();
    let mut a = JlArray::<f64>::from_nested_with_runtime([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], heap)
        .unwrap();
    let before = a.as_slice().to_vec();
    let ptr = a.raw_data();

    a.reshape(&[1, 6]).unwrap();
    assert_eq!(a.shape(), [1, 6]);
    assert_eq!(a.raw_data(), ptr);
    assert_eq!(a.as_slice(), before.as_slice());
    assert_eq!(a[[0, 1]], 4.0);

    let err = a.reshape(&[10, 10]).unwrap_err();
    assert_eq!(
        err,
        Error::SizeMismatch {
            shape: vec![10, 10],
            current: 6,
            requested: 100
        }
    );
    assert_eq!(a.shape(), [1, 6]);
    assert_eq!(a.raw_data(), ptr);
}

#[test]
fn test_reshape_iff_sizes_match() {
    let heap = heap();
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..50 {
        let from = random_shape(&mut rng);
        let to = random_shape(&mut rng);
        let mut a = JlArray::<i8>::from_shape_with_runtime(&from, heap.clone()).unwrap();
        let same_size = from.iter().product::<usize>() == to.iter().product::<usize>();

        assert_eq!(a.reshape(&to).is_ok(), same_size, "{:?} -> {:?}", from, to);
        let expected = if same_size { &to } else { &from };
        assert_eq!(a.shape().to_vec(), *expected);
    }
}

#[test]
fn test_reshape_to_overflowing_shape() {
    let heap = heap();
    let mut a = JlArray::<u8>::from_shape_with_runtime(&[2, 3], heap.clone()).unwrap();
    let err = a.reshape(&[usize::MAX, 2]).unwrap_err();
    assert_eq!(
        err,
        Error::SizeMismatch {
            shape: vec![usize::MAX, 2],
            current: 6,
            requested: usize::MAX,
        }
    );
    assert_eq!(a.shape(), [2, 3]);

    // a zero extent makes the product 0 whatever the others are
    let mut empty = JlArray::<u8>::from_shape_with_runtime(&[0], heap.clone()).unwrap();
    empty.reshape(&[usize::MAX, 2, 0]).unwrap();
    assert_eq!(empty.shape(), [usize::MAX, 2, 0]);
    assert_eq!(empty.size(), 0);
    assert!(empty.iter().next().is_none());
    assert_eq!(heap.root_depth(), 0);
}

#[test]
fn test_reshape_releases_previous_handle() {
    let heap = heap();
    let mut a = JlArray::<i64>::from_shape_with_runtime(&[4, 3], heap.clone()).unwrap();
    let old = a.wrapped();

    a.reshape(&[12]).unwrap();
    assert_eq!(heap.preserve_count(old), 0);
    assert_eq!(heap.preserve_count(a.wrapped()), 1);

    a.as_mut_slice()[11] = 5;
    heap.collect();
    assert!(!heap.is_live(old));
    assert_eq!(a[[11]], 5);
}

#[test]
fn test_resize_reallocates() {
    let heap = heap();
    let mut a = JlArray::<u32>::from_elem_with_runtime(&[2, 2], 9, heap.clone()).unwrap();
    let handle = a.wrapped();

    a.resize(&[2, 2]).unwrap();
    assert_eq!(a.wrapped(), handle);
    assert_eq!(a.as_slice(), &[9, 9, 9, 9]);

    a.resize(&[3, 1, 2]).unwrap();
    assert_ne!(a.wrapped(), handle);
    assert_eq!(a.shape(), [3, 1, 2]);
    assert_eq!(a.strides(), &[1, 3, 3]);
    assert_eq!(heap.preserve_count(handle), 0);
}

#[test]
fn test_deep_copy_is_independent() {
    let heap = heap();
    let a = JlArray::<i32>::from_nested_with_runtime([[1, 2], [3, 4]], heap).unwrap();
    let mut b = a.clone();

    assert_eq!(a, b);
    assert_ne!(a.wrapped(), b.wrapped());
    assert_ne!(a.raw_data(), b.raw_data());

    b[[0, 0]] = 100;
    assert_eq!(a[[0, 0]], 1);
    assert_ne!(a, b);
}

#[test]
fn test_clone_from_reuses_matching_storage() {
    let heap = heap();
    let a = JlArray::<i32>::from_nested_with_runtime([[1, 2], [3, 4]], heap.clone()).unwrap();
    let mut b = JlArray::<i32>::from_shape_with_runtime(&[2, 2], heap.clone()).unwrap();
    let handle = b.wrapped();

    b.clone_from(&a);
    assert_eq!(b, a);
    assert_eq!(b.wrapped(), handle);

    let mut c = JlArray::<i32>::from_shape_with_runtime(&[3], heap).unwrap();
    c.clone_from(&a);
    assert_eq!(c.shape(), [2, 2]);
    assert_eq!(c.as_slice(), a.as_slice());
}

#[test]
fn test_move_transfers_handle() {
    let heap = heap();
    let a = JlArray::<u8>::from_shape_with_runtime(&[5], heap.clone()).unwrap();
    let handle = a.wrapped();

    let b = a;
    assert_eq!(b.wrapped(), handle);
    assert_eq!(heap.preserve_count(handle), 1);

    drop(b);
    assert_eq!(heap.preserve_count(handle), 0);
}

#[test]
fn test_wrap_round_trip() {
    let heap = heap();
    let mut a = JlArray::<f64>::from_shape_with_runtime(&[2, 3], heap.clone()).unwrap();
    a[[1, 2]] = 2.5;

    let b = unsafe { JlArray::<f64>::from_handle(a.wrapped(), heap.clone()) }.unwrap();
    assert_eq!(b.wrapped(), a.wrapped());
    assert_eq!(b.raw_data(), a.raw_data());
    assert_eq!(b.shape(), [2, 3]);
    assert_eq!(b[[1, 2]], 2.5);
    assert_eq!(heap.preserve_count(a.wrapped()), 2);
}

#[test]
fn test_adopting_wrong_element_type() {
    let heap = heap();
    let a = JlArray::<i32>::from_shape_with_runtime(&[3], heap.clone()).unwrap();

    let err = unsafe { JlArray::<f32>::from_handle(a.wrapped(), heap.clone()) }.unwrap_err();
    assert_eq!(
        err,
        Error::ElementType {
            expected: NativeType::Float32,
            actual: NativeType::Int32
        }
    );
    assert_eq!(heap.preserve_count(a.wrapped()), 1);
}

#[test]
fn test_bounds_checked_access() {
    let heap = heap();
    let mut a = JlArray::<i16>::from_shape_with_runtime(&[2, 3], heap).unwrap();

    assert_eq!(a.get(&[1, 2]), Some(&0));
    assert_eq!(a.get(&[2, 0]), None);
    assert_eq!(a.get(&[0, 3]), None);
    *a.get_mut(&[0, 1]).unwrap() = 4;
    // a shorter index addresses the trailing axes
    assert_eq!(a[[1]], 4);
    assert_eq!(a.as_slice()[2], 4);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_index_out_of_bounds_panics() {
    let a = JlArray::<i16>::from_shape_with_runtime(&[2, 3], heap()).unwrap();
    let _value: i16 = a[[2, 0]];
}

#[test]
fn test_empty_extent() {
    let heap = heap();
    let a = JlArray::<f64>::from_shape_with_runtime(&[3, 0, 2], heap).unwrap();

    assert!(a.is_empty());
    assert_eq!(a.size(), 0);
    assert_eq!(a.backstrides(), &[2, 0, 0]);
    assert_eq!(a.iter().count(), 0);
    assert_eq!(a.get(&[0, 0, 0]), None);
}

#[test]
fn test_default_runtime_is_thread_heap() {
    let a = JlArray::<f64>::default();
    assert_eq!(a.shape(), [1]);
    assert_eq!(
        a.runtime().instance_id(),
        Heap::current().instance_id()
    );
}

#[test]
fn test_assign_expr_resizes() {
    let heap = heap();
    let src = JlArray::<i32>::from_nested_with_runtime([[1, 2, 3], [4, 5, 6]], heap.clone()).unwrap();
    let mut dst = JlArray::<i32>::from_shape_with_runtime(&[4], heap).unwrap();

    dst.assign_expr(&src).unwrap();
    assert_eq!(dst, src);
    assert_ne!(dst.wrapped(), src.wrapped());

    let copy = JlArray::from_expression_with_runtime(&src, src.runtime().clone()).unwrap();
    assert_eq!(copy, src);
}

#[test]
fn test_broadcast_shape() {
    let heap = heap();
    let a = JlArray::<u8>::from_shape_with_runtime(&[3, 1], heap).unwrap();

    let mut target = vec![1, 1, 4];
    assert!(!a.broadcast_shape(&mut target).unwrap());
    assert_eq!(target, vec![1, 3, 4]);

    let mut same = vec![3, 1];
    assert!(a.broadcast_shape(&mut same).unwrap());

    let mut bad = vec![2, 4];
    assert!(a.broadcast_shape(&mut bad).is_err());
}

#[test]
fn test_debug_names_kind() {
    let a = JlArray::<i32>::from_nested_with_runtime([1, 2], heap()).unwrap();
    let debug = format!("{:?}", a);
    assert!(debug.starts_with("JlArray"));
    assert!(debug.contains("shape: [2]"));
    assert!(debug.contains("data: [1, 2]"));
}
