//! Unit tests for the cost matrix view.

use cvrp_ls::{Error, Matrix};

#[test]
fn test_matrix_construction_and_access() {
    let matrix = Matrix::new(vec![vec![0, 1, 2], vec![3, 0, 5], vec![6, 7, 0]]).unwrap();

    assert_eq!(matrix.size(), 3);
    assert_eq!(matrix.get(0, 1), 1);
    assert_eq!(matrix.get(1, 2), 5);
    assert_eq!(matrix.get(2, 0), 6);
    assert_eq!(matrix.get(2, 2), 0);
}

#[test]
fn test_matrix_rejects_ragged_rows() {
    let result = Matrix::new(vec![vec![0, 1], vec![1, 0, 2]]);

    match result {
        Err(Error::InvalidInput(_)) => {}
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_sub_matrix_extraction() {
    let matrix = Matrix::new(vec![
        vec![0, 1, 2, 3],
        vec![10, 0, 12, 13],
        vec![20, 21, 0, 23],
        vec![30, 31, 32, 0],
    ])
    .unwrap();

    // Sub-matrix over rows/columns 1 and 3, in order.
    let sub = matrix.sub_matrix(&[1, 3]);

    assert_eq!(sub.size(), 2);
    assert_eq!(sub.get(0, 0), 0);
    assert_eq!(sub.get(0, 1), 13);
    assert_eq!(sub.get(1, 0), 31);
    assert_eq!(sub.get(1, 1), 0);
}

#[test]
fn test_sub_matrix_preserves_index_order() {
    let matrix = Matrix::new(vec![vec![0, 5, 9], vec![5, 0, 7], vec![9, 7, 0]]).unwrap();

    // Indices out of natural order select the permuted sub-matrix.
    let sub = matrix.sub_matrix(&[2, 0]);

    assert_eq!(sub.get(0, 1), 9);
    assert_eq!(sub.get(1, 0), 9);
}
