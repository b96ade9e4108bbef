use approx::assert_abs_diff_eq;
use extremis::prelude::*;

#[test]
fn test_prelude_reductions() {
    let x = Tensor::from_vec((0..24).map(|i| i as f32 * 0.25 - 3.0).collect(), &[2, 3, 4]).unwrap();

    let max = reduce_max(&x, [1, 2], true).unwrap();
    assert_eq!(max.shape().dims(), &[2, 1, 1]);
    assert_abs_diff_eq!(max.to_vec()[..], [-0.25f32, 2.75][..]);

    let range = reduce_range(&x, -1, false).unwrap();
    assert_eq!(range.shape().dims(), &[2, 3]);
    for value in range.iter() {
        assert_abs_diff_eq!(value, 0.75);
    }
}

#[test]
fn test_dynamic_tensor() {
    let x = AnyTensor::from(Tensor::from_vec(vec![3i8, -7, 5, 0], &[4]).unwrap());
    assert_eq!(x.dtype(), DType::Int8);
    let min = x.reduce_min(AxisSpec::All, false).unwrap();
    assert_eq!(min, AnyTensor::from(Tensor::from_scalar(-7i8)));
}

#[test]
fn test_errors_are_classified() {
    let x = Tensor::from_vec(vec![true, false], &[2]).unwrap();
    let err = x.ptp(0, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(matches!(err, TensorError::UnsupportedDType { dtype: DType::Bool, .. }));
}

#[test]
fn test_version() {
    assert_eq!(extremis::version(), env!("CARGO_PKG_VERSION"));
}
