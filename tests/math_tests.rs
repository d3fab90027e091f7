use rope_natives::math::Vector3;
use approx::assert_relative_eq;

#[test]
fn test_vector3_operations() {
    let v1 = Vector3::new(1.0, 2.0, 3.0);
    let v2 = Vector3::new(4.0, 5.0, 6.0);

    assert_eq!(v1 + v2, Vector3::new(5.0, 7.0, 9.0));
    assert_eq!(v2 - v1, Vector3::new(3.0, 3.0, 3.0));
    assert_eq!(v1 * 2.0, Vector3::new(2.0, 4.0, 6.0));
    assert_eq!(Vector3::default(), Vector3::ZERO);
}

#[test]
fn test_manhattan_distance() {
    let origin = Vector3::ZERO;
    let p = Vector3::new(3.0, 4.0, 0.0);

    // Euclidean distance would be 5
    assert_eq!(origin.manhattan_distance(&p), 7.0);
    assert_eq!(p.manhattan_distance(&origin), 7.0);
    assert_eq!(
        Vector3::new(-2.0, 1.5, -4.0).manhattan_distance(&Vector3::new(1.0, -1.5, 4.0)),
        14.0
    );
}

#[test]
fn test_lerp() {
    let a = Vector3::new(0.0, 0.0, 10.0);
    let b = Vector3::new(4.0, 0.0, 2.0);

    assert_eq!(a.lerp(&b, 0.0), a);
    assert_eq!(a.lerp(&b, 1.0), b);
    assert_relative_eq!(a.lerp(&b, 0.25), Vector3::new(1.0, 0.0, 8.0));
}

#[test]
fn test_nalgebra_conversions() {
    let v = Vector3::new(1.5, -2.0, 0.25);

    let na_v: nalgebra::Vector3<f32> = v.into();
    assert_eq!(na_v, nalgebra::Vector3::new(1.5, -2.0, 0.25));
    assert_eq!(Vector3::from(na_v), v);
}

#[test]
fn test_approx_comparison() {
    let a = Vector3::new(0.1 + 0.2, 1.0, 1.0);
    let b = Vector3::new(0.3, 1.0, 1.0);
    assert_relative_eq!(a, b);
    assert_relative_eq!(a, Vector3::new(0.31, 1.0, 1.0), epsilon = 0.02);
}
