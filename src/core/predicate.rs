use crate::domain::model::Circle;

/// True when `(x, y)` lies inside or on the boundary of `circle`.
///
/// Compares squared distance against squared radius, so no square root is taken.
#[inline]
pub fn point_in_circle(x: f64, y: f64, circle: &Circle) -> bool {
    let dx = x - circle.center_x();
    let dy = y - circle.center_y();
    dx * dx + dy * dy <= circle.radius() * circle.radius()
}

/// True when `(x, y)` lies inside every circle. An empty set contains every point.
#[inline]
pub fn point_in_intersection(x: f64, y: f64, circles: &[Circle]) -> bool {
    circles.iter().all(|circle| point_in_circle(x, y, circle))
}
