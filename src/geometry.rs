//! Shared geometry types, re-exporting `euclid` types under a single
//! unit marker rather than hand-rolling a matrix/point/rect trio —
//! everything in this crate lives in PDF user space (1 unit = 1/72
//! inch), so there is no separate device-pixel space to keep distinct.

use euclid::{Length, Point2D, Rect, Size2D, Transform2D};

/// Unit marker for PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserSpace;

pub type Pt = Length<f64, UserSpace>;
pub type Point = Point2D<f64, UserSpace>;
pub type Size = Size2D<f64, UserSpace>;
pub type PdfRect = Rect<f64, UserSpace>;

/// The current transformation matrix: a 3×3 affine with an implicit
/// bottom row of `[0 0 1]`, i.e. the 6 values `a b c d e f` of the `cm`
/// operator.
pub type Matrix = Transform2D<f64, UserSpace, UserSpace>;

pub fn point(x: f64, y: f64) -> Point {
    Point2D::new(x, y)
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> PdfRect {
    Rect::new(Point2D::new(x, y), Size2D::new(width, height))
}

pub fn matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Matrix {
    Transform2D::new(a, b, c, d, e, f)
}

pub fn identity() -> Matrix {
    Transform2D::identity()
}

/// The circle-arc Bézier constant used to approximate a quarter circle
/// with a single cubic segment.
pub const KAPPA: f64 = 0.5522847498;
