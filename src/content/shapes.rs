//! Derived shapes built from the primitive path operators: circles,
//! ellipses, rounded rectangles, and polygons, all expressed as a
//! sequence of `move_to`/`curve_to`/`line_to` calls so they share the
//! same path-state tracking as hand-drawn paths.

use crate::content::ContentStreamBuilder;
use crate::error::PdfError;
use crate::geometry::{point, Point, KAPPA};

/// Approximates a full ellipse with four cubic Bézier quadrants, the
/// standard `KAPPA`-constant construction.
pub fn ellipse(
    builder: &mut ContentStreamBuilder,
    center: Point,
    rx: f64,
    ry: f64,
) -> Result<(), PdfError> {
    let (cx, cy) = (center.x, center.y);
    let kx = rx * KAPPA;
    let ky = ry * KAPPA;

    builder.move_to(point(cx + rx, cy))?;
    builder.curve_to(
        point(cx + rx, cy + ky),
        point(cx + kx, cy + ry),
        point(cx, cy + ry),
    )?;
    builder.curve_to(
        point(cx - kx, cy + ry),
        point(cx - rx, cy + ky),
        point(cx - rx, cy),
    )?;
    builder.curve_to(
        point(cx - rx, cy - ky),
        point(cx - kx, cy - ry),
        point(cx, cy - ry),
    )?;
    builder.curve_to(
        point(cx + kx, cy - ry),
        point(cx + rx, cy - ky),
        point(cx + rx, cy),
    )?;
    builder.close_path()
}

pub fn circle(builder: &mut ContentStreamBuilder, center: Point, radius: f64) -> Result<(), PdfError> {
    ellipse(builder, center, radius, radius)
}

/// A rectangle with circular-arc corners. `radius` is clamped to half
/// the shorter side so opposing arcs never overlap.
pub fn rounded_rectangle(
    builder: &mut ContentStreamBuilder,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    radius: f64,
) -> Result<(), PdfError> {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    let k = r * KAPPA;

    builder.move_to(point(x + r, y))?;
    builder.line_to(point(x + width - r, y))?;
    builder.curve_to(
        point(x + width - r + k, y),
        point(x + width, y + r - k),
        point(x + width, y + r),
    )?;
    builder.line_to(point(x + width, y + height - r))?;
    builder.curve_to(
        point(x + width, y + height - r + k),
        point(x + width - r + k, y + height),
        point(x + width - r, y + height),
    )?;
    builder.line_to(point(x + r, y + height))?;
    builder.curve_to(
        point(x + r - k, y + height),
        point(x, y + height - r + k),
        point(x, y + height - r),
    )?;
    builder.line_to(point(x, y + r))?;
    builder.curve_to(
        point(x, y + r - k),
        point(x + r - k, y),
        point(x + r, y),
    )?;
    builder.close_path()
}

/// A closed straight-edged polygon from `points`. Fails `PathStateViolation`
/// indirectly through `line_to` if fewer than 2 points are given, since
/// there is nothing to draw between a single point and itself.
pub fn polygon(builder: &mut ContentStreamBuilder, points: &[Point]) -> Result<(), PdfError> {
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        builder.move_to(*first)?;
        for p in iter {
            builder.line_to(*p)?;
        }
        builder.close_path()?;
    }
    Ok(())
}
