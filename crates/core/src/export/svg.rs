use crate::{
    lattice::Axis,
    lines::{LineSet, Segment},
};
use svg::{
    node::element::{Group, Line},
    Document,
};

/// Stroke color for each line group
const GROUP_COLORS: [&str; 3] = ["#d8504a", "#4aa05a", "#4a70d8"];

/// Space left around the drawing, in world units
const MARGIN: f64 = 0.5;

/// Render line sets as a top-down orthographic SVG. World X maps to the
/// right and world Y maps up; Z is dropped. Each group gets its own color.
pub fn to_svg(sets: &[&LineSet]) -> Document {
    let points = sets
        .iter()
        .flat_map(|lines| lines.iter())
        .flat_map(|(_, segment)| segment.iter())
        .filter(|p| p.x.is_finite() && p.y.is_finite());
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for p in points {
        // SVG's Y axis points down
        let (x, y) = (p.x, -p.y);
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => {
                (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
            }
        });
    }
    let (x0, y0, x1, y1) = bounds.unwrap_or((0.0, 0.0, 0.0, 0.0));

    let mut document = Document::new().set(
        "viewBox",
        (
            x0 - MARGIN,
            y0 - MARGIN,
            x1 - x0 + MARGIN * 2.0,
            y1 - y0 + MARGIN * 2.0,
        ),
    );
    for lines in sets {
        for axis in Axis::ALL {
            document = document.add(draw_group(axis, lines.group(axis)));
        }
    }
    document
}

fn draw_group(axis: Axis, segments: &[Segment]) -> Group {
    let mut group = Group::new()
        .set("stroke", GROUP_COLORS[axis.index()])
        .set("stroke-width", 1)
        .set("vector-effect", "non-scaling-stroke");
    for [from, to] in segments {
        group = group.add(
            Line::new()
                .set("x1", from.x)
                .set("y1", -from.y)
                .set("x2", to.x)
                .set("y2", -to.y),
        );
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_to_svg() {
        let mut lines = LineSet::new();
        lines.resize([1, 1, 0]);
        let mut writer = lines.writer();
        let origin = Point3::origin();
        writer.push(Axis::X, origin, Point3::new(2.0, 0.0, 0.0));
        writer.push(Axis::Y, origin, Point3::new(0.0, 1.0, 5.0));

        let svg = to_svg(&[&lines]).to_string();
        assert!(svg.contains(r#"viewBox="-0.5 -1.5 3 2""#), "{}", svg);
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains(GROUP_COLORS[1]));
    }
}
