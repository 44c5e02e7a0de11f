use crate::{
    lattice::Axis,
    lines::{LineSet, Segment},
};
use serde::Serialize;

/// Wire form of a [LineSet]: one array of `[[x, y, z], [x, y, z]]` segments
/// per group
#[derive(Serialize)]
struct JsonLines<'a> {
    x: &'a [Segment],
    y: &'a [Segment],
    z: &'a [Segment],
}

/// Serialize a line set as JSON. Slots that were counted but never filled
/// come out as `null` coordinates.
pub fn to_json(lines: &LineSet) -> anyhow::Result<String> {
    let json = JsonLines {
        x: lines.group(Axis::X),
        y: lines.group(Axis::Y),
        z: lines.group(Axis::Z),
    };
    Ok(serde_json::to_string(&json)?)
}
