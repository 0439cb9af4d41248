//! Maps metadata from normalized capture space onto frame pixels.
//!
//! Order matters: rotate first, then mirror, then scale to the frame and
//! clamp. This matches how a connection produces the frame in the first place.

use crate::capture::domain::connection::{Connection, Rotation};
use crate::capture::domain::metadata_object::MetadataObject;
use crate::shared::region::{NormalizedRect, Region};

pub fn transform_to_frame(
    object: &MetadataObject,
    connection: &Connection,
    frame_w: u32,
    frame_h: u32,
) -> Region {
    let rotated = rotate(object.bounds, connection.rotation);
    let oriented = if connection.mirrored {
        mirror(rotated)
    } else {
        rotated
    };

    let x1 = to_pixel(oriented.x, frame_w);
    let y1 = to_pixel(oriented.y, frame_h);
    let x2 = to_pixel(oriented.max_x(), frame_w);
    let y2 = to_pixel(oriented.max_y(), frame_h);

    Region::new(x1, y1, (x2 - x1).max(0), (y2 - y1).max(0)).with_face_id(object.face_id)
}

/// Scales a normalized coordinate onto `[0, extent]` pixels.
///
/// Clamping happens before the cast so unbounded input can never overflow
/// the pixel arithmetic. NaN maps to zero.
fn to_pixel(normalized: f64, extent: u32) -> i32 {
    let extent = extent.min(i32::MAX as u32) as f64;
    (normalized * extent).round().clamp(0.0, extent) as i32
}

/// Transforms every face in `objects`, skipping other object types.
pub fn faces_to_frame(
    objects: &[MetadataObject],
    connection: &Connection,
    frame_w: u32,
    frame_h: u32,
) -> Vec<Region> {
    objects
        .iter()
        .filter(|o| o.is_face())
        .map(|o| transform_to_frame(o, connection, frame_w, frame_h))
        .collect()
}

fn rotate(r: NormalizedRect, rotation: Rotation) -> NormalizedRect {
    match rotation {
        Rotation::None => r,
        // (x, y) -> (1 - y, x)
        Rotation::Clockwise90 => NormalizedRect::new(1.0 - r.max_y(), r.x, r.height, r.width),
        Rotation::Half => NormalizedRect::new(1.0 - r.max_x(), 1.0 - r.max_y(), r.width, r.height),
        // (x, y) -> (y, 1 - x)
        Rotation::Clockwise270 => NormalizedRect::new(r.y, 1.0 - r.max_x(), r.height, r.width),
    }
}

fn mirror(r: NormalizedRect) -> NormalizedRect {
    NormalizedRect::new(1.0 - r.max_x(), r.y, r.width, r.height)
}
