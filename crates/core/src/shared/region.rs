use serde::{Deserialize, Serialize};

/// A rectangle in normalized `[0, 1]` capture-space coordinates.
///
/// This is how the capture framework reports detected objects, independent
/// of the resolution and orientation frames are delivered in.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }
}

/// A face bounding box in frame pixel coordinates, ready for the processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub face_id: Option<u32>,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            face_id: None,
        }
    }

    pub fn with_face_id(mut self, face_id: Option<u32>) -> Self {
        self.face_id = face_id;
        self
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Intersects the region with a `frame_w` x `frame_h` frame.
    ///
    /// A region entirely outside the frame collapses to zero size at the
    /// nearest edge instead of going negative.
    pub fn clamp_to(&self, frame_w: u32, frame_h: u32) -> Region {
        // i64 holds any i32 sum, and the frame edges bound the results.
        let fw = i64::from(frame_w.min(i32::MAX as u32));
        let fh = i64::from(frame_h.min(i32::MAX as u32));
        let x1 = i64::from(self.x).clamp(0, fw);
        let y1 = i64::from(self.y).clamp(0, fh);
        let x2 = (i64::from(self.x) + i64::from(self.width)).clamp(0, fw);
        let y2 = (i64::from(self.y) + i64::from(self.height)).clamp(0, fh);
        Region {
            x: x1 as i32,
            y: y1 as i32,
            width: (x2 - x1).max(0) as i32,
            height: (y2 - y1).max(0) as i32,
            face_id: self.face_id,
        }
    }
}
