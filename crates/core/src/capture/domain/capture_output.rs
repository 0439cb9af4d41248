/// The two outputs a capture session can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Per-frame pixel buffers.
    VideoData,
    /// Detected objects, delivered independently of frames.
    Metadata,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::VideoData => write!(f, "video data"),
            OutputKind::Metadata => write!(f, "metadata"),
        }
    }
}
