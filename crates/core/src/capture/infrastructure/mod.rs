pub mod replay_capture_framework;
pub mod replay_manifest;
