pub mod discarding_display_sink;
pub mod image_sequence_sink;
pub mod readouts;
