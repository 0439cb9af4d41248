pub mod logging_frame_processor;
