pub mod capture {
    pub mod domain {
        pub mod capture_callbacks;
        pub mod capture_device;
        pub mod capture_error;
        pub mod capture_framework;
        pub mod capture_output;
        pub mod capture_session;
        pub mod connection;
        pub mod metadata_object;
        pub mod metadata_transform;
    }
    pub mod infrastructure;
}

pub mod processing {
    pub mod domain {
        pub mod frame_processor;
    }
    pub mod infrastructure;
}

pub mod display {
    pub mod domain {
        pub mod display_sink;
        pub mod readout_surface;
    }
    pub mod infrastructure;
}

pub mod session {
    pub mod frame_bridge;
    pub mod session_config;
    pub mod session_coordinator;
    pub mod session_error;
    pub mod session_logger;
    pub mod shared_snapshot;
}

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod pixel_format;
    pub mod region;
    pub mod session_stats;
}

#[cfg(test)]
mod test_support;
