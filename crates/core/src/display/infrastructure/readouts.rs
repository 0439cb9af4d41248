use crate::display::domain::readout_surface::ReadoutSurface;

/// Readout for sessions nobody is watching.
pub struct NullReadout;

impl ReadoutSurface for NullReadout {
    fn set_text(&mut self, _text: &str) {}
}

/// Logs the readout, but only when the text changes.
#[derive(Default)]
pub struct LogReadout {
    last: Option<String>,
}

impl LogReadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl ReadoutSurface for LogReadout {
    fn set_text(&mut self, text: &str) {
        if self.last.as_deref() != Some(text) {
            log::info!("Blink count: {text}");
            self.last = Some(text.to_string());
        }
    }
}
