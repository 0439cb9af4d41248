/// A text element showing the current blink count.
pub trait ReadoutSurface: Send {
    fn set_text(&mut self, text: &str);
}
