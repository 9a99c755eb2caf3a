use core::fmt::Display;

/// A character display that is redrawn as a whole.
pub trait TextDisplay {
    type Error: Display;

    /// Characters per line.
    fn columns(&self) -> usize;

    /// Clears the screen and draws `lines` from the top left corner.
    fn show(&mut self, lines: &[String]) -> Result<(), Self::Error>;
}
