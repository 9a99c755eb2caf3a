use std::io::Write;

use atmosphere_boi_common::display::TextDisplay;
use atmosphere_boi_common::report::OLED_COLUMNS;

/// Draws the OLED contents as a framed block of text.
pub struct TerminalDisplay<W> {
    out: W,
    columns: usize,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            columns: OLED_COLUMNS,
        }
    }
}

impl<W: Write> TextDisplay for TerminalDisplay<W> {
    type Error = std::io::Error;

    fn columns(&self) -> usize {
        self.columns
    }

    fn show(&mut self, lines: &[String]) -> Result<(), Self::Error> {
        let border = "-".repeat(self.columns);
        writeln!(self.out, "+{border}+")?;
        for line in lines {
            writeln!(self.out, "|{line:<width$}|", width = self.columns)?;
        }
        writeln!(self.out, "+{border}+")?;
        self.out.flush()
    }
}
