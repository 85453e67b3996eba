/// Terminal color codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Default,
    Green,
    Yellow,
    Blue,
    Magenta,
}

impl Color {
    pub fn to_ansi(&self) -> &str {
        match self {
            Color::Default => "\x1b[0m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Blue => "\x1b[34m",
            Color::Magenta => "\x1b[35m",
        }
    }

    /// Wrap `text` in this color followed by a reset
    pub fn paint(&self, text: &str) -> String {
        format!("{}{}{}", self.to_ansi(), text, Color::Default.to_ansi())
    }
}
