use colored::Colorize;
use std::io::{self, Write};

const WIDTH: usize = 70;

pub fn configure_color(disabled: bool) {
    if disabled {
        colored::control::set_override(false);
    }
}

/// Coloured status lines on top of any writer.
pub struct Console {
    out: Box<dyn Write>,
}

impl Console {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn header(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(WIDTH);
        writeln!(self.out)?;
        writeln!(self.out, "{}", rule.magenta().bold())?;
        writeln!(self.out, "{}", format!("{:^width$}", title, width = WIDTH).magenta().bold())?;
        writeln!(self.out, "{}", rule.magenta().bold())?;
        writeln!(self.out)
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("✓ {}", text).green())
    }

    pub fn warning(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("⚠ {}", text).yellow())
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("✗ {}", text).red())
    }

    pub fn info(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("ℹ {}", text).cyan())
    }

    pub fn bold(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text.bold())
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// `N. label`, with the number coloured cyan (red for exit/back entries).
    pub fn item(&mut self, key: &str, label: &str) -> io::Result<()> {
        let key = format!("{}.", key);
        let key = if key == "0." { key.red() } else { key.cyan() };
        writeln!(self.out, "{} {}", key, label)
    }

    pub fn caution_item(&mut self, key: &str, label: &str, level: u8) -> io::Result<()> {
        let key = format!("{}.", key);
        let key = match level {
            0 => key.cyan(),
            1 => key.yellow(),
            _ => key.red(),
        };
        writeln!(self.out, "{} {}", key, label)
    }

    /// Raw command output, without a trailing blank line.
    pub fn output(&mut self, text: &str) -> io::Result<()> {
        let text = text.trim_end();
        if text.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}", text)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}


#[cfg(test)]
mod tests {
    use super::capture::Captured;
    use super::*;

    #[test]
    fn status_lines_carry_markers() {
        let buffer = Captured::default();
        let mut console = Console::new(Box::new(buffer.clone()));
        console.success("done").unwrap();
        console.error("boom").unwrap();
        console.header("Title").unwrap();
        let text = buffer.text();
        assert!(text.contains("✓ done"));
        assert!(text.contains("✗ boom"));
        assert!(text.contains("Title"));
    }
}
