use std::io::IsTerminal;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

/// Check if stdout is a terminal (for color support)
pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Show only the first characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}

/// Human readable duration for a number of minutes
pub fn format_minutes(minutes: f64) -> String {
    if minutes < 1.0 {
        "less than a minute".to_string()
    } else if minutes < 120.0 {
        format!("{:.0} minutes", minutes)
    } else if minutes < 48.0 * 60.0 {
        format!("{:.1} hours", minutes / 60.0)
    } else {
        format!("{:.1} days", minutes / (24.0 * 60.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefgh"), "abcd****");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.2), "less than a minute");
        assert_eq!(format_minutes(45.0), "45 minutes");
        assert_eq!(format_minutes(180.0), "3.0 hours");
        assert_eq!(format_minutes(3.0 * 24.0 * 60.0), "3.0 days");
    }

    #[test]
    fn test_paint() {
        assert_eq!(paint("x", Color::BOLD, false), "x");
        assert_eq!(paint("x", Color::BOLD, true), "\x1b[1mx\x1b[0m");
    }
}
