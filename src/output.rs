//! コマンド結果の1行サマリ

use owo_colors::OwoColorize;

pub struct CommandSummary {
    pub prefix: String,
    pub message: String,
}

impl CommandSummary {
    /// `arrange` の結果
    pub fn arranged(parts: usize, sheets: usize) -> Self {
        match (parts, sheets) {
            (0, 0) => Self {
                prefix: "•".yellow().to_string(),
                message: "Layout contains no sheets".to_string(),
            },
            (0, s) => Self {
                prefix: "•".yellow().to_string(),
                message: format!("No parts placed, {} empty sheet(s) written", s.yellow()),
            },
            (p, s) => Self {
                prefix: "✓".green().to_string(),
                message: format!("{} part(s) placed on {} sheet(s)", p.green(), s.green()),
            },
        }
    }

    /// `check` の結果
    pub fn checked(found: usize, missing: usize) -> Self {
        match (found, missing) {
            (f, m) if m > 0 => Self {
                prefix: "✗".red().to_string(),
                message: format!("{} image(s) found, {} missing", f.green(), m.red()),
            },
            (f, _) if f > 0 => Self {
                prefix: "✓".green().to_string(),
                message: format!("All {} part image(s) found", f.green()),
            },
            _ => Self {
                prefix: "•".yellow().to_string(),
                message: "Layout references no part images".to_string(),
            },
        }
    }
}

impl std::fmt::Display for CommandSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.prefix, self.message)
    }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
