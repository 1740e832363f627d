//! エラーの CLI 表示
//!
//! 通常は見出し行と場所だけ、`--verbose` では原因・対処・原因チェーンまで出す。
//! 色は stderr が端末で、かつ `NO_COLOR` が無いときだけ付ける。

use std::error::Error;
use std::io::IsTerminal;

use owo_colors::OwoColorize;

use super::rich::RichError;

/// 行の種類（色分けに使う）
#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Headline,
    Location,
    Cause,
    Remediation,
    Faint,
    Plain,
}

pub struct ErrorFormatter {
    verbose: bool,
    use_color: bool,
}

impl ErrorFormatter {
    pub fn new(verbose: bool) -> Self {
        Self::with_color_detection(verbose, stderr_supports_color)
    }

    /// 色判定を差し替えられるコンストラクタ（テスト用）
    pub fn with_color_detection(verbose: bool, detect_color: fn() -> bool) -> Self {
        Self {
            verbose,
            use_color: detect_color(),
        }
    }

    pub fn format(&self, error: &RichError) -> String {
        self.lines(error)
            .into_iter()
            .map(|(style, text)| self.paint(style, &text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn lines(&self, error: &RichError) -> Vec<(Style, String)> {
        let mut lines = vec![(Style::Headline, error.to_string())];
        lines.extend(
            error
                .context()
                .lines()
                .into_iter()
                .map(|line| (Style::Location, line)),
        );

        if !self.verbose {
            return lines;
        }

        let code = error.code();
        lines.push((Style::Plain, "  |".to_string()));
        lines.push((Style::Cause, format!("  | Cause: {}", code.cause())));
        lines.push((Style::Plain, "  |".to_string()));
        lines.push((Style::Remediation, "  | Remediation:".to_string()));
        lines.extend(
            code.remediation()
                .iter()
                .enumerate()
                .map(|(i, step)| (Style::Plain, format!("  |   {}. {step}", i + 1))),
        );

        let causes = cause_chain(error);
        if !causes.is_empty() {
            lines.push((Style::Plain, "  |".to_string()));
            lines.push((Style::Plain, "  | Source chain:".to_string()));
            lines.extend(
                causes
                    .into_iter()
                    .map(|cause| (Style::Faint, format!("  |   - {cause}"))),
            );
        }

        lines.push((Style::Plain, "  |".to_string()));
        lines.push((
            Style::Faint,
            "  = note: use `nest-arrange --help` for more information".to_string(),
        ));
        lines
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if !self.use_color {
            return text.to_string();
        }
        match style {
            Style::Headline => match text.split_once(':') {
                Some((label, rest)) => format!("{}{}", label.red().bold(), format!(":{rest}").bold()),
                None => text.red().bold().to_string(),
            },
            Style::Location => text.blue().to_string(),
            Style::Cause => text.yellow().to_string(),
            Style::Remediation => text.green().to_string(),
            Style::Faint => text.dimmed().to_string(),
            Style::Plain => text.to_string(),
        }
    }
}

fn stderr_supports_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// 見出しと重複しない下位の原因をたどる
fn cause_chain(error: &RichError) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(err) = current {
        causes.push(err.to_string());
        current = err.source();
    }
    causes
}
