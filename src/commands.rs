use crate::cli::Command;
use crate::error::Result;
use crate::settings::Settings;
use std::path::PathBuf;

pub mod arrange;
pub mod check;
pub mod config;
pub mod plan;

pub fn dispatch(cli: crate::cli::Cli) -> Result<()> {
    match cli.command {
        Command::Arrange(args) => arrange::run(args),
        Command::Plan(args) => plan::run(args),
        Command::Check(args) => check::run(args),
        Command::Config(args) => config::run(args),
    }
}

/// レイアウトを読むコマンドに共通の引数
#[derive(Debug, clap::Args)]
pub struct LayoutArgs {
    /// Directory containing the layout file and the part images
    pub dir: PathBuf,

    /// Part image extension [default: png]
    #[arg(long)]
    pub ext: Option<String>,

    /// Resolution in pixels per inch, 0.1 to 9999 [default: 600]
    #[arg(long)]
    pub ppi: Option<f64>,

    /// Layout file name inside DIR [default: output.svg]
    #[arg(long = "layout", value_name = "FILE")]
    pub layout_file: Option<String>,

    /// Settings file (takes precedence over $NEST_ARRANGE_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl LayoutArgs {
    /// 設定ファイルを読み、CLI フラグで上書きした設定（未検証）
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(ext) = &self.ext {
            settings.ext = ext.clone();
        }
        if let Some(ppi) = self.ppi {
            settings.ppi = ppi;
        }
        if let Some(layout_file) = &self.layout_file {
            settings.layout_file = layout_file.clone();
        }
        Ok(settings)
    }
}

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;
