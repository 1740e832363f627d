//! nest-arrange config コマンド

use crate::error::{ArrangeError, Result};
use crate::settings::{Settings, CONFIG_ENV, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 解決済みの設定を TOML で表示
    Show {
        /// Settings file (takes precedence over $NEST_ARRANGE_CONFIG)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// 既定値の設定ファイルを書き出す
    Init {
        /// Destination file
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Show { config } => show(config.as_deref()),
        Command::Init { path, force } => {
            init(&path, force)?;
            println!("{} Wrote {}", "✓".green(), path.display());
            Ok(())
        }
    }
}

fn show(explicit: Option<&Path>) -> Result<()> {
    let source = Settings::config_path(explicit);
    let settings = Settings::load(explicit)?.validate()?;

    match &source {
        Some(path) => println!("# {}", path.display()),
        None => println!("# defaults (no --config and ${CONFIG_ENV} unset)"),
    }
    print!("{}", settings.to_toml()?);
    Ok(())
}

/// 既定値の設定ファイルを作成
///
/// 既存ファイルは `force` のときだけ上書きする。
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ArrangeError::InvalidConfig(format!(
            "{} already exists. Use --force to overwrite",
            path.display()
        )));
    }
    Settings::default().save(path)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
