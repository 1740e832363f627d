use clap::{Parser, Subcommand};

use crate::commands::{arrange, check, config, plan};

#[derive(Debug, Parser)]
#[command(name = "nest-arrange", version)]
#[command(
    about = "Arrange part images on sheets from a nesting layout",
    long_about = None
)]
pub struct Cli {
    /// Enable debug logging and detailed error output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// レイアウトに従ってパーツ画像を配置し、シートごとに PNG を書き出す
    Arrange(arrange::Args),

    /// 配置計画（シートサイズとパーツ位置）を表示
    Plan(plan::Args),

    /// レイアウトが参照する画像ファイルの有無を確認
    Check(check::Args),

    /// 設定ファイルの表示と生成
    Config(config::Args),
}
