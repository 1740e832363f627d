//! 環境変数の読み取り

use std::path::PathBuf;

/// 環境変数ユーティリティ
pub struct EnvVar;

impl EnvVar {
    /// 環境変数を取得（空文字列・空白のみはNoneとして扱う）
    pub fn get(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    /// パスとして取得
    pub fn get_path(key: &str) -> Option<PathBuf> {
        Self::get(key).map(PathBuf::from)
    }
}

#[cfg(test)]
#[path = "env_test.rs"]
mod tests;
