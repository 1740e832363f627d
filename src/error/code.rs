//! エラーコード
//!
//! `<カテゴリ><3桁>` 形式。カテゴリはファイル入出力 (IO)、レイアウト (LAY)、
//! 単位 (UNT)、パーツ画像 (IMG)、設定 (CFG)、ホスト (HST)、内部 (INT)。

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// ファイルが無い
    Io001,
    /// 権限が無い
    Io002,
    Io003,
    /// XML として壊れている
    Lay001,
    /// 必須の属性・子要素が無い
    Lay002,
    /// 数値・viewBox・transform・パスが読めない
    Lay003,
    /// 中身の無いシートやパーツ
    Lay004,
    /// キャンバスが大きすぎる
    Lay005,
    Unt001,
    Img001,
    Img002,
    Cfg001,
    Cfg002,
    Hst001,
    Int001,
}

/// コードごとの表示情報
struct Entry {
    id: &'static str,
    cause: &'static str,
    remediation: &'static [&'static str],
}

impl Entry {
    fn new(
        id: &'static str,
        cause: &'static str,
        remediation: &'static [&'static str],
    ) -> Self {
        Self {
            id,
            cause,
            remediation,
        }
    }
}

const REEXPORT: &str = "Re-export the layout from the nesting tool";

impl ErrorCode {
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::Io001,
        ErrorCode::Io002,
        ErrorCode::Io003,
        ErrorCode::Lay001,
        ErrorCode::Lay002,
        ErrorCode::Lay003,
        ErrorCode::Lay004,
        ErrorCode::Lay005,
        ErrorCode::Unt001,
        ErrorCode::Img001,
        ErrorCode::Img002,
        ErrorCode::Cfg001,
        ErrorCode::Cfg002,
        ErrorCode::Hst001,
        ErrorCode::Int001,
    ];

    fn entry(self) -> Entry {
        match self {
            ErrorCode::Io001 => Entry::new(
                "IO001",
                "A file or directory given on the command line does not exist",
                &[
                    "Check the layout directory argument",
                    "Check the layout file name (--layout)",
                ],
            ),
            ErrorCode::Io002 => Entry::new(
                "IO002",
                "The layout directory or output directory is not accessible",
                &[
                    "Check read permission on the layout directory",
                    "Check write permission on the output directory (--output)",
                ],
            ),
            ErrorCode::Io003 => Entry::new(
                "IO003",
                "Reading or writing a file failed",
                &[
                    "Check free disk space",
                    "Verify the output directory is writable",
                ],
            ),
            ErrorCode::Lay001 => Entry::new(
                "LAY001",
                "The layout file is not well-formed XML",
                &[REEXPORT, "Check the file was not truncated"],
            ),
            ErrorCode::Lay002 => Entry::new(
                "LAY002",
                "A layout element lacks a required attribute or child",
                &[
                    "Make sure every part group carries id and transform",
                    "Make sure every part group has a child with an id",
                    REEXPORT,
                ],
            ),
            ErrorCode::Lay003 => Entry::new(
                "LAY003",
                "A number, viewBox, transform or path in the layout could not be parsed",
                &[
                    "Check width and viewBox on the root element",
                    "Check transform attributes on part groups",
                    REEXPORT,
                ],
            ),
            ErrorCode::Lay004 => Entry::new(
                "LAY004",
                "A sheet or part in the layout has no usable content",
                &[
                    "Make sure every sheet starts with its size rectangle",
                    "Make sure every part contains a shape",
                ],
            ),
            ErrorCode::Lay005 => Entry::new(
                "LAY005",
                "A sheet would need more pixels than one canvas can hold",
                &[
                    "Lower the resolution (--ppi)",
                    "Check the root width and the sheet sizes",
                ],
            ),
            ErrorCode::Unt001 => Entry::new(
                "UNT001",
                "A length uses a unit suffix that is not supported",
                &[
                    "Use one of: mm, cm, in, pt, pc, px",
                    "Or give the width without a unit (millimetres)",
                ],
            ),
            ErrorCode::Img001 => Entry::new(
                "IMG001",
                "A part referenced by the layout has no image file",
                &[
                    "Check the image extension (--ext)",
                    "Run 'nest-arrange check <DIR>' to list missing images",
                ],
            ),
            ErrorCode::Img002 => Entry::new(
                "IMG002",
                "A part image could not be decoded or a sheet could not be written",
                &[
                    "Check the image is a valid PNG, JPEG or GIF",
                    "Verify the output directory is writable",
                ],
            ),
            ErrorCode::Cfg001 => Entry::new(
                "CFG001",
                "A setting is invalid or out of range",
                &[
                    "Resolution must be between 0.1 and 9999 ppi",
                    "Extension must not be empty",
                    "Inspect the resolved settings with 'nest-arrange config show'",
                ],
            ),
            ErrorCode::Cfg002 => Entry::new(
                "CFG002",
                "The settings file is not valid TOML for nest-arrange",
                &[
                    "Regenerate it with 'nest-arrange config init --force'",
                    "Unset NEST_ARRANGE_CONFIG to use defaults",
                ],
            ),
            ErrorCode::Hst001 => Entry::new(
                "HST001",
                "A canvas or layer handle does not belong to this run",
                &["Report the issue with the output of --verbose"],
            ),
            ErrorCode::Int001 => Entry::new(
                "INT001",
                "Unexpected internal failure",
                &["Report the issue with the output of --verbose"],
            ),
        }
    }

    /// 表示用のコード文字列（`LAY001` など）
    pub fn as_str(&self) -> &'static str {
        self.entry().id
    }

    pub fn cause(&self) -> &'static str {
        self.entry().cause
    }

    /// 対処手順（順番に試す）
    pub fn remediation(&self) -> &'static [&'static str] {
        self.entry().remediation
    }
}
