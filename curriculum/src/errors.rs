//! エラー型の定義
//!
//! このモジュールは、カリキュラム分割で使用されるすべてのエラー型を定義します。
//! 分割はオフラインの一括処理であるため、どのエラーも致命的であり、
//! 呼び出し元へ即座に返されます。

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// カリキュラム分割専用のResult型
///
/// エラー型としてデフォルトで[`CurriculumError`]を使用します。
pub type Result<T, E = CurriculumError> = std::result::Result<T, E>;

/// カリキュラム分割のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CurriculumError {
    /// 設定エラー
    ///
    /// [`ConfigurationError`]のエラーバリアント。
    #[error(transparent)]
    Configuration(ConfigurationError),

    /// 語彙ファイルのフォーマットエラー
    ///
    /// [`VocabularyFormatError`]のエラーバリアント。
    #[error(transparent)]
    VocabularyFormat(VocabularyFormatError),

    /// 対訳コーパスの行数不一致エラー
    ///
    /// [`AlignmentError`]のエラーバリアント。
    #[error(transparent)]
    Alignment(AlignmentError),

    /// ディレクトリが指定されたエラー
    ///
    /// ファイルが期待される場所にディレクトリが指定された場合に発生します。
    #[error("The path '{0}' is a directory, but a file was expected.")]
    PathIsDirectory(PathBuf),

    /// I/Oエラー
    ///
    /// [`std::io::Error`]のエラーバリアント。
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CurriculumError {
    /// 設定エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn configuration<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Configuration(ConfigurationError {
            arg,
            msg: msg.into(),
        })
    }

    /// 語彙ファイルのフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `name` - 語彙ファイルの名前
    /// * `line` - 1始まりの行番号
    /// * `msg` - エラーメッセージ
    pub(crate) fn vocabulary_format<N, S>(name: N, line: usize, msg: S) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self::VocabularyFormat(VocabularyFormatError {
            name: name.into(),
            line,
            msg: msg.into(),
        })
    }

    /// 行数不一致エラーを生成します
    ///
    /// # 引数
    ///
    /// * `source_lines` - 原言語側の総行数
    /// * `target_lines` - 目的言語側の総行数
    pub(crate) fn alignment(source_lines: usize, target_lines: usize) -> Self {
        Self::Alignment(AlignmentError {
            source_lines,
            target_lines,
        })
    }
}

/// 設定値が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct ConfigurationError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl ConfigurationError {
    /// 問題のある引数の名前を返します。
    pub fn arg(&self) -> &'static str {
        self.arg
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConfigurationError: {}: {}", self.arg, self.msg)
    }
}

impl Error for ConfigurationError {}

/// 語彙ファイルの行が不正な場合に使用されるエラー
#[derive(Debug)]
pub struct VocabularyFormatError {
    /// 語彙ファイルの名前
    pub(crate) name: String,

    /// 1始まりの行番号
    pub(crate) line: usize,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl VocabularyFormatError {
    /// 不正な行の行番号（1始まり）を返します。
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for VocabularyFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "VocabularyFormatError: {}:{}: {}",
            self.name, self.line, self.msg
        )
    }
}

impl Error for VocabularyFormatError {}

/// 原言語側と目的言語側の行数が一致しない場合に使用されるエラー
#[derive(Debug)]
pub struct AlignmentError {
    pub(crate) source_lines: usize,
    pub(crate) target_lines: usize,
}

impl AlignmentError {
    /// 原言語側の行数を返します。
    pub fn source_lines(&self) -> usize {
        self.source_lines
    }

    /// 目的言語側の行数を返します。
    pub fn target_lines(&self) -> usize {
        self.target_lines
    }
}

impl fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "AlignmentError: the source corpus has {} lines but the target corpus has {} lines",
            self.source_lines, self.target_lines
        )
    }
}

impl Error for AlignmentError {}
