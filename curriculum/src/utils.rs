//! 入力ファイルを開くためのユーティリティ
//!
//! 拡張子が `.zst` のファイルは zstd で透過的に展開されます。

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::errors::{CurriculumError, Result};

/// zstd 圧縮ファイルの拡張子
pub const ZSTD_EXTENSION: &str = "zst";

/// 入力ファイルを行単位で読めるリーダーとして開きます。
///
/// # 引数
///
/// * `path` - 入力ファイルのパス
///
/// # 戻り値
///
/// バッファ付きリーダー
///
/// # エラー
///
/// パスがディレクトリの場合は [`CurriculumError::PathIsDirectory`]、
/// 開けない場合は I/O エラーが返されます。
pub fn open_input<P>(path: P) -> Result<Box<dyn BufRead>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        return Err(CurriculumError::PathIsDirectory(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if is_zstd(path) {
        Box::new(zstd::Decoder::new(file)?)
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// パスが zstd 圧縮ファイルを指しているかどうかを返します。
pub fn is_zstd(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == ZSTD_EXTENSION)
}

/// エラーメッセージ用にパスの表示名を返します。
pub(crate) fn display_name(path: &Path) -> String {
    path.display().to_string()
}
