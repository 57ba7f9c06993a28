//! 対訳コーパスの読み込み
//!
//! 原言語と目的言語のコーパスは1行1文で、行の位置によって対応付けられます。
//! 文は1組ずつ読み込まれ、コーパス全体をメモリに保持することはありません。

use std::io::{BufRead, Lines};
use std::path::Path;
use std::str::FromStr;

use crate::errors::{CurriculumError, Result};
use crate::utils;

/// 難易度の判定に使うコーパスの側
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    /// 原言語側
    Source,

    /// 目的言語側
    #[default]
    Target,
}

impl FromStr for Side {
    type Err = &'static str;

    /// 文字列から側をパースする
    ///
    /// # 引数
    ///
    /// * `side` - パース対象の文字列（"source" または "target"）
    fn from_str(side: &str) -> Result<Self, Self::Err> {
        match side {
            "source" => Ok(Self::Source),
            "target" => Ok(Self::Target),
            _ => Err("Could not parse a side: expected `source` or `target`"),
        }
    }
}

/// 位置で対応付けられた原文と訳文の組
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SentencePair {
    source: String,
    target: String,
}

impl SentencePair {
    /// 新しい文の組を作成します。
    ///
    /// 行末の改行文字は含めないでください。
    pub fn new<S, T>(source: S, target: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// 原言語側の行を返します。
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 目的言語側の行を返します。
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 指定された側の行を返します。
    #[inline(always)]
    pub fn side(&self, side: Side) -> &str {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    /// 指定された側の行を空白で区切った単語列を返します。
    #[inline(always)]
    pub fn tokens(&self, side: Side) -> impl Iterator<Item = &str> + '_ {
        self.side(side).split_whitespace()
    }
}

/// 2つのリーダーから文の組を1つずつ読み出すイテレータ
///
/// どちらかの入力が先に尽きた場合は、もう一方の残りの行数を数えたうえで
/// [`CurriculumError::Alignment`] を1度だけ返し、以降は何も返しません。
pub struct ParallelReader<S, T> {
    source: Lines<S>,
    target: Lines<T>,
    num_pairs: usize,
    finished: bool,
}

impl<S, T> ParallelReader<S, T>
where
    S: BufRead,
    T: BufRead,
{
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `source` - 原言語コーパスのリーダー
    /// * `target` - 目的言語コーパスのリーダー
    pub fn new(source: S, target: T) -> Self {
        Self {
            source: source.lines(),
            target: target.lines(),
            num_pairs: 0,
            finished: false,
        }
    }

    fn misaligned(
        &mut self,
        mut extra_source: usize,
        mut extra_target: usize,
    ) -> Result<CurriculumError> {
        for line in self.source.by_ref() {
            line?;
            extra_source += 1;
        }
        for line in self.target.by_ref() {
            line?;
            extra_target += 1;
        }
        Ok(CurriculumError::alignment(
            self.num_pairs + extra_source,
            self.num_pairs + extra_target,
        ))
    }
}

impl ParallelReader<Box<dyn BufRead>, Box<dyn BufRead>> {
    /// 2つのコーパスファイルを開きます。
    ///
    /// 拡張子が `.zst` のファイルは zstd で展開しながら読み込みます。
    pub fn from_paths<P, Q>(source: P, target: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        Ok(Self::new(
            utils::open_input(source)?,
            utils::open_input(target)?,
        ))
    }
}

impl<S, T> Iterator for ParallelReader<S, T>
where
    S: BufRead,
    T: BufRead,
{
    type Item = Result<SentencePair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = match (self.source.next(), self.target.next()) {
            (None, None) => {
                self.finished = true;
                return None;
            }
            (Some(Err(e)), _) | (_, Some(Err(e))) => Err(e.into()),
            (Some(Ok(source)), Some(Ok(target))) => {
                self.num_pairs += 1;
                return Some(Ok(SentencePair { source, target }));
            }
            (Some(Ok(_)), None) => Err(self.misaligned(1, 0).unwrap_or_else(|e| e)),
            (None, Some(Ok(_))) => Err(self.misaligned(0, 1).unwrap_or_else(|e| e)),
        };
        self.finished = true;
        Some(item)
    }
}
