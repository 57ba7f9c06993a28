//! 単語頻度の語彙インデックス
//!
//! 語彙ファイルは1行に1エントリで、単語と頻度を空白（タブまたはスペース）で
//! 区切った2列の形式を想定しています。
//!
//! ```text
//! the	6000
//! cat	200
//! ```

use std::io::BufRead;
use std::path::Path;

use hashbrown::HashMap;

use crate::errors::{CurriculumError, Result};
use crate::utils;

/// 語彙に存在しない単語の頻度
pub const OOV_FREQUENCY: u64 = 0;

/// 単語から頻度への読み取り専用マッピング
///
/// 一度構築された後は変更されません。
#[derive(Debug, Default, Clone)]
pub struct VocabularyIndex {
    freqs: HashMap<String, u64>,
}

impl VocabularyIndex {
    /// 語彙ファイルの行からインデックスを構築します。
    ///
    /// 空行は無視されます。同じ単語が複数回現れた場合は最後の出現が採用されます。
    ///
    /// # 引数
    ///
    /// * `lines` - 語彙ファイルの各行
    ///
    /// # 戻り値
    ///
    /// 構築されたインデックス
    ///
    /// # エラー
    ///
    /// 頻度の列が欠けている、列が多すぎる、または頻度が非負整数でない行があると
    /// [`CurriculumError::VocabularyFormat`] が返されます。
    pub fn build<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = VocabularyBuilder::new("vocabulary");
        for line in lines {
            builder.push_line(line.as_ref())?;
        }
        Ok(builder.finish())
    }

    /// リーダーから語彙を読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 語彙ファイルのリーダー
    /// * `name` - エラーメッセージに使うファイル名
    /// * `skip_header` - 先頭行を列見出しとして読み飛ばすかどうか
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合、または形式が不正な場合にエラーを返します。
    pub fn from_reader<R>(rdr: R, name: &str, skip_header: bool) -> Result<Self>
    where
        R: BufRead,
    {
        let mut builder = VocabularyBuilder::new(name);
        let mut lines = rdr.lines();
        if skip_header {
            if let Some(header) = lines.next() {
                header?;
                builder.line_no += 1;
            }
        }
        for line in lines {
            builder.push_line(&line?)?;
        }
        Ok(builder.finish())
    }

    /// 語彙ファイルを読み込みます。
    ///
    /// 拡張子が `.zst` の場合は zstd で展開しながら読み込みます。
    pub fn from_path<P>(path: P, skip_header: bool) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let rdr = utils::open_input(path)?;
        Self::from_reader(rdr, &utils::display_name(path), skip_header)
    }

    /// 単語の頻度を返します。
    ///
    /// 語彙に存在しない単語には [`OOV_FREQUENCY`] を返します。
    #[inline(always)]
    pub fn frequency_of(&self, word: &str) -> u64 {
        self.freqs.get(word).copied().unwrap_or(OOV_FREQUENCY)
    }

    /// 単語が語彙に含まれるかどうかを返します。
    #[inline(always)]
    pub fn contains(&self, word: &str) -> bool {
        self.freqs.contains_key(word)
    }

    /// 語彙のエントリ数を返します。
    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    /// 語彙が空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }
}

impl FromIterator<(String, u64)> for VocabularyIndex {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            freqs: iter.into_iter().collect(),
        }
    }
}

struct VocabularyBuilder<'a> {
    name: &'a str,
    line_no: usize,
    overwritten: usize,
    freqs: HashMap<String, u64>,
}

impl<'a> VocabularyBuilder<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            line_no: 0,
            overwritten: 0,
            freqs: HashMap::new(),
        }
    }

    fn push_line(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;
        let mut spl = line.split_whitespace();
        let (word, freq) = match (spl.next(), spl.next(), spl.next()) {
            (None, _, _) => return Ok(()),
            (Some(word), Some(freq), None) => (word, freq),
            (Some(_), None, _) => {
                return Err(CurriculumError::vocabulary_format(
                    self.name,
                    self.line_no,
                    format!("missing a frequency field, {line:?}"),
                ))
            }
            (Some(_), Some(_), Some(_)) => {
                return Err(CurriculumError::vocabulary_format(
                    self.name,
                    self.line_no,
                    format!("each line must be a pair of a word and a frequency, {line:?}"),
                ))
            }
        };
        let freq: u64 = freq.parse().map_err(|e| {
            CurriculumError::vocabulary_format(
                self.name,
                self.line_no,
                format!("invalid frequency {freq:?}: {e}"),
            )
        })?;
        if self.freqs.insert(word.to_string(), freq).is_some() {
            self.overwritten += 1;
        }
        Ok(())
    }

    fn finish(self) -> VocabularyIndex {
        if self.overwritten != 0 {
            log::warn!(
                "{}: {} duplicate entries were overwritten by later lines",
                self.name,
                self.overwritten
            );
        }
        log::debug!("{}: loaded {} words", self.name, self.freqs.len());
        VocabularyIndex { freqs: self.freqs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let vocab = VocabularyIndex::build(["the\t6000", "cat 200", "sat\t50"]).unwrap();

        assert_eq!(3, vocab.len());
        assert_eq!(6000, vocab.frequency_of("the"));
        assert_eq!(200, vocab.frequency_of("cat"));
        assert_eq!(50, vocab.frequency_of("sat"));
    }

    #[test]
    fn test_unknown_word() {
        let vocab = VocabularyIndex::build(["the\t6000"]).unwrap();

        assert_eq!(OOV_FREQUENCY, vocab.frequency_of("xyz"));
        assert!(!vocab.contains("xyz"));
    }

    #[test]
    fn test_duplicate_last_wins() {
        let vocab = VocabularyIndex::build(["cat\t200", "dog\t10", "cat\t7"]).unwrap();

        assert_eq!(2, vocab.len());
        assert_eq!(7, vocab.frequency_of("cat"));
    }

    #[test]
    fn test_blank_lines() {
        let vocab = VocabularyIndex::build(["", "cat\t200", "   "]).unwrap();

        assert_eq!(1, vocab.len());
    }

    #[test]
    fn test_missing_frequency() {
        let result = VocabularyIndex::build(["the\t6000", "cat"]);

        match result {
            Err(CurriculumError::VocabularyFormat(e)) => assert_eq!(2, e.line()),
            _ => panic!("expected a vocabulary format error"),
        }
    }

    #[test]
    fn test_too_many_fields() {
        let result = VocabularyIndex::build(["the cat 6000"]);

        assert!(matches!(result, Err(CurriculumError::VocabularyFormat(_))));
    }

    #[test]
    fn test_invalid_frequency() {
        for line in ["the\t-3", "the\tmany", "the\t1.5"] {
            let result = VocabularyIndex::build([line]);
            assert!(
                matches!(result, Err(CurriculumError::VocabularyFormat(_))),
                "{line:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_from_reader_skip_header() {
        let data = "word\tfrequency\nthe\t6000\n\ncat\t200\n";

        let vocab = VocabularyIndex::from_reader(data.as_bytes(), "vocab.tsv", true).unwrap();

        assert_eq!(2, vocab.len());
        assert!(!vocab.contains("word"));
    }

    #[test]
    fn test_from_reader_header_counts_lines() {
        let data = "word\tfrequency\nthe\t6000\ncat\n";

        let result = VocabularyIndex::from_reader(data.as_bytes(), "vocab.tsv", true);

        match result {
            Err(CurriculumError::VocabularyFormat(e)) => {
                assert_eq!(3, e.line());
                assert!(e.to_string().starts_with("VocabularyFormatError: vocab.tsv:3:"));
            }
            _ => panic!("expected a vocabulary format error"),
        }
    }

    #[test]
    fn test_header_rejected_without_skip() {
        let data = "word\tfrequency\nthe\t6000\n";

        let result = VocabularyIndex::from_reader(data.as_bytes(), "vocab.tsv", false);

        assert!(matches!(result, Err(CurriculumError::VocabularyFormat(_))));
    }
}
