//! # Curriculum
//!
//! 単語頻度を難易度の代理指標として、文対応の取れた対訳コーパスを
//! カリキュラム学習用の難易度別の段に分割するライブラリです。
//!
//! ## 概要
//!
//! 文のランクは、文中で最も頻度の低い単語の頻度です。語彙に存在しない単語の頻度は0です。
//! 閾値は段 0 から順に与えられ（通常は降順）、文の組はランクが閾値以上となる
//! 最初の段に割り当てられます。どの閾値も満たさない文の組は最後の段に入ります。
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use curriculum::{CurriculumBinner, SentencePair, Thresholds, VocabularyIndex};
//!
//! let vocab = VocabularyIndex::build(["the\t6000", "cat\t200", "sat\t50"])?;
//! let binner = CurriculumBinner::new(&vocab, Thresholds::new([5000, 100, 10])?);
//!
//! assert_eq!(binner.assign(&SentencePair::new("", "the")), 0);
//! assert_eq!(binner.assign(&SentencePair::new("", "the cat")), 1);
//! assert_eq!(binner.assign(&SentencePair::new("", "the cat sat")), 2);
//! assert_eq!(binner.assign(&SentencePair::new("", "the xyz")), 2);
//! # Ok(())
//! # }
//! ```

/// 難易度の段への分割
pub mod binner;

/// 対訳コーパスの読み込み
pub mod corpus;

/// エラー型の定義
pub mod errors;

/// 入力ファイルのユーティリティ
pub mod utils;

/// 単語頻度の語彙
pub mod vocabulary;

/// 段ごとの出力ファイルの書き出し
pub mod writer;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use binner::{BinSink, BinningReport, CurriculumBinner, Thresholds};
pub use corpus::{ParallelReader, SentencePair, Side};
pub use vocabulary::VocabularyIndex;
pub use writer::{write_bins, BinWriter};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
