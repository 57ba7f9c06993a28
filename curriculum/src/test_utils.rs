//! テスト用ユーティリティ
//!
//! テストコードで使用する便利な関数を提供します。

use crate::vocabulary::VocabularyIndex;

/// `the`、`cat`、`sat` の3語からなる語彙を返します。
pub(crate) fn scenario_vocab() -> VocabularyIndex {
    [("the", 6000), ("cat", 200), ("sat", 50)]
        .into_iter()
        .map(|(word, freq)| (word.to_string(), freq))
        .collect()
}
