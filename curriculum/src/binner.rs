//! 単語頻度に基づくカリキュラムの難易度分割
//!
//! 文の難易度は、文中で最も頻度の低い単語の頻度（ランク）で表します。
//! 閾値は呼び出し側が与えた順に段 0 から並び、
//! 文の組はランクが閾値以上となる最初の段に割り当てられます。
//! どの閾値も満たさない文は最後の段に入ります。
//! 易しい段ほど大きな閾値を与える（降順）のが通常の使い方です。

use std::fmt;

use crate::corpus::{SentencePair, Side};
use crate::errors::{CurriculumError, Result};
use crate::vocabulary::{VocabularyIndex, OOV_FREQUENCY};

/// 各段の頻度閾値
///
/// 空でなく、すべて正であることが保証されます。順序は呼び出し側が与えたものを保ちます。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thresholds(Vec<u64>);

impl Thresholds {
    /// 閾値のリストを検証して新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `values` - 段 0 から順に並んだ閾値
    ///
    /// # エラー
    ///
    /// リストが空の場合、または正でない値を含む場合、
    /// [`CurriculumError::Configuration`] が返されます。
    pub fn new<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut thresholds = vec![];
        for value in values {
            let value = u64::try_from(value)
                .ok()
                .filter(|&v| v != 0)
                .ok_or_else(|| {
                    CurriculumError::configuration(
                        "threshold",
                        format!("thresholds must be positive, but got {value}"),
                    )
                })?;
            thresholds.push(value);
        }
        if thresholds.is_empty() {
            return Err(CurriculumError::configuration(
                "threshold",
                "at least one threshold must be given",
            ));
        }
        Ok(Self(thresholds))
    }

    /// 段の数を確認したうえで新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `num_bins` - 段の数
    /// * `values` - 段 0 から順に並んだ閾値
    ///
    /// # エラー
    ///
    /// 閾値の数が `num_bins` と一致しない場合にもエラーを返します。
    pub fn with_num_bins<I>(num_bins: usize, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        if num_bins == 0 {
            return Err(CurriculumError::configuration(
                "num_bins",
                "the number of bins must be positive",
            ));
        }
        let thresholds = Self::new(values)?;
        if thresholds.len() != num_bins {
            return Err(CurriculumError::configuration(
                "threshold",
                format!(
                    "{num_bins} bins require {num_bins} thresholds, but {} were given",
                    thresholds.len()
                ),
            ));
        }
        Ok(thresholds)
    }

    /// 閾値の数（段の数）を返します。
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 閾値のスライスを返します。
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// ランクに対応する段の番号を返します。
    ///
    /// ランクが閾値以上となる最初の段を返し、該当する段がなければ最後の段を返します。
    #[inline(always)]
    pub fn bin_of(&self, rank: u64) -> usize {
        self.0
            .iter()
            .position(|&threshold| rank >= threshold)
            .unwrap_or(self.0.len() - 1)
    }
}

/// 分割された文の組の出力先
pub trait BinSink {
    /// 文の組を指定された段に追加します。
    ///
    /// # 引数
    ///
    /// * `bin` - 段の番号
    /// * `pair` - 文の組
    fn push(&mut self, bin: usize, pair: &SentencePair) -> Result<()>;
}

impl BinSink for Vec<Vec<SentencePair>> {
    fn push(&mut self, bin: usize, pair: &SentencePair) -> Result<()> {
        if self.len() <= bin {
            self.resize_with(bin + 1, Vec::new);
        }
        self[bin].push(pair.clone());
        Ok(())
    }
}

/// 対訳コーパスをカリキュラムの段に分割するもの
pub struct CurriculumBinner<'a> {
    vocab: &'a VocabularyIndex,
    thresholds: Thresholds,
    side: Side,
}

impl<'a> CurriculumBinner<'a> {
    /// 新しいインスタンスを作成します。
    ///
    /// ランクの計算には目的言語側の文が使われます。
    ///
    /// # 引数
    ///
    /// * `vocab` - 単語頻度の語彙
    /// * `thresholds` - 各段の閾値
    pub fn new(vocab: &'a VocabularyIndex, thresholds: Thresholds) -> Self {
        Self {
            vocab,
            thresholds,
            side: Side::Target,
        }
    }

    /// ランクの計算に使うコーパスの側を指定します。
    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// 段の数を返します。
    pub fn num_bins(&self) -> usize {
        self.thresholds.len()
    }

    /// 閾値を返します。
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// 単語列のランク（最小の単語頻度）を返します。
    ///
    /// 単語が1つもない場合は [`OOV_FREQUENCY`] を返します。
    pub fn rank<'w, I>(&self, tokens: I) -> u64
    where
        I: IntoIterator<Item = &'w str>,
    {
        tokens
            .into_iter()
            .map(|word| self.vocab.frequency_of(word))
            .fold(None, |min: Option<u64>, freq| {
                Some(min.map_or(freq, |min| min.min(freq)))
            })
            .unwrap_or(OOV_FREQUENCY)
    }

    /// 文の組のランクを返します。
    pub fn rank_pair(&self, pair: &SentencePair) -> u64 {
        self.rank(pair.tokens(self.side))
    }

    /// 文の組を割り当てる段の番号を返します。
    pub fn assign(&self, pair: &SentencePair) -> usize {
        self.thresholds.bin_of(self.rank_pair(pair))
    }

    /// 文の組を順に分類し、出力先へ書き出します。
    ///
    /// 各段の中では入力の順序が保たれます。
    ///
    /// # 引数
    ///
    /// * `pairs` - 文の組のイテレータ
    /// * `sink` - 出力先
    ///
    /// # 戻り値
    ///
    /// 各段の件数の集計
    ///
    /// # エラー
    ///
    /// 入力の読み込みまたは出力先への書き込みに失敗した場合、そのエラーを返します。
    pub fn run<I, W>(&self, pairs: I, sink: &mut W) -> Result<BinningReport>
    where
        I: IntoIterator<Item = Result<SentencePair>>,
        W: BinSink + ?Sized,
    {
        let mut report = BinningReport::new(self.thresholds.clone());
        for pair in pairs {
            let pair = pair?;
            let rank = self.rank_pair(&pair);
            let bin = self.thresholds.bin_of(rank);
            sink.push(bin, &pair)?;
            report.record(bin, rank);
        }
        log::info!("Binned {} sentence pairs", report.total());
        for (i, count) in report.counts().iter().enumerate() {
            log::debug!("bin {i}: {count} pairs");
        }
        Ok(report)
    }

    /// 文の組をメモリ上の段に分割します。
    pub fn bin_all<I>(&self, pairs: I) -> Result<Vec<Vec<SentencePair>>>
    where
        I: IntoIterator<Item = SentencePair>,
    {
        let mut bins = vec![vec![]; self.num_bins()];
        self.run(pairs.into_iter().map(Ok), &mut bins)?;
        Ok(bins)
    }
}

/// 分割結果の集計
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinningReport {
    thresholds: Thresholds,
    counts: Vec<usize>,
    num_zero_rank: usize,
}

impl BinningReport {
    fn new(thresholds: Thresholds) -> Self {
        let counts = vec![0; thresholds.len()];
        Self {
            thresholds,
            counts,
            num_zero_rank: 0,
        }
    }

    fn record(&mut self, bin: usize, rank: u64) {
        self.counts[bin] += 1;
        if rank == OOV_FREQUENCY {
            self.num_zero_rank += 1;
        }
    }

    /// 各段の件数を返します。
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// 文の組の総数を返します。
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// 未知語を含むか空であるためにランクが0になった文の組の数を返します。
    pub fn num_zero_rank(&self) -> usize {
        self.num_zero_rank
    }
}

impl fmt::Display for BinningReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "bin\tthreshold\tpairs")?;
        for (i, (threshold, count)) in self
            .thresholds
            .as_slice()
            .iter()
            .zip(&self.counts)
            .enumerate()
        {
            writeln!(f, "{i}\t{threshold}\t{count}")?;
        }
        writeln!(f, "total\t-\t{}", self.total())?;
        write!(f, "rank 0 (OOV or empty)\t-\t{}", self.num_zero_rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::scenario_vocab;

    fn binner(vocab: &VocabularyIndex) -> CurriculumBinner<'_> {
        CurriculumBinner::new(vocab, Thresholds::new([5000, 100, 10]).unwrap())
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(Thresholds::new([5000, 100, 10]).is_ok());
        assert!(Thresholds::new([1]).is_ok());
        assert!(matches!(
            Thresholds::new(Vec::<i64>::new()),
            Err(CurriculumError::Configuration(_))
        ));
        assert!(matches!(
            Thresholds::new([100, 0]),
            Err(CurriculumError::Configuration(_))
        ));
        assert!(matches!(
            Thresholds::new([100, -5]),
            Err(CurriculumError::Configuration(_))
        ));
    }

    #[test]
    fn test_thresholds_num_bins() {
        assert!(Thresholds::with_num_bins(3, [5000, 100, 10]).is_ok());
        match Thresholds::with_num_bins(2, [5000, 100, 10]) {
            Err(CurriculumError::Configuration(e)) => assert_eq!("threshold", e.arg()),
            _ => panic!("expected a configuration error"),
        }
        match Thresholds::with_num_bins(0, [5000]) {
            Err(CurriculumError::Configuration(e)) => assert_eq!("num_bins", e.arg()),
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn test_bin_of() {
        let thresholds = Thresholds::new([5000, 100, 10]).unwrap();

        assert_eq!(0, thresholds.bin_of(6000));
        assert_eq!(0, thresholds.bin_of(5000));
        assert_eq!(1, thresholds.bin_of(4999));
        assert_eq!(1, thresholds.bin_of(100));
        assert_eq!(2, thresholds.bin_of(99));
        assert_eq!(2, thresholds.bin_of(10));
        assert_eq!(2, thresholds.bin_of(9));
        assert_eq!(2, thresholds.bin_of(0));
    }

    #[test]
    fn test_bin_of_ascending() {
        let thresholds = Thresholds::with_num_bins(3, [10, 100, 5000]).unwrap();

        assert_eq!(&[10, 100, 5000], thresholds.as_slice());
        // The first threshold is the most permissive, so it takes everything at or above 10.
        assert_eq!(0, thresholds.bin_of(6000));
        assert_eq!(0, thresholds.bin_of(10));
        assert_eq!(2, thresholds.bin_of(9));
        assert_eq!(2, thresholds.bin_of(0));
    }

    #[test]
    fn test_bin_of_unordered() {
        let thresholds = Thresholds::new([100, 5000, 10]).unwrap();

        assert_eq!(0, thresholds.bin_of(6000));
        assert_eq!(0, thresholds.bin_of(100));
        assert_eq!(2, thresholds.bin_of(50));
        assert_eq!(2, thresholds.bin_of(0));
    }

    #[test]
    fn test_single_bin() {
        let thresholds = Thresholds::new([50]).unwrap();

        assert_eq!(0, thresholds.bin_of(u64::MAX));
        assert_eq!(0, thresholds.bin_of(0));
    }

    #[test]
    fn test_rank() {
        let vocab = scenario_vocab();
        let binner = binner(&vocab);

        assert_eq!(50, binner.rank(["the", "cat", "sat"]));
        assert_eq!(6000, binner.rank(["the"]));
        assert_eq!(0, binner.rank(["the", "xyz"]));
        assert_eq!(0, binner.rank(std::iter::empty()));
    }

    #[test]
    fn test_assign_scenario() {
        let vocab = scenario_vocab();
        let binner = binner(&vocab);

        assert_eq!(2, binner.assign(&SentencePair::new("", "the cat sat")));
        assert_eq!(0, binner.assign(&SentencePair::new("", "the")));
        assert_eq!(2, binner.assign(&SentencePair::new("", "the xyz")));
        assert_eq!(1, binner.assign(&SentencePair::new("", "the cat")));
    }

    #[test]
    fn test_assign_empty_sentence() {
        let vocab = scenario_vocab();
        let binner = binner(&vocab);

        assert_eq!(2, binner.assign(&SentencePair::new("the", "")));
        assert_eq!(2, binner.assign(&SentencePair::new("the", "  \t ")));
    }

    #[test]
    fn test_assign_source_side() {
        let vocab = scenario_vocab();
        let binner = binner(&vocab).side(Side::Source);

        assert_eq!(0, binner.assign(&SentencePair::new("the", "xyz")));
        assert_eq!(2, binner.assign(&SentencePair::new("xyz", "the")));
    }

    #[test]
    fn test_bin_all() {
        let vocab = scenario_vocab();
        let binner = binner(&vocab);

        let pairs = vec![
            SentencePair::new("s1", "the cat sat"),
            SentencePair::new("s2", "the"),
            SentencePair::new("s3", "the cat"),
            SentencePair::new("s4", "xyz"),
            SentencePair::new("s5", "the the"),
        ];
        let bins = binner.bin_all(pairs).unwrap();

        fn sources(bin: &[SentencePair]) -> Vec<&str> {
            bin.iter().map(|p| p.source()).collect()
        }
        assert_eq!(3, bins.len());
        assert_eq!(vec!["s2", "s5"], sources(&bins[0]));
        assert_eq!(vec!["s3"], sources(&bins[1]));
        assert_eq!(vec!["s1", "s4"], sources(&bins[2]));
    }

    #[test]
    fn test_bin_all_keeps_empty_bins() {
        let vocab = scenario_vocab();
        let binner = binner(&vocab);

        let bins = binner.bin_all(vec![SentencePair::new("s", "the")]).unwrap();

        assert_eq!(3, bins.len());
        assert!(bins[1].is_empty());
        assert!(bins[2].is_empty());
    }

    #[test]
    fn test_run_report() {
        let vocab = scenario_vocab();
        let binner = binner(&vocab);

        let pairs = vec![
            Ok(SentencePair::new("s1", "the cat sat")),
            Ok(SentencePair::new("s2", "the")),
            Ok(SentencePair::new("s3", "xyz")),
            Ok(SentencePair::new("s4", "")),
        ];
        let mut bins: Vec<Vec<SentencePair>> = vec![];
        let report = binner.run(pairs, &mut bins).unwrap();

        assert_eq!(&[1, 0, 3], report.counts());
        assert_eq!(4, report.total());
        assert_eq!(2, report.num_zero_rank());
        assert!(report.to_string().starts_with("bin\tthreshold\tpairs\n0\t5000\t1\n"));
    }

    #[test]
    fn test_run_stops_on_error() {
        let vocab = scenario_vocab();
        let binner = binner(&vocab);

        let pairs = vec![
            Ok(SentencePair::new("s1", "the")),
            Err(CurriculumError::alignment(3, 2)),
            Ok(SentencePair::new("s3", "the")),
        ];
        let mut bins: Vec<Vec<SentencePair>> = vec![];
        let result = binner.run(pairs, &mut bins);

        assert!(matches!(result, Err(CurriculumError::Alignment(_))));
        assert_eq!(1, bins[0].len());
    }
}
