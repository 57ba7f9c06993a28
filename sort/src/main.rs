//! 対訳コーパスをカリキュラムの段に分割するユーティリティ
//!
//! このバイナリは、語彙ファイルの単語頻度に基づいて対訳コーパスの各文の組を
//! 難易度別の段に割り当て、段ごとに `src_<i>.txt` と `trg_<i>.txt` を出力します。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::LevelFilter;
use thiserror::Error;

use curriculum::errors::CurriculumError;
use curriculum::{write_bins, CurriculumBinner, ParallelReader, Side, Thresholds, VocabularyIndex};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(
    name = "curriculum-sort",
    version,
    about = "Create a curriculum for parallel data"
)]
struct Args {
    /// Source side of the parallel corpus, one sentence per line.
    source_data: PathBuf,

    /// Target side of the parallel corpus, line-aligned with the source side.
    target_data: PathBuf,

    /// Vocabulary file. Each line is a word and its frequency separated by white space.
    vocabulary: PathBuf,

    /// Directory to which the bins are output. Created if absent.
    out_dir: PathBuf,

    /// Number of curriculum levels.
    num_bins: usize,

    /// Frequency threshold of a level. Give it once per level, starting from level 0. A
    /// sentence goes to the first level whose threshold its rarest word reaches, so listing
    /// the largest threshold first makes level 0 the easiest.
    #[clap(short = 't', long = "threshold", allow_hyphen_values = true)]
    thresholds: Vec<i64>,

    /// Side of the corpus used to rank sentences. Choices are source and target.
    #[clap(long, default_value = "target")]
    side: Side,

    /// Skips the first line of the vocabulary file as a column header.
    #[clap(long)]
    vocab_header: bool,

    /// Increases verbosity (-v, -vv).
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Decreases verbosity (-q, -qq).
    #[clap(short = 'q', long, action = ArgAction::Count)]
    quiet: u8,
}

/// 分割処理中に発生する可能性のあるエラー
#[derive(Debug, Error)]
enum SortError {
    /// 語彙ファイルの読み込みエラー
    #[error("Failed to load the vocabulary {path:?}: {source}")]
    Vocabulary {
        path: PathBuf,
        source: CurriculumError,
    },

    /// コーパスファイルを開く際のエラー
    #[error("Failed to open the corpus: {0}")]
    Corpus(CurriculumError),

    /// 分割処理エラー
    #[error("Binning failed: {0}")]
    Curriculum(#[from] CurriculumError),
}

/// ログ出力の設定を作る
///
/// # 引数
///
/// * `verbose` - `-v` の指定回数
/// * `quiet` - `-q` の指定回数
/// * `filters` - `RUST_LOG` の値。指定されていればこちらが `-v`/`-q` より優先されます。
fn log_builder(verbose: u8, quiet: u8, filters: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.format_timestamp_millis();
    match filters {
        Some(filters) => {
            builder.parse_filters(filters);
        }
        None => {
            let level = match (i16::from(verbose) - i16::from(quiet)).clamp(-2, 2) {
                -2 => LevelFilter::Error,
                -1 => LevelFilter::Warn,
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            };
            builder.filter_level(level);
        }
    }
    builder
}

/// ログ出力を初期化する
fn init_logging(verbose: u8, quiet: u8) {
    let filters = std::env::var(env_logger::DEFAULT_FILTER_ENV).ok();
    let mut builder = log_builder(verbose, quiet, filters.as_deref());
    if let Ok(style) = std::env::var(env_logger::DEFAULT_WRITE_STYLE_ENV) {
        builder.parse_write_style(&style);
    }
    if let Err(e) = builder.try_init() {
        eprintln!("Failed to initialize logging: {e}");
    }
}

/// 分割を実行する
///
/// 設定を検証してから語彙とコーパスを読み込み、段ごとのファイルを書き出します。
///
/// # エラー
///
/// 設定が不正な場合は入力を読む前に、それ以外の失敗は出力ファイルを残さずに返します。
fn run(args: Args) -> Result<(), SortError> {
    let thresholds = Thresholds::with_num_bins(args.num_bins, args.thresholds)?;

    log::info!("Loading the vocabulary...");
    let vocab = VocabularyIndex::from_path(&args.vocabulary, args.vocab_header).map_err(
        |source| SortError::Vocabulary {
            path: args.vocabulary.clone(),
            source,
        },
    )?;
    log::info!("Loaded {} words", vocab.len());

    let reader = ParallelReader::from_paths(&args.source_data, &args.target_data)
        .map_err(SortError::Corpus)?;
    let binner = CurriculumBinner::new(&vocab, thresholds).side(args.side);

    log::info!("Writing files to {} ...", args.out_dir.display());
    let report = write_bins(&binner, reader, &args.out_dir)?;

    eprintln!("{report}");
    log::info!("Done");
    Ok(())
}

/// メイン関数
///
/// コマンドライン引数をパースし、分割を実行します。
///
/// # 戻り値
///
/// 成功時は `ExitCode::SUCCESS`、エラー時はメッセージを出力して `ExitCode::FAILURE`
fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
