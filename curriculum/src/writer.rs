//! 段ごとの出力ファイルの書き出し
//!
//! 段 `i` の原言語側は `src_<i>.txt`、目的言語側は `trg_<i>.txt` に書き出されます。
//! 書き込みはまず出力ディレクトリ内の一時ファイルに対して行われ、
//! [`BinWriter::commit`] が呼ばれたときにだけ最終的なファイル名へ永続化されます。
//! コミットされずに破棄された場合、一時ファイルは削除され、
//! このインスタンスが作成した出力ディレクトリも取り除かれます。

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::binner::{BinSink, BinningReport, CurriculumBinner};
use crate::corpus::{ParallelReader, SentencePair};
use crate::errors::{CurriculumError, Result};

/// 原言語側の出力ファイル名の接頭辞
pub const SOURCE_PREFIX: &str = "src";

/// 目的言語側の出力ファイル名の接頭辞
pub const TARGET_PREFIX: &str = "trg";

/// 段の番号から出力ファイル名の組（原言語側、目的言語側）を返します。
pub fn bin_file_names(bin: usize) -> (String, String) {
    (
        format!("{SOURCE_PREFIX}_{bin}.txt"),
        format!("{TARGET_PREFIX}_{bin}.txt"),
    )
}

struct StagedBin {
    source: BufWriter<NamedTempFile>,
    target: BufWriter<NamedTempFile>,
}

impl StagedBin {
    fn new(dir: &Path) -> Result<Self> {
        Ok(Self {
            source: BufWriter::new(NamedTempFile::new_in(dir)?),
            target: BufWriter::new(NamedTempFile::new_in(dir)?),
        })
    }
}

/// 段ごとの一時ファイルに文の組を書き込むもの
pub struct BinWriter {
    out_dir: PathBuf,
    // Topmost directory created by `create`, removed again if the run fails.
    created_root: Option<PathBuf>,
    bins: Vec<StagedBin>,
}

impl BinWriter {
    /// 出力ディレクトリに段の数だけ一時ファイルを作成します。
    ///
    /// 出力ディレクトリが存在しない場合は、親ディレクトリも含めて作成します。
    ///
    /// # 引数
    ///
    /// * `out_dir` - 出力ディレクトリ
    /// * `num_bins` - 段の数
    ///
    /// # エラー
    ///
    /// ディレクトリまたは一時ファイルを作成できない場合、I/Oエラーが返されます。
    pub fn create<P>(out_dir: P, num_bins: usize) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let out_dir = out_dir.as_ref().to_path_buf();
        let created_root = out_dir
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
            .last()
            .map(Path::to_path_buf);
        let mut writer = Self {
            out_dir,
            created_root,
            bins: Vec::with_capacity(num_bins),
        };
        if writer.created_root.is_some() {
            fs::create_dir_all(&writer.out_dir)?;
        }
        for _ in 0..num_bins {
            let bin = StagedBin::new(&writer.out_dir)?;
            writer.bins.push(bin);
        }
        Ok(writer)
    }

    /// すべての一時ファイルを最終的なファイル名へ永続化します。
    ///
    /// 永続化の途中で失敗した場合は、それまでに永続化したファイルを削除してから
    /// エラーを返します。
    ///
    /// # 戻り値
    ///
    /// 書き出したファイルのパス（段の順に原言語側、目的言語側）
    ///
    /// # エラー
    ///
    /// 出力先のファイル名がディレクトリとして存在する場合は
    /// [`CurriculumError::PathIsDirectory`]、フラッシュまたは永続化に失敗した場合は
    /// そのエラーを返します。
    pub fn commit(mut self) -> Result<Vec<PathBuf>> {
        let bins = std::mem::take(&mut self.bins);
        let mut staged = Vec::with_capacity(bins.len() * 2);
        for (i, bin) in bins.into_iter().enumerate() {
            let (source_name, target_name) = bin_file_names(i);
            staged.push((finish(bin.source)?, self.out_dir.join(source_name)));
            staged.push((finish(bin.target)?, self.out_dir.join(target_name)));
        }
        if let Some((_, path)) = staged.iter().find(|(_, path)| path.is_dir()) {
            return Err(CurriculumError::PathIsDirectory(path.clone()));
        }
        let mut paths = Vec::with_capacity(staged.len());
        for (file, path) in staged {
            if let Err(e) = file.persist(&path) {
                for persisted in &paths {
                    if let Err(e) = fs::remove_file(persisted) {
                        log::warn!("Could not remove {:?}: {}", persisted, e);
                    }
                }
                // The temporary file is dropped here, not carried by the error.
                return Err(e.error.into());
            }
            paths.push(path);
        }
        self.created_root = None;
        Ok(paths)
    }
}

fn finish(wtr: BufWriter<NamedTempFile>) -> Result<NamedTempFile> {
    let file = wtr.into_inner().map_err(|e| e.into_error())?;
    file.as_file().sync_all()?;
    Ok(file)
}

impl BinSink for BinWriter {
    fn push(&mut self, bin: usize, pair: &SentencePair) -> Result<()> {
        let staged = &mut self.bins[bin];
        writeln!(staged.source, "{}", pair.source())?;
        writeln!(staged.target, "{}", pair.target())?;
        Ok(())
    }
}

impl Drop for BinWriter {
    fn drop(&mut self) {
        // Temporary files must be gone before the directories can be removed.
        self.bins.clear();
        let Some(root) = self.created_root.take() else {
            return;
        };
        for dir in self.out_dir.ancestors() {
            if let Err(e) = fs::remove_dir(dir) {
                log::warn!("Could not remove the output directory {:?}: {}", dir, e);
                break;
            }
            if dir == root {
                break;
            }
        }
    }
}

/// 対訳コーパスを分割し、段ごとのファイルを出力ディレクトリに書き出します。
///
/// コーパス全体の分類が成功した場合にのみ出力ファイルが作成されます。
///
/// # 引数
///
/// * `binner` - 分割器
/// * `reader` - 対訳コーパスのリーダー
/// * `out_dir` - 出力ディレクトリ
///
/// # 戻り値
///
/// 各段の件数の集計
///
/// # エラー
///
/// 行数の不一致、読み書きの失敗が起きた場合、ファイルを残さずにエラーを返します。
pub fn write_bins<S, T, P>(
    binner: &CurriculumBinner,
    reader: ParallelReader<S, T>,
    out_dir: P,
) -> Result<BinningReport>
where
    S: std::io::BufRead,
    T: std::io::BufRead,
    P: AsRef<Path>,
{
    let out_dir = out_dir.as_ref();
    if out_dir.is_file() {
        return Err(CurriculumError::configuration(
            "out_dir",
            format!("{} is a file, not a directory", out_dir.display()),
        ));
    }
    let mut writer = BinWriter::create(out_dir, binner.num_bins())?;
    let report = binner.run(reader, &mut writer)?;
    let paths = writer.commit()?;
    for path in &paths {
        log::debug!("Wrote {}", path.display());
    }
    Ok(report)
}
