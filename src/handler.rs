//! # 命令处理逻辑模块
//!
//! 包含处理 `run`、`hide` 和 `recover` 子命令的高级业务逻辑。
//! 本模块负责协调 PGM 读写、调用核心隐写算法以及向用户报告结果。

use crate::cli::{HideArgs, RecoverArgs, RunArgs};
use crate::constants::{EXTRACTED_PREFIX, STEGO_PREFIX};
use crate::pgm::{self, Dimensions, Raster};
use crate::steganography::{embed, extract};
use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// `run` 流水线的执行结果。
#[derive(Debug)]
pub enum RunOutcome {
    /// 所有阶段均成功完成。
    Complete,

    /// 隐写图像已写出，但恢复图像写出失败。
    ExtractedWriteFailed(anyhow::Error),
}

/// 输出文件已存在且未指定 `--force` 时拒绝继续。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 在输入文件旁生成 `<prefix><文件名>.pgm` 形式的默认输出路径。
fn default_output(input: &Path, prefix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{prefix}{stem}.pgm"))
}

fn load_text(path: &Path, dimensions: Dimensions, role: &str) -> Result<Raster> {
    debug!("reading {role} image {} ({dimensions})", path.display());
    pgm::read_text(path, dimensions).with_context(|| {
        format!(
            "Unable to read {role} image: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

fn conceal(cover: &mut Raster, secret: &Raster) -> Result<()> {
    embed(cover.pixels_mut(), secret.pixels()).with_context(|| {
        format!(
            "Failed to hide the secret image. \nCover is {}, secret is {}.",
            cover.dimensions().to_string().red().bold(),
            secret.dimensions().to_string().red().bold()
        )
    })
}

fn reveal(stego: &Raster) -> Result<Raster> {
    let mut recovered = Raster::filled(stego.dimensions(), 0);
    extract(stego.pixels(), recovered.pixels_mut())
        .context("Failed to extract the secret image from the stego image.")?;
    Ok(recovered)
}

fn save_stego(path: &Path, stego: &Raster) -> Result<()> {
    pgm::write_binary(path, stego).with_context(|| {
        format!(
            "Unable to write stego image: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

fn save_extracted(path: &Path, recovered: &Raster) -> Result<()> {
    pgm::write_text(path, recovered).with_context(|| {
        format!(
            "Unable to write extracted secret image: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 处理 'Run' 命令的执行逻辑。
///
/// 依次读取载体图像与秘密图像、隐藏、以二进制形式写出隐写图像，
/// 再从隐写图像中提取秘密图像并以文本形式写出。
/// 两个输出文件若已存在则直接覆盖，不受 `--force` 保护。
///
/// # Errors
///
/// 任一输入读取失败、隐藏失败或隐写图像写出失败时立即返回错误。
/// 最后一步 (恢复图像写出) 失败不会中断流程，而是以
/// [`RunOutcome::ExtractedWriteFailed`] 的形式返回，由调用方决定如何报告。
pub fn handle_run(args: RunArgs) -> Result<RunOutcome> {
    let dimensions = args.dimensions.dimensions()?;

    let mut cover = load_text(&args.cover, dimensions, "cover")?;
    let secret = load_text(&args.secret, dimensions, "secret")?;
    info!("loaded cover and secret images ({dimensions})");

    conceal(&mut cover, &secret)?;
    save_stego(&args.stego, &cover)?;
    println!(
        "The secret image has been hidden and saved: {}",
        args.stego.to_string_lossy().green().bold()
    );

    let recovered = reveal(&cover)?;
    match save_extracted(&args.extracted, &recovered) {
        Ok(()) => {
            println!(
                "The secret image has been recovered and saved: {}",
                args.extracted.to_string_lossy().green().bold()
            );
            Ok(RunOutcome::Complete)
        }
        Err(err) => {
            warn!("extracted image write failed: {err:#}");
            Ok(RunOutcome::ExtractedWriteFailed(err))
        }
    }
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 读取两张文本形式的输入图像，把秘密图像隐藏到载体图像中，
/// 并将结果以二进制形式写入目标路径。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与图像尺寸的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取任一输入图像，或其格式、尺寸不符合要求。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dimensions = args.dimensions.dimensions()?;
    let dest = args
        .dest
        .unwrap_or_else(|| default_output(&args.cover, STEGO_PREFIX));
    ensure_writable(&dest, args.force)?;

    let mut cover = load_text(&args.cover, dimensions, "cover")?;
    let secret = load_text(&args.secret, dimensions, "secret")?;

    conceal(&mut cover, &secret)?;
    save_stego(&dest, &cover)?;

    println!(
        "The secret image has been hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 读取隐写图像 (文本或二进制形式)，提取隐藏的秘密图像并以文本形式写出。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取隐写图像，或其格式、尺寸不符合要求。
/// * 无法写入到目标图像文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let dimensions = args.dimensions.dimensions()?;
    let dest = args
        .dest
        .unwrap_or_else(|| default_output(&args.image, EXTRACTED_PREFIX));
    ensure_writable(&dest, args.force)?;

    debug!("reading stego image {} ({dimensions})", args.image.display());
    let stego = pgm::read(&args.image, dimensions).with_context(|| {
        format!(
            "Unable to read stego image: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let recovered = reveal(&stego)?;
    save_extracted(&dest, &recovered)?;

    println!(
        "The secret image has been recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}
