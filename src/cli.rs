//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::{
    DEFAULT_COVER, DEFAULT_EXTRACTED, DEFAULT_HEIGHT, DEFAULT_SECRET, DEFAULT_STEGO, DEFAULT_WIDTH,
};
use crate::pgm::{Dimensions, PgmError};
use clap::{Args, Parser};
use std::path::PathBuf;

/// 一款基于半字节平面替换的命令行工具，用于把一张 8 位灰度 PGM 图像隐藏在另一张中，并将其近似恢复。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于半字节平面替换的命令行工具：用秘密图像的高 4 位覆盖载体图像的低 4 位，之后再从隐写图像中恢复出 16 级灰度的秘密图像。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：run (完整流水线)、hide (隐藏) 和 recover (恢复)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 依次执行读取、隐藏、写出隐写图像、提取、写出恢复图像的完整流程。
    Run(RunArgs),

    /// 把秘密图像隐藏到载体图像中，输出二进制 (P5) 隐写图像。
    Hide(HideArgs),

    /// 从隐写图像中恢复秘密图像，输出文本 (P2) 图像。
    Recover(RecoverArgs),
}

/// 所有参与运算的图像共享的宽高。
#[derive(Args, Debug, Clone, Copy)]
pub struct DimensionArgs {
    /// 图像宽度 (像素)。
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: usize,

    /// 图像高度 (像素)。
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: usize,
}

impl DimensionArgs {
    pub fn dimensions(&self) -> Result<Dimensions, PgmError> {
        Dimensions::new(self.width, self.height)
    }
}

/// 'run' 命令所需的参数。已存在的输出文件总是被覆盖。
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// 载体图像 (P2)。
    #[arg(short, long, default_value = DEFAULT_COVER)]
    pub cover: PathBuf,

    /// 秘密图像 (P2)。
    #[arg(short, long, default_value = DEFAULT_SECRET)]
    pub secret: PathBuf,

    /// 隐写图像 (P5) 的输出路径。
    #[arg(long, default_value = DEFAULT_STEGO)]
    pub stego: PathBuf,

    /// 恢复出的秘密图像 (P2) 的输出路径。
    #[arg(short, long, default_value = DEFAULT_EXTRACTED)]
    pub extracted: PathBuf,

    #[command(flatten)]
    pub dimensions: DimensionArgs,
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 载体图像 (P2)。
    #[arg(short, long)]
    pub cover: PathBuf,

    /// 秘密图像 (P2)。
    #[arg(short, long)]
    pub secret: PathBuf,

    /// 隐写图像的输出路径，默认为载体图像旁的 `stego_<文件名>.pgm`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    #[command(flatten)]
    pub dimensions: DimensionArgs,

    /// 如果输出文件已存在，则强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 隐写图像，P2 或 P5 均可。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复图像的输出路径，默认为输入旁的 `extracted_<文件名>.pgm`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    #[command(flatten)]
    pub dimensions: DimensionArgs,

    /// 如果输出文件已存在，则强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}
