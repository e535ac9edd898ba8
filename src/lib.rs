//! # pgm_stego 库
//!
//! 本库包含 PGM 灰度图像半字节隐写工具的核心逻辑。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod handler;
pub mod pgm;
pub mod steganography;
