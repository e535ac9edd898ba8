//! # 半字节平面隐写算法
//!
//! 载体图像保留高半字节，低半字节被替换为秘密图像的高半字节；
//! 提取时再把低半字节移回高位，得到 16 级灰度的近似秘密图像。

use crate::constants::{HIGH_NIBBLE_MASK, LOW_NIBBLE_MASK, NIBBLE_SHIFT};
use std::io::{self, ErrorKind};

/// 将 `secret` 的高半字节嵌入 `cover` 的低半字节 (原地修改 `cover`)。
///
/// # Errors
///
/// 两个缓冲区长度不一致时返回 `ErrorKind::InvalidInput`，且不修改任何像素。
pub fn embed(cover: &mut [u8], secret: &[u8]) -> Result<(), io::Error> {
    if cover.len() != secret.len() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!(
                "Cover and secret buffers differ in length ({} vs {}).",
                cover.len(),
                secret.len()
            ),
        ));
    }

    for (pixel, &hidden) in cover.iter_mut().zip(secret) {
        *pixel = (*pixel & HIGH_NIBBLE_MASK) | (hidden >> NIBBLE_SHIFT);
    }

    Ok(())
}

/// 从 `stego` 的低半字节中恢复秘密图像，结果写入 `output`。
///
/// # Errors
///
/// 两个缓冲区长度不一致时返回 `ErrorKind::InvalidInput`。
pub fn extract(stego: &[u8], output: &mut [u8]) -> Result<(), io::Error> {
    if stego.len() != output.len() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!(
                "Stego and output buffers differ in length ({} vs {}).",
                stego.len(),
                output.len()
            ),
        ));
    }

    for (recovered, &pixel) in output.iter_mut().zip(stego) {
        *recovered = (pixel & LOW_NIBBLE_MASK) << NIBBLE_SHIFT;
    }

    Ok(())
}
