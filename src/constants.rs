/// 文本 (ASCII) 形式 PGM 文件的格式标签。
pub const TEXT_TAG: &str = "P2";

/// 二进制形式 PGM 文件的格式标签。
pub const BINARY_TAG: &str = "P5";

/// 写出文件时附带的注释行，用于标识生成该文件的程序。
pub const CREATOR_COMMENT: &str = "# Created by pgm_stego";

/// 唯一支持的最大采样值 (8 位单通道灰度)。
pub const MAX_SAMPLE_VALUE: u32 = 255;

/// 高半字节掩码 (bits 7-4)，承载图像中视觉上占主导的信息。
pub const HIGH_NIBBLE_MASK: u8 = 0xF0;

/// 低半字节掩码 (bits 3-0)，隐写时被秘密图像的高半字节覆盖。
pub const LOW_NIBBLE_MASK: u8 = 0x0F;

/// 半字节位移量。
pub const NIBBLE_SHIFT: u32 = 4;

/// 默认图像宽度。
pub const DEFAULT_WIDTH: usize = 512;

/// 默认图像高度。
pub const DEFAULT_HEIGHT: usize = 512;

// 固定流水线 (`run` 子命令) 的默认文件名。
pub const DEFAULT_COVER: &str = "baboon.pgm";
pub const DEFAULT_SECRET: &str = "farm.pgm";
pub const DEFAULT_STEGO: &str = "stego_image_bin.pgm";
pub const DEFAULT_EXTRACTED: &str = "extracted_secret.pgm";

/// `hide` 未指定输出路径时，默认文件名的前缀。
pub const STEGO_PREFIX: &str = "stego_";

/// `recover` 未指定输出路径时，默认文件名的前缀。
pub const EXTRACTED_PREFIX: &str = "extracted_";

/// 流水线已完成、但最终的恢复图像写出失败时的进程退出码。
pub const EXTRACTED_WRITE_FAILURE_EXIT_CODE: u8 = 2;
