//! # PGM 图像编解码模块
//!
//! 负责 8 位单通道灰度 PGM 图像的读写：
//! * 文本形式 (`P2`)：采样值以十进制整数书写，任意空白分隔。
//! * 二进制形式 (`P5`)：头部之后紧跟 `width × height` 个原始字节。
//!
//! 头部依次为格式标签、可选的注释行 (`#` 开头)、宽高行以及最大采样值，
//! 最大采样值必须为 255。读取时会校验宽高是否与调用方期望的一致，
//! 任何校验失败都不会返回部分填充的缓冲区。

use crate::constants::{BINARY_TAG, CREATOR_COMMENT, MAX_SAMPLE_VALUE, TEXT_TAG};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 编解码过程中可能出现的错误。
///
/// 读取相关的错误 (`is_decode`) 与写出相关的错误 (`is_encode`) 分属两类。
#[derive(Error, Debug)]
pub enum PgmError {
    #[error("Unable to open image file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Expected format tag {expected}, found {found:?}")]
    Tag { expected: &'static str, found: String },

    #[error("Malformed header: {0}")]
    Header(String),

    #[error("Dimension mismatch: expected {expected}, found {width}x{height}")]
    DimensionMismatch {
        expected: Dimensions,
        width: usize,
        height: usize,
    },

    #[error("Unsupported maximum sample value {0:?}, only 255 is accepted")]
    MaxValue(String),

    #[error("Invalid sample {token:?} at index {index}")]
    Sample { index: usize, token: String },

    #[error("Premature end of data: expected {expected} samples, found {found}")]
    PrematureEof { expected: usize, found: usize },

    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Pixel buffer holds {found} samples, expected {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Failed to read image data: {0}")]
    Read(#[source] io::Error),

    #[error("Unable to create image file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write image data: {0}")]
    Write(#[source] io::Error),
}

impl PgmError {
    /// 是否为读取 (解码) 阶段的错误。
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::Open { .. }
                | Self::Tag { .. }
                | Self::Header(_)
                | Self::DimensionMismatch { .. }
                | Self::MaxValue(_)
                | Self::Sample { .. }
                | Self::PrematureEof { .. }
                | Self::InvalidDimensions { .. }
                | Self::Read(_)
        )
    }

    /// 是否为写出 (编码) 阶段的错误。
    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Create { .. } | Self::Write(_))
    }
}

/// 图像的宽高，二者均为正数且乘积可以表示为 `usize`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    width: usize,
    height: usize,
}

impl Dimensions {
    /// 创建宽高对。
    ///
    /// # Errors
    ///
    /// 宽或高为 0，或 `width × height` 溢出时返回 [`PgmError::InvalidDimensions`]。
    pub fn new(width: usize, height: usize) -> Result<Self, PgmError> {
        match width.checked_mul(height) {
            Some(count) if count > 0 => Ok(Self { width, height }),
            _ => Err(PgmError::InvalidDimensions { width, height }),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 像素总数，即 `width × height`。
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 按行优先顺序存放的灰度像素缓冲区，长度始终等于 `width × height`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    dimensions: Dimensions,
    pixels: Vec<u8>,
}

impl Raster {
    /// 用已有的像素数据构造图像。
    ///
    /// # Errors
    ///
    /// `pixels` 的长度与 `dimensions` 不符时返回 [`PgmError::LengthMismatch`]。
    pub fn new(dimensions: Dimensions, pixels: Vec<u8>) -> Result<Self, PgmError> {
        if pixels.len() != dimensions.pixel_count() {
            return Err(PgmError::LengthMismatch {
                expected: dimensions.pixel_count(),
                found: pixels.len(),
            });
        }
        Ok(Self { dimensions, pixels })
    }

    /// 构造所有像素都等于 `value` 的图像。
    pub fn filled(dimensions: Dimensions, value: u8) -> Self {
        Self {
            dimensions,
            pixels: vec![value; dimensions.pixel_count()],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// 读取一行，到达 EOF 时返回 `None`。
fn next_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, PgmError> {
    let mut line = String::new();
    match reader.read_line(&mut line).map_err(PgmError::Read)? {
        0 => Ok(None),
        _ => Ok(Some(line)),
    }
}

/// 跳过注释行与空行，返回下一行有效内容。
fn next_header_line<R: BufRead>(reader: &mut R, what: &str) -> Result<String, PgmError> {
    loop {
        let line = next_line(reader)?
            .ok_or_else(|| PgmError::Header(format!("missing {what}")))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            return Ok(line);
        }
    }
}

/// 解析并校验格式标签与宽高行。
fn read_preamble<R: BufRead>(
    reader: &mut R,
    tag: &'static str,
    expected: Dimensions,
) -> Result<(), PgmError> {
    let first = next_line(reader)?.ok_or_else(|| PgmError::Header("missing format tag".into()))?;
    let found = first.split_whitespace().next().unwrap_or_default();
    if found != tag {
        return Err(PgmError::Tag {
            expected: tag,
            found: found.to_string(),
        });
    }

    let line = next_header_line(reader, "dimensions line")?;
    let mut tokens = line.split_whitespace().map(str::parse::<usize>);
    let (width, height) = match (tokens.next(), tokens.next()) {
        (Some(Ok(width)), Some(Ok(height))) => (width, height),
        _ => {
            return Err(PgmError::Header(format!(
                "invalid dimensions line {:?}",
                line.trim()
            )));
        }
    };

    if width != expected.width() || height != expected.height() {
        return Err(PgmError::DimensionMismatch {
            expected,
            width,
            height,
        });
    }

    Ok(())
}

fn check_max_value(token: Option<&str>) -> Result<(), PgmError> {
    let token = token.ok_or_else(|| PgmError::Header("missing maximum sample value".into()))?;
    match token.parse::<u32>() {
        Ok(MAX_SAMPLE_VALUE) => Ok(()),
        _ => Err(PgmError::MaxValue(token.to_string())),
    }
}

/// 解码文本形式 (`P2`) 的 PGM 图像。
///
/// 宽高必须与 `expected` 完全一致，随后必须至少有 `width × height` 个
/// 十进制整数采样值，每个值截断为 8 位；多余的尾部内容会被忽略。
///
/// # Errors
///
/// 标签不符、宽高不符、最大采样值不是 255、采样值不是整数或数量不足时返回错误。
pub fn decode_text<R: BufRead>(
    mut reader: R,
    expected: Dimensions,
) -> Result<Raster, PgmError> {
    read_preamble(&mut reader, TEXT_TAG, expected)?;

    let mut body = String::new();
    reader.read_to_string(&mut body).map_err(PgmError::Read)?;

    // 行内 `#` 之后的内容视为注释
    let mut tokens = body
        .lines()
        .flat_map(|line| line.split('#').next().unwrap_or_default().split_whitespace());

    check_max_value(tokens.next())?;

    let count = expected.pixel_count();
    let mut pixels = Vec::with_capacity(count);
    for index in 0..count {
        let token = tokens.next().ok_or(PgmError::PrematureEof {
            expected: count,
            found: index,
        })?;
        let sample = token.parse::<i64>().map_err(|_| PgmError::Sample {
            index,
            token: token.to_string(),
        })?;
        // 超出 8 位的数值按模 256 截断
        pixels.push(sample as u8);
    }

    Raster::new(expected, pixels)
}

/// 解码二进制形式 (`P5`) 的 PGM 图像。
///
/// 最大采样值独占一行，之后必须紧跟 `width × height` 个原始字节。
pub fn decode_binary<R: BufRead>(
    mut reader: R,
    expected: Dimensions,
) -> Result<Raster, PgmError> {
    read_preamble(&mut reader, BINARY_TAG, expected)?;

    let line = next_header_line(&mut reader, "maximum sample value")?;
    check_max_value(line.split_whitespace().next())?;

    let count = expected.pixel_count();
    let mut pixels = Vec::with_capacity(count);
    reader
        .take(count as u64)
        .read_to_end(&mut pixels)
        .map_err(PgmError::Read)?;

    if pixels.len() < count {
        return Err(PgmError::PrematureEof {
            expected: count,
            found: pixels.len(),
        });
    }

    Raster::new(expected, pixels)
}

/// 根据格式标签自动选择文本或二进制解码。
pub fn decode<R: BufRead>(mut reader: R, expected: Dimensions) -> Result<Raster, PgmError> {
    let head = reader.fill_buf().map_err(PgmError::Read)?;
    if head.starts_with(BINARY_TAG.as_bytes()) {
        decode_binary(reader, expected)
    } else {
        decode_text(reader, expected)
    }
}

fn write_header<W: Write>(writer: &mut W, tag: &str, dimensions: Dimensions) -> io::Result<()> {
    writeln!(writer, "{tag}")?;
    writeln!(writer, "{CREATOR_COMMENT}")?;
    writeln!(writer, "{} {}", dimensions.width(), dimensions.height())?;
    writeln!(writer, "{MAX_SAMPLE_VALUE}")
}

/// 以文本形式 (`P2`) 编码图像，每个采样值独占一行。
pub fn encode_text<W: Write>(mut writer: W, raster: &Raster) -> Result<(), PgmError> {
    write_header(&mut writer, TEXT_TAG, raster.dimensions()).map_err(PgmError::Write)?;
    for sample in raster.pixels() {
        writeln!(writer, "{sample}").map_err(PgmError::Write)?;
    }
    writer.flush().map_err(PgmError::Write)
}

/// 以二进制形式 (`P5`) 编码图像，采样值作为连续的原始字节写出。
pub fn encode_binary<W: Write>(mut writer: W, raster: &Raster) -> Result<(), PgmError> {
    write_header(&mut writer, BINARY_TAG, raster.dimensions()).map_err(PgmError::Write)?;
    writer.write_all(raster.pixels()).map_err(PgmError::Write)?;
    writer.flush().map_err(PgmError::Write)
}

fn open(path: &Path) -> Result<BufReader<File>, PgmError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| PgmError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn create(path: &Path) -> Result<BufWriter<File>, PgmError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| PgmError::Create {
            path: path.to_path_buf(),
            source,
        })
}

/// 从文件读取文本形式 (`P2`) 的图像。
pub fn read_text(path: impl AsRef<Path>, expected: Dimensions) -> Result<Raster, PgmError> {
    decode_text(open(path.as_ref())?, expected)
}

/// 从文件读取图像，文本或二进制形式均可。
pub fn read(path: impl AsRef<Path>, expected: Dimensions) -> Result<Raster, PgmError> {
    decode(open(path.as_ref())?, expected)
}

/// 将图像以文本形式 (`P2`) 写入文件。
pub fn write_text(path: impl AsRef<Path>, raster: &Raster) -> Result<(), PgmError> {
    encode_text(create(path.as_ref())?, raster)
}

/// 将图像以二进制形式 (`P5`) 写入文件。
pub fn write_binary(path: impl AsRef<Path>, raster: &Raster) -> Result<(), PgmError> {
    encode_binary(create(path.as_ref())?, raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

    fn dims(width: usize, height: usize) -> Dimensions {
        Dimensions::new(width, height).unwrap()
    }

    fn gradient(dimensions: Dimensions) -> Raster {
        let pixels = (0..dimensions.pixel_count()).map(|i| (i * 7 % 256) as u8).collect();
        Raster::new(dimensions, pixels).unwrap()
    }

    #[test]
    fn text_encoding_layout() {
        let raster = Raster::new(dims(2, 2), vec![0, 17, 128, 255]).unwrap();
        let mut out = Vec::new();
        encode_text(&mut out, &raster).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "P2\n# Created by pgm_stego\n2 2\n255\n0\n17\n128\n255\n"
        );
    }

    #[test]
    fn binary_encoding_layout() {
        let raster = Raster::new(dims(3, 1), vec![0, 10, 255]).unwrap();
        let mut out = Vec::new();
        encode_binary(&mut out, &raster).unwrap();

        let header = b"P5\n# Created by pgm_stego\n3 1\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(&out[header.len()..], &[0, 10, 255]);
    }

    #[test]
    fn text_and_binary_round_trip() {
        for (w, h) in [(1, 1), (5, 3), (16, 16)] {
            let raster = gradient(dims(w, h));

            let mut text = Vec::new();
            encode_text(&mut text, &raster).unwrap();
            assert_eq!(decode_text(text.as_slice(), raster.dimensions()).unwrap(), raster);

            let mut binary = Vec::new();
            encode_binary(&mut binary, &raster).unwrap();
            assert_eq!(decode_binary(binary.as_slice(), raster.dimensions()).unwrap(), raster);
            assert_eq!(decode(binary.as_slice(), raster.dimensions()).unwrap(), raster);
        }
    }

    #[test]
    fn round_trip_at_default_size() {
        let raster = gradient(dims(DEFAULT_WIDTH, DEFAULT_HEIGHT));

        let mut text = Vec::new();
        encode_text(&mut text, &raster).unwrap();
        let decoded = decode_text(text.as_slice(), raster.dimensions()).unwrap();
        assert_eq!(decoded, raster);

        let mut binary = Vec::new();
        encode_binary(&mut binary, &raster).unwrap();
        let decoded = decode_binary(binary.as_slice(), raster.dimensions()).unwrap();
        assert_eq!(decoded.into_pixels(), raster.pixels());
    }

    #[test]
    fn binary_data_may_contain_newlines_and_hashes() {
        let raster = Raster::new(dims(4, 1), vec![b'\n', b'#', b' ', b'\r']).unwrap();
        let mut binary = Vec::new();
        encode_binary(&mut binary, &raster).unwrap();
        assert_eq!(decode(binary.as_slice(), raster.dimensions()).unwrap(), raster);
    }

    #[test]
    fn text_reader_skips_comments_and_accepts_any_whitespace() {
        let input = "P2\n# first\n# second\n3 2\n255\n1 2 3\n4\t5 # trailing\n\n6\n";
        let raster = decode_text(input.as_bytes(), dims(3, 2)).unwrap();
        assert_eq!(raster.pixels(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn header_without_comment_is_accepted() {
        let raster = decode_text("P2\n1 1\n255\n9\n".as_bytes(), dims(1, 1)).unwrap();
        assert_eq!(raster.pixels(), &[9]);
    }

    #[test]
    fn wrong_tag_is_rejected() {
        let err = decode_text("P3\n2 1\n255\n0\n0\n".as_bytes(), dims(2, 1)).unwrap_err();
        assert!(matches!(err, PgmError::Tag { expected: "P2", ref found } if found == "P3"));
        assert!(err.is_decode());
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let err = decode_text("P2\n# c\n4 4\n255\n".as_bytes(), dims(2, 2)).unwrap_err();
        assert!(matches!(
            err,
            PgmError::DimensionMismatch { width: 4, height: 4, .. }
        ));
    }

    #[test]
    fn max_value_other_than_255_is_rejected() {
        let err = decode_text("P2\n1 1\n65535\n0\n".as_bytes(), dims(1, 1)).unwrap_err();
        assert!(matches!(err, PgmError::MaxValue(ref v) if v == "65535"));

        let err = decode_binary(b"P5\n1 1\n15\n\x00".as_slice(), dims(1, 1)).unwrap_err();
        assert!(matches!(err, PgmError::MaxValue(_)));
    }

    #[test]
    fn one_sample_short_is_premature_eof() {
        let raster = gradient(dims(4, 3));
        let mut text = Vec::new();
        encode_text(&mut text, &raster).unwrap();

        // 去掉最后一个采样值所在的行
        let text = String::from_utf8(text).unwrap();
        let truncated = text.trim_end().rsplit_once('\n').unwrap().0;

        let err = decode_text(truncated.as_bytes(), dims(4, 3)).unwrap_err();
        assert!(matches!(err, PgmError::PrematureEof { expected: 12, found: 11 }));
    }

    #[test]
    fn malformed_samples_are_rejected() {
        let err = decode_text("P2\n2 1\n255\n1 x\n".as_bytes(), dims(2, 1)).unwrap_err();
        assert!(matches!(err, PgmError::Sample { index: 1, .. }));

        let err = decode_text("P2\n2 1\n255\n7 1.5\n".as_bytes(), dims(2, 1)).unwrap_err();
        assert!(matches!(err, PgmError::Sample { index: 1, .. }));
    }

    #[test]
    fn out_of_range_samples_wrap_to_eight_bits() {
        let input = "P2\n4 1\n255\n256 300 511 255\n";
        let raster = decode_text(input.as_bytes(), dims(4, 1)).unwrap();
        assert_eq!(raster.pixels(), &[0, 44, 255, 255]);
    }

    #[test]
    fn short_binary_data_is_rejected() {
        let err = decode_binary(b"P5\n2 2\n255\n\x01\x02\x03".as_slice(), dims(2, 2)).unwrap_err();
        assert!(matches!(err, PgmError::PrematureEof { expected: 4, found: 3 }));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        let err = decode_text("".as_bytes(), dims(1, 1)).unwrap_err();
        assert!(matches!(err, PgmError::Header(_)));

        let err = decode_text("P2\n# only comments\n".as_bytes(), dims(1, 1)).unwrap_err();
        assert!(matches!(err, PgmError::Header(_)));

        let err = decode_text("P2\nwide tall\n255\n".as_bytes(), dims(1, 1)).unwrap_err();
        assert!(matches!(err, PgmError::Header(_)));

        let err = decode_text("P2\n1 1\n".as_bytes(), dims(1, 1)).unwrap_err();
        assert!(matches!(err, PgmError::Header(_)));
    }

    #[test]
    fn dimensions_must_be_positive_and_representable() {
        assert!(Dimensions::new(0, 10).is_err());
        assert!(Dimensions::new(10, 0).is_err());
        assert!(Dimensions::new(usize::MAX, 2).is_err());
        assert_eq!(dims(512, 512).pixel_count(), 262_144);
        assert_eq!(dims(640, 480).to_string(), "640x480");
    }

    #[test]
    fn raster_length_must_match_dimensions() {
        let err = Raster::new(dims(2, 2), vec![0; 3]).unwrap_err();
        assert!(matches!(err, PgmError::LengthMismatch { expected: 4, found: 3 }));
        assert_eq!(Raster::filled(dims(2, 3), 7).pixels(), &[7; 6]);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(dir.path().join("absent.pgm"), dims(1, 1)).unwrap_err();
        assert!(matches!(err, PgmError::Open { .. }));
        assert!(err.is_decode());
    }

    #[test]
    fn uncreatable_file_is_an_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.pgm");
        let raster = Raster::filled(dims(1, 1), 0);

        let err = write_binary(&path, &raster).unwrap_err();
        assert!(matches!(err, PgmError::Create { .. }));
        assert!(err.is_encode());
        assert!(write_text(&path, &raster).unwrap_err().is_encode());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let raster = gradient(dims(8, 4));

        let text_path = dir.path().join("text.pgm");
        write_text(&text_path, &raster).unwrap();
        assert_eq!(read_text(&text_path, raster.dimensions()).unwrap(), raster);
        assert_eq!(read(&text_path, raster.dimensions()).unwrap(), raster);

        let binary_path = dir.path().join("binary.pgm");
        write_binary(&binary_path, &raster).unwrap();
        assert_eq!(read(&binary_path, raster.dimensions()).unwrap(), raster);
        assert!(matches!(
            read_text(&binary_path, raster.dimensions()),
            Err(PgmError::Tag { .. })
        ));
    }
}
