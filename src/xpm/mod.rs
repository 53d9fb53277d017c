//! Decoding of XPM Images
//!
//! XPM (X PixMap) Format is a plain text image format, originally designed to store
//! cursor and icon data. XPM images are valid C code.
//!
//! This decoder is meant for small theme assets such as window button glyphs, and it is
//! lenient in the way the classic Xlib and gdk-pixbuf loaders are:
//! - only the quoted strings are read; the C declaration around them is not checked
//! - colors which cannot be resolved become transparent
//! - rows which are missing or too short are left transparent
//! - pixel codes which are not in the color table use the first color
//!
//! The whole decode fails (and produces no image) only for a bad `<Values>` header,
//! a missing color string, or a failed allocation.
//!
//! The XPM format allows for encoding an image which can be expressed differently
//! depending on the display capabilities (X11 visual). This decoder picks, per color,
//! the specification for the most capable visual: `c` over `g` over `g4` over `m`. The
//! symbolic `s` name is never used as a color by itself.
//!
//! Not supported:
//! - XPMEXT extensions
//! - HSV color specifications
//! - Loading with a different color table
//!
//! # Related Links
//! * <https://www.x.org/docs/XPM/xpm.pdf> - XPM Manual version 3.4i, which specifies the format
//! * <https://en.wikipedia.org/wiki/X_PixMap> - The XPM format on wikipedia
//! * <https://gitlab.freedesktop.org/xorg/app/rgb/raw/master/rgb.txt> - X color names

mod color;
mod palette;
mod tokens;
mod x11colors;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use image::error::{
    DecodingError, ImageError, ImageFormatHint, ImageResult, LimitError, LimitErrorKind,
};
use image::{ColorType, ImageDecoder, LimitSupport, Limits, RgbaImage};

pub use color::{parse_color, ColorError, Rgb16};
pub use palette::{
    extract_color, Palette, PaletteEntry, PixelCode, StyleKey, MAX_CHARS_PER_PIXEL,
};
pub use tokens::{Phase, TextLocation, TokenReader, TokenSource, XpmSource, DEFAULT_TOKEN_CAPACITY};
pub use x11colors::lookup as lookup_color_name;

/// Key XPM file properties determined from the `<Values>` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpmHeaderInfo {
    pub width: u32,
    pub height: u32,
    pub ncolors: u32,
    /// characters per pixel
    pub cpp: u32,
    pub hotspot: Option<(i32, i32)>,
}

/// A decoded image, one `0xAARRGGBB` value per pixel in row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub hotspot: Option<(i32, i32)>,
    pub pixels: Vec<u32>,
}

/// Fatal decoding errors. Problems with individual colors or rows are not errors.
#[derive(Debug)]
pub enum XpmDecodeError {
    /// No `XPM` marker, `{`, or header string was found
    MissingHeader,
    /// The header has neither 4 nor 6 leading integers
    BadHeaderFieldCount(usize),
    BadWidth(i32),
    BadHeight(i32),
    BadCharsPerPixel(i32),
    BadColorCount(i32),
    /// The color string with this index could not be read
    MissingColor(u32),
    /// The color table or the pixel buffer could not be allocated
    OutOfMemory,
}

impl fmt::Display for XpmDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => f.write_str("Failed to find the <Values> section"),
            Self::BadHeaderFieldCount(n) => f.write_fmt(format_args!(
                "Invalid <Values> section: {} integers, expected 4 or 6",
                n
            )),
            Self::BadWidth(w) => f.write_fmt(format_args!("Invalid image width: {}", w)),
            Self::BadHeight(h) => f.write_fmt(format_args!("Invalid image height: {}", h)),
            Self::BadCharsPerPixel(c) => f.write_fmt(format_args!(
                "Invalid number of characters per pixel: {} is not in [1,{}]",
                c, MAX_CHARS_PER_PIXEL
            )),
            Self::BadColorCount(n) => {
                f.write_fmt(format_args!("Invalid number of colors: {}", n))
            }
            Self::MissingColor(i) => f.write_fmt(format_args!(
                "Failed to read color {} of the <Colors> section",
                i
            )),
            Self::OutOfMemory => f.write_str("Not enough memory for the image"),
        }
    }
}

impl std::error::Error for XpmDecodeError {}

impl From<XpmDecodeError> for ImageError {
    fn from(e: XpmDecodeError) -> ImageError {
        match e {
            XpmDecodeError::OutOfMemory => ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::InsufficientMemory,
            )),
            e => ImageError::Decoding(DecodingError::new(ImageFormatHint::Name("XPM".into()), e)),
        }
    }
}

/// Helper trait for the pattern in which, after calling a function returning a Result,
/// one wishes to use an error from a different source.
trait XpmDecoderIoInjectionExt {
    type Value;
    fn apply_after(self, err: Option<std::io::Error>) -> Result<Self::Value, ImageError>;
}

impl<X> XpmDecoderIoInjectionExt for Result<X, XpmDecodeError> {
    type Value = X;
    fn apply_after(self, err: Option<std::io::Error>) -> Result<Self::Value, ImageError> {
        match self {
            Self::Ok(x) => {
                if let Some(err) = err {
                    // Only tolerated parts of the image were lost to this error
                    log::warn!("XPM: read error, image may be incomplete: {}", err);
                }
                Ok(x)
            }
            Self::Err(e) => match err {
                Some(err) => Err(ImageError::IoError(err)),
                None => Err(e.into()),
            },
        }
    }
}

/// Scan up to `N` integers the way a chain of C `%d` conversions would: each may be
/// preceded by whitespace and a sign; scanning stops at the first one which fails.
fn scan_ints<const N: usize>(data: &[u8]) -> ([i32; N], usize) {
    let mut values = [0; N];
    let mut pos = 0;
    for (count, value) in values.iter_mut().enumerate() {
        while pos < data.len() && palette::is_xpm_space(data[pos]) {
            pos += 1;
        }
        let start = pos;
        if pos < data.len() && (data[pos] == b'-' || data[pos] == b'+') {
            pos += 1;
        }
        let digits = pos;
        while pos < data.len() && data[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == digits {
            return (values, count);
        }
        let parsed = std::str::from_utf8(&data[start..pos])
            .ok()
            .and_then(|s| s.parse::<i32>().ok());
        match parsed {
            Some(v) => *value = v,
            None => return (values, count),
        }
    }
    (values, N)
}

/// Parse and validate the `<Values>` string: `width height ncolors cpp [x_hot y_hot]`.
fn parse_header(data: &[u8]) -> Result<XpmHeaderInfo, XpmDecodeError> {
    let (fields, count) = scan_ints::<6>(data);
    if count != 4 && count != 6 {
        return Err(XpmDecodeError::BadHeaderFieldCount(count));
    }
    let [width, height, ncolors, cpp, x_hot, y_hot] = fields;
    if width <= 0 {
        return Err(XpmDecodeError::BadWidth(width));
    }
    if height <= 0 {
        return Err(XpmDecodeError::BadHeight(height));
    }
    if cpp <= 0 || cpp as usize > MAX_CHARS_PER_PIXEL {
        return Err(XpmDecodeError::BadCharsPerPixel(cpp));
    }
    // Bound the per-color storage so that its size arithmetic cannot overflow
    if ncolors <= 0
        || ncolors >= i32::MAX / (cpp + 1)
        || ncolors as usize >= i32::MAX as usize / size_of::<PaletteEntry>()
    {
        return Err(XpmDecodeError::BadColorCount(ncolors));
    }

    Ok(XpmHeaderInfo {
        width: width as u32,
        height: height as u32,
        ncolors: ncolors as u32,
        cpp: cpp as u32,
        hotspot: (count == 6).then_some((x_hot, y_hot)),
    })
}

/// Read the header string and validate it
fn read_xpm_header<S: TokenSource>(
    source: &mut S,
    reader: &mut TokenReader,
) -> Result<XpmHeaderInfo, XpmDecodeError> {
    let token = reader
        .read_token(source, Phase::Header)
        .ok_or(XpmDecodeError::MissingHeader)?;
    parse_header(token)
}

/// Read the `<Colors>` section
fn read_xpm_palette<S: TokenSource>(
    source: &mut S,
    reader: &mut TokenReader,
    info: &XpmHeaderInfo,
) -> Result<Palette, XpmDecodeError> {
    let mut palette =
        Palette::with_capacity(info.ncolors as usize).map_err(|_| XpmDecodeError::OutOfMemory)?;
    for i in 0..info.ncolors {
        let line = reader
            .read_token(source, Phase::Palette)
            .ok_or(XpmDecodeError::MissingColor(i))?;
        palette.push(PaletteEntry::from_line(line, info.cpp as usize));
    }
    Ok(palette)
}

/// Allocate the zeroed (fully transparent) pixel buffer
fn allocate_pixels(info: &XpmHeaderInfo) -> Result<Vec<u32>, XpmDecodeError> {
    let npixels = (info.width as usize)
        .checked_mul(info.height as usize)
        .ok_or(XpmDecodeError::OutOfMemory)?;
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(npixels)
        .map_err(|_| XpmDecodeError::OutOfMemory)?;
    pixels.resize(npixels, 0);
    Ok(pixels)
}

/// Read the `<Pixels>` section into `pixels`, which holds `width * height` values.
/// Rows which are missing or too short are left untouched.
fn read_xpm_rows<S: TokenSource>(
    source: &mut S,
    reader: &mut TokenReader,
    info: &XpmHeaderInfo,
    palette: &Palette,
    pixels: &mut [u32],
) {
    let Some(fallback) = palette.fallback() else {
        return;
    };
    let cpp = info.cpp as usize;
    let row_bytes = (info.width as usize).saturating_mul(cpp);

    for (y, row) in pixels.chunks_exact_mut(info.width as usize).enumerate() {
        let Some(line) = reader.read_token(source, Phase::Row) else {
            log::warn!("XPM: row {} is missing", y);
            continue;
        };
        if line.len() < row_bytes {
            log::warn!(
                "XPM: row {} too short (need {} bytes, have {})",
                y,
                row_bytes,
                line.len()
            );
            continue;
        }

        let mut unknown = 0;
        for (pixel, code) in row.iter_mut().zip(line.chunks_exact(cpp)) {
            let entry = palette.lookup(code).unwrap_or_else(|| {
                unknown += 1;
                fallback
            });
            *pixel = palette.argb(entry);
        }
        if unknown > 0 {
            log::debug!(
                "XPM: row {} has {} pixels with unknown codes, using first color",
                y,
                unknown
            );
        }
    }
}

/// Decode a complete XPM image from `source`.
///
/// All intermediate buffers are dropped before returning; on error no pixel data is
/// produced.
pub fn decode<S: TokenSource>(source: &mut S) -> Result<DecodedImage, XpmDecodeError> {
    let mut reader = TokenReader::default();
    let info = read_xpm_header(source, &mut reader)?;
    decode_body(source, &mut reader, &info)
}

fn decode_body<S: TokenSource>(
    source: &mut S,
    reader: &mut TokenReader,
    info: &XpmHeaderInfo,
) -> Result<DecodedImage, XpmDecodeError> {
    let palette = read_xpm_palette(source, reader, info)?;
    let mut pixels = allocate_pixels(info)?;
    read_xpm_rows(source, reader, info, &palette, &mut pixels);
    Ok(DecodedImage {
        width: info.width,
        height: info.height,
        hotspot: info.hotspot,
        pixels,
    })
}

impl DecodedImage {
    /// Convert to an RGBA image. Transparent pixels are black, so the premultiplied
    /// and straight alpha forms agree.
    pub fn into_rgba_image(self) -> Option<RgbaImage> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for argb in &self.pixels {
            bytes.extend_from_slice(&argb_to_rgba(*argb));
        }
        RgbaImage::from_raw(self.width, self.height, bytes)
    }
}

fn argb_to_rgba(argb: u32) -> [u8; 4] {
    let [a, r, g, b] = argb.to_be_bytes();
    [r, g, b, a]
}

/// XPM decoder
pub struct XpmDecoder<R> {
    source: XpmSource<R>,
    reader: TokenReader,
    info: XpmHeaderInfo,
}

impl<R> XpmDecoder<R>
where
    R: BufRead,
{
    /// Create a new [XpmDecoder], reading the `<Values>` section.
    pub fn new(reader: R) -> Result<XpmDecoder<R>, ImageError> {
        let mut source = XpmSource::new(reader);
        let mut token_reader = TokenReader::default();

        // On success, a pending I/O error is left for the body to report
        let info = match read_xpm_header(&mut source, &mut token_reader) {
            Ok(info) => info,
            Err(e) => return Err(e).apply_after(source.take_io_error()),
        };

        Ok(XpmDecoder {
            source,
            reader: token_reader,
            info,
        })
    }

    /// Returns the (x,y) hotspot coordinates of the image, if the image provides them.
    pub fn hotspot(&self) -> Option<(i32, i32)> {
        self.info.hotspot
    }

    /// Decode the rest of the image into ARGB pixels
    pub fn decode(mut self) -> ImageResult<DecodedImage> {
        let image = decode_body(&mut self.source, &mut self.reader, &self.info);
        let io_error = self.source.take_io_error();
        image.apply_after(io_error)
    }
}

impl<R: BufRead> ImageDecoder for XpmDecoder<R> {
    fn dimensions(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }
    fn color_type(&self) -> ColorType {
        ColorType::Rgba8
    }
    fn read_image(self, buf: &mut [u8]) -> ImageResult<()>
    where
        Self: Sized,
    {
        let image = self.decode()?;
        for (chunk, argb) in buf.chunks_exact_mut(4).zip(image.pixels) {
            chunk.copy_from_slice(&argb_to_rgba(argb));
        }
        Ok(())
    }
    fn read_image_boxed(self: Box<Self>, buf: &mut [u8]) -> ImageResult<()> {
        (*self).read_image(buf)
    }

    fn set_limits(&mut self, limits: Limits) -> ImageResult<()> {
        limits.check_support(&LimitSupport::default())?;
        let (width, height) = self.dimensions();
        limits.check_dimensions(width, height)?;

        // The ARGB buffer and the RGBA output are both alive while copying out
        let max_pixels = u64::from(self.info.width) * u64::from(self.info.height);
        let max_image_bytes =
            max_pixels
                .checked_mul(8)
                .ok_or(ImageError::Limits(LimitError::from_kind(
                    LimitErrorKind::DimensionError,
                )))?;

        let max_table_bytes = (self.info.ncolors as u64) * (size_of::<PaletteEntry>() as u64);
        let max_bytes = max_image_bytes
            .checked_add(max_table_bytes)
            .ok_or(ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::InsufficientMemory,
            )))?;

        let max_alloc = limits.max_alloc.unwrap_or(u64::MAX);
        if max_alloc < max_bytes {
            return Err(ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::InsufficientMemory,
            )));
        }
        Ok(())
    }
}

/// Read the header, check it against `limits`, then decode the rest of the image.
fn decode_with_limits<R: BufRead>(reader: R, limits: Limits) -> ImageResult<DecodedImage> {
    let mut decoder = XpmDecoder::new(reader)?;
    decoder.set_limits(limits)?;
    decoder.decode()
}

/// Load an XPM file as an RGBA image.
///
/// Returns `None` for an empty path, or if the file cannot be opened or decoded; the
/// caller is expected to substitute a built-in image.
pub fn load<P: AsRef<Path>>(path: P) -> Option<RgbaImage> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return None;
    }

    let image = File::open(path)
        .map_err(ImageError::IoError)
        .and_then(|file| decode_with_limits(BufReader::new(file), Limits::default()));

    match image.map(DecodedImage::into_rgba_image) {
        Ok(Some(image)) => Some(image),
        Ok(None) => {
            log::error!("Failed to load XPM file: {}", path.display());
            None
        }
        Err(e) => {
            log::error!("Failed to load XPM file: {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Read;

    /// A reader which fails with an I/O error once `limit` bytes have been read
    struct FailingReader<'a> {
        data: &'a [u8],
        pos: usize,
        limit: usize,
    }

    impl Read for FailingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.limit {
                return Err(std::io::Error::other("device went away"));
            }
            let end = self.limit.min(self.data.len()).min(self.pos + buf.len());
            let n = end - self.pos;
            buf[..n].copy_from_slice(&self.data[self.pos..end]);
            self.pos = end;
            Ok(n)
        }
    }

    fn failing_at(data: &[u8], limit: usize) -> BufReader<FailingReader<'_>> {
        BufReader::new(FailingReader {
            data,
            pos: 0,
            limit,
        })
    }

    fn decode_bytes(data: &[u8]) -> Result<DecodedImage, XpmDecodeError> {
        decode(&mut XpmSource::new(data))
    }

    #[test]
    fn two_pixels() {
        let data = b"/* XPM */
static char *test[] = {
\"2 1 2 1\",
\". c #000000\",
\"X c #FFFFFF\",
\".X\"
};
";
        let image = decode_bytes(data).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.pixels, vec![0xFF000000, 0xFFFFFFFF]);
        assert_eq!(image.hotspot, None);
    }

    #[test]
    fn header_validation() {
        for (values, expected) in [
            ("0 1 2 1", "width"),
            ("1 0 2 1", "height"),
            ("-1 1 2 1", "width"),
            ("1 1 0 1", "colors"),
            ("1 1 2 0", "characters"),
            ("1 1 2 32", "characters"),
            ("1 1 2", "integers"),
            ("1 1 2 1 5", "integers"),
            ("a 1 2 1", "integers"),
            ("1 1 2000000000 1", "colors"),
            ("99999999999 1 1 1", "integers"),
        ] {
            let data = format!(
                "/* XPM */ static char *x[] = {{ \"{}\", \"  c red\", \"  \" }};",
                values
            );
            let err = decode_bytes(data.as_bytes()).unwrap_err();
            assert!(err.to_string().contains(expected), "{}: {}", values, err);
        }
    }

    #[test]
    fn header_fields() {
        assert_eq!(
            parse_header(b"16 8 3 2").unwrap(),
            XpmHeaderInfo {
                width: 16,
                height: 8,
                ncolors: 3,
                cpp: 2,
                hotspot: None
            }
        );
        assert_eq!(parse_header(b" 4 4 1 1 -1 +2 ").unwrap().hotspot, Some((-1, 2)));
        // trailing text after the fourth integer is ignored
        assert_eq!(parse_header(b"4 4 1 1 XPMEXT").unwrap().hotspot, None);
        assert_eq!(parse_header(b"1 1 1 31").unwrap().cpp, 31);
    }

    #[test]
    fn missing_header() {
        assert!(matches!(
            decode_bytes(b"static char *x[] = { \"1 1 1 1\" };"),
            Err(XpmDecodeError::MissingHeader)
        ));
        assert!(matches!(
            decode_bytes(b""),
            Err(XpmDecodeError::MissingHeader)
        ));
    }

    #[test]
    fn missing_color_is_fatal() {
        let data = b"/* XPM */ static char *x[] = { \"1 1 2 1\", \"a c red\" };";
        assert!(matches!(
            decode_bytes(data),
            Err(XpmDecodeError::MissingColor(1))
        ));
    }

    #[test]
    fn short_and_missing_rows_stay_transparent() {
        let data = b"/* XPM */
static char *x[] = {
\"2 3 1 1\",
\"a c #ff0000\",
\"aa\",
\"a\",
\"aa\"
};";
        let image = decode_bytes(data).unwrap();
        assert_eq!(
            image.pixels,
            vec![0xffff0000, 0xffff0000, 0, 0, 0xffff0000, 0xffff0000]
        );

        // the last row is missing entirely
        let data = b"/* XPM */ static char *x[] = { \"1 2 1 1\", \"a c blue\", \"a\" };";
        let image = decode_bytes(data).unwrap();
        assert_eq!(image.pixels, vec![0xff0000ff, 0]);
    }

    #[test]
    fn unknown_code_uses_first_color() {
        let data = b"/* XPM */ static char *x[] = { \"3 1 2 1\", \"a c #00ff00\", \"b c #0000ff\", \"bza\" };";
        let image = decode_bytes(data).unwrap();
        assert_eq!(image.pixels, vec![0xff0000ff, 0xff00ff00, 0xff00ff00]);
    }

    #[test]
    fn transparent_colors() {
        let data = b"/* XPM */
static char *x[] = {
\"4 1 4 1\",
\"  c None\",
\". s mask\",
\"? c no such color\",
\"# c black m white\",
\" .?#\"
};";
        let image = decode_bytes(data).unwrap();
        assert_eq!(image.pixels, vec![0, 0, 0, 0xff000000]);
    }

    #[test]
    fn first_duplicate_code_wins() {
        let data = b"/* XPM */ static char *x[] = { \"1 1 2 1\", \"a c red\", \"a c blue\", \"a\" };";
        assert_eq!(decode_bytes(data).unwrap().pixels, vec![0xffff0000]);
    }

    #[test]
    fn multi_char_codes_and_comments() {
        let data = b"/* XPM */
static const char * icon_xpm[] = {
/* <Values> */
\"2 2 2 2 0 1\",
/* <Colors> */
\"aa c #123456\",
\"b  g4 gray c #FEDCBA98 7654\",
/* <Pixels> */
\"aab \",
\"b aa\"
};";
        let image = decode_bytes(data).unwrap();
        assert_eq!(image.hotspot, Some((0, 1)));
        // "#FEDCBA98 7654" is not a valid hex color; the entry is transparent
        assert_eq!(image.pixels, vec![0xff123456, 0, 0, 0xff123456]);
    }

    #[test]
    fn image_decoder_outputs_rgba() {
        let data = b"/* XPM */
static char *test[] = {
\"2 1 2 1\",
\". c None\",
\"X c #FF8000\",
\".X\"
};
";
        let decoder = XpmDecoder::new(&data[..]).unwrap();
        assert_eq!(decoder.dimensions(), (2, 1));
        let mut image = vec![0xaa; decoder.total_bytes() as usize];
        decoder.read_image(&mut image).unwrap();
        assert_eq!(image, vec![0, 0, 0, 0, 0xff, 0x80, 0, 0xff]);
    }

    #[test]
    fn image_decoder_rejects_bad_header() {
        assert!(XpmDecoder::new(&b"/* XPM */ static char *x[] = { \"1 1 1\" };"[..]).is_err());
    }

    #[test]
    fn limits_are_checked() {
        let data = b"/* XPM */ static char *x[] = { \"1000 1000 1 1\", \"a c red\" };";
        let mut decoder = XpmDecoder::new(&data[..]).unwrap();
        let mut limits = Limits::default();
        limits.max_alloc = Some(1024);
        assert!(decoder.set_limits(limits).is_err());
    }

    #[test]
    fn rgba_image_conversion() {
        let image = DecodedImage {
            width: 1,
            height: 2,
            hotspot: None,
            pixels: vec![0xff102030, 0],
        };
        let rgba = image.into_rgba_image().unwrap();
        assert_eq!(rgba.get_pixel(0, 0).0, [0x10, 0x20, 0x30, 0xff]);
        assert_eq!(rgba.get_pixel(0, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn load_missing_file() {
        assert!(load("").is_none());
        assert!(load("tests/images/xpm/does-not-exist.xpm").is_none());
    }

    #[test]
    fn default_limits_reject_huge_images() {
        let data = b"/* XPM */ static char *x[] = { \"40000 40000 1 1\", \"a c red\" };";
        let err = decode_with_limits(&data[..], Limits::default()).unwrap_err();
        assert!(matches!(err, ImageError::Limits(_)), "{}", err);

        let data = b"/* XPM */ static char *x[] = { \"1 1 1 1\", \"a c red\", \"a\" };";
        let image = decode_with_limits(&data[..], Limits::default()).unwrap();
        assert_eq!(image.pixels, vec![0xffff0000]);
    }

    #[test]
    fn io_error_in_header() {
        let data = b"/* XPM */ static char *x[] = { \"1 1 1 1\", \"a c red\", \"a\" };";
        let err = XpmDecoder::new(failing_at(data, 12)).err().unwrap();
        assert!(matches!(err, ImageError::IoError(_)), "{}", err);
    }

    #[test]
    fn io_error_replaces_fatal_error() {
        let data = b"/* XPM */ static char *x[] = { \"1 1 1 1\", \"a c red\", \"a\" };";
        let cut = data.windows(3).position(|w| w == b"\"a ").unwrap();
        let decoder = XpmDecoder::new(failing_at(data, cut)).unwrap();
        let err = decoder.decode().unwrap_err();
        assert!(matches!(err, ImageError::IoError(_)), "{}", err);
    }

    #[test]
    fn io_error_in_rows_is_tolerated() {
        let data = b"/* XPM */ static char *x[] = { \"1 2 1 1\", \"a c red\", \"a\", \"a\" };";
        // fail on the opening quote of the last row
        let cut = data.len() - 6;
        let decoder = XpmDecoder::new(failing_at(data, cut)).unwrap();
        let image = decoder.decode().unwrap();
        assert_eq!(image.pixels, vec![0xffff0000, 0]);
    }
}
