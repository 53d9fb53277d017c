//! XPM color definition lines and the palette built from them.
//!
//! A color definition line has the form `<code> {<key> <color>}+`, for example
//! `"a  s background m white c #c0c0c0"`. Color names may contain spaces; since the
//! keys `m`, `s`, `g4`, `g` and `c` are never words of a color name, a name runs until
//! the next key or the end of the line.

use std::collections::TryReserveError;

use super::color::{parse_color, Rgb16};

/// Longest pixel code accepted in the header (exclusive bound is 32).
pub const MAX_CHARS_PER_PIXEL: usize = 31;

/// Types of visuals for which a color should be used, in increasing order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKey {
    /// `s`: symbolic name; never used for pixel color on its own
    Symbolic,
    /// `m`
    Mono,
    /// `g4`
    Grayscale4,
    /// `g`
    Grayscale,
    /// `c`
    Color,
}

impl StyleKey {
    fn from_word(word: &[u8]) -> Option<StyleKey> {
        match word {
            b"s" => Some(Self::Symbolic),
            b"m" => Some(Self::Mono),
            b"g4" => Some(Self::Grayscale4),
            b"g" => Some(Self::Grayscale),
            b"c" => Some(Self::Color),
            _ => None,
        }
    }

    /// Higher wins.
    pub fn priority(self) -> u8 {
        match self {
            Self::Symbolic => 1,
            Self::Mono => 2,
            Self::Grayscale4 => 3,
            Self::Grayscale => 4,
            Self::Color => 5,
        }
    }
}

/// Whitespace inside quoted XPM strings, ASCII only
pub(crate) fn is_xpm_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

fn words(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|b| is_xpm_space(*b)).filter(|w| !w.is_empty())
}

enum LineState {
    AwaitingKey,
    /// A key was just read; the next word belongs to its color name
    AwaitingName(StyleKey),
    Accumulating(StyleKey, Vec<u8>),
}

/// Best color name found so far, with the priority of the key it was given for.
struct BestColor {
    priority: u8,
    name: Vec<u8>,
}

impl BestColor {
    fn offer(&mut self, key: StyleKey, name: Vec<u8>) {
        // Strictly greater: among equal keys the first one stays
        if key.priority() > self.priority {
            self.priority = key.priority();
            self.name = name;
        }
    }
}

/// Pick the color name to use from the key/color pairs of a color definition line
/// (with the pixel code already removed).
///
/// Returns `None` if the line does not start with a key, or if no key other than `s`
/// has a name after it.
pub fn extract_color(line: &[u8]) -> Option<Vec<u8>> {
    let mut best = BestColor {
        priority: StyleKey::Symbolic.priority(),
        name: Vec::new(),
    };
    let mut state = LineState::AwaitingKey;

    for word in words(line) {
        state = match state {
            LineState::AwaitingKey => LineState::AwaitingName(StyleKey::from_word(word)?),
            LineState::AwaitingName(key) => LineState::Accumulating(key, word.to_vec()),
            LineState::Accumulating(key, mut name) => match StyleKey::from_word(word) {
                Some(next) => {
                    best.offer(key, name);
                    LineState::AwaitingName(next)
                }
                None => {
                    name.push(b' ');
                    name.extend_from_slice(word);
                    LineState::Accumulating(key, name)
                }
            },
        };
    }

    // A trailing key with no name adds nothing, but earlier pairs still count
    if let LineState::Accumulating(key, name) = state {
        best.offer(key, name);
    }

    if best.priority > StyleKey::Symbolic.priority() {
        Some(best.name)
    } else {
        None
    }
}

/// Pixel code of a palette entry. Holds up to [MAX_CHARS_PER_PIXEL] bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PixelCode {
    buf: [u8; MAX_CHARS_PER_PIXEL],
    len: u8,
}

impl PixelCode {
    /// Take the first `cpp` bytes of `data`, or all of it if shorter.
    pub fn new(data: &[u8], cpp: usize) -> PixelCode {
        let len = data.len().min(cpp).min(MAX_CHARS_PER_PIXEL);
        let mut buf = [0u8; MAX_CHARS_PER_PIXEL];
        buf[..len].copy_from_slice(&data[..len]);
        PixelCode {
            buf,
            len: len as u8,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

impl std::fmt::Debug for PixelCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", String::from_utf8_lossy(self.as_bytes())))
    }
}

/// One resolved line of the color table.
#[derive(Debug, Clone, Copy)]
pub struct PaletteEntry {
    pub code: PixelCode,
    pub color: Rgb16,
    pub transparent: bool,
}

impl PaletteEntry {
    /// Build an entry from a whole color definition line. Colors which cannot be
    /// resolved, and the name `none`, give a transparent black entry.
    pub fn from_line(line: &[u8], cpp: usize) -> PaletteEntry {
        let code = PixelCode::new(line, cpp);
        let rest = &line[code.as_bytes().len()..];

        let color = extract_color(rest)
            .filter(|name| !name.eq_ignore_ascii_case(b"none"))
            .map(|name| parse_color(&name).map_err(|e| (name, e)));

        match color {
            Some(Ok(color)) => PaletteEntry {
                code,
                color,
                transparent: false,
            },
            other => {
                if let Some(Err((name, e))) = other {
                    log::warn!(
                        "XPM: color {:?} for code {:?} is transparent: {}",
                        String::from_utf8_lossy(&name),
                        code,
                        e
                    );
                }
                PaletteEntry {
                    code,
                    color: Rgb16::default(),
                    transparent: true,
                }
            }
        }
    }
}

/// XPM color palette storage
///
/// Entries are kept in file order and searched linearly: codes are not checked for
/// uniqueness, and the first entry with a matching code wins.
pub struct Palette {
    table: Vec<PaletteEntry>,
    has_transparency: bool,
}

impl Palette {
    /// Create an empty palette with room for `ncolors` entries.
    pub fn with_capacity(ncolors: usize) -> Result<Palette, TryReserveError> {
        let mut table = Vec::new();
        table.try_reserve_exact(ncolors)?;
        Ok(Palette {
            table,
            has_transparency: false,
        })
    }

    pub fn push(&mut self, entry: PaletteEntry) {
        self.has_transparency |= entry.transparent;
        self.table.push(entry);
    }

    /// Whether any entry is transparent
    pub fn has_transparency(&self) -> bool {
        self.has_transparency
    }

    /// The first entry of the table, used for pixel codes that match no entry
    pub fn fallback(&self) -> Option<&PaletteEntry> {
        self.table.first()
    }

    pub fn lookup(&self, code: &[u8]) -> Option<&PaletteEntry> {
        self.table.iter().find(|entry| entry.code.as_bytes() == code)
    }

    /// ARGB value of a pixel drawn with `entry`
    pub fn argb(&self, entry: &PaletteEntry) -> u32 {
        let alpha: u32 = if self.has_transparency && entry.transparent {
            0
        } else {
            0xff
        };
        let color = entry.color;
        (alpha << 24)
            | (((color.red >> 8) as u32) << 16)
            | (((color.green >> 8) as u32) << 8)
            | ((color.blue >> 8) as u32)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(line: &str) -> Option<String> {
        extract_color(line.as_bytes()).map(|v| String::from_utf8(v).unwrap())
    }

    #[test]
    fn single_color_key() {
        assert_eq!(extract("c red").as_deref(), Some("red"));
        assert_eq!(extract("  \tc   #FFFFFF  ").as_deref(), Some("#FFFFFF"));
    }

    #[test]
    fn symbolic_only_has_no_color() {
        assert_eq!(extract("s MyIcon"), None);
        assert_eq!(extract("s MyIcon s Other"), None);
    }

    #[test]
    fn priority_beats_order() {
        assert_eq!(extract("m black c red").as_deref(), Some("red"));
        assert_eq!(extract("c red m black").as_deref(), Some("red"));
        assert_eq!(extract("s sym m black g4 gray").as_deref(), Some("gray"));
        assert_eq!(extract("g4 gray c red g4 blue").as_deref(), Some("red"));
    }

    #[test]
    fn ties_keep_first() {
        assert_eq!(extract("c red c blue").as_deref(), Some("red"));
        assert_eq!(extract("m white m black").as_deref(), Some("white"));
    }

    #[test]
    fn multi_word_names() {
        assert_eq!(
            extract("s white c light  gray g4 None").as_deref(),
            Some("light gray")
        );
        assert_eq!(extract("m antique white").as_deref(), Some("antique white"));
    }

    #[test]
    fn word_after_key_is_always_a_name() {
        assert_eq!(extract("m c red").as_deref(), Some("c red"));
        assert_eq!(extract("c c").as_deref(), Some("c"));
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(extract(""), None);
        assert_eq!(extract("   "), None);
        assert_eq!(extract("red"), None);
        assert_eq!(extract("x c red"), None);
        assert_eq!(extract("c"), None);
    }

    #[test]
    fn trailing_key_keeps_earlier_pairs() {
        assert_eq!(extract("c red m").as_deref(), Some("red"));
        assert_eq!(extract("m black c").as_deref(), Some("black"));
        assert_eq!(extract("s icon c"), None);

        let e = PaletteEntry::from_line(b"a c red m", 1);
        assert!(!e.transparent);
        assert_eq!(e.color.red, 65535);
    }

    #[test]
    fn entry_from_line() {
        let e = PaletteEntry::from_line(b". c #000000", 1);
        assert_eq!(e.code.as_bytes(), b".");
        assert!(!e.transparent);

        let e = PaletteEntry::from_line(b"ab c Red", 2);
        assert_eq!(e.code.as_bytes(), b"ab");
        assert_eq!(e.color.red, 65535);

        for line in [&b"  c None"[..], b"  c NONE", b"  s icon", b"  c nosuchcolor", b"  c #12"] {
            let e = PaletteEntry::from_line(line, 1);
            assert!(e.transparent);
            assert_eq!(e.color, Rgb16::default());
        }

        // shorter than the code width
        let e = PaletteEntry::from_line(b"a", 3);
        assert_eq!(e.code.as_bytes(), b"a");
        assert!(e.transparent);
    }

    #[test]
    fn palette_lookup_and_alpha() {
        let mut palette = Palette::with_capacity(3).unwrap();
        palette.push(PaletteEntry::from_line(b"a c #ff0000", 1));
        palette.push(PaletteEntry::from_line(b"b c None", 1));
        palette.push(PaletteEntry::from_line(b"a c #0000ff", 1));
        assert!(palette.has_transparency());
        assert_eq!(palette.len(), 3);

        let a = palette.lookup(b"a").unwrap();
        assert_eq!(palette.argb(a), 0xffff0000);
        let b = palette.lookup(b"b").unwrap();
        assert_eq!(palette.argb(b), 0x00000000);
        assert!(palette.lookup(b"z").is_none());
        assert_eq!(palette.fallback().unwrap().code.as_bytes(), b"a");
    }
}
