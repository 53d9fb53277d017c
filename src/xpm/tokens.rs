//! Reading the quoted strings of an XPM file.
//!
//! An XPM file is C source declaring an array of strings. Everything the decoder needs
//! is inside the quotes: one header string, one string per color, one per pixel row.
//! [TokenSource] positions a byte stream at the next string for a given [Phase], and
//! [TokenReader] copies the string out into a buffer it owns.

use std::fmt;
use std::io::{BufRead, Bytes};

use super::palette::is_xpm_space;

/// Initial token buffer size used when loading files
pub const DEFAULT_TOKEN_CAPACITY: usize = 4096;

/// Which part of the file the next string belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The `<Values>` string, after the `XPM` marker and the opening `{`
    Header,
    /// A `<Colors>` string
    Palette,
    /// A `<Pixels>` string
    Row,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("<Values> section"),
            Self::Palette => f.write_str("<Colors> section"),
            Self::Row => f.write_str("<Pixels> section"),
        }
    }
}

/// A byte stream that knows where the strings of each phase start.
pub trait TokenSource {
    /// Advance to just before the opening quote of the next string for `phase`.
    /// Returns false if the input ends first.
    fn seek_token(&mut self, phase: Phase) -> bool;
    /// Consume the next byte. On EOF, will return None
    fn next_byte(&mut self) -> Option<u8>;
}

/// Location of a byte in the input stream.
///
/// Includes byte offset (for format debugging with hex editor) and
/// line:column offset (for format debugging with text editor)
#[derive(Clone, Copy, Debug)]
pub struct TextLocation {
    byte: u64,
    line: u64,
    column: u64,
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "byte={},line={}:col={}",
            self.byte, self.line, self.column
        ))
    }
}

/// Helper struct to project BufRead down to Iterator<Item=u8>. The first I/O error
/// ends the stream and is kept until someone takes it.
struct IoAdapter<R> {
    reader: Bytes<R>,
    error: Option<std::io::Error>,
}

impl<R> Iterator for IoAdapter<R>
where
    R: BufRead,
{
    type Item = u8;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() {
            return None;
        }
        match self.reader.next() {
            None => None,
            Some(Ok(v)) => Some(v),
            Some(Err(e)) => {
                self.error = Some(e);
                None
            }
        }
    }
}

/// [TokenSource] over the text of an XPM file.
///
/// `/* ... */` comments are skipped while looking for the header and for color
/// strings. Pixel rows are taken from the next quote without looking at what comes
/// before it.
pub struct XpmSource<R> {
    inner: IoAdapter<R>,
    current: Option<u8>,
    location: TextLocation,
}

impl<R: BufRead> XpmSource<R> {
    pub fn new(reader: R) -> XpmSource<R> {
        let mut inner = IoAdapter {
            reader: reader.bytes(),
            error: None,
        };
        let current = inner.next();
        XpmSource {
            inner,
            current,
            location: TextLocation {
                byte: 0,
                line: 1,
                column: 0,
            },
        }
    }

    /// Peek at the next byte. On EOF, will return None
    fn peek(&self) -> Option<u8> {
        self.current
    }

    fn advance(&mut self) -> Option<u8> {
        self.current?;

        let mut current = self.inner.next();
        std::mem::swap(&mut self.current, &mut current);

        self.location.byte += 1;
        self.location.column += 1;
        if let Some(b'\n') = current {
            self.location.line += 1;
            self.location.column = 0;
        }
        current
    }

    /// The location of the last byte consumed
    pub fn loc(&self) -> TextLocation {
        self.location
    }

    /// Take the I/O error which ended the stream, if there was one
    pub fn take_io_error(&mut self) -> Option<std::io::Error> {
        self.inner.error.take()
    }

    /// Skip whitespace separated words until one is exactly `word`.
    fn seek_word(&mut self, word: &[u8]) -> bool {
        let mut matched = 0;
        let mut in_word = false;
        while let Some(b) = self.advance() {
            if is_xpm_space(b) {
                if in_word && matched == word.len() {
                    return true;
                }
                in_word = false;
                matched = 0;
                continue;
            }
            if !in_word {
                in_word = true;
                matched = 0;
            }
            // usize::MAX marks a word that already differs
            if matched < word.len() && word[matched] == b {
                matched += 1;
            } else {
                matched = usize::MAX;
            }
        }
        in_word && matched == word.len()
    }

    /// Skip to the byte `c`, also skipping any `/* ... */` comments. With `consume`,
    /// the byte is consumed; otherwise the source stops right before it.
    fn seek_char(&mut self, c: u8, consume: bool) -> bool {
        while let Some(b) = self.peek() {
            if b == c {
                if consume {
                    self.advance();
                }
                return true;
            }
            self.advance();
            if b == b'/' && self.peek() == Some(b'*') {
                self.advance();
                if !self.skip_comment_body() {
                    return false;
                }
            }
        }
        false
    }

    /// Skip to just after the `*/` closing the current comment
    fn skip_comment_body(&mut self) -> bool {
        let mut star = false;
        while let Some(b) = self.advance() {
            if star && b == b'/' {
                return true;
            }
            star = b == b'*';
        }
        false
    }
}

impl<R: BufRead> TokenSource for XpmSource<R> {
    fn seek_token(&mut self, phase: Phase) -> bool {
        match phase {
            Phase::Header => {
                self.seek_word(b"XPM") && self.seek_char(b'{', true) && self.seek_char(b'"', false)
            }
            Phase::Palette => self.seek_char(b'"', false),
            Phase::Row => true,
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        self.advance()
    }
}

/// Reads quoted strings into a buffer which doubles in size whenever it fills up and
/// is reused for every string of a decode.
///
/// The last byte of the buffer is always zero, so the buffer never holds an
/// unterminated string, including after a failed read.
pub struct TokenReader {
    buf: Vec<u8>,
    len: usize,
}

impl Default for TokenReader {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TOKEN_CAPACITY)
    }
}

impl TokenReader {
    /// Create a reader whose buffer starts at `capacity` bytes (at least 2).
    pub fn with_capacity(capacity: usize) -> TokenReader {
        TokenReader {
            buf: vec![0; capacity.max(2)],
            len: 0,
        }
    }

    /// Current size of the buffer, terminator included
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The whole buffer, ending with the terminator
    #[cfg(test)]
    fn raw(&self) -> &[u8] {
        &self.buf
    }

    /// Read the next string of `phase`, without its quotes. Returns None if the input
    /// ends before the closing quote, or if the buffer cannot grow any further.
    pub fn read_token<S: TokenSource>(&mut self, source: &mut S, phase: Phase) -> Option<&[u8]> {
        self.len = 0;
        let complete = self.fill(source, phase);
        self.terminate();
        if complete {
            Some(&self.buf[..self.len])
        } else {
            None
        }
    }

    fn fill<S: TokenSource>(&mut self, source: &mut S, phase: Phase) -> bool {
        if !source.seek_token(phase) {
            return false;
        }
        loop {
            match source.next_byte() {
                None => return false,
                Some(b'"') => break,
                Some(_) => continue,
            }
        }
        while let Some(b) = source.next_byte() {
            if b == b'"' {
                return true;
            }
            if self.len + 1 >= self.buf.len() && !self.grow() {
                return false;
            }
            self.buf[self.len] = b;
            self.len += 1;
        }
        false
    }

    fn grow(&mut self) -> bool {
        let Some(new_size) = self.buf.len().checked_mul(2) else {
            return false;
        };
        if self.buf.try_reserve_exact(new_size - self.buf.len()).is_err() {
            return false;
        }
        self.buf.resize(new_size, 0);
        true
    }

    fn terminate(&mut self) {
        if let Some(last) = self.buf.last_mut() {
            *last = 0;
        }
        if self.len < self.buf.len() {
            self.buf[self.len] = 0;
        }
    }
}
