//! Low level parsing infrastructure: a byte buffer over an `io::Read` with
//! lookahead, plus spans for error reporting.

use std::{
    fmt,
    io,
    ops,
};

use failure::Fail;


pub(crate) mod buf;



/// A source of bytes that can be inspected before being consumed.
///
/// Dereferencing yields the bytes that are currently buffered (and not yet
/// consumed). Use `prepare` to make sure enough bytes are buffered.
pub(crate) trait Input: io::Read + ops::Deref<Target = [u8]> {
    /// Makes sure at least `num_bytes` bytes are buffered. Returns
    /// `UnexpectedEof` if the underlying reader is exhausted before that.
    fn prepare(&mut self, num_bytes: usize) -> Result<(), Error>;

    /// Like `prepare`, but reaching EOF is not an error. Afterwards, fewer
    /// than `num_bytes` bytes are buffered if and only if EOF was reached.
    fn saturating_prepare(&mut self, num_bytes: usize) -> Result<(), Error>;

    fn consume(&mut self, num_bytes: usize);
    fn is_eof(&mut self) -> Result<bool, Error>;

    /// Number of bytes consumed so far.
    fn offset(&self) -> usize;


    fn spanned_data(&self, num_bytes: usize) -> SpannedData<'_> {
        SpannedData {
            data: &self[..num_bytes],
            span: Span::new(self.offset(), self.offset() + num_bytes),
        }
    }

    fn skip_until(&mut self, stopper: impl Stopper) -> Result<(), Error> {
        loop {
            if self.is_eof()? {
                break;
            }

            if self.len() == 0 {
                self.prepare(1)?;
            }

            if stopper.should_stop(self[0]) {
                break;
            }

            self.consume(1);
        }

        Ok(())
    }

    /// Passes everything up to (excluding) the first byte for which `stopper`
    /// returns `true` (or EOF) to `func` and consumes it on success. The
    /// stopping byte itself is not consumed.
    fn take_until<F, O>(&mut self, stopper: impl Stopper, func: F) -> Result<O, Error>
    where
        F: FnOnce(SpannedData) -> Result<O, Error>,
    {
        let mut pos = 0;
        loop {
            if self.len() <= pos {
                self.saturating_prepare(pos + 1)?;

                // EOF terminates the data.
                if self.len() <= pos {
                    break;
                }
            }

            if stopper.should_stop(self[pos]) {
                break;
            }

            pos += 1;
        }

        let out = func(self.spanned_data(pos))?;
        self.consume(pos);

        Ok(out)
    }

    /// Like `take_until`, stopping at the next line break.
    fn take_line<F, O>(&mut self, func: F) -> Result<O, Error>
    where
        F: FnOnce(SpannedData) -> Result<O, Error>,
    {
        self.take_until(is_linebreak, func)
    }

    /// Skips any number of `'\n'` and `'\r'` bytes.
    fn skip_linebreaks(&mut self) -> Result<(), Error> {
        self.skip_until(|b| !is_linebreak(b))
    }

    /// Consumes exactly one line terminator (`"\r\n"`, `"\n"` or `"\r"`), if
    /// there is one.
    fn skip_one_linebreak(&mut self) -> Result<(), Error> {
        if self.is_next(b"\r\n")? {
            self.consume(2);
        } else if self.is_next(b"\n")? || self.is_next(b"\r")? {
            self.consume(1);
        }

        Ok(())
    }

    fn is_next(&mut self, expected: &[u8]) -> Result<bool, Error> {
        self.saturating_prepare(expected.len())?;
        Ok(self.starts_with(expected))
    }
}

pub(crate) fn is_linebreak(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

#[derive(Debug)]
pub(crate) struct SpannedData<'a> {
    pub data: &'a [u8],
    pub span: Span,
}

impl<'a> SpannedData<'a> {
    pub fn assert_ascii(&self) -> Result<&'a str, Error> {
        if !self.data.is_ascii() {
            return Err(Error::NotAscii(self.span));
        }

        std::str::from_utf8(self.data).map_err(|_| Error::NotAscii(self.span))
    }

    pub fn error(&self, msg: impl Into<String>) -> Error {
        self.span.error(msg)
    }
}

/// A range of byte offsets in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn single(at: usize) -> Self {
        Self {
            lo: at,
            hi: at + 1,
        }
    }

    pub fn error(&self, msg: impl Into<String>) -> Error {
        Error::Custom(msg.into(), *self)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    #[fail(display = "unexpected EOF while parsing (at {})", _0)]
    UnexpectedEof(usize),

    #[fail(display = "unexpected non-ASCII data at {}", _0)]
    NotAscii(Span),

    #[fail(
        display = "parsing lookahead got too big (more than {} bytes, probably due to a \
            really degenerated file)",
        _0
    )]
    LookAheadTooBig(usize),

    #[fail(display = "{} (at {})", _0, _1)]
    Custom(String, Span)
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}


pub(crate) trait Stopper {
    fn should_stop(&self, byte: u8) -> bool;
}

impl Stopper for u8 {
    fn should_stop(&self, byte: u8) -> bool {
        byte == *self
    }
}

impl<F: Fn(u8) -> bool> Stopper for F {
    fn should_stop(&self, byte: u8) -> bool {
        self(byte)
    }
}
