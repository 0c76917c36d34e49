use std::{
    cmp::{max, min},
    fmt,
    io::{self, Read},
    ops,
};

use super::{Error, Input};


/// The initial size of the buffer in bytes.
const START_BUFFER_SIZE: usize = 8 * 1024;

/// The maximum size the internal buffer can grow to.
///
/// Each "piece" of information in a PLY file (a header line, one line of an
/// ASCII body, one binary value) is usually very small. The internal buffer
/// only has to hold one such piece at a time. A degenerated file (e.g. an
/// ASCII line of several megabytes) would otherwise make us buffer the whole
/// file, so we return an error instead.
pub(crate) const MAX_BUFFER_SIZE: usize = 4 * 1024 * 1024;

static_assertions::const_assert!(MAX_BUFFER_SIZE <= u32::max_value() as usize);
static_assertions::const_assert!(START_BUFFER_SIZE <= MAX_BUFFER_SIZE);

#[derive(Clone)]
pub(crate) struct Buffer<R: Read> {
    reader: R,

    buf: Vec<u8>,

    /// Points to the first byte in `buf` that is real data. Invariants:
    /// - `0 <= start <= buf.len()`
    /// - `start <= end`
    start: usize,

    /// Points to the byte after the last byte of real data. Invariants:
    /// - `0 <= end <= buf.len()`
    /// - `start <= end`
    end: usize,

    consumed_total: usize,
}

impl<R: Read> fmt::Debug for Buffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Buffer {{ consumed_total: {}, .. }}", self.consumed_total)
    }
}

impl<R: Read> Buffer<R> {
    pub(crate) fn new(reader: R) -> Result<Self, Error> {
        let mut out = Self {
            buf: vec![0; START_BUFFER_SIZE],
            reader,
            start: 0,
            end: 0,
            consumed_total: 0,
        };

        // Read once to prefill the buffer.
        out.fill_buf()?;

        Ok(out)
    }

    // =======================================================================
    // ===== Internal methods
    // =======================================================================

    fn len(&self) -> usize {
        self.end - self.start
    }

    fn cap(&self) -> usize {
        self.buf.len()
    }

    fn raw_buf(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Tries to fill the buffer with some new data, starting at `self.end`.
    ///
    /// `self.end` must not be equal to `self.cap()`! This function doesn't
    /// grow the buffer, it simply reads some data to the back of the buffer.
    fn fill_buf(&mut self) -> Result<usize, io::Error> {
        loop {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(n) => {
                    self.end += n;
                    return Ok(n);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Makes room for at least `additional` more bytes after `self.end`.
    ///
    /// This means that this function might do nothing, even if `additional` is
    /// not 0. If the buffer is already big enough, nothing happens.
    #[inline(never)]
    fn grow_buf(&mut self, additional: usize) -> Result<(), Error> {
        let space_after = self.cap() - self.end;
        let space_before = self.start;

        if space_after >= additional {
            return Ok(());
        }

        // Moving the data to the front is only worth it if the data is small
        // compared to the buffer. Otherwise alternating small and large
        // requests would make us move almost the whole buffer every time.
        if space_after + space_before >= additional && self.len() < self.cap() / 2 {
            self.buf.copy_within(self.start..self.end, 0);
        } else {
            if self.len() + additional > MAX_BUFFER_SIZE {
                return Err(Error::LookAheadTooBig(MAX_BUFFER_SIZE));
            }

            // At least twice the current size to avoid frequent
            // reallocations.
            let new_len = min(
                max(self.len() + additional, self.buf.len() * 2),
                MAX_BUFFER_SIZE,
            );

            // `Vec::resize` would copy the whole buffer anyway, so we use the
            // opportunity to move our data to the front.
            let mut new = Vec::with_capacity(new_len);
            new.extend_from_slice(self.raw_buf());
            new.resize(new_len, 0);
            self.buf = new;
        }

        // In both cases, the data starts at the very beginning now.
        self.end -= self.start;
        self.start = 0;

        Ok(())
    }

    #[inline(never)]
    fn fill_buf_by(&mut self, additional: usize) -> Result<usize, Error> {
        self.grow_buf(additional)?;

        // Read new data until we have read `additional` many bytes. We ignore
        // `Interrupted` errors and just continue.
        let mut bytes_read = 0;
        while bytes_read < additional {
            match self.reader.read(&mut self.buf[self.end + bytes_read..]) {
                // `self.buf[self.end..]` is not empty (see `grow_buf`), so the
                // reader is exhausted.
                Ok(0) => break,
                Ok(n) => bytes_read += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.end += bytes_read;
        Ok(bytes_read)
    }
}

impl<R: Read> ops::Deref for Buffer<R> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.raw_buf()
    }
}

impl<R: Read> Read for Buffer<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        // If our buffer is empty, we might need to fill it.
        if self.len() == 0 {
            // Big reads bypass our buffer.
            if buf.len() >= self.cap() {
                let n = self.reader.read(buf)?;
                self.consumed_total += n;
                return Ok(n);
            } else {
                self.fill_buf()?;
            }
        }

        let n = min(self.len(), buf.len());
        buf[..n].copy_from_slice(&self.raw_buf()[..n]);
        Input::consume(self, n);

        Ok(n)
    }
}

impl<R: Read> Input for Buffer<R> {
    fn prepare(&mut self, num_bytes: usize) -> Result<(), Error> {
        #[cold]
        #[inline(never)]
        fn fill(this: &mut Buffer<impl Read>, diff: usize) -> Result<(), Error> {
            let bytes_read = this.fill_buf_by(diff)?;

            if bytes_read < diff {
                return Err(Error::UnexpectedEof(this.consumed_total + this.len()));
            }

            Ok(())
        }

        if self.len() < num_bytes {
            return fill(self, num_bytes - self.len());
        }

        Ok(())
    }

    fn saturating_prepare(&mut self, num_bytes: usize) -> Result<(), Error> {
        if self.len() < num_bytes {
            let diff = num_bytes - self.len();
            self.fill_buf_by(diff)?;
        }

        Ok(())
    }

    fn consume(&mut self, num_bytes: usize) {
        assert!(self.start + num_bytes <= self.end);

        self.start += num_bytes;
        self.consumed_total += num_bytes;

        // If we consumed all the data, we set both indices to 0.
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    fn is_eof(&mut self) -> Result<bool, Error> {
        if self.len() == 0 {
            self.grow_buf(1)?;
            Ok(self.fill_buf()? == 0)
        } else {
            Ok(false)
        }
    }

    fn offset(&self) -> usize {
        self.consumed_total
    }
}
