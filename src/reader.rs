use std::io::{ErrorKind, Read};

use memchr::memrchr;

use crate::error::Result;

/// A run of whole records, ending on a '\n' unless it is the last chunk of
/// the input.
#[derive(Debug)]
pub struct Chunk {
    buf: Vec<u8>,
    index: usize,
}

impl Chunk {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Gives the backing buffer back so the reader can fill it again.
    pub fn into_buffer(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads the input in `block_size` windows and cuts each one at its last
/// '\n'. The bytes after that newline are carried into the next chunk.
pub struct ChunkReader<R> {
    inner: R,
    block_size: usize,
    leftover: Vec<u8>,
    finished: bool,
    produced: usize,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(inner: R, block_size: usize) -> Self {
        Self {
            inner,
            block_size: block_size.max(1),
            leftover: Vec::new(),
            finished: false,
            produced: 0,
        }
    }

    /// Number of chunks handed out so far.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Fills `buf` with the next chunk. `buf` may be a recycled buffer from an
    /// earlier chunk; its contents are discarded.
    ///
    /// Returns `None` once the input is exhausted and the leftover flushed.
    pub fn next_chunk(&mut self, mut buf: Vec<u8>) -> Result<Option<Chunk>> {
        loop {
            if self.finished {
                return Ok(None);
            }

            // leftover from the previous window goes first
            buf.clear();
            buf.extend_from_slice(&self.leftover);
            self.leftover.clear();
            let carried = buf.len();

            buf.resize(carried + self.block_size, 0);
            let bytes_read = self.fill(&mut buf[carried..])?;
            let filled = carried + bytes_read;
            buf.truncate(filled);

            if bytes_read < self.block_size {
                // end of input, flush whatever is left even without a '\n'
                self.finished = true;
                if filled == 0 {
                    return Ok(None);
                }
                return Ok(Some(self.emit(buf)));
            }

            match memrchr(b'\n', &buf[carried..]) {
                Some(pos) => {
                    let last_newline = carried + pos;
                    self.leftover.extend_from_slice(&buf[last_newline + 1..]);
                    buf.truncate(last_newline + 1);
                    return Ok(Some(self.emit(buf)));
                }
                None => {
                    // a single record spans the whole window, keep growing it
                    self.leftover.extend_from_slice(&buf);
                }
            }
        }
    }

    fn emit(&mut self, buf: Vec<u8>) -> Chunk {
        let chunk = Chunk {
            buf,
            index: self.produced,
        };
        self.produced += 1;
        chunk
    }

    // Reads until `window` is full or the input ends.
    fn fill(&mut self, window: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < window.len() {
            match self.inner.read(&mut window[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}
