use memchr::memchr;

use crate::error::{Error, Result};

/// Digits allowed in one temperature, not counting the sign. Keeps every
/// decoded value comfortably inside an `i32` of tenths.
pub const MAX_TEMP_DIGITS: usize = 9;

/// Temperature digits with the decimal point removed, sign kept.
#[derive(Debug, Clone, Copy)]
pub struct Digits {
    bytes: [u8; MAX_TEMP_DIGITS + 1],
    len: u8,
}

impl Digits {
    fn new() -> Self {
        Self {
            bytes: [0; MAX_TEMP_DIGITS + 1],
            len: 0,
        }
    }

    #[inline(always)]
    fn push(&mut self, c: u8) {
        self.bytes[self.len as usize] = c;
        self.len += 1;
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub name: &'a [u8],
    pub digits: Digits,
}

/// Walks a chunk of `<name>;<temp>\n` records without allocating.
///
/// The last record of a chunk may lack its '\n'. Anything that does not
/// look like a record is reported as [`Error::MalformedRecord`].
pub struct Scanner<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Byte offset of the next record within the chunk.
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    pub fn next_record(&mut self) -> Result<Option<Record<'a>>> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }

        let rest = &self.buf[self.pos..];
        let end = memchr(b'\n', rest).unwrap_or(rest.len());
        let line = &rest[..end];
        self.pos += end + 1;

        let sep = match memchr(b';', line) {
            Some(sep) => sep,
            None => return Err(Error::malformed(line, "missing ';' separator")),
        };
        let name = &line[..sep];
        if name.is_empty() {
            return Err(Error::malformed(line, "empty station name"));
        }
        let digits = strip_temperature(&line[sep + 1..])
            .map_err(|reason| Error::malformed(line, reason))?;

        return Ok(Some(Record { name, digits }));
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

// Copies `-?\d+\.\d` into `Digits`, dropping the '.'.
#[inline(always)]
fn strip_temperature(temp: &[u8]) -> std::result::Result<Digits, &'static str> {
    let mut digits = Digits::new();
    let mut i = 0;

    if temp.first() == Some(&b'-') {
        digits.push(b'-');
        i = 1;
    }

    let int_start = i;
    while i < temp.len() && temp[i].is_ascii_digit() {
        if i - int_start + 1 >= MAX_TEMP_DIGITS {
            return Err("temperature has too many digits");
        }
        digits.push(temp[i]);
        i += 1;
    }
    if i == int_start {
        return Err("temperature has no integer digits");
    }

    if temp.get(i) != Some(&b'.') {
        return Err("temperature must have exactly one fractional digit");
    }
    match temp.get(i + 1) {
        Some(c) if c.is_ascii_digit() && i + 2 == temp.len() => digits.push(*c),
        _ => return Err("temperature must have exactly one fractional digit"),
    }

    Ok(digits)
}
