//! Stream sessions
//!
//! [`BinaryIo`] owns one byte stream for the duration of a session and runs
//! descriptor-driven reads and writes against it. The stream is released when
//! the session is dropped; [`BinaryIo::scoped`] wraps open/use/close so callers
//! never manage the close themselves.

use crate::config::CodecConfig;
use crate::deserialize::read_value;
use crate::error::Result;
use crate::read_context::ReadContext;
use crate::schema::Descriptor;
use crate::serialize::encode_value;
use crate::value::Value;
use bytes::buf::{Reader, Writer};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

/// How [`BinaryIo::open`] opens a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Existing file, read only
    Read,
    /// Create or truncate, write only
    Write,
    /// Create if missing, writes go to the end
    Append,
}

impl OpenMode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
        };
        options
    }
}

/// A read/write session over one owned stream
#[derive(Debug)]
pub struct BinaryIo<S> {
    stream: S,
    config: CodecConfig,
    bytes_read: u64,
    bytes_written: u64,
}

impl BinaryIo<File> {
    /// Open a file by name
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let file = mode.options().open(path)?;
        tracing::debug!(path = %path.display(), ?mode, "opened binary session");
        Ok(Self::from_file(file))
    }

    /// Take over an already opened file
    pub fn from_file(file: File) -> Self {
        Self::from_stream(file)
    }

    /// Open a file, run `f` against the session and close it on every path
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use flatcable::{BinaryIo, OpenMode, Value};
    ///
    /// let written = BinaryIo::scoped("numbers.bin", OpenMode::Write, |bio| {
    ///     bio.write(&Value::vec([1i32, 2, 3]), "vec:i")
    /// })?;
    /// # Ok::<(), flatcable::FlatcableError>(())
    /// ```
    pub fn scoped<T, F>(path: impl AsRef<Path>, mode: OpenMode, f: F) -> Result<T>
    where
        F: FnOnce(&mut BinaryIo<File>) -> Result<T>,
    {
        let session = Self::open(path, mode)?;
        session.run(f)
    }
}

impl BinaryIo<Writer<BytesMut>> {
    /// A session writing into a growable in-memory buffer
    pub fn in_memory() -> Self {
        Self::from_stream(BytesMut::new().writer())
    }

    /// Finish the session and take the written bytes
    pub fn into_bytes(self) -> Bytes {
        self.into_inner().into_inner().freeze()
    }
}

impl BinaryIo<Reader<Bytes>> {
    /// A session reading from an in-memory buffer
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data: Bytes = data.into();
        Self::from_stream(data.reader())
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.stream.get_ref().remaining()
    }
}

impl<S> BinaryIo<S> {
    /// Wrap any caller-supplied stream
    pub fn from_stream(stream: S) -> Self {
        Self::with_config(stream, CodecConfig::default())
    }

    /// Wrap a stream with explicit session settings
    pub fn with_config(stream: S, config: CodecConfig) -> Self {
        Self {
            stream,
            config,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Total bytes consumed by `read` calls in this session
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Total bytes produced by `write` calls in this session
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// End the session without flushing and hand the stream back
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Run `f` against this session, then release the stream
    ///
    /// The stream is dropped whether `f` succeeds or fails.
    pub fn run<T, F>(mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let result = f(&mut self);
        tracing::debug!(
            bytes_read = self.bytes_read,
            bytes_written = self.bytes_written,
            ok = result.is_ok(),
            "closing binary session"
        );
        result
    }
}

impl<S: Read> BinaryIo<S> {
    /// Read one value written with `descriptor`
    pub fn read(&mut self, descriptor: &str) -> Result<Value> {
        let parsed = Descriptor::parse(descriptor)?;
        self.read_parsed(&parsed)
    }

    /// Read one value with an already parsed descriptor
    pub fn read_parsed(&mut self, descriptor: &Descriptor) -> Result<Value> {
        let mut ctx = ReadContext::new(&mut self.stream);
        let result = read_value(&mut ctx, descriptor, &self.config);
        self.bytes_read += ctx.consumed();
        let value = result?;
        tracing::trace!(%descriptor, bytes = ctx.consumed(), "read value");
        Ok(value)
    }
}

impl<S: Write> BinaryIo<S> {
    /// Write one value and return the number of bytes written
    pub fn write(&mut self, value: &Value, descriptor: &str) -> Result<usize> {
        let parsed = Descriptor::parse(descriptor)?;
        self.write_parsed(value, &parsed)
    }

    /// Write one value with an already parsed descriptor
    pub fn write_parsed(&mut self, value: &Value, descriptor: &Descriptor) -> Result<usize> {
        let buf = encode_value(descriptor, value, &self.config)?;
        self.stream.write_all(&buf)?;
        self.bytes_written += buf.len() as u64;
        tracing::trace!(%descriptor, bytes = buf.len(), "wrote value");
        Ok(buf.len())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }

    /// Flush and end the session, reporting any flush failure
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        tracing::debug!(bytes_written = self.bytes_written, "closed binary session");
        Ok(())
    }
}
