use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Seekable front for a forward-only sink.
///
/// Bytes land in an anonymous temp file first and may be rewritten there
/// until the next `flush`, which hands everything written so far to the sink
/// and forgets it. Seeking back into bytes that were already handed over
/// fails. Memory use is one copy buffer regardless of member size.
pub(crate) struct MemberSpool<W: Write> {
    sink: W,
    spool: File,
    /// Stream offset of the first byte still held in the spool.
    committed: u64,
    /// Bytes currently held in the spool.
    held: u64,
    pos: u64,
    halted: Arc<AtomicBool>,
}

/// Stops a [`MemberSpool`] from handing anything more to its sink.
pub(crate) struct Halt(Arc<AtomicBool>);

impl Halt {
    pub(crate) fn halt(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl<W: Write> MemberSpool<W> {
    pub(crate) fn new(sink: W) -> io::Result<(Self, Halt)> {
        let halted = Arc::new(AtomicBool::new(false));
        let spool = Self {
            sink,
            spool: tempfile::tempfile()?,
            committed: 0,
            held: 0,
            pos: 0,
            halted: halted.clone(),
        };
        Ok((spool, Halt(halted)))
    }

    fn commit(&mut self) -> io::Result<()> {
        if self.halted.load(Ordering::Acquire) {
            return Ok(());
        }
        if self.pos != self.committed + self.held {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "flush while positioned before the end of the spool",
            ));
        }
        if self.held > 0 {
            self.spool.seek(SeekFrom::Start(0))?;
            let n = io::copy(&mut (&mut self.spool).take(self.held), &mut self.sink)?;
            if n != self.held {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "spool shorter than recorded",
                ));
            }
            self.spool.set_len(0)?;
            self.committed += self.held;
            self.held = 0;
        }
        self.spool.seek(SeekFrom::Start(0))?;
        self.sink.flush()
    }
}

impl<W: Write> Write for MemberSpool<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.spool.write(buf)?;
        self.pos += n as u64;
        self.held = self.held.max(self.pos - self.committed);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit()
    }
}

impl<W: Write> Read for MemberSpool<W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.spool.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<W: Write> Seek for MemberSpool<W> {
    fn seek(&mut self, to: SeekFrom) -> io::Result<u64> {
        let end = self.committed + self.held;
        let target = match to {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::Current(d) => self.pos.checked_add_signed(d),
            SeekFrom::End(d) => end.checked_add_signed(d),
        };
        let target = match target {
            Some(t) if t >= self.committed => t,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "cannot seek into bytes already streamed",
                ));
            }
        };
        self.spool.seek(SeekFrom::Start(target - self.committed))?;
        self.pos = target;
        Ok(target)
    }
}
