use anyhow::{Context, Result};
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// Shared simulation output log.
///
/// Cloning yields another handle to the same file. Writes go through one
/// lock, independent of the memory manager's, and a block of lines is
/// written as a unit so one access never interleaves with another's.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Mutex<LogSinkInner>>,
}

struct LogSinkInner {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl LogSink {
    /// Create (or truncate) the log at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("opening output log at {:?}", path))?;
        let inner = LogSinkInner {
            writer: BufWriter::new(file),
            path,
        };
        Ok(LogSink {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    pub fn write_line(&self, line: &str) -> Result<()> {
        self.write_block(std::slice::from_ref(&line))
    }

    pub fn write_block<S: AsRef<str>>(&self, lines: &[S]) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        for line in lines {
            writeln!(inner.writer, "{}", line.as_ref())
                .with_context(|| format!("writing to output log {:?}", inner.path))?;
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.writer.flush().context("flushing output log")?;
        Ok(())
    }
}
