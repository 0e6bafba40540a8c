//! Line-store adapters.
//!
//! | Adapter        | Backing                  | Used for                     |
//! |----------------|--------------------------|------------------------------|
//! | `FsLineStore`  | one flat file            | reading log, journal file    |
//! | `MemLineStore` | shared in-memory buffer  | host tests, fault injection  |
//!
//! `FsLineStore` opens its file for each operation only and closes it on
//! every exit path (the handle is dropped at the end of the call).  A
//! rewrite goes to a sibling temp file that is then renamed over the
//! live file, so a failed rotation never leaves a half-written log.

use std::cell::RefCell;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

use crate::app::ports::{LineSink, LineStore};

// ── Filesystem ────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FsLineStore {
    path: PathBuf,
}

impl FsLineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LineSink for FsLineStore {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&record)?;
        file.flush()
    }
}

impl LineStore for FsLineStore {
    type Reader = BufReader<File>;

    fn size_bytes(&self) -> io::Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn open_reader(&self) -> io::Result<Self::Reader> {
        File::open(&self.path).map(BufReader::new)
    }

    fn replace_contents(&mut self, contents: &[u8]) -> io::Result<()> {
        let tmp = self.temp_path();
        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        debug!(
            "Files: rewrote {} ({} bytes)",
            self.path.display(),
            contents.len()
        );
        Ok(())
    }
}

// ── In-memory ─────────────────────────────────────────────────

#[derive(Default)]
struct MemInner {
    bytes: Vec<u8>,
    fail_append: Option<io::ErrorKind>,
    fail_rewrite: Option<io::ErrorKind>,
    appends: usize,
    rewrites: usize,
}

/// Cloneable handle to a shared in-memory store.
#[derive(Clone, Default)]
pub struct MemLineStore {
    inner: Rc<RefCell<MemInner>>,
}

impl MemLineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().bytes = contents.as_bytes().to_vec();
        store
    }

    /// Fail every later append with `kind`.
    pub fn fail_appends(&self, kind: io::ErrorKind) {
        self.inner.borrow_mut().fail_append = Some(kind);
    }

    /// Fail every later rewrite with `kind`.
    pub fn fail_rewrites(&self, kind: io::ErrorKind) {
        self.inner.borrow_mut().fail_rewrite = Some(kind);
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.borrow().bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn appends(&self) -> usize {
        self.inner.borrow().appends
    }

    pub fn rewrites(&self) -> usize {
        self.inner.borrow().rewrites
    }
}

impl LineSink for MemLineStore {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        let mut inner = self.inner.borrow_mut();
        if let Some(kind) = inner.fail_append {
            return Err(io::Error::new(kind, "injected append failure"));
        }
        inner.bytes.extend_from_slice(line.as_bytes());
        inner.bytes.push(b'\n');
        inner.appends += 1;
        Ok(())
    }
}

impl LineStore for MemLineStore {
    type Reader = Cursor<Vec<u8>>;

    fn size_bytes(&self) -> io::Result<u64> {
        Ok(self.inner.borrow().bytes.len() as u64)
    }

    fn open_reader(&self) -> io::Result<Self::Reader> {
        Ok(Cursor::new(self.inner.borrow().bytes.clone()))
    }

    fn replace_contents(&mut self, contents: &[u8]) -> io::Result<()> {
        let mut inner = self.inner.borrow_mut();
        if let Some(kind) = inner.fail_rewrite {
            return Err(io::Error::new(kind, "injected rewrite failure"));
        }
        inner.bytes = contents.to_vec();
        inner.rewrites += 1;
        Ok(())
    }
}
