//! Output sinks a workbook can be written to

use std::fs::File;
use std::io::{self, BufWriter, Cursor, Seek, Write};

/// A byte stream that receives the finished package.
///
/// The ZIP container needs `Write + Seek`; [`Sink::finish`] decides what
/// happens to the stream once the archive is complete.
pub trait Sink: Write + Seek + Sized {
    /// What the caller gets back after the workbook is closed
    type Output;

    /// Complete the stream after the archive's central directory was written
    fn finish(self) -> io::Result<Self::Output>;
}

/// In-memory packages are rewound so they can be read straight away.
impl Sink for Cursor<Vec<u8>> {
    type Output = Cursor<Vec<u8>>;

    fn finish(mut self) -> io::Result<Self::Output> {
        self.flush()?;
        self.rewind()?;
        Ok(self)
    }
}

/// Files are flushed, synced and closed.
impl Sink for File {
    type Output = ();

    fn finish(mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl Sink for BufWriter<File> {
    type Output = ();

    fn finish(self) -> io::Result<()> {
        let file = self.into_inner().map_err(|e| e.into_error())?;
        file.finish()
    }
}
