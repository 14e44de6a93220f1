//! Data sources and the lazy row sequence read from them.
//!
//! A dataset arrives in one of three shapes (a CSV file on disk, CSV text
//! already in memory, or an iterator of pre-split rows). [`DataSource`] is
//! the closed set of those shapes; [`DataSource::open`] turns any of them
//! into a [`RowSource`], a forward-only iterator of rows. The underlying
//! file handle or buffer lives inside the `RowSource` and is released when
//! it is dropped, whether the scan ran to the end, stopped at a match, or
//! bailed out on an error.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use csv::{ReaderBuilder, StringRecordsIntoIter};
use tracing::trace;

use crate::error::Result;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

pub type Row = Vec<String>;

/// An already opened sequence of rows, header first.
pub struct RowStream<'a> {
    ticket: u64,
    rows: Box<dyn Iterator<Item = Row> + 'a>,
}
impl<'a> RowStream<'a> {
    pub fn new<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: 'a,
    {
        Self {
            ticket: NEXT_TICKET.fetch_add(1, Ordering::Relaxed),
            rows: Box::new(rows.into_iter()),
        }
    }
    // unique per stream object within this process
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}
impl fmt::Debug for RowStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RowStream").field("ticket", &self.ticket).finish()
    }
}

#[derive(Debug)]
pub enum DataSource<'a> {
    File(&'a Path),
    Text(&'a str),
    Stream(RowStream<'a>),
}

impl<'a> DataSource<'a> {
    /// An argument naming an existing regular file is a file source, anything
    /// else is taken as CSV text.
    pub fn infer(arg: &'a str) -> Self {
        let path = Path::new(arg);
        if path.is_file() {
            DataSource::File(path)
        } else {
            DataSource::Text(arg)
        }
    }
    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::File(_) => "file",
            DataSource::Text(_) => "content",
            DataSource::Stream(_) => "stream",
        }
    }
    pub fn open(self) -> Result<RowSource<'a>> {
        let kind = self.kind();
        let inner = match self {
            DataSource::File(path) => Inner::File(csv_reader().from_path(path)?.into_records()),
            DataSource::Text(text) => Inner::Text(csv_reader().from_reader(text.as_bytes()).into_records()),
            DataSource::Stream(stream) => Inner::Stream(stream.rows),
        };
        trace!(kind, "row source opened");
        Ok(RowSource { inner, kind, read: 0 })
    }
}

fn csv_reader() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    // the header is read as an ordinary row and ragged rows are filtered later
    builder.has_headers(false).flexible(true);
    builder
}

enum Inner<'a> {
    File(StringRecordsIntoIter<File>),
    Text(StringRecordsIntoIter<&'a [u8]>),
    Stream(Box<dyn Iterator<Item = Row> + 'a>),
}

/// Lazy, forward-only rows of one dataset; the first row is the header.
pub struct RowSource<'a> {
    inner: Inner<'a>,
    kind: &'static str,
    read: usize,
}

impl<'a> RowSource<'a> {
    /// Reads the header row, `None` when the dataset has no rows at all.
    pub fn header(&mut self) -> Result<Option<Row>> {
        self.next().transpose()
    }
    /// The remaining rows, skipping any with fewer than `width` fields.
    pub fn rows(self, width: usize) -> Rows<'a> {
        Rows { source: self, width }
    }
}

impl Iterator for RowSource<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let row: Option<Result<Row>> = match &mut self.inner {
            Inner::File(records) => records
                .next()
                .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()).map_err(Into::into)),
            Inner::Text(records) => records
                .next()
                .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()).map_err(Into::into)),
            Inner::Stream(rows) => rows.next().map(Ok),
        };
        if row.is_some() {
            self.read += 1;
        }
        row
    }
}

impl Drop for RowSource<'_> {
    fn drop(&mut self) {
        trace!(kind = self.kind, rows = self.read, "row source released");
    }
}

/// Data rows wide enough to be matched against a header of `width` columns.
pub struct Rows<'a> {
    source: RowSource<'a>,
    width: usize,
}

impl Iterator for Rows<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.source.next()? {
                Ok(row) if row.len() < self.width => {
                    trace!(fields = row.len(), width = self.width, "skipping short row");
                }
                other => return Some(other),
            }
        }
    }
}
