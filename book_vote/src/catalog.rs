use log::{debug, info, warn};
use snafu::{ResultExt, Snafu};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::BookId;

/// A line of the book list that could not be understood. It is skipped.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CatalogLineError {
    #[snafu(display("Line {lineno} of the book list ({line:?}) {reason}"))]
    MalformedCatalogLine {
        lineno: usize,
        line: String,
        reason: String,
    },
}

/// Failure to read the book list as a whole.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CatalogError {
    #[snafu(display("Error reading in books from {path}"))]
    CatalogSourceUnreadable {
        source: std::io::Error,
        path: String,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// The mapping from book number to book title.
///
/// Titles are stored upper-cased and trimmed. Loading more lines into an existing
/// catalog overwrites entries with the same number and keeps the others.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BookCatalog {
    books: BTreeMap<BookId, String>,
}

impl BookCatalog {
    pub fn new() -> BookCatalog {
        BookCatalog {
            books: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: BookId) -> Option<&str> {
        self.books.get(&id).map(|s| s.as_str())
    }

    /// The books, by increasing number.
    pub fn iter(&self) -> impl Iterator<Item = (BookId, &str)> {
        self.books.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn insert(&mut self, id: BookId, name: &str) {
        self.books.insert(id, normalize_book_name(name));
    }

    /// Reads the book list at the given location into the catalog.
    ///
    /// If the file cannot be opened, the catalog is not modified.
    pub fn load_file(&mut self, path: &Path) -> CatalogResult<Vec<CatalogLineError>> {
        let path_s = path.display().to_string();
        info!("load_file: reading book list {:?}", path_s);
        let f = File::open(path).context(CatalogSourceUnreadableSnafu {
            path: path_s.clone(),
        })?;
        self.load_lines(BufReader::new(f), &path_s)
    }

    /// Merges every `<number>: <title>` line of the reader into the catalog.
    ///
    /// Malformed lines, including lines that are not valid UTF-8, are logged, skipped and
    /// returned; they do not stop the load. The lines are merged only once the whole reader
    /// has been consumed: if reading fails midway, the catalog is not modified.
    /// `origin` only serves to label the errors.
    pub fn load_lines<R: BufRead>(
        &mut self,
        mut reader: R,
        origin: &str,
    ) -> CatalogResult<Vec<CatalogLineError>> {
        let mut parsed: Vec<(BookId, String)> = Vec::new();
        let mut skipped: Vec<CatalogLineError> = Vec::new();
        let mut buf: Vec<u8> = Vec::new();
        let mut lineno = 0;
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .context(CatalogSourceUnreadableSnafu { path: origin })?;
            if n == 0 {
                break;
            }
            lineno += 1;
            let res = match std::str::from_utf8(&buf) {
                Ok(text) => {
                    let line = text.trim_end_matches(&['\r', '\n'][..]);
                    if line.trim().is_empty() {
                        continue;
                    }
                    parse_catalog_line(lineno, line)
                }
                Err(_) => Err(CatalogLineError::MalformedCatalogLine {
                    lineno,
                    line: String::from_utf8_lossy(&buf).trim_end().to_string(),
                    reason: "is not valid UTF-8".to_string(),
                }),
            };
            match res {
                Ok((id, name)) => {
                    debug!("load_lines: lineno: {:?} id: {:?} name: {:?}", lineno, id, name);
                    parsed.push((id, name));
                }
                Err(e) => {
                    warn!("load_lines: {}: {}", origin, e);
                    skipped.push(e);
                }
            }
        }
        let loaded = parsed.len();
        // Later lines win over earlier ones with the same number.
        self.books.extend(parsed);
        info!(
            "load_lines: {} books read in from {}, {} lines skipped, catalog size {}",
            loaded,
            origin,
            skipped.len(),
            self.books.len()
        );
        Ok(skipped)
    }
}

fn normalize_book_name(name: &str) -> String {
    name.trim().to_uppercase()
}

fn parse_catalog_line(lineno: usize, line: &str) -> Result<(BookId, String), CatalogLineError> {
    let malformed = |reason: &str| CatalogLineError::MalformedCatalogLine {
        lineno,
        line: line.to_string(),
        reason: reason.to_string(),
    };
    let splits: Vec<&str> = line.split(':').collect();
    match splits.as_slice() {
        [id_s, name] => {
            let id = id_s
                .trim()
                .parse::<BookId>()
                .map_err(|e| malformed(&format!("has an invalid book number: {}", e)))?;
            Ok((id, normalize_book_name(name)))
        }
        [_] => Err(malformed("contains no colon")),
        _ => Err(malformed("contains more than one colon")),
    }
}

/// Produces one line of a book list.
///
/// Colons in the title are replaced by dashes, since the colon separates the fields.
pub fn format_catalog_line(id: BookId, name: &str) -> String {
    format!("{}: {}", id, name.replace(':', "-"))
}
