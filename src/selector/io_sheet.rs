// Primitives for building the book list out of a spreadsheet export.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::{debug, info, warn};
use snafu::prelude::*;

use std::fs;
use std::path::Path;

use book_vote::{format_catalog_line, BookId};

use crate::selector::*;

/// Reads the suggestions worksheet of an Excel export and returns the lines of a book list.
///
/// The first row is a header. Column A holds the book number, column B the title.
pub fn read_sheet_book_list(path: &str, worksheet: &str) -> SelectorResult<Vec<String>> {
    info!(
        "read_sheet_book_list: path: {:?} worksheet: {:?}",
        path, worksheet
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range(worksheet)
        .context(MissingWorksheetSnafu { path, worksheet })?
        .context(OpeningExcelSnafu { path })?;
    Ok(sheet_rows_to_lines(wrange.rows()))
}

pub fn sheet_rows_to_lines<'a, I>(rows: I) -> Vec<String>
where
    I: Iterator<Item = &'a [DataType]>,
{
    let mut res: Vec<String> = Vec::new();
    // The header is not a book.
    for (idx, row) in rows.enumerate().skip(1) {
        let rowno = idx + 1;
        let id = row.first().and_then(read_book_id);
        let name = row.get(1).and_then(read_book_name);
        match (id, name) {
            (Some(id), Some(name)) => {
                let line = format_catalog_line(id, &name);
                debug!("sheet_rows_to_lines: row: {:?} line: {:?}", rowno, line);
                res.push(line);
            }
            _ => {
                warn!(
                    "sheet_rows_to_lines: skipping row {}: could not understand {:?}",
                    rowno, row
                );
            }
        }
    }
    res
}

fn read_book_id(cell: &DataType) -> Option<BookId> {
    match cell {
        DataType::Int(i) => Some(*i),
        DataType::Float(f) if f.fract() == 0.0 => Some(*f as BookId),
        DataType::String(s) => s.trim().parse::<BookId>().ok(),
        _ => None,
    }
}

fn read_book_name(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Replaces the content of the book list with the given lines.
pub fn write_book_list(path: &Path, lines: &[String]) -> SelectorResult<()> {
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(path, contents).context(WritingBookListSnafu {
        path: path.display().to_string(),
    })?;
    info!("write_book_list: {} books written to {:?}", lines.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::config_reader;
    use book_vote::BookCatalog;

    fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    #[test]
    fn rows_become_catalog_lines() {
        let rows: Vec<Vec<DataType>> = vec![
            vec![s("Number"), s("Title"), s("Suggested by")],
            vec![DataType::Float(1.0), s("Dune"), s("Alice")],
            vec![DataType::Int(2), s("Solaris: a novel"), DataType::Empty],
            vec![s(" 3 "), s("Emma")],
            vec![DataType::Empty, s("Nameless number")],
            vec![DataType::Int(5), DataType::Empty],
            vec![DataType::Float(6.5), s("Half")],
        ];
        let lines = sheet_rows_to_lines(rows.iter().map(|r| r.as_slice()));
        assert_eq!(
            lines,
            vec![
                "1: Dune".to_string(),
                "2: Solaris- a novel".to_string(),
                "3: Emma".to_string(),
            ]
        );
    }

    #[test]
    fn written_list_reads_back() {
        let path = std::env::temp_dir().join(format!(
            "book-selector-io-sheet-{}.txt",
            std::process::id()
        ));
        let lines = vec!["1: Dune".to_string(), "2: Emma".to_string()];
        write_book_list(&path, &lines).unwrap();
        let mut c = BookCatalog::new();
        let skipped = c.load_file(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert!(skipped.is_empty());
        assert_eq!(c.get(2), Some("EMMA"));
    }

    #[test]
    fn missing_spreadsheet_is_an_error() {
        let res = read_sheet_book_list(
            "/nonexistent/suggestions.xlsx",
            config_reader::DEFAULT_WORKSHEET,
        );
        assert!(matches!(res, Err(SelectorError::OpeningExcel { .. })));
    }
}
