use log::{debug, info};
use snafu::prelude::*;

use std::io::{BufRead, Write};
use std::path::Path;

use book_vote::*;

use crate::selector::config_reader::SelectorConfig;
use crate::selector::io_sheet::{read_sheet_book_list, write_book_list};
use crate::selector::summary::Selection;
use crate::selector::*;

const OPTIONS: &str = "
Select one of the following options:

a/A: Add the selections of a voter.
r/R: Read in the list of books.
w/W: Update the book list from the spreadsheet export.
select: Select a book randomly based on the given votes and finish the program (select must be typed completely)
x: Exit Book Selector.

What would you like to do next?";

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Command {
    AddVoter,
    ReadBooks,
    WriteBooks,
    Select,
    Exit,
    Unknown,
}

impl Command {
    fn parse(raw: &str) -> Command {
        match raw.trim().to_uppercase().as_str() {
            "A" => Command::AddVoter,
            "R" => Command::ReadBooks,
            "W" => Command::WriteBooks,
            "SELECT" => Command::Select,
            "X" => Command::Exit,
            _ => Command::Unknown,
        }
    }
}

/// The interactive text menu.
///
/// Every error coming from the engine, the book list or the spreadsheet is shown to the
/// user and the menu carries on. Only failing to talk to the console stops it.
pub struct Menu<'a, I: BufRead, O: Write> {
    engine: &'a mut VoteEngine,
    config: &'a SelectorConfig,
    book_list: &'a Path,
    input: I,
    output: O,
}

impl<'a, I: BufRead, O: Write> Menu<'a, I, O> {
    pub fn new(
        engine: &'a mut VoteEngine,
        config: &'a SelectorConfig,
        book_list: &'a Path,
        input: I,
        output: O,
    ) -> Menu<'a, I, O> {
        Menu {
            engine,
            config,
            book_list,
            input,
            output,
        }
    }

    /// Runs until the user exits, the input ends, or a book gets selected.
    pub fn run(&mut self) -> SelectorResult<Option<Selection>> {
        self.say("\nWelcome to Book Selector!")?;
        let mut display = true;
        loop {
            if display {
                self.print_status()?;
                self.say(OPTIONS)?;
            }
            let line = match self.read_line()? {
                Some(l) => l,
                None => {
                    info!("run: end of input");
                    return Ok(None);
                }
            };
            let command = Command::parse(&line);
            debug!("run: command: {:?}", command);
            display = true;
            match command {
                Command::AddVoter => self.add_voter()?,
                Command::ReadBooks => self.read_books()?,
                Command::WriteBooks => self.write_books()?,
                Command::Select => {
                    if let Some(sel) = self.select()? {
                        return Ok(Some(sel));
                    }
                    display = false;
                }
                Command::Exit => {
                    self.say("\n\nNow exiting Book Selector!\n")?;
                    return Ok(None);
                }
                Command::Unknown => self.say(
                    "That isn't an option that Book Selector understands. Please try again!",
                )?,
            }
        }
    }

    fn add_voter(&mut self) -> SelectorResult<()> {
        self.say("\nWhat is the name of the voter?")?;
        let name = self.read_line()?.unwrap_or_default();
        let rules = self.engine.rules();
        let prompt = format!(
            "\nPlease enter {} votes separated by commas. Your first three votes will receive a weighting of {}, {}, and {} respectively.\n",
            rules.num_votes, rules.rank_weights[0], rules.rank_weights[1], rules.rank_weights[2]
        );
        self.say(&prompt)?;
        let ranks = self.read_line()?.unwrap_or_default();
        match self.engine.cast_ballot(&name, &ranks) {
            Ok(receipt) => {
                let msg = format!(
                    "\nAdded the votes of {} ({} entries).",
                    receipt.voter,
                    receipt.added()
                );
                self.say(&msg)
            }
            Err(e) => self.say(&format!("\nError: {}", e)),
        }
    }

    fn read_books(&mut self) -> SelectorResult<()> {
        let book_list = self.book_list;
        match self.engine.catalog_mut().load_file(book_list) {
            Ok(skipped) => {
                for e in skipped.iter() {
                    self.say(&format!("ERROR: {}", e))?;
                }
                self.say("\nBOOKS HAVE BEEN READ IN")
            }
            Err(e) => self.say(&format!("{}: {}", e, source_message(&e))),
        }
    }

    fn write_books(&mut self) -> SelectorResult<()> {
        let msg = match self.import_spreadsheet() {
            Ok(n) => format!(
                "\n{} BOOKS WRITTEN TO {}, READ THEM IN WITH R",
                n,
                self.book_list.display()
            ),
            Err(e) => format!("Error: {}", e),
        };
        self.say(&msg)
    }

    fn import_spreadsheet(&self) -> SelectorResult<usize> {
        let sheet = self
            .config
            .spreadsheet_location
            .as_deref()
            .context(MissingSpreadsheetSnafu {})?;
        let lines = read_sheet_book_list(sheet, &self.config.worksheet_name())?;
        write_book_list(self.book_list, &lines)?;
        Ok(lines.len())
    }

    fn select(&mut self) -> SelectorResult<Option<Selection>> {
        let draw = match self.engine.draw_winner() {
            Ok(d) => d,
            Err(e) => {
                self.say(&format!("Error: {}", e))?;
                return Ok(None);
            }
        };
        let line = "~".repeat(15);
        let banner = format!("\n{}\n{}\n", line, line);

        self.say(&banner)?;
        let pool: Vec<String> = self
            .engine
            .pool()
            .iter()
            .enumerate()
            .map(|(i, book)| format!("{}.) {}", i, book))
            .collect();
        self.say(&pool.join("\n"))?;
        self.say(&banner)?;
        self.say("\nSELECTION TIME!\n")?;
        self.say(&banner)?;
        self.print_status()?;
        self.say(&banner)?;
        self.say(&format!("THE MAGIC NUMBER IS: {}\n", draw.index))?;
        self.say(&format!("WE WILL BE READING: \n\n{}\n", draw.book))?;

        Ok(Some(Selection {
            voters: self.engine.voters().to_vec(),
            tally: self.engine.tally(),
            draw,
        }))
    }

    fn print_status(&mut self) -> SelectorResult<()> {
        let tally = self.engine.tally();
        if tally.is_empty() {
            return Ok(());
        }
        let voters = self.engine.voters();
        let mut s = format!("\nSo far {} people have voted, they are:\n", voters.len());
        for v in voters.iter() {
            s.push_str(v);
            s.push('\n');
        }
        s.push_str("\nVOTE TOTALS AND PERCENTAGES:\n");
        s.push_str(&tally.to_string());
        self.say(&s)
    }

    fn say(&mut self, msg: &str) -> SelectorResult<()> {
        writeln!(self.output, "{}", msg).context(ConsoleSnafu {})?;
        self.output.flush().context(ConsoleSnafu {})
    }

    fn read_line(&mut self) -> SelectorResult<Option<String>> {
        let mut buf = String::new();
        let n = self.input.read_line(&mut buf).context(ConsoleSnafu {})?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(buf.trim_end_matches(&['\r', '\n'][..]).to_string()))
        }
    }
}

fn source_message(e: &CatalogError) -> String {
    std::error::Error::source(e)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn config() -> SelectorConfig {
        SelectorConfig {
            num_votes: 2,
            first_vote_weight: 3,
            second_vote_weight: 2,
            third_vote_weight: 1,
            book_list_location: "unused".to_string(),
            strict_ballot_length: None,
            spreadsheet_location: None,
            worksheet_name: None,
        }
    }

    fn session(
        engine: &mut VoteEngine,
        book_list: &Path,
        script: &str,
    ) -> (Option<Selection>, String) {
        let config = config();
        let mut out: Vec<u8> = Vec::new();
        let sel = {
            let mut menu = Menu::new(
                engine,
                &config,
                book_list,
                Cursor::new(script.to_string()),
                &mut out,
            );
            menu.run().unwrap()
        };
        (sel, String::from_utf8(out).unwrap())
    }

    fn temp_book_list(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "book-selector-menu-{}-{}.txt",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(Command::parse(" a\n"), Command::AddVoter);
        assert_eq!(Command::parse("Select"), Command::Select);
        assert_eq!(Command::parse("sel"), Command::Unknown);
        assert_eq!(Command::parse("x"), Command::Exit);
    }

    #[test]
    fn read_vote_and_select() {
        let path = temp_book_list("select", "1: Dune\n2: Foundation\nbad line\n");
        let mut engine = VoteEngine::with_seed(config().vote_rules().unwrap(), 3);
        let (sel, out) = session(&mut engine, &path, "r\na\nAlice\n1,2\nselect\n");
        let _ = std::fs::remove_file(&path);

        assert!(out.contains("BOOKS HAVE BEEN READ IN"));
        assert!(out.contains("contains no colon"));
        assert!(out.contains("Added the votes of ALICE (5 entries)"));
        assert!(out.contains("DUNE:"));
        assert!(out.contains("3 out of 5 votes"));
        assert!(out.contains("THE MAGIC NUMBER IS"));

        let sel = sel.unwrap();
        assert_eq!(sel.voters, vec!["ALICE".to_string()]);
        assert_eq!(sel.tally.total, 5);
        assert_eq!(engine.pool()[sel.draw.index], sel.draw.book);
    }

    #[test]
    fn errors_do_not_stop_the_menu() {
        let path = PathBuf::from("/nonexistent/book-list.txt");
        let mut engine = VoteEngine::with_seed(config().vote_rules().unwrap(), 3);
        let script = "r\na\nBob\n1\nselect\nw\nhello\nx\n";
        let (sel, out) = session(&mut engine, &path, script);

        assert!(sel.is_none());
        assert!(out.contains("Error reading in books from /nonexistent/book-list.txt"));
        assert!(out.contains("never read in"));
        assert!(out.contains("nothing to select from"));
        assert!(out.contains("No spreadsheetLocation is configured"));
        assert!(out.contains("Please try again"));
        assert!(out.contains("Now exiting Book Selector!"));
        assert!(engine.voters().is_empty());
    }

    #[test]
    fn duplicate_voter_is_reported() {
        let path = temp_book_list("dup", "1: Dune\n");
        let mut engine = VoteEngine::with_seed(config().vote_rules().unwrap(), 3);
        let (sel, out) = session(&mut engine, &path, "r\na\nann\n1\na\nAnn!\n1\n");
        let _ = std::fs::remove_file(&path);

        assert!(sel.is_none());
        assert!(out.contains("Voter ANN already exists"));
        assert_eq!(engine.pool().len(), 3);
    }
}
