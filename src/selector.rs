use log::{debug, info};
use snafu::Snafu;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use book_vote::*;

use crate::args::Args;
use crate::selector::config_reader::*;
use crate::selector::menu::Menu;
use crate::selector::summary::{build_summary_js, write_summary};

pub mod config_reader;
pub mod io_sheet;
pub mod menu;
pub mod summary;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SelectorError {
    #[snafu(display("No configuration file found, looked for {searched}"))]
    MissingConfig { searched: String },
    #[snafu(display("Problem reading in config file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Problem parsing config file {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Invalid configuration: {message}"))]
    InvalidConfig { message: String },

    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Spreadsheet {path} has no worksheet named {worksheet:?}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("No spreadsheetLocation is configured, cannot update the book list"))]
    MissingSpreadsheet {},
    #[snafu(display("Error writing books to {path}"))]
    WritingBookList {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },

    #[snafu(display("Error talking to the console"))]
    Console { source: std::io::Error },
}

pub type SelectorResult<T> = Result<T, SelectorError>;

/// Runs one interactive session on the console.
///
/// Reads the configuration, then hands the standard input and output to the menu until
/// the user exits or a book is selected.
pub fn run_session(args: &Args) -> SelectorResult<()> {
    let config_path = find_config(args.config.as_deref())?;
    let config = read_config(&config_path)?;
    info!("run_session: config: {:?}", config);
    let rules = config.vote_rules()?;

    let mut engine = match args.seed {
        Some(seed) => VoteEngine::with_seed(rules, seed),
        None => VoteEngine::new(rules),
    };

    let book_list: PathBuf = args
        .book_list
        .clone()
        .unwrap_or_else(|| config.book_list_location.clone())
        .into();
    debug!("run_session: book list: {:?}", book_list);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let selection = run_menu(
        &mut engine,
        &config,
        &book_list,
        stdin.lock(),
        stdout.lock(),
    )?;

    if let (Some(out), Some(sel)) = (args.out.as_deref(), selection) {
        let js = build_summary_js(&sel);
        write_summary(out, &js)?;
    }
    Ok(())
}

pub fn run_menu<I: BufRead, O: Write>(
    engine: &mut VoteEngine,
    config: &SelectorConfig,
    book_list: &Path,
    input: I,
    output: O,
) -> SelectorResult<Option<summary::Selection>> {
    let mut menu = Menu::new(engine, config, book_list, input, output);
    menu.run()
}
