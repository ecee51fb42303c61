use clap::Parser;

/// Collects weighted votes for book titles and randomly selects the next book to read.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration file. If not provided, book-selector.json is
    /// looked up in the conf/ directory and then in the current directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The book list to read, one "<number>: <title>" per line.
    /// Setting this option overrides the bookListLocation of the configuration.
    #[clap(short, long, value_parser)]
    pub book_list: Option<String>,

    /// (integer, optional) Seed for the selection draw. By default the current time is used.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// (file path, 'stdout' or empty) If specified, the summary of the selection will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_options() {
        let args = Args::parse_from([
            "book-selector",
            "--config",
            "conf/club.json",
            "-b",
            "books.txt",
            "--seed",
            "42",
            "--out",
            "stdout",
            "--verbose",
        ]);
        assert_eq!(args.config.as_deref(), Some("conf/club.json"));
        assert_eq!(args.book_list.as_deref(), Some("books.txt"));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.out.as_deref(), Some("stdout"));
        assert!(args.verbose);
    }

    #[test]
    fn everything_is_optional() {
        let args = Args::parse_from(["book-selector"]);
        assert_eq!(args.config, None);
        assert_eq!(args.seed, None);
        assert!(!args.verbose);
    }
}
