use snafu::Snafu;
use std::fmt::Display;

/// The position-independent identifier of a book in the catalog.
///
/// Voters refer to books by this number when casting a ballot.
pub type BookId = i64;

// ******** Output data structures *********

/// One line of the tally: how many entries of the pool a book holds.
#[derive(PartialEq, Debug, Clone)]
pub struct TallyRow {
    pub name: String,
    pub count: u64,
    /// The total size of the pool when the tally was taken.
    pub total: u64,
    pub probability_percent: f64,
}

impl TallyRow {
    pub fn votes_column(&self) -> String {
        format!("{} out of {} votes,", self.count, self.total)
    }

    pub fn chance_column(&self) -> String {
        format!(
            "{} chance of being selected",
            format_percent(self.probability_percent)
        )
    }
}

/// The running totals of the pool, one row per distinct book.
///
/// Rows follow the order in which each book first entered the pool.
/// The `Display` implementation renders the rows as three left-aligned columns.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Tally {
    pub rows: Vec<TallyRow>,
    pub total: u64,
}

impl Tally {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let columns: Vec<(String, String, String)> = self
            .rows
            .iter()
            .map(|r| (format!("{}:", r.name), r.votes_column(), r.chance_column()))
            .collect();
        let w1 = columns.iter().map(|c| c.0.chars().count()).max().unwrap_or(0);
        let w2 = columns.iter().map(|c| c.1.chars().count()).max().unwrap_or(0);
        let w3 = columns.iter().map(|c| c.2.chars().count()).max().unwrap_or(0);
        for (c1, c2, c3) in columns.iter() {
            let line = format!("{:<w1$} {:<w2$} {:<w3$}", c1, c2, c3);
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// The outcome of a selection draw.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Draw {
    /// The index drawn in the pool (the "magic number").
    pub index: usize,
    pub book: String,
}

/// What an accepted ballot added to the pool.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotReceipt {
    pub voter: String,
    /// For each rank of the ballot, in order: the book and the number of pool entries it received.
    pub entries: Vec<(String, u64)>,
}

impl BallotReceipt {
    pub fn added(&self) -> u64 {
        self.entries.iter().map(|(_, w)| *w).sum()
    }
}

/// Errors that reject a ballot or a draw.
///
/// None of them leave the engine in a modified state.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VotingError {
    /// The name is empty once spaces, periods and exclamation marks are stripped.
    /// Such a name is refused rather than counted as a voter of its own.
    #[snafu(display("The voter name is empty"))]
    MissingVoterName {},

    #[snafu(display("Voter {voter} already exists, no additions will be made"))]
    DuplicateVoter { voter: String },

    #[snafu(display("Could not parse a book number out of {token:?}"))]
    InvalidRankFormat { token: String },

    #[snafu(display("There were {given} votes when at most {allowed} are expected"))]
    TooManyRanks { given: usize, allowed: usize },

    #[snafu(display(
        "Book number {rank} is out of range (the catalog holds {catalog_size} books){}",
        not_loaded_hint(*rank)
    ))]
    RankOutOfRange { rank: BookId, catalog_size: usize },

    #[snafu(display("There is no book with number {rank} in the catalog"))]
    UncatalogedRank { rank: BookId },

    #[snafu(display("No weight is configured for vote number {}", position + 1))]
    UndefinedRankWeight { position: usize },

    #[snafu(display("No votes have been cast, there is nothing to select from"))]
    EmptyPoolError {},
}

fn not_loaded_hint(rank: BookId) -> &'static str {
    if rank == 1 {
        ". 1 is bigger than the number of books, the book list was probably never read in"
    } else {
        ""
    }
}

// ********* Configuration **********

/// What to do with a ballot that ranks more books than `num_votes`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum BallotLengthPolicy {
    /// Report the excess with a warning and accept the ballot anyway.
    /// Ranks without a configured weight still reject the ballot.
    Lenient,
    /// Reject the ballot.
    Strict,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    /// The number of books each voter is asked to rank.
    pub num_votes: usize,
    /// The pool entries added for the first, second and third ranked book.
    pub rank_weights: [u64; 3],
    pub ballot_length: BallotLengthPolicy,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        num_votes: 3,
        rank_weights: [3, 2, 1],
        ballot_length: BallotLengthPolicy::Lenient,
    };

    /// The weight of the book at the given 0-based position in a ballot.
    pub fn weight_for_rank(&self, position: usize) -> Result<u64, VotingError> {
        self.rank_weights
            .get(position)
            .cloned()
            .ok_or(VotingError::UndefinedRankWeight { position })
    }
}

impl Default for VoteRules {
    fn default() -> Self {
        VoteRules::DEFAULT_RULES
    }
}

/// Formats a percentage with three significant digits, dropping trailing zeros.
///
/// 60.0 -> "60", 100.0/3.0 -> "33.3", 20.0/3.0 -> "6.67"
pub fn format_percent(p: f64) -> String {
    if !p.is_finite() || p <= 0.0 {
        return "0".to_string();
    }
    let magnitude = p.log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let s = format!("{:.*}", decimals, p);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_three_significant_digits() {
        assert_eq!(format_percent(60.0), "60");
        assert_eq!(format_percent(40.0), "40");
        assert_eq!(format_percent(100.0), "100");
        assert_eq!(format_percent(100.0 / 3.0), "33.3");
        assert_eq!(format_percent(20.0 / 3.0), "6.67");
        assert_eq!(format_percent(0.5), "0.5");
        assert_eq!(format_percent(0.0), "0");
    }

    #[test]
    fn weights_beyond_third_rank_are_undefined() {
        let rules = VoteRules::DEFAULT_RULES;
        assert_eq!(rules.weight_for_rank(0), Ok(3));
        assert_eq!(rules.weight_for_rank(2), Ok(1));
        assert_eq!(
            rules.weight_for_rank(3),
            Err(VotingError::UndefinedRankWeight { position: 3 })
        );
    }

    #[test]
    fn tally_columns_are_aligned() {
        let tally = Tally {
            rows: vec![
                TallyRow {
                    name: "DUNE".to_string(),
                    count: 3,
                    total: 15,
                    probability_percent: 20.0,
                },
                TallyRow {
                    name: "THE LEFT HAND OF DARKNESS".to_string(),
                    count: 12,
                    total: 15,
                    probability_percent: 80.0,
                },
            ],
            total: 15,
        };
        let rendered = tally.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        let votes_at: Vec<usize> = lines.iter().map(|l| l.find("out of").unwrap()).collect();
        assert_eq!(votes_at[0] - 2, votes_at[1] - 3);
        let chance_at: Vec<usize> = lines.iter().map(|l| l.find("chance").unwrap()).collect();
        assert_eq!(chance_at[0], chance_at[1]);
        assert!(lines[0].starts_with("DUNE:"));
    }

    #[test]
    fn rank_one_out_of_range_mentions_the_book_list() {
        let e = VotingError::RankOutOfRange {
            rank: 1,
            catalog_size: 0,
        };
        assert!(e.to_string().contains("never read in"));
        let e = VotingError::RankOutOfRange {
            rank: 5,
            catalog_size: 1,
        };
        assert!(!e.to_string().contains("never read in"));
    }
}
