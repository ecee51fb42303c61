/*!
Weighted book selection.

Each voter ranks a few books from the catalog. Every ranked book enters a pool as many
times as the weight of its rank, and the winner is an entry drawn uniformly from that pool:
the more weight a book gathered, the more likely it is to be read next.

```
use book_vote::{VoteEngine, VoteRules, BallotLengthPolicy};
# use std::io::Cursor;

let rules = VoteRules {
    num_votes: 2,
    rank_weights: [3, 2, 1],
    ballot_length: BallotLengthPolicy::Lenient,
};
let mut engine = VoteEngine::with_seed(rules, 42);
engine
    .catalog_mut()
    .load_lines(Cursor::new("1: Dune\n2: Foundation\n"), "inline")?;

engine.cast_ballot("alice", "1,2")?;
let tally = engine.tally();
assert_eq!(tally.total, 5);
assert_eq!(tally.rows[0].name, "DUNE");
assert_eq!(tally.rows[0].count, 3);

let draw = engine.draw_winner()?;
assert!(draw.book == "DUNE" || draw.book == "FOUNDATION");
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

pub mod catalog;
mod config;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snafu::{ensure, OptionExt};

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

pub use crate::catalog::{format_catalog_line, BookCatalog, CatalogError, CatalogLineError};
pub use crate::config::*;

/// Holds the state of one selection session: the catalog, who voted, and the weighted pool.
///
/// The pool only grows. A rejected ballot leaves every part of the engine as it was.
pub struct VoteEngine<R: Rng = StdRng> {
    rules: VoteRules,
    catalog: BookCatalog,
    // Insertion order, for display.
    voters: Vec<String>,
    voted: HashSet<String>,
    pool: Vec<String>,
    rng: R,
}

impl VoteEngine<StdRng> {
    /// An engine whose random source is seeded from the current time.
    pub fn new(rules: VoteRules) -> VoteEngine<StdRng> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        debug!("VoteEngine::new: seed: {}", seed);
        VoteEngine::with_seed(rules, seed)
    }

    /// An engine with a reproducible random source.
    pub fn with_seed(rules: VoteRules, seed: u64) -> VoteEngine<StdRng> {
        VoteEngine::with_rng(rules, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> VoteEngine<R> {
    pub fn with_rng(rules: VoteRules, rng: R) -> VoteEngine<R> {
        VoteEngine {
            rules,
            catalog: BookCatalog::new(),
            voters: Vec::new(),
            voted: HashSet::new(),
            pool: Vec::new(),
            rng,
        }
    }

    pub fn rules(&self) -> &VoteRules {
        &self.rules
    }

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut BookCatalog {
        &mut self.catalog
    }

    /// The normalized names of the voters, in the order they voted.
    pub fn voters(&self) -> &[String] {
        &self.voters
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// Records the ranked choices of a voter.
    ///
    /// Arguments:
    /// * `voter` the name of the voter, normalized before use
    /// * `raw_ranks` the book numbers separated by commas, most preferred first
    ///
    /// Everything is validated before the pool is touched: on error, nothing changes.
    pub fn cast_ballot(
        &mut self,
        voter: &str,
        raw_ranks: &str,
    ) -> Result<BallotReceipt, VotingError> {
        let voter = normalize_voter_name(voter);
        ensure!(!voter.is_empty(), MissingVoterNameSnafu {});
        ensure!(
            !self.voted.contains(&voter),
            DuplicateVoterSnafu {
                voter: voter.clone()
            }
        );

        let ranks = parse_ranks(raw_ranks)?;
        debug!("cast_ballot: voter: {:?} ranks: {:?}", voter, ranks);
        self.check_ballot_length(&voter, ranks.len())?;

        let mut entries: Vec<(String, u64)> = Vec::new();
        for (position, rank) in ranks.iter().enumerate() {
            let book = self.resolve_rank(*rank)?;
            let weight = self.rules.weight_for_rank(position)?;
            entries.push((book, weight));
        }

        // All checks passed: the ballot is applied as a whole.
        for (book, weight) in entries.iter() {
            for _ in 0..*weight {
                self.pool.push(book.clone());
            }
        }
        self.voted.insert(voter.clone());
        self.voters.push(voter.clone());

        let receipt = BallotReceipt { voter, entries };
        info!(
            "cast_ballot: {} added {} entries, pool size {}",
            receipt.voter,
            receipt.added(),
            self.pool.len()
        );
        Ok(receipt)
    }

    fn check_ballot_length(&self, voter: &str, given: usize) -> Result<(), VotingError> {
        let allowed = self.rules.num_votes;
        if given <= allowed {
            return Ok(());
        }
        match self.rules.ballot_length {
            BallotLengthPolicy::Strict => TooManyRanksSnafu { given, allowed }.fail(),
            BallotLengthPolicy::Lenient => {
                warn!(
                    "cast_ballot: {}: there were {} votes when we were expecting {}",
                    voter, given, allowed
                );
                Ok(())
            }
        }
    }

    fn resolve_rank(&self, rank: BookId) -> Result<String, VotingError> {
        let catalog_size = self.catalog.len();
        ensure!(
            rank >= 1 && rank as u64 <= catalog_size as u64,
            RankOutOfRangeSnafu { rank, catalog_size }
        );
        self.catalog
            .get(rank)
            .map(|s| s.to_string())
            .context(UncatalogedRankSnafu { rank })
    }

    /// Counts the pool entries of every book.
    ///
    /// Rows are in the order the books first entered the pool.
    pub fn tally(&self) -> Tally {
        let total = self.pool.len() as u64;
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for book in self.pool.iter() {
            let c = counts.entry(book.as_str()).or_insert_with(|| {
                order.push(book.as_str());
                0
            });
            *c += 1;
        }
        let rows = order
            .iter()
            .map(|name| {
                let count = counts[name];
                TallyRow {
                    name: name.to_string(),
                    count,
                    total,
                    probability_percent: 100.0 * (count as f64) / (total as f64),
                }
            })
            .collect();
        Tally { rows, total }
    }

    /// Draws one entry of the pool uniformly at random.
    ///
    /// Since books appear in the pool once per unit of weight, a book wins with a
    /// probability proportional to its total weight.
    pub fn draw_winner(&mut self) -> Result<Draw, VotingError> {
        ensure!(!self.pool.is_empty(), EmptyPoolSnafu {});
        let index = self.rng.gen_range(0..self.pool.len());
        let book = self.pool[index].clone();
        info!("draw_winner: index {} of {}: {}", index, self.pool.len(), book);
        Ok(Draw { index, book })
    }
}

/// Upper-cases the name and strips the surrounding spaces, periods and exclamation marks.
pub fn normalize_voter_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == '!')
        .to_uppercase()
}

/// Parses a comma-separated list of book numbers.
///
/// A single token that is not a number rejects the whole list.
pub fn parse_ranks(raw: &str) -> Result<Vec<BookId>, VotingError> {
    raw.split(',')
        .map(|s| {
            let token = s.trim_matches(|c: char| c.is_whitespace() || c == '!');
            token
                .parse::<BookId>()
                .ok()
                .context(InvalidRankFormatSnafu { token: s.trim() })
        })
        .collect()
}
