use log::debug;
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use book_vote::{BallotLengthPolicy, VoteRules};

use crate::selector::*;

pub const CONFIG_FILE_NAME: &str = "book-selector.json";
pub const DEFAULT_WORKSHEET: &str = "Suggestions";

// Looked up in order when no configuration file is given.
const CONFIG_DIRS: [&str; 2] = ["conf", "."];

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(rename = "numVotes", alias = "numvotes")]
    pub num_votes: usize,
    #[serde(rename = "firstVoteWeight", alias = "firstvoteweight")]
    pub first_vote_weight: u64,
    #[serde(rename = "secondVoteWeight", alias = "secondvoteweight")]
    pub second_vote_weight: u64,
    #[serde(rename = "thirdVoteWeight", alias = "thirdvoteweight")]
    pub third_vote_weight: u64,
    #[serde(rename = "bookListLocation", alias = "booklistlocation")]
    pub book_list_location: String,
    // New options, not read by earlier versions
    #[serde(rename = "strictBallotLength")]
    pub strict_ballot_length: Option<bool>,
    #[serde(rename = "spreadsheetLocation")]
    pub spreadsheet_location: Option<String>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

impl SelectorConfig {
    pub fn vote_rules(&self) -> SelectorResult<VoteRules> {
        ensure!(
            self.num_votes > 0,
            InvalidConfigSnafu {
                message: "numVotes must be at least 1"
            }
        );
        Ok(VoteRules {
            num_votes: self.num_votes,
            rank_weights: [
                self.first_vote_weight,
                self.second_vote_weight,
                self.third_vote_weight,
            ],
            ballot_length: match self.strict_ballot_length {
                Some(true) => BallotLengthPolicy::Strict,
                _ => BallotLengthPolicy::Lenient,
            },
        })
    }

    pub fn worksheet_name(&self) -> String {
        self.worksheet_name
            .clone()
            .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string())
    }
}

/// Returns the configuration file to use: the given one, or the first one found in the search path.
pub fn find_config(explicit: Option<&str>) -> SelectorResult<PathBuf> {
    if let Some(p) = explicit {
        return Ok(PathBuf::from(p));
    }
    let candidates: Vec<PathBuf> = CONFIG_DIRS
        .iter()
        .map(|d| Path::new(d).join(CONFIG_FILE_NAME))
        .collect();
    debug!("find_config: candidates: {:?}", candidates);
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .context(MissingConfigSnafu {
            searched: candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<String>>()
                .join(", "),
        })
}

pub fn read_config(path: &Path) -> SelectorResult<SelectorConfig> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu {
        path: path_s.clone(),
    })?;
    parse_config(&contents, &path_s)
}

fn parse_config(contents: &str, path: &str) -> SelectorResult<SelectorConfig> {
    serde_json::from_str(contents).context(ParsingConfigSnafu { path })
}
