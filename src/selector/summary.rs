use log::info;
use snafu::prelude::*;

use serde_json::json;
use serde_json::Value as JSValue;
use std::fs;

use book_vote::{format_percent, Draw, Tally};

use crate::selector::*;

/// Everything shown when a book is selected.
#[derive(PartialEq, Debug, Clone)]
pub struct Selection {
    pub voters: Vec<String>,
    pub tally: Tally,
    pub draw: Draw,
}

fn tally_to_json(tally: &Tally) -> Vec<JSValue> {
    tally
        .rows
        .iter()
        .map(|r| {
            json!({
                "book": r.name,
                "votes": r.count,
                "probability": format_percent(r.probability_percent),
            })
        })
        .collect()
}

pub fn build_summary_js(sel: &Selection) -> JSValue {
    json!({
        "voters": sel.voters,
        "poolSize": sel.tally.total,
        "tally": tally_to_json(&sel.tally),
        "magicNumber": sel.draw.index,
        "winner": sel.draw.book,
    })
}

/// Writes the summary as pretty JSON to the given file, or to the standard output for `stdout`.
pub fn write_summary(out: &str, js: &JSValue) -> SelectorResult<()> {
    let pretty = serde_json::to_string_pretty(js).context(SerializingSummarySnafu {})?;
    if out == "stdout" {
        println!("{}", pretty);
    } else {
        fs::write(out, pretty).context(WritingSummarySnafu { path: out })?;
        info!("write_summary: summary written to {:?}", out);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_vote::TallyRow;

    #[test]
    fn summary_lists_tally_and_winner() {
        let sel = Selection {
            voters: vec!["ALICE".to_string()],
            tally: Tally {
                rows: vec![
                    TallyRow {
                        name: "DUNE".to_string(),
                        count: 3,
                        total: 5,
                        probability_percent: 60.0,
                    },
                    TallyRow {
                        name: "FOUNDATION".to_string(),
                        count: 2,
                        total: 5,
                        probability_percent: 40.0,
                    },
                ],
                total: 5,
            },
            draw: Draw {
                index: 4,
                book: "FOUNDATION".to_string(),
            },
        };
        let js = build_summary_js(&sel);
        assert_eq!(js["poolSize"], json!(5));
        assert_eq!(js["winner"], json!("FOUNDATION"));
        assert_eq!(js["magicNumber"], json!(4));
        assert_eq!(js["voters"], json!(["ALICE"]));
        assert_eq!(
            js["tally"],
            json!([
                {"book": "DUNE", "votes": 3, "probability": "60"},
                {"book": "FOUNDATION", "votes": 2, "probability": "40"},
            ])
        );
    }
}
