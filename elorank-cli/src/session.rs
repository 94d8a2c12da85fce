/// Interactive judging loop.
///
/// Shows the pending pair, reads one command per line, and feeds the answer to
/// the engine. Generic over input/output so it can be driven from tests.
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use elorank_core::{ItemId, RatingEngine, Side};
use tracing::warn;

use crate::output::format_table;
use crate::store::save_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Judge(Side),
    Skip,
    Rankings,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "1" | "l" | "left" => Some(Command::Judge(Side::Left)),
        "2" | "right" => Some(Command::Judge(Side::Right)),
        "s" | "skip" => Some(Command::Skip),
        "r" | "rankings" | "t" | "table" => Some(Command::Rankings),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub judged: usize,
    pub skipped: usize,
}

pub fn run_session<R: BufRead, W: Write>(
    engine: &mut RatingEngine,
    paths: &HashMap<ItemId, PathBuf>,
    state_file: Option<&Path>,
    input: R,
    out: &mut W,
) -> io::Result<SessionSummary> {
    let mut summary = SessionSummary::default();
    let mut lines = input.lines();

    let (mut left, mut right) = match engine.select_pair() {
        Ok(pair) => pair,
        Err(e) => {
            writeln!(out, "{e}")?;
            return Ok(summary);
        }
    };

    loop {
        show_pair(engine, paths, &left, &right, out)?;
        write!(out, "[1] left  [2] right  [s] skip  [r] rankings  [q] quit > ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let next = match parse_command(&line) {
            Some(Command::Judge(side)) => {
                let outcome = match engine.judge_side(side) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        continue;
                    }
                };
                summary.judged += 1;
                writeln!(
                    out,
                    "Winner: {} (new rating: {:.0}, +{:.1})",
                    outcome.winner, outcome.winner_rating, outcome.delta,
                )?;
                if let Some(path) = state_file {
                    if let Err(e) = save_state(engine, path) {
                        warn!(path = %path.display(), "autosave failed: {e}");
                        writeln!(out, "Warning: could not save {}: {e}", path.display())?;
                    }
                }
                engine.select_pair()
            }
            Some(Command::Skip) => {
                let next = engine.skip();
                if next.is_ok() {
                    summary.skipped += 1;
                }
                next
            }
            Some(Command::Rankings) => {
                write!(out, "\n{}", format_table(&engine.rankings(), engine.total_comparisons()))?;
                continue;
            }
            Some(Command::Quit) => break,
            None => {
                writeln!(out, "Unrecognized input {:?}", line.trim())?;
                continue;
            }
        };

        match next {
            Ok(pair) => {
                (left, right) = pair;
            }
            Err(e) => {
                writeln!(out, "{e}")?;
                break;
            }
        }
    }

    Ok(summary)
}

fn show_pair<W: Write>(
    engine: &RatingEngine,
    paths: &HashMap<ItemId, PathBuf>,
    left: &str,
    right: &str,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "\nComparison #{}", engine.total_comparisons() + 1)?;
    for (key, id) in [("1", left), ("2", right)] {
        let location = paths.get(id).map(|p| p.display().to_string()).unwrap_or_default();
        writeln!(
            out,
            "  [{key}] {id}  (rating {:.0}, {} comparisons)  {location}",
            engine.rating(id),
            engine.comparisons_for(id),
        )?;
    }
    let seen = engine.frequency(left, right);
    if seen > 0 {
        writeln!(out, "  compared {seen} time(s) before")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::load_state;
    use elorank_core::EngineConfig;
    use std::io::Cursor;

    fn engine(items: &[&str]) -> RatingEngine {
        let mut engine = RatingEngine::new(EngineConfig {
            seed: Some(4),
            ..EngineConfig::default()
        })
        .unwrap();
        engine.load_pool(None, items.iter().copied()).unwrap();
        engine
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(" 1 "), Some(Command::Judge(Side::Left)));
        assert_eq!(parse_command("Right"), Some(Command::Judge(Side::Right)));
        assert_eq!(parse_command("s"), Some(Command::Skip));
        assert_eq!(parse_command("r"), Some(Command::Rankings));
        assert_eq!(parse_command("t"), Some(Command::Rankings));
        assert_eq!(parse_command("2"), Some(Command::Judge(Side::Right)));
        assert_eq!(parse_command("QUIT"), Some(Command::Quit));
        assert_eq!(parse_command("maybe"), None);
    }

    #[test]
    fn test_session_judges_skips_and_autosaves() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let mut e = engine(&["a.png", "b.png", "c.png"]);

        let mut out = Vec::new();
        let input = Cursor::new("1\nhuh\n\nr\n2\ns\nq\n1\n");
        let summary = run_session(&mut e, &HashMap::new(), Some(state.as_path()), input, &mut out).unwrap();

        assert_eq!(summary, SessionSummary { judged: 2, skipped: 1 });
        assert_eq!(e.total_comparisons(), 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Unrecognized input \"huh\""));
        assert!(text.contains("items ranked"));
        assert!(text.contains("Winner: "));

        let mut reloaded = engine(&["a.png", "b.png", "c.png"]);
        assert!(load_state(&mut reloaded, &state).unwrap());
        assert_eq!(reloaded.state(), e.state());
    }

    #[test]
    fn test_rankings_key_does_not_judge() {
        let mut e = engine(&["a", "b", "c"]);
        let mut out = Vec::new();
        let summary = run_session(&mut e, &HashMap::new(), None, Cursor::new("r\nR\nq\n"), &mut out).unwrap();

        assert_eq!(summary, SessionSummary::default());
        assert_eq!(e.total_comparisons(), 0);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("3 items ranked (0 comparisons)").count(), 2);
        assert!(!text.contains("Winner: "));
    }

    #[test]
    fn test_skips_are_counted_once_each() {
        let mut e = engine(&["a", "b"]);
        let mut out = Vec::new();
        let summary = run_session(&mut e, &HashMap::new(), None, Cursor::new("s\nskip\n"), &mut out).unwrap();

        assert_eq!(summary, SessionSummary { judged: 0, skipped: 2 });
        assert_eq!(e.total_comparisons(), 0);
    }

    #[test]
    fn test_session_ends_at_eof() {
        let mut e = engine(&["a", "b"]);
        let mut out = Vec::new();
        let summary = run_session(&mut e, &HashMap::new(), None, Cursor::new("2\n2\n"), &mut out).unwrap();
        assert_eq!(summary.judged, 2);
        assert_eq!(e.total_comparisons(), 2);
        assert_eq!(e.frequency("a", "b"), 2);
    }

    #[test]
    fn test_session_with_too_few_items() {
        let mut e = engine(&["lonely.png"]);
        let mut out = Vec::new();
        let summary = run_session(&mut e, &HashMap::new(), None, Cursor::new("1\n"), &mut out).unwrap();
        assert_eq!(summary, SessionSummary::default());
        assert!(String::from_utf8(out).unwrap().contains("at least 2 distinct items"));
    }
}
