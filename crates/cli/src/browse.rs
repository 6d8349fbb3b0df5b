use std::io::Write;

use stockcast_core::app::{PendingSearch, PredictionApp};
use stockcast_core::domain::prediction::CompanyResult;
use stockcast_core::search::{Key, SearchEvent};
use stockcast_core::view::{idle, ViewState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::render;

pub const HELP: &str = "\
Type to search. Commands:
  <empty line>  press Enter
  #N            pick suggestion N
  @SYM          click a popular chip
  > / <         next / previous page
  ?N            open detail for card N, `?` closes it
  :help         this text
  :q            quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Type(String),
    Enter,
    Suggestion(usize),
    Chip(String),
    NextPage,
    PrevPage,
    Detail(usize),
    CloseDetail,
    Help,
    Quit,
}

/// Suggestion and card numbers are 1-based on screen.
pub fn parse_line(line: &str) -> BrowseCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();

    match trimmed {
        "" => return BrowseCommand::Enter,
        ":q" | ":quit" => return BrowseCommand::Quit,
        ":help" => return BrowseCommand::Help,
        ">" => return BrowseCommand::NextPage,
        "<" => return BrowseCommand::PrevPage,
        "?" => return BrowseCommand::CloseDetail,
        _ => {}
    }

    if let Some(n) = trimmed.strip_prefix('#').and_then(one_based) {
        return BrowseCommand::Suggestion(n);
    }
    if let Some(n) = trimmed.strip_prefix('?').and_then(one_based) {
        return BrowseCommand::Detail(n);
    }
    if let Some(sym) = trimmed.strip_prefix('@').filter(|s| !s.trim().is_empty()) {
        return BrowseCommand::Chip(sym.trim().to_uppercase());
    }

    BrowseCommand::Type(line.to_string())
}

fn one_based(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok().filter(|n| *n >= 1).map(|n| n - 1)
}

type Outcome = (PendingSearch, anyhow::Result<Option<CompanyResult>>);

pub async fn run(mut app: PredictionApp) -> anyhow::Result<()> {
    let page_size = app.results().page_size();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    app.mount();
    app.handle(SearchEvent::Focus);

    print!("{}", render::hero(app.search().catalog()));
    println!("{HELP}");

    loop {
        prompt(&app)?;
        let mut idle_updates = app.results().idle_updates();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let cmd = parse_line(&line);
                if cmd == BrowseCommand::Quit {
                    break;
                }
                apply(&mut app, cmd, &tx, page_size);
            }
            Some((pending, outcome)) = rx.recv() => {
                if app.complete(&pending, outcome) {
                    print!("{}", render::results(&app.render(), page_size));
                }
            }
            _ = idle::next_tick(&mut idle_updates) => {
                // Redraw the prompt line with the new phrase.
                print!("\r\x1b[2K");
            }
        }
    }

    app.unmount();
    Ok(())
}

fn prompt(app: &PredictionApp) -> anyhow::Result<()> {
    let hint = match app.results().state() {
        ViewState::Empty => app.results().idle_phrase(),
        ViewState::Loading => "loading",
        _ => "search",
    };
    print!("[{hint}] > ");
    std::io::stdout().flush()?;
    Ok(())
}

fn apply(
    app: &mut PredictionApp,
    cmd: BrowseCommand,
    tx: &mpsc::UnboundedSender<Outcome>,
    page_size: usize,
) {
    let event = match cmd {
        BrowseCommand::Type(text) => SearchEvent::Input(text),
        BrowseCommand::Enter => SearchEvent::Key(Key::Enter),
        BrowseCommand::Suggestion(i) => SearchEvent::SuggestionClicked(i),
        BrowseCommand::Chip(sym) => {
            if app.search().catalog().chip(&sym).is_none() {
                println!("{sym} is not a popular stock; type it and press Enter instead.");
                return;
            }
            SearchEvent::ChipClicked(sym)
        }
        BrowseCommand::NextPage => {
            app.results_mut().next_page();
            print!("{}", render::results(&app.render(), page_size));
            return;
        }
        BrowseCommand::PrevPage => {
            app.results_mut().prev_page();
            print!("{}", render::results(&app.render(), page_size));
            return;
        }
        BrowseCommand::Detail(i) => {
            if app.results_mut().select(i) {
                print!("{}", render::results(&app.render(), page_size));
            } else {
                println!("No card {}", i + 1);
            }
            return;
        }
        BrowseCommand::CloseDetail => {
            app.results_mut().clear_selection();
            print!("{}", render::results(&app.render(), page_size));
            return;
        }
        BrowseCommand::Help => {
            print!("{HELP}");
            return;
        }
        BrowseCommand::Quit => return,
    };

    let Some(pending) = app.handle(event) else {
        if app.search().is_loading() {
            println!("A search is already running.");
        }
        print!("{}", render::suggestions(app.search()));
        return;
    };

    println!("Searching {}...", pending.symbol);
    let source = app.source();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = pending.fetch(source.as_ref()).await;
        let _ = tx.send((pending, outcome));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_line(""), BrowseCommand::Enter);
        assert_eq!(parse_line("  \n"), BrowseCommand::Enter);
        assert_eq!(parse_line(":q"), BrowseCommand::Quit);
        assert_eq!(parse_line("#2"), BrowseCommand::Suggestion(1));
        assert_eq!(parse_line("@nvda"), BrowseCommand::Chip("NVDA".to_string()));
        assert_eq!(parse_line(">"), BrowseCommand::NextPage);
        assert_eq!(parse_line("<"), BrowseCommand::PrevPage);
        assert_eq!(parse_line("?3"), BrowseCommand::Detail(2));
        assert_eq!(parse_line("?"), BrowseCommand::CloseDetail);
    }

    #[test]
    fn anything_else_is_typed_text() {
        assert_eq!(parse_line("apple"), BrowseCommand::Type("apple".to_string()));
        assert_eq!(parse_line("#0"), BrowseCommand::Type("#0".to_string()));
        assert_eq!(parse_line("@"), BrowseCommand::Type("@".to_string()));
        assert_eq!(
            parse_line("AAPL - Apple Inc.\n"),
            BrowseCommand::Type("AAPL - Apple Inc.".to_string())
        );
    }
}
