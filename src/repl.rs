//! Line oriented front end, one command per line.

use crate::flashcard::Flashcard;
use crate::quiz::Side;
use crate::session::Session;
use anyhow::Result;
use std::io::{BufRead, Write};

const HELP: &str = "\
commands:
  add <question> | <answer>   create a flashcard
  list                        show all flashcards
  delete <n>                  delete the n-th flashcard
  reset                       delete all flashcards
  quiz                        start a quiz over the current flashcards
  flip <n>                    flip the n-th quiz card
  reset-flips                 show every quiz card's question again
  close                       leave the quiz
  help                        show this text
  quit                        exit";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Add(&'a str, &'a str),
    List,
    Delete(usize),
    Reset,
    Quiz,
    Flip(usize),
    ResetFlips,
    Close,
    Help,
    Quit,
}

fn parse(line: &str) -> Option<Command<'_>> {
    let line = line.trim();
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    // positions are 1-based
    let position = || rest.parse::<usize>().ok().filter(|n| *n > 0);
    match cmd {
        "add" => {
            let (q, a) = rest.split_once('|').unwrap_or((rest, ""));
            Some(Command::Add(q.trim(), a.trim()))
        }
        "list" | "ls" => Some(Command::List),
        "delete" | "rm" => position().map(Command::Delete),
        "reset" => Some(Command::Reset),
        "quiz" => Some(Command::Quiz),
        "flip" => position().map(Command::Flip),
        "reset-flips" => Some(Command::ResetFlips),
        "close" => Some(Command::Close),
        "help" | "?" => Some(Command::Help),
        "quit" | "exit" | "q" => Some(Command::Quit),
        _ => None,
    }
}

pub fn run(session: &mut Session, input: impl BufRead, mut out: impl Write) -> Result<()> {
    writeln!(out, "type `help` for commands")?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse(&line) else {
            writeln!(out, "unknown command: {}", line.trim())?;
            writeln!(out, "{HELP}")?;
            continue;
        };
        if command == Command::Quit {
            break;
        }
        execute(session, command, &mut out)?;
    }
    Ok(())
}

fn execute(session: &mut Session, command: Command<'_>, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Add(q, a) => match session.add_card(q, a) {
            Ok(_) => writeln!(out, "added card {}", session.store().len())?,
            Err(e) => writeln!(out, "not added: {e}")?,
        },
        Command::List => print_cards(session, out)?,
        Command::Delete(n) => {
            match session.store().nth(n - 1).map(Flashcard::id) {
                Some(id) => {
                    session.delete_card(id);
                    writeln!(out, "deleted card {n}")?;
                }
                None => writeln!(out, "no card {n}")?,
            }
        }
        Command::Reset => {
            let n = session.reset_cards();
            writeln!(out, "removed {n} cards")?;
        }
        Command::Quiz => {
            session.open_quiz();
            print_quiz(session, out)?;
        }
        Command::Flip(n) => {
            let id = session.quiz().and_then(|quiz| quiz.nth_id(n - 1));
            match id {
                Some(id) => {
                    session.flip(id)?;
                    print_quiz(session, out)?;
                }
                None if session.quiz().is_none() => writeln!(out, "no quiz is open")?,
                None => writeln!(out, "no card {n}")?,
            }
        }
        Command::ResetFlips => match session.reset_flips() {
            Ok(_) => print_quiz(session, out)?,
            Err(e) => writeln!(out, "{e}")?,
        },
        Command::Close => {
            session.close_quiz();
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn print_cards(session: &Session, out: &mut impl Write) -> Result<()> {
    if session.store().is_empty() {
        writeln!(out, "no flashcards")?;
    }
    for (i, card) in session.store().iter().enumerate() {
        writeln!(out, "{}. {} | {}", i + 1, card.question(), card.answer())?;
    }
    Ok(())
}

fn print_quiz(session: &Session, out: &mut impl Write) -> Result<()> {
    let Some(quiz) = session.quiz() else {
        return Ok(());
    };
    writeln!(out, "{} of {} revealed", quiz.revealed_count(), quiz.len())?;
    for (i, face) in quiz.cards().enumerate() {
        let marker = match face.side {
            Side::Question => "Q",
            Side::Answer => "A",
        };
        writeln!(out, "{}. [{marker}] {}", i + 1, face.text)?;
    }
    Ok(())
}
