//! Interactive questions on stderr, read key by key with the terminal in raw
//! mode.

use std::io::{self, Write};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal,
};

use crate::BoxError;

/// Tries allowed before giving up on a new password.
const PASSWORD_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Plain,
    Masked,
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Typed(char),
    Erased,
    Ignored,
    Submit,
    Interrupt,
}

#[derive(Debug, Default)]
struct LineBuffer {
    text: String,
}

impl LineBuffer {
    fn apply(&mut self, key: KeyEvent) -> Step {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => Step::Submit,
            KeyCode::Esc => Step::Interrupt,
            KeyCode::Char('c' | 'd') if control => Step::Interrupt,
            KeyCode::Backspace => match self.text.pop() {
                Some(_) => Step::Erased,
                None => Step::Ignored,
            },
            KeyCode::Char(ch) if !control => {
                self.text.push(ch);
                Step::Typed(ch)
            }
            _ => Step::Ignored,
        }
    }
}

fn read_keys(out: &mut impl Write, echo: Echo) -> Result<String, BoxError> {
    let mut line = LineBuffer::default();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }

        match line.apply(key) {
            Step::Typed(ch) => match echo {
                Echo::Plain => execute!(out, Print(ch))?,
                Echo::Masked => execute!(out, Print('*'))?,
            },
            Step::Erased => execute!(out, Print("\u{8} \u{8}"))?,
            Step::Ignored => {}
            Step::Submit => {
                execute!(out, Print("\r\n"))?;
                return Ok(line.text);
            }
            Step::Interrupt => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
        }
    }
}

/// Ask `prompt` and return the line typed before Enter.
pub fn ask(prompt: &str, echo: Echo) -> Result<String, BoxError> {
    let mut out = io::stderr();
    write!(out, "{prompt}")?;
    out.flush()?;

    terminal::enable_raw_mode()?;
    let answer = read_keys(&mut out, echo);
    terminal::disable_raw_mode()?;
    answer
}

/// `y` or `yes`, in any case.
pub fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Ask a yes/no question, defaulting to no.
pub fn confirm(question: &str) -> Result<bool, BoxError> {
    ask(&format!("{question} [y/N] "), Echo::Plain).map(|answer| is_yes(&answer))
}

/// Why a password pair cannot be used, if it cannot.
fn password_problem(password: &str, repeated: &str) -> Option<&'static str> {
    if password.is_empty() {
        Some("password must not be empty")
    } else if password != repeated {
        Some("passwords do not match")
    } else {
        None
    }
}

/// Ask for a new password twice until both entries agree.
pub fn new_password() -> Result<String, BoxError> {
    for _ in 0..PASSWORD_ATTEMPTS {
        let password = ask("Password: ", Echo::Masked)?;
        let repeated = if password.is_empty() {
            String::new()
        } else {
            ask("Repeat password: ", Echo::Masked)?
        };

        match password_problem(&password, &repeated) {
            None => return Ok(password),
            Some(problem) => eprintln!("{problem}, try again"),
        }
    }
    Err("too many attempts".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_erasing_edit_the_line() {
        let mut line = LineBuffer::default();
        assert_eq!(line.apply(key(KeyCode::Char('a'))), Step::Typed('a'));
        assert_eq!(line.apply(key(KeyCode::Char('b'))), Step::Typed('b'));
        assert_eq!(line.apply(key(KeyCode::Backspace)), Step::Erased);
        assert_eq!(line.apply(key(KeyCode::Char('c'))), Step::Typed('c'));
        assert_eq!(line.apply(key(KeyCode::Left)), Step::Ignored);
        assert_eq!(line.apply(key(KeyCode::Enter)), Step::Submit);
        assert_eq!(line.text, "ac");
    }

    #[test]
    fn backspace_on_an_empty_line_does_nothing() {
        let mut line = LineBuffer::default();
        assert_eq!(line.apply(key(KeyCode::Backspace)), Step::Ignored);
        assert!(line.text.is_empty());
    }

    #[test]
    fn control_keys_interrupt_instead_of_typing() {
        let mut line = LineBuffer::default();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(line.apply(ctrl_c), Step::Interrupt);
        assert_eq!(line.apply(key(KeyCode::Esc)), Step::Interrupt);
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(line.apply(ctrl_u), Step::Ignored);
        assert!(line.text.is_empty());
    }

    #[test]
    fn only_explicit_yes_confirms() {
        for answer in ["y", "Y", "yes", " YES ", "Yes"] {
            assert!(is_yes(answer), "{answer:?}");
        }
        for answer in ["", "n", "no", "yep", "y e s"] {
            assert!(!is_yes(answer), "{answer:?}");
        }
    }

    #[test]
    fn password_pairs() {
        assert_eq!(password_problem("hunter2", "hunter2"), None);
        assert_eq!(
            password_problem("", ""),
            Some("password must not be empty")
        );
        assert_eq!(
            password_problem("hunter2", "hunter3"),
            Some("passwords do not match")
        );
    }
}
