use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyDecision {
    Allow,
    Deny(String),
}

impl SafetyDecision {
    pub fn allowed(&self) -> bool {
        matches!(self, SafetyDecision::Allow)
    }
}

/// How hard the user has to work to approve an action.
#[derive(Debug, Clone)]
pub enum Confirmation {
    YesNo(String),
    /// Two y/n questions; the second one is the "are you sure" step.
    Twice { first: String, second: String },
    /// A `yes` acknowledgement followed by typing `phrase` exactly.
    TypedPhrase { acknowledge: String, phrase: String },
}

impl Confirmation {
    pub fn yes_no(question: impl Into<String>) -> Self {
        Confirmation::YesNo(question.into())
    }

    pub fn twice(first: impl Into<String>, second: impl Into<String>) -> Self {
        Confirmation::Twice {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn typed_phrase(acknowledge: impl Into<String>, phrase: impl Into<String>) -> Self {
        Confirmation::TypedPhrase {
            acknowledge: acknowledge.into(),
            phrase: phrase.into(),
        }
    }
}

pub trait Prompter {
    /// Show `question` and return the answer line without its line ending.
    /// End of input is reported as `io::ErrorKind::UnexpectedEof`.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}

pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

pub fn confirm(prompter: &mut dyn Prompter, confirmation: &Confirmation) -> io::Result<SafetyDecision> {
    let decision = match confirmation {
        Confirmation::YesNo(question) => ask_yes_no(prompter, question)?,
        Confirmation::Twice { first, second } => match ask_yes_no(prompter, first)? {
            SafetyDecision::Allow => ask_yes_no(prompter, second)?,
            denied => denied,
        },
        Confirmation::TypedPhrase { acknowledge, phrase } => {
            let answer = prompter.ask(&format!("{} (yes/no): ", acknowledge))?;
            if !answer.trim().eq_ignore_ascii_case("yes") {
                deny("not acknowledged")
            } else {
                let typed = prompter.ask(&format!("Type '{}' to confirm: ", phrase))?;
                if typed.trim() == phrase {
                    SafetyDecision::Allow
                } else {
                    deny("confirmation phrase mismatch")
                }
            }
        }
    };
    if let SafetyDecision::Deny(reason) = &decision {
        tracing::debug!(reason = %reason, "confirmation declined");
    }
    Ok(decision)
}

fn ask_yes_no(prompter: &mut dyn Prompter, question: &str) -> io::Result<SafetyDecision> {
    let answer = prompter.ask(&format!("{} (y/n): ", question))?;
    Ok(if is_yes(&answer) {
        SafetyDecision::Allow
    } else {
        deny("declined")
    })
}

fn deny(reason: &str) -> SafetyDecision {
    SafetyDecision::Deny(reason.to_string())
}

/// Gate for operations that need an elevated (Administrator/root) session.
pub fn require_elevated(elevated: bool) -> SafetyDecision {
    if elevated {
        SafetyDecision::Allow
    } else {
        SafetyDecision::Deny("This operation requires Administrator privileges".to_string())
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::Prompter;
    use std::collections::VecDeque;
    use std::io;

    /// Answers questions from a fixed list; runs out with `UnexpectedEof`.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|answer| answer.to_string()).collect(),
                asked: Vec::new(),
            }
        }

        pub fn asked(&self) -> &[String] {
            &self.asked
        }

        pub fn remaining(&self) -> usize {
            self.answers.len()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, question: &str) -> io::Result<String> {
            self.asked.push(question.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedPrompter;
    use super::*;

    #[test]
    fn yes_no_accepts_only_y() {
        for (answer, allowed) in [("y", true), ("Y", true), (" y ", true), ("yes", false), ("n", false), ("", false)] {
            let mut prompter = ScriptedPrompter::new(&[answer]);
            let decision = confirm(&mut prompter, &Confirmation::yes_no("Proceed?")).unwrap();
            assert_eq!(decision.allowed(), allowed, "answer {:?}", answer);
        }
    }

    #[test]
    fn twice_stops_after_first_no() {
        let mut prompter = ScriptedPrompter::new(&["n", "y"]);
        let decision = confirm(&mut prompter, &Confirmation::twice("Remove?", "Sure?")).unwrap();
        assert!(!decision.allowed());
        assert_eq!(prompter.remaining(), 1);
    }

    #[test]
    fn twice_needs_both() {
        let mut prompter = ScriptedPrompter::new(&["y", "y"]);
        let decision = confirm(&mut prompter, &Confirmation::twice("Remove?", "Sure?")).unwrap();
        assert!(decision.allowed());
        assert_eq!(prompter.asked()[1], "Sure? (y/n): ");
    }

    #[test]
    fn typed_phrase_must_match_exactly() {
        let confirmation = Confirmation::typed_phrase("Data loss?", "DELETE VOLUMES");
        let mut prompter = ScriptedPrompter::new(&["yes", "delete volumes"]);
        assert!(!confirm(&mut prompter, &confirmation).unwrap().allowed());

        let mut prompter = ScriptedPrompter::new(&["y", "DELETE VOLUMES"]);
        assert!(!confirm(&mut prompter, &confirmation).unwrap().allowed());

        let mut prompter = ScriptedPrompter::new(&["YES", "DELETE VOLUMES"]);
        assert!(confirm(&mut prompter, &confirmation).unwrap().allowed());
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut prompter = ScriptedPrompter::new(&[]);
        let err = confirm(&mut prompter, &Confirmation::yes_no("Proceed?")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn line_prompter_strips_line_endings() {
        let mut out = Vec::new();
        let mut prompter = LinePrompter::new(&b"/var/log\r\n"[..], &mut out);
        assert_eq!(prompter.ask("Path: ").unwrap(), "/var/log");
        drop(prompter);
        assert_eq!(out, b"Path: ");
    }

    #[test]
    fn elevation_gate() {
        assert!(require_elevated(true).allowed());
        assert!(matches!(require_elevated(false), SafetyDecision::Deny(_)));
    }
}
