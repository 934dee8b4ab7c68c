//! Shell loop with rustyline.
//!
//! Interactive mode: prompt, history, completion, and the validator wired in
//! as the rustyline `Validator` so malformed lines cannot be submitted.
//! Pipe mode: read lines from stdin, run each, keep going on failure.

use lantern_core::validate::validate_source;
use lantern_core::{
    CommandError, Dispatcher, EXIT, ErrorKind, GraphStore, Line, Objective, Source, StoreError,
    Usage, VERBS, Verb, validate,
};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{CompletionType, Config, Context, Editor, Helper};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

const PROMPT: &str = "lantern> ";

/// Lowercase the verb and objective tokens; keys and values keep their case.
pub fn normalize(line: &str) -> String {
    line.split_whitespace()
        .enumerate()
        .map(|(index, token)| {
            if index < 2 {
                token.to_lowercase()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// SHELL
// =============================================================================

/// Result of one submitted line. Messages have already been printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Exit,
    Rejected(Usage),
    Failed(ErrorKind),
}

impl Outcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done | Self::Exit)
    }
}

pub struct Shell<S: GraphStore> {
    dispatcher: Dispatcher<S>,
}

impl<S: GraphStore + 'static> Shell<S> {
    #[must_use]
    pub fn new(dispatcher: Dispatcher<S>) -> Self {
        Self { dispatcher }
    }

    /// Validate and run one line. Output goes to `out`, hints and errors
    /// to `err`.
    pub async fn run_line<W, E>(&self, line: &str, out: &mut W, err: &mut E) -> io::Result<Outcome>
    where
        W: Write + ?Sized,
        E: Write + ?Sized,
    {
        let line = normalize(line);
        let mut source = Source::new(&line);

        match validate_source(&mut source) {
            Ok(Line::Exit) => Ok(Outcome::Exit),
            Err(usage) => {
                writeln!(err, "{usage}")?;
                Ok(Outcome::Rejected(usage))
            }
            Ok(Line::Command(_)) => match self.dispatch(&mut source, out).await {
                Ok(()) => Ok(Outcome::Done),
                Err(failure) => {
                    if failure.kind() == ErrorKind::Unexpected {
                        tracing::error!(error = %failure, "command failed");
                    }
                    writeln!(err, "{failure}")?;
                    Ok(Outcome::Failed(failure.kind()))
                }
            },
        }
    }

    /// Execute, abandoning the request if Ctrl-C arrives first.
    async fn dispatch<W: Write + ?Sized>(
        &self,
        source: &mut Source,
        out: &mut W,
    ) -> Result<(), CommandError> {
        tokio::select! {
            result = self.dispatcher.execute(source, out) => result,
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::warn!("command interrupted");
                Err(CommandError::Connection(StoreError::Cancelled))
            }
        }
    }

    /// Read commands until `exit`, end of input, or Ctrl-D.
    pub async fn interactive(&self, history: Option<PathBuf>) -> Result<(), AppError> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(false)
            .completion_type(CompletionType::List)
            .build();

        let mut editor: Editor<LanternHelper, DefaultHistory> = Editor::with_config(config)?;
        editor.set_helper(Some(LanternHelper));

        if let Some(path) = &history {
            if let Err(e) = editor.load_history(path) {
                tracing::debug!(path = %path.display(), error = %e, "no history loaded");
            }
        }

        let mut stdout = io::stdout();
        let mut stderr = io::stderr();

        let result = loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed)?;

                    match self.run_line(trimmed, &mut stdout, &mut stderr).await {
                        Ok(Outcome::Exit) => break Ok(()),
                        Ok(_) => {}
                        Err(e) => break Err(AppError::Io(e)),
                    }
                }
                // Ctrl-C at the prompt clears the line
                Err(ReadlineError::Interrupted) => {}
                Err(ReadlineError::Eof) => break Ok(()),
                Err(e) => break Err(AppError::Terminal(e)),
            }
        };

        if let Some(path) = &history {
            save_history(&mut editor, path);
        }
        result
    }

    /// Run every line of `input`. Returns `false` if any line failed.
    pub async fn pipe<R, W, E>(&self, input: R, out: &mut W, err: &mut E) -> Result<bool, AppError>
    where
        R: BufRead,
        W: Write + ?Sized,
        E: Write + ?Sized,
    {
        let mut success = true;
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match self.run_line(trimmed, out, err).await? {
                Outcome::Exit => break,
                outcome => success &= outcome.is_success(),
            }
        }
        Ok(success)
    }
}

fn save_history(editor: &mut Editor<LanternHelper, DefaultHistory>, path: &Path) {
    if let Err(e) = editor.save_history(path) {
        tracing::warn!(path = %path.display(), error = %e, "cannot save history");
    }
}

// =============================================================================
// RUSTYLINE HELPER
// =============================================================================

/// Completes verbs and objectives, refuses lines the grammar rejects.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanternHelper;

impl Helper for LanternHelper {}
impl Highlighter for LanternHelper {}

impl Hinter for LanternHelper {
    type Hint = String;
}

impl Validator for LanternHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let line = normalize(ctx.input());
        if line.is_empty() {
            return Ok(ValidationResult::Valid(None));
        }
        Ok(match validate(&line) {
            Ok(_) => ValidationResult::Valid(None),
            Err(usage) => ValidationResult::Invalid(Some(format!("\n{usage}"))),
        })
    }
}

impl Completer for LanternHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = candidates(line, pos);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

/// Keywords that can complete the word ending at `pos`, and where it starts.
fn candidates(line: &str, pos: usize) -> (usize, Vec<&'static str>) {
    let head = line.get(..pos).unwrap_or(line);
    let words: Vec<&str> = head.split_whitespace().collect();

    let partial = if head.is_empty() || head.ends_with(char::is_whitespace) {
        ""
    } else {
        words.last().copied().unwrap_or("")
    };
    let index = if partial.is_empty() {
        words.len()
    } else {
        words.len().saturating_sub(1)
    };
    let start = head.len().saturating_sub(partial.len());

    let options: Vec<&'static str> = match index {
        0 => VERBS
            .iter()
            .map(|verb| verb.as_str())
            .chain(std::iter::once(EXIT))
            .collect(),
        1 => words
            .first()
            .and_then(|verb| Verb::from_token(&verb.to_lowercase()))
            .map(|verb| verb.objectives().map(Objective::as_str).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let prefix = partial.to_lowercase();
    let matching = options
        .into_iter()
        .filter(|option| option.starts_with(&prefix))
        .collect();
    (start, matching)
}

// =============================================================================
// TESTS
// =============================================================================
