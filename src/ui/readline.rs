//! Readline wrapper with command keyword completion.

use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};

/// Completes the first word of a line against the known command keywords
pub struct CommandHelper {
    keywords: Vec<String>,
    hinter: HistoryHinter,
}

impl CommandHelper {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            hinter: HistoryHinter::default(),
        }
    }

    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let before = &line[..pos];
        // Only the command word is completed; arguments are free-form symbols
        if before.trim_start().contains(char::is_whitespace) {
            return (pos, Vec::new());
        }

        let start = before.len() - before.trim_start().len();
        let typed = before.trim_start();
        let slash = typed.starts_with('/');
        let prefix = typed.trim_start_matches('/').to_lowercase();

        let matches = self
            .keywords
            .iter()
            .filter(|k| k.starts_with(&prefix))
            .map(|k| {
                let replacement = if slash {
                    format!("/{} ", k)
                } else {
                    format!("{} ", k)
                };
                Pair {
                    display: k.clone(),
                    replacement,
                }
            })
            .collect();

        (start, matches)
    }
}

impl Helper for CommandHelper {}
impl Validator for CommandHelper {}
impl Highlighter for CommandHelper {}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

/// Thin wrapper over `rustyline::Editor` with command completion and a history file.
pub struct Readline {
    editor: Editor<CommandHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Readline {
    pub fn new(keywords: &[&str], history_path: PathBuf) -> anyhow::Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandHelper::new(keywords)));

        if let Some(dir) = history_path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let _ = editor.load_history(&history_path);

        Ok(Self {
            editor,
            history_path,
        })
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        let line = self.editor.readline(prompt)?;
        if !line.trim().is_empty() {
            let _ = self.editor.add_history_entry(line.as_str());
            let _ = self.editor.append_history(&self.history_path);
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacements(helper: &CommandHelper, line: &str) -> (usize, Vec<String>) {
        let (start, pairs) = helper.candidates(line, line.len());
        (start, pairs.into_iter().map(|p| p.replacement).collect())
    }

    #[test]
    fn test_completes_command_word() {
        let helper = CommandHelper::new(&["add", "analyze", "clear", "list"]);
        assert_eq!(
            replacements(&helper, "a"),
            (0, vec!["add ".to_string(), "analyze ".to_string()])
        );
        assert_eq!(replacements(&helper, "cl"), (0, vec!["clear ".to_string()]));
    }

    #[test]
    fn test_keeps_leading_slash() {
        let helper = CommandHelper::new(&["list"]);
        assert_eq!(replacements(&helper, "/li"), (0, vec!["/list ".to_string()]));
    }

    #[test]
    fn test_no_completion_for_arguments() {
        let helper = CommandHelper::new(&["add"]);
        let (_, found) = replacements(&helper, "add 23");
        assert!(found.is_empty());
    }

    #[test]
    fn test_unknown_prefix() {
        let helper = CommandHelper::new(&["add"]);
        let (_, found) = replacements(&helper, "zz");
        assert!(found.is_empty());
    }
}
