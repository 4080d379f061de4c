//! Line-editor glue: exposes the completion tree and the themed prompt to
//! rustyline.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;

use super::CompletionTree;

#[derive(Debug, Default)]
pub struct ConsoleHelper {
    tree: CompletionTree,
    plain_prompt: String,
    styled_prompt: String,
}

impl ConsoleHelper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in the tree derived from the latest state
    pub fn set_tree(&mut self, tree: CompletionTree) {
        self.tree = tree;
    }

    /// Remember how to colour `plain` when the editor draws it
    pub fn set_prompt(&mut self, plain: String, styled: String) {
        self.plain_prompt = plain;
        self.styled_prompt = styled;
    }
}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.tree.candidates(&line[..pos]);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for ConsoleHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, _default: bool) -> Cow<'b, str> {
        if prompt == self.plain_prompt && !self.styled_prompt.is_empty() {
            Cow::Borrowed(self.styled_prompt.as_str())
        } else {
            Cow::Borrowed(prompt)
        }
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;
}

impl Validator for ConsoleHelper {}

impl Helper for ConsoleHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_prompt_swaps_known_prompt() {
        let mut helper = ConsoleHelper::new();
        helper.set_prompt("[hbf] > ".to_string(), "\u{1b}[1m[hbf] > \u{1b}[0m".to_string());

        assert!(helper.highlight_prompt("[hbf] > ", true).starts_with('\u{1b}'));
        assert_eq!(helper.highlight_prompt("other> ", true), "other> ");
    }
}
