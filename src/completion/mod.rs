//! Contextual tab-completion tree.
//!
//! The tree is derived from the whole console state and rebuilt from scratch
//! after every command, so it can never lag behind a mutation.

pub mod helper;

use std::collections::BTreeMap;

use crate::config::ConfigStore;
use crate::dispatcher::Command;
use crate::modules::{ModuleRegistry, OptionSet};
use crate::session::GlobalOptions;

pub use helper::ConsoleHelper;

/// A completion entry: either terminal or holding further entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionNode {
    Leaf,
    Branch(BTreeMap<String, CompletionNode>),
}

impl CompletionNode {
    fn leaves<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Branch(names.into_iter().map(|n| (n.into(), Self::Leaf)).collect())
    }

    /// Child names, empty for a leaf
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let children = match self {
            Self::Leaf => None,
            Self::Branch(children) => Some(children.keys().map(String::as_str)),
        };
        children.into_iter().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionTree {
    root: BTreeMap<String, CompletionNode>,
}

impl CompletionTree {
    /// Derive the tree from the current console state
    #[must_use]
    pub fn build(
        commands: &[Command],
        registry: &ModuleRegistry,
        config: &ConfigStore,
        active_options: Option<&OptionSet>,
        globals: &GlobalOptions,
    ) -> Self {
        let mut root: BTreeMap<String, CompletionNode> = commands
            .iter()
            .map(|cmd| {
                let node = if cmd.arguments.is_empty() {
                    CompletionNode::Leaf
                } else {
                    CompletionNode::leaves(cmd.arguments.iter().copied())
                };
                (cmd.name.to_string(), node)
            })
            .collect();

        root.insert("use".to_string(), CompletionNode::leaves(registry.paths()));

        let sections = config
            .sections()
            .map(|(name, keys)| {
                let node = if keys.is_empty() {
                    CompletionNode::Leaf
                } else {
                    CompletionNode::leaves(keys.keys().map(String::as_str))
                };
                (name.to_string(), node)
            })
            .collect();
        root.insert("setc".to_string(), CompletionNode::Branch(sections));

        let options = CompletionNode::leaves(active_options.into_iter().flat_map(OptionSet::names));
        root.insert("set".to_string(), options.clone());
        root.insert("unset".to_string(), options);

        let globals = CompletionNode::leaves(globals.keys().map(String::as_str));
        root.insert("setg".to_string(), globals.clone());
        root.insert("unsetg".to_string(), globals);

        Self { root }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CompletionNode> {
        self.root.get(name)
    }

    /// Node reached by walking `path` from the root
    #[must_use]
    pub fn node(&self, path: &[&str]) -> Option<&CompletionNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(*first)?;
        for name in rest {
            match node {
                CompletionNode::Branch(children) => node = children.get(*name)?,
                CompletionNode::Leaf => return None,
            }
        }
        Some(node)
    }

    /// Suggestions for the text before the cursor.
    ///
    /// Returns the byte offset where the partial word starts and the names
    /// that extend it. Completion is suggest-only; an unknown prefix simply
    /// yields nothing.
    #[must_use]
    pub fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        let ends_with_space = line.is_empty() || line.ends_with(char::is_whitespace);
        let mut words: Vec<&str> = line.split_whitespace().collect();
        let partial = if ends_with_space { "" } else { words.pop().unwrap_or_default() };
        let start = line.len() - partial.len();

        let names: Vec<&str> = if words.is_empty() {
            self.root.keys().map(String::as_str).collect()
        } else {
            match self.node(&words) {
                Some(node) => node.keys().collect(),
                None => Vec::new(),
            }
        };

        let matches = names
            .into_iter()
            .filter(|n| n.starts_with(partial))
            .map(str::to_string)
            .collect();
        (start, matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::COMMANDS;
    use crate::logger::Logger;
    use crate::modules::registry::{BuiltinPlugins, DEFAULT_NAMESPACE};

    fn registry() -> ModuleRegistry {
        ModuleRegistry::discover(DEFAULT_NAMESPACE, &BuiltinPlugins, &mut Logger::capture())
    }

    fn tree(options: Option<&OptionSet>, globals: &GlobalOptions) -> CompletionTree {
        CompletionTree::build(COMMANDS, &registry(), &ConfigStore::with_defaults(), options, globals)
    }

    #[test]
    fn test_use_branch_lists_modules() {
        let tree = tree(None, &GlobalOptions::new());
        let keys: Vec<&str> = tree.get("use").unwrap().keys().collect();
        assert_eq!(keys, vec!["i2c/scan", "uart/baudrates"]);
    }

    #[test]
    fn test_setc_branch_lists_sections_and_keys() {
        let tree = tree(None, &GlobalOptions::new());
        assert!(tree.node(&["setc", "HYDRABUS", "port"]).is_some());
        assert_eq!(tree.node(&["setc", "THEME"]).unwrap().keys().count(), 5);
    }

    #[test]
    fn test_set_branch_empty_without_module() {
        let tree = tree(None, &GlobalOptions::new());
        assert_eq!(tree.get("set"), Some(&CompletionNode::Branch(BTreeMap::new())));
        assert_eq!(tree.get("unset"), Some(&CompletionNode::Branch(BTreeMap::new())));
    }

    #[test]
    fn test_set_branch_lists_active_options() {
        let options = OptionSet::new()
            .with("port", None, false, "")
            .with("speed", None, false, "");
        let tree = tree(Some(&options), &GlobalOptions::new());
        assert_eq!(tree.get("set").unwrap().keys().collect::<Vec<_>>(), vec!["port", "speed"]);
        assert_eq!(tree.get("unset"), tree.get("set"));
    }

    #[test]
    fn test_commands_without_arguments_are_leaves() {
        let tree = tree(None, &GlobalOptions::new());
        assert_eq!(tree.get("exit"), Some(&CompletionNode::Leaf));
        assert_eq!(tree.get("help"), Some(&CompletionNode::Leaf));
        assert!(tree.node(&["show", "options"]).is_some());
    }

    #[test]
    fn test_candidates() {
        let mut globals = GlobalOptions::new();
        globals.insert("timeout".to_string(), "5".to_string());
        let tree = tree(None, &globals);

        let (start, names) = tree.candidates("us");
        assert_eq!(start, 0);
        assert_eq!(names, vec!["use"]);

        let (start, names) = tree.candidates("use u");
        assert_eq!(start, 4);
        assert_eq!(names, vec!["uart/baudrates"]);

        let (_, names) = tree.candidates("unsetg ");
        assert_eq!(names, vec!["timeout"]);

        let (_, names) = tree.candidates("setc HYDRABUS p");
        assert_eq!(names, vec!["port"]);

        let (_, names) = tree.candidates("exit ");
        assert!(names.is_empty());

        let (_, names) = tree.candidates("bogus ");
        assert!(names.is_empty());
    }
}
