//! Static tree of command tokens for shell tab-completion.
//!
//! The tree is written out by hand rather than derived from the dispatch
//! table; a test keeps the two in step.

use std::collections::{BTreeMap, BTreeSet};

/// Free-form calendar identifier. Never offered as a completion itself.
pub const CALENDAR_ID_PLACEHOLDER: &str = "<calendar-id>";

/// Google's alias for the user's main calendar.
pub const PRIMARY_CALENDAR: &str = "primary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNode {
    name: String,
    children: BTreeMap<String, CompletionNode>,
}

impl CompletionNode {
    pub fn new(name: impl Into<String>) -> Self {
        CompletionNode {
            name: name.into(),
            children: BTreeMap::new(),
        }
    }

    pub fn with_child(mut self, child: CompletionNode) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn child(&self, token: &str) -> Option<&CompletionNode> {
        self.children.get(token)
    }

    pub fn children(&self) -> impl Iterator<Item = &CompletionNode> {
        self.children.values()
    }

    pub fn is_placeholder(&self) -> bool {
        self.name.starts_with('<') && self.name.ends_with('>')
    }

    /// Every `(verb, object)` path two levels below the root.
    pub fn reachable_pairs(&self) -> BTreeSet<(String, String)> {
        self.children()
            .flat_map(|verb| {
                verb.children()
                    .map(move |object| (verb.name.clone(), object.name.clone()))
            })
            .collect()
    }

    /// Candidates for `partial` after the already-typed `words` (program name
    /// excluded). A word that matches no literal child descends into a
    /// placeholder child, if there is one.
    pub fn complete(&self, words: &[&str], partial: &str) -> Vec<String> {
        let mut node = self;

        for word in words {
            let next = node
                .child(word)
                .or_else(|| node.children().find(|c| c.is_placeholder()));
            match next {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }

        node.children()
            .filter(|c| !c.is_placeholder() && c.name.starts_with(partial))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Complete a raw command line as a shell hands it over (`COMP_LINE`,
    /// already cut at the cursor). The first word is the program name.
    pub fn complete_line(&self, line: &str) -> Vec<String> {
        let mut words: Vec<&str> = line.split_whitespace().skip(1).collect();

        let partial = if line.is_empty() || line.ends_with(char::is_whitespace) {
            ""
        } else {
            // The program name itself is still being typed.
            if words.is_empty() {
                return Vec::new();
            }
            words.pop().unwrap_or_default()
        };

        self.complete(&words, partial)
    }
}

fn calendar_ids() -> [CompletionNode; 2] {
    [
        CompletionNode::new(CALENDAR_ID_PLACEHOLDER),
        CompletionNode::new(PRIMARY_CALENDAR),
    ]
}

fn events() -> CompletionNode {
    let [placeholder, primary] = calendar_ids();
    CompletionNode::new("events")
        .with_child(placeholder)
        .with_child(primary)
}

/// Build the completion tree. Cheap; built fresh for every invocation.
pub fn build(program: &str) -> CompletionNode {
    CompletionNode::new(program)
        .with_child(
            CompletionNode::new("list")
                .with_child(CompletionNode::new("calendars"))
                .with_child(events()),
        )
        .with_child(CompletionNode::new("add").with_child(events()))
        .with_child(CompletionNode::new("delete").with_child(events()))
}
