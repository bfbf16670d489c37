//! Typed interface to the external source parser.
//!
//! Parsing artifact source text is not done here. A parser hands back a tree
//! of [`SyntaxNode`]s, a small closed set of node kinds, and
//! [`SourceSymbols::from_nodes`] walks it to collect which functions the
//! source defines and which commands it invokes. Parsers implement
//! [`SymbolExtractor`] and hand source text to
//! [`BuildSession::register_source`](crate::session::BuildSession::register_source).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::names::NameSet;

/// A node of a parsed artifact source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// `function <name> { <body> }`
    FunctionDefinition { name: String, body: Vec<SyntaxNode> },
    /// A command invocation. `name` is `None` when the command is computed at
    /// run time and cannot be resolved statically.
    Command {
        name: Option<String>,
        arguments: Vec<SyntaxNode>,
    },
    /// Any other grouping construct (script block, pipeline, statement list).
    Block(Vec<SyntaxNode>),
}

/// What one artifact's source defines and references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSymbols {
    /// Names of functions defined anywhere in the source.
    #[serde(default)]
    pub defined: NameSet,
    /// Names of invoked commands, in order of first appearance. May include
    /// qualified `source\command` references.
    #[serde(default)]
    pub referenced: Vec<String>,
}

impl SourceSymbols {
    pub fn new<D, R>(defined: D, referenced: R) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            defined: defined.into_iter().collect(),
            referenced: referenced.into_iter().map(Into::into).collect(),
        }
    }

    /// Collect definitions and references from a parsed tree, including
    /// nested function bodies and command arguments.
    pub fn from_nodes(nodes: &[SyntaxNode]) -> Self {
        let mut symbols = SourceSymbols::default();
        let mut pending: Vec<&SyntaxNode> = nodes.iter().rev().collect();

        while let Some(node) = pending.pop() {
            let children = match node {
                SyntaxNode::FunctionDefinition { name, body } => {
                    symbols.defined.insert(name.clone());
                    body
                }
                SyntaxNode::Command { name, arguments } => {
                    if let Some(name) = name.as_deref().filter(|n| !n.trim().is_empty()) {
                        symbols.referenced.push(name.to_string());
                    }
                    arguments
                }
                SyntaxNode::Block(children) => children,
            };
            pending.extend(children.iter().rev());
        }

        symbols
    }
}

/// The parsing capability: turns source text into the symbols it defines and
/// references. Implementations must be side-effect free.
pub trait SymbolExtractor {
    fn extract(&self, source: &str) -> Result<SourceSymbols>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str) -> SyntaxNode {
        SyntaxNode::Command {
            name: Some(name.to_string()),
            arguments: vec![],
        }
    }

    #[test]
    fn test_from_nodes_collects_nested_symbols() {
        let tree = vec![
            SyntaxNode::FunctionDefinition {
                name: "Do-Thing".to_string(),
                body: vec![
                    call("Get-Widget"),
                    SyntaxNode::FunctionDefinition {
                        name: "Inner".to_string(),
                        body: vec![call("Write-Output")],
                    },
                ],
            },
            SyntaxNode::Block(vec![
                call("Do-Thing"),
                SyntaxNode::Command {
                    name: None,
                    arguments: vec![call("Get-Date")],
                },
            ]),
        ];

        let symbols = SourceSymbols::from_nodes(&tree);
        assert_eq!(
            symbols.defined.iter().collect::<Vec<_>>(),
            vec!["Do-Thing", "Inner"]
        );
        assert_eq!(
            symbols.referenced,
            vec!["Get-Widget", "Write-Output", "Do-Thing", "Get-Date"]
        );
    }

    #[test]
    fn test_from_nodes_skips_blank_command_names() {
        let tree = vec![call("  "), call("Get-Item")];
        let symbols = SourceSymbols::from_nodes(&tree);
        assert_eq!(symbols.referenced, vec!["Get-Item"]);
    }

    struct FixedExtractor;

    impl SymbolExtractor for FixedExtractor {
        fn extract(&self, _source: &str) -> Result<SourceSymbols> {
            Ok(SourceSymbols::from_nodes(&[call("Get-Widget")]))
        }
    }

    #[test]
    fn test_extractor_is_idempotent() {
        let extractor = FixedExtractor;
        let first = extractor.extract("Get-Widget").unwrap();
        let second = extractor.extract("Get-Widget").unwrap();
        assert_eq!(first, second);
    }
}
