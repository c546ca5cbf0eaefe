use tree_sitter::{Node, Parser};

/// Position and description of the first syntax error in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// 1-based line
    pub line: usize,
    /// 0-based column
    pub column: usize,
    pub message: String,
}

/// Syntax-only Python checker backed by the tree-sitter grammar
pub struct PythonSyntax {
    parser: Parser,
}

impl PythonSyntax {
    /// # Errors
    ///
    /// A description of the failure when the grammar cannot be loaded.
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| format!("Failed to load the Python grammar: {e}"))?;
        Ok(Self { parser })
    }

    /// Parse `source` and report its first offending node
    pub fn check(&mut self, source: &str) -> Result<(), SyntaxIssue> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Err(SyntaxIssue {
                line: 1,
                column: 0,
                message: "parser produced no tree".to_string(),
            });
        };
        let root = tree.root_node();
        if !root.has_error() {
            return Ok(());
        }
        let issue = match first_error(root) {
            Some(node) => describe(node, source),
            None => SyntaxIssue {
                line: 1,
                column: 0,
                message: "invalid syntax".to_string(),
            },
        };
        Err(issue)
    }
}

/// Depth-first search for the first ERROR or MISSING node
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

fn describe(node: Node<'_>, source: &str) -> SyntaxIssue {
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing '{}'", node.kind())
    } else {
        let text = node.utf8_text(source.as_bytes()).unwrap_or("");
        let snippet: String = text.lines().next().unwrap_or("").chars().take(40).collect();
        if snippet.trim().is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near '{}'", snippet.trim())
        }
    };
    SyntaxIssue {
        line: position.row + 1,
        column: position.column,
        message,
    }
}
