use tree_sitter::{
    Node,
    Tree,
};

use crate::diagnostic::{
    codes,
    Diagnostic,
    Position,
};

const BLOCK_KINDS: [&str; 4] = ["block", "constructor_body", "switch_block", "lambda_expression"];

pub fn position(node: &Node) -> Position {
    let point = node.start_position();
    Position {
        line: point.row + 1,
        column: point.column + 1,
        offset: node.start_byte(),
    }
}

/// One diagnostic per `MISSING` token and per outermost `ERROR` node, in
/// document order.
pub fn syntax_errors(tree: &Tree, text: &str) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        if node.is_missing() {
            errors.push(missing_token(&node, text));
            continue;
        }
        if node.is_error() {
            errors.push(unexpected_input(&node));
            continue;
        }
        if !node.has_error() {
            continue;
        }

        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }

    errors
}

fn missing_token(node: &Node, text: &str) -> Diagnostic {
    let at_eof = text
        .get(node.start_byte()..)
        .map(|rest| rest.trim().is_empty())
        .unwrap_or(true);

    let diagnostic = if at_eof {
        Diagnostic::error(codes::PREMATURE_EOF, "reached end of file while parsing")
    } else {
        Diagnostic::error(codes::EXPECTED, format!("'{}' expected", node.kind()))
    };

    diagnostic.at(position(node))
}

fn unexpected_input(node: &Node) -> Diagnostic {
    let mut inside_block = false;
    let mut parent = node.parent();
    while let Some(ancestor) = parent {
        if BLOCK_KINDS.contains(&ancestor.kind()) {
            inside_block = true;
            break;
        }
        parent = ancestor.parent();
    }

    let diagnostic = if inside_block {
        Diagnostic::error(codes::ILLEGAL_START_OF_EXPR, "illegal start of expression")
    } else {
        Diagnostic::error(codes::ILLEGAL_START_OF_TYPE, "illegal start of type")
    };

    diagnostic.at(position(node))
}
