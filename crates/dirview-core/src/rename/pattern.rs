//! Compiler for bulk-rename patterns.
//!
//! A pattern is literal text with `<expr>` placeholders:
//!
//! | placeholder | inserts                               |
//! |-------------|---------------------------------------|
//! | `<name>`    | the name without its extension        |
//! | `<ext>`     | the extension, without the dot        |
//! | `<counter>` | the per-entry counter                 |
//! | `<bytes>`   | the entry's size in bytes             |
//!
//! Placeholder names are case-insensitive. Characters that are not allowed
//! in file names are rejected at compile time.

/// One step of a compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Literal(char),
    InsertName,
    InsertExt,
    InsertSize,
    InsertCounter,
}

/// A validated, ready-to-run pattern. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    ops: Vec<Op>,
    squish_adjacent_spaces: bool,
}

impl CompiledPattern {
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Whether runs of spaces collapse to one.
    pub fn squish_adjacent_spaces(&self) -> bool {
        self.squish_adjacent_spaces
    }
}

/// Why a pattern failed to compile. Positions are byte offsets into the
/// pattern text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,

    #[error("illegal filename character {ch:?} at position {pos}")]
    IllegalChar { ch: char, pos: usize },

    #[error("unexpected '<' at position {pos}, unclosed '<' at position {unclosed}")]
    UnexpectedOpen { pos: usize, unclosed: usize },

    #[error("unexpected '>' at position {pos} with no preceding '<'")]
    UnexpectedClose { pos: usize },

    #[error("empty expression starting at position {pos}")]
    EmptyExpression { pos: usize },

    #[error("unknown expression starting at position {pos}")]
    UnknownExpression { pos: usize },

    #[error("unclosed '<' at position {pos}")]
    Unclosed { pos: usize },
}

impl PatternError {
    /// Byte offset the error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match *self {
            PatternError::Empty => None,
            PatternError::IllegalChar { pos, .. }
            | PatternError::UnexpectedOpen { pos, .. }
            | PatternError::UnexpectedClose { pos }
            | PatternError::EmptyExpression { pos }
            | PatternError::UnknownExpression { pos }
            | PatternError::Unclosed { pos } => Some(pos),
        }
    }
}

fn is_illegal(ch: char) -> bool {
    let code = ch as u32;
    code <= 31 || code == 127 || matches!(ch, '\\' | '/' | '"' | '|' | '?' | '*')
}

fn expression_op(expr: &str) -> Option<Op> {
    [
        ("name", Op::InsertName),
        ("ext", Op::InsertExt),
        ("counter", Op::InsertCounter),
        ("bytes", Op::InsertSize),
    ]
    .into_iter()
    .find(|(keyword, _)| expr.eq_ignore_ascii_case(keyword))
    .map(|(_, op)| op)
}

/// Compiles `text` into a [`CompiledPattern`].
///
/// With `squish_adjacent_spaces`, a literal space directly following another
/// literal space is dropped. Spaces coming from placeholders are handled by
/// the transformer.
///
/// # Errors
///
/// Returns the first [`PatternError`] found; no partial pattern is produced.
pub fn compile_pattern(text: &str, squish_adjacent_spaces: bool) -> Result<CompiledPattern, PatternError> {
    if text.is_empty() {
        return Err(PatternError::Empty);
    }

    let mut ops = Vec::new();
    let mut open: Option<usize> = None;

    for (pos, ch) in text.char_indices() {
        if is_illegal(ch) {
            return Err(PatternError::IllegalChar { ch, pos });
        }

        match (ch, open) {
            ('<', Some(unclosed)) => return Err(PatternError::UnexpectedOpen { pos, unclosed }),
            ('<', None) => open = Some(pos),
            ('>', None) => return Err(PatternError::UnexpectedClose { pos }),
            ('>', Some(start)) => {
                let expr = &text[start + 1..pos];
                if expr.is_empty() {
                    return Err(PatternError::EmptyExpression { pos: start });
                }
                let op = expression_op(expr).ok_or(PatternError::UnknownExpression { pos: start })?;
                ops.push(op);
                open = None;
            }
            (_, Some(_)) => {}
            (' ', None) if squish_adjacent_spaces && ops.last() == Some(&Op::Literal(' ')) => {}
            (_, None) => ops.push(Op::Literal(ch)),
        }
    }

    if let Some(pos) = open {
        return Err(PatternError::Unclosed { pos });
    }

    Ok(CompiledPattern {
        ops,
        squish_adjacent_spaces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(text: &str) -> Vec<Op> {
        compile_pattern(text, false).unwrap().ops().to_vec()
    }

    #[test]
    fn name_with_literal_suffix() {
        assert_eq!(
            ops("<name>.bak"),
            vec![
                Op::InsertName,
                Op::Literal('.'),
                Op::Literal('b'),
                Op::Literal('a'),
                Op::Literal('k'),
            ]
        );
    }

    #[test]
    fn every_placeholder_case_insensitive() {
        assert_eq!(
            ops("<NAME><Ext><counter><BYTES>"),
            vec![
                Op::InsertName,
                Op::InsertExt,
                Op::InsertCounter,
                Op::InsertSize,
            ]
        );
    }

    #[test]
    fn empty_pattern() {
        let err = compile_pattern("", false).unwrap_err();
        assert_eq!(err, PatternError::Empty);
        assert!(err.to_string().contains("empty pattern"));
        assert_eq!(err.position(), None);
    }

    #[test]
    fn unknown_expression() {
        let err = compile_pattern("ab<foo>", false).unwrap_err();
        assert_eq!(err, PatternError::UnknownExpression { pos: 2 });
        assert!(err.to_string().contains("unknown expression"));
    }

    #[test]
    fn placeholder_prefix_is_not_accepted() {
        assert_eq!(
            compile_pattern("<nam>", false).unwrap_err(),
            PatternError::UnknownExpression { pos: 0 }
        );
    }

    #[test]
    fn empty_expression() {
        assert_eq!(
            compile_pattern("x<>", false).unwrap_err(),
            PatternError::EmptyExpression { pos: 1 }
        );
    }

    #[test]
    fn nested_open() {
        let err = compile_pattern("<na<me>", false).unwrap_err();
        assert_eq!(err, PatternError::UnexpectedOpen { pos: 3, unclosed: 0 });
        assert_eq!(err.position(), Some(3));
    }

    #[test]
    fn stray_close() {
        assert_eq!(
            compile_pattern("name>", false).unwrap_err(),
            PatternError::UnexpectedClose { pos: 4 }
        );
    }

    #[test]
    fn unclosed_open() {
        assert_eq!(
            compile_pattern("a<name", false).unwrap_err(),
            PatternError::Unclosed { pos: 1 }
        );
    }

    #[test]
    fn illegal_characters() {
        for (text, ch, pos) in [
            ("a/b", '/', 1),
            ("a\\b", '\\', 1),
            ("?", '?', 0),
            ("<name>*", '*', 6),
            ("a|b", '|', 1),
            ("\"", '"', 0),
            ("tab\there", '\t', 3),
            ("del\u{7f}", '\u{7f}', 3),
        ] {
            assert_eq!(
                compile_pattern(text, false).unwrap_err(),
                PatternError::IllegalChar { ch, pos },
                "pattern {text:?}"
            );
        }
    }

    #[test]
    fn illegal_character_inside_placeholder() {
        assert_eq!(
            compile_pattern("<na/me>", false).unwrap_err(),
            PatternError::IllegalChar { ch: '/', pos: 3 }
        );
    }

    #[test]
    fn squish_drops_repeated_literal_spaces() {
        let pattern = compile_pattern("a   b", true).unwrap();
        assert_eq!(
            pattern.ops(),
            &[Op::Literal('a'), Op::Literal(' '), Op::Literal('b')]
        );
        assert!(pattern.squish_adjacent_spaces());

        assert_eq!(ops("a   b").len(), 5);
    }

    #[test]
    fn squish_does_not_cross_placeholders() {
        let pattern = compile_pattern(" <name> ", true).unwrap();
        assert_eq!(
            pattern.ops(),
            &[Op::Literal(' '), Op::InsertName, Op::Literal(' ')]
        );
    }

    #[test]
    fn non_ascii_literals_use_byte_positions() {
        assert_eq!(
            compile_pattern("é<x>", false).unwrap_err(),
            PatternError::UnknownExpression { pos: 2 }
        );
        assert_eq!(ops("日本"), vec![Op::Literal('日'), Op::Literal('本')]);
    }
}
