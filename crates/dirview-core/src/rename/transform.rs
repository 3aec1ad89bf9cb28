//! Running a [`CompiledPattern`] against one entry.

use crate::rename::pattern::{CompiledPattern, Op};

/// Longest file name, in bytes, most filesystems accept.
pub const DEFAULT_CAPACITY: usize = 255;

/// Per-entry values the placeholders expand to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformContext<'a> {
    pub name: &'a str,
    pub ext: Option<&'a str>,
    pub counter: i64,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("not enough space for pattern (limit is {capacity} bytes)")]
    Capacity { capacity: usize },
}

/// Collapses every run of spaces in `text` to a single space.
fn squish_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == ' ' && out.ends_with(' ') {
            continue;
        }
        out.push(ch);
    }
    out
}

/// Builds the new name for one entry.
///
/// Output is limited to `capacity` bytes. Each op checks the remaining space
/// before writing and the whole transform fails if one does not fit.
///
/// # Errors
///
/// [`TransformError::Capacity`] when the result would exceed `capacity`.
pub fn transform(
    pattern: &CompiledPattern,
    ctx: &TransformContext<'_>,
    capacity: usize,
) -> Result<String, TransformError> {
    let mut out = String::new();
    let overflow = TransformError::Capacity { capacity };

    for op in pattern.ops() {
        let remaining = capacity - out.len();
        match *op {
            Op::Literal(ch) => {
                if ch.len_utf8() > remaining {
                    return Err(overflow);
                }
                out.push(ch);
            }
            Op::InsertName => {
                let name = if pattern.squish_adjacent_spaces() {
                    squish_spaces(ctx.name)
                } else {
                    ctx.name.to_string()
                };
                if name.len() > remaining {
                    return Err(overflow);
                }
                out.push_str(&name);
            }
            Op::InsertExt => {
                if let Some(ext) = ctx.ext {
                    if ext.len() > remaining {
                        return Err(overflow);
                    }
                    out.push_str(ext);
                }
            }
            Op::InsertSize => {
                let digits = ctx.bytes.to_string();
                if digits.len() > remaining {
                    return Err(overflow);
                }
                out.push_str(&digits);
            }
            Op::InsertCounter => {
                let digits = ctx.counter.to_string();
                if digits.len() > remaining {
                    return Err(overflow);
                }
                out.push_str(&digits);
            }
        }
    }

    Ok(out)
}
