//! Single-scan recursive parser for the filter DSL

use super::{FilterNode, FilterTree};

/// Filter syntax error with position information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Brackets do not balance; `position` is where the imbalance was detected
    Unbalanced { position: usize },
    /// A `(` group with no field name in front of it
    EmptyName { position: usize },
    /// Groups nested deeper than [`MAX_DEPTH`]
    TooDeep { position: usize },
}

/// Deepest group nesting a filter may use
pub const MAX_DEPTH: usize = 64;

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::Unbalanced { position } => {
                write!(f, "at position {}: unbalanced brackets", position)
            }
            FilterError::EmptyName { position } => {
                write!(f, "at position {}: '(' must follow a field name", position)
            }
            FilterError::TooDeep { position } => {
                write!(
                    f,
                    "at position {}: groups nested deeper than {} levels",
                    position, MAX_DEPTH
                )
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// Parse a whitespace-free, non-wildcard filter string
pub(super) fn parse_tree(input: &str) -> Result<FilterTree, FilterError> {
    check_balance(input)?;
    let (nodes, _) = parse_level(input, 0)?;
    Ok(FilterTree::from(nodes))
}

/// Running `(` minus `)` count must never go negative, never exceed
/// [`MAX_DEPTH`] and must end at zero
fn check_balance(input: &str) -> Result<(), FilterError> {
    let mut depth: usize = 0;

    for (i, b) in input.bytes().enumerate() {
        match b {
            b'(' => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(FilterError::TooDeep { position: i });
                }
            }
            b')' => {
                if depth == 0 {
                    return Err(FilterError::Unbalanced { position: i });
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(FilterError::Unbalanced {
            position: input.len(),
        });
    }

    Ok(())
}

/// Parse one bracket level.
///
/// Returns the nodes of this level and, when the level was closed by `)`,
/// the number of bytes consumed including that `)`. `offset` is the position
/// of `input` within the full filter string, for error reporting.
fn parse_level(input: &str, offset: usize) -> Result<(Vec<FilterNode>, Option<usize>), FilterError> {
    let bytes = input.as_bytes();
    let mut nodes = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                let name = &input[start..i];
                if name.is_empty() {
                    return Err(FilterError::EmptyName { position: offset + i });
                }

                let (children, consumed) = parse_level(&input[i + 1..], offset + i + 1)?;
                nodes.push(FilterNode::with_children(name, children));

                // Balance was checked up front, so a nested level always closes
                i += 1 + consumed.unwrap_or(bytes.len() - i - 1);
                start = i;
                continue;
            }
            b',' => {
                push_segment(&mut nodes, &input[start..i]);
                start = i + 1;
            }
            b')' => {
                push_segment(&mut nodes, &input[start..i]);
                return Ok((nodes, Some(i + 1)));
            }
            _ => {}
        }
        i += 1;
    }

    push_segment(&mut nodes, &input[start..]);
    Ok((nodes, None))
}

fn push_segment(nodes: &mut Vec<FilterNode>, segment: &str) {
    if !segment.is_empty() {
        nodes.push(FilterNode::new(segment));
    }
}
