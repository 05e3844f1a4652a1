//! Multiline string formats.

use std::fmt;

/// How the body of a multiline block becomes a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultilineFormat {
    /// `|`: lines joined with newlines.
    Preserve,
    /// `<`: whitespace runs (newlines included) collapse to one space.
    Fold,
    /// `|+`: lines keep their indentation relative to the least indented one.
    PreserveIndent,
    /// Verbatim.
    Raw,
}

impl MultilineFormat {
    /// The format introduced by a multiline start marker.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "|" => Some(MultilineFormat::Preserve),
            "<" => Some(MultilineFormat::Fold),
            "|+" => Some(MultilineFormat::PreserveIndent),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MultilineFormat::Preserve => "preserve",
            MultilineFormat::Fold => "fold",
            MultilineFormat::PreserveIndent => "preserve-indent",
            MultilineFormat::Raw => "raw",
        }
    }
}

impl fmt::Display for MultilineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render multiline content in the given format.
pub fn apply_format(format: MultilineFormat, content: &str) -> String {
    match format {
        MultilineFormat::Preserve | MultilineFormat::Raw => content.to_string(),
        MultilineFormat::Fold => fold(content),
        MultilineFormat::PreserveIndent => dedent(content),
    }
}

fn fold(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip the smallest leading indentation shared by the non-blank lines.
/// Blank lines are left as they are.
fn dedent(content: &str) -> String {
    let margin = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    content
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line
            } else {
                line.get(margin..).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
