//! Line splitting and tokenizing shared by the line-oriented text formats.

use modloader_core::id::Guid;
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that abort parsing of a single file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A property command appeared before any asset was started.
    #[error("line {line}: `{command}` used before any asset was defined")]
    NoActiveAsset { line: usize, command: String },

    /// Malformed numeric or argument data.
    #[error("line {line}: {detail}")]
    Format { line: usize, detail: String },
}

impl ParseError {
    /// 1-based line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::NoActiveAsset { line, .. } | ParseError::Format { line, .. } => *line,
        }
    }

    pub(crate) fn format(line: usize, detail: impl Into<String>) -> Self {
        ParseError::Format {
            line,
            detail: detail.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source file context
// ---------------------------------------------------------------------------

/// Identity of the file being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Owning package.
    pub package: String,
    /// GUID of the file itself; per-asset GUIDs are derived from it.
    pub guid: Guid,
    pub source_path: PathBuf,
    pub logical_path: String,
}

impl SourceFile {
    /// Context for `relative_path` inside the package `package` rooted at
    /// `root`.
    ///
    /// `.` components do not take part in identity: `./a.png` and `a.png`
    /// get the same GUID and logical path.
    pub fn new(package: &str, root: &Path, relative_path: &Path) -> Self {
        let written = relative_path.to_string_lossy().replace('\\', "/");
        let relative = Path::new(&written)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Self {
            package: package.to_string(),
            guid: Guid::for_file(package, &relative),
            source_path: root.join(relative_path),
            logical_path: format!("{package}/{relative}"),
        }
    }

    /// Resolve a path written inside this file, relative to its directory.
    pub fn resolve_relative(&self, reference: &str) -> PathBuf {
        let dir = self.source_path.parent().unwrap_or(Path::new(""));
        dir.join(reference)
    }
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// Physical lines of `text`, numbered from 1. `\n`, `\r\n` and a lone `\r`
/// all end a line.
pub fn lines(text: &str) -> Lines<'_> {
    Lines {
        rest: Some(text),
        number: 0,
    }
}

pub struct Lines<'a> {
    rest: Option<&'a str>,
    number: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        self.number += 1;
        match rest.find(['\r', '\n']) {
            Some(i) => {
                let skip = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = Some(&rest[i + skip..]);
                Some((self.number, &rest[..i]))
            }
            None => {
                self.rest = None;
                if rest.is_empty() {
                    None
                } else {
                    Some((self.number, rest))
                }
            }
        }
    }
}

/// One non-blank line split into a command keyword and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub line: usize,
    /// Lowercased keyword.
    pub keyword: String,
    pub args: Vec<&'a str>,
}

/// Tokenize every non-blank line of `text` on whitespace.
pub fn commands(text: &str) -> impl Iterator<Item = Command<'_>> {
    lines(text).filter_map(|(line, content)| {
        let mut tokens = content.split_whitespace();
        let keyword = tokens.next()?.to_ascii_lowercase();
        Some(Command {
            line,
            keyword,
            args: tokens.collect(),
        })
    })
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

pub(crate) fn parse_f32(token: &str, line: usize) -> Result<f32, ParseError> {
    token
        .parse::<f32>()
        .map_err(|_| ParseError::format(line, format!("expected a number, found '{token}'")))
}

pub(crate) fn parse_i32(token: &str, line: usize) -> Result<i32, ParseError> {
    token
        .parse::<i32>()
        .map_err(|_| ParseError::format(line, format!("expected an integer, found '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_normalize_all_endings() {
        let got: Vec<(usize, &str)> = lines("a\nb\r\nc\rd").collect();
        assert_eq!(got, vec![(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
    }

    #[test]
    fn lines_keep_blank_lines_for_numbering() {
        let got: Vec<(usize, &str)> = lines("a\n\nb\n").collect();
        assert_eq!(got, vec![(1, "a"), (2, ""), (3, "b")]);
    }

    #[test]
    fn lines_of_empty_text() {
        assert_eq!(lines("").count(), 0);
    }

    #[test]
    fn commands_skip_blank_and_lowercase_keyword() {
        let got: Vec<Command<'_>> = commands("  \nKd  1 2\t3\n").collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].line, 2);
        assert_eq!(got[0].keyword, "kd");
        assert_eq!(got[0].args, vec!["1", "2", "3"]);
    }

    #[test]
    fn number_parsing_reports_line() {
        assert_eq!(parse_f32("0.5", 1).unwrap(), 0.5);
        let err = parse_f32("abc", 7).unwrap_err();
        assert_eq!(err.line(), 7);
        assert!(parse_i32("2.5", 1).is_err());
    }

    #[test]
    fn source_file_paths() {
        let file = SourceFile::new("core", Path::new("/packages/core"), Path::new("mat/a.mtl"));
        assert_eq!(file.logical_path, "core/mat/a.mtl");
        assert_eq!(file.source_path, PathBuf::from("/packages/core/mat/a.mtl"));
        assert_eq!(
            file.resolve_relative("../tex/a.png"),
            PathBuf::from("/packages/core/mat/../tex/a.png")
        );
        assert_eq!(file.guid, Guid::for_file("core", "mat/a.mtl"));
    }

    #[test]
    fn source_file_ignores_cur_dir() {
        let root = Path::new("/packages/core");
        let plain = SourceFile::new("core", root, Path::new("mat/a.mtl"));
        let dotted = SourceFile::new("core", root, Path::new("./mat/./a.mtl"));
        assert_eq!(dotted.guid, plain.guid);
        assert_eq!(dotted.logical_path, plain.logical_path);
    }
}
