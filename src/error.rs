//! The diagnostic sink: location-tagged errors with an optional hint and
//! "did you mean" suggestions, and the presentation layer (caret, scroll,
//! suggestion list) built on top of them.

use crate::ast::Location;
use crate::types::LanguageSet;
use std::fmt;

/// One error kind, independent of the message text it ultimately renders
/// as — matches the error-kind taxonomy the core distinguishes, not the
/// user-facing wording (which the test suite does not pin).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
  /// A constructed tree shape the core refuses, re-emitted through this
  /// sink even though the original malformed tokens were the front-end's
  /// concern.
  Syntax { detail: String },
  /// A kind, type bit, or combination is not legal in the given language;
  /// `legal_in` names the languages in which it *would* be legal.
  UnsupportedInLanguage { what: String, legal_in: LanguageSet, active: LanguageSet },
  /// A kind cannot contain the kind or type supplied.
  KindConstraint { detail: String },
  /// Scoped-name rules: redefinition, duplicate parameter, scoped
  /// parameter, nesting order, previously-declared-with-different-kind.
  NameConstraint { detail: String },
  /// Operator arity, overloadability, or signature violation.
  OperatorConstraint { detail: String },
  /// A type triple is not legal under the active language (the type pass).
  TypeTripleIllegal { detail: String },
  /// An identifier is neither a typedef nor a keyword.
  UnknownName { name: String },
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Syntax { detail } => write!(f, "{detail}"),
      Self::UnsupportedInLanguage { what, legal_in, active } =>
        write!(f, "{what} is illegal in {active} (legal in {legal_in})"),
      Self::KindConstraint { detail } => write!(f, "{detail}"),
      Self::NameConstraint { detail } => write!(f, "{detail}"),
      Self::OperatorConstraint { detail } => write!(f, "{detail}"),
      Self::TypeTripleIllegal { detail } => write!(f, "{detail}"),
      Self::UnknownName { name } => write!(f, "\"{name}\" is not a typedef or keyword"),
    }
  }
}

/// A single diagnosed error: where it happened, what kind it is, and an
/// optional hint toward the nearest legal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
  pub loc: Location,
  pub kind: ErrorKind,
  pub hint: Option<String>,
  pub suggestions: Vec<String>,
}

impl Error {
  #[must_use] pub fn new(loc: Location, kind: ErrorKind) -> Self {
    Self { loc, kind, hint: None, suggestions: Vec::new() }
  }

  #[must_use] pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
    self.hint = Some(hint.into());
    self
  }

  #[must_use] pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
    self.suggestions = suggestions;
    self
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}: {}", self.loc.line, self.loc.column, self.kind)?;
    if let Some(hint) = &self.hint {
      write!(f, "; did you mean {hint}?")?;
    }
    Ok(())
  }
}

impl std::error::Error for Error {}

/// Supplies "did you mean" candidates for an unknown name. An external
/// collaborator (keyword tables, the typedef registry) implements this;
/// the sink only ever calls it through the trait object.
pub trait Suggester {
  /// Returns the best-matching known names for `unknown`, closest first.
  fn suggest(&self, unknown: &str) -> Vec<String>;
}

/// A suggester that never has anything to offer — the default when no
/// keyword/typedef table is wired in (e.g. library-only usage, tests).
pub struct NoSuggestions;

impl Suggester for NoSuggestions {
  fn suggest(&self, _unknown: &str) -> Vec<String> { Vec::new() }
}

/// Renders an [`Error`] for a terminal: a scrolled source line (so the
/// caret stays within `width` columns) with a caret aligned under the
/// offending column, optionally followed by a "did you mean" list.
pub struct ErrorSink<'a> {
  pub width: usize,
  pub suggester: &'a dyn Suggester,
}

impl<'a> ErrorSink<'a> {
  #[must_use] pub fn new(suggester: &'a dyn Suggester) -> Self {
    Self { width: 80, suggester }
  }

  #[must_use] pub fn with_width(mut self, width: usize) -> Self {
    self.width = width;
    self
  }

  /// Formats `err` against `source_line` (the full line the error's
  /// location refers to) as cdecl itself would print it: the (possibly
  /// scrolled) line, a caret line, the message, then any suggestions.
  #[must_use] pub fn render(&self, err: &Error, source_line: &str) -> String {
    let mut out = String::new();
    let (scrolled, caret_col) = self.scroll(source_line, err.loc.column as usize);
    out.push_str(&scrolled);
    out.push('\n');
    out.push_str(&" ".repeat(caret_col));
    out.push('^');
    out.push('\n');
    out.push_str(&err.to_string());
    if let ErrorKind::UnknownName { name } = &err.kind {
      let suggestions = self.suggester.suggest(name);
      if !suggestions.is_empty() {
        out.push_str(&format!("; did you mean {}?", suggestions.join(", ")));
      }
    }
    out
  }

  /// Scrolls `line` so the 0-based `col` stays visible within `self.width`
  /// columns, prefixing/suffixing `...` where content was cut off.
  /// Returns the (possibly truncated) line and the caret's column within it.
  fn scroll(&self, line: &str, col: usize) -> (String, usize) {
    if line.len() <= self.width || self.width < 8 {
      return (line.to_string(), col);
    }
    let half = (self.width - 8) / 2;
    let start = col.saturating_sub(half);
    let end = (start + self.width - 6).min(line.len());
    let start = end.saturating_sub(self.width - 6);
    let mut out = String::new();
    let mut caret_col = col - start;
    if start > 0 {
      out.push_str("...");
      caret_col += 3;
    }
    out.push_str(&line[start..end]);
    if end < line.len() {
      out.push_str("...");
    }
    (out, caret_col)
  }
}
