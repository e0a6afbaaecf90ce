//! The process-wide read-mostly state bundle: the active language, output
//! options, and the typedef registry. Grouping them here (instead of
//! leaving them as separate globals) is what lets the checker and builder
//! take an explicit, testable dependency instead of a hidden one.

use crate::sname::Sname;
use crate::typedef::{AddOutcome, DeclFlag, TypedefTable};
use crate::types::Language;

/// Pointer/reference cv-qualifier placement relative to the declarator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvPlacement {
  West,
  East,
}

/// Output token spelling mode. Mutually exclusive by construction (an enum,
/// not three independent booleans).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphMode {
  #[default]
  None,
  AltTokens,
  Digraphs,
  Trigraphs,
}

/// Output-formatting options, independent of any one declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
  pub cv_placement: CvPlacement,
  pub graph_mode: GraphMode,
  /// Prefer `auto f() -> T` trailing-return-type form when the language
  /// supports it.
  pub trailing_return: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self { cv_placement: CvPlacement::West, graph_mode: GraphMode::default(), trailing_return: false }
  }
}

/// The bundle of state a command (lex -> build -> check -> print) runs
/// against: the active language, output options, and the typedef registry.
pub struct Session {
  pub language: Language,
  pub options: Options,
  typedefs: Box<dyn TypedefTable>,
}

impl Session {
  #[must_use] pub fn new(language: Language, typedefs: Box<dyn TypedefTable>) -> Self {
    Self { language, options: Options::default(), typedefs }
  }

  #[must_use] pub fn typedefs(&self) -> &dyn TypedefTable { self.typedefs.as_ref() }

  /// Begins a command against the typedef registry: any `typedef`/`using`
  /// names added through the returned scope are tracked so they can be
  /// rolled back if the command ultimately fails.
  pub fn begin_command(&mut self) -> CommandScope<'_> {
    CommandScope { session: self, inserted: Vec::new() }
  }
}

/// Tracks typedef names inserted during one in-progress command, so a
/// failed command can undo them without disturbing anything inserted by
/// earlier, successful commands.
pub struct CommandScope<'a> {
  session: &'a mut Session,
  inserted: Vec<Sname>,
}

impl<'a> CommandScope<'a> {
  pub fn add_typedef(&mut self, sname: Sname, ast: crate::ast::NodeId, flag: DeclFlag) -> AddOutcome {
    let outcome = self.session.typedefs.add(sname.clone(), ast, flag);
    if outcome == AddOutcome::Inserted {
      self.inserted.push(sname);
    }
    outcome
  }

  /// The command succeeded; keep every insertion.
  pub fn commit(self) {}

  /// The command failed; undo every insertion this scope made.
  pub fn rollback(self) {
    for sname in self.inserted {
      self.session.typedefs.remove(&sname);
    }
  }
}
