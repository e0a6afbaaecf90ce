//! The explicit, immutable context threaded through both checker passes,
//! in place of the global/thread-local mutable state a visitor would
//! otherwise reach for.

use crate::session::Session;
use crate::types::Language;

/// Per-recursion-step context: the active session plus the one
/// position-sensitive hint the checker needs for the bare-`void` rule:
/// "is the node about to be checked one level beneath a `typedef` that
/// either introduces the alias itself, or is itself pointed to?"
#[derive(Clone, Copy)]
pub struct CheckState<'a> {
  pub session: &'a Session,
  /// `true` immediately under a `typedef` node that either carries the
  /// `typedef` storage bit itself (introducing the alias) or whose own
  /// parent is a `pointer` (the alias is being pointed to); licenses a
  /// bare `void` one level deeper that would otherwise be illegal.
  pub void_exempt: bool,
}

impl<'a> CheckState<'a> {
  #[must_use] pub fn new(session: &'a Session) -> Self {
    Self { session, void_exempt: false }
  }

  #[must_use] pub fn language(&self) -> Language { self.session.language }

  /// A copy of this state with the void-exemption hint set.
  #[must_use] pub fn with_void_exempt(self, value: bool) -> Self {
    Self { void_exempt: value, ..self }
  }
}
