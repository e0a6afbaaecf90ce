//! Scoped names: an ordered sequence of `(identifier, kind)` pairs naming a
//! declaration's enclosing scopes, innermost last.

use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt;

/// The kind of a single scope in an [`Sname`].
///
/// Ordered coarsest-to-finest; [`ScopeKind::rank`] gives the integer used to
/// forbid nesting a coarser kind inside a finer one (a `namespace` cannot
/// appear inside a `class`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
  /// Kind not yet known; coercible once a real kind is observed.
  Scope,
  Namespace,
  InlineNamespace,
  Class,
  Struct,
  Union,
  Enum,
}

impl ScopeKind {
  /// Monotonic rank used by the nesting-order check: outer scopes must have
  /// a rank no greater than the scopes nested within them.
  #[must_use] pub fn rank(self) -> u8 {
    match self {
      Self::Scope => 0,
      Self::Namespace | Self::InlineNamespace => 1,
      Self::Class | Self::Struct | Self::Union => 2,
      Self::Enum => 3,
    }
  }

  #[must_use] pub fn is_csu(self) -> bool {
    matches!(self, Self::Class | Self::Struct | Self::Union)
  }
}

impl fmt::Display for ScopeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Scope => "scope",
      Self::Namespace => "namespace",
      Self::InlineNamespace => "inline namespace",
      Self::Class => "class",
      Self::Struct => "struct",
      Self::Union => "union",
      Self::Enum => "enum",
    })
  }
}

/// One scope in a scoped name: an identifier plus the kind of scope it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
  pub name: String,
  pub kind: ScopeKind,
}

impl Scope {
  #[must_use] pub fn new(name: impl Into<String>, kind: ScopeKind) -> Self {
    Self { name: name.into(), kind }
  }
}

/// Error produced while building or comparing an [`Sname`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnameError {
  /// An identifier collides with a reserved keyword of the current language.
  Syntax(String),
  /// A coarser scope kind was nested inside a finer one, e.g. `namespace`
  /// inside `class`.
  NestedKind { outer: ScopeKind, inner: ScopeKind },
  /// `parse_dtor` was given a string that isn't a valid destructor name.
  NotADestructor(String),
}

impl fmt::Display for SnameError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Syntax(id) => write!(f, "\"{id}\" is a keyword, not an identifier"),
      Self::NestedKind { outer, inner } =>
        write!(f, "{inner} cannot nest inside {outer}"),
      Self::NotADestructor(s) => write!(f, "\"{s}\" is not a valid destructor name"),
    }
  }
}

impl std::error::Error for SnameError {}

/// A scoped name: a non-empty, ordered list of [`Scope`]s, innermost last.
///
/// Two `Sname`s compare equal iff they have the same length and pairwise
/// equal identifiers (scope *kind* does not participate in equality: a
/// `scope` placeholder and its later-coerced `namespace` kind name the same
/// thing).
#[derive(Debug, Clone)]
pub struct Sname {
  scopes: SmallVec<[Scope; 2]>,
}

impl Sname {
  /// A single-scope name.
  #[must_use] pub fn new(name: impl Into<String>, kind: ScopeKind) -> Self {
    Self { scopes: smallvec::smallvec![Scope::new(name, kind)] }
  }

  /// Appends an inner scope, enforcing the scope-kind-ordering invariant.
  ///
  /// # Errors
  /// Returns [`SnameError::NestedKind`] if `kind` is coarser than the
  /// current innermost scope.
  pub fn append(&mut self, name: impl Into<String>, kind: ScopeKind) -> Result<(), SnameError> {
    if let Some(last) = self.scopes.last() {
      if kind.rank() < last.kind.rank() {
        return Err(SnameError::NestedKind { outer: last.kind, inner: kind });
      }
    }
    self.scopes.push(Scope::new(name, kind));
    Ok(())
  }

  /// Removes and returns the innermost scope, if more than one remains.
  pub fn pop(&mut self) -> Option<Scope> {
    if self.scopes.len() > 1 { self.scopes.pop() } else { None }
  }

  #[must_use] pub fn len(&self) -> usize { self.scopes.len() }
  #[must_use] pub fn is_empty(&self) -> bool { false } // invariant: never empty

  /// The innermost (rightmost) identifier.
  #[must_use] pub fn local_name(&self) -> &str { &self.scopes.last().expect("non-empty").name }

  /// All but the innermost identifier, joined by `::`.
  #[must_use] pub fn scope_name(&self) -> String {
    self.scopes[..self.scopes.len() - 1].iter().map(|s| s.name.as_str()).join("::")
  }

  /// Every identifier, joined by `::`.
  #[must_use] pub fn full_name(&self) -> String {
    self.scopes.iter().map(|s| s.name.as_str()).join("::")
  }

  /// Coerces the innermost scope's kind, e.g. from [`ScopeKind::Scope`] to
  /// [`ScopeKind::Namespace`] once a matching user type becomes known.
  ///
  /// # Errors
  /// Fails if the innermost scope already has a concrete (non-[`ScopeKind::Scope`])
  /// kind different from `kind`.
  pub fn coerce_kind(&mut self, kind: ScopeKind) -> Result<(), SnameError> {
    let last = self.scopes.last_mut().expect("non-empty");
    if last.kind != ScopeKind::Scope && last.kind != kind {
      return Err(SnameError::NestedKind { outer: last.kind, inner: kind });
    }
    last.kind = kind;
    Ok(())
  }

  /// `true` if this name is shaped like a constructor name: at least two
  /// scopes, with the last equal to the penultimate.
  #[must_use] pub fn is_ctor(&self) -> bool {
    self.scopes.len() >= 2 && {
      let n = self.scopes.len();
      self.scopes[n - 1].name == self.scopes[n - 2].name
    }
  }

  /// Parses `s` (identifiers separated by `::`) into an `Sname`, rejecting
  /// any component that is a keyword of `is_keyword`.
  ///
  /// # Errors
  /// [`SnameError::Syntax`] if any component is a reserved keyword.
  pub fn parse(s: &str, is_keyword: impl Fn(&str) -> bool) -> Result<Self, SnameError> {
    let mut scopes = SmallVec::new();
    for part in s.split("::") {
      if is_keyword(part) {
        return Err(SnameError::Syntax(part.to_string()));
      }
      scopes.push(Scope::new(part, ScopeKind::Scope));
    }
    Ok(Self { scopes })
  }

  /// Parses a destructor name (`~Foo` or `compl Foo`), requiring the leading
  /// `~`/`compl` and that the last two scopes of the enclosing name match.
  ///
  /// # Errors
  /// [`SnameError::NotADestructor`] if the leading marker is missing or the
  /// last two scopes don't match; [`SnameError::Syntax`] for keyword clashes.
  pub fn parse_dtor(s: &str, is_keyword: impl Fn(&str) -> bool) -> Result<Self, SnameError> {
    let stripped = s.strip_prefix('~')
      .or_else(|| s.strip_prefix("compl ").map(str::trim_start))
      .ok_or_else(|| SnameError::NotADestructor(s.to_string()))?;
    let mut sname = Self::parse(stripped, is_keyword)?;
    if sname.scopes.len() < 2 {
      return Err(SnameError::NotADestructor(s.to_string()));
    }
    let n = sname.scopes.len();
    if sname.scopes[n - 1].name != sname.scopes[n - 2].name {
      return Err(SnameError::NotADestructor(s.to_string()));
    }
    sname.scopes[n - 1].name = format!("~{}", sname.scopes[n - 1].name);
    Ok(sname)
  }

  /// Matches this name against an fnmatch-style glob, scope by scope, with
  /// support for a leading `**::` wildcard meaning "at any scope depth."
  #[must_use] pub fn matches_glob(&self, glob: &str) -> bool {
    let (any_depth, rest) = match glob.strip_prefix("**::") {
      Some(rest) => (true, rest),
      None => (false, glob),
    };
    let segs: Vec<&str> = rest.split("::").collect();
    if any_depth {
      if segs.len() > self.scopes.len() { return false; }
      let tail = &self.scopes[self.scopes.len() - segs.len()..];
      tail.iter().zip(&segs).all(|(scope, pat)| glob_match(pat, &scope.name))
    } else {
      if segs.len() != self.scopes.len() { return false; }
      self.scopes.iter().zip(&segs).all(|(scope, pat)| glob_match(pat, &scope.name))
    }
  }

  pub fn scopes(&self) -> &[Scope] { &self.scopes }
}

impl PartialEq for Sname {
  fn eq(&self, other: &Self) -> bool {
    self.scopes.len() == other.scopes.len()
      && self.scopes.iter().zip(&other.scopes).all(|(a, b)| a.name == b.name)
  }
}
impl Eq for Sname {}

impl fmt::Display for Sname {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.full_name()) }
}

/// Minimal fnmatch-style glob: `*` matches any run of characters, `?`
/// matches exactly one character, all else is literal.
fn glob_match(pattern: &str, text: &str) -> bool {
  fn go(p: &[u8], t: &[u8]) -> bool {
    match (p.first(), t.first()) {
      (None, None) => true,
      (Some(b'*'), _) => go(&p[1..], t) || (!t.is_empty() && go(p, &t[1..])),
      (Some(b'?'), Some(_)) => go(&p[1..], &t[1..]),
      (Some(&pc), Some(&tc)) if pc == tc => go(&p[1..], &t[1..]),
      _ => false,
    }
  }
  go(pattern.as_bytes(), text.as_bytes())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn no_keywords(_: &str) -> bool { false }

  #[test]
  fn parse_and_equality() {
    let a = Sname::parse("std::vector", no_keywords).unwrap();
    let b = Sname::parse("std::vector", no_keywords).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.local_name(), "vector");
    assert_eq!(a.scope_name(), "std");
    assert_eq!(a.full_name(), "std::vector");
  }

  #[test]
  fn keyword_rejected() {
    let is_kw = |s: &str| s == "int";
    assert!(matches!(Sname::parse("int", is_kw), Err(SnameError::Syntax(_))));
  }

  #[test]
  fn nested_kind_rejected() {
    let mut sn = Sname::new("outer", ScopeKind::Class);
    let err = sn.append("inner", ScopeKind::Namespace).unwrap_err();
    assert!(matches!(err, SnameError::NestedKind { .. }));
  }

  #[test]
  fn ctor_detection() {
    let mut sn = Sname::new("Widget", ScopeKind::Class);
    sn.append("Widget", ScopeKind::Scope).unwrap();
    assert!(sn.is_ctor());
  }

  #[test]
  fn dtor_parse() {
    let sn = Sname::parse_dtor("~Widget::Widget", no_keywords).unwrap();
    assert_eq!(sn.local_name(), "~Widget");
  }

  #[test]
  fn glob_any_depth() {
    let sn = Sname::parse("a::b::c", no_keywords).unwrap();
    assert!(sn.matches_glob("**::c"));
    assert!(sn.matches_glob("**::b::c"));
    assert!(!sn.matches_glob("**::x"));
    assert!(sn.matches_glob("a::*::c"));
  }
}
