//! String interning for identifiers: `Symbol` is a cheap `Copy` handle into
//! an arena-backed string table.

use hashbrown::HashMap;
use std::cell::RefCell;
use std::fmt;
use typed_arena::Arena;

/// A cheap, `Copy`, interned identifier. Two `Symbol`s compare equal iff
/// their underlying text is equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

/// Owns the arena-allocated string storage behind every [`Symbol`] minted
/// through it. Dropping the `Interner` invalidates every `Symbol` it
/// produced (they become meaningless indices); in practice an `Interner`
/// lives as long as the [`crate::session::Session`] that owns it.
pub struct Interner<'a> {
  arena: &'a Arena<u8>,
  strings: RefCell<Vec<&'a str>>,
  lookup: RefCell<HashMap<&'a str, Symbol>>,
}

impl<'a> Interner<'a> {
  #[must_use] pub fn new(arena: &'a Arena<u8>) -> Self {
    Self { arena, strings: RefCell::new(Vec::new()), lookup: RefCell::new(HashMap::new()) }
  }

  /// Interns `s`, returning the existing `Symbol` if `s` was seen before.
  pub fn intern(&self, s: &str) -> Symbol {
    if let Some(&sym) = self.lookup.borrow().get(s) {
      return sym;
    }
    let bytes = self.arena.alloc_extend(s.bytes());
    // Safety: `bytes` was just copied from a valid `&str`, so it is valid UTF-8.
    let stored: &'a str = unsafe { std::str::from_utf8_unchecked(bytes) };
    let mut strings = self.strings.borrow_mut();
    let sym = Symbol(u32::try_from(strings.len()).expect("too many interned symbols"));
    strings.push(stored);
    self.lookup.borrow_mut().insert(stored, sym);
    sym
  }

  /// Resolves a `Symbol` back to its text. Panics if `sym` was not produced
  /// by this `Interner`.
  #[must_use] pub fn resolve(&self, sym: Symbol) -> &'a str {
    self.strings.borrow()[sym.0 as usize]
  }
}

impl fmt::Debug for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Symbol({})", self.0) }
}
