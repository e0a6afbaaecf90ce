//! Language-version flags: the set of C/C++ dialects this crate reasons
//! about, and the "current language" the checker runs against.

use bitflags::bitflags;
use std::fmt;

bitflags! {
  /// A set of language versions. Used both as "legal in these languages"
  /// (on a type-id, kind, or operator) and as the "currently active
  /// language(s)" carried by a [`crate::session::Session`] — the latter is
  /// usually one base-language bit, optionally OR'd with the `EC` or `UPC`
  /// dialect-extension bits.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct LanguageSet: u32 {
    /// Pre-standard K&R C (no prototypes).
    const KNR    = 1 << 0;
    const C78    = 1 << 1;
    const C89    = 1 << 2;
    const C95    = 1 << 3;
    const C99    = 1 << 4;
    const C11    = 1 << 5;
    const C17    = 1 << 6;
    const C23    = 1 << 7;
    const CPP98  = 1 << 8;
    const CPP03  = 1 << 9;
    const CPP11  = 1 << 10;
    const CPP14  = 1 << 11;
    const CPP17  = 1 << 12;
    const CPP20  = 1 << 13;
    const CPP23  = 1 << 14;
    const CPP26  = 1 << 15;
    /// Embedded-C (ISO/IEC TR 18037) dialect extension, layered on a C base.
    const EC     = 1 << 16;
    /// Unified Parallel C dialect extension, layered on a C base.
    const UPC    = 1 << 17;
  }
}

impl LanguageSet {
  /// All C base-language bits (excluding the `EC`/`UPC` dialect extensions).
  #[must_use] pub fn all_c() -> Self {
    Self::KNR | Self::C78 | Self::C89 | Self::C95 | Self::C99 | Self::C11 | Self::C17 | Self::C23
  }

  /// All C++ base-language bits.
  #[must_use] pub fn all_cpp() -> Self {
    Self::CPP98 | Self::CPP03 | Self::CPP11 | Self::CPP14 | Self::CPP17
      | Self::CPP20 | Self::CPP23 | Self::CPP26
  }

  /// All base-language bits from `from` onward (inclusive), within the same
  /// family (C or C++) as `from`. Used to express "requires language
  /// support starting at version X."
  #[must_use] pub fn since(from: Self) -> Self {
    let family: &[Self] = if Self::all_c().contains(from) {
      &[Self::KNR, Self::C78, Self::C89, Self::C95, Self::C99, Self::C11, Self::C17, Self::C23]
    } else {
      &[Self::CPP98, Self::CPP03, Self::CPP11, Self::CPP14, Self::CPP17,
        Self::CPP20, Self::CPP23, Self::CPP26]
    };
    let mut seen = false;
    let mut out = Self::empty();
    for &bit in family {
      if bit == from { seen = true; }
      if seen { out |= bit; }
    }
    out
  }

  /// `true` if `lang` (the active language, possibly with dialect bits) has
  /// any base-language bit in common with `self`.
  #[must_use] pub fn contains_lang(self, lang: Self) -> bool {
    self.intersects(lang & !(Self::EC | Self::UPC)) || self.intersects(lang)
  }

  #[must_use] pub fn is_cpp(self) -> bool { self.intersects(Self::all_cpp()) }
  #[must_use] pub fn is_c(self) -> bool { self.intersects(Self::all_c()) }
}

impl fmt::Display for LanguageSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<&str> = self.iter_names().map(|(n, _)| n).collect();
    write!(f, "{}", names.join("/"))
  }
}

/// The currently active language: always a single base-language bit,
/// optionally OR'd with the `EC`/`UPC` dialect extensions. Distinguished
/// from a bare [`LanguageSet`] (used for "legal in" ranges, which may span
/// many bits) so a [`crate::session::Session`] can't accidentally be
/// configured with more than one base language at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language(LanguageSet);

impl Language {
  #[must_use] pub fn new(set: LanguageSet) -> Self { Self(set) }
  #[must_use] pub fn set(self) -> LanguageSet { self.0 }
  #[must_use] pub fn is_cpp(self) -> bool { self.0.is_cpp() }
  #[must_use] pub fn is_c(self) -> bool { self.0.is_c() }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn since_c() {
    let s = LanguageSet::since(LanguageSet::C99);
    assert!(s.contains(LanguageSet::C99));
    assert!(s.contains(LanguageSet::C23));
    assert!(!s.contains(LanguageSet::C89));
    assert!(!s.contains(LanguageSet::CPP11));
  }

  #[test]
  fn since_cpp() {
    let s = LanguageSet::since(LanguageSet::CPP11);
    assert!(s.contains(LanguageSet::CPP11));
    assert!(s.contains(LanguageSet::CPP26));
    assert!(!s.contains(LanguageSet::CPP98));
  }

  #[test]
  fn dialect_layering() {
    let active = LanguageSet::C99 | LanguageSet::EC;
    assert!(active.is_c());
    assert!(LanguageSet::C99.contains_lang(active));
  }
}
