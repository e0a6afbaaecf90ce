//! Printer contracts: the flag/option types a concrete gibberish/pseudo-
//! English renderer is built against, and the one presentation helper the
//! checker itself needs. The renderers are declared only — an actual
//! `GibberishPrinter`/`EnglishPrinter` implementation is a downstream
//! collaborator, same as the lexer and parser front-end.

use crate::ast::{Arena, NodeId};
use crate::session::{CvPlacement, GraphMode};
use crate::typedef::TypedefRecord;
use crate::types::{BaseType, Language, StorageClass, TypeId};
use arrayvec::ArrayVec;
use bitflags::bitflags;
use std::fmt;

bitflags! {
  /// Output-shape flags for one gibberish rendering call.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct GibberishFlags: u16 {
    /// Render as a cast expression (`(T)x` / `static_cast<T>(x)`), not a
    /// declaration.
    const CAST               = 1 << 0;
    const DECLARATION         = 1 << 1;
    const TYPEDEF             = 1 << 2;
    const USING               = 1 << 3;
    /// The second and later declarator in a comma-separated list: the
    /// shared type prefix is omitted.
    const MULTI_DECL          = 1 << 4;
    const OMIT_TYPE           = 1 << 5;
    const TRAILING_SEMICOLON  = 1 << 6;
  }
}

bitflags! {
  /// Output-shape flags for one pseudo-English rendering call.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct EnglishFlags: u16 {
    /// Omit the leading "declare" pseudo-keyword.
    const OMIT_DECLARE = 1 << 0;
  }
}

/// Renders declarations as C/C++ source ("gibberish"). A renderer is
/// expected to honor the `cv`/`graph` options consistently with §4.H's
/// postfix-order, west/east spacing, and alt-token/digraph/trigraph
/// substitution rules; this trait only fixes the call shape.
pub trait GibberishPrinter {
  /// Renders the declaration rooted at `ast` into `out`.
  fn ast_gibberish(
    &self, arena: &Arena<'_>, ast: NodeId, flags: GibberishFlags,
    cv: CvPlacement, graph: GraphMode, out: &mut dyn fmt::Write,
  ) -> fmt::Result;

  /// Renders a typedef registry entry as `typedef`/`using`, per its own
  /// [`crate::typedef::DeclFlag`].
  fn typedef_gibberish(
    &self, arena: &Arena<'_>, td: &TypedefRecord, flags: GibberishFlags,
    cv: CvPlacement, graph: GraphMode, out: &mut dyn fmt::Write,
  ) -> fmt::Result;
}

/// Renders declarations as pseudo-English (`declare x as pointer to int`).
pub trait EnglishPrinter {
  fn ast_english(
    &self, arena: &Arena<'_>, ast: NodeId, flags: EnglishFlags, out: &mut dyn fmt::Write,
  ) -> fmt::Result;

  /// A typedef always prints in full English (`V is void`); there is no
  /// multi-declarator or omit-type shorthand to flag for.
  fn typedef_english(&self, arena: &Arena<'_>, td: &TypedefRecord, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// A short diagnostic name for a type triple, independent of any
/// declarator — the one piece of rendering logic the checker itself needs
/// (e.g. naming the type a `legal_in` mismatch was reported against).
#[must_use] pub fn render(ty: &TypeId, lang: Language) -> String {
  // At most 7 storage words, 4 base-width words, and the noun: fits a fixed
  // stack buffer with room to spare.
  let mut words: ArrayVec<&'static str, 12> = ArrayVec::new();
  let s = ty.storage;
  if s.contains(StorageClass::STATIC) { words.push("static"); }
  if s.contains(StorageClass::EXTERN) { words.push("extern"); }
  if s.contains(StorageClass::CONSTEVAL) { words.push("consteval"); }
  else if s.contains(StorageClass::CONSTEXPR) { words.push("constexpr"); }
  if s.contains(StorageClass::MUTABLE) { words.push("mutable"); }
  if s.contains(StorageClass::CONST) { words.push("const"); }
  if s.contains(StorageClass::VOLATILE) { words.push("volatile"); }
  if s.contains(StorageClass::RESTRICT) { words.push("restrict"); }

  let b = ty.base;
  if b.contains(BaseType::UNSIGNED) { words.push("unsigned"); }
  else if b.contains(BaseType::SIGNED) { words.push("signed"); }
  if b.contains(BaseType::SHORT) { words.push("short"); }
  if b.contains(BaseType::LONG_LONG) { words.push("long long"); }
  else if b.contains(BaseType::LONG) { words.push("long"); }
  if b.contains(BaseType::SAT) { words.push("_Sat"); }

  let noun = base_noun(b, lang);
  words.push(if noun.is_empty() { "int" } else { noun });
  words.join(" ")
}

fn base_noun(b: BaseType, lang: Language) -> &'static str {
  if b.contains(BaseType::VOID) { return "void"; }
  if b.contains(BaseType::BOOL) { return "bool"; }
  if b.contains(BaseType::CHAR8_T) { return "char8_t"; }
  if b.contains(BaseType::CHAR16_T) { return "char16_t"; }
  if b.contains(BaseType::CHAR32_T) { return "char32_t"; }
  if b.contains(BaseType::WCHAR_T) { return "wchar_t"; }
  if b.contains(BaseType::CHAR) { return "char"; }
  if b.contains(BaseType::FLOAT) { return "float"; }
  if b.contains(BaseType::LONG_DOUBLE) { return "long double"; }
  if b.contains(BaseType::DOUBLE) { return "double"; }
  if b.contains(BaseType::ACCUM) { return "_Accum"; }
  if b.contains(BaseType::FRACT) { return "_Fract"; }
  if b.contains(BaseType::AUTO) { return if lang.is_cpp() { "auto" } else { "int" }; }
  if b.contains(BaseType::ENUM) { return "enum"; }
  if b.contains(BaseType::CLASS) { return "class"; }
  if b.contains(BaseType::STRUCT) { return "struct"; }
  if b.contains(BaseType::UNION) { return "union"; }
  if b.contains(BaseType::NAMESPACE) { return "namespace"; }
  ""
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Attribute, LanguageSet};

  #[test]
  fn renders_unsigned_long_int() {
    let ty = TypeId::new(BaseType::LONG | BaseType::UNSIGNED, StorageClass::NONE, Attribute::NONE);
    let rendered = render(&ty, Language::new(LanguageSet::C17));
    assert_eq!(rendered, "unsigned long int");
  }

  #[test]
  fn renders_const_void() {
    let ty = TypeId::new(BaseType::VOID, StorageClass::CONST, Attribute::NONE);
    let rendered = render(&ty, Language::new(LanguageSet::CPP17));
    assert_eq!(rendered, "const void");
  }

  #[test]
  fn empty_triple_defaults_to_int() {
    let ty = TypeId::new(BaseType::NONE, StorageClass::NONE, Attribute::NONE);
    let rendered = render(&ty, Language::new(LanguageSet::C89));
    assert_eq!(rendered, "int");
  }
}
