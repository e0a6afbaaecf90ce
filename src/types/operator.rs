//! Static metadata for every C++ overloadable (and non-overloadable)
//! operator.

use super::lang::LanguageSet;

/// Whether an operator may be declared as a member, a non-member (free)
/// function, either, or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overloadability {
  None,
  Member,
  NonMember,
  Either,
}

/// One row of the operator table.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
  pub op: Operator,
  /// Canonical source literal, e.g. `"+="`, `"[]"`, `"new[]"`.
  pub literal: &'static str,
  /// Language versions in which overloading this operator is legal at all.
  pub legal_in: LanguageSet,
  pub overloadability: Overloadability,
  pub params_min: u8,
  /// `None` means unbounded (`∞`).
  pub params_max: Option<u8>,
}

impl OperatorInfo {
  /// `true` for operators whose member-vs-non-member status must be
  /// inferred from arity because both are structurally legal with
  /// overlapping parameter counts (`&`, `*`, `+`, `++`, `-`, `--`).
  #[must_use] pub fn is_ambiguous(&self) -> bool {
    self.params_min == 0 && self.params_max == Some(2)
  }
}

macro_rules! operator_table {
  ($($(#[$attr:meta])* $variant:ident : $lit:literal, $lang:expr, $over:expr, $min:literal, $max:expr;)*) => {
    /// Every C++ operator cdecl can reason about, including non-overloadable
    /// ones (kept so the checker can name them in "not overloadable" errors).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[allow(non_camel_case_types)]
    pub enum Operator { $($(#[$attr])* $variant,)* }

    impl Operator {
      #[must_use] pub fn info(self) -> OperatorInfo {
        match self {
          $(Self::$variant => OperatorInfo {
            op: self, literal: $lit, legal_in: $lang, overloadability: $over,
            params_min: $min, params_max: $max,
          },)*
        }
      }

      #[must_use] pub fn as_str(self) -> &'static str { self.info().literal }

      /// Looks up an operator by its canonical literal. Where more than one
      /// row shares a literal (`()`, `[]`, which have distinct per-language
      /// rows), the first declared row is returned; use [`Self::resolve`]
      /// to pick the row matching an active language.
      #[allow(unreachable_patterns)]
      #[must_use] pub fn from_str(s: &str) -> Option<Self> {
        match s { $($lit => Some(Self::$variant),)* _ => None }
      }
    }
  };
}

use LanguageSet as L;
use Overloadability::{Either, Member, NonMember, None as NoOverload};

operator_table! {
  New: "new", L::all_cpp(), Either, 1, None;
  NewArray: "new[]", L::all_cpp(), Either, 1, None;
  Delete: "delete", L::all_cpp(), Either, 1, 1;
  DeleteArray: "delete[]", L::all_cpp(), Either, 1, 1;
  Plus: "+", L::all_cpp(), Either, 0, 2;
  Minus: "-", L::all_cpp(), Either, 0, 2;
  Star: "*", L::all_cpp(), Either, 0, 2;
  Slash: "/", L::all_cpp(), Either, 1, 2;
  Percent: "%", L::all_cpp(), Either, 1, 2;
  Caret: "^", L::all_cpp(), Either, 1, 2;
  Amp: "&", L::all_cpp(), Either, 0, 2;
  Pipe: "|", L::all_cpp(), Either, 1, 2;
  Tilde: "~", L::all_cpp(), Member, 0, 0;
  Not: "!", L::all_cpp(), Either, 0, 1;
  Assign: "=", L::all_cpp(), Member, 1, 1;
  Less: "<", L::all_cpp(), Either, 1, 2;
  Greater: ">", L::all_cpp(), Either, 1, 2;
  PlusEq: "+=", L::all_cpp(), Either, 1, 1;
  MinusEq: "-=", L::all_cpp(), Either, 1, 1;
  StarEq: "*=", L::all_cpp(), Either, 1, 1;
  SlashEq: "/=", L::all_cpp(), Either, 1, 1;
  PercentEq: "%=", L::all_cpp(), Either, 1, 1;
  CaretEq: "^=", L::all_cpp(), Either, 1, 1;
  AmpEq: "&=", L::all_cpp(), Either, 1, 1;
  PipeEq: "|=", L::all_cpp(), Either, 1, 1;
  ShiftLeft: "<<", L::all_cpp(), Either, 1, 2;
  ShiftRight: ">>", L::all_cpp(), Either, 1, 2;
  ShiftLeftEq: "<<=", L::all_cpp(), Either, 1, 1;
  ShiftRightEq: ">>=", L::all_cpp(), Either, 1, 1;
  Eq: "==", L::all_cpp(), Either, 1, 2;
  Ne: "!=", L::all_cpp(), Either, 1, 2;
  Le: "<=", L::all_cpp(), Either, 1, 2;
  Ge: ">=", L::all_cpp(), Either, 1, 2;
  Spaceship: "<=>", L::since(L::CPP20), Either, 1, 2;
  AndAnd: "&&", L::all_cpp(), Either, 1, 2;
  OrOr: "||", L::all_cpp(), Either, 1, 2;
  PlusPlus: "++", L::all_cpp(), Either, 0, 2;
  MinusMinus: "--", L::all_cpp(), Either, 0, 2;
  Comma: ",", L::all_cpp(), Either, 1, 2;
  ArrowStar: "->*", L::all_cpp(), Member, 1, 1;
  Arrow: "->", L::all_cpp(), Member, 0, 0;
  Call: "()", L::all_cpp(), Member, 0, None;
  Subscript: "[]", L::all_cpp() & !L::since(L::CPP23), Member, 1, 1;
  /// `[]` got a relaxed (non-exactly-one-parameter) arity in C++23.
  Subscript23: "[]", L::since(L::CPP23), Member, 0, None;
  CoAwait: "co_await", L::since(L::CPP20), Either, 0, 1;
  /// Not overloadable: ternary conditional.
  Conditional: "?:", L::empty(), NoOverload, 0, 0;
  /// Not overloadable: member access.
  Dot: ".", L::empty(), NoOverload, 0, 0;
  /// Not overloadable: scope resolution.
  ScopeRes: "::", L::empty(), NoOverload, 0, 0;
  /// Not overloadable: pointer-to-member access.
  DotStar: ".*", L::empty(), NoOverload, 0, 0;
}

impl Operator {
  /// All operator variants, in declaration order.
  const ALL: &'static [Operator] = &[
    Self::New, Self::NewArray, Self::Delete, Self::DeleteArray,
    Self::Plus, Self::Minus, Self::Star, Self::Slash, Self::Percent, Self::Caret,
    Self::Amp, Self::Pipe, Self::Tilde, Self::Not, Self::Assign, Self::Less, Self::Greater,
    Self::PlusEq, Self::MinusEq, Self::StarEq, Self::SlashEq, Self::PercentEq, Self::CaretEq,
    Self::AmpEq, Self::PipeEq, Self::ShiftLeft, Self::ShiftRight, Self::ShiftLeftEq,
    Self::ShiftRightEq, Self::Eq, Self::Ne, Self::Le, Self::Ge, Self::Spaceship,
    Self::AndAnd, Self::OrOr, Self::PlusPlus, Self::MinusMinus, Self::Comma,
    Self::ArrowStar, Self::Arrow, Self::Call, Self::Subscript, Self::Subscript23,
    Self::CoAwait, Self::Conditional, Self::Dot, Self::ScopeRes, Self::DotStar,
  ];

  /// Looks up the table row for `literal` whose [`OperatorInfo::legal_in`]
  /// contains `lang`, disambiguating duplicate-literal rows (`()`, `[]`) by
  /// the currently active language.
  #[must_use] pub fn resolve(literal: &str, lang: LanguageSet) -> Option<Self> {
    Self::ALL.iter().copied()
      .filter(|op| op.as_str() == literal)
      .find(|op| op.info().legal_in.contains_lang(lang))
      .or_else(|| Self::from_str(literal))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ambiguous_operators() {
    assert!(Operator::Amp.info().is_ambiguous());
    assert!(Operator::PlusPlus.info().is_ambiguous());
    assert!(!Operator::Assign.info().is_ambiguous());
  }

  #[test]
  fn non_overloadable_rejected_by_table() {
    assert_eq!(Operator::Conditional.info().overloadability, Overloadability::None);
  }

  #[test]
  fn spaceship_requires_cpp20() {
    assert!(!Operator::Spaceship.info().legal_in.contains(LanguageSet::CPP17));
    assert!(Operator::Spaceship.info().legal_in.contains(LanguageSet::CPP20));
  }

  #[test]
  fn resolve_picks_cpp23_subscript() {
    let old = Operator::resolve("[]", LanguageSet::CPP17).unwrap();
    assert_eq!(old, Operator::Subscript);
    let new = Operator::resolve("[]", LanguageSet::CPP23).unwrap();
    assert_eq!(new, Operator::Subscript23);
  }

  #[test]
  fn roundtrip_str() {
    assert_eq!(Operator::from_str("+="), Some(Operator::PlusEq));
    assert_eq!(Operator::PlusEq.as_str(), "+=");
  }
}
