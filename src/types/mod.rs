//! The type-id system: three disjoint bitsets (base/storage/attrs) plus
//! normalization and per-language-version legality.

pub mod lang;
pub mod operator;

pub use lang::{Language, LanguageSet};

use bitflags::bitflags;
use std::fmt;

bitflags! {
  /// The base type of a declaration: what kind of "thing" it fundamentally
  /// is, independent of storage class or attributes.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct BaseType: u64 {
    const NONE        = 0;
    const VOID        = 1 << 0;
    const BOOL        = 1 << 1;
    const CHAR        = 1 << 2;
    const CHAR8_T     = 1 << 3;
    const CHAR16_T    = 1 << 4;
    const CHAR32_T    = 1 << 5;
    const WCHAR_T     = 1 << 6;
    const INT         = 1 << 7;
    const SIGNED      = 1 << 8;
    const UNSIGNED    = 1 << 9;
    const SHORT       = 1 << 10;
    const LONG        = 1 << 11;
    const LONG_LONG   = 1 << 12;
    const FLOAT       = 1 << 13;
    const DOUBLE      = 1 << 14;
    const LONG_DOUBLE = 1 << 15;
    const BITINT      = 1 << 16;
    /// Embedded-C `_Accum`.
    const ACCUM       = 1 << 17;
    /// Embedded-C `_Fract`.
    const FRACT       = 1 << 18;
    /// Embedded-C `_Sat`; requires [`Self::ACCUM`] or [`Self::FRACT`].
    const SAT         = 1 << 19;
    const ENUM        = 1 << 20;
    const CLASS       = 1 << 21;
    const STRUCT      = 1 << 22;
    const UNION       = 1 << 23;
    const NAMESPACE   = 1 << 24;
    /// `auto` as a placeholder base type (not the storage-deduction keyword).
    const AUTO        = 1 << 25;
    /// Marks a node as a typedef's aliased base before it is promoted to a
    /// `NodeKind::Typedef` wrapper during building.
    const TYPEDEF     = 1 << 26;

    const ANY_INT_MODIFIER = Self::SIGNED.bits() | Self::UNSIGNED.bits()
      | Self::SHORT.bits() | Self::LONG.bits() | Self::LONG_LONG.bits();
    const ANY_CHAR = Self::CHAR.bits() | Self::CHAR8_T.bits() | Self::CHAR16_T.bits()
      | Self::CHAR32_T.bits() | Self::WCHAR_T.bits();
    const ANY_FLOAT = Self::FLOAT.bits() | Self::DOUBLE.bits() | Self::LONG_DOUBLE.bits();
    const ANY_CSU = Self::CLASS.bits() | Self::STRUCT.bits() | Self::UNION.bits();
  }
}

bitflags! {
  /// Storage class, qualifier, and linkage bits.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct StorageClass: u64 {
    const NONE           = 0;
    const EXTERN         = 1 << 0;
    const EXTERN_C       = 1 << 1;
    const STATIC         = 1 << 2;
    const REGISTER       = 1 << 3;
    const TYPEDEF        = 1 << 4;
    const FRIEND         = 1 << 5;
    const INLINE         = 1 << 6;
    const VIRTUAL        = 1 << 7;
    const PURE_VIRTUAL   = 1 << 8;
    const EXPLICIT       = 1 << 9;
    const MUTABLE        = 1 << 10;
    const CONSTEXPR      = 1 << 11;
    const CONSTEVAL      = 1 << 12;
    const CONSTINIT      = 1 << 13;
    const ATOMIC         = 1 << 14;
    const CONST          = 1 << 15;
    const VOLATILE       = 1 << 16;
    const RESTRICT       = 1 << 17;
    const REF            = 1 << 18;
    const RVALUE_REF     = 1 << 19;
    const THROW          = 1 << 20;
    const NOEXCEPT       = 1 << 21;
    const DEFAULT        = 1 << 22;
    const DELETE         = 1 << 23;
    const FINAL          = 1 << 24;
    const OVERRIDE       = 1 << 25;
    /// `static` written inside `[]` (a non-empty-array qualifier).
    const ARRAY_STATIC   = 1 << 26;
    const ARRAY_CONST    = 1 << 27;
    const ARRAY_VOLATILE = 1 << 28;
    const ARRAY_RESTRICT = 1 << 29;
    /// An explicit-object (`this`) parameter.
    const THIS           = 1 << 30;
    const UPC_SHARED      = 1 << 31;
    const UPC_RELAXED     = 1 << 32;
    const UPC_STRICT      = 1 << 33;

    const ANY_LINKAGE = Self::EXTERN.bits() | Self::EXTERN_C.bits();
    const ANY_REF_QUALIFIER = Self::REF.bits() | Self::RVALUE_REF.bits();
    const ANY_ARRAY_QUALIFIER = Self::ARRAY_STATIC.bits() | Self::ARRAY_CONST.bits()
      | Self::ARRAY_VOLATILE.bits() | Self::ARRAY_RESTRICT.bits();
    const ANY_CV = Self::CONST.bits() | Self::VOLATILE.bits();
    /// Storage bits that make a member function "member-only" — illegal on
    /// a free (non-member) function.
    const ANY_MEMBER_ONLY = Self::VIRTUAL.bits() | Self::PURE_VIRTUAL.bits()
      | Self::EXPLICIT.bits() | Self::MUTABLE.bits() | Self::FINAL.bits()
      | Self::OVERRIDE.bits() | Self::THIS.bits();
    /// "Non-empty" in the sense of `4.G.array`: any qualifier that implies
    /// the array must carry a dimension.
    const NON_EMPTY = Self::ARRAY_STATIC.bits();
  }
}

bitflags! {
  /// `[[attribute]]`-style and calling-convention bits.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct Attribute: u32 {
    const NONE                 = 0;
    const CARRIES_DEPENDENCY   = 1 << 0;
    const DEPRECATED           = 1 << 1;
    const MAYBE_UNUSED         = 1 << 2;
    const NODISCARD            = 1 << 3;
    const NORETURN             = 1 << 4;
    const NO_UNIQUE_ADDRESS    = 1 << 5;
    const REPRODUCIBLE         = 1 << 6;
    const UNSEQUENCED          = 1 << 7;
    const MSC_CDECL            = 1 << 8;
    const MSC_STDCALL          = 1 << 9;
    const MSC_FASTCALL         = 1 << 10;
    const MSC_THISCALL         = 1 << 11;
    const MSC_VECTORCALL       = 1 << 12;

    const ANY_MSC_CALLCONV = Self::MSC_CDECL.bits() | Self::MSC_STDCALL.bits()
      | Self::MSC_FASTCALL.bits() | Self::MSC_THISCALL.bits() | Self::MSC_VECTORCALL.bits();
    /// Attributes legal on ordinary (non-function) objects.
    const ANY_OBJECT = Self::CARRIES_DEPENDENCY.bits() | Self::DEPRECATED.bits()
      | Self::MAYBE_UNUSED.bits() | Self::NODISCARD.bits() | Self::NO_UNIQUE_ADDRESS.bits();
  }
}

/// The `(base, storage, attrs)` triple that describes one declaration's
/// type: closed under union, intersection, and complement per-component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeId {
  pub base: BaseType,
  pub storage: StorageClass,
  pub attrs: Attribute,
}

impl TypeId {
  #[must_use] pub fn new(base: BaseType, storage: StorageClass, attrs: Attribute) -> Self {
    Self { base, storage, attrs }
  }

  #[must_use] pub fn union(self, other: Self) -> Self {
    Self { base: self.base | other.base, storage: self.storage | other.storage, attrs: self.attrs | other.attrs }
  }

  #[must_use] pub fn intersect(self, other: Self) -> Self {
    Self { base: self.base & other.base, storage: self.storage & other.storage, attrs: self.attrs & other.attrs }
  }

  #[must_use] pub fn complement(self) -> Self {
    Self { base: self.base.complement(), storage: self.storage.complement(), attrs: self.attrs.complement() }
  }

  #[must_use] pub fn is_any_base(self, mask: BaseType) -> bool { self.base.intersects(mask) }
  #[must_use] pub fn is_any_storage(self, mask: StorageClass) -> bool { self.storage.intersects(mask) }
  #[must_use] pub fn is_any_attr(self, mask: Attribute) -> bool { self.attrs.intersects(mask) }

  /// Expands composite shorthand into canonical form, e.g. bare `short` ->
  /// `short int`, `signed` alone -> `int`, `long long` -> `long long int`.
  #[must_use] pub fn normalize(mut self) -> Self {
    if self.base.intersects(BaseType::ANY_INT_MODIFIER) && !self.base.intersects(BaseType::INT) {
      self.base |= BaseType::INT;
    }
    self
  }

  /// The set of language versions in which this triple is well-formed,
  /// computed as the intersection of every set bit's own legal-language set.
  #[must_use] pub fn legal_in(self) -> LanguageSet {
    let mut set = LanguageSet::all_c() | LanguageSet::all_cpp() | LanguageSet::EC | LanguageSet::UPC;
    for bit in iter_base_bits(self.base) { set &= base_legal(bit); }
    for bit in iter_storage_bits(self.storage) { set &= storage_legal(bit); }
    for bit in iter_attr_bits(self.attrs) { set &= attr_legal(bit); }
    set
  }
}

/// Singleton-bit iteration, deliberately bypassing `bitflags`'s `iter()`
/// (which would also yield the composite `ANY_*` constants and double-count
/// their legality against the same underlying bits).
fn iter_base_bits(b: BaseType) -> impl Iterator<Item = BaseType> {
  (0..64).filter_map(move |i| {
    let bit = BaseType::from_bits_retain(1u64 << i);
    (b & bit == bit && !bit.is_empty()).then_some(bit)
  })
}
fn iter_storage_bits(s: StorageClass) -> impl Iterator<Item = StorageClass> {
  (0..64).filter_map(move |i| {
    let bit = StorageClass::from_bits_retain(1u64 << i);
    (s & bit == bit && !bit.is_empty()).then_some(bit)
  })
}
fn iter_attr_bits(a: Attribute) -> impl Iterator<Item = Attribute> {
  (0..32).filter_map(move |i| {
    let bit = Attribute::from_bits_retain(1u32 << i);
    (a & bit == bit && !bit.is_empty()).then_some(bit)
  })
}

fn base_legal(bit: BaseType) -> LanguageSet {
  use BaseType as B;
  match bit {
    B::CHAR8_T => LanguageSet::since(LanguageSet::CPP20),
    B::CHAR16_T | B::CHAR32_T =>
      LanguageSet::since(LanguageSet::CPP11) | LanguageSet::since(LanguageSet::C11),
    B::BOOL => LanguageSet::since(LanguageSet::C99) | LanguageSet::all_cpp(),
    B::LONG_LONG => LanguageSet::since(LanguageSet::C99) | LanguageSet::since(LanguageSet::CPP11),
    B::AUTO => LanguageSet::since(LanguageSet::CPP11),
    B::BITINT => LanguageSet::since(LanguageSet::C23),
    B::ACCUM | B::FRACT | B::SAT => LanguageSet::EC,
    B::NAMESPACE => LanguageSet::all_cpp(),
    B::CLASS => LanguageSet::all_cpp(),
    _ => LanguageSet::all_c() | LanguageSet::all_cpp() | LanguageSet::EC | LanguageSet::UPC,
  }
}

fn storage_legal(bit: StorageClass) -> LanguageSet {
  use StorageClass as S;
  match bit {
    S::EXTERN_C => LanguageSet::all_cpp(),
    S::FRIEND | S::VIRTUAL | S::PURE_VIRTUAL | S::EXPLICIT | S::MUTABLE
      | S::FINAL | S::OVERRIDE | S::THIS => LanguageSet::all_cpp(),
    S::CONSTEXPR => LanguageSet::since(LanguageSet::C23) | LanguageSet::since(LanguageSet::CPP11),
    S::CONSTEVAL | S::CONSTINIT => LanguageSet::since(LanguageSet::CPP20),
    S::REF | S::RVALUE_REF => LanguageSet::since(LanguageSet::CPP11),
    S::NOEXCEPT => LanguageSet::since(LanguageSet::CPP11),
    S::DEFAULT | S::DELETE => LanguageSet::since(LanguageSet::CPP11),
    S::ATOMIC => LanguageSet::since(LanguageSet::C11),
    S::RESTRICT => LanguageSet::all_c() | LanguageSet::UPC,
    S::UPC_SHARED | S::UPC_RELAXED | S::UPC_STRICT => LanguageSet::UPC,
    _ => LanguageSet::all_c() | LanguageSet::all_cpp() | LanguageSet::EC | LanguageSet::UPC,
  }
}

fn attr_legal(bit: Attribute) -> LanguageSet {
  use Attribute as A;
  match bit {
    A::CARRIES_DEPENDENCY | A::NORETURN => LanguageSet::since(LanguageSet::CPP11),
    A::DEPRECATED => LanguageSet::since(LanguageSet::CPP14) | LanguageSet::since(LanguageSet::C23),
    A::MAYBE_UNUSED | A::NODISCARD => LanguageSet::since(LanguageSet::CPP17),
    A::NO_UNIQUE_ADDRESS => LanguageSet::since(LanguageSet::CPP20),
    A::REPRODUCIBLE | A::UNSEQUENCED => LanguageSet::since(LanguageSet::CPP23),
    a if Attribute::ANY_MSC_CALLCONV.contains(a) =>
      LanguageSet::all_c() | LanguageSet::all_cpp(),
    _ => LanguageSet::all_c() | LanguageSet::all_cpp() | LanguageSet::EC | LanguageSet::UPC,
  }
}

impl fmt::Display for TypeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}/{:?}/{:?}", self.base, self.storage, self.attrs)
  }
}
