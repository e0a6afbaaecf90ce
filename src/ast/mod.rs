//! The declaration AST.
//!
//! Every node lives in an [`Arena`] scoped to one command; cross-links are
//! by [`NodeId`], never by raw reference, so the tree has no ownership
//! cycles regardless of how tangled `typedef`/array/function nesting gets.

pub mod builder;
pub mod util;

use crate::sname::Sname;
use crate::types::operator::Operator;
use crate::types::TypeId;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use typed_arena::Arena as TypedArena;

/// An index into an [`Arena`]. Stable for the lifetime of the arena;
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// A source location, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
  pub line: u32,
  pub column: u32,
}

/// How an alignment was spelled: `alignas(N)` (a byte count) or
/// `alignas(T)` (recursively, the alignment of another type).
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
  Bytes(u32),
  Type(NodeId),
}

/// `none` (no dimension), a literal `int`, a named VLA bound (looked up
/// among the enclosing function's parameters), or C99's `*` VLA marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArraySize {
  None,
  Int(u64),
  Named(crate::symbol::Symbol),
  Star,
}

/// Whether a function-like node is known to be a class member, known to be
/// a free function, or not yet determined ([`util::operator_overload`]
/// infers this where possible).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
  Member,
  NonMember,
  Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind { C, Static, Const, Dynamic, Reinterpret }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
  Copy,
  Reference,
  /// A named variable, captured by value or by reference per its own spelling.
  Variable(crate::symbol::Symbol),
  This,
  StarThis,
}

/// A function parameter: its declarator AST plus whether it's the one
/// allowed parameter-pack tail.
#[derive(Debug, Clone, Copy)]
pub struct Param {
  pub node: NodeId,
}

/// A lambda capture.
#[derive(Debug, Clone, Copy)]
pub struct Capture {
  pub kind: CaptureKind,
  pub loc: Location,
}

/// The kind-specific payload of a declaration node: a tagged union in place
/// of a bitmask-plus-untagged-union, so each kind only carries the fields
/// that make sense for it.
#[derive(Debug, Clone)]
pub enum NodeKind {
  /// Not yet filled in; must not remain reachable once building completes.
  Placeholder,
  /// An untyped K&R parameter: identifier only.
  Name,
  /// A fundamental type; bit-width is set for `_BitInt(N)`.
  Builtin { bitint_width: Option<u32> },
  Enum { underlying: Option<NodeId>, class_tag: Option<Sname>, bit_width: Option<u32> },
  /// A class, struct, or union reference; which of the three is recorded
  /// in the node's `ty.base` bits (`BaseType::CLASS/STRUCT/UNION`).
  Csu { class_tag: Sname },
  Concept { concept_tag: Sname },
  /// A named alias for another type. Not a structural parent of `for_` —
  /// see [`util::untypedef`].
  Typedef { for_: NodeId },
  Array { of: NodeId, size_kind: ArraySize },
  Pointer { to: NodeId },
  PointerToMember { to: NodeId, class: Sname },
  Reference { to: NodeId },
  RvalueReference { to: NodeId },
  Function { ret: NodeId, params: SmallVec<[Param; 4]>, member: MemberStatus },
  AppleBlock { ret: NodeId, params: SmallVec<[Param; 4]>, member: MemberStatus },
  Constructor { params: SmallVec<[Param; 4]> },
  Destructor,
  Operator { ret: NodeId, params: SmallVec<[Param; 4]>, op: Operator, member: MemberStatus },
  UserDefinedConversion { to: NodeId },
  UserDefinedLiteral { ret: NodeId, params: SmallVec<[Param; 4]> },
  Lambda { captures: Vec<Capture>, params: SmallVec<[Param; 4]>, ret: Option<NodeId> },
  Capture(CaptureKind),
  StructuredBinding { names: Vec<Sname> },
  Cast { to: NodeId, kind: CastKind },
  Variadic,
}

impl NodeKind {
  /// The kind "tag" used for membership in a [`util::KindSet`].
  #[must_use] pub fn tag(&self) -> KindTag {
    match self {
      Self::Placeholder => KindTag::Placeholder,
      Self::Name => KindTag::Name,
      Self::Builtin { .. } => KindTag::Builtin,
      Self::Enum { .. } => KindTag::Enum,
      Self::Csu { .. } => KindTag::Csu,
      Self::Concept { .. } => KindTag::Concept,
      Self::Typedef { .. } => KindTag::Typedef,
      Self::Array { .. } => KindTag::Array,
      Self::Pointer { .. } => KindTag::Pointer,
      Self::PointerToMember { .. } => KindTag::PointerToMember,
      Self::Reference { .. } => KindTag::Reference,
      Self::RvalueReference { .. } => KindTag::RvalueReference,
      Self::Function { .. } => KindTag::Function,
      Self::AppleBlock { .. } => KindTag::AppleBlock,
      Self::Constructor { .. } => KindTag::Constructor,
      Self::Destructor => KindTag::Destructor,
      Self::Operator { .. } => KindTag::Operator,
      Self::UserDefinedConversion { .. } => KindTag::UserDefinedConversion,
      Self::UserDefinedLiteral { .. } => KindTag::UserDefinedLiteral,
      Self::Lambda { .. } => KindTag::Lambda,
      Self::Capture(_) => KindTag::Capture,
      Self::StructuredBinding { .. } => KindTag::StructuredBinding,
      Self::Cast { .. } => KindTag::Cast,
      Self::Variadic => KindTag::Variadic,
    }
  }
}

/// A fieldless discriminant for every [`NodeKind`] variant, used to build
/// [`util::KindSet`] bitsets (the Rust replacement for the C source's
/// `K_ANY_*` preprocessor masks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KindTag {
  Placeholder, Name, Builtin, Enum, Csu, Concept, Typedef, Array, Pointer,
  PointerToMember, Reference, RvalueReference, Function, AppleBlock,
  Constructor, Destructor, Operator, UserDefinedConversion, UserDefinedLiteral,
  Lambda, Capture, StructuredBinding, Cast, Variadic,
}

impl KindTag {
  pub const COUNT: usize = 24;
  #[must_use] pub fn bit(self) -> usize { self as usize }
}

/// One node of the AST.
#[derive(Debug)]
pub struct Node {
  id: NodeId,
  pub loc: Location,
  kind: RefCell<NodeKind>,
  pub ty: Cell<TypeId>,
  sname: RefCell<Option<Sname>>,
  pub align: Cell<Option<Alignment>>,
  parent: Cell<Option<NodeId>>,
  pub depth: u32,
  pub is_param_pack: bool,
  pub param_of: Cell<Option<NodeId>>,
}

impl Node {
  #[must_use] pub fn id(&self) -> NodeId { self.id }
  #[must_use] pub fn kind(&self) -> NodeKind { self.kind.borrow().clone() }
  pub fn set_kind(&self, k: NodeKind) { *self.kind.borrow_mut() = k; }
  #[must_use] pub fn tag(&self) -> KindTag { self.kind.borrow().tag() }
  #[must_use] pub fn parent(&self) -> Option<NodeId> { self.parent.get() }
  pub fn set_parent_id(&self, p: Option<NodeId>) { self.parent.set(p); }
  #[must_use] pub fn sname(&self) -> Option<Sname> { self.sname.borrow().clone() }
  pub fn set_sname(&self, s: Option<Sname>) { *self.sname.borrow_mut() = s; }
}

/// Owns every [`Node`] created during one command (lex -> build -> check ->
/// print); dropping the `Arena` invalidates every [`NodeId`] it handed out.
pub struct Arena<'a> {
  storage: &'a TypedArena<RefCell<Node>>,
  index: RefCell<Vec<&'a RefCell<Node>>>,
}

impl<'a> Arena<'a> {
  #[must_use] pub fn new(storage: &'a TypedArena<RefCell<Node>>) -> Self {
    Self { storage, index: RefCell::new(Vec::new()) }
  }

  /// Allocates a fresh node of `kind` at parse `depth` and `loc`.
  pub fn new_node(&self, kind: NodeKind, depth: u32, loc: Location) -> NodeId {
    let mut index = self.index.borrow_mut();
    let id = NodeId(u32::try_from(index.len()).expect("too many AST nodes"));
    let node = Node {
      id, loc, kind: RefCell::new(kind), ty: Cell::new(TypeId::default()),
      sname: RefCell::new(None), align: Cell::new(None),
      parent: Cell::new(None), depth, is_param_pack: false, param_of: Cell::new(None),
    };
    let stored = self.storage.alloc(RefCell::new(node));
    index.push(stored);
    id
  }

  #[must_use] pub fn get(&self, id: NodeId) -> &'a RefCell<Node> {
    self.index.borrow()[id.0 as usize]
  }

  #[must_use] pub fn len(&self) -> usize { self.index.borrow().len() }
  #[must_use] pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_node_and_lookup() {
    let storage = TypedArena::new();
    let arena = Arena::new(&storage);
    let id = arena.new_node(NodeKind::Placeholder, 0, Location::default());
    assert_eq!(arena.get(id).borrow().tag(), KindTag::Placeholder);
  }

  #[test]
  fn set_parent_and_kind() {
    let storage = TypedArena::new();
    let arena = Arena::new(&storage);
    let child = arena.new_node(NodeKind::Placeholder, 0, Location::default());
    let parent = arena.new_node(NodeKind::Pointer { to: child }, 0, Location::default());
    arena.get(child).borrow().set_parent_id(Some(parent));
    assert_eq!(arena.get(child).borrow().parent(), Some(parent));
  }
}
