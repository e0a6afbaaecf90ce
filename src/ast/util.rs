//! Pure AST utilities: visitors, `untypedef`, `unpointer`, `unreference`,
//! and the predicates the checker builds on.

use super::{Arena, KindTag, MemberStatus, Node, NodeId, NodeKind};
use crate::sname::Sname;
use crate::types::operator::{Operator, Overloadability};
use crate::types::{BaseType, StorageClass};
use bit_set::BitSet;

/// A set of [`KindTag`]s, for membership tests like "is this kind one of
/// the function-like ones".
#[derive(Debug, Clone)]
pub struct KindSet(BitSet);

impl KindSet {
  #[must_use] pub fn new() -> Self { Self(BitSet::with_capacity(KindTag::COUNT)) }

  #[must_use] pub fn of(tags: &[KindTag]) -> Self {
    let mut s = Self::new();
    for &t in tags { s.insert(t); }
    s
  }

  pub fn insert(&mut self, tag: KindTag) { self.0.insert(tag.bit()); }
  #[must_use] pub fn contains(&self, tag: KindTag) -> bool { self.0.contains(tag.bit()) }

  /// Function-like kinds whose return-kind set requires a non-null return
  /// AST once building completes.
  #[must_use] pub fn returns() -> Self {
    Self::of(&[KindTag::Function, KindTag::Operator, KindTag::AppleBlock,
      KindTag::UserDefinedLiteral, KindTag::UserDefinedConversion, KindTag::Lambda])
  }

  /// Kinds that denote an ordinary (non-function-like) object.
  #[must_use] pub fn object() -> Self {
    Self::of(&[KindTag::Builtin, KindTag::Enum, KindTag::Csu, KindTag::Pointer,
      KindTag::PointerToMember, KindTag::Reference, KindTag::RvalueReference, KindTag::Array])
  }

  /// Kinds legal as the leaf of a parameter-pack (besides `auto`, which is
  /// a `Builtin` with the `AUTO` base bit, checked separately).
  #[must_use] pub fn function_like() -> Self {
    Self::of(&[KindTag::Function, KindTag::Operator, KindTag::AppleBlock,
      KindTag::Constructor, KindTag::Destructor, KindTag::UserDefinedLiteral,
      KindTag::UserDefinedConversion, KindTag::Lambda])
  }
}

impl Default for KindSet {
  fn default() -> Self { Self::new() }
}

/// Which direction a traversal proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction { Up, Down }

/// Follows `typedef.for_` chains until a non-typedef node is reached.
/// Idempotent: `untypedef(untypedef(x)) == untypedef(x)`.
#[must_use] pub fn untypedef<'a>(arena: &Arena<'a>, id: NodeId) -> NodeId {
  let mut cur = id;
  loop {
    let next = match arena.get(cur).borrow().kind() {
      NodeKind::Typedef { for_ } => Some(for_),
      _ => None,
    };
    match next { Some(n) => cur = n, None => return cur }
  }
}

/// Like [`untypedef`] but also ORs together every cv/ref qualifier bit seen
/// along the typedef chain (the typedef itself may carry `const`/`volatile`
/// that the aliased type lacks).
#[must_use] pub fn untypedef_qual<'a>(arena: &Arena<'a>, id: NodeId) -> (NodeId, StorageClass) {
  let mut cur = id;
  let mut qual = StorageClass::NONE;
  loop {
    let node = arena.get(cur).borrow();
    qual |= node.ty.get().storage & (StorageClass::ANY_CV | StorageClass::RESTRICT);
    let next = match node.kind() { NodeKind::Typedef { for_ } => Some(for_), _ => None };
    drop(node);
    match next { Some(n) => cur = n, None => return (cur, qual) }
  }
}

/// Builds a transient copy of a typedef's target with the typedef's own
/// qualifiers/alignment projected onto it, so a check can descend into the
/// aliased type while still seeing the alias's position-specific
/// annotations. Returns a new node in the same arena; does not mutate
/// either input.
#[must_use] pub fn sub_typedef<'a>(arena: &Arena<'a>, typedef_id: NodeId) -> NodeId {
  let td = arena.get(typedef_id).borrow();
  let NodeKind::Typedef { for_ } = td.kind() else { return typedef_id };
  let target = arena.get(for_).borrow();
  let new_id = arena.new_node(target.kind(), target.depth, target.loc);
  let new_node = arena.get(new_id).borrow();
  new_node.ty.set(target.ty.get().union(td.ty.get()));
  new_node.align.set(td.align.get().or(target.align.get()));
  new_node.set_sname(target.sname().or_else(|| td.sname()));
  new_id
}

/// `untypedef`, then follow one pointer hop (the target of the pointer, not
/// the pointer itself). Returns `None` if the (untypedef'd) node isn't a
/// pointer.
#[must_use] pub fn unpointer<'a>(arena: &Arena<'a>, id: NodeId) -> Option<NodeId> {
  let target = untypedef(arena, id);
  match arena.get(target).borrow().kind() {
    NodeKind::Pointer { to } => Some(to),
    _ => None,
  }
}

/// `untypedef`, then follow reference hops to a fixed point, collapsing
/// `& &` / `&& &` to `&` per C++ reference-collapsing rules:
/// `unreference(unreference(x)) == unreference(x)`. Never synthesizes a
/// collapsed node — purely a traversal helper.
#[must_use] pub fn unreference<'a>(arena: &Arena<'a>, id: NodeId) -> NodeId {
  let mut cur = untypedef(arena, id);
  loop {
    let next = match arena.get(cur).borrow().kind() {
      NodeKind::Reference { to } | NodeKind::RvalueReference { to } => Some(untypedef(arena, to)),
      _ => None,
    };
    match next { Some(n) => cur = n, None => return cur }
  }
}

/// Like [`unreference`] but only follows rvalue-reference hops; used where
/// `&&`-collapsing specifically (not `&`) matters.
#[must_use] pub fn unrvalue_reference<'a>(arena: &Arena<'a>, id: NodeId) -> Option<NodeId> {
  let target = untypedef(arena, id);
  match arena.get(target).borrow().kind() {
    NodeKind::RvalueReference { to } => Some(to),
    _ => None,
  }
}

/// Walks the `of`/`to` chain down to the innermost node (the ultimate base
/// type at the bottom of a pointer/array/reference stack).
#[must_use] pub fn leaf<'a>(arena: &Arena<'a>, root_id: NodeId) -> NodeId {
  let mut cur = root_id;
  loop {
    let next = match arena.get(cur).borrow().kind() {
      NodeKind::Array { of, .. } => Some(of),
      NodeKind::Pointer { to } | NodeKind::PointerToMember { to, .. }
        | NodeKind::Reference { to } | NodeKind::RvalueReference { to }
        | NodeKind::Typedef { for_: to } | NodeKind::UserDefinedConversion { to }
        | NodeKind::Cast { to, .. } => Some(to),
      _ => None,
    };
    match next { Some(n) => cur = n, None => return cur }
  }
}

/// Walks `parent` links up to the tree root.
#[must_use] pub fn root<'a>(arena: &Arena<'a>, node_id: NodeId) -> NodeId {
  let mut cur = node_id;
  while let Some(p) = arena.get(cur).borrow().parent() { cur = p; }
  cur
}

/// Searches in `direction` for the first node carrying a non-empty `sname`.
#[must_use] pub fn find_name<'a>(arena: &Arena<'a>, start: NodeId, dir: Direction) -> Option<Sname> {
  match dir {
    Direction::Up => {
      let mut cur = Some(start);
      while let Some(id) = cur {
        if let Some(s) = arena.get(id).borrow().sname() { return Some(s); }
        cur = arena.get(id).borrow().parent();
      }
      None
    }
    Direction::Down => {
      let mut cur = start;
      loop {
        if let Some(s) = arena.get(cur).borrow().sname() { return Some(s); }
        match arena.get(cur).borrow().kind() {
          NodeKind::Array { of, .. } => cur = of,
          NodeKind::Pointer { to } | NodeKind::Reference { to }
            | NodeKind::RvalueReference { to } => cur = to,
          _ => return None,
        }
      }
    }
  }
}

/// Searches in `direction` for the first node whose tag is in `mask`.
#[must_use] pub fn find_kind_any<'a>(
  arena: &Arena<'a>, start: NodeId, dir: Direction, mask: &KindSet,
) -> Option<NodeId> {
  match dir {
    Direction::Up => {
      let mut cur = Some(start);
      while let Some(id) = cur {
        if mask.contains(arena.get(id).borrow().tag()) { return Some(id); }
        cur = arena.get(id).borrow().parent();
      }
      None
    }
    Direction::Down => {
      let mut cur = start;
      loop {
        if mask.contains(arena.get(cur).borrow().tag()) { return Some(cur); }
        match arena.get(cur).borrow().kind() {
          NodeKind::Array { of, .. } => cur = of,
          NodeKind::Pointer { to } | NodeKind::Reference { to }
            | NodeKind::RvalueReference { to } | NodeKind::Typedef { for_: to } => cur = to,
          _ => return None,
        }
      }
    }
  }
}

/// Searches in `direction` for the first node whose `ty.base` intersects
/// `mask`.
#[must_use] pub fn find_type_any<'a>(
  arena: &Arena<'a>, start: NodeId, dir: Direction, mask: BaseType,
) -> Option<NodeId> {
  match dir {
    Direction::Up => {
      let mut cur = Some(start);
      while let Some(id) = cur {
        if arena.get(id).borrow().ty.get().base.intersects(mask) { return Some(id); }
        cur = arena.get(id).borrow().parent();
      }
      None
    }
    Direction::Down => {
      let mut cur = start;
      loop {
        if arena.get(cur).borrow().ty.get().base.intersects(mask) { return Some(cur); }
        match arena.get(cur).borrow().kind() {
          NodeKind::Array { of, .. } => cur = of,
          NodeKind::Pointer { to } | NodeKind::Reference { to }
            | NodeKind::RvalueReference { to } | NodeKind::Typedef { for_: to } => cur = to,
          _ => return None,
        }
      }
    }
  }
}

/// Moves the storage/attribute bits off `node` into a caller-provided
/// holder, zeroing them on `node`. Used to migrate e.g. `static` from a
/// return-type builtin up to its enclosing function.
#[must_use] pub fn take_storage(node: &Node) -> (StorageClass, crate::types::Attribute) {
  let mut ty = node.ty.get();
  let (s, a) = (ty.storage, ty.attrs);
  ty.storage = StorageClass::NONE;
  ty.attrs = crate::types::Attribute::NONE;
  node.ty.set(ty);
  (s, a)
}

#[must_use] pub fn is_builtin_any<'a>(arena: &Arena<'a>, id: NodeId, mask: BaseType) -> bool {
  let target = untypedef(arena, id);
  let node = arena.get(target).borrow();
  matches!(node.kind(), NodeKind::Builtin { .. }) && node.ty.get().base.intersects(mask)
}

#[must_use] pub fn is_integral<'a>(arena: &Arena<'a>, id: NodeId) -> bool {
  is_builtin_any(arena, id,
    BaseType::INT | BaseType::ANY_INT_MODIFIER | BaseType::ANY_CHAR | BaseType::BOOL | BaseType::BITINT)
}

#[must_use] pub fn is_ptr_to_kind_any<'a>(arena: &Arena<'a>, id: NodeId, mask: &KindSet) -> bool {
  unpointer(arena, id).is_some_and(|to| mask.contains(arena.get(untypedef(arena, to)).borrow().tag()))
}

#[must_use] pub fn is_ref_to_kind_any<'a>(arena: &Arena<'a>, id: NodeId, mask: &KindSet) -> bool {
  let target = untypedef(arena, id);
  let to = match arena.get(target).borrow().kind() {
    NodeKind::Reference { to } | NodeKind::RvalueReference { to } => Some(to),
    _ => None,
  };
  to.is_some_and(|t| mask.contains(arena.get(untypedef(arena, t)).borrow().tag()))
}

#[must_use] pub fn is_ptr_to_tid_any<'a>(arena: &Arena<'a>, id: NodeId, mask: BaseType) -> bool {
  unpointer(arena, id).is_some_and(|to| arena.get(untypedef(arena, to)).borrow().ty.get().base.intersects(mask))
}

#[must_use] pub fn is_ref_to_tid_any<'a>(arena: &Arena<'a>, id: NodeId, mask: BaseType) -> bool {
  let target = untypedef(arena, id);
  let to = match arena.get(target).borrow().kind() {
    NodeKind::Reference { to } | NodeKind::RvalueReference { to } => Some(to),
    _ => None,
  };
  to.is_some_and(|t| arena.get(untypedef(arena, t)).borrow().ty.get().base.intersects(mask))
}

#[must_use] pub fn is_ref_to_class_sname<'a>(arena: &Arena<'a>, id: NodeId, sname: &Sname) -> bool {
  let target = untypedef(arena, id);
  let to = match arena.get(target).borrow().kind() {
    NodeKind::Reference { to } | NodeKind::RvalueReference { to } => Some(to),
    _ => None,
  };
  to.is_some_and(|t| {
    let t = untypedef(arena, t);
    let node = arena.get(t).borrow();
    matches!(node.kind(), NodeKind::Csu { .. }) && node.sname().as_ref() == Some(sname)
  })
}

/// `true` for the builtin unsigned integer conventionally used for sizes
/// (`size_t`), recognized here as `unsigned long` for lack of a real
/// typedef registry lookup of the platform's actual `size_t` alias —
/// callers with a live [`crate::typedef::TypedefTable`] should prefer
/// resolving the name `size_t` directly.
#[must_use] pub fn is_size_t<'a>(arena: &Arena<'a>, id: NodeId) -> bool {
  let target = untypedef(arena, id);
  let node = arena.get(target).borrow();
  matches!(node.kind(), NodeKind::Builtin { .. })
    && node.ty.get().base.contains(BaseType::INT | BaseType::UNSIGNED | BaseType::LONG)
}

#[must_use] pub fn is_register<'a>(arena: &Arena<'a>, id: NodeId) -> bool {
  arena.get(id).borrow().ty.get().storage.contains(StorageClass::REGISTER)
}

/// `true` if `params` contains at least one enum/class/struct/union
/// parameter, or a reference thereto (used by the non-member-operator
/// "must mention a user-defined type" rule).
#[must_use] pub fn has_escu_param<'a>(arena: &Arena<'a>, params: &[super::Param]) -> bool {
  let escu = KindSet::of(&[KindTag::Enum, KindTag::Csu]);
  params.iter().any(|p| {
    let t = untypedef(arena, p.node);
    escu.contains(arena.get(t).borrow().tag()) || is_ref_to_kind_any(arena, p.node, &escu)
  })
}

/// Resolves the member/non-member status of an operator AST: an explicit
/// user tag first, then member-only storage qualifiers, then the
/// operator's declared overloadability, then operator-specific special
/// cases by arity.
#[must_use] pub fn operator_overload<'a>(
  arena: &Arena<'a>, id: NodeId, op: Operator, explicit: Option<MemberStatus>,
) -> MemberStatus {
  let info = op.info();
  if let Some(tag) = explicit {
    return tag;
  }
  let node = arena.get(id).borrow();
  if node.ty.get().storage.intersects(StorageClass::ANY_MEMBER_ONLY) {
    return MemberStatus::Member;
  }
  match info.overloadability {
    Overloadability::Member => MemberStatus::Member,
    Overloadability::NonMember => MemberStatus::NonMember,
    Overloadability::None => MemberStatus::Unspecified,
    Overloadability::Either => {
      let params = match node.kind() {
        NodeKind::Operator { params, .. } => params,
        _ => return MemberStatus::Unspecified,
      };
      match op {
        Operator::New | Operator::NewArray | Operator::Delete | Operator::DeleteArray => {
          if node.sname().is_some() || node.ty.get().storage.contains(StorageClass::STATIC) {
            MemberStatus::Member
          } else {
            MemberStatus::NonMember
          }
        }
        Operator::PlusPlus | Operator::MinusMinus => match params.len() {
          0 => MemberStatus::Member,
          1 => MemberStatus::Member,
          2 => MemberStatus::NonMember,
          _ => MemberStatus::Unspecified,
        },
        _ => MemberStatus::Unspecified,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::{Arena as AstArena, Location, NodeKind};
  use typed_arena::Arena as TypedArena;

  #[test]
  fn untypedef_is_idempotent() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let builtin = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    let td = arena.new_node(NodeKind::Typedef { for_: builtin }, 0, Location::default());
    let once = untypedef(&arena, td);
    let twice = untypedef(&arena, once);
    assert_eq!(once, builtin);
    assert_eq!(once, twice);
  }

  #[test]
  fn reference_collapsing_fixed_point() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let builtin = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    let r1 = arena.new_node(NodeKind::Reference { to: builtin }, 0, Location::default());
    let r2 = arena.new_node(NodeKind::RvalueReference { to: r1 }, 0, Location::default());
    let once = unreference(&arena, r2);
    let twice = unreference(&arena, once);
    assert_eq!(once, builtin);
    assert_eq!(once, twice);
  }

  #[test]
  fn pointer_to_member_inferred() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ret = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    let op = arena.new_node(NodeKind::Operator {
      ret, params: Default::default(), op: Operator::PlusPlus, member: MemberStatus::Unspecified,
    }, 0, Location::default());
    let status = operator_overload(&arena, op, Operator::PlusPlus, None);
    assert_eq!(status, MemberStatus::Member);
  }
}
