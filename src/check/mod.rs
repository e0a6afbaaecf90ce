//! Orchestrates the two checker passes: walks a declaration tree, running
//! the generic type-triple pass plus each node's kind-specific rule
//! ([`rules`]), then recurses into its structural children.
//!
//! A `typedef`'s `for_` edge is the one place the tree has no reliable
//! parent link back to the node that's actually being checked (the same
//! aliased AST is shared by the declaration that introduces the alias and
//! every later reference to it) — see [`state::CheckState`]. Every other
//! edge (`Pointer::to`, `Array::of`, a function's `ret`/`params`, ...) is a
//! real structural parent, so descending into it needs no extra state.

pub mod rules;
pub mod state;

use crate::ast::util::untypedef;
use crate::ast::{Arena, KindTag, NodeId, NodeKind};
use crate::error::Error;
use crate::session::Session;
use crate::types::StorageClass;
use state::CheckState;

/// Checks one declaration tree rooted at `root` against `session`'s active
/// language and typedef registry.
pub fn check(arena: &Arena<'_>, root: NodeId, session: &Session) -> Result<(), Error> {
  check_node(arena, root, CheckState::new(session))
}

/// Checks a comma-separated declaration list (`int x, *y, z[3];`): the
/// whole-list rules first (no two names colliding), then each declaration
/// on its own.
pub fn check_list(arena: &Arena<'_>, ids: &[NodeId], session: &Session) -> Result<(), Error> {
  let state = CheckState::new(session);
  rules::check_list(arena, ids, state)?;
  for &id in ids {
    check_node(arena, id, state)?;
  }
  Ok(())
}

/// Checks a bare type expression with no declared name of its own — a cast
/// target evaluated standalone, or the `type` form of the `explain`
/// command.
pub fn check_type(arena: &Arena<'_>, id: NodeId, session: &Session) -> Result<(), Error> {
  check_node(arena, id, CheckState::new(session))
}

fn check_node(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  rules::check_type_triple(arena, id, state)?;
  rules::check_alignas(arena, id, state)?;
  rules::check_param_pack(arena, id, state)?;
  rules::check_restrict(arena, id, state)?;

  let kind = arena.get(id).borrow().kind();
  match &kind {
    NodeKind::Builtin { .. } => rules::check_builtin(arena, id, state)?,
    NodeKind::Enum { .. } => rules::check_enum(arena, id, state)?,
    NodeKind::Concept { .. } => rules::check_concept(arena, id, state)?,
    NodeKind::Array { .. } => rules::check_array(arena, id, state)?,
    NodeKind::Pointer { .. } | NodeKind::PointerToMember { .. } => rules::check_pointer(arena, id, state)?,
    NodeKind::Reference { .. } | NodeKind::RvalueReference { .. } => rules::check_reference(arena, id, state)?,
    NodeKind::Function { .. } => rules::check_function(arena, id, state)?,
    NodeKind::AppleBlock { .. } => rules::check_apple_block(arena, id, state)?,
    NodeKind::Constructor { .. } | NodeKind::Destructor => rules::check_ctor_dtor(arena, id, state)?,
    NodeKind::Operator { .. } => rules::check_operator(arena, id, state)?,
    NodeKind::UserDefinedConversion { .. } => rules::check_udef_conversion(arena, id, state)?,
    NodeKind::UserDefinedLiteral { .. } => rules::check_udef_literal(arena, id, state)?,
    NodeKind::Lambda { .. } => rules::check_lambda(arena, id, state)?,
    NodeKind::StructuredBinding { .. } => rules::check_structured_binding(arena, id, state)?,
    NodeKind::Cast { .. } => rules::check_cast(arena, id, state)?,
    NodeKind::Placeholder | NodeKind::Name | NodeKind::Csu { .. } | NodeKind::Typedef { .. }
      | NodeKind::Capture(_) | NodeKind::Variadic => {}
  }

  recurse(arena, id, &kind, state)
}

/// Descends into `id`'s structural children, deriving each child's
/// [`CheckState`].
fn recurse(arena: &Arena<'_>, id: NodeId, kind: &NodeKind, state: CheckState<'_>) -> Result<(), Error> {
  let plain = state.with_void_exempt(false);
  match kind {
    NodeKind::Placeholder | NodeKind::Name | NodeKind::Builtin { .. } | NodeKind::Csu { .. }
      | NodeKind::Concept { .. } | NodeKind::Destructor | NodeKind::Capture(_) | NodeKind::Variadic => Ok(()),

    NodeKind::Enum { underlying, .. } => {
      if let Some(u) = underlying { check_node(arena, *u, plain)?; }
      Ok(())
    }

    // The one edge without a reliable parent link: derive the exemption
    // from this node's own position before jumping straight to the
    // ultimate aliased kind, so an intermediate typedef's own introducing
    // bit never leaks into an unrelated later reference to it.
    NodeKind::Typedef { for_ } => {
      let introduces = arena.get(id).borrow().ty.get().storage.contains(StorageClass::TYPEDEF);
      let pointed_to = arena.get(id).borrow().parent().is_some_and(|p| {
        matches!(arena.get(p).borrow().tag(), KindTag::Pointer | KindTag::PointerToMember)
      });
      let target = untypedef(arena, *for_);
      rules::check_type_rhs(arena, target, state)?;
      check_node(arena, target, state.with_void_exempt(introduces || pointed_to))
    }

    NodeKind::Array { of, .. } => check_node(arena, *of, plain),
    NodeKind::Pointer { to } | NodeKind::PointerToMember { to, .. } => check_node(arena, *to, plain),
    NodeKind::Reference { to } | NodeKind::RvalueReference { to } => check_node(arena, *to, plain),

    NodeKind::Function { ret, params, .. } | NodeKind::AppleBlock { ret, params, .. } => {
      // `void f();` ("returns nothing") is the ordinary legal shape.
      check_node(arena, *ret, state.with_void_exempt(true))?;
      recurse_params(arena, params, plain)
    }
    NodeKind::Constructor { params } => recurse_params(arena, params, plain),
    NodeKind::Operator { ret, params, .. } => {
      check_node(arena, *ret, state.with_void_exempt(true))?;
      recurse_params(arena, params, plain)
    }
    NodeKind::UserDefinedConversion { to } => check_node(arena, *to, plain),
    NodeKind::UserDefinedLiteral { ret, params } => {
      check_node(arena, *ret, state.with_void_exempt(true))?;
      recurse_params(arena, params, plain)
    }
    NodeKind::Lambda { params, ret, .. } => {
      if let Some(ret) = ret { check_node(arena, *ret, state.with_void_exempt(true))?; }
      recurse_params(arena, params, plain)
    }
    NodeKind::StructuredBinding { .. } => Ok(()),
    NodeKind::Cast { to, .. } => {
      rules::check_type_rhs(arena, *to, plain)?;
      check_node(arena, *to, plain)
    }
  }
}

fn recurse_params(arena: &Arena<'_>, params: &[crate::ast::Param], state: CheckState<'_>) -> Result<(), Error> {
  for p in params {
    check_node(arena, p.node, state)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::{Arena as AstArena, Location, NodeKind as NK};
  use crate::sname::{Sname, ScopeKind};
  use crate::typedef::HashTypedefTable;
  use crate::types::{Attribute, BaseType, Language, LanguageSet, TypeId};
  use typed_arena::Arena as TypedArena;

  fn session(lang: LanguageSet) -> Session {
    Session::new(Language::new(lang), Box::new(HashTypedefTable::new()))
  }

  #[test]
  fn typedef_introduction_of_void_is_legal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let void_id = arena.new_node(NK::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(void_id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    let typedef_id = arena.new_node(NK::Typedef { for_: void_id }, 0, Location::default());
    arena.get(void_id).borrow().set_parent_id(Some(typedef_id));
    arena.get(typedef_id).borrow().ty.set(TypeId::new(BaseType::NONE, StorageClass::TYPEDEF, Attribute::NONE));
    arena.get(typedef_id).borrow().set_sname(Some(Sname::new("V", ScopeKind::Scope)));

    let sess = session(LanguageSet::C17);
    assert!(check(&arena, typedef_id, &sess).is_ok());
  }

  #[test]
  fn bare_reference_to_a_void_typedef_is_illegal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let void_id = arena.new_node(NK::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(void_id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    let introduces_id = arena.new_node(NK::Typedef { for_: void_id }, 0, Location::default());
    arena.get(void_id).borrow().set_parent_id(Some(introduces_id));
    arena.get(introduces_id).borrow().ty.set(TypeId::new(BaseType::NONE, StorageClass::TYPEDEF, Attribute::NONE));
    arena.get(introduces_id).borrow().set_sname(Some(Sname::new("V", ScopeKind::Scope)));

    // `V v;`: a fresh reference node, carrying no `typedef` bit of its own,
    // pointing at the same introducing node.
    let reference_id = arena.new_node(NK::Typedef { for_: introduces_id }, 0, Location::default());
    arena.get(reference_id).borrow().set_sname(Some(Sname::new("v", ScopeKind::Scope)));

    let sess = session(LanguageSet::C17);
    assert!(check(&arena, reference_id, &sess).is_err());
  }

  #[test]
  fn pointer_to_a_void_typedef_is_legal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let void_id = arena.new_node(NK::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(void_id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    let introduces_id = arena.new_node(NK::Typedef { for_: void_id }, 0, Location::default());
    arena.get(void_id).borrow().set_parent_id(Some(introduces_id));
    arena.get(introduces_id).borrow().ty.set(TypeId::new(BaseType::NONE, StorageClass::TYPEDEF, Attribute::NONE));
    arena.get(introduces_id).borrow().set_sname(Some(Sname::new("V", ScopeKind::Scope)));

    // `V *p;`: the reference node's parent really is the pointer.
    let reference_id = arena.new_node(NK::Typedef { for_: introduces_id }, 0, Location::default());
    let ptr_id = arena.new_node(NK::Pointer { to: reference_id }, 0, Location::default());
    arena.get(reference_id).borrow().set_parent_id(Some(ptr_id));
    arena.get(ptr_id).borrow().set_sname(Some(Sname::new("p", ScopeKind::Scope)));

    let sess = session(LanguageSet::C17);
    assert!(check(&arena, ptr_id, &sess).is_ok());
  }

  #[test]
  fn plain_pointer_to_void_is_legal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let void_id = arena.new_node(NK::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(void_id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    let ptr_id = arena.new_node(NK::Pointer { to: void_id }, 0, Location::default());
    arena.get(void_id).borrow().set_parent_id(Some(ptr_id));
    arena.get(ptr_id).borrow().set_sname(Some(Sname::new("p", ScopeKind::Scope)));

    let sess = session(LanguageSet::C17);
    assert!(check(&arena, ptr_id, &sess).is_ok());
  }

  #[test]
  fn function_returning_void_is_legal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let void_id = arena.new_node(NK::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(void_id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    let fn_id = arena.new_node(
      NK::Function { ret: void_id, params: Default::default(), member: crate::ast::MemberStatus::Unspecified },
      0, Location::default(),
    );
    arena.get(void_id).borrow().set_parent_id(Some(fn_id));
    arena.get(fn_id).borrow().set_sname(Some(Sname::new("f", ScopeKind::Scope)));

    let sess = session(LanguageSet::C17);
    assert!(check(&arena, fn_id, &sess).is_ok());
  }

  #[test]
  fn bare_void_variable_is_illegal_through_check() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let void_id = arena.new_node(NK::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(void_id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    arena.get(void_id).borrow().set_sname(Some(Sname::new("v", ScopeKind::Scope)));

    let sess = session(LanguageSet::C17);
    assert!(check(&arena, void_id, &sess).is_err());
  }
}
