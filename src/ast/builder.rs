//! The AST construction operators: combining declarator fragments built up
//! during parsing (arrays, pointers, functions) into one tree, in the
//! right nesting order. Getting the precedence wrong here means correct
//! declarations would parse into the wrong tree.

use super::{Arena, KindTag, Node, NodeId, NodeKind};
use crate::types::{Attribute, StorageClass};
use log::trace;

/// Returns the single "downstream declarator hole" a kind's payload
/// carries, if any: `of`/`to` for array/pointer/reference/typedef/cast
/// chains, `ret` for function-likes. Kinds with no single hole (builtins,
/// CSUs, names, bare placeholders) return `None`.
fn get_slot(arena: &Arena<'_>, id: NodeId) -> Option<NodeId> {
  match arena.get(id).borrow().kind() {
    NodeKind::Array { of, .. } => Some(of),
    NodeKind::Pointer { to } => Some(to),
    NodeKind::PointerToMember { to, .. } => Some(to),
    NodeKind::Reference { to } => Some(to),
    NodeKind::RvalueReference { to } => Some(to),
    NodeKind::Typedef { for_ } => Some(for_),
    NodeKind::Cast { to, .. } => Some(to),
    NodeKind::UserDefinedConversion { to } => Some(to),
    NodeKind::Function { ret, .. } => Some(ret),
    NodeKind::AppleBlock { ret, .. } => Some(ret),
    NodeKind::Operator { ret, .. } => Some(ret),
    NodeKind::UserDefinedLiteral { ret, .. } => Some(ret),
    NodeKind::Lambda { ret, .. } => ret,
    _ => None,
  }
}

/// Overwrites the slot identified by [`get_slot`] with `new_child`, and
/// points `new_child`'s parent at `id`. Panics if `id`'s kind has no slot.
fn set_slot(arena: &Arena<'_>, id: NodeId, new_child: NodeId) {
  let mut kind = arena.get(id).borrow().kind();
  match &mut kind {
    NodeKind::Array { of, .. } => *of = new_child,
    NodeKind::Pointer { to }
    | NodeKind::PointerToMember { to, .. }
    | NodeKind::Reference { to }
    | NodeKind::RvalueReference { to }
    | NodeKind::Cast { to, .. }
    | NodeKind::UserDefinedConversion { to } => *to = new_child,
    NodeKind::Typedef { for_ } => *for_ = new_child,
    NodeKind::Function { ret, .. }
    | NodeKind::AppleBlock { ret, .. }
    | NodeKind::Operator { ret, .. }
    | NodeKind::UserDefinedLiteral { ret, .. } => *ret = new_child,
    NodeKind::Lambda { ret, .. } => *ret = Some(new_child),
    other => panic!("{other:?} has no structural child slot"),
  }
  arena.get(id).borrow().set_kind(kind);
  arena.get(new_child).borrow().set_parent_id(Some(id));
}

/// If `old` has a parent, rewrites that parent's slot to point at `new`
/// instead and gives `new` the same parent; if `old` was a root, `new`
/// becomes parentless too.
fn reparent_in_place(arena: &Arena<'_>, old: NodeId, new: NodeId) {
  match arena.get(old).borrow().parent() {
    Some(p) => set_slot(arena, p, new),
    None => arena.get(new).borrow().set_parent_id(None),
  }
}

/// After structural placement, moves `old`'s `sname` onto `new_root` (if
/// `new_root` doesn't already have one) and ORs `old`'s storage/attribute
/// bits onto it — qualifiers that were sitting on a placeholder or a
/// displaced node belong on whichever node now occupies its position.
fn migrate_sname_and_storage(arena: &Arena<'_>, old: NodeId, new_root: NodeId) {
  let old_node = arena.get(old).borrow();
  let sname = old_node.sname();
  let old_ty = old_node.ty.get();
  drop(old_node);
  let new_node = arena.get(new_root).borrow();
  if sname.is_some() && new_node.sname().is_none() {
    new_node.set_sname(sname);
  }
  let mut new_ty = new_node.ty.get();
  new_ty.storage |= old_ty.storage;
  new_ty.attrs |= old_ty.attrs;
  new_node.ty.set(new_ty);
}

/// Appends `array_node` (whose `of` slot currently holds a placeholder)
/// into the declarator chain rooted at `host`, with `of_node` as what
/// should ultimately occupy that slot once the chain is complete. Returns
/// the new root of the combined chain.
///
/// The `pointer` case is what lets `int (*(*x)[3])[5]` mean "pointer to
/// array 3 of pointer to array 5 of int" rather than its mirror image:
/// a pointer only absorbs an appended array when the pointer sits deeper
/// (more enclosing parens) than the array being attached.
pub fn add_array(arena: &Arena<'_>, host: Option<NodeId>, array_node: NodeId, of_node: NodeId) -> NodeId {
  let Some(host) = host else {
    trace!("add_array: null host, array_node becomes root");
    return array_node;
  };
  match arena.get(host).borrow().tag() {
    KindTag::Placeholder => {
      trace!("add_array: host is a placeholder, splicing in place");
      set_slot(arena, array_node, of_node);
      reparent_in_place(arena, host, array_node);
      migrate_sname_and_storage(arena, host, array_node);
      array_node
    }
    KindTag::Array => {
      trace!("add_array: host is an array chain, appending at the deepest link");
      let mut tail = host;
      loop {
        let of = get_slot(arena, tail).expect("array node always has an `of` slot");
        if arena.get(of).borrow().tag() == KindTag::Array {
          tail = of;
        } else {
          break;
        }
      }
      set_slot(arena, tail, array_node);
      set_slot(arena, array_node, of_node);
      host
    }
    KindTag::Pointer if arena.get(host).borrow().depth > arena.get(array_node).borrow().depth => {
      trace!("add_array: pointer outranks array, recursing into pointer target");
      let to = get_slot(arena, host).expect("pointer always has a `to` slot");
      let result = add_array(arena, Some(to), array_node, of_node);
      set_slot(arena, host, result);
      host
    }
    _ => splice_by_depth(arena, host, array_node, of_node),
  }
}

/// Appends `func_node` (return-type slot currently a placeholder) into the
/// declarator chain rooted at `host`, with `ret_node` as the ultimate
/// return type. Same depth-precedence pattern as [`add_array`].
pub fn add_func(arena: &Arena<'_>, host: Option<NodeId>, func_node: NodeId, ret_node: NodeId) -> NodeId {
  let Some(host) = host else { return func_node };
  let host_tag = arena.get(host).borrow().tag();
  let host_deeper = arena.get(host).borrow().depth > arena.get(func_node).borrow().depth;
  match host_tag {
    KindTag::Array | KindTag::Pointer | KindTag::Reference | KindTag::RvalueReference if host_deeper => {
      let to = get_slot(arena, host).expect("chain node has a slot");
      let result = add_func(arena, Some(to), func_node, ret_node);
      set_slot(arena, host, result);
      host
    }
    KindTag::Placeholder => {
      set_slot(arena, func_node, ret_node);
      reparent_in_place(arena, host, func_node);
      migrate_sname_and_storage(arena, host, func_node);
      func_node
    }
    _ => splice_by_depth(arena, host, func_node, ret_node),
  }
}

/// Shared fallback for any host kind not given special-case treatment
/// above: if `host` sits deeper than `node` and has a slot of its own,
/// `node` is inserted into that slot (host stays the root); otherwise
/// `node` becomes the new root and `host` is its child.
fn splice_by_depth(arena: &Arena<'_>, host: NodeId, node: NodeId, filler: NodeId) -> NodeId {
  let host_depth = arena.get(host).borrow().depth;
  let node_depth = arena.get(node).borrow().depth;
  if host_depth > node_depth && get_slot(arena, host).is_some() {
    set_slot(arena, node, filler);
    set_slot(arena, host, node);
    return host;
  }
  set_slot(arena, node, host);
  reparent_in_place(arena, host, node);
  node
}

/// Joins a base type (e.g. `int`) with a declarator (e.g. `*x`) by
/// replacing the unique placeholder reachable from `decl` with `ty`.
/// Storage/attribute bits and an absent `sname` migrate from the
/// displaced placeholder onto the combined tree's root. Returns that
/// root: `decl` unless the placeholder it filled was `decl` itself, in
/// which case `ty` is now the root.
pub fn patch_placeholder(arena: &Arena<'_>, ty: NodeId, decl: NodeId) -> NodeId {
  let placeholder = find_unique_placeholder(arena, decl)
    .expect("declarator must contain exactly one unfilled placeholder");
  let decl_is_root = placeholder == decl;
  reparent_in_place(arena, placeholder, ty);
  let root = if decl_is_root { ty } else { decl };
  migrate_sname_and_storage(arena, placeholder, root);
  root
}

/// Finds the single reachable `Placeholder` node in the chain rooted at
/// `start`, by walking the structural slot chain. `None` if none is
/// reachable (expected once a declaration has been fully built).
fn find_unique_placeholder(arena: &Arena<'_>, start: NodeId) -> Option<NodeId> {
  let mut cur = start;
  loop {
    if arena.get(cur).borrow().tag() == KindTag::Placeholder {
      return Some(cur);
    }
    match get_slot(arena, cur) {
      Some(next) => cur = next,
      None => return None,
    }
  }
}

/// Wraps `host` in a fresh pointer node, which adopts its `sname`.
pub fn wrap_pointer(arena: &Arena<'_>, host: NodeId, loc: super::Location) -> NodeId {
  let depth = arena.get(host).borrow().depth;
  let ptr = arena.new_node(NodeKind::Pointer { to: host }, depth, loc);
  arena.get(host).borrow().set_parent_id(Some(ptr));
  let sname = arena.get(host).borrow().sname();
  arena.get(ptr).borrow().set_sname(sname);
  ptr
}

/// Appends a parameter to a function-like node's parameter list.
pub fn append_param(arena: &Arena<'_>, func: NodeId, param: NodeId) {
  let mut kind = arena.get(func).borrow().kind();
  match &mut kind {
    NodeKind::Function { params, .. }
    | NodeKind::AppleBlock { params, .. }
    | NodeKind::Constructor { params, .. }
    | NodeKind::Operator { params, .. }
    | NodeKind::UserDefinedLiteral { params, .. }
    | NodeKind::Lambda { params, .. } => params.push(super::Param { node: param }),
    other => panic!("{other:?} is not a function-like kind"),
  }
  arena.get(func).borrow().set_kind(kind);
  arena.get(param).borrow().set_parent_id(Some(func));
  arena.get(param).borrow().param_of.set(Some(func));
}

/// Appends a capture to a lambda's capture list.
pub fn append_capture(arena: &Arena<'_>, lambda: NodeId, capture: super::Capture) {
  let mut kind = arena.get(lambda).borrow().kind();
  match &mut kind {
    NodeKind::Lambda { captures, .. } => captures.push(capture),
    other => panic!("{other:?} is not a lambda"),
  }
  arena.get(lambda).borrow().set_kind(kind);
}

/// Points `child`'s parent at `parent` without touching any structural
/// slot. The narrow escape hatch for links the `of`/`to`/`ret` chain
/// doesn't cover, such as attaching an enum's underlying-type node.
pub fn set_parent(arena: &Arena<'_>, child: NodeId, parent: NodeId) {
  arena.get(child).borrow().set_parent_id(Some(parent));
}

/// Re-exported so callers building declarators don't need a second `use`
/// for the one `util` function the builder itself also relies on.
#[must_use]
pub fn take_storage(node: &Node) -> (StorageClass, Attribute) {
  super::util::take_storage(node)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::{Arena as AstArena, ArraySize, Location, MemberStatus, NodeKind};
  use typed_arena::Arena as TypedArena;

  fn placeholder(arena: &AstArena<'_>, depth: u32) -> NodeId {
    arena.new_node(NodeKind::Placeholder, depth, Location::default())
  }

  fn array(arena: &AstArena<'_>, of: NodeId, depth: u32) -> NodeId {
    arena.new_node(NodeKind::Array { of, size_kind: ArraySize::None }, depth, Location::default())
  }

  fn builtin(arena: &AstArena<'_>, depth: u32) -> NodeId {
    arena.new_node(NodeKind::Builtin { bitint_width: None }, depth, Location::default())
  }

  /// Builds `int (*(*x)[3])[5]` bottom-up and checks the resulting
  /// nesting: pointer -> array[3] -> pointer -> array[5] -> int.
  #[test]
  fn pointer_array_precedence() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);

    // Innermost `*x`, at depth 2 (two enclosing sets of parens).
    let inner_ph = placeholder(&arena, 2);
    let inner_ptr = wrap_pointer(&arena, inner_ph, Location::default());

    // `(*x)[3]`: an array at depth 1 appended onto the depth-2 pointer.
    let arr3_ph = placeholder(&arena, 1);
    let arr3 = array(&arena, arr3_ph, 1);
    let after_arr3 = add_array(&arena, Some(inner_ptr), arr3, arr3_ph);
    assert_eq!(after_arr3, inner_ptr);

    // `*(*x)[3]`: another pointer, at depth 1.
    let outer_ptr = wrap_pointer(&arena, after_arr3, Location::default());

    // Final `[5]`, at depth 0, appended onto the depth-1 outer pointer.
    let int_node = builtin(&arena, 0);
    let arr5_ph = placeholder(&arena, 0);
    let arr5 = array(&arena, arr5_ph, 0);
    let root_after_arr5 = add_array(&arena, Some(outer_ptr), arr5, int_node);
    assert_eq!(root_after_arr5, outer_ptr);

    let NodeKind::Pointer { to: t1 } = arena.get(outer_ptr).borrow().kind() else { panic!() };
    assert_eq!(t1, arr3);
    let NodeKind::Array { of: t2, .. } = arena.get(arr3).borrow().kind() else { panic!() };
    assert_eq!(t2, inner_ptr);
    let NodeKind::Pointer { to: t3 } = arena.get(inner_ptr).borrow().kind() else { panic!() };
    assert_eq!(t3, arr5);
    let NodeKind::Array { of: t4, .. } = arena.get(arr5).borrow().kind() else { panic!() };
    assert_eq!(t4, int_node);
  }

  #[test]
  fn patch_placeholder_fills_bare_declarator() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ph = placeholder(&arena, 0);
    let ptr = wrap_pointer(&arena, ph, Location::default());
    let int_node = builtin(&arena, 0);
    let root = patch_placeholder(&arena, int_node, ptr);
    assert_eq!(root, ptr);
    let NodeKind::Pointer { to } = arena.get(ptr).borrow().kind() else { panic!() };
    assert_eq!(to, int_node);
  }

  #[test]
  fn patch_placeholder_hoists_when_decl_is_the_placeholder() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ph = placeholder(&arena, 0);
    let int_node = builtin(&arena, 0);
    let root = patch_placeholder(&arena, int_node, ph);
    assert_eq!(root, int_node);
  }

  #[test]
  fn append_param_updates_param_of() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ret = builtin(&arena, 0);
    let func = arena.new_node(
      NodeKind::Function { ret, params: Default::default(), member: MemberStatus::Unspecified },
      0, Location::default(),
    );
    let param = builtin(&arena, 0);
    append_param(&arena, func, param);
    assert_eq!(arena.get(param).borrow().param_of.get(), Some(func));
  }
}
