//! End-to-end scenarios: hand-built declaration trees run through the full
//! builder + checker pipeline, the way a parser front-end would drive it.

use cdecl_core::ast::builder::{add_array, append_param, patch_placeholder, set_parent, wrap_pointer};
use cdecl_core::ast::{Arena, ArraySize, CastKind, Location, MemberStatus, NodeKind};
use cdecl_core::check::{check, check_list};
use cdecl_core::error::ErrorKind;
use cdecl_core::sname::{Sname, ScopeKind};
use cdecl_core::typedef::{DeclFlag, HashTypedefTable};
use cdecl_core::types::operator::Operator;
use cdecl_core::types::{Attribute, BaseType, Language, LanguageSet, StorageClass, TypeId};
use cdecl_core::Session;
use typed_arena::Arena as TypedArena;

fn session(lang: LanguageSet) -> Session {
  Session::new(Language::new(lang), Box::new(HashTypedefTable::new()))
}

fn builtin(arena: &Arena<'_>, ty: TypeId) -> cdecl_core::ast::NodeId {
  let id = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
  arena.get(id).borrow().ty.set(ty);
  id
}

fn placeholder(arena: &Arena<'_>, depth: u32) -> cdecl_core::ast::NodeId {
  arena.new_node(NodeKind::Placeholder, depth, Location::default())
}

fn array(arena: &Arena<'_>, of: cdecl_core::ast::NodeId, depth: u32) -> cdecl_core::ast::NodeId {
  arena.new_node(NodeKind::Array { of, size_kind: ArraySize::Int(1) }, depth, Location::default())
}

/// `int (*(*x)[3])[5]`: pointer to array 3 of pointer to array 5 of int.
/// Built the way a parser assembles depth-ordered declarator fragments,
/// then run whole through the checker.
#[test]
fn pointer_array_precedence_checks_clean() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);

  let inner_ph = placeholder(&arena, 2);
  let inner_ptr = wrap_pointer(&arena, inner_ph, Location::default());

  let arr3_ph = placeholder(&arena, 1);
  let arr3 = array(&arena, arr3_ph, 1);
  let after_arr3 = add_array(&arena, Some(inner_ptr), arr3, arr3_ph);

  let outer_ptr = wrap_pointer(&arena, after_arr3, Location::default());

  let int_node = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let arr5_ph = placeholder(&arena, 0);
  let arr5 = array(&arena, arr5_ph, 0);
  let root = add_array(&arena, Some(outer_ptr), arr5, int_node);

  let sess = session(LanguageSet::C17);
  check(&arena, root, &sess).expect("a well-formed pointer/array chain must check clean");
}

/// `typedef void V;` introduces the alias; a later `V *p;` (the pointee
/// exception) is legal, but a later bare `V v;` is not — across two
/// separate declarations sharing one arena and one typedef registry, the
/// way a REPL session would.
#[test]
fn typedef_void_pointee_exception_survives_across_declarations() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let mut sess = session(LanguageSet::CPP17);

  // `typedef void V;`
  let void_id = builtin(&arena, TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
  let typedef_decl = arena.new_node(NodeKind::Typedef { for_: void_id }, 0, Location::default());
  arena.get(void_id).borrow().set_parent_id(Some(typedef_decl));
  let mut ty = arena.get(typedef_decl).borrow().ty.get();
  ty.storage |= StorageClass::TYPEDEF;
  arena.get(typedef_decl).borrow().ty.set(ty);
  arena.get(typedef_decl).borrow().set_sname(Some(Sname::new("V", ScopeKind::Scope)));
  check(&arena, typedef_decl, &sess).expect("introducing a void typedef is legal");

  let mut scope = sess.begin_command();
  scope.add_typedef(Sname::new("V", ScopeKind::Scope), typedef_decl, DeclFlag::Typedef);
  scope.commit();

  // `V *p;`
  let v_ref_for_ptr = arena.new_node(NodeKind::Typedef { for_: typedef_decl }, 0, Location::default());
  let ptr = wrap_pointer(&arena, v_ref_for_ptr, Location::default());
  check(&arena, ptr, &sess).expect("a pointer to a void typedef is legal");

  // `V v;`
  let v_ref_bare = arena.new_node(NodeKind::Typedef { for_: typedef_decl }, 0, Location::default());
  let err = check(&arena, v_ref_bare, &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
}

/// `int main(int, char**)` is the accepted shape; `static int main()` is
/// rejected because `main` cannot carry `static`.
#[test]
fn main_signature_rules() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::C17);

  let ret = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let argc = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let char_ty = builtin(&arena, TypeId::new(BaseType::CHAR, StorageClass::NONE, Attribute::NONE));
  let argv_ptr = wrap_pointer(&arena, char_ty, Location::default());
  let argv = wrap_pointer(&arena, argv_ptr, Location::default());
  let main_fn = arena.new_node(
    NodeKind::Function { ret, params: Default::default(), member: MemberStatus::NonMember },
    0, Location::default(),
  );
  arena.get(main_fn).borrow().set_sname(Some(Sname::new("main", ScopeKind::Scope)));
  append_param(&arena, main_fn, argc);
  append_param(&arena, main_fn, argv);
  set_parent(&arena, ret, main_fn);
  check(&arena, main_fn, &sess).expect("the canonical main signature is legal");

  let bad_ret = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let bad_main = arena.new_node(
    NodeKind::Function { ret: bad_ret, params: Default::default(), member: MemberStatus::NonMember },
    0, Location::default(),
  );
  let mut ty = arena.get(bad_main).borrow().ty.get();
  ty.storage |= StorageClass::STATIC;
  arena.get(bad_main).borrow().ty.set(ty);
  arena.get(bad_main).borrow().set_sname(Some(Sname::new("main", ScopeKind::Scope)));
  set_parent(&arena, bad_ret, bad_main);
  let err = check(&arena, bad_main, &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
}

/// A function cannot return a function; the error hints the fix.
#[test]
fn function_returning_function_is_rejected_with_hint() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::C17);

  let inner_ret = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let inner_fn = arena.new_node(
    NodeKind::Function { ret: inner_ret, params: Default::default(), member: MemberStatus::Unspecified },
    0, Location::default(),
  );
  set_parent(&arena, inner_ret, inner_fn);
  let outer_fn = arena.new_node(
    NodeKind::Function { ret: inner_fn, params: Default::default(), member: MemberStatus::Unspecified },
    0, Location::default(),
  );
  set_parent(&arena, inner_fn, outer_fn);

  let err = check(&arena, outer_fn, &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
  assert_eq!(err.hint.as_deref(), Some("pointer to function"));
}

/// `operator=` must be a member; a non-member declaration is rejected.
#[test]
fn non_member_assignment_operator_is_illegal() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::CPP17);

  let ret = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let param_ty = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let op = arena.new_node(
    NodeKind::Operator {
      ret, params: Default::default(), op: Operator::Assign, member: MemberStatus::NonMember,
    },
    0, Location::default(),
  );
  set_parent(&arena, ret, op);
  append_param(&arena, op, param_ty);

  let err = check(&arena, op, &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::OperatorConstraint { .. }));
}

/// A non-member `operator+` must take at least one user-defined-type
/// parameter; two plain `int`s are rejected.
#[test]
fn non_member_operator_needs_a_user_defined_type_parameter() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::CPP17);

  let ret = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let lhs = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let rhs = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let op = arena.new_node(
    NodeKind::Operator {
      ret, params: Default::default(), op: Operator::Plus, member: MemberStatus::NonMember,
    },
    0, Location::default(),
  );
  set_parent(&arena, ret, op);
  append_param(&arena, op, lhs);
  append_param(&arena, op, rhs);

  let err = check(&arena, op, &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::OperatorConstraint { .. }));
}

/// `restrict` only qualifies a pointer; applying it to a plain `int` is
/// rejected.
#[test]
fn restrict_on_non_pointer_is_illegal() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::C99);

  let id = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::RESTRICT, Attribute::NONE));
  let err = check(&arena, id, &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
}

/// `int x, *x;` — the same name declared twice in one comma-separated list
/// is rejected by the whole-list check, independent of each declarator's
/// own shape being otherwise legal.
#[test]
fn duplicate_name_in_declaration_list_is_rejected() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::C17);

  let x1 = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  arena.get(x1).borrow().set_sname(Some(Sname::new("x", ScopeKind::Scope)));

  let x2_ph = placeholder(&arena, 0);
  arena.get(x2_ph).borrow().set_sname(Some(Sname::new("x", ScopeKind::Scope)));
  let x2 = wrap_pointer(&arena, x2_ph, Location::default());
  let int_node = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let x2 = patch_placeholder(&arena, int_node, x2);

  let err = check_list(&arena, &[x1, x2], &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::NameConstraint { .. }));
}

/// A `static_cast<T>` target can never carry a storage class.
#[test]
fn cast_target_with_storage_class_is_illegal() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::CPP17);

  let to = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::STATIC, Attribute::NONE));
  let cast = arena.new_node(NodeKind::Cast { to, kind: CastKind::Static }, 0, Location::default());
  set_parent(&arena, to, cast);

  let err = check(&arena, cast, &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
}

/// `main` taking more than three parameters is rejected, and a single
/// non-`void` parameter is rejected too.
#[test]
fn main_with_too_many_parameters_is_rejected() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::C17);

  let ret = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let main_fn = arena.new_node(
    NodeKind::Function { ret, params: Default::default(), member: MemberStatus::NonMember },
    0, Location::default(),
  );
  arena.get(main_fn).borrow().set_sname(Some(Sname::new("main", ScopeKind::Scope)));
  set_parent(&arena, ret, main_fn);
  for _ in 0..4 {
    let p = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
    append_param(&arena, main_fn, p);
  }
  let err = check(&arena, main_fn, &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
}

/// `restrict` on an array parameter is legal in C; on a plain array
/// declaration it's the same rule, not gated by being a parameter.
#[test]
fn restrict_on_array_is_legal_in_c() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::C99);

  let int_ty = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  let arr = array(&arena, int_ty, 0);
  set_parent(&arena, int_ty, arr);
  let mut arr_ty = arena.get(arr).borrow().ty.get();
  arr_ty.storage |= StorageClass::RESTRICT;
  arena.get(arr).borrow().ty.set(arr_ty);
  check(&arena, arr, &sess).expect("restrict on an array is legal in C");
}

/// `int x; int x;` (matching tentative definitions) is allowed in C, but
/// `int x; char x;` (same name, different type) is rejected even in C.
#[test]
fn c_tentative_definition_same_type_is_allowed_but_different_type_is_not() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);
  let sess = session(LanguageSet::C17);

  let x1 = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  arena.get(x1).borrow().set_sname(Some(Sname::new("x", ScopeKind::Scope)));
  let x2 = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  arena.get(x2).borrow().set_sname(Some(Sname::new("x", ScopeKind::Scope)));
  check_list(&arena, &[x1, x2], &sess).expect("two matching tentative definitions are legal in C");

  let y1 = builtin(&arena, TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
  arena.get(y1).borrow().set_sname(Some(Sname::new("y", ScopeKind::Scope)));
  let y2 = builtin(&arena, TypeId::new(BaseType::CHAR, StorageClass::NONE, Attribute::NONE));
  arena.get(y2).borrow().set_sname(Some(Sname::new("y", ScopeKind::Scope)));
  let err = check_list(&arena, &[y1, y2], &sess).unwrap_err();
  assert!(matches!(err.kind, ErrorKind::NameConstraint { .. }));
}

/// `char8_t` requires C++20; the same declaration is legal there and
/// illegal under C++17, demonstrating the type pass runs as part of the
/// full `check()` entry point, not just in its own unit tests.
#[test]
fn char8_t_is_language_gated_through_the_full_checker() {
  let storage = TypedArena::new();
  let arena = Arena::new(&storage);

  let id = builtin(&arena, TypeId::new(BaseType::CHAR8_T, StorageClass::NONE, Attribute::NONE));
  let cpp17 = session(LanguageSet::CPP17);
  assert!(check(&arena, id, &cpp17).is_err());

  let id20 = builtin(&arena, TypeId::new(BaseType::CHAR8_T, StorageClass::NONE, Attribute::NONE));
  let cpp20 = session(LanguageSet::CPP20);
  check(&arena, id20, &cpp20).expect("char8_t is legal under C++20");
}
