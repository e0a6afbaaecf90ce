//! Per-kind semantic rules: one function per declaration shape, each
//! returning `Err` at the first violation it finds rather than collecting
//! a list — a single declaration is accepted or rejected as a whole, with
//! no partial recovery.

use super::state::CheckState;
use crate::ast::util::{
  has_escu_param, is_builtin_any, is_integral, is_ptr_to_kind_any, is_ptr_to_tid_any,
  is_ref_to_class_sname, is_ref_to_kind_any, is_size_t, operator_overload, unpointer, untypedef,
  KindSet,
};
use crate::ast::{Alignment, ArraySize, CastKind, KindTag, MemberStatus, NodeId, NodeKind};
use crate::error::{Error, ErrorKind};
use crate::sname::{ScopeKind, Sname};
use crate::types::operator::{Operator, Overloadability};
use crate::types::{Attribute, BaseType, LanguageSet, StorageClass};
use if_chain::if_chain;

type Arena<'a> = crate::ast::Arena<'a>;

fn kind_err(loc: crate::ast::Location, detail: impl Into<String>) -> Error {
  Error::new(loc, ErrorKind::KindConstraint { detail: detail.into() })
}

fn name_err(loc: crate::ast::Location, detail: impl Into<String>) -> Error {
  Error::new(loc, ErrorKind::NameConstraint { detail: detail.into() })
}

fn op_err(loc: crate::ast::Location, detail: impl Into<String>) -> Error {
  Error::new(loc, ErrorKind::OperatorConstraint { detail: detail.into() })
}

fn unsupported(loc: crate::ast::Location, what: impl Into<String>, legal_in: LanguageSet, active: LanguageSet) -> Error {
  Error::new(loc, ErrorKind::UnsupportedInLanguage { what: what.into(), legal_in, active })
}

/// The tag of `id`'s immediate parent, if it has one.
fn parent_tag(arena: &Arena<'_>, id: NodeId) -> Option<KindTag> {
  arena.get(id).borrow().parent().map(|p| arena.get(p).borrow().tag())
}

// ---------------------------------------------------------------- alignas

pub fn check_alignas(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let Some(align) = node.align.get() else { return Ok(()) };
  let loc = node.loc;
  let tag = node.tag();
  let ty = node.ty.get();
  drop(node);

  if tag == KindTag::Typedef {
    return Err(kind_err(loc, "a typedef name cannot itself carry an alignment"));
  }
  if !KindSet::object().contains(tag) {
    return Err(kind_err(loc, "alignas applies only to ordinary object declarations"));
  }
  if ty.storage.contains(StorageClass::REGISTER) {
    return Err(kind_err(loc, "alignas cannot combine with register"));
  }
  if tag == KindTag::Enum {
    if let NodeKind::Enum { bit_width: Some(w), .. } = arena.get(id).borrow().kind() {
      if w > 0 {
        return Err(kind_err(loc, "a bit-field cannot carry an alignment"));
      }
    }
  }
  match align {
    Alignment::Bytes(n) => {
      if n == 0 || !n.is_power_of_two() {
        return Err(kind_err(loc, "alignas byte count must be a power of two"));
      }
    }
    Alignment::Type(target) => check_alignas(arena, target, state)?,
  }
  Ok(())
}

// ------------------------------------------------------------------ array

pub fn check_array(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::Array { of, size_kind } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let ty = node.ty.get();
  drop(node);

  if ty.storage.contains(StorageClass::ATOMIC) {
    return Err(kind_err(loc, "an array cannot be declared _Atomic"));
  }
  match size_kind {
    ArraySize::None => {
      if ty.storage.intersects(StorageClass::NON_EMPTY) {
        return Err(kind_err(loc, "a qualified array must carry a dimension"));
      }
    }
    ArraySize::Int(0) => return Err(kind_err(loc, "array dimension must be greater than zero")),
    ArraySize::Int(_) => {}
    ArraySize::Named(_) | ArraySize::Star => {
      let vla_langs = LanguageSet::since(LanguageSet::C99) & !LanguageSet::since(LanguageSet::C23);
      if !vla_langs.contains_lang(state.language().set()) {
        return Err(unsupported(loc, "a variable-length array", vla_langs, state.language().set()));
      }
    }
  }

  let of_target = untypedef(arena, of);
  let of_tag = arena.get(of_target).borrow().tag();
  match of_tag {
    KindTag::Function | KindTag::AppleBlock | KindTag::Operator | KindTag::Constructor
    | KindTag::Destructor | KindTag::UserDefinedLiteral | KindTag::UserDefinedConversion | KindTag::Lambda =>
      Err(kind_err(loc, "array of function is illegal").with_hint("array of pointer to function")),
    KindTag::Reference | KindTag::RvalueReference =>
      Err(kind_err(loc, "array of reference is illegal")),
    KindTag::Builtin if arena.get(of_target).borrow().ty.get().base.contains(BaseType::VOID) =>
      Err(kind_err(loc, "array of void is illegal").with_hint("array of pointer to void")),
    _ => Ok(()),
  }
}

// --------------------------------------------------------------- builtin

fn void_is_bare_exempt(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> bool {
  if state.void_exempt {
    return true;
  }
  // A void pointee is always legal, whether reached directly (`void *p`) or
  // one step further through a cast target.
  if matches!(parent_tag(arena, id), Some(KindTag::Pointer) | Some(KindTag::Cast)) {
    return true;
  }
  let node = arena.get(id).borrow();
  if node.ty.get().storage.contains(StorageClass::EXTERN) {
    return true;
  }
  if let Some(func) = node.param_of.get() {
    if let NodeKind::Function { params, .. } | NodeKind::AppleBlock { params, .. } = arena.get(func).borrow().kind() {
      return params.len() == 1;
    }
  }
  false
}

pub fn check_builtin(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::Builtin { bitint_width } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let ty = node.ty.get();
  drop(node);

  if ty.base.is_empty() {
    let implicit_int = LanguageSet::all_c() & !LanguageSet::since(LanguageSet::C23);
    if !implicit_int.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "implicit int", implicit_int, state.language().set()));
    }
  }
  if let Some(width) = bitint_width {
    if !ty.base.contains(BaseType::BITINT) || width == 0 || width > 128 {
      return Err(kind_err(loc, "_BitInt width must be between 1 and 128"));
    }
  }
  if ty.base.contains(BaseType::SAT) && !ty.base.intersects(BaseType::ACCUM | BaseType::FRACT) {
    return Err(kind_err(loc, "_Sat requires _Accum or _Fract"));
  }
  if ty.storage.intersects(StorageClass::UPC_RELAXED | StorageClass::UPC_STRICT)
    && !ty.storage.contains(StorageClass::UPC_SHARED)
  {
    return Err(kind_err(loc, "relaxed/strict qualifiers require shared"));
  }
  if ty.storage.contains(StorageClass::INLINE) {
    let inline_objects = LanguageSet::since(LanguageSet::CPP17);
    if !inline_objects.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "an inline variable", inline_objects, state.language().set()));
    }
  }
  if ty.base.contains(BaseType::VOID) && !void_is_bare_exempt(arena, id, state) {
    return Err(kind_err(loc, "a bare void variable is illegal").with_hint("pointer to void"));
  }
  Ok(())
}

// ------------------------------------------------------------------ cast

pub fn check_cast(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::Cast { to, kind } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  drop(node);

  if !state.language().is_cpp() && !matches!(kind, CastKind::C) {
    return Err(unsupported(loc, "a new-style cast", LanguageSet::all_cpp(), state.language().set()));
  }
  let to_node = arena.get(to).borrow();
  let to_ty = to_node.ty.get();
  if to_ty.is_any_storage(!StorageClass::ANY_CV) {
    return Err(kind_err(loc, "a cast target cannot carry a storage class"));
  }
  if to_ty.base.contains(BaseType::AUTO) {
    return Err(kind_err(loc, "a cast target cannot be auto"));
  }
  drop(to_node);
  let to_target = untypedef(arena, to);
  let to_tag = arena.get(to_target).borrow().tag();
  if to_tag == KindTag::Array {
    return Err(kind_err(loc, "a cast target cannot be an array"));
  }
  if matches!(to_tag, KindTag::Function | KindTag::AppleBlock) {
    return Err(kind_err(loc, "a cast target cannot be a function").with_hint("pointer to function"));
  }
  match kind {
    CastKind::Const => {
      if !matches!(to_tag, KindTag::Pointer | KindTag::PointerToMember | KindTag::Reference | KindTag::RvalueReference) {
        return Err(kind_err(loc, "const_cast target must be a pointer or reference"));
      }
    }
    CastKind::Dynamic => {
      let csu = KindSet::of(&[KindTag::Csu]);
      if !(arena.get(to_target).borrow().tag() == KindTag::Pointer
        && untypedef_ptr_is_csu(arena, to_target)
        || is_ref_to_kind_any(arena, to, &csu))
      {
        return Err(kind_err(loc, "dynamic_cast target must be a pointer or reference to class"));
      }
    }
    CastKind::Reinterpret => {
      if matches!(to_tag, KindTag::Builtin) && arena.get(to_target).borrow().ty.get().base.contains(BaseType::VOID) {
        return Err(kind_err(loc, "reinterpret_cast target cannot be bare void"));
      }
    }
    CastKind::Static | CastKind::C => {}
  }
  Ok(())
}

fn untypedef_ptr_is_csu(arena: &Arena<'_>, ptr_id: NodeId) -> bool {
  match arena.get(ptr_id).borrow().kind() {
    NodeKind::Pointer { to } => arena.get(untypedef(arena, to)).borrow().tag() == KindTag::Csu,
    _ => false,
  }
}

// --------------------------------------------------------------- concept

pub fn check_concept(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::Concept { .. } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let ty = node.ty.get();
  let sname = node.sname();
  drop(node);

  let concepts = LanguageSet::since(LanguageSet::CPP20);
  if !concepts.contains_lang(state.language().set()) {
    return Err(unsupported(loc, "a concept", concepts, state.language().set()));
  }
  if !ty.storage.is_empty() {
    return Err(kind_err(loc, "a concept cannot carry a storage class"));
  }
  if let Some(sname) = sname {
    let scopes = sname.scopes();
    if scopes.len() > 1 && !scopes[..scopes.len() - 1].iter().all(|s| {
      matches!(s.kind, crate::sname::ScopeKind::Namespace | crate::sname::ScopeKind::InlineNamespace | crate::sname::ScopeKind::Scope)
    }) {
      return Err(name_err(loc, "a concept may only live directly in namespace scope"));
    }
  }
  Ok(())
}

// -------------------------------------------------------------- ctor_dtor

const CTOR_ALLOWED: StorageClass = StorageClass::from_bits_truncate(
  StorageClass::EXPLICIT.bits() | StorageClass::CONSTEXPR.bits() | StorageClass::CONSTEVAL.bits()
    | StorageClass::INLINE.bits() | StorageClass::DEFAULT.bits() | StorageClass::DELETE.bits()
    | StorageClass::FRIEND.bits() | StorageClass::NOEXCEPT.bits() | StorageClass::THROW.bits()
    | StorageClass::ANY_CV.bits(),
);
const DTOR_ALLOWED: StorageClass = StorageClass::from_bits_truncate(
  StorageClass::VIRTUAL.bits() | StorageClass::INLINE.bits() | StorageClass::DEFAULT.bits()
    | StorageClass::DELETE.bits() | StorageClass::NOEXCEPT.bits() | StorageClass::THROW.bits()
    | StorageClass::FINAL.bits() | StorageClass::OVERRIDE.bits(),
);

pub fn check_ctor_dtor(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let tag = node.tag();
  if !matches!(tag, KindTag::Constructor | KindTag::Destructor) {
    return Ok(());
  }
  let loc = node.loc;
  let ty = node.ty.get();
  let sname = node.sname();
  let kind = node.kind();
  drop(node);

  if !state.language().is_cpp() {
    return Err(unsupported(loc, "constructors and destructors", LanguageSet::all_cpp(), state.language().set()));
  }
  let (allowed, noun) = if tag == KindTag::Constructor { (CTOR_ALLOWED, "constructor") } else { (DTOR_ALLOWED, "destructor") };
  if ty.is_any_storage(!allowed) {
    return Err(kind_err(loc, format!("that storage class is illegal on a {noun}")));
  }
  if let Some(sname) = &sname {
    let local = sname.local_name();
    let is_dtor_name = local.starts_with('~');
    if tag == KindTag::Destructor && !is_dtor_name {
      return Err(name_err(loc, "a destructor name must begin with ~"));
    }
    if tag == KindTag::Constructor && is_dtor_name {
      return Err(name_err(loc, "a constructor name cannot begin with ~"));
    }
    if !sname.is_ctor() && !is_dtor_name {
      return Err(name_err(loc, "a constructor's name must match its enclosing class"));
    }
  }
  if tag == KindTag::Constructor && ty.storage.intersects(StorageClass::DEFAULT | StorageClass::DELETE) {
    let NodeKind::Constructor { params } = kind else { unreachable!() };
    match params.len() {
      0 => {}
      1 => {
        let shape_ok = sname.as_ref().is_some_and(|sname| {
          let class_name = Sname::new(sname.scope_name(), ScopeKind::Scope);
          is_ref_to_class_sname(arena, params[0].node, &class_name)
        });
        if !shape_ok {
          return Err(kind_err(loc, "a defaulted/deleted one-parameter constructor must be a copy constructor"));
        }
      }
      _ => return Err(kind_err(loc, "only a 0- or 1-parameter constructor may be = default or = delete")),
    }
  }
  Ok(())
}

// ------------------------------------------------------------------ enum

pub fn check_enum(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::Enum { underlying, class_tag, bit_width } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let ty = node.ty.get();
  drop(node);

  if class_tag.is_some() && !ty.storage.contains(StorageClass::TYPEDEF) {
    let scoped_enums = LanguageSet::since(LanguageSet::CPP11);
    if !scoped_enums.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "a scoped enum", scoped_enums, state.language().set()));
    }
  }
  if let Some(underlying) = underlying {
    let fixed_underlying = LanguageSet::since(LanguageSet::CPP11) | LanguageSet::since(LanguageSet::C23);
    if !fixed_underlying.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "a fixed enum underlying type", fixed_underlying, state.language().set()));
    }
    if !is_integral(arena, underlying) {
      return Err(kind_err(loc, "an enum's underlying type must be integral"));
    }
  }
  if bit_width.is_some() {
    let enum_bitfields = LanguageSet::all_c() | LanguageSet::all_cpp();
    if !enum_bitfields.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "an enum bit-field", enum_bitfields, state.language().set()));
    }
  }
  Ok(())
}

// -------------------------------------------------------------- function

fn is_plain_int(arena: &Arena<'_>, id: NodeId) -> bool {
  let target = untypedef(arena, id);
  let node = arena.get(target).borrow();
  matches!(node.kind(), NodeKind::Builtin { .. })
    && node.ty.get().base.contains(BaseType::INT)
    && !node.ty.get().base.intersects(BaseType::ANY_CHAR | BaseType::BOOL)
}

fn is_char_leaf(arena: &Arena<'_>, id: NodeId) -> bool {
  is_builtin_any(arena, id, BaseType::CHAR)
}

/// `char**` or `char*[]` (with or without `const` anywhere along the way).
fn is_argv_shape(arena: &Arena<'_>, id: NodeId) -> bool {
  let target = untypedef(arena, id);
  let inner = match arena.get(target).borrow().kind() {
    NodeKind::Pointer { to } => to,
    NodeKind::Array { of, .. } => of,
    _ => return false,
  };
  let inner_target = untypedef(arena, inner);
  match arena.get(inner_target).borrow().kind() {
    NodeKind::Pointer { to } => is_char_leaf(arena, to),
    _ => false,
  }
}

fn check_main_params(arena: &Arena<'_>, loc: crate::ast::Location, params: &[crate::ast::Param]) -> Result<(), Error> {
  match params.len() {
    0 => Ok(()),
    1 => {
      if is_builtin_any(arena, params[0].node, BaseType::VOID) {
        Ok(())
      } else {
        Err(kind_err(loc, "main() with one parameter must be void"))
      }
    }
    2 | 3 => {
      if !is_plain_int(arena, params[0].node) {
        return Err(kind_err(loc, "main()'s first parameter must be int"));
      }
      for p in &params[1..] {
        if !is_argv_shape(arena, p.node) {
          return Err(kind_err(loc, "main()'s argv parameter must be char** or char*[]"));
        }
      }
      Ok(())
    }
    _ => Err(kind_err(loc, "main() must have 0-3 parameters")),
  }
}

/// Storage bits a `this` parameter cannot coexist with on its enclosing
/// function-like node.
const THIS_INCOMPATIBLE: StorageClass = StorageClass::from_bits_truncate(
  StorageClass::VIRTUAL.bits() | StorageClass::PURE_VIRTUAL.bits() | StorageClass::STATIC.bits()
    | StorageClass::CONSTEVAL.bits() | StorageClass::CONSTEXPR.bits() | StorageClass::EXTERN.bits()
    | StorageClass::EXTERN_C.bits(),
);

/// Checks common to every function-like kind: `main`'s signature, linkage,
/// ref-qualifiers, attribute legality. `ret`/`params`/`member` are the
/// kind's own payload fields, passed in rather than re-matched so one
/// function serves `Function`, `AppleBlock`, `Operator`, and the UDL/UDC
/// variants that share the same shape. `allow_static_linkage` carves out the
/// one member exception (`operator new`/`delete`, which may be `static`).
fn check_function_common(
  arena: &Arena<'_>, id: NodeId, ret: Option<NodeId>, params: &[crate::ast::Param],
  member: MemberStatus, allow_static_linkage: bool, state: CheckState<'_>,
) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let loc = node.loc;
  let ty = node.ty.get();
  let sname = node.sname();
  drop(node);

  if ty.storage.contains(StorageClass::CONSTINIT) {
    return Err(kind_err(loc, "constinit is illegal on a function-like declaration"));
  }
  if ty.storage.contains(StorageClass::PURE_VIRTUAL) && !ty.storage.contains(StorageClass::VIRTUAL) {
    return Err(kind_err(loc, "a pure virtual function must also be virtual"));
  }
  if ty.storage.intersects(StorageClass::ANY_MEMBER_ONLY) && ty.storage.intersects(StorageClass::ANY_LINKAGE) {
    return Err(kind_err(loc, "a member-only storage class cannot combine with linkage"));
  }
  if ty.storage.intersects(StorageClass::ANY_REF_QUALIFIER) {
    let ref_qualified = LanguageSet::since(LanguageSet::CPP11);
    if !ref_qualified.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "a ref-qualified member function", ref_qualified, state.language().set()));
    }
    if member == MemberStatus::NonMember {
      return Err(kind_err(loc, "a ref-qualifier requires a member function"));
    }
    if ty.storage.intersects(StorageClass::ANY_LINKAGE) {
      return Err(kind_err(loc, "a ref-qualified function cannot carry linkage"));
    }
  }
  if ty.storage.intersects(StorageClass::ANY_MEMBER_ONLY) && member == MemberStatus::NonMember {
    return Err(kind_err(loc, "that storage class requires a member function"));
  }
  if member == MemberStatus::Member && !allow_static_linkage
    && ty.storage.intersects(StorageClass::STATIC | StorageClass::ANY_LINKAGE)
  {
    return Err(kind_err(loc, "a member function cannot be declared extern or static"));
  }
  if ty.storage.contains(StorageClass::EXTERN_C) && state.language().is_cpp() && params.iter().any(|p| {
    let t = untypedef(arena, p.node);
    arena.get(t).borrow().tag() == KindTag::Csu
  }) {
    return Err(kind_err(loc, "an extern \"C\" function cannot take a class-type parameter"));
  }
  if let Some(this_pos) = params.iter().position(|p| arena.get(p.node).borrow().ty.get().storage.contains(StorageClass::THIS)) {
    if this_pos != 0 {
      return Err(kind_err(loc, "a this parameter must be first"));
    }
    if ty.storage.intersects(THIS_INCOMPATIBLE) {
      return Err(kind_err(loc, "a this parameter cannot combine with virtual, static, consteval, constexpr, or extern"));
    }
  }
  if_chain! {
    if let Some(sname) = &sname;
    if sname.full_name() == "main";
    if sname.len() == 1;
    if !ty.storage.intersects(StorageClass::ANY_MEMBER_ONLY);
    then {
      if let Some(ret) = ret {
        if !is_integral(arena, ret) {
          return Err(kind_err(loc, "main must return int"));
        }
      }
      if ty.storage.intersects(StorageClass::STATIC | StorageClass::INLINE) {
        return Err(kind_err(loc, "main cannot be declared static or inline"));
      }
      check_main_params(arena, loc, params)?;
    }
  }
  Ok(())
}

fn check_function_params(arena: &Arena<'_>, params: &[crate::ast::Param], allow_variadic: bool, state: CheckState<'_>) -> Result<(), Error> {
  let knr_mode = state.language().set().contains(LanguageSet::KNR);

  if knr_mode {
    for param in params {
      let node = arena.get(param.node).borrow();
      let loc = node.loc;
      let tag = node.tag();
      drop(node);
      if tag == KindTag::Variadic {
        return Err(kind_err(loc, "a K&R parameter list cannot be variadic"));
      }
      if tag != KindTag::Name {
        return Err(kind_err(loc, "a K&R parameter must be name-only"));
      }
    }
    return Ok(());
  }

  if params.len() == 1 && is_builtin_any(arena, params[0].node, BaseType::VOID) {
    let node = arena.get(params[0].node).borrow();
    let loc = node.loc;
    let ty = node.ty.get();
    let named = node.sname().is_some();
    drop(node);
    if named || !ty.storage.is_empty() || !ty.attrs.is_empty() {
      return Err(kind_err(loc, "a single void parameter must be unnamed and unqualified"));
    }
    return Ok(());
  }

  let mut seen_pack = false;
  let mut seen_names: Vec<String> = Vec::new();
  for (i, param) in params.iter().enumerate() {
    let node = arena.get(param.node).borrow();
    let loc = node.loc;
    let tag = node.tag();
    let ty = node.ty.get();
    let sname = node.sname();
    drop(node);

    if tag == KindTag::Variadic {
      if !allow_variadic {
        return Err(kind_err(loc, "this function-like kind cannot be variadic"));
      }
      if i != params.len() - 1 {
        return Err(kind_err(loc, "the ellipsis parameter must be last"));
      }
      if params.len() == 1 && !state.language().is_cpp() {
        return Err(unsupported(loc, "a lone variadic parameter", LanguageSet::all_cpp(), state.language().set()));
      }
      continue;
    }
    if tag == KindTag::Name && !state.language().is_c() {
      return Err(kind_err(loc, "a name-only parameter requires K&R function definitions"));
    }
    if let Some(sname) = &sname {
      if sname.len() > 1 {
        return Err(name_err(loc, "a parameter name cannot be scoped"));
      }
      let local = sname.local_name().to_string();
      if seen_names.contains(&local) {
        return Err(name_err(loc, format!("duplicate parameter name \"{local}\"")));
      }
      seen_names.push(local);
    }
    if tag != KindTag::Array && ty.storage.intersects(StorageClass::ANY_ARRAY_QUALIFIER) {
      return Err(kind_err(loc, "only an array parameter can carry an array qualifier"));
    }
    if arena.get(param.node).borrow().is_param_pack {
      if seen_pack {
        return Err(kind_err(loc, "only one parameter pack is allowed"));
      }
      let packs = LanguageSet::since(LanguageSet::CPP11);
      if !packs.contains_lang(state.language().set()) {
        return Err(unsupported(loc, "a parameter pack", packs, state.language().set()));
      }
      seen_pack = true;
    }
  }
  Ok(())
}

fn check_function_return(arena: &Arena<'_>, ret: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let loc = arena.get(ret).borrow().loc;
  if arena.get(ret).borrow().is_param_pack {
    return Err(kind_err(loc, "a function cannot return a parameter pack"));
  }
  let ret_target = untypedef(arena, ret);
  let tag = arena.get(ret_target).borrow().tag();
  if matches!(tag, KindTag::Function | KindTag::AppleBlock) {
    return Err(kind_err(loc, "a function cannot return a function").with_hint("pointer to function"));
  }
  if tag == KindTag::Array {
    return Err(kind_err(loc, "a function cannot return an array").with_hint("pointer to array"));
  }
  if tag == KindTag::StructuredBinding {
    return Err(kind_err(loc, "a function cannot return a structured binding"));
  }
  if arena.get(ret_target).borrow().ty.get().base.contains(BaseType::AUTO) {
    let auto_return = LanguageSet::since(LanguageSet::CPP14);
    if !auto_return.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "a deduced return type", auto_return, state.language().set()));
    }
  }
  if tag == KindTag::Csu {
    let csu_return = (LanguageSet::all_c() & !LanguageSet::KNR) | LanguageSet::all_cpp() | LanguageSet::EC | LanguageSet::UPC;
    if !csu_return.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "returning a class/struct/union by value", csu_return, state.language().set()));
    }
  }
  Ok(())
}

pub fn check_function(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::Function { ret, params, member } = node.kind() else { return Ok(()) };
  drop(node);
  check_function_common(arena, id, Some(ret), &params, member, false, state)?;
  check_function_params(arena, &params, true, state)?;
  check_function_return(arena, ret, state)
}

pub fn check_apple_block(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::AppleBlock { ret, params, member } = node.kind() else { return Ok(()) };
  drop(node);
  check_function_common(arena, id, Some(ret), &params, member, false, state)?;
  check_function_params(arena, &params, true, state)?;
  check_function_return(arena, ret, state)
}

// --------------------------------------------------------------- lambda

pub fn check_lambda(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::Lambda { captures, params, ret } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let ty = node.ty.get();
  drop(node);

  let lambdas = LanguageSet::since(LanguageSet::CPP11);
  if !lambdas.contains_lang(state.language().set()) {
    return Err(unsupported(loc, "a lambda", lambdas, state.language().set()));
  }
  if captures.iter().any(|c| matches!(c.kind, crate::ast::CaptureKind::This | crate::ast::CaptureKind::StarThis)) {
    let star_this = LanguageSet::since(LanguageSet::CPP17);
    if captures.iter().any(|c| matches!(c.kind, crate::ast::CaptureKind::StarThis))
      && !star_this.contains_lang(state.language().set())
    {
      return Err(unsupported(loc, "*this capture", star_this, state.language().set()));
    }
  }
  let lambda_storage = StorageClass::CONSTEXPR | StorageClass::CONSTEVAL | StorageClass::NOEXCEPT | StorageClass::THROW;
  if ty.is_any_storage(!lambda_storage) {
    return Err(kind_err(loc, "that storage class is illegal on a lambda"));
  }
  check_function_params(arena, &params, false, state)?;
  if let Some(ret) = ret {
    check_function_return(arena, ret, state)?;
  }
  Ok(())
}

// -------------------------------------------------------------- operator

/// Storage bits `operator new`/`operator new[]`/`operator delete`/
/// `operator delete[]` may carry, beyond the ordinary function set.
const NEW_DELETE_ALLOWED: StorageClass = StorageClass::from_bits_truncate(
  StorageClass::STATIC.bits() | StorageClass::NOEXCEPT.bits() | StorageClass::THROW.bits() | StorageClass::FRIEND.bits(),
);

/// Relational operators eligible for `= default` since C++20, beyond the
/// comparison shape the compiler synthesizes from a defaulted `<=>`.
fn is_defaultable_relational(op: Operator) -> bool {
  matches!(
    op,
    Operator::Eq | Operator::Ne | Operator::Less | Operator::Le | Operator::Greater | Operator::Ge | Operator::Spaceship
  )
}

pub fn check_operator(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::Operator { ret, params, op, member } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let ty = node.ty.get();
  let sname = node.sname();
  drop(node);

  if !state.language().is_cpp() {
    return Err(unsupported(loc, "operator overloading", LanguageSet::all_cpp(), state.language().set()));
  }
  let info = op.info();
  if !info.legal_in.contains_lang(state.language().set()) {
    return Err(unsupported(loc, format!("operator{}", info.literal), info.legal_in, state.language().set()));
  }
  if info.overloadability == Overloadability::None {
    return Err(op_err(loc, format!("operator{} is not overloadable", info.literal)));
  }
  let resolved_member = operator_overload(arena, id, op, if member == MemberStatus::Unspecified { None } else { Some(member) });
  if info.overloadability == Overloadability::Member && resolved_member == MemberStatus::NonMember {
    return Err(op_err(loc, format!("operator{} must be a member", info.literal)));
  }
  if info.overloadability == Overloadability::NonMember && resolved_member == MemberStatus::Member {
    return Err(op_err(loc, format!("operator{} cannot be a member", info.literal)));
  }
  // Only operators whose member/non-member forms have overlapping explicit
  // arity (`info.is_ambiguous()`: `+`, `-`, `*`, `&`, `++`, `--`) need the
  // implicit object normalized into the count; every other operator's table
  // row already states its explicit parameter bounds directly.
  let explicit_count = params.len() + usize::from(info.is_ambiguous() && resolved_member == MemberStatus::Member);
  if explicit_count < usize::from(info.params_min) {
    return Err(op_err(loc, format!("operator{} needs at least {} parameter(s)", info.literal, info.params_min)));
  }
  if let Some(max) = info.params_max {
    if explicit_count > usize::from(max) {
      return Err(op_err(loc, format!("operator{} takes at most {} parameter(s)", info.literal, max)));
    }
  }
  if resolved_member == MemberStatus::NonMember && !has_escu_param(arena, &params) {
    return Err(op_err(loc, format!("a non-member operator{} must take a user-defined type", info.literal)));
  }
  if resolved_member == MemberStatus::Member && ty.storage.contains(StorageClass::FRIEND)
    && !sname.as_ref().is_some_and(|s| s.len() > 1)
  {
    return Err(kind_err(loc, "a member operator cannot also be declared friend unless named with a scope"));
  }
  if matches!(op, Operator::New | Operator::NewArray | Operator::Delete | Operator::DeleteArray)
    && ty.is_any_storage(!NEW_DELETE_ALLOWED)
  {
    return Err(kind_err(loc, "that storage class is illegal on operator new/delete"));
  }
  if op == Operator::Call && ty.storage.contains(StorageClass::STATIC) {
    let static_call = LanguageSet::since(LanguageSet::CPP23);
    if !static_call.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "a static operator()", static_call, state.language().set()));
    }
  }

  if ty.storage.contains(StorageClass::DEFAULT) {
    if op == Operator::Assign {
      let class_name = sname.as_ref().map(|s| Sname::new(s.scope_name(), ScopeKind::Scope));
      let ret_ok = class_name.as_ref().is_some_and(|c| is_ref_to_class_sname(arena, ret, c));
      let param_ok = params.len() == 1 && class_name.as_ref().is_some_and(|c| is_ref_to_class_sname(arena, params[0].node, c));
      if !ret_ok || !param_ok {
        return Err(kind_err(loc, "a defaulted operator= must take and return a reference to its own class"));
      }
    } else if is_defaultable_relational(op) {
      let defaulted_relational = LanguageSet::since(LanguageSet::CPP20);
      if !defaulted_relational.contains_lang(state.language().set()) {
        return Err(unsupported(loc, "a defaulted relational operator", defaulted_relational, state.language().set()));
      }
      match resolved_member {
        MemberStatus::Member | MemberStatus::Unspecified => {
          if params.len() != 1 || !ty.storage.contains(StorageClass::CONST) {
            return Err(kind_err(loc, "a defaulted member relational operator must be const and take one parameter"));
          }
        }
        MemberStatus::NonMember => {
          if params.len() != 2 || !ty.storage.contains(StorageClass::FRIEND) {
            return Err(kind_err(loc, "a defaulted non-member relational operator must be friend and take two parameters"));
          }
        }
      }
      if op == Operator::Spaceship {
        let ret_target = untypedef(arena, ret);
        let ret_tag = arena.get(ret_target).borrow().tag();
        let ret_is_auto = ret_tag == KindTag::Builtin && arena.get(ret_target).borrow().ty.get().base.contains(BaseType::AUTO);
        if !ret_is_auto && ret_tag != KindTag::Csu {
          return Err(kind_err(loc, "a defaulted operator<=> must return auto or a comparison category type"));
        }
      } else if !is_builtin_any(arena, ret, BaseType::BOOL) {
        return Err(kind_err(loc, "a defaulted relational operator must return bool"));
      }
    } else {
      return Err(kind_err(loc, "only operator= and a relational operator may be = default"));
    }
  }

  match op {
    Operator::Arrow => {
      if !is_ptr_to_kind_any(arena, ret, &KindSet::of(&[KindTag::Csu])) {
        return Err(kind_err(loc, "operator-> must return a pointer to class/struct/union"));
      }
    }
    Operator::Delete | Operator::DeleteArray => {
      if !(is_builtin_any(arena, ret, BaseType::VOID)) {
        return Err(kind_err(loc, "operator delete must return void"));
      }
      let first = params.first().map(|p| p.node);
      let shape_ok = first.is_some_and(|p| {
        is_ptr_to_tid_any(arena, p, BaseType::VOID) || is_ptr_to_kind_any(arena, p, &KindSet::of(&[KindTag::Csu]))
      });
      if !shape_ok {
        return Err(kind_err(loc, "operator delete's first parameter must be a pointer to void or to class/struct/union"));
      }
    }
    Operator::New | Operator::NewArray => {
      if !is_ptr_to_tid_any(arena, ret, BaseType::VOID) {
        return Err(kind_err(loc, "operator new must return a pointer to void"));
      }
      if !params.first().is_some_and(|p| is_size_t(arena, p.node)) {
        return Err(kind_err(loc, "operator new's first parameter must be size_t"));
      }
    }
    Operator::PlusPlus | Operator::MinusMinus => {
      let is_postfix = (resolved_member == MemberStatus::Member && params.len() == 1)
        || (resolved_member == MemberStatus::NonMember && params.len() == 2);
      if is_postfix {
        let dummy = params.last().expect("postfix shape implies a trailing dummy parameter").node;
        if !is_builtin_any(arena, dummy, BaseType::INT) {
          return Err(kind_err(loc, "the postfix ++/-- dummy parameter must be int"));
        }
      }
    }
    _ => {}
  }

  check_function_common(arena, id, Some(ret), &params, resolved_member, matches!(op, Operator::New | Operator::NewArray | Operator::Delete | Operator::DeleteArray), state)?;
  check_function_params(arena, &params, false, state)?;
  check_function_return(arena, ret, state)
}

// ----------------------------------------------------------- param_pack

pub fn check_param_pack(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  if !node.is_param_pack {
    return Ok(());
  }
  let loc = node.loc;
  let tag = node.tag();
  drop(node);
  let packs = LanguageSet::since(LanguageSet::CPP11);
  if !packs.contains_lang(state.language().set()) {
    return Err(unsupported(loc, "a parameter pack", packs, state.language().set()));
  }
  let auto_leaf = tag == KindTag::Builtin && arena.get(id).borrow().ty.get().base.contains(BaseType::AUTO);
  if !auto_leaf {
    return Err(kind_err(loc, "a parameter pack's leaf type must be auto"));
  }
  Ok(())
}

// --------------------------------------------------------------- pointer

pub fn check_pointer(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let to = match node.kind() {
    NodeKind::Pointer { to } => to,
    NodeKind::PointerToMember { to, .. } => to,
    _ => return Ok(()),
  };
  let loc = node.loc;
  let is_to_member = matches!(node.kind(), NodeKind::PointerToMember { .. });
  drop(node);

  let to_target = untypedef(arena, to);
  let to_tag = arena.get(to_target).borrow().tag();
  if matches!(to_tag, KindTag::Reference | KindTag::RvalueReference) {
    return Err(kind_err(loc, "pointer to reference is illegal"));
  }
  if is_to_member {
    if !state.language().is_cpp() {
      return Err(unsupported(loc, "pointer to member", LanguageSet::all_cpp(), state.language().set()));
    }
    if to_tag == KindTag::Builtin && arena.get(to_target).borrow().ty.get().base.contains(BaseType::VOID) {
      return Err(kind_err(loc, "pointer to member of void is illegal"));
    }
  }
  Ok(())
}

// ------------------------------------------------------------- reference

pub fn check_reference(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let (to, is_rvalue) = match node.kind() {
    NodeKind::Reference { to } => (to, false),
    NodeKind::RvalueReference { to } => (to, true),
    _ => return Ok(()),
  };
  let loc = node.loc;
  drop(node);

  if !state.language().is_cpp() {
    return Err(unsupported(loc, "a reference", LanguageSet::all_cpp(), state.language().set()));
  }
  if is_rvalue {
    let rvalue_refs = LanguageSet::since(LanguageSet::CPP11);
    if !rvalue_refs.contains_lang(state.language().set()) {
      return Err(unsupported(loc, "an rvalue reference", rvalue_refs, state.language().set()));
    }
  }
  let to_target = untypedef(arena, to);
  let to_tag = arena.get(to_target).borrow().tag();
  if matches!(to_tag, KindTag::Reference | KindTag::RvalueReference) {
    return Err(kind_err(loc, "reference to reference is illegal"));
  }
  if to_tag == KindTag::Builtin && arena.get(to_target).borrow().ty.get().base.contains(BaseType::VOID) {
    return Err(kind_err(loc, "reference to void is illegal"));
  }
  Ok(())
}

// --------------------------------------------------------------- restrict

pub fn check_restrict(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let ty = node.ty.get();
  if !ty.storage.contains(StorageClass::RESTRICT) {
    return Ok(());
  }
  let loc = node.loc;
  let tag = node.tag();
  let is_param = node.param_of.get().is_some();
  let kind = node.kind();
  drop(node);

  // Language legality for the bit itself is already enforced generically by
  // `check_type_triple`'s `legal_in()` pass; what's left here is purely
  // kind-based: which declarator shapes restrict may qualify at all.
  match tag {
    KindTag::Array => {
      if state.language().is_c() || (state.language().is_cpp() && is_param) {
        Ok(())
      } else {
        Err(kind_err(loc, "restrict on an array requires C, or a __restrict parameter in C++"))
      }
    }
    KindTag::Pointer => {
      let NodeKind::Pointer { to } = kind else { unreachable!() };
      let pointee = untypedef(arena, to);
      if KindSet::object().contains(arena.get(pointee).borrow().tag()) {
        Ok(())
      } else {
        Err(kind_err(loc, "restrict applies only to a pointer to an object type"))
      }
    }
    KindTag::Function | KindTag::Operator | KindTag::Reference | KindTag::RvalueReference | KindTag::UserDefinedConversion => Ok(()),
    KindTag::Builtin | KindTag::Csu | KindTag::Concept | KindTag::Enum | KindTag::PointerToMember =>
      Err(kind_err(loc, "restrict is illegal on this kind")),
    _ => Ok(()),
  }
}

// ----------------------------------------------------------- structured_binding

pub fn check_structured_binding(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::StructuredBinding { names } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let ty = node.ty.get();
  drop(node);

  let sb = LanguageSet::since(LanguageSet::CPP17);
  if !sb.contains_lang(state.language().set()) {
    return Err(unsupported(loc, "a structured binding", sb, state.language().set()));
  }
  if names.len() < 2 {
    return Err(kind_err(loc, "a structured binding must name at least two variables"));
  }
  if ty.storage.intersects(!(StorageClass::ANY_CV | StorageClass::STATIC | StorageClass::ANY_REF_QUALIFIER)) {
    return Err(kind_err(loc, "that storage class is illegal on a structured binding"));
  }
  let mut seen: Vec<&str> = Vec::new();
  for name in &names {
    let local = name.local_name();
    if seen.contains(&local) {
      return Err(name_err(loc, format!("duplicate structured-binding name \"{local}\"")));
    }
    seen.push(local);
  }
  Ok(())
}

// ---------------------------------------------------------- udef_conversion

pub fn check_udef_conversion(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::UserDefinedConversion { to } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let ty = node.ty.get();
  let sname = node.sname();
  drop(node);

  if !state.language().is_cpp() {
    return Err(unsupported(loc, "a user-defined conversion", LanguageSet::all_cpp(), state.language().set()));
  }
  if ty.storage.contains(StorageClass::DEFAULT) {
    return Err(kind_err(loc, "a conversion operator cannot be = default"));
  }
  if ty.is_any_storage(!(StorageClass::EXPLICIT | StorageClass::CONSTEXPR | StorageClass::CONSTEVAL
    | StorageClass::INLINE | StorageClass::VIRTUAL | StorageClass::ANY_CV | StorageClass::NOEXCEPT
    | StorageClass::THROW | StorageClass::FRIEND | StorageClass::DELETE))
  {
    return Err(kind_err(loc, "that storage class is illegal on a conversion operator"));
  }
  if ty.storage.contains(StorageClass::FRIEND) && !sname.as_ref().is_some_and(|s| s.len() > 1) {
    return Err(name_err(loc, "a friend conversion operator must be named with a scope"));
  }
  let to_target = untypedef(arena, to);
  if arena.get(to_target).borrow().tag() == KindTag::Array {
    return Err(kind_err(loc, "a conversion operator cannot convert to an array").with_hint("pointer to array"));
  }
  Ok(())
}

// ------------------------------------------------------------- udef_literal

/// `unsigned long long`, `long double`, any character type, or `const
/// char*` — the legal one-parameter raw/cooked literal-operator types.
fn is_one_param_udl_type(arena: &Arena<'_>, id: NodeId) -> bool {
  let target = untypedef(arena, id);
  let node = arena.get(target).borrow();
  let is_unsigned_long_long = matches!(node.kind(), NodeKind::Builtin { .. })
    && node.ty.get().base.contains(BaseType::UNSIGNED | BaseType::LONG_LONG);
  drop(node);
  is_builtin_any(arena, id, BaseType::ANY_CHAR)
    || is_unsigned_long_long
    || is_builtin_any(arena, id, BaseType::LONG_DOUBLE)
    || is_ptr_to_const_char(arena, id)
}

fn is_ptr_to_const_char(arena: &Arena<'_>, id: NodeId) -> bool {
  unpointer(arena, id).is_some_and(|to| {
    let target = untypedef(arena, to);
    let node = arena.get(target).borrow();
    matches!(node.kind(), NodeKind::Builtin { .. })
      && node.ty.get().base == BaseType::CHAR
      && node.ty.get().storage.contains(StorageClass::CONST)
  })
}

fn is_ptr_to_const_char_family(arena: &Arena<'_>, id: NodeId) -> bool {
  unpointer(arena, id).is_some_and(|to| {
    let target = untypedef(arena, to);
    let node = arena.get(target).borrow();
    matches!(node.kind(), NodeKind::Builtin { .. })
      && node.ty.get().base.intersects(BaseType::ANY_CHAR)
      && node.ty.get().storage.contains(StorageClass::CONST)
  })
}

pub fn check_udef_literal(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let NodeKind::UserDefinedLiteral { ret, params } = node.kind() else { return Ok(()) };
  let loc = node.loc;
  let sname = node.sname();
  drop(node);

  let udl = LanguageSet::since(LanguageSet::CPP11);
  if !udl.contains_lang(state.language().set()) {
    return Err(unsupported(loc, "a user-defined literal", udl, state.language().set()));
  }
  if let Some(sname) = &sname {
    if !sname.local_name().starts_with('_') {
      return Err(name_err(loc, "a user-defined literal suffix must begin with an underscore"));
    }
  }
  match params.len() {
    1 => {
      if !is_one_param_udl_type(arena, params[0].node) {
        return Err(op_err(loc, "a one-parameter literal operator must take a character type, unsigned long long, long double, or const char*"));
      }
    }
    2 => {
      if !is_ptr_to_const_char_family(arena, params[0].node) {
        return Err(op_err(loc, "a two-parameter literal operator's first parameter must be a pointer to a const character type"));
      }
      if !is_size_t(arena, params[1].node) {
        return Err(op_err(loc, "a two-parameter literal operator's second parameter must be size_t"));
      }
    }
    _ => return Err(op_err(loc, "a user-defined literal takes one or two parameters")),
  }
  check_function_params(arena, &params, false, state)?;
  check_function_return(arena, ret, state)
}

// ------------------------------------------------------------- type pass

/// The type-id legality check, run (in addition to the kind-specific rule
/// above) against every node's own `(base, storage, attrs)` triple.
pub fn check_type_triple(arena: &Arena<'_>, id: NodeId, state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let loc = node.loc;
  let ty = node.ty.get();
  let tag = node.tag();
  drop(node);
  let legal = ty.legal_in();
  if !legal.contains_lang(state.language().set()) {
    return Err(Error::new(loc, ErrorKind::TypeTripleIllegal {
      detail: format!("this combination of type bits is illegal in {}", state.language().set()),
    }).with_hint(legal.to_string()));
  }
  if ty.storage.contains(StorageClass::CONSTEXPR) && KindSet::returns().contains(tag) {
    if let NodeKind::Function { ret, .. } | NodeKind::Operator { ret, .. } | NodeKind::AppleBlock { ret, .. } = node_kind_of(arena, id) {
      if is_builtin_any(arena, ret, BaseType::VOID) {
        let constexpr_void = LanguageSet::since(LanguageSet::CPP14);
        if !constexpr_void.contains_lang(state.language().set()) {
          return Err(unsupported(loc, "a constexpr function returning void", constexpr_void, state.language().set()));
        }
      }
    }
  }
  if tag != KindTag::Array && ty.storage.intersects(StorageClass::NON_EMPTY) {
    return Err(kind_err(loc, "only an array can carry an array qualifier implying a dimension"));
  }
  if !state.language().is_cpp() && ty.storage.contains(StorageClass::CONSTEXPR)
    && ty.storage.intersects(StorageClass::ATOMIC | StorageClass::RESTRICT | StorageClass::VOLATILE)
  {
    return Err(kind_err(loc, "C's constexpr cannot combine with _Atomic, restrict, or volatile"));
  }
  if !KindSet::function_like().contains(tag) && ty.is_any_attr(!Attribute::ANY_OBJECT) {
    return Err(kind_err(loc, "that attribute is illegal on a non-function declaration"));
  }
  Ok(())
}

/// Re-fetches `id`'s kind payload; split out of the borrow above so the
/// `constexpr`-returning-`void` check can pattern-match without holding two
/// overlapping borrows of the same node.
fn node_kind_of(arena: &Arena<'_>, id: NodeId) -> NodeKind {
  arena.get(id).borrow().kind()
}

/// Forbids the two shapes a typedef's right-hand side (or a cast target)
/// must never be: an `auto` placeholder, or a `concept`.
pub fn check_type_rhs(arena: &Arena<'_>, id: NodeId, _state: CheckState<'_>) -> Result<(), Error> {
  let node = arena.get(id).borrow();
  let loc = node.loc;
  let tag = node.tag();
  let ty = node.ty.get();
  drop(node);
  if tag == KindTag::Concept {
    return Err(kind_err(loc, "a concept cannot be used as an ordinary type"));
  }
  if ty.base.contains(BaseType::AUTO) {
    return Err(kind_err(loc, "auto cannot be used as a typedef's aliased type"));
  }
  Ok(())
}

// ------------------------------------------------------------- list check

/// Applies the whole-list rules to a comma-separated declaration list
/// (`int x, *y, z[3];`): every leaf must resolve to a consistent base type,
/// and no two declared names may collide.
pub fn check_list(arena: &Arena<'_>, ids: &[NodeId], state: CheckState<'_>) -> Result<(), Error> {
  if ids.len() > 1 {
    if let Some(&first) = ids.first() {
      let leaf_id = crate::ast::util::leaf(arena, first);
      if arena.get(leaf_id).borrow().ty.get().base.contains(BaseType::AUTO) {
        let multi_auto = LanguageSet::since(LanguageSet::CPP11);
        if !multi_auto.contains_lang(state.language().set()) {
          let loc = arena.get(first).borrow().loc;
          return Err(unsupported(loc, "a leading auto in a multi-declarator list", multi_auto, state.language().set()));
        }
      }
    }
    if let Some(&packed) = ids.iter().find(|&&id| arena.get(id).borrow().is_param_pack) {
      let loc = arena.get(packed).borrow().loc;
      return Err(kind_err(loc, "a parameter pack cannot appear in a multi-declarator list"));
    }
  }

  let named: Vec<(String, crate::ast::Location, NodeId)> = ids.iter()
    .filter_map(|&id| {
      let node = arena.get(id).borrow();
      node.sname().map(|sname| (sname.full_name(), node.loc, id))
    })
    .collect();

  let mut seen: std::collections::HashMap<String, NodeId> = std::collections::HashMap::new();
  for (name, loc, id) in &named {
    if let Some(&prev) = seen.get(name) {
      let same_type = arena.get(*id).borrow().ty.get() == arena.get(prev).borrow().ty.get();
      if state.language().is_c() && same_type {
        continue;
      }
      let detail = if same_type {
        format!("redefinition of \"{name}\"")
      } else {
        format!("redefinition of \"{name}\" with a different type")
      };
      return Err(name_err(*loc, detail));
    }
    seen.insert(name.clone(), *id);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::{Arena as AstArena, Location};
  use crate::session::Session;
  use crate::types::{Language, TypeId};
  use crate::typedef::HashTypedefTable;
  use typed_arena::Arena as TypedArena;

  fn session(lang: LanguageSet) -> Session {
    Session::new(Language::new(lang), Box::new(HashTypedefTable::new()))
  }

  #[test]
  fn bare_void_variable_is_illegal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let id = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    let sess = session(LanguageSet::CPP17);
    let state = CheckState::new(&sess);
    assert!(check_builtin(&arena, id, state).is_err());
  }

  #[test]
  fn void_pointer_target_is_legal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let void_id = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(void_id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    let ptr_id = arena.new_node(NodeKind::Pointer { to: void_id }, 0, Location::default());
    arena.get(void_id).borrow().set_parent_id(Some(ptr_id));
    let sess = session(LanguageSet::CPP17);
    let state = CheckState::new(&sess);
    assert!(check_pointer(&arena, ptr_id, state).is_ok());
    assert!(check_builtin(&arena, void_id, state).is_ok());
  }

  #[test]
  fn bare_void_under_plain_typedef_introduction_needs_state_exemption() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let void_id = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(void_id).borrow().ty.set(TypeId::new(BaseType::VOID, StorageClass::NONE, Attribute::NONE));
    let typedef_id = arena.new_node(NodeKind::Typedef { for_: void_id }, 0, Location::default());
    arena.get(void_id).borrow().set_parent_id(Some(typedef_id));
    let sess = session(LanguageSet::CPP17);
    let plain = CheckState::new(&sess);
    assert!(check_builtin(&arena, void_id, plain).is_err());
    let exempt = plain.with_void_exempt(true);
    assert!(check_builtin(&arena, void_id, exempt).is_ok());
  }

  #[test]
  fn array_dimension_zero_is_illegal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let int_id = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    let arr_id = arena.new_node(NodeKind::Array { of: int_id, size_kind: ArraySize::Int(0) }, 0, Location::default());
    let sess = session(LanguageSet::C17);
    let state = CheckState::new(&sess);
    assert!(check_array(&arena, arr_id, state).is_err());
  }

  #[test]
  fn operator_must_mention_user_defined_type_when_non_member() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let int_a = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    let int_b = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    let ret = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    let op_id = arena.new_node(NodeKind::Operator {
      ret, params: smallvec::smallvec![crate::ast::Param { node: int_a }, crate::ast::Param { node: int_b }],
      op: crate::types::operator::Operator::Plus, member: MemberStatus::NonMember,
    }, 0, Location::default());
    let sess = session(LanguageSet::CPP17);
    let state = CheckState::new(&sess);
    assert!(check_operator(&arena, op_id, state).is_err());
  }

  #[test]
  fn spaceship_rejected_before_cpp20() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ret = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    let csu = arena.new_node(NodeKind::Csu { class_tag: Sname::new("Widget", ScopeKind::Class) }, 0, Location::default());
    let op_id = arena.new_node(NodeKind::Operator {
      ret, params: smallvec::smallvec![crate::ast::Param { node: csu }],
      op: crate::types::operator::Operator::Spaceship, member: MemberStatus::Member,
    }, 0, Location::default());
    let sess = session(LanguageSet::CPP17);
    let state = CheckState::new(&sess);
    assert!(check_operator(&arena, op_id, state).is_err());
  }

  #[test]
  fn structured_binding_requires_at_least_two_names() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let id = arena.new_node(NodeKind::StructuredBinding {
      names: vec![Sname::new("a", ScopeKind::Scope)],
    }, 0, Location::default());
    let sess = session(LanguageSet::CPP20);
    let state = CheckState::new(&sess);
    assert!(check_structured_binding(&arena, id, state).is_err());
  }

  fn int_node(arena: &AstArena<'_>) -> NodeId {
    let id = arena.new_node(NodeKind::Builtin { bitint_width: None }, 0, Location::default());
    arena.get(id).borrow().ty.set(TypeId::new(BaseType::INT, StorageClass::NONE, Attribute::NONE));
    id
  }

  #[test]
  fn constinit_on_function_is_rejected() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ret = int_node(&arena);
    let fn_id = arena.new_node(
      NodeKind::Function { ret, params: Default::default(), member: MemberStatus::NonMember },
      0, Location::default(),
    );
    let mut ty = arena.get(fn_id).borrow().ty.get();
    ty.storage |= StorageClass::CONSTINIT;
    arena.get(fn_id).borrow().ty.set(ty);
    let sess = session(LanguageSet::CPP20);
    let state = CheckState::new(&sess);
    let err = check_function_common(&arena, fn_id, Some(ret), &[], MemberStatus::NonMember, false, state).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
  }

  #[test]
  fn pure_virtual_without_virtual_is_rejected() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ret = int_node(&arena);
    let fn_id = arena.new_node(
      NodeKind::Function { ret, params: Default::default(), member: MemberStatus::Member },
      0, Location::default(),
    );
    let mut ty = arena.get(fn_id).borrow().ty.get();
    ty.storage |= StorageClass::PURE_VIRTUAL;
    arena.get(fn_id).borrow().ty.set(ty);
    let sess = session(LanguageSet::CPP20);
    let state = CheckState::new(&sess);
    let err = check_function_common(&arena, fn_id, Some(ret), &[], MemberStatus::Member, false, state).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
  }

  #[test]
  fn this_parameter_must_be_first() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ret = int_node(&arena);
    let first = int_node(&arena);
    let this_param = int_node(&arena);
    let mut this_ty = arena.get(this_param).borrow().ty.get();
    this_ty.storage |= StorageClass::THIS;
    arena.get(this_param).borrow().ty.set(this_ty);
    let params = smallvec::smallvec![crate::ast::Param { node: first }, crate::ast::Param { node: this_param }];
    let fn_id = arena.new_node(
      NodeKind::Function { ret, params: params.clone(), member: MemberStatus::Member },
      0, Location::default(),
    );
    let sess = session(LanguageSet::CPP20);
    let state = CheckState::new(&sess);
    let err = check_function_common(&arena, fn_id, Some(ret), &params, MemberStatus::Member, false, state).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::KindConstraint { .. }));
  }

  #[test]
  fn knr_mode_rejects_a_typed_parameter() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let typed_param = int_node(&arena);
    let params = [crate::ast::Param { node: typed_param }];
    let sess = session(LanguageSet::KNR);
    let state = CheckState::new(&sess);
    assert!(check_function_params(&arena, &params, false, state).is_err());
  }

  #[test]
  fn defaulted_operator_assign_must_return_and_take_own_class_reference() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let ret = int_node(&arena);
    let param = int_node(&arena);
    let op_id = arena.new_node(NodeKind::Operator {
      ret, params: smallvec::smallvec![crate::ast::Param { node: param }],
      op: Operator::Assign, member: MemberStatus::Member,
    }, 0, Location::default());
    arena.get(op_id).borrow().set_sname(Some(Sname::new("operator=", ScopeKind::Scope)));
    let mut ty = arena.get(op_id).borrow().ty.get();
    ty.storage |= StorageClass::DEFAULT;
    arena.get(op_id).borrow().ty.set(ty);
    let sess = session(LanguageSet::CPP20);
    let state = CheckState::new(&sess);
    assert!(check_operator(&arena, op_id, state).is_err());
  }

  #[test]
  fn param_pack_with_non_auto_leaf_is_rejected() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let id = int_node(&arena);
    arena.get(id).borrow_mut().is_param_pack = true;
    let sess = session(LanguageSet::CPP20);
    let state = CheckState::new(&sess);
    assert!(check_param_pack(&arena, id, state).is_err());
  }

  #[test]
  fn restrict_on_a_class_type_is_illegal() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let id = arena.new_node(NodeKind::Csu { class_tag: Sname::new("Widget", ScopeKind::Class) }, 0, Location::default());
    let mut ty = arena.get(id).borrow().ty.get();
    ty.storage |= StorageClass::RESTRICT;
    arena.get(id).borrow().ty.set(ty);
    let sess = session(LanguageSet::C17);
    let state = CheckState::new(&sess);
    assert!(check_restrict(&arena, id, state).is_err());
  }

  #[test]
  fn array_qualifier_on_a_non_array_is_rejected() {
    let storage = TypedArena::new();
    let arena = AstArena::new(&storage);
    let id = int_node(&arena);
    let mut ty = arena.get(id).borrow().ty.get();
    ty.storage |= StorageClass::ARRAY_STATIC;
    arena.get(id).borrow().ty.set(ty);
    let sess = session(LanguageSet::C99);
    let state = CheckState::new(&sess);
    assert!(check_type_triple(&arena, id, state).is_err());
  }
}
