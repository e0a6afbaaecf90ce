//! The typedef registry: a by-name map from a declared alias to the AST it
//! names, consulted during building (to resolve a bare identifier to a
//! typedef) and mutated by successful `typedef`/`using` commands.
//!
//! The core only ever reaches this through [`TypedefTable`]; the registry
//! is an external collaborator whose storage strategy is out of scope
//! beyond the one default implementation needed to make the typedef
//! round-trip and pointee-exception scenarios testable.

use crate::ast::NodeId;
use crate::sname::Sname;
use hashbrown::HashMap;

/// Which keyword introduced a typedef record — affects how a printer would
/// later render it back (`typedef`/`using`), not its semantics here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclFlag {
  Typedef,
  Using,
}

/// A single typedef registry entry: the full scoped name, the AST it
/// aliases, and which keyword declared it.
#[derive(Debug, Clone)]
pub struct TypedefRecord {
  pub sname: Sname,
  pub ast: NodeId,
  pub decl_flag: DeclFlag,
}

/// The result of [`TypedefTable::add`]: either a genuinely new record was
/// inserted, or an equal one already existed (not an error — redeclaring
/// the same typedef the same way is allowed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
  Inserted,
  Existing,
}

/// The narrow interface the core needs from a typedef registry: add,
/// look up by bare name or full scoped name, and remove (for rolling back
/// the names a failed command inserted).
pub trait TypedefTable {
  fn add(&mut self, sname: Sname, ast: NodeId, decl_flag: DeclFlag) -> AddOutcome;
  fn find_name(&self, name: &str) -> Option<&TypedefRecord>;
  fn find_sname(&self, sname: &Sname) -> Option<&TypedefRecord>;
  fn remove(&mut self, sname: &Sname) -> Option<TypedefRecord>;
}

/// The default [`TypedefTable`] implementation: a `hashbrown` map keyed by
/// the local (innermost) name, since that's how most lookups arrive (a
/// bare identifier during parsing); `find_sname` falls back to a linear
/// scan of entries sharing that local name to disambiguate by full scope.
#[derive(Default)]
pub struct HashTypedefTable {
  by_local_name: HashMap<String, Vec<TypedefRecord>>,
}

impl HashTypedefTable {
  #[must_use] pub fn new() -> Self { Self { by_local_name: HashMap::new() } }
}

impl TypedefTable for HashTypedefTable {
  fn add(&mut self, sname: Sname, ast: NodeId, decl_flag: DeclFlag) -> AddOutcome {
    let bucket = self.by_local_name.entry(sname.local_name().to_string()).or_default();
    if let Some(existing) = bucket.iter().find(|r| r.sname == sname) {
      if existing.ast == ast { return AddOutcome::Existing; }
    }
    bucket.push(TypedefRecord { sname, ast, decl_flag });
    AddOutcome::Inserted
  }

  fn find_name(&self, name: &str) -> Option<&TypedefRecord> {
    self.by_local_name.get(name)?.first()
  }

  fn find_sname(&self, sname: &Sname) -> Option<&TypedefRecord> {
    self.by_local_name.get(sname.local_name())?.iter().find(|r| &r.sname == sname)
  }

  fn remove(&mut self, sname: &Sname) -> Option<TypedefRecord> {
    let bucket = self.by_local_name.get_mut(sname.local_name())?;
    let idx = bucket.iter().position(|r| &r.sname == sname)?;
    Some(bucket.remove(idx))
  }
}
