//! Path Key Builder: stable, disambiguated paths for bindings.
//!
//! Components are produced leaf to root by walking the enclosing chain and
//! joined root to leaf with `.`:
//!
//! ```text
//! package       foo.bar
//! type          foo.bar.Outer:type.Inner:type
//! method        foo.bar.Outer:type.run:java$lang$String:int
//! constructor   foo.bar.Outer/:init:int
//! field         foo.bar.Outer:type.count
//! ```

use std::path::Path;

use super::types::{NodeError, Origin, PathKey};
use crate::forest::{Binding, BindingId, BindingKind, BindingTable};

/// Suffix separating a type from a same-named field or variable.
pub const TYPE_MARKER: &str = ":type";
/// Constructor component suffix, appended to the owning type's name.
pub const CTOR_MARKER: &str = "/:init";
/// Longer chains are treated as cycles.
pub const MAX_CHAIN_DEPTH: usize = 256;

/// Computes paths against one binding table.
#[derive(Clone, Copy)]
pub struct PathKeyBuilder<'a> {
    bindings: &'a BindingTable,
}

impl<'a> PathKeyBuilder<'a> {
    pub fn new(bindings: &'a BindingTable) -> Self {
        Self { bindings }
    }

    /// Full key: path plus the binding's origin.
    pub fn key(&self, id: BindingId) -> Result<PathKey, NodeError> {
        let binding = self.binding(id)?;
        let path = self.path(id)?;
        Ok(PathKey::new(Origin::from_locator(binding.origin.as_ref()), path))
    }

    pub fn path(&self, id: BindingId) -> Result<String, NodeError> {
        let mut components: Vec<String> = Vec::new();
        let mut current = Some(id);
        let mut depth = 0;

        while let Some(cur) = current {
            depth += 1;
            if depth > MAX_CHAIN_DEPTH {
                return Err(NodeError::BrokenChain(format!(
                    "{}: enclosing chain longer than {}",
                    id, MAX_CHAIN_DEPTH
                )));
            }
            let binding = self.binding(cur)?;
            current = match binding.kind {
                BindingKind::Package => {
                    if !binding.name.is_empty() {
                        components.push(binding.name.clone());
                    }
                    None
                }
                BindingKind::Type => {
                    components.push(format!("{}{}", self.type_name(binding)?, TYPE_MARKER));
                    binding.enclosing
                }
                BindingKind::Field | BindingKind::Variable => {
                    components.push(binding.name.clone());
                    Some(required_enclosing(cur, binding)?)
                }
                BindingKind::Method => {
                    components.push(format!("{}{}", binding.name, params_suffix(&binding.params)));
                    Some(required_enclosing(cur, binding)?)
                }
                BindingKind::Constructor => {
                    let owner_id = required_enclosing(cur, binding)?;
                    let owner = self.binding(owner_id)?;
                    if owner.kind != BindingKind::Type {
                        return Err(NodeError::BrokenChain(format!(
                            "{}: constructor enclosed by a {}",
                            cur, owner.kind
                        )));
                    }
                    components.push(format!(
                        "{}{}{}",
                        self.type_name(owner)?,
                        CTOR_MARKER,
                        params_suffix(&binding.params)
                    ));
                    // The owner is already named by this component.
                    owner.enclosing
                }
            };
        }

        components.reverse();
        Ok(components.join("."))
    }

    /// Simple name of a type, synthesized for anonymous types as
    /// `anon-<file stem>-<declaration offset>`.
    pub fn type_name(&self, binding: &Binding) -> Result<String, NodeError> {
        if !binding.is_anonymous() {
            return Ok(binding.name.clone());
        }
        let site = binding
            .site
            .as_ref()
            .ok_or_else(|| NodeError::MissingDeclarationSite(binding.name.clone()))?;
        let stem = Path::new(&site.file)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(format!("anon-{}-{}", stem, site.offset))
    }

    fn binding(&self, id: BindingId) -> Result<&'a Binding, NodeError> {
        self.bindings
            .get(id)
            .ok_or_else(|| NodeError::UnknownBinding(id.to_string()))
    }
}

fn required_enclosing(id: BindingId, binding: &Binding) -> Result<BindingId, NodeError> {
    binding.enclosing.ok_or_else(|| {
        NodeError::BrokenChain(format!("{}: {} '{}' has no enclosing binding", id, binding.kind, binding.name))
    })
}

/// `:a$b$C:int` for parameter types `a.b.C`, `int`; empty without parameters.
fn params_suffix(params: &[String]) -> String {
    params
        .iter()
        .map(|p| format!(":{}", p.replace('.', "$")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::Locator;

    struct Fixture {
        table: BindingTable,
        foo: BindingId,
        bar: BindingId,
    }

    fn fixture() -> Fixture {
        let mut table = BindingTable::new();
        let foo = table.push(Binding::new(BindingKind::Package, "foo"));
        let bar = table.push(Binding::new(BindingKind::Type, "Bar").with_enclosing(foo));
        Fixture { table, foo, bar }
    }

    #[test]
    fn test_package_and_type() {
        let f = fixture();
        let b = PathKeyBuilder::new(&f.table);
        assert_eq!(b.path(f.foo).unwrap(), "foo");
        assert_eq!(b.path(f.bar).unwrap(), "foo.Bar:type");
        assert_eq!(b.key(f.bar).unwrap(), PathKey::local("foo.Bar:type"));
    }

    #[test]
    fn test_paths_are_deterministic() {
        let f = fixture();
        let mut other = BindingTable::new();
        let pkg = other.push(Binding::new(BindingKind::Package, "foo"));
        let ty = other.push(Binding::new(BindingKind::Type, "Bar").with_enclosing(pkg));

        assert_eq!(
            PathKeyBuilder::new(&f.table).key(f.bar).unwrap(),
            PathKeyBuilder::new(&other).key(ty).unwrap()
        );
    }

    #[test]
    fn test_overloads_differ_by_parameter_suffix() {
        let mut f = fixture();
        let plain = f.table.push(Binding::new(BindingKind::Method, "f").with_enclosing(f.bar));
        let with_string = f.table.push(
            Binding::new(BindingKind::Method, "f")
                .with_enclosing(f.bar)
                .with_params(["java.lang.String"]),
        );
        let b = PathKeyBuilder::new(&f.table);
        assert_eq!(b.path(plain).unwrap(), "foo.Bar:type.f");
        assert_eq!(b.path(with_string).unwrap(), "foo.Bar:type.f:java$lang$String");
    }

    #[test]
    fn test_constructor_paths() {
        let mut table = BindingTable::new();
        let pkg = table.push(Binding::new(BindingKind::Package, "foo"));
        let ty = table.push(Binding::new(BindingKind::Type, "Foo").with_enclosing(pkg));
        let no_arg = table.push(Binding::new(BindingKind::Constructor, "<init>").with_enclosing(ty));
        let one_arg = table.push(
            Binding::new(BindingKind::Constructor, "<init>")
                .with_enclosing(ty)
                .with_params(["java.lang.String"]),
        );

        let b = PathKeyBuilder::new(&table);
        let path = b.path(no_arg).unwrap();
        assert_eq!(path, "foo.Foo/:init");
        assert!(path.ends_with("Foo/:init"));
        assert_eq!(b.path(one_arg).unwrap(), "foo.Foo/:init:java$lang$String");
    }

    #[test]
    fn test_nested_members() {
        let mut f = fixture();
        let inner = f.table.push(Binding::new(BindingKind::Type, "Inner").with_enclosing(f.bar));
        let field = f.table.push(Binding::new(BindingKind::Field, "count").with_enclosing(inner));
        let run = f.table.push(
            Binding::new(BindingKind::Method, "run")
                .with_enclosing(inner)
                .with_params(["int", "java.util.List"]),
        );
        let local = f.table.push(Binding::new(BindingKind::Variable, "i").with_enclosing(run));

        let b = PathKeyBuilder::new(&f.table);
        assert_eq!(b.path(field).unwrap(), "foo.Bar:type.Inner:type.count");
        assert_eq!(b.path(local).unwrap(), "foo.Bar:type.Inner:type.run:int:java$util$List.i");
    }

    #[test]
    fn test_type_and_field_with_same_name_differ() {
        let mut f = fixture();
        let ty = f.table.push(Binding::new(BindingKind::Type, "Node").with_enclosing(f.bar));
        let field = f.table.push(Binding::new(BindingKind::Field, "Node").with_enclosing(f.bar));
        let b = PathKeyBuilder::new(&f.table);
        assert_ne!(b.path(ty).unwrap(), b.path(field).unwrap());
    }

    #[test]
    fn test_unnamed_package_contributes_nothing() {
        let mut table = BindingTable::new();
        let pkg = table.push(Binding::new(BindingKind::Package, ""));
        let ty = table.push(Binding::new(BindingKind::Type, "Main").with_enclosing(pkg));
        let top = table.push(Binding::new(BindingKind::Type, "Loose"));

        let b = PathKeyBuilder::new(&table);
        assert_eq!(b.path(ty).unwrap(), "Main:type");
        assert_eq!(b.path(top).unwrap(), "Loose:type");
    }

    #[test]
    fn test_anonymous_types() {
        let mut f = fixture();
        let anon = f.table.push(
            Binding::new(BindingKind::Type, "")
                .with_enclosing(f.bar)
                .with_site("src/foo/Bar.java", 120),
        );
        let ctor = f.table.push(Binding::new(BindingKind::Constructor, "").with_enclosing(anon));
        let no_site = f.table.push(Binding::new(BindingKind::Type, "").with_enclosing(f.bar));

        let b = PathKeyBuilder::new(&f.table);
        assert_eq!(b.path(anon).unwrap(), "foo.Bar:type.anon-Bar-120:type");
        assert_eq!(b.path(ctor).unwrap(), "foo.Bar:type.anon-Bar-120/:init");
        assert!(matches!(b.path(no_site), Err(NodeError::MissingDeclarationSite(_))));
    }

    #[test]
    fn test_broken_chains() {
        let mut table = BindingTable::new();
        let orphan = table.push(Binding::new(BindingKind::Field, "x"));
        let dangling = table.push(Binding::new(BindingKind::Method, "m").with_enclosing(BindingId(99)));
        // Two types enclosing each other.
        let a = table.push(Binding::new(BindingKind::Type, "A").with_enclosing(BindingId(3)));
        let _b = table.push(Binding::new(BindingKind::Type, "B").with_enclosing(a));
        let pkg = table.push(Binding::new(BindingKind::Package, "p"));
        let bad_ctor = table.push(Binding::new(BindingKind::Constructor, "").with_enclosing(pkg));

        let b = PathKeyBuilder::new(&table);
        assert!(matches!(b.path(orphan), Err(NodeError::BrokenChain(_))));
        assert!(matches!(b.path(dangling), Err(NodeError::UnknownBinding(_))));
        assert!(matches!(b.path(a), Err(NodeError::BrokenChain(_))));
        assert!(matches!(b.path(bad_ctor), Err(NodeError::BrokenChain(_))));
        assert!(matches!(b.path(BindingId(42)), Err(NodeError::UnknownBinding(_))));
    }

    #[test]
    fn test_external_origin_in_key() {
        let mut table = BindingTable::new();
        let loc = Locator::new("jar:file:/rt.jar!/java/lang/String.class");
        let pkg = table.push(Binding::new(BindingKind::Package, "java.lang").with_origin(loc.clone()));
        let ty = table.push(
            Binding::new(BindingKind::Type, "String")
                .with_enclosing(pkg)
                .with_origin(loc.clone()),
        );
        let key = PathKeyBuilder::new(&table).key(ty).unwrap();
        assert_eq!(key.path, "java.lang.String:type");
        assert_eq!(key.origin, Origin::External(loc));
    }
}
