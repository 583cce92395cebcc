//! Registered type metadata: member tables and their lookup index.

use std::sync::Arc;

use fastreflect_core::{MemberDescriptor, RawHandle, TypeHash, TypeRef, Visibility};
use rustc_hash::FxHashMap;

/// A registered method or constructor together with its call target.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub descriptor: Arc<MemberDescriptor>,
    pub handle: RawHandle,
}

/// A registered field: read accessor plus an optional write accessor.
///
/// Both directions always have a descriptor; an immutable field is `FINAL`
/// and has no write handle.
#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub getter: Arc<MemberDescriptor>,
    pub setter: Arc<MemberDescriptor>,
    pub read: RawHandle,
    pub write: Option<RawHandle>,
}

impl FieldEntry {
    pub fn name(&self) -> &str {
        &self.getter.name
    }

    pub fn visibility(&self) -> Visibility {
        self.getter.visibility
    }

    pub fn is_mutable(&self) -> bool {
        self.write.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
enum MemberSlot {
    Method(usize),
    Constructor(usize),
    Field(usize),
}

/// Everything the registry knows about one type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub(crate) type_ref: TypeRef,
    pub(crate) visibility: Visibility,
    pub(crate) methods: Vec<MethodEntry>,
    pub(crate) constructors: Vec<MethodEntry>,
    pub(crate) fields: Vec<FieldEntry>,
    index: FxHashMap<TypeHash, MemberSlot>,
}

impl TypeInfo {
    pub(crate) fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            visibility: Visibility::Public,
            methods: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Rebuild the member index after the tables change.
    pub(crate) fn reindex(&mut self) {
        self.index.clear();
        for (i, m) in self.methods.iter().enumerate() {
            self.index.insert(m.descriptor.member_hash(), MemberSlot::Method(i));
        }
        for (i, c) in self.constructors.iter().enumerate() {
            self.index.insert(c.descriptor.member_hash(), MemberSlot::Constructor(i));
        }
        for (i, f) in self.fields.iter().enumerate() {
            self.index.insert(f.getter.member_hash(), MemberSlot::Field(i));
        }
    }

    /// Copy of this type without any member called `name`.
    pub(crate) fn without_member(&self, name: &str) -> (Self, usize) {
        let mut copy = self.clone();
        let before = copy.member_count();
        copy.methods.retain(|m| m.descriptor.name != name);
        copy.constructors.retain(|c| c.descriptor.name != name);
        copy.fields.retain(|f| f.name() != name);
        let removed = before - copy.member_count();
        copy.reindex();
        (copy, removed)
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn name(&self) -> &str {
        self.type_ref.name()
    }

    pub fn simple_name(&self) -> &str {
        self.type_ref.simple_name()
    }

    pub fn type_hash(&self) -> TypeHash {
        self.type_ref.hash()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn member_count(&self) -> usize {
        self.methods.len() + self.constructors.len() + self.fields.len()
    }

    // === Enumeration ===

    /// Public methods.
    pub fn methods(&self) -> impl Iterator<Item = &MethodEntry> {
        self.methods.iter().filter(|m| m.descriptor.visibility.is_public())
    }

    /// Every method declared on the type, whatever its visibility.
    pub fn declared_methods(&self) -> impl Iterator<Item = &MethodEntry> {
        self.methods.iter()
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodEntry> {
        self.constructors.iter().filter(|c| c.descriptor.visibility.is_public())
    }

    pub fn declared_constructors(&self) -> impl Iterator<Item = &MethodEntry> {
        self.constructors.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.iter().filter(|f| f.visibility().is_public())
    }

    pub fn declared_fields(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.iter()
    }

    // === Single lookups ===

    /// Find a public method by name and exact parameter types.
    ///
    /// Instance methods are preferred over a static method with the same shape.
    pub fn find_method(&self, name: &str, params: &[TypeRef]) -> Option<&MethodEntry> {
        self.find_declared_method(name, params)
            .filter(|m| m.descriptor.visibility.is_public())
    }

    pub fn find_declared_method(&self, name: &str, params: &[TypeRef]) -> Option<&MethodEntry> {
        self.method_by_hash(self.method_hash(name, params, false))
            .or_else(|| self.method_by_hash(self.method_hash(name, params, true)))
    }

    pub fn find_constructor(&self, params: &[TypeRef]) -> Option<&MethodEntry> {
        self.find_declared_constructor(params)
            .filter(|c| c.descriptor.visibility.is_public())
    }

    pub fn find_declared_constructor(&self, params: &[TypeRef]) -> Option<&MethodEntry> {
        let hashes: Vec<TypeHash> = params.iter().map(TypeRef::hash).collect();
        self.constructor_by_hash(TypeHash::from_constructor(self.type_hash(), &hashes))
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldEntry> {
        self.find_declared_field(name).filter(|f| f.visibility().is_public())
    }

    pub fn find_declared_field(&self, name: &str) -> Option<&FieldEntry> {
        self.field_by_hash(TypeHash::from_field(self.type_hash(), name))
    }

    // === Hash lookups ===

    pub fn method_by_hash(&self, hash: TypeHash) -> Option<&MethodEntry> {
        match self.index.get(&hash) {
            Some(MemberSlot::Method(i)) => self.methods.get(*i),
            _ => None,
        }
    }

    pub fn constructor_by_hash(&self, hash: TypeHash) -> Option<&MethodEntry> {
        match self.index.get(&hash) {
            Some(MemberSlot::Constructor(i)) => self.constructors.get(*i),
            _ => None,
        }
    }

    pub fn field_by_hash(&self, hash: TypeHash) -> Option<&FieldEntry> {
        match self.index.get(&hash) {
            Some(MemberSlot::Field(i)) => self.fields.get(*i),
            _ => None,
        }
    }

    fn method_hash(&self, name: &str, params: &[TypeRef], is_static: bool) -> TypeHash {
        let hashes: Vec<TypeHash> = params.iter().map(TypeRef::hash).collect();
        TypeHash::from_method(self.type_hash(), name, &hashes, is_static)
    }
}
