//! Type facade.

use std::fmt;
use std::sync::Arc;

use fastreflect_core::{LookupError, MemberDescriptor, NativeType, ReflectError, TypeRef, Visibility};
use fastreflect_host::{FieldEntry, TypeInfo};

use crate::lazy::{Lazy, LazyConstructor, LazyField, LazyMethod};
use crate::thunk::{FastConstructor, FastField, FastMethod, FieldGetter, FieldSetter};
use crate::Scope;

/// Entry point for resolving the members of one registered type.
///
/// Singular `get_*` operations resolve eagerly and return a ready facade.
/// Plural operations enumerate every matching member and wrap each one in a
/// [`Lazy`], so members that are never used are never synthesized. The
/// non-`declared` forms only see public members; the `declared` forms see
/// all of them.
///
/// ```ignore
/// let class = FastClass::of::<String>()?;
/// let starts_with = class.get_method("starts_with", &[TypeRef::of::<String>()])?;
/// let yes = starts_with.invoke(Some(&Value::from("abc")), &[Value::from("a")])?;
/// ```
#[derive(Clone)]
pub struct FastClass {
    info: Arc<TypeInfo>,
    scope: Scope,
    suppress_access_checks: bool,
}

impl FastClass {
    /// Facade for `T` in the global scope.
    pub fn of<T: NativeType>() -> Result<Self, LookupError> {
        Self::in_scope::<T>(&Scope::global())
    }

    /// Facade for `T` in `scope`.
    pub fn in_scope<T: NativeType>(scope: &Scope) -> Result<Self, LookupError> {
        Self::for_type(scope, T::NAME)
    }

    /// Facade for the type registered as `name` in `scope`'s registry.
    pub fn for_type(scope: &Scope, name: &str) -> Result<Self, LookupError> {
        let info = scope
            .registry()
            .get_by_name(name)
            .ok_or_else(|| LookupError::UnknownType { name: name.to_string() })?;
        Ok(Self {
            info,
            scope: scope.clone(),
            suppress_access_checks: scope.suppresses_access_checks(),
        })
    }

    /// Request non-public members through relaxed descriptors.
    pub fn with_suppressed_access_checks(mut self, suppress: bool) -> Self {
        self.suppress_access_checks = suppress;
        self
    }

    pub fn suppresses_access_checks(&self) -> bool {
        self.suppress_access_checks
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn simple_name(&self) -> &str {
        self.info.simple_name()
    }

    pub fn visibility(&self) -> Visibility {
        self.info.visibility()
    }

    pub fn type_ref(&self) -> &TypeRef {
        self.info.type_ref()
    }

    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    // === Eager lookups ===

    pub fn get_method(&self, name: &str, params: &[TypeRef]) -> Result<FastMethod, ReflectError> {
        let entry = self
            .info
            .find_method(name, params)
            .ok_or_else(|| self.no_such_member(name, params))?;
        self.scope.method(&self.relax(&entry.descriptor))
    }

    pub fn get_declared_method(&self, name: &str, params: &[TypeRef]) -> Result<FastMethod, ReflectError> {
        let entry = self
            .info
            .find_declared_method(name, params)
            .ok_or_else(|| self.no_such_member(name, params))?;
        self.scope.method(&self.relax(&entry.descriptor))
    }

    pub fn get_constructor(&self, params: &[TypeRef]) -> Result<FastConstructor, ReflectError> {
        let entry = self
            .info
            .find_constructor(params)
            .ok_or_else(|| self.no_such_member("new", params))?;
        self.scope.constructor(&self.relax(&entry.descriptor))
    }

    pub fn get_declared_constructor(&self, params: &[TypeRef]) -> Result<FastConstructor, ReflectError> {
        let entry = self
            .info
            .find_declared_constructor(params)
            .ok_or_else(|| self.no_such_member("new", params))?;
        self.scope.constructor(&self.relax(&entry.descriptor))
    }

    pub fn get_field(&self, name: &str) -> Result<FastField, ReflectError> {
        let entry = self.info.find_field(name).ok_or_else(|| self.no_such_field(name))?;
        self.scope.field(&self.relax(&entry.getter), &self.relax(&entry.setter))
    }

    pub fn get_declared_field(&self, name: &str) -> Result<FastField, ReflectError> {
        let entry = self.info.find_declared_field(name).ok_or_else(|| self.no_such_field(name))?;
        self.scope.field(&self.relax(&entry.getter), &self.relax(&entry.setter))
    }

    // === Lazy enumeration ===

    pub fn get_methods(&self) -> Vec<LazyMethod> {
        self.info.methods().map(|m| self.lazy_method(&m.descriptor)).collect()
    }

    pub fn get_declared_methods(&self) -> Vec<LazyMethod> {
        self.info.declared_methods().map(|m| self.lazy_method(&m.descriptor)).collect()
    }

    pub fn get_constructors(&self) -> Vec<LazyConstructor> {
        self.info.constructors().map(|c| self.lazy_constructor(&c.descriptor)).collect()
    }

    pub fn get_declared_constructors(&self) -> Vec<LazyConstructor> {
        self.info
            .declared_constructors()
            .map(|c| self.lazy_constructor(&c.descriptor))
            .collect()
    }

    pub fn get_fields(&self) -> Vec<LazyField> {
        self.info.fields().map(|f| self.lazy_field(f)).collect()
    }

    pub fn get_declared_fields(&self) -> Vec<LazyField> {
        self.info.declared_fields().map(|f| self.lazy_field(f)).collect()
    }

    fn lazy_method(&self, descriptor: &Arc<MemberDescriptor>) -> LazyMethod {
        let descriptor = self.relax(descriptor);
        let scope = self.scope.clone();
        let target = descriptor.clone();
        Lazy::new(descriptor, move || scope.thunk(&target).map(FastMethod::wrap))
    }

    fn lazy_constructor(&self, descriptor: &Arc<MemberDescriptor>) -> LazyConstructor {
        let descriptor = self.relax(descriptor);
        let scope = self.scope.clone();
        let target = descriptor.clone();
        Lazy::new(descriptor, move || scope.thunk(&target).map(FastConstructor::wrap))
    }

    fn lazy_field(&self, entry: &FieldEntry) -> LazyField {
        let getter = self.relax(&entry.getter);
        let setter = self.relax(&entry.setter);
        let scope = self.scope.clone();
        let target = getter.clone();
        Lazy::new(getter, move || {
            let get = FieldGetter::wrap(scope.thunk(&target)?);
            let set = if target.is_final() {
                None
            } else {
                Some(FieldSetter::wrap(scope.thunk(&setter)?))
            };
            Ok(FastField::new(get, set))
        })
    }

    /// The descriptor to request: relaxed when access checks are suppressed
    /// and the member is not public.
    fn relax(&self, descriptor: &Arc<MemberDescriptor>) -> Arc<MemberDescriptor> {
        if self.suppress_access_checks && !descriptor.visibility.is_public() && !descriptor.accessible {
            Arc::new(descriptor.with_accessible(true))
        } else {
            descriptor.clone()
        }
    }

    fn no_such_member(&self, name: &str, params: &[TypeRef]) -> ReflectError {
        let params: Vec<String> = params.iter().map(ToString::to_string).collect();
        LookupError::NoSuchMember {
            member: format!("{}::{}({})", self.name(), name, params.join(", ")),
        }
        .into()
    }

    fn no_such_field(&self, name: &str) -> ReflectError {
        LookupError::NoSuchMember {
            member: format!("{}::{}", self.name(), name),
        }
        .into()
    }
}

impl PartialEq for FastClass {
    fn eq(&self, other: &Self) -> bool {
        self.info.type_ref() == other.info.type_ref() && self.scope.id() == other.scope.id()
    }
}

impl Eq for FastClass {}

impl fmt::Display for FastClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for FastClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastClass")
            .field("type", &self.name())
            .field("scope", &self.scope.id())
            .field("suppress_access_checks", &self.suppress_access_checks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thunk::FastMember;
    use crate::ScopeConfig;
    use fastreflect_core::Value;
    use fastreflect_host::{Integer, TypeRegistry};

    fn scope() -> Scope {
        ScopeConfig::new()
            .with_registry(Arc::new(TypeRegistry::with_builtins()))
            .build()
    }

    #[test]
    fn unknown_type() {
        let err = FastClass::for_type(&scope(), "Nope").err();
        assert_eq!(err, Some(LookupError::UnknownType { name: "Nope".into() }));
    }

    #[test]
    fn equality_is_type_and_scope() {
        let a = scope();
        let b = scope();
        let s1 = FastClass::in_scope::<String>(&a).expect("registered");
        let s2 = FastClass::for_type(&a, "String").expect("registered");
        let s3 = FastClass::in_scope::<String>(&b).expect("registered");
        let i1 = FastClass::in_scope::<Integer>(&a).expect("registered");
        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
        assert_ne!(s1, i1);
    }

    #[test]
    fn missing_member_is_lookup_error() {
        let class = FastClass::in_scope::<String>(&scope()).expect("registered");
        let err = class.get_method("nope", &[]).err().expect("missing");
        assert!(matches!(err, ReflectError::Lookup(LookupError::NoSuchMember { .. })));
    }

    #[test]
    fn plural_lookups_do_not_synthesize() {
        let scope = scope();
        let class = FastClass::in_scope::<String>(&scope).expect("registered");
        let methods = class.get_methods();
        assert!(methods.len() >= 8);
        assert_eq!(scope.stats().syntheses, 0);

        let len = methods
            .iter()
            .find(|m| m.descriptor().name == "len")
            .expect("len listed");
        assert_eq!(len.invoke(Some(&Value::from("abc")), &[]).ok(), Some(Value::Int(3)));
        assert_eq!(scope.stats().syntheses, 1);
    }

    #[test]
    fn static_field_through_class() {
        let class = FastClass::in_scope::<Integer>(&scope()).expect("registered");
        let size = class.get_field("SIZE").expect("resolves");
        assert!(size.is_final());
        assert_eq!(size.get(None).ok(), Some(Value::Int(32)));
        assert_eq!(size.declaring_type().name(), "Integer");
    }
}
