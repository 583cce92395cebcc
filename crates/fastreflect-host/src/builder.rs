//! Fluent registration of native types.
//!
//! ```ignore
//! registry.register::<Point>()
//!     .constructor("new", |x: i64, y: i64| Point { x, y })
//!     .method("norm", |p: &Point| p.x.abs() + p.y.abs())
//!     .method_mut("translate", |p: &mut Point, dx: i64| p.x += dx)
//!     .field_mut("x", |p: &Point| p.x, |p: &mut Point, x: i64| p.x = x)
//!     .field("id", |p: &Point| p.id)
//!     .private()
//!     .build();
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use fastreflect_core::{
    FromArgs, FromValue, InstanceFn, InstanceHandle, InstanceMutFn, InstanceMutHandle, IntoReturn, MemberDescriptor,
    MemberKind, Modifiers, NativeType, Specialization, StaticFn, StaticHandle, TypeRef, ValueType, Visibility,
};
use tracing::debug;

use crate::{FieldEntry, MethodEntry, TypeInfo, TypeRegistry};

/// Field registration generated by `#[derive(NativeType)]`.
pub trait DeriveFields: NativeType {
    fn derive_fields(builder: TypeBuilder<'_, Self>) -> TypeBuilder<'_, Self>;
}

#[derive(Debug, Clone, Copy)]
enum LastMember {
    Method(usize),
    Constructor(usize),
    Field(usize),
}

/// Builder for registering one native type with a [`TypeRegistry`].
///
/// Created by [`TypeRegistry::register`]. Post-modifiers such as
/// [`private`](Self::private) apply to the member registered just before.
pub struct TypeBuilder<'r, T: NativeType> {
    registry: &'r TypeRegistry,
    info: TypeInfo,
    last: Option<LastMember>,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T: NativeType> TypeBuilder<'r, T> {
    pub(crate) fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            info: TypeInfo::new(TypeRef::named(T::NAME)),
            last: None,
            _marker: PhantomData,
        }
    }

    /// Visibility of the type itself.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.info.visibility = visibility;
        self
    }

    // === Methods ===

    /// Register an instance method taking `&T`.
    pub fn method<Args, R, F>(self, name: &str, f: F) -> Self
    where
        F: InstanceFn<T, Args, R>,
        Args: FromArgs + 'static,
        R: IntoReturn + 'static,
    {
        let descriptor = self.descriptor(
            MemberKind::Method,
            name,
            Args::parameter_types(),
            R::return_type(),
            Modifiers::empty(),
            Specialization::instance::<T, Args, R>(),
        );
        self.push_method(descriptor, InstanceHandle::new(f).into_raw())
    }

    /// Register an instance method taking `&mut T`.
    pub fn method_mut<Args, R, F>(self, name: &str, f: F) -> Self
    where
        F: InstanceMutFn<T, Args, R>,
        Args: FromArgs + 'static,
        R: IntoReturn + 'static,
    {
        let descriptor = self.descriptor(
            MemberKind::Method,
            name,
            Args::parameter_types(),
            R::return_type(),
            Modifiers::MUT_RECEIVER,
            Specialization::instance_mut::<T, Args, R>(),
        );
        self.push_method(descriptor, InstanceMutHandle::new(f).into_raw())
    }

    /// Register an associated function with no receiver.
    pub fn static_method<Args, R, F>(self, name: &str, f: F) -> Self
    where
        F: StaticFn<Args, R>,
        Args: FromArgs + 'static,
        R: IntoReturn + 'static,
    {
        let descriptor = self.descriptor(
            MemberKind::Method,
            name,
            Args::parameter_types(),
            R::return_type(),
            Modifiers::STATIC,
            Specialization::receiverless::<Args, R>(),
        );
        self.push_method(descriptor, StaticHandle::new(f).into_raw())
    }

    /// Register a constructor. `f` returns `T` (or `Result<T, E>`).
    pub fn constructor<Args, R, F>(mut self, name: &str, f: F) -> Self
    where
        F: StaticFn<Args, R>,
        Args: FromArgs + 'static,
        R: IntoReturn + 'static,
    {
        let descriptor = self.descriptor(
            MemberKind::Constructor,
            name,
            Args::parameter_types(),
            R::return_type(),
            Modifiers::empty(),
            Specialization::receiverless::<Args, R>(),
        );
        self.info.constructors.push(MethodEntry {
            descriptor: Arc::new(descriptor),
            handle: StaticHandle::new(f).into_raw(),
        });
        self.last = Some(LastMember::Constructor(self.info.constructors.len() - 1));
        self
    }

    // === Fields ===

    /// Register an immutable field with a read accessor.
    pub fn field<V, G>(self, name: &str, get: G) -> Self
    where
        V: FromValue + ValueType + IntoReturn + 'static,
        G: InstanceFn<T, (), V>,
    {
        let getter = self.descriptor(
            MemberKind::FieldGetter,
            name,
            Vec::new(),
            V::type_ref(),
            Modifiers::FINAL,
            Specialization::instance::<T, (), V>(),
        );
        let setter = self.descriptor(
            MemberKind::FieldSetter,
            name,
            vec![V::type_ref()],
            TypeRef::void(),
            Modifiers::FINAL,
            Specialization::instance_mut::<T, (V,), ()>(),
        );
        self.push_field(getter, setter, InstanceHandle::new(get).into_raw(), None)
    }

    /// Register a mutable field with read and write accessors.
    pub fn field_mut<V, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        V: FromValue + ValueType + IntoReturn + 'static,
        G: InstanceFn<T, (), V>,
        S: InstanceMutFn<T, (V,), ()>,
    {
        let getter = self.descriptor(
            MemberKind::FieldGetter,
            name,
            Vec::new(),
            V::type_ref(),
            Modifiers::empty(),
            Specialization::instance::<T, (), V>(),
        );
        let setter = self.descriptor(
            MemberKind::FieldSetter,
            name,
            vec![V::type_ref()],
            TypeRef::void(),
            Modifiers::empty(),
            Specialization::instance_mut::<T, (V,), ()>(),
        );
        self.push_field(
            getter,
            setter,
            InstanceHandle::new(get).into_raw(),
            Some(InstanceMutHandle::new(set).into_raw()),
        )
    }

    /// Register an immutable static field.
    pub fn static_field<V, G>(self, name: &str, get: G) -> Self
    where
        V: FromValue + ValueType + IntoReturn + 'static,
        G: StaticFn<(), V>,
    {
        let getter = self.descriptor(
            MemberKind::FieldGetter,
            name,
            Vec::new(),
            V::type_ref(),
            Modifiers::STATIC | Modifiers::FINAL,
            Specialization::receiverless::<(), V>(),
        );
        let setter = self.descriptor(
            MemberKind::FieldSetter,
            name,
            vec![V::type_ref()],
            TypeRef::void(),
            Modifiers::STATIC | Modifiers::FINAL,
            Specialization::receiverless::<(V,), ()>(),
        );
        self.push_field(getter, setter, StaticHandle::new(get).into_raw(), None)
    }

    /// Register a mutable static field. Storage is owned by the accessors.
    pub fn static_field_mut<V, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        V: FromValue + ValueType + IntoReturn + 'static,
        G: StaticFn<(), V>,
        S: StaticFn<(V,), ()>,
    {
        let getter = self.descriptor(
            MemberKind::FieldGetter,
            name,
            Vec::new(),
            V::type_ref(),
            Modifiers::STATIC,
            Specialization::receiverless::<(), V>(),
        );
        let setter = self.descriptor(
            MemberKind::FieldSetter,
            name,
            vec![V::type_ref()],
            TypeRef::void(),
            Modifiers::STATIC,
            Specialization::receiverless::<(V,), ()>(),
        );
        self.push_field(
            getter,
            setter,
            StaticHandle::new(get).into_raw(),
            Some(StaticHandle::new(set).into_raw()),
        )
    }

    /// Register the fields declared through `#[derive(NativeType)]`.
    pub fn derived_fields(self) -> Self
    where
        T: DeriveFields,
    {
        T::derive_fields(self)
    }

    // === Post-modifiers ===

    /// Make the last registered member private.
    pub fn private(self) -> Self {
        self.modify_last(|d| d.visibility = Visibility::Private)
    }

    /// Make the last registered member protected.
    pub fn protected(self) -> Self {
        self.modify_last(|d| d.visibility = Visibility::Protected)
    }

    /// Mark the last registered method or constructor as var-args: its
    /// trailing parameter takes the packed remaining arguments.
    pub fn varargs(self) -> Self {
        if matches!(self.last, Some(LastMember::Field(_))) {
            return self;
        }
        self.modify_last(|d| {
            if !d.parameter_types.is_empty() {
                d.modifiers |= Modifiers::VARARGS;
            }
        })
    }

    /// Insert the type, replacing any earlier registration of the same name.
    pub fn build(mut self) -> Arc<TypeInfo> {
        self.info.reindex();
        debug!(
            type_name = T::NAME,
            methods = self.info.methods.len(),
            constructors = self.info.constructors.len(),
            fields = self.info.fields.len(),
            "registered type"
        );
        self.registry.insert(self.info)
    }

    // === Internals ===

    fn descriptor(
        &self,
        kind: MemberKind,
        name: &str,
        parameter_types: Vec<TypeRef>,
        return_type: TypeRef,
        modifiers: Modifiers,
        specialization: Specialization,
    ) -> MemberDescriptor {
        MemberDescriptor {
            declaring_type: self.info.type_ref.clone(),
            kind,
            name: name.to_string(),
            parameter_types,
            return_type,
            visibility: Visibility::Public,
            modifiers,
            accessible: false,
            specialization,
        }
    }

    fn push_method(mut self, descriptor: MemberDescriptor, handle: fastreflect_core::RawHandle) -> Self {
        self.info.methods.push(MethodEntry {
            descriptor: Arc::new(descriptor),
            handle,
        });
        self.last = Some(LastMember::Method(self.info.methods.len() - 1));
        self
    }

    fn push_field(
        mut self,
        getter: MemberDescriptor,
        setter: MemberDescriptor,
        read: fastreflect_core::RawHandle,
        write: Option<fastreflect_core::RawHandle>,
    ) -> Self {
        self.info.fields.push(FieldEntry {
            getter: Arc::new(getter),
            setter: Arc::new(setter),
            read,
            write,
        });
        self.last = Some(LastMember::Field(self.info.fields.len() - 1));
        self
    }

    fn modify_last(mut self, f: impl Fn(&mut MemberDescriptor)) -> Self {
        match self.last {
            Some(LastMember::Method(i)) => {
                if let Some(entry) = self.info.methods.get_mut(i) {
                    f(Arc::make_mut(&mut entry.descriptor));
                }
            }
            Some(LastMember::Constructor(i)) => {
                if let Some(entry) = self.info.constructors.get_mut(i) {
                    f(Arc::make_mut(&mut entry.descriptor));
                }
            }
            Some(LastMember::Field(i)) => {
                if let Some(entry) = self.info.fields.get_mut(i) {
                    f(Arc::make_mut(&mut entry.getter));
                    f(Arc::make_mut(&mut entry.setter));
                }
            }
            None => {}
        }
        self
    }
}
