//! Resolution of member descriptors to directly callable handles.

use std::sync::Arc;

use fastreflect_core::{LookupError, MemberDescriptor, MemberKind, RawHandle, TypeHash, TypeRef, Visibility};

use crate::{TypeInfo, TypeRegistry};

/// Resolves descriptors against a registry.
///
/// Each `find_*` entry point is one lookup strategy; [`Lookup::resolve`]
/// picks the strategy a descriptor implies. All of them check, in order:
/// the declaring type exists, the member exists with the same signature,
/// and the member is public or the descriptor's accessibility was relaxed.
#[derive(Clone)]
pub struct Lookup {
    registry: Arc<TypeRegistry>,
}

impl Lookup {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Resolve with the strategy implied by the descriptor's kind and modifiers.
    pub fn resolve(&self, descriptor: &MemberDescriptor) -> Result<RawHandle, LookupError> {
        match descriptor.kind {
            MemberKind::Method if descriptor.is_static() => self.find_static(descriptor),
            MemberKind::Method => self.find_virtual(descriptor),
            MemberKind::Constructor => self.find_constructor(descriptor),
            MemberKind::FieldGetter => self.find_field_reader(descriptor),
            MemberKind::FieldSetter => self.find_field_writer(descriptor),
        }
    }

    /// Instance method lookup.
    pub fn find_virtual(&self, descriptor: &MemberDescriptor) -> Result<RawHandle, LookupError> {
        self.find_method(descriptor, false)
    }

    /// Associated (receiver-less) method lookup.
    pub fn find_static(&self, descriptor: &MemberDescriptor) -> Result<RawHandle, LookupError> {
        self.find_method(descriptor, true)
    }

    pub fn find_constructor(&self, descriptor: &MemberDescriptor) -> Result<RawHandle, LookupError> {
        let info = self.type_info(descriptor)?;
        let params = param_hashes(descriptor);
        let entry = info
            .constructor_by_hash(TypeHash::from_constructor(info.type_hash(), &params))
            .filter(|c| c.descriptor.name == descriptor.name)
            .ok_or_else(|| no_such_member(descriptor))?;
        check_signature(descriptor, &entry.descriptor)?;
        if entry.descriptor.return_type != *info.type_ref() {
            return Err(LookupError::SignatureMismatch {
                member: descriptor.generic_string(),
                expected: info.name().to_string(),
                found: entry.descriptor.return_type.name().to_string(),
            });
        }
        check_access(descriptor, entry.descriptor.visibility)?;
        Ok(entry.handle.clone())
    }

    pub fn find_field_reader(&self, descriptor: &MemberDescriptor) -> Result<RawHandle, LookupError> {
        let info = self.type_info(descriptor)?;
        let entry = info
            .field_by_hash(TypeHash::from_field(info.type_hash(), &descriptor.name))
            .ok_or_else(|| no_such_member(descriptor))?;
        check_signature(descriptor, &entry.getter)?;
        check_access(descriptor, entry.visibility())?;
        Ok(entry.read.clone())
    }

    pub fn find_field_writer(&self, descriptor: &MemberDescriptor) -> Result<RawHandle, LookupError> {
        let info = self.type_info(descriptor)?;
        let entry = info
            .field_by_hash(TypeHash::from_field(info.type_hash(), &descriptor.name))
            .ok_or_else(|| no_such_member(descriptor))?;
        check_signature(descriptor, &entry.setter)?;
        check_access(descriptor, entry.visibility())?;
        entry.write.clone().ok_or_else(|| LookupError::NoWriteAccessor {
            field: format!("{}::{}", descriptor.declaring_type, descriptor.name),
        })
    }

    fn find_method(&self, descriptor: &MemberDescriptor, is_static: bool) -> Result<RawHandle, LookupError> {
        let info = self.type_info(descriptor)?;
        let params = param_hashes(descriptor);
        let entry = info
            .method_by_hash(TypeHash::from_method(info.type_hash(), &descriptor.name, &params, is_static))
            .ok_or_else(|| no_such_member(descriptor))?;
        check_signature(descriptor, &entry.descriptor)?;
        check_access(descriptor, entry.descriptor.visibility)?;
        Ok(entry.handle.clone())
    }

    fn type_info(&self, descriptor: &MemberDescriptor) -> Result<Arc<TypeInfo>, LookupError> {
        self.registry
            .get(descriptor.declaring_type.hash())
            .ok_or_else(|| LookupError::UnknownType {
                name: descriptor.declaring_type.name().to_string(),
            })
    }
}

fn param_hashes(descriptor: &MemberDescriptor) -> Vec<TypeHash> {
    descriptor.parameter_types.iter().map(TypeRef::hash).collect()
}

fn no_such_member(descriptor: &MemberDescriptor) -> LookupError {
    LookupError::NoSuchMember {
        member: descriptor.generic_string(),
    }
}

fn check_signature(requested: &MemberDescriptor, registered: &MemberDescriptor) -> Result<(), LookupError> {
    if requested.return_type != registered.return_type
        || requested.parameter_types != registered.parameter_types
    {
        return Err(LookupError::SignatureMismatch {
            member: requested.generic_string(),
            expected: requested.generic_string(),
            found: registered.generic_string(),
        });
    }
    if requested.specialization.handle_type() != registered.specialization.handle_type() {
        return Err(LookupError::SignatureMismatch {
            member: requested.generic_string(),
            expected: requested.specialization.handle_type().to_string(),
            found: registered.specialization.handle_type().to_string(),
        });
    }
    Ok(())
}

fn check_access(requested: &MemberDescriptor, visibility: Visibility) -> Result<(), LookupError> {
    if visibility.is_public() || requested.accessible {
        Ok(())
    } else {
        Err(LookupError::Inaccessible {
            member: requested.generic_string(),
            visibility,
        })
    }
}
