//! Attribute parsing for `#[reflect(...)]`.

use syn::{Attribute, LitStr};

/// Parsed `#[reflect(...)]` attributes on a type.
#[derive(Debug, Default)]
pub struct TypeAttrs {
    /// Registered name (default: Rust type name)
    pub name: Option<String>,
}

/// Parsed `#[reflect(...)]` attributes on a field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Register a read accessor
    pub get: bool,
    /// Register a write accessor
    pub set: bool,
    /// Registered field name (default: Rust field name)
    pub name: Option<String>,
    /// Register the field as private
    pub private: bool,
}

impl TypeAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else {
                    return Err(meta.error(format!(
                        "unknown reflect attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl FieldAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("get") {
                    result.get = true;
                } else if meta.path.is_ident("set") {
                    result.set = true;
                } else if meta.path.is_ident("private") {
                    result.private = true;
                } else if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else {
                    return Err(meta.error(format!(
                        "unknown reflect field attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }

    pub fn is_exposed(&self) -> bool {
        self.get || self.set
    }
}
