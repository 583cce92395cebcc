//! Procedural macros for registering Rust types with the reflection registry.
//!
//! # Example
//!
//! ```ignore
//! use fastreflect::NativeType;
//!
//! #[derive(Clone, NativeType)]
//! #[reflect(name = "geo::Point")]
//! pub struct Point {
//!     #[reflect(get, set)]
//!     pub x: i64,
//!     #[reflect(get)]
//!     pub id: u64,
//! }
//!
//! registry.register::<Point>().derived_fields().build();
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_native_type;

/// Derive `NativeType`, the value-conversion traits and field registration.
///
/// The type must be `Clone`: extracting it from a `Value` clones the instance.
///
/// # Attributes
///
/// - `#[reflect(name = "...")]` - Registered type name (default: Rust type name)
///
/// # Field Attributes
///
/// - `#[reflect(get)]` - Immutable field with a read accessor
/// - `#[reflect(get, set)]` - Mutable field with read and write accessors
/// - `#[reflect(name = "...")]` - Registered field name
/// - `#[reflect(private)]` - Register the field as private
#[proc_macro_derive(NativeType, attributes(reflect))]
pub fn derive_native_type(input: TokenStream) -> TokenStream {
    derive_native_type::derive_native_type_impl(input)
}
