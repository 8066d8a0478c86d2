mod config;
mod enums;

use proc_macro::TokenStream;

/// Implement the `std::fmt::Display` trait for the given enum. Only supports enums which have only
/// fieldless variants.
///
/// This macro also implements a method `to_str(&self) -> &'static str` for cases where an owned
/// String is not needed.
///
/// # Panics
///
/// This macro will panic if applied to a struct, a union, or an enum with any variants that have
/// fields.
#[proc_macro_derive(EnumDisplay)]
pub fn enum_display(input: TokenStream) -> TokenStream {
    enums::enum_display(input)
}

/// Implement the `std::str::FromStr` trait for the given enum, with `FromStr::Err` set to `String`.
/// Only supports enums which have only fieldless variants. The generated implementation will be
/// case-insensitive.
///
/// # Panics
///
/// This macro will panic if applied to a struct, a union, or an enum with any variants that have
/// fields.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str(input: TokenStream) -> TokenStream {
    enums::enum_from_str(input)
}

/// On an enum with only fieldless variants, add an `ALL` constant of type `[Self; N]` that contains
/// every variant of the enum, in declaration order. Used throughout this crate to build the dense
/// `CpuId -> slot` dispatch tables without a hash map.
///
/// # Panics
///
/// This macro will panic if applied to a struct, a union, or an enum with non-fieldless variants.
#[proc_macro_derive(EnumAll)]
pub fn enum_all(input: TokenStream) -> TokenStream {
    enums::enum_all(input)
}

/// Implement `std::fmt::Display` for a struct, meant for pretty-printing configs: one field per
/// line, each formatted with its own `Display` impl unless marked `#[cfg_display(debug_fmt)]`.
/// Fields marked `#[cfg_display(skip)]` are omitted.
///
/// # Panics
///
/// This macro only supports structs with named fields and will panic on anything else.
#[proc_macro_derive(ConfigDisplay, attributes(cfg_display))]
pub fn config_display(input: TokenStream) -> TokenStream {
    config::config_display(input)
}
