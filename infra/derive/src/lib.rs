#![allow(unreachable_pub)]

//! # Derive
//!
//! Procedural macros used across the tinymessages workspace.
//!
//! The only macro today is [`macro@tmsg_error`], which turns a plain enum into a
//! `thiserror` error with context support. Examples are `ignore`d because a
//! proc-macro crate cannot use its own macros in doctests.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Declares a crate error enum.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext<T>` with a `.context(...)` method for `Result<T, Name>` and for
///   `Result<T, Source>` of every variant that wraps a source error.
/// * `From<Source>` for every variant with a `source` (or `#[source]`/`#[from]`) field.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A private `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// * Only enums with named-field variants are accepted.
/// * `context` fields must be `Option<Cow<'static, str>>`.
/// * A variant wrapping a source error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[tmsg_derive::tmsg_error]
/// pub enum DispatchError {
///     #[error("Handler failed{}: {source}", format_context(.context))]
///     Handler {
///         source: Box<dyn std::error::Error + Send + Sync>,
///         context: Option<Cow<'static, str>>,
///     },
/// }
///
/// fn run(handler: impl Fn() -> Result<(), Box<dyn std::error::Error + Send + Sync>>)
///     -> Result<(), DispatchError>
/// {
///     handler().context("category Tick")?;
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn tmsg_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
