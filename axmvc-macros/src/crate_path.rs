//! Crate path resolution for generated code.
//!
//! Detects whether the user depends on `axmvc` (facade) or `axmvc-core`
//! directly, and returns the appropriate path prefix for generated code.

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

/// Returns the token stream for accessing `axmvc_core` types.
///
/// If the user depends on `axmvc`, returns `::axmvc`.
/// Otherwise returns `::axmvc_core`.
pub fn axmvc_core_path() -> TokenStream {
    let found = crate_name("axmvc").or_else(|_| crate_name("axmvc-core"));
    match found {
        Ok(FoundCrate::Itself) => quote!(crate),
        Ok(FoundCrate::Name(name)) => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            quote!(::#ident)
        }
        // Fallback - assume axmvc_core is available (for error messages)
        Err(_) => quote!(::axmvc_core),
    }
}
