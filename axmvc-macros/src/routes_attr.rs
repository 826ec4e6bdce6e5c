use proc_macro::TokenStream;
use syn::parse_macro_input;

use crate::codegen;
use crate::routes_parsing::{self, RoutesArgs};

pub fn expand(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as syn::ItemImpl);
    let parsed = RoutesArgs::parse(args.into()).and_then(|args| routes_parsing::parse(args, item));
    match parsed {
        Ok(def) => codegen::generate(&def).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
