use crate::helper;
use proc_macro2::TokenStream;
use syn::DeriveInput;

/// Generates a `ColumnList` implementation whose column list is the struct's
/// field names, each double-quoted as a PostgreSQL identifier.
pub fn impl_column_list(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse2(input).expect("failed to parse input token stream");

    let struct_name = &ast.ident;
    let columns = helper::extract_fields(&ast.data)
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref().map(|ident| format!("\"{}\"", ident)))
        .collect::<Vec<String>>();
    let column_list = columns.join(", ");

    quote::quote! {
        impl ColumnList for #struct_name {
            fn column_list() -> &'static str {
                #column_list
            }
        }
    }
}
