mod column_list;
mod helper;

use column_list::impl_column_list;
use proc_macro::TokenStream;

#[proc_macro_derive(ColumnList)]
pub fn derive_column_list(input: TokenStream) -> TokenStream {
    impl_column_list(input.into()).into()
}
