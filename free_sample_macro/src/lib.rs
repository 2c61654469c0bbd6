use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, parse_quote, Expr, FnArg, Token,
};

#[derive(Clone, Default)]
struct ShopifyFunctionArgs {
    input_stream: Option<Expr>,
    output_stream: Option<Expr>,
}

impl ShopifyFunctionArgs {
    fn parse<K: syn::parse::Parse, V: syn::parse::Parse>(
        input: &ParseStream<'_>,
    ) -> syn::Result<V> {
        input.parse::<K>()?;
        input.parse::<Token![=]>()?;
        let value: V = input.parse()?;
        if input.lookahead1().peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
        Ok(value)
    }
}

impl Parse for ShopifyFunctionArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = Self::default();
        while !input.is_empty() {
            let lookahead = input.lookahead1();
            if lookahead.peek(kw::input_stream) {
                args.input_stream = Some(Self::parse::<kw::input_stream, Expr>(&input)?);
            } else if lookahead.peek(kw::output_stream) {
                args.output_stream = Some(Self::parse::<kw::output_stream, Expr>(&input)?);
            } else {
                return Err(lookahead.error());
            }
        }
        Ok(args)
    }
}

mod kw {
    syn::custom_keyword!(input_stream);
    syn::custom_keyword!(output_stream);
}

fn check_result_return_type(ast: &syn::ItemFn) -> syn::Result<()> {
    use syn::{Error, ReturnType, Type};

    let ReturnType::Type(_arrow, ty) = &ast.sig.output else {
        return Err(Error::new_spanned(
            &ast.sig,
            "Cart functions require an explicit return type",
        ));
    };
    let Type::Path(path) = ty.as_ref() else {
        return Err(Error::new_spanned(ty, "Cart functions must return a Result"));
    };
    match path.path.segments.last() {
        Some(segment) if segment.ident == "Result" => Ok(()),
        _ => Err(Error::new_spanned(ty, "Cart functions must return a Result")),
    }
}

fn expand(args: ShopifyFunctionArgs, ast: syn::ItemFn) -> TokenStream {
    let name = &ast.sig.ident;

    if ast.sig.inputs.len() != 1 {
        return quote! {compile_error!("Cart functions need exactly one input parameter");};
    }

    let input_type = match ast.sig.inputs.first() {
        Some(FnArg::Typed(input)) => input.ty.as_ref(),
        _ => return quote! {compile_error!("Cart functions can't have a receiver");},
    };

    if let Err(error) = check_result_return_type(&ast) {
        return error.to_compile_error();
    }

    let input_stream: Expr = args
        .input_stream
        .unwrap_or_else(|| parse_quote! { std::io::stdin() });
    let output_stream: Expr = args
        .output_stream
        .unwrap_or_else(|| parse_quote! { std::io::stdout() });

    quote! {
        fn main() -> ::std::result::Result<(), Box<dyn ::std::error::Error>> {
            let input: #input_type = ::free_sample::serde_json::from_reader(
                ::std::io::BufReader::new(#input_stream),
            )?;
            let result = #name(input)?;
            let mut out = #output_stream;
            ::free_sample::serde_json::to_writer(&mut out, &result)?;
            ::std::io::Write::flush(&mut out)?;
            Ok(())
        }

        #ast
    }
}

/// Generates the entry point for a cart function. The generated `main`
/// decodes the function input as JSON from `input_stream` (STDIN by default),
/// calls the annotated function, and encodes its result as JSON to
/// `output_stream` (STDOUT by default).
///
/// ```ignore
/// #[shopify_function]
/// fn run(input: input::Input) -> Result<FunctionRunResult> { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn shopify_function(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let args = parse_macro_input!(attr as ShopifyFunctionArgs);
    let ast = parse_macro_input!(item as syn::ItemFn);
    expand(args, ast).into()
}
