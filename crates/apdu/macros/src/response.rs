//! Parsing and expansion of the `response { ... }` block.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    Attribute, Expr, Fields, Ident, Token, Type, Variant, Visibility,
    braced,
    parse::ParseStream,
    punctuated::Punctuated,
};

/// Parsed contents of a `response { ... }` block.
pub(crate) struct ResponseDef {
    ok_variants: Vec<Variant>,
    error_variants: Vec<Variant>,
    custom_parse: Option<Expr>,
}

impl ResponseDef {
    pub(crate) fn parse<'a>(input: &'a ParseStream<'a>) -> syn::Result<Self> {
        let mut ok_variants = None;
        let mut error_variants = Vec::new();
        let mut custom_parse = None;

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "ok" => {
                    let content;
                    braced!(content in input);
                    let variants =
                        Punctuated::<Variant, Token![,]>::parse_terminated(&content)?;
                    ok_variants = Some(variants.into_iter().collect());
                    consume_optional_comma(input)?;
                }
                "errors" => {
                    let content;
                    braced!(content in input);
                    let variants =
                        Punctuated::<Variant, Token![,]>::parse_terminated(&content)?;
                    error_variants = variants.into_iter().collect();
                    consume_optional_comma(input)?;
                }
                "custom_parse" => {
                    input.parse::<Token![=]>()?;
                    custom_parse = Some(input.parse()?);
                    consume_optional_comma(input)?;
                }
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("Unknown response field: {other}"),
                    ));
                }
            }
        }

        let ok_variants = ok_variants
            .ok_or_else(|| syn::Error::new(Span::call_site(), "Missing ok block in response"))?;

        Ok(Self {
            ok_variants,
            error_variants,
            custom_parse,
        })
    }
}

fn consume_optional_comma(input: &ParseStream<'_>) -> syn::Result<()> {
    if input.peek(Token![,]) {
        input.parse::<Token![,]>()?;
    }
    Ok(())
}

/// How a single status word is matched against a variant.
enum SwSpec {
    /// A single expression compared against the whole [`nexum_apdu_core::StatusWord`].
    Full(Expr),
    /// Independent SW1/SW2 comparisons; `None` means "match any byte".
    Bytes(Option<Expr>, Option<Expr>),
}

fn parse_sw_byte(input: ParseStream<'_>) -> syn::Result<Option<Expr>> {
    if input.peek(Token![_]) {
        input.parse::<Token![_]>()?;
        Ok(None)
    } else {
        Ok(Some(input.parse::<Expr>()?))
    }
}

fn parse_sw_attr(attr: &Attribute) -> syn::Result<SwSpec> {
    attr.parse_args_with(|input: ParseStream<'_>| {
        let first = parse_sw_byte(input)?;
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let second = parse_sw_byte(input)?;
            Ok(SwSpec::Bytes(first, second))
        } else {
            let expr = first
                .ok_or_else(|| input.error("`sw(_)` alone is not a valid status match"))?;
            Ok(SwSpec::Full(expr))
        }
    })
}

fn sw_condition(spec: &SwSpec) -> TokenStream {
    match spec {
        SwSpec::Full(expr) => quote! { status == (#expr) },
        SwSpec::Bytes(sw1, sw2) => {
            let sw1_cond = sw1
                .as_ref()
                .map_or_else(|| quote! { true }, |expr| quote! { status.sw1 == (#expr) });
            let sw2_cond = sw2
                .as_ref()
                .map_or_else(|| quote! { true }, |expr| quote! { status.sw2 == (#expr) });
            quote! { (#sw1_cond) && (#sw2_cond) }
        }
    }
}

/// A variant with its `#[sw(...)]` attribute pulled out and the rest of its
/// attributes left intact for re-emission on the generated enum.
struct TaggedVariant {
    ident: Ident,
    fields: Fields,
    sw: SwSpec,
    payload_field: Option<String>,
    kept_attrs: Vec<Attribute>,
}

fn tag_variant(variant: &Variant, is_error: bool) -> syn::Result<TaggedVariant> {
    let mut sw = None;
    let mut payload_field = None;
    let mut kept_attrs = Vec::new();

    for attr in &variant.attrs {
        if attr.path().is_ident("sw") {
            sw = Some(parse_sw_attr(attr)?);
        } else if attr.path().is_ident("payload") {
            let field_name: syn::LitStr = attr.parse_args_with(|input: ParseStream<'_>| {
                let key: Ident = input.parse()?;
                if key != "field" {
                    return Err(input.error("expected `field = \"...\"` in #[payload(...)]"));
                }
                input.parse::<Token![=]>()?;
                input.parse()
            })?;
            payload_field = Some(field_name.value());
        } else {
            kept_attrs.push(attr.clone());
        }
    }

    let sw = sw.ok_or_else(|| {
        syn::Error::new_spanned(&variant.ident, "every response variant needs a #[sw(...)]")
    })?;

    if is_error && !kept_attrs.iter().any(|a| a.path().is_ident("error")) {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "every error variant needs a #[error(\"...\")]",
        ));
    }

    Ok(TaggedVariant {
        ident: variant.ident.clone(),
        fields: variant.fields.clone(),
        sw,
        payload_field,
        kept_attrs,
    })
}

fn is_vec_u8(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    type_path
        .path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Vec" && quote!(#segment).to_string().replace(' ', "") == "Vec<u8>")
}

/// The single field of a variant's named fields, if it has exactly one.
fn only_named_field(fields: &Fields) -> Option<&syn::Field> {
    match fields {
        Fields::Named(named) if named.named.len() == 1 => named.named.first(),
        _ => None,
    }
}

/// Build the constructor expression for an ok variant when no `custom_parse`
/// closure is given: unit variants construct bare, and a variant whose sole
/// field is `Vec<u8>` (optionally marked with `#[payload(field = "...")]`) is
/// filled from the response payload.
fn default_ok_ctor(ok_name: &Ident, variant: &TaggedVariant) -> TokenStream {
    let variant_ident = &variant.ident;
    match &variant.fields {
        Fields::Unit => quote! { #ok_name::#variant_ident },
        Fields::Named(named) => {
            if let Some(field) = only_named_field(&variant.fields) {
                let field_ident = field.ident.as_ref().expect("named field");
                let matches_payload = variant
                    .payload_field
                    .as_deref()
                    .is_none_or(|name| name == field_ident.to_string());
                if matches_payload && is_vec_u8(&field.ty) {
                    return quote! {
                        #ok_name::#variant_ident {
                            #field_ident: __payload.to_vec(),
                        }
                    };
                }
            }
            let field_inits = named.named.iter().map(|field| {
                let field_ident = field.ident.as_ref().expect("named field");
                quote! { #field_ident: ::core::default::Default::default() }
            });
            quote! { #ok_name::#variant_ident { #(#field_inits),* } }
        }
        Fields::Unnamed(_) => quote! { #ok_name::#variant_ident(::core::default::Default::default()) },
    }
}

/// Build the constructor expression for an error variant, filling any
/// `sw1`/`sw2` fields from the response's status word.
fn default_error_ctor(error_name: &Ident, variant: &TaggedVariant) -> TokenStream {
    let variant_ident = &variant.ident;
    match &variant.fields {
        Fields::Unit => quote! { #error_name::#variant_ident },
        Fields::Named(named) => {
            let field_inits = named.named.iter().map(|field| {
                let field_ident = field.ident.as_ref().expect("named field");
                if field_ident == "sw1" || field_ident == "sw2" {
                    quote! { #field_ident: status.#field_ident }
                } else {
                    quote! { #field_ident: ::core::default::Default::default() }
                }
            });
            quote! { #error_name::#variant_ident { #(#field_inits),* } }
        }
        Fields::Unnamed(_) => quote! { #error_name::#variant_ident(::core::default::Default::default()) },
    }
}

/// Expand a parsed response block into the `Ok`/`Error` enums and the body of
/// `parse_response`.
///
/// Returns `(enum_tokens, parse_response_body)`.
pub(crate) fn expand_response(
    response: &ResponseDef,
    vis: &Visibility,
    ok_name: &Ident,
    error_name: &Ident,
) -> Result<(TokenStream, TokenStream), syn::Error> {
    let ok_variants = response
        .ok_variants
        .iter()
        .map(|v| tag_variant(v, false))
        .collect::<syn::Result<Vec<_>>>()?;
    let error_variants = response
        .error_variants
        .iter()
        .map(|v| tag_variant(v, true))
        .collect::<syn::Result<Vec<_>>>()?;

    let ok_variant_defs = ok_variants.iter().map(|v| {
        let ident = &v.ident;
        let attrs = &v.kept_attrs;
        let fields = &v.fields;
        match fields {
            Fields::Unit => quote! { #(#attrs)* #ident },
            _ => quote! { #(#attrs)* #ident #fields },
        }
    });

    let error_variant_defs = error_variants.iter().map(|v| {
        let ident = &v.ident;
        let attrs = &v.kept_attrs;
        let fields = &v.fields;
        match fields {
            Fields::Unit => quote! { #(#attrs)* #ident },
            _ => quote! { #(#attrs)* #ident #fields },
        }
    });

    let enum_tokens = quote! {
        /// Successful outcomes of this command.
        #[derive(Debug, Clone)]
        #vis enum #ok_name {
            #(#ok_variant_defs),*
        }

        /// Outcomes of this command mapped from a card error status.
        #[derive(Debug, thiserror::Error)]
        #vis enum #error_name {
            #(#error_variant_defs,)*
            /// The response could not be parsed as expected.
            #[error("failed to parse response: {0}")]
            ParseError(&'static str),
            /// The response itself was malformed.
            #[error(transparent)]
            Response(#[from] ResponseError),
            /// The secure channel or transport layer failed.
            #[error(transparent)]
            Processor(#[from] SecureProtocolError),
            /// A status word this command does not map to a known outcome.
            #[error("unexpected status word {sw1:02X}{sw2:02X}")]
            Unknown {
                /// First status byte.
                sw1: u8,
                /// Second status byte.
                sw2: u8,
            },
        }

        #[allow(dead_code)]
        type Error = #error_name;
    };

    let parse_body = if let Some(custom_parse) = &response.custom_parse {
        quote! {
            let __parse_response = #custom_parse;
            __parse_response(&response)
        }
    } else {
        let ok_arms = ok_variants.iter().map(|v| {
            let cond = sw_condition(&v.sw);
            let ctor = default_ok_ctor(ok_name, v);
            quote! {
                if #cond {
                    return Ok(#ctor);
                }
            }
        });
        let error_arms = error_variants.iter().map(|v| {
            let cond = sw_condition(&v.sw);
            let ctor = default_error_ctor(error_name, v);
            quote! {
                if #cond {
                    return Err(#ctor);
                }
            }
        });

        let needs_payload = ok_variants.iter().any(|v| {
            only_named_field(&v.fields).is_some_and(|field| {
                let matches_payload = v
                    .payload_field
                    .as_deref()
                    .is_none_or(|name| name == field.ident.as_ref().expect("named field").to_string());
                matches_payload && is_vec_u8(&field.ty)
            })
        });
        let payload_binding = needs_payload.then(|| {
            quote! { let __payload = response.payload().clone().unwrap_or_default(); }
        });

        quote! {
            let status = response.status();
            #payload_binding
            #(#ok_arms)*
            #(#error_arms)*
            Err(#error_name::Unknown { sw1: status.sw1, sw2: status.sw2 })
        }
    };

    let parse_response_body = quote! {
        {
            #parse_body
        }
    };

    Ok((enum_tokens, parse_response_body))
}
