//! Parsing and expansion of the `command { ... }` block.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Expr, Ident, ItemFn, Token, Visibility, braced, parse::ParseStream};

/// Parsed contents of a `command { ... }` block.
pub(crate) struct CommandDef {
    /// Class byte (CLA).
    pub cla: Expr,
    /// Instruction byte (INS).
    pub ins: Expr,
    /// Required security level, defaults to `SecurityLevel::none()`.
    pub required_security_level: Option<Expr>,
    /// Builder methods spliced verbatim onto the generated command struct.
    pub builders: Vec<ItemFn>,
}

impl CommandDef {
    pub(crate) fn parse<'a>(input: &'a ParseStream<'a>) -> syn::Result<Self> {
        let mut cla = None;
        let mut ins = None;
        let mut required_security_level = None;
        let mut builders = Vec::new();

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            let key_str = key.to_string();

            match key_str.as_str() {
                "cla" => {
                    input.parse::<Token![:]>()?;
                    cla = Some(input.parse()?);
                    input.parse::<Token![,]>()?;
                }
                "ins" => {
                    input.parse::<Token![:]>()?;
                    ins = Some(input.parse()?);
                    input.parse::<Token![,]>()?;
                }
                "required_security_level" => {
                    input.parse::<Token![:]>()?;
                    required_security_level = Some(input.parse()?);
                    input.parse::<Token![,]>()?;
                }
                "builders" => {
                    let content;
                    braced!(content in input);

                    while !content.is_empty() {
                        let fn_item: ItemFn = content.parse()?;
                        builders.push(fn_item);
                    }

                    if !input.is_empty() {
                        input.parse::<Token![,]>()?;
                    }
                }
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("Unknown command field: {key}"),
                    ));
                }
            }
        }

        let cla =
            cla.ok_or_else(|| syn::Error::new(Span::call_site(), "Missing cla field in command"))?;
        let ins =
            ins.ok_or_else(|| syn::Error::new(Span::call_site(), "Missing ins field in command"))?;

        Ok(Self {
            cla,
            ins,
            required_security_level,
            builders,
        })
    }
}

/// Expand a parsed command block into the command struct and its
/// [`nexum_apdu_core::ApduCommand`] implementation.
///
/// `parse_impl` is the already-expanded body of `parse_response`, produced by
/// [`crate::response::expand_response`].
pub(crate) fn expand_command(
    command: &CommandDef,
    vis: &Visibility,
    command_name: &Ident,
    ok_name: &Ident,
    error_name: &Ident,
    parse_impl: &TokenStream,
) -> Result<TokenStream, syn::Error> {
    let cla = &command.cla;
    let ins = &command.ins;

    let required_security_level = command
        .required_security_level
        .as_ref()
        .map_or_else(|| quote! { SecurityLevel::none() }, |expr| quote! { #expr });

    let builder_methods = &command.builders;

    let tokens = quote! {
        /// APDU command.
        #[derive(Debug, Clone)]
        #vis struct #command_name {
            p1: u8,
            p2: u8,
            data: Option<bytes::Bytes>,
            le: Option<ExpectedLength>,
        }

        impl #command_name {
            /// Construct a command with the given P1/P2 parameters and no data.
            pub const fn new(p1: u8, p2: u8) -> Self {
                Self {
                    p1,
                    p2,
                    data: None,
                    le: None,
                }
            }

            /// Attach data to this command.
            #[must_use]
            pub fn with_data(mut self, data: impl Into<bytes::Bytes>) -> Self {
                self.data = Some(data.into());
                self
            }

            /// Set the expected response length (`Le`).
            #[must_use]
            pub const fn with_le(mut self, le: ExpectedLength) -> Self {
                self.le = Some(le);
                self
            }

            #(#builder_methods)*
        }

        impl ApduCommand for #command_name {
            type Success = #ok_name;
            type Error = #error_name;

            fn class(&self) -> u8 {
                #cla
            }

            fn instruction(&self) -> u8 {
                #ins
            }

            fn p1(&self) -> u8 {
                self.p1
            }

            fn p2(&self) -> u8 {
                self.p2
            }

            fn data(&self) -> Option<&[u8]> {
                self.data.as_deref()
            }

            fn expected_length(&self) -> Option<ExpectedLength> {
                self.le
            }

            fn required_security_level(&self) -> SecurityLevel {
                #required_security_level
            }

            fn parse_response(&self, response: Response) -> Result<Self::Success, Self::Error> {
                #parse_impl
            }
        }
    };

    Ok(tokens)
}
