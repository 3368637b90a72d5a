// Path: crates/macros/src/lib.rs
//! Procedural macros for observer core services.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, punctuated::Punctuated, Attribute,
    FnArg, ImplItem, ItemImpl, LitInt, LitStr, Meta, Token,
};

struct ServiceAttributes {
    id: LitStr,
    abi_version: LitInt,
    state_schema: LitStr,
    capabilities: Option<LitStr>,
}

fn lit_str(value: &syn::Expr) -> Option<LitStr> {
    match value {
        syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(lit), .. }) => Some(lit.clone()),
        _ => None,
    }
}

impl Parse for ServiceAttributes {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut id = None;
        let mut abi_version = None;
        let mut state_schema = None;
        let mut capabilities = None;

        for var in Punctuated::<Meta, Token![,]>::parse_terminated(input)? {
            let Meta::NameValue(nv) = var else { continue };
            if nv.path.is_ident("id") {
                id = lit_str(&nv.value);
            } else if nv.path.is_ident("state_schema") {
                state_schema = lit_str(&nv.value);
            } else if nv.path.is_ident("capabilities") {
                capabilities = lit_str(&nv.value);
            } else if nv.path.is_ident("abi_version") {
                if let syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Int(lit), .. }) = nv.value {
                    abi_version = Some(lit);
                }
            }
        }

        Ok(ServiceAttributes {
            id: id.ok_or_else(|| input.error("Missing `id` attribute"))?,
            abi_version: abi_version
                .ok_or_else(|| input.error("Missing `abi_version` attribute"))?,
            state_schema: state_schema
                .ok_or_else(|| input.error("Missing `state_schema` attribute"))?,
            capabilities,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Permission {
    User,
    Governance,
    Internal,
}

/// Reads `#[method]`, `#[method(governance)]` or `#[method(internal)]`.
fn method_permission(attr: &Attribute) -> syn::Result<Permission> {
    match &attr.meta {
        Meta::Path(_) => Ok(Permission::User),
        Meta::List(_) => {
            let ident: syn::Ident = attr.parse_args()?;
            match ident.to_string().as_str() {
                "user" => Ok(Permission::User),
                "governance" => Ok(Permission::Governance),
                "internal" => Ok(Permission::Internal),
                other => Err(syn::Error::new_spanned(
                    ident,
                    format!("unknown method permission `{other}`"),
                )),
            }
        }
        Meta::NameValue(nv) => Err(syn::Error::new_spanned(nv, "expected #[method(permission)]")),
    }
}

/// Generates a `BlockchainService` implementation for an inherent impl block.
///
/// Every fn marked `#[method]` becomes dispatchable as `"<name>@v1"`. Its
/// third argument is decoded from the call params with the canonical codec.
/// `#[method(governance)]` requires the signer to satisfy the stored
/// governance policy; `#[method(internal)]` requires a chain-initiated call.
#[proc_macro_attribute]
pub fn service_interface(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as ServiceAttributes);
    let mut item_impl = parse_macro_input!(input as ItemImpl);

    let struct_name = item_impl.self_ty.clone();
    let service_id = args.id.value();
    let abi_version = args.abi_version;
    let state_schema = args.state_schema;
    let caps_string = args
        .capabilities
        .as_ref()
        .map(|l| l.value())
        .unwrap_or_default();

    let mut cap_flags = quote! { xco_types::service_configs::Capabilities::empty() };
    for cap in caps_string.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let cap_ident = format_ident!("{}", cap);
        cap_flags = quote! { #cap_flags | xco_types::service_configs::Capabilities::#cap_ident };
    }

    let as_on_end_block = if caps_string.contains("ON_END_BLOCK") {
        quote! {
            fn as_on_end_block(&self) -> Option<&dyn xco_api::lifecycle::OnEndBlock> {
                Some(self)
            }
        }
    } else {
        quote! {}
    };

    let mut match_arms = Vec::new();
    let mut method_table = Vec::new();

    for item in &mut item_impl.items {
        let ImplItem::Fn(method) = item else { continue };
        let mut permission = None;
        let mut error = None;
        method.attrs.retain(|attr| {
            if attr.path().is_ident("method") {
                match method_permission(attr) {
                    Ok(p) => permission = Some(p),
                    Err(e) => error = Some(e),
                }
                false
            } else {
                true
            }
        });
        if let Some(e) = error {
            return e.to_compile_error().into();
        }
        let Some(permission) = permission else { continue };

        let method_name = &method.sig.ident;
        let method_str = format!("{}@v1", method_name);

        let guard = match permission {
            Permission::User => quote! {},
            Permission::Governance => quote! {
                xco_api::governance::require_governance(&*state, ctx)?;
            },
            Permission::Internal => quote! {
                xco_api::governance::require_internal(ctx, #method_str)?;
            },
        };
        let perm_tokens = match permission {
            Permission::User => quote! { xco_types::service_configs::MethodPermission::User },
            Permission::Governance => {
                quote! { xco_types::service_configs::MethodPermission::Governance }
            }
            Permission::Internal => quote! { xco_types::service_configs::MethodPermission::Internal },
        };
        method_table.push(quote! { (#method_str, #perm_tokens) });

        // Signature: fn name(&self, state: &mut dyn StateAccess, params: P, ctx: &mut TxContext)
        let param_type = method.sig.inputs.iter().nth(2).and_then(|arg| match arg {
            FnArg::Typed(pat_type) if method.sig.inputs.len() == 4 => Some(*pat_type.ty.clone()),
            _ => None,
        });

        match param_type {
            Some(p_type) => match_arms.push(quote! {
                #method_str => {
                    #guard
                    let p: #p_type = xco_types::codec::from_bytes_canonical(params)
                        .map_err(xco_types::error::TransactionError::Deserialization)?;
                    self.#method_name(state, p, ctx)
                        .map_err(xco_types::error::TransactionError::from)?;
                    Ok(())
                }
            }),
            None => match_arms.push(quote! {
                #method_str => {
                    #guard
                    self.#method_name(state, ctx)
                        .map_err(xco_types::error::TransactionError::from)?;
                    Ok(())
                }
            }),
        }
    }

    let dispatch_impl = quote! {
        impl #struct_name {
            /// Dispatchable methods and the permission each requires.
            pub const METHODS: &'static [(&'static str, xco_types::service_configs::MethodPermission)] = &[
                #(#method_table),*
            ];
        }

        #[async_trait::async_trait]
        impl xco_api::services::BlockchainService for #struct_name {
            fn id(&self) -> &str {
                #service_id
            }

            fn abi_version(&self) -> u32 {
                #abi_version
            }

            fn state_schema(&self) -> &str {
                #state_schema
            }

            fn capabilities(&self) -> xco_types::service_configs::Capabilities {
                #cap_flags
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            #as_on_end_block

            async fn handle_service_call(
                &self,
                state: &mut dyn xco_api::state::StateAccess,
                method: &str,
                params: &[u8],
                ctx: &mut xco_api::transaction::context::TxContext<'_>,
            ) -> Result<(), xco_types::error::TransactionError> {
                let _ = &params;
                match method {
                    #(#match_arms)*
                    _ => Err(xco_types::error::TransactionError::Unsupported(format!(
                        "Service '{}' does not support method '{}'",
                        self.id(),
                        method
                    ))),
                }
            }
        }
    };

    let output = quote! {
        #item_impl
        #dispatch_impl
    };

    TokenStream::from(output)
}
