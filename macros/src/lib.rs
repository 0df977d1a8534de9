use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, GenericArgument, PathArguments, Type, parse_macro_input};

/// Derive `cfgbind::Bind` for a struct with named fields.
///
/// Fields opt in with `#[bind(cmd = "name|usage", env = "KEY")]`, nested
/// records with `#[bind(nested)]`. Fields without `#[bind]` are not visited.
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_bind(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_bind(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Bind can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Bind can only be derived for structs",
            ));
        }
    };

    let mut visits = Vec::new();

    for field in fields {
        let Some(config) = parse_bind_attrs(&field.attrs)? else {
            continue;
        };
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };

        if config.nested {
            visits.push(quote! {
                ::cfgbind::Bind::visit(&mut self.#field_name, visitor)?;
            });
            continue;
        }

        let name = field_name.to_string();
        let cmd = config.cmd.unwrap_or_default();
        let env = config.env.unwrap_or_default();
        let field_type = &field.ty;

        let slot = if is_leaf(field_type) {
            quote! { ::cfgbind::Slot::from(&mut self.#field_name) }
        } else {
            let type_name = quote!(#field_type).to_string().replace(' ', "");
            quote! { ::cfgbind::Slot::Unsupported(#type_name) }
        };

        visits.push(quote! {
            ::cfgbind::Visitor::visit_field(
                &mut *visitor,
                ::cfgbind::Field {
                    name: #name,
                    cmd: #cmd,
                    env: #env,
                    slot: #slot,
                },
            )?;
        });
    }

    Ok(quote! {
        impl #impl_generics ::cfgbind::Bind for #struct_name #ty_generics #where_clause {
            fn visit(
                &mut self,
                visitor: &mut dyn ::cfgbind::Visitor,
            ) -> ::core::result::Result<(), ::cfgbind::BindError> {
                #(#visits)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

#[derive(Debug, Default)]
struct BindConfig {
    cmd: Option<String>,
    env: Option<String>,
    nested: bool,
}

/// Parse every `#[bind(...)]` on a field. Returns `None` when there is none.
fn parse_bind_attrs(attrs: &[Attribute]) -> syn::Result<Option<BindConfig>> {
    let mut config: Option<BindConfig> = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("bind")) {
        let current = config.get_or_insert_with(BindConfig::default);

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("cmd") {
                let value: syn::LitStr = meta.value()?.parse()?;
                current.cmd = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("env") {
                let value: syn::LitStr = meta.value()?.parse()?;
                current.env = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("nested") {
                current.nested = true;
                Ok(())
            } else {
                Err(meta.error("expected one of: cmd = \"...\", env = \"...\", nested"))
            }
        })?;

        if current.nested && (current.cmd.is_some() || current.env.is_some()) {
            return Err(syn::Error::new_spanned(
                attr,
                "nested records have no bindings of their own; bind their fields instead",
            ));
        }
    }

    Ok(config)
}

/// Whether `ty` is one of the leaf types a `Slot` can hold.
fn is_leaf(ty: &Type) -> bool {
    match last_segment(ty) {
        Some(segment) if segment.ident == "Vec" => {
            if let PathArguments::AngleBracketed(args) = &segment.arguments
                && let Some(GenericArgument::Type(inner)) = args.args.first()
            {
                return last_segment(inner).is_some_and(|s| s.ident == "i32");
            }
            false
        }
        Some(segment) => {
            matches!(segment.arguments, PathArguments::None)
                && ["String", "i32", "i64", "bool", "f64"]
                    .iter()
                    .any(|leaf| segment.ident == leaf)
        }
        None => false,
    }
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path.path.segments.last(),
        _ => None,
    }
}
