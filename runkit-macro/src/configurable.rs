use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Field, Fields, GenericArgument, LitStr, PathArguments,
    Type,
};

pub fn derive_configurable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    generate_configurable_impl(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Field kinds understood by `runkit::config::Schema`
enum Kind {
    Bool,
    Int,
    String,
    StringList,
}

impl Kind {
    fn builder_method(&self) -> TokenStream2 {
        match self {
            Kind::Bool => quote!(bool),
            Kind::Int => quote!(int),
            Kind::String => quote!(string),
            Kind::StringList => quote!(string_list),
        }
    }
}

#[derive(Default)]
struct FieldAttrs {
    description: Option<LitStr>,
    rename: Option<LitStr>,
    skip: bool,
}

fn generate_configurable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "#[derive(Configurable)] only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Configurable)] can only be applied to structs",
            ))
        }
    };

    let mut registrations = Vec::new();
    for field in fields {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let Some(ident) = &field.ident else {
            continue;
        };

        let description = attrs.description.ok_or_else(|| {
            syn::Error::new_spanned(
                ident,
                format!("field `{ident}` has no description; add #[config(description = \"...\")]"),
            )
        })?;

        let kind = field_kind(&field.ty).ok_or_else(|| {
            let ty = &field.ty;
            syn::Error::new_spanned(
                ty,
                format!(
                    "field type `{}` is not supported for field `{ident}`; \
                     expected bool, i64, String or Vec<String>",
                    quote!(#ty)
                ),
            )
        })?;

        let name = match attrs.rename {
            Some(rename) => rename.value(),
            None => ident.to_string().trim_start_matches("r#").to_owned(),
        };
        let method = kind.builder_method();

        registrations.push(quote! {
            schema.#method(#name, #description, |config| &mut config.#ident);
        });
    }

    Ok(quote! {
        impl #impl_generics ::runkit::config::Configurable for #struct_name #ty_generics #where_clause {
            fn describe(schema: &mut ::runkit::config::Schema<Self>) {
                #(#registrations)*
            }
        }
    })
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("config")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("description") {
                attrs.description = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("rename") {
                attrs.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown config attribute; expected `description`, `rename` or `skip`"))
            }
        })?;
    }

    Ok(attrs)
}

/// Map a field type onto a schema kind by its last path segment
fn field_kind(ty: &Type) -> Option<Kind> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;

    match segment.ident.to_string().as_str() {
        "bool" => Some(Kind::Bool),
        "i64" => Some(Kind::Int),
        "String" => Some(Kind::String),
        "Vec" => {
            let PathArguments::AngleBracketed(args) = &segment.arguments else {
                return None;
            };
            match args.args.first() {
                Some(GenericArgument::Type(Type::Path(inner)))
                    if inner.path.is_ident("String") =>
                {
                    Some(Kind::StringList)
                }
                _ => None,
            }
        }
        _ => None,
    }
}
