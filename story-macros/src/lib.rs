//! Proc macros for model response schemas.
//!
//! Provides `#[derive(ResponseSchema)]` to generate the structured-output
//! schema sent to the generation service from a struct definition, so the
//! Rust type and the schema the model is asked to follow never drift apart.
//!
//! # Example
//!
//! ```ignore
//! /// Verdict on a story prompt
//! #[derive(ResponseSchema, Deserialize)]
//! #[schema(rename_all = "camelCase")]
//! struct SafetyValidation {
//!     /// Whether the content is appropriate for children
//!     is_appropriate: bool,
//!     /// Brief explanation
//!     reason: String,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, DeriveInput, Field, Lit, LitInt, LitStr, Meta, Type};

/// Derive macro for generating response schemas.
///
/// # Attributes
///
/// - `#[schema(rename_all = "camelCase")]` on the struct - Rename every field
/// - `#[schema(rename = "...")]` on fields - Override the field name in the schema
/// - `#[schema(min_items = N, max_items = M)]` on `Vec` fields - Bound the array length
#[proc_macro_derive(ResponseSchema, attributes(schema))]
pub fn derive_response_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_response_schema(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    min_items: Option<u64>,
    max_items: Option<u64>,
}

fn expand_response_schema(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let camel_case = get_rename_all(&input.attrs)?;
    let description = get_doc_comment(&input.attrs);

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "ResponseSchema derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "ResponseSchema derive only supports structs",
            ))
        }
    };

    let mut property_tokens = Vec::new();
    let mut required_fields = Vec::new();
    let mut ordering = Vec::new();

    for field in fields {
        let options = get_field_options(field)?;
        let field_name = schema_field_name(field, &options, camel_case)?;
        let field_desc = get_doc_comment(&field.attrs);
        let type_schema = type_to_schema(&field.ty)?;

        let desc_token = if field_desc.is_empty() {
            quote! {}
        } else {
            quote! { property["description"] = serde_json::json!(#field_desc); }
        };
        let min_token = options
            .min_items
            .map(|min| quote! { property["minItems"] = serde_json::json!(#min); });
        let max_token = options
            .max_items
            .map(|max| quote! { property["maxItems"] = serde_json::json!(#max); });

        property_tokens.push(quote! {
            {
                let mut property = #type_schema;
                #desc_token
                #min_token
                #max_token
                properties.insert(#field_name.to_string(), property);
            }
        });

        if !is_option_type(&field.ty) {
            required_fields.push(field_name.clone());
        }
        ordering.push(field_name);
    }

    let description_token = if description.is_empty() {
        quote! {}
    } else {
        quote! { schema["description"] = serde_json::json!(#description); }
    };

    Ok(quote! {
        impl #struct_name {
            /// Description taken from the type's doc comment.
            pub fn schema_description() -> &'static str {
                #description
            }

            /// Structured-output schema for this type.
            pub fn response_schema() -> serde_json::Value {
                let mut properties = serde_json::Map::new();
                #(#property_tokens)*

                let required: Vec<&str> = vec![#(#required_fields),*];
                let ordering: Vec<&str> = vec![#(#ordering),*];

                let mut schema = serde_json::json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required,
                    "propertyOrdering": ordering
                });
                #description_token
                schema
            }
        }
    })
}

fn get_rename_all(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut camel_case = false;
    for attr in attrs {
        if attr.path().is_ident("schema") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value() != "camelCase" {
                        return Err(meta.error("only rename_all = \"camelCase\" is supported"));
                    }
                    camel_case = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported schema attribute"))
                }
            })?;
        }
    }
    Ok(camel_case)
}

fn get_field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in &field.attrs {
        if attr.path().is_ident("schema") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    options.rename = Some(value.value());
                } else if meta.path.is_ident("min_items") {
                    let value: LitInt = meta.value()?.parse()?;
                    options.min_items = Some(value.base10_parse()?);
                } else if meta.path.is_ident("max_items") {
                    let value: LitInt = meta.value()?.parse()?;
                    options.max_items = Some(value.base10_parse()?);
                } else {
                    return Err(meta.error("unsupported schema attribute"));
                }
                Ok(())
            })?;
        }
    }
    Ok(options)
}

fn schema_field_name(field: &Field, options: &FieldOptions, camel_case: bool) -> syn::Result<String> {
    if let Some(rename) = &options.rename {
        return Ok(rename.clone());
    }
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let name = ident.to_string();
    let name = name.strip_prefix("r#").unwrap_or(&name).to_string();
    Ok(if camel_case { to_camel_case(&name) } else { name })
}

fn get_doc_comment(attrs: &[Attribute]) -> String {
    let mut docs = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("doc") {
            if let Meta::NameValue(nv) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &nv.value {
                    if let Lit::Str(s) = &expr_lit.lit {
                        docs.push(s.value().trim().to_string());
                    }
                }
            }
        }
    }
    docs.join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}

fn first_generic(segment: &syn::PathSegment) -> Option<&Type> {
    if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
        if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
            return Some(inner);
        }
    }
    None
}

fn type_to_schema(ty: &Type) -> syn::Result<TokenStream2> {
    let Type::Path(type_path) = ty else {
        return Err(syn::Error::new_spanned(ty, "unsupported field type"));
    };
    let Some(segment) = type_path.path.segments.last() else {
        return Err(syn::Error::new_spanned(ty, "unsupported field type"));
    };

    Ok(match segment.ident.to_string().as_str() {
        "String" | "str" => quote! { serde_json::json!({"type": "STRING"}) },
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            quote! { serde_json::json!({"type": "INTEGER"}) }
        }
        "f32" | "f64" => quote! { serde_json::json!({"type": "NUMBER"}) },
        "bool" => quote! { serde_json::json!({"type": "BOOLEAN"}) },
        "Option" => match first_generic(segment) {
            Some(inner) => {
                let inner_schema = type_to_schema(inner)?;
                quote! {
                    {
                        let mut inner = #inner_schema;
                        inner["nullable"] = serde_json::json!(true);
                        inner
                    }
                }
            }
            None => return Err(syn::Error::new_spanned(ty, "Option needs a type argument")),
        },
        "Vec" => match first_generic(segment) {
            Some(inner) => {
                let inner_schema = type_to_schema(inner)?;
                quote! {
                    serde_json::json!({
                        "type": "ARRAY",
                        "items": #inner_schema
                    })
                }
            }
            None => return Err(syn::Error::new_spanned(ty, "Vec needs a type argument")),
        },
        // Nested structs must derive ResponseSchema themselves
        _ => quote! { <#ty>::response_schema() },
    })
}

fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut upper_next = false;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}
