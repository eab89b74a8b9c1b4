use proc_macro_error2::abort;
use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Path, Token};

/// Role names accepted in `role = "..."` and `exclude(...)`, paired with the
/// `fastforge_permissions::Role` variant they denote.
///
/// Mirrors `Role::as_str`; proc-macro crates cannot depend on runtime crates.
const ROLES: &[(&str, &str)] = &[
    ("public", "Public"),
    ("users", "Users"),
    ("user", "User"),
    ("admin", "Admin"),
    ("superadmin", "SuperAdmin"),
];

/// Configuration parsed from `#[model(...)]`
#[derive(Default)]
struct ModelAttrs {
    name: Option<LitStr>,
    extends: Vec<Path>,
}

enum Target {
    Role(Ident),
    AllRoles { exclude: Vec<Ident> },
}

/// One `#[permissions(...)]` attribute
struct PermissionsAttr {
    target: Target,
    fields: Vec<LitStr>,
    overwrite: bool,
}

#[allow(clippy::needless_pass_by_value)] // DeriveInput is consumed by proc-macro pattern
pub fn expand_derive_model(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => abort!(err.span(), "{}", err),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = struct_fields(input)?;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Model)] does not support generic parameters",
        ));
    }
    let model = parse_model_attrs(&input.attrs)?;
    let permissions = input
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("permissions"))
        .map(parse_permissions_attr)
        .collect::<syn::Result<Vec<_>>>()?;

    let ident = &input.ident;
    let name = model
        .name
        .map_or_else(|| ident.unraw().to_string(), |lit| lit.value());
    let bases = &model.extends;
    let declarations = permissions.iter().map(PermissionsAttr::to_declaration);

    Ok(quote! {
        impl ::fastforge_permissions::Model for #ident {
            fn descriptor() -> &'static ::fastforge_permissions::ModelDescriptor {
                const FIELDS: &[&str] = &[#(#fields),*];
                const BASES: &[::fastforge_permissions::DescriptorFn] =
                    &[#(<#bases as ::fastforge_permissions::Model>::descriptor),*];
                static DESCRIPTOR: ::fastforge_permissions::ModelDescriptor =
                    ::fastforge_permissions::ModelDescriptor::new(#name, FIELDS, BASES);
                &DESCRIPTOR
            }
        }

        ::fastforge_permissions::inventory::submit! {
            ::fastforge_permissions::DeclaredPermissions::new(
                <#ident as ::fastforge_permissions::Model>::descriptor,
                {
                    const DECLARATIONS: &[::fastforge_permissions::Declaration] =
                        &[#(#declarations),*];
                    DECLARATIONS
                },
            )
        }
    })
}

/// Rust names of the struct's fields, without the `r#` prefix.
fn struct_fields(input: &DeriveInput) -> syn::Result<Vec<String>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "#[derive(Model)] can only be applied to structs",
        ));
    };
    match &data.fields {
        Fields::Named(named) => Ok(named
            .named
            .iter()
            .filter_map(|field| field.ident.as_ref())
            .map(|ident| ident.unraw().to_string())
            .collect()),
        Fields::Unit => Ok(Vec::new()),
        Fields::Unnamed(unnamed) => Err(syn::Error::new_spanned(
            unnamed,
            "#[derive(Model)] requires named fields",
        )),
    }
}

fn parse_model_attrs(attrs: &[Attribute]) -> syn::Result<ModelAttrs> {
    let mut config = ModelAttrs::default();
    let mut extends_seen = false;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                if config.name.is_some() {
                    return Err(meta.error("duplicate attribute `name`"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(syn::Error::new(lit.span(), "model name must not be empty"));
                }
                config.name = Some(lit);
                return Ok(());
            }

            if meta.path.is_ident("extends") {
                if extends_seen {
                    return Err(meta.error("duplicate attribute `extends`"));
                }
                extends_seen = true;
                return meta.parse_nested_meta(|base| {
                    let rendered = base.path.to_token_stream().to_string();
                    if config
                        .extends
                        .iter()
                        .any(|seen| seen.to_token_stream().to_string() == rendered)
                    {
                        return Err(base.error(format!("duplicate base model `{rendered}`")));
                    }
                    config.extends.push(base.path.clone());
                    Ok(())
                });
            }

            Err(meta.error("unknown attribute; expected `name` or `extends`"))
        })?;
    }

    Ok(config)
}

fn parse_permissions_attr(attr: &Attribute) -> syn::Result<PermissionsAttr> {
    let mut role: Option<Ident> = None;
    let mut all_roles: Option<Span> = None;
    let mut exclude: Option<(Vec<Ident>, Span)> = None;
    let mut fields: Option<Vec<LitStr>> = None;
    let mut overwrite = false;

    attr.parse_nested_meta(|meta| {
        let span = meta.path.span();

        if meta.path.is_ident("role") {
            if role.is_some() {
                return Err(meta.error("duplicate attribute `role`"));
            }
            let lit: LitStr = meta.value()?.parse()?;
            role = Some(role_variant(&lit)?);
        } else if meta.path.is_ident("all_roles") {
            if all_roles.is_some() {
                return Err(meta.error("duplicate attribute `all_roles`"));
            }
            all_roles = Some(span);
        } else if meta.path.is_ident("exclude") {
            if exclude.is_some() {
                return Err(meta.error("duplicate attribute `exclude`"));
            }
            let excluded = parse_str_list(&meta)?
                .iter()
                .map(role_variant)
                .collect::<syn::Result<Vec<_>>>()?;
            exclude = Some((excluded, span));
        } else if meta.path.is_ident("fields") {
            if fields.is_some() {
                return Err(meta.error("duplicate attribute `fields`"));
            }
            let list = parse_str_list(&meta)?;
            validate_field_names(&list)?;
            fields = Some(list);
        } else if meta.path.is_ident("overwrite") {
            if overwrite {
                return Err(meta.error("duplicate attribute `overwrite`"));
            }
            overwrite = true;
        } else {
            return Err(meta.error(
                "unknown attribute; expected `role`, `all_roles`, `exclude`, `fields` or `overwrite`",
            ));
        }
        Ok(())
    })?;

    let Some(fields) = fields else {
        return Err(syn::Error::new_spanned(
            attr,
            "permissions: missing `fields(...)`",
        ));
    };

    let target = match (role, all_roles, exclude) {
        (Some(role), None, None) => Target::Role(role),
        (None, Some(_), exclude) => Target::AllRoles {
            exclude: exclude.map_or_else(Vec::new, |(excluded, _)| excluded),
        },
        (Some(_), Some(span), _) => {
            return Err(syn::Error::new(
                span,
                "permissions: specify either `role` or `all_roles`, not both",
            ));
        }
        (Some(_), None, Some((_, span))) => {
            return Err(syn::Error::new(
                span,
                "permissions: `exclude` requires `all_roles`",
            ));
        }
        (None, None, _) => {
            return Err(syn::Error::new_spanned(
                attr,
                "permissions: missing `role = \"...\"` or `all_roles`",
            ));
        }
    };

    Ok(PermissionsAttr {
        target,
        fields,
        overwrite,
    })
}

/// Parse a parenthesized list of string literals: `("a", "b")`.
fn parse_str_list(meta: &ParseNestedMeta<'_>) -> syn::Result<Vec<LitStr>> {
    let content;
    syn::parenthesized!(content in meta.input);
    let list = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
    Ok(list.into_iter().collect())
}

fn validate_field_names(fields: &[LitStr]) -> syn::Result<()> {
    for (idx, lit) in fields.iter().enumerate() {
        let value = lit.value();
        if value.trim().is_empty() {
            return Err(syn::Error::new(
                lit.span(),
                "permissions: attribute name must not be empty",
            ));
        }
        if fields[..idx].iter().any(|prev| prev.value() == value) {
            return Err(syn::Error::new(
                lit.span(),
                format!("permissions: duplicate attribute name '{value}'"),
            ));
        }
    }
    Ok(())
}

fn role_variant(lit: &LitStr) -> syn::Result<Ident> {
    let value = lit.value();
    ROLES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value.trim()))
        .map(|(_, variant)| Ident::new(variant, lit.span()))
        .ok_or_else(|| {
            let known: Vec<&str> = ROLES.iter().map(|(name, _)| *name).collect();
            syn::Error::new(
                lit.span(),
                format!(
                    "unknown role '{value}'; expected one of: {}",
                    known.join(", ")
                ),
            )
        })
}

impl PermissionsAttr {
    fn to_declaration(&self) -> TokenStream {
        let fields = &self.fields;
        let overwrite = self.overwrite;
        match &self.target {
            Target::Role(role) => quote! {
                ::fastforge_permissions::Declaration::Grant {
                    role: ::fastforge_permissions::Role::#role,
                    attributes: &[#(#fields),*],
                    overwrite: #overwrite,
                }
            },
            Target::AllRoles { exclude } => quote! {
                ::fastforge_permissions::Declaration::AllRoles {
                    exclude: &[#(::fastforge_permissions::Role::#exclude),*],
                    attributes: &[#(#fields),*],
                    overwrite: #overwrite,
                }
            },
        }
    }
}
