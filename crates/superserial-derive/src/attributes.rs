use syn::{Attribute, LitStr};

const ATTRIBUTE_NAME: &str = "superserial";

#[derive(Default)]
pub(crate) struct StructAttributes {
    pub type_name: Option<LitStr>,
}

impl StructAttributes {
    /// Parses `#[superserial(type_name = "...")]`.
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("type_name") {
                    let name: LitStr = meta.value()?.parse()?;
                    if name.value().is_empty() {
                        return Err(meta.error("type_name cannot be empty"));
                    }
                    parsed.type_name = Some(name);
                    Ok(())
                } else {
                    Err(meta.error("unsupported superserial attribute, expected `type_name`"))
                }
            })?;
        }
        Ok(parsed)
    }
}

#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub skip: bool,
}

impl FieldAttributes {
    /// Parses `#[superserial(rename = "...")]` and `#[superserial(skip)]`.
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    parsed.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    Ok(())
                } else {
                    Err(meta.error(
                        "unsupported superserial field attribute, expected `rename` or `skip`",
                    ))
                }
            })?;
        }
        Ok(parsed)
    }
}
