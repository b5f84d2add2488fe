use crate::token::RawAttribute;

pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns";
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
pub const XLINK_URI: &str = "http://www.w3.org/1999/xlink";
pub const XSI_URI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Canonical prefix of a reserved namespace, regardless of the prefix used in the source.
pub fn reserved_prefix(uri: &str) -> Option<&'static str> {
    match uri {
        XMLNS_URI => Some("xmlns"),
        XML_URI => Some("xml"),
        XLINK_URI => Some("xlink"),
        XSI_URI => Some("xsi"),
        _ => None,
    }
}

/// Name under which an attribute is stored on its node.
///
/// - `xmlns:foo="http://www.w3.org/1999/xlink" foo:href="x"` -> `"xlink:href"`
/// - `svg:width` bound to any other namespace -> `"svg:width"`
/// - `width` -> `"width"`
pub fn qualified_attribute_name(attr: &RawAttribute) -> String {
    match &attr.namespace {
        Some(uri) if !uri.is_empty() => {
            let prefix = reserved_prefix(uri)
                .or_else(|| attr.name.prefix.as_deref())
                .unwrap_or(uri);
            format!("{}:{}", prefix, attr.name.local)
        }
        _ => attr.name.local.clone(),
    }
}
