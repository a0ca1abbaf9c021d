//! JavaScript snippets executed through the WebDriver script endpoint
//!
//! Each script receives the target element as `arguments[0]`.

/// Scripted click, used when the driver rejects a native click
pub const SCRIPT_CLICK: &str = "arguments[0].click(); return true;";

/// Scripted value assignment
///
/// Goes through the native value setter so React-controlled inputs observe
/// the change, then fires `input` and `change`.
pub const SCRIPT_SET_VALUE: &str = r#"
const el = arguments[0];
const value = arguments[1];
const proto = Object.getPrototypeOf(el);
const descriptor = Object.getOwnPropertyDescriptor(proto, 'value');
if (descriptor && descriptor.set) {
    descriptor.set.call(el, value);
} else {
    el.value = value;
}
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
return true;
"#;

/// Scroll the element into the viewport
pub const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true); return true;";

/// Truthy once the document finished loading
pub const DOCUMENT_READY: &str = "return document.readyState === 'complete';";

/// Truthy when any form field fails native constraint validation
pub const HAS_INVALID_FIELD: &str =
    "return document.querySelectorAll('input:invalid, textarea:invalid, select:invalid').length > 0;";

/// Build an XPath string literal for `value`
///
/// XPath 1.0 has no escape sequences, so values holding both quote kinds are
/// assembled with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// XPath matching elements whose normalized text contains `needle`
/// (case-insensitive over ASCII letters)
pub fn text_contains_xpath(needle: &str) -> String {
    const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
    format!(
        "//*[contains(translate(normalize-space(.), '{}', '{}'), {})][not(*[contains(translate(normalize-space(.), '{}', '{}'), {})])]",
        UPPER,
        LOWER,
        xpath_literal(&needle.to_lowercase()),
        UPPER,
        LOWER,
        xpath_literal(&needle.to_lowercase()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("logout"), "'logout'");
        assert_eq!(xpath_literal("don't"), "\"don't\"");
        assert_eq!(
            xpath_literal(r#"a'b"c"#),
            r#"concat('a', "'", 'b"c')"#
        );
    }

    #[test]
    fn test_text_xpath_lowercases_needle() {
        let xpath = text_contains_xpath("Sign Out");
        assert!(xpath.contains("'sign out'"));
        assert!(xpath.starts_with("//*[contains(translate(normalize-space(.)"));
    }
}
