use regex::Regex;

use crate::core::error::Result;

/// Reduces an HTML page to the text the tokenizer should see: comments,
/// non-content elements, and tags removed, common entities decoded.
pub struct HtmlStripper {
    comments: Regex,
    blocks: Regex,
    tags: Regex,
    entities: Regex,
}

impl HtmlStripper {
    pub fn new() -> Result<Self> {
        Ok(HtmlStripper {
            comments: Regex::new(r"(?s)<!--.*?-->")?,
            blocks: Regex::new(
                r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<head\b.*?</head\s*>|<noscript\b.*?</noscript\s*>|<svg\b.*?</svg\s*>",
            )?,
            tags: Regex::new(r"(?s)<[^>]*>")?,
            entities: Regex::new(r"&(#x?[0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);")?,
        })
    }

    /// Stripping order matters: comments can hide partial tags, block
    /// elements can hold markup-like payloads, and entities only decode
    /// once no tag can absorb the replacement text.
    pub fn strip(&self, html: &str) -> String {
        let text = self.comments.replace_all(html, " ");
        let text = self.blocks.replace_all(&text, " ");
        let text = self.tags.replace_all(&text, " ");
        self.entities
            .replace_all(&text, |capture: &regex::Captures| {
                decode_entity(&capture[1]).unwrap_or_else(|| capture[0].to_string())
            })
            .into_owned()
    }
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(digits) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        let code = u32::from_str_radix(digits, 16).ok()?;
        return char::from_u32(code).map(String::from);
    }
    if let Some(digits) = name.strip_prefix('#') {
        let code: u32 = digits.parse().ok()?;
        return char::from_u32(code).map(String::from);
    }
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "copy" => "\u{A9}",
        "reg" => "\u{AE}",
        _ => return None,
    };
    Some(decoded.to_string())
}
