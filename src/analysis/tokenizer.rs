/// Splits `text` on non-alphabetic boundaries, lowercasing as it goes.
/// Empty fragments are dropped, so the output contains only non-empty
/// lowercase alphabetic tokens in source order.
pub fn clean_split(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
}
