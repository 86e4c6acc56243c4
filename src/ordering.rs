use std::cmp::Ordering;

/// Compare file names so numbered slices land in ascending numeric order
/// even without zero padding ("slice_2" before "slice_10"). Names without
/// digits follow every numbered name, in lexicographic order.
pub fn slice_order(a: &str, b: &str) -> Ordering {
    match (leading_number(a), leading_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// First run of ASCII digits in the name, as a number. Runs too long for
/// u128 are treated as unnumbered.
fn leading_number(name: &str) -> Option<u128> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let rest = &name[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
