//! Bounded text helpers for the small panel and fixed-capacity buffers.

use core::fmt::Write as _;

use heapless::String;

/// Appends as many whole characters of `source` as fit in `out`.
///
/// Returns `false` when something had to be dropped.
pub fn push_truncated<const N: usize>(out: &mut String<N>, source: &str) -> bool {
    for ch in source.chars() {
        if out.push(ch).is_err() {
            return false;
        }
    }
    true
}

/// Copies `source` into a fixed-capacity string, dropping the overflow.
pub fn bounded<const N: usize>(source: &str) -> String<N> {
    let mut out = String::new();
    let _ = push_truncated(&mut out, source);
    out
}

/// Leading `max_chars` characters of `source`.
pub fn head_chars(source: &str, max_chars: usize) -> &str {
    match source.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &source[..byte_index],
        None => source,
    }
}

/// Trailing `max_chars` characters of `source`.
pub fn tail_chars(source: &str, max_chars: usize) -> &str {
    let total = source.chars().count();
    if total <= max_chars {
        return source;
    }
    match source.char_indices().nth(total - max_chars) {
        Some((byte_index, _)) => &source[byte_index..],
        None => "",
    }
}

/// Shortens `source` to `max_chars`, ending with `..` when cut.
pub fn ellipsize<const N: usize>(source: &str, max_chars: usize) -> String<N> {
    let mut out = String::new();
    if source.chars().count() <= max_chars {
        let _ = push_truncated(&mut out, source);
        return out;
    }

    let keep = max_chars.saturating_sub(2);
    let _ = push_truncated(&mut out, head_chars(source, keep));
    let _ = out.push_str("..");
    out
}

/// Removes the last character; returns `false` when already empty.
pub fn pop_char<const N: usize>(buffer: &mut String<N>) -> bool {
    buffer.pop().is_some()
}

/// Uppercases a lowercase ASCII letter when it starts a station name.
pub fn station_char(field_is_empty: bool, ch: char) -> char {
    if field_is_empty && ch.is_ascii_lowercase() {
        ch.to_ascii_uppercase()
    } else {
        ch
    }
}

/// Formats `value` into a short fixed buffer.
pub fn format_u32<const N: usize>(value: u32) -> String<N> {
    let mut out = String::new();
    let _ = write!(out, "{}", value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_and_tail_respect_char_boundaries() {
        assert_eq!(head_chars("Zürich HB", 3), "Zür");
        assert_eq!(tail_chars("Zürich HB", 2), "HB");
        assert_eq!(tail_chars("abc", 10), "abc");
        assert_eq!(head_chars("", 4), "");
    }

    #[test]
    fn bounded_copy_drops_overflow() {
        let out: String<4> = bounded("Lausanne");
        assert_eq!(out.as_str(), "Laus");
    }

    #[test]
    fn ellipsize_marks_cut_text() {
        let out: String<16> = ellipsize("Lausanne -> Geneve", 10);
        assert_eq!(out.as_str(), "Lausanne..");

        let short: String<16> = ellipsize("Bern", 10);
        assert_eq!(short.as_str(), "Bern");
    }

    #[test]
    fn station_names_start_uppercase() {
        assert_eq!(station_char(true, 'b'), 'B');
        assert_eq!(station_char(false, 'b'), 'b');
        assert_eq!(station_char(true, ' '), ' ');
    }
}
