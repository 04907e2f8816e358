//! Greedy pixel-width word wrapping.

use crate::FontFace;

/// Wraps `content` so every emitted line measures narrower than `max_width`.
///
/// Each `'\n'`-separated line is wrapped on its own. Empty lines produce no
/// output. Breaks prefer the last whitespace inside the fitting prefix and fall
/// back to splitting mid-word. The whitespace run a line breaks on is dropped,
/// so continuation lines never start with a separator.
///
/// Finding a break re-measures every shorter prefix, so a line of `L` chars
/// costs up to `O(L^2)` measurements.
pub fn wrap_content(face: &dyn FontFace, content: &str, max_width: u32) -> Vec<String> {
    let mut wrapped = Vec::new();
    for line in content.split('\n') {
        wrap_line(face, line, max_width, &mut wrapped);
    }
    wrapped
}

fn wrap_line(face: &dyn FontFace, line: &str, max_width: u32, out: &mut Vec<String>) {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let len = chars.len();
    let byte_at = |i: usize| chars.get(i).map_or(line.len(), |&(b, _)| b);

    let mut start = 0;
    while start < len {
        // At least one char per line, even when nothing fits.
        let mut end = (start + 1..=len)
            .rev()
            .find(|&end| face.measure(&line[byte_at(start)..byte_at(end)]).width < max_width)
            .unwrap_or(start + 1);

        let mut next = end;
        if end < len {
            let is_space = |i: usize| chars[i].1.is_whitespace();
            if !is_space(end) {
                if let Some(space) = (start + 1..end).rev().find(|&i| is_space(i)) {
                    end = space;
                }
            }
            // The whitespace run a line breaks on belongs to neither line.
            while end > start + 1 && is_space(end - 1) {
                end -= 1;
            }
            next = end;
            while next < len && is_space(next) {
                next += 1;
            }
        }

        out.push(line[byte_at(start)..byte_at(end)].to_string());
        start = next;
    }
}
