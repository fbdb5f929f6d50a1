//! Shared post-processing for the strategy family (spec.md §4.6): a
//! bounded-length truncation rule applied to every strategy's output
//! template before it becomes a `Prediction`.

/// Truncation only breaks at a boundary past this fraction of
/// `max_length`; below it, a hard cut is preferred over chopping the
/// template down to a sliver.
const BOUNDARY_RATIO: f64 = 0.7;

/// Truncates `text` to at most `max_length` characters:
/// 1. Cut at `max_length`.
/// 2. Prefer the last `.` before the cut if it falls past 70% of
///    `max_length`; keep up to and including it.
/// 3. Else prefer the last `\n` under the same rule.
/// 4. Else hard-cut, appending `"..."` when `add_suffix` is set.
pub fn truncate(text: &str, max_length: usize, add_suffix: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.to_string();
    }

    let cut: String = chars[..max_length].iter().collect();
    let boundary = (max_length as f64 * BOUNDARY_RATIO).floor() as usize;

    if let Some(pos) = cut.rfind('.') {
        if pos >= boundary {
            return cut[..=pos].to_string();
        }
    }

    if let Some(pos) = cut.rfind('\n') {
        if pos >= boundary {
            return cut[..pos].to_string();
        }
    }

    if add_suffix {
        format!("{cut}...")
    } else {
        cut
    }
}
