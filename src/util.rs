pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Whole-number percentage `part / whole`, or `None` when `whole` is zero
pub fn percent(part: usize, whole: usize) -> Option<u32> {
    if whole == 0 {
        return None;
    }
    Some(((part as f64 / whole as f64) * 100.0).round() as u32)
}

/// Whitespace-separated tokens in the trimmed text
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
