//! Single-pass scans over a bounded prefix of an hourly series

/// Index and item of the largest key among the first `window` items.
///
/// Items whose key is `None` are skipped. Ties keep the earliest item.
pub fn peak_in_window<I, F>(items: I, window: usize, key: F) -> Option<(usize, I::Item)>
where
    I: IntoIterator,
    F: Fn(&I::Item) -> Option<f64>,
{
    items
        .into_iter()
        .take(window)
        .enumerate()
        .filter_map(|(i, item)| key(&item).map(|k| (i, k, item)))
        .fold(None, |best: Option<(usize, f64, I::Item)>, (i, k, item)| match best {
            Some((_, best_key, _)) if k <= best_key => best,
            _ => Some((i, k, item)),
        })
        .map(|(i, _, item)| (i, item))
}

/// Count of items matching `predicate` among the first `window`, and how many were looked at
pub fn count_in_window<I, F>(items: I, window: usize, predicate: F) -> (usize, usize)
where
    I: IntoIterator,
    F: Fn(&I::Item) -> bool,
{
    items
        .into_iter()
        .take(window)
        .fold((0, 0), |(matched, seen), item| {
            (matched + usize::from(predicate(&item)), seen + 1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_respects_window() {
        let values = [Some(1.0), Some(5.0), Some(3.0), Some(99.0)];
        let peak = peak_in_window(values.iter(), 3, |v| **v);
        assert_eq!(peak, Some((1, &Some(5.0))));
    }

    #[test]
    fn test_peak_skips_missing() {
        let values = [None, Some(2.0), None];
        assert_eq!(peak_in_window(values.iter(), 12, |v| **v).map(|p| p.0), Some(1));
        let empty: [Option<f64>; 2] = [None, None];
        assert_eq!(peak_in_window(empty.iter(), 12, |v| **v), None);
    }

    #[test]
    fn test_peak_ties_keep_first() {
        let values = [Some(7.0), Some(7.0)];
        assert_eq!(peak_in_window(values.iter(), 2, |v| **v).map(|p| p.0), Some(0));
    }

    #[test]
    fn test_count() {
        let values = [1, 2, 3, 4, 5, 6];
        assert_eq!(count_in_window(values.iter(), 4, |v| **v % 2 == 0), (2, 4));
        assert_eq!(count_in_window(values.iter(), 100, |v| **v > 4), (2, 6));
        assert_eq!(count_in_window(values.iter(), 0, |_| true), (0, 0));
    }
}
