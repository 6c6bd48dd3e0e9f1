/// Merge two ascending slices into `dest`. On equal elements the left
/// side goes first, so the merge is stable.
///
/// Panics if `dest` is not exactly as long as both inputs together.
pub fn merge<T: Ord + Clone>(left: &[T], right: &[T], dest: &mut [T]) {
    assert_eq!(
        dest.len(),
        left.len() + right.len(),
        "merge destination holds {} elements, inputs hold {} + {}",
        dest.len(),
        left.len(),
        right.len()
    );

    let mut i = 0;
    let mut j = 0;
    let mut k = 0;

    while i < left.len() && j < right.len() {
        if left[i] <= right[j] {
            dest[k] = left[i].clone();
            i += 1;
        } else {
            dest[k] = right[j].clone();
            j += 1;
        }
        k += 1;
    }

    // One side is exhausted; the other is copied as is.
    dest[k..k + left.len() - i].clone_from_slice(&left[i..]);
    k += left.len() - i;
    dest[k..].clone_from_slice(&right[j..]);
}

/// Merge into a freshly allocated vector.
pub fn merged<T: Ord + Clone>(left: &[T], right: &[T]) -> Vec<T> {
    let mut dest = Vec::with_capacity(left.len() + right.len());
    dest.extend_from_slice(left);
    dest.extend_from_slice(right);
    merge(left, right, &mut dest);
    dest
}

pub fn is_sorted<T: Ord>(items: &[T]) -> bool {
    items.windows(2).all(|w| w[0] <= w[1])
}
