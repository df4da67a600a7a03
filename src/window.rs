use crate::Price;

/// One full window of the rolling sum.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Window<'a> {
    /// Index of the last value in the window; the anchoring bar.
    pub end: usize,
    pub values: &'a [Price],
    pub sum: Price,
    /// Every value in the window is the same.
    pub constant: bool,
}

impl Window<'_> {
    /// Arithmetic mean of the window.
    ///
    /// A constant window returns its value unchanged; dividing the running
    /// sum would be off by an ULP for prices like `100.1`.
    #[inline]
    pub fn mean(&self) -> Price {
        if self.constant {
            self.values[0]
        } else {
            #[allow(clippy::cast_precision_loss)]
            let length = self.values.len() as f64;
            self.sum / length
        }
    }
}

/// Sliding window over a slice with an O(1) running sum.
///
/// Yields one [`Window`] per full window, `values.len() - size + 1` in total,
/// or nothing when the slice is shorter than `size`.
#[derive(Clone, Debug)]
pub(crate) struct RollingSum<'a> {
    values: &'a [Price],
    size: usize,
    next_end: usize,
    /// Running sum of values in the window. Maintained incrementally via
    /// add/subtract, may accumulate FP rounding drift over very long runs,
    /// but negligible for typical window sizes on financial data.
    sum: Price,
    /// Length of the run of equal values ending at the last yielded value.
    run: usize,
}

impl<'a> RollingSum<'a> {
    pub fn new(values: &'a [Price], size: usize) -> Self {
        debug_assert!(size > 0, "window size must be positive");

        Self {
            values,
            size,
            next_end: size.saturating_sub(1),
            sum: 0.0,
            run: 0,
        }
    }
}

impl<'a> Iterator for RollingSum<'a> {
    type Item = Window<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let end = self.next_end;
        if self.size == 0 || end >= self.values.len() {
            return None;
        }

        if end + 1 == self.size {
            let first = &self.values[..self.size];
            self.sum = first.iter().fold(0.0, |acc, v| acc + v);
            self.run = 1 + first
                .windows(2)
                .rev()
                .take_while(|pair| same(pair[0], pair[1]))
                .count();
        } else {
            self.sum -= self.values[end - self.size];
            self.sum += self.values[end];
            self.run = if same(self.values[end - 1], self.values[end]) {
                self.run + 1
            } else {
                1
            };
        }

        self.next_end += 1;

        Some(Window {
            end,
            values: &self.values[end + 1 - self.size..=end],
            sum: self.sum,
            constant: self.run >= self.size,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len().saturating_sub(self.next_end);
        let remaining = if self.size == 0 { 0 } else { remaining };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingSum<'_> {}

#[inline]
#[allow(clippy::float_cmp)]
fn same(a: Price, b: Price) -> bool {
    a == b
}
