//! Batching of scanned items into fixed-size units of work.

use dynamo::Item;

/// One unit of work handed to a migration worker.
///
/// Items keep the order in which the source scan produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkBatch {
    items: Vec<Item>,
}

impl WorkBatch {
    /// Creates a batch from already ordered items.
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Returns the batched items in production order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Consumes the batch and returns its items.
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Returns the number of items in this batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether this batch holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Splits scanned items into consecutive batches of at most `max_size` items.
///
/// Every batch except possibly the last holds exactly `max_size` items, and
/// concatenating the batches in order reproduces the input sequence. An empty
/// input yields no batches.
///
/// # Panics
///
/// Panics when `max_size` is zero. Configuration validation rejects a zero
/// batch size before the pipeline starts.
pub fn split_into_batches(items: Vec<Item>, max_size: usize) -> Vec<WorkBatch> {
    assert!(max_size > 0, "batch max size must be non-zero");

    let mut batches = Vec::with_capacity(items.len().div_ceil(max_size));
    let mut remaining = items.into_iter();

    loop {
        let chunk: Vec<Item> = remaining.by_ref().take(max_size).collect();
        if chunk.is_empty() {
            break;
        }

        batches.push(WorkBatch::new(chunk));
    }

    batches
}

#[cfg(test)]
mod tests {
    use dynamo::AttributeValue;

    use super::*;

    fn items(count: usize) -> Vec<Item> {
        (0..count)
            .map(|index| Item::from([("user_id".to_owned(), AttributeValue::from(index as i64))]))
            .collect()
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(split_into_batches(Vec::new(), 2).is_empty());
    }

    #[test]
    fn uneven_input_leaves_a_short_trailing_batch() {
        let batches = split_into_batches(items(5), 2);

        let sizes: Vec<usize> = batches.iter().map(WorkBatch::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn exactly_divisible_input_has_no_trailing_batch() {
        let batches = split_into_batches(items(6), 3);

        let sizes: Vec<usize> = batches.iter().map(WorkBatch::len).collect();
        assert_eq!(sizes, vec![3, 3]);
    }

    #[test]
    fn oversized_batch_limit_yields_one_batch() {
        let batches = split_into_batches(items(3), 10);

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
    }

    #[test]
    fn concatenated_batches_reproduce_the_input() {
        for (count, max_size) in [(0, 1), (1, 1), (5, 2), (6, 3), (7, 3), (3, 10)] {
            let input = items(count);

            let batches = split_into_batches(input.clone(), max_size);
            let concatenated: Vec<Item> = batches
                .into_iter()
                .flat_map(WorkBatch::into_items)
                .collect();

            assert_eq!(concatenated, input, "count {count} max size {max_size}");
        }
    }

    #[test]
    fn splitting_the_same_input_twice_yields_identical_batches() {
        let input = items(7);

        let first = split_into_batches(input.clone(), 3);
        let second = split_into_batches(input, 3);

        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "batch max size must be non-zero")]
    fn zero_batch_size_panics() {
        split_into_batches(items(1), 0);
    }
}
