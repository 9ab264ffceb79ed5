/// Разбивает список на последовательные пачки не длиннее `max_size`.
///
/// Порядок сохраняется, каждый элемент попадает ровно в одну пачку,
/// пустой список не дает ни одной пачки. `max_size` должен быть больше нуля
/// (конфигурация с нулевым размером отклоняется при загрузке); ноль
/// трактуется как 1, чтобы не паниковать внутри `chunks`.
pub fn split_into_batches<T>(items: &[T], max_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(max_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_batches() {
        let items: Vec<u32> = Vec::new();
        for n in [1, 3, 100] {
            assert_eq!(split_into_batches(&items, n).count(), 0);
        }
    }

    #[test]
    fn test_exact_multiple() {
        let items: Vec<u32> = (0..9).collect();
        let batches: Vec<&[u32]> = split_into_batches(&items, 3).collect();
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 3));
    }

    #[test]
    fn test_remainder_goes_last() {
        let items: Vec<u32> = (0..7).collect();
        let lengths: Vec<usize> = split_into_batches(&items, 3).map(|b| b.len()).collect();
        assert_eq!(lengths, vec![3, 3, 1]);
    }

    #[test]
    fn test_concatenation_preserves_order() {
        let items: Vec<String> = (0..250).map(|i| format!("SKU-{}", i)).collect();
        let joined: Vec<String> = split_into_batches(&items, 100)
            .flat_map(|b| b.iter().cloned())
            .collect();
        assert_eq!(joined, items);
    }

    #[test]
    fn test_zero_size_does_not_panic() {
        let items = [1, 2];
        assert_eq!(split_into_batches(&items, 0).count(), 2);
    }
}
