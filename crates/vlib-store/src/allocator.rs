//! Slot allocation over bookcases, shelves, and slots.
//!
//! The search is a plain deterministic scan: bookcases in stored order, then
//! shelf index ascending, then slot index ascending. The first coordinate no
//! book occupies wins. The same snapshot always yields the same answer.

use std::collections::HashSet;

use vlib_types::{Book, BookPosition, Bookcase};

/// Find the first free slot in scan order, or `None` when every bookcase is
/// full (or there are no bookcases).
pub fn find_next_available_slot(bookcases: &[Bookcase], books: &[Book]) -> Option<BookPosition> {
    free_slots(bookcases, books).next()
}

/// All free slots in scan order.
pub fn free_slots<'a>(
    bookcases: &'a [Bookcase],
    books: &'a [Book],
) -> impl Iterator<Item = BookPosition> + 'a {
    bookcases
        .iter()
        .flat_map(|bookcase| bookcase.slots())
        .filter(move |position| !is_occupied(books, position))
}

/// Number of free slots, counted without enumerating them. Books placed
/// outside every bookcase take no slot.
pub fn free_slot_count(bookcases: &[Bookcase], books: &[Book]) -> u64 {
    let taken: HashSet<&BookPosition> = books
        .iter()
        .map(|book| &book.position)
        .filter(|position| bookcases.iter().any(|bookcase| bookcase.contains(position)))
        .collect();
    total_capacity(bookcases).saturating_sub(taken.len() as u64)
}

/// Whether any book sits exactly at `position`.
pub fn is_occupied(books: &[Book], position: &BookPosition) -> bool {
    occupant(books, position).is_some()
}

/// The book at `position`. If a malformed library ever holds two books at
/// one coordinate, the first in list order wins.
pub fn occupant<'a>(books: &'a [Book], position: &BookPosition) -> Option<&'a Book> {
    books.iter().find(|book| book.occupies(position))
}

/// Total slot count across all bookcases.
pub fn total_capacity(bookcases: &[Bookcase]) -> u64 {
    bookcases.iter().map(Bookcase::capacity).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vlib_types::{BookDraft, BookcaseId, ResolvedCover};

    fn bookcase(ordinal: usize, shelves: u32, slots: u32) -> Bookcase {
        Bookcase {
            id: BookcaseId::for_ordinal(ordinal),
            position: [0.0; 3],
            rotation_y: 0.0,
            shelves,
            slots_per_shelf: slots,
        }
    }

    fn book_at(bookcase: &str, shelf: u32, slot: u32) -> Book {
        Book::from_draft(
            BookDraft::new("Title", "Author"),
            ResolvedCover::uploaded(""),
            BookPosition::new(bookcase, shelf, slot),
        )
    }

    #[test]
    fn empty_bookcase_yields_origin() {
        let cases = vec![bookcase(1, 5, 12)];
        assert_eq!(
            find_next_available_slot(&cases, &[]),
            Some(BookPosition::new("bookcase-1", 0, 0))
        );
    }

    #[test]
    fn no_bookcases_yields_none() {
        assert_eq!(find_next_available_slot(&[], &[]), None);
    }

    #[test]
    fn fills_slots_before_shelves() {
        let cases = vec![bookcase(1, 2, 2)];
        let books = vec![book_at("bookcase-1", 0, 0)];
        assert_eq!(
            find_next_available_slot(&cases, &books),
            Some(BookPosition::new("bookcase-1", 0, 1))
        );
        let books = vec![book_at("bookcase-1", 0, 0), book_at("bookcase-1", 0, 1)];
        assert_eq!(
            find_next_available_slot(&cases, &books),
            Some(BookPosition::new("bookcase-1", 1, 0))
        );
    }

    #[test]
    fn gaps_are_reused_first() {
        let cases = vec![bookcase(1, 1, 3)];
        let books = vec![book_at("bookcase-1", 0, 0), book_at("bookcase-1", 0, 2)];
        assert_eq!(
            find_next_available_slot(&cases, &books),
            Some(BookPosition::new("bookcase-1", 0, 1))
        );
    }

    #[test]
    fn spills_into_next_bookcase() {
        let cases = vec![bookcase(1, 1, 1), bookcase(2, 1, 1)];
        let books = vec![book_at("bookcase-1", 0, 0)];
        assert_eq!(
            find_next_available_slot(&cases, &books),
            Some(BookPosition::new("bookcase-2", 0, 0))
        );
    }

    #[test]
    fn full_library_is_exhausted() {
        let cases = vec![bookcase(1, 1, 2)];
        let books = vec![book_at("bookcase-1", 0, 1), book_at("bookcase-1", 0, 0)];
        assert_eq!(find_next_available_slot(&cases, &books), None);
        assert_eq!(total_capacity(&cases), books.len() as u64);
    }

    #[test]
    fn books_in_unknown_bookcases_do_not_block() {
        let cases = vec![bookcase(1, 1, 1)];
        let books = vec![book_at("bookcase-9", 0, 0)];
        assert_eq!(
            find_next_available_slot(&cases, &books),
            Some(BookPosition::new("bookcase-1", 0, 0))
        );
    }

    #[test]
    fn occupant_prefers_first_in_list_order() {
        let first = book_at("bookcase-1", 0, 0);
        let second = book_at("bookcase-1", 0, 0);
        let books = vec![first.clone(), second];
        let found = occupant(&books, &BookPosition::new("bookcase-1", 0, 0)).unwrap();
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn free_slots_lists_every_gap() {
        let cases = vec![bookcase(1, 1, 3)];
        let books = vec![book_at("bookcase-1", 0, 1)];
        let free: Vec<BookPosition> = free_slots(&cases, &books).collect();
        assert_eq!(
            free,
            vec![
                BookPosition::new("bookcase-1", 0, 0),
                BookPosition::new("bookcase-1", 0, 2),
            ]
        );
    }

    #[test]
    fn huge_bookcase_is_counted_not_enumerated() {
        let cases = vec![bookcase(1, 100_000, 100_000)];
        let books = vec![book_at("bookcase-1", 0, 0), book_at("bookcase-9", 0, 0)];
        assert_eq!(free_slot_count(&cases, &books), 10_000_000_000 - 1);
        let first: Vec<BookPosition> = free_slots(&cases, &books).take(2).collect();
        assert_eq!(
            first,
            vec![
                BookPosition::new("bookcase-1", 0, 1),
                BookPosition::new("bookcase-1", 0, 2),
            ]
        );
    }

    fn occupied_strategy() -> impl Strategy<Value = (Vec<Bookcase>, Vec<Book>)> {
        (1usize..4, 1u32..4, 1u32..5).prop_flat_map(|(cases, shelves, slots)| {
            let capacity = cases * (shelves * slots) as usize;
            proptest::collection::vec(any::<bool>(), capacity).prop_map(move |mask| {
                let bookcases: Vec<Bookcase> =
                    (1..=cases).map(|n| bookcase(n, shelves, slots)).collect();
                let books: Vec<Book> = bookcases
                    .iter()
                    .flat_map(|case| case.slots())
                    .zip(mask)
                    .filter(|(_, taken)| *taken)
                    .map(|(pos, _)| {
                        book_at(pos.bookcase_id.as_str(), pos.shelf_index, pos.slot_index)
                    })
                    .collect();
                (bookcases, books)
            })
        })
    }

    proptest! {
        #[test]
        fn allocation_is_deterministic((cases, books) in occupied_strategy()) {
            let first = find_next_available_slot(&cases, &books);
            let second = find_next_available_slot(&cases, &books);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn allocation_is_lexicographic_minimum((cases, books) in occupied_strategy()) {
            let index_of = |pos: &BookPosition| {
                cases.iter().position(|c| c.id == pos.bookcase_id).unwrap()
            };
            let expected = free_slots(&cases, &books)
                .min_by_key(|p| (index_of(p), p.shelf_index, p.slot_index));
            prop_assert_eq!(find_next_available_slot(&cases, &books), expected);
        }

        #[test]
        fn exhaustion_iff_all_slots_taken((cases, books) in occupied_strategy()) {
            let full = books.len() as u64 == total_capacity(&cases);
            prop_assert_eq!(find_next_available_slot(&cases, &books).is_none(), full);
        }

        #[test]
        fn free_count_matches_enumeration((cases, books) in occupied_strategy()) {
            prop_assert_eq!(
                free_slot_count(&cases, &books),
                free_slots(&cases, &books).count() as u64
            );
        }

        #[test]
        fn allocated_slot_is_free((cases, books) in occupied_strategy()) {
            if let Some(pos) = find_next_available_slot(&cases, &books) {
                prop_assert!(!is_occupied(&books, &pos));
            }
        }
    }
}
