use proptest::prelude::*;

use list_pager::{page_window, PageLabel, PaginationState};

fn counted(items_per_page: u32, total_items: u64) -> PaginationState {
    let mut state = PaginationState::new(items_per_page).unwrap();
    state.set_total_items(total_items);
    state
}

proptest! {
    #[test]
    fn total_pages_is_ceiling_division(per_page in 1u32..500, total in 0u64..100_000) {
        let state = counted(per_page, total);
        let expected = (total + u64::from(per_page) - 1) / u64::from(per_page);
        prop_assert_eq!(u64::from(state.total_pages()), expected);
        prop_assert_eq!(state.total_pages() == 0, total == 0);
    }

    #[test]
    fn slice_bounds_stay_inside_the_set(
        per_page in 1u32..200,
        total in 0u64..20_000,
        page in 1u32..300,
    ) {
        let mut state = counted(per_page, total);
        state.go_to_page(page);

        let (start, end) = (state.start_index(), state.end_index());
        if total == 0 {
            prop_assert_eq!((start, end), (0, 0));
        } else {
            prop_assert!(start < end);
            prop_assert!(end <= total);
            prop_assert!(end - start <= u64::from(per_page));
        }
        prop_assert!(state.current_page() >= 1);
        prop_assert!(state.current_page() <= state.total_pages().max(1));
    }

    #[test]
    fn go_to_page_is_a_no_op_out_of_range_and_idempotent_in_range(
        per_page in 1u32..100,
        total in 0u64..5_000,
        page in 0u32..200,
    ) {
        let mut state = counted(per_page, total);
        state.go_to_page(2);
        let before = state.clone();

        let accepted = state.go_to_page(page);
        if page == 0 || page > before.total_pages() {
            prop_assert!(!accepted);
            prop_assert_eq!(&state, &before);
        } else {
            prop_assert!(accepted);
            let once = state.clone();
            state.go_to_page(page);
            prop_assert_eq!(state, once);
        }
    }

    #[test]
    fn page_size_change_always_lands_on_page_one(
        per_page in 1u32..100,
        new_per_page in 1u32..100,
        total in 0u64..5_000,
        page in 1u32..100,
    ) {
        let mut state = counted(per_page, total);
        state.go_to_page(page);
        state.set_items_per_page(new_per_page).unwrap();
        prop_assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn recounting_keeps_the_invariant_and_does_not_oscillate(
        per_page in 1u32..100,
        total in 0u64..5_000,
        new_total in 0u64..5_000,
        page in 1u32..100,
    ) {
        let mut state = counted(per_page, total);
        state.go_to_page(page);

        state.set_total_items(new_total);
        prop_assert!(state.current_page() <= state.total_pages().max(1));

        let settled = state.clone();
        prop_assert!(!state.set_total_items(new_total));
        prop_assert_eq!(state, settled);
    }

    #[test]
    fn page_window_shape(total in 0u32..10_000, current in 0u32..10_001) {
        let labels = page_window(current, total);

        if total <= 5 {
            let expected: Vec<PageLabel> = (1..=total).map(PageLabel::Page).collect();
            prop_assert_eq!(labels, expected);
            return Ok(());
        }

        prop_assert!(labels.len() <= 7);
        prop_assert_eq!(labels.first(), Some(&PageLabel::Page(1)));
        prop_assert_eq!(labels.last(), Some(&PageLabel::Page(total)));
        prop_assert!(labels.contains(&PageLabel::Page(current.clamp(1, total))));

        for pair in labels.windows(2) {
            prop_assert!(!(pair[0].is_ellipsis() && pair[1].is_ellipsis()));
        }

        let pages: Vec<u32> = labels.iter().filter_map(PageLabel::page).collect();
        prop_assert!(pages.windows(2).all(|w| w[0] < w[1]), "pages not strictly increasing: {:?}", pages);
    }
}
