//! Property tests for the filter → sort → paginate pipeline.

use std::{collections::BTreeSet, num::NonZeroUsize};

use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use roster_business::{
    FilterCriteria, PageItem, PageState, SortColumn, SortCriteria, SortDirection, User, UserId,
    UserRole, UserStatus,
    user_table::{filter_users, paginate, sort_users, visible_pages},
};

// ===== Helpers =====

fn arbitrary_user(id: UserId) -> impl Strategy<Value = User> {
    (
        "[A-Za-z]{1,6}( [A-Za-z]{1,6})?",
        "[a-z]{1,5}",
        0i64..366,
        0i64..30,
        prop::sample::select(UserRole::ALL.to_vec()),
        prop::sample::select(UserStatus::ALL.to_vec()),
    )
        .prop_map(move |(name, mailbox, registered, idle, role, status)| {
            let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
            User {
                id,
                name,
                avatar: String::new(),
                email: format!("{mailbox}@example.com"),
                registration_date: base + TimeDelta::days(registered),
                last_activity: base + TimeDelta::days(400 - idle),
                login_count: 0,
                posts_count: 0,
                comments_count: 0,
                status,
                role,
            }
        })
}

fn arbitrary_users() -> impl Strategy<Value = Vec<User>> {
    (0usize..80).prop_flat_map(|count| {
        (1..=count as UserId)
            .map(arbitrary_user)
            .collect::<Vec<_>>()
    })
}

fn arbitrary_criteria() -> impl Strategy<Value = FilterCriteria> {
    (
        prop::option::of("[a-z0-9 ]{0,3}"),
        prop::option::of(prop::sample::select(UserRole::ALL.to_vec())),
        prop::option::of(prop::sample::select(UserStatus::ALL.to_vec())),
        prop::option::of(0u32..366),
        prop::option::of(0u32..366),
    )
        .prop_map(|(search, role, status, from, to)| {
            let day = |offset: u32| {
                NaiveDate::from_ymd_opt(2020, 1, 1)
                    .and_then(|d| d.checked_add_days(chrono::Days::new(offset.into())))
            };
            FilterCriteria {
                search: search.unwrap_or_default(),
                role,
                status,
                date_from: from.and_then(day),
                date_to: to.and_then(day),
            }
        })
}

fn arbitrary_sort() -> impl Strategy<Value = SortCriteria> {
    (
        prop::sample::select(vec![
            SortColumn::Id,
            SortColumn::Name,
            SortColumn::Email,
            SortColumn::RegistrationDate,
            SortColumn::LastActivity,
        ]),
        prop::bool::ANY,
    )
        .prop_map(|(column, desc)| SortCriteria {
            column,
            direction: if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        })
}

fn page_state(size: usize, current: usize, total_pages: usize) -> PageState {
    let mut state = PageState::new(NonZeroUsize::new(size).unwrap());
    state.go_to(current, total_pages);
    state
}

// ===== Property Tests =====

proptest! {
    /// Property: each stage can only shrink the data set
    #[test]
    fn page_within_filtered_within_total(
        users in arbitrary_users(),
        criteria in arbitrary_criteria(),
        sort in arbitrary_sort(),
        size in 1usize..30,
        current in 1usize..10,
    ) {
        let filtered = filter_users(&users, &criteria);
        let sorted = sort_users(&filtered, &sort);
        let total_pages = sorted.len().div_ceil(size);
        let view = paginate(&sorted, &page_state(size, current, total_pages));

        prop_assert!(view.rows.len() <= filtered.len());
        prop_assert!(filtered.len() <= users.len());
        prop_assert_eq!(sorted.len(), filtered.len());
        prop_assert_eq!(view.total_count, filtered.len());
    }

    /// Property: filtering keeps input order and every kept record satisfies the criteria
    #[test]
    fn filter_keeps_order_and_matches(
        users in arbitrary_users(),
        criteria in arbitrary_criteria(),
    ) {
        let filtered = filter_users(&users, &criteria);

        let positions: Vec<usize> = filtered
            .iter()
            .map(|kept| users.iter().position(|u| u.id == kept.id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

        for user in &filtered {
            prop_assert!(criteria.role.is_none_or(|role| user.role == role));
            prop_assert!(criteria.status.is_none_or(|status| user.status == status));
            prop_assert!(criteria.from_instant().is_none_or(|from| user.registration_date >= from));
            prop_assert!(criteria.to_instant().is_none_or(|to| user.registration_date <= to));
            prop_assert!(criteria.normalized_query().is_none_or(|q| user.matches_query(&q)));
        }
    }

    /// Property: sorting is a stable permutation and flipping direction reverses non-equal keys
    #[test]
    fn sort_is_stable_and_direction_reverses(
        users in arbitrary_users(),
        sort in arbitrary_sort(),
    ) {
        let sorted = sort_users(&users, &sort);

        let before: BTreeSet<UserId> = users.iter().map(|u| u.id).collect();
        let after: BTreeSet<UserId> = sorted.iter().map(|u| u.id).collect();
        prop_assert_eq!(before, after);

        for pair in sorted.windows(2) {
            let ordering = sort.compare(&pair[0], &pair[1]);
            prop_assert!(ordering.is_le());
            if ordering.is_eq() {
                // ids are generated in input order, so equal keys keep ascending ids
                prop_assert!(pair[0].id < pair[1].id);
            }
        }

        let flipped = SortCriteria { direction: sort.direction.toggled(), ..sort };
        let reversed = sort_users(&users, &flipped);
        for (i, a) in sorted.iter().enumerate() {
            for b in &sorted[i + 1..] {
                if sort.compare(a, b).is_lt() {
                    let pos_a = reversed.iter().position(|u| u.id == a.id).unwrap();
                    let pos_b = reversed.iter().position(|u| u.id == b.id).unwrap();
                    prop_assert!(pos_b < pos_a);
                }
            }
        }

        prop_assert_eq!(sort_users(&users, &sort), sorted);
    }

    /// Property: pages partition the sorted records
    #[test]
    fn pages_partition_the_records(
        users in arbitrary_users(),
        size in 1usize..30,
    ) {
        let total_pages = users.len().div_ceil(size);
        prop_assert_eq!(total_pages == 0, users.is_empty());

        let mut seen = Vec::new();
        for current in 1..=total_pages {
            let view = paginate(&users, &page_state(size, current, total_pages));
            prop_assert_eq!(view.total_pages, total_pages);
            prop_assert_eq!(view.current_page, current);
            prop_assert!(!view.rows.is_empty() && view.rows.len() <= size);
            prop_assert_eq!(view.start, (current - 1) * size + 1);
            prop_assert_eq!(view.end, view.start + view.rows.len() - 1);
            seen.extend(view.rows.into_iter().map(|u| u.id));
        }

        let all: Vec<UserId> = users.iter().map(|u| u.id).collect();
        prop_assert_eq!(seen, all);
    }

    /// Property: out-of-range page requests never move the page
    #[test]
    fn go_to_ignores_out_of_range(
        total_pages in 0usize..20,
        target in 0usize..40,
    ) {
        let mut state = PageState::default();
        let moved = state.go_to(target, total_pages);

        if target < 1 || target > total_pages {
            prop_assert!(!moved);
            prop_assert_eq!(state.current_page(), 1);
        } else {
            prop_assert_eq!(moved, target != 1);
            prop_assert_eq!(state.current_page(), target);
        }
    }

    /// Property: the page window always shows the first, last and current page in order
    #[test]
    fn window_contains_anchors(total in 1usize..60, current_seed in 0usize..60) {
        let current = current_seed % total + 1;
        let items = visible_pages(current, total);
        let pages: Vec<usize> = items
            .iter()
            .filter_map(|item| match item {
                PageItem::Page(n) => Some(*n),
                PageItem::Ellipsis => None,
            })
            .collect();

        prop_assert_eq!(pages.first(), Some(&1));
        prop_assert_eq!(pages.last(), Some(&total));
        prop_assert!(pages.contains(&current));
        prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(items.len() <= 7);
        if total <= 7 {
            prop_assert_eq!(pages.len(), total);
        }
    }
}
