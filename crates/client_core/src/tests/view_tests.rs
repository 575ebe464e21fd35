use super::*;
use crate::test_support::fruit_basket;

fn ids(rows: &[Product]) -> Vec<i64> {
    rows.iter().map(|product| product.id.0).collect()
}

#[test]
fn six_products_split_into_two_pages_of_five() {
    let products = fruit_basket();
    let mut pagination = Pagination::new(5);

    let first = visible_rows(
        &products,
        "",
        SortConfig::default(),
        &pagination,
        SortScope::Page,
    );
    assert_eq!(ids(&first.rows), vec![1, 2, 3, 4, 5]);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.filtered_count(), 6);

    pagination.next(products.len());
    let second = visible_rows(
        &products,
        "",
        SortConfig::default(),
        &pagination,
        SortScope::Page,
    );
    assert_eq!(ids(&second.rows), vec![6]);
    assert_eq!(second.current_page, 2);
}

#[test]
fn filter_matches_id_prefix_verbatim() {
    let products = fruit_basket();
    let matched = filter(&products, "2");
    assert_eq!(matched, vec![&Product::new(ProductId(2), "Banana")]);
}

#[test]
fn filter_matches_name_prefix_case_insensitively() {
    let products = vec![
        Product::new(ProductId(10), "apricot"),
        Product::new(ProductId(11), "Avocado"),
        Product::new(ProductId(12), "Banana"),
        Product::new(ProductId(13), "Papaya"),
    ];
    let matched: Vec<i64> = filter(&products, "A").iter().map(|p| p.id.0).collect();
    assert_eq!(matched, vec![10, 11]);

    // "1" matches every id here through the id prefix.
    assert_eq!(filter(&products, "1").len(), 4);
    assert!(filter(&products, "pap").iter().all(|p| p.name == "Papaya"));
}

#[test]
fn empty_filter_returns_collection_in_order() {
    let products = vec![
        Product::new(ProductId(3), "Cherry"),
        Product::new(ProductId(1), "Apple"),
        Product::new(ProductId(2), "Banana"),
    ];
    let all: Vec<Product> = filter(&products, "").into_iter().cloned().collect();
    assert_eq!(all, products);
}

#[test]
fn every_filtered_row_satisfies_predicate() {
    let products = fruit_basket();
    for needle in ["", "a", "B", "ch", "1", "6", "x", "Fi"] {
        for product in filter(&products, needle) {
            assert!(
                product.name.to_lowercase().starts_with(&needle.to_lowercase())
                    || product.id.to_string().starts_with(needle),
                "{product:?} should not match {needle:?}"
            );
        }
    }
}

#[test]
fn requesting_same_key_toggles_direction() {
    let config = SortConfig::default();
    let toggled = config.request(SortKey::Id);
    assert_eq!(toggled.direction, SortDirection::Descending);
    assert_eq!(toggled.request(SortKey::Id).direction, SortDirection::Ascending);

    let by_name = toggled.request(SortKey::Name);
    assert_eq!(
        by_name,
        SortConfig {
            key: SortKey::Name,
            direction: SortDirection::Ascending
        }
    );
}

#[test]
fn sort_descending_by_id_reverses_page() {
    let products = fruit_basket();
    let config = SortConfig::default().request(SortKey::Id);
    let view = visible_rows(&products, "", config, &Pagination::new(5), SortScope::Page);
    assert_eq!(ids(&view.rows), vec![5, 4, 3, 2, 1]);
}

#[test]
fn sort_is_stable_for_equal_names() {
    let products = vec![
        Product::new(ProductId(4), "Kiwi"),
        Product::new(ProductId(2), "Apple"),
        Product::new(ProductId(9), "Kiwi"),
        Product::new(ProductId(1), "Kiwi"),
    ];
    let mut rows: Vec<&Product> = products.iter().collect();

    sort(
        &mut rows,
        SortConfig {
            key: SortKey::Name,
            direction: SortDirection::Ascending,
        },
    );
    assert_eq!(rows.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![2, 4, 9, 1]);

    sort(
        &mut rows,
        SortConfig {
            key: SortKey::Name,
            direction: SortDirection::Descending,
        },
    );
    assert_eq!(rows.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![4, 9, 1, 2]);
}

#[test]
fn page_scope_sorts_only_the_current_slice() {
    let products = vec![
        Product::new(ProductId(1), "Zucchini"),
        Product::new(ProductId(2), "Yam"),
        Product::new(ProductId(3), "Apple"),
    ];
    let by_name = SortConfig {
        key: SortKey::Name,
        direction: SortDirection::Ascending,
    };

    let page_only = visible_rows(&products, "", by_name, &Pagination::new(2), SortScope::Page);
    assert_eq!(ids(&page_only.rows), vec![2, 1]);

    let whole = visible_rows(
        &products,
        "",
        by_name,
        &Pagination::new(2),
        SortScope::Collection,
    );
    assert_eq!(ids(&whole.rows), vec![3, 2]);
}

#[test]
fn total_pages_never_drops_below_one() {
    let pagination = Pagination::new(5);
    assert_eq!(pagination.total_pages(0), 1);
    assert_eq!(pagination.total_pages(5), 1);
    assert_eq!(pagination.total_pages(6), 2);
    assert_eq!(pagination.total_pages(11), 3);
}

#[test]
fn clamp_pulls_page_back_after_shrink() {
    let mut pagination = Pagination::new(5);
    pagination.set_page(3, 11);
    assert_eq!(pagination.current_page(), 3);

    pagination.clamp(6);
    assert_eq!(pagination.current_page(), 2);

    pagination.clamp(0);
    assert_eq!(pagination.current_page(), 1);
    assert_eq!(pagination.total_pages(0), 1);
}

#[test]
fn next_and_prev_stay_in_bounds() {
    let mut pagination = Pagination::new(5);
    pagination.prev();
    assert_eq!(pagination.current_page(), 1);

    pagination.next(6);
    pagination.next(6);
    assert_eq!(pagination.current_page(), 2);

    pagination.set_page(0, 6);
    assert_eq!(pagination.current_page(), 1);
}

#[test]
fn stale_page_still_yields_a_valid_slice() {
    let products = fruit_basket();
    let mut pagination = Pagination::new(5);
    pagination.set_page(2, products.len());

    let view = visible_rows(
        &products,
        "b",
        SortConfig::default(),
        &pagination,
        SortScope::Page,
    );
    assert_eq!(view.current_page, 1);
    assert_eq!(ids(&view.rows), vec![2]);
}
