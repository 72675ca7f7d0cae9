mod support;

use dustledger_core::{
    RawSearchParams, RepoError, Repository, SearchParams, SearchResult, SearchableRepository, User,
};
use support::{names, UserFakeBuilder, BASE_CREATED_AT};

/// Generates one test per contract function for each backend.
macro_rules! contract_tests {
    ($($name:ident),* $(,)?) => {
        mod in_memory {
            $(
                #[test]
                fn $name() {
                    let mut repo = crate::support::in_memory_repo();
                    super::$name(&mut repo);
                }
            )*
        }

        mod sqlite {
            $(
                #[test]
                fn $name() {
                    crate::support::with_sqlite_repo(|repo| super::$name(repo));
                }
            )*
        }
    };
}

contract_tests!(
    insert_then_find_by_id_returns_equal_record,
    find_by_id_on_missing_id_returns_none,
    update_replaces_full_state,
    update_on_missing_id_fails_with_not_found,
    delete_removes_record,
    delete_on_missing_id_fails_with_not_found,
    find_all_returns_every_record,
    insert_rejects_invalid_user,
    bulk_insert_with_one_invalid_user_stores_nothing,
    search_on_empty_repository_returns_first_empty_page,
    search_without_sort_orders_by_created_at_desc,
    search_filter_is_case_insensitive_substring,
    search_sorts_by_display_name_asc,
    search_sorts_by_display_name_desc,
    search_ties_keep_storage_order_in_both_directions,
    search_sorts_by_dust_balance,
    search_with_unknown_sort_uses_default_order,
    search_filters_sorts_then_paginates,
    search_page_beyond_last_page_returns_no_items,
    update_keeps_storage_slot_for_ties,
);

fn search<R: SearchableRepository<User>>(
    repo: &R,
    raw: RawSearchParams<String>,
) -> SearchResult<User> {
    let params = SearchParams::for_entity::<User>(raw);
    repo.search(&params).expect("search should succeed")
}

fn insert_then_find_by_id_returns_equal_record<R: SearchableRepository<User>>(repo: &mut R) {
    let user = UserFakeBuilder::a_user()
        .with_display_name("alice")
        .with_dust_balance(42)
        .inactive()
        .build();
    repo.insert(&user).expect("insert should succeed");

    let loaded = repo
        .find_by_id(&user.user_id)
        .expect("find_by_id should succeed")
        .expect("user should exist");
    assert_eq!(loaded, user);
}

fn find_by_id_on_missing_id_returns_none<R: SearchableRepository<User>>(repo: &mut R) {
    let ghost = UserFakeBuilder::a_user().build();
    assert!(repo.find_by_id(&ghost.user_id).expect("find_by_id should succeed").is_none());
}

fn update_replaces_full_state<R: SearchableRepository<User>>(repo: &mut R) {
    let mut user = UserFakeBuilder::a_user().with_display_name("before").build();
    repo.insert(&user).expect("insert should succeed");

    user.change_display_name("after").expect("new display name should be valid");
    user.add_dust(500).expect("dust amount should be valid");
    user.deactivate();
    repo.update(&user).expect("update should succeed");

    let loaded = repo
        .find_by_id(&user.user_id)
        .expect("find_by_id should succeed")
        .expect("user should exist");
    assert_eq!(loaded, user);
}

fn update_on_missing_id_fails_with_not_found<R: SearchableRepository<User>>(repo: &mut R) {
    let ghost = UserFakeBuilder::a_user().build();
    let err = repo.update(&ghost).expect_err("update of missing user should fail");

    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        format!("User Not Found using ID {}", ghost.user_id)
    );
}

fn delete_removes_record<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(2).build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    repo.delete(&users[0].user_id).expect("delete should succeed");

    assert!(repo.find_by_id(&users[0].user_id).expect("find_by_id should succeed").is_none());
    assert_eq!(repo.find_all().expect("find_all should succeed"), vec![users[1].clone()]);
}

fn delete_on_missing_id_fails_with_not_found<R: SearchableRepository<User>>(repo: &mut R) {
    let ghost = UserFakeBuilder::a_user().build();
    let err = repo.delete(&ghost.user_id).expect_err("delete of missing user should fail");
    assert!(matches!(err, RepoError::NotFound { entity: "User", .. }));
}

fn find_all_returns_every_record<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(4).build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");
    let extra = UserFakeBuilder::a_user()
        .with_display_name("extra")
        .with_created_at(BASE_CREATED_AT + 1_000_000)
        .build();
    repo.insert(&extra).expect("insert should succeed");

    let mut loaded = repo.find_all().expect("find_all should succeed");
    loaded.sort_by_key(|user| user.created_at);
    assert_eq!(loaded.len(), 5);
    assert_eq!(&loaded[..4], &users[..]);
    assert_eq!(loaded[4], extra);
}

fn insert_rejects_invalid_user<R: SearchableRepository<User>>(repo: &mut R) {
    let user = UserFakeBuilder::a_user()
        .with_display_name(&"x".repeat(31))
        .build();

    let err = repo.insert(&user).expect_err("invalid user should be rejected");

    match err {
        RepoError::Validation(err) => assert_eq!(err.field, "display_name"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(repo.find_all().expect("find_all should succeed").is_empty());
}

fn bulk_insert_with_one_invalid_user_stores_nothing<R: SearchableRepository<User>>(repo: &mut R) {
    let mut users = UserFakeBuilder::the_users(3).build_many();
    users[2].dust_balance = -1;

    let err = repo.bulk_insert(&users).expect_err("invalid batch should be rejected");

    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.find_all().expect("find_all should succeed").is_empty());
}

fn search_on_empty_repository_returns_first_empty_page<R: SearchableRepository<User>>(
    repo: &mut R,
) {
    let result = search(repo, RawSearchParams::new());

    assert!(result.items().is_empty());
    assert_eq!(result.total(), 0);
    assert_eq!(result.current_page(), 1);
    assert_eq!(result.per_page(), 15);
    assert_eq!(result.last_page(), 1);
}

fn search_without_sort_orders_by_created_at_desc<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(16).build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let result = search(repo, RawSearchParams::new());

    let expected: Vec<User> = users.iter().rev().take(15).cloned().collect();
    assert_eq!(result.items(), &expected[..]);
    assert_eq!(result.total(), 16);
    assert_eq!(result.last_page(), 2);
}

fn search_filter_is_case_insensitive_substring<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(0)
        .with_display_names(&["test", "a", "TEST", "e", "TeSt"])
        .build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let result = search(
        repo,
        RawSearchParams::new().per_page(2).filter("TEST".to_string()),
    );

    assert_eq!(names(result.items()), vec!["TeSt", "TEST"]);
    assert_eq!(result.total(), 3);
    assert_eq!(result.last_page(), 2);
}

fn search_sorts_by_display_name_asc<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(0)
        .with_display_names(&["b", "a", "d", "e", "c"])
        .build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let result = search(
        repo,
        RawSearchParams::new().sort("display_name").sort_dir("asc"),
    );

    assert_eq!(names(result.items()), vec!["a", "b", "c", "d", "e"]);
}

fn search_sorts_by_display_name_desc<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(0)
        .with_display_names(&["b", "a", "d", "e", "c"])
        .build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let result = search(
        repo,
        RawSearchParams::new().sort("display_name").sort_dir("desc"),
    );

    assert_eq!(names(result.items()), vec!["e", "d", "c", "b", "a"]);
}

fn search_ties_keep_storage_order_in_both_directions<R: SearchableRepository<User>>(
    repo: &mut R,
) {
    let users = UserFakeBuilder::the_users(0)
        .with_display_names(&["b", "a", "b", "a"])
        .build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let asc = search(
        repo,
        RawSearchParams::new().sort("display_name").sort_dir("asc"),
    );
    let desc = search(
        repo,
        RawSearchParams::new().sort("display_name").sort_dir("desc"),
    );

    let ids = |result: &SearchResult<User>| -> Vec<_> {
        result.items().iter().map(|user| user.user_id).collect()
    };
    assert_eq!(
        ids(&asc),
        vec![users[1].user_id, users[3].user_id, users[0].user_id, users[2].user_id]
    );
    assert_eq!(
        ids(&desc),
        vec![users[0].user_id, users[2].user_id, users[1].user_id, users[3].user_id]
    );
}

fn search_sorts_by_dust_balance<R: SearchableRepository<User>>(repo: &mut R) {
    let mut users = UserFakeBuilder::the_users(0)
        .with_display_names(&["poor", "rich", "middle"])
        .build_many();
    users[0].dust_balance = 1;
    users[1].dust_balance = 900_000;
    users[2].dust_balance = 5_000;
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let result = search(
        repo,
        RawSearchParams::new().sort("dust_balance").sort_dir("desc"),
    );

    assert_eq!(names(result.items()), vec!["rich", "middle", "poor"]);
}

fn search_with_unknown_sort_uses_default_order<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(0)
        .with_display_names(&["first", "second", "third"])
        .build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let result = search(
        repo,
        RawSearchParams::new().sort("is_active").sort_dir("asc"),
    );

    assert_eq!(names(result.items()), vec!["third", "second", "first"]);
}

fn search_filters_sorts_then_paginates<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(0)
        .with_display_names(&["a", "AAA", "AaA", "b", "c"])
        .build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let request = || {
        RawSearchParams::new()
            .per_page(2)
            .sort("display_name")
            .sort_dir("asc")
            .filter("a".to_string())
    };

    let first = search(repo, request().page(1));
    assert_eq!(names(first.items()), vec!["AAA", "AaA"]);
    assert_eq!(first.total(), 3);
    assert_eq!(first.current_page(), 1);
    assert_eq!(first.per_page(), 2);
    assert_eq!(first.last_page(), 2);

    let second = search(repo, request().page(2));
    assert_eq!(names(second.items()), vec!["a"]);
    assert_eq!(second.total(), 3);
    assert_eq!(second.current_page(), 2);
}

fn search_page_beyond_last_page_returns_no_items<R: SearchableRepository<User>>(repo: &mut R) {
    let users = UserFakeBuilder::the_users(3).build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    let result = search(repo, RawSearchParams::new().page(7).per_page(2));

    assert!(result.items().is_empty());
    assert_eq!(result.total(), 3);
    assert_eq!(result.current_page(), 7);
    assert_eq!(result.last_page(), 2);
}

fn update_keeps_storage_slot_for_ties<R: SearchableRepository<User>>(repo: &mut R) {
    let mut users = UserFakeBuilder::the_users(0)
        .with_display_names(&["one", "two", "three"])
        .with_created_at(BASE_CREATED_AT)
        .build_many();
    repo.bulk_insert(&users).expect("bulk insert should succeed");

    users[0].change_display_name("uno").expect("new display name should be valid");
    repo.update(&users[0]).expect("update should succeed");

    let result = search(repo, RawSearchParams::new());
    assert_eq!(names(result.items()), vec!["uno", "two", "three"]);
}

// The in-memory backend does not dedup ids; only SQLite rejects a duplicate
// primary key, so these two cases run against SQLite alone.

#[test]
fn sqlite_bulk_insert_with_duplicate_id_stores_nothing() {
    support::with_sqlite_repo(|repo| {
        let users = UserFakeBuilder::the_users(3).build_many();
        let batch = vec![
            users[0].clone(),
            users[1].clone(),
            users[0].clone(),
            users[2].clone(),
        ];

        let err = repo
            .bulk_insert(&batch)
            .expect_err("duplicate primary key should fail the batch");

        assert!(matches!(err, RepoError::Db(_)));
        assert!(repo.find_all().expect("find_all should succeed").is_empty());
    });
}

#[test]
fn sqlite_failed_bulk_insert_keeps_previously_stored_records() {
    support::with_sqlite_repo(|repo| {
        let users = UserFakeBuilder::the_users(2).build_many();
        repo.insert(&users[0]).expect("insert should succeed");

        repo.bulk_insert(&[users[1].clone(), users[0].clone()])
            .expect_err("duplicate primary key should fail the batch");

        assert_eq!(
            repo.find_all().expect("find_all should succeed"),
            vec![users[0].clone()]
        );
        let result = search(repo, RawSearchParams::new());
        assert_eq!(result.total(), 1);
    });
}
