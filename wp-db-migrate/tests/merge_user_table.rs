use std::sync::Arc;

use wp_db_migrate::fan_out::SitePrefixScheme;
use wp_db_migrate::merge_users::{PROVENANCE_META_KEY, RESTORE_WARNING, counts};
use wp_db_migrate::{MergeUserTable, MigrationError, ProvenanceSource};
use wp_db_migrate_repository::{MockExecutor, MockSiteRegistry};
use wp_db_migrate_shared::{ExecutionMode, Row, SiteId, SiteSelection, SqlValue, TablePrefix};

fn prefix(value: &str) -> TablePrefix {
    TablePrefix::new(value).unwrap()
}

fn count(value: i64) -> Vec<Row> {
    vec![Row::new(vec![SqlValue::Int(value)])]
}

/// Executor answering the merge's count queries.
fn executor_with(
    common_meta: i64,
    new_users: i64,
    new_user_meta: i64,
    leftover_columns: i64,
) -> Arc<MockExecutor> {
    let executor = Arc::new(MockExecutor::new());
    executor.on_query("common_meta_count", count(common_meta));
    executor.on_query("new_user_meta_count", count(new_user_meta));
    executor.on_query("new_user_count", count(new_users));
    executor.on_query("reference_columns", count(leftover_columns));
    executor
}

fn engine(
    executor: &Arc<MockExecutor>,
    sites: MockSiteRegistry,
    mode: ExecutionMode,
) -> MergeUserTable {
    MergeUserTable::new(
        prefix("old_"),
        prefix("wp_"),
        mode,
        executor.clone(),
        Arc::new(sites),
    )
    .unwrap()
}

fn single_site_engine(executor: &Arc<MockExecutor>, mode: ExecutionMode) -> MergeUserTable {
    engine(executor, MockSiteRegistry::single_site(), mode)
}

fn executed_matching(executor: &MockExecutor, needle: &str) -> Vec<String> {
    executor
        .executed_sql()
        .into_iter()
        .filter(|sql| sql.contains(needle))
        .collect()
}

#[tokio::test]
async fn test_single_site_merge_runs_both_cases_in_order() {
    let executor = executor_with(3, 2, 5, 0);

    let report = single_site_engine(&executor, ExecutionMode::Live)
        .run()
        .await
        .unwrap();

    let executed = executor.executed_sql();
    assert_eq!(executed.len(), 6);
    assert!(executed[0].starts_with("INSERT INTO `wp_usermeta`"));
    assert!(executed[0].contains("FROM `old_usermeta` AS src_meta"));
    assert_eq!(
        executed[1],
        "ALTER TABLE `wp_users` ADD COLUMN old_user_id BIGINT(20) UNSIGNED"
    );
    assert!(executed[2].starts_with("INSERT INTO `wp_users`"));
    assert!(executed[3].contains("INNER JOIN `wp_users` AS u ON src_meta.user_id = u.old_user_id"));
    assert!(executed[4].contains("FROM `wp_users` AS u WHERE u.old_user_id IS NOT NULL"));
    assert_eq!(
        executor.executed()[4].params(),
        &[SqlValue::from(PROVENANCE_META_KEY)]
    );
    assert_eq!(executed[5], "ALTER TABLE `wp_users` DROP COLUMN old_user_id");

    assert_eq!(report.count(counts::COMMON_USER_META), Some(3));
    assert_eq!(report.count(counts::NEW_USERS), Some(2));
    assert_eq!(report.count(counts::NEW_USER_META), Some(5));
    assert_eq!(report.count(counts::SITES_REMAPPED), Some(0));
    assert_eq!(report.applied(), 6);
}

#[tokio::test]
async fn test_dry_run_changes_nothing_and_reports_live_counts() {
    let dry_executor = executor_with(3, 2, 5, 0);
    let dry = engine(
        &dry_executor,
        MockSiteRegistry::multisite(&[1, 2]),
        ExecutionMode::DryRun,
    )
    .with_site_selection(SiteSelection::All)
    .run()
    .await
    .unwrap();

    assert!(dry_executor.executed().is_empty());
    assert_eq!(dry.applied(), 0);
    assert_eq!(dry.previewed(), 10);

    let live_executor = executor_with(3, 2, 5, 0);
    let live = engine(
        &live_executor,
        MockSiteRegistry::multisite(&[1, 2]),
        ExecutionMode::Live,
    )
    .with_site_selection(SiteSelection::All)
    .run()
    .await
    .unwrap();

    assert_eq!(live_executor.executed().len(), 10);
    assert_eq!(dry.counts, live.counts);
}

#[tokio::test]
async fn test_no_new_users_skips_column_lifecycle() {
    let executor = executor_with(0, 0, 0, 0);

    let report = single_site_engine(&executor, ExecutionMode::Live)
        .run()
        .await
        .unwrap();

    assert!(executor.executed().is_empty());
    assert!(
        !executor
            .queries()
            .iter()
            .any(|statement| statement.sql().contains("information_schema.columns"))
    );
    assert_eq!(report.steps.len(), 2);
    assert_eq!(report.count(counts::NEW_USERS), Some(0));
}

#[tokio::test]
async fn test_new_users_without_meta_still_record_provenance() {
    let executor = executor_with(0, 2, 0, 0);

    let report = single_site_engine(&executor, ExecutionMode::Live)
        .run()
        .await
        .unwrap();

    assert_eq!(executed_matching(&executor, "INSERT INTO `wp_usermeta`").len(), 1);
    assert_eq!(report.count(counts::NEW_USER_META), Some(0));
    assert!(executor.executed_sql().last().unwrap().contains("DROP COLUMN"));
}

#[tokio::test]
async fn test_all_sites_remap_posts_and_comments_including_main_site() {
    let executor = executor_with(0, 1, 0, 0);

    let report = engine(
        &executor,
        MockSiteRegistry::multisite(&[1, 2]),
        ExecutionMode::Live,
    )
    .with_site_selection(SiteSelection::All)
    .run()
    .await
    .unwrap();

    let remaps = executed_matching(&executor, "INNER JOIN `wp_users` AS u ON");
    let remaps: Vec<_> = remaps
        .iter()
        .filter(|sql| sql.starts_with("UPDATE"))
        .collect();
    assert_eq!(remaps.len(), 4);
    assert!(remaps[0].starts_with("UPDATE `wp_posts` AS post"));
    assert!(remaps[0].ends_with("SET post.post_author = u.ID"));
    assert!(remaps[1].starts_with("UPDATE `wp_comments` AS comment"));
    assert!(remaps[1].ends_with("SET comment.user_id = u.ID"));
    assert!(remaps[2].starts_with("UPDATE `2_posts`"));
    assert!(remaps[3].starts_with("UPDATE `2_comments`"));

    assert_eq!(
        executor.executed_sql().last().unwrap(),
        "ALTER TABLE `wp_users` DROP COLUMN old_user_id"
    );
    assert_eq!(report.count(counts::SITES_REMAPPED), Some(2));
}

#[tokio::test]
async fn test_single_selected_site_is_the_only_one_remapped() {
    let executor = executor_with(0, 1, 0, 0);

    engine(
        &executor,
        MockSiteRegistry::multisite(&[1, 2, 3]),
        ExecutionMode::Live,
    )
    .with_site_selection(SiteSelection::Single(SiteId::new(3).unwrap()))
    .run()
    .await
    .unwrap();

    let remaps = executed_matching(&executor, "UPDATE");
    assert_eq!(
        remaps,
        vec![
            "UPDATE `3_posts` AS post INNER JOIN `wp_users` AS u \
             ON post.post_author = u.old_user_id SET post.post_author = u.ID",
            "UPDATE `3_comments` AS comment INNER JOIN `wp_users` AS u \
             ON comment.user_id = u.old_user_id SET comment.user_id = u.ID",
        ]
    );
}

#[tokio::test]
async fn test_nested_site_prefix_scheme() {
    let executor = executor_with(0, 1, 0, 0);

    engine(
        &executor,
        MockSiteRegistry::multisite(&[1, 2]),
        ExecutionMode::Live,
    )
    .with_site_selection(SiteSelection::All)
    .with_site_prefix_scheme(SitePrefixScheme::Nested)
    .run()
    .await
    .unwrap();

    assert_eq!(executed_matching(&executor, "UPDATE `wp_posts`").len(), 1);
    assert_eq!(executed_matching(&executor, "UPDATE `wp_2_posts`").len(), 1);
    assert_eq!(executed_matching(&executor, "UPDATE `wp_2_comments`").len(), 1);
    assert!(executed_matching(&executor, "UPDATE `2_").is_empty());
}

#[tokio::test]
async fn test_literal_provenance_reads_meta_table() {
    let executor = executor_with(0, 1, 0, 0);

    single_site_engine(&executor, ExecutionMode::Live)
        .with_provenance_source(ProvenanceSource::MetaTableLiteral)
        .run()
        .await
        .unwrap();

    assert_eq!(
        executed_matching(&executor, "SELECT m.ID, ?, m.old_user_id FROM `wp_usermeta` AS m").len(),
        1
    );
}

#[tokio::test]
async fn test_unknown_site_is_fatal_before_any_change() {
    let executor = executor_with(3, 2, 5, 0);

    let failure = engine(
        &executor,
        MockSiteRegistry::multisite(&[1, 2]),
        ExecutionMode::Live,
    )
    .with_site_selection(SiteSelection::Single(SiteId::new(9).unwrap()))
    .run()
    .await
    .unwrap_err();

    assert_eq!(
        failure.error.to_string(),
        "Sorry, there is no site id/table found for site id 9"
    );
    assert_eq!(failure.warning, RESTORE_WARNING);
    assert!(executor.executed().is_empty());
}

#[tokio::test]
async fn test_multisite_requires_a_site_selection() {
    let executor = executor_with(3, 2, 5, 0);

    let failure = engine(
        &executor,
        MockSiteRegistry::multisite(&[1, 2]),
        ExecutionMode::Live,
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(failure.error, MigrationError::SiteSelectionRequired));
    assert!(executor.executed().is_empty());
}

#[tokio::test]
async fn test_single_site_ignores_site_selection() {
    let executor = executor_with(0, 1, 0, 0);

    let report = single_site_engine(&executor, ExecutionMode::Live)
        .with_site_selection(SiteSelection::Single(SiteId::new(7).unwrap()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.count(counts::SITES_REMAPPED), Some(0));
}

#[tokio::test]
async fn test_leftover_reference_column_is_fatal() {
    let executor = executor_with(3, 2, 5, 1);

    let failure = single_site_engine(&executor, ExecutionMode::Live)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        MigrationError::ReferenceColumnExists { ref column, .. } if column == "old_user_id"
    ));
    assert_eq!(executor.executed().len(), 1);
    assert!(executed_matching(&executor, "ALTER TABLE").is_empty());
}

#[tokio::test]
async fn test_case_two_failure_stops_before_dropping_column() {
    let executor = executor_with(0, 2, 5, 0);
    executor.fail_on("INSERT INTO `wp_users`", "Duplicate entry 'admin' for key 'user_login_key'");

    let failure = single_site_engine(&executor, ExecutionMode::Live)
        .run()
        .await
        .unwrap_err();

    assert_eq!(
        failure.error.to_string(),
        "MySQL error: Duplicate entry 'admin' for key 'user_login_key'"
    );
    assert_eq!(executor.executed_sql().len(), 2);
    assert!(executed_matching(&executor, "DROP COLUMN").is_empty());
    assert_eq!(failure.report.failed(), 1);
}

#[test]
fn test_same_prefix_is_rejected() {
    let executor: Arc<MockExecutor> = Arc::new(MockExecutor::new());
    let result = MergeUserTable::new(
        prefix("wp_"),
        prefix("wp_"),
        ExecutionMode::Live,
        executor,
        Arc::new(MockSiteRegistry::single_site()),
    );

    assert!(matches!(result, Err(MigrationError::Identifier(_))));
}
