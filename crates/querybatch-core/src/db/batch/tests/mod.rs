
use super::*;
use crate::{error::StoreError, test_support::RecordingQuery};

fn windows_of(batches: Batches<RecordingQuery>) -> Vec<(u64, u64)> {
    batches.map(|query| query.window()).collect()
}

#[test]
fn defaults_match_documented_values() {
    let options = BatchOptions::default();

    assert_eq!(options.batch_size, 1_000);
    assert_eq!(options.to, None);
    assert_eq!(options.offset, 0);
    assert_eq!(options.order_by, OrderSpec::primary_key());
}

#[test]
fn even_split_yields_full_batches_only() {
    let batches = in_batches(
        RecordingQuery::with_total(10),
        BatchOptions::new().batch_size(2),
    )
    .unwrap();

    assert_eq!(
        windows_of(batches),
        vec![(0, 2), (2, 2), (4, 2), (6, 2), (8, 2)]
    );
}

#[test]
fn uneven_split_ends_with_remainder_batch() {
    let batches = in_batches(
        RecordingQuery::with_total(10),
        BatchOptions::new().batch_size(3).to(10),
    )
    .unwrap();

    assert_eq!(windows_of(batches), vec![(0, 3), (3, 3), (6, 3), (9, 1)]);
}

#[test]
fn range_shorter_than_batch_is_one_batch() {
    let batches = in_batches(
        RecordingQuery::with_total(4),
        BatchOptions::new().batch_size(2).offset(3),
    )
    .unwrap();

    assert_eq!(windows_of(batches), vec![(3, 1)]);
}

#[test]
fn offset_equal_to_end_yields_nothing() {
    let batcher = Batcher::new(
        RecordingQuery::with_total(4),
        BatchOptions::new().offset(4),
    )
    .unwrap();

    assert!(batcher.is_empty());
    assert_eq!(batcher.len(), 0);
    assert_eq!(batcher.batches().count(), 0);
}

#[test]
fn explicit_end_never_counts() {
    let source = RecordingQuery::with_total(4);
    let batches = in_batches(source.clone(), BatchOptions::new().to(1)).unwrap();

    assert_eq!(windows_of(batches), vec![(0, 1)]);
    assert_eq!(source.count_calls(), 0);
}

#[test]
fn default_end_counts_exactly_once() {
    let source = RecordingQuery::with_total(7);
    let batcher = Batcher::new(source.clone(), BatchOptions::new().batch_size(3)).unwrap();

    assert_eq!(batcher.to(), 7);
    let _ = batcher.batches().count();
    let _ = batcher.batches().count();

    assert_eq!(source.count_calls(), 1);
}

#[test]
fn zero_batch_size_is_rejected_before_counting() {
    let source = RecordingQuery::with_total(10);
    let err = Batcher::new(source.clone(), BatchOptions::new().batch_size(0)).unwrap_err();

    assert!(matches!(err, BatchError::Config(ConfigError::ZeroBatchSize)));
    assert_eq!(source.count_calls(), 0);
}

#[test]
fn offset_past_counted_end_is_rejected() {
    let err = Batcher::new(
        RecordingQuery::with_total(4),
        BatchOptions::new().offset(5),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        BatchError::Config(ConfigError::OffsetPastEnd { offset: 5, to: 4 })
    ));
}

#[test]
fn count_failure_surfaces_as_store_error() {
    let source =
        RecordingQuery::with_total(10).failing_count(StoreError::unavailable("no primary"));
    let err = Batcher::new(source, BatchOptions::new()).unwrap_err();

    assert!(err.is_store());
    assert_eq!(err.to_string(), "no primary");
}

#[test]
fn unordered_source_gets_configured_order_once() {
    let order = OrderSpec::new().desc("id");
    let batches = in_batches(
        RecordingQuery::with_total(5),
        BatchOptions::new().batch_size(2).order_by(order.clone()),
    )
    .unwrap();

    let queries: Vec<_> = batches.collect();
    assert_eq!(queries.len(), 3);
    for query in &queries {
        assert_eq!(query.order.as_ref(), Some(&order));
        assert_eq!(query.order_calls, 1);
    }
}

#[test]
fn unordered_source_defaults_to_primary_key_order() {
    let batches = in_batches(
        RecordingQuery::with_total(3),
        BatchOptions::new().batch_size(2),
    )
    .unwrap();

    for query in batches {
        assert_eq!(query.order, Some(OrderSpec::primary_key()));
    }
}

#[test]
fn preordered_source_keeps_its_own_order() {
    let batcher = Batcher::new(
        RecordingQuery::with_total(10).preordered(),
        BatchOptions::new().batch_size(5).order_by(OrderSpec::new().desc("x")),
    )
    .unwrap();

    for query in batcher.batches() {
        assert_eq!(query.order, None);
        assert_eq!(query.order_calls, 0);
        assert!(query.preordered);
    }
    for query in batcher.into_batches() {
        assert_eq!(query.order_calls, 0);
    }
}

#[test]
fn sequences_restart_from_offset() {
    let batcher = Batcher::new(
        RecordingQuery::with_total(10),
        BatchOptions::new().batch_size(4).offset(1),
    )
    .unwrap();

    let mut first = batcher.batches();
    assert_eq!(first.next().map(|q| q.window()), Some((1, 4)));
    drop(first);

    assert_eq!(
        windows_of(batcher.batches()),
        vec![(1, 4), (5, 4), (9, 1)]
    );
}

#[test]
fn identical_options_give_identical_sequences() {
    let options = BatchOptions::new().batch_size(3).offset(2).to(17);

    let left = windows_of(in_batches(RecordingQuery::with_total(20), options.clone()).unwrap());
    let right = windows_of(in_batches(RecordingQuery::with_total(20), options).unwrap());

    assert_eq!(left, right);
}

#[test]
fn sequence_reports_exact_length() {
    let mut batches = in_batches(
        RecordingQuery::with_total(10),
        BatchOptions::new().batch_size(3),
    )
    .unwrap();

    assert_eq!(batches.len(), 4);
    batches.next();
    assert_eq!(batches.len(), 3);
    batches.by_ref().for_each(drop);
    assert_eq!(batches.len(), 0);
    assert!(batches.next().is_none());
}

#[test]
fn windows_match_descriptors_without_a_store() {
    let batcher = Batcher::new(
        RecordingQuery::with_total(0),
        BatchOptions::new().batch_size(4).offset(2).to(11),
    )
    .unwrap();

    let windows: Vec<_> = batcher.windows().collect();
    assert_eq!(
        windows,
        vec![
            BatchWindow::new(2, 4),
            BatchWindow::new(6, 4),
            BatchWindow::new(10, 1),
        ]
    );
    assert_eq!(windows.last().map(BatchWindow::end), Some(11));
    assert_eq!(
        windows_of(batcher.batches()),
        vec![(2, 4), (6, 4), (10, 1)]
    );
}

#[test]
fn next_with_window_pairs_query_and_window() {
    let mut batches = in_batches(
        RecordingQuery::with_total(3),
        BatchOptions::new().batch_size(2),
    )
    .unwrap();

    let (window, query) = batches.next_with_window().unwrap();
    assert_eq!(window, BatchWindow::new(0, 2));
    assert_eq!(query.window(), (0, 2));
    assert_eq!(batches.base().limit, None);
}
