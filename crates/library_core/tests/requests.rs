use library_core::db::open_db_in_memory;
use library_core::{
    CollectionStore, FixedClock, RequestResolution, RequestService, RequestStatus, ServiceError,
    SqliteCollectionStore, TransitionOutcome,
};
use uuid::Uuid;

const NOW: i64 = 1_700_000_000_000;

#[test]
fn request_book_appends_pending_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollectionStore::new(&conn);
    store.initialize().unwrap();
    let service = RequestService::with_clock(store, FixedClock(NOW));

    let created = service.request_book("Foo", "Bar", "alice@x.com").unwrap();
    assert_eq!(created.status, RequestStatus::Pending);
    assert_eq!(created.date, NOW);
    assert_eq!(created.requested_by, "alice@x.com");

    let all = service.list_requests().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], created);
}

#[test]
fn requests_are_not_matched_against_inventory() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollectionStore::new(&conn);
    store.initialize().unwrap();
    let service = RequestService::with_clock(store, FixedClock(NOW));

    service
        .request_book("The Great Gatsby", "F. Scott Fitzgerald", "alice@x.com")
        .unwrap();
    service.request_book("Nope", "Nobody", "alice@x.com").unwrap();
    assert_eq!(service.list_requests().unwrap().len(), 2);
}

#[test]
fn request_book_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let service = RequestService::with_clock(SqliteCollectionStore::new(&conn), FixedClock(NOW));

    let err = service.request_book(" ", "Bar", "alice@x.com").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest(_)));
    assert!(service.list_requests().unwrap().is_empty());
}

#[test]
fn list_preserves_storage_order_and_filters_by_patron() {
    let conn = open_db_in_memory().unwrap();
    let service = RequestService::with_clock(SqliteCollectionStore::new(&conn), FixedClock(NOW));

    let first = service.request_book("A", "One", "alice@x.com").unwrap();
    let second = service.request_book("B", "Two", "bob@x.com").unwrap();
    let third = service.request_book("C", "Three", "alice@x.com").unwrap();

    let ids = service
        .list_requests()
        .unwrap()
        .into_iter()
        .map(|request| request.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    let alice = service.requests_for("alice@x.com").unwrap();
    assert_eq!(alice, vec![first, third]);
}

#[test]
fn resolve_moves_pending_to_terminal_status_once() {
    let conn = open_db_in_memory().unwrap();
    let service = RequestService::with_clock(SqliteCollectionStore::new(&conn), FixedClock(NOW));
    let request = service.request_book("Foo", "Bar", "alice@x.com").unwrap();

    let approved = service
        .resolve_request(request.id, RequestResolution::Approve)
        .unwrap()
        .into_applied()
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);

    let again = service
        .resolve_request(request.id, RequestResolution::Reject)
        .unwrap();
    assert_eq!(again, TransitionOutcome::InvalidState(RequestStatus::Approved));
    assert_eq!(
        service.list_requests().unwrap()[0].status,
        RequestStatus::Approved
    );
}

#[test]
fn resolve_unknown_request_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = RequestService::with_clock(SqliteCollectionStore::new(&conn), FixedClock(NOW));

    let outcome = service
        .resolve_request(Uuid::now_v7(), RequestResolution::Approve)
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::NotFound);
}
