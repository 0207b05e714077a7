use facsimile::Value;
use facsimile::value::{Deferred, ErrorObject};

fn duplicate_deferred(input: &Deferred) -> Deferred {
    match facsimile::duplicate(&Value::Deferred(input.clone())).unwrap() {
        Value::Deferred(copy) => copy,
        other => panic!("expected a deferred, got {}", other.category()),
    }
}

#[tokio::test]
async fn copy_settles_with_the_same_value() {
    let input = Deferred::resolved(Value::from(true));
    let copy = duplicate_deferred(&input);

    assert!(!copy.ptr_eq(&input));
    let expected = input.settled().await.unwrap();
    let actual = copy.settled().await.unwrap();
    assert!(actual.same_value(&expected));
}

#[tokio::test]
async fn copy_settles_with_the_same_rejection() {
    let reason = Value::Error(ErrorObject::generic("boom"));
    let copy = duplicate_deferred(&Deferred::rejected(reason.clone()));

    let rejected = copy.settled().await.unwrap_err();
    assert!(rejected.same_value(&reason));
}

#[tokio::test]
async fn copy_waits_for_a_pending_source() {
    let (resolver, input) = Deferred::pending();
    let copy = duplicate_deferred(&input);
    assert!(copy.peek().is_none());

    let waiter = tokio::spawn({
        let copy = copy.clone();
        async move { copy.settled().await }
    });
    resolver.resolve(Value::from(42));

    let settled = waiter.await.unwrap().unwrap();
    assert_eq!(settled.as_number(), Some(42.0));
    assert_eq!(input.settled().await.unwrap().as_number(), Some(42.0));
}

#[tokio::test]
async fn producer_runs_once() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let runs = Arc::new(AtomicUsize::new(0));
    let input = Deferred::from_future({
        let runs = runs.clone();
        async move {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from("done"))
        }
    });
    let first = duplicate_deferred(&input);
    let second = duplicate_deferred(&first);

    assert_eq!(second.settled().await.unwrap().as_text(), Some("done"));
    assert_eq!(first.settled().await.unwrap().as_text(), Some("done"));
    assert_eq!(input.settled().await.unwrap().as_text(), Some("done"));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropped_resolver_rejects() {
    let (resolver, input) = Deferred::pending();
    let copy = duplicate_deferred(&input);
    drop(resolver);

    let Value::Error(error) = copy.settled().await.unwrap_err() else {
        panic!("expected an error value");
    };
    assert_eq!(error.message(), "deferred computation abandoned");
    assert!(copy.peek().is_some());
}
