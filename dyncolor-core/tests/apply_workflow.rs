mod common;

use std::sync::mpsc;
use std::sync::Arc;

use common::{png_bytes, FakeFetcher, RecordingSetter, WAIT};
use dyncolor_core::{
    ApplyError, ApplyOutcome, DecodedImage, FetchError, ImageFetcher, WallpaperApplier, WallpaperError,
};

const URL_A: &str = "https://example.com/a.jpg";
const URL_B: &str = "https://example.com/b.jpg";

fn applier(fetcher: &Arc<FakeFetcher>, setter: &Arc<RecordingSetter>) -> WallpaperApplier {
    WallpaperApplier::new(fetcher.clone(), setter.clone())
}

#[test]
fn successful_decode_sets_wallpaper_once_and_reports_once() {
    let fetcher = Arc::new(FakeFetcher::serving(URL_A, png_bytes(4, 3)));
    let setter = Arc::new(RecordingSetter::default());
    let (tx, rx) = mpsc::channel();

    applier(&fetcher, &setter).apply(URL_A, move |outcome| tx.send(outcome).unwrap());

    let outcome = rx.recv_timeout(WAIT).unwrap();
    assert!(outcome.is_success(), "{:?}", outcome);
    assert_eq!(outcome.url(), URL_A);
    assert_eq!(setter.calls(), vec![URL_A.to_string()]);
    // The sender was moved into a FnOnce that already ran.
    assert!(rx.recv_timeout(WAIT).is_err());
}

#[test]
fn fetch_failure_never_touches_the_wallpaper() {
    let fetcher = Arc::new(FakeFetcher::serving(URL_A, b"not an image".to_vec()));
    let setter = Arc::new(RecordingSetter::default());
    let (tx, rx) = mpsc::channel();

    applier(&fetcher, &setter).apply(URL_A, move |outcome| tx.send(outcome).unwrap());

    let outcome = rx.recv_timeout(WAIT).unwrap();
    assert!(matches!(
        outcome,
        ApplyOutcome::Failed {
            error: ApplyError::Fetch(FetchError::Decode { .. }),
            ..
        }
    ));
    assert!(setter.calls().is_empty());
    assert!(rx.recv_timeout(WAIT).is_err());
}

#[test]
fn platform_rejection_is_reported_not_raised() {
    let fetcher = Arc::new(FakeFetcher::serving(URL_A, png_bytes(2, 2)));
    let setter = Arc::new(RecordingSetter::rejecting());
    let (tx, rx) = mpsc::channel();

    applier(&fetcher, &setter).apply(URL_A, move |outcome| tx.send(outcome).unwrap());

    let outcome = rx.recv_timeout(WAIT).unwrap();
    assert!(matches!(
        outcome,
        ApplyOutcome::Failed {
            error: ApplyError::Rejected(WallpaperError::Platform(_)),
            ..
        }
    ));
    assert_eq!(setter.calls().len(), 1);
}

#[test]
fn apply_returns_before_the_fetch_finishes() {
    let fetcher = Arc::new(FakeFetcher::serving(URL_A, png_bytes(2, 2)));
    let release = fetcher.gate(URL_A);
    let setter = Arc::new(RecordingSetter::default());
    let (tx, rx) = mpsc::channel();

    let ticket = applier(&fetcher, &setter).apply(URL_A, move |outcome| tx.send(outcome).unwrap());
    assert_eq!(ticket.id(), 1);
    assert!(rx.try_recv().is_err());
    assert!(setter.calls().is_empty());

    release.send(()).unwrap();
    assert!(rx.recv_timeout(WAIT).unwrap().is_success());
}

#[test]
fn newer_request_supersedes_a_slower_older_one() {
    let fetcher = Arc::new(FakeFetcher::default());
    fetcher.serve(URL_A, png_bytes(2, 2));
    fetcher.serve(URL_B, png_bytes(3, 3));
    let release_a = fetcher.gate(URL_A);
    let setter = Arc::new(RecordingSetter::default());
    let applier = applier(&fetcher, &setter);
    let (tx, rx) = mpsc::channel();

    let tx_a = tx.clone();
    let first = applier.apply(URL_A, move |outcome| tx_a.send(outcome).unwrap());
    let second = applier.apply(URL_B, move |outcome| tx.send(outcome).unwrap());
    assert!(second > first);
    assert_eq!(applier.latest_ticket(), Some(second));

    let newest = rx.recv_timeout(WAIT).unwrap();
    assert!(newest.is_success());
    assert_eq!(newest.url(), URL_B);

    release_a.send(()).unwrap();
    let older = rx.recv_timeout(WAIT).unwrap();
    assert!(matches!(older, ApplyOutcome::Superseded { ref url, ticket } if url == URL_A && ticket == first));
    assert_eq!(newest.ticket(), second);

    assert_eq!(setter.calls(), vec![URL_B.to_string()]);
}

#[test]
fn sequential_requests_each_apply() {
    let fetcher = Arc::new(FakeFetcher::default());
    fetcher.serve(URL_A, png_bytes(2, 2));
    fetcher.serve(URL_B, png_bytes(2, 2));
    let setter = Arc::new(RecordingSetter::default());
    let applier = applier(&fetcher, &setter);

    for url in [URL_A, URL_B] {
        let (tx, rx) = mpsc::channel();
        applier.apply(url, move |outcome| tx.send(outcome).unwrap());
        assert!(rx.recv_timeout(WAIT).unwrap().is_success());
    }
    assert_eq!(setter.calls(), vec![URL_A.to_string(), URL_B.to_string()]);
}

struct PanickingFetcher;

impl ImageFetcher for PanickingFetcher {
    fn fetch(&self, url: &str) -> Result<DecodedImage, FetchError> {
        panic!("fetcher blew up on {url}");
    }
}

#[test]
fn worker_panic_reports_one_aborted_failure() {
    let setter = Arc::new(RecordingSetter::default());
    let applier = WallpaperApplier::new(Arc::new(PanickingFetcher), setter.clone());
    let (tx, rx) = mpsc::channel();

    let ticket = applier.apply(URL_A, move |outcome| tx.send(outcome).unwrap());

    let outcome = rx.recv_timeout(WAIT).unwrap();
    assert!(
        matches!(
            outcome,
            ApplyOutcome::Failed {
                error: ApplyError::Aborted(_),
                ..
            }
        ),
        "{:?}",
        outcome
    );
    assert_eq!(outcome.url(), URL_A);
    assert_eq!(outcome.ticket(), ticket);
    assert!(rx.recv_timeout(WAIT).is_err());
    assert!(setter.calls().is_empty());
}
