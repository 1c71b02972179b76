//! The fetch-then-set wallpaper workflow.
//!
//! Every call to [`WallpaperApplier::apply`] returns at once and later invokes
//! its completion callback exactly once, from a worker thread. Overlapping
//! requests resolve as "latest wins": an attempt whose image arrives after a
//! newer attempt was issued leaves the wallpaper alone and completes as
//! [`ApplyOutcome::Superseded`].

use log::{error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use thiserror::Error;

use crate::fetch::{FetchError, ImageFetcher};
use crate::wallpaper::{WallpaperError, WallpaperSetter};

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Rejected(#[from] WallpaperError),
    #[error("wallpaper worker aborted: {0}")]
    Aborted(String),
}

#[derive(Debug)]
pub enum ApplyOutcome {
    Applied { ticket: ApplyTicket, url: String },
    Failed { ticket: ApplyTicket, url: String, error: ApplyError },
    Superseded { ticket: ApplyTicket, url: String },
}

impl ApplyOutcome {
    pub fn url(&self) -> &str {
        match self {
            ApplyOutcome::Applied { url, .. }
            | ApplyOutcome::Failed { url, .. }
            | ApplyOutcome::Superseded { url, .. } => url,
        }
    }

    /// The attempt this outcome belongs to.
    pub fn ticket(&self) -> ApplyTicket {
        match self {
            ApplyOutcome::Applied { ticket, .. }
            | ApplyOutcome::Failed { ticket, .. }
            | ApplyOutcome::Superseded { ticket, .. } => *ticket,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Identifies one apply attempt. Later attempts carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApplyTicket(pub(crate) u64);

impl ApplyTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Clone)]
pub struct WallpaperApplier {
    fetcher: Arc<dyn ImageFetcher>,
    setter: Arc<dyn WallpaperSetter>,
    latest: Arc<AtomicU64>,
    // Held across the generation check and the wallpaper call.
    apply_lock: Arc<Mutex<()>>,
}

impl WallpaperApplier {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, setter: Arc<dyn WallpaperSetter>) -> Self {
        Self {
            fetcher,
            setter,
            latest: Arc::new(AtomicU64::new(0)),
            apply_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn latest_ticket(&self) -> Option<ApplyTicket> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            id => Some(ApplyTicket(id)),
        }
    }

    /// Starts fetching `url` in the background and returns immediately.
    /// `on_complete` runs exactly once with the outcome of this attempt.
    pub fn apply<F>(&self, url: &str, on_complete: F) -> ApplyTicket
    where
        F: FnOnce(ApplyOutcome) + Send + 'static,
    {
        let ticket = ApplyTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        info!("Apply #{} requested for {}", ticket.id(), url);

        // Shared so the callback is still reachable if the thread never starts.
        let completion = Arc::new(Mutex::new(Some(on_complete)));
        let worker = self.clone();
        let worker_url = url.to_string();
        let worker_completion = Arc::clone(&completion);

        let spawned = thread::Builder::new()
            .name(format!("wallpaper-apply-{}", ticket.id()))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker.run(ticket, &worker_url)))
                    .unwrap_or_else(|_| {
                        error!("Apply #{} worker panicked", ticket.id());
                        ApplyOutcome::Failed {
                            ticket,
                            url: worker_url.clone(),
                            error: ApplyError::Aborted("worker panicked".to_string()),
                        }
                    });
                complete(&worker_completion, outcome);
            });

        if let Err(e) = spawned {
            error!("Failed to start wallpaper worker: {}", e);
            complete(
                &completion,
                ApplyOutcome::Failed {
                    ticket,
                    url: url.to_string(),
                    error: ApplyError::Aborted(e.to_string()),
                },
            );
        }

        ticket
    }

    fn run(&self, ticket: ApplyTicket, url: &str) -> ApplyOutcome {
        let image = match self.fetcher.fetch(url) {
            Ok(image) => image,
            Err(e) => {
                warn!("Apply #{}: fetch failed: {}", ticket.id(), e);
                return ApplyOutcome::Failed {
                    ticket,
                    url: url.to_string(),
                    error: e.into(),
                };
            }
        };

        let _guard = self.apply_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.latest.load(Ordering::SeqCst) != ticket.id() {
            info!("Apply #{} superseded by a newer request", ticket.id());
            return ApplyOutcome::Superseded {
                ticket,
                url: url.to_string(),
            };
        }

        match self.setter.set_wallpaper(&image) {
            Ok(()) => {
                info!(
                    "Apply #{}: wallpaper replaced with {}x{} image",
                    ticket.id(),
                    image.width(),
                    image.height()
                );
                ApplyOutcome::Applied {
                    ticket,
                    url: url.to_string(),
                }
            }
            Err(e) => {
                warn!("Apply #{}: wallpaper rejected: {}", ticket.id(), e);
                ApplyOutcome::Failed {
                    ticket,
                    url: url.to_string(),
                    error: e.into(),
                }
            }
        }
    }
}

fn complete<F>(slot: &Mutex<Option<F>>, outcome: ApplyOutcome)
where
    F: FnOnce(ApplyOutcome),
{
    let callback = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(callback) = callback {
        callback(outcome);
    }
}
