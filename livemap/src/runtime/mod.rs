//! Poll and animation driver.
//!
//! Runs a [`LiveSession`](crate::session::LiveSession) on tokio: a poll
//! timer fetching snapshots (immediately on start), a frame timer advancing
//! animations while any are in flight, a visibility gate suspending all work
//! while the map is hidden, and a UI event channel. Everything runs on one
//! task; fetches are the only spawned work.
//!
//! Fetches may overlap. Each request carries a monotonically increasing
//! sequence number and a response older than the newest applied one is
//! discarded, so a slow early poll can never overwrite fresher data.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::feed::{FeedError, RawVehicle, SnapshotFeed};
use crate::session::{LiveSession, UiEvent};
use crate::surface::RenderSurface;

/// Drive a session until the shutdown token fires.
///
/// `visibility` carries whether the map is currently visible; while hidden
/// no polling or animation work happens, and regaining visibility triggers
/// an immediate poll.
pub async fn run<S: RenderSurface>(
    session: &mut LiveSession<S>,
    feed: Arc<dyn SnapshotFeed>,
    mut events: mpsc::Receiver<UiEvent>,
    mut visibility: watch::Receiver<bool>,
    shutdown: CancellationToken,
) {
    let config = session.config().clone();
    let metrics = session.metrics();

    let mut poll = tokio::time::interval(config.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frame = tokio::time::interval(config.frame_interval);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut fetches: JoinSet<(u64, Result<Vec<RawVehicle>, FeedError>)> = JoinSet::new();
    let mut next_seq: u64 = 0;
    let mut applied_seq: u64 = 0;
    let mut visible = *visibility.borrow();
    let mut visibility_open = true;

    info!(endpoint = %config.endpoint, "Live map runtime started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Live map runtime shutting down");
                break;
            }

            _ = poll.tick(), if visible => {
                next_seq += 1;
                let feed = Arc::clone(&feed);
                let seq = next_seq;
                fetches.spawn(async move { (seq, feed.fetch().await) });
            }

            Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                match joined {
                    Ok((seq, Ok(records))) => {
                        if seq < applied_seq {
                            metrics.stale_dropped();
                            debug!(seq, applied_seq, "Discarding stale snapshot response");
                        } else {
                            applied_seq = seq;
                            session.apply_snapshot(&records, Instant::now());
                        }
                    }
                    Ok((_, Err(e))) => {
                        metrics.fetch_failed();
                        warn!(error = %e, "Snapshot fetch failed, retrying at next poll");
                    }
                    Err(e) => {
                        metrics.fetch_failed();
                        warn!(error = %e, "Snapshot fetch task failed");
                    }
                }
            }

            _ = frame.tick(), if visible && session.has_active_animations() => {
                session.advance_animations(Instant::now());
            }

            changed = visibility.changed(), if visibility_open => {
                if changed.is_err() {
                    // Sender gone; keep running with the last known state.
                    visibility_open = false;
                    continue;
                }
                let now_visible = *visibility.borrow_and_update();
                if now_visible && !visible {
                    info!("Visibility regained, polling resumes immediately");
                    poll.reset_immediately();
                } else if !now_visible && visible {
                    info!("Visibility lost, polling suspended");
                }
                visible = now_visible;
            }

            Some(event) = events.recv() => {
                let selection_changed = matches!(event, UiEvent::Selection(_));
                session.handle_event(event);
                // Selection changes refresh the map right away instead of
                // waiting out the poll interval.
                if selection_changed && visible {
                    poll.reset_immediately();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use crate::feed::{MockSnapshotFeed, StaticTripLookup, TripInfo};
    use crate::selection::MemoryStore;
    use crate::session::SelectionCommand;
    use crate::surface::tests::RecordingSurface;
    use std::time::Duration;

    fn make_session(poll_ms: u64) -> LiveSession<RecordingSurface> {
        let lookup = StaticTripLookup::from_entries([(
            "trip-14".to_string(),
            TripInfo {
                line: "14".to_string(),
                headsign: None,
                vehicle_type: Some(401),
            },
        )]);
        LiveSession::new(
            RecordingSurface::new(),
            Box::new(lookup),
            Box::new(MemoryStore::new()),
            AppConfig::new("https://example.test/vehicles")
                .with_poll_interval(Duration::from_millis(poll_ms)),
        )
    }

    fn snapshot() -> Vec<RawVehicle> {
        vec![RawVehicle {
            id: Some("v1".to_string()),
            lat: Some(59.33),
            lon: Some(18.07),
            trip_id: Some("trip-14".to_string()),
            ..Default::default()
        }]
    }

    fn cancel_after(shutdown: &CancellationToken, delay: Duration) {
        let token = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            token.cancel();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_are_applied() {
        let mut session = make_session(100);
        let feed = Arc::new(MockSnapshotFeed {
            response: Ok(snapshot()),
        });
        let (_event_tx, event_rx) = mpsc::channel(8);
        let (_vis_tx, vis_rx) = watch::channel(true);
        let shutdown = CancellationToken::new();
        cancel_after(&shutdown, Duration::from_millis(350));

        run(&mut session, feed, event_rx, vis_rx, shutdown).await;

        assert!(session.is_tracked("v1"));
        // First poll fires immediately, then every interval.
        assert!(session.metrics().snapshot().ticks_applied >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_keeps_polling() {
        let mut session = make_session(100);
        let feed = Arc::new(MockSnapshotFeed {
            response: Err(FeedError::Status(502)),
        });
        let (_event_tx, event_rx) = mpsc::channel(8);
        let (_vis_tx, vis_rx) = watch::channel(true);
        let shutdown = CancellationToken::new();
        cancel_after(&shutdown, Duration::from_millis(350));

        run(&mut session, feed, event_rx, vis_rx, shutdown).await;

        assert_eq!(session.tracked_count(), 0);
        let metrics = session.metrics().snapshot();
        assert!(metrics.fetch_failures >= 2, "kept retrying each poll");
        assert_eq!(metrics.ticks_applied, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_map_is_fully_suspended() {
        let mut session = make_session(100);
        let feed = Arc::new(MockSnapshotFeed {
            response: Ok(snapshot()),
        });
        let (_event_tx, event_rx) = mpsc::channel(8);
        let (vis_tx, vis_rx) = watch::channel(false);
        let shutdown = CancellationToken::new();

        // Stay hidden for many poll intervals, then become visible and let
        // one immediate poll land before shutting down.
        let token = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let _ = vis_tx.send(true);
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        run(&mut session, feed, event_rx, vis_rx, shutdown).await;

        let metrics = session.metrics().snapshot();
        // Nothing happened while hidden; the regain tick ran right away.
        assert!(metrics.ticks_applied >= 1);
        assert!(metrics.ticks_applied <= 2);
        assert!(session.is_tracked("v1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_event_triggers_refresh() {
        let mut session = make_session(60_000);
        let feed = Arc::new(MockSnapshotFeed {
            response: Ok(snapshot()),
        });
        let (event_tx, event_rx) = mpsc::channel(8);
        let (_vis_tx, vis_rx) = watch::channel(true);
        let shutdown = CancellationToken::new();

        let token = shutdown.clone();
        tokio::spawn(async move {
            // Let the initial poll land, then clear the selection.
            tokio::time::sleep(Duration::from_millis(100)).await;
            event_tx
                .send(UiEvent::Selection(SelectionCommand::Clear))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        run(&mut session, feed, event_rx, vis_rx, shutdown).await;

        // The clear evicted everything and the refresh kept it empty.
        assert_eq!(session.tracked_count(), 0);
        assert!(session.selection().is_none());
    }
}
