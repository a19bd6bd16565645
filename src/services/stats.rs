// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Daily stats for the dashboard header.
//!
//! One-shot computation folds a partner's orders into today's count and
//! earnings. The live variant keeps a document map current from a
//! Firestore listener and publishes a recomputed `DailyStats` through a
//! watch channel whenever a matching order changes, so no polling is
//! involved.

use std::collections::HashMap;

use tokio::sync::{mpsc, watch};

use crate::db::{FirestoreDb, OrderChange, OrdersListener};
use crate::error::AppError;
use crate::models::{DailyStats, Order};

/// Compute today's stats from the current order set.
pub async fn daily_stats(db: &FirestoreDb, partner_id: &str) -> Result<DailyStats, AppError> {
    let orders = db.orders_for_partner(partner_id).await?;
    Ok(DailyStats::from_orders(orders.iter(), chrono::Utc::now()))
}

/// A running live-stats subscription.
///
/// Dropping the watch tears down the fold task and the backing listener.
pub struct StatsWatch {
    pub receiver: watch::Receiver<DailyStats>,
    listener: Option<OrdersListener>,
    fold_task: tokio::task::JoinHandle<()>,
}

impl Drop for StatsWatch {
    fn drop(&mut self) {
        self.fold_task.abort();
        if let Some(listener) = self.listener.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move { listener.shutdown().await });
            }
        }
    }
}

/// Subscribe to a partner's daily stats.
///
/// The initial listener snapshot arrives as a burst of upserts, so the
/// first published values converge on the current stats without a
/// separate query.
pub async fn watch_daily_stats(
    db: &FirestoreDb,
    partner_id: &str,
) -> Result<StatsWatch, AppError> {
    let (change_tx, mut change_rx) = mpsc::unbounded_channel();
    let (stats_tx, stats_rx) = watch::channel(DailyStats::default());

    let listener = db.listen_partner_orders(partner_id, change_tx).await?;
    let partner_id = partner_id.to_string();

    let fold_task = tokio::spawn(async move {
        let mut orders: HashMap<String, Order> = HashMap::new();

        while let Some(change) = change_rx.recv().await {
            match change {
                OrderChange::Upsert(doc_id, order) => {
                    orders.insert(doc_id, order);
                }
                OrderChange::Remove(doc_id) => {
                    orders.remove(&doc_id);
                }
            }

            let stats = DailyStats::from_orders(orders.values(), chrono::Utc::now());
            if stats_tx.send(stats).is_err() {
                break; // all receivers gone
            }
        }

        tracing::debug!(partner_id = %partner_id, "Stats fold task finished");
    });

    Ok(StatsWatch {
        receiver: stats_rx,
        listener: Some(listener),
        fold_task,
    })
}
