//! Deferred content binding
//!
//! A template waiting on fetched content is tagged with a correlation id
//! before it is cloned, so every copy carries the same id. Once the fetch
//! completes, the nodes are found again by id and their text is replaced
//! with the JSON text of the result.

use std::time::Duration;

use cssgen_dom::{CorrelationId, ElementTree};
use cssgen_net::NetError;
use smol::{channel, future::FutureExt, LocalExecutor, Timer};

use crate::PendingContent;

/// Monotonic correlation id source, starting at 1
#[derive(Debug)]
pub struct CorrelationIds {
    next: u64,
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl CorrelationIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id; ids are never reused
    pub fn issue(&mut self) -> CorrelationId {
        let id = CorrelationId(self.next);
        self.next += 1;
        id
    }
}

/// Outcome of one `settle` pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettleReport {
    /// Fetches that produced a value
    pub resolved: usize,
    /// Fetches that failed or timed out
    pub failed: usize,
    /// Nodes whose text was replaced
    pub nodes_updated: usize,
}

/// Tracks content fetches and the nodes waiting on them
#[derive(Debug, Default)]
pub struct DeferredBinder {
    ids: CorrelationIds,
    pending: Vec<(CorrelationId, PendingContent)>,
}

impl DeferredBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `template` with a fresh id and hold on to its fetch
    pub fn defer<T: ElementTree>(
        &mut self,
        tree: &mut T,
        template: T::Node,
        content: PendingContent,
    ) -> CorrelationId {
        let id = self.ids.issue();
        tree.tag_with_correlation_id(template, id);
        tracing::debug!("Content for {} deferred on {}", id, content.url);
        self.pending.push((id, content));
        id
    }

    /// Number of fetches not yet settled
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drive every pending fetch to completion or timeout and bind the
    /// results, in completion order
    pub async fn settle<T: ElementTree>(&mut self, tree: &mut T, timeout: Duration) -> SettleReport {
        let pending = std::mem::take(&mut self.pending);
        let mut report = SettleReport::default();
        if pending.is_empty() {
            return report;
        }
        tracing::info!("Settling {} pending content fetch(es)", pending.len());

        let executor = LocalExecutor::new();
        let (tx, rx) = channel::unbounded();
        for (id, content) in pending {
            let tx = tx.clone();
            let PendingContent { url, future } = content;
            executor
                .spawn(async move {
                    let expired = async {
                        Timer::after(timeout).await;
                        Err(NetError::Timeout(timeout))
                    };
                    let result = future.or(expired).await;
                    // The receiver outlives every task
                    let _ = tx.send((id, url, result)).await;
                })
                .detach();
        }
        drop(tx);

        executor
            .run(async {
                while let Ok((id, url, result)) = rx.recv().await {
                    match result {
                        Ok(value) => {
                            report.resolved += 1;
                            report.nodes_updated += apply(tree, id, &value);
                        }
                        Err(e) => {
                            report.failed += 1;
                            tracing::warn!("Content fetch {} for {} failed: {}", url, id, e);
                        }
                    }
                }
            })
            .await;

        report
    }
}

/// Replace the text of every connected node carrying `id` with the JSON text
/// of `value`, returning how many nodes were touched
pub fn apply<T: ElementTree>(tree: &mut T, id: CorrelationId, value: &serde_json::Value) -> usize {
    let text = value.to_string();
    let nodes = tree.find_by_correlation_id(id);
    for &node in &nodes {
        tree.clear_text_content(node);
        tree.set_text_content(node, &text);
    }
    tracing::debug!("Bound {} to {} node(s) for {}", text, nodes.len(), id);
    nodes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssgen_dom::Document;
    use cssgen_net::JsonFuture;

    fn ready(value: serde_json::Value) -> JsonFuture {
        Box::pin(async move { Ok(value) })
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut ids = CorrelationIds::new();
        assert_eq!(ids.issue(), CorrelationId(1));
        assert_eq!(ids.issue(), CorrelationId(2));
        assert_eq!(ids.issue(), CorrelationId(3));
    }

    #[test]
    fn test_settle_binds_json_text() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let mut binder = DeferredBinder::new();
        binder.defer(&mut doc, p, PendingContent::new("a.json", ready(serde_json::json!({"a": 1}))));
        let body = doc.body();
        doc.append_children(body, &[p]);

        let report = smol::block_on(binder.settle(&mut doc, Duration::from_secs(1)));
        assert_eq!(report.resolved, 1);
        assert_eq!(report.nodes_updated, 1);
        assert_eq!(doc.tree.text_content(p), r#"{"a":1}"#);
        assert_eq!(binder.pending(), 0);
    }

    #[test]
    fn test_failed_fetch_leaves_node_empty() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let mut binder = DeferredBinder::new();
        let failing: JsonFuture = Box::pin(async { Err(NetError::HttpError { status: 404 }) });
        binder.defer(&mut doc, p, PendingContent::new("gone.json", failing));
        let body = doc.body();
        doc.append_children(body, &[p]);

        let report = smol::block_on(binder.settle(&mut doc, Duration::from_secs(1)));
        assert_eq!(report.failed, 1);
        assert_eq!(doc.tree.text_content(p), "");
    }

    #[test]
    fn test_settle_without_pending_is_noop() {
        let mut doc = Document::new();
        let mut binder = DeferredBinder::new();
        let report = smol::block_on(binder.settle(&mut doc, Duration::from_millis(1)));
        assert_eq!(report, SettleReport::default());
    }
}
