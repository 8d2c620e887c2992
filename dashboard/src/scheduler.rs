use std::time::Duration;

use common::MountPoint;
use tokio::sync::mpsc::UnboundedSender;

pub const ERROR_DISMISS_DELAY: Duration = Duration::from_secs(5);
pub const RELAYOUT_DELAY: Duration = Duration::from_millis(100);

/// Work the controller wants done later, on the same event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    DismissError { generation: u64 },
    Relayout { mount: MountPoint },
}

pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Deferred);
}

/// Sleeps on the tokio timer, then posts the task back to the driver loop.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tx: UnboundedSender<Deferred>,
}

impl TokioScheduler {
    pub fn new(tx: UnboundedSender<Deferred>) -> Self {
        TokioScheduler { tx }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Deferred) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Driver already gone, nothing left to update
            let _ = tx.send(task);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_tasks_arrive_in_delay_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx);

        scheduler.schedule(Duration::from_millis(60), Deferred::DismissError { generation: 1 });
        scheduler.schedule(
            Duration::from_millis(5),
            Deferred::Relayout {
                mount: MountPoint::TechnicalChart,
            },
        );

        assert_eq!(
            rx.recv().await,
            Some(Deferred::Relayout {
                mount: MountPoint::TechnicalChart
            })
        );
        assert_eq!(rx.recv().await, Some(Deferred::DismissError { generation: 1 }));
    }
}
