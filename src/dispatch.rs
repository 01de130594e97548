use crate::classifier::BoxClassifier;
use crate::content::{ContentKind, ModerationRequest, ModerationResult};
use crate::service;
use crate::session::{BeginError, Session};

pub struct Dispatcher {
    classifiers: std::collections::HashMap<ContentKind, BoxClassifier>,
}

/// Clears `loading` if the submitting future is dropped before it completes.
struct InFlight<'a> {
    session: &'a parking_lot::Mutex<Session>,
    kind: ContentKind,
    done: bool,
}

impl InFlight<'_> {
    fn complete(mut self, outcome: Result<ModerationResult, String>) {
        self.session.lock().complete(outcome);
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.session.lock().complete(Err(service::Error::Aborted.user_message(self.kind)));
        }
    }
}

impl Dispatcher {
    pub fn new(classifiers: std::collections::HashMap<ContentKind, BoxClassifier>) -> Self {
        Self { classifiers }
    }

    async fn run(
        &self,
        req: &ModerationRequest,
        abort: impl std::future::Future<Output = ()>,
    ) -> Result<ModerationResult, String> {
        let classifier = if let Some(classifier) = self.classifiers.get(&req.kind) {
            classifier
        } else {
            log::error!("no classifier configured for {}", req.kind);
            return Err(format!("Failed to moderate {}", req.kind));
        };

        let timeout = classifier.request_timeout();
        let r = tokio::select! {
            r = tokio::time::timeout(timeout, classifier.classify(req)) => {
                r.unwrap_or(Err(service::Error::TimedOut(timeout)))
            }
            _ = abort => Err(service::Error::Aborted),
        };

        r.map_err(|e| {
            log::error!("{} moderation failed: {}", req.kind, e);
            e.user_message(req.kind)
        })
    }

    /// Submits whatever the session's active tab holds. The session lock is
    /// only held for the begin and complete transitions, so `loading` is
    /// observable while the classifier runs. `abort` resolving cancels the
    /// in-flight call.
    pub async fn submit(
        &self,
        session: &parking_lot::Mutex<Session>,
        abort: impl std::future::Future<Output = ()>,
    ) -> Result<(), BeginError> {
        let req = session.lock().begin()?;
        let in_flight = InFlight {
            session,
            kind: req.kind,
            done: false,
        };

        log::info!("dispatching {} moderation", req.kind);
        let outcome = self.run(&req, abort).await;
        in_flight.complete(outcome);
        Ok(())
    }
}
