use std::sync::Mutex;

type Handler<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Holds a completion callback that may be invoked at most once.
///
/// Whichever caller reaches [`CompletionLatch::complete`] first runs the
/// callback; everyone after that is a no-op. The handler is invoked outside
/// the lock.
pub struct CompletionLatch<T> {
    handler: Mutex<Option<Handler<T>>>,
}

impl<T> CompletionLatch<T> {
    pub fn new(handler: impl FnOnce(T) + Send + 'static) -> Self {
        Self {
            handler: Mutex::new(Some(Box::new(handler))),
        }
    }

    /// Runs the callback with `value` if nobody has yet. Returns whether this
    /// call was the one that completed the latch.
    pub fn complete(&self, value: T) -> bool {
        let handler = match self.handler.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match handler {
            Some(handler) => {
                handler(value);
                true
            }
            None => false,
        }
    }

    pub fn is_completed(&self) -> bool {
        match self.handler.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

impl<T> std::fmt::Debug for CompletionLatch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionLatch")
            .field("completed", &self.is_completed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn first_writer_wins() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let latch = CompletionLatch::new(move |value: &'static str| {
            sink.lock().unwrap().push(value);
        });

        assert!(!latch.is_completed());
        assert!(latch.complete("pipeline"));
        assert!(!latch.complete("expiry"));
        assert!(latch.is_completed());
        assert_eq!(*received.lock().unwrap(), vec!["pipeline"]);
    }

    #[test]
    fn racing_threads_complete_exactly_once() {
        for _ in 0..200 {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();
            let latch = Arc::new(CompletionLatch::new(move |_: usize| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

            let handles: Vec<_> = (0..4)
                .map(|id| {
                    let latch = latch.clone();
                    std::thread::spawn(move || latch.complete(id))
                })
                .collect();
            let winners = handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|won| *won)
                .count();

            assert_eq!(winners, 1);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }
}
