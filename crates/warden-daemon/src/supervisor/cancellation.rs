use tokio::sync::watch;

/// Receiving half of the supervisor's shutdown flag.
#[derive(Clone)]
pub struct CancellationToken {
    receiver: watch::Receiver<bool>,
}

/// Sending half; flipping it asks every loop holding a token to wind down.
#[derive(Clone)]
pub struct ShutdownTrigger {
    sender: std::sync::Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    pub fn new() -> (ShutdownTrigger, Self) {
        let (tx, rx) = watch::channel(false);
        (
            ShutdownTrigger {
                sender: std::sync::Arc::new(tx),
            },
            Self { receiver: rx },
        )
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    pub async fn cancelled(&mut self) {
        while !*self.receiver.borrow() {
            if self.receiver.changed().await.is_err() {
                break;
            }
        }
    }
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            receiver: self.sender.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_waiters() {
        let (trigger, token) = CancellationToken::new();
        let mut waiter = token.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });

        assert!(!token.is_cancelled());
        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter not woken")
            .unwrap();
        assert!(token.is_cancelled());
        assert!(trigger.token().is_cancelled());
    }
}
