//! Delivery seam between the update loop and the messaging platform.
//!
//! The loop only ever needs two operations: post a status message and
//! edit the one it posted before. Platform crates implement
//! [`StatusChannel`]; the [`StatusPublisher`] owns the message handle
//! and the not-found fallback.

use std::sync::Arc;

use tracing::{info, warn};

use hangarbot_types::{EditOutcome, MessageHandle};

/// A messaging destination that can hold one editable status message.
///
/// Use `&self` for all methods — implementations should use interior
/// mutability for any mutable state.
#[async_trait::async_trait]
pub trait StatusChannel: Send + Sync {
    /// Post a new status message and return its handle.
    async fn send(&self, content: &str) -> anyhow::Result<MessageHandle>;

    /// Edit a previously posted message.
    ///
    /// Returns [`EditOutcome::NotFound`] when the message no longer
    /// exists; transport and permission failures are errors.
    async fn edit(&self, handle: &MessageHandle, content: &str) -> anyhow::Result<EditOutcome>;
}

/// Keeps the status message alive: edits in place while the message
/// exists, re-sends and adopts the new handle when it was deleted.
pub struct StatusPublisher {
    channel: Arc<dyn StatusChannel>,
    handle: Option<MessageHandle>,
}

impl StatusPublisher {
    pub fn new(channel: Arc<dyn StatusChannel>) -> Self {
        Self {
            channel,
            handle: None,
        }
    }

    /// Handle of the currently live status message, if any.
    pub fn handle(&self) -> Option<&MessageHandle> {
        self.handle.as_ref()
    }

    /// Deliver `content`, editing the existing message when possible.
    ///
    /// Errors propagate without dropping the stored handle, so the
    /// next tick retries the edit naturally.
    pub async fn publish(&mut self, content: &str) -> anyhow::Result<()> {
        if let Some(handle) = self.handle.clone() {
            match self.channel.edit(&handle, content).await? {
                EditOutcome::Edited(updated) => {
                    self.handle = Some(updated);
                    return Ok(());
                }
                EditOutcome::NotFound => {
                    warn!(
                        message_id = %handle.message_id,
                        "status message no longer exists, posting a new one"
                    );
                }
            }
        }

        let handle = self.channel.send(content).await?;
        info!(message_id = %handle.message_id, "posted status message");
        self.handle = Some(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::Mutex;

    /// Scripted channel: records calls, pops edit outcomes from a queue.
    struct ScriptedChannel {
        sends: Mutex<Vec<String>>,
        edits: Mutex<Vec<(String, String)>>,
        edit_script: Mutex<Vec<anyhow::Result<EditOutcome>>>,
        next_message_id: Mutex<u64>,
    }

    impl ScriptedChannel {
        fn new() -> Self {
            Self {
                sends: Mutex::new(Vec::new()),
                edits: Mutex::new(Vec::new()),
                edit_script: Mutex::new(Vec::new()),
                next_message_id: Mutex::new(1),
            }
        }

        fn script_edit(&self, outcome: anyhow::Result<EditOutcome>) {
            self.edit_script.lock().unwrap().push(outcome);
        }
    }

    #[async_trait::async_trait]
    impl StatusChannel for ScriptedChannel {
        async fn send(&self, content: &str) -> anyhow::Result<MessageHandle> {
            self.sends.lock().unwrap().push(content.to_string());
            let mut id = self.next_message_id.lock().unwrap();
            *id += 1;
            Ok(MessageHandle {
                channel_id: "chan".into(),
                message_id: id.to_string(),
            })
        }

        async fn edit(
            &self,
            handle: &MessageHandle,
            content: &str,
        ) -> anyhow::Result<EditOutcome> {
            self.edits
                .lock()
                .unwrap()
                .push((handle.message_id.clone(), content.to_string()));
            let mut script = self.edit_script.lock().unwrap();
            if script.is_empty() {
                return Ok(EditOutcome::Edited(handle.clone()));
            }
            script.remove(0)
        }
    }

    #[tokio::test]
    async fn test_first_publish_sends() {
        let channel = Arc::new(ScriptedChannel::new());
        let mut publisher = StatusPublisher::new(channel.clone());

        publisher.publish("hello").await.unwrap();

        assert_eq!(channel.sends.lock().unwrap().as_slice(), ["hello"]);
        assert!(channel.edits.lock().unwrap().is_empty());
        assert!(publisher.handle().is_some());
    }

    #[tokio::test]
    async fn test_subsequent_publish_edits() {
        let channel = Arc::new(ScriptedChannel::new());
        let mut publisher = StatusPublisher::new(channel.clone());

        publisher.publish("first").await.unwrap();
        publisher.publish("second").await.unwrap();

        assert_eq!(channel.sends.lock().unwrap().len(), 1);
        let edits = channel.edits.lock().unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].1, "second");
    }

    #[tokio::test]
    async fn test_deleted_message_resends_and_adopts_handle() {
        let channel = Arc::new(ScriptedChannel::new());
        let mut publisher = StatusPublisher::new(channel.clone());

        publisher.publish("first").await.unwrap();
        let old = publisher.handle().unwrap().clone();

        channel.script_edit(Ok(EditOutcome::NotFound));
        publisher.publish("second").await.unwrap();

        let new = publisher.handle().unwrap().clone();
        assert_ne!(old.message_id, new.message_id);
        assert_eq!(channel.sends.lock().unwrap().len(), 2);

        // Next publish edits the adopted handle, not the deleted one.
        publisher.publish("third").await.unwrap();
        let edits = channel.edits.lock().unwrap();
        assert_eq!(edits.last().unwrap().0, new.message_id);
    }

    #[tokio::test]
    async fn test_edit_error_keeps_handle_for_retry() {
        let channel = Arc::new(ScriptedChannel::new());
        let mut publisher = StatusPublisher::new(channel.clone());

        publisher.publish("first").await.unwrap();
        let handle = publisher.handle().unwrap().clone();

        channel.script_edit(Err(anyhow::anyhow!("rate limited")));
        assert!(publisher.publish("second").await.is_err());
        assert_eq!(publisher.handle(), Some(&handle));

        // Retry goes back to the same message.
        publisher.publish("third").await.unwrap();
        assert_eq!(channel.sends.lock().unwrap().len(), 1);
        assert_eq!(
            channel.edits.lock().unwrap().last().unwrap().0,
            handle.message_id
        );
    }

    #[tokio::test]
    async fn test_send_error_propagates() {
        struct FailingChannel;

        #[async_trait::async_trait]
        impl StatusChannel for FailingChannel {
            async fn send(&self, _content: &str) -> anyhow::Result<MessageHandle> {
                bail!("network down")
            }
            async fn edit(
                &self,
                _handle: &MessageHandle,
                _content: &str,
            ) -> anyhow::Result<EditOutcome> {
                bail!("network down")
            }
        }

        let mut publisher = StatusPublisher::new(Arc::new(FailingChannel));
        assert!(publisher.publish("hello").await.is_err());
        assert!(publisher.handle().is_none());
    }
}
