//! Records a notification and pushes it to the owner's device.
//!
//! Both halves are best-effort and independent: the record is appended
//! to `users/{uid}/notifications`, then the device token is looked up and
//! the push is attempted even if the record write failed. Nothing here
//! returns an error to the caller.

use std::sync::Arc;

use tracing::{error, info, warn};

use smartcollar_core::{AlertType, Clock, CollarError, Notification, UserRef};
use smartcollar_storage::{read_device_token, RealtimeStore};

use crate::traits::{DispatchReport, PushMessage, PushOutcome, PushSender};

pub struct NotificationDispatcher {
    store: Arc<dyn RealtimeStore>,
    sender: Arc<dyn PushSender>,
    clock: Arc<dyn Clock>,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn RealtimeStore>,
        sender: Arc<dyn PushSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            sender,
            clock,
        }
    }

    /// Append a notification record for `uid` and push it to their device.
    pub async fn send(
        &self,
        uid: &str,
        title: &str,
        body: &str,
        kind: Option<AlertType>,
        pet_id: Option<&str>,
    ) -> DispatchReport {
        let start = std::time::Instant::now();
        let user = UserRef::new(uid);

        let (record_key, record_error) = match self.append_record(&user, title, body, kind, pet_id).await {
            Ok(key) => {
                info!(uid, title, body, "Notification saved");
                (Some(key), None)
            }
            Err(e) => {
                error!(uid, error = %e, "Error saving notification record");
                (None, Some(e))
            }
        };

        let push = self.push(&user, title, body).await;

        DispatchReport {
            record_key,
            record_error,
            push,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn append_record(
        &self,
        user: &UserRef,
        title: &str,
        body: &str,
        kind: Option<AlertType>,
        pet_id: Option<&str>,
    ) -> Result<String, CollarError> {
        let record = Notification::server(title, body, self.clock.now_ms(), kind, pet_id);
        let value = serde_json::to_value(&record)
            .map_err(|e| CollarError::write(user.notifications_path(), e))?;
        self.store.push(&user.notifications_path(), value).await
    }

    async fn push(&self, user: &UserRef, title: &str, body: &str) -> PushOutcome {
        let token = match read_device_token(self.store.as_ref(), user).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!(uid = %user.uid, "No device token found for user");
                return PushOutcome::NoDeviceToken;
            }
            Err(e) => {
                error!(uid = %user.uid, error = %e, "Error reading device token");
                return PushOutcome::Failed(e);
            }
        };

        let message = PushMessage {
            title: title.to_string(),
            body: body.to_string(),
        };

        match self.sender.send_to_device(&token, &message).await {
            Ok(()) => {
                info!(
                    uid = %user.uid,
                    channel = self.sender.channel_name(),
                    title,
                    body,
                    "Push notification sent"
                );
                PushOutcome::Sent {
                    channel: self.sender.channel_name().to_string(),
                }
            }
            Err(e) => {
                let err = CollarError::from(e);
                error!(
                    uid = %user.uid,
                    channel = self.sender.channel_name(),
                    error = %err,
                    "Error sending push notification"
                );
                PushOutcome::Failed(err)
            }
        }
    }
}
