//! Booking message threads.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::support::notify;
use crate::config::MAX_MESSAGE_LENGTH;
use crate::domain::{Actor, Message, MessageThread, NewNotification, NotificationKind, ThreadSummary};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

#[async_trait]
pub trait MessageService: Send + Sync {
    /// Get or create the thread for a booking. Guest and villa owner only.
    async fn open_thread(&self, actor: Actor, booking_id: Uuid) -> AppResult<MessageThread>;

    async fn list_threads(&self, actor: Actor, params: PaginationParams) -> AppResult<Page<ThreadSummary>>;

    /// Participants and admins may read a thread.
    async fn list_messages(
        &self,
        actor: Actor,
        thread_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Page<Message>>;

    async fn send(&self, actor: Actor, thread_id: Uuid, content: String) -> AppResult<Message>;

    /// Mark the counterpart's messages read; returns how many changed.
    async fn mark_read(&self, actor: Actor, thread_id: Uuid) -> AppResult<u64>;
}

pub struct MessageManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> MessageManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn participant_thread(&self, actor: Actor, thread_id: Uuid) -> AppResult<MessageThread> {
        let thread = self
            .uow
            .messages()
            .find_thread(thread_id)
            .await?
            .ok_or_not_found()?;
        if !thread.is_participant(actor.id) {
            return Err(AppError::Forbidden);
        }
        Ok(thread)
    }
}

fn clean_content(content: String) -> AppResult<String> {
    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::validation("Message cannot be empty"));
    }
    if content.chars().count() as u64 > MAX_MESSAGE_LENGTH {
        return Err(AppError::validation(format!(
            "Messages are limited to {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(content)
}

#[async_trait]
impl<U: UnitOfWork> MessageService for MessageManager<U> {
    async fn open_thread(&self, actor: Actor, booking_id: Uuid) -> AppResult<MessageThread> {
        let booking = self
            .uow
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_not_found()?;
        let villa = self
            .uow
            .villas()
            .find_by_id(booking.villa_id)
            .await?
            .ok_or_not_found()?;

        if actor.id != booking.guest_id && !villa.is_owned_by(actor.id) {
            return Err(AppError::Forbidden);
        }

        self.uow
            .messages()
            .get_or_create_thread(booking.id, booking.guest_id, villa.owner_id)
            .await
    }

    async fn list_threads(&self, actor: Actor, params: PaginationParams) -> AppResult<Page<ThreadSummary>> {
        self.uow.messages().list_threads(actor.id, params).await
    }

    async fn list_messages(
        &self,
        actor: Actor,
        thread_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Page<Message>> {
        let thread = self
            .uow
            .messages()
            .find_thread(thread_id)
            .await?
            .ok_or_not_found()?;
        if !thread.is_participant(actor.id) && !actor.is_admin() {
            return Err(AppError::Forbidden);
        }
        self.uow.messages().list_messages(thread.id, params).await
    }

    async fn send(&self, actor: Actor, thread_id: Uuid, content: String) -> AppResult<Message> {
        let content = clean_content(content)?;
        let thread = self.participant_thread(actor, thread_id).await?;

        let message = self
            .uow
            .messages()
            .create_message(thread.id, actor.id, content)
            .await?;

        tracing::debug!(thread_id = %thread.id, sender_id = %actor.id, "message sent");

        notify(
            self.uow.as_ref(),
            NewNotification::new(
                thread.counterpart(actor.id),
                NotificationKind::NewMessage,
                "New message",
                preview(&message.content),
                Some(thread.id),
            ),
        )
        .await;

        Ok(message)
    }

    async fn mark_read(&self, actor: Actor, thread_id: Uuid) -> AppResult<u64> {
        let thread = self.participant_thread(actor, thread_id).await?;
        self.uow.messages().mark_read(thread.id, actor.id).await
    }
}

/// First line of a message, shortened for the notification body.
fn preview(content: &str) -> String {
    const LIMIT: usize = 80;
    let line = content.lines().next().unwrap_or_default();
    if line.chars().count() > LIMIT {
        let cut: String = line.chars().take(LIMIT).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingStatus, UserRole};
    use crate::services::test_support::{
        booking, delivered, stay, villa, BuiltUnitOfWork, TestUnitOfWork,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    fn service(uow: TestUnitOfWork) -> MessageManager<BuiltUnitOfWork> {
        MessageManager::new(uow.build())
    }

    fn thread(guest_id: Uuid, host_id: Uuid) -> MessageThread {
        let now = Utc::now();
        MessageThread {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            guest_id,
            host_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn host_opens_thread_for_booking_on_own_villa() {
        let host = Actor::new(Uuid::new_v4(), UserRole::Host);
        let guest_id = Uuid::new_v4();
        let b = booking(Uuid::new_v4(), guest_id, BookingStatus::Pending, stay(3, 2));
        let booking_id = b.id;

        let mut uow = TestUnitOfWork::default();
        uow.bookings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(b.clone())));
        uow.villas
            .expect_find_by_id()
            .returning(move |id| Ok(Some(villa(id, host.id, 4))));
        uow.messages
            .expect_get_or_create_thread()
            .with(eq(booking_id), eq(guest_id), eq(host.id))
            .times(1)
            .returning(|booking_id, guest_id, host_id| {
                let mut t = thread(guest_id, host_id);
                t.booking_id = booking_id;
                Ok(t)
            });

        let opened = service(uow).open_thread(host, booking_id).await.unwrap();
        assert_eq!(opened.booking_id, booking_id);
    }

    #[tokio::test]
    async fn outsiders_cannot_open_threads() {
        let b = booking(Uuid::new_v4(), Uuid::new_v4(), BookingStatus::Pending, stay(3, 2));
        let mut uow = TestUnitOfWork::default();
        uow.bookings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(b.clone())));
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));
        uow.messages.expect_get_or_create_thread().never();

        let stranger = Actor::new(Uuid::new_v4(), UserRole::Guest);
        let result = service(uow).open_thread(stranger, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn send_notifies_the_counterpart() {
        let guest = Actor::new(Uuid::new_v4(), UserRole::Guest);
        let host_id = Uuid::new_v4();
        let t = thread(guest.id, host_id);
        let thread_id = t.id;

        let mut uow = TestUnitOfWork::default();
        uow.messages
            .expect_find_thread()
            .returning(move |_| Ok(Some(t.clone())));
        uow.messages
            .expect_create_message()
            .with(eq(thread_id), eq(guest.id), eq("See you soon".to_string()))
            .times(1)
            .returning(|thread_id, sender_id, content| {
                Ok(Message {
                    id: Uuid::new_v4(),
                    thread_id,
                    sender_id,
                    content,
                    read_at: None,
                    created_at: Utc::now(),
                })
            });
        uow.notifications
            .expect_create()
            .withf(move |n| n.user_id == host_id && n.kind == NotificationKind::NewMessage)
            .times(1)
            .returning(delivered);

        let sent = service(uow)
            .send(guest, thread_id, "  See you soon  ".to_string())
            .await
            .unwrap();
        assert_eq!(sent.content, "See you soon");
    }

    #[tokio::test]
    async fn blank_messages_are_rejected() {
        let mut uow = TestUnitOfWork::default();
        uow.messages.expect_find_thread().never();

        let actor = Actor::new(Uuid::new_v4(), UserRole::Guest);
        let result = service(uow).send(actor, Uuid::new_v4(), "   ".to_string()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn admins_can_read_but_not_post() {
        let t = thread(Uuid::new_v4(), Uuid::new_v4());
        let thread_id = t.id;
        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);

        let mut uow = TestUnitOfWork::default();
        uow.messages
            .expect_find_thread()
            .returning(move |_| Ok(Some(t.clone())));
        uow.messages
            .expect_list_messages()
            .returning(|_, _| Ok(Page::new(vec![], 0)));
        uow.messages.expect_create_message().never();

        let svc = service(uow);
        let page = svc
            .list_messages(admin, thread_id, PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);

        let result = svc.send(admin, thread_id, "hello".to_string()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[test]
    fn preview_truncates_long_first_lines() {
        assert_eq!(preview("short\nsecond line"), "short");
        let long = "x".repeat(100);
        assert_eq!(preview(&long).len(), 83);
    }
}
