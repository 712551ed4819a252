//! Message threads and messages.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{message, message_thread};
use super::paging::fetch_page;
use crate::domain::{Message, MessageThread, ThreadSummary};
use crate::errors::{AppError, AppResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_thread(&self, id: Uuid) -> AppResult<Option<MessageThread>>;

    /// Return the booking's thread, creating it on first use.
    async fn get_or_create_thread(
        &self,
        booking_id: Uuid,
        guest_id: Uuid,
        host_id: Uuid,
    ) -> AppResult<MessageThread>;

    /// Threads the user takes part in, most recent activity first, each
    /// with the number of messages the user has not read.
    async fn list_threads(&self, user_id: Uuid, params: PaginationParams) -> AppResult<Page<ThreadSummary>>;

    /// Oldest first.
    async fn list_messages(&self, thread_id: Uuid, params: PaginationParams) -> AppResult<Page<Message>>;

    /// Insert a message and bump the thread's activity timestamp.
    async fn create_message(&self, thread_id: Uuid, sender_id: Uuid, content: String) -> AppResult<Message>;

    /// Mark the other participant's messages read; returns how many changed.
    async fn mark_read(&self, thread_id: Uuid, reader_id: Uuid) -> AppResult<u64>;
}

pub struct MessageStore {
    db: DatabaseConnection,
}

impl MessageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn thread_for_booking(&self, booking_id: Uuid) -> AppResult<Option<MessageThread>> {
        Ok(message_thread::Entity::find()
            .filter(message_thread::Column::BookingId.eq(booking_id))
            .one(&self.db)
            .await?
            .map(MessageThread::from))
    }

    async fn unread_counts(&self, user_id: Uuid, thread_ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, u64>> {
        if thread_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = message::Entity::find()
            .select_only()
            .column(message::Column::ThreadId)
            .column_as(Expr::col(message::Column::Id).count(), "unread")
            .filter(message::Column::ThreadId.is_in(thread_ids))
            .filter(message::Column::SenderId.ne(user_id))
            .filter(message::Column::ReadAt.is_null())
            .group_by(message::Column::ThreadId)
            .into_model::<UnreadRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.thread_id, row.unread.max(0) as u64))
            .collect())
    }
}

#[derive(Debug, FromQueryResult)]
struct UnreadRow {
    thread_id: Uuid,
    unread: i64,
}

#[async_trait]
impl MessageRepository for MessageStore {
    async fn find_thread(&self, id: Uuid) -> AppResult<Option<MessageThread>> {
        Ok(message_thread::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(MessageThread::from))
    }

    async fn get_or_create_thread(
        &self,
        booking_id: Uuid,
        guest_id: Uuid,
        host_id: Uuid,
    ) -> AppResult<MessageThread> {
        if let Some(thread) = self.thread_for_booking(booking_id).await? {
            return Ok(thread);
        }

        let now = chrono::Utc::now();
        let inserted = message_thread::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            guest_id: Set(guest_id),
            host_id: Set(host_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => Ok(MessageThread::from(model)),
            // Lost a race with the other participant opening the same thread
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .thread_for_booking(booking_id)
                .await?
                .ok_or(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_threads(&self, user_id: Uuid, params: PaginationParams) -> AppResult<Page<ThreadSummary>> {
        let query = message_thread::Entity::find()
            .filter(
                Condition::any()
                    .add(message_thread::Column::GuestId.eq(user_id))
                    .add(message_thread::Column::HostId.eq(user_id)),
            )
            .order_by_desc(message_thread::Column::UpdatedAt);

        let page = fetch_page(&self.db, query, &params).await?;
        let ids = page.items.iter().map(|t| t.id).collect();
        let unread = self.unread_counts(user_id, ids).await?;

        Ok(page.map(|model| ThreadSummary {
            unread_count: unread.get(&model.id).copied().unwrap_or(0),
            thread: MessageThread::from(model),
        }))
    }

    async fn list_messages(&self, thread_id: Uuid, params: PaginationParams) -> AppResult<Page<Message>> {
        let query = message::Entity::find()
            .filter(message::Column::ThreadId.eq(thread_id))
            .order_by_asc(message::Column::CreatedAt);
        Ok(fetch_page(&self.db, query, &params).await?.map(Message::from))
    }

    async fn create_message(&self, thread_id: Uuid, sender_id: Uuid, content: String) -> AppResult<Message> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now();

        let model = message::ActiveModel {
            id: Set(Uuid::new_v4()),
            thread_id: Set(thread_id),
            sender_id: Set(sender_id),
            content: Set(content),
            read_at: Set(None),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        message_thread::Entity::update_many()
            .col_expr(message_thread::Column::UpdatedAt, Expr::value(now))
            .filter(message_thread::Column::Id.eq(thread_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(Message::from(model))
    }

    async fn mark_read(&self, thread_id: Uuid, reader_id: Uuid) -> AppResult<u64> {
        let result = message::Entity::update_many()
            .col_expr(message::Column::ReadAt, Expr::value(chrono::Utc::now()))
            .filter(message::Column::ThreadId.eq(thread_id))
            .filter(message::Column::SenderId.ne(reader_id))
            .filter(message::Column::ReadAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
