//! Recharge request repository.
//!
//! Approval locks the request row, validates the transition with
//! [`RechargeWorkflow`], settles the card in the same database transaction,
//! then flips the status with a conditional update guarded by
//! `status = 'pending'`. Any failure rolls everything back, so the request
//! stays pending and the card is untouched.

use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use mealcard_core::recharge::{
    ApprovalOutcome, PaymentInfo, PaymentMethod, RechargeError, RechargeFilter, RechargeRequest,
    RechargeStatus, RechargeStore, RechargeWorkflow, RequestStatusCounts, Transition,
};
use mealcard_shared::types::{CardId, Credits, RechargeRequestId, TransactionRecordId, UserId};

use super::card::settle_in_txn;
use super::to_utc;
use crate::entities::{
    recharge_requests,
    sea_orm_active_enums::{PaymentMethod as DbPaymentMethod, RechargeStatus as DbRechargeStatus},
};

/// Recharge request repository implementation.
#[derive(Debug, Clone)]
pub struct RechargeRepository {
    db: DatabaseConnection,
}

impl RechargeRepository {
    /// Creates a new recharge request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Locks the request row and returns it.
    async fn lock_request(
        txn: &DatabaseTransaction,
        id: RechargeRequestId,
    ) -> Result<RechargeRequest, RechargeError> {
        recharge_requests::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(store_err)?
            .map(request_to_domain)
            .ok_or(RechargeError::RequestNotFound(id))
    }

    /// Writes a transition, only if the row is still pending.
    async fn record_transition(
        txn: &DatabaseTransaction,
        request: &RechargeRequest,
        transition: Transition,
        record_id: Option<TransactionRecordId>,
    ) -> Result<(), RechargeError> {
        let result = recharge_requests::Entity::update_many()
            .col_expr(
                recharge_requests::Column::Status,
                Expr::val(transition.new_status.as_str()).as_enum(Alias::new("recharge_status")),
            )
            .col_expr(
                recharge_requests::Column::ProcessedBy,
                Expr::value(transition.processed_by.into_inner()),
            )
            .col_expr(
                recharge_requests::Column::ProcessedAt,
                Expr::value(transition.processed_at),
            )
            .col_expr(
                recharge_requests::Column::RecordId,
                Expr::value(record_id.map(TransactionRecordId::into_inner)),
            )
            .filter(recharge_requests::Column::Id.eq(request.id.into_inner()))
            .filter(recharge_requests::Column::Status.eq(DbRechargeStatus::Pending))
            .exec(txn)
            .await
            .map_err(store_err)?;

        if result.rows_affected == 0 {
            debug!(request_id = %request.id, "Request left pending state before the update");
            return Err(RechargeError::RequestNotPending {
                id: request.id,
                status: request.status,
            });
        }
        Ok(())
    }
}

impl RechargeStore for RechargeRepository {
    async fn insert_request(
        &self,
        request: RechargeRequest,
    ) -> Result<RechargeRequest, RechargeError> {
        let model = recharge_requests::ActiveModel {
            id: Set(request.id.into_inner()),
            student_id: Set(request.student_id.into_inner()),
            card_id: Set(request.card_id.into_inner()),
            amount: Set(request.amount.units()),
            payment_method: Set(method_to_db(request.payment.method)),
            payment_transaction_id: Set(request.payment.transaction_id.clone()),
            upi_reference: Set(request.payment.upi_reference.clone()),
            proof_reference: Set(request.payment.proof_reference.clone()),
            status: Set(status_to_db(request.status)),
            requested_at: Set(request.requested_at.into()),
            processed_by: Set(None),
            processed_at: Set(None),
            record_id: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(store_err)?;

        Ok(request_to_domain(model))
    }

    async fn find_request(
        &self,
        id: RechargeRequestId,
    ) -> Result<Option<RechargeRequest>, RechargeError> {
        let model = recharge_requests::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.map(request_to_domain))
    }

    async fn approve(
        &self,
        id: RechargeRequestId,
        actor: UserId,
    ) -> Result<ApprovalOutcome, RechargeError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let mut request = Self::lock_request(&txn, id).await?;
        let transition = RechargeWorkflow::approve(&request, actor)?;

        let settlement = RechargeWorkflow::settlement_for(&request, actor);
        let record = settle_in_txn(&txn, &settlement).await?;
        Self::record_transition(&txn, &request, transition, Some(record.id)).await?;

        txn.commit().await.map_err(store_err)?;

        transition.apply(&mut request, Some(record.id));
        Ok(ApprovalOutcome { request, record })
    }

    async fn reject(
        &self,
        id: RechargeRequestId,
        actor: UserId,
    ) -> Result<RechargeRequest, RechargeError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let mut request = Self::lock_request(&txn, id).await?;
        let transition = RechargeWorkflow::reject(&request, actor)?;
        Self::record_transition(&txn, &request, transition, None).await?;

        txn.commit().await.map_err(store_err)?;

        transition.apply(&mut request, None);
        Ok(request)
    }

    async fn list_requests(
        &self,
        filter: &RechargeFilter,
    ) -> Result<Vec<RechargeRequest>, RechargeError> {
        let mut select = recharge_requests::Entity::find();

        if let Some(student_id) = filter.student_id {
            select = select.filter(recharge_requests::Column::StudentId.eq(student_id.into_inner()));
        }
        if let Some(status) = filter.status {
            select = select.filter(recharge_requests::Column::Status.eq(status_to_db(status)));
        }

        select = select
            .order_by_desc(recharge_requests::Column::RequestedAt)
            .order_by_desc(recharge_requests::Column::Id);
        if let Some(limit) = filter.limit {
            select = select.limit(limit);
        }

        let models = select.all(&self.db).await.map_err(store_err)?;
        Ok(models.into_iter().map(request_to_domain).collect())
    }

    async fn status_counts(&self) -> Result<RequestStatusCounts, RechargeError> {
        let rows: Vec<(String, i64)> = recharge_requests::Entity::find()
            .select_only()
            .column_as(Expr::cust("status::TEXT"), "status")
            .column_as(Expr::cust("COUNT(*)"), "count")
            .group_by(recharge_requests::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(store_err)?;

        let mut counts = RequestStatusCounts::default();
        for (status, count) in rows {
            let count = u64::try_from(count).unwrap_or_default();
            match RechargeStatus::parse(&status) {
                Some(RechargeStatus::Pending) => counts.pending = count,
                Some(RechargeStatus::Approved) => counts.approved = count,
                Some(RechargeStatus::Rejected) => counts.rejected = count,
                None => {}
            }
        }
        Ok(counts)
    }
}

fn store_err(e: DbErr) -> RechargeError {
    debug!(error = %e, "Recharge store query failed");
    RechargeError::StoreUnavailable(e.to_string())
}

fn request_to_domain(model: recharge_requests::Model) -> RechargeRequest {
    RechargeRequest {
        id: RechargeRequestId::from_uuid(model.id),
        student_id: UserId::from_uuid(model.student_id),
        card_id: CardId::from_uuid(model.card_id),
        amount: Credits::new(model.amount),
        payment: PaymentInfo {
            method: method_from_db(model.payment_method),
            transaction_id: model.payment_transaction_id,
            upi_reference: model.upi_reference,
            proof_reference: model.proof_reference,
        },
        status: status_from_db(model.status),
        requested_at: to_utc(model.requested_at),
        processed_by: model.processed_by.map(UserId::from_uuid),
        processed_at: model.processed_at.map(to_utc),
        record_id: model.record_id.map(TransactionRecordId::from_uuid),
    }
}

const fn status_to_db(status: RechargeStatus) -> DbRechargeStatus {
    match status {
        RechargeStatus::Pending => DbRechargeStatus::Pending,
        RechargeStatus::Approved => DbRechargeStatus::Approved,
        RechargeStatus::Rejected => DbRechargeStatus::Rejected,
    }
}

const fn status_from_db(status: DbRechargeStatus) -> RechargeStatus {
    match status {
        DbRechargeStatus::Pending => RechargeStatus::Pending,
        DbRechargeStatus::Approved => RechargeStatus::Approved,
        DbRechargeStatus::Rejected => RechargeStatus::Rejected,
    }
}

const fn method_to_db(method: PaymentMethod) -> DbPaymentMethod {
    match method {
        PaymentMethod::Online => DbPaymentMethod::Online,
        PaymentMethod::Cash => DbPaymentMethod::Cash,
        PaymentMethod::Upi => DbPaymentMethod::Upi,
    }
}

const fn method_from_db(method: DbPaymentMethod) -> PaymentMethod {
    match method {
        DbPaymentMethod::Online => PaymentMethod::Online,
        DbPaymentMethod::Cash => PaymentMethod::Cash,
        DbPaymentMethod::Upi => PaymentMethod::Upi,
    }
}
