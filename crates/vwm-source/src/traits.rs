//! Seams between the fetch pipeline and the outside world.

use std::future::Future;

use vwm_model::{Amount, EntityId, Epoch, Identity};

use crate::error::Result;

/// The payout / identity / status service.
///
/// Every call either succeeds with a known value or fails with a
/// [`SourceError`](crate::SourceError). A well-formed answer with no payout
/// is `Ok(Amount::ZERO)`, never an error.
pub trait RemoteDataSource: Send + Sync + 'static {
    /// Identity registered for `entity`, `None` when the service knows of none.
    fn fetch_identity(
        &self,
        entity: &EntityId,
    ) -> impl Future<Output = Result<Option<Identity>>> + Send;

    /// Total paid to `entity` during `epoch`.
    fn fetch_withdrawal(
        &self,
        entity: &EntityId,
        epoch: Epoch,
    ) -> impl Future<Output = Result<Amount>> + Send;

    /// Latest epoch known to the service.
    fn fetch_current_epoch(&self) -> impl Future<Output = Result<Epoch>> + Send;
}

/// Source of the native token's fiat price.
pub trait ExchangeRateSource: Send + Sync + 'static {
    /// Price of one native token in USD.
    fn fetch_usd_rate(&self) -> impl Future<Output = Result<f64>> + Send;
}
