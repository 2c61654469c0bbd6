//! The storefront cart session.
//!
//! A session owns the single published view of the cart. Every operation
//! runs under one per-cart lock, so at most one request sequence is in
//! flight: fetch a fresh snapshot, decide with the evaluator, mutate, then
//! fetch again and publish. Subscribers are notified on every publish.

use std::future::Future;
use std::time::Duration;

use free_sample::cart::CartSnapshot;
use free_sample::catalog::{eligible_products, CatalogProduct};
use free_sample::checkout::{CheckoutGate, GateDecision};
use free_sample::evaluator::{
    AdmissionResult, CartPolicyEvaluator, QuantityAdmission, SampleAdmission,
};
use free_sample::offers::Offer;
use free_sample::policy::Policy;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::backend::CartBackend;
use crate::error::{BackendError, Result, SessionError};
use crate::wire::{AddItemRequest, ChangeLineRequest};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings a session is constructed with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub policy: Policy,
    /// Upper bound for each backend request.
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Everything the storefront renders, derived from one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct CartView {
    /// Increases by one with every publish.
    pub revision: u64,
    pub snapshot: CartSnapshot,
    pub offers: Vec<Offer>,
    pub admission: AdmissionResult,
}

pub struct CartSession<B> {
    backend: B,
    config: SessionConfig,
    view: watch::Sender<Option<CartView>>,
    cancelled: watch::Sender<bool>,
    mutations: Mutex<()>,
}

impl<B: CartBackend> CartSession<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        let (view, _) = watch::channel(None);
        let (cancelled, _) = watch::channel(false);
        Self {
            backend,
            config,
            view,
            cancelled,
            mutations: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Receiver that observes every published view. Holds `None` until the
    /// first successful load.
    pub fn subscribe(&self) -> watch::Receiver<Option<CartView>> {
        self.view.subscribe()
    }

    pub fn current(&self) -> Option<CartView> {
        self.view.borrow().clone()
    }

    /// Ends the session. In-flight requests resolve to
    /// [`SessionError::Cancelled`] and later calls fail immediately.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Re-fetches cart and catalog and publishes the result. On failure the
    /// published view is left as it was.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<CartView> {
        let _guard = self.mutations.lock().await;
        self.reload().await
    }

    /// Adds one unit of the product's default variant as a free sample,
    /// after re-validating against a fresh snapshot.
    #[instrument(skip(self))]
    pub async fn add_sample(&self, product_id: &str) -> Result<CartView> {
        let _guard = self.mutations.lock().await;
        let view = self.reload().await?;

        let offer = view
            .offers
            .iter()
            .find(|offer| offer.product.product_id == product_id)
            .ok_or_else(|| SessionError::UnknownProduct(product_id.to_string()))?;
        let variant_id = offer.product.variant_id.clone();

        let evaluator = self.evaluator();
        let admission = evaluator
            .evaluate(&view.snapshot)
            .evaluate_sample_addition(&variant_id);
        if let SampleAdmission::Denied(denial) = admission {
            info!(%denial, "free sample denied");
            return Err(SessionError::Denied(denial));
        }

        self.call(
            "add sample",
            self.backend.add_item(AddItemRequest::sample(variant_id)),
            SessionError::Mutation,
        )
        .await?;
        info!("free sample added");
        self.reload().await
    }

    /// Sets a line's quantity. Sample lines only accept 0 or 1; a sample line
    /// already above 1 is reset to 1 before the rejection is returned.
    #[instrument(skip(self))]
    pub async fn change_quantity(&self, line_id: &str, quantity: u64) -> Result<CartView> {
        let _guard = self.mutations.lock().await;
        let view = self.reload().await?;

        let evaluator = self.evaluator();
        let admission = evaluator
            .evaluate(&view.snapshot)
            .evaluate_quantity_change(line_id, quantity);
        match admission {
            QuantityAdmission::UnknownLine => Err(SessionError::UnknownLine(line_id.to_string())),
            QuantityAdmission::Denied(denial) => {
                let current = view.snapshot.line(line_id).map_or(0, |line| line.quantity);
                if current > 1 {
                    warn!(current, "resetting free sample quantity to 1");
                    self.set_quantity(line_id, 1).await?;
                    self.reload().await?;
                }
                info!(%denial, "quantity change rejected");
                Err(SessionError::Denied(denial))
            }
            QuantityAdmission::Allowed => {
                self.set_quantity(line_id, quantity).await?;
                self.reload().await
            }
        }
    }

    pub async fn remove_line(&self, line_id: &str) -> Result<CartView> {
        self.change_quantity(line_id, 0).await
    }

    /// Revalidates the cart before navigating to checkout. Any error means
    /// the caller must not proceed.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<GateDecision> {
        let _guard = self.mutations.lock().await;
        let view = self.reload().await?;
        let decision = CheckoutGate::new(self.config.policy).decide(&view.snapshot);
        debug!(?decision, "checkout gate");
        Ok(decision)
    }

    fn evaluator(&self) -> CartPolicyEvaluator {
        CartPolicyEvaluator::new(self.config.policy)
    }

    async fn set_quantity(&self, line_id: &str, quantity: u64) -> Result<()> {
        let request = ChangeLineRequest {
            id: line_id.to_string(),
            quantity,
        };
        self.call(
            "change line",
            self.backend.change_line(request),
            SessionError::Mutation,
        )
        .await
    }

    async fn reload(&self) -> Result<CartView> {
        let (snapshot, catalog) = tokio::try_join!(
            self.call("fetch cart", self.backend.fetch_cart(), SessionError::Fetch),
            self.call(
                "fetch catalog",
                self.backend.fetch_catalog(),
                SessionError::Fetch
            ),
        )?;
        Ok(self.publish(self.view_of(snapshot, catalog)))
    }

    fn view_of(&self, snapshot: CartSnapshot, catalog: Vec<CatalogProduct>) -> CartView {
        let products = eligible_products(catalog);
        let evaluator = self.evaluator();
        let (offers, admission) = {
            let evaluation = evaluator.evaluate(&snapshot);
            (
                evaluation.build_offers(&products),
                evaluation.evaluate_checkout_admission(),
            )
        };
        CartView {
            revision: 0,
            snapshot,
            offers,
            admission,
        }
    }

    fn publish(&self, mut view: CartView) -> CartView {
        self.view.send_modify(|current| {
            view.revision = current.as_ref().map_or(1, |previous| previous.revision + 1);
            *current = Some(view.clone());
        });
        debug!(revision = view.revision, "published cart view");
        view
    }

    /// Runs one backend request, bounded by the request timeout and the
    /// session's cancellation.
    async fn call<T, F>(
        &self,
        operation: &'static str,
        request: F,
        on_error: fn(BackendError) -> SessionError,
    ) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, BackendError>>,
    {
        let cancelled = self.cancelled.subscribe();
        if *cancelled.borrow() {
            return Err(SessionError::Cancelled);
        }
        tokio::select! {
            outcome = tokio::time::timeout(self.config.request_timeout, request) => match outcome {
                Ok(result) => result.map_err(|error| {
                    warn!(operation, %error, "request failed");
                    on_error(error)
                }),
                Err(_) => {
                    warn!(operation, "request timed out");
                    Err(SessionError::Timeout { operation })
                }
            },
            _ = wait_cancelled(cancelled) => Err(SessionError::Cancelled),
        }
    }
}

async fn wait_cancelled(mut cancelled: watch::Receiver<bool>) {
    while !*cancelled.borrow_and_update() {
        if cancelled.changed().await.is_err() {
            // Sender gone: the session itself was dropped.
            std::future::pending::<()>().await;
        }
    }
}
