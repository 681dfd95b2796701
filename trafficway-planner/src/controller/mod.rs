//! The route planning state machine.
//!
//! [`RoutePlanningController`] owns the active origin and destination, the
//! visible [`PlanOutcome`] and the sequence fence. It is split into
//! synchronous transitions and one asynchronous step:
//!
//! - [`RoutePlanningController::select_endpoints`],
//!   [`RoutePlanningController::on_congestion_change`] and
//!   [`RoutePlanningController::poll_deferred`] decide whether a routing
//!   request is needed and return it.
//! - [`RoutePlanningController::dispatch`] turns a request into a detached
//!   future that owns everything it needs, so several can be in flight while
//!   the controller keeps taking input.
//! - [`RoutePlanningController::apply`] folds a response back in, discarding
//!   it unless its sequence number is still current.
//!
//! Congestion is read from the shared cache only inside `apply`, never across
//! an await point, so scores always reflect the cache at the moment a
//! response lands.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use log::{debug, error, info, warn};
use tokio::time::{Instant, timeout};
use trafficway_core::congestion::SharedCongestionCache;
use trafficway_core::proximity::ProximityMatcher;
use trafficway_core::{
    CongestionLevel, ControllerState, GeoPoint, JunctionId, JunctionState, PlanOutcome,
    PlanTrigger, PlanningRequest, ProviderRoute, RoutingError, RoutingProvider, number_routes,
};
use trafficway_scorer::{Ranking, RouteScorer};

use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::fence::SequenceFence;

/// Response to a dispatched [`PlanningRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    /// Request this response answers.
    pub request: PlanningRequest,
    /// Provider result, with timeouts folded into [`RoutingError::Timeout`].
    pub result: Result<Vec<ProviderRoute>, RoutingError>,
}

/// What [`RoutePlanningController::apply`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response updated the visible outcome.
    Applied,
    /// A newer request was issued; the response was discarded.
    Stale,
}

/// Counters describing planner activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlannerStats {
    /// Routing requests issued, for any trigger.
    pub requests_issued: u64,
    /// Requests issued because congestion changed.
    pub replans: u64,
    /// Responses discarded by the sequence fence.
    pub stale_discarded: u64,
    /// Responses that carried a transient provider failure.
    pub transient_failures: u64,
    /// Congestion changes folded into an already scheduled replan.
    pub changes_coalesced: u64,
    /// Congestion changes that arrived outside the settled state.
    pub changes_ignored: u64,
    /// Replans skipped because the scoring inputs had not changed.
    pub replans_skipped: u64,
    /// Selections or responses served from the previous ranking.
    pub memo_hits: u64,
    /// Congestion changes held while a place lookup was open.
    pub changes_held: u64,
}

type Fingerprint = Vec<(JunctionId, GeoPoint, CongestionLevel)>;

/// Inputs and result of the last successful ranking.
#[derive(Debug, Clone)]
struct Memo {
    origin: GeoPoint,
    destination: GeoPoint,
    fingerprint: Fingerprint,
    routes: Vec<ProviderRoute>,
    ranking: Ranking,
}

impl Memo {
    fn covers(&self, origin: GeoPoint, destination: GeoPoint, fingerprint: &Fingerprint) -> bool {
        self.origin == origin && self.destination == destination && self.fingerprint == *fingerprint
    }
}

fn fingerprint(junctions: &BTreeMap<JunctionId, JunctionState>) -> Fingerprint {
    junctions
        .values()
        .map(|state| (state.id, state.point, state.congestion_level))
        .collect()
}

/// Source of wall-clock time used to age junction observations.
pub type WallClock = fn() -> DateTime<Utc>;

/// Orchestrates routing, proximity matching and ranking for one
/// origin/destination pair at a time.
pub struct RoutePlanningController<P> {
    provider: Rc<P>,
    cache: SharedCongestionCache,
    scorer: RouteScorer,
    config: PlannerConfig,
    fence: SequenceFence,
    wall_clock: WallClock,
    state: ControllerState,
    endpoints: Option<(GeoPoint, GeoPoint)>,
    outcome: PlanOutcome,
    last_completed: Option<Instant>,
    deferred: Option<Instant>,
    memo: Option<Memo>,
    held_change: bool,
    stats: PlannerStats,
}

impl<P> std::fmt::Debug for RoutePlanningController<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePlanningController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("endpoints", &self.endpoints)
            .field("latest_sequence", &self.fence.latest())
            .field("deferred", &self.deferred)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<P: RoutingProvider> RoutePlanningController<P> {
    /// Create a controller with default configuration.
    pub fn new(provider: P, cache: SharedCongestionCache) -> Self {
        Self::with_config(provider, cache, PlannerConfig::default())
    }

    /// Create a controller with explicit configuration.
    pub fn with_config(provider: P, cache: SharedCongestionCache, config: PlannerConfig) -> Self {
        Self {
            provider: Rc::new(provider),
            cache,
            scorer: RouteScorer::new(ProximityMatcher::new(config.threshold_meters)),
            config,
            fence: SequenceFence::default(),
            wall_clock: Utc::now,
            state: ControllerState::Idle,
            endpoints: None,
            outcome: PlanOutcome::default(),
            last_completed: None,
            deferred: None,
            memo: None,
            held_change: false,
            stats: PlannerStats::default(),
        }
    }

    /// Replace the clock used to judge junction freshness.
    #[must_use]
    pub const fn with_wall_clock(mut self, clock: WallClock) -> Self {
        self.wall_clock = clock;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Outcome the presentation layer should render.
    #[must_use]
    pub const fn outcome(&self) -> &PlanOutcome {
        &self.outcome
    }

    /// Activity counters.
    #[must_use]
    pub const fn stats(&self) -> PlannerStats {
        self.stats
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Active origin and destination.
    #[must_use]
    pub const fn endpoints(&self) -> Option<(GeoPoint, GeoPoint)> {
        self.endpoints
    }

    /// Shared congestion cache read at scoring time.
    #[must_use]
    pub const fn cache(&self) -> &SharedCongestionCache {
        &self.cache
    }

    /// The routing provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Instant at which a coalesced replan becomes due.
    #[must_use]
    pub const fn deferred_until(&self) -> Option<Instant> {
        self.deferred
    }

    fn enter(&mut self, state: ControllerState) {
        if self.state != state {
            debug!("planner {} -> {state}", self.state);
        }
        self.state = state;
        self.outcome.state = state;
    }

    /// Note that the user is looking up a place name.
    ///
    /// Has no effect while a request is in flight; its response still lands.
    /// Congestion changes reported while resolving are held until the lookup
    /// ends.
    pub fn begin_resolving(&mut self) {
        if matches!(self.state, ControllerState::Idle | ControllerState::Settled) {
            self.enter(ControllerState::Resolving);
        }
    }

    /// Abandon a place lookup without selecting new endpoints.
    ///
    /// The previous plan, if any, becomes settled again. A congestion change
    /// held during the lookup is then handled as if it had just arrived,
    /// cooldown included.
    pub fn cancel_resolving(&mut self, now: Instant) -> Option<PlanningRequest> {
        if self.state != ControllerState::Resolving {
            return None;
        }
        if self.endpoints.is_none() {
            self.enter(ControllerState::Idle);
            return None;
        }
        self.enter(ControllerState::Settled);
        if !std::mem::take(&mut self.held_change) {
            return None;
        }
        debug!("replaying congestion change held during lookup");
        self.on_congestion_change(now)
    }

    /// Drop the active endpoints and void any in-flight request.
    pub fn clear_endpoints(&mut self) {
        self.fence.issue();
        self.endpoints = None;
        self.deferred = None;
        self.held_change = false;
        self.memo = None;
        self.outcome = PlanOutcome::default();
        self.enter(ControllerState::Idle);
    }

    /// Select new endpoints and start planning.
    ///
    /// A missing endpoint clears the plan and returns to idle. An invalid
    /// endpoint does the same and explains why in the rationale; no request
    /// is issued in either case. Reselecting the endpoints of the visible
    /// plan while the fresh congestion snapshot is unchanged keeps that plan
    /// and issues nothing. Otherwise a new request is issued, voiding
    /// whatever was in flight.
    pub fn select_endpoints(
        &mut self,
        origin: Option<GeoPoint>,
        destination: Option<GeoPoint>,
    ) -> Option<PlanningRequest> {
        let (Some(from), Some(to)) = (origin, destination) else {
            self.clear_endpoints();
            return None;
        };
        let invalid = [("origin", from), ("destination", to)]
            .into_iter()
            .find_map(|(field, point)| point.validate().err().map(|error| (field, error)));
        if let Some((field, problem)) = invalid {
            warn!("rejecting {field}: {problem}");
            self.clear_endpoints();
            self.outcome.rationale = format!("The {field} is not a valid location: {problem}.");
            return None;
        }

        let showing_plan = matches!(
            self.state,
            ControllerState::Settled | ControllerState::Resolving
        ) && self.endpoints == Some((from, to));
        if showing_plan && self.memo_covers(from, to) {
            debug!("endpoints and congestion unchanged; keeping the settled plan");
            self.stats.memo_hits += 1;
            self.held_change = false;
            self.enter(ControllerState::Settled);
            return None;
        }

        self.endpoints = Some((from, to));
        self.deferred = None;
        self.held_change = false;
        self.outcome = PlanOutcome {
            rationale: String::from("Looking for routes."),
            ..PlanOutcome::default()
        };
        Some(self.issue(from, to, PlanTrigger::Input))
    }

    fn issue(
        &mut self,
        origin: GeoPoint,
        destination: GeoPoint,
        trigger: PlanTrigger,
    ) -> PlanningRequest {
        let request = PlanningRequest {
            origin,
            destination,
            sequence_number: self.fence.issue(),
            trigger,
        };
        self.stats.requests_issued += 1;
        match trigger {
            PlanTrigger::Input => self.enter(ControllerState::Planning),
            PlanTrigger::Congestion => {
                self.stats.replans += 1;
                self.enter(ControllerState::Replanning);
            }
        }
        info!(
            "issued planning request {} ({trigger:?}) from {origin} to {destination}",
            request.sequence_number
        );
        request
    }

    /// React to a congestion level change reported by the cache.
    ///
    /// Only a settled plan is re-planned. Within the cooldown after the last
    /// completed plan the change is deferred; further changes before the
    /// deadline are coalesced into that single deferred replan.
    pub fn on_congestion_change(&mut self, now: Instant) -> Option<PlanningRequest> {
        if self.state == ControllerState::Resolving && self.endpoints.is_some() {
            self.stats.changes_held += 1;
            self.held_change = true;
            return None;
        }
        if self.state != ControllerState::Settled || self.endpoints.is_none() {
            self.stats.changes_ignored += 1;
            return None;
        }
        if self.deferred.is_some() {
            self.stats.changes_coalesced += 1;
            return None;
        }
        if let Some(completed) = self.last_completed {
            let ready_at = completed + self.config.cooldown;
            if now < ready_at {
                debug!("deferring replan until cooldown ends");
                self.deferred = Some(ready_at);
                return None;
            }
        }
        self.replan()
    }

    /// Fire a deferred replan once its deadline has passed.
    pub fn poll_deferred(&mut self, now: Instant) -> Option<PlanningRequest> {
        let due = self.deferred?;
        if now < due {
            return None;
        }
        self.deferred = None;
        if self.state == ControllerState::Resolving {
            self.held_change = true;
            return None;
        }
        if self.state != ControllerState::Settled {
            return None;
        }
        self.replan()
    }

    fn replan(&mut self) -> Option<PlanningRequest> {
        let (origin, destination) = self.endpoints?;
        if self.memo_covers(origin, destination) {
            debug!("congestion inputs unchanged; skipping replan");
            self.stats.replans_skipped += 1;
            return None;
        }
        Some(self.issue(origin, destination, PlanTrigger::Congestion))
    }

    fn memo_covers(&self, origin: GeoPoint, destination: GeoPoint) -> bool {
        self.memo.as_ref().is_some_and(|memo| {
            memo.covers(origin, destination, &fingerprint(&self.fresh_junctions()))
        })
    }

    fn fresh_junctions(&self) -> BTreeMap<JunctionId, JunctionState> {
        self.cache
            .snapshot((self.wall_clock)(), self.config.validity_window)
    }

    /// Build the future performing `request`.
    ///
    /// The future owns a handle to the provider and enforces the configured
    /// timeout. Dropping it abandons the request; the fence makes that safe.
    pub fn dispatch(&self, request: PlanningRequest) -> LocalBoxFuture<'static, RouteResponse>
    where
        P: 'static,
    {
        let provider = Rc::clone(&self.provider);
        let deadline = self.config.request_timeout;
        async move {
            let call = provider.routes(request.origin, request.destination);
            let result = timeout(deadline, call).await.unwrap_or_else(|_| {
                Err(RoutingError::Timeout {
                    url: String::from("routing provider"),
                    timeout_secs: deadline.as_secs(),
                })
            });
            RouteResponse { request, result }
        }
        .boxed_local()
    }

    /// Fold a response into the visible outcome.
    ///
    /// Responses for anything but the latest request are discarded. Every
    /// applied response leaves the controller settled.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Configuration`] when the provider reports
    /// missing credentials or cannot be reached. The outcome is still
    /// updated, so the controller stays usable once configuration is fixed.
    pub fn apply(
        &mut self,
        response: RouteResponse,
        now: Instant,
    ) -> Result<Applied, PlannerError> {
        let RouteResponse { request, result } = response;
        if !self.fence.is_current(request.sequence_number) {
            debug!(
                "discarding response {} (latest is {})",
                request.sequence_number,
                self.fence.latest()
            );
            self.stats.stale_discarded += 1;
            return Ok(Applied::Stale);
        }
        self.last_completed = Some(now);
        self.deferred = None;

        let routes = match result {
            Ok(routes) if routes.is_empty() => Err(RoutingError::NoRoute),
            other => other,
        };
        match routes {
            Ok(routes) => {
                self.settle(&request, routes);
                Ok(Applied::Applied)
            }
            Err(problem) if problem.is_configuration_error() => {
                error!("routing provider configuration error: {problem}");
                self.memo = None;
                self.outcome = PlanOutcome {
                    rationale: format!("Routing is unavailable: {problem}."),
                    ..PlanOutcome::default()
                };
                self.enter(ControllerState::Settled);
                Err(PlannerError::Configuration { source: problem })
            }
            Err(problem) => {
                warn!("planning request {} failed: {problem}", request.sequence_number);
                self.stats.transient_failures += 1;
                self.fail_transiently(&request, &problem);
                Ok(Applied::Applied)
            }
        }
    }

    fn settle(&mut self, request: &PlanningRequest, routes: Vec<ProviderRoute>) {
        let junctions = self.fresh_junctions();
        let current = fingerprint(&junctions);
        let reusable = self.memo.as_ref().filter(|memo| {
            memo.covers(request.origin, request.destination, &current) && memo.routes == routes
        });
        let ranking = if let Some(memo) = reusable {
            self.stats.memo_hits += 1;
            memo.ranking.clone()
        } else {
            self.scorer.score(number_routes(routes.clone()), &junctions)
        };
        info!(
            "plan {} settled with {} routes, recommending {:?}",
            request.sequence_number,
            ranking.routes.len(),
            ranking.recommended_id()
        );
        self.outcome = PlanOutcome {
            recommended_route_id: ranking.recommended_id(),
            routes: ranking.routes.clone(),
            rationale: ranking.rationale.to_string(),
            state: ControllerState::Settled,
        };
        self.memo = Some(Memo {
            origin: request.origin,
            destination: request.destination,
            fingerprint: current,
            routes,
            ranking,
        });
        self.enter(ControllerState::Settled);
    }

    fn fail_transiently(&mut self, request: &PlanningRequest, problem: &RoutingError) {
        let keeps_routes =
            request.trigger == PlanTrigger::Congestion && !self.outcome.routes.is_empty();
        if keeps_routes {
            self.outcome.rationale =
                format!("Could not refresh routes ({problem}); showing the last recommendation.");
        } else {
            self.memo = None;
            self.outcome = PlanOutcome {
                rationale: format!("Could not find a route: {problem}."),
                ..PlanOutcome::default()
            };
        }
        self.enter(ControllerState::Settled);
    }

    /// Dispatch `request` and apply its response.
    ///
    /// Convenient for sequential callers. Interactive callers that must keep
    /// taking input while a request is in flight use
    /// [`RoutePlanningController::dispatch`] and
    /// [`RoutePlanningController::apply`] directly, as the
    /// [`crate::PlannerLoop`] does.
    ///
    /// # Errors
    ///
    /// See [`RoutePlanningController::apply`].
    pub async fn plan(&mut self, request: PlanningRequest) -> Result<Applied, PlannerError>
    where
        P: 'static,
    {
        let response = self.dispatch(request).await;
        self.apply(response, Instant::now())
    }
}
