//! Cooperative event loop driving a [`RoutePlanningController`].
//!
//! The loop multiplexes user commands, live feed observations, congestion
//! level changes forwarded from the shared cache, responses to in-flight
//! routing requests and the deferred-replan timer on one task. Every outcome
//! change is published on a `watch` channel for the presentation layer.
//!
//! Sources are polled in a fixed order: in-flight responses, congestion
//! changes, feed observations, the deferred-replan timer, and commands last.

use futures_util::StreamExt;
use futures_util::future::LocalBoxFuture;
use futures_util::stream::FuturesUnordered;
use log::{debug, info};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use trafficway_core::congestion::LevelChange;
use trafficway_core::{GeoPoint, JunctionState, PlanOutcome, PlanningRequest, RoutingProvider};

use crate::controller::{PlannerStats, RoutePlanningController, RouteResponse};
use crate::error::PlannerError;

/// Input accepted by [`PlannerLoop::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlannerCommand {
    /// The user started typing a place name.
    BeginResolving,
    /// The user abandoned the lookup, keeping the current endpoints.
    CancelResolving,
    /// The user picked endpoints; `None` clears that endpoint.
    SelectEndpoints {
        /// Route start.
        origin: Option<GeoPoint>,
        /// Route end.
        destination: Option<GeoPoint>,
    },
    /// Stop the loop.
    Shutdown,
}

/// Runs a controller until shutdown or a fatal configuration error.
#[derive(Debug)]
pub struct PlannerLoop<P> {
    controller: RoutePlanningController<P>,
}

impl<P: RoutingProvider + 'static> PlannerLoop<P> {
    /// Wrap `controller`.
    #[must_use]
    pub const fn new(controller: RoutePlanningController<P>) -> Self {
        Self { controller }
    }

    /// The wrapped controller.
    #[must_use]
    pub const fn controller(&self) -> &RoutePlanningController<P> {
        &self.controller
    }

    /// Recover the controller once the loop is done with it.
    #[must_use]
    pub fn into_controller(self) -> RoutePlanningController<P> {
        self.controller
    }

    /// Process commands until [`PlannerCommand::Shutdown`] arrives or the
    /// loop runs out of work.
    ///
    /// Observations received on `feed` are upserted into the shared cache. A
    /// closed feed is tolerated; cached levels age out. Once the command
    /// channel closes the loop keeps going until the feed has closed, every
    /// in-flight response has been applied and no replan is deferred.
    /// `Shutdown` stops immediately and abandons that work. A cache listener
    /// forwarding level changes is registered for the duration of the call
    /// and removed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Configuration`] when the routing provider is
    /// misconfigured. The final outcome describing the failure is published
    /// first.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<PlannerCommand>,
        mut feed: mpsc::Receiver<JunctionState>,
        outcomes: &watch::Sender<PlanOutcome>,
    ) -> Result<PlannerStats, PlannerError> {
        let (change_tx, mut changes) = mpsc::unbounded_channel::<LevelChange>();
        let listener = self.controller.cache().on_change(Box::new(move |change| {
            if change_tx.send(*change).is_err() {
                debug!("planner loop gone; dropping congestion change");
            }
        }));
        info!("planner loop started");

        let inputs = Inputs {
            commands: &mut commands,
            feed: &mut feed,
            changes: &mut changes,
        };
        let result = self.drive(inputs, outcomes).await;

        if !self.controller.cache().remove_listener(listener) {
            debug!("congestion listener already removed");
        }
        info!("planner loop stopped: {:?}", self.controller.stats());
        result.map(|()| self.controller.stats())
    }

    async fn drive(
        &mut self,
        inputs: Inputs<'_>,
        outcomes: &watch::Sender<PlanOutcome>,
    ) -> Result<(), PlannerError> {
        let Inputs {
            commands,
            feed,
            changes,
        } = inputs;
        let mut in_flight: FuturesUnordered<LocalBoxFuture<'static, RouteResponse>> =
            FuturesUnordered::new();
        let mut feed_open = true;
        let mut commands_open = true;
        publish(outcomes, self.controller.outcome());
        loop {
            let deferred = self.controller.deferred_until();
            if !commands_open && !feed_open && in_flight.is_empty() && deferred.is_none() {
                info!("planner loop drained");
                return Ok(());
            }
            let wake_at = deferred.unwrap_or_else(Instant::now);
            // Work already under way is handled before new input.
            let request: Option<PlanningRequest> = tokio::select! {
                biased;
                Some(response) = in_flight.next(), if !in_flight.is_empty() => {
                    let applied = self.controller.apply(response, Instant::now());
                    publish(outcomes, self.controller.outcome());
                    applied?;
                    None
                }
                Some(_) = changes.recv() => {
                    self.controller.on_congestion_change(Instant::now())
                }
                observed = feed.recv(), if feed_open => {
                    if let Some(state) = observed {
                        let junction = state.id;
                        let upsert = self.controller.cache().upsert(state);
                        debug!("feed update for junction {junction}: {upsert:?}");
                    } else {
                        info!("congestion feed closed; cached levels will age out");
                        feed_open = false;
                    }
                    None
                }
                () = sleep_until(wake_at), if deferred.is_some() => {
                    self.controller.poll_deferred(Instant::now())
                }
                command = commands.recv(), if commands_open => match command {
                    Some(PlannerCommand::BeginResolving) => {
                        self.controller.begin_resolving();
                        None
                    }
                    Some(PlannerCommand::CancelResolving) => {
                        self.controller.cancel_resolving(Instant::now())
                    }
                    Some(PlannerCommand::SelectEndpoints { origin, destination }) => {
                        self.controller.select_endpoints(origin, destination)
                    }
                    Some(PlannerCommand::Shutdown) => return Ok(()),
                    None => {
                        debug!("command channel closed; draining outstanding work");
                        commands_open = false;
                        None
                    }
                },
            };
            if let Some(issued) = request {
                in_flight.push(self.controller.dispatch(issued));
            }
            publish(outcomes, self.controller.outcome());
        }
    }
}

struct Inputs<'a> {
    commands: &'a mut mpsc::Receiver<PlannerCommand>,
    feed: &'a mut mpsc::Receiver<JunctionState>,
    changes: &'a mut mpsc::UnboundedReceiver<LevelChange>,
}

fn publish(outcomes: &watch::Sender<PlanOutcome>, outcome: &PlanOutcome) {
    outcomes.send_if_modified(|current| {
        if current == outcome {
            false
        } else {
            current.clone_from(outcome);
            true
        }
    });
}
