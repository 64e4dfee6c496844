use std::{collections::HashMap, future::Future, pin::Pin, time::Duration};

use futures::{channel::mpsc, Stream};
use schema::{
    Hospital, HospitalName, Order, Runner, Scheduler, Speed, StatusUpdate, MAX_PACKAGES_PER_ZIP,
    NUM_ZIPS, SECONDS_PER_DAY, ZIP_MAX_CUMULATIVE_RANGE_M, ZIP_SPEED_MPS,
};

use crate::DispatchScheduler;

type Success = <CsvRunner as Runner<DispatchScheduler>>::Success;
type Error = <CsvRunner as Runner<DispatchScheduler>>::Error;
type Response = Pin<Box<dyn Future<Output = Result<Success, Error>>>>;

// Cap on monitoring snapshots emitted per simulated-second batch while
// fast-forwarding, so a fast replay doesn't flood subscribers.
const MAX_UPDATES_PER_SECOND: u64 = 4;

/// Replays a day of order CSVs against the dispatch scheduler as if the day
/// were progressing: the simulated clock advances one second at a time,
/// every order is queued the second it arrives, and the flight launcher is
/// poked once a minute.
pub struct CsvRunner {
    speed: Speed,
    hospitals: HashMap<HospitalName, Hospital>,
    orders: Vec<Order>,
    status_updates_sender: mpsc::UnboundedSender<StatusUpdate>,
    status_updates_receiver: Option<mpsc::UnboundedReceiver<StatusUpdate>>,
}

impl CsvRunner {
    pub fn from_csv_paths(
        hospitals_csv_path: &str,
        orders_csv_path: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let hospitals = Hospital::directory(Hospital::from_csv(hospitals_csv_path)?);
        let orders = Order::from_csv(orders_csv_path, &hospitals)?;

        let (tx, rx) = mpsc::unbounded();

        Ok(Self {
            speed: Default::default(),
            hospitals,
            orders,
            status_updates_sender: tx,
            status_updates_receiver: Some(rx),
        })
    }

    /// Run with the provided `Speed`
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn hospitals(&self) -> &HashMap<HospitalName, Hospital> {
        &self.hospitals
    }

    /// Returns the stream of monitoring snapshots; may be taken once.
    pub fn stream_updates(&mut self) -> Option<impl Stream<Item = StatusUpdate>> {
        self.status_updates_receiver.take()
    }

    /// Run with the standard fleet parameters.
    pub fn run_with_defaults(&self) -> Response {
        let scheduler = DispatchScheduler::new(
            self.hospitals.clone(),
            NUM_ZIPS,
            MAX_PACKAGES_PER_ZIP,
            ZIP_SPEED_MPS,
            ZIP_MAX_CUMULATIVE_RANGE_M,
        );
        self.run(scheduler)
    }

    async fn run_inner(
        speed: Speed,
        mut updates: mpsc::UnboundedSender<StatusUpdate>,
        mut orders: Vec<Order>,
        mut scheduler: DispatchScheduler,
    ) -> Result<Success, Error> {
        // The feed is sorted by construction, but nothing downstream should
        // have to trust that.
        orders.sort_by_key(|order| order.time);
        let start_time = orders
            .first()
            .map(|order| order.time)
            .ok_or_else(|| "no orders to deliver".to_string())?;

        let mut pending = orders.into_iter().peekable();
        let mut known_unfulfillable = 0;

        let sleep_duration = speed.adjust_duration(Duration::from_secs(1));
        let update_interval_secs = match speed {
            Speed::FastForward(factor) => (factor.get() as u64 / MAX_UPDATES_PER_SECOND).max(1),
            _ => 1,
        };

        for current_time in start_time..=SECONDS_PER_DAY {
            while pending
                .peek()
                .is_some_and(|order| order.time <= current_time)
            {
                let order = pending.next().expect("order");
                log::debug!(
                    "[{current_time}] {} order received for {}",
                    order.priority,
                    order.hospital,
                );
                scheduler.queue_order(order);
            }

            // Once a minute, poke the flight launcher
            if current_time % 60 == 0 {
                for flight in scheduler.launch_flights(current_time) {
                    log::info!("[{current_time}] launching {flight}");
                }

                for order in &scheduler.unfulfillable_orders()[known_unfulfillable..] {
                    log::warn!(
                        "[{current_time}] order from {} can never be served: \
                         roundtrip to {} exceeds max range",
                        order.time,
                        order.hospital,
                    );
                }
                known_unfulfillable = scheduler.unfulfillable_orders().len();
            }

            if current_time % update_interval_secs == 0 {
                let _ = updates.start_send(StatusUpdate {
                    time: current_time,
                    flights: scheduler.active_flights().cloned().collect(),
                    speed,
                });
            }

            tokio::time::sleep(sleep_duration).await;
        }

        let unfulfilled = scheduler.unfulfilled_orders().count();
        log::info!(
            "day over: {} packages delivered, {} flights still airborne, \
             {} orders unfulfilled, {} unservable",
            scheduler.delivered_packages(),
            scheduler.active_flights().count(),
            unfulfilled,
            scheduler.unfulfillable_orders().len(),
        );

        Ok(unfulfilled)
    }
}

impl Runner<DispatchScheduler> for CsvRunner {
    type Response = Response;
    /// Number of orders still waiting for a flight at the end of the day
    type Success = usize;
    /// Description of what went wrong
    type Error = String;

    fn run(&self, scheduler: DispatchScheduler) -> Self::Response {
        let orders = self.orders.clone();
        let speed = self.speed;
        let updates = self.status_updates_sender.clone();
        Box::pin(async move { Self::run_inner(speed, updates, orders, scheduler).await })
    }
}
