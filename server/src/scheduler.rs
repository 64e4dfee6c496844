use std::{collections::HashMap, slice};

use itertools::{Either, Itertools};
use schema::{Flight, Hospital, HospitalName, Order, Scheduler, ZipId};

use crate::fleet::Fleet;
use crate::planner::{PlanOutcome, RoutePlan, RoutePlanner};
use crate::queue::OrderQueue;

/// The online dispatcher for one nest.
///
/// Orders arrive without any knowledge of future ones; once a minute the
/// driver asks which flights launch now. Emergencies launch on the first
/// idle Zip, filling spare capacity opportunistically; resupplies are
/// batched whenever an idle Zip has a feasible route. Every decision is
/// processed in a fixed order (Zip id ascending, emergency before resupply)
/// so that identical inputs reproduce identical flights.
pub struct DispatchScheduler {
    hospitals: HashMap<HospitalName, Hospital>,
    max_packages_per_zip: usize,
    zip_speed_mps: u64,
    zip_max_cumulative_range_m: f64,
    queue: OrderQueue,
    fleet: Fleet,
    /// Orders no Zip can ever serve: the direct roundtrip alone exceeds the
    /// range cap. Excluded from all future planning.
    unfulfillable: Vec<Order>,
    /// Committed flights still in the air, oldest first.
    active_flights: Vec<Flight>,
    /// Packages whose flight has returned to the nest.
    delivered: usize,
}

impl DispatchScheduler {
    pub fn new(
        hospitals: HashMap<HospitalName, Hospital>,
        num_zips: usize,
        max_packages_per_zip: usize,
        zip_speed_mps: u64,
        zip_max_cumulative_range_m: f64,
    ) -> Self {
        Self {
            hospitals,
            max_packages_per_zip,
            zip_speed_mps,
            zip_max_cumulative_range_m,
            queue: OrderQueue::default(),
            fleet: Fleet::new(num_zips),
            unfulfillable: Vec::new(),
            active_flights: Vec::new(),
            delivered: 0,
        }
    }

    /// Flights currently in the air.
    pub fn active_flights(&self) -> impl Iterator<Item = &Flight> {
        self.active_flights.iter()
    }

    /// Orders provably impossible to serve, in discovery order.
    pub fn unfulfillable_orders(&self) -> &[Order] {
        &self.unfulfillable
    }

    /// Packages delivered by flights that have already returned.
    pub fn delivered_packages(&self) -> usize {
        self.delivered
    }

    /// Retires flights that are back at the nest by `current_time`.
    fn process_landings(&mut self, current_time: u64) {
        let active_flights = std::mem::take(&mut self.active_flights);
        let (landed, airborne): (Vec<Flight>, Vec<Flight>) =
            active_flights.into_iter().partition_map(|flight| {
                if flight.end_time(self.zip_speed_mps) <= current_time {
                    Either::Left(flight)
                } else {
                    Either::Right(flight)
                }
            });

        self.delivered += landed.iter().map(Flight::packages).sum::<usize>();
        self.active_flights = airborne;
    }

    fn planner(&self) -> RoutePlanner<'_> {
        RoutePlanner::new(
            &self.hospitals,
            self.max_packages_per_zip,
            self.zip_max_cumulative_range_m,
        )
    }

    /// Freezes a planned route into a flight: the Zip is grounded for the
    /// roundtrip and the route's orders leave the queue for good.
    fn commit(&mut self, zip: ZipId, launch_time: u64, plan: RoutePlan) {
        let assigned: Vec<Order> = plan.orders().cloned().collect();
        self.queue.remove(&assigned);

        let flight = Flight {
            launch_time,
            zip,
            stops: plan.stops,
            total_distance_m: plan.total_distance_m,
        };
        self.fleet
            .reserve(zip, launch_time, flight.duration_secs(self.zip_speed_mps));
        self.active_flights.push(flight);
    }

    fn mark_unfulfillable(&mut self, order: Order) {
        self.queue.remove(slice::from_ref(&order));
        self.unfulfillable.push(order);
    }
}

impl Scheduler for DispatchScheduler {
    type UnfulfilledOrders<'a> = slice::Iter<'a, Order>;
    type LaunchedFlights<'a> = slice::Iter<'a, Flight>;

    fn unfulfilled_orders(&self) -> Self::UnfulfilledOrders<'_> {
        self.queue.iter()
    }

    fn queue_order(&mut self, order: Order) {
        self.queue.enqueue(order);
    }

    fn launch_flights(&mut self, current_time: u64) -> slice::Iter<'_, Flight> {
        self.process_landings(current_time);
        let already_airborne = self.active_flights.len();

        let mut idle = self.fleet.idle_zips(current_time).into_iter().peekable();

        // Emergencies launch at once, without waiting for a fuller load:
        // latency dominates efficiency for them. Each pass seeds with the
        // oldest queued emergency, takes every other emergency that fits as
        // mandatory, and tops up with resupply fillers.
        while idle.peek().is_some() && self.queue.has_emergency() {
            let (emergencies, resupplies) = self.queue.pending_by_priority();
            let mut emergencies = emergencies.into_iter();
            let seed = emergencies.next().expect("emergency");

            let outcome = self
                .planner()
                .plan(seed, emergencies.collect(), resupplies);
            match outcome {
                PlanOutcome::Route(plan) => {
                    let zip = idle.next().expect("idle zip");
                    self.commit(zip, current_time, plan);
                }
                // The Zip is not consumed; the order can never fly.
                PlanOutcome::Infeasible(order) => self.mark_unfulfillable(order),
            }
        }

        // Remaining idle Zips batch resupplies opportunistically: any
        // feasible non-empty route launches now rather than waiting for a
        // better batch later.
        while idle.peek().is_some() {
            let (_, resupplies) = self.queue.pending_by_priority();
            let mut resupplies = resupplies.into_iter();
            let Some(seed) = resupplies.next() else {
                break;
            };

            let outcome = self.planner().plan(seed, Vec::new(), resupplies.collect());
            match outcome {
                PlanOutcome::Route(plan) => {
                    let zip = idle.next().expect("idle zip");
                    self.commit(zip, current_time, plan);
                }
                PlanOutcome::Infeasible(order) => self.mark_unfulfillable(order),
            }
        }

        self.active_flights[already_airborne..].iter()
    }
}
