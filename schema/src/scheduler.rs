use crate::{Flight, Order};

/// The dispatch decision-maker for one nest.
///
/// The driver feeds it orders as they arrive and pokes it once a simulated
/// minute; every flight it returns is an irrevocable commitment of one Zip
/// to one roundtrip.
pub trait Scheduler {
    /// Orders accepted but not yet bound into a flight.
    type UnfulfilledOrders<'a>: Iterator<Item = &'a Order>
    where
        Self: 'a;
    /// Flights newly committed by a single scheduling pass.
    type LaunchedFlights<'a>: Iterator<Item = &'a Flight>
    where
        Self: 'a;

    /// Snapshot of the orders still waiting for a flight. After the final
    /// tick of the day these are the unfulfilled orders.
    fn unfulfilled_orders<'a>(&'a self) -> Self::UnfulfilledOrders<'a>;

    /// Accepts one order into the queue. Called every time an order arrives.
    fn queue_order(&mut self, order: Order);

    /// Decides which flights launch at `current_time` and commits them,
    /// reserving their Zips and consuming their orders from the queue.
    fn launch_flights<'a>(&'a mut self, current_time: u64) -> Self::LaunchedFlights<'a>;
}
