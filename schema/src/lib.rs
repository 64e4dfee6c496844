mod entities;
mod runner;
mod scheduler;

pub use entities::{
    Flight, Hospital, HospitalName, Location, Order, Priority, Stop, ZipId,
    MAX_PACKAGES_PER_ZIP, NEST, NUM_ZIPS, SECONDS_PER_DAY, ZIP_MAX_CUMULATIVE_RANGE_M,
    ZIP_SPEED_MPS,
};
pub use runner::{Runner, Speed};
pub use scheduler::Scheduler;

pub const SAMPLE_HOSPITALS_CSV_PATH: &str = "./test_data/hospitals.csv";
pub const SAMPLE_ORDERS_CSV_PATH: &str = "./test_data/orders.csv";

/// Point-in-time snapshot of the simulation, emitted for monitoring.
#[derive(Clone, Debug)]
pub struct StatusUpdate {
    pub time: u64,
    /// Flights in the air at `time`.
    pub flights: Vec<Flight>,
    pub speed: Speed,
}
