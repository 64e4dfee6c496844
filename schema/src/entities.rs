use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use once_cell::sync::Lazy;

/// The fixed launch and return point for every flight, at the coordinate
/// origin of the service area.
pub static NEST: Lazy<Hospital> = Lazy::new(|| Hospital {
    name: HospitalName::new("Nest"),
    location: Location {
        north_m: 0,
        east_m: 0,
    },
});

/// Each nest operates this many Zips.
pub const NUM_ZIPS: usize = 10;

/// A Zip carries between 1 and this many packages per flight. It can drop
/// more than one of them at the same stop.
pub const MAX_PACKAGES_PER_ZIP: usize = 3;

/// Zips fly at a constant groundspeed (m/s).
pub const ZIP_SPEED_MPS: u64 = 30;

/// Total roundtrip distance a Zip can cover on a single flight (m).
pub const ZIP_MAX_CUMULATIVE_RANGE_M: f64 = 160_000.0;

/// Length of the simulated day (s).
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// A position on the service area's flat north/east plane, in meters of
/// offset from the nest.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub north_m: i64,
    pub east_m: i64,
}

impl Location {
    /// Straight-line distance to another location in meters.
    pub fn distance_m(&self, other: &Location) -> f64 {
        let north = (self.north_m - other.north_m) as f64;
        let east = (self.east_m - other.east_m) as f64;
        (north * north + east * east).sqrt()
    }

    /// Length of the direct nest -> here -> nest roundtrip in meters.
    pub fn roundtrip_from_nest_m(&self) -> f64 {
        2.0 * NEST.location.distance_m(self)
    }
}

/// Unique key for a hospital within the service area.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HospitalName(String);

impl HospitalName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HospitalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A delivery site served by the nest's Zips.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Hospital {
    pub name: HospitalName,
    pub location: Location,
}

impl Hospital {
    /// Reads hospital records from a CSV of `name, north_m, east_m` rows.
    /// Any malformed row aborts the load.
    pub fn from_csv(path: &str) -> Result<Vec<Self>, Box<dyn std::error::Error>> {
        let csv_bytes = std::fs::read(path)?;
        let mut hospitals = vec![];

        for line in String::from_utf8(csv_bytes)?.lines() {
            let Some((name, north_m, east_m)) = line.split(',').map(str::trim).collect_tuple()
            else {
                return Err(format!("malformed hospital row: {line:?}").into());
            };

            hospitals.push(Self {
                name: HospitalName::new(name),
                location: Location {
                    north_m: north_m.parse()?,
                    east_m: east_m.parse()?,
                },
            });
        }

        Ok(hospitals)
    }

    /// Indexes hospitals by name for lookup during planning.
    pub fn directory(hospitals: Vec<Hospital>) -> HashMap<HospitalName, Hospital> {
        hospitals
            .into_iter()
            .map(|hospital| (hospital.name.clone(), hospital))
            .collect()
    }
}

/// The two classes of order the nest serves. Emergencies demand immediate
/// dispatch; resupplies tolerate batching.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Priority {
    Emergency,
    #[default]
    Resupply,
}

impl<'a> TryFrom<&'a str> for Priority {
    type Error = String;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        match s {
            "Emergency" => Ok(Self::Emergency),
            "Resupply" => Ok(Self::Resupply),
            other => Err(format!("invalid priority: {other:?}")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Emergency => "Emergency",
            Self::Resupply => "Resupply",
        })
    }
}

/// A request for one package to be delivered to a hospital.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// Seconds since midnight at which the order was placed.
    pub time: u64,
    pub hospital: HospitalName,
    pub priority: Priority,
}

impl Order {
    /// Reads order records from a CSV of `time, hospital, priority` rows.
    /// A row naming an unknown hospital, or with an unparseable time or
    /// priority, is malformed and aborts the load: such a record must never
    /// reach the scheduling core.
    pub fn from_csv(
        path: &str,
        hospitals: &HashMap<HospitalName, Hospital>,
    ) -> Result<Vec<Self>, Box<dyn std::error::Error>> {
        let csv_bytes = std::fs::read(path)?;
        let mut orders = vec![];

        for line in String::from_utf8(csv_bytes)?.lines() {
            let Some((time, hospital, priority)) = line.split(',').map(str::trim).collect_tuple()
            else {
                return Err(format!("malformed order row: {line:?}").into());
            };

            let hospital = HospitalName::new(hospital);
            if !hospitals.contains_key(&hospital) {
                return Err(format!("order references unknown hospital: {hospital}").into());
            }

            orders.push(Self {
                time: time.parse()?,
                hospital,
                priority: priority.try_into()?,
            });
        }

        Ok(orders)
    }
}

/// Identity of one Zip in the nest's fleet, `0..NUM_ZIPS`.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZipId(pub usize);

impl fmt::Display for ZipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zip-{}", self.0)
    }
}

/// One hospital visited during a flight, with every order dropped there.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Stop {
    pub hospital: HospitalName,
    pub orders: Vec<Order>,
}

/// One committed roundtrip: a Zip, its launch time, and its stop sequence.
/// Immutable once committed; there is no re-routing of airborne flights.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Flight {
    /// Seconds since midnight at which the flight launched.
    pub launch_time: u64,
    /// The Zip flying it.
    pub zip: ZipId,
    /// Hospitals in visit order.
    pub stops: Vec<Stop>,
    /// Length of the nest -> stops -> nest roundtrip in meters.
    pub total_distance_m: f64,
}

impl Flight {
    /// Every order aboard, in stop order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.stops.iter().flat_map(|stop| stop.orders.iter())
    }

    /// Number of packages aboard at launch.
    pub fn packages(&self) -> usize {
        self.stops.iter().map(|stop| stop.orders.len()).sum()
    }

    /// Time to fly the whole roundtrip, rounded up so that a Zip is never
    /// considered home before it physically is.
    pub fn duration_secs(&self, speed_mps: u64) -> u64 {
        (self.total_distance_m / speed_mps as f64).ceil() as u64
    }

    /// Seconds since midnight at which the Zip is back at the nest.
    pub fn end_time(&self, speed_mps: u64) -> u64 {
        self.launch_time + self.duration_secs(speed_mps)
    }

    /// Where the Zip is at `current_time`, interpolated linearly along
    /// nest -> stops -> nest, as `(east_m, north_m, packages_aboard)`.
    pub fn position(
        &self,
        hospitals: &HashMap<HospitalName, Hospital>,
        current_time: u64,
        speed_mps: u64,
    ) -> (f64, f64, usize) {
        let elapsed = current_time.saturating_sub(self.launch_time);
        let mut remaining_m = (elapsed * speed_mps) as f64;
        let mut aboard = self.packages();
        let mut prev = NEST.location;

        let legs = self
            .stops
            .iter()
            .map(|stop| {
                let location = hospitals.get(&stop.hospital).expect("hospital").location;
                (location, stop.orders.len())
            })
            .chain(std::iter::once((NEST.location, 0)));

        for (location, dropped) in legs {
            let leg_m = prev.distance_m(&location);
            if remaining_m <= leg_m {
                let f = if leg_m > 0.0 { remaining_m / leg_m } else { 0.0 };
                return (
                    prev.east_m as f64 + (location.east_m - prev.east_m) as f64 * f,
                    prev.north_m as f64 + (location.north_m - prev.north_m) as f64 * f,
                    aboard,
                );
            }

            remaining_m -= leg_m;
            aboard -= dropped;
            prev = location;
        }

        // Past the end of the roundtrip: back at the nest, empty.
        (0.0, 0.0, 0)
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stops = self
            .stops
            .iter()
            .map(|stop| stop.hospital.as_str())
            .join("->");
        write!(
            f,
            "{} @ {} to {} ({} packages, {:.0} m roundtrip)",
            self.zip,
            self.launch_time,
            stops,
            self.packages(),
            self.total_distance_m,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn hospital(name: &str, north_m: i64, east_m: i64) -> Hospital {
        Hospital {
            name: HospitalName::new(name),
            location: Location { north_m, east_m },
        }
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Location {
            north_m: 0,
            east_m: 0,
        };
        let b = Location {
            north_m: 3000,
            east_m: 4000,
        };

        assert_eq!(a.distance_m(&b), 5000.0);
        assert_eq!(b.distance_m(&a), 5000.0);
        assert_eq!(b.roundtrip_from_nest_m(), 10_000.0);
    }

    #[test]
    fn priority_parses_exactly_two_classes() {
        assert_eq!(Priority::try_from("Emergency"), Ok(Priority::Emergency));
        assert_eq!(Priority::try_from("Resupply"), Ok(Priority::Resupply));
        assert!(Priority::try_from("emergency").is_err());
        assert!(Priority::try_from("Urgent").is_err());
    }

    #[test]
    fn flight_duration_rounds_up() {
        let flight = Flight {
            launch_time: 0,
            zip: ZipId(0),
            stops: vec![],
            total_distance_m: 2000.0,
        };

        // 2000 m at 30 m/s is 66.7 s of flying
        assert_eq!(flight.duration_secs(30), 67);
        assert_eq!(flight.end_time(30), 67);
    }

    #[test]
    fn position_interpolates_along_the_roundtrip() {
        let hospitals = Hospital::directory(vec![hospital("Alpha", 1000, 0)]);
        let flight = Flight {
            launch_time: 0,
            zip: ZipId(0),
            stops: vec![Stop {
                hospital: HospitalName::new("Alpha"),
                orders: vec![Order::default()],
            }],
            total_distance_m: 2000.0,
        };

        // 10 s out: 300 m up the outbound leg, package still aboard
        let (east_m, north_m, aboard) = flight.position(&hospitals, 10, 30);
        assert_eq!((east_m, north_m, aboard), (0.0, 300.0, 1));

        // 34 s out: 1020 m flown, 20 m into the return leg, empty
        let (east_m, north_m, aboard) = flight.position(&hospitals, 34, 30);
        assert_eq!((east_m, north_m, aboard), (0.0, 980.0, 0));

        // Long since landed
        let (east_m, north_m, aboard) = flight.position(&hospitals, 3600, 30);
        assert_eq!((east_m, north_m, aboard), (0.0, 0.0, 0));
    }

    #[test]
    fn sample_csvs_load() {
        let hospitals = Hospital::from_csv("../test_data/hospitals.csv").expect("hospitals");
        assert!(!hospitals.is_empty());

        let directory = Hospital::directory(hospitals);
        let orders = Order::from_csv("../test_data/orders.csv", &directory).expect("orders");
        assert!(!orders.is_empty());
        assert!(orders.windows(2).all(|pair| pair[0].time <= pair[1].time));
    }

    #[test]
    fn order_with_unknown_hospital_is_rejected() {
        let path = std::env::temp_dir().join("orders_unknown_hospital.csv");
        std::fs::write(&path, "100, Nowhere, Resupply\n").expect("write");

        let hospitals = Hospital::directory(vec![hospital("Alpha", 1000, 0)]);
        let err = Order::from_csv(path.to_str().expect("path"), &hospitals)
            .expect_err("unknown hospital must be rejected");
        assert!(err.to_string().contains("unknown hospital"));
    }
}
