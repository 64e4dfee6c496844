use schema::ZipId;

/// One aircraft and the time at which it is next on the ground and ready.
#[derive(Clone, Copy, Debug)]
struct Zip {
    id: ZipId,
    available_at: u64,
}

/// Availability ledger for the nest's aircraft.
///
/// A Zip is idle iff `now >= available_at`. The ledger is the sole mutator
/// of availability: a Zip transitions to busy only through [`Fleet::reserve`].
#[derive(Debug)]
pub struct Fleet {
    zips: Vec<Zip>,
}

impl Fleet {
    /// A fleet of `num_zips` aircraft, all on the ground at time zero.
    pub fn new(num_zips: usize) -> Self {
        Self {
            zips: (0..num_zips)
                .map(|id| Zip {
                    id: ZipId(id),
                    available_at: 0,
                })
                .collect(),
        }
    }

    /// Zips on the ground and ready to launch at `now`, in id order.
    pub fn idle_zips(&self, now: u64) -> Vec<ZipId> {
        self.zips
            .iter()
            .filter(|zip| zip.available_at <= now)
            .map(|zip| zip.id)
            .collect()
    }

    /// Commits a Zip to a roundtrip launching at `launch_time`, grounding it
    /// until `launch_time + flight_duration_secs`.
    ///
    /// Panics if the Zip is still airborne at `launch_time`: overlapping
    /// reservations are a scheduler defect.
    pub fn reserve(&mut self, id: ZipId, launch_time: u64, flight_duration_secs: u64) {
        let zip = self
            .zips
            .iter_mut()
            .find(|zip| zip.id == id)
            .unwrap_or_else(|| panic!("unknown zip: {id}"));

        assert!(
            zip.available_at <= launch_time,
            "{id} reserved at {launch_time} while airborne until {}",
            zip.available_at,
        );
        zip.available_at = launch_time + flight_duration_secs;
    }

    /// Seconds since midnight at which the Zip is next ready to launch.
    pub fn available_at(&self, id: ZipId) -> u64 {
        self.zips
            .iter()
            .find(|zip| zip.id == id)
            .unwrap_or_else(|| panic!("unknown zip: {id}"))
            .available_at
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn whole_fleet_starts_idle() {
        let fleet = Fleet::new(3);
        assert_eq!(fleet.idle_zips(0), vec![ZipId(0), ZipId(1), ZipId(2)]);
    }

    #[test]
    fn reserved_zip_is_busy_until_its_return() {
        let mut fleet = Fleet::new(2);
        fleet.reserve(ZipId(0), 100, 500);

        assert_eq!(fleet.available_at(ZipId(0)), 600);
        assert_eq!(fleet.idle_zips(100), vec![ZipId(1)]);
        assert_eq!(fleet.idle_zips(599), vec![ZipId(1)]);
        assert_eq!(fleet.idle_zips(600), vec![ZipId(0), ZipId(1)]);
    }

    #[test]
    fn zip_may_fly_again_after_landing() {
        let mut fleet = Fleet::new(1);
        fleet.reserve(ZipId(0), 0, 60);
        fleet.reserve(ZipId(0), 60, 60);

        assert_eq!(fleet.available_at(ZipId(0)), 120);
    }

    #[test]
    #[should_panic(expected = "airborne")]
    fn overlapping_reservation_is_a_defect() {
        let mut fleet = Fleet::new(1);
        fleet.reserve(ZipId(0), 0, 600);
        fleet.reserve(ZipId(0), 60, 600);
    }
}
