use std::collections::HashMap;

use schema::{Hospital, HospitalName, Location, Order, Stop, NEST};

/// Outcome of planning one flight for one Zip.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanOutcome {
    /// A feasible route was found.
    Route(RoutePlan),
    /// The seed order's direct roundtrip alone exceeds the range cap, so no
    /// Zip can ever serve it. A boundary condition of the service area, not
    /// a defect.
    Infeasible(Order),
}

/// A stop sequence satisfying the capacity and range caps, frozen by the
/// planner and ready to be committed as a flight.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePlan {
    pub stops: Vec<Stop>,
    /// Length of the nest -> stops -> nest roundtrip in meters.
    pub total_distance_m: f64,
}

impl RoutePlan {
    /// Every order on the route, in stop order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.stops.iter().flat_map(|stop| stop.orders.iter())
    }

    fn packages(&self) -> usize {
        self.stops.iter().map(|stop| stop.orders.len()).sum()
    }
}

/// Where a candidate order would join a route.
enum Placement {
    /// Extra package dropped at the stop already visiting its hospital.
    Existing(usize),
    /// New stop spliced into the sequence at this position.
    NewStop(usize),
}

/// Builds distance-near-optimal routes by greedy cheapest insertion.
///
/// Exact routing is NP-hard, and a dispatch tick must stay cheap, so no
/// optimality is guaranteed: each candidate is placed at whichever position
/// in the current stop sequence adds the least roundtrip distance, and
/// candidates are taken cheapest-first until the Zip is full or nothing
/// more fits. Every choice is deterministic; ties on insertion cost break
/// by arrival time, then by hospital name.
pub struct RoutePlanner<'a> {
    hospitals: &'a HashMap<HospitalName, Hospital>,
    max_packages_per_zip: usize,
    max_cumulative_range_m: f64,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(
        hospitals: &'a HashMap<HospitalName, Hospital>,
        max_packages_per_zip: usize,
        max_cumulative_range_m: f64,
    ) -> Self {
        Self {
            hospitals,
            max_packages_per_zip,
            max_cumulative_range_m,
        }
    }

    /// Plans the best feasible route seeded with `seed`.
    ///
    /// `mandatory` candidates (emergencies) are exhausted before any
    /// `optional` filler (resupplies) is considered. The seed itself always
    /// opens the route; if even its direct roundtrip blows the range cap the
    /// plan is infeasible and names the offending order.
    pub fn plan(&self, seed: Order, mandatory: Vec<Order>, optional: Vec<Order>) -> PlanOutcome {
        let total_distance_m = self.location(&seed.hospital).roundtrip_from_nest_m();
        if total_distance_m > self.max_cumulative_range_m {
            return PlanOutcome::Infeasible(seed);
        }

        let mut route = RoutePlan {
            stops: vec![Stop {
                hospital: seed.hospital.clone(),
                orders: vec![seed],
            }],
            total_distance_m,
        };

        let mut mandatory = Self::in_selection_order(mandatory);
        let mut optional = Self::in_selection_order(optional);

        while route.packages() < self.max_packages_per_zip {
            if !self.extend(&mut route, &mut mandatory) && !self.extend(&mut route, &mut optional) {
                break;
            }
        }

        PlanOutcome::Route(route)
    }

    /// Sorted by arrival time, then hospital name, so that insertion-cost
    /// ties resolve identically on every run.
    fn in_selection_order(mut candidates: Vec<Order>) -> Vec<Order> {
        candidates.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.hospital.cmp(&b.hospital)));
        candidates
    }

    /// Moves the cheapest-to-insert candidate onto the route, if any fits
    /// within the range cap. The caller enforces the package cap.
    fn extend(&self, route: &mut RoutePlan, candidates: &mut Vec<Order>) -> bool {
        let mut best: Option<(usize, Placement, f64)> = None;
        for (index, order) in candidates.iter().enumerate() {
            let Some((placement, added_m)) = self.cheapest_placement(route, &order.hospital)
            else {
                continue;
            };

            match &best {
                // Strictly-less keeps the earlier candidate on a cost tie.
                Some((_, _, best_m)) if *best_m <= added_m => {}
                _ => best = Some((index, placement, added_m)),
            }
        }

        let Some((index, placement, added_m)) = best else {
            return false;
        };

        let order = candidates.remove(index);
        match placement {
            Placement::Existing(stop) => route.stops[stop].orders.push(order),
            Placement::NewStop(position) => route.stops.insert(
                position,
                Stop {
                    hospital: order.hospital.clone(),
                    orders: vec![order],
                },
            ),
        }
        route.total_distance_m += added_m;

        true
    }

    /// Cheapest way to work `hospital` into the route, or `None` if every
    /// position blows the range cap. A hospital already on the route takes
    /// the extra package at its existing stop for zero added distance.
    fn cheapest_placement(
        &self,
        route: &RoutePlan,
        hospital: &HospitalName,
    ) -> Option<(Placement, f64)> {
        if let Some(stop) = route
            .stops
            .iter()
            .position(|stop| &stop.hospital == hospital)
        {
            return Some((Placement::Existing(stop), 0.0));
        }

        let location = self.location(hospital);
        let mut best: Option<(usize, f64)> = None;
        for position in 0..=route.stops.len() {
            let before = match position.checked_sub(1) {
                Some(i) => self.location(&route.stops[i].hospital),
                None => NEST.location,
            };
            let after = match route.stops.get(position) {
                Some(stop) => self.location(&stop.hospital),
                None => NEST.location,
            };

            let added_m =
                before.distance_m(&location) + location.distance_m(&after) - before.distance_m(&after);
            if route.total_distance_m + added_m > self.max_cumulative_range_m {
                continue;
            }

            match best {
                Some((_, best_m)) if best_m <= added_m => {}
                _ => best = Some((position, added_m)),
            }
        }

        best.map(|(position, added_m)| (Placement::NewStop(position), added_m))
    }

    fn location(&self, name: &HospitalName) -> Location {
        self.hospitals.get(name).expect("hospital").location
    }
}

#[cfg(test)]
mod test {
    use once_cell::sync::Lazy;
    use schema::Priority;

    use super::*;

    static HOSPITALS: Lazy<HashMap<HospitalName, Hospital>> = Lazy::new(|| {
        Hospital::directory(
            [
                ("Alpha", 1000, 0),
                ("Bravo", 2000, 0),
                ("Charlie", 3000, 0),
                ("Edge", 0, 80_000),
                ("Faraway", 90_000, 0),
                ("West", 0, -10_000),
            ]
            .into_iter()
            .map(|(name, north_m, east_m)| Hospital {
                name: HospitalName::new(name),
                location: Location { north_m, east_m },
            })
            .collect(),
        )
    });

    fn planner() -> RoutePlanner<'static> {
        RoutePlanner::new(&HOSPITALS, 3, 160_000.0)
    }

    fn order(time: u64, hospital: &str) -> Order {
        Order {
            time,
            hospital: HospitalName::new(hospital),
            priority: Priority::Resupply,
        }
    }

    fn stop_names(plan: &RoutePlan) -> Vec<&str> {
        plan.stops
            .iter()
            .map(|stop| stop.hospital.as_str())
            .collect()
    }

    #[test]
    fn single_order_flies_the_direct_roundtrip() {
        let outcome = planner().plan(order(0, "Alpha"), vec![], vec![]);

        let PlanOutcome::Route(plan) = outcome else {
            panic!("expected a route");
        };
        assert_eq!(stop_names(&plan), ["Alpha"]);
        assert_eq!(plan.total_distance_m, 2000.0);
    }

    #[test]
    fn out_of_range_seed_is_infeasible() {
        let seed = order(0, "Faraway"); // 180 km roundtrip against a 160 km cap
        let outcome = planner().plan(seed.clone(), vec![], vec![]);

        assert_eq!(outcome, PlanOutcome::Infeasible(seed));
    }

    #[test]
    fn batches_nearby_hospitals_in_distance_minimizing_order() {
        let outcome = planner().plan(
            order(0, "Alpha"),
            vec![],
            vec![order(10, "Bravo"), order(20, "Charlie")],
        );

        let PlanOutcome::Route(plan) = outcome else {
            panic!("expected a route");
        };
        // All three lie on the same northbound line: one sweep, 6 km total.
        assert_eq!(stop_names(&plan), ["Charlie", "Bravo", "Alpha"]);
        assert_eq!(plan.total_distance_m, 6000.0);
    }

    #[test]
    fn repeat_hospital_merges_into_the_existing_stop() {
        let outcome = planner().plan(
            order(0, "Alpha"),
            vec![],
            vec![order(10, "Alpha"), order(20, "Alpha")],
        );

        let PlanOutcome::Route(plan) = outcome else {
            panic!("expected a route");
        };
        assert_eq!(stop_names(&plan), ["Alpha"]);
        assert_eq!(plan.stops[0].orders.len(), 3);
        assert_eq!(plan.total_distance_m, 2000.0);
    }

    #[test]
    fn package_cap_bounds_the_route() {
        let outcome = planner().plan(
            order(0, "Alpha"),
            vec![],
            vec![
                order(10, "Alpha"),
                order(20, "Alpha"),
                order(30, "Alpha"),
                order(40, "Bravo"),
            ],
        );

        let PlanOutcome::Route(plan) = outcome else {
            panic!("expected a route");
        };
        assert_eq!(plan.orders().count(), 3);
        // Oldest fillers win the remaining capacity.
        assert!(plan.orders().all(|order| order.time <= 20));
    }

    #[test]
    fn mandatory_candidates_outrank_cheaper_fillers() {
        // Bravo is the cheaper insertion, but the emergency to Charlie is
        // mandatory and must board first.
        let outcome = planner().plan(
            order(0, "Alpha"),
            vec![order(30, "Charlie")],
            vec![order(10, "Bravo"), order(20, "Bravo")],
        );

        let PlanOutcome::Route(plan) = outcome else {
            panic!("expected a route");
        };
        assert!(plan
            .orders()
            .any(|order| order.hospital.as_str() == "Charlie"));
        assert_eq!(plan.orders().count(), 3);
    }

    #[test]
    fn range_cap_rejects_fillers_that_do_not_fit() {
        // Edge is a 160 km roundtrip on its own; the westward detour cannot
        // be worked in without blowing the cap.
        let outcome = planner().plan(order(0, "Edge"), vec![], vec![order(10, "West")]);

        let PlanOutcome::Route(plan) = outcome else {
            panic!("expected a route");
        };
        assert_eq!(stop_names(&plan), ["Edge"]);
        assert_eq!(plan.total_distance_m, 160_000.0);
    }
}
