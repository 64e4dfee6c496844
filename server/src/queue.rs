use std::slice;

use itertools::{Either, Itertools};
use schema::{Order, Priority};

/// Orders accepted but not yet bound into a flight, held in arrival order.
///
/// Only the dispatch scheduler mutates the queue; everything else gets
/// read-only views.
#[derive(Default, Debug)]
pub struct OrderQueue {
    orders: Vec<Order>,
}

impl OrderQueue {
    /// Accepts one order, preserving arrival order.
    pub fn enqueue(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// Queued orders split into `(emergencies, resupplies)`, each sorted by
    /// arrival time ascending. The feed delivers orders already sorted by
    /// time, but correctness here does not depend on that.
    pub fn pending_by_priority(&self) -> (Vec<Order>, Vec<Order>) {
        let (mut emergencies, mut resupplies): (Vec<_>, Vec<_>) = self
            .orders
            .iter()
            .cloned()
            .partition_map(|order| match order.priority {
                Priority::Emergency => Either::Left(order),
                Priority::Resupply => Either::Right(order),
            });

        emergencies.sort_by_key(|order| order.time);
        resupplies.sort_by_key(|order| order.time);

        (emergencies, resupplies)
    }

    pub fn has_emergency(&self) -> bool {
        self.orders
            .iter()
            .any(|order| order.priority == Priority::Emergency)
    }

    /// Removes exactly one queued instance of each given order.
    ///
    /// Panics if any of them is not queued: that means an order was bound
    /// into a flight twice, which is a scheduler defect.
    pub fn remove(&mut self, orders: &[Order]) {
        for order in orders {
            let index = self
                .orders
                .iter()
                .position(|queued| queued == order)
                .unwrap_or_else(|| panic!("order bound to a flight twice: {order:?}"));
            self.orders.remove(index);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Read-only snapshot in arrival order.
    pub fn iter(&self) -> slice::Iter<'_, Order> {
        self.orders.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use schema::HospitalName;

    fn order(time: u64, hospital: &str, priority: Priority) -> Order {
        Order {
            time,
            hospital: HospitalName::new(hospital),
            priority,
        }
    }

    #[test]
    fn splits_by_priority_in_arrival_order() {
        let mut queue = OrderQueue::default();
        queue.enqueue(order(10, "Alpha", Priority::Resupply));
        queue.enqueue(order(20, "Bravo", Priority::Emergency));
        queue.enqueue(order(30, "Charlie", Priority::Resupply));
        queue.enqueue(order(5, "Delta", Priority::Emergency));

        let (emergencies, resupplies) = queue.pending_by_priority();

        assert_eq!(emergencies.len(), 2);
        assert_eq!(emergencies[0].time, 5);
        assert_eq!(emergencies[1].time, 20);
        assert_eq!(resupplies.len(), 2);
        assert_eq!(resupplies[0].time, 10);
        assert_eq!(resupplies[1].time, 30);
        assert!(queue.has_emergency());
    }

    #[test]
    fn remove_takes_one_instance_per_order() {
        let duplicate = order(10, "Alpha", Priority::Resupply);

        let mut queue = OrderQueue::default();
        queue.enqueue(duplicate.clone());
        queue.enqueue(duplicate.clone());
        queue.remove(slice::from_ref(&duplicate));

        assert_eq!(queue.len(), 1);
        assert!(!queue.is_empty());
    }

    #[test]
    #[should_panic(expected = "bound to a flight twice")]
    fn remove_of_unqueued_order_is_a_defect() {
        let mut queue = OrderQueue::default();
        queue.enqueue(order(10, "Alpha", Priority::Resupply));
        queue.remove(&[order(20, "Bravo", Priority::Resupply)]);
    }
}
