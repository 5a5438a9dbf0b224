//! The cab of an elevator: who is on board and how much they weigh.

use serde::{Deserialize, Serialize};

use crate::building::Passenger;
use crate::world_view::Level;

/// Why a boarding attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverloadRejection {
    /// Boarding would exceed the weight limit.
    Weight {
        /// Load before the attempt, kg
        current: u32,
        /// Weight of the passenger, kg
        requested: u32,
        /// Weight limit, kg
        capacity: u32,
    },
    /// The cab already holds its maximum number of passengers.
    Passengers {
        /// Passenger limit
        capacity: usize,
    },
}

/// Result of a boarding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boarding {
    /// The passenger is on board.
    Boarded,
    /// The passenger was refused and handed back unchanged.
    Rejected(Passenger, OverloadRejection),
}

/// Occupants and load of one cab.
///
/// `load <= weight_capacity` and `occupants.len() <= passenger_capacity` hold after every call.
#[derive(Debug, Clone)]
pub struct Cabin {
    weight_capacity: u32,
    passenger_capacity: usize,
    occupants: Vec<Passenger>,
    load: u32,
}

impl Cabin {
    /// Creates an empty cab with the given limits
    pub fn new(weight_capacity: u32, passenger_capacity: usize) -> Self {
        Self {
            weight_capacity,
            passenger_capacity,
            occupants: Vec::new(),
            load: 0,
        }
    }

    /// Boards `passenger` if both limits allow it.
    ///
    /// On rejection nothing changes and the passenger is returned to the caller.
    pub fn try_board(&mut self, passenger: Passenger) -> Boarding {
        if self.occupants.len() >= self.passenger_capacity {
            return Boarding::Rejected(
                passenger,
                OverloadRejection::Passengers { capacity: self.passenger_capacity },
            );
        }
        let new_load = self.load.saturating_add(passenger.weight());
        if new_load > self.weight_capacity {
            let rejection = OverloadRejection::Weight {
                current: self.load,
                requested: passenger.weight(),
                capacity: self.weight_capacity,
            };
            return Boarding::Rejected(passenger, rejection);
        }
        self.load = new_load;
        self.occupants.push(passenger);
        Boarding::Boarded
    }

    /// Removes and returns everyone whose destination is `level`.
    pub fn alight_at(&mut self, level: Level) -> Vec<Passenger> {
        let (leaving, staying): (Vec<_>, Vec<_>) = std::mem::take(&mut self.occupants)
            .into_iter()
            .partition(|p| p.destination() == level);
        self.occupants = staying;
        self.load -= leaving.iter().map(Passenger::weight).sum::<u32>();
        leaving
    }

    /// Removes and returns every occupant regardless of destination.
    pub fn evacuate(&mut self) -> Vec<Passenger> {
        self.load = 0;
        std::mem::take(&mut self.occupants)
    }

    /// Passengers on board, in boarding order
    pub fn occupants(&self) -> &[Passenger] {
        &self.occupants
    }

    /// Total weight on board, kg
    pub fn load(&self) -> u32 {
        self.load
    }

    /// Weight limit, kg
    pub fn weight_capacity(&self) -> u32 {
        self.weight_capacity
    }

    /// Passenger limit
    pub fn passenger_capacity(&self) -> usize {
        self.passenger_capacity
    }

    /// True if nobody is on board
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn passenger(destination: Level, weight: u32) -> Passenger {
        Passenger::new(1, destination, weight).unwrap()
    }

    #[test]
    fn third_passenger_is_rejected() {
        let mut cabin = Cabin::new(200, 2);
        assert_eq!(cabin.try_board(passenger(3, 60)), Boarding::Boarded);
        assert_eq!(cabin.try_board(passenger(3, 60)), Boarding::Boarded);

        let third = passenger(2, 10);
        match cabin.try_board(third.clone()) {
            Boarding::Rejected(returned, OverloadRejection::Passengers { capacity: 2 }) => {
                assert_eq!(returned, third)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(cabin.occupants().len(), 2);
        assert_eq!(cabin.load(), 120);
    }

    #[test]
    fn weight_limit_leaves_state_untouched() {
        let mut cabin = Cabin::new(200, 5);
        assert_eq!(cabin.try_board(passenger(3, 130)), Boarding::Boarded);
        let rejected = cabin.try_board(passenger(3, 71));
        assert!(matches!(
            rejected,
            Boarding::Rejected(_, OverloadRejection::Weight { current: 130, requested: 71, capacity: 200 })
        ));
        assert_eq!(cabin.load(), 130);
        assert_eq!(cabin.occupants().len(), 1);
        // Exactly at the limit is fine
        assert_eq!(cabin.try_board(passenger(3, 70)), Boarding::Boarded);
        assert_eq!(cabin.load(), 200);
    }

    #[test]
    fn alight_and_evacuate() {
        let mut cabin = Cabin::new(500, 5);
        cabin.try_board(passenger(3, 70));
        cabin.try_board(passenger(4, 80));
        cabin.try_board(passenger(3, 90));

        let off = cabin.alight_at(3);
        assert_eq!(off.len(), 2);
        assert_eq!(cabin.load(), 80);
        assert!(cabin.alight_at(3).is_empty());

        assert_eq!(cabin.evacuate().len(), 1);
        assert!(cabin.is_empty());
        assert_eq!(cabin.load(), 0);
    }

    #[test]
    fn random_board_alight_never_exceeds_capacity() {
        for seed in 0..32u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cabin = Cabin::new(400, 4);
            for _ in 0..500 {
                if rng.random_bool(0.6) {
                    let destination = rng.random_range(2..=6);
                    let before = (cabin.occupants().len(), cabin.load());
                    let weight = rng.random_range(50..=130);
                    if let Boarding::Rejected(..) = cabin.try_board(passenger(destination, weight)) {
                        assert_eq!((cabin.occupants().len(), cabin.load()), before);
                    }
                } else {
                    let level = rng.random_range(2..=6);
                    for p in cabin.alight_at(level) {
                        assert_eq!(p.destination(), level);
                    }
                }
                assert!(cabin.load() <= cabin.weight_capacity());
                assert!(cabin.occupants().len() <= cabin.passenger_capacity());
                let sum: u32 = cabin.occupants().iter().map(Passenger::weight).sum();
                assert_eq!(sum, cabin.load());
            }
        }
    }
}
