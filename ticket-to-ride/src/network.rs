use crate::city::{CityId, CitySet, CityToCity};

use smallvec::SmallVec;
use std::collections::BTreeMap;

/// The subgraph formed by the links a single player claimed.
///
/// Searches walk it with an explicit stack, so their memory is bounded by the
/// number of claimed links rather than by the call stack.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClaimedNetwork {
    adjacent_cities: BTreeMap<CityId, SmallVec<[CityId; 4]>>,
    num_links: usize,
}

impl ClaimedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a claimed link between two cities.
    pub fn add_link(&mut self, (start, end): CityToCity) {
        self.adjacent_cities.entry(start).or_default().push(end);
        self.adjacent_cities.entry(end).or_default().push(start);
        self.num_links += 1;
    }

    #[inline]
    pub fn num_links(&self) -> usize {
        self.num_links
    }

    #[inline]
    pub fn contains_city(&self, city: CityId) -> bool {
        self.adjacent_cities.contains_key(&city)
    }

    fn neighbors(&self, city: CityId) -> &[CityId] {
        self.adjacent_cities
            .get(&city)
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the network connects `start` to `end`.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::city::CityId;
    /// use ticket_to_ride::network::ClaimedNetwork;
    ///
    /// let city = |index| CityId::new(index).unwrap();
    /// let mut network = ClaimedNetwork::new();
    /// network.add_link((city(0), city(1)));
    /// assert!(!network.connects(city(0), city(2)));
    ///
    /// network.add_link((city(2), city(1)));
    /// assert!(network.connects(city(0), city(2)));
    /// ```
    pub fn connects(&self, start: CityId, end: CityId) -> bool {
        if !self.contains_city(start) {
            return false;
        }

        let mut visited = CitySet::single(start);
        let mut cities_to_visit = vec![start];

        while let Some(city) = cities_to_visit.pop() {
            if city == end {
                return true;
            }

            for neighbor in self.neighbors(city) {
                if visited.insert(*neighbor) {
                    cities_to_visit.push(*neighbor);
                }
            }
        }

        false
    }

    /// Number of links of the longest path that never visits a city twice.
    ///
    /// Every city is tried as a starting point, and every path out of it is explored,
    /// each branch carrying its own set of visited cities.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::city::CityId;
    /// use ticket_to_ride::network::ClaimedNetwork;
    ///
    /// let city = |index| CityId::new(index).unwrap();
    /// let mut network = ClaimedNetwork::new();
    /// assert_eq!(network.longest_path(), 0);
    ///
    /// for index in 0..4 {
    ///     network.add_link((city(index), city(index + 1)));
    /// }
    /// assert_eq!(network.longest_path(), 4);
    /// ```
    pub fn longest_path(&self) -> usize {
        let mut longest_path = 0;
        let mut paths: Vec<(CityId, CitySet, usize)> = Vec::new();

        for start in self.adjacent_cities.keys() {
            paths.push((*start, CitySet::single(*start), 0));

            while let Some((city, visited, length)) = paths.pop() {
                longest_path = longest_path.max(length);

                for neighbor in self.neighbors(city) {
                    if !visited.contains(*neighbor) {
                        paths.push((*neighbor, visited.with(*neighbor), length + 1));
                    }
                }
            }
        }

        longest_path
    }
}
