use serde::{Deserialize, Serialize};

/// Maximum number of cities on a board.
/// Path searches keep their visited cities in a 128-bit set.
pub const MAX_CITIES: usize = 128;

/// Identifies a city by its position in the board's city list.
///
/// Names live in [`crate::board::Board`]; the engine only ever compares ids.
///
/// # JSON
/// Cities are serialized as an 8-bit unsigned integer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CityId(u8);

impl CityId {
    /// Creates the id of the city at `index`, if it fits in a [`CitySet`].
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::city::CityId;
    ///
    /// assert_eq!(CityId::new(4).map(|city| city.index()), Some(4));
    /// assert!(CityId::new(128).is_none());
    /// ```
    pub fn new(index: usize) -> Option<Self> {
        if index < MAX_CITIES {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Two cities joined by a route or a ticket.
pub type CityToCity = (CityId, CityId);

/// Set of cities, stored as a bitset indexed by [`CityId`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CitySet(u128);

impl CitySet {
    /// Set containing only `city`.
    #[inline]
    pub fn single(city: CityId) -> Self {
        Self(1 << city.index())
    }

    /// Adds `city`, returning whether it was absent before.
    #[inline]
    pub fn insert(&mut self, city: CityId) -> bool {
        let was_absent = !self.contains(city);
        self.0 |= 1 << city.index();
        was_absent
    }

    /// Copy of this set with `city` added.
    #[inline]
    pub fn with(mut self, city: CityId) -> Self {
        self.insert(city);
        self
    }

    #[inline]
    pub fn contains(&self, city: CityId) -> bool {
        self.0 & (1 << city.index()) != 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
