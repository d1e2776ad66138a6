use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::math::forward_from_yaw;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoorId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorState {
    Closed,
    Opening,
    Open,
}

/// A door as seen by the navigation core.
#[derive(Clone, Debug, PartialEq)]
pub struct DoorInfo {
    pub id: DoorId,
    pub position: Vec3,
    /// Load doors lead elsewhere; walking agents never use them to get unstuck.
    pub teleport: bool,
    pub trapped: bool,
    pub lock_level: i32,
    pub state: DoorState,
}

impl DoorInfo {
    pub fn can_be_opened_by_agent(&self) -> bool {
        !self.teleport && !self.trapped && self.lock_level <= 0 && self.state == DoorState::Closed
    }
}

/// Door lookup and door opening for a stuck agent.
pub trait DoorRegistry {
    /// Closest door within `max_distance` (planar) that lies in front of an
    /// agent at `position` facing `yaw`.
    fn nearby_door(&self, position: Vec3, yaw: f32, max_distance: f32) -> Option<DoorInfo>;

    fn open_door(&mut self, door: DoorId);
}

/// All doors of the loaded world.
#[derive(Clone, Debug, Default)]
pub struct DoorList {
    doors: Vec<DoorInfo>,
}

impl DoorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, door: DoorInfo) {
        self.doors.push(door);
    }

    pub fn get(&self, id: DoorId) -> Option<&DoorInfo> {
        self.doors.iter().find(|door| door.id == id)
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    /// Returns false if no door has that id.
    pub fn set_state(&mut self, id: DoorId, state: DoorState) -> bool {
        match self.doors.iter_mut().find(|door| door.id == id) {
            Some(door) => {
                door.state = state;
                true
            }
            None => false,
        }
    }

    /// Move every opening door to open; returns how many changed.
    pub fn finish_opening(&mut self) -> usize {
        let mut count = 0;
        for door in self.doors.iter_mut().filter(|door| door.state == DoorState::Opening) {
            door.state = DoorState::Open;
            count += 1;
        }
        count
    }

    pub fn find_in_front(&self, position: Vec3, yaw: f32, max_distance: f32) -> Option<&DoorInfo> {
        let facing = forward_from_yaw(yaw).truncate();
        let origin = position.truncate();
        let max_sq = max_distance * max_distance;

        self.doors
            .iter()
            .filter(|door| {
                let offset = door.position.truncate() - origin;
                offset.length_squared() < max_sq && facing.dot(offset) > 0.0
            })
            .min_by(|a, b| {
                let da = a.position.truncate().distance_squared(origin);
                let db = b.position.truncate().distance_squared(origin);
                da.total_cmp(&db)
            })
    }
}

impl DoorRegistry for DoorList {
    fn nearby_door(&self, position: Vec3, yaw: f32, max_distance: f32) -> Option<DoorInfo> {
        self.find_in_front(position, yaw, max_distance).cloned()
    }

    fn open_door(&mut self, door: DoorId) {
        if !self.set_state(door, DoorState::Opening) {
            warn!("[DOORS] Open request for unknown door {:?}", door);
        }
    }
}

/// Read-only view of a [`DoorList`] that records open requests instead of
/// applying them, so navigation can run while the world is borrowed immutably.
pub struct DoorRequests<'a> {
    doors: &'a DoorList,
    requested: Vec<DoorId>,
}

impl<'a> DoorRequests<'a> {
    pub fn new(doors: &'a DoorList) -> Self {
        Self { doors, requested: Vec::new() }
    }

    pub fn into_requests(self) -> Vec<DoorId> {
        self.requested
    }
}

impl DoorRegistry for DoorRequests<'_> {
    fn nearby_door(&self, position: Vec3, yaw: f32, max_distance: f32) -> Option<DoorInfo> {
        self.doors.nearby_door(position, yaw, max_distance)
    }

    fn open_door(&mut self, door: DoorId) {
        if !self.requested.contains(&door) {
            self.requested.push(door);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn door(id: u32, x: f32, y: f32) -> DoorInfo {
        DoorInfo {
            id: DoorId(id),
            position: Vec3::new(x, y, 0.0),
            teleport: false,
            trapped: false,
            lock_level: 0,
            state: DoorState::Closed,
        }
    }

    #[test]
    fn test_openable_rules() {
        assert!(door(1, 0.0, 0.0).can_be_opened_by_agent());
        assert!(!DoorInfo { teleport: true, ..door(1, 0.0, 0.0) }.can_be_opened_by_agent());
        assert!(!DoorInfo { trapped: true, ..door(1, 0.0, 0.0) }.can_be_opened_by_agent());
        assert!(!DoorInfo { lock_level: 5, ..door(1, 0.0, 0.0) }.can_be_opened_by_agent());
        assert!(DoorInfo { lock_level: -1, ..door(1, 0.0, 0.0) }.can_be_opened_by_agent());
        assert!(!DoorInfo { state: DoorState::Open, ..door(1, 0.0, 0.0) }.can_be_opened_by_agent());
        assert!(!DoorInfo { state: DoorState::Opening, ..door(1, 0.0, 0.0) }.can_be_opened_by_agent());
    }

    #[test]
    fn test_only_doors_in_front_are_found() {
        let mut list = DoorList::new();
        list.add(door(1, 0.0, -50.0));
        list.add(door(2, 0.0, 80.0));
        list.add(door(3, 0.0, 40.0));

        // Facing +y: door 1 is behind, door 3 is the closest one ahead.
        let found = list.nearby_door(Vec3::ZERO, 0.0, 100.0).unwrap();
        assert_eq!(found.id, DoorId(3));

        // Facing -y only door 1 is ahead.
        let found = list.nearby_door(Vec3::ZERO, std::f32::consts::PI, 100.0).unwrap();
        assert_eq!(found.id, DoorId(1));

        assert!(list.nearby_door(Vec3::ZERO, 0.0, 30.0).is_none());
    }

    #[test]
    fn test_search_ignores_height() {
        let mut list = DoorList::new();
        list.add(DoorInfo { position: Vec3::new(0.0, 50.0, 500.0), ..door(1, 0.0, 0.0) });
        assert!(list.nearby_door(Vec3::ZERO, 0.0, 100.0).is_some());
    }

    #[test]
    fn test_open_door_updates_state() {
        let mut list = DoorList::new();
        list.add(door(7, 0.0, 10.0));
        list.open_door(DoorId(7));
        assert_eq!(list.get(DoorId(7)).unwrap().state, DoorState::Opening);

        // Unknown ids are ignored.
        list.open_door(DoorId(99));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_requests_are_deduplicated() {
        let mut list = DoorList::new();
        list.add(door(7, 0.0, 10.0));

        let mut requests = DoorRequests::new(&list);
        assert!(requests.nearby_door(Vec3::ZERO, 0.0, 100.0).is_some());
        requests.open_door(DoorId(7));
        requests.open_door(DoorId(7));
        assert_eq!(requests.into_requests(), vec![DoorId(7)]);
        assert_eq!(list.get(DoorId(7)).unwrap().state, DoorState::Closed);
    }
}
