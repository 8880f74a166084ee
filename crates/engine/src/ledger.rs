//! The reservation ledger: an in-memory record of room, invigilator and jury bookings for
//! a single generation call (SPEC_FULL.md §9 "Global mutable state" — scoped per call, never
//! shared). Seeded from committed database state, then updated as the engine places units.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

#[derive(Debug, Clone)]
struct Booking {
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Debug, Default)]
pub struct ReservationLedger {
    rooms: HashMap<String, Vec<Booking>>,
    invigilators: HashMap<String, Vec<Booking>>,
    jury: HashMap<String, Vec<Booking>>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_room(&mut self, room_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) {
        self.rooms
            .entry(room_id.to_string())
            .or_default()
            .push(Booking { date, start, end });
    }

    pub fn seed_invigilator(&mut self, teacher_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) {
        self.invigilators
            .entry(teacher_id.to_string())
            .or_default()
            .push(Booking { date, start, end });
    }

    pub fn seed_jury(&mut self, teacher_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) {
        self.jury
            .entry(teacher_id.to_string())
            .or_default()
            .push(Booking { date, start, end });
    }

    pub fn room_is_free(&self, room_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        match self.rooms.get(room_id) {
            None => true,
            Some(bookings) => !bookings
                .iter()
                .any(|b| b.date == date && overlaps(b.start, b.end, start, end)),
        }
    }

    pub fn reserve_room(&mut self, room_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) {
        self.seed_room(room_id, date, start, end);
    }

    pub fn invigilator_is_free(&self, teacher_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        match self.invigilators.get(teacher_id) {
            None => true,
            Some(bookings) => !bookings
                .iter()
                .any(|b| b.date == date && overlaps(b.start, b.end, start, end)),
        }
    }

    pub fn reserve_invigilator(&mut self, teacher_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) {
        self.seed_invigilator(teacher_id, date, start, end);
    }

    pub fn jury_is_free(&self, teacher_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        match self.jury.get(teacher_id) {
            None => true,
            Some(bookings) => !bookings
                .iter()
                .any(|b| b.date == date && overlaps(b.start, b.end, start, end)),
        }
    }

    pub fn jury_load(&self, teacher_id: &str) -> usize {
        self.jury.get(teacher_id).map(Vec::len).unwrap_or(0)
    }

    pub fn reserve_jury(&mut self, teacher_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) {
        self.seed_jury(teacher_id, date, start, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn detects_overlapping_room_bookings() {
        let mut ledger = ReservationLedger::new();
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        ledger.reserve_room("room-1", date, t(9), t(10));
        assert!(!ledger.room_is_free("room-1", date, t(9), t(10)));
        assert!(!ledger.room_is_free("room-1", date, t(9), t(11)));
        assert!(ledger.room_is_free("room-1", date, t(10), t(11)));
    }

    #[test]
    fn jury_load_counts_reservations() {
        let mut ledger = ReservationLedger::new();
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(ledger.jury_load("teacher-1"), 0);
        ledger.reserve_jury("teacher-1", date, t(9), t(10));
        assert_eq!(ledger.jury_load("teacher-1"), 1);
    }
}
