use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{AppointmentDate, DoctorRecord, SlotTime};

/// Slots from `checkin`, every `interval_minutes`, strictly before `checkout`.
///
/// Empty when `checkin >= checkout` or the interval is zero. A trailing range
/// shorter than the interval yields no slot.
pub fn generate_working_slots(checkin: SlotTime, checkout: SlotTime, interval_minutes: u32) -> Vec<SlotTime> {
    if interval_minutes == 0 || checkin >= checkout {
        return Vec::new();
    }

    let end = checkout.minutes();
    (checkin.minutes()..end)
        .step_by(interval_minutes as usize)
        .filter_map(SlotTime::from_minutes)
        .collect()
}

/// The doctor's working slots on `date` minus `booked`, ascending.
pub fn available_slots(date: AppointmentDate, doctor: &DoctorRecord, booked: &BTreeSet<SlotTime>) -> Vec<SlotTime> {
    if !doctor.works_on(date.weekday()) {
        debug!("{} does not work on {:?} ({})", doctor.name, date.weekday(), date);
        return Vec::new();
    }

    let mut slots: Vec<SlotTime> = generate_working_slots(
        doctor.checkin_time,
        doctor.checkout_time,
        doctor.appointment_slot_minutes,
    )
    .into_iter()
    .filter(|slot| !booked.contains(slot))
    .collect();

    slots.sort();
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::collections::HashSet;

    fn t(raw: &str) -> SlotTime {
        raw.parse().unwrap()
    }

    fn render(slots: &[SlotTime]) -> Vec<String> {
        slots.iter().map(ToString::to_string).collect()
    }

    fn dr_a() -> DoctorRecord {
        DoctorRecord {
            name: "Dr. A".to_string(),
            department: "Cardiology".to_string(),
            available_days: HashSet::from([
                Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri,
            ]),
            checkin_time: t("09:00"),
            checkout_time: t("12:00"),
            appointment_slot_minutes: 30,
        }
    }

    // 17/03/2025 is a Monday
    fn monday() -> AppointmentDate {
        "17/03/2025".parse().unwrap()
    }

    #[test]
    fn test_generated_slots_stay_in_window_with_exact_spacing() {
        let cases = [
            ("09:00", "12:00", 30),
            ("08:15", "17:40", 45),
            ("00:00", "23:59", 7),
            ("13:00", "13:01", 60),
            ("10:00", "11:00", 1),
        ];

        for (checkin, checkout, interval) in cases {
            let slots = generate_working_slots(t(checkin), t(checkout), interval);
            assert!(!slots.is_empty(), "{}-{} every {}", checkin, checkout, interval);
            assert_eq!(slots[0], t(checkin));
            for slot in &slots {
                assert!(t(checkin) <= *slot && *slot < t(checkout));
            }
            for pair in slots.windows(2) {
                assert_eq!(pair[1].minutes() - pair[0].minutes(), interval);
            }
            let last = slots.last().unwrap().minutes();
            assert!(last + interval >= t(checkout).minutes());
        }
    }

    #[test]
    fn test_non_divisible_range_drops_partial_slot() {
        let slots = generate_working_slots(t("14:00"), t("16:00"), 45);
        assert_eq!(render(&slots), vec!["14:00", "14:45", "15:30"]);
    }

    #[test]
    fn test_empty_window() {
        assert!(generate_working_slots(t("12:00"), t("09:00"), 30).is_empty());
        assert!(generate_working_slots(t("09:00"), t("09:00"), 30).is_empty());
        assert!(generate_working_slots(t("09:00"), t("12:00"), 0).is_empty());
    }

    #[test]
    fn test_monday_without_bookings() {
        let slots = available_slots(monday(), &dr_a(), &BTreeSet::new());
        assert_eq!(
            render(&slots),
            vec!["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]
        );
    }

    #[test]
    fn test_booked_slot_removed() {
        let booked = BTreeSet::from([t("10:00")]);
        let slots = available_slots(monday(), &dr_a(), &booked);
        assert_eq!(render(&slots), vec!["09:00", "09:30", "10:30", "11:00", "11:30"]);
    }

    #[test]
    fn test_saturday_is_empty_regardless_of_bookings() {
        let saturday: AppointmentDate = "22/03/2025".parse().unwrap();
        assert!(available_slots(saturday, &dr_a(), &BTreeSet::new()).is_empty());
        assert!(available_slots(saturday, &dr_a(), &BTreeSet::from([t("09:00")])).is_empty());
    }

    #[test]
    fn test_availability_is_working_slots_minus_booked() {
        let doctor = dr_a();
        let working = generate_working_slots(doctor.checkin_time, doctor.checkout_time, 30);
        // bookings outside the working set must not matter
        let booked = BTreeSet::from([t("09:30"), t("11:30"), t("13:00"), t("09:10")]);

        let slots = available_slots(monday(), &doctor, &booked);
        let expected: Vec<SlotTime> = working.iter().copied().filter(|s| !booked.contains(s)).collect();

        assert_eq!(slots, expected);
        assert!(slots.iter().all(|s| working.contains(s)));
        assert!(slots.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_fully_booked_day() {
        let doctor = dr_a();
        let booked: BTreeSet<SlotTime> =
            generate_working_slots(doctor.checkin_time, doctor.checkout_time, 30).into_iter().collect();
        assert!(available_slots(monday(), &doctor, &booked).is_empty());
    }
}
