//! Property test for the core calendar invariant: whatever sequence of
//! bookings, reschedules, and status changes the practitioner performs, no
//! two scheduled appointments ever share a (date, time) slot.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;

use scheduling_cell::{
    AppointmentBookingService, AppointmentStatus, BookAppointmentRequest,
    RescheduleAppointmentRequest,
};
use shared_storage::{Collection, KeyValueStore, MemoryStore};
use shared_utils::test_utils::{
    sample_consultation_type, sample_patient, FixedClock, InMemoryCatalog, InMemoryPatients,
};

#[derive(Debug, Clone)]
enum Op {
    Create { day: u8, hour: u8, half: bool },
    Reschedule { pick: usize, day: u8, hour: u8, half: bool },
    Complete { pick: usize },
    Cancel { pick: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..5, 9u8..18, any::<bool>()).prop_map(|(day, hour, half)| Op::Create { day, hour, half }),
        (any::<usize>(), 0u8..5, 9u8..18, any::<bool>())
            .prop_map(|(pick, day, hour, half)| Op::Reschedule { pick, day, hour, half }),
        any::<usize>().prop_map(|pick| Op::Complete { pick }),
        any::<usize>().prop_map(|pick| Op::Cancel { pick }),
    ]
}

fn slot(day: u8, hour: u8, half: bool) -> (NaiveDate, NaiveTime) {
    let base = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    (
        base + Duration::days(i64::from(day)),
        NaiveTime::from_hms_opt(u32::from(hour), if half { 30 } else { 0 }, 0).unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn scheduled_slots_stay_unique(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let patient = sample_patient("Paciente Propriedade");
        let consultation_type = sample_consultation_type("Sessão", 120.0);
        let patients = Arc::new(InMemoryPatients::with(vec![patient.clone()]));
        let catalog = Arc::new(InMemoryCatalog::with(vec![consultation_type.clone()]));
        // Clock pinned before every generated slot so temporal checks never
        // reject the whole sequence outright.
        let clock = Arc::new(FixedClock::at(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        ));
        let service = AppointmentBookingService::new(
            Collection::new(store, "appointments"),
            patients,
            catalog,
            clock,
        );

        for op in ops {
            // Individual operations may be rejected; rejections must leave
            // the invariant intact, so errors are expected and ignored.
            match op {
                Op::Create { day, hour, half } => {
                    let (date, time) = slot(day, hour, half);
                    let _ = service.create(BookAppointmentRequest {
                        patient_id: patient.id,
                        date,
                        time,
                        consultation_type_id: consultation_type.id,
                    });
                }
                Op::Reschedule { pick, day, hour, half } => {
                    let all = service.list().unwrap();
                    if all.is_empty() {
                        continue;
                    }
                    let target = all[pick % all.len()].id;
                    let (date, time) = slot(day, hour, half);
                    let _ = service.reschedule(RescheduleAppointmentRequest {
                        appointment_id: target,
                        new_date: date,
                        new_time: time,
                    });
                }
                Op::Complete { pick } => {
                    let all = service.list().unwrap();
                    if all.is_empty() {
                        continue;
                    }
                    let _ = service.mark_completed(all[pick % all.len()].id);
                }
                Op::Cancel { pick } => {
                    let all = service.list().unwrap();
                    if all.is_empty() {
                        continue;
                    }
                    let _ = service.mark_canceled(all[pick % all.len()].id);
                }
            }

            let mut seen = HashSet::new();
            for appointment in service.list().unwrap() {
                if appointment.status == AppointmentStatus::Scheduled {
                    prop_assert!(
                        seen.insert((appointment.date, appointment.time)),
                        "two scheduled appointments share {} {}",
                        appointment.date,
                        appointment.time
                    );
                }
            }
        }
    }
}
