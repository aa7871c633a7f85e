//! Unit tests for hs-core primitives.

#[cfg(test)]
mod ids {
    use crate::{BusId, PassengerId, StopId};

    #[test]
    fn stop_position_semantics() {
        assert_eq!(StopId(4).index(), 4);
        assert_eq!(StopId(4).next(), StopId(5));
        // Upstream stops order before downstream ones.
        assert!(StopId(2) < StopId(3));
    }

    #[test]
    fn dispatch_order_is_id_order() {
        assert!(BusId(0) < BusId(1));
    }

    #[test]
    fn display_forms() {
        assert_eq!(StopId(3).to_string(), "3");
        assert_eq!(BusId(7).to_string(), "bus 7");
        assert_eq!(PassengerId(12).to_string(), "passenger 12");
    }
}

#[cfg(test)]
mod time {
    use crate::{ServiceDate, SimTime};

    #[test]
    fn arithmetic() {
        let t = SimTime(100.0);
        assert_eq!(t + 50.0, SimTime(150.0));
        assert_eq!(SimTime(150.0) - t, 50.0);
        assert_eq!(t.offset(25.0).since(t), 25.0);
    }

    #[test]
    fn seconds_into_day_wraps() {
        assert_eq!(SimTime(86_400.0 + 30.0).seconds_into_day(), 30.0);
        assert_eq!(SimTime(30.0).seconds_into_day(), 30.0);
    }

    #[test]
    fn total_order() {
        assert!(SimTime(1.0) < SimTime(2.0));
        assert_eq!(SimTime(3.5).cmp(&SimTime(3.5)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn display_hms() {
        assert_eq!(SimTime(3_661.0).to_string(), "01:01:01");
        assert_eq!(SimTime(0.0).to_string(), "00:00:00");
    }

    #[test]
    fn service_date_validity() {
        assert!(ServiceDate::new(2024, 7, 3, 3).is_valid());
        assert!(!ServiceDate::new(2024, 13, 3, 3).is_valid());
        assert!(!ServiceDate::new(2024, 7, 3, 0).is_valid());
        assert_eq!(ServiceDate::new(2024, 7, 3, 3).to_string(), "2024-07-03");
    }
}

#[cfg(test)]
mod daypart {
    use crate::{Daypart, DaypartTable};

    #[test]
    fn default_partition_is_closed() {
        let table = DaypartTable::default();
        assert_eq!(table.parts().len(), 6);
        assert_eq!(table.part_at(0.0).name, "overnight");
        assert_eq!(table.part_at(25_000.0).name, "am_peak");
        assert_eq!(table.part_at(86_399.9).name, "late");
    }

    #[test]
    fn wraps_past_midnight() {
        let table = DaypartTable::default();
        assert_eq!(table.part_at(86_400.0 + 100.0).name, "overnight");
    }

    #[test]
    fn peak_flags() {
        let table = DaypartTable::default();
        assert!(table.by_name("am_peak").unwrap().peak);
        assert!(!table.by_name("midday").unwrap().peak);
    }

    #[test]
    fn gap_rejected() {
        let result = DaypartTable::new(vec![
            Daypart::new("a", 0, 40_000, false),
            Daypart::new("b", 50_000, 86_400, false),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn short_partition_rejected() {
        let result = DaypartTable::new(vec![Daypart::new("a", 0, 80_000, false)]);
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(99);
        let mut b = SimRng::new(99);
        for _ in 0..50 {
            assert_eq!(a.gen_range(0..1000u32), b.gen_range(0..1000u32));
        }
    }

    #[test]
    fn exp_is_positive_with_plausible_mean() {
        let mut rng = SimRng::new(7);
        let rate = 0.1; // mean 10 s
        let n = 10_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let draw = rng.exp(rate);
            assert!(draw > 0.0);
            sum += draw;
        }
        let mean = sum / n as f64;
        assert!((mean - 10.0).abs() < 0.5, "mean {mean} far from 1/rate");
    }

    #[test]
    fn weighted_choice_masks_zero_weights() {
        let mut rng = SimRng::new(3);
        let weights = [0.0, 0.0, 1.0, 0.0];
        for _ in 0..20 {
            assert_eq!(rng.weighted_choice(&weights), Some(2));
        }
    }

    #[test]
    fn weighted_choice_empty_mass() {
        let mut rng = SimRng::new(3);
        assert_eq!(rng.weighted_choice(&[0.0, 0.0]), None);
        assert_eq!(rng.weighted_choice(&[]), None);
    }

    #[test]
    fn weighted_choice_roughly_proportional() {
        let mut rng = SimRng::new(11);
        let weights = [1.0, 3.0];
        let mut counts = [0usize; 2];
        for _ in 0..4_000 {
            counts[rng.weighted_choice(&weights).unwrap()] += 1;
        }
        let share = counts[1] as f64 / 4_000.0;
        assert!((share - 0.75).abs() < 0.05, "weight-3 share {share}");
    }
}

#[cfg(test)]
mod route {
    use crate::{Direction, Route, RouteStop, StopId};

    fn stops(n: usize) -> Vec<RouteStop> {
        (0..n)
            .map(|i| RouteStop::new(format!("s{i}"), if i + 1 == n { 0.0 } else { 500.0 }))
            .collect()
    }

    #[test]
    fn distances() {
        let route = Route::new("601", Direction::Outbound, stops(4), vec![]).unwrap();
        assert_eq!(route.len(), 4);
        assert_eq!(route.terminus(), StopId(3));
        assert_eq!(route.distance_to_next_m(StopId(0)), 500.0);
        assert_eq!(route.distance_to_next_m(StopId(3)), 0.0);
        assert_eq!(route.distance_remaining_m(StopId(1)), 1_000.0);
        assert_eq!(route.distance_remaining_m(StopId(3)), 0.0);
    }

    #[test]
    fn index_of_code() {
        let route = Route::new("601", Direction::Outbound, stops(3), vec![]).unwrap();
        assert_eq!(route.index_of("s1"), Some(StopId(1)));
        assert_eq!(route.index_of("zzz"), None);
    }

    #[test]
    fn single_stop_rejected() {
        assert!(Route::new("601", Direction::Outbound, stops(1), vec![]).is_err());
    }

    #[test]
    fn duplicate_code_rejected() {
        let mut s = stops(3);
        s[2].code = "s0".into();
        assert!(Route::new("601", Direction::Outbound, s, vec![]).is_err());
    }

    #[test]
    fn monitored_out_of_range_rejected() {
        let err = Route::new("601", Direction::Outbound, stops(3), vec![StopId(9)]);
        assert!(err.is_err());
    }

    #[test]
    fn negative_distance_rejected() {
        let mut s = stops(3);
        s[0].distance_to_next_m = -1.0;
        assert!(Route::new("601", Direction::Outbound, s, vec![]).is_err());
    }
}

#[cfg(test)]
mod passenger {
    use crate::{Mobility, ServiceTimes};

    #[test]
    fn capacity_costs() {
        assert_eq!(Mobility::Regular.capacity_cost(), 1);
        assert_eq!(Mobility::Wheelchair.capacity_cost(), 2);
    }

    #[test]
    fn default_service_times() {
        let t = ServiceTimes::default();
        assert_eq!(t.boarding_s(Mobility::Regular), 2.0);
        assert_eq!(t.alighting_s(Mobility::Regular), 1.0);
        assert_eq!(t.boarding_s(Mobility::Wheelchair), 45.0);
        assert_eq!(t.alighting_s(Mobility::Wheelchair), 45.0);
    }
}
