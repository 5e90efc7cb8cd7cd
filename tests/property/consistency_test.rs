// tests/property/consistency_test.rs

//! Property-based tests for storage and classification consistency:
//! last-write-wins reads, wholesale zone replacement, and sticky roles.

use crate::test_helpers::TestContext;
use fenceline::core::handler::command_router::RouteResponse;
use fenceline::core::roster::ClientRole;
use proptest::prelude::*;

fn location_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,3}(\\.[0-9]{1,4})?[NS],[0-9]{1,3}(\\.[0-9]{1,4})?[EW]"
}

fn zone_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        "[0-9]{1,3}(\\.[0-9]{1,3})?[NS],[0-9]{1,3}(\\.[0-9]{1,3})?[EW],[0-9]{1,3}",
        1..5,
    )
    .prop_map(|tuples| tuples.join("\n"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_get_location_returns_last_write(
        locations in prop::collection::vec(location_strategy(), 1..12),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestContext::new().await;
            for location in &locations {
                ctx.set_location("BB_1", location).await.unwrap();
            }

            let reply = ctx.get_location("BB_1").await.unwrap();
            assert_eq!(
                reply,
                RouteResponse::Reply(locations.last().unwrap().clone())
            );

            // Every write is retained in order.
            let device = ctx.state.store.get_device("BB_1").unwrap();
            let record = device.load().await.unwrap();
            assert_eq!(&record.location, &locations);
        });
    }

    #[test]
    fn test_get_zone_returns_last_replacement(
        zones in prop::collection::vec(zone_strategy(), 1..6),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestContext::new().await;
            for zone in &zones {
                ctx.set_zone("BB_1", zone).await.unwrap();
            }

            // Only the final replacement is visible; earlier zones leave no
            // residue in the record.
            let reply = ctx.get_zone("BB_1").await.unwrap();
            assert_eq!(reply, RouteResponse::Reply(zones.last().unwrap().clone()));

            let device = ctx.state.store.get_device("BB_1").unwrap();
            let record = device.load().await.unwrap();
            assert_eq!(record.zone.join("\n"), *zones.last().unwrap());
        });
    }

    #[test]
    fn test_first_classification_is_sticky(
        first_is_observer in any::<bool>(),
        later_hints in prop::collection::vec(any::<bool>(), 0..8),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestContext::new().await;
            let ip: std::net::IpAddr = "10.9.8.7".parse().unwrap();
            let role_of = |observer: bool| {
                if observer {
                    ClientRole::Observer
                } else {
                    ClientRole::Tracker
                }
            };

            let first = role_of(first_is_observer);
            assert_eq!(ctx.state.roster.classify(ip, first), first);

            for hint in later_hints {
                assert_eq!(ctx.state.roster.classify(ip, role_of(hint)), first);
            }
            assert_eq!(ctx.state.roster.role_of(ip), Some(first));
        });
    }

    #[test]
    fn test_devices_never_written_reply_sentinels(digits in "[0-9]{1,8}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestContext::new().await;
            let device = format!("BB_{digits}");

            let location = ctx.get_location(&device).await.unwrap();
            assert_eq!(
                location,
                RouteResponse::Reply("0.0N,0.0E".to_string())
            );

            let zone = ctx.get_zone(&device).await.unwrap();
            assert_eq!(zone, RouteResponse::Reply("0.0N,0.0E,0.0".to_string()));
        });
    }
}
