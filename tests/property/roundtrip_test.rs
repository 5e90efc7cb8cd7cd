// tests/property/roundtrip_test.rs

//! Property-based tests for round-trip operations: what goes through the
//! frame codec or into the store comes back unchanged.

use crate::test_helpers::TestContext;
use bytes::BytesMut;
use fenceline::core::handler::command_router::RouteResponse;
use fenceline::core::protocol::{FRAME_HEADER_LEN, FrameCodec};
use proptest::prelude::*;
use tokio_util::codec::{Decoder, Encoder};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_frame_roundtrip(payload in ".{0,2000}") {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::new();
        codec.encode(payload.clone(), &mut buf).unwrap();

        // Wire size is always header plus payload bytes.
        prop_assert_eq!(buf.len(), FRAME_HEADER_LEN + payload.len());

        let decoded = codec.decode(&mut buf).unwrap();
        prop_assert_eq!(decoded, Some(payload));
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn test_frame_decodes_only_when_complete(
        payload in ".{1,500}",
        cut_ratio in 0.0f64..1.0,
    ) {
        let mut codec = FrameCodec;
        let mut full = BytesMut::new();
        codec.encode(payload.clone(), &mut full).unwrap();

        // Feed an arbitrary prefix first: no frame and nothing consumed.
        let cut = 1 + ((full.len() - 2) as f64 * cut_ratio) as usize;
        let mut buf = BytesMut::from(&full[..cut]);
        prop_assert_eq!(codec.decode(&mut buf).unwrap(), None);
        prop_assert_eq!(buf.len(), cut);

        // The remainder completes exactly one frame.
        buf.extend_from_slice(&full[cut..]);
        prop_assert_eq!(codec.decode(&mut buf).unwrap(), Some(payload));
    }

    #[test]
    fn test_valid_device_names_always_parse(digits in "[0-9]{1,10}") {
        let device = format!("BB_{digits}");
        let command = fenceline::core::Command::parse(&format!("getLocation {device}")).unwrap();
        prop_assert_eq!(command.args_for_log(), device);
    }

    #[test]
    fn test_set_location_line_splits_into_fields(
        digits in "[0-9]{1,6}",
        location in "[0-9]{1,3}(\\.[0-9]{1,4})?[NS],[0-9]{1,3}(\\.[0-9]{1,4})?[EW]",
    ) {
        let device = format!("BB_{digits}");
        let command =
            fenceline::core::Command::parse(&format!("setLocation {device} {location}")).unwrap();
        match command {
            fenceline::core::Command::SetLocation(cmd) => {
                prop_assert_eq!(cmd.device, device);
                prop_assert_eq!(cmd.location, location);
            }
            other => prop_assert!(false, "unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_junk_lines_never_parse(line in "[a-z]{1,12}( [a-z0-9,.]{1,20})?") {
        // Lowercase verbs can never match the case-sensitive grammar.
        let result = fenceline::core::Command::parse(&line);
        prop_assert!(result.is_err());
    }

    #[test]
    fn test_store_location_roundtrip(
        digits in "[0-9]{1,6}",
        location in "[0-9]{1,3}(\\.[0-9]{1,4})?[NS],[0-9]{1,3}(\\.[0-9]{1,4})?[EW]",
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestContext::new().await;
            let device = format!("BB_{digits}");

            let set = ctx.set_location(&device, &location).await.unwrap();
            assert_eq!(set, RouteResponse::NoReply);

            let get = ctx.get_location(&device).await.unwrap();
            assert_eq!(get, RouteResponse::Reply(location.clone()));
        });
    }

    #[test]
    fn test_store_zone_roundtrip(
        digits in "[0-9]{1,6}",
        tuples in prop::collection::vec(
            "[0-9]{1,3}(\\.[0-9]{1,3})?[NS],[0-9]{1,3}(\\.[0-9]{1,3})?[EW],[0-9]{1,3}(\\.[0-9]{1,2})?",
            1..6,
        ),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestContext::new().await;
            let device = format!("BB_{digits}");
            let zone_text = tuples.join("\n");

            let set = ctx.set_zone(&device, &zone_text).await.unwrap();
            assert_eq!(set, RouteResponse::NoReply);

            let get = ctx.get_zone(&device).await.unwrap();
            assert_eq!(get, RouteResponse::Reply(zone_text.clone()));
        });
    }
}
