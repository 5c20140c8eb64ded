//! Demo binary: simulated drive along a route with live trimming
//!
//! Runs the full tracking pipeline against a scripted position source, then
//! shows the offer board and the booking lifecycle. No network access.

use ambutrack::api::formatting::{CsvFormatter, JsonFormatter, TextFormatter};
use ambutrack::api::{CallbackTracker, SessionEvent, TrackerConfig, TrackingSession};
use ambutrack::booking::{BookingStatus, OfferBoard};
use ambutrack::core::{GeoPoint, Route};
use ambutrack::processing::polyline::{decode_polyline, encode_polyline};
use ambutrack::transport::MockPositionSource;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("ambutrack - tracking pipeline demo");
    println!("==================================");
    println!();

    let waypoints = demo_waypoints();

    // Routes travel as encoded polylines; round-trip ours through the codec
    let encoded = encode_polyline(&waypoints);
    println!("Encoded route ({} points): {}", waypoints.len(), encoded);
    let decoded = decode_polyline(&encoded).expect("demo route encodes cleanly");
    println!("Decoded back to {} points", decoded.len());
    println!();

    run_tracking_demo(Route::new(decoded));
    run_offer_board_demo();
    run_booking_lifecycle_demo();
}

fn demo_waypoints() -> Vec<GeoPoint> {
    // A short run up the causeway, roughly 220 m between points
    vec![
        GeoPoint::new(18.92110, 72.83280),
        GeoPoint::new(18.92300, 72.83300),
        GeoPoint::new(18.92510, 72.83290),
        GeoPoint::new(18.92700, 72.83210),
        GeoPoint::new(18.92910, 72.83150),
        GeoPoint::new(18.93120, 72.83090),
        GeoPoint::new(18.93300, 72.83060),
        GeoPoint::new(18.93480, 72.83030),
    ]
}

fn run_tracking_demo(route: Route) {
    println!("Tracking session");
    println!("----------------");

    let config = TrackerConfig {
        booking_id: Some("bkg-2041".to_string()),
        ..Default::default()
    };
    let mut session = TrackingSession::new(route, config).expect("demo route is non-empty");

    // Script a drive that touches every waypoint in order
    let now = unix_time_ms();
    let waypoints = demo_waypoints();
    let mut source = MockPositionSource::new(1);
    let total = waypoints.len();
    for (i, point) in waypoints.iter().enumerate() {
        let eta = format!("{} min", total - i);
        source.add_tracking_update_at(
            point.latitude,
            point.longitude,
            Some(eta.as_str()),
            now - 1_000 * (total - i) as u64,
        );
    }
    session
        .add_source(Box::new(source))
        .expect("source id 1 is free");

    let mut tracker = CallbackTracker::new(session);
    tracker.register_event_callback(Box::new(|event| match event {
        SessionEvent::WaypointsPassed {
            count,
            points_remaining,
        } => println!("  passed {} waypoint(s), {} remaining", count, points_remaining),
        SessionEvent::DestinationReached { position } => {
            println!("  arrived at destination ({})", position)
        }
        SessionEvent::FixRejected { rejection } => println!("  fix rejected: {}", rejection),
        _ => {}
    }));
    tracker.register_progress_callback(Box::new(|progress| {
        let line = TextFormatter { compact: true }.format(progress);
        println!("  progress: {}", line);
    }));

    let outcome = tracker.process().expect("processing the scripted drive");
    println!("  handled {} updates", outcome.updates_handled);

    let session = tracker.session_mut();
    if let Some(progress) = session.progress() {
        println!();
        print!("{}", TextFormatter::default().format(&progress));

        let json = JsonFormatter { pretty: true }
            .format(&progress)
            .expect("progress serializes");
        println!();
        println!("As JSON:");
        println!("{}", json);

        let csv = CsvFormatter;
        println!();
        println!("As CSV:");
        println!("{}", csv.header());
        println!("{}", csv.format_row(&progress));
    }

    let state = session.state();
    println!();
    println!(
        "Session state: {} accepted, {} rejected, {} reports published",
        state.fixes_accepted, state.fixes_rejected, state.reports_published
    );
    println!();
}

fn run_offer_board_demo() {
    println!("Offer board");
    println!("-----------");

    let mut board = OfferBoard::new();

    // Batch replay: an array of JSON-encoded strings
    let batch = r#"[
        "{\"bookingId\":\"bkg-2041\",\"pickupLat\":18.9211,\"pickupLon\":72.8328,\"distance\":0.7}",
        "{\"bookingId\":\"bkg-2042\",\"pickupLat\":18.9788,\"pickupLon\":72.8395,\"distance\":2.4}"
    ]"#;
    let added = board.ingest(batch).expect("batch payload parses");
    println!("  batch delivered {} new offer(s)", added);

    // The same booking pushed again individually is deduplicated
    let push = r#"{"bookingId":"bkg-2041","pickupLat":18.9211,"pickupLon":72.8328,"distance":0.7}"#;
    let added = board.ingest(push).expect("push payload parses");
    println!("  replay delivered {} new offer(s)", added);

    for offer in board.offers() {
        println!(
            "  offer {}: pickup at {}, {:.1} km away",
            offer.offer_id().unwrap_or("?"),
            offer.pickup(),
            offer.distance.unwrap_or_default()
        );
    }
    println!();
}

fn run_booking_lifecycle_demo() {
    println!("Booking lifecycle");
    println!("-----------------");

    let mut status = BookingStatus::EnRoute;
    println!("  start: {}", status);
    while let Some(next) = status.next() {
        println!(
            "  {} -> {} (drop-off change allowed: {})",
            status,
            next,
            next.allows_dropoff_change()
        );
        status = next;
    }
    println!(
        "  skipping ahead is rejected: EN_ROUTE -> REACHED legal? {}",
        BookingStatus::EnRoute.can_transition_to(BookingStatus::Reached)
    );
}

fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
