use chrono::{Duration, Utc};
use wayfare_catalog::{RawTripQuery, TravelMode, TravelOption, TripFilter, TripStore};
use wayfare_core::Error;
use wayfare_shared::Money;
use wayfare_store::MemoryStore;

const FLOOR_MINOR: i64 = 100 * 100;

async fn seed(store: &MemoryStore) -> (TravelMode, TravelMode) {
    let bus = TravelMode::new("Bus");
    let flight = TravelMode::new("Flight");
    store.insert_mode(bus.clone()).await.unwrap();
    store.insert_mode(flight.clone()).await.unwrap();

    let base = Utc::now() + Duration::days(10);
    for (mode, destination, price_major, offset) in [
        (&bus, "Goa", 1500, 0i64),
        (&bus, "Manali", 2500, 5),
        (&flight, "Goa", 6500, 2),
        (&flight, "Leh", 50, 7),
    ] {
        let trip = TravelOption::new(
            mode.id,
            "Delhi",
            destination,
            base + Duration::days(offset),
            base + Duration::days(offset + 3),
            Money::from_major(price_major, "INR"),
            40,
        )
        .unwrap();
        store.insert_trip(trip).await.unwrap();
    }
    (bus, flight)
}

#[tokio::test]
async fn listing_orders_by_travel_date_descending() {
    let store = MemoryStore::new();
    seed(&store).await;

    let filter = TripFilter::from_raw(&RawTripQuery::default(), 0).unwrap();
    let trips = store.list_trips(&filter).await.unwrap();
    assert_eq!(trips.len(), 4);
    for pair in trips.windows(2) {
        assert!(pair[0].travel_date >= pair[1].travel_date);
    }
}

#[tokio::test]
async fn destination_and_mode_filters_combine() {
    let store = MemoryStore::new();
    let (_bus, flight) = seed(&store).await;

    let raw = RawTripQuery {
        search: Some("goa".to_string()),
        travel_mode: Some(flight.id.to_string()),
        ..Default::default()
    };
    let filter = TripFilter::from_raw(&raw, FLOOR_MINOR).unwrap();
    let trips = store.list_trips(&filter).await.unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].mode_id, flight.id);
    assert_eq!(trips[0].destination, "Goa");
}

#[tokio::test]
async fn default_price_floor_hides_below_floor_trips() {
    let store = MemoryStore::new();
    seed(&store).await;

    let filter = TripFilter::from_raw(&RawTripQuery::default(), FLOOR_MINOR).unwrap();
    let trips = store.list_trips(&filter).await.unwrap();
    assert!(trips.iter().all(|t| t.price.amount_minor >= FLOOR_MINOR));
    assert_eq!(trips.len(), 3);
}

#[tokio::test]
async fn malformed_bounds_are_invalid_filters() {
    let raw = RawTripQuery {
        start_date: Some("next tuesday".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        TripFilter::from_raw(&raw, FLOOR_MINOR),
        Err(Error::InvalidFilter(_))
    ));

    let raw = RawTripQuery {
        min_price: Some("free".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        TripFilter::from_raw(&raw, FLOOR_MINOR),
        Err(Error::InvalidFilter(_))
    ));
}

#[tokio::test]
async fn modes_list_is_sorted_by_name() {
    let store = MemoryStore::new();
    seed(&store).await;

    let modes = store.modes().await.unwrap();
    assert_eq!(modes.len(), 2);
    assert_eq!(modes[0].name, "Bus");
    assert_eq!(modes[1].name, "Flight");
}
