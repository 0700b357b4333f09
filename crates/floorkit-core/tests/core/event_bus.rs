use floorkit_core::event_bus::{EventFilter, PlanEvent, PlanEventBus, RoomProperty};
use floorkit_core::ItemId;
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn test_handlers_see_events_in_publish_order() {
    let bus = PlanEventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = bus.subscribe_scoped(EventFilter::All, move |event| {
        sink.lock().push(event.clone());
    });

    let id = ItemId::new();
    bus.publish(PlanEvent::Room {
        id,
        property: RoomProperty::Points,
    })
    .unwrap();
    bus.publish(PlanEvent::Selection).unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1], PlanEvent::Selection);
}
