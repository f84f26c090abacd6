use std::cell::RefCell;
use std::rc::Rc;

use ai_tools::{FanoutTraceSink, NullTraceSink, TraceEvent, TraceLog, TraceSink};

#[test]
fn trace_log_collects_and_queries_events() {
    let mut log = TraceLog::default();
    log.emit(TraceEvent::new(1, "goap.plan.start").with_detail("Eat"));
    log.emit(TraceEvent::new(2, "goap.action.start").with_detail("MoveTo"));
    log.emit(TraceEvent::new(3, "goap.action.start").with_detail("PickUp"));

    assert_eq!(log.len(), 3);
    assert_eq!(log.count("goap.action.start"), 2);
    assert_eq!(
        log.tags(),
        vec!["goap.plan.start", "goap.action.start", "goap.action.start"]
    );
    let last = log.last_with_tag("goap.action.start").expect("event");
    assert_eq!(last.tick, 3);
    assert_eq!(last.detail, "PickUp");
    assert!(log.last_with_tag("goap.stall").is_none());
}

#[test]
fn shared_sink_stays_readable_after_handoff() {
    let shared = Rc::new(RefCell::new(TraceLog::default()));
    let mut boxed: Box<dyn TraceSink> = Box::new(shared.clone());

    boxed.emit(TraceEvent::new(4, "goap.stall").with_agent(42));

    let log = shared.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log.events[0].agent, 42);
    assert_eq!(log.events[0].tag, "goap.stall");
    assert_eq!(log.events[0].detail, "");
}

#[test]
fn fanout_delivers_to_every_sink() {
    let first = Rc::new(RefCell::new(TraceLog::default()));
    let second = Rc::new(RefCell::new(TraceLog::default()));
    let mut fanout = FanoutTraceSink::new()
        .with(first.clone())
        .with(NullTraceSink)
        .with(second.clone());
    assert_eq!(fanout.len(), 3);

    fanout.emit(TraceEvent::new(5, "goap.plan.none"));

    assert_eq!(first.borrow().count("goap.plan.none"), 1);
    assert_eq!(second.borrow().count("goap.plan.none"), 1);
}

#[test]
fn empty_fanout_drops_events() {
    let mut fanout = FanoutTraceSink::new();
    assert!(fanout.is_empty());
    fanout.emit(TraceEvent::new(0, "ignored"));
}
