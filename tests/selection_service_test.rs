//! Tests for SelectionService change notifications

use std::cell::RefCell;
use std::rc::Rc;

use svcpick::application::services::{ChangeListener, SelectionService};
use svcpick::application::ApplicationError;
use svcpick::domain::{Aggregator, ChangeSet, DomainError, NodeId, Price, ServiceTree, StateChange};
use svcpick::util::testing::{init_test_setup, sample_tree};

/// Records every batch together with the total seen at delivery time.
#[derive(Clone, Default)]
struct Recorder {
    batches: Rc<RefCell<Vec<(Vec<StateChange>, Price)>>>,
}

impl ChangeListener for Recorder {
    fn state_changed(&mut self, tree: &ServiceTree, changes: &ChangeSet) {
        self.batches
            .borrow_mut()
            .push((changes.iter().copied().collect(), Aggregator::total(tree)));
    }
}

fn change(id: u32, checked: bool) -> StateChange {
    StateChange {
        id: NodeId(id),
        checked,
    }
}

#[test]
fn given_subscriber_when_toggling_then_receives_one_ordered_batch_per_call() {
    // Arrange
    init_test_setup();
    let mut svc = SelectionService::new(sample_tree());
    let recorder = Recorder::default();
    svc.subscribe(recorder.clone());

    // Act
    svc.toggle(NodeId(6)).unwrap();
    svc.toggle(NodeId(7)).unwrap();
    svc.toggle(NodeId(3)).unwrap();

    // Assert
    let batches = recorder.batches.borrow();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].0, vec![change(6, true), change(3, true)]);
    assert_eq!(batches[0].1, Price::from_units(11).unwrap());
    assert_eq!(batches[1].0, vec![change(7, true)]);
    assert_eq!(batches[1].1, Price::from_units(12).unwrap());
    assert_eq!(
        batches[2].0,
        vec![change(3, false), change(6, false), change(7, false)]
    );
    assert_eq!(batches[2].1, Price::ZERO);
}

#[test]
fn given_unknown_id_when_toggling_then_errors_without_notification() {
    // Arrange
    let mut svc = SelectionService::new(sample_tree());
    let recorder = Recorder::default();
    svc.subscribe(recorder.clone());
    svc.toggle(NodeId(9)).unwrap();

    // Act
    let result = svc.toggle(NodeId(1234));

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::NotFound(NodeId(1234))))
    ));
    assert_eq!(recorder.batches.borrow().len(), 1);
    assert_eq!(svc.total(), Price::from_units(350).unwrap());
}

#[test]
fn given_multiple_subscribers_when_toggling_then_all_receive_same_batch() {
    let mut svc = SelectionService::new(sample_tree());
    let first = Recorder::default();
    let second = Recorder::default();
    svc.subscribe(first.clone());
    svc.subscribe(second.clone());

    svc.toggle(NodeId(4)).unwrap();

    assert_eq!(*first.batches.borrow(), *second.batches.borrow());
    assert_eq!(first.batches.borrow()[0].0, vec![change(4, true), change(0, true)]);
}

#[test]
fn given_closure_subscriber_when_clearing_then_receives_combined_batch() {
    let mut svc = SelectionService::new(sample_tree());
    svc.toggle(NodeId(5)).unwrap();
    svc.toggle(NodeId(8)).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    svc.subscribe(move |_: &ServiceTree, changes: &ChangeSet| {
        sink.borrow_mut().extend(changes.ids());
    });

    svc.clear();

    assert_eq!(
        *seen.borrow(),
        vec![NodeId(0), NodeId(5), NodeId(3), NodeId(8)]
    );
    assert_eq!(svc.total(), Price::ZERO);
}
