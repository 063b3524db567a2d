//! Integration tests for progress stack

use lts_errors::ProgressError;
use lts_events::{channel, AppEvent, ProgressEvent};
use lts_progress::{ProgressReporter, ProgressStack, RecordingReporter};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Op {
    Start(f64),
    Update(f64),
    Finish,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.01f64..=1.0).prop_map(Op::Start),
        (0.0f64..=1.0).prop_map(Op::Update),
        Just(Op::Finish),
    ]
}

/// Reporter whose log outlives the stack
#[derive(Clone, Default)]
struct Shared(Arc<Mutex<RecordingReporter>>);

impl ProgressReporter for Shared {
    fn report(&mut self, increment: f64, message: &str) {
        self.0.lock().unwrap().report(increment, message);
    }
}

proptest! {
    /// Cumulative progress never decreases and never exceeds 100
    #[test]
    fn prop_progress_monotonic_and_bounded(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let shared = Shared::default();
        let mut stack = ProgressStack::new("Installing", shared.clone());

        for op in ops {
            match op {
                Op::Start(weight) => stack.start_task(weight, "task").unwrap(),
                Op::Update(fraction) => stack.update_task(fraction, None),
                Op::Finish => {
                    let depth = stack.depth();
                    let result = stack.finish_task();
                    if depth == 1 {
                        prop_assert_eq!(result, Err(ProgressError::EmptyStack));
                        prop_assert_eq!(stack.depth(), 1);
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
            }
        }

        let recorder = shared.0.lock().unwrap();
        let mut cumulative = 0.0;
        for (increment, _) in &recorder.reports {
            prop_assert!(*increment >= 0.0, "negative increment {}", increment);
            cumulative += increment;
            prop_assert!(cumulative <= 100.0 + 1e-9, "cumulative {} above 100", cumulative);
        }
    }
}

#[tokio::test]
async fn test_event_sender_receives_increments() {
    let (tx, mut rx) = channel();
    let mut stack = ProgressStack::new("Installing ltex-ls", tx);

    stack.start_task(0.7, "Downloading").unwrap();
    stack.update_task(1.0, None);
    stack.finish_task().unwrap();
    drop(stack);

    let mut total = 0.0;
    let mut last_label = String::new();
    while let Some(event) = rx.recv().await {
        if let AppEvent::Progress(ProgressEvent::Reported { increment, message }) = event {
            total += increment;
            last_label = message;
        }
    }
    assert!((total - 70.0).abs() < 1e-9);
    assert_eq!(last_label, "Installing ltex-ls");
}
