use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Suspends the current task once, letting the executor run other tasks
/// before it resumes.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Suspension points released by the frame loop. Tasks awaiting
/// [`next_frame`](Self::next_frame) stay parked until the owner calls
/// [`advance`](Self::advance), so their work is spread over frames.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    frame: Rc<Cell<u64>>,
    parked: Rc<RefCell<Vec<Waker>>>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame.get()
    }

    /// Resolves on the first `advance` after the future is first polled.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame {
            gate: self.clone(),
            target: None,
        }
    }

    /// Starts a new frame and wakes every parked task.
    pub fn advance(&self) {
        self.frame.set(self.frame.get() + 1);
        for waker in self.parked.borrow_mut().drain(..) {
            waker.wake();
        }
    }

    pub fn has_parked(&self) -> bool {
        !self.parked.borrow().is_empty()
    }
}

#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct NextFrame {
    gate: FrameGate,
    target: Option<u64>,
}

impl Future for NextFrame {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let current = self.gate.frame();
        let target = *self.target.get_or_insert(current + 1);
        if current >= target {
            return Poll::Ready(());
        }
        self.gate.parked.borrow_mut().push(cx.waker().clone());
        Poll::Pending
    }
}
