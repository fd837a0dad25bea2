//! Binding recognizers to input surfaces.
//!
//! Pure event-processing logic lives in [`crate::event`].
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use log::{debug, warn};

use crate::event::{PointerEvent, dispatch};
use crate::recognizer::{GestureEvent, GestureRecognizer};
use crate::session::TimerHandle;

/// Callback a surface invokes for every pointer event.
pub type PointerCallback = Box<dyn FnMut(PointerEvent)>;

/// A source of normalized pointer events that listeners can subscribe to.
pub trait InputSurface {
    type Subscription;

    fn subscribe(&mut self, callback: PointerCallback) -> Self::Subscription;

    fn unsubscribe(&mut self, subscription: Self::Subscription);
}

// -- SurfaceBinding -------------------------------------------

/// Keeps a recognizer subscribed to one surface until torn down or dropped.
pub struct SurfaceBinding<S: InputSurface> {
    surface: S,
    subscription: Option<S::Subscription>,
    recognizer: Rc<RefCell<GestureRecognizer>>,
}

impl<S: InputSurface> SurfaceBinding<S> {
    pub fn bind(mut surface: S, recognizer: GestureRecognizer) -> Self {
        let recognizer = Rc::new(RefCell::new(recognizer));
        let sink = Rc::clone(&recognizer);
        let subscription = surface.subscribe(Box::new(move |event: PointerEvent| {
            match sink.try_borrow_mut() {
                Ok(mut rec) => {
                    dispatch(&mut rec, event);
                }
                Err(_) => warn!("Recognizer busy, dropping re-entrant {event:?}"),
            }
        }));
        debug!("Recognizer bound to surface");

        Self {
            surface,
            subscription: Some(subscription),
            recognizer,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn recognizer(&self) -> Ref<'_, GestureRecognizer> {
        self.recognizer.borrow()
    }

    /// The long-press timer the host should schedule, if any.
    pub fn armed_timer(&self) -> Option<TimerHandle> {
        self.recognizer.borrow().armed_timer()
    }

    /// Deliver a host timer callback to the bound recognizer.
    pub fn fire_timer(&self, handle: TimerHandle) -> Option<GestureEvent> {
        if !self.is_bound() {
            return None;
        }
        match self.recognizer.try_borrow_mut() {
            Ok(mut rec) => rec.on_long_press_timer(handle),
            Err(_) => {
                warn!("Recognizer busy, dropping timer {}", handle.generation);
                None
            }
        }
    }

    /// Unsubscribe from the surface and cancel any interaction in progress.
    /// Safe to call more than once.
    pub fn teardown(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        self.surface.unsubscribe(subscription);
        match self.recognizer.try_borrow_mut() {
            Ok(mut rec) => rec.cancel(),
            Err(_) => warn!("Recognizer busy during teardown, session left to the surface"),
        }
        debug!("Recognizer unbound from surface");
    }
}

impl<S: InputSurface> Drop for SurfaceBinding<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// -- LocalSurface ---------------------------------------------

/// Subscription token for a [`LocalSurface`] listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// In-process surface: the host pushes events with [`LocalSurface::emit`]
/// and every subscribed listener receives them in subscription order.
#[derive(Default)]
pub struct LocalSurface {
    next_id: u64,
    listeners: Vec<(ListenerId, PointerCallback)>,
}

impl LocalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit(&mut self, event: PointerEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl InputSurface for LocalSurface {
    type Subscription = ListenerId;

    fn subscribe(&mut self, callback: PointerCallback) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, callback));
        id
    }

    fn unsubscribe(&mut self, subscription: ListenerId) {
        self.listeners.retain(|(id, _)| *id != subscription);
    }
}
